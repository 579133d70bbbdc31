//! Resampler flag strings
//!
//! Engines take a compact run of flag tokens such as `B10g-5Mt20N`. Each
//! engine defines its own tokens (see [`presets`]); a token is either an
//! integer taking a signed literal right after it, or a switch that is
//! present or absent.
//!
//! Scanning is lenient: characters that start no known token are skipped
//! one at a time, so unknown or misspelled flags never fail a parse.

pub mod presets;

use crate::models::Properties;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

static INT_LITERAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[+-]?\d+").expect("valid integer literal regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FlagValue {
    Bool(bool),
    Int(i64),
}

impl fmt::Display for FlagValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlagValue::Bool(b) => write!(f, "{}", b),
            FlagValue::Int(n) => write!(f, "{}", n),
        }
    }
}

/// Parsed flags in the order they were set
pub type Flags = Properties<FlagValue>;

/// Token and default value pairs for one engine
pub type FlagSchema = [(&'static str, FlagValue)];

/// Parse a flag string against `schema`
///
/// At each position the longest matching token wins. With `use_defaults`
/// the result starts out holding every schema default, in schema order.
pub fn parse(flag: &str, schema: &FlagSchema, use_defaults: bool) -> Flags {
    let mut flags: Flags = if use_defaults {
        schema.iter().map(|&(token, value)| (token, value)).collect()
    } else {
        Flags::new()
    };

    let mut rest = flag;
    while let Some(c) = rest.chars().next() {
        let matched = schema
            .iter()
            .filter(|(token, _)| !token.is_empty() && rest.starts_with(token))
            .max_by_key(|(token, _)| token.len());

        let Some(&(token, default)) = matched else {
            log::debug!("skipping unknown flag character {:?}", c);
            rest = &rest[c.len_utf8()..];
            continue;
        };
        rest = &rest[token.len()..];

        match default {
            FlagValue::Bool(_) => {
                flags.insert(token, FlagValue::Bool(true));
            }
            FlagValue::Int(_) => match read_int(rest) {
                Some((value, remainder)) => {
                    flags.insert(token, FlagValue::Int(value));
                    rest = remainder;
                }
                None => log::debug!("flag {:?} has no integer value", token),
            },
        }
    }

    flags
}

/// Split a leading signed integer literal off `input`
fn read_int(input: &str) -> Option<(i64, &str)> {
    let literal = INT_LITERAL.find(input)?;
    let value = literal.as_str().parse().ok()?;
    Some((value, &input[literal.end()..]))
}

/// Render flags back to a flag string
///
/// Switches set to true are written bare and switches set to false are
/// left out. Integers are always written, zero included.
pub fn serialize(flags: &Flags) -> String {
    let mut out = String::new();
    for (token, value) in flags.iter() {
        match value {
            FlagValue::Bool(true) => out.push_str(token),
            FlagValue::Bool(false) => {}
            FlagValue::Int(n) => {
                out.push_str(token);
                out.push_str(&n.to_string());
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCHEMA: &FlagSchema = &[
        ("B", FlagValue::Int(50)),
        ("g", FlagValue::Int(0)),
        ("G", FlagValue::Bool(false)),
        ("M", FlagValue::Int(0)),
        ("Mt", FlagValue::Int(0)),
    ];

    #[test]
    fn test_parse_integers() {
        let flags = parse("B10g-5", SCHEMA, false);
        assert_eq!(flags.len(), 2);
        assert_eq!(flags.get("B"), Some(&FlagValue::Int(10)));
        assert_eq!(flags.get("g"), Some(&FlagValue::Int(-5)));
    }

    #[test]
    fn test_parse_with_defaults() {
        let flags = parse("g+3", SCHEMA, true);
        assert_eq!(flags.len(), SCHEMA.len());
        assert_eq!(flags.get("B"), Some(&FlagValue::Int(50)));
        assert_eq!(flags.get("g"), Some(&FlagValue::Int(3)));
        assert_eq!(flags.get("G"), Some(&FlagValue::Bool(false)));
    }

    #[test]
    fn test_longest_token_wins() {
        let flags = parse("Mt20M5", SCHEMA, false);
        assert_eq!(flags.get("Mt"), Some(&FlagValue::Int(20)));
        assert_eq!(flags.get("M"), Some(&FlagValue::Int(5)));
    }

    #[test]
    fn test_switch_takes_no_value() {
        let flags = parse("GB5", SCHEMA, false);
        assert_eq!(flags.get("G"), Some(&FlagValue::Bool(true)));
        assert_eq!(flags.get("B"), Some(&FlagValue::Int(5)));
    }

    #[test]
    fn test_unknown_characters_are_skipped() {
        let flags = parse("xyB7?é", SCHEMA, false);
        assert_eq!(flags.len(), 1);
        assert_eq!(flags.get("B"), Some(&FlagValue::Int(7)));
    }

    #[test]
    fn test_integer_token_without_literal_is_ignored() {
        let flags = parse("Bg3", SCHEMA, false);
        assert!(!flags.contains_key("B"));
        assert_eq!(flags.get("g"), Some(&FlagValue::Int(3)));
    }

    #[test]
    fn test_integer_overflow_is_skipped() {
        // The token is consumed, then its digits are skipped one by one
        let flags = parse("B99999999999999999999g3", SCHEMA, false);
        assert!(!flags.contains_key("B"));
        assert_eq!(flags.get("g"), Some(&FlagValue::Int(3)));
        assert_eq!(flags.len(), 1);
    }

    #[test]
    fn test_serialize() {
        let flags: Flags = [("G", FlagValue::Bool(true))].into_iter().collect();
        assert_eq!(serialize(&flags), "G");

        let flags: Flags = [
            ("B", FlagValue::Int(0)),
            ("G", FlagValue::Bool(false)),
            ("g", FlagValue::Int(-5)),
        ]
        .into_iter()
        .collect();
        assert_eq!(serialize(&flags), "B0g-5");
    }

    #[test]
    fn test_reparse_serialized() {
        let flags = parse("g-5GMt20", SCHEMA, false);
        assert_eq!(parse(&serialize(&flags), SCHEMA, false), flags);
    }
}
