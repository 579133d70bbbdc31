//! UST reader and writer
//!
//! A UST file is a sequence of `[#...]` headed blocks of `key=value`
//! lines:
//!
//! ```text
//! [#VERSION]
//! UST Version1.2
//! Charset=UTF-8
//! [#SETTING]
//! Tempo=120.0
//! [#0000]
//! Length=480
//! Lyric=a
//! NoteNum=60
//! [#TRACKEND]
//! ```
//!
//! Files written by UTAU without a charset line are Shift-JIS. Individual
//! lines are decoded separately so a file mixing encodings (typically a
//! GBK lyric pasted into a Shift-JIS project) still opens.

use crate::defaults::TRANSIENT_PREFIX;
use crate::error::{Result, UtauError};
use crate::models::value::ust_value;
use crate::models::{Properties, UstNote, UstProject, Value};
use encoding_rs::{Encoding, GBK, SHIFT_JIS, UTF_8};
use std::borrow::Cow;
use std::fmt;
use std::fs;
use std::io::Write;
use std::path::Path;

const UTF8_MARKER: &[u8] = b"Charset=UTF-8";
const HEADER: &str = "[#VERSION]\nUST Version1.2\nCharset=UTF-8\n";

const VERSION_BLOCK: &str = "[#VERSION]";
const SETTING_BLOCK: &str = "[#SETTING]";
const TRACKEND_BLOCK: &str = "[#TRACKEND]";
/// Plugin context blocks: neighbours of the selection, not project notes
const CONTEXT_BLOCKS: [&str; 2] = ["[#PREV]", "[#NEXT]"];

/// Read and parse a UST file
pub fn open(path: impl AsRef<Path>) -> Result<UstProject> {
    let path = path.as_ref();
    let bytes = fs::read(path)?;
    log::info!("opened UST {} ({} bytes)", path.display(), bytes.len());
    parse(&bytes)
}

/// Write `project` as a UTF-8 UST file
pub fn save(project: &UstProject, path: impl AsRef<Path>) -> Result<()> {
    let mut file = fs::File::create(path.as_ref())?;
    file.write_all(to_string(project).as_bytes())?;
    Ok(())
}

/// Serialize `project` to UST text
///
/// Transient extras (keys starting with `_`) are not written.
pub fn to_string(project: &UstProject) -> String {
    UstText(project).to_string()
}

/// Parse raw UST bytes
pub fn parse(bytes: &[u8]) -> Result<UstProject> {
    let primary = detect_encoding(bytes);
    log::debug!("UST primary encoding: {}", primary.name());

    let blocks = split_blocks(bytes, primary)?;
    let mut project = UstProject::new();

    for block in &blocks {
        match block.header.as_str() {
            VERSION_BLOCK => {}
            SETTING_BLOCK => {
                project.properties = typed_properties(key_values(&block.lines))?;
            }
            TRACKEND_BLOCK => break,
            h if CONTEXT_BLOCKS.contains(&h) => {
                log::debug!("skipping plugin context block {}", h);
            }
            _ => {
                let note = parse_note(block, project.notes.len())?;
                project.notes.push(note);
            }
        }
    }

    log::info!(
        "parsed UST: {} properties, {} notes",
        project.properties.len(),
        project.notes.len()
    );
    Ok(project)
}

fn detect_encoding(bytes: &[u8]) -> &'static Encoding {
    if bytes.windows(UTF8_MARKER.len()).any(|w| w == UTF8_MARKER) {
        UTF_8
    } else {
        SHIFT_JIS
    }
}

/// Encodings tried, in order, when a line fails the primary encoding
fn fallback_encodings() -> [&'static Encoding; 3] {
    [GBK, UTF_8, SHIFT_JIS]
}

fn decode_line<'a>(raw: &'a [u8], primary: &'static Encoding, line: usize) -> Result<Cow<'a, str>> {
    if let Some(text) = primary.decode_without_bom_handling_and_without_replacement(raw) {
        return Ok(text);
    }
    for encoding in fallback_encodings() {
        if let Some(text) = encoding.decode_without_bom_handling_and_without_replacement(raw) {
            log::debug!("line {} decoded with fallback {}", line, encoding.name());
            return Ok(text);
        }
    }
    Err(UtauError::Decode { line })
}

#[derive(Debug)]
struct Block {
    header: String,
    lines: Vec<String>,
}

/// Decode line by line and group lines under their `[...]` header
///
/// Lines before the first header are discarded.
fn split_blocks(bytes: &[u8], primary: &'static Encoding) -> Result<Vec<Block>> {
    let mut blocks: Vec<Block> = Vec::new();

    for (index, raw) in bytes.split(|&b| b == b'\n').enumerate() {
        let raw = trim_cr(raw);
        let line = decode_line(raw, primary, index + 1)?;

        if line.starts_with('[') {
            blocks.push(Block {
                header: line.trim_end().to_string(),
                lines: Vec::new(),
            });
        } else if let Some(block) = blocks.last_mut() {
            block.lines.push(line.into_owned());
        }
    }

    Ok(blocks)
}

fn trim_cr(mut raw: &[u8]) -> &[u8] {
    while let [b'\r', rest @ ..] = raw {
        raw = rest;
    }
    while let [rest @ .., b'\r'] = raw {
        raw = rest;
    }
    raw
}

/// Every `key=value` line; lines without `=` are ignored
fn key_values(lines: &[String]) -> impl Iterator<Item = (&str, &str)> {
    lines.iter().filter_map(|line| line.split_once('='))
}

/// Type each pair through the schema, dropping empty values
fn typed_properties<'a>(pairs: impl Iterator<Item = (&'a str, &'a str)>) -> Result<Properties> {
    let mut properties = Properties::new();
    for (key, raw) in pairs {
        if raw.is_empty() {
            log::trace!("dropping empty value for {}", key);
            continue;
        }
        properties.insert(key, ust_value(key, raw)?);
    }
    Ok(properties)
}

fn parse_note(block: &Block, index: usize) -> Result<UstNote> {
    let pairs: Vec<(&str, &str)> = key_values(&block.lines).collect();
    // `Lyric=` with nothing after it is an empty-lyric rest, not a missing key
    let has_lyric_key = pairs.iter().any(|(k, _)| *k == "Lyric");
    let mut extra = typed_properties(pairs.into_iter())?;

    let length = take_required(&mut extra, "Length", index)?;
    let pitch = take_required(&mut extra, "NoteNum", index)?;
    let lyric = match extra.remove("Lyric") {
        Some(value) => value.to_string(),
        None if has_lyric_key => String::new(),
        None => {
            return Err(UtauError::MalformedBlock {
                block: index,
                field: "Lyric",
            })
        }
    };

    Ok(UstNote {
        length: integer_field("Length", &length)?,
        lyric,
        pitch: integer_field("NoteNum", &pitch)?,
        extra,
    })
}

fn take_required(props: &mut Properties, field: &'static str, block: usize) -> Result<Value> {
    props
        .remove(field)
        .ok_or(UtauError::MalformedBlock { block, field })
}

fn integer_field<T: TryFrom<i64>>(key: &str, value: &Value) -> Result<T> {
    value
        .as_i64()
        .and_then(|v| T::try_from(v).ok())
        .ok_or_else(|| UtauError::TypeConversion {
            key: key.to_string(),
            value: value.to_string(),
            expected: "integer in range",
        })
}

struct UstText<'a>(&'a UstProject);

impl fmt::Display for UstText<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let project = self.0;
        f.write_str(HEADER)?;
        writeln!(f, "{}", SETTING_BLOCK)?;
        for (key, value) in project.properties.iter() {
            if !key.starts_with(TRANSIENT_PREFIX) {
                writeln!(f, "{}={}", key, value)?;
            }
        }
        for (index, note) in project.notes.iter().enumerate() {
            writeln!(f, "[#{:04}]", index)?;
            writeln!(f, "Length={}", note.length)?;
            writeln!(f, "Lyric={}", note.lyric)?;
            writeln!(f, "NoteNum={}", note.pitch)?;
            for (key, value) in note.persistent_extra() {
                writeln!(f, "{}={}", key, value)?;
            }
        }
        writeln!(f, "{}", TRACKEND_BLOCK)
    }
}
