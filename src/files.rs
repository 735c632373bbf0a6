//! SQL file discovery and decoding.
//!
//! [`discover`] expands the command-line path into the list of files to lint:
//! a file is taken as is, a directory is walked recursively for `*.sql`
//! files. [`read_source`] loads a file as text, accepting UTF-8 (with or
//! without a byte order mark) and UTF-16.

use std::{
    fs,
    path::{Path, PathBuf}
};

use tracing::{debug, trace};
use walkdir::WalkDir;

use crate::error::{AppResult, decode_error, file_read_error, path_error, walk_error};

const SQL_EXTENSION: &str = "sql";
const UTF8_BOM: [u8; 3] = [0xEF, 0xBB, 0xBF];
const UTF16_LE_BOM: [u8; 2] = [0xFF, 0xFE];
const UTF16_BE_BOM: [u8; 2] = [0xFE, 0xFF];

/// Files to lint under `path`, sorted by path
///
/// # Errors
///
/// Returns an error if `path` does not exist or a directory cannot be read.
pub fn discover(path: &Path) -> AppResult<Vec<PathBuf>> {
    let root = path.display().to_string();
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }
    if !path.is_dir() {
        return Err(path_error(&root));
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(path).follow_links(true) {
        let entry = entry.map_err(|e| walk_error(&root, e))?;
        if entry.file_type().is_file() && is_sql_file(entry.path()) {
            trace!(file = %entry.path().display(), "discovered");
            files.push(entry.into_path());
        }
    }
    files.sort();
    debug!(%root, count = files.len(), "discovered SQL files");
    Ok(files)
}

/// Returns `true` for files with a `.sql` extension in any letter case
pub fn is_sql_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(SQL_EXTENSION))
}

/// Read and decode a SQL file
///
/// # Errors
///
/// Returns an error if the file cannot be read or is neither UTF-8 nor
/// UTF-16 text.
pub fn read_source(path: &Path) -> AppResult<String> {
    let file = path.display().to_string();
    let bytes = fs::read(path).map_err(|e| file_read_error(&file, e))?;
    decode(&bytes).ok_or_else(|| decode_error(&file))
}

/// Decode file contents, `None` when the bytes are not text
pub fn decode(bytes: &[u8]) -> Option<String> {
    let bytes = bytes.strip_prefix(&UTF8_BOM).unwrap_or(bytes);
    if let Ok(text) = std::str::from_utf8(bytes) {
        return Some(text.to_string());
    }
    if let Some(rest) = bytes.strip_prefix(&UTF16_BE_BOM) {
        return decode_utf16(rest, u16::from_be_bytes);
    }
    let rest = bytes.strip_prefix(&UTF16_LE_BOM).unwrap_or(bytes);
    decode_utf16(rest, u16::from_le_bytes)
}

fn decode_utf16(bytes: &[u8], unit: fn([u8; 2]) -> u16) -> Option<String> {
    if bytes.len() % 2 != 0 {
        return None;
    }
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|pair| unit([pair[0], pair[1]]))
        .collect();
    String::from_utf16(&units).ok()
}
