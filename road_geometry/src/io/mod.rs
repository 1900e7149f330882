//! File input and output helpers for alignment documents.

use std::fs::File;
use std::io::{self, Read, Write};

use crate::alignment::{Alignment, AlignmentData, PiData};

/// Reads a file to string.
pub fn read_to_string(path: &str) -> io::Result<String> {
    let mut buffer = String::new();
    File::open(path)?.read_to_string(&mut buffer)?;
    Ok(buffer)
}

/// Writes a string to a file, replacing its contents.
pub fn write_string(path: &str, contents: &str) -> io::Result<()> {
    File::create(path)?.write_all(contents.as_bytes())
}

pub fn read_alignment_json(path: &str) -> io::Result<AlignmentData> {
    let contents = read_to_string(path)?;
    let data: AlignmentData = serde_json::from_str(&contents)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    Ok(data)
}

pub fn write_alignment_json(path: &str, data: &AlignmentData) -> io::Result<()> {
    let json = serde_json::to_string_pretty(data).map_err(io::Error::other)?;
    write_string(path, &json)
}

/// Reads a JSON array of PIs for [`HorizontalAlignment::from_pis`].
///
/// [`HorizontalAlignment::from_pis`]: crate::alignment::HorizontalAlignment::from_pis
pub fn read_pis_json(path: &str) -> io::Result<Vec<PiData>> {
    let contents = read_to_string(path)?;
    serde_json::from_str(&contents).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

/// Reads a document and builds the alignment, reporting geometry errors as
/// [`io::ErrorKind::InvalidData`].
pub fn load_alignment(path: &str) -> io::Result<Alignment> {
    let data = read_alignment_json(path)?;
    Alignment::from_data(data).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}
