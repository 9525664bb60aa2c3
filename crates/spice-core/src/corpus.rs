//! Caption corpus loading for novelty filter construction.
//!
//! # Data Format
//!
//! COCO caption annotation files:
//!
//! ```text
//! {
//!   "annotations": [
//!     {"image_id": 179765, "id": 38, "caption": "A black Honda motorcycle parked in front of a garage."},
//!     ...
//!   ]
//! }
//! ```
//!
//! Only the `caption` field is read; everything else is ignored.

use crate::error::CorpusError;
use serde::Deserialize;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

#[derive(Debug, Deserialize)]
struct CaptionFile {
    annotations: Vec<Annotation>,
}

#[derive(Debug, Deserialize)]
struct Annotation {
    caption: String,
}

/// Loads every caption from a COCO-style annotation file.
///
/// # Errors
///
/// Returns an error if the file cannot be read, is not JSON, lacks an
/// `annotations` array, or contains no captions.
pub fn load_captions(path: &Path) -> Result<Vec<String>, CorpusError> {
    let file = File::open(path)?;
    parse_captions(BufReader::new(file))
}

/// Reads captions from any JSON source shaped like a COCO annotation file.
pub fn parse_captions(reader: impl Read) -> Result<Vec<String>, CorpusError> {
    let parsed: CaptionFile = serde_json::from_reader(reader)?;
    if parsed.annotations.is_empty() {
        return Err(CorpusError::InvalidFormat(
            "annotation list is empty".to_string(),
        ));
    }
    Ok(parsed.annotations.into_iter().map(|a| a.caption).collect())
}
