//! Writer configuration

use crate::Result;
use serde::{Deserialize, Serialize};

/// What to do when a file-backed stream cannot be opened
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingSourcePolicy {
    /// Abort the document with [`crate::PdfError::SourceUnavailable`]
    #[default]
    Fail,
    /// Log a warning and write an empty payload
    WriteEmpty,
}

/// Options applied to every stream a document writes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WriterOptions {
    /// Honour per-object compression requests. When false every stream is
    /// written uncompressed.
    pub compress: bool,
    /// Compress page content streams
    pub compress_content: bool,
    pub missing_source: MissingSourcePolicy,
    /// Column at which width arrays are wrapped
    pub wrap_columns: usize,
    /// Overrides the default `/Producer`
    pub producer: Option<String>,
}

impl Default for WriterOptions {
    fn default() -> Self {
        Self {
            compress: true,
            compress_content: false,
            missing_source: MissingSourcePolicy::Fail,
            wrap_columns: 80,
            producer: None,
        }
    }
}

impl WriterOptions {
    /// Load options from JSON; missing fields keep their defaults
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
