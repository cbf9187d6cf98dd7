//! Stream object encoding
//!
//! Streams whose payload is in memory are encoded up front with a literal
//! `/Length`. Streams fed from a file are written by
//! [`crate::ObjectWriter::write_deferred_stream`], which declares the length
//! as a reference to the object that follows and fills it in afterwards.

use crate::compress::Compressor;
use crate::Result;
use std::path::Path;

/// Payload of a deferred-length stream
#[derive(Debug, Clone, Copy)]
pub enum StreamSource<'a> {
    /// Opened, drained and closed while the stream is written
    File(&'a Path),
    Bytes(&'a [u8]),
}

/// Stream dictionary with `entries` followed by `/Length length`
pub(crate) fn stream_dict<S: AsRef<str>>(entries: &[S], length: &str) -> String {
    let mut dict = String::from("<< ");
    for entry in entries {
        dict.push_str(entry.as_ref());
        dict.push_str("\n   ");
    }
    dict.push_str("/Length ");
    dict.push_str(length);
    dict.push_str("\n>>");
    dict
}

/// Caller-supplied dictionary lines as entries, one level of indentation
/// removed so nested blocks keep their alignment once re-indented
pub(crate) fn header_entries(extra_header: &str) -> impl Iterator<Item = String> + '_ {
    extra_header
        .lines()
        .map(str::trim_end)
        .filter(|l| !l.is_empty())
        .map(|l| l.strip_prefix("   ").unwrap_or(l).to_string())
}

/// `/Filter` entry for a compressor, if it names one
pub(crate) fn filter_entry(compressor: &dyn Compressor) -> Option<String> {
    compressor.filter().map(|f| format!("/Filter [ /{f} ]"))
}

/// Encode `data` as a complete stream object body.
///
/// The payload is compressed before the dictionary is written, so `/Length`
/// holds the final byte count. `extra_header` lines are added to the
/// dictionary as given.
pub fn known_length_stream(
    data: &[u8],
    extra_header: &str,
    compressor: &dyn Compressor,
) -> Result<Vec<u8>> {
    let payload = compressor.compress(data)?;

    let mut entries: Vec<String> = filter_entry(compressor).into_iter().collect();
    entries.extend(header_entries(extra_header));

    let dict = stream_dict(&entries, &payload.len().to_string());
    let mut out = Vec::with_capacity(dict.len() + payload.len() + 20);
    out.extend_from_slice(dict.as_bytes());
    out.extend_from_slice(b"\nstream\n");
    out.extend_from_slice(&payload);
    out.extend_from_slice(b"\nendstream");
    Ok(out)
}
