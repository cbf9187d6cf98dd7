//! Document-wide objects written between the preamble and the pages

use crate::color::ColorProfile;
use crate::compress::{Compressor, Identity};
use crate::font::Font;
use crate::graphics_state::GraphicsState;
use crate::stream::{filter_entry, header_entries, StreamSource};
use crate::writer::ObjectWriter;
use crate::Result;
use std::io::Write;
use std::path::PathBuf;

/// Stream whose payload is read from a file while the document is written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceStream {
    pub path: PathBuf,
    /// Dictionary lines written before `/Length`
    pub extra_header: String,
    pub compress: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum BodyObject {
    /// Complete object body, written verbatim
    Custom(Vec<u8>),
    SourceStream(SourceStream),
    Font(Font),
    ColorProfile(ColorProfile),
    GraphicsState(GraphicsState),
}

impl BodyObject {
    /// Object ids taken: the payload and, for file streams, its length
    pub fn slots(&self) -> u32 {
        match self {
            BodyObject::SourceStream(_) => 2,
            _ => 1,
        }
    }

    /// Write the object as `id`. `compressor` applies to file streams that
    /// ask for compression.
    pub fn write<W: Write>(
        &self,
        writer: &mut ObjectWriter<W>,
        id: u32,
        compressor: &dyn Compressor,
    ) -> Result<()> {
        match self {
            BodyObject::Custom(bytes) => writer.write_object(id, bytes),
            BodyObject::SourceStream(stream) => {
                let compressor: &dyn Compressor = if stream.compress {
                    compressor
                } else {
                    &Identity
                };
                let mut entries: Vec<String> = filter_entry(compressor).into_iter().collect();
                entries.extend(header_entries(&stream.extra_header));
                writer.write_deferred_stream(
                    id,
                    &entries,
                    StreamSource::File(&stream.path),
                    compressor,
                )?;
                Ok(())
            }
            BodyObject::Font(font) => writer.write_object(id, font.contents().as_bytes()),
            BodyObject::ColorProfile(profile) => writer.write_object(id, profile.contents()),
            BodyObject::GraphicsState(state) => {
                writer.write_object(id, state.contents().as_bytes())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compress::Flate;
    use crate::options::MissingSourcePolicy;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_slots() {
        let stream = BodyObject::SourceStream(SourceStream {
            path: PathBuf::from("a.icc"),
            extra_header: String::new(),
            compress: false,
        });
        assert_eq!(stream.slots(), 2);
        assert_eq!(BodyObject::Custom(b"null".to_vec()).slots(), 1);
        assert_eq!(BodyObject::Font(Font::standard_type1("Helvetica")).slots(), 1);
    }

    #[test]
    fn test_source_stream_header_lines() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"profile bytes").unwrap();
        let object = BodyObject::SourceStream(SourceStream {
            path: file.path().to_path_buf(),
            extra_header: "/N 3\n/Alternate /DeviceRGB\n".to_string(),
            compress: false,
        });

        let mut writer = ObjectWriter::new(Vec::new(), MissingSourcePolicy::Fail);
        object.write(&mut writer, 1, &Flate::default()).unwrap();
        let out = String::from_utf8(writer.finish(2).unwrap()).unwrap();
        assert!(out.starts_with(
            "1 0 obj\n<< /N 3\n   /Alternate /DeviceRGB\n   /Length 2 0 R\n>>\nstream\nprofile bytes\nendstream\nendobj\n2 0 obj\n   13\nendobj\n"
        ));
    }

    #[test]
    fn test_compressed_source_stream_names_filter() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&[7u8; 256]).unwrap();
        let object = BodyObject::SourceStream(SourceStream {
            path: file.path().to_path_buf(),
            extra_header: String::new(),
            compress: true,
        });

        let mut writer = ObjectWriter::new(Vec::new(), MissingSourcePolicy::Fail);
        object.write(&mut writer, 1, &Flate::default()).unwrap();
        let out = writer.finish(2).unwrap();
        let text = String::from_utf8_lossy(&out);
        assert!(text.starts_with("1 0 obj\n<< /Filter [ /FlateDecode ]\n   /Length 2 0 R\n"));
    }

    #[test]
    fn test_graphics_state_object() {
        let object = BodyObject::GraphicsState(GraphicsState::alpha(0.5));
        let mut writer = ObjectWriter::new(Vec::new(), MissingSourcePolicy::Fail);
        object.write(&mut writer, 1, &Identity).unwrap();
        let out = String::from_utf8(writer.finish(1).unwrap()).unwrap();
        assert!(out.starts_with("1 0 obj\n<< /Type /ExtGState"));
    }
}
