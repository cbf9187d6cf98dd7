//! Offset-tracking object writer and cross-reference table

use crate::compress::Compressor;
use crate::options::MissingSourcePolicy;
use crate::stream::{stream_dict, StreamSource};
use crate::{PdfError, Result};
use std::fs::File;
use std::io::{self, BufReader, Write};
use tracing::{trace, warn};

/// Write adapter counting the bytes that pass through it
#[derive(Debug)]
pub struct CountingWriter<W> {
    inner: W,
    position: u64,
}

impl<W: Write> CountingWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner, position: 0 }
    }

    /// Bytes written so far
    pub fn position(&self) -> u64 {
        self.position
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> Write for CountingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.inner.write(buf)?;
        self.position += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

/// Writes indirect objects and remembers where each one starts.
///
/// Objects must be written in id order, starting at 1. The offset of object
/// `k` is entry `k - 1`, which is exactly the order the cross-reference
/// table needs. Writing any other id is an error.
#[derive(Debug)]
pub struct ObjectWriter<W: Write> {
    out: CountingWriter<W>,
    offsets: Vec<u64>,
    missing_source: MissingSourcePolicy,
}

impl<W: Write> ObjectWriter<W> {
    pub fn new(out: W, missing_source: MissingSourcePolicy) -> Self {
        Self {
            out: CountingWriter::new(out),
            offsets: Vec::new(),
            missing_source,
        }
    }

    /// Current output position, relative to the start of the document
    pub fn position(&self) -> u64 {
        self.out.position()
    }

    /// Id the next object must have
    pub fn next_id(&self) -> u32 {
        self.offsets.len() as u32 + 1
    }

    /// Offsets recorded so far, entry `k - 1` for object `k`
    pub fn offsets(&self) -> &[u64] {
        &self.offsets
    }

    /// Write bytes outside of any object, such as the file header
    pub fn write_raw(&mut self, bytes: &[u8]) -> Result<()> {
        self.out.write_all(bytes)?;
        Ok(())
    }

    /// Record the offset of object `id` and write its `id 0 obj` line
    pub fn begin_object(&mut self, id: u32) -> Result<()> {
        let expected = self.next_id();
        if id != expected {
            return Err(PdfError::ObjectOrder {
                expected,
                found: id,
            });
        }
        let offset = self.position();
        trace!(id, offset, "object");
        self.offsets.push(offset);
        writeln!(self.out, "{id} 0 obj")?;
        Ok(())
    }

    /// Write a whole object: `id 0 obj`, `body`, `endobj`
    pub fn write_object(&mut self, id: u32, body: &[u8]) -> Result<()> {
        self.begin_object(id)?;
        self.out.write_all(body)?;
        self.out.write_all(b"\nendobj\n")?;
        Ok(())
    }

    /// Write object `id + 1` holding a stream length
    pub fn write_length_object(&mut self, id: u32, length: u64) -> Result<()> {
        self.begin_object(id)?;
        write!(self.out, "   {length}\nendobj\n")?;
        Ok(())
    }

    /// Write a stream whose length is only known once it is written.
    ///
    /// The dictionary holds `entries` and `/Length id+1 0 R`. The payload is
    /// piped through `compressor` straight into the output and measured by
    /// the position delta. Object `id + 1` with that length is written right
    /// after. Returns the payload length.
    pub fn write_deferred_stream<S: AsRef<str>>(
        &mut self,
        id: u32,
        entries: &[S],
        source: StreamSource<'_>,
        compressor: &dyn Compressor,
    ) -> Result<u64> {
        self.begin_object(id)?;
        let dict = stream_dict(entries, &format!("{} 0 R", id + 1));
        write!(self.out, "{dict}\nstream\n")?;

        let start = self.position();
        match source {
            StreamSource::Bytes(bytes) => {
                compressor.compress_stream(&mut &bytes[..], &mut self.out)?;
            }
            StreamSource::File(path) => match File::open(path) {
                Ok(file) => {
                    compressor.compress_stream(&mut BufReader::new(file), &mut self.out)?;
                }
                Err(source) => match self.missing_source {
                    MissingSourcePolicy::Fail => {
                        return Err(PdfError::SourceUnavailable {
                            path: path.to_path_buf(),
                            source,
                        })
                    }
                    MissingSourcePolicy::WriteEmpty => {
                        warn!(path = %path.display(), error = %source, "stream source unreadable, writing empty payload");
                    }
                },
            },
        }
        let length = self.position() - start;

        self.out.write_all(b"\nendstream\nendobj\n")?;
        self.write_length_object(id + 1, length)?;
        Ok(length)
    }

    /// Write the cross-reference table and trailer, then hand back the sink.
    ///
    /// `object_count` is the number of ids allocated; every one of them must
    /// have been written.
    pub fn finish(mut self, object_count: u32) -> Result<W> {
        let written = self.offsets.len() as u32;
        if written != object_count {
            return Err(PdfError::ObjectOrder {
                expected: object_count + 1,
                found: written + 1,
            });
        }

        let xref_offset = self.position();
        write!(self.out, "xref\n0 {}\n0000000000 65535 f \n", object_count + 1)?;
        for offset in &self.offsets {
            writeln!(self.out, "{offset:010} 00000 n ")?;
        }
        write!(
            self.out,
            "trailer\n<< /Size {}\n   /Root 1 0 R\n   /Info 5 0 R\n>>\nstartxref\n{xref_offset}\n%%EOF",
            object_count + 1
        )?;
        self.out.flush()?;
        Ok(self.out.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compress::Identity;
    use pretty_assertions::assert_eq;

    fn writer() -> ObjectWriter<Vec<u8>> {
        ObjectWriter::new(Vec::new(), MissingSourcePolicy::Fail)
    }

    #[test]
    fn test_counting_writer() {
        let mut w = CountingWriter::new(Vec::new());
        w.write_all(b"abc").unwrap();
        w.write_all(b"de").unwrap();
        assert_eq!(w.position(), 5);
        assert_eq!(w.into_inner(), b"abcde");
    }

    #[test]
    fn test_objects_must_come_in_order() {
        let mut w = writer();
        w.write_object(1, b"<< >>").unwrap();
        let err = w.write_object(3, b"<< >>").unwrap_err();
        assert!(matches!(
            err,
            PdfError::ObjectOrder {
                expected: 2,
                found: 3
            }
        ));
    }

    #[test]
    fn test_offsets_point_at_objects() {
        let mut w = writer();
        w.write_raw(b"%PDF-1.4\n").unwrap();
        w.write_object(1, b"<< /Type /Catalog >>").unwrap();
        w.write_object(2, b"(two)").unwrap();
        let offsets = w.offsets().to_vec();
        let out = w.finish(2).unwrap();

        for (i, offset) in offsets.iter().enumerate() {
            let at = &out[*offset as usize..];
            assert!(at.starts_with(format!("{} 0 obj\n", i + 1).as_bytes()));
        }
    }

    #[test]
    fn test_xref_and_trailer() {
        let mut w = writer();
        w.write_object(1, b"null").unwrap();
        let out = String::from_utf8(w.finish(1).unwrap()).unwrap();
        assert_eq!(
            out,
            "1 0 obj\nnull\nendobj\nxref\n0 2\n0000000000 65535 f \n0000000000 00000 n \ntrailer\n<< /Size 2\n   /Root 1 0 R\n   /Info 5 0 R\n>>\nstartxref\n20\n%%EOF"
        );
        for line in out.lines().skip_while(|l| *l != "xref").skip(2).take(2) {
            assert_eq!(line.len() + 1, 20);
        }
    }

    #[test]
    fn test_finish_detects_missing_objects() {
        let mut w = writer();
        w.write_object(1, b"null").unwrap();
        assert!(w.finish(3).is_err());
    }

    #[test]
    fn test_deferred_stream_measures_payload() {
        let mut w = writer();
        let len = w
            .write_deferred_stream(1, &["/N 3"], StreamSource::Bytes(b"hello"), &Identity)
            .unwrap();
        assert_eq!(len, 5);
        assert_eq!(w.next_id(), 3);
        let out = String::from_utf8(w.finish(2).unwrap()).unwrap();
        assert!(out.starts_with(
            "1 0 obj\n<< /N 3\n   /Length 2 0 R\n>>\nstream\nhello\nendstream\nendobj\n2 0 obj\n   5\nendobj\n"
        ));
    }

    #[test]
    fn test_missing_file_fails_by_default() {
        let mut w = writer();
        let err = w
            .write_deferred_stream::<&str>(
                1,
                &[],
                StreamSource::File(std::path::Path::new("/nonexistent/font.ttf")),
                &Identity,
            )
            .unwrap_err();
        assert!(matches!(err, PdfError::SourceUnavailable { .. }));
    }

    #[test]
    fn test_missing_file_can_write_empty() {
        let mut w = ObjectWriter::new(Vec::new(), MissingSourcePolicy::WriteEmpty);
        let len = w
            .write_deferred_stream::<&str>(
                1,
                &[],
                StreamSource::File(std::path::Path::new("/nonexistent/font.ttf")),
                &Identity,
            )
            .unwrap();
        assert_eq!(len, 0);
        let out = String::from_utf8(w.finish(2).unwrap()).unwrap();
        assert!(out.contains("stream\n\nendstream"));
        assert!(out.contains("2 0 obj\n   0\nendobj\n"));
    }
}
