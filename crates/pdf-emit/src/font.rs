//! Font dictionaries and the metrics they are built from

use crate::format::{escape_name, format_number, format_numbers, wrap_tokens};
use crate::{PdfError, Result};
use std::path::{Path, PathBuf};

/// Where the bytes of an embedded font program come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FontProgram {
    /// Streamed from a file while the document is written
    File(PathBuf),
    /// Held in memory
    Bytes(Vec<u8>),
    /// Not available, the font can only be referenced
    None,
}

/// Metrics of a font, as needed to describe it in a document.
///
/// Widths and vertical metrics are in font units; multiplying by
/// [`FontMetrics::scale`] gives thousandths of an em.
pub trait FontMetrics {
    /// PostScript name, used as `/BaseFont`
    fn font_name(&self) -> &str;

    fn first_char(&self) -> u32;

    fn last_char(&self) -> u32;

    fn advance_width(&self, code: u32) -> f64;

    /// Glyph for a character code, used for CID to GID maps
    fn glyph_id(&self, code: u32) -> u16 {
        code as u16
    }

    fn scale(&self) -> f64;

    fn ascent(&self) -> f64;

    fn descent(&self) -> f64;

    fn line_gap(&self) -> f64;

    /// `[x_min, y_min, x_max, y_max]`
    fn bbox(&self) -> [f64; 4];

    fn italic_angle(&self) -> f64 {
        0.0
    }

    fn program(&self) -> FontProgram;
}

/// Font dictionary flavour
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontKind {
    /// One of the 14 standard fonts, never embedded
    StandardType1,
    /// Simple TrueType font with WinAnsi encoding
    TrueType,
    /// Descendant font of a Type0 composite font
    CidType2,
}

/// A font dictionary stored as a body object
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Font {
    kind: FontKind,
    base_font: String,
    first_char: u32,
    last_char: u32,
    widths_ref: u32,
    descriptor_ref: u32,
    map_ref: Option<u32>,
}

impl Font {
    pub fn standard_type1(name: &str) -> Self {
        Self {
            kind: FontKind::StandardType1,
            base_font: name.to_string(),
            first_char: 0,
            last_char: 0,
            widths_ref: 0,
            descriptor_ref: 0,
            map_ref: None,
        }
    }

    /// Simple TrueType font whose `/Widths` and `/FontDescriptor` are the
    /// given objects
    pub fn true_type(metrics: &dyn FontMetrics, widths_ref: u32, descriptor_ref: u32) -> Self {
        Self {
            kind: FontKind::TrueType,
            base_font: metrics.font_name().to_string(),
            first_char: metrics.first_char(),
            last_char: metrics.last_char(),
            widths_ref,
            descriptor_ref,
            map_ref: None,
        }
    }

    /// CIDFontType2 descendant. Without a `map_ref` the CID to GID mapping
    /// is the identity.
    pub fn cid_type2(name: &str, widths_ref: u32, descriptor_ref: u32, map_ref: Option<u32>) -> Self {
        Self {
            kind: FontKind::CidType2,
            base_font: name.to_string(),
            first_char: 0,
            last_char: 0,
            widths_ref,
            descriptor_ref,
            map_ref,
        }
    }

    pub fn kind(&self) -> FontKind {
        self.kind
    }

    pub fn name(&self) -> &str {
        &self.base_font
    }

    pub fn contents(&self) -> String {
        let mut s = format!("<< /Type /Font\n   /BaseFont /{}\n", escape_name(&self.base_font));
        match self.kind {
            FontKind::StandardType1 => {
                s.push_str("   /Subtype /Type1\n   /Encoding /WinAnsiEncoding\n");
            }
            FontKind::TrueType => {
                s.push_str(&format!(
                    "   /Subtype /TrueType\n   /FirstChar {}\n   /LastChar {}\n   /Widths {} 0 R\n   /FontDescriptor {} 0 R\n   /Encoding /WinAnsiEncoding\n",
                    self.first_char, self.last_char, self.widths_ref, self.descriptor_ref
                ));
            }
            FontKind::CidType2 => {
                let map = match self.map_ref {
                    Some(id) => format!("{id} 0 R"),
                    None => "/Identity".to_string(),
                };
                s.push_str(&format!(
                    "   /Subtype /CIDFontType2\n   /W {} 0 R\n   /FontDescriptor {} 0 R\n   /CIDSystemInfo << /Registry (Adobe)\n                     /Ordering (Identity)\n                     /Supplement 0 >>\n   /CIDToGIDMap {map}\n",
                    self.widths_ref, self.descriptor_ref
                ));
            }
        }
        s.push_str(">>");
        s
    }
}

/// `/Widths` array of a simple font, one entry per code
pub fn simple_widths_array(metrics: &dyn FontMetrics, columns: usize) -> String {
    let mut tokens = vec!["[".to_string()];
    for code in metrics.first_char()..=metrics.last_char() {
        tokens.push(format_number(
            (metrics.advance_width(code) * metrics.scale()).round(),
        ));
    }
    tokens.push("]".to_string());
    wrap_tokens(&tokens, columns)
}

/// Font descriptor dictionary for an embeddable font.
///
/// `font_file` is the object holding the font program, if it is embedded.
pub fn font_descriptor(
    kind: FontKind,
    metrics: &dyn FontMetrics,
    font_file: Option<u32>,
) -> Result<String> {
    // Nonsymbolic for WinAnsi simple fonts, symbolic for CID fonts
    let flags = match kind {
        FontKind::StandardType1 => return Err(PdfError::FontKindMismatch(kind)),
        FontKind::TrueType => 32,
        FontKind::CidType2 => 4,
    };
    let scale = metrics.scale();
    let bbox = metrics.bbox().map(|v| (v * scale).round());

    let mut s = format!(
        "<< /Type /FontDescriptor\n   /FontName /{}\n   /Flags {flags}\n   /FontBBox [ {} ]\n   /ItalicAngle {}\n   /Ascent {}\n   /Descent {}\n",
        escape_name(metrics.font_name()),
        format_numbers(&bbox),
        format_number(metrics.italic_angle()),
        format_number((metrics.ascent() * scale).round()),
        format_number((metrics.descent() * scale).round()),
    );
    let leading = (metrics.line_gap() * scale).round();
    if leading != 0.0 {
        s.push_str(&format!("   /Leading {}\n", format_number(leading)));
    }
    s.push_str(&format!(
        "   /CapHeight {}\n   /StemV 80\n",
        format_number((metrics.ascent() * scale).round())
    ));
    if let Some(id) = font_file {
        s.push_str(&format!("   /FontFile2 {id} 0 R\n"));
    }
    s.push_str(">>");
    Ok(s)
}

/// Binary CIDToGIDMap stream: two big-endian bytes per CID from 0 to the
/// last code
pub fn cid_to_gid_map(metrics: &dyn FontMetrics) -> Vec<u8> {
    let first = metrics.first_char();
    (0..=metrics.last_char())
        .flat_map(|code| {
            let gid = if code < first { 0 } else { metrics.glyph_id(code) };
            gid.to_be_bytes()
        })
        .collect()
}

/// Metrics read from a TrueType file with `ttf-parser`.
///
/// Covers the single-byte codes 32 to 255, mapped to glyphs through the
/// font's Unicode cmap.
#[derive(Debug, Clone)]
pub struct TrueTypeMetrics {
    name: String,
    program: FontProgram,
    first_char: u32,
    last_char: u32,
    advances: Vec<f64>,
    glyph_ids: Vec<u16>,
    units_per_em: f64,
    ascent: f64,
    descent: f64,
    line_gap: f64,
    bbox: [f64; 4],
}

impl TrueTypeMetrics {
    /// Parse a font file. The file is streamed again when embedded.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read(path)?;
        Self::parse(&data, FontProgram::File(path.to_path_buf()))
    }

    /// Parse font bytes held in memory
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        let mut metrics = Self::parse(&data, FontProgram::None)?;
        metrics.program = FontProgram::Bytes(data);
        Ok(metrics)
    }

    #[cfg(feature = "truetype")]
    fn parse(data: &[u8], program: FontProgram) -> Result<Self> {
        const FIRST: u32 = 32;
        const LAST: u32 = 255;

        let face = ttf_parser::Face::parse(data, 0)
            .map_err(|e| PdfError::FontParseError(format!("{e:?}")))?;

        let name = face
            .names()
            .into_iter()
            .filter(|n| n.name_id == ttf_parser::name_id::POST_SCRIPT_NAME)
            .find_map(|n| n.to_string())
            .unwrap_or_else(|| "Untitled".to_string());

        let mut advances = Vec::with_capacity((LAST - FIRST + 1) as usize);
        let mut glyph_ids = Vec::with_capacity(advances.capacity());
        for code in FIRST..=LAST {
            let glyph = char::from_u32(code).and_then(|c| face.glyph_index(c));
            glyph_ids.push(glyph.map(|g| g.0).unwrap_or(0));
            advances.push(
                glyph
                    .and_then(|g| face.glyph_hor_advance(g))
                    .map(f64::from)
                    .unwrap_or(0.0),
            );
        }

        let rect = face.global_bounding_box();
        Ok(Self {
            name,
            program,
            first_char: FIRST,
            last_char: LAST,
            advances,
            glyph_ids,
            units_per_em: f64::from(face.units_per_em()),
            ascent: f64::from(face.ascender()),
            descent: f64::from(face.descender()),
            line_gap: f64::from(face.line_gap()),
            bbox: [
                f64::from(rect.x_min),
                f64::from(rect.y_min),
                f64::from(rect.x_max),
                f64::from(rect.y_max),
            ],
        })
    }

    #[cfg(not(feature = "truetype"))]
    fn parse(_data: &[u8], _program: FontProgram) -> Result<Self> {
        Err(PdfError::Unsupported(
            "TrueType fonts need the `truetype` feature",
        ))
    }

    fn index(&self, code: u32) -> Option<usize> {
        if code < self.first_char || code > self.last_char {
            return None;
        }
        Some((code - self.first_char) as usize)
    }
}

impl FontMetrics for TrueTypeMetrics {
    fn font_name(&self) -> &str {
        &self.name
    }

    fn first_char(&self) -> u32 {
        self.first_char
    }

    fn last_char(&self) -> u32 {
        self.last_char
    }

    fn advance_width(&self, code: u32) -> f64 {
        self.index(code).map(|i| self.advances[i]).unwrap_or(0.0)
    }

    fn glyph_id(&self, code: u32) -> u16 {
        self.index(code).map(|i| self.glyph_ids[i]).unwrap_or(0)
    }

    fn scale(&self) -> f64 {
        1000.0 / self.units_per_em
    }

    fn ascent(&self) -> f64 {
        self.ascent
    }

    fn descent(&self) -> f64 {
        self.descent
    }

    fn line_gap(&self) -> f64 {
        self.line_gap
    }

    fn bbox(&self) -> [f64; 4] {
        self.bbox
    }

    fn program(&self) -> FontProgram {
        self.program.clone()
    }
}
