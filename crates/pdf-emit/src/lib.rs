//! pdf-emit - Streaming PDF generation
//!
//! This crate provides functionality for:
//! - Building documents from pages, fonts, color spaces and images
//! - Assigning object numbers to every indirect object up front
//! - Streaming objects to any `Write` sink while tracking byte offsets
//! - Emitting the cross-reference table and trailer
//!
//! # Example
//!
//! ```ignore
//! use pdf_emit::{Document, Page};
//!
//! let mut doc = Document::new();
//! let helvetica = doc.add_standard_type1_font("Helvetica");
//!
//! let mut page = Page::new();
//! page.set_mediabox(0.0, 0.0, 144.0, 216.0);
//! page.add_text(helvetica, 12.0, 20.0, 100.0, "Hello, World!");
//! doc.push_page(page);
//!
//! doc.save("hello.pdf")?;
//! ```

mod allocator;
mod body;
mod color;
mod compress;
mod document;
mod font;
mod format;
mod graphics_state;
mod groups;
mod image;
mod info;
mod options;
mod page;
mod patterns;
mod resources;
mod stream;
mod text;
pub mod units;
mod widths;
mod writer;

pub use allocator::{allocate, Allocation, ImageSlots, PageSlots};
pub use body::{BodyObject, SourceStream};
pub use color::{
    ColorProfile, ColorSpaceKind, ColorSpaceProperties, ColorSpaces, ProfileKind,
    COLORSPACE_DEVICE_CMYK, COLORSPACE_DEVICE_GRAY, COLORSPACE_DEVICE_RGB, COLORSPACE_PATTERN,
};
pub use compress::{Compressor, Flate, Identity};
pub use document::Document;
pub use font::{Font, FontKind, FontMetrics, FontProgram, TrueTypeMetrics};
pub use format::{escape_bytes, escape_name, escape_string, format_number};
pub use graphics_state::GraphicsState;
pub use groups::{render_order, Group};
pub use crate::image::{jpeg_info, placement, Image, ImageData, JpegInfo, RawImage};
pub use info::{pdf_date, Info};
pub use options::{MissingSourcePolicy, WriterOptions};
pub use page::{Page, PageContext, PageObject};
pub use patterns::ShadingKind;
pub use resources::{ResourceCategory, ResourceSet};
pub use stream::{known_length_stream, StreamSource};
pub use text::{Text, TextState};
pub use widths::{compress_widths, render_width_array, WidthRun, WidthTable};
pub use writer::{CountingWriter, ObjectWriter};

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while building or writing a document
#[derive(Debug, Error)]
pub enum PdfError {
    #[error("Wrong color profile kind: expected {expected}, found {found}")]
    ProfileKind {
        expected: &'static str,
        found: ProfileKind,
    },

    #[error("Font kind mismatch: {0:?} fonts have no embedded metadata")]
    FontKindMismatch(FontKind),

    #[error("Failed to parse font: {0}")]
    FontParseError(String),

    #[error("Invalid image: {0}")]
    InvalidImage(String),

    #[error("Image error: {0}")]
    ImageError(String),

    #[error("Cannot read stream source {}: {source}", path.display())]
    SourceUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unsupported: {0}")]
    Unsupported(&'static str),

    #[error("Object written out of order: expected {expected}, found {found}")]
    ObjectOrder { expected: u32, found: u32 },

    #[error("Group nesting jumps from level {previous} to {level}")]
    GroupNesting { previous: u32, level: u32 },

    #[error("Invalid configuration: {0}")]
    Config(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Result type for PDF operations
pub type Result<T> = std::result::Result<T, PdfError>;

/// Version string of this crate
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
