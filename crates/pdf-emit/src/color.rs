//! Color spaces and color profiles

use crate::format::{escape_bytes, escape_name, format_numbers};
use crate::{PdfError, Result};
use std::collections::BTreeMap;
use std::fmt;

pub const COLORSPACE_DEVICE_RGB: u32 = 0;
pub const COLORSPACE_DEVICE_GRAY: u32 = 1;
pub const COLORSPACE_DEVICE_CMYK: u32 = 2;
pub const COLORSPACE_PATTERN: u32 = 3;

/// Ids below this are built-in device spaces; anything else is an object id
pub(crate) const FIRST_CUSTOM_COLORSPACE: u32 = 4;

/// Family a registered color space belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorSpaceKind {
    Device,
    Pattern,
    IccBased,
    CalRgb,
    CalGray,
    Indexed,
    Separation,
}

/// What the writer needs to know about a color space
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorSpaceProperties {
    pub kind: ColorSpaceKind,
    pub channels: u32,
    /// How the space is referenced from other objects: a device name or
    /// an indirect reference
    pub reference: String,
}

/// Color spaces known to a document, keyed by id
#[derive(Debug, Clone)]
pub struct ColorSpaces {
    map: BTreeMap<u32, ColorSpaceProperties>,
}

impl Default for ColorSpaces {
    fn default() -> Self {
        let mut map = BTreeMap::new();
        for (id, kind, channels) in [
            (COLORSPACE_DEVICE_RGB, ColorSpaceKind::Device, 3),
            (COLORSPACE_DEVICE_GRAY, ColorSpaceKind::Device, 1),
            (COLORSPACE_DEVICE_CMYK, ColorSpaceKind::Device, 4),
            (COLORSPACE_PATTERN, ColorSpaceKind::Pattern, 0),
        ] {
            map.insert(
                id,
                ColorSpaceProperties {
                    kind,
                    channels,
                    reference: color_space_ref(id),
                },
            );
        }
        Self { map }
    }
}

impl ColorSpaces {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: u32) -> Option<&ColorSpaceProperties> {
        self.map.get(&id)
    }

    /// Register a color space stored as object `id`
    pub fn register(&mut self, id: u32, kind: ColorSpaceKind, channels: u32) {
        self.map.insert(
            id,
            ColorSpaceProperties {
                kind,
                channels,
                reference: color_space_ref(id),
            },
        );
    }

    /// Reference string for `id`, falling back to an indirect reference
    /// for ids that were never registered
    pub fn reference(&self, id: u32) -> String {
        self.get(id)
            .map(|p| p.reference.clone())
            .unwrap_or_else(|| color_space_ref(id))
    }
}

/// `/DeviceRGB`, `/DeviceGray`, `/DeviceCMYK`, `/Pattern` or `N 0 R`
pub fn color_space_ref(id: u32) -> String {
    match id {
        COLORSPACE_DEVICE_RGB => "/DeviceRGB".to_string(),
        COLORSPACE_DEVICE_GRAY => "/DeviceGray".to_string(),
        COLORSPACE_DEVICE_CMYK => "/DeviceCMYK".to_string(),
        COLORSPACE_PATTERN => "/Pattern".to_string(),
        _ => format!("{id} 0 R"),
    }
}

/// Kind of a [`ColorProfile`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileKind {
    Icc,
    CalRgb,
    CalGray,
    Indexed,
    Separation,
}

impl fmt::Display for ProfileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ProfileKind::Icc => "ICCBased",
            ProfileKind::CalRgb => "CalRGB",
            ProfileKind::CalGray => "CalGray",
            ProfileKind::Indexed => "Indexed",
            ProfileKind::Separation => "Separation",
        };
        f.write_str(name)
    }
}

/// A color space array stored as a body object
#[derive(Debug, Clone, PartialEq)]
pub struct ColorProfile {
    kind: ProfileKind,
    contents: Vec<u8>,
}

impl ColorProfile {
    /// `[ /ICCBased N 0 R ]` around an already added ICC stream
    pub fn icc(stream_id: u32) -> Self {
        Self {
            kind: ProfileKind::Icc,
            contents: format!("[ /ICCBased {stream_id} 0 R ]").into_bytes(),
        }
    }

    /// CIE-based calibrated space.
    ///
    /// Only [`ProfileKind::CalRgb`] and [`ProfileKind::CalGray`] are valid
    /// kinds. Gray spaces take a single gamma value, the first of `gamma`,
    /// and ignore `matrix`.
    pub fn calibrated(
        kind: ProfileKind,
        white_point: [f64; 3],
        black_point: Option<[f64; 3]>,
        gamma: Option<[f64; 3]>,
        matrix: Option<[f64; 9]>,
    ) -> Result<Self> {
        let family = match kind {
            ProfileKind::CalRgb => "CalRGB",
            ProfileKind::CalGray => "CalGray",
            found => {
                return Err(PdfError::ProfileKind {
                    expected: "CalRGB or CalGray",
                    found,
                })
            }
        };

        let mut s = format!("[ /{family}\n<< /WhitePoint [ {} ]\n", format_numbers(&white_point));
        if let Some(bp) = black_point {
            s.push_str(&format!("   /BlackPoint [ {} ]\n", format_numbers(&bp)));
        }
        if let Some(g) = gamma {
            if kind == ProfileKind::CalRgb {
                s.push_str(&format!("   /Gamma [ {} ]\n", format_numbers(&g)));
            } else {
                s.push_str(&format!("   /Gamma {}\n", format_numbers(&g[..1])));
            }
        }
        if let (Some(m), ProfileKind::CalRgb) = (matrix, kind) {
            s.push_str("   /Matrix [");
            for row in m.chunks(3) {
                s.push(' ');
                s.push_str(&format_numbers(row));
                s.push_str("\n            ");
            }
            s.push_str("]\n");
        }
        s.push_str(">>\n]");

        Ok(Self {
            kind,
            contents: s.into_bytes(),
        })
    }

    /// Indexed space over `base` with one entry of `base_channels` bytes
    /// per color
    pub fn indexed(base: u32, colors: &[Vec<u8>], base_channels: usize) -> Self {
        let lookup: Vec<u8> = colors
            .iter()
            .flat_map(|c| c.iter().copied().chain(std::iter::repeat(0)).take(base_channels))
            .collect();
        let hival = colors.len().saturating_sub(1);

        let mut contents = format!("[ /Indexed\n  {}\n  {hival}\n  (", color_space_ref(base)).into_bytes();
        contents.extend_from_slice(&escape_bytes(&lookup));
        contents.extend_from_slice(b")\n]");

        Self {
            kind: ProfileKind::Indexed,
            contents,
        }
    }

    /// Separation space for colorant `name`, mapped into `alternate` by the
    /// tint transform function `function_id`
    pub fn separation(name: &str, alternate: u32, function_id: u32) -> Self {
        Self {
            kind: ProfileKind::Separation,
            contents: format!(
                "[ /Separation /{} {} {function_id} 0 R ]",
                escape_name(name),
                color_space_ref(alternate)
            )
            .into_bytes(),
        }
    }

    pub fn kind(&self) -> ProfileKind {
        self.kind
    }

    pub fn contents(&self) -> &[u8] {
        &self.contents
    }
}
