//! Image XObjects placed on pages

use crate::color::{COLORSPACE_DEVICE_CMYK, COLORSPACE_DEVICE_GRAY, COLORSPACE_DEVICE_RGB};
use crate::format::format_matrix;
use crate::{PdfError, Result};
use image::{DynamicImage, ImageDecoder, ImageReader};
use std::fs::File;
use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};

impl From<image::ImageError> for PdfError {
    fn from(err: image::ImageError) -> Self {
        PdfError::ImageError(err.to_string())
    }
}

/// Matrix drawing the unit square as a `width` x `height` box at `(x, y)`
pub fn placement(x: f64, y: f64, width: f64, height: f64) -> [f64; 6] {
    [width, 0.0, 0.0, height, x, y]
}

/// JPEG frame parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JpegInfo {
    pub width: u32,
    pub height: u32,
    pub components: u8,
}

impl JpegInfo {
    /// Device color space matching the component count
    pub fn color_space(&self) -> u32 {
        match self.components {
            1 => COLORSPACE_DEVICE_GRAY,
            4 => COLORSPACE_DEVICE_CMYK,
            _ => COLORSPACE_DEVICE_RGB,
        }
    }
}

/// Read width, height and component count from the first SOF segment
pub fn jpeg_info(data: &[u8]) -> Result<JpegInfo> {
    if data.len() < 4 || data[0] != 0xFF || data[1] != 0xD8 {
        return Err(PdfError::InvalidImage("not a JPEG stream".to_string()));
    }

    let mut i = 2;
    while i + 9 < data.len() {
        if data[i] != 0xFF {
            i += 1;
            continue;
        }

        let marker = data[i + 1];

        // SOF0..SOF15, except DHT, JPG and DAC which share the range
        if (0xC0..=0xCF).contains(&marker) && marker != 0xC4 && marker != 0xC8 && marker != 0xCC {
            return Ok(JpegInfo {
                height: u16::from_be_bytes([data[i + 5], data[i + 6]]) as u32,
                width: u16::from_be_bytes([data[i + 7], data[i + 8]]) as u32,
                components: data[i + 9],
            });
        }

        let length = u16::from_be_bytes([data[i + 2], data[i + 3]]) as usize;
        if length < 2 {
            break;
        }
        i += 2 + length;
    }

    Err(PdfError::InvalidImage("no JPEG frame header found".to_string()))
}

/// Uncompressed samples with their layout
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawImage {
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub bits_per_component: u8,
    pub channels: u8,
}

impl RawImage {
    /// Bytes per row, rows being padded to a whole byte
    pub fn stride(&self) -> usize {
        (self.width as usize * self.channels as usize * self.bits_per_component as usize).div_ceil(8)
    }

    pub fn expected_len(&self) -> usize {
        self.stride() * self.height as usize
    }

    /// Check the sample buffer is long enough and drop any excess
    pub(crate) fn validated(mut self) -> Result<Self> {
        let expected = self.expected_len();
        if self.bytes.len() < expected {
            return Err(PdfError::InvalidImage(format!(
                "{}x{} image needs {expected} bytes, got {}",
                self.width,
                self.height,
                self.bytes.len()
            )));
        }
        self.bytes.truncate(expected);
        Ok(self)
    }
}

/// Where an image's samples come from
#[derive(Debug, Clone, PartialEq)]
pub enum ImageData {
    /// Baseline JPEG file, copied as `/DCTDecode` data
    Jpeg(PathBuf),
    /// Samples held in memory
    Raw(Vec<u8>),
    /// 1-bit stencil mask with its `/Decode` array
    Mask { bytes: Vec<u8>, decode: [u32; 2] },
}

/// An image drawn on a page
#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    data: ImageData,
    width: u32,
    height: u32,
    bits_per_component: u8,
    color_space: u32,
    matrix: [f64; 6],
    compress: bool,
    soft_mask: Option<Box<Image>>,
}

impl Image {
    /// JPEG file of known size, streamed from disk when written
    pub fn jpeg(
        path: impl Into<PathBuf>,
        width: u32,
        height: u32,
        color_space: u32,
        matrix: [f64; 6],
    ) -> Self {
        Self {
            data: ImageData::Jpeg(path.into()),
            width,
            height,
            bits_per_component: 8,
            color_space,
            matrix,
            compress: false,
            soft_mask: None,
        }
    }

    /// JPEG file whose size and color space are read from its header
    pub fn jpeg_file(path: impl AsRef<Path>, matrix: [f64; 6]) -> Result<Self> {
        let path = path.as_ref();
        let mut header = Vec::new();
        // Frame headers sit near the start; 64 KiB covers large EXIF blocks
        File::open(path)?.take(64 * 1024).read_to_end(&mut header)?;
        let info = jpeg_info(&header)?;
        Ok(Self::jpeg(
            path,
            info.width,
            info.height,
            info.color_space(),
            matrix,
        ))
    }

    /// Raw samples in `color_space`, optionally with a soft mask of the
    /// same size and depth
    pub fn raw(
        image: RawImage,
        soft_mask: Option<Vec<u8>>,
        color_space: u32,
        matrix: [f64; 6],
        compress: bool,
    ) -> Result<Self> {
        let image = image.validated()?;
        let soft_mask = match soft_mask {
            Some(bytes) => {
                let mask = RawImage {
                    bytes,
                    width: image.width,
                    height: image.height,
                    bits_per_component: image.bits_per_component,
                    channels: 1,
                }
                .validated()?;
                Some(Box::new(Self::from_raw(
                    mask,
                    COLORSPACE_DEVICE_GRAY,
                    matrix,
                    compress,
                )))
            }
            None => None,
        };
        let mut img = Self::from_raw(image, color_space, matrix, compress);
        img.soft_mask = soft_mask;
        Ok(img)
    }

    fn from_raw(image: RawImage, color_space: u32, matrix: [f64; 6], compress: bool) -> Self {
        Self {
            data: ImageData::Raw(image.bytes),
            width: image.width,
            height: image.height,
            bits_per_component: image.bits_per_component,
            color_space,
            matrix,
            compress,
            soft_mask: None,
        }
    }

    /// 1-bit stencil mask painted with the current fill color
    pub fn mask(
        bytes: Vec<u8>,
        width: u32,
        height: u32,
        decode: [u32; 2],
        matrix: [f64; 6],
        compress: bool,
    ) -> Result<Self> {
        let raw = RawImage {
            bytes,
            width,
            height,
            bits_per_component: 1,
            channels: 1,
        }
        .validated()?;
        Ok(Self {
            data: ImageData::Mask {
                bytes: raw.bytes,
                decode,
            },
            width,
            height,
            bits_per_component: 1,
            color_space: COLORSPACE_DEVICE_GRAY,
            matrix,
            compress,
            soft_mask: None,
        })
    }

    /// Decode a PNG; an alpha channel becomes a soft mask
    pub fn png(data: &[u8], matrix: [f64; 6], compress: bool) -> Result<Self> {
        let (raw, alpha, color_space) = decode_png(data)?;
        Self::raw(raw, alpha, color_space, matrix, compress)
    }

    pub fn data(&self) -> &ImageData {
        &self.data
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn bits_per_component(&self) -> u8 {
        self.bits_per_component
    }

    pub fn color_space(&self) -> u32 {
        self.color_space
    }

    pub fn compress(&self) -> bool {
        self.compress
    }

    pub fn soft_mask(&self) -> Option<&Image> {
        self.soft_mask.as_deref()
    }

    pub fn is_stencil(&self) -> bool {
        matches!(self.data, ImageData::Mask { .. })
    }

    /// Object ids this image takes: image and length, doubled with a mask
    pub fn slots(&self) -> u32 {
        if self.soft_mask.is_some() {
            4
        } else {
            2
        }
    }

    /// Content stream operators drawing the image as XObject `id`
    pub fn operators(&self, id: u32) -> String {
        format!("q\n{} cm\n/Im{id} Do\nQ\n", format_matrix(&self.matrix))
    }

    /// Dictionary entries preceding `/Length`, for the image stored as
    /// object `id`.
    ///
    /// `compression` is the filter of the compressor applied to the data and
    /// `color_space` the resolved reference of the image color space.
    pub fn dict_entries(&self, id: u32, compression: Option<&str>, color_space: &str) -> Vec<String> {
        let mut filters: Vec<String> = compression.map(|f| format!("/{f}")).into_iter().collect();
        if let ImageData::Jpeg(_) = self.data {
            filters.push("/DCTDecode".to_string());
        }

        let mut entries = vec![
            "/Type /XObject".to_string(),
            "/Subtype /Image".to_string(),
            format!("/Name /Im{id}"),
        ];
        if !filters.is_empty() {
            entries.push(format!("/Filter [ {} ]", filters.join(" ")));
        }
        entries.push(format!("/Width {}", self.width));
        entries.push(format!("/Height {}", self.height));
        entries.push(format!("/BitsPerComponent {}", self.bits_per_component));
        match &self.data {
            ImageData::Mask { decode, .. } => {
                entries.push("/ImageMask true".to_string());
                entries.push(format!("/Decode [ {} {} ]", decode[0], decode[1]));
            }
            _ => entries.push(format!("/ColorSpace {color_space}")),
        }
        if self.soft_mask.is_some() {
            // The mask follows this image and its length object
            entries.push(format!("/SMask {} 0 R", id + 2));
        }
        entries
    }
}

/// Decode PNG bytes into 8-bit samples, a separate alpha plane if the image
/// has one, and the matching device color space
pub(crate) fn decode_png(data: &[u8]) -> Result<(RawImage, Option<Vec<u8>>, u32)> {
    let reader = ImageReader::new(Cursor::new(data)).with_guessed_format()?;
    let decoder = reader.into_decoder()?;
    let (width, height) = decoder.dimensions();
    let color_type = decoder.color_type();
    let image = DynamicImage::from_decoder(decoder)?;

    let (bytes, alpha, channels, color_space) = match color_type {
        image::ColorType::L8 | image::ColorType::L16 => {
            (image.to_luma8().into_raw(), None, 1, COLORSPACE_DEVICE_GRAY)
        }
        image::ColorType::La8 | image::ColorType::La16 => {
            let la = image.to_luma_alpha8();
            let gray = la.pixels().map(|p| p[0]).collect::<Vec<u8>>();
            let alpha = la.pixels().map(|p| p[1]).collect::<Vec<u8>>();
            (gray, Some(alpha), 1, COLORSPACE_DEVICE_GRAY)
        }
        image::ColorType::Rgba8 | image::ColorType::Rgba16 => {
            let rgba = image.to_rgba8();
            let rgb = rgba.pixels().flat_map(|p| [p[0], p[1], p[2]]).collect::<Vec<u8>>();
            let alpha = rgba.pixels().map(|p| p[3]).collect::<Vec<u8>>();
            (rgb, Some(alpha), 3, COLORSPACE_DEVICE_RGB)
        }
        _ => (image.to_rgb8().into_raw(), None, 3, COLORSPACE_DEVICE_RGB),
    };

    let raw = RawImage {
        bytes,
        width,
        height,
        bits_per_component: 8,
        channels,
    };
    Ok((raw, alpha, color_space))
}
