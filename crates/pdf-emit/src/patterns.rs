//! Patterns, shadings and the functions that drive them

use crate::document::Document;
use crate::format::{format_number, format_numbers, matrix_entry};
use crate::resources::ResourceSet;
use crate::Result;

/// Geometry of a smooth shading
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ShadingKind {
    /// Between two points, `[ x0 y0 x1 y1 ]`
    Axial { coords: [f64; 4] },
    /// Between two circles, `[ x0 y0 r0 x1 y1 r1 ]`
    Radial { coords: [f64; 6] },
}

impl ShadingKind {
    fn shading_type(&self) -> u32 {
        match self {
            ShadingKind::Axial { .. } => 2,
            ShadingKind::Radial { .. } => 3,
        }
    }

    fn coords(&self) -> &[f64] {
        match self {
            ShadingKind::Axial { coords } => &coords[..],
            ShadingKind::Radial { coords } => &coords[..],
        }
    }
}

fn bool_token(b: bool) -> &'static str {
    if b {
        "true"
    } else {
        "false"
    }
}

impl Document {
    /// Tile an image resource.
    ///
    /// Each cell draws image `image_id` scaled to `size` and cells repeat
    /// every `step` units.
    pub fn add_texture_pattern(
        &mut self,
        image_id: u32,
        size: [f64; 2],
        step: [f64; 2],
        matrix: Option<[f64; 6]>,
        compress: bool,
    ) -> Result<u32> {
        let sx = format_number(size[0]);
        let sy = format_number(size[1]);
        let content = format!("q\n{sx} 0 0 {sy} 0 0 cm\n/Im{image_id} Do\nQ");

        let mut header = format!(
            "/Type /Pattern\n/PatternType 1\n/PaintType 1\n/TilingType 1\n/BBox [ 0 0 {sx} {sy} ]\n/XStep {}\n/YStep {}\n",
            format_number(step[0]),
            format_number(step[1])
        );
        if let Some(m) = matrix {
            header.push_str(&matrix_entry(Some(&m)));
            header.push('\n');
        }
        header.push_str(&format!(
            "/Resources << /XObject << /Im{image_id} {image_id} 0 R >> >>"
        ));
        self.add_custom_stream(content.as_bytes(), &header, compress)
    }

    /// Colored tiling pattern whose cell is drawn by `content` using
    /// `resources`
    pub fn add_tiling_pattern(
        &mut self,
        content: &[u8],
        resources: &ResourceSet,
        bbox: [f64; 4],
        step: [f64; 2],
        matrix: [f64; 6],
        compress: bool,
    ) -> Result<u32> {
        let header = format!(
            "/Type /Pattern\n/PatternType 1\n/PaintType 1\n/TilingType 2\n/BBox [ {} ]\n/XStep {}\n/YStep {}\n{}\n{}",
            format_numbers(&bbox),
            format_number(step[0]),
            format_number(step[1]),
            resources.to_dict(),
            matrix_entry(Some(&matrix))
        );
        self.add_custom_stream(content, &header, compress)
    }

    /// Exponential interpolation between `c0` and `c1` with exponent `n`
    pub fn add_interpolation_function(
        &mut self,
        c0: &[f64],
        c1: &[f64],
        n: f64,
        domain: [f64; 2],
    ) -> u32 {
        self.add_custom_object(format!(
            "<< /FunctionType 2\n   /Domain [ {} ]\n   /C0 [ {} ]\n   /C1 [ {} ]\n   /N {}\n>>",
            format_numbers(&domain),
            format_numbers(c0),
            format_numbers(c1),
            format_number(n)
        ))
    }

    /// Combine `functions` over subdomains split at `bounds`.
    ///
    /// `bounds` has one entry fewer than `functions`, `encode` two per
    /// function.
    pub fn add_stitching_function(
        &mut self,
        functions: &[u32],
        bounds: &[f64],
        encode: &[f64],
        domain: [f64; 2],
    ) -> u32 {
        let refs: String = functions.iter().map(|id| format!("{id} 0 R ")).collect();
        self.add_custom_object(format!(
            "<< /FunctionType 3\n   /Domain [ {} ]\n   /Functions [ {refs}]\n   /Bounds [ {} ]\n   /Encode [ {} ]\n>>",
            format_numbers(&domain),
            format_numbers(bounds),
            format_numbers(encode)
        ))
    }

    /// Axial or radial shading in `color_space`, colored by `function_id`
    /// over `domain`
    pub fn add_shading(
        &mut self,
        kind: ShadingKind,
        color_space: u32,
        domain: [f64; 2],
        function_id: u32,
        extend: [bool; 2],
    ) -> u32 {
        let contents = format!(
            "<< /ShadingType {}\n   /ColorSpace {}\n   /Function {function_id} 0 R\n   /Coords [ {} ]\n   /Domain [ {} ]\n   /Extend [ {} {} ]\n>>",
            kind.shading_type(),
            self.color_spaces().reference(color_space),
            format_numbers(kind.coords()),
            format_numbers(&domain),
            bool_token(extend[0]),
            bool_token(extend[1])
        );
        self.add_custom_object(contents)
    }

    pub fn add_shading_pattern(&mut self, shading_id: u32, matrix: [f64; 6]) -> u32 {
        self.add_custom_object(format!(
            "<< /Type /Pattern\n   /PatternType 2\n   {}\n   /Shading {shading_id} 0 R\n>>",
            matrix_entry(Some(&matrix))
        ))
    }

    /// Graphics state whose soft mask is the luminosity of a shading.
    ///
    /// Adds a transparency group form drawing `shading_id` over `bbox`,
    /// then the graphics state referring to it. Returns the graphics state.
    pub fn add_shading_soft_mask(
        &mut self,
        shading_id: u32,
        bbox: [f64; 4],
        matrix: [f64; 6],
    ) -> Result<u32> {
        let content = format!("/a{shading_id} gs /sh{shading_id} sh");
        let header = [
            "/Type /XObject".to_string(),
            "/Subtype /Form".to_string(),
            "/FormType 1".to_string(),
            format!("/BBox [ {} ]", format_numbers(&bbox)),
            matrix_entry(Some(&matrix)),
            format!("/Resources << /ExtGState << /a{shading_id} << /ca 1 /CA 1 >> >>"),
            format!("                 /Shading << /sh{shading_id} {shading_id} 0 R >>"),
            ">>".to_string(),
            "/Group << /Type /Group /S /Transparency /I true /CS /DeviceGray >>".to_string(),
        ]
        .join("\n");
        let form = self.add_custom_stream(content.as_bytes(), &header, false)?;

        Ok(self.add_custom_object(format!(
            "<< /Type /ExtGState\n   /SMask << /Type /Mask /S /Luminosity /G {form} 0 R >>\n   /ca 1\n   /CA 1\n   /AIS false\n>>"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::COLORSPACE_DEVICE_RGB;
    use crate::options::WriterOptions;
    use pretty_assertions::assert_eq;

    fn uncompressed() -> Document {
        Document::with_options(WriterOptions {
            compress: false,
            ..WriterOptions::default()
        })
    }

    fn object(doc: &Document, id: u32) -> String {
        let out = String::from_utf8_lossy(&doc.to_bytes().unwrap()).into_owned();
        let start = out.find(&format!("\n{id} 0 obj\n")).unwrap() + 1;
        let end = start + out[start..].find("endobj\n").unwrap();
        out[start..end].to_string()
    }

    #[test]
    fn test_interpolation_function() {
        let mut doc = uncompressed();
        let id = doc.add_interpolation_function(&[1.0, 0.0, 0.0], &[0.0, 0.0, 1.0], 1.0, [0.0, 1.0]);
        assert_eq!(
            object(&doc, id),
            "6 0 obj\n<< /FunctionType 2\n   /Domain [ 0 1 ]\n   /C0 [ 1 0 0 ]\n   /C1 [ 0 0 1 ]\n   /N 1\n>>\n"
        );
    }

    #[test]
    fn test_stitching_function() {
        let mut doc = uncompressed();
        let a = doc.add_interpolation_function(&[0.0], &[1.0], 1.0, [0.0, 1.0]);
        let b = doc.add_interpolation_function(&[1.0], &[0.0], 1.0, [0.0, 1.0]);
        let id = doc.add_stitching_function(&[a, b], &[0.5], &[0.0, 1.0, 0.0, 1.0], [0.0, 1.0]);
        assert_eq!(
            object(&doc, id),
            "8 0 obj\n<< /FunctionType 3\n   /Domain [ 0 1 ]\n   /Functions [ 6 0 R 7 0 R ]\n   /Bounds [ 0.5 ]\n   /Encode [ 0 1 0 1 ]\n>>\n"
        );
    }

    #[test]
    fn test_radial_shading_and_pattern() {
        let mut doc = uncompressed();
        let f = doc.add_interpolation_function(&[0.0], &[1.0], 1.0, [0.0, 1.0]);
        let sh = doc.add_shading(
            ShadingKind::Radial {
                coords: [50.0, 50.0, 0.0, 50.0, 50.0, 40.0],
            },
            COLORSPACE_DEVICE_RGB,
            [0.0, 1.0],
            f,
            [false, true],
        );
        let pattern = doc.add_shading_pattern(sh, [1.0, 0.0, 0.0, 1.0, 10.0, 20.0]);
        assert_eq!(
            object(&doc, sh),
            "7 0 obj\n<< /ShadingType 3\n   /ColorSpace /DeviceRGB\n   /Function 6 0 R\n   /Coords [ 50 50 0 50 50 40 ]\n   /Domain [ 0 1 ]\n   /Extend [ false true ]\n>>\n"
        );
        assert_eq!(
            object(&doc, pattern),
            "8 0 obj\n<< /Type /Pattern\n   /PatternType 2\n   /Matrix [ 1 0 0 1 10 20 ]\n   /Shading 7 0 R\n>>\n"
        );
    }

    #[test]
    fn test_texture_pattern_stream() {
        let mut doc = uncompressed();
        let id = doc
            .add_texture_pattern(12, [20.0, 10.0], [25.0, 15.0], None, true)
            .unwrap();
        assert_eq!(
            object(&doc, id),
            "6 0 obj\n<< /Type /Pattern\n   /PatternType 1\n   /PaintType 1\n   /TilingType 1\n   /BBox [ 0 0 20 10 ]\n   /XStep 25\n   /YStep 15\n   /Resources << /XObject << /Im12 12 0 R >> >>\n   /Length 29\n>>\nstream\nq\n20 0 0 10 0 0 cm\n/Im12 Do\nQ\nendstream\n"
        );
    }

    #[test]
    fn test_tiling_pattern_resources() {
        let mut doc = uncompressed();
        let mut resources = ResourceSet::new();
        resources.add_font(6);
        let id = doc
            .add_tiling_pattern(
                b"BT /F6 8 Tf (x) Tj ET",
                &resources,
                [0.0, 0.0, 10.0, 10.0],
                [10.0, 10.0],
                [1.0, 0.0, 0.0, 1.0, 0.0, 0.0],
                false,
            )
            .unwrap();
        let obj = object(&doc, id);
        assert!(obj.contains("   /TilingType 2\n   /BBox [ 0 0 10 10 ]\n"));
        assert!(obj.contains("   /Resources <<\n                 /Font <<\n"));
        assert!(obj.contains("   /Matrix [ 1 0 0 1 0 0 ]\n   /Length 21\n"));
    }

    #[test]
    fn test_shading_soft_mask() {
        let mut doc = uncompressed();
        let gs = doc
            .add_shading_soft_mask(9, [0.0, 0.0, 100.0, 100.0], [1.0, 0.0, 0.0, 1.0, 0.0, 0.0])
            .unwrap();
        assert_eq!(gs, 7);
        let form = object(&doc, 6);
        assert!(form.contains("/Subtype /Form\n"));
        assert!(form.contains("\n                 /Shading << /sh9 9 0 R >>\n   >>\n"));
        assert!(form.contains("stream\n/a9 gs /sh9 sh\nendstream"));
        assert_eq!(
            object(&doc, gs),
            "7 0 obj\n<< /Type /ExtGState\n   /SMask << /Type /Mask /S /Luminosity /G 6 0 R >>\n   /ca 1\n   /CA 1\n   /AIS false\n>>\n"
        );
    }
}
