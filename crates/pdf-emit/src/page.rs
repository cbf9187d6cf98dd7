//! Pages and their content

use crate::allocator::PageSlots;
use crate::color::{
    color_space_ref, ColorSpaceKind, ColorSpaces, COLORSPACE_DEVICE_GRAY, COLORSPACE_DEVICE_RGB,
    FIRST_CUSTOM_COLORSPACE,
};
use crate::compress::{Compressor, Identity};
use crate::format::{escape_string, format_matrix, format_numbers};
use crate::groups::Group;
use crate::image::{Image, ImageData, RawImage};
use crate::resources::{render_entries, ResourceCategory, ResourceSet};
use crate::stream::{filter_entry, StreamSource};
use crate::text::{Text, TextState};
use crate::writer::ObjectWriter;
use crate::Result;
use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};

/// One entry of a page's content, in drawing order
#[derive(Debug, Clone, PartialEq)]
pub enum PageObject {
    /// Raw content stream operators, written as given
    Command(String),
    Text(Text),
    Image(Image),
}

/// Document data a page needs while it is written
#[derive(Debug, Clone, Copy)]
pub struct PageContext<'a> {
    pub color_spaces: &'a ColorSpaces,
    /// Color space of each document-level image, by object id
    pub image_color_spaces: &'a BTreeMap<u32, u32>,
    /// Used for images that ask for compression
    pub compressor: &'a dyn Compressor,
    /// Compress the content stream with `compressor`
    pub compress_content: bool,
}

impl PageContext<'_> {
    fn image_color_space(&self, id: u32) -> u32 {
        self.image_color_spaces
            .get(&id)
            .copied()
            .unwrap_or(COLORSPACE_DEVICE_RGB)
    }
}

#[derive(Debug, Default, Clone, Copy)]
struct ImageClasses {
    color: bool,
    gray: bool,
    indexed: bool,
}

impl ImageClasses {
    fn add(&mut self, color_space: u32, spaces: &ColorSpaces) {
        let Some(props) = spaces.get(color_space) else {
            // Unregistered ids are object references to color spaces
            self.color = true;
            return;
        };
        match props.kind {
            ColorSpaceKind::Device if color_space == COLORSPACE_DEVICE_GRAY => self.gray = true,
            ColorSpaceKind::Device | ColorSpaceKind::CalRgb => self.color = true,
            ColorSpaceKind::IccBased if props.channels == 1 => self.gray = true,
            ColorSpaceKind::IccBased => self.color = true,
            ColorSpaceKind::CalGray => self.gray = true,
            ColorSpaceKind::Indexed => self.indexed = true,
            ColorSpaceKind::Pattern | ColorSpaceKind::Separation => {}
        }
    }
}

/// A page under construction.
///
/// Pages are built standalone and handed to [`crate::Document::push_page`],
/// which numbers them. Object ids are only assigned when the document is
/// written.
#[derive(Debug, Clone)]
pub struct Page {
    number: u32,
    label: Option<String>,
    mediabox: [f64; 4],
    objects: Vec<PageObject>,
    resources: ResourceSet,
    custom_resources: Vec<String>,
    groups: Vec<Group>,
    marked_content_level: u32,
    text_state: TextState,
    has_text: bool,
    has_commands: bool,
}

impl Default for Page {
    fn default() -> Self {
        Self::new()
    }
}

impl Page {
    /// Empty US Letter page
    pub fn new() -> Self {
        Self {
            number: 0,
            label: None,
            mediabox: [0.0, 0.0, 612.0, 792.0],
            objects: Vec::new(),
            resources: ResourceSet::new(),
            custom_resources: Vec::new(),
            groups: Vec::new(),
            marked_content_level: 0,
            text_state: TextState::default(),
            has_text: false,
            has_commands: false,
        }
    }

    /// 1-based position in the document, 0 until the page is attached
    pub fn number(&self) -> u32 {
        self.number
    }

    pub(crate) fn set_number(&mut self, number: u32) {
        self.number = number;
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Label prefix shown instead of the page number
    pub fn set_label(&mut self, label: &str) {
        self.label = Some(label.to_string());
    }

    pub fn mediabox(&self) -> [f64; 4] {
        self.mediabox
    }

    pub fn set_mediabox(&mut self, x0: f64, y0: f64, x1: f64, y1: f64) {
        self.mediabox = [x0, y0, x1, y1];
    }

    pub fn objects(&self) -> &[PageObject] {
        &self.objects
    }

    pub fn resources(&self) -> &ResourceSet {
        &self.resources
    }

    /// Groups introduced by this page, in first-use order
    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    /// Images drawn on the page, in drawing order
    pub fn images(&self) -> impl Iterator<Item = &Image> {
        self.objects.iter().filter_map(|o| match o {
            PageObject::Image(img) => Some(img),
            _ => None,
        })
    }

    /// Object ids the page takes: dictionary, content, content length,
    /// its images and its groups
    pub fn slots(&self) -> u32 {
        3 + self.images().map(Image::slots).sum::<u32>() + self.groups.len() as u32
    }

    /// Append raw content stream operators
    pub fn add_command(&mut self, command: &str) {
        self.objects.push(PageObject::Command(command.to_string()));
        self.has_commands = true;
    }

    /// Extra `/Key value` entry for the resource dictionary
    pub fn add_custom_resource(&mut self, resource: &str) {
        self.custom_resources.push(resource.to_string());
    }

    pub fn text_state(&self) -> &TextState {
        &self.text_state
    }

    pub fn set_text_state(&mut self, state: TextState) {
        let ops = state.operators();
        self.add_command(&ops);
        if let Some((font_id, _)) = state.font {
            self.resources.add_font(font_id);
        }
        self.text_state = state;
    }

    /// Show `text` at `(x, y)` in font `font_id` at `size` points
    pub fn add_text(&mut self, font_id: u32, size: f64, x: f64, y: f64, text: &str) {
        let state = TextState {
            font: Some((font_id, size)),
            ..self.text_state.clone()
        };
        self.set_text_state(state);
        self.push_text(Text::at(x, y, &[text]));
    }

    /// Show several lines at `(x, y)` with the current text state, moving
    /// down by the leading between lines
    pub fn add_text_lines<L: AsRef<[u8]>>(&mut self, x: f64, y: f64, lines: &[L]) {
        self.push_text(Text::at(x, y, lines));
    }

    /// Show lines placed by a text matrix with the current text state
    pub fn add_text_with_matrix<L: AsRef<[u8]>>(&mut self, matrix: [f64; 6], lines: &[L]) {
        self.push_text(Text::with_matrix(matrix, lines));
    }

    /// Add a prepared text block, e.g. a [`Text::mapped`] one
    pub fn push_text(&mut self, text: Text) {
        self.objects.push(PageObject::Text(text));
        self.has_text = true;
    }

    /// Draw an image. A soft mask travels with its image.
    pub fn add_image(&mut self, image: Image) {
        self.objects.push(PageObject::Image(image));
    }

    /// Draw a JPEG file of known size; it is read when the page is written
    pub fn add_jpeg_image(
        &mut self,
        path: impl Into<PathBuf>,
        width: u32,
        height: u32,
        color_space: u32,
        matrix: [f64; 6],
    ) {
        self.add_image(Image::jpeg(path, width, height, color_space, matrix));
    }

    /// Draw a JPEG file, taking its size and color space from its header
    pub fn add_jpeg_file(&mut self, path: impl AsRef<Path>, matrix: [f64; 6]) -> Result<()> {
        self.add_image(Image::jpeg_file(path, matrix)?);
        Ok(())
    }

    /// Draw raw samples, optionally with a soft mask of the same size
    pub fn add_image_bytes(
        &mut self,
        image: RawImage,
        soft_mask: Option<Vec<u8>>,
        color_space: u32,
        matrix: [f64; 6],
        compress: bool,
    ) -> Result<()> {
        self.add_image(Image::raw(image, soft_mask, color_space, matrix, compress)?);
        Ok(())
    }

    /// Paint the current fill color through a 1-bit stencil
    pub fn add_image_mask(
        &mut self,
        bytes: Vec<u8>,
        width: u32,
        height: u32,
        decode: [u32; 2],
        matrix: [f64; 6],
        compress: bool,
    ) -> Result<()> {
        self.add_image(Image::mask(bytes, width, height, decode, matrix, compress)?);
        Ok(())
    }

    pub fn add_png_image(&mut self, data: &[u8], matrix: [f64; 6], compress: bool) -> Result<()> {
        self.add_image(Image::png(data, matrix, compress)?);
        Ok(())
    }

    /// Draw a document-level image resource with `matrix`
    pub fn draw_image_resource(&mut self, image_id: u32, matrix: [f64; 6]) {
        self.resources.add_image(image_id);
        self.add_command(&format!(
            "q\n{} cm\n/Im{image_id} Do\nQ\n",
            format_matrix(&matrix)
        ));
    }

    pub fn set_colorspace(&mut self, stroking: bool, color_space: u32) {
        let name = if color_space < FIRST_CUSTOM_COLORSPACE {
            color_space_ref(color_space)
        } else {
            self.resources.add_color_space(color_space);
            format!("/CS{color_space}")
        };
        let op = if stroking { "CS" } else { "cs" };
        self.add_command(&format!("{name} {op}\n"));
    }

    /// Set the color in the current color space; one component per channel
    pub fn set_color(&mut self, stroking: bool, components: &[f64]) {
        let op = if stroking { "SCN" } else { "scn" };
        self.add_command(&format!("{} {op}\n", format_numbers(components)));
    }

    pub fn set_color_gray(&mut self, stroking: bool, gray: f64) {
        self.set_color(stroking, &[gray]);
    }

    pub fn set_color_rgb(&mut self, stroking: bool, r: f64, g: f64, b: f64) {
        self.set_color(stroking, &[r, g, b]);
    }

    pub fn set_color_cmyk(&mut self, stroking: bool, c: f64, m: f64, y: f64, k: f64) {
        self.set_color(stroking, &[c, m, y, k]);
    }

    pub fn set_pattern(&mut self, stroking: bool, pattern_id: u32) {
        self.resources.add_pattern(pattern_id);
        let op = if stroking { "CS" } else { "cs" };
        self.add_command(&format!("/Pattern {op}\n/Pt{pattern_id} scn\n"));
    }

    pub fn set_graphics_state(&mut self, state_id: u32) {
        self.resources.add_graphics_state(state_id);
        self.add_command(&format!("/s{state_id} gs\n"));
    }

    /// Paint a shading over the current clip
    pub fn draw_shading(&mut self, shading_id: u32) {
        self.resources.add_shading(shading_id);
        self.add_command(&format!("/sh{shading_id} sh\n"));
    }

    /// Open marked content tied to the group `name`.
    ///
    /// The group is created on first use on this page at the current
    /// nesting level plus one, but never more than one level below the
    /// last group recorded on the page. Reusing a name on the same page
    /// refers to the existing group.
    pub fn start_marked_content(&mut self, name: &str) {
        self.marked_content_level += 1;
        let internal = match self.groups.iter().find(|g| g.name() == name) {
            Some(group) => group.internal_name().to_string(),
            None => {
                let ceiling = self.groups.last().map_or(1, |g| g.level() + 1);
                let group = Group::new(name, self.marked_content_level.min(ceiling));
                let internal = group.internal_name().to_string();
                self.groups.push(group);
                internal
            }
        };
        self.add_command(&format!("/OC /{internal} BDC\n"));
    }

    pub fn end_marked_content(&mut self) {
        self.marked_content_level = self.marked_content_level.saturating_sub(1);
        self.add_command("EMC\n");
    }

    /// Content stream bytes, with images referenced by their allocated ids
    pub fn content(&self, slots: &PageSlots) -> Vec<u8> {
        let mut out = Vec::new();
        let mut images = slots.images.iter();
        for object in &self.objects {
            match object {
                PageObject::Command(cmd) => out.extend_from_slice(cmd.as_bytes()),
                PageObject::Text(text) => out.extend_from_slice(&text.contents()),
                PageObject::Image(img) => {
                    if let Some(ids) = images.next() {
                        out.extend_from_slice(img.operators(ids.image).as_bytes());
                    }
                }
            }
        }
        out
    }

    fn proc_set(&self, ctx: &PageContext<'_>) -> String {
        let mut classes = ImageClasses::default();
        for img in self.images() {
            if img.is_stencil() {
                classes.gray = true;
            } else {
                classes.add(img.color_space(), ctx.color_spaces);
            }
            if let Some(mask) = img.soft_mask() {
                classes.add(mask.color_space(), ctx.color_spaces);
            }
        }
        for &id in self.resources.get(ResourceCategory::XObject) {
            classes.add(ctx.image_color_space(id), ctx.color_spaces);
        }

        let mut set = String::from("[ ");
        for (present, name) in [
            (self.has_commands, "/PDF "),
            (self.has_text, "/Text "),
            (classes.color, "/ImageC "),
            (classes.gray, "/ImageB "),
            (classes.indexed, "/ImageI "),
        ] {
            if present {
                set.push_str(name);
            }
        }
        set.push(']');
        set
    }

    /// Page dictionary body for the given slots
    pub fn dictionary(&self, slots: &PageSlots, ctx: &PageContext<'_>) -> String {
        let mut s = format!(
            "<< /Type /Page\n   /Parent 3 0 R\n   /MediaBox [ {} ]\n   /Contents {} 0 R\n   /Resources\n   << /ProcSet {}\n",
            format_numbers(&self.mediabox),
            slots.contents,
            self.proc_set(ctx)
        );

        if !self.groups.is_empty() {
            s.push_str("      /Properties <<\n");
            for (group, id) in self.groups.iter().zip(&slots.groups) {
                s.push_str(&format!(
                    "                     /{} {id} 0 R\n",
                    group.internal_name()
                ));
            }
            s.push_str("                  >>\n");
        }

        let mut xobjects: Vec<u32> = slots.images.iter().map(|i| i.image).collect();
        for &id in self.resources.get(ResourceCategory::XObject) {
            if !xobjects.contains(&id) {
                xobjects.push(id);
            }
        }
        s.push_str(&render_entries(ResourceCategory::XObject, &xobjects, 6));

        for category in [
            ResourceCategory::ColorSpace,
            ResourceCategory::Font,
            ResourceCategory::Pattern,
            ResourceCategory::ExtGState,
            ResourceCategory::Shading,
        ] {
            s.push_str(&self.resources.render(category, 6));
        }
        for custom in &self.custom_resources {
            s.push_str(&format!("      {custom}\n"));
        }
        s.push_str("   >>\n>>");
        s
    }

    /// Write the page dictionary, its content stream and length, its images
    /// and its group objects, using the ids in `slots`
    pub fn write<W: Write>(
        &self,
        writer: &mut ObjectWriter<W>,
        slots: &PageSlots,
        ctx: &PageContext<'_>,
    ) -> Result<()> {
        writer.write_object(slots.page, self.dictionary(slots, ctx).as_bytes())?;

        let content = self.content(slots);
        let content_compressor: &dyn Compressor = if ctx.compress_content {
            ctx.compressor
        } else {
            &Identity
        };
        let entries: Vec<String> = filter_entry(content_compressor).into_iter().collect();
        writer.write_deferred_stream(
            slots.contents,
            &entries,
            StreamSource::Bytes(&content),
            content_compressor,
        )?;

        for (img, ids) in self.images().zip(&slots.images) {
            write_image(writer, img, ids.image, ctx)?;
            if let (Some(mask), Some(mask_id)) = (img.soft_mask(), ids.mask) {
                write_image(writer, mask, mask_id, ctx)?;
            }
        }

        for (group, &id) in self.groups.iter().zip(&slots.groups) {
            let body = format!(
                "<< /Name ({})\n   /Type /OCG\n>>",
                escape_string(group.name())
            );
            writer.write_object(id, body.as_bytes())?;
        }
        Ok(())
    }
}

fn write_image<W: Write>(
    writer: &mut ObjectWriter<W>,
    img: &Image,
    id: u32,
    ctx: &PageContext<'_>,
) -> Result<u64> {
    let compressor: &dyn Compressor = if img.compress() {
        ctx.compressor
    } else {
        &Identity
    };
    let entries = img.dict_entries(
        id,
        compressor.filter(),
        &ctx.color_spaces.reference(img.color_space()),
    );
    let source = match img.data() {
        ImageData::Jpeg(path) => StreamSource::File(path),
        ImageData::Raw(bytes) | ImageData::Mask { bytes, .. } => StreamSource::Bytes(bytes),
    };
    writer.write_deferred_stream(id, &entries, source, compressor)
}
