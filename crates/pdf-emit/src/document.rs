//! Document model and assembler

use crate::allocator::{
    allocate, Allocation, CATALOG_ID, FIRST_BODY_ID, INFO_ID, OUTLINES_ID, PAGE_LABELS_ID,
    PAGE_TREE_ID,
};
use crate::body::{BodyObject, SourceStream};
use crate::color::{ColorProfile, ColorSpaceKind, ColorSpaces, ProfileKind, COLORSPACE_DEVICE_GRAY};
use crate::compress::{Compressor, Flate, Identity};
use crate::font::{cid_to_gid_map, font_descriptor, simple_widths_array, Font, FontKind, FontMetrics, FontProgram};
use crate::format::escape_string;
use crate::graphics_state::GraphicsState;
use crate::groups::render_order;
use crate::image::RawImage;
use crate::info::Info;
use crate::options::WriterOptions;
use crate::page::{Page, PageContext};
use crate::stream::known_length_stream;
use crate::widths::{compress_widths, render_width_array, WidthTable};
use crate::writer::ObjectWriter;
use crate::Result;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, instrument};

/// An in-memory document.
///
/// Body objects (fonts, color spaces, custom objects) get their ids as soon
/// as they are added, so pages can refer to them. Page ids are assigned when
/// the document is written.
#[derive(Debug)]
pub struct Document {
    pages: Vec<Page>,
    body: Vec<BodyObject>,
    comments: Vec<String>,
    info: Info,
    color_spaces: ColorSpaces,
    /// Color space of each document-level image
    image_color_spaces: BTreeMap<u32, u32>,
    standard_fonts: BTreeMap<String, u32>,
    custom_page_kids: Vec<u32>,
    options: WriterOptions,
    compressor: Box<dyn Compressor>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Empty document with default options and Flate compression
    pub fn new() -> Self {
        Self::with_options(WriterOptions::default())
    }

    pub fn with_options(options: WriterOptions) -> Self {
        Self::with_compressor(options, Box::new(Flate::default()))
    }

    /// Use `compressor` for every stream that asks for compression
    pub fn with_compressor(options: WriterOptions, compressor: Box<dyn Compressor>) -> Self {
        Self {
            pages: Vec::new(),
            body: Vec::new(),
            comments: Vec::new(),
            info: Info::new(),
            color_spaces: ColorSpaces::new(),
            image_color_spaces: BTreeMap::new(),
            standard_fonts: BTreeMap::new(),
            custom_page_kids: Vec::new(),
            options,
            compressor,
        }
    }

    pub fn options(&self) -> &WriterOptions {
        &self.options
    }

    /// Attach a page and return its 1-based number
    pub fn push_page(&mut self, mut page: Page) -> u32 {
        let number = self.pages.len() as u32 + 1;
        page.set_number(number);
        self.pages.push(page);
        number
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    /// Page by its 1-based number
    pub fn page_mut(&mut self, number: u32) -> Option<&mut Page> {
        let index = number.checked_sub(1)? as usize;
        self.pages.get_mut(index)
    }

    pub fn body(&self) -> &[BodyObject] {
        &self.body
    }

    /// Add a `% comment` line after the file header
    pub fn add_comment(&mut self, comment: &str) {
        self.comments.push(comment.to_string());
    }

    pub fn info(&self) -> &Info {
        &self.info
    }

    pub fn info_mut(&mut self) -> &mut Info {
        &mut self.info
    }

    pub fn color_spaces(&self) -> &ColorSpaces {
        &self.color_spaces
    }

    /// Id the next body object will get
    fn next_body_id(&self) -> u32 {
        FIRST_BODY_ID + self.body.iter().map(BodyObject::slots).sum::<u32>()
    }

    fn push_body(&mut self, object: BodyObject) -> u32 {
        let id = self.next_body_id();
        self.body.push(object);
        id
    }

    /// Compressor for streams that ask for compression
    fn stream_compressor(&self) -> &dyn Compressor {
        if self.options.compress {
            self.compressor.as_ref()
        } else {
            &Identity
        }
    }

    /// Add an object written verbatim between `N 0 obj` and `endobj`
    pub fn add_custom_object(&mut self, contents: impl Into<Vec<u8>>) -> u32 {
        self.push_body(BodyObject::Custom(contents.into()))
    }

    /// Add a stream with its data in memory.
    ///
    /// # Arguments
    /// * `data` - Stream payload before compression
    /// * `extra_header` - Dictionary lines written before `/Length`
    /// * `compress` - Compress the payload if the document allows it
    pub fn add_custom_stream(&mut self, data: &[u8], extra_header: &str, compress: bool) -> Result<u32> {
        let compressor: &dyn Compressor = if compress {
            self.stream_compressor()
        } else {
            &Identity
        };
        let object = known_length_stream(data, extra_header, compressor)?;
        Ok(self.add_custom_object(object))
    }

    /// Add a stream read from `path` when the document is written. Takes
    /// two ids, the stream and its length; returns the first.
    pub fn add_custom_stream_from_file(
        &mut self,
        path: impl Into<PathBuf>,
        extra_header: &str,
        compress: bool,
    ) -> u32 {
        self.push_body(BodyObject::SourceStream(SourceStream {
            path: path.into(),
            extra_header: extra_header.to_string(),
            compress,
        }))
    }

    /// List object `id` as an extra kid of the page tree
    pub fn add_custom_page_tree_kid(&mut self, id: u32) {
        self.custom_page_kids.push(id);
    }

    /// Add one of the 14 standard fonts. Adding the same name twice returns
    /// the first id.
    pub fn add_standard_type1_font(&mut self, name: &str) -> u32 {
        if let Some(&id) = self.standard_fonts.get(name) {
            return id;
        }
        let id = self.push_body(BodyObject::Font(Font::standard_type1(name)));
        self.standard_fonts.insert(name.to_string(), id);
        id
    }

    /// Font program object for `metrics`, if it has one
    fn add_font_program(&mut self, metrics: &dyn FontMetrics) -> Result<Option<u32>> {
        let id = match metrics.program() {
            FontProgram::File(path) => Some(self.add_custom_stream_from_file(path, "", true)),
            FontProgram::Bytes(bytes) => {
                Some(self.add_custom_stream(&bytes, &format!("/Length1 {}", bytes.len()), true)?)
            }
            FontProgram::None => None,
        };
        Ok(id)
    }

    /// Add a simple TrueType font: widths array, font program when
    /// `embed` is set, descriptor and font dictionary. Returns the font id.
    pub fn add_truetype_font(&mut self, metrics: &dyn FontMetrics, embed: bool) -> Result<u32> {
        let widths = self.add_custom_object(simple_widths_array(metrics, self.options.wrap_columns));
        let program = if embed {
            self.add_font_program(metrics)?
        } else {
            None
        };
        let descriptor =
            self.add_custom_object(font_descriptor(FontKind::TrueType, metrics, program)?);
        let id = self.push_body(BodyObject::Font(Font::true_type(metrics, widths, descriptor)));
        debug!(id, name = metrics.font_name(), "added TrueType font");
        Ok(id)
    }

    /// Add a CIDFontType2 font for use under a Type0 font.
    ///
    /// Writes the `/W` array, the font program when `embed` is set, the
    /// descriptor and a CIDToGIDMap stream. Returns the font id and its
    /// base font name, ready for [`Document::add_type0_font`].
    pub fn add_type2_cid_font(
        &mut self,
        metrics: &dyn FontMetrics,
        embed: bool,
        name: &str,
    ) -> Result<(u32, String)> {
        let runs = compress_widths(&WidthTable::from_metrics(metrics));
        let widths = self.add_custom_object(render_width_array(&runs, self.options.wrap_columns));
        let program = if embed {
            self.add_font_program(metrics)?
        } else {
            None
        };
        let descriptor =
            self.add_custom_object(font_descriptor(FontKind::CidType2, metrics, program)?);
        let map = self.add_custom_stream(&cid_to_gid_map(metrics), "", true)?;
        let id = self.push_body(BodyObject::Font(Font::cid_type2(
            name,
            widths,
            descriptor,
            Some(map),
        )));
        debug!(id, name, runs = runs.len(), "added CID font");
        Ok((id, name.to_string()))
    }

    /// Add a Type0 font with `Identity-H` encoding over a CID font
    pub fn add_type0_font(&mut self, descendant: (u32, String)) -> u32 {
        let (id, name) = descendant;
        self.add_custom_object(format!(
            "<< /Type /Font\n   /Subtype /Type0\n   /BaseFont /{name}\n   /Encoding /Identity-H\n   /DescendantFonts [{id} 0 R]\n>>"
        ))
    }

    /// Add a color space array and register it with `channels` components
    pub fn add_color_profile(&mut self, profile: ColorProfile, channels: u32) -> u32 {
        let kind = match profile.kind() {
            ProfileKind::Icc => ColorSpaceKind::IccBased,
            ProfileKind::CalRgb => ColorSpaceKind::CalRgb,
            ProfileKind::CalGray => ColorSpaceKind::CalGray,
            ProfileKind::Indexed => ColorSpaceKind::Indexed,
            ProfileKind::Separation => ColorSpaceKind::Separation,
        };
        let id = self.push_body(BodyObject::ColorProfile(profile));
        self.color_spaces.register(id, kind, channels);
        id
    }

    /// ICC profile read from `path` when the document is written
    pub fn add_icc_color_profile_from_file(&mut self, path: impl Into<PathBuf>, channels: u32) -> u32 {
        let stream = self.add_custom_stream_from_file(path, &format!("/N {channels}"), true);
        self.add_color_profile(ColorProfile::icc(stream), channels)
    }

    pub fn add_icc_color_profile(&mut self, profile: &[u8], channels: u32) -> Result<u32> {
        let stream = self.add_custom_stream(profile, &format!("/N {channels}"), true)?;
        Ok(self.add_color_profile(ColorProfile::icc(stream), channels))
    }

    pub fn add_calrgb_color_profile(
        &mut self,
        white_point: [f64; 3],
        black_point: Option<[f64; 3]>,
        gamma: Option<[f64; 3]>,
        matrix: Option<[f64; 9]>,
    ) -> Result<u32> {
        let profile =
            ColorProfile::calibrated(ProfileKind::CalRgb, white_point, black_point, gamma, matrix)?;
        Ok(self.add_color_profile(profile, 3))
    }

    pub fn add_calgray_color_profile(
        &mut self,
        white_point: [f64; 3],
        black_point: Option<[f64; 3]>,
        gamma: Option<f64>,
    ) -> Result<u32> {
        let profile = ColorProfile::calibrated(
            ProfileKind::CalGray,
            white_point,
            black_point,
            gamma.map(|g| [g; 3]),
            None,
        )?;
        Ok(self.add_color_profile(profile, 1))
    }

    /// Indexed space over `base`; each color is given in the components of
    /// the base space
    pub fn add_indexed_color_profile(&mut self, base: u32, colors: &[Vec<u8>]) -> u32 {
        let base_channels = self
            .color_spaces
            .get(base)
            .map(|p| p.channels as usize)
            .unwrap_or(3);
        self.add_color_profile(ColorProfile::indexed(base, colors, base_channels), 1)
    }

    pub fn add_separation_color_space(&mut self, name: &str, alternate: u32, function_id: u32) -> u32 {
        self.add_color_profile(ColorProfile::separation(name, alternate, function_id), 1)
    }

    pub fn add_graphics_state(&mut self, state: GraphicsState) -> u32 {
        self.push_body(BodyObject::GraphicsState(state))
    }

    /// Add an image XObject usable from any page with
    /// [`Page::draw_image_resource`] or from patterns.
    ///
    /// A soft mask is added first, as an 8-bit gray image of the same size.
    pub fn add_image_resource(
        &mut self,
        image: RawImage,
        soft_mask: Option<Vec<u8>>,
        color_space: u32,
        compress: bool,
    ) -> Result<u32> {
        let image = image.validated()?;
        let mask_id = match soft_mask {
            Some(bytes) => {
                let mask = RawImage {
                    bytes,
                    width: image.width,
                    height: image.height,
                    bits_per_component: 8,
                    channels: 1,
                };
                Some(self.add_image_resource(mask, None, COLORSPACE_DEVICE_GRAY, compress)?)
            }
            None => None,
        };

        let mut header = format!(
            "/Type /XObject\n/Subtype /Image\n/Width {}\n/Height {}\n/BitsPerComponent {}\n/ColorSpace {}",
            image.width,
            image.height,
            image.bits_per_component,
            self.color_spaces.reference(color_space)
        );
        if let Some(mask_id) = mask_id {
            header.push_str(&format!("\n/SMask {mask_id} 0 R"));
        }
        let id = self.add_custom_stream(&image.bytes, &header, compress)?;
        self.image_color_spaces.insert(id, color_space);
        Ok(id)
    }

    fn catalog(&self, alloc: &Allocation) -> Result<String> {
        let mut s = String::from(
            "<< /Type /Catalog\n   /Outlines 2 0 R\n   /Pages 3 0 R\n   /PageLabels 4 0 R\n",
        );
        if !alloc.groups.is_empty() {
            s.push_str("   /OCProperties << /OCGs [ ");
            for (_, id) in &alloc.groups {
                s.push_str(&format!("{id} 0 R "));
            }
            s.push_str("]\n                    /D << /Name (Default)\n                          /Order");
            s.push_str(&render_order(&alloc.groups)?);
            s.push_str("\n                          /BaseState /ON\n                       >>\n                 >>\n");
        }
        s.push_str(">>");
        Ok(s)
    }

    fn page_tree(&self, alloc: &Allocation) -> String {
        let mut s = String::from("<< /Type /Pages\n   /Kids [\n");
        let kids = alloc.pages.iter().map(|p| p.page).chain(self.custom_page_kids.iter().copied());
        for id in kids {
            s.push_str(&format!("           {id} 0 R\n"));
        }
        s.push_str(&format!(
            "         ]\n   /Count {}\n>>",
            self.pages.len() + self.custom_page_kids.len()
        ));
        s
    }

    fn page_labels(&self) -> String {
        let mut s = String::from("<< /Nums [\n");
        for (index, page) in self.pages.iter().enumerate() {
            match page.label().filter(|l| !l.is_empty()) {
                Some(label) => {
                    s.push_str(&format!("           {index} << /P ({}) >>\n", escape_string(label)))
                }
                None => s.push_str(&format!("           {index} << /S /D >>\n")),
            }
        }
        s.push_str("         ]\n>>");
        s
    }

    fn info_contents(&self) -> String {
        match &self.options.producer {
            Some(producer) => Info {
                producer: Some(producer.clone()),
                ..self.info.clone()
            }
            .contents(),
            None => self.info.contents(),
        }
    }

    /// Write the whole document to `out` and return the sink.
    ///
    /// Ids are allocated first; then the header, the five fixed objects,
    /// the body objects, each page and finally the cross-reference table
    /// and trailer are streamed in id order.
    #[instrument(skip_all, fields(pages = self.pages.len(), body = self.body.len()))]
    pub fn write_to<W: Write>(&self, out: W) -> Result<W> {
        let alloc = allocate(&self.body, &self.pages);
        debug!(objects = alloc.object_count(), groups = alloc.groups.len(), "allocated object ids");

        let mut writer = ObjectWriter::new(out, self.options.missing_source);
        writer.write_raw(b"%PDF-1.4\n%\x80\x80\x80\x80\n")?;
        for comment in &self.comments {
            writer.write_raw(format!("% {comment}\n").as_bytes())?;
        }

        writer.write_object(CATALOG_ID, self.catalog(&alloc)?.as_bytes())?;
        writer.write_object(OUTLINES_ID, b"<< /Type /Outlines\n   /Count 0\n>>")?;
        writer.write_object(PAGE_TREE_ID, self.page_tree(&alloc).as_bytes())?;
        writer.write_object(PAGE_LABELS_ID, self.page_labels().as_bytes())?;
        writer.write_object(INFO_ID, self.info_contents().as_bytes())?;

        let compressor = self.stream_compressor();
        for (object, &id) in self.body.iter().zip(&alloc.body) {
            object.write(&mut writer, id, compressor)?;
        }
        debug!(bytes = writer.position(), "wrote body objects");

        let ctx = PageContext {
            color_spaces: &self.color_spaces,
            image_color_spaces: &self.image_color_spaces,
            compressor,
            compress_content: self.options.compress_content,
        };
        for (page, slots) in self.pages.iter().zip(&alloc.pages) {
            page.write(&mut writer, slots, &ctx)?;
        }
        debug!(xref_offset = writer.position(), "wrote pages");

        writer.finish(alloc.object_count())
    }

    /// Write the document to a byte vector
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        self.write_to(Vec::new())
    }

    /// Save the document to a file
    ///
    /// # Arguments
    /// * `path` - Output file path
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = BufWriter::new(File::create(path)?);
        let mut file = self.write_to(file)?;
        file.flush()?;
        Ok(())
    }
}
