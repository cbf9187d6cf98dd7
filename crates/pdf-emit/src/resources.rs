//! Per-scope resource listings

use crate::color::FIRST_CUSTOM_COLORSPACE;
use std::fmt::Write as _;

/// Role of an object inside a resource dictionary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceCategory {
    Font,
    ColorSpace,
    Pattern,
    ExtGState,
    Shading,
    XObject,
}

impl ResourceCategory {
    /// All categories, in the order they appear in a `/Resources` dictionary
    pub const ALL: [ResourceCategory; 6] = [
        ResourceCategory::Font,
        ResourceCategory::ColorSpace,
        ResourceCategory::Pattern,
        ResourceCategory::ExtGState,
        ResourceCategory::Shading,
        ResourceCategory::XObject,
    ];

    /// Sub-dictionary key, e.g. `Font`
    pub fn dict_name(self) -> &'static str {
        match self {
            ResourceCategory::Font => "Font",
            ResourceCategory::ColorSpace => "ColorSpace",
            ResourceCategory::Pattern => "Pattern",
            ResourceCategory::ExtGState => "ExtGState",
            ResourceCategory::Shading => "Shading",
            ResourceCategory::XObject => "XObject",
        }
    }

    /// Prefix of the per-object resource names, e.g. `F` in `/F6`
    pub fn prefix(self) -> &'static str {
        match self {
            ResourceCategory::Font => "F",
            ResourceCategory::ColorSpace => "CS",
            ResourceCategory::Pattern => "Pt",
            ResourceCategory::ExtGState => "s",
            ResourceCategory::Shading => "sh",
            ResourceCategory::XObject => "Im",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// Insertion-ordered, duplicate-free object ids, one list per category
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceSet {
    ids: [Vec<u32>; 6],
}

impl ResourceSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `id` to `category` unless it is already there.
    ///
    /// Returns `true` when the id was added.
    pub fn add(&mut self, category: ResourceCategory, id: u32) -> bool {
        let list = &mut self.ids[category.index()];
        if list.contains(&id) {
            return false;
        }
        list.push(id);
        true
    }

    pub fn add_font(&mut self, id: u32) -> bool {
        self.add(ResourceCategory::Font, id)
    }

    /// Device color spaces are named directly in content streams and are
    /// never listed.
    pub fn add_color_space(&mut self, id: u32) -> bool {
        if id < FIRST_CUSTOM_COLORSPACE {
            return false;
        }
        self.add(ResourceCategory::ColorSpace, id)
    }

    pub fn add_pattern(&mut self, id: u32) -> bool {
        self.add(ResourceCategory::Pattern, id)
    }

    pub fn add_graphics_state(&mut self, id: u32) -> bool {
        self.add(ResourceCategory::ExtGState, id)
    }

    pub fn add_shading(&mut self, id: u32) -> bool {
        self.add(ResourceCategory::Shading, id)
    }

    pub fn add_image(&mut self, id: u32) -> bool {
        self.add(ResourceCategory::XObject, id)
    }

    pub fn get(&self, category: ResourceCategory) -> &[u32] {
        &self.ids[category.index()]
    }

    pub fn is_empty(&self) -> bool {
        self.ids.iter().all(Vec::is_empty)
    }

    /// Render one category as a sub-dictionary indented by `indent` spaces.
    /// An empty category renders as nothing.
    pub fn render(&self, category: ResourceCategory, indent: usize) -> String {
        render_entries(category, self.get(category), indent)
    }

    /// Full `/Resources` entry, as used by tiling patterns
    pub fn to_dict(&self) -> String {
        let mut out = String::from("   /Resources <<\n");
        for category in ResourceCategory::ALL {
            out.push_str(&self.render(category, 17));
        }
        out.push_str("   >>");
        out
    }
}

/// Render `ids` as a `/Name << /P1 1 0 R ... >>` block. Shared with page
/// dictionaries, whose image list is not held in a [`ResourceSet`].
pub(crate) fn render_entries(category: ResourceCategory, ids: &[u32], indent: usize) -> String {
    if ids.is_empty() {
        return String::new();
    }
    let name = category.dict_name();
    let pad = " ".repeat(indent);
    let entry_pad = " ".repeat(indent + 5 + name.len());

    let mut out = format!("{pad}/{name} <<\n");
    for id in ids {
        let _ = writeln!(out, "{entry_pad}/{}{id} {id} 0 R", category.prefix());
    }
    let _ = writeln!(out, "{pad}>>");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_add_dedups_and_keeps_order() {
        let mut set = ResourceSet::new();
        assert!(set.add_font(9));
        assert!(set.add_font(6));
        assert!(!set.add_font(9));
        assert!(set.add_font(7));
        assert_eq!(set.get(ResourceCategory::Font), &[9, 6, 7]);
    }

    #[test]
    fn test_readding_subset_keeps_first_insertion_order() {
        let ids = [14u32, 3, 27, 8, 11, 5];
        let mut set = ResourceSet::new();
        for id in ids {
            set.add_shading(id);
        }
        for id in [27u32, 3, 5, 27, 14] {
            set.add_shading(id);
        }
        assert_eq!(set.get(ResourceCategory::Shading), &ids);
    }

    #[test]
    fn test_device_color_spaces_never_added() {
        let mut set = ResourceSet::new();
        for id in 0..4 {
            assert!(!set.add_color_space(id));
        }
        assert!(set.add_color_space(12));
        assert_eq!(set.get(ResourceCategory::ColorSpace), &[12]);
    }

    #[test]
    fn test_render_empty_category_is_empty() {
        let set = ResourceSet::new();
        assert!(set.is_empty());
        assert_eq!(set.render(ResourceCategory::Pattern, 6), "");
    }

    #[test]
    fn test_render_category() {
        let mut set = ResourceSet::new();
        set.add_font(6);
        set.add_font(10);
        assert_eq!(
            set.render(ResourceCategory::Font, 6),
            "      /Font <<\n               /F6 6 0 R\n               /F10 10 0 R\n      >>\n"
        );
    }

    #[test]
    fn test_to_dict_skips_empty_categories() {
        let mut set = ResourceSet::new();
        set.add_image(20);
        set.add_graphics_state(8);
        let dict = set.to_dict();
        assert!(dict.starts_with("   /Resources <<\n"));
        assert!(dict.contains("/ExtGState <<"));
        assert!(dict.contains("/s8 8 0 R"));
        assert!(dict.contains("/Im20 20 0 R"));
        assert!(!dict.contains("/Font"));
        assert!(dict.find("/ExtGState").unwrap() < dict.find("/XObject").unwrap());
    }
}
