//! Object id assignment
//!
//! Every id the document references is fixed here, before any byte is
//! written. The layout depends only on the structure of the model and the
//! order things were added, so allocating twice gives the same answer.

use crate::body::BodyObject;
use crate::page::Page;

pub const CATALOG_ID: u32 = 1;
pub const OUTLINES_ID: u32 = 2;
pub const PAGE_TREE_ID: u32 = 3;
pub const PAGE_LABELS_ID: u32 = 4;
pub const INFO_ID: u32 = 5;
/// First id available to body objects
pub const FIRST_BODY_ID: u32 = 6;

/// Ids of one page image. The length objects follow at `id + 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageSlots {
    pub image: u32,
    pub mask: Option<u32>,
}

/// Ids of one page and everything it owns
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSlots {
    pub page: u32,
    pub contents: u32,
    pub length: u32,
    pub images: Vec<ImageSlots>,
    /// One per group introduced by the page, in page order
    pub groups: Vec<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Allocation {
    /// First id of each body object
    pub body: Vec<u32>,
    pub pages: Vec<PageSlots>,
    /// `(level, id)` of every group, pooled across pages in page order
    pub groups: Vec<(u32, u32)>,
    next_id: u32,
}

impl Allocation {
    /// Highest id in use, which is also the number of objects
    pub fn object_count(&self) -> u32 {
        self.next_id - 1
    }
}

/// Assign ids to the body objects, then to each page
pub fn allocate(body: &[BodyObject], pages: &[Page]) -> Allocation {
    let mut next_id = FIRST_BODY_ID;
    let mut take = |n: u32| {
        let id = next_id;
        next_id += n;
        id
    };

    let body_ids = body.iter().map(|object| take(object.slots())).collect();

    let mut groups = Vec::new();
    let page_slots = pages
        .iter()
        .map(|page| {
            let first = take(3);
            let images = page
                .images()
                .map(|img| {
                    let image = take(2);
                    let mask = img.soft_mask().map(|_| take(2));
                    ImageSlots { image, mask }
                })
                .collect();
            let group_ids: Vec<u32> = page
                .groups()
                .iter()
                .map(|group| {
                    let id = take(1);
                    groups.push((group.level(), id));
                    id
                })
                .collect();
            PageSlots {
                page: first,
                contents: first + 1,
                length: first + 2,
                images,
                groups: group_ids,
            }
        })
        .collect();

    Allocation {
        body: body_ids,
        pages: page_slots,
        groups,
        next_id,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::SourceStream;
    use crate::color::COLORSPACE_DEVICE_RGB;
    use crate::font::Font;
    use crate::image::{placement, Image, RawImage};
    use pretty_assertions::assert_eq;
    use std::path::PathBuf;

    fn rgb_image(masked: bool) -> Image {
        Image::raw(
            RawImage {
                bytes: vec![0; 12],
                width: 2,
                height: 2,
                bits_per_component: 8,
                channels: 3,
            },
            masked.then(|| vec![255; 4]),
            COLORSPACE_DEVICE_RGB,
            placement(0.0, 0.0, 1.0, 1.0),
            true,
        )
        .unwrap()
    }

    #[test]
    fn test_empty_document() {
        let alloc = allocate(&[], &[]);
        assert_eq!(alloc.object_count(), 5);
        assert!(alloc.body.is_empty());
    }

    #[test]
    fn test_body_ids_follow_slots() {
        let body = vec![
            BodyObject::Font(Font::standard_type1("Helvetica")),
            BodyObject::SourceStream(SourceStream {
                path: PathBuf::from("profile.icc"),
                extra_header: "/N 3".to_string(),
                compress: true,
            }),
            BodyObject::Custom(b"null".to_vec()),
        ];
        let alloc = allocate(&body, &[]);
        assert_eq!(alloc.body, vec![6, 7, 9]);
        assert_eq!(alloc.object_count(), 9);
    }

    #[test]
    fn test_soft_mask_follows_image() {
        let mut page = Page::new();
        page.add_image(rgb_image(true));
        let alloc = allocate(&[], &[page]);
        let slots = &alloc.pages[0];
        assert_eq!((slots.page, slots.contents, slots.length), (6, 7, 8));
        assert_eq!(
            slots.images,
            vec![ImageSlots {
                image: 9,
                mask: Some(11)
            }]
        );
        assert_eq!(alloc.object_count(), 12);
    }

    #[test]
    fn test_groups_pooled_in_page_order() {
        let mut first = Page::new();
        first.start_marked_content("Base");
        first.start_marked_content("Detail");
        first.end_marked_content();
        first.end_marked_content();
        first.add_image(rgb_image(false));

        let mut second = Page::new();
        second.start_marked_content("Base");
        second.end_marked_content();

        let alloc = allocate(&[], &[first, second]);
        assert_eq!(alloc.pages[0].images[0].image, 9);
        assert_eq!(alloc.pages[0].groups, vec![11, 12]);
        assert_eq!(alloc.pages[1].page, 13);
        assert_eq!(alloc.pages[1].groups, vec![16]);
        assert_eq!(alloc.groups, vec![(1, 11), (2, 12), (1, 16)]);
    }

    #[test]
    fn test_ids_strictly_increase_without_gaps() {
        let body = vec![
            BodyObject::Custom(b"1".to_vec()),
            BodyObject::SourceStream(SourceStream {
                path: PathBuf::from("x"),
                extra_header: String::new(),
                compress: false,
            }),
        ];
        let mut page = Page::new();
        page.add_image(rgb_image(true));
        page.add_image(rgb_image(false));
        page.start_marked_content("A");
        page.end_marked_content();
        let alloc = allocate(&body, &[page.clone(), page]);

        let mut ids: Vec<u32> = (1..FIRST_BODY_ID).collect();
        for (object, &id) in body.iter().zip(&alloc.body) {
            ids.extend(id..id + object.slots());
        }
        for slots in &alloc.pages {
            ids.extend([slots.page, slots.contents, slots.length]);
            for img in &slots.images {
                ids.extend([img.image, img.image + 1]);
                if let Some(mask) = img.mask {
                    ids.extend([mask, mask + 1]);
                }
            }
            ids.extend(&slots.groups);
        }
        let expected: Vec<u32> = (1..=alloc.object_count()).collect();
        assert_eq!(ids, expected);
    }

    #[test]
    fn test_allocation_is_repeatable() {
        let mut page = Page::new();
        page.add_image(rgb_image(true));
        let pages = vec![page];
        assert_eq!(allocate(&[], &pages), allocate(&[], &pages));
    }
}
