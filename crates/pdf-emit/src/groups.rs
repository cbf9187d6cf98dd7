//! Optional content groups and their catalog ordering

use crate::{PdfError, Result};

/// A named optional content group opened by marked content on a page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    name: String,
    internal_name: String,
    level: u32,
}

impl Group {
    /// Create a group at nesting `level` (1 for a top-level group)
    pub fn new(name: &str, level: u32) -> Self {
        Self {
            name: name.to_string(),
            internal_name: internal_name(name),
            level,
        }
    }

    /// Name shown to the user in the layers panel
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Resource name used in `/OC /<name> BDC`
    pub fn internal_name(&self) -> &str {
        &self.internal_name
    }

    pub fn level(&self) -> u32 {
        self.level
    }
}

/// Keep ASCII letters and digits only
fn internal_name(name: &str) -> String {
    name.chars().filter(char::is_ascii_alphanumeric).collect()
}

/// Render the `/Order` token sequence for groups given as
/// `(level, object id)` pairs in document order.
///
/// The first entry opens as many brackets as its level, an increase of one
/// opens one bracket, a decrease closes the difference, and everything is
/// closed after the last entry. An increase of more than one is rejected.
///
/// # Example
///
/// ```ignore
/// let order = render_order(&[(1, 7), (2, 8), (2, 9), (1, 10)])?;
/// assert_eq!(order, " [ 7 0 R [ 8 0 R 9 0 R ] 10 0 R ]");
/// ```
pub fn render_order(entries: &[(u32, u32)]) -> Result<String> {
    let mut out = String::new();
    let mut depth = 0u32;

    for (index, &(level, id)) in entries.iter().enumerate() {
        if level > depth {
            if index > 0 && level - depth > 1 {
                return Err(PdfError::GroupNesting {
                    previous: depth,
                    level,
                });
            }
            for _ in depth..level {
                out.push_str(" [");
            }
        } else {
            for _ in level..depth {
                out.push_str(" ]");
            }
        }
        depth = level;
        out.push_str(&format!(" {id} 0 R"));
    }

    for _ in 0..depth {
        out.push_str(" ]");
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn bracket_balance(s: &str) -> (i32, i32) {
        let mut depth = 0;
        let mut min = 0;
        for c in s.chars() {
            match c {
                '[' => depth += 1,
                ']' => depth -= 1,
                _ => {}
            }
            min = min.min(depth);
        }
        (depth, min)
    }

    #[test]
    fn test_internal_name_keeps_alphanumerics() {
        let group = Group::new("Layer #1 (draft)", 1);
        assert_eq!(group.name(), "Layer #1 (draft)");
        assert_eq!(group.internal_name(), "Layer1draft");
        assert_eq!(group.level(), 1);
    }

    #[test]
    fn test_nested_siblings() {
        let order = render_order(&[(1, 7), (2, 8), (2, 9), (1, 10)]).unwrap();
        assert_eq!(order, " [ 7 0 R [ 8 0 R 9 0 R ] 10 0 R ]");
    }

    #[test]
    fn test_first_entry_opens_its_level() {
        let order = render_order(&[(3, 12)]).unwrap();
        assert_eq!(order, " [ [ [ 12 0 R ] ] ]");
    }

    #[test]
    fn test_multi_level_close() {
        let order = render_order(&[(1, 6), (2, 7), (3, 8), (1, 9)]).unwrap();
        assert_eq!(order, " [ 6 0 R [ 7 0 R [ 8 0 R ] ] 9 0 R ]");
    }

    #[test]
    fn test_level_zero_is_unbracketed() {
        assert_eq!(render_order(&[(0, 6), (0, 7)]).unwrap(), " 6 0 R 7 0 R");
        assert_eq!(render_order(&[]).unwrap(), "");
    }

    #[test]
    fn test_jump_of_two_is_rejected() {
        let err = render_order(&[(1, 6), (3, 7)]).unwrap_err();
        assert!(matches!(
            err,
            PdfError::GroupNesting {
                previous: 1,
                level: 3
            }
        ));
    }

    #[test]
    fn test_valid_sequences_balance() {
        let sequences: [&[u32]; 5] = [
            &[1, 1, 1],
            &[1, 2, 3, 4, 1],
            &[2, 3, 2, 1, 2, 3, 3],
            &[0, 1, 0, 1, 2],
            &[1, 2, 1, 2, 1, 2],
        ];
        for levels in sequences {
            let entries: Vec<(u32, u32)> = levels
                .iter()
                .enumerate()
                .map(|(i, &l)| (l, 6 + i as u32))
                .collect();
            let order = render_order(&entries).unwrap();
            let (end, min) = bracket_balance(&order);
            assert_eq!(end, 0, "unbalanced for {levels:?}: {order}");
            assert!(min >= 0, "closed too early for {levels:?}: {order}");
        }
    }
}
