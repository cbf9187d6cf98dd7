//! Composite font width arrays
//!
//! A CID font lists glyph widths in its `/W` array as a mix of ranges
//! (`from to width`) and explicit lists (`from [ w0 w1 ... ]`). This module
//! turns a dense width table into that encoding.

use crate::format::wrap_tokens;
use crate::font::FontMetrics;

/// Advance widths for every code from `first_char` on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidthTable {
    first_char: u32,
    widths: Vec<u32>,
}

impl WidthTable {
    pub fn new(first_char: u32, widths: Vec<u32>) -> Self {
        Self { first_char, widths }
    }

    /// Widths in thousandths of an em, taken from a metrics provider
    pub fn from_metrics(metrics: &dyn FontMetrics) -> Self {
        let first = metrics.first_char();
        let last = metrics.last_char();
        let widths = (first..=last)
            .map(|code| (metrics.advance_width(code) * metrics.scale()).round().max(0.0) as u32)
            .collect();
        Self::new(first, widths)
    }

    pub fn first_char(&self) -> u32 {
        self.first_char
    }

    /// Last code covered, `None` for an empty table
    pub fn last_char(&self) -> Option<u32> {
        (self.widths.len() as u32)
            .checked_sub(1)
            .map(|n| self.first_char + n)
    }

    pub fn widths(&self) -> &[u32] {
        &self.widths
    }

    pub fn width(&self, code: u32) -> Option<u32> {
        let index = code.checked_sub(self.first_char)? as usize;
        self.widths.get(index).copied()
    }
}

/// One element of a `/W` array
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WidthRun {
    /// Codes `from..=to` all share `width`
    Range { from: u32, to: u32, width: u32 },
    /// Consecutive codes starting at `from`, no two neighbours equal
    List { from: u32, widths: Vec<u32> },
}

/// Split a width table into ranges and lists.
///
/// Any two equal neighbours start a range, so a code sitting on a boundary
/// goes to the range. Ranges of width 0 are dropped since 0 is the default
/// width; lists are kept whole even when they contain zeros.
pub fn compress_widths(table: &WidthTable) -> Vec<WidthRun> {
    let w = table.widths();
    let n = w.len();
    let code = |i: usize| table.first_char() + i as u32;
    let starts_range = |i: usize| i + 1 < n && w[i] == w[i + 1];

    let mut runs = Vec::new();
    let mut i = 0;
    while i < n {
        if starts_range(i) {
            let mut end = i + 1;
            while end + 1 < n && w[end + 1] == w[i] {
                end += 1;
            }
            if w[i] != 0 {
                runs.push(WidthRun::Range {
                    from: code(i),
                    to: code(end),
                    width: w[i],
                });
            }
            i = end + 1;
        } else {
            let mut end = i;
            while end + 1 < n && !starts_range(end + 1) {
                end += 1;
            }
            runs.push(WidthRun::List {
                from: code(i),
                widths: w[i..=end].to_vec(),
            });
            i = end + 1;
        }
    }
    runs
}

/// Render runs as a `[ ... ]` array, wrapped at `columns`
pub fn render_width_array(runs: &[WidthRun], columns: usize) -> String {
    let mut tokens = vec!["[".to_string()];
    for run in runs {
        match run {
            WidthRun::Range { from, to, width } => {
                tokens.push(from.to_string());
                tokens.push(to.to_string());
                tokens.push(width.to_string());
            }
            WidthRun::List { from, widths } => {
                tokens.push(from.to_string());
                tokens.push("[".to_string());
                tokens.extend(widths.iter().map(u32::to_string));
                tokens.push("]".to_string());
            }
        }
    }
    tokens.push("]".to_string());
    wrap_tokens(&tokens, columns)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::BTreeMap;

    /// Expand runs back into a code -> width map, absent codes being 0
    fn decode(runs: &[WidthRun]) -> BTreeMap<u32, u32> {
        let mut map = BTreeMap::new();
        for run in runs {
            match run {
                WidthRun::Range { from, to, width } => {
                    for code in *from..=*to {
                        map.insert(code, *width);
                    }
                }
                WidthRun::List { from, widths } => {
                    for (i, w) in widths.iter().enumerate() {
                        map.insert(from + i as u32, *w);
                    }
                }
            }
        }
        map
    }

    fn assert_round_trip(table: &WidthTable) {
        let decoded = decode(&compress_widths(table));
        for (i, &w) in table.widths().iter().enumerate() {
            let code = table.first_char() + i as u32;
            assert_eq!(decoded.get(&code).copied().unwrap_or(0), w, "code {code}");
        }
    }

    #[test]
    fn test_ranges_then_singleton() {
        let table = WidthTable::new(0, vec![10, 10, 10, 5, 5, 20]);
        let runs = compress_widths(&table);
        assert_eq!(
            runs,
            vec![
                WidthRun::Range {
                    from: 0,
                    to: 2,
                    width: 10
                },
                WidthRun::Range {
                    from: 3,
                    to: 4,
                    width: 5
                },
                WidthRun::List {
                    from: 5,
                    widths: vec![20]
                },
            ]
        );
        assert_eq!(render_width_array(&runs, 80), "[ 0 2 10 3 4 5 5 [ 20 ] ]");
    }

    #[test]
    fn test_boundary_code_goes_to_range() {
        let table = WidthTable::new(32, vec![1, 2, 3, 3, 3, 4]);
        assert_eq!(
            compress_widths(&table),
            vec![
                WidthRun::List {
                    from: 32,
                    widths: vec![1, 2]
                },
                WidthRun::Range {
                    from: 34,
                    to: 36,
                    width: 3
                },
                WidthRun::List {
                    from: 37,
                    widths: vec![4]
                },
            ]
        );
    }

    #[test]
    fn test_zero_ranges_dropped_zero_lists_kept() {
        let table = WidthTable::new(0, vec![0, 0, 0, 7, 0, 9]);
        assert_eq!(
            compress_widths(&table),
            vec![WidthRun::List {
                from: 3,
                widths: vec![7, 0, 9]
            }]
        );
    }

    #[test]
    fn test_empty_table() {
        let table = WidthTable::new(5, vec![]);
        assert_eq!(table.last_char(), None);
        assert!(compress_widths(&table).is_empty());
        assert_eq!(render_width_array(&[], 80), "[ ]");
    }

    #[test]
    fn test_round_trip_synthetic_tables() {
        let mut seed = 17u32;
        for len in [1usize, 2, 3, 10, 64, 257] {
            let widths = (0..len)
                .map(|_| {
                    seed = seed.wrapping_mul(1_103_515_245).wrapping_add(12_345);
                    // A small alphabet produces plenty of equal neighbours
                    [0, 250, 500, 500, 722][(seed >> 16) as usize % 5]
                })
                .collect();
            assert_round_trip(&WidthTable::new(3, widths));
        }
    }

    #[test]
    fn test_render_wraps_between_tokens() {
        let widths: Vec<u32> = (0..40).map(|i| 100 + i).collect();
        let runs = compress_widths(&WidthTable::new(0, widths));
        let rendered = render_width_array(&runs, 30);
        for line in rendered.lines() {
            assert!(line.len() <= 30, "line too long: {line}");
        }
        let joined: Vec<&str> = rendered.split_whitespace().collect();
        assert_eq!(joined.first(), Some(&"["));
        assert_eq!(joined[1], "0");
        assert_eq!(joined.last(), Some(&"]"));
        assert_eq!(joined.len(), 40 + 5);
    }

    #[test]
    fn test_width_lookup() {
        let table = WidthTable::new(32, vec![250, 333]);
        assert_eq!(table.width(32), Some(250));
        assert_eq!(table.width(33), Some(333));
        assert_eq!(table.width(31), None);
        assert_eq!(table.last_char(), Some(33));
    }
}
