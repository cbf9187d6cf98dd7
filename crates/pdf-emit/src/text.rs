//! Text objects and text state operators

use crate::format::{escape_bytes, format_matrix, format_number};

/// Text state parameters, written as a block of operators
#[derive(Debug, Clone, PartialEq)]
pub struct TextState {
    pub char_space: f64,
    pub word_space: f64,
    /// Horizontal scaling in percent
    pub scale: f64,
    pub leading: f64,
    /// Font object id and size
    pub font: Option<(u32, f64)>,
    pub render_mode: u32,
    pub rise: f64,
}

impl Default for TextState {
    fn default() -> Self {
        Self {
            char_space: 0.0,
            word_space: 0.0,
            scale: 100.0,
            leading: 0.0,
            font: None,
            render_mode: 0,
            rise: 0.0,
        }
    }
}

impl TextState {
    /// Operators setting every parameter of this state
    pub fn operators(&self) -> String {
        let mut s = format!(
            "{} Tc\n{} Tw\n{} Tz\n{} TL\n",
            format_number(self.char_space),
            format_number(self.word_space),
            format_number(self.scale),
            format_number(self.leading)
        );
        if let Some((id, size)) = self.font {
            s.push_str(&format!("/F{id} {} Tf\n", format_number(size)));
        }
        s.push_str(&format!(
            "{} Tr\n{} Ts\n",
            self.render_mode,
            format_number(self.rise)
        ));
        s
    }
}

/// A `BT ... ET` block showing one or more lines
#[derive(Debug, Clone, PartialEq)]
pub struct Text {
    matrix: [f64; 6],
    lines: Vec<Vec<u8>>,
}

impl Text {
    /// Lines starting at `(x, y)`
    pub fn at<L: AsRef<[u8]>>(x: f64, y: f64, lines: &[L]) -> Self {
        Self::with_matrix([1.0, 0.0, 0.0, 1.0, x, y], lines)
    }

    /// Lines placed by a full text matrix
    pub fn with_matrix<L: AsRef<[u8]>>(matrix: [f64; 6], lines: &[L]) -> Self {
        Self {
            matrix,
            lines: lines.iter().map(|l| l.as_ref().to_vec()).collect(),
        }
    }

    /// Turn every byte into a two-byte code with a zero high byte, for
    /// composite fonts using `Identity-H`
    pub fn mapped(mut self) -> Self {
        for line in &mut self.lines {
            *line = line.iter().flat_map(|&b| [0, b]).collect();
        }
        self
    }

    pub fn contents(&self) -> Vec<u8> {
        let m = &self.matrix;
        let mut out = b"BT\n".to_vec();
        if m[0] == 1.0 && m[1] == 0.0 && m[2] == 0.0 && m[3] == 1.0 {
            out.extend_from_slice(
                format!("{} {} Td\n", format_number(m[4]), format_number(m[5])).as_bytes(),
            );
        } else {
            out.extend_from_slice(format!("{} Tm\n", format_matrix(m)).as_bytes());
        }
        for (i, line) in self.lines.iter().enumerate() {
            if i > 0 {
                out.extend_from_slice(b"T*\n");
            }
            out.push(b'(');
            out.extend_from_slice(&escape_bytes(line));
            out.extend_from_slice(b") Tj\n");
        }
        out.extend_from_slice(b"ET\n");
        out
    }
}
