//! Extended graphics state parameter dictionaries

use crate::format::format_number;

/// Alpha settings written as an `/ExtGState` dictionary
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GraphicsState {
    stroking_alpha: Option<f64>,
    non_stroking_alpha: Option<f64>,
}

impl GraphicsState {
    /// Same alpha for stroking and filling
    pub fn alpha(alpha: f64) -> Self {
        Self {
            stroking_alpha: Some(alpha),
            non_stroking_alpha: Some(alpha),
        }
    }

    pub fn stroking(alpha: f64) -> Self {
        Self {
            stroking_alpha: Some(alpha),
            non_stroking_alpha: None,
        }
    }

    pub fn non_stroking(alpha: f64) -> Self {
        Self {
            stroking_alpha: None,
            non_stroking_alpha: Some(alpha),
        }
    }

    pub fn contents(&self) -> String {
        let mut s = String::from("<< /Type /ExtGState\n");
        if let Some(a) = self.stroking_alpha {
            s.push_str(&format!("   /CA {}\n", format_number(a)));
        }
        if let Some(a) = self.non_stroking_alpha {
            s.push_str(&format!("   /ca {}\n", format_number(a)));
        }
        s.push_str("   /AIS false\n>>");
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contents() {
        assert_eq!(
            GraphicsState::alpha(0.5).contents(),
            "<< /Type /ExtGState\n   /CA 0.5\n   /ca 0.5\n   /AIS false\n>>"
        );
        assert_eq!(
            GraphicsState::non_stroking(0.25).contents(),
            "<< /Type /ExtGState\n   /ca 0.25\n   /AIS false\n>>"
        );
        assert!(!GraphicsState::stroking(1.0).contents().contains("/ca"));
    }
}
