//! Document information dictionary

use crate::format::escape_string;
use chrono::{DateTime, Utc};

/// Metadata written as object 5. Empty fields are omitted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Info {
    pub title: Option<String>,
    pub author: Option<String>,
    pub subject: Option<String>,
    pub keywords: Option<String>,
    pub creator: Option<String>,
    pub producer: Option<String>,
    pub creation_date: Option<String>,
    pub mod_date: Option<String>,
}

/// Format a timestamp as a date string, `D:YYYYMMDDHHmmSSZ`
pub fn pdf_date(date: DateTime<Utc>) -> String {
    date.format("D:%Y%m%d%H%M%SZ").to_string()
}

impl Info {
    /// Producer set to this crate and creation date set to now
    pub fn new() -> Self {
        Self {
            producer: Some(format!("pdf-emit {}", crate::version())),
            creation_date: Some(pdf_date(Utc::now())),
            ..Self::default()
        }
    }

    pub fn contents(&self) -> String {
        let fields = [
            ("Title", &self.title),
            ("Author", &self.author),
            ("Subject", &self.subject),
            ("Keywords", &self.keywords),
            ("Creator", &self.creator),
            ("Producer", &self.producer),
            ("CreationDate", &self.creation_date),
            ("ModDate", &self.mod_date),
        ];
        let mut s = String::from("<<\n");
        for (key, value) in fields {
            if let Some(v) = value.as_deref().filter(|v| !v.is_empty()) {
                s.push_str(&format!("   /{key} ({})\n", escape_string(v)));
            }
        }
        s.push_str(">>");
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_pdf_date() {
        let date = Utc.with_ymd_and_hms(2024, 3, 7, 9, 5, 1).unwrap();
        assert_eq!(pdf_date(date), "D:20240307090501Z");
    }

    #[test]
    fn test_new_sets_producer_and_date() {
        let info = Info::new();
        assert!(info.producer.unwrap().starts_with("pdf-emit "));
        let date = info.creation_date.unwrap();
        assert_eq!(date.len(), 17);
        assert!(date.starts_with("D:") && date.ends_with('Z'));
    }

    #[test]
    fn test_contents_skips_empty_fields() {
        let info = Info {
            title: Some("Report (draft)".to_string()),
            author: Some(String::new()),
            ..Info::default()
        };
        assert_eq!(info.contents(), "<<\n   /Title (Report \\(draft\\))\n>>");
    }
}
