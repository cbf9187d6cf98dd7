//! Textual encoding helpers shared by every object writer

/// Format a number the way PDF operands are written: six decimals at most,
/// with trailing zeros and a dangling period removed.
pub fn format_number(n: f64) -> String {
    let mut s = format!("{n:.6}");
    if s.contains('.') {
        let trimmed = s.trim_end_matches('0').trim_end_matches('.').len();
        s.truncate(trimmed);
    }
    if s == "-0" {
        s.remove(0);
    }
    s
}

/// Format a list of numbers separated by single spaces
pub fn format_numbers(values: &[f64]) -> String {
    values
        .iter()
        .map(|v| format_number(*v))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Format the six entries of a transformation matrix
pub fn format_matrix(matrix: &[f64; 6]) -> String {
    format_numbers(matrix)
}

/// `/Matrix [ a b c d e f ]` entry, identity when no matrix is given
pub fn matrix_entry(matrix: Option<&[f64; 6]>) -> String {
    let contents = match matrix {
        Some(m) => format_matrix(m),
        None => "1 0 0 1 0 0".to_string(),
    };
    format!("/Matrix [ {contents} ]")
}

/// Escape a name token. Spaces and parentheses become `#xx` sequences.
pub fn escape_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.chars() {
        match c {
            ' ' => out.push_str("#20"),
            '(' => out.push_str("#28"),
            ')' => out.push_str("#29"),
            _ => out.push(c),
        }
    }
    out
}

/// Escape the contents of a literal string for use between parentheses
pub fn escape_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if matches!(c, '(' | ')' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Byte-level variant of [`escape_string`], for strings that are not UTF-8
pub fn escape_bytes(bytes: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(bytes.len());
    for &b in bytes {
        if matches!(b, b'(' | b')' | b'\\') {
            out.push(b'\\');
        }
        out.push(b);
    }
    out
}

/// Join tokens with spaces, starting a new line whenever the next token
/// would pass `columns`. Tokens are never split.
pub fn wrap_tokens<S: AsRef<str>>(tokens: &[S], columns: usize) -> String {
    let mut out = String::new();
    let mut line_len = 0;
    for token in tokens {
        let token = token.as_ref();
        if line_len > 0 {
            if line_len + 1 + token.len() > columns {
                out.push('\n');
                line_len = 0;
            } else {
                out.push(' ');
                line_len += 1;
            }
        }
        out.push_str(token);
        line_len += token.len();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(612.0), "612");
        assert_eq!(format_number(0.5), "0.5");
        assert_eq!(format_number(1.25), "1.25");
        assert_eq!(format_number(-3.0), "-3");
        assert_eq!(format_number(-0.0), "0");
        assert_eq!(format_number(1.0 / 3.0), "0.333333");
    }

    #[test]
    fn test_matrix_entry() {
        assert_eq!(matrix_entry(None), "/Matrix [ 1 0 0 1 0 0 ]");
        assert_eq!(
            matrix_entry(Some(&[2.0, 0.0, 0.0, 2.0, 10.5, 20.0])),
            "/Matrix [ 2 0 0 2 10.5 20 ]"
        );
    }

    #[test]
    fn test_escape_name() {
        assert_eq!(escape_name("Times New Roman"), "Times#20New#20Roman");
        assert_eq!(escape_name("A(b)"), "A#28b#29");
    }

    #[test]
    fn test_escape_string() {
        assert_eq!(escape_string("a(b)c\\d"), "a\\(b\\)c\\\\d");
        assert_eq!(escape_bytes(&[0, b'(', 0xFF]), vec![0, b'\\', b'(', 0xFF]);
    }

    #[test]
    fn test_wrap_tokens_never_splits() {
        let tokens = ["aaaa", "bbbb", "cccc", "dd"];
        assert_eq!(wrap_tokens(&tokens, 10), "aaaa bbbb\ncccc dd");
        // A token longer than the column still goes on its own line whole
        assert_eq!(wrap_tokens(&["abcdefghijkl", "x"], 5), "abcdefghijkl\nx");
        assert_eq!(wrap_tokens::<&str>(&[], 80), "");
    }
}
