//! Minimal RTF writer for the doc export format.
//!
//! Word processors open RTF under a .doc name without conversion, which
//! keeps this format self-contained: each snippet becomes one paragraph,
//! separated by an empty paragraph.

/// Renders the snippets into RTF bytes, one paragraph per snippet.
pub fn render(items: &[String]) -> Vec<u8> {
    let mut body = String::new();
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            body.push_str("\\par\n");
        }
        body.push_str(&escape_rtf(item));
        body.push_str("\\par\n");
    }

    format!(
        "{{\\rtf1\\ansi\\deff0{{\\fonttbl{{\\f0 Helvetica;}}}}\n\\f0\\fs22\n{}}}",
        body
    )
    .into_bytes()
}

/// Escapes text for an RTF body.
///
/// Braces and backslashes are control characters; newlines inside a snippet
/// become line breaks; non-ASCII characters use the signed 16-bit \u escape
/// with a '?' fallback for readers that cannot decode it.
fn escape_rtf(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '\\' => escaped.push_str("\\\\"),
            '{' => escaped.push_str("\\{"),
            '}' => escaped.push_str("\\}"),
            '\n' => escaped.push_str("\\line\n"),
            '\r' => {}
            c if c.is_ascii() => escaped.push(c),
            c => {
                let mut units = [0u16; 2];
                for unit in c.encode_utf16(&mut units) {
                    escaped.push_str(&format!("\\u{}?", *unit as i16));
                }
            }
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    fn as_text(bytes: &[u8]) -> String {
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[test]
    fn test_render_paragraph_per_item() {
        let items = vec!["first".to_string(), "second".to_string()];
        let text = as_text(&render(&items));

        assert!(text.starts_with("{\\rtf1\\ansi"));
        assert!(text.ends_with("}"));
        assert!(text.contains("first\\par"));
        assert!(text.contains("second\\par"));

        // Items are separated by an empty paragraph
        let first_pos = text.find("first").unwrap();
        let second_pos = text.find("second").unwrap();
        let between = &text[first_pos..second_pos];
        assert_eq!(between.matches("\\par").count(), 2);
    }

    #[test]
    fn test_render_empty_clipboard() {
        let text = as_text(&render(&[]));
        assert!(text.starts_with("{\\rtf1"));
        assert!(!text.contains("\\par"));
    }

    #[test]
    fn test_escape_rtf_specials() {
        assert_eq!(escape_rtf("a{b}c\\d"), "a\\{b\\}c\\\\d");
    }

    #[test]
    fn test_escape_rtf_newlines_become_line_breaks() {
        assert_eq!(escape_rtf("a\nb"), "a\\line\nb");
    }

    #[test]
    fn test_escape_rtf_unicode() {
        // 'é' is U+00E9
        assert_eq!(escape_rtf("é"), "\\u233?");
    }
}
