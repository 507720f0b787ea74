//! Minimal PDF writer for the pdf export format.
//!
//! Renders text as a single flowed block in built-in Helvetica, wrapping
//! lines to the page width and flowing onto additional US Letter pages as
//! needed. Output is plain PDF 1.4 with uncompressed content streams.

// US Letter geometry in points.
const PAGE_WIDTH: usize = 612;
const PAGE_HEIGHT: usize = 792;
const MARGIN: usize = 72;
const FONT_SIZE: usize = 11;
const LEADING: usize = 14;

/// Greedy wrap width. Helvetica at 11pt averages a bit over 5pt per
/// character, which fits ~85 characters into the 468pt text column.
const MAX_CHARS_PER_LINE: usize = 85;
const LINES_PER_PAGE: usize = (PAGE_HEIGHT - 2 * MARGIN) / LEADING;

/// Renders `text` into PDF bytes.
pub fn render(text: &str) -> Vec<u8> {
    let lines = wrap_text(text, MAX_CHARS_PER_LINE);
    let pages: Vec<&[String]> = if lines.is_empty() {
        vec![&lines[..]]
    } else {
        lines.chunks(LINES_PER_PAGE).collect()
    };

    // Object layout: 1 catalog, 2 page tree, 3 font, then a page object and
    // a content stream object per page.
    let page_count = pages.len();
    let object_count = 3 + 2 * page_count;
    let page_object_id = |page: usize| 4 + 2 * page;
    let content_object_id = |page: usize| 5 + 2 * page;

    let kids = (0..page_count)
        .map(|p| format!("{} 0 R", page_object_id(p)))
        .collect::<Vec<_>>()
        .join(" ");

    let mut out: Vec<u8> = Vec::new();
    let mut offsets: Vec<usize> = Vec::with_capacity(object_count);

    out.extend_from_slice(b"%PDF-1.4\n");

    let mut push_object = |out: &mut Vec<u8>, offsets: &mut Vec<usize>, id: usize, body: &str| {
        offsets.push(out.len());
        out.extend_from_slice(format!("{} 0 obj\n{}\nendobj\n", id, body).as_bytes());
    };

    push_object(&mut out, &mut offsets, 1, "<< /Type /Catalog /Pages 2 0 R >>");
    push_object(
        &mut out,
        &mut offsets,
        2,
        &format!("<< /Type /Pages /Kids [{}] /Count {} >>", kids, page_count),
    );
    push_object(
        &mut out,
        &mut offsets,
        3,
        "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica >>",
    );

    for (page, page_lines) in pages.iter().enumerate() {
        push_object(
            &mut out,
            &mut offsets,
            page_object_id(page),
            &format!(
                "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {} {}] \
                 /Resources << /Font << /F1 3 0 R >> >> /Contents {} 0 R >>",
                PAGE_WIDTH,
                PAGE_HEIGHT,
                content_object_id(page)
            ),
        );

        let stream = content_stream(page_lines);
        push_object(
            &mut out,
            &mut offsets,
            content_object_id(page),
            &format!(
                "<< /Length {} >>\nstream\n{}endstream",
                stream.len(),
                stream
            ),
        );
    }

    // Cross-reference table and trailer.
    let xref_offset = out.len();
    out.extend_from_slice(format!("xref\n0 {}\n", object_count + 1).as_bytes());
    out.extend_from_slice(b"0000000000 65535 f \n");
    for offset in &offsets {
        out.extend_from_slice(format!("{:010} 00000 n \n", offset).as_bytes());
    }
    out.extend_from_slice(
        format!(
            "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
            object_count + 1,
            xref_offset
        )
        .as_bytes(),
    );

    out
}

/// Builds the text-drawing content stream for one page of lines.
fn content_stream(lines: &[String]) -> String {
    let first_baseline = PAGE_HEIGHT - MARGIN - FONT_SIZE;
    let mut stream = format!(
        "BT\n/F1 {} Tf\n{} TL\n{} {} Td\n",
        FONT_SIZE, LEADING, MARGIN, first_baseline
    );
    for line in lines {
        stream.push_str(&format!("({}) Tj\nT*\n", escape_pdf_string(line)));
    }
    stream.push_str("ET\n");
    stream
}

/// Escapes a line for use inside a PDF literal string.
///
/// Backslash, parentheses, and control characters are escaped; characters
/// outside the 8-bit range of the built-in font encoding are replaced.
fn escape_pdf_string(line: &str) -> String {
    let mut escaped = String::with_capacity(line.len());
    for ch in line.chars() {
        match ch {
            '\\' => escaped.push_str("\\\\"),
            '(' => escaped.push_str("\\("),
            ')' => escaped.push_str("\\)"),
            '\r' | '\n' => {}
            c if (c as u32) < 0x20 => escaped.push(' '),
            c if (c as u32) > 0xFF => escaped.push('?'),
            c => escaped.push(c),
        }
    }
    escaped
}

/// Splits text into display lines: hard breaks on newlines, greedy word
/// wrap at `width` characters, oversized words chunked.
fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    for raw in text.lines() {
        if raw.trim().is_empty() {
            lines.push(String::new());
            continue;
        }

        let mut current = String::new();
        for word in raw.split_whitespace() {
            if word.len() > width {
                if !current.is_empty() {
                    lines.push(std::mem::take(&mut current));
                }
                let chars: Vec<char> = word.chars().collect();
                for chunk in chars.chunks(width) {
                    lines.push(chunk.iter().collect());
                }
                continue;
            }

            if current.is_empty() {
                current.push_str(word);
            } else if current.len() + 1 + word.len() <= width {
                current.push(' ');
                current.push_str(word);
            } else {
                lines.push(std::mem::take(&mut current));
                current.push_str(word);
            }
        }
        if !current.is_empty() {
            lines.push(current);
        }
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    fn as_text(bytes: &[u8]) -> String {
        String::from_utf8_lossy(bytes).to_string()
    }

    #[test]
    fn test_render_produces_wellformed_shell() {
        let bytes = render("hello world");
        let text = as_text(&bytes);
        assert!(text.starts_with("%PDF-1.4"));
        assert!(text.trim_end().ends_with("%%EOF"));
        assert!(text.contains("(hello world) Tj"));
        assert!(text.contains("/BaseFont /Helvetica"));
    }

    #[test]
    fn test_render_escapes_specials() {
        let bytes = render("a (b) c\\d");
        let text = as_text(&bytes);
        assert!(text.contains("(a \\(b\\) c\\\\d) Tj"));
    }

    #[test]
    fn test_render_flows_onto_multiple_pages() {
        let long_text = (0..150)
            .map(|i| format!("line number {}", i))
            .collect::<Vec<_>>()
            .join("\n");
        let text = as_text(&render(&long_text));

        let page_objects = text.matches("/Type /Page ").count();
        assert_eq!(page_objects, 150usize.div_ceil(LINES_PER_PAGE));
        assert!(text.contains(&format!("/Count {}", page_objects)));
    }

    #[test]
    fn test_render_empty_text_still_one_page() {
        let text = as_text(&render(""));
        assert_eq!(text.matches("/Type /Page ").count(), 1);
    }

    #[test]
    fn test_wrap_text_preserves_blank_lines() {
        let lines = wrap_text("a\n\nb", 10);
        assert_eq!(lines, vec!["a", "", "b"]);
    }

    #[test]
    fn test_wrap_text_breaks_long_words() {
        let lines = wrap_text("abcdefghij", 4);
        assert_eq!(lines, vec!["abcd", "efgh", "ij"]);
    }

    #[test]
    fn test_wrap_text_greedy_fill() {
        let lines = wrap_text("one two three four", 9);
        assert_eq!(lines, vec!["one two", "three", "four"]);
    }

    #[test]
    fn test_xref_offsets_point_at_objects() {
        let bytes = render("check offsets");
        let text = as_text(&bytes);

        // Every xref entry must point at the "N 0 obj" it claims to.
        let xref_start = text.find("xref\n").unwrap();
        for (i, entry) in text[xref_start..]
            .lines()
            .skip(2) // "xref" and the "0 N" subsection header
            .take_while(|l| l.ends_with("n") || l.ends_with("n ") || l.ends_with("f "))
            .enumerate()
        {
            if entry.ends_with("f ") {
                continue;
            }
            let offset: usize = entry[..10].parse().unwrap();
            let expected = format!("{} 0 obj", i);
            assert_eq!(&text[offset..offset + expected.len()], expected);
        }
    }
}
