//! HTML page returned by `GET /load`.

/// Escape `&`, `<`, `>`, `"` and `'` for use in HTML text and attributes.
#[must_use]
pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

/// Render a loaded snippet as a standalone HTML document.
#[must_use]
pub fn render_snippet_page(code: &str) -> String {
    format!(
        "<!DOCTYPE html>\n\
         <html>\n\
         <head>\n  <meta charset=\"utf-8\">\n  <title>Loaded Code</title>\n</head>\n\
         <body>\n  <h1>Loaded Code</h1>\n  <pre>{}</pre>\n</body>\n\
         </html>\n",
        escape_html(code)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_html_replaces_markup() {
        assert_eq!(
            escape_html(r#"<script>alert("x&y")</script>'"#),
            "&lt;script&gt;alert(&quot;x&amp;y&quot;)&lt;/script&gt;&#39;"
        );
    }

    #[test]
    fn escape_html_keeps_plain_text() {
        assert_eq!(escape_html("void main() { print(1); }"), "void main() { print(1); }");
    }

    #[test]
    fn render_snippet_page_embeds_code_in_pre() {
        let page = render_snippet_page("print(1 < 2);");
        assert!(page.starts_with("<!DOCTYPE html>"));
        assert!(page.contains("<pre>print(1 &lt; 2);</pre>"));
    }
}
