//! Small HTML helpers shared by all templates. Every piece of user content
//! goes through `escape` before it reaches the output.

pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Multi-line user text: escaped, with line breaks preserved.
pub fn paragraphs(text: &str) -> String {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| format!("<p>{}</p>", escape(line)))
        .collect()
}

/// `<tag class="...">escaped text</tag>`, or nothing when the text is blank.
pub fn text_element(tag: &str, class: &str, text: &str) -> String {
    if text.trim().is_empty() {
        return String::new();
    }
    format!("<{tag} class=\"{class}\">{}</{tag}>", escape(text.trim()))
}

/// Bare hostnames like `linkedin.com/in/x` get an https scheme.
pub fn href(url: &str) -> String {
    let url = url.trim();
    if url.starts_with("http://") || url.starts_with("https://") || url.starts_with("mailto:") {
        escape(url)
    } else {
        escape(&format!("https://{url}"))
    }
}

/// Joins the non-blank parts with a separator.
pub fn join_present(parts: &[&str], separator: &str) -> String {
    parts
        .iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(separator)
}
