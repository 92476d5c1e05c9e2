//! HTML escaping for user text placed into outbound email bodies.

/// Escapes HTML-significant characters in untrusted input.
///
/// `None` and the empty string both produce an empty string. Besides the
/// five tag-forming characters (`<`, `>`, `"`, `'`, `/`), the ampersand is
/// escaped as well, so text such as `&lt;` is shown literally instead of
/// being decoded by the mail client.
pub fn sanitize(input: Option<&str>) -> String {
    match input {
        Some(s) => escape_html(s),
        None => String::new(),
    }
}

/// Escapes a borrowed string. See [`sanitize`].
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());

    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            '/' => out.push_str("&#x2F;"),
            _ => out.push(c),
        }
    }

    out
}

/// Escapes input and turns line breaks into `<br>` tags.
///
/// Used for multi-line fields like the contact message.
pub fn sanitize_multiline(input: Option<&str>) -> String {
    sanitize(input)
        .replace("\r\n", "\n")
        .replace('\n', "<br>")
}
