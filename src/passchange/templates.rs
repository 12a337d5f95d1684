//! HTML pages, embedded at compile time.

const FORM: &str = include_str!("templates/form.html");
const MESSAGE: &str = include_str!("templates/message.html");

/// Escape text for use in HTML element content and quoted attributes.
#[must_use]
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            // Keeps substituted values from forming placeholders.
            '{' => escaped.push_str("&#123;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[must_use]
pub fn form(env: &str, requirement: &str) -> String {
    FORM.replace("{{env}}", &escape_html(env))
        .replace("{{requirement}}", &escape_html(requirement))
}

/// Result page. `text` is either the success message or the error reason.
#[must_use]
pub fn message(text: &str, is_error: bool) -> String {
    let class = if is_error { "error" } else { "message" };
    MESSAGE
        .replace("{{class}}", class)
        .replace("{{text}}", &escape_html(text))
}
