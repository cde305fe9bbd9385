//! HTML pages served by the dashboard.
//!
//! The documents are compiled in with `include_str!` and filled in by
//! replacing `{{name}}` placeholders with HTML-escaped values.

use axum::response::Html;

const INDEX_HTML: &str = include_str!("../../templates/index.html");
const IMAGE_HTML: &str = include_str!("../../templates/image.html");

/// Dashboard page.
///
/// `error`, when present, is shown in a banner above the device details.
pub fn index(device_id: &str, api_configured: bool, error: Option<&str>) -> Html<String> {
    let error = error
        .map(|msg| format!(r#"<section class="card error"><p>{}</p></section>"#, escape(msg)))
        .unwrap_or_default();
    let api_status = if api_configured {
        "Configured"
    } else {
        "Not configured"
    };

    let device_id = escape(device_id);

    Html(render(
        INDEX_HTML,
        &[
            ("device_id", device_id.as_str()),
            ("api_status", api_status),
            ("error", error.as_str()),
        ],
    ))
}

/// Fullscreen viewer for the current display image.
pub fn image(image_url: &str, filename: &str, device_id: &str) -> Html<String> {
    let image_url = escape(image_url);
    let filename = escape(filename);
    let device_id = escape(device_id);

    Html(render(
        IMAGE_HTML,
        &[
            ("image_url", image_url.as_str()),
            ("filename", filename.as_str()),
            ("device_id", device_id.as_str()),
        ],
    ))
}

// Substitute `{{name}}` tokens in a single pass, so inserted values are
// never scanned for tokens themselves. Unknown tokens are left as they are.
// Values must already be escaped.
fn render(template: &str, values: &[(&str, &str)]) -> String {
    let mut page = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        page.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find("}}") else {
            page.push_str(&rest[start..]);
            return page;
        };

        let name = &after[..end];
        match values.iter().find(|(key, _)| *key == name) {
            Some((_, value)) => page.push_str(value),
            None => page.push_str(&rest[start..start + end + 4]),
        }
        rest = &after[end + 2..];
    }

    page.push_str(rest);
    page
}

fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_without_error() {
        let Html(page) = index("00:00:00:00:00:00", true, None);

        assert!(page.contains("TRMNL Dashboard"));
        assert!(page.contains("<code>00:00:00:00:00:00</code>"));
        assert!(page.contains("Configured"));
        assert!(!page.contains("card error"));
        assert!(!page.contains("{{"));
    }

    #[test]
    fn test_index_with_error() {
        let Html(page) = index("XX:XX:XX:XX:XX:XX", false, Some("Page not found"));

        assert!(page.contains("Not configured"));
        assert!(page.contains(r#"<section class="card error"><p>Page not found</p></section>"#));
    }

    #[test]
    fn test_image_page() {
        let Html(page) = image("https://x/y.png", "f.png", "AA:BB");

        assert!(page.contains(r#"<img src="https://x/y.png" alt="f.png">"#));
        assert!(page.contains("AA:BB"));
        assert!(!page.contains("{{"));
    }

    #[test]
    fn test_inserted_values_are_not_substituted_again() {
        let Html(page) = image("https://x/{{device_id}}.png", "{{image_url}}", "AA:BB");

        assert!(page.contains(r#"<img src="https://x/{{device_id}}.png" alt="{{image_url}}">"#));
        assert!(page.contains("{{image_url}} &middot; AA:BB"));
    }

    #[test]
    fn test_render_leaves_unknown_and_unclosed_tokens() {
        let page = render("a {{known}} b {{other}} c {{open", &[("known", "1")]);
        assert_eq!(page, "a 1 b {{other}} c {{open");
    }

    #[test]
    fn test_values_are_escaped() {
        let Html(page) = image("https://x/y.png?a=1&b=\"2\"", "<script>", "it's");

        assert!(page.contains("https://x/y.png?a=1&amp;b=&quot;2&quot;"));
        assert!(page.contains("&lt;script&gt;"));
        assert!(page.contains("it&#39;s"));
        assert!(!page.contains("<script>"));
    }
}
