//! HTML sanitization for bookmark fields.
//!
//! Handles:
//! - Escaping of markup that is not on the allow list (`<script>` becomes
//!   `&lt;script&gt;`, its inner text is left alone)
//! - A small allow list of formatting tags that survive with their
//!   permitted attributes only (event handlers are dropped)
//! - Scheme checks on url-carrying attributes (`javascript:` and friends)
//! - Stray `<` / `>` in plain text
//!
//! The transform is idempotent, so records that were sanitized on a
//! previous read do not get double escaped.

use crate::model::Bookmark;

/// Tags allowed through, each with its permitted attributes.
const ALLOWED_TAGS: &[(&str, &[&str])] = &[
    ("a", &["href", "title", "target"]),
    ("b", &[]),
    ("blockquote", &["cite"]),
    ("br", &[]),
    ("code", &[]),
    ("em", &[]),
    ("i", &[]),
    ("img", &["src", "alt", "title", "width", "height"]),
    ("li", &[]),
    ("ol", &[]),
    ("p", &[]),
    ("pre", &[]),
    ("s", &[]),
    ("small", &[]),
    ("span", &[]),
    ("strong", &[]),
    ("sub", &[]),
    ("sup", &[]),
    ("u", &[]),
    ("ul", &[]),
];

/// Attributes whose values are urls and need a scheme check.
const URL_ATTRS: &[&str] = &["href", "src", "cite"];

/// Schemes that smuggle executable content into a url attribute.
const UNSAFE_SCHEMES: &[&str] = &["javascript:", "vbscript:", "data:"];

/// Sanitize a fragment of untrusted text for embedding in HTML.
pub fn clean(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(lt) = rest.find('<') {
        push_text(&mut out, &rest[..lt]);
        let tail = &rest[lt..];
        match scan_tag(tail) {
            TagScan::Closed(end) => {
                emit_tag(&mut out, &tail[..end + 1]);
                rest = &tail[end + 1..];
            }
            TagScan::Restart(next) => {
                // A fresh `<` before the tag closed, so the prefix was text.
                push_text(&mut out, &tail[..next]);
                rest = &tail[next..];
            }
            TagScan::Unterminated => {
                push_text(&mut out, tail);
                rest = "";
            }
        }
    }
    push_text(&mut out, rest);

    out
}

/// Apply the outbound representation of a stored bookmark: `title` and
/// `description` are sanitized, `id` and `url` pass through unchanged,
/// `rating` is already numeric.
pub fn serialize_bookmark(bookmark: Bookmark) -> Bookmark {
    Bookmark {
        id: bookmark.id,
        title: clean(&bookmark.title),
        url: bookmark.url,
        description: clean(&bookmark.description),
        rating: bookmark.rating,
    }
}

enum TagScan {
    /// Byte offset of the `>` closing the tag that starts at `s[0]`.
    Closed(usize),
    /// Byte offset of a new `<` seen before the tag closed.
    Restart(usize),
    Unterminated,
}

/// Find the end of the tag starting at `s[0]`, skipping `>` and `<` inside
/// quoted attribute values. A quote only opens a value when it follows `=`.
fn scan_tag(s: &str) -> TagScan {
    let bytes = s.as_bytes();
    let mut quote: Option<char> = None;
    for (i, c) in s.char_indices().skip(1) {
        match quote {
            Some(q) => {
                if c == q {
                    quote = None;
                }
            }
            None => match c {
                '>' => return TagScan::Closed(i),
                '<' => return TagScan::Restart(i),
                '"' | '\'' => {
                    if follows_equals(bytes, i) {
                        quote = Some(c);
                    }
                }
                _ => {}
            },
        }
    }
    TagScan::Unterminated
}

fn follows_equals(bytes: &[u8], mut i: usize) -> bool {
    while i > 0 {
        i -= 1;
        match bytes[i] {
            b' ' => {}
            b'=' => return true,
            _ => return false,
        }
    }
    false
}

/// Re-emit one raw tag span (`<` through `>` inclusive), either rebuilt
/// from the allow list or angle-bracket escaped.
fn emit_tag(out: &mut String, span: &str) {
    let inner = &span[1..span.len() - 1];
    let (closing, body) = match inner.strip_prefix('/') {
        Some(rest) => (true, rest),
        None => (false, inner),
    };

    let name_end = body
        .find(|c: char| !c.is_ascii_alphanumeric())
        .unwrap_or(body.len());
    let name = body[..name_end].to_ascii_lowercase();

    let allowed = ALLOWED_TAGS.iter().find(|(tag, _)| *tag == name);
    let Some((_, allowed_attrs)) = allowed else {
        push_text(out, span);
        return;
    };

    if closing {
        out.push_str("</");
        out.push_str(&name);
        out.push('>');
        return;
    }

    let trimmed = body[name_end..].trim_end();
    let (attr_src, self_closing) = match trimmed.strip_suffix('/') {
        Some(rest) => (rest, true),
        None => (trimmed, false),
    };

    out.push('<');
    out.push_str(&name);
    for (attr_name, attr_value) in parse_attrs(attr_src) {
        let attr_name = attr_name.to_ascii_lowercase();
        if !allowed_attrs.contains(&attr_name.as_str()) {
            continue;
        }
        match attr_value {
            Some(value) => {
                if URL_ATTRS.contains(&attr_name.as_str()) && has_unsafe_scheme(&value) {
                    continue;
                }
                out.push(' ');
                out.push_str(&attr_name);
                out.push_str("=\"");
                push_attr_value(out, &value);
                out.push('"');
            }
            None => {
                out.push(' ');
                out.push_str(&attr_name);
            }
        }
    }
    if self_closing {
        out.push_str(" /");
    }
    out.push('>');
}

/// Split the attribute section of a tag into `name` / optional `value`
/// pairs. Values may be single quoted, double quoted, or bare.
fn parse_attrs(src: &str) -> Vec<(String, Option<String>)> {
    let mut attrs = Vec::new();
    let mut rest = src;

    loop {
        rest = rest.trim_start();
        if rest.is_empty() {
            break;
        }

        let name_end = rest
            .find(|c: char| c.is_whitespace() || c == '=')
            .unwrap_or(rest.len());
        let name = &rest[..name_end];
        let after = rest[name_end..].trim_start();

        if let Some(eq_rest) = after.strip_prefix('=') {
            let value_src = eq_rest.trim_start();
            match value_src.chars().next() {
                Some(q @ ('"' | '\'')) => {
                    let body = &value_src[1..];
                    match body.find(q) {
                        Some(close) => {
                            attrs.push((name.to_string(), Some(body[..close].to_string())));
                            rest = &body[close + 1..];
                        }
                        None => {
                            attrs.push((name.to_string(), Some(body.to_string())));
                            rest = "";
                        }
                    }
                }
                _ => {
                    let value_end = value_src
                        .find(char::is_whitespace)
                        .unwrap_or(value_src.len());
                    attrs.push((name.to_string(), Some(value_src[..value_end].to_string())));
                    rest = &value_src[value_end..];
                }
            }
        } else {
            attrs.push((name.to_string(), None));
            rest = after;
        }
    }

    attrs
}

/// Scheme sniff over a url attribute value. Whitespace and control
/// characters are ignored so `java\tscript:` cannot slip through.
fn has_unsafe_scheme(value: &str) -> bool {
    let compact: String = value
        .chars()
        .filter(|c| !c.is_control() && !c.is_whitespace())
        .collect();
    let compact = compact.to_ascii_lowercase();
    UNSAFE_SCHEMES.iter().any(|scheme| compact.starts_with(scheme))
}

fn push_text(out: &mut String, text: &str) {
    for c in text.chars() {
        match c {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
}

fn push_attr_value(out: &mut String, value: &str) {
    for c in value.chars() {
        match c {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_passes_through() {
        assert_eq!(clean("Think outside the classroom"), "Think outside the classroom");
    }

    #[test]
    fn test_script_tag_is_escaped_not_stripped() {
        assert_eq!(
            clean(r#"Naughty naughty very naughty <script>alert("xss");</script>"#),
            r#"Naughty naughty very naughty &lt;script&gt;alert("xss");&lt;/script&gt;"#
        );
    }

    #[test]
    fn test_event_handler_attribute_is_dropped() {
        assert_eq!(
            clean(
                r#"Bad image <img src="https://url.to.file.which/does-not.exist" onerror="alert(document.cookie);">. But not <strong>all</strong> bad."#
            ),
            r#"Bad image <img src="https://url.to.file.which/does-not.exist">. But not <strong>all</strong> bad."#
        );
    }

    #[test]
    fn test_clean_is_idempotent() {
        let inputs = [
            r#"Naughty naughty very naughty <script>alert("xss");</script>"#,
            r#"Bad image <img src="https://url.to.file.which/does-not.exist" onerror="alert(document.cookie);">. But not <strong>all</strong> bad."#,
            "a < b > c",
            r#"<a href="https://example.com" title="say &quot;hi&quot;">link</a>"#,
        ];
        for input in inputs {
            let once = clean(input);
            assert_eq!(clean(&once), once, "double clean diverged for {input:?}");
        }
    }

    #[test]
    fn test_stray_brackets_are_escaped() {
        assert_eq!(clean("a < b > c"), "a &lt; b &gt; c");
        assert_eq!(clean("ends with <"), "ends with &lt;");
    }

    #[test]
    fn test_stray_bracket_before_tag_stays_text() {
        assert_eq!(clean("<b>5 < 6</b>"), "<b>5 &lt; 6</b>");
    }

    #[test]
    fn test_unterminated_tag_is_text() {
        assert_eq!(clean("broken <img src=\"x"), "broken &lt;img src=\"x");
    }

    #[test]
    fn test_quoted_gt_does_not_end_tag() {
        assert_eq!(
            clean(r#"<img src="https://example.com/a>b" onerror="x">"#),
            r#"<img src="https://example.com/a&gt;b">"#
        );
    }

    #[test]
    fn test_javascript_scheme_is_dropped() {
        assert_eq!(clean(r#"<a href="javascript:alert(1)">x</a>"#), "<a>x</a>");
        assert_eq!(clean(r#"<a href="JaVa  sCrIpT:alert(1)">x</a>"#), "<a>x</a>");
        assert_eq!(clean(r#"<img src="data:text/html;base64,PHM+">"#), "<img>");
    }

    #[test]
    fn test_https_url_attribute_survives() {
        assert_eq!(
            clean(r#"<a href="https://example.com" title="Example">x</a>"#),
            r#"<a href="https://example.com" title="Example">x</a>"#
        );
    }

    #[test]
    fn test_disallowed_tag_keeps_attr_text() {
        assert_eq!(
            clean(r#"<script type="text/javascript">"#),
            r#"&lt;script type="text/javascript"&gt;"#
        );
    }

    #[test]
    fn test_uppercase_tag_name_matches_allow_list() {
        assert_eq!(clean("<STRONG>loud</STRONG>"), "<strong>loud</strong>");
        assert_eq!(clean("<SCRIPT>x</SCRIPT>"), "&lt;SCRIPT&gt;x&lt;/SCRIPT&gt;");
    }

    #[test]
    fn test_self_closing_tag_survives() {
        assert_eq!(clean("line<br/>break"), "line<br />break");
    }

    #[test]
    fn test_attribute_quotes_are_escaped_on_output() {
        assert_eq!(
            clean(r#"<img src="https://example.com/x" alt='say "hi"'>"#),
            r#"<img src="https://example.com/x" alt="say &quot;hi&quot;">"#
        );
    }

    #[test]
    fn test_serialize_bookmark_cleans_title_and_description_only() {
        let stored = Bookmark {
            id: "7".to_string(),
            title: "<script>bad</script>".to_string(),
            url: "https://example.com/<keep>".to_string(),
            description: "<em>fine</em>".to_string(),
            rating: 4.0,
        };
        let view = serialize_bookmark(stored);
        assert_eq!(view.title, "&lt;script&gt;bad&lt;/script&gt;");
        assert_eq!(view.url, "https://example.com/<keep>");
        assert_eq!(view.description, "<em>fine</em>");
        assert_eq!(view.rating, 4.0);
        assert_eq!(view.id, "7");
    }
}
