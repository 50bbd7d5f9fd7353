//! Text helpers for Telegram HTML messages.
//!
//! The named wrappers (`bold`, `italic`, ...) escape their input with
//! [`escape_markdown_v2`] and then add HTML tags, so applying one twice nests
//! the tags. [`html_tag`] wraps HTML-escaped text for callers that need
//! markup-safe output under the `HTML` parse mode.

use serde::Serialize;

/// Characters that must be backslash-escaped in `MarkdownV2` text.
const MARKDOWN_V2_SPECIAL: &[char] = &[
    '_', '*', '[', ']', '(', ')', '~', '`', '>', '#', '+', '-', '=', '|', '{', '}', '.', '!',
];

pub fn escape_markdown_v2(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if MARKDOWN_V2_SPECIAL.contains(&c) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Escape the three characters Telegram's HTML parser treats as markup.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

pub fn bold(text: &str) -> String {
    format!("<b>{}</b>", escape_markdown_v2(text))
}

pub fn underline(text: &str) -> String {
    format!("<u>{}</u>", escape_markdown_v2(text))
}

pub fn italic(text: &str) -> String {
    format!("<i>{}</i>", escape_markdown_v2(text))
}

pub fn bold_italic(text: &str) -> String {
    format!("<b><i>{}</i></b>", escape_markdown_v2(text))
}

pub fn bold_underline(text: &str) -> String {
    format!("<ins><b>{}</b></ins>", escape_markdown_v2(text))
}

/// Wrap HTML-escaped `text` in a single `<tag>...</tag>` pair.
pub fn html_tag(tag: &str, text: &str) -> String {
    format!("<{tag}>{}</{tag}>", escape_html(text))
}

pub fn yes() -> String {
    bold_italic("Yes")
}

pub fn no() -> String {
    bold_italic("No")
}

/// Pretty-print a map as JSON.
///
/// Returns `None` when the input is empty, is not a map, or fails to
/// serialize.
pub fn pretty_json_string<T>(map: &T) -> Option<String>
where
    T: Serialize + ?Sized,
{
    match serde_json::to_value(map).ok()? {
        serde_json::Value::Object(object) if !object.is_empty() => {
            serde_json::to_string_pretty(&object).ok()
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use serde::Serializer;
    use serde_json::json;

    use super::*;

    #[test]
    fn test_escape_markdown_v2() {
        let escaped = escape_markdown_v2("Hello *world* [test] (link)");
        assert_eq!(escaped, r"Hello \*world\* \[test\] \(link\)");
        assert_eq!(escape_markdown_v2("v1.2-beta!"), r"v1\.2\-beta\!");
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("a < b && c > d"), "a &lt; b &amp;&amp; c &gt; d");
        assert_eq!(escape_html("plain"), "plain");
    }

    #[test]
    fn test_wrappers_single_tag_pair() {
        let wrapped = bold("Hello *world* (v1.2)!");
        assert_eq!(wrapped, r"<b>Hello \*world\* \(v1\.2\)\!</b>");
        assert_eq!(wrapped.matches("<b>").count(), 1);
        assert_eq!(wrapped.matches("</b>").count(), 1);

        assert_eq!(underline("Test"), "<u>Test</u>");
        assert_eq!(italic("Test"), "<i>Test</i>");
        assert_eq!(bold_italic("Test"), "<b><i>Test</i></b>");
        assert_eq!(bold_underline("Test"), "<ins><b>Test</b></ins>");
    }

    #[test]
    fn test_wrapping_is_not_idempotent() {
        let once = bold("Test");
        let twice = bold(&once);
        assert_ne!(once, twice);
        // `>` is a MarkdownV2 special, so the inner tags get escaped too.
        assert_eq!(twice, r"<b><b\>Test</b\></b>");
        assert_eq!(twice.matches("<b>").count(), 1);

        assert_eq!(bold(&bold("a.b")), r"<b><b\>a\\.b</b\></b>");
    }

    #[test]
    fn test_html_tag_escapes_markup() {
        let wrapped = html_tag("i", "x < y & z");
        assert_eq!(wrapped, "<i>x &lt; y &amp; z</i>");
        assert_eq!(wrapped.matches("<i>").count(), 1);
        assert_eq!(html_tag("b", "2026-10-15 12:00"), "<b>2026-10-15 12:00</b>");
    }

    #[test]
    fn test_yes_no_constants() {
        assert_eq!(yes(), "<b><i>Yes</i></b>");
        assert_eq!(no(), "<b><i>No</i></b>");
    }

    #[test]
    fn test_pretty_json_string_valid_map() {
        let map = json!({ "name": "Test", "value": 123, "active": true });
        let pretty = pretty_json_string(&map).unwrap();
        for needle in ["name", "Test", "value", "123", "active", "true"] {
            assert!(pretty.contains(needle), "missing {needle}");
        }
        assert!(pretty.contains('\n'));
    }

    #[test]
    fn test_pretty_json_string_empty_is_none() {
        let empty: HashMap<String, i32> = HashMap::new();
        assert_eq!(pretty_json_string(&empty), None);
        assert_eq!(pretty_json_string(&json!([1, 2])), None);
    }

    #[test]
    fn test_pretty_json_string_unserializable_is_none() {
        struct Opaque;

        impl Serialize for Opaque {
            fn serialize<S: Serializer>(&self, _: S) -> Result<S::Ok, S::Error> {
                Err(serde::ser::Error::custom("not representable as JSON"))
            }
        }

        let mut map = HashMap::new();
        map.insert("invalid".to_string(), Opaque);
        assert_eq!(pretty_json_string(&map), None);
    }
}
