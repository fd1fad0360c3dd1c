//! Escaping helpers for ClickHouse string literals.

/**
Escapes the special characters of ClickHouse's text protocol.

When `quote` is true the result is additionally wrapped in single quotes,
turning it into a string literal.
 */
pub fn escape(value: &str, quote: bool) -> String {
    let mut escaped = String::with_capacity(value.len() + 2);
    if quote {
        escaped.push('\'');
    }
    for c in value.chars() {
        match c {
            '\u{08}' => escaped.push_str("\\b"),
            '\u{0c}' => escaped.push_str("\\f"),
            '\r' => escaped.push_str("\\r"),
            '\n' => escaped.push_str("\\n"),
            '\t' => escaped.push_str("\\t"),
            '\0' => escaped.push_str("\\0"),
            '\\' => escaped.push_str("\\\\"),
            '\'' => escaped.push_str("\\'"),
            _ => escaped.push(c),
        }
    }
    if quote {
        escaped.push('\'');
    }
    escaped
}

/**
Joins the given items with `", "`, the way ClickHouse renders argument lists.
 */
pub fn comma_join<I>(items: I) -> String
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    let items: Vec<String> = items.into_iter().map(|item| item.as_ref().to_owned()).collect();
    items.join(", ")
}
