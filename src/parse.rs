//! Parsers for the bracketed textual syntax ClickHouse uses for array,
//! tuple and map literals.
//!
//! These are the inverse of the composite encoders: they split the wire text
//! into element strings, which the inner fields then decode individually.

use crate::error::Error;

/**
Parses a bracketed array (`[..]`) or tuple (`(..)`) literal into its element
strings. Quoted elements are unquoted and unescaped, unquoted elements are
trimmed.
 */
pub fn parse_array(text: &str) -> Result<Vec<String>, Error> {
    let trimmed = text.trim();
    let inner = match (trimmed.chars().next(), trimmed.chars().last()) {
        (Some('['), Some(']')) | (Some('('), Some(')')) => &trimmed[1..trimmed.len() - 1],
        _ => return Err(Error::invalid("Array", text)),
    };
    split_elements(inner).ok_or_else(|| Error::invalid("Array", text))
}

/**
Parses a map literal (`{'a': 1, 'b': 2}`) into key/value string pairs in
declaration order.
 */
pub fn parse_map(text: &str) -> Result<Vec<(String, String)>, Error> {
    let trimmed = text.trim();
    let inner = match (trimmed.chars().next(), trimmed.chars().last()) {
        (Some('{'), Some('}')) => &trimmed[1..trimmed.len() - 1],
        _ => return Err(Error::invalid("Map", text)),
    };
    split_pairs(inner).ok_or_else(|| Error::invalid("Map", text))
}

fn split_elements(inner: &str) -> Option<Vec<String>> {
    let chars: Vec<char> = inner.chars().collect();
    let mut items = Vec::new();
    let mut i = 0usize;
    skip_whitespace(&chars, &mut i);
    while i < chars.len() {
        items.push(scan_item(&chars, &mut i, ',')?);
        skip_whitespace(&chars, &mut i);
        if i < chars.len() {
            if chars[i] != ',' {
                return None;
            }
            i += 1;
            skip_whitespace(&chars, &mut i);
        }
    }
    Some(items)
}

fn split_pairs(inner: &str) -> Option<Vec<(String, String)>> {
    let chars: Vec<char> = inner.chars().collect();
    let mut pairs = Vec::new();
    let mut i = 0usize;
    skip_whitespace(&chars, &mut i);
    while i < chars.len() {
        let key = scan_item(&chars, &mut i, ':')?;
        skip_whitespace(&chars, &mut i);
        if chars.get(i) != Some(&':') {
            return None;
        }
        i += 1;
        skip_whitespace(&chars, &mut i);
        let value = scan_item(&chars, &mut i, ',')?;
        skip_whitespace(&chars, &mut i);
        if i < chars.len() {
            if chars[i] != ',' {
                return None;
            }
            i += 1;
            skip_whitespace(&chars, &mut i);
        }
        pairs.push((key, value));
    }
    Some(pairs)
}

/// Scans one quoted or unquoted item; unquoted items run until `stop` at
/// bracket depth zero, so nested `[..]`/`(..)`/`{..}` literals stay intact
/// for the inner field to re-parse.
fn scan_item(chars: &[char], i: &mut usize, stop: char) -> Option<String> {
    let mut item = String::new();
    if chars.get(*i) == Some(&'\'') {
        *i += 1;
        loop {
            let c = *chars.get(*i)?;
            *i += 1;
            match c {
                '\\' => {
                    let escaped = *chars.get(*i)?;
                    *i += 1;
                    item.push(unescape_char(escaped));
                }
                '\'' => break,
                other => item.push(other),
            }
        }
        Some(item)
    } else {
        let mut depth = 0usize;
        while *i < chars.len() {
            let c = chars[*i];
            if depth == 0 && c == stop {
                break;
            }
            match c {
                '[' | '(' | '{' => depth += 1,
                ']' | ')' | '}' => depth = depth.checked_sub(1)?,
                // a quoted run inside a nested literal is copied verbatim
                '\'' => {
                    item.push(c);
                    *i += 1;
                    loop {
                        let quoted = *chars.get(*i)?;
                        item.push(quoted);
                        *i += 1;
                        match quoted {
                            '\\' => {
                                let escaped = *chars.get(*i)?;
                                item.push(escaped);
                                *i += 1;
                            }
                            '\'' => break,
                            _ => {}
                        }
                    }
                    continue;
                }
                _ => {}
            }
            item.push(c);
            *i += 1;
        }
        if depth != 0 {
            return None;
        }
        Some(item.trim().to_string())
    }
}

fn skip_whitespace(chars: &[char], i: &mut usize) {
    while *i < chars.len() && chars[*i].is_whitespace() {
        *i += 1;
    }
}

fn unescape_char(c: char) -> char {
    match c {
        'b' => '\u{08}',
        'f' => '\u{0c}',
        'r' => '\r',
        'n' => '\n',
        't' => '\t',
        '0' => '\0',
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_array, parse_map};

    #[test]
    fn array_of_numbers() {
        assert_eq!(parse_array("[1,2,3]").unwrap(), vec!["1", "2", "3"]);
        assert_eq!(parse_array("[1, 2, 3]").unwrap(), vec!["1", "2", "3"]);
    }

    #[test]
    fn empty_array() {
        assert_eq!(parse_array("[]").unwrap(), Vec::<String>::new());
        assert_eq!(parse_array("[ ]").unwrap(), Vec::<String>::new());
    }

    #[test]
    fn tuple_parens() {
        assert_eq!(parse_array("(1, 'a')").unwrap(), vec!["1", "a"]);
    }

    #[test]
    fn quoted_elements() {
        assert_eq!(
            parse_array("['a, b', 'c']").unwrap(),
            vec!["a, b".to_string(), "c".to_string()]
        );
        assert_eq!(parse_array("['a\\'b']").unwrap(), vec!["a'b"]);
        assert_eq!(parse_array("['a\\nb']").unwrap(), vec!["a\nb"]);
    }

    #[test]
    fn nested_literals_stay_intact() {
        assert_eq!(
            parse_array("[(1, 'x'), (2, 'y')]").unwrap(),
            vec!["(1, 'x')", "(2, 'y')"]
        );
        assert_eq!(
            parse_array("[[1, 2], [3]]").unwrap(),
            vec!["[1, 2]", "[3]"]
        );
        // quoted runs inside a nested literal may contain brackets and commas
        assert_eq!(
            parse_array("[('a]b', 'c, d')]").unwrap(),
            vec!["('a]b', 'c, d')"]
        );
        assert_eq!(
            parse_map("{'a': [1, 2], 'b': []}").unwrap(),
            vec![
                ("a".to_string(), "[1, 2]".to_string()),
                ("b".to_string(), "[]".to_string())
            ]
        );
        assert!(parse_array("[(1, 2]").is_err());
    }

    #[test]
    fn malformed_array() {
        assert!(parse_array("1,2,3").is_err());
        assert!(parse_array("['a' 'b']").is_err());
        assert!(parse_array("['unterminated]").is_err());
    }

    #[test]
    fn map_pairs() {
        assert_eq!(
            parse_map("{'a': 1, 'b': 2}").unwrap(),
            vec![
                ("a".to_string(), "1".to_string()),
                ("b".to_string(), "2".to_string())
            ]
        );
    }

    #[test]
    fn map_quoted_values() {
        assert_eq!(
            parse_map("{'k': 'v: w'}").unwrap(),
            vec![("k".to_string(), "v: w".to_string())]
        );
    }

    #[test]
    fn empty_map() {
        assert_eq!(parse_map("{}").unwrap(), Vec::new());
    }

    #[test]
    fn malformed_map() {
        assert!(parse_map("'a': 1").is_err());
        assert!(parse_map("{'a' 1}").is_err());
    }
}
