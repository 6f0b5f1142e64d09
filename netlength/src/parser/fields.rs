//! Field splitting for parenthesised `.hyp` record lines.
//!
//! A record line looks like `(SEG X1=0.1 Y1=0.2 X2=0.3 Y2=0.2 W=0.005 L=TOP)`
//! or `(TOP, 1, 0.06, 0.06, 0)`. Delimiters inside double quotes do not
//! split; the quotes themselves are kept.

use std::collections::HashMap;

/// Split a record line into its raw fields.
pub fn parse_line(line: &str, delimiter: char) -> Vec<&str> {
    let body = line
        .trim()
        .trim_start_matches('(')
        .trim_end_matches(')');

    let mut parts = Vec::new();
    let mut inside_quotes = false;
    let mut start = 0;

    for (i, c) in body.char_indices() {
        if c == '"' {
            inside_quotes = !inside_quotes;
        } else if c == delimiter && !inside_quotes {
            parts.push(&body[start..i]);
            start = i + c.len_utf8();
        }
    }
    parts.push(&body[start..]);
    parts
}

/// `KEY=VALUE` fields of one record line. Bare words map to an empty value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Fields<'a> {
    map: HashMap<&'a str, &'a str>,
}

impl<'a> Fields<'a> {
    pub fn has(&self, key: &str) -> bool {
        self.map.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&'a str> {
        self.map.get(key).copied()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

/// Split a record line into `KEY=VALUE` pairs.
///
/// Empty fields (runs of delimiters) are ignored. A key that appears twice
/// is returned as the error.
pub fn parse_subsection(line: &str, delimiter: char) -> Result<Fields<'_>, &str> {
    let mut map = HashMap::new();
    for part in parse_line(line, delimiter) {
        if part.is_empty() {
            continue;
        }
        let (key, value) = part.split_once('=').unwrap_or((part, ""));
        if map.insert(key, value).is_some() {
            return Err(key);
        }
    }
    Ok(Fields { map })
}
