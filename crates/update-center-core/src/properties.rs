//! Flat key-value property namespaces.
//!
//! The update center is described as a flat namespace of string keys such as
//! `sonar.versions` or `clirr.1.1.requiredSonarVersions`. [`PropertyMap`] holds
//! one such namespace and knows the conventions shared by every reader:
//! trimmed scalars, comma lists (bracket-aware, so `[2.3,2.7.1]` stays one
//! item), boolean flags, and the merge rules of the split file format.
//!
//! The module also provides the `.properties` text codec used to load and
//! store namespaces:
//!
//! - `#` and `!` comment lines, blank lines ignored
//! - `=`, `:` or whitespace between key and value
//! - a trailing backslash continues the logical line
//! - escapes `\t`, `\n`, `\r`, `\f`, `\uXXXX` and `\<char>`

use crate::error::{Result, UpdateCenterError};
use std::collections::BTreeMap;
use std::collections::btree_map;

/// Key suffixes whose values are comma lists; merged by union.
pub const LIST_FIELDS: &[&str] = &[
    "plugins",
    "versions",
    "publicVersions",
    "privateVersions",
    "archivedVersions",
    "developers",
    "requiredSonarVersions",
    "requirePlugins",
];

/// A flat property namespace, ordered by key.
///
/// # Examples
///
/// ```
/// use update_center_core::PropertyMap;
///
/// let props = PropertyMap::parse("plugins = clirr, motionchart\nclirr.name=Clirr\n").unwrap();
/// assert_eq!(props.get_list("plugins"), vec!["clirr", "motionchart"]);
/// assert_eq!(props.get("clirr.name"), Some("Clirr"));
/// assert_eq!(props.get("clirr.description"), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertyMap {
    entries: BTreeMap<String, String>,
}

impl PropertyMap {
    /// Creates an empty namespace.
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Sets a property, replacing any previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }

    /// Sets a comma list property. Empty lists are not written.
    pub fn insert_list<I, S>(&mut self, key: impl Into<String>, items: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let joined = items
            .into_iter()
            .map(|item| item.as_ref().to_string())
            .collect::<Vec<_>>()
            .join(",");
        if !joined.is_empty() {
            self.entries.insert(key.into(), joined);
        }
    }

    /// Trimmed value of a property; `None` when absent or blank.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .get(key)
            .map(|value| value.trim())
            .filter(|value| !value.is_empty())
    }

    /// Untrimmed value of a property.
    pub fn get_raw(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Comma list value of a property, items trimmed, blanks dropped.
    pub fn get_list(&self, key: &str) -> Vec<String> {
        self.get(key).map(split_list).unwrap_or_default()
    }

    /// Boolean flag: `Some(true)` iff the value is `true` in any case,
    /// `Some(false)` for any other non-blank value, `None` when absent.
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key).map(|value| value.eq_ignore_ascii_case("true"))
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.entries.remove(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over properties in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Layers `other` on top of this namespace.
    ///
    /// Scalars from `other` override existing values; list fields (see
    /// [`LIST_FIELDS`]) are unioned, keeping the existing order and appending
    /// new items.
    pub fn merge(&mut self, other: &Self) {
        self.merge_prefixed("", other);
    }

    /// Layers `other` on top of this namespace with every key of `other`
    /// prefixed by `<prefix>.`; an empty prefix merges keys unchanged.
    pub fn merge_prefixed(&mut self, prefix: &str, other: &Self) {
        for (key, value) in other.iter() {
            let key = if prefix.is_empty() {
                key.to_string()
            } else {
                format!("{prefix}.{key}")
            };

            match self.entries.entry(key) {
                btree_map::Entry::Occupied(mut entry) if is_list_key(entry.key()) => {
                    let mut items = split_list(entry.get());
                    for item in split_list(value) {
                        if !items.contains(&item) {
                            items.push(item);
                        }
                    }
                    entry.insert(items.join(","));
                }
                btree_map::Entry::Occupied(mut entry) => {
                    entry.insert(value.to_string());
                }
                btree_map::Entry::Vacant(entry) => {
                    entry.insert(value.to_string());
                }
            }
        }
    }

    /// Parses `.properties` text.
    ///
    /// # Errors
    ///
    /// Returns [`UpdateCenterError::MalformedProperties`] when a `\u` escape is
    /// not followed by four hexadecimal digits.
    pub fn parse(content: &str) -> Result<Self> {
        let mut entries = BTreeMap::new();
        let mut lines = content.lines().enumerate().peekable();

        while let Some((index, line)) = lines.next() {
            let trimmed = line.trim_start();
            if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with('!') {
                continue;
            }

            let line_number = index + 1;
            let mut logical = trimmed.to_string();
            while ends_with_continuation(&logical) {
                logical.pop();
                match lines.next() {
                    Some((_, next)) => logical.push_str(next.trim_start()),
                    None => break,
                }
            }

            let (key, value) = split_key_value(&logical);
            entries.insert(
                unescape(key, line_number)?,
                unescape(value, line_number)?,
            );
        }

        tracing::debug!(properties = entries.len(), "Parsed properties text");

        Ok(Self { entries })
    }

    /// Renders this namespace as `.properties` text, one `key=value` line per
    /// property in key order.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        for (key, value) in &self.entries {
            out.push_str(&escape(key, true));
            out.push('=');
            out.push_str(&escape(value, false));
            out.push('\n');
        }
        out
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for PropertyMap {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut map = Self::new();
        map.extend(iter);
        map
    }
}

impl<K: Into<String>, V: Into<String>> Extend<(K, V)> for PropertyMap {
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

/// Whether the last dot-separated segment of `key` names a list field.
pub fn is_list_key(key: &str) -> bool {
    let field = key.rsplit('.').next().unwrap_or(key);
    LIST_FIELDS.contains(&field)
}

/// Splits a comma list, ignoring commas nested in `[...]`.
///
/// # Examples
///
/// ```
/// use update_center_core::properties::split_list;
///
/// assert_eq!(
///     split_list("2.2, [2.3,2.6] ,2.8,"),
///     vec!["2.2", "[2.3,2.6]", "2.8"]
/// );
/// ```
pub fn split_list(value: &str) -> Vec<String> {
    let mut items = Vec::new();
    let mut depth = 0usize;
    let mut current = String::new();

    for c in value.chars() {
        match c {
            '[' => {
                depth += 1;
                current.push(c);
            }
            ']' => {
                depth = depth.saturating_sub(1);
                current.push(c);
            }
            ',' if depth == 0 => {
                push_item(&mut items, &current);
                current.clear();
            }
            _ => current.push(c),
        }
    }
    push_item(&mut items, &current);

    items
}

fn push_item(items: &mut Vec<String>, item: &str) {
    let item = item.trim();
    if !item.is_empty() {
        items.push(item.to_string());
    }
}

/// An odd number of trailing backslashes continues the line.
fn ends_with_continuation(line: &str) -> bool {
    line.chars().rev().take_while(|&c| c == '\\').count() % 2 == 1
}

/// Splits a logical line at the first unescaped separator.
fn split_key_value(line: &str) -> (&str, &str) {
    let mut escaped = false;
    let mut key_end = line.len();

    for (i, c) in line.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '=' | ':' | ' ' | '\t' | '\u{c}' => {
                key_end = i;
                break;
            }
            _ => {}
        }
    }

    let key = &line[..key_end];
    let rest = line[key_end..].trim_start_matches([' ', '\t', '\u{c}']);
    let rest = rest
        .strip_prefix('=')
        .or_else(|| rest.strip_prefix(':'))
        .unwrap_or(rest);
    (key, rest.trim_start_matches([' ', '\t', '\u{c}']))
}

fn unescape(text: &str, line: usize) -> Result<String> {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('t') => out.push('\t'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('f') => out.push('\u{c}'),
            Some('u') => {
                let hex: String = chars.by_ref().take(4).collect();
                let decoded = u32::from_str_radix(&hex, 16)
                    .ok()
                    .filter(|_| hex.len() == 4)
                    .and_then(char::from_u32)
                    .ok_or_else(|| UpdateCenterError::MalformedProperties {
                        line,
                        reason: format!("invalid unicode escape '\\u{hex}'"),
                    })?;
                out.push(decoded);
            }
            Some(other) => out.push(other),
            None => {}
        }
    }

    Ok(out)
}

fn escape(text: &str, is_key: bool) -> String {
    let mut out = String::with_capacity(text.len());
    for (i, c) in text.chars().enumerate() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\t' => out.push_str("\\t"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\u{c}' => out.push_str("\\f"),
            ' ' if is_key || i == 0 => out.push_str("\\ "),
            '=' | ':' | '#' | '!' if is_key => {
                out.push('\\');
                out.push(c);
            }
            _ => out.push(c),
        }
    }
    out
}
