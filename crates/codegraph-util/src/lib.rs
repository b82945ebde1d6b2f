//! Misc. utilities: the small
//! helpers the visitor and builder crates both reach for, pulled out of the
//! collector so they're independently testable — the same way a per-language
//! collector's helpers (`location`, `node_text`,
//! `child_text_by_kinds`) are plain functions on `&self` rather than baked
//! into the traversal loop.

use codegraph_core::Location;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;
use std::sync::Mutex;

/// Builds a `Location` from 0-indexed parser row/column positions, applying
/// the `start_position().row + 1` convention (line numbers are
/// 1-indexed, columns are exclusive-end and 0-indexed).
pub fn location_from_positions(
    start_row: usize,
    start_col: usize,
    end_row: usize,
    end_col: usize,
) -> Location {
    Location {
        line: Some(start_row as u32 + 1),
        column: Some(start_col as u32),
        end_column: if end_row == start_row {
            Some(end_col as u32)
        } else {
            None
        },
    }
}

static IDENTIFIER: Lazy<Regex> = Lazy::new(|| Regex::new(r"[A-Za-z_$][A-Za-z0-9_$]*").unwrap());

/// Extracts the bound identifier names from a destructuring pattern's source
/// text, e.g. `{ a, b: c, ...rest }` -> `["a", "c", "rest"]`,
/// `[x, , y]` -> `["x", "y"]`. This is a text-level fallback for when the
/// parser's field-accessor API (`child_by_field_name`) doesn't expose the
/// bound names directly; it is deliberately permissive rather than a full
/// pattern grammar.
pub fn extract_pattern_names(pattern_text: &str) -> Vec<String> {
    let trimmed = pattern_text.trim();
    if !(trimmed.starts_with('{') || trimmed.starts_with('[')) {
        return IDENTIFIER
            .find_iter(trimmed)
            .map(|m| m.as_str().to_string())
            .collect();
    }

    let mut names = Vec::new();
    for raw_entry in split_top_level(trimmed) {
        let entry = raw_entry.trim().trim_start_matches("...").trim();
        if entry.is_empty() {
            continue;
        }
        // `key: binding` or `key: binding = default` -> take the binding side.
        let binding_side = entry.split(':').next_back().unwrap_or(entry);
        let binding_side = binding_side.split('=').next().unwrap_or(binding_side).trim();
        if let Some(m) = IDENTIFIER.find(binding_side) {
            names.push(m.as_str().to_string());
        }
    }
    names
}

fn split_top_level(pattern: &str) -> Vec<String> {
    let inner = pattern
        .trim_start_matches(['{', '['])
        .trim_end_matches(['}', ']']);
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut current = String::new();
    for ch in inner.chars() {
        match ch {
            '{' | '[' | '(' => {
                depth += 1;
                current.push(ch);
            }
            '}' | ']' | ')' => {
                depth -= 1;
                current.push(ch);
            }
            ',' if depth == 0 => {
                parts.push(std::mem::take(&mut current));
            }
            _ => current.push(ch),
        }
    }
    if !current.trim().is_empty() {
        parts.push(current);
    }
    parts
}

/// A monotonic per-key counter used to mint `#<discriminator>` suffixes when
/// multiple entities of the same kind share a scope and name. Owned by
/// one builder/module's lifetime, same as the singleton registry.
#[derive(Default)]
pub struct DiscriminatorCounter {
    counts: Mutex<HashMap<String, u32>>,
}

impl DiscriminatorCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// First call for a given key returns `None` (no discriminator needed —
    /// it's the only entity of its kind so far); subsequent calls return
    /// `Some("2")`, `Some("3")`, …
    pub fn next(&self, key: &str) -> Option<String> {
        let mut counts = self.counts.lock().unwrap();
        let entry = counts.entry(key.to_string()).or_insert(0);
        *entry += 1;
        if *entry == 1 {
            None
        } else {
            Some(entry.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_object_pattern_bindings() {
        let names = extract_pattern_names("{ a, b: c, ...rest }");
        assert_eq!(names, vec!["a", "c", "rest"]);
    }

    #[test]
    fn extracts_array_pattern_bindings() {
        let names = extract_pattern_names("[x, y]");
        assert_eq!(names, vec!["x", "y"]);
    }

    #[test]
    fn first_use_has_no_discriminator() {
        let counter = DiscriminatorCounter::new();
        assert_eq!(counter.next("f::x"), None);
        assert_eq!(counter.next("f::x"), Some("2".to_string()));
        assert_eq!(counter.next("f::x"), Some("3".to_string()));
    }
}
