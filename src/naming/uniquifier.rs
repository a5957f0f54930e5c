//! Length-bounded unique identifier generation.
//!
//! Lengths are counted in characters, not bytes, so that truncation never
//! splits a multi-byte character.
//!
//! # Examples
//!
//! ```
//! use std::collections::HashSet;
//! use shared_table_names::naming::uniquify;
//!
//! let used: HashSet<&str> = ["Color", "Color1"].into_iter().collect();
//! assert_eq!(uniquify("Color", |n| used.contains(n), 10), "Color2");
//! assert_eq!(uniquify("Name", |n| used.contains(n), 10), "Name");
//! assert_eq!(uniquify("ABCDEFGH", |n| n == "ABCDE", 5), "ABCD1");
//! ```

use std::collections::HashMap;

/// Returns the first `max_len` characters of `identifier`.
pub fn truncate(identifier: &str, max_len: usize) -> String {
    match identifier.char_indices().nth(max_len) {
        Some((byte_offset, _)) => identifier[..byte_offset].to_string(),
        None => identifier.to_string(),
    }
}

/// Derives a name from `candidate` that `is_used` rejects and that fits in `max_len`.
///
/// The candidate itself (truncated if needed) is returned when free. Otherwise an
/// increasing integer suffix starting at 1 is appended, clipping the base so the
/// suffixed name still fits, and the first free variant wins.
pub fn uniquify<F>(candidate: &str, is_used: F, max_len: usize) -> String
where
    F: Fn(&str) -> bool,
{
    let first = truncate(candidate, max_len);
    if !is_used(&first) {
        return first;
    }

    let mut suffix: usize = 1;
    loop {
        let digits = suffix.to_string();
        let base = truncate(candidate, max_len.saturating_sub(digits.len()));
        let name = format!("{}{}", base, digits);
        if !is_used(&name) {
            return name;
        }
        suffix += 1;
    }
}

/// Names taken within one table, each with every artifact that shares it.
///
/// The first artifact to claim a name is its representative. Artifacts merged
/// under a name later are kept with it, so a name that has to move takes all of
/// them along.
#[derive(Debug)]
pub(crate) struct UsedNames<R> {
    groups: HashMap<String, Vec<R>>,
}

impl<R: Copy> UsedNames<R> {
    pub fn new() -> Self {
        Self {
            groups: HashMap::new(),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.groups.contains_key(name)
    }

    /// Every artifact currently holding `name`, representative first
    pub fn holders(&self, name: &str) -> &[R] {
        self.groups.get(name).map_or(&[], Vec::as_slice)
    }

    /// Adds `artifact` to the holders of `name`
    pub fn claim(&mut self, name: String, artifact: R) {
        self.groups.entry(name).or_default().push(artifact);
    }

    /// Makes `artifacts` the only holders of `name`
    pub fn assign(&mut self, name: String, artifacts: Vec<R>) {
        self.groups.insert(name, artifacts);
    }
}

/// Character length of an identifier
pub fn identifier_len(identifier: &str) -> usize {
    identifier.chars().count()
}
