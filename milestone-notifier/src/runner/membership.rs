//! Playlist membership diffing.

use std::collections::BTreeMap;

/// Videos that joined and left a playlist between two fetches, as
/// `(id, title)` pairs in id order. Titles of removed videos come from the
/// previous fetch.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct MembershipChange<'a> {
    pub added: Vec<(&'a str, &'a str)>,
    pub removed: Vec<(&'a str, &'a str)>,
}

impl MembershipChange<'_> {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

pub fn diff<'a>(
    previous: &'a BTreeMap<String, String>,
    current: &'a BTreeMap<String, String>,
) -> MembershipChange<'a> {
    let added = current
        .iter()
        .filter(|(id, _)| !previous.contains_key(*id))
        .map(|(id, title)| (id.as_str(), title.as_str()))
        .collect();
    let removed = previous
        .iter()
        .filter(|(id, _)| !current.contains_key(*id))
        .map(|(id, title)| (id.as_str(), title.as_str()))
        .collect();
    MembershipChange { added, removed }
}
