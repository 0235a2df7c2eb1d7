// 🗂️ Register Set - accepted lines bucketed by record type code
// Insertion order is file order; only fully validated lines get in.

use crate::layout::LayoutSpec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RegisterSet {
    buckets: BTreeMap<String, Vec<String>>,
}

impl RegisterSet {
    /// Empty buckets for every code the layout knows
    pub fn new(spec: &LayoutSpec) -> Self {
        RegisterSet {
            buckets: spec.codes().map(|c| (c.to_string(), Vec::new())).collect(),
        }
    }

    pub fn push(&mut self, code: char, line: &str) {
        self.buckets
            .entry(code.to_string())
            .or_default()
            .push(line.to_string());
    }

    pub fn get(&self, code: char) -> &[String] {
        self.buckets
            .get(&code.to_string())
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    pub fn count(&self, code: char) -> usize {
        self.get(code).len()
    }

    pub fn first(&self, code: char) -> Option<&str> {
        self.get(code).first().map(|s| s.as_str())
    }

    pub fn last(&self, code: char) -> Option<&str> {
        self.get(code).last().map(|s| s.as_str())
    }

    /// Empty a bucket, returning its records in file order (header/trailer post-checks)
    pub fn drain(&mut self, code: char) -> Vec<String> {
        self.buckets
            .get_mut(&code.to_string())
            .map(std::mem::take)
            .unwrap_or_default()
    }

    /// Total accepted lines across all buckets
    pub fn total(&self) -> usize {
        self.buckets.values().map(|v| v.len()).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.buckets.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// All accepted lines, bucket by bucket
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.buckets.values().flatten().map(|s| s.as_str())
    }

    /// Records of a single type code (empty set when the code is unknown)
    pub fn filter(&self, code: char) -> RegisterSet {
        let mut buckets = BTreeMap::new();
        buckets.insert(code.to_string(), self.get(code).to_vec());
        RegisterSet { buckets }
    }

    /// Case-insensitive substring search; only buckets with hits are kept
    pub fn search(&self, term: &str) -> RegisterSet {
        let needle = term.to_lowercase();
        let buckets = self
            .buckets
            .iter()
            .filter_map(|(code, lines)| {
                let hits: Vec<String> = lines
                    .iter()
                    .filter(|l| l.to_lowercase().contains(&needle))
                    .cloned()
                    .collect();
                if hits.is_empty() {
                    None
                } else {
                    Some((code.clone(), hits))
                }
            })
            .collect();
        RegisterSet { buckets }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::Layout;

    #[test]
    fn test_new_prepopulates_layout_codes() {
        let set = RegisterSet::new(Layout::Portaria1510.spec());
        let codes: Vec<&str> = set.iter().map(|(c, _)| c).collect();
        assert_eq!(codes, vec!["1", "2", "3", "4", "5", "9"]);
        assert_eq!(set.total(), 0);
    }

    #[test]
    fn test_push_keeps_file_order() {
        let mut set = RegisterSet::new(Layout::Portaria671.spec());
        set.push('3', "a");
        set.push('3', "b");
        set.push('2', "c");

        assert_eq!(set.get('3'), &["a".to_string(), "b".to_string()]);
        assert_eq!(set.first('3'), Some("a"));
        assert_eq!(set.last('3'), Some("b"));
        assert_eq!(set.count('2'), 1);
        assert_eq!(set.total(), 3);
    }

    #[test]
    fn test_drain_empties_bucket() {
        let mut set = RegisterSet::new(Layout::Portaria671.spec());
        set.push('1', "h1");
        set.push('1', "h2");
        set.push('3', "p1");

        assert_eq!(set.drain('1'), vec!["h1".to_string(), "h2".to_string()]);
        assert_eq!(set.count('1'), 0);
        assert_eq!(set.count('3'), 1);
        // Drained bucket stays in the map
        assert_eq!(set.iter().count(), 6);
        assert!(set.drain('6').is_empty());
        assert!(set.drain('8').is_empty());
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let mut set = RegisterSet::new(Layout::Portaria671.spec());
        set.push('2', "ACME Corp");
        set.push('3', "punch acme");
        set.push('3', "punch other");

        let found = set.search("acme");
        assert_eq!(found.total(), 2);
        assert_eq!(found.iter().count(), 2);
        assert!(set.search("nothing").iter().next().is_none());
    }

    #[test]
    fn test_filter_single_type() {
        let mut set = RegisterSet::new(Layout::Portaria671.spec());
        set.push('2', "company");
        set.push('3', "punch");

        let only = set.filter('3');
        assert_eq!(only.total(), 1);
        assert_eq!(only.get('3'), &["punch".to_string()]);
        assert_eq!(set.filter('7').total(), 0);
    }

    #[test]
    fn test_serializes_as_plain_map() {
        let mut set = RegisterSet::new(Layout::Portaria1510.spec());
        set.push('3', "x");
        let json = serde_json::to_value(&set).unwrap();
        assert_eq!(json["3"][0], "x");
        assert_eq!(json["9"].as_array().unwrap().len(), 0);
    }
}
