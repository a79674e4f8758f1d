//! Duplicate detection by listing identity.

use crate::dataset::RawListing;
use std::collections::HashSet;
use std::fmt;

/// Identity of a raw listing, strongest available first.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DedupKey {
    Id(String),
    Url(String),
    /// Normalized title, price text and coordinates.
    Composite(String),
}

impl DedupKey {
    pub fn of(raw: &RawListing) -> Self {
        if let Some(id) = non_empty(&raw.id) {
            return DedupKey::Id(id.to_string());
        }
        if let Some(url) = non_empty(&raw.url) {
            return DedupKey::Url(url.to_string());
        }
        let title = raw
            .title
            .as_deref()
            .unwrap_or_default()
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase();
        DedupKey::Composite(format!(
            "{}|{}|{}|{}",
            title,
            raw.price.as_deref().unwrap_or_default().trim(),
            raw.latitude.as_deref().unwrap_or_default().trim(),
            raw.longitude.as_deref().unwrap_or_default().trim(),
        ))
    }
}

impl fmt::Display for DedupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DedupKey::Id(v) | DedupKey::Url(v) | DedupKey::Composite(v) => f.write_str(v),
        }
    }
}

fn non_empty(field: &Option<String>) -> Option<&str> {
    field.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// First-seen-wins filter over [`DedupKey`]s.
#[derive(Debug, Default)]
pub struct Deduplicator {
    seen: HashSet<DedupKey>,
}

impl Deduplicator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `key`; returns `false` if it was already seen.
    pub fn first_seen(&mut self, key: &DedupKey) -> bool {
        if self.seen.contains(key) {
            return false;
        }
        self.seen.insert(key.clone())
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(id: Option<&str>, url: Option<&str>, title: &str) -> RawListing {
        RawListing {
            id: id.map(String::from),
            url: url.map(String::from),
            title: Some(title.to_string()),
            price: Some("$1,000".to_string()),
            latitude: Some("49.2".to_string()),
            longitude: Some("-123.1".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_key_prefers_id_then_url() {
        assert_eq!(
            DedupKey::of(&raw(Some("42"), Some("https://a"), "t")),
            DedupKey::Id("42".into())
        );
        assert_eq!(
            DedupKey::of(&raw(Some("  "), Some("https://a"), "t")),
            DedupKey::Url("https://a".into())
        );
    }

    #[test]
    fn test_composite_key_normalizes_title() {
        let a = DedupKey::of(&raw(None, None, "Cozy   Room"));
        let b = DedupKey::of(&raw(None, None, "cozy room"));
        assert_eq!(a, b);
        assert!(matches!(a, DedupKey::Composite(_)));
    }

    #[test]
    fn test_first_seen_wins() {
        let mut dedup = Deduplicator::new();
        let key = DedupKey::Id("1".into());
        assert!(dedup.first_seen(&key));
        assert!(!dedup.first_seen(&key));
        assert!(dedup.first_seen(&DedupKey::Id("2".into())));
        assert_eq!(dedup.len(), 2);
    }
}
