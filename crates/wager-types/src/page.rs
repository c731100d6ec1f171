use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Offset/limit pagination for list reads.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Page {
    pub limit: usize,
    pub offset: usize,
}

impl Page {
    pub const DEFAULT_LIMIT: usize = 10;

    pub fn new(limit: usize, offset: usize) -> Self {
        Self { limit, offset }
    }

    /// A page large enough to hold every item.
    pub fn all() -> Self {
        Self {
            limit: usize::MAX,
            offset: 0,
        }
    }

    /// Reject zero limits and cap the limit at `max`.
    pub fn validated(self, max: usize) -> Result<Self, TypeError> {
        if self.limit == 0 {
            return Err(TypeError::InvalidPage("limit must be at least 1".into()));
        }
        Ok(Self {
            limit: self.limit.min(max),
            offset: self.offset,
        })
    }

    /// Apply this page to an already ordered sequence.
    pub fn apply<T>(&self, items: impl IntoIterator<Item = T>) -> Vec<T> {
        items.into_iter().skip(self.offset).take(self.limit).collect()
    }
}

impl Default for Page {
    fn default() -> Self {
        Self {
            limit: Self::DEFAULT_LIMIT,
            offset: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_page() {
        let p = Page::default();
        assert_eq!(p.limit, 10);
        assert_eq!(p.offset, 0);
    }

    #[test]
    fn apply_skips_and_takes() {
        let p = Page::new(2, 1);
        assert_eq!(p.apply(1..=5), vec![2, 3]);
        assert!(Page::new(5, 10).apply(1..=5).is_empty());
        assert_eq!(Page::all().apply(1..=3), vec![1, 2, 3]);
    }

    #[test]
    fn validated_caps_limit() {
        assert_eq!(Page::new(500, 3).validated(100).unwrap(), Page::new(100, 3));
        assert!(Page::new(0, 0).validated(100).is_err());
    }

    #[test]
    fn missing_fields_use_defaults() {
        let p: Page = serde_json::from_str(r#"{"offset":20}"#).unwrap();
        assert_eq!(p, Page::new(10, 20));
    }
}
