use serde::{Deserialize, Serialize};

use crate::error::LemmacloudError;

/// How many search results a single run may fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultCount(u32);

impl ResultCount {
    pub const MIN: u32 = 1;
    pub const MAX: u32 = 50;

    pub fn new(value: u32) -> Result<Self, LemmacloudError> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(LemmacloudError::InvalidResultCount {
                got: value,
                min: Self::MIN,
                max: Self::MAX,
            })
        }
    }

    pub fn get(self) -> usize {
        self.0 as usize
    }
}

impl Default for ResultCount {
    fn default() -> Self {
        Self(5)
    }
}

impl TryFrom<u32> for ResultCount {
    type Error = LemmacloudError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// A URL handed out by the discoverer. Opaque to the rest of the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PageAddress(String);

impl PageAddress {
    pub fn new(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PageAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PageAddress {
    fn from(url: &str) -> Self {
        Self::new(url)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermFrequency {
    pub term: String,
    pub count: usize,
}

impl TermFrequency {
    pub fn new(term: impl Into<String>, count: usize) -> Self {
        Self {
            term: term.into(),
            count,
        }
    }
}

/// Most frequent lemmas, count descending, ties in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TopKResult(Vec<TermFrequency>);

impl TopKResult {
    pub fn new(entries: Vec<TermFrequency>) -> Self {
        Self(entries)
    }

    pub fn entries(&self) -> &[TermFrequency] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn total_count(&self) -> usize {
        self.0.iter().map(|e| e.count).sum()
    }

    /// `(term, count)` in rank order.
    pub fn as_pairs(&self) -> Vec<(&str, usize)> {
        self.0.iter().map(|e| (e.term.as_str(), e.count)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_count_bounds() {
        assert!(ResultCount::new(0).is_err());
        assert_eq!(ResultCount::new(1).unwrap().get(), 1);
        assert_eq!(ResultCount::new(50).unwrap().get(), 50);
        assert!(matches!(
            ResultCount::try_from(51),
            Err(LemmacloudError::InvalidResultCount { got: 51, .. })
        ));
        assert_eq!(ResultCount::default().get(), 5);
    }

    #[test]
    fn test_top_k_serializes_as_list() {
        let top = TopKResult::new(vec![TermFrequency::new("Тур", 2)]);
        let json = serde_json::to_string(&top).unwrap();
        assert_eq!(json, r#"[{"term":"Тур","count":2}]"#);
        assert_eq!(top.total_count(), 2);
    }
}
