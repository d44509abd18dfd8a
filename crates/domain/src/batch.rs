//! The unit of exchange between a pager and the stream engine.

use serde::{Deserialize, Serialize};

/// One page of a feed plus the continuation cursor for the next fetch.
///
/// Items are ordered newest-first, exactly as cursor-paginated feed
/// APIs return them. The engine replays them in reverse so emission
/// stays chronological.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Batch<T> {
    pub items: Vec<T>,
    /// Continuation token, opaque to the engine. `None` means the next
    /// round should poll the live head again.
    #[serde(default)]
    pub cursor: Option<String>,
}

impl<T> Batch<T> {
    pub fn new(items: Vec<T>, cursor: Option<String>) -> Self {
        Self { items, cursor }
    }

    /// A batch with no items and no continuation: "nothing newer yet".
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            cursor: None,
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<T> From<Vec<T>> for Batch<T> {
    fn from(items: Vec<T>) -> Self {
        Self {
            items,
            cursor: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_vec_has_no_continuation() {
        let batch = Batch::from(vec![3, 2, 1]);
        assert_eq!(batch.len(), 3);
        assert!(batch.cursor.is_none());
    }

    #[test]
    fn empty_batch_is_empty() {
        let batch: Batch<u32> = Batch::empty();
        assert!(batch.is_empty());
        assert!(batch.cursor.is_none());
    }

    #[test]
    fn missing_cursor_field_deserializes_as_none() {
        let batch: Batch<String> = serde_json::from_str(r#"{"items":["0x1"]}"#).unwrap();
        assert_eq!(batch.items, vec!["0x1".to_string()]);
        assert!(batch.cursor.is_none());
    }
}
