//! Page cursor for list endpoints.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Largest page size the API accepts.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Tracks the page number and page size for a paginated list call.
///
/// Serialized as `{"size": .., "number": ..}`, which becomes
/// `page[size]=..&page[number]=..` once encoded into a query string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub size: u32,
    pub number: u32,
}

impl Page {
    /// A cursor on the first page, with `size` clamped into `1..=100`.
    #[must_use]
    pub fn new(size: u32) -> Self {
        Self {
            size: size.clamp(1, MAX_PAGE_SIZE),
            number: 1,
        }
    }

    /// Advance to the following page. Returns `false`, leaving the cursor
    /// unchanged, when the page number cannot grow any further.
    pub fn advance(&mut self) -> bool {
        match self.number.checked_add(1) {
            Some(next) => {
                self.number = next;
                true
            }
            None => false,
        }
    }

    /// Read a cursor back from a caller-supplied `page` parameter.
    ///
    /// A missing `number` defaults to the first page.
    #[must_use]
    pub fn from_value(value: &Value) -> Option<Self> {
        let size = value.get("size").and_then(Value::as_u64)?;
        let number = value.get("number").and_then(Value::as_u64).unwrap_or(1);
        Some(Self {
            size: u32::try_from(size).ok()?.clamp(1, MAX_PAGE_SIZE),
            number: u32::try_from(number).ok()?.max(1),
        })
    }

    /// The cursor as a JSON parameter value.
    #[must_use]
    pub fn to_value(self) -> Value {
        serde_json::json!({ "size": self.size, "number": self.number })
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new(MAX_PAGE_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_new_starts_on_first_page() {
        let page = Page::new(25);
        assert_eq!(page.size, 25);
        assert_eq!(page.number, 1);
    }

    #[test]
    fn test_size_clamped() {
        assert_eq!(Page::new(0).size, 1);
        assert_eq!(Page::new(500).size, MAX_PAGE_SIZE);
    }

    #[test]
    fn test_advance() {
        let mut page = Page::default();
        assert!(page.advance());
        assert!(page.advance());
        assert_eq!(page.number, 3);
        assert_eq!(page.size, 100);
    }

    #[test]
    fn test_advance_stops_at_last_number() {
        let mut page = Page::from_value(&json!({"size": 1, "number": u32::MAX})).unwrap();
        assert!(!page.advance());
        assert_eq!(page.number, u32::MAX);
    }

    #[test]
    fn test_value_shape() {
        assert_eq!(Page::new(10).to_value(), json!({"size": 10, "number": 1}));
    }

    #[test]
    fn test_from_value() {
        let page = Page::from_value(&json!({"size": 20, "number": 4})).unwrap();
        assert_eq!(page, Page { size: 20, number: 4 });
        let page = Page::from_value(&json!({"size": 20})).unwrap();
        assert_eq!(page.number, 1);
        assert!(Page::from_value(&json!("first")).is_none());
    }
}
