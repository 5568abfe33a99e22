//! Quote Record Data Structure
//!
//! This module defines the `QuoteRecord` struct held by the local store,
//! exchanged with the remote adapter and written to export files.
//!
//! The JSON shape is `{id, text, category, updatedAt, locallyAdded?}` so that
//! collections persisted by earlier versions of the widget load unchanged.
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::Value;

const ID_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const ID_SUFFIX_LEN: usize = 7;

/// A single quote managed by the application
///
/// # Fields
/// * `id` - Opaque identifier, unique within the local store
/// * `text` - The quote itself (never empty once stored)
/// * `category` - Category label (never empty once stored)
/// * `updated_at` - RFC3339 timestamp, used only as a conflict signal
/// * `locally_added` - Created on this device and not yet seen upstream
///
/// # Example
/// ```rust
/// use quote_sync::shared::QuoteRecord;
///
/// let quote = QuoteRecord::new("Stay hungry.", "Motivation");
/// assert!(quote.locally_added);
/// assert!(!quote.id.is_empty());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct QuoteRecord {
    pub id: String,
    pub text: String,
    pub category: String,
    pub updated_at: String,
    #[serde(default, skip_serializing_if = "is_false")]
    pub locally_added: bool,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl QuoteRecord {
    /// Create a locally added quote with a fresh id and the current timestamp
    pub fn new(text: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            id: generate_id(),
            text: text.into(),
            category: category.into(),
            updated_at: now_timestamp(),
            locally_added: true,
        }
    }

    /// Create a quote with every field given explicitly
    pub fn with_id(
        id: impl Into<String>,
        text: impl Into<String>,
        category: impl Into<String>,
        updated_at: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            category: category.into(),
            updated_at: updated_at.into(),
            locally_added: false,
        }
    }

    /// Whether text or category differ from `other`
    ///
    /// Timestamps and flags are ignored.
    pub fn content_differs(&self, other: &QuoteRecord) -> bool {
        self.text != other.text || self.category != other.category
    }

    /// Both required fields are non-empty after trimming
    pub fn is_valid(&self) -> bool {
        !self.text.trim().is_empty() && !self.category.trim().is_empty()
    }

    /// Build a record from a loosely shaped stored JSON object
    ///
    /// Older collections used `title`/`body` instead of `text`/`category`,
    /// and may lack `id` or `updatedAt`. Returns `None` when text or category
    /// end up empty.
    pub fn from_stored_value(value: &Value) -> Option<Self> {
        let text = string_field(value, &["text", "title"])?;
        let category = string_field(value, &["category", "body"])?;
        let id = value.get("id").and_then(coerce_id).unwrap_or_else(generate_id);
        let updated_at = value
            .get("updatedAt")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .unwrap_or_else(now_timestamp);
        let locally_added = value
            .get("locallyAdded")
            .and_then(Value::as_bool)
            .unwrap_or(false);

        Some(Self {
            id,
            text,
            category,
            updated_at,
            locally_added,
        })
    }
}

/// First non-empty trimmed string among `keys`
pub(crate) fn string_field(value: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| value.get(*key))
        .filter_map(|v| match v {
            Value::String(s) => Some(s.trim().to_string()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
        .find(|s| !s.is_empty())
}

/// Coerce a JSON identifier (string or number) to its string form
pub fn coerce_id(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Generate a new quote identifier
///
/// Format: `<unix millis in base36>-<7 random base36 chars>`.
pub fn generate_id() -> String {
    let millis = chrono::Utc::now().timestamp_millis().max(0) as u64;
    let mut rng = rand::rng();
    let suffix: String = (0..ID_SUFFIX_LEN)
        .map(|_| {
            let idx = rng.random_range(0..ID_ALPHABET.len());
            ID_ALPHABET[idx] as char
        })
        .collect();
    format!("{}-{}", to_base36(millis), suffix)
}

/// Current UTC time as an RFC3339 string
pub fn now_timestamp() -> String {
    chrono::Utc::now().to_rfc3339()
}

fn to_base36(mut n: u64) -> String {
    if n == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    while n > 0 {
        digits.push(ID_ALPHABET[(n % 36) as usize]);
        n /= 36;
    }
    digits.reverse();
    String::from_utf8(digits).unwrap_or_default()
}
