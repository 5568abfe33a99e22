//! # Local Store
//!
//! The authoritative in-memory quote collection for this device, mirrored to a
//! durable storage slot after every mutation.
//!
//! ## Responsibilities
//!
//! - **Load**: read the durable slot, normalize legacy shapes, drop invalid
//!   records, fall back to the default seed when missing or unreadable
//! - **CRUD**: add and remove quotes, look them up by id
//! - **Viewing**: category filter, random pick, last-viewed quote (session slot)
//! - **Import/Export**: pretty JSON documents with id collision handling
//! - **Sync hooks**: remote-wins merge and keep-local restore, used by the
//!   sync service
//!
//! Writes always replace the whole collection. When a write fails the store
//! keeps the newer in-memory state, marks itself dirty, and the next
//! successful write catches the slot up.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use quote_sync::app::local_store::LocalStore;
//! use quote_sync::app::storage::MemoryStorage;
//! use std::sync::Arc;
//!
//! let mut store = LocalStore::open(Arc::new(MemoryStorage::new()), Arc::new(MemoryStorage::new()));
//! let quote = store.add("Simplicity is prerequisite for reliability.", "Engineering")?;
//! assert!(store.get(&quote.id).is_some());
//! # Ok::<(), quote_sync::shared::QuoteError>(())
//! ```

use crate::app::storage::{KeyValueStore, FILTER_KEY, LAST_VIEWED_KEY, QUOTES_KEY};
use crate::app::sync::merge::{merge_remote_wins, MergeOutcome};
use crate::shared::quote::string_field;
use crate::shared::{generate_id, now_timestamp, QuoteError, QuoteRecord, Result};
use rand::Rng;
use serde_json::Value;
use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::sync::Arc;

const DEFAULT_QUOTES: [(&str, &str); 3] = [
    ("The only way to do great work is to love what you do.", "Motivation"),
    ("In the middle of every difficulty lies opportunity.", "Inspiration"),
    ("Success is not final, failure is not fatal.", "Perseverance"),
];

/// Category selection used for listing and random picks
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Category(String),
}

impl CategoryFilter {
    /// Parse a stored filter value; `"all"` and empty mean no filter
    pub fn parse(value: &str) -> Self {
        let value = value.trim();
        if value.is_empty() || value == "all" {
            Self::All
        } else {
            Self::Category(value.to_string())
        }
    }

    pub fn matches(&self, quote: &QuoteRecord) -> bool {
        match self {
            Self::All => true,
            Self::Category(category) => &quote.category == category,
        }
    }
}

impl fmt::Display for CategoryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => write!(f, "all"),
            Self::Category(category) => write!(f, "{}", category),
        }
    }
}

/// Local quote collection
#[derive(Debug)]
pub struct LocalStore {
    quotes: Vec<QuoteRecord>,
    durable: Arc<dyn KeyValueStore>,
    session: Arc<dyn KeyValueStore>,
    /// Bumped whenever the collection is wholesale replaced
    generation: u64,
    dirty: bool,
    last_storage_error: Option<QuoteError>,
}

impl LocalStore {
    /// Open the store from its durable slot
    ///
    /// Never fails: unreadable or missing slots fall back to the default seed.
    pub fn open(durable: Arc<dyn KeyValueStore>, session: Arc<dyn KeyValueStore>) -> Self {
        let mut store = Self {
            quotes: Vec::new(),
            durable,
            session,
            generation: 0,
            dirty: false,
            last_storage_error: None,
        };
        store.reload();
        store
    }

    /// Re-read the durable slot, replacing the in-memory collection
    pub fn reload(&mut self) {
        let raw = match self.durable.get(QUOTES_KEY) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!("Failed to read stored quotes: {}", e);
                None
            }
        };

        let loaded = match raw {
            None => None,
            Some(raw) => match parse_stored(&raw) {
                Ok(quotes) => Some(quotes),
                Err(e) => {
                    tracing::warn!("Stored quotes unreadable, using defaults: {}", e);
                    None
                }
            },
        };

        match loaded {
            Some(quotes) => {
                tracing::debug!("Loaded {} quotes from storage", quotes.len());
                self.quotes = quotes;
                self.generation += 1;
            }
            None => {
                self.quotes = default_quotes();
                self.generation += 1;
                self.flush();
            }
        }
    }

    /// Generation number, bumped on every wholesale replacement
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn quotes(&self) -> &[QuoteRecord] {
        &self.quotes
    }

    /// Owned copy of the collection
    pub fn snapshot(&self) -> Vec<QuoteRecord> {
        self.quotes.clone()
    }

    pub fn len(&self) -> usize {
        self.quotes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&QuoteRecord> {
        self.quotes.iter().find(|q| q.id == id)
    }

    /// In-memory state has not reached the durable slot yet
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn last_storage_error(&self) -> Option<&QuoteError> {
        self.last_storage_error.as_ref()
    }

    /// Write the whole collection to the durable slot
    pub fn persist(&mut self) -> Result<()> {
        let json = serde_json::to_string(&self.quotes)?;
        match self.durable.set(QUOTES_KEY, &json) {
            Ok(()) => {
                self.dirty = false;
                self.last_storage_error = None;
                Ok(())
            }
            Err(e) => {
                self.dirty = true;
                self.last_storage_error = Some(e.clone());
                Err(e)
            }
        }
    }

    /// Fail with the pending storage error when memory is ahead of the slot
    ///
    /// Mutations succeed even when the durable write fails. Callers that
    /// exit right after a mutation use this to surface the lost write.
    pub fn check_persisted(&self) -> Result<()> {
        if !self.dirty {
            return Ok(());
        }
        Err(self
            .last_storage_error
            .clone()
            .unwrap_or_else(|| QuoteError::storage("quotes not saved")))
    }

    fn flush(&mut self) {
        if let Err(e) = self.persist() {
            tracing::warn!("Could not save quotes, keeping them in memory: {}", e);
        }
    }

    /// Add a quote entered by the user
    pub fn add(&mut self, text: &str, category: &str) -> Result<QuoteRecord> {
        let text = text.trim();
        let category = category.trim();
        if text.is_empty() {
            return Err(QuoteError::validation("text", "Enter both quote and category"));
        }
        if category.is_empty() {
            return Err(QuoteError::validation("category", "Enter both quote and category"));
        }

        let quote = QuoteRecord::new(text, category);
        self.quotes.push(quote.clone());
        self.flush();
        self.set_last_viewed(&quote.id);
        tracing::info!("Quote {} added locally", quote.id);
        Ok(quote)
    }

    /// Remove exactly one quote by id
    ///
    /// Clears the last-viewed slot when it pointed at the removed quote.
    pub fn remove(&mut self, id: &str) -> Result<QuoteRecord> {
        let index = self
            .quotes
            .iter()
            .position(|q| q.id == id)
            .ok_or_else(|| QuoteError::not_found(id))?;
        let removed = self.quotes.remove(index);
        self.flush();

        if self.last_viewed_id().as_deref() == Some(id) {
            if let Err(e) = self.session.remove(LAST_VIEWED_KEY) {
                tracing::warn!("Could not clear last viewed quote: {}", e);
            }
        }
        Ok(removed)
    }

    /// Replace the whole collection
    pub fn replace_all(&mut self, quotes: Vec<QuoteRecord>) {
        self.quotes = quotes;
        self.generation += 1;
        self.flush();
    }

    /// Remove every quote
    pub fn clear(&mut self) {
        self.replace_all(Vec::new());
    }

    /// Sorted, de-duplicated category labels
    pub fn categories(&self) -> Vec<String> {
        self.quotes
            .iter()
            .map(|q| q.category.trim())
            .filter(|c| !c.is_empty())
            .map(str::to_string)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// The persisted filter, if it still names an existing category
    pub fn selected_filter(&self) -> CategoryFilter {
        let stored = match self.durable.get(FILTER_KEY) {
            Ok(Some(value)) => CategoryFilter::parse(&value),
            Ok(None) => CategoryFilter::All,
            Err(e) => {
                tracing::warn!("Could not read category filter: {}", e);
                CategoryFilter::All
            }
        };
        match &stored {
            CategoryFilter::Category(c) if !self.categories().contains(c) => CategoryFilter::All,
            _ => stored,
        }
    }

    pub fn set_filter(&mut self, filter: &CategoryFilter) -> Result<()> {
        self.durable.set(FILTER_KEY, &filter.to_string())
    }

    pub fn filtered(&self, filter: &CategoryFilter) -> Vec<&QuoteRecord> {
        self.quotes.iter().filter(|q| filter.matches(q)).collect()
    }

    /// Pick a random quote matching `filter` and remember it as last viewed
    ///
    /// Returns `None` when no quote matches; nothing changes in that case.
    pub fn random_quote(&self, filter: &CategoryFilter) -> Option<QuoteRecord> {
        let pool = self.filtered(filter);
        if pool.is_empty() {
            tracing::debug!("No quotes for filter '{}'", filter);
            return None;
        }
        let index = rand::rng().random_range(0..pool.len());
        let quote = pool[index].clone();
        self.set_last_viewed(&quote.id);
        Some(quote)
    }

    /// Show a specific quote, remembering it as last viewed
    pub fn show(&self, id: &str) -> Result<QuoteRecord> {
        let quote = self.get(id).cloned().ok_or_else(|| QuoteError::not_found(id))?;
        self.set_last_viewed(id);
        Ok(quote)
    }

    pub fn last_viewed_id(&self) -> Option<String> {
        self.session.get(LAST_VIEWED_KEY).ok().flatten()
    }

    /// Quote to show at startup: the last viewed one, else a random pick
    pub fn restore_view(&self) -> Option<QuoteRecord> {
        if let Some(id) = self.last_viewed_id() {
            if let Some(quote) = self.get(&id) {
                return Some(quote.clone());
            }
        }
        self.random_quote(&self.selected_filter())
    }

    fn set_last_viewed(&self, id: &str) {
        if let Err(e) = self.session.set(LAST_VIEWED_KEY, id) {
            tracing::debug!("Session storage unavailable: {}", e);
        }
    }

    /// Pretty-printed JSON array of every quote
    pub fn export_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.quotes)?)
    }

    /// Append quotes from a JSON document
    ///
    /// The document must be a top-level array. Elements accept `quote` and
    /// `cat` as fallbacks for `text` and `category`; invalid elements are
    /// skipped; colliding or missing ids are regenerated. Nothing is written
    /// unless at least one element is valid.
    pub fn import_json(&mut self, document: &str) -> Result<usize> {
        let parsed: Value = serde_json::from_str(document)
            .map_err(|e| QuoteError::parse(format!("Failed to import: invalid JSON ({})", e)))?;
        let items = parsed
            .as_array()
            .ok_or_else(|| QuoteError::parse("Imported JSON must be an array of quote objects"))?;

        let mut taken: HashSet<String> = self.quotes.iter().map(|q| q.id.clone()).collect();
        let mut valid = Vec::new();
        for item in items {
            let Some(text) = string_field(item, &["text", "quote"]) else {
                continue;
            };
            let Some(category) = string_field(item, &["category", "cat"]) else {
                continue;
            };
            let id = match item.get("id").and_then(crate::shared::quote::coerce_id) {
                Some(id) if !taken.contains(&id) => id,
                _ => generate_id(),
            };
            taken.insert(id.clone());
            let updated_at = item
                .get("updatedAt")
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .unwrap_or_else(now_timestamp);
            valid.push(QuoteRecord::with_id(id, text, category, updated_at));
        }

        if valid.is_empty() {
            return Err(QuoteError::validation("quotes", "No valid quotes found in file"));
        }

        let count = valid.len();
        self.quotes.extend(valid);
        self.flush();
        tracing::info!("Imported {} quotes", count);
        Ok(count)
    }

    /// Apply a fetched remote collection with remote-wins semantics
    ///
    /// The caller decides when to persist.
    pub fn apply_remote(&mut self, remote: &[QuoteRecord]) -> MergeOutcome {
        merge_remote_wins(&mut self.quotes, remote)
    }

    /// Put a snapshotted local version back in place of the current one
    ///
    /// Text and category come from `version`; the timestamp is stamped now.
    /// Returns `None` without touching the store when the quote was removed
    /// in the meantime.
    pub fn restore(&mut self, version: &QuoteRecord) -> Option<QuoteRecord> {
        let Some(existing) = self.quotes.iter_mut().find(|q| q.id == version.id) else {
            tracing::info!("Quote {} was removed locally, not restoring it", version.id);
            return None;
        };
        existing.text = version.text.clone();
        existing.category = version.category.clone();
        existing.updated_at = now_timestamp();
        let restored = existing.clone();
        self.flush();
        Some(restored)
    }
}

/// File name for an export taken at `now`
///
/// `quotes-export-<timestamp>.json`, with `:` and `.` in the RFC3339 time
/// replaced by `-` so the name is valid on every platform.
pub fn export_file_name(now: chrono::DateTime<chrono::Utc>) -> String {
    let stamp = now
        .to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
        .replace([':', '.'], "-");
    format!("quotes-export-{}.json", stamp)
}

fn default_quotes() -> Vec<QuoteRecord> {
    DEFAULT_QUOTES
        .iter()
        .map(|(text, category)| {
            let mut quote = QuoteRecord::new(*text, *category);
            quote.locally_added = false;
            quote
        })
        .collect()
}

/// Parse the durable collection, dropping invalid entries and duplicate ids
fn parse_stored(raw: &str) -> Result<Vec<QuoteRecord>> {
    let value: Value = serde_json::from_str(raw)?;
    let items = value
        .as_array()
        .ok_or_else(|| QuoteError::parse("stored quotes are not an array"))?;

    let mut seen = HashSet::new();
    let mut quotes = Vec::with_capacity(items.len());
    for item in items {
        let Some(mut quote) = QuoteRecord::from_stored_value(item) else {
            continue;
        };
        if !seen.insert(quote.id.clone()) {
            quote.id = generate_id();
            seen.insert(quote.id.clone());
        }
        quotes.push(quote);
    }
    Ok(quotes)
}
