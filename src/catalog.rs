//! Canonical puzzle catalog entries and the draft builder used to create them.
//!
//! A `CatalogEntry` is the shared "what puzzle is this" record; every owned
//! copy points at one. Entries are matched on the normalized
//! (title, brand, piece count) triple so the same product described twice
//! collapses onto one record.

use crate::error::CatalogError;
use crate::types::{CatalogId, TimeStamp};
use chrono::Utc;

#[derive(minicbor::Encode, minicbor::Decode, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Difficulty {
    #[n(0)]
    Easy,
    #[n(1)]
    Medium,
    #[n(2)]
    Hard,
    #[n(3)]
    Expert,
}

#[derive(Debug, Clone, PartialEq, Eq, minicbor::Encode, minicbor::Decode)]
pub struct CatalogEntry {
    #[n(0)]
    pub id: CatalogId,
    #[n(1)]
    pub title: String,
    #[n(2)]
    pub brand: Option<String>,
    #[n(3)]
    pub piece_count: u32,
    #[n(4)]
    pub difficulty: Option<Difficulty>,
    #[n(5)]
    pub category: Option<String>,
    #[n(6)]
    pub description: Option<String>,
    #[n(7)]
    pub tags: Vec<String>,
    #[n(8)]
    pub images: Vec<String>,
    // lowercase concatenation of the text fields, kept for fuzzy lookup
    #[n(9)]
    pub search_text: String,
    #[n(10)]
    pub created_at: TimeStamp<Utc>,
}

// Also used for constructing drafts before deduplication
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CatalogDraft {
    title: String,
    piece_count: u32,
    brand: Option<String>,
    difficulty: Option<Difficulty>,
    category: Option<String>,
    description: Option<String>,
    tags: Vec<String>,
    images: Vec<String>,
}

impl CatalogDraft {
    /// Construct a new draft; title and piece count are the identity fields.
    pub fn new(title: &str, piece_count: u32) -> Self {
        Self {
            title: title.to_owned(),
            piece_count,
            ..Self::default()
        }
    }
    pub fn set_brand(mut self, brand: &str) -> Self {
        self.brand = Some(brand.to_owned());
        self
    }
    pub fn set_difficulty(mut self, difficulty: Difficulty) -> Self {
        self.difficulty = Some(difficulty);
        self
    }
    pub fn set_category(mut self, category: &str) -> Self {
        self.category = Some(category.to_owned());
        self
    }
    pub fn set_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_owned());
        self
    }
    pub fn add_tag(mut self, tag: &str) -> Self {
        self.tags.push(tag.to_owned());
        self
    }
    pub fn add_image(mut self, reference: &str) -> Self {
        self.images.push(reference.to_owned());
        self
    }

    pub fn piece_count(&self) -> u32 {
        self.piece_count
    }

    /// Checks the identity fields before any store access.
    pub fn validate(&self) -> Result<(), CatalogError> {
        if self.title.trim().is_empty() {
            return Err(CatalogError::EmptyTitle);
        }
        if self.piece_count == 0 {
            return Err(CatalogError::ZeroPieceCount);
        }
        Ok(())
    }

    /// True when the draft describes the same product as an existing entry.
    /// Piece count is assumed pre-filtered by the caller.
    pub fn matches(&self, entry: &CatalogEntry) -> bool {
        normalize(&self.title) == normalize(&entry.title)
            && normalize_brand(self.brand.as_deref()) == normalize_brand(entry.brand.as_deref())
    }

    /// Uniqueness key for the normalized (title, brand, piece count) triple.
    pub fn fingerprint(&self) -> String {
        let brand = normalize_brand(self.brand.as_deref()).unwrap_or_default();
        sha256::digest(format!(
            "{}\x1f{}\x1f{}",
            normalize(&self.title),
            brand,
            self.piece_count
        ))
    }

    /// Finalise the draft into a new entry with a fresh id and the derived
    /// searchable-text blob.
    pub fn into_entry(self) -> CatalogEntry {
        let search_text = build_search_text(
            &self.title,
            self.brand.as_deref(),
            self.category.as_deref(),
            self.description.as_deref(),
            &self.tags,
        );

        CatalogEntry {
            id: CatalogId::generate(),
            title: self.title,
            brand: self.brand,
            piece_count: self.piece_count,
            difficulty: self.difficulty,
            category: self.category,
            description: self.description,
            tags: self.tags,
            images: self.images,
            search_text,
            created_at: TimeStamp::new(),
        }
    }
}

fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

// an empty or whitespace-only brand counts as "no brand"
fn normalize_brand(brand: Option<&str>) -> Option<String> {
    brand.map(normalize).filter(|b| !b.is_empty())
}

fn build_search_text(
    title: &str,
    brand: Option<&str>,
    category: Option<&str>,
    description: Option<&str>,
    tags: &[String],
) -> String {
    let mut parts = vec![title.to_owned()];
    parts.extend(brand.map(str::to_owned));
    parts.extend(category.map(str::to_owned));
    parts.extend(description.map(str::to_owned));
    parts.extend(tags.iter().cloned());

    parts.join(" ").to_lowercase()
}
