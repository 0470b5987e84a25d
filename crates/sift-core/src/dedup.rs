//! Dedup key derivation for bibliographic records.
//!
//! A key identifies the underlying work, not the fetched record:
//!
//! ```text
//! doi:10.1000/xyz123
//! title:deeplearningforsepsis|author:smith|year:2020
//! ```
//!
//! The DOI form wins whenever a non-blank DOI is present. The composite form
//! tolerates casing, punctuation, whitespace, and accent differences between
//! sources. Retitled preprints produce different keys; that is accepted.

use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

use crate::entities::{Candidate, ExternalPaper};

/// Placeholder some sources return instead of an empty abstract.
pub const MISSING_ABSTRACT: &str = "No abstract available";

const UNKNOWN_AUTHOR: &str = "unknown";
const UNKNOWN_YEAR: &str = "na";

/// Read access to the fields that participate in a dedup key.
pub trait Bibliographic {
    fn doi(&self) -> Option<&str>;
    fn title(&self) -> &str;
    fn first_author(&self) -> Option<&str>;
    fn year(&self) -> Option<i32>;
}

impl Bibliographic for ExternalPaper {
    fn doi(&self) -> Option<&str> {
        self.doi.as_deref()
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn first_author(&self) -> Option<&str> {
        self.authors.first().map(String::as_str)
    }

    fn year(&self) -> Option<i32> {
        self.year
    }
}

impl Bibliographic for Candidate {
    fn doi(&self) -> Option<&str> {
        self.doi.as_deref()
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn first_author(&self) -> Option<&str> {
        self.authors.first().map(String::as_str)
    }

    fn year(&self) -> Option<i32> {
        self.year
    }
}

/// Derive the dedup key for a record. Pure and deterministic.
#[must_use]
pub fn derive_key<R: Bibliographic + ?Sized>(record: &R) -> String {
    if let Some(doi) = record.doi().map(str::trim).filter(|d| !d.is_empty()) {
        return format!("doi:{}", doi.to_lowercase());
    }

    let title = normalize(record.title());
    let author = record
        .first_author()
        .map(normalize)
        .filter(|a| !a.is_empty())
        .unwrap_or_else(|| UNKNOWN_AUTHOR.to_string());
    let year = record
        .year()
        .map_or_else(|| UNKNOWN_YEAR.to_string(), |y| y.to_string());

    format!("title:{title}|author:{author}|year:{year}")
}

/// Lowercase, strip diacritics, and drop every non-alphanumeric character.
#[must_use]
pub fn normalize(text: &str) -> String {
    text.nfkd()
        .filter(|c| !is_combining_mark(*c) && c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .filter(|c| !is_combining_mark(*c))
        .collect()
}

/// True for an empty abstract or the missing-abstract placeholder.
#[must_use]
pub fn is_missing_abstract(abstract_text: &str) -> bool {
    let trimmed = abstract_text.trim();
    trimmed.is_empty()
        || trimmed
            .trim_end_matches('.')
            .eq_ignore_ascii_case(MISSING_ABSTRACT)
}
