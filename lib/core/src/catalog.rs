//! Catalog records and the derived, immutable entries the index owns.

use crate::error::{Error, Result};
use crate::normalize::{normalize, token_set, NormalizedText};
use serde::{Deserialize, Deserializer, Serialize};

/// A bibliographic record as supplied by the catalog source.
///
/// Accepts Open Library search documents directly: `key` is read as the
/// identifier, `author_name` as the author list, and `authors`/`publisher`
/// may each be a single string or a list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogRecord {
    #[serde(alias = "key")]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, alias = "author_name", deserialize_with = "one_or_many")]
    pub authors: Vec<String>,
    #[serde(
        default,
        deserialize_with = "first_of_many",
        skip_serializing_if = "Option::is_none"
    )]
    pub publisher: Option<String>,
}

impl CatalogRecord {
    pub fn new<I, S>(id: impl Into<String>, title: impl Into<String>, authors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id: id.into(),
            title: title.into(),
            authors: authors.into_iter().map(Into::into).collect(),
            publisher: None,
        }
    }

    #[must_use]
    pub fn with_publisher(mut self, publisher: impl Into<String>) -> Self {
        self.publisher = Some(publisher.into());
        self
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

fn one_or_many<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<OneOrMany>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(OneOrMany::One(s)) => vec![s],
        Some(OneOrMany::Many(v)) => v,
    })
}

fn first_of_many<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(one_or_many(deserializer)?.into_iter().next())
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CatalogDocument {
    Records(Vec<CatalogRecord>),
    Search { docs: Vec<CatalogRecord> },
}

/// Parse a catalog from JSON: either an array of records or a search
/// response object with a `docs` array.
pub fn parse_catalog(json: &str) -> Result<Vec<CatalogRecord>> {
    let document: CatalogDocument = serde_json::from_str(json)?;
    Ok(match document {
        CatalogDocument::Records(records) => records,
        CatalogDocument::Search { docs } => docs,
    })
}

/// A catalog record plus its derived matching keys.
///
/// Built once at fit time and never mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogEntry {
    position: usize,
    record: CatalogRecord,
    normalized_title: NormalizedText,
    // title followed by author names
    search_text: NormalizedText,
    tokens: Vec<String>,
    author_tokens: Vec<String>,
    author_last_names: Vec<String>,
}

impl CatalogEntry {
    /// Derive an entry from a record. `position` is its insertion order.
    pub fn from_record(position: usize, record: CatalogRecord) -> Self {
        let normalized_title = normalize(&record.title);
        let tokens = normalized_title.tokens();
        let search_text = normalize(
            &std::iter::once(record.title.as_str())
                .chain(record.authors.iter().map(String::as_str))
                .collect::<Vec<_>>()
                .join(" "),
        );

        let mut author_tokens: Vec<String> = Vec::new();
        let mut author_last_names: Vec<String> = Vec::new();
        for author in &record.authors {
            let name = normalize(author);
            for token in token_set(name.as_str()) {
                if !author_tokens.contains(&token) {
                    author_tokens.push(token);
                }
            }
            if let Some(last) = name.as_str().split_whitespace().last() {
                if !author_last_names.iter().any(|l| l == last) {
                    author_last_names.push(last.to_string());
                }
            }
        }

        Self {
            position,
            record,
            normalized_title,
            search_text,
            tokens,
            author_tokens,
            author_last_names,
        }
    }

    #[inline]
    #[must_use]
    pub fn position(&self) -> usize {
        self.position
    }

    #[inline]
    #[must_use]
    pub fn id(&self) -> &str {
        &self.record.id
    }

    #[inline]
    #[must_use]
    pub fn title(&self) -> &str {
        &self.record.title
    }

    #[inline]
    #[must_use]
    pub fn authors(&self) -> &[String] {
        &self.record.authors
    }

    #[inline]
    #[must_use]
    pub fn publisher(&self) -> Option<&str> {
        self.record.publisher.as_deref()
    }

    #[inline]
    #[must_use]
    pub fn record(&self) -> &CatalogRecord {
        &self.record
    }

    #[inline]
    #[must_use]
    pub fn normalized_title(&self) -> &NormalizedText {
        &self.normalized_title
    }

    /// Normalized title and author names, the text the n-gram index sees
    #[inline]
    #[must_use]
    pub fn search_text(&self) -> &NormalizedText {
        &self.search_text
    }

    /// Distinct title tokens in order of appearance
    #[inline]
    #[must_use]
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// Every normalized token of every author name
    #[inline]
    #[must_use]
    pub fn author_tokens(&self) -> &[String] {
        &self.author_tokens
    }

    #[inline]
    #[must_use]
    pub fn author_last_names(&self) -> &[String] {
        &self.author_last_names
    }

    /// Entries whose title normalizes to nothing cannot be scored.
    pub fn validate(&self) -> Result<()> {
        if self.tokens.is_empty() {
            return Err(Error::MalformedEntry {
                id: self.record.id.clone(),
                reason: "title is empty after normalization".to_string(),
            });
        }
        Ok(())
    }
}
