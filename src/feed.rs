//! Builds a [`FeedDocument`] out of a list of [`ContentItem`]s: sorts them
//! most recent first, links each under the base path, and projects them into
//! [`FeedEntry`]s. Serialization lives in [`crate::render`].

use crate::item::{ContentItem, FeedEntry, MalformedItem};
use crate::link::{home_link, post_link};
use std::fmt;
use url::Url;

/// The top-level feed fields, passed through unchanged.
#[derive(Clone, Debug, PartialEq)]
pub struct FeedMetadata {
    pub title: String,
    pub description: String,
}

/// The structured feed, ready for serialization in any dialect.
#[derive(Clone, Debug, PartialEq)]
pub struct FeedDocument {
    pub title: String,
    pub description: String,

    /// The site's home page: the base path, qualified with the site origin
    /// when one is known.
    pub link: String,

    /// The entries, most recent first.
    pub entries: Vec<FeedEntry>,
}

/// Bundled configuration for building a feed.
pub struct FeedBuilder<'a> {
    base_path: &'a str,
    site_origin: Option<&'a Url>,
    metadata: FeedMetadata,
    max_entries: Option<usize>,
    require_entries: bool,
}

impl<'a> FeedBuilder<'a> {
    /// Constructs a new `FeedBuilder`
    ///
    /// # Arguments
    ///
    /// * `base_path` - the resolved base path (see
    ///   [`crate::base_path::BasePathStrategy::resolve`]).
    /// * `site_origin` - when present, entry links are absolute URLs;
    ///   otherwise they are root-relative.
    /// * `metadata` - the feed's title and description.
    pub fn new(
        base_path: &'a str,
        site_origin: Option<&'a Url>,
        metadata: FeedMetadata,
    ) -> FeedBuilder<'a> {
        FeedBuilder {
            base_path,
            site_origin,
            metadata,
            max_entries: None,
            require_entries: false,
        }
    }

    /// Keeps only the `max` most recent entries. `None` keeps them all.
    pub fn max_entries(mut self, max: Option<usize>) -> Self {
        self.max_entries = max;
        self
    }

    /// Makes [`FeedBuilder::build`] fail with [`Error::EmptyCollection`]
    /// rather than return a feed without entries.
    pub fn require_entries(mut self, require: bool) -> Self {
        self.require_entries = require;
        self
    }

    /// Builds the feed. `items` is left untouched; equal publish dates keep
    /// their relative input order. Fails on the first malformed item rather
    /// than omitting it.
    pub fn build(&self, items: &[ContentItem]) -> Result<FeedDocument> {
        for item in items {
            item.validate()?;
        }

        let mut sorted: Vec<&ContentItem> = items.iter().collect();
        // `sort_by` is stable.
        sorted.sort_by(|a, b| b.publish_date.cmp(&a.publish_date));
        if let Some(max) = self.max_entries {
            sorted.truncate(max);
        }

        if sorted.is_empty() && self.require_entries {
            return Err(Error::EmptyCollection);
        }

        Ok(FeedDocument {
            title: self.metadata.title.clone(),
            description: self.metadata.description.clone(),
            link: home_link(self.site_origin, self.base_path),
            entries: sorted.into_iter().map(|item| self.entry(item)).collect(),
        })
    }

    fn entry(&self, item: &ContentItem) -> FeedEntry {
        FeedEntry {
            title: item.title.clone(),
            publish_date: item.publish_date,
            description: item.description.clone(),
            link: post_link(self.site_origin, self.base_path, &item.slug),
        }
    }
}

type Result<T> = std::result::Result<T, Error>;

/// Represents a problem building a feed.
#[derive(Debug, PartialEq)]
pub enum Error {
    /// Returned when an item lacks a required field.
    MalformedItem(MalformedItem),

    /// Returned when entries are required but there are none.
    EmptyCollection,
}

impl fmt::Display for Error {
    /// Implements [`fmt::Display`] for [`Error`].
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::MalformedItem(err) => err.fmt(f),
            Error::EmptyCollection => write!(f, "the feed has no entries"),
        }
    }
}

impl std::error::Error for Error {
    /// Implements [`std::error::Error`] for [`Error`].
    /// Each variant's message already includes the wrapped error, so the
    /// source is that error's own source.
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::MalformedItem(err) => std::error::Error::source(err),
            Error::EmptyCollection => None,
        }
    }
}

impl From<MalformedItem> for Error {
    /// Converts [`MalformedItem`]s into [`Error`]. This allows us to use the
    /// `?` operator when validating items.
    fn from(err: MalformedItem) -> Error {
        Error::MalformedItem(err)
    }
}
