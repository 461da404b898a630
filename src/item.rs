//! Defines [`ContentItem`], the validated form of a post as it enters the
//! feed, [`RawItem`], the unvalidated form produced by a
//! [`crate::collection::ContentSource`], and [`FeedEntry`], the projection of
//! a [`ContentItem`] into a feed.

use chrono::{DateTime, FixedOffset, NaiveDate, ParseError};
use std::convert::TryFrom;
use std::fmt;

/// A post's publish date. Comparison is on the instant, so items with
/// different offsets still order correctly.
pub type PublishDate = DateTime<FixedOffset>;

/// A single published post.
#[derive(Clone, Debug, PartialEq)]
pub struct ContentItem {
    /// The unique, URL-safe identifier of the post. Used to build its link.
    pub slug: String,

    /// The title of the post.
    pub title: String,

    /// A short description of the post. May be empty.
    pub description: String,

    /// When the post was published. Only used for ordering and as the
    /// entry's date.
    pub publish_date: PublishDate,
}

impl ContentItem {
    /// Checks that the required text fields aren't blank.
    pub fn validate(&self) -> Result<(), MalformedItem> {
        if self.slug.trim_matches(|c: char| c == '/' || c.is_whitespace()).is_empty() {
            return Err(MalformedItem::new(None, Field::Slug));
        }
        if self.title.trim().is_empty() {
            return Err(MalformedItem::new(Some(&self.slug), Field::Title));
        }
        Ok(())
    }
}

/// A post before validation. Every field is optional so that a missing one
/// can be reported as a [`MalformedItem`] instead of a deserialization error.
#[derive(Clone, Debug, Default)]
pub struct RawItem {
    pub slug: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub publish_date: Option<PublishDate>,
}

impl TryFrom<RawItem> for ContentItem {
    type Error = MalformedItem;

    fn try_from(raw: RawItem) -> Result<ContentItem, MalformedItem> {
        let slug = raw.slug.ok_or_else(|| MalformedItem::new(None, Field::Slug))?;
        let title = raw
            .title
            .ok_or_else(|| MalformedItem::new(Some(&slug), Field::Title))?;
        let publish_date = raw
            .publish_date
            .ok_or_else(|| MalformedItem::new(Some(&slug), Field::PublishDate))?;
        let item = ContentItem {
            slug,
            title,
            description: raw.description.unwrap_or_default(),
            publish_date,
        };
        item.validate()?;
        Ok(item)
    }
}

/// A [`ContentItem`] projected into a feed. Title and description pass
/// through unchanged.
#[derive(Clone, Debug, PartialEq)]
pub struct FeedEntry {
    pub title: String,
    pub publish_date: PublishDate,
    pub description: String,
    pub link: String,
}

/// Parses a post date. Accepts RFC 3339 timestamps and bare `YYYY-MM-DD`
/// dates; the latter are taken as midnight UTC.
pub fn parse_date(input: &str) -> Result<PublishDate, ParseError> {
    let input = input.trim();
    match DateTime::parse_from_rfc3339(input) {
        Ok(date) => Ok(date),
        Err(rfc3339_err) => match NaiveDate::parse_from_str(input, "%Y-%m-%d") {
            Ok(date) => Ok(date
                .and_hms_opt(0, 0, 0)
                .unwrap_or_default()
                .and_utc()
                .fixed_offset()),
            // Report the RFC 3339 failure; it is the more general format.
            Err(_) => Err(rfc3339_err),
        },
    }
}

/// The required [`ContentItem`] fields.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Field {
    Slug,
    Title,
    PublishDate,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            Field::Slug => "slug",
            Field::Title => "title",
            Field::PublishDate => "publish date",
        })
    }
}

/// Returned when a post is missing a required field. A feed must not silently
/// drop posts, so this fails the whole build.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MalformedItem {
    /// The slug of the offending post, when it has one.
    pub slug: Option<String>,

    /// The missing field.
    pub field: Field,
}

impl MalformedItem {
    fn new(slug: Option<&str>, field: Field) -> MalformedItem {
        MalformedItem {
            slug: slug.map(str::to_owned),
            field,
        }
    }
}

impl fmt::Display for MalformedItem {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.slug {
            Some(slug) => write!(f, "post `{}` is missing its {}", slug, self.field),
            None => write!(f, "post is missing its {}", self.field),
        }
    }
}

impl std::error::Error for MalformedItem {}
