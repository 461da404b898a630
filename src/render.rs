//! Serializes a [`FeedDocument`] as RSS 2.0 or Atom 1.0. Output depends only
//! on the document: nothing here reads the clock.

use crate::feed::FeedDocument;
use crate::item::{FeedEntry, PublishDate};
use atom_syndication::{EntryBuilder, FeedBuilder, FixedDateTime, LinkBuilder, Text};
use rss::{ChannelBuilder, GuidBuilder, ItemBuilder};
use serde::Deserialize;
use std::fmt;
use std::io::Write;
use std::str::FromStr;

/// The feed format to emit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    Rss,
    Atom,
}

impl Default for Dialect {
    fn default() -> Self {
        Dialect::Rss
    }
}

impl Dialect {
    /// The conventional output file name for the dialect.
    pub fn default_file_name(self) -> &'static str {
        match self {
            Dialect::Rss => "rss.xml",
            Dialect::Atom => "feed.atom",
        }
    }
}

impl FromStr for Dialect {
    type Err = UnknownDialect;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "rss" => Ok(Dialect::Rss),
            "atom" => Ok(Dialect::Atom),
            _ => Err(UnknownDialect(s.to_owned())),
        }
    }
}

/// Returned when parsing a [`Dialect`] from an unrecognized string.
#[derive(Debug)]
pub struct UnknownDialect(String);

impl fmt::Display for UnknownDialect {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "unknown feed dialect `{}` (expected `rss` or `atom`)", self.0)
    }
}

impl std::error::Error for UnknownDialect {}

/// Serializes `doc` in the given dialect and writes the result to a
/// [`std::io::Write`].
pub fn write_feed<W: Write>(doc: &FeedDocument, dialect: Dialect, w: W) -> Result<()> {
    match dialect {
        Dialect::Rss => {
            rss_channel(doc).write_to(w)?;
        }
        Dialect::Atom => {
            atom_feed(doc).write_to(w)?;
        }
    }
    Ok(())
}

/// Serializes `doc` in the given dialect into a string.
pub fn render(doc: &FeedDocument, dialect: Dialect) -> String {
    match dialect {
        Dialect::Rss => rss_channel(doc).to_string(),
        Dialect::Atom => atom_feed(doc).to_string(),
    }
}

fn rss_channel(doc: &FeedDocument) -> rss::Channel {
    ChannelBuilder::default()
        .title(doc.title.clone())
        .link(doc.link.clone())
        .description(doc.description.clone())
        .items(doc.entries.iter().map(rss_item).collect::<Vec<_>>())
        .build()
}

fn rss_item(entry: &FeedEntry) -> rss::Item {
    ItemBuilder::default()
        .title(Some(entry.title.clone()))
        .link(Some(entry.link.clone()))
        .description(Some(entry.description.clone()))
        .pub_date(Some(entry.publish_date.to_rfc2822()))
        .guid(Some(
            GuidBuilder::default()
                .value(entry.link.clone())
                .permalink(true)
                .build(),
        ))
        .build()
}

fn atom_feed(doc: &FeedDocument) -> atom_syndication::Feed {
    // Entries are sorted, so the first one is the most recent.
    let updated = doc
        .entries
        .first()
        .map(|entry| entry.publish_date)
        .unwrap_or_else(epoch);

    FeedBuilder::default()
        .title(Text::plain(doc.title.clone()))
        .subtitle(Some(Text::plain(doc.description.clone())))
        .id(doc.link.clone())
        .updated(updated)
        .links(vec![alternate_link(&doc.link)])
        .entries(doc.entries.iter().map(atom_entry).collect::<Vec<_>>())
        .build()
}

fn atom_entry(entry: &FeedEntry) -> atom_syndication::Entry {
    let summary = match entry.description.is_empty() {
        true => None,
        false => Some(Text::plain(entry.description.clone())),
    };
    EntryBuilder::default()
        .title(Text::plain(entry.title.clone()))
        .id(entry.link.clone())
        .updated(entry.publish_date)
        .published(Some(entry.publish_date))
        .links(vec![alternate_link(&entry.link)])
        .summary(summary)
        .build()
}

fn alternate_link(href: &str) -> atom_syndication::Link {
    LinkBuilder::default()
        .href(href.to_owned())
        .rel("alternate".to_owned())
        .build()
}

fn epoch() -> PublishDate {
    FixedDateTime::default()
}

type Result<T> = std::result::Result<T, Error>;

/// Represents a problem writing a feed.
#[derive(Debug)]
pub enum Error {
    /// Returned when there is an RSS-related error.
    Rss(rss::Error),

    /// Returned when there is an Atom-related error.
    Atom(atom_syndication::Error),
}

impl fmt::Display for Error {
    /// Implements [`fmt::Display`] for [`Error`].
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Rss(err) => err.fmt(f),
            Error::Atom(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    /// Implements [`std::error::Error`] for [`Error`].
    /// Each variant's message already includes the wrapped error, so the
    /// source is that error's own source.
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Rss(err) => std::error::Error::source(err),
            Error::Atom(err) => std::error::Error::source(err),
        }
    }
}

impl From<rss::Error> for Error {
    /// Converts [`rss::Error`]s into [`Error`]. This allows us to use the `?`
    /// operator when writing RSS.
    fn from(err: rss::Error) -> Error {
        Error::Rss(err)
    }
}

impl From<atom_syndication::Error> for Error {
    /// Converts [`atom_syndication::Error`]s into [`Error`]. This allows us to
    /// use the `?` operator when writing Atom.
    fn from(err: atom_syndication::Error) -> Error {
        Error::Atom(err)
    }
}
