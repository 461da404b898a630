//! Exports the [`build_feed`] function which stitches together the high-level
//! steps of producing the feed file: resolving the base path
//! ([`crate::base_path`]), loading the posts ([`crate::collection`]),
//! building the feed ([`crate::feed`]), and serializing it to disk
//! ([`crate::render`]).

use crate::base_path::Environment;
use crate::collection::{ContentSource, Directory, Error as CollectionError};
use crate::config::Config;
use crate::feed::{Error as FeedError, FeedBuilder};
use crate::render::{write_feed, Error as RenderError};
use std::fmt;
use std::fs::File;
use std::path::PathBuf;

/// Builds the feed described by a [`Config`] and writes it to
/// [`Config::output_file`]. Posts come from [`Config::content_directory`].
pub fn build_feed(config: &Config, env: &Environment) -> Result<()> {
    build_feed_from(config, env, &Directory::new(&config.content_directory))
}

/// Like [`build_feed`], but reads posts from any [`ContentSource`].
pub fn build_feed_from(
    config: &Config,
    env: &Environment,
    source: &dyn ContentSource,
) -> Result<()> {
    let base_path = config.base_path.resolve(env);
    log::info!("Using base path `{}`", base_path);

    let items = source.load()?;

    let document = FeedBuilder::new(
        &base_path,
        config.site_origin.as_ref(),
        config.metadata.clone(),
    )
    .max_entries(config.max_entries)
    .require_entries(config.require_entries)
    .build(&items)?;
    log::info!(
        "Built feed with {} of {} posts",
        document.entries.len(),
        items.len()
    );

    if let Some(dir) = config.output_file.parent() {
        std::fs::create_dir_all(dir).map_err(|err| Error::Output {
            path: dir.to_owned(),
            err,
        })?;
    }
    let file = File::create(&config.output_file).map_err(|err| Error::Output {
        path: config.output_file.clone(),
        err,
    })?;
    write_feed(&document, config.dialect, file)?;
    log::info!("Wrote {:?} feed to `{}`", config.dialect, config.output_file.display());
    Ok(())
}

type Result<T> = std::result::Result<T, Error>;

/// The error type for building a feed. Errors can come from loading posts,
/// building the feed, serializing it, or writing the output file.
#[derive(Debug)]
pub enum Error {
    /// Returned for errors loading the posts.
    Collection(CollectionError),

    /// Returned for errors building the feed.
    Feed(FeedError),

    /// Returned for errors serializing the feed.
    Render(RenderError),

    /// Returned for I/O problems creating the output file.
    Output { path: PathBuf, err: std::io::Error },
}

impl fmt::Display for Error {
    /// Implements [`fmt::Display`] for [`Error`].
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Collection(err) => err.fmt(f),
            Error::Feed(err) => err.fmt(f),
            Error::Render(err) => err.fmt(f),
            Error::Output { path, err } => {
                write!(f, "Writing feed '{}': {}", path.display(), err)
            }
        }
    }
}

impl std::error::Error for Error {
    /// Implements [`std::error::Error`] for [`Error`].
    /// Each variant's message already includes the wrapped error, so the
    /// source is that error's own source.
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Collection(err) => std::error::Error::source(err),
            Error::Feed(err) => std::error::Error::source(err),
            Error::Render(err) => std::error::Error::source(err),
            Error::Output { path: _, err } => std::error::Error::source(err),
        }
    }
}

impl From<CollectionError> for Error {
    /// Converts [`CollectionError`]s into [`Error`]. This allows us to use the
    /// `?` operator.
    fn from(err: CollectionError) -> Error {
        Error::Collection(err)
    }
}

impl From<FeedError> for Error {
    /// Converts [`FeedError`]s into [`Error`]. This allows us to use the `?`
    /// operator.
    fn from(err: FeedError) -> Error {
        Error::Feed(err)
    }
}

impl From<RenderError> for Error {
    /// Converts [`RenderError`]s into [`Error`]. This allows us to use the `?`
    /// operator.
    fn from(err: RenderError) -> Error {
        Error::Render(err)
    }
}
