//! The library code for the `arpeggios` feed generator. Generating the feed
//! breaks down into a few distinct steps:
//!
//! 1. Resolving the site's base path from the configured strategy
//!    ([`crate::base_path`])
//! 2. Loading posts from a content source ([`crate::collection`])
//! 3. Sorting the posts and linking them under the base path
//!    ([`crate::feed`], [`crate::link`])
//! 4. Serializing the result as RSS or Atom ([`crate::render`])
//!
//! Steps 1 and 3 are pure: given the same configuration and posts, they
//! produce the same feed. [`crate::build`] strings the steps together for the
//! command-line driver.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]

pub mod base_path;
pub mod build;
pub mod collection;
pub mod config;
pub mod feed;
pub mod item;
pub mod link;
pub mod render;
