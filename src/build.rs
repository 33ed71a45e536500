//! Parse stage of a feed build.
//!
//! Reads every configured source, normalizes it with the standard descriptor
//! list, and runs the result through a [`Pipeline`] of transforms. Sources are
//! processed concurrently, but output keeps configuration order and each
//! feed keeps its source item order.
//!
//! A source that cannot be read or normalized is reported in
//! [`BuildOutput::errors`] and left out of [`BuildOutput::feeds`]. It never
//! aborts its siblings.

use std::path::PathBuf;

use futures::stream::{self, StreamExt};
use thiserror::Error;

use crate::config::{Config, SourceConfig};
use crate::feed::{default_descriptors, normalize, JsonFeed, JsonFeedItem, ParseError};

/// Errors that can occur while building a single source.
#[derive(Debug, Error)]
pub enum BuildError {
    /// Raw feed document could not be read
    #[error("Failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Document is not a supported feed
    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// A build failure attributed to one source.
#[derive(Debug, Error)]
#[error("{label}: {error}")]
pub struct SourceError {
    pub label: String,
    #[source]
    pub error: BuildError,
}

#[derive(Debug, Default)]
pub struct BuildOutput {
    /// Successfully built feeds, in configuration order.
    pub feeds: Vec<JsonFeed>,
    pub errors: Vec<SourceError>,
}

pub type FeedTransform = Box<dyn Fn(JsonFeed, &SourceConfig) -> JsonFeed + Send + Sync>;
pub type ItemTransform = Box<dyn Fn(JsonFeedItem, &SourceConfig) -> JsonFeedItem + Send + Sync>;

/// Ordered transforms applied to every normalized feed.
///
/// Each transform receives the previous record and returns a new one; they
/// run in registration order. Feed transforms run first, then item
/// transforms on every item.
pub struct Pipeline {
    feed_transforms: Vec<FeedTransform>,
    item_transforms: Vec<ItemTransform>,
}

impl Pipeline {
    /// A pipeline with no transforms.
    pub fn empty() -> Self {
        Self {
            feed_transforms: Vec::new(),
            item_transforms: Vec::new(),
        }
    }

    pub fn with_feed_transform(
        mut self,
        transform: impl Fn(JsonFeed, &SourceConfig) -> JsonFeed + Send + Sync + 'static,
    ) -> Self {
        self.feed_transforms.push(Box::new(transform));
        self
    }

    pub fn with_item_transform(
        mut self,
        transform: impl Fn(JsonFeedItem, &SourceConfig) -> JsonFeedItem + Send + Sync + 'static,
    ) -> Self {
        self.item_transforms.push(Box::new(transform));
        self
    }

    pub fn apply(&self, feed: JsonFeed, source: &SourceConfig) -> JsonFeed {
        let feed = self
            .feed_transforms
            .iter()
            .fold(feed, |feed, transform| transform(feed, source));

        if self.item_transforms.is_empty() {
            return feed;
        }

        let items = feed
            .items
            .into_iter()
            .map(|item| {
                self.item_transforms
                    .iter()
                    .fold(item, |item, transform| transform(item, source))
            })
            .collect();

        JsonFeed { items, ..feed }
    }
}

/// The standard pipeline: assigns `feed_url` from the source config.
impl Default for Pipeline {
    fn default() -> Self {
        Self::empty().with_feed_transform(assign_feed_url)
    }
}

/// Copies the source's configured `url` into `feed_url`.
pub fn assign_feed_url(feed: JsonFeed, source: &SourceConfig) -> JsonFeed {
    JsonFeed {
        feed_url: source.url.clone().unwrap_or_default(),
        ..feed
    }
}

/// Builds every source in `config`.
///
/// Up to `config.concurrency` sources are in flight at once.
pub async fn run(config: &Config, pipeline: &Pipeline) -> BuildOutput {
    let outcomes: Vec<(&SourceConfig, Result<JsonFeed, BuildError>)> =
        stream::iter(config.sources.iter())
            .map(|source| async move { (source, build_source(source, pipeline).await) })
            .buffered(config.concurrency.max(1))
            .collect()
            .await;

    let mut output = BuildOutput::default();
    for (source, outcome) in outcomes {
        match outcome {
            Ok(feed) => {
                tracing::info!(
                    source = %source.label(),
                    items = feed.items.len(),
                    "Built feed"
                );
                output.feeds.push(feed);
            }
            Err(error) => {
                tracing::warn!(source = %source.label(), error = %error, "Skipping source");
                output.errors.push(SourceError {
                    label: source.label(),
                    error,
                });
            }
        }
    }

    output
}

async fn build_source(source: &SourceConfig, pipeline: &Pipeline) -> Result<JsonFeed, BuildError> {
    let raw = tokio::fs::read(&source.path)
        .await
        .map_err(|e| BuildError::Read {
            path: source.path.clone(),
            source: e,
        })?;

    let feed = normalize(&raw, default_descriptors())?;
    Ok(pipeline.apply(feed, source))
}
