//! Scrape orchestration: channel resolution and the bounded walker pool.

use crate::download::{Downloader, MediaFetcher};
use crate::error::{Result, ScrapeError};
use crate::options::ScrapeOptions;
use crate::walker::{ChannelOutcome, ChannelReport, ChannelWalker};
use blacksheep_types::{HistorySource, ScrapeTarget, Snowflake};
use std::sync::Arc;
use tokio::fs;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{error, info, warn};

/// Per-channel results of a scrape, in resolution order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScrapeReport {
    pub channels: Vec<ChannelReport>,
}

impl ScrapeReport {
    #[must_use]
    pub fn completed(&self) -> usize {
        self.count(|o| *o == ChannelOutcome::Completed)
    }

    #[must_use]
    pub fn empty(&self) -> usize {
        self.count(|o| *o == ChannelOutcome::Empty)
    }

    #[must_use]
    pub fn aborted(&self) -> usize {
        self.count(|o| matches!(o, ChannelOutcome::Aborted { .. }))
    }

    #[must_use]
    pub fn media_saved(&self) -> usize {
        self.channels.iter().map(|c| c.media_saved).sum()
    }

    #[must_use]
    pub fn messages(&self) -> usize {
        self.channels.iter().map(|c| c.messages).sum()
    }

    fn count(&self, pred: impl Fn(&ChannelOutcome) -> bool) -> usize {
        self.channels.iter().filter(|c| pred(&c.outcome)).count()
    }
}

/// Runs one [`ChannelWalker`] per target channel
pub struct Scraper<S, F> {
    source: Arc<S>,
    downloader: Downloader<F>,
    options: ScrapeOptions,
}

impl<S: HistorySource, F: MediaFetcher> Scraper<S, F> {
    pub fn new(source: Arc<S>, fetcher: F, options: ScrapeOptions) -> Self {
        Self {
            source,
            downloader: Downloader::new(fetcher),
            options,
        }
    }

    /// The explicit channel, or every text channel of the server
    pub async fn resolve_channels(&self, target: &ScrapeTarget) -> Result<Vec<Snowflake>> {
        if let Some(channel) = target.channel_id {
            return Ok(vec![channel]);
        }

        let channels = self
            .source
            .list_channels(target.server_id)
            .await
            .map_err(|source| ScrapeError::Resolve {
                server: target.server_id,
                source,
            })?;

        Ok(channels
            .into_iter()
            .filter(|c| c.is_text())
            .map(|c| c.id)
            .collect())
    }

    /// Scrape every channel of `target` and wait for all of them.
    ///
    /// The first fatal error from any walker cancels the others and is
    /// returned.
    pub async fn run(&self, target: &ScrapeTarget) -> Result<ScrapeReport> {
        fs::create_dir_all(&target.output_dir)
            .await
            .map_err(ScrapeError::fs("create output directory", &target.output_dir))?;

        let channels = self.resolve_channels(target).await?;
        if channels.is_empty() {
            warn!("Server {} has no text channels to scrape", target.server_id);
            return Ok(ScrapeReport::default());
        }

        let workers = self.options.worker_count();
        info!(
            "Scraping {} channel(s) of server {} with {} worker(s)",
            channels.len(),
            target.server_id,
            workers
        );

        let walker = Arc::new(ChannelWalker::new(
            Arc::clone(&self.source),
            self.downloader.clone(),
            target.output_dir.clone(),
            self.options.clone(),
        ));
        let requested = target.channel_id.is_some();
        let permits = Arc::new(Semaphore::new(workers));
        let mut tasks = JoinSet::new();

        for (index, channel_id) in channels.iter().copied().enumerate() {
            let walker = Arc::clone(&walker);
            let permits = Arc::clone(&permits);

            tasks.spawn(async move {
                // The semaphore lives as long as this scrape and is never closed
                let _permit = permits.acquire_owned().await.ok();
                let report = if requested {
                    walker.walk_requested(channel_id).await
                } else {
                    walker.walk(channel_id).await
                };
                report.map(|report| (index, report))
            });
        }

        let mut reports = Vec::with_capacity(channels.len());
        while let Some(joined) = tasks.join_next().await {
            match joined.map_err(ScrapeError::from).and_then(|r| r) {
                Ok(entry) => reports.push(entry),
                Err(e) => {
                    error!("Aborting scrape: {}", e);
                    tasks.abort_all();
                    return Err(e);
                }
            }
        }

        reports.sort_by_key(|(index, _)| *index);
        Ok(ScrapeReport {
            channels: reports.into_iter().map(|(_, report)| report).collect(),
        })
    }
}
