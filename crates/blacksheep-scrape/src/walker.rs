//! Per-channel history traversal.

use crate::download::{Downloader, MediaFetcher};
use crate::error::{Result, ScrapeError};
use crate::media::extract_media;
use crate::mentions::resolve_mentions;
use crate::options::ScrapeOptions;
use blacksheep_types::{ApiError, HistorySource, Message, Snowflake, UserTag};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs::{self, File};
use tokio::io::{AsyncWriteExt, BufWriter};
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

/// How a channel walk ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelOutcome {
    /// History fully traversed
    Completed,
    /// The channel had no messages; nothing was written
    Empty,
    /// A history fetch failed; everything before it was kept
    Aborted { reason: String },
}

/// Result of walking one channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelReport {
    pub channel_id: Snowflake,
    pub outcome: ChannelOutcome,
    pub messages: usize,
    pub media_saved: usize,
    pub media_failed: usize,
}

impl ChannelReport {
    fn new(channel_id: Snowflake) -> Self {
        Self {
            channel_id,
            outcome: ChannelOutcome::Completed,
            messages: 0,
            media_saved: 0,
            media_failed: 0,
        }
    }

    fn with_outcome(mut self, outcome: ChannelOutcome) -> Self {
        self.outcome = outcome;
        self
    }
}

/// Append-only transcript, one per channel per run
struct Transcript {
    path: PathBuf,
    writer: BufWriter<File>,
}

impl Transcript {
    /// Remove any previous run's file and start a fresh one
    async fn create(path: PathBuf) -> Result<Self> {
        match fs::remove_file(&path).await {
            Ok(()) => debug!("Removed previous transcript {}", path.display()),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(ScrapeError::fs("remove previous transcript", &path)(e)),
        }

        let file = File::create(&path)
            .await
            .map_err(ScrapeError::fs("create transcript", &path))?;
        Ok(Self {
            path,
            writer: BufWriter::new(file),
        })
    }

    async fn append(&mut self, author: &UserTag, content: &str) -> Result<()> {
        let entry = format!("{author}\n{content}\n\n");
        self.writer
            .write_all(entry.as_bytes())
            .await
            .map_err(ScrapeError::fs("write transcript", &self.path))
    }

    async fn close(mut self) -> Result<()> {
        self.writer
            .flush()
            .await
            .map_err(ScrapeError::fs("write transcript", &self.path))
    }
}

/// Walks one channel's history newest to oldest.
///
/// Pages are fetched strictly one after another. Within a page, messages are
/// handled in order and every download launched for a message is joined
/// before the next message is looked at.
pub struct ChannelWalker<S, F> {
    source: Arc<S>,
    downloader: Downloader<F>,
    output_dir: PathBuf,
    options: ScrapeOptions,
}

impl<S: HistorySource, F: MediaFetcher> ChannelWalker<S, F> {
    pub fn new(
        source: Arc<S>,
        downloader: Downloader<F>,
        output_dir: impl Into<PathBuf>,
        options: ScrapeOptions,
    ) -> Self {
        Self {
            source,
            downloader,
            output_dir: output_dir.into(),
            options,
        }
    }

    /// `<output>/<channel>.log`
    pub fn transcript_path(&self, channel_id: Snowflake) -> PathBuf {
        self.output_dir.join(format!("{channel_id}.log"))
    }

    /// `<output>/<channel>/`
    pub fn media_dir(&self, channel_id: Snowflake) -> PathBuf {
        self.output_dir.join(channel_id.to_string())
    }

    /// Traverse the whole history of `channel_id`.
    ///
    /// A failed fetch ends this channel with [`ChannelOutcome::Aborted`];
    /// only filesystem failures are returned as errors.
    pub async fn walk(&self, channel_id: Snowflake) -> Result<ChannelReport> {
        match self.first_page(channel_id).await {
            Ok(page) => self.walk_from(channel_id, page).await,
            Err(e) => Ok(Self::aborted_at_start(channel_id, e)),
        }
    }

    /// Like [`walk`](Self::walk), for a channel the operator named.
    ///
    /// A channel that does not exist or cannot be read is an error here
    /// rather than an aborted report.
    pub async fn walk_requested(&self, channel_id: Snowflake) -> Result<ChannelReport> {
        match self.first_page(channel_id).await {
            Ok(page) => self.walk_from(channel_id, page).await,
            Err(source @ (ApiError::NotFound(_) | ApiError::Forbidden(_))) => {
                Err(ScrapeError::Channel {
                    channel: channel_id,
                    source,
                })
            }
            Err(e) => Ok(Self::aborted_at_start(channel_id, e)),
        }
    }

    /// The first page also tells whether the channel is empty
    async fn first_page(
        &self,
        channel_id: Snowflake,
    ) -> std::result::Result<Vec<Message>, ApiError> {
        self.source
            .fetch_messages(channel_id, self.options.page_limit(), None)
            .await
    }

    fn aborted_at_start(channel_id: Snowflake, e: ApiError) -> ChannelReport {
        warn!("Failed to get messages in {}: {}", channel_id, e);
        ChannelReport::new(channel_id).with_outcome(ChannelOutcome::Aborted {
            reason: e.to_string(),
        })
    }

    async fn walk_from(
        &self,
        channel_id: Snowflake,
        mut page: Vec<Message>,
    ) -> Result<ChannelReport> {
        let mut report = ChannelReport::new(channel_id);
        let limit = self.options.page_limit();
        let mode = self.options.mode;

        if page.is_empty() {
            info!("Channel {} is empty", channel_id);
            return Ok(report.with_outcome(ChannelOutcome::Empty));
        }

        let mut transcript = if mode.writes_transcript() {
            Some(Transcript::create(self.transcript_path(channel_id)).await?)
        } else {
            None
        };

        let media_dir = self.media_dir(channel_id);
        if mode.downloads_media() {
            fs::create_dir_all(&media_dir)
                .await
                .map_err(ScrapeError::fs("create media directory", &media_dir))?;
        }

        info!("Scraping channel {}", channel_id);
        let mut cursor: Option<Snowflake> = None;

        while let Some(oldest) = page.last().map(|m| m.id) {
            if let Some(previous) = cursor {
                if oldest >= previous {
                    warn!(
                        "History of {} did not move past {}; stopping",
                        channel_id, previous
                    );
                    report.outcome = ChannelOutcome::Aborted {
                        reason: format!("cursor stuck at {previous}"),
                    };
                    break;
                }
            }
            debug!(
                "Channel {}: {} messages from {} back to {}",
                channel_id,
                page.len(),
                page[0].id.timestamp(),
                oldest.timestamp()
            );

            for message in page {
                self.process_message(message, transcript.as_mut(), &media_dir, &mut report)
                    .await?;
            }

            cursor = Some(oldest);
            page = match self.source.fetch_messages(channel_id, limit, cursor).await {
                Ok(page) => page,
                Err(e) => {
                    warn!("Failed to get messages in {}: {}", channel_id, e);
                    report.outcome = ChannelOutcome::Aborted {
                        reason: e.to_string(),
                    };
                    break;
                }
            };
        }

        if let Some(transcript) = transcript {
            transcript.close().await?;
        }

        if report.outcome == ChannelOutcome::Completed {
            info!(
                "Finished scraping channel {} ({} messages, {} media saved, {} failed)",
                channel_id, report.messages, report.media_saved, report.media_failed
            );
        }
        Ok(report)
    }

    async fn process_message(
        &self,
        message: Message,
        transcript: Option<&mut Transcript>,
        media_dir: &Path,
        report: &mut ChannelReport,
    ) -> Result<()> {
        let message = resolve_mentions(message);
        report.messages += 1;

        if let Some(transcript) = transcript {
            transcript.append(&message.author, &message.content).await?;
        }

        if !self.options.mode.downloads_media() {
            return Ok(());
        }

        let mut downloads = JoinSet::new();
        for candidate in extract_media(&message) {
            let downloader = self.downloader.clone();
            let dir = media_dir.to_path_buf();
            downloads.spawn(async move { downloader.download(&candidate.url, &dir).await });
        }

        // Dropping the set on a fatal error aborts the remaining siblings
        while let Some(joined) = downloads.join_next().await {
            match joined?? {
                Some(_) => report.media_saved += 1,
                None => report.media_failed += 1,
            }
        }
        Ok(())
    }
}
