use blacksheep_types::MAX_PAGE_SIZE;

/// Which outputs a scrape produces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScrapeMode {
    /// Transcript and media
    #[default]
    Full,
    MediaOnly,
    TranscriptOnly,
}

impl ScrapeMode {
    /// `--media` alone selects media, `--logs` alone selects transcripts,
    /// anything else scrapes both.
    pub fn from_flags(media: bool, logs: bool) -> Self {
        match (media, logs) {
            (true, false) => Self::MediaOnly,
            (false, true) => Self::TranscriptOnly,
            _ => Self::Full,
        }
    }

    pub fn writes_transcript(self) -> bool {
        self != Self::MediaOnly
    }

    pub fn downloads_media(self) -> bool {
        self != Self::TranscriptOnly
    }
}

/// Tuning for a scrape run
#[derive(Debug, Clone)]
pub struct ScrapeOptions {
    pub mode: ScrapeMode,
    /// Upper bound on channels walked at the same time
    pub max_concurrent_channels: usize,
    /// Messages requested per history fetch, capped at the platform maximum
    pub page_size: u8,
}

impl Default for ScrapeOptions {
    fn default() -> Self {
        Self {
            mode: ScrapeMode::Full,
            max_concurrent_channels: 4,
            page_size: MAX_PAGE_SIZE,
        }
    }
}

impl ScrapeOptions {
    pub fn with_mode(mut self, mode: ScrapeMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_max_concurrent_channels(mut self, max: usize) -> Self {
        self.max_concurrent_channels = max;
        self
    }

    pub(crate) fn worker_count(&self) -> usize {
        self.max_concurrent_channels.max(1)
    }

    pub(crate) fn page_limit(&self) -> u8 {
        self.page_size.clamp(1, MAX_PAGE_SIZE)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_from_flags() {
        assert_eq!(ScrapeMode::from_flags(false, false), ScrapeMode::Full);
        assert_eq!(ScrapeMode::from_flags(true, true), ScrapeMode::Full);
        assert_eq!(ScrapeMode::from_flags(true, false), ScrapeMode::MediaOnly);
        assert_eq!(ScrapeMode::from_flags(false, true), ScrapeMode::TranscriptOnly);
    }

    #[test]
    fn test_mode_outputs() {
        assert!(ScrapeMode::Full.writes_transcript() && ScrapeMode::Full.downloads_media());
        assert!(!ScrapeMode::MediaOnly.writes_transcript());
        assert!(!ScrapeMode::TranscriptOnly.downloads_media());
    }

    #[test]
    fn test_limits_are_clamped() {
        let mut options = ScrapeOptions::default().with_max_concurrent_channels(0);
        assert_eq!(options.worker_count(), 1);
        options.page_size = 250;
        assert_eq!(options.page_limit(), 100);
        options.page_size = 0;
        assert_eq!(options.page_limit(), 1);
    }
}
