use std::path::PathBuf;
use std::time::Duration;

/// Everything the crawl needs to know about where to read from and write to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlConfig {
    /// Site root the landing page is fetched from.
    pub base_url: String,
    /// Destination of the persisted course table.
    pub output_path: PathBuf,
    /// Upper bound on every single HTTP request.
    pub request_timeout: Duration,
    /// Pause after each department that produced records.
    pub department_delay: Duration,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            base_url: crate::BASE_URL.to_string(),
            output_path: PathBuf::from(crate::DEFAULT_OUTPUT_PATH),
            request_timeout: Duration::from_secs(3),
            department_delay: Duration::from_secs(3),
        }
    }
}

impl CrawlConfig {
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_output_path(mut self, output_path: impl Into<PathBuf>) -> Self {
        self.output_path = output_path.into();
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_department_delay(mut self, delay: Duration) -> Self {
        self.department_delay = delay;
        self
    }
}
