use crate::config::CrawlConfig;
use crate::parser::{parse_course_blocks, parse_department_hrefs, parse_programs_of_study_href};
use crate::types::CourseRecord;

use reqwest::Client;
use url::Url;

#[derive(Debug, thiserror::Error)]
pub enum ScraperError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),
    #[error("Could not find link to Programs of Study page on {0}")]
    LinkNotFound(String),
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

/// Walks the catalog: landing page, Programs of Study page, department pages.
///
/// Each stage has a `try_*` form that reports why it failed, and a soft form
/// that logs the failure and degrades to `None` or an empty list.
#[derive(Debug, Clone)]
pub struct CatalogScraper {
    client: Client,
    base_url: Url,
}

impl CatalogScraper {
    pub fn new(config: &CrawlConfig) -> Result<Self, ScraperError> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: Url::parse(&config.base_url)?,
        })
    }

    pub async fn try_programs_of_study_url(&self) -> Result<Url, ScraperError> {
        log::info!("Fetching catalog landing page: {}", self.base_url);
        let html = self.get_html(&self.base_url).await?;
        let href = parse_programs_of_study_href(&html)
            .ok_or_else(|| ScraperError::LinkNotFound(self.base_url.to_string()))?;
        Ok(self.base_url.join(&href)?)
    }

    /// `None` halts the crawl; nothing downstream runs without this page.
    pub async fn programs_of_study_url(&self) -> Option<Url> {
        self.try_programs_of_study_url()
            .await
            .inspect_err(|e| log::warn!("Programs of Study page unavailable: {}", e))
            .ok()
    }

    pub async fn try_department_urls(&self, programs_url: &Url) -> Result<Vec<Url>, ScraperError> {
        log::info!("Fetching Programs of Study page: {}", programs_url);
        let html = self.get_html(programs_url).await?;

        let urls = parse_department_hrefs(&html)
            .into_iter()
            .filter_map(|href| {
                programs_url
                    .join(&href)
                    .inspect_err(|e| log::warn!("Skipping department link '{}': {}", href, e))
                    .ok()
            })
            .collect::<Vec<_>>();

        log::info!("Found {} department page(s)", urls.len());
        Ok(urls)
    }

    pub async fn department_urls(&self, programs_url: &Url) -> Vec<Url> {
        self.try_department_urls(programs_url)
            .await
            .inspect_err(|e| log::warn!("Failed to fetch Programs of Study page: {}", e))
            .unwrap_or_default()
    }

    pub async fn try_course_records(
        &self,
        department_url: &Url,
    ) -> Result<Vec<CourseRecord>, ScraperError> {
        let html = self.get_html(department_url).await?;
        let records = parse_course_blocks(&html);
        log::debug!("Parsed {} course(s) from {}", records.len(), department_url);
        Ok(records)
    }

    pub async fn course_records(&self, department_url: &Url) -> Vec<CourseRecord> {
        self.try_course_records(department_url)
            .await
            .inspect_err(|e| {
                log::warn!(
                    "Failed to fetch data from department URL: {} ({})",
                    department_url,
                    e
                )
            })
            .unwrap_or_default()
    }

    async fn get_html(&self, url: &Url) -> Result<String, ScraperError> {
        Ok(self
            .client
            .get(url.clone())
            .send()
            .await
            .inspect_err(|e| log::error!("HTTP error: {e:?}"))?
            .error_for_status()?
            .text()
            .await
            .inspect_err(|e| log::error!("Decode error: {e:?}"))?)
    }
}
