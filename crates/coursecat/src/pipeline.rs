use crate::config::CrawlConfig;
use crate::scraper::{CatalogScraper, ScraperError};
use crate::store::{CourseCollection, StoreError};

use serde::Serialize;

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Scraper error: {0}")]
    Scraper(#[from] ScraperError),
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// What a crawl did, for callers that don't want to read the logs.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CrawlReport {
    pub programs_of_study_url: Option<String>,
    pub departments_found: usize,
    pub departments_failed: Vec<String>,
    pub records: usize,
    pub written: bool,
}

impl CrawlReport {
    /// The landing page never yielded a Programs of Study link.
    pub fn halted(&self) -> bool {
        self.programs_of_study_url.is_none()
    }
}

impl std::fmt::Display for CrawlReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "\nCrawl:")?;
        match &self.programs_of_study_url {
            Some(url) => writeln!(f, "  Programs of Study:    {}", url)?,
            None => return writeln!(f, "  Programs of Study:    not found, crawl halted"),
        }
        writeln!(f, "  Departments found:    {}", self.departments_found)?;
        writeln!(f, "  Departments failed:   {}", self.departments_failed.len())?;
        writeln!(f, "  Courses collected:    {}", self.records)?;
        writeln!(f, "  Table written:        {}", self.written)
    }
}

/// Runs landing page → department list → course pages → table, strictly in
/// that order and one request at a time.
///
/// Fetch failures past the landing page are logged and skipped. Only client
/// construction and writing the table can fail the whole run.
pub async fn crawl(config: &CrawlConfig) -> Result<CrawlReport, PipelineError> {
    let scraper = CatalogScraper::new(config)?;
    let mut report = CrawlReport::default();

    let Some(programs_url) = scraper.programs_of_study_url().await else {
        log::warn!("Crawl halted before enumerating departments");
        return Ok(report);
    };
    report.programs_of_study_url = Some(programs_url.to_string());

    let department_urls = scraper.department_urls(&programs_url).await;
    report.departments_found = department_urls.len();

    let mut collection = CourseCollection::new();
    for department_url in department_urls {
        log::info!(
            "Extracting course information from department: {}",
            department_url
        );
        let records = scraper.course_records(&department_url).await;
        if records.is_empty() {
            log::warn!(
                "Failed to extract course information from department: {}",
                department_url
            );
            report.departments_failed.push(department_url.to_string());
            continue;
        }
        collection.extend_department(records);
        tokio::time::sleep(config.department_delay).await;
    }

    report.records = collection.len();
    report.written = collection.write_csv(&config.output_path)?;
    Ok(report)
}
