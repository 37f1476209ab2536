pub mod config;
mod parser;
pub mod pipeline;
pub mod scraper;
pub mod store;
pub mod summary;
pub mod types;

pub use config::CrawlConfig;
pub use pipeline::{CrawlReport, PipelineError, crawl};
pub use scraper::{CatalogScraper, ScraperError};
pub use store::{CourseCollection, StoreError};
pub use summary::CourseSummary;
pub use types::{CourseRecord, NOT_AVAILABLE};

pub(crate) const BASE_URL: &str = "http://collegecatalog.uchicago.edu/";
pub(crate) const DEFAULT_OUTPUT_PATH: &str = "college_courses.csv";
