use std::path::{Path, PathBuf};
use std::process;
use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};
use coursecat::{CourseSummary, CrawlConfig, crawl};
use log::LevelFilter;

#[derive(Parser)]
#[command(name = "coursecat")]
#[command(about = "A college course catalog scraper", long_about = None)]
struct Cli {
    #[arg(
        short = 'l',
        long = "log-level",
        value_enum,
        default_value = "info",
        global = true,
        help = "Set the logging level"
    )]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => LevelFilter::Off,
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

#[derive(Debug, Clone, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Crawl every department page and write the course table
    Crawl {
        #[arg(long, help = "Site root of the course catalog")]
        base_url: Option<String>,

        #[arg(long, value_name = "PATH", help = "Where to write the course table")]
        output: Option<PathBuf>,

        #[arg(long, help = "Seconds to pause after each department")]
        delay_secs: Option<u64>,

        #[arg(
            long,
            help = "Per-request timeout in seconds",
            value_parser = clap::value_parser!(u64).range(1..)
        )]
        timeout_secs: Option<u64>,

        #[arg(long, help = "Don't print the summary after writing the table")]
        no_summary: bool,

        #[arg(
            short = 'f',
            long = "format",
            value_enum,
            default_value = "text",
            help = "Output format for the crawl report"
        )]
        format: OutputFormat,
    },
    /// Reload a course table and print the department and quarter aggregates
    Summary {
        #[arg(long, value_name = "PATH", help = "Course table to read")]
        input: Option<PathBuf>,

        #[arg(
            short = 'o',
            long = "output",
            value_enum,
            default_value = "text",
            help = "Output format"
        )]
        format: OutputFormat,
    },
}

fn serialize_json<T: serde::Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            log::error!("Error serializing to JSON: {}", e);
            process::exit(1);
        }
    }
}

fn load_summary(path: &Path) -> CourseSummary {
    CourseSummary::from_csv(path).unwrap_or_else(|e| {
        log::error!("Error reading {}: {}", path.display(), e);
        process::exit(1);
    })
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(cli.log_level.clone().into())
        .init();

    match cli.command {
        Commands::Crawl {
            base_url,
            output,
            delay_secs,
            timeout_secs,
            no_summary,
            format,
        } => {
            let mut config = CrawlConfig::default();
            if let Some(base_url) = base_url {
                config = config.with_base_url(base_url);
            }
            if let Some(output) = output {
                config = config.with_output_path(output);
            }
            if let Some(secs) = delay_secs {
                config = config.with_department_delay(Duration::from_secs(secs));
            }
            if let Some(secs) = timeout_secs {
                config = config.with_request_timeout(Duration::from_secs(secs));
            }

            let report = crawl(&config).await.unwrap_or_else(|e| {
                log::error!("Error crawling {}: {}", config.base_url, e);
                process::exit(1);
            });

            let summary =
                (report.written && !no_summary).then(|| load_summary(&config.output_path));

            match format {
                OutputFormat::Json => serialize_json(&serde_json::json!({
                    "report": report,
                    "summary": summary,
                })),
                OutputFormat::Text => {
                    print!("{}", report);
                    if let Some(summary) = summary {
                        print!("{}", summary);
                    }
                }
            }
        }

        Commands::Summary { input, format } => {
            let path = input.unwrap_or_else(|| CrawlConfig::default().output_path);
            let summary = load_summary(&path);

            match format {
                OutputFormat::Json => serialize_json(&summary),
                OutputFormat::Text => print!("{}", summary),
            }
        }
    }
}
