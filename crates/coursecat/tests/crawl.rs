use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use coursecat::{
    CatalogScraper, CourseCollection, CourseSummary, CrawlConfig, NOT_AVAILABLE, ScraperError,
    crawl,
};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use url::Url;

type Routes = HashMap<&'static str, (u16, String)>;

/// Status for a route that accepts the request and never answers.
const NO_ANSWER: u16 = 0;

/// Serves canned pages over HTTP/1.1 until the test's runtime shuts down.
/// Unknown paths get a 404.
async fn serve(routes: Routes) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    let routes = Arc::new(routes);

    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                break;
            };
            let routes = Arc::clone(&routes);
            tokio::spawn(async move {
                let mut request = Vec::new();
                let mut buf = [0u8; 1024];
                while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                    match socket.read(&mut buf).await {
                        Ok(0) | Err(_) => return,
                        Ok(n) => request.extend_from_slice(&buf[..n]),
                    }
                }
                let request = String::from_utf8_lossy(&request);
                let path = request.split_whitespace().nth(1).unwrap_or("/");

                let (status, body) = routes
                    .get(path)
                    .cloned()
                    .unwrap_or((404, "<html><body>Not Found</body></html>".to_string()));
                if status == NO_ANSWER {
                    std::future::pending::<()>().await;
                }
                let reason = match status {
                    200 => "OK",
                    404 => "Not Found",
                    _ => "Internal Server Error",
                };
                let response = format!(
                    "HTTP/1.1 {status} {reason}\r\nContent-Type: text/html; charset=utf-8\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    body.len()
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    addr
}

fn landing_page() -> String {
    r#"<html><body>
        <a href="/thecollege/">The College</a>
        <a href="/thecollege/programsofstudy/">Programs of Study</a>
    </body></html>"#
        .to_string()
}

fn programs_page() -> String {
    r#"<html><body><ul>
        <li><a href="/thecollege/economics/">Economics</a></li>
        <li><a href="/thecollege/minors/">Minors</a></li>
        <li><a href="/thecollege/art/">Art History</a></li>
        <li><a href="/thecollege/history/">History</a></li>
        <li><a href="/thecollege/academiccalendar/">Academic Calendar</a></li>
        <li><a href="/graduate/economics/">Graduate Economics</a></li>
    </ul></body></html>"#
        .to_string()
}

fn economics_page() -> String {
    r#"<html><body>
        <div class="courseblock main">
            <p class="courseblocktitle"><strong>ECON&#160;10000.  Principles of Microeconomics.  100 Units.</strong></p>
            <p class="courseblockdesc">Markets, prices, and incentives.</p>
            <p class="courseblockdetail">Instructor(s): J. Smith&#160;&#160;Terms Offered: Autumn Winter<br/>Prerequisite(s): MATH 13100</p>
        </div>
        <div class="courseblock main">
            <p class="courseblocktitle"><strong>ECON&#160;19900.  No description.</strong></p>
            <p class="courseblockdetail">Instructor(s): Staff</p>
        </div>
        <div class="courseblock subsequence">
            <p class="courseblocktitle"><strong>ECON&#160;20000.  Elements I.  100 Units.</strong></p>
            <p class="courseblockdesc">Consumer theory.</p>
            <p class="courseblockdetail">Instructor(s): Staff&#160;&#160;Terms Offered: Autumn<br/>Equivalent Course(s): PBPL 20000</p>
        </div>
    </body></html>"#
        .to_string()
}

fn history_page() -> String {
    r#"<html><body>
        <div class="courseblock main">
            <p class="courseblocktitle"><strong>HIST&#160;10100.  Introduction to History.  100 Units.</strong></p>
            <p class="courseblockdesc">Sources and methods.</p>
            <p class="courseblockdetail">Terms Offered: Spring</p>
        </div>
        <div class="courseblock main">
            <p class="courseblockdesc">A block with no title.</p>
            <p class="courseblockdetail">Instructor(s): A. Jones&#160;&#160;Terms Offered: Spring</p>
        </div>
    </body></html>"#
        .to_string()
}

fn catalog_routes() -> Routes {
    HashMap::from([
        ("/", (200, landing_page())),
        ("/thecollege/programsofstudy/", (200, programs_page())),
        ("/thecollege/economics/", (200, economics_page())),
        ("/thecollege/history/", (200, history_page())),
    ])
}

fn temp_output(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("coursecat-{}-{}.csv", name, std::process::id()))
}

fn config_for(addr: SocketAddr, output: &Path) -> CrawlConfig {
    CrawlConfig::default()
        .with_base_url(format!("http://{addr}/"))
        .with_output_path(output)
        .with_department_delay(Duration::ZERO)
}

#[tokio::test]
async fn test_crawl_collects_departments_and_skips_failures() {
    let addr = serve(catalog_routes()).await;
    let output = temp_output("full");
    let _ = std::fs::remove_file(&output);

    let report = crawl(&config_for(addr, &output)).await.expect("crawl");

    assert_eq!(
        report.programs_of_study_url.as_deref(),
        Some(format!("http://{addr}/thecollege/programsofstudy/").as_str())
    );
    assert_eq!(report.departments_found, 3);
    assert_eq!(
        report.departments_failed,
        vec![format!("http://{addr}/thecollege/art/")]
    );
    assert_eq!(report.records, 4);
    assert!(report.written);

    let collection = CourseCollection::read_csv(&output).expect("reload");
    let numbers: Vec<_> = collection
        .records()
        .iter()
        .map(|r| r.course_number.as_str())
        .collect();
    assert_eq!(numbers, vec!["ECON10000", "ECON20000", "HIST10100", NOT_AVAILABLE]);

    let econ = &collection.records()[0];
    assert_eq!(econ.instructor, "J. Smith");
    assert_eq!(econ.terms_offered, "Autumn Winter");
    assert_eq!(econ.prerequisite, "MATH 13100");
    assert_eq!(econ.equivalent_courses, NOT_AVAILABLE);

    // standalone Terms Offered lines are not picked up
    let hist = &collection.records()[2];
    assert_eq!(hist.terms_offered, NOT_AVAILABLE);

    let untitled = &collection.records()[3];
    assert_eq!(untitled.instructor, "A. Jones");
    assert_eq!(untitled.terms_offered, "Spring");

    for record in collection.records() {
        for field in [
            &record.course_number,
            &record.description,
            &record.instructor,
            &record.terms_offered,
            &record.equivalent_courses,
            &record.prerequisite,
        ] {
            assert!(!field.is_empty(), "empty field in {:?}", record);
        }
    }

    let summary = CourseSummary::from_csv(&output).expect("summary");
    assert_eq!(summary.total, 4);
    assert_eq!(summary.count_for_term("Autumn"), 2);
    assert_eq!(summary.count_for_term("Spring"), 1);
    assert_eq!(
        summary.busiest_department.as_ref().map(|d| d.department.as_str()),
        Some("ECON")
    );

    std::fs::remove_file(&output).expect("cleanup");
}

#[tokio::test]
async fn test_crawl_halts_without_programs_of_study_link() {
    let addr = serve(HashMap::from([(
        "/",
        (200, "<html><body><a href=\"/thecollege/\">College</a></body></html>".to_string()),
    )]))
    .await;
    let output = temp_output("halted");
    let _ = std::fs::remove_file(&output);

    let report = crawl(&config_for(addr, &output)).await.expect("crawl");

    assert!(report.halted());
    assert_eq!(report.departments_found, 0);
    assert!(!report.written);
    assert!(!output.exists());
}

#[tokio::test]
async fn test_crawl_writes_nothing_when_programs_page_fails() {
    let mut routes = catalog_routes();
    routes.insert(
        "/thecollege/programsofstudy/",
        (500, "<html>oops</html>".to_string()),
    );
    let addr = serve(routes).await;
    let output = temp_output("no-departments");
    let _ = std::fs::remove_file(&output);

    let report = crawl(&config_for(addr, &output)).await.expect("crawl");

    assert!(!report.halted());
    assert_eq!(report.departments_found, 0);
    assert_eq!(report.records, 0);
    assert!(!report.written);
    assert!(!output.exists());
}

#[tokio::test]
async fn test_department_not_found_is_soft_failure() {
    let addr = serve(catalog_routes()).await;
    let output = temp_output("unused");
    let scraper = CatalogScraper::new(&config_for(addr, &output)).expect("scraper");
    let missing = Url::parse(&format!("http://{addr}/thecollege/art/")).expect("url");

    let err = scraper
        .try_course_records(&missing)
        .await
        .expect_err("404 must be an error");
    assert!(matches!(err, ScraperError::HttpError(_)));

    assert!(scraper.course_records(&missing).await.is_empty());
}

#[tokio::test]
async fn test_department_urls_are_absolute_and_filtered() {
    let addr = serve(catalog_routes()).await;
    let output = temp_output("unused");
    let scraper = CatalogScraper::new(&config_for(addr, &output)).expect("scraper");

    let programs = scraper
        .programs_of_study_url()
        .await
        .expect("programs of study link");
    let urls = scraper.department_urls(&programs).await;

    assert_eq!(urls.len(), 3);
    for url in &urls {
        assert!(url.path().starts_with("/thecollege/"));
        assert!(!url.path().contains("minors"));
        assert!(!url.path().contains("academiccalendar"));
    }
}

#[tokio::test]
async fn test_department_timeout_is_soft_failure() {
    let mut routes = catalog_routes();
    routes.insert("/thecollege/slow/", (NO_ANSWER, String::new()));
    let addr = serve(routes).await;
    let output = temp_output("unused");
    let config =
        config_for(addr, &output).with_request_timeout(Duration::from_millis(200));
    let scraper = CatalogScraper::new(&config).expect("scraper");
    let slow = Url::parse(&format!("http://{addr}/thecollege/slow/")).expect("url");

    let err = scraper
        .try_course_records(&slow)
        .await
        .expect_err("timeout must be an error");
    assert!(matches!(err, ScraperError::HttpError(ref e) if e.is_timeout()));

    let started = Instant::now();
    assert!(scraper.course_records(&slow).await.is_empty());
    assert!(started.elapsed() < Duration::from_secs(3));
}

#[tokio::test]
async fn test_crawl_halts_on_landing_timeout() {
    let mut routes = catalog_routes();
    routes.insert("/", (NO_ANSWER, String::new()));
    let addr = serve(routes).await;
    let output = temp_output("landing-timeout");
    let _ = std::fs::remove_file(&output);
    let config =
        config_for(addr, &output).with_request_timeout(Duration::from_millis(200));

    let report = crawl(&config).await.expect("crawl");

    assert!(report.halted());
    assert_eq!(report.departments_found, 0);
    assert!(!report.written);
    assert!(!output.exists());
}

#[tokio::test]
async fn test_crawl_halts_on_landing_server_error() {
    let mut routes = catalog_routes();
    routes.insert("/", (500, landing_page()));
    let addr = serve(routes).await;
    let output = temp_output("landing-error");
    let _ = std::fs::remove_file(&output);

    let report = crawl(&config_for(addr, &output)).await.expect("crawl");

    assert!(report.halted());
    assert_eq!(report.departments_found, 0);
    assert!(!report.written);
    assert!(!output.exists());
}

#[tokio::test]
async fn test_crawl_pauses_only_after_successful_departments() {
    // economics and history succeed, art returns 404
    let addr = serve(catalog_routes()).await;
    let output = temp_output("delay");
    let _ = std::fs::remove_file(&output);
    let delay = Duration::from_millis(300);
    let config = config_for(addr, &output).with_department_delay(delay);

    let started = Instant::now();
    let report = crawl(&config).await.expect("crawl");
    let elapsed = started.elapsed();

    assert_eq!(report.departments_found, 3);
    assert_eq!(report.departments_failed.len(), 1);
    assert!(elapsed >= delay * 2, "paused for {:?}", elapsed);
    assert!(elapsed < delay * 3, "paused after the failed department: {:?}", elapsed);

    std::fs::remove_file(&output).expect("cleanup");
}
