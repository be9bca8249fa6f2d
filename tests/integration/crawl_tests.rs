//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end.

use sumi_harvest::config::{Config, CrawlConfig, ExtractionConfig, OutputConfig};
use sumi_harvest::crawler::{crawl as crawl_site, CrawlEngine, CrawlEvent, CrawlOutput};
use sumi_harvest::state::{CrawlState, PageOutcome};
use sumi_harvest::LayoutTag;
use tokio::sync::mpsc;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const FILLER: &str = "Our workshop restores vintage furniture by hand, using traditional joinery \
    and natural finishes. Every piece is inspected, repaired and polished before it goes back \
    to its owner, usually within three weeks.";

/// Creates a test configuration with no politeness delay
fn test_config(base_url: &str) -> CrawlConfig {
    let mut config = CrawlConfig::new(base_url);
    config.request_delay = 0;
    config.max_pages = 20;
    config
}

/// A page with a nav full of links and a main region holding `main`
fn page(title: &str, links: &[&str], main: &str) -> String {
    let nav: String = links
        .iter()
        .map(|href| format!(r#"<a href="{}">{}</a>"#, href, href))
        .collect();

    format!(
        r#"<html><head><title>{}</title></head><body>
        <nav>{}</nav>
        <main>{}</main>
        <footer>All rights reserved</footer>
        </body></html>"#,
        title, nav, main
    )
}

fn html(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body, "text/html; charset=utf-8")
}

async fn mount_page(server: &MockServer, route: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(html(body))
        .mount(server)
        .await;
}

async fn mount_robots(server: &MockServer, content: &str) {
    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string(content))
        .mount(server)
        .await;
}

async fn run(config: CrawlConfig) -> CrawlOutput {
    let mut engine = CrawlEngine::new(config, ExtractionConfig::default()).expect("valid config");
    let output = engine.run().await.expect("crawl should finish");
    assert_eq!(engine.state(), output.state);
    output
}

/// Requests the server saw, excluding robots.txt
async fn page_requests(server: &MockServer) -> Vec<String> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .into_iter()
        .map(|request| request.url.path().to_string())
        .filter(|path| path != "/robots.txt")
        .collect()
}

#[tokio::test]
async fn test_full_crawl_follows_links() {
    let server = MockServer::start().await;
    mount_robots(&server, "User-agent: *\nAllow: /").await;

    let links = ["/", "/about", "/services/", "/contact#form", "https://elsewhere.example/"];
    mount_page(
        &server,
        "/",
        page("Home | Workshop", &links, &format!("<h1>Welcome</h1><p>{}</p>", FILLER)),
    )
    .await;
    mount_page(
        &server,
        "/about",
        page(
            "About - Workshop",
            &links,
            &format!("<h1>About us</h1><p>{} We started in 1998.</p>", FILLER),
        ),
    )
    .await;
    mount_page(
        &server,
        "/services",
        page(
            "Services",
            &links,
            &format!("<h1>Services</h1><p>{} Chairs, tables and cabinets.</p>", FILLER),
        ),
    )
    .await;
    mount_page(
        &server,
        "/contact",
        page(
            "Contact",
            &links,
            &format!("<h1>Contact</h1><p>{} Visit us on weekdays.</p>", FILLER),
        ),
    )
    .await;

    let output = run(test_config(&server.uri())).await;

    assert_eq!(output.state, CrawlState::Completed);
    assert_eq!(output.pages.len(), 4);
    assert!(output.warnings.is_empty());

    // BFS order from the seed, each page once
    let paths: Vec<String> = output
        .pages
        .iter()
        .map(|p| url::Url::parse(&p.url).unwrap().path().to_string())
        .collect();
    assert_eq!(paths, vec!["/", "/about", "/services", "/contact"]);

    let home = &output.pages[0];
    assert_eq!(home.title, "Home");
    assert!(home.body_markdown.starts_with("# Welcome"));
    assert!(!home.body_markdown.contains("All rights reserved"));
    assert_eq!(home.content_hash.len(), 64);
    assert_eq!(output.pages[1].title, "About");

    let mut requested = page_requests(&server).await;
    requested.sort();
    assert_eq!(requested, vec!["/", "/about", "/contact", "/services"]);

    assert_eq!(output.stats.count(PageOutcome::Saved), 4);
    assert!(output.stats.links_discovered >= 16);
}

#[tokio::test]
async fn test_short_page_is_not_saved_but_links_are_followed() {
    let server = MockServer::start().await;
    mount_robots(&server, "User-agent: *\nAllow: /").await;

    mount_page(&server, "/", page("Home", &["/full"], "<p>Coming soon.</p>")).await;
    mount_page(
        &server,
        "/full",
        page("Full", &[], &format!("<h1>Full page</h1><p>{}</p>", FILLER)),
    )
    .await;

    let output = run(test_config(&server.uri())).await;

    assert_eq!(output.pages.len(), 1);
    assert!(output.pages[0].url.ends_with("/full"));
    assert_eq!(output.stats.count(PageOutcome::TooShort), 1);
}

#[tokio::test]
async fn test_duplicate_content_is_dropped() {
    let server = MockServer::start().await;
    mount_robots(&server, "User-agent: *\nAllow: /").await;

    let main = format!("<h1>Welcome</h1><p>{}</p>", FILLER);
    mount_page(&server, "/", page("Home", &["/index.html", "/other"], &main)).await;
    // Same content, different chrome and whitespace
    mount_page(
        &server,
        "/index.html",
        page("Home again", &[], &format!("<h1>Welcome</h1>\n\n<p>  {}  </p>", FILLER)),
    )
    .await;
    mount_page(
        &server,
        "/other",
        page("Other", &[], &format!("<h1>Other</h1><p>{}</p>", FILLER)),
    )
    .await;

    let output = run(test_config(&server.uri())).await;

    assert_eq!(output.pages.len(), 2);
    assert_eq!(output.stats.count(PageOutcome::Duplicate), 1);
    assert_ne!(output.pages[0].content_hash, output.pages[1].content_hash);
}

#[tokio::test]
async fn test_excluded_paths_are_never_requested() {
    let server = MockServer::start().await;
    mount_robots(&server, "User-agent: *\nAllow: /").await;

    mount_page(
        &server,
        "/",
        page(
            "Home",
            &["/blog/first-post", "/blog/second-post", "/team"],
            &format!("<h1>Welcome</h1><p>{}</p>", FILLER),
        ),
    )
    .await;
    mount_page(
        &server,
        "/team",
        page("Team", &[], &format!("<h1>Team</h1><p>{} Meet the crew.</p>", FILLER)),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/blog/first-post"))
        .respond_with(html(String::new()))
        .expect(0)
        .mount(&server)
        .await;

    let mut config = test_config(&server.uri());
    config.exclude_paths = vec!["/blog/".to_string()];
    let output = run(config).await;

    assert_eq!(output.pages.len(), 2);
    assert_eq!(output.stats.count(PageOutcome::Excluded), 2);
    assert!(!page_requests(&server).await.iter().any(|p| p.starts_with("/blog/")));
}

#[tokio::test]
async fn test_robots_disallow_is_respected() {
    let server = MockServer::start().await;
    mount_robots(&server, "User-agent: *\nDisallow: /private").await;

    mount_page(
        &server,
        "/",
        page(
            "Home",
            &["/private/area", "/public"],
            &format!("<h1>Welcome</h1><p>{}</p>", FILLER),
        ),
    )
    .await;
    mount_page(
        &server,
        "/public",
        page("Public", &[], &format!("<h1>Public</h1><p>{} Open to all.</p>", FILLER)),
    )
    .await;

    let output = run(test_config(&server.uri())).await;

    assert_eq!(output.pages.len(), 2);
    assert_eq!(output.stats.count(PageOutcome::RobotsDisallowed), 1);
    assert!(!page_requests(&server).await.contains(&"/private/area".to_string()));
}

#[tokio::test]
async fn test_robots_ignored_when_disabled() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string("User-agent: *\nDisallow: /"))
        .expect(0)
        .mount(&server)
        .await;
    mount_page(
        &server,
        "/",
        page("Home", &[], &format!("<h1>Welcome</h1><p>{}</p>", FILLER)),
    )
    .await;

    let mut config = test_config(&server.uri());
    config.respect_robots = false;
    let output = run(config).await;

    assert_eq!(output.pages.len(), 1);
}

#[tokio::test]
async fn test_missing_robots_allows_everything() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    mount_page(
        &server,
        "/",
        page("Home", &[], &format!("<h1>Welcome</h1><p>{}</p>", FILLER)),
    )
    .await;

    let output = run(test_config(&server.uri())).await;

    assert_eq!(output.pages.len(), 1);
    assert!(output.warnings.is_empty());
}

#[tokio::test]
async fn test_single_page_mode_fetches_one_page() {
    let server = MockServer::start().await;
    mount_robots(&server, "User-agent: *\nAllow: /").await;
    mount_page(
        &server,
        "/",
        page("Home", &["/a", "/b"], &format!("<h1>Welcome</h1><p>{}</p>", FILLER)),
    )
    .await;

    let mut config = test_config(&server.uri());
    config.single_page_mode = true;
    let output = run(config).await;

    assert_eq!(output.pages.len(), 1);
    assert_eq!(page_requests(&server).await, vec!["/"]);
    assert_eq!(output.stats.links_discovered, 0);
}

#[tokio::test]
async fn test_page_budget_caps_fetches() {
    let server = MockServer::start().await;
    let links = ["/one", "/two", "/three", "/four"];
    for (i, route) in std::iter::once("/").chain(links).enumerate() {
        mount_page(
            &server,
            route,
            page(
                route,
                &links,
                &format!("<h1>Page {}</h1><p>{} Page number {}.</p>", i, FILLER, i),
            ),
        )
        .await;
    }

    let mut config = test_config(&server.uri());
    config.respect_robots = false;
    config.max_pages = 2;
    let output = run(config).await;

    assert_eq!(output.state, CrawlState::Completed);
    assert_eq!(page_requests(&server).await.len(), 2);
    assert_eq!(output.pages.len(), 2);
}

#[tokio::test]
async fn test_non_html_and_errors_consume_budget() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/",
        page(
            "Home",
            &["/data", "/missing"],
            &format!("<h1>Welcome</h1><p>{}</p>", FILLER),
        ),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/data"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(r#"{"ok": true}"#, "application/json"),
        )
        .mount(&server)
        .await;

    let mut config = test_config(&server.uri());
    config.respect_robots = false;
    let output = run(config).await;

    assert_eq!(output.pages.len(), 1);
    assert_eq!(output.stats.count(PageOutcome::NonHtml), 1);
    assert_eq!(output.stats.count(PageOutcome::HttpError), 1);
    assert_eq!(output.stats.fetched(), 3);
}

#[tokio::test]
async fn test_sections_are_classified() {
    let server = MockServer::start().await;
    let main = format!(
        r#"<section><h1>Hand-restored furniture</h1><p>{}</p></section>
        <section>
            <h2>What our clients say</h2>
            <blockquote>They brought my grandmother's dresser back to life. Wonderful work from start to finish.</blockquote>
            <p>Jane Doe, Portland</p>
        </section>"#,
        FILLER
    );
    mount_page(&server, "/", page("Home", &[], &main)).await;

    let mut config = test_config(&server.uri());
    config.respect_robots = false;
    let output = run(config).await;

    assert_eq!(output.pages.len(), 1);
    let sections = &output.pages[0].sections;
    assert_eq!(sections.len(), 2);
    assert_eq!(sections[0].layout, LayoutTag::Hero);
    assert_eq!(sections[0].heading.as_deref(), Some("Hand-restored furniture"));
    assert_eq!(sections[1].layout, LayoutTag::Testimonial);
    assert_eq!(sections[1].heading.as_deref(), Some("What our clients say"));
    assert_eq!(output.pages[0].layouts(), vec!["hero", "testimonial"]);
}

#[tokio::test]
async fn test_stop_before_start_ends_stopped() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/",
        page("Home", &[], &format!("<h1>Welcome</h1><p>{}</p>", FILLER)),
    )
    .await;

    let mut config = test_config(&server.uri());
    config.respect_robots = false;
    let mut engine = CrawlEngine::new(config, ExtractionConfig::default()).unwrap();
    engine.stop_handle().stop();

    let output = engine.run().await.unwrap();

    assert_eq!(output.state, CrawlState::Stopped);
    assert!(output.pages.is_empty());
    assert!(page_requests(&server).await.is_empty());
}

#[tokio::test]
async fn test_progress_events() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/",
        page("Home", &["/short"], &format!("<h1>Welcome</h1><p>{}</p>", FILLER)),
    )
    .await;
    mount_page(&server, "/short", page("Short", &[], "<p>Tiny.</p>")).await;

    let mut config = test_config(&server.uri());
    config.respect_robots = false;

    let (sender, mut receiver) = mpsc::unbounded_channel();
    let mut engine = CrawlEngine::new(config, ExtractionConfig::default())
        .unwrap()
        .with_events(sender);
    engine.run().await.unwrap();
    drop(engine);

    let mut events = Vec::new();
    while let Some(event) = receiver.recv().await {
        events.push(event);
    }

    assert!(matches!(events.first(), Some(CrawlEvent::Started { max_pages: 20, .. })));
    assert!(matches!(
        events.last(),
        Some(CrawlEvent::Finished {
            state: CrawlState::Completed,
            processed: 2,
            saved: 1,
        })
    ));
    assert!(events.iter().any(|e| matches!(
        e,
        CrawlEvent::Skipped {
            reason: PageOutcome::TooShort,
            ..
        }
    )));

    let fractions: Vec<f64> = events
        .iter()
        .filter_map(|e| match e {
            CrawlEvent::Progress { fraction, .. } => Some(*fraction),
            _ => None,
        })
        .collect();
    assert_eq!(fractions.len(), 3);
    assert!(fractions.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(fractions.last(), Some(&1.0));
}

#[tokio::test]
async fn test_crawl_entry_point_with_full_config() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/",
        page("Home", &["/next"], &format!("<h1>Welcome</h1><p>{}</p>", FILLER)),
    )
    .await;

    let mut crawl = test_config(&server.uri());
    crawl.respect_robots = false;
    crawl.single_page_mode = true;
    let config = Config {
        crawl,
        extraction: ExtractionConfig::default(),
        output: OutputConfig::default(),
    };

    let output = crawl_site(&config, None).await.unwrap();

    assert_eq!(output.state, CrawlState::Completed);
    assert_eq!(output.pages.len(), 1);
    assert_eq!(output.pages[0].title, "Home");
}

#[tokio::test]
async fn test_redirect_target_is_fetched_once() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/",
        page("Home", &["/old", "/new"], &format!("<h1>Welcome</h1><p>{}</p>", FILLER)),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(ResponseTemplate::new(301).insert_header("Location", "/new"))
        .mount(&server)
        .await;
    mount_page(
        &server,
        "/new",
        page("New", &["/old"], &format!("<h1>Moved here</h1><p>{} New address.</p>", FILLER)),
    )
    .await;

    let mut config = test_config(&server.uri());
    config.respect_robots = false;
    let output = run(config).await;

    assert_eq!(page_requests(&server).await, vec!["/", "/old", "/new"]);
    assert_eq!(output.pages.len(), 2);
    assert!(output.pages[1].url.ends_with("/old"));
    assert_eq!(output.pages[1].title, "New");
    assert_eq!(output.stats.count(PageOutcome::Duplicate), 0);
    assert_eq!(output.stats.fetched(), 2);
}

#[tokio::test]
async fn test_seed_query_string_is_requested() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/article"))
        .and(query_param("id", "42"))
        .respond_with(html(page(
            "Article",
            &[],
            &format!("<h1>Article 42</h1><p>{}</p>", FILLER),
        )))
        .expect(1)
        .mount(&server)
        .await;

    let mut config = test_config(&format!("{}/article?id=42#top", server.uri()));
    config.respect_robots = false;
    config.single_page_mode = true;
    let output = run(config).await;

    assert_eq!(output.pages.len(), 1);
    assert!(output.pages[0].url.ends_with("/article"));

    let requests = server.received_requests().await.unwrap_or_default();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].url.query(), Some("id=42"));
}

#[tokio::test]
async fn test_unreachable_robots_fails_open_with_warning() {
    // Bind then release a port so nothing is listening on it
    let port = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port();
    let config = test_config(&format!("http://127.0.0.1:{}/", port));

    let (sender, mut receiver) = mpsc::unbounded_channel();
    let mut engine = CrawlEngine::new(config, ExtractionConfig::default())
        .unwrap()
        .with_events(sender);
    let output = engine.run().await.unwrap();
    drop(engine);

    let mut events = Vec::new();
    while let Some(event) = receiver.recv().await {
        events.push(event);
    }

    assert_eq!(output.state, CrawlState::Completed);
    assert_eq!(output.warnings.len(), 1);
    assert!(output.warnings[0].contains("robots.txt"));
    assert!(events.iter().any(|e| matches!(
        e,
        CrawlEvent::RobotsUnavailable { robots_url, .. } if robots_url.ends_with("/robots.txt")
    )));

    // The seed was still attempted, as if robots were off
    assert_eq!(output.stats.count(PageOutcome::NetworkError), 1);
    assert_eq!(output.stats.count(PageOutcome::RobotsDisallowed), 0);
}

#[tokio::test]
async fn test_enormous_crawl_delay_does_not_abort() {
    let server = MockServer::start().await;
    mount_robots(&server, "User-agent: *\nCrawl-delay: 1e30\nAllow: /").await;
    mount_page(
        &server,
        "/",
        page("Home", &["/next"], &format!("<h1>Welcome</h1><p>{}</p>", FILLER)),
    )
    .await;

    let mut config = test_config(&server.uri());
    config.single_page_mode = true;
    let output = run(config).await;

    assert_eq!(output.state, CrawlState::Completed);
    assert_eq!(output.pages.len(), 1);
}
