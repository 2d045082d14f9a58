// Tests for the harvest pipeline: seed page, category pages, snapshot output

use privharvest_core::harvest::{
    CategoryOutcome, HarvestOptions, HarvestProgressCallback, execute_harvest, generate_harvest_report, scrape_category,
};
use privharvest_core::writer::{load_snapshot, write_snapshot};
use privharvest_scanner::error::Result as ScanResult;
use privharvest_scanner::{CategoryLink, DirectoryMarkup, Fetch, HttpFetcher, ScanError};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path},
};

fn seed_page(links: &[(&str, &str)]) -> String {
    let mut html = String::from("<html><body><nav>");
    for (href, name) in links {
        html.push_str(&format!(
            r#"<a class="category-link" href="{}">{}</a>"#,
            href, name
        ));
    }
    html.push_str("</nav></body></html>");
    html
}

fn category_page(description: &str, entries: &[(&str, &str, &str)]) -> String {
    let mut html = format!(
        r#"<html><head><meta name="description" content="{}"></head><body>"#,
        description
    );
    for (name, desc, link) in entries {
        html.push_str(&format!(
            r#"<div class="tool-entry"><h3>{}</h3><p>{}</p><a href="{}">Visit</a></div>"#,
            name, desc, link
        ));
    }
    html.push_str("</body></html>");
    html
}

async fn mount_html(server: &MockServer, route: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/html")
                .set_body_string(body),
        )
        .mount(server)
        .await;
}

fn options(seed_url: String) -> HarvestOptions {
    HarvestOptions {
        seed_url,
        show_progress_bars: false,
    }
}

/// Serves canned pages from memory and records every URL requested.
struct StaticFetcher {
    pages: HashMap<String, String>,
    requested: Mutex<Vec<String>>,
}

impl StaticFetcher {
    fn new(pages: &[(&str, String)]) -> Self {
        Self {
            pages: pages
                .iter()
                .map(|(url, body)| (url.to_string(), body.clone()))
                .collect(),
            requested: Mutex::new(Vec::new()),
        }
    }
}

impl Fetch for StaticFetcher {
    async fn fetch(&self, url: &str) -> ScanResult<String> {
        self.requested.lock().unwrap().push(url.to_string());
        self.pages.get(url).cloned().ok_or_else(|| ScanError::Status {
            url: url.to_string(),
            status: 404,
        })
    }
}

// ============================================================================
// End-to-end over HTTP
// ============================================================================

#[tokio::test]
async fn test_two_categories_end_to_end() {
    let server = MockServer::start().await;

    mount_html(
        &server,
        "/",
        seed_page(&[("/messaging", "Messaging"), ("/vpns", "VPNs")]),
    )
    .await;
    mount_html(
        &server,
        "/messaging",
        category_page(
            "Private messengers",
            &[(
                "Signal",
                "Free encrypted messenger for Android and iOS",
                "https://github.com/signalapp/Signal-Android",
            )],
        ),
    )
    .await;
    mount_html(
        &server,
        "/vpns",
        category_page(
            "Virtual private networks",
            &[("Mullvad", "Paid VPN, MIT License", "https://mullvad.net")],
        ),
    )
    .await;

    let fetcher = HttpFetcher::new().unwrap();
    let report = execute_harvest(
        &fetcher,
        &DirectoryMarkup::new(),
        options(server.uri()),
        None,
    )
    .await;

    assert!(!report.is_partial());
    let snapshot = &report.snapshot;
    assert_eq!(snapshot.category_count(), 2);
    assert_eq!(snapshot.tool_count(), 2);
    for tool in snapshot.tools() {
        assert!(snapshot.categories().contains_key(&tool.category_slug));
    }

    let messaging = &snapshot.categories()["messaging"];
    assert_eq!(messaging.name, "Messaging");
    assert_eq!(messaging.description, "Private messengers");

    let signal = &snapshot.tools()[0];
    assert_eq!(signal.name, "Signal");
    assert_eq!(signal.category_slug, "messaging");
    assert!(signal.is_open_source);
    assert!(signal.is_free);
    assert_eq!(signal.platforms, vec!["iOS", "Android"]);

    let mullvad = &snapshot.tools()[1];
    assert_eq!(mullvad.category_slug, "vpns");
    assert_eq!(mullvad.license.as_deref(), Some("MIT License"));
    assert!(mullvad.has_paid_plan);

    // And through the writer
    let dir = tempfile::TempDir::new().unwrap();
    let out = dir.path().join("privacy_tools_data.json");
    let summary = write_snapshot(snapshot, &out).unwrap();
    assert_eq!(summary.categories, 2);
    assert_eq!(summary.tools, 2);

    let value: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
    let keys: Vec<&String> = value["categories"].as_object().unwrap().keys().collect();
    assert_eq!(keys.len(), 2);
    for tool in value["tools"].as_array().unwrap() {
        let slug = tool["category_slug"].as_str().unwrap();
        assert!(value["categories"].get(slug).is_some());
    }
    assert_eq!(load_snapshot(&out).unwrap(), *snapshot);
}

#[tokio::test]
async fn test_category_http_error_is_isolated() {
    let server = MockServer::start().await;

    mount_html(
        &server,
        "/",
        seed_page(&[("/broken", "Broken"), ("/email", "Email")]),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    mount_html(
        &server,
        "/email",
        category_page(
            "Email providers",
            &[("Proton Mail", "Encrypted email", "https://proton.me")],
        ),
    )
    .await;

    let fetcher = HttpFetcher::new().unwrap();
    let report = execute_harvest(
        &fetcher,
        &DirectoryMarkup::new(),
        options(server.uri()),
        None,
    )
    .await;

    assert!(report.is_partial());
    assert_eq!(report.snapshot.category_count(), 1);
    assert_eq!(report.snapshot.tool_count(), 1);
    assert!(report.snapshot.categories().contains_key("email"));

    assert_eq!(report.skipped_categories.len(), 1);
    let (url, reason) = &report.skipped_categories[0];
    assert!(url.ends_with("/broken"));
    assert!(matches!(reason, ScanError::Status { status: 500, .. }));
}

#[tokio::test]
async fn test_seed_page_failure_yields_empty_snapshot() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let fetcher = HttpFetcher::new().unwrap();
    let report = execute_harvest(
        &fetcher,
        &DirectoryMarkup::new(),
        options(server.uri()),
        None,
    )
    .await;

    assert!(report.snapshot.is_empty());
    assert!(matches!(
        report.seed_error,
        Some(ScanError::Status { status: 503, .. })
    ));
    assert!(report.is_partial());
}

// ============================================================================
// In-memory fetcher
// ============================================================================

#[tokio::test]
async fn test_malformed_entries_are_skipped_not_fatal() {
    let seed = "https://directory.test";
    let mut page = category_page(
        "Browsers",
        &[("LibreWolf", "Privacy browser for Linux", "https://librewolf.net")],
    );
    page = page.replace(
        "</body>",
        r#"<div class="tool-entry"><p>no heading here</p><a href="https://x.test">x</a></div></body>"#,
    );

    let fetcher = StaticFetcher::new(&[
        (seed, seed_page(&[("/browsers", "Browsers")])),
        ("https://directory.test/browsers", page),
    ]);

    let report = execute_harvest(
        &fetcher,
        &DirectoryMarkup::new(),
        options(seed.to_string()),
        None,
    )
    .await;

    assert_eq!(report.snapshot.tool_count(), 1);
    assert_eq!(report.skipped_entries, 1);
    assert!(report.skipped_categories.is_empty());
    assert_eq!(report.snapshot.tools()[0].name, "LibreWolf");
}

#[tokio::test]
async fn test_categories_are_fetched_in_page_order() {
    let seed = "https://directory.test/";
    let fetcher = StaticFetcher::new(&[
        (
            seed,
            seed_page(&[("/b", "B"), ("/a", "A"), ("/c", "C")]),
        ),
        ("https://directory.test/a", category_page("", &[])),
        ("https://directory.test/b", category_page("", &[])),
        ("https://directory.test/c", category_page("", &[])),
    ]);

    let report = execute_harvest(
        &fetcher,
        &DirectoryMarkup::new(),
        options(seed.to_string()),
        None,
    )
    .await;

    assert_eq!(report.snapshot.category_count(), 3);
    let requested = fetcher.requested.lock().unwrap().clone();
    assert_eq!(
        requested,
        vec![
            "https://directory.test/",
            "https://directory.test/b",
            "https://directory.test/a",
            "https://directory.test/c",
        ]
    );
}

#[tokio::test]
async fn test_progress_callback_sees_each_category() {
    let seed = "https://directory.test/";
    let fetcher = StaticFetcher::new(&[
        (seed, seed_page(&[("/a", "Alpha"), ("/b", "Beta")])),
        ("https://directory.test/a", category_page("", &[])),
    ]);

    let messages: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
    let messages_clone = messages.clone();
    let callback: HarvestProgressCallback = Arc::new(move |msg: String| {
        messages_clone.lock().unwrap().push(msg);
    });

    execute_harvest(
        &fetcher,
        &DirectoryMarkup::new(),
        options(seed.to_string()),
        Some(callback),
    )
    .await;

    let messages = messages.lock().unwrap();
    assert!(messages.iter().any(|m| m.contains("1/2") && m.contains("Alpha")));
    assert!(messages.iter().any(|m| m.contains("2/2") && m.contains("Beta")));
    assert!(messages.iter().any(|m| m.starts_with("[!] Skipped")));
}

#[tokio::test]
async fn test_scrape_category_without_slug_is_skipped_before_fetch() {
    let fetcher = StaticFetcher::new(&[]);
    let link = CategoryLink {
        name: "Root".to_string(),
        url: "https://directory.test/".to_string(),
    };

    let outcome = scrape_category(&fetcher, &DirectoryMarkup::new(), &link).await;

    match outcome {
        CategoryOutcome::Skipped { url, reason } => {
            assert_eq!(url, "https://directory.test/");
            assert!(matches!(reason, ScanError::Parse(_)));
        }
        other => panic!("expected skip, got {:?}", other),
    }
    assert!(fetcher.requested.lock().unwrap().is_empty());
}

#[test]
fn test_generate_harvest_report_lists_skips() {
    let mut report = privharvest_core::harvest::HarvestReport::default();
    report.skipped_categories.push((
        "https://directory.test/broken".to_string(),
        ScanError::Status {
            url: "https://directory.test/broken".to_string(),
            status: 500,
        },
    ));
    report.skipped_entries = 2;

    let text = generate_harvest_report(&report);

    assert!(text.contains("Categories scraped: 0"));
    assert!(text.contains("Categories skipped: 1"));
    assert!(text.contains("Entries skipped: 2"));
    assert!(text.contains("https://directory.test/broken"));
    assert!(text.contains("HTTP 500"));
}
