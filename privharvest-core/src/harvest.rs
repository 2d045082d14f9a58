use crate::model::{Category, Snapshot, Tool};
use indicatif::{ProgressBar, ProgressStyle};
use privharvest_scanner::parser::slug_from_url;
use privharvest_scanner::{CategoryLink, Fetch, PageParser, ScanError};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

pub const DEFAULT_SEED_URL: &str = "https://awesome-privacy.xyz";

/// Options for configuring a harvest run
pub struct HarvestOptions {
    pub seed_url: String,
    pub show_progress_bars: bool,
}

impl Default for HarvestOptions {
    fn default() -> Self {
        Self {
            seed_url: DEFAULT_SEED_URL.to_string(),
            show_progress_bars: false,
        }
    }
}

/// Callback for reporting harvest progress
pub type HarvestProgressCallback = Arc<dyn Fn(String) + Send + Sync>;

/// What happened to one category page.
#[derive(Debug)]
pub enum CategoryOutcome {
    Scraped {
        category: Category,
        tools: Vec<Tool>,
        skipped_entries: Vec<ScanError>,
    },
    Skipped {
        url: String,
        reason: ScanError,
    },
}

/// Snapshot plus everything that was left out of it and why.
#[derive(Debug, Default)]
pub struct HarvestReport {
    pub snapshot: Snapshot,
    pub seed_error: Option<ScanError>,
    pub skipped_categories: Vec<(String, ScanError)>,
    pub skipped_entries: usize,
}

impl HarvestReport {
    pub fn is_partial(&self) -> bool {
        self.seed_error.is_some() || !self.skipped_categories.is_empty() || self.skipped_entries > 0
    }
}

/// Fetch and extract a single category page.
pub async fn scrape_category<F, P>(fetcher: &F, parser: &P, link: &CategoryLink) -> CategoryOutcome
where
    F: Fetch,
    P: PageParser,
{
    let slug = match slug_from_url(&link.url) {
        Ok(slug) => slug,
        Err(reason) => {
            return CategoryOutcome::Skipped {
                url: link.url.clone(),
                reason,
            };
        }
    };

    let html = match fetcher.fetch(&link.url).await {
        Ok(html) => html,
        Err(reason) => {
            return CategoryOutcome::Skipped {
                url: link.url.clone(),
                reason,
            };
        }
    };

    let page = parser.category_page(&html);
    let category = Category {
        name: link.name.clone(),
        description: page.description,
        slug,
    };

    let mut tools = Vec::new();
    let mut skipped_entries = Vec::new();
    for entry in page.entries {
        match entry {
            Ok(raw) => tools.push(Tool::from_entry(&raw, &category.slug)),
            Err(e) => {
                warn!("Skipping entry on {}: {}", link.url, e);
                skipped_entries.push(e);
            }
        }
    }

    CategoryOutcome::Scraped {
        category,
        tools,
        skipped_entries,
    }
}

/// Execute a harvest: seed page, then every category in page order.
/// Failures are isolated to the category (or entry) they happened in.
pub async fn execute_harvest<F, P>(
    fetcher: &F,
    parser: &P,
    options: HarvestOptions,
    progress_callback: Option<HarvestProgressCallback>,
) -> HarvestReport
where
    F: Fetch,
    P: PageParser,
{
    let HarvestOptions {
        seed_url,
        show_progress_bars,
    } = options;

    let progress_bar = if show_progress_bars {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.enable_steady_tick(Duration::from_millis(100));
        pb.set_message(format!("Fetching {}", seed_url));
        Some(pb)
    } else {
        None
    };

    let notify = |msg: String| {
        if let Some(ref pb) = progress_bar {
            pb.set_message(msg.clone());
        }
        if let Some(ref callback) = progress_callback {
            callback(msg);
        }
    };

    let mut report = HarvestReport::default();

    let links = match fetcher.fetch(&seed_url).await {
        Ok(html) => parser.category_links(&html, &seed_url),
        Err(e) => Err(e),
    };
    let links = match links {
        Ok(links) => links,
        Err(e) => {
            warn!("Error scraping main page {}: {}", seed_url, e);
            notify(format!("[!] Failed to scrape main page: {}", e));
            report.seed_error = Some(e);
            if let Some(ref pb) = progress_bar {
                pb.finish_and_clear();
            }
            return report;
        }
    };

    info!("Found {} categories on {}", links.len(), seed_url);

    for (idx, link) in links.iter().enumerate() {
        info!("Scraping category: {}", link.name);
        notify(format!(
            "Scraping category {}/{}: {}",
            idx + 1,
            links.len(),
            link.name
        ));

        match scrape_category(fetcher, parser, link).await {
            CategoryOutcome::Scraped {
                category,
                tools,
                skipped_entries,
            } => {
                report.skipped_entries += skipped_entries.len();
                report.snapshot.insert_category(category);
                for tool in tools {
                    if let Err(e) = report.snapshot.add_tool(tool) {
                        warn!("Dropping tool: {}", e);
                    }
                }
            }
            CategoryOutcome::Skipped { url, reason } => {
                warn!("Error scraping {}: {}", url, reason);
                notify(format!("[!] Skipped {}: {}", url, reason));
                report.skipped_categories.push((url, reason));
            }
        }
    }

    if let Some(ref pb) = progress_bar {
        pb.finish_with_message(format!(
            "Harvest complete! {} categories, {} tools",
            report.snapshot.category_count(),
            report.snapshot.tool_count()
        ));
    }

    report
}

/// Human-readable summary of a harvest run.
pub fn generate_harvest_report(report: &HarvestReport) -> String {
    let mut out = String::new();
    out.push_str("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n\n");
    out.push_str("# Summary:\n");
    out.push_str(&format!(
        "  Categories scraped: {}\n",
        report.snapshot.category_count()
    ));
    out.push_str(&format!("  Tools found: {}\n", report.snapshot.tool_count()));
    out.push_str(&format!(
        "  Categories skipped: {}\n",
        report.skipped_categories.len()
    ));
    out.push_str(&format!("  Entries skipped: {}\n", report.skipped_entries));

    if let Some(ref e) = report.seed_error {
        out.push_str(&format!("\n[!] Main page failed: {}\n", e));
    }

    if !report.skipped_categories.is_empty() {
        out.push_str("\n## Skipped categories\n");
        for (url, reason) in &report.skipped_categories {
            out.push_str(&format!("  {} ({})\n", url, reason));
        }
    }

    out.push_str("\n━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n");
    out
}
