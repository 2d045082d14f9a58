//! Pure text heuristics that derive tool attributes from scraped fields.
//!
//! The keyword tables are kept exactly as the directory scraper has always
//! used them. They are neither exhaustive nor tuned; changing them changes
//! the shape of every snapshot.

use regex::Regex;
use std::collections::BTreeSet;
use std::sync::LazyLock;

/// Platform name to trigger keywords, matched as lowercase substrings.
pub const PLATFORM_KEYWORDS: &[(&str, &[&str])] = &[
    ("Windows", &["windows", "win"]),
    ("macOS", &["macos", "mac", "osx"]),
    ("Linux", &["linux", "ubuntu", "debian"]),
    ("iOS", &["ios", "iphone", "ipad"]),
    ("Android", &["android"]),
    ("Web", &["web", "browser", "online"]),
    ("CLI", &["cli", "command-line", "terminal"]),
];

/// Lifecycle and pricing words recognised as tags.
pub const LIFECYCLE_TAGS: &[&str] = &[
    "open-source",
    "free",
    "paid",
    "premium",
    "encrypted",
    "decentralized",
    "p2p",
    "self-hosted",
];

/// Privacy words recognised as tags.
pub const PRIVACY_TAGS: &[&str] = &["privacy", "security", "anonymity", "encryption"];

pub const PAID_TAGS: &[&str] = &["paid", "premium"];

static GITHUB_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"https://github\.com/[a-zA-Z0-9-]+/[a-zA-Z0-9\-_.]+").unwrap());

static LICENSE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:MIT|GPL|Apache|BSD|AGPL|MPL|LGPL)(?:-\d+(?:\.\d+)?)?(?:\sLicense)?\b")
        .unwrap()
});

static HASHTAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"#\w+").unwrap());

static LIFECYCLE_RE: LazyLock<Regex> = LazyLock::new(|| vocabulary_regex(LIFECYCLE_TAGS));
static PRIVACY_RE: LazyLock<Regex> = LazyLock::new(|| vocabulary_regex(PRIVACY_TAGS));

fn vocabulary_regex(words: &[&str]) -> Regex {
    let alternation = words
        .iter()
        .map(|w| regex::escape(w))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(r"(?i)\b(?:{})\b", alternation)).unwrap()
}

/// Collapse every whitespace run to a single space and trim the ends.
pub fn clean_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub fn extract_github_url(link: &str) -> Option<String> {
    GITHUB_RE.find(link).map(|m| m.as_str().to_string())
}

/// First license identifier mentioned in `text`, as written there.
pub fn extract_license(text: &str) -> Option<String> {
    LICENSE_RE.find(text).map(|m| m.as_str().to_string())
}

/// Platforms whose keywords appear anywhere in `text`, in table order.
pub fn detect_platforms(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    PLATFORM_KEYWORDS
        .iter()
        .filter(|(_, keywords)| keywords.iter().any(|k| lower.contains(k)))
        .map(|(platform, _)| platform.to_string())
        .collect()
}

pub fn extract_tags(text: &str) -> BTreeSet<String> {
    let hashtags = HASHTAG_RE
        .find_iter(text)
        .map(|m| m.as_str().trim_start_matches('#').to_lowercase());

    let vocabulary = LIFECYCLE_RE
        .find_iter(text)
        .chain(PRIVACY_RE.find_iter(text))
        .map(|m| m.as_str().to_lowercase());

    hashtags.chain(vocabulary).collect()
}

pub fn is_free(tags: &BTreeSet<String>) -> bool {
    tags.contains("free")
}

pub fn has_paid_plan(tags: &BTreeSet<String>) -> bool {
    PAID_TAGS.iter().any(|t| tags.contains(*t))
}

/// Everything derived from a tool's link and description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivedFields {
    pub github_url: Option<String>,
    pub license: Option<String>,
    pub platforms: Vec<String>,
    pub tags: BTreeSet<String>,
    pub is_open_source: bool,
    pub is_free: bool,
    pub has_paid_plan: bool,
}

pub fn derive_fields(link: &str, description: &str) -> DerivedFields {
    let github_url = extract_github_url(link);
    let tags = extract_tags(description);

    DerivedFields {
        is_open_source: github_url.is_some(),
        is_free: is_free(&tags),
        has_paid_plan: has_paid_plan(&tags),
        license: extract_license(description),
        platforms: detect_platforms(description),
        github_url,
        tags,
    }
}
