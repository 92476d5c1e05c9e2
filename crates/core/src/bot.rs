//! User-agent based bot detection.
//!
//! [`is_bot_user_agent`] only answers "does this look automated". Whether a
//! known search crawler is let through is a policy of the caller, see
//! [`classify_user_agent`].

/// Substrings (lowercase) that mark a user agent as automated.
pub const BOT_KEYWORDS: &[&str] = &[
    "bot",
    "crawler",
    "spider",
    "scraper",
    "headless",
    "phantom",
    "selenium",
    "puppeteer",
    "playwright",
    "curl",
    "wget",
    "python-requests",
    "go-http-client",
    "slurp",
    "baiduspider",
    "yandex",
    "duckduckbot",
    "semrush",
    "ahrefs",
];

/// Search engine crawlers that are allowed through the admission layer.
pub const ALLOWED_CRAWLERS: &[&str] = &["googlebot", "bingbot"];

/// Returns true if the user agent contains any [`BOT_KEYWORDS`] entry,
/// ignoring case.
pub fn is_bot_user_agent(user_agent: &str) -> bool {
    let ua = user_agent.to_lowercase();
    BOT_KEYWORDS.iter().any(|keyword| ua.contains(keyword))
}

/// Returns true if the user agent belongs to an allow-listed crawler.
pub fn is_allowed_crawler(user_agent: &str) -> bool {
    let ua = user_agent.to_lowercase();
    ALLOWED_CRAWLERS.iter().any(|crawler| ua.contains(crawler))
}

/// Admission decision for a user agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserAgentClass {
    /// Looks like a regular browser.
    Human,
    /// Matches a bot keyword but is an allow-listed search crawler.
    AllowedCrawler,
    /// Automated client that should be rejected.
    Bot,
}

impl UserAgentClass {
    pub fn is_rejected(&self) -> bool {
        matches!(self, Self::Bot)
    }
}

/// Classifies a user agent, applying the crawler allow-list.
pub fn classify_user_agent(user_agent: &str) -> UserAgentClass {
    if !is_bot_user_agent(user_agent) {
        UserAgentClass::Human
    } else if is_allowed_crawler(user_agent) {
        UserAgentClass::AllowedCrawler
    } else {
        UserAgentClass::Bot
    }
}
