//! Domain categorization
//!
//! Classifies domains into coarse categories by keyword matching. The
//! table is plain data: build one with `CategoryTable::new` or use the
//! built-in defaults, then pass it to the aggregator.

use serde::{Deserialize, Serialize};

/// Name of the catch-all category
pub const OTHER_CATEGORY: &str = "Other";

/// Display color of the catch-all category
pub const OTHER_COLOR: &str = "#6B7280";

/// A named category and the keywords that select it
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CategoryRule {
    pub name: String,
    /// Substrings matched against the lowercased domain
    pub keywords: Vec<String>,
    /// Hex color for charts
    #[serde(default)]
    pub color: Option<String>,
    /// Time in this category counts as leakage (non-productive)
    #[serde(default)]
    pub leakage: bool,
}

impl CategoryRule {
    pub fn new(name: impl Into<String>, keywords: &[&str]) -> Self {
        Self {
            name: name.into(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            color: None,
            leakage: false,
        }
    }

    /// Builder method: set chart color
    pub fn color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    /// Builder method: mark as leakage
    pub fn leakage(mut self) -> Self {
        self.leakage = true;
        self
    }

    /// Chart color, falling back to the catch-all gray
    pub fn display_color(&self) -> &str {
        self.color.as_deref().unwrap_or(OTHER_COLOR)
    }

    fn matches(&self, lower_domain: &str) -> bool {
        self.keywords.iter().any(|k| lower_domain.contains(k.as_str()))
    }
}

/// Ordered category rules plus the catch-all
///
/// Rules are tried in declaration order and the first match wins.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CategoryTable {
    rules: Vec<CategoryRule>,
    fallback: CategoryRule,
}

impl CategoryTable {
    /// Build a table, lowercasing keywords and dropping empty ones
    pub fn new(rules: Vec<CategoryRule>) -> Self {
        let rules = rules
            .into_iter()
            .map(|mut rule| {
                rule.keywords = rule
                    .keywords
                    .iter()
                    .map(|k| k.trim().to_lowercase())
                    .filter(|k| !k.is_empty())
                    .collect();
                rule
            })
            .collect();

        Self {
            rules,
            fallback: CategoryRule::new(OTHER_CATEGORY, &[]).color(OTHER_COLOR),
        }
    }

    /// The categories the dashboard ships with
    pub fn builtin() -> Self {
        Self::new(vec![
            CategoryRule::new(
                "Social Media",
                &[
                    "facebook", "twitter", "instagram", "linkedin", "reddit", "youtube", "tiktok",
                    "pinterest", "discord", "whatsapp", "telegram", "x.com",
                ],
            )
            .color("#FF8C42")
            .leakage(),
            CategoryRule::new(
                "Productivity",
                &[
                    "google", "gmail", "docs", "sheets", "slides", "notion", "slack", "github",
                    "gitlab", "linear", "figma", "trello", "asana", "zoom", "meet", "microsoft",
                    "office", "canva", "chatgpt", "openai", "claude", "v0",
                ],
            )
            .color("#3B82F6"),
            CategoryRule::new(
                "Entertainment",
                &[
                    "netflix", "hulu", "twitch", "spotify", "disney", "hbo", "primevideo", "steam",
                    "roblox", "9gag", "imdb",
                ],
            )
            .color("#10B981")
            .leakage(),
            CategoryRule::new(
                "News & Reading",
                &[
                    "cnn", "bbc", "nytimes", "forbes", "bloomberg", "medium", "substack",
                    "wikipedia", "news", "weather", "espn",
                ],
            )
            .color("#8B5CF6"),
            CategoryRule::new(
                "Shopping",
                &[
                    "amazon", "ebay", "etsy", "shopify", "walmart", "target", "bestbuy", "nike",
                ],
            )
            .color("#F59E0B")
            .leakage(),
        ])
    }

    /// Classify a domain (case-insensitive substring match)
    pub fn classify(&self, domain: &str) -> &CategoryRule {
        let lower = domain.to_lowercase();
        self.rules
            .iter()
            .find(|rule| rule.matches(&lower))
            .unwrap_or(&self.fallback)
    }

    pub fn rules(&self) -> &[CategoryRule] {
        &self.rules
    }

    pub fn fallback(&self) -> &CategoryRule {
        &self.fallback
    }

    /// Look up a rule by category name, including the catch-all
    pub fn get(&self, name: &str) -> Option<&CategoryRule> {
        self.rules
            .iter()
            .chain(std::iter::once(&self.fallback))
            .find(|rule| rule.name == name)
    }
}

impl Default for CategoryTable {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_classification() {
        let table = CategoryTable::builtin();
        assert_eq!(table.classify("youtube.com").name, "Social Media");
        assert_eq!(table.classify("docs.google.com").name, "Productivity");
        assert_eq!(table.classify("www.twitch.tv").name, "Entertainment");
        assert_eq!(table.classify("en.wikipedia.org").name, "News & Reading");
        assert_eq!(table.classify("www.etsy.com").name, "Shopping");
        assert_eq!(table.classify("example.org").name, OTHER_CATEGORY);
    }

    #[test]
    fn test_case_insensitive() {
        let table = CategoryTable::builtin();
        assert_eq!(table.classify("WWW.REDDIT.COM").name, "Social Media");
    }

    #[test]
    fn test_first_match_wins() {
        // "meet" is a productivity keyword, "youtube" wins because Social Media is declared first
        let table = CategoryTable::builtin();
        assert_eq!(table.classify("youtube-meetups.com").name, "Social Media");

        let table = CategoryTable::new(vec![
            CategoryRule::new("A", &["shop"]),
            CategoryRule::new("B", &["shop"]),
        ]);
        assert_eq!(table.classify("shop.example").name, "A");
    }

    #[test]
    fn test_keywords_normalized() {
        let table = CategoryTable::new(vec![CategoryRule::new("Work", &["  GitHub ", ""])]);
        assert_eq!(table.rules()[0].keywords, vec!["github".to_string()]);
        assert_eq!(table.classify("github.com").name, "Work");
        // an empty keyword would otherwise match every domain
        assert_eq!(table.classify("example.com").name, OTHER_CATEGORY);
    }

    #[test]
    fn test_leakage_flags() {
        let table = CategoryTable::builtin();
        let leaky: Vec<&str> = table
            .rules()
            .iter()
            .filter(|r| r.leakage)
            .map(|r| r.name.as_str())
            .collect();
        assert_eq!(leaky, vec!["Social Media", "Entertainment", "Shopping"]);
        assert!(!table.fallback().leakage);
    }

    #[test]
    fn test_colors() {
        let table = CategoryTable::builtin();
        assert_eq!(table.get("Productivity").unwrap().display_color(), "#3B82F6");
        assert_eq!(table.get(OTHER_CATEGORY).unwrap().display_color(), OTHER_COLOR);
        assert_eq!(CategoryRule::new("Plain", &[]).display_color(), OTHER_COLOR);
        assert!(table.get("Missing").is_none());
    }
}
