use async_trait::async_trait;

/// External augmentation paths for a query. Which path applies is decided by
/// an ordered keyword rule table, first match wins; `WebSearch` is the
/// default handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryRoute {
    RepoRate,
    News,
    Regulations,
    WebSearch,
}

impl QueryRoute {
    /// Heading under which this route's augmentation text appears in the
    /// assembled prompt.
    pub fn section_heading(self) -> &'static str {
        match self {
            QueryRoute::RepoRate => "Current Information",
            QueryRoute::News => "Latest News",
            QueryRoute::Regulations => "Regulation Information",
            QueryRoute::WebSearch => "Web Search Results",
        }
    }
}

const ROUTE_RULES: &[(&[&str], QueryRoute)] = &[
    (
        &["repo rate", "rbi rate", "monetary policy", "interest rate"],
        QueryRoute::RepoRate,
    ),
    (
        &[
            "news",
            "latest",
            "recent",
            "update",
            "current",
            "today",
            "happening",
            "developments",
            "announcements",
        ],
        QueryRoute::News,
    ),
    (
        &[
            "regulation",
            "policy",
            "guideline",
            "rule",
            "compliance",
            "requirement",
        ],
        QueryRoute::Regulations,
    ),
];

/// Top-down first-match classification over the rule table.
pub fn classify_query(query: &str) -> QueryRoute {
    let lowered = query.to_lowercase();
    for (terms, route) in ROUTE_RULES {
        if terms.iter().any(|term| lowered.contains(term)) {
            return *route;
        }
    }
    QueryRoute::WebSearch
}

/// Boundary to the live-lookup collaborator (web search, scrapers). The
/// core never performs HTML scraping itself; hosts plug in their own
/// implementation or leave augmentation off with [`NoWebSearch`].
#[async_trait]
pub trait WebAugmentor: Send + Sync {
    /// Returns augmentation text for the query, or `None` when the lookup
    /// found nothing usable. Implementations must not error past this
    /// boundary.
    async fn augment(&self, query: &str, route: QueryRoute) -> Option<String>;
}

/// Augmentation disabled.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoWebSearch;

#[async_trait]
impl WebAugmentor for NoWebSearch {
    async fn augment(&self, _query: &str, _route: QueryRoute) -> Option<String> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repo_rate_terms_win_first() {
        assert_eq!(
            classify_query("What is the current RBI repo rate?"),
            QueryRoute::RepoRate
        );
        // "monetary policy" matches before the regulation rule sees
        // "policy".
        assert_eq!(
            classify_query("Explain the monetary policy stance"),
            QueryRoute::RepoRate
        );
    }

    #[test]
    fn news_terms_route_to_news() {
        assert_eq!(
            classify_query("Any latest banking developments?"),
            QueryRoute::News
        );
    }

    #[test]
    fn regulation_terms_route_to_regulations() {
        assert_eq!(
            classify_query("KYC compliance rules for accounts"),
            QueryRoute::Regulations
        );
    }

    #[test]
    fn everything_else_falls_through_to_web_search() {
        assert_eq!(
            classify_query("How do I open a fixed deposit?"),
            QueryRoute::WebSearch
        );
    }

    #[tokio::test]
    async fn no_web_search_returns_nothing() {
        let augmentor = NoWebSearch;
        assert_eq!(
            augmentor.augment("anything", QueryRoute::News).await,
            None
        );
    }
}
