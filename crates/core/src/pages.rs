//! Page renderers: what each page fetches and how fetched data becomes a view.

use tracing::debug;

use crate::{
    gateway::{FeedScope, Gateway, GatewayError, Transport},
    models::{Competitor, Domain, FeedItem, ForecastPoint},
    router::Page,
    view::{
        feed_entries, ChartSeries, CompetitorCard, DashboardView, DomainCard, DomainsView,
        FeedView, LogoSource, MarketView, SettingsView, View,
    },
};

/// Feed size on the dashboard and in the insight panel.
pub const DASHBOARD_FEED_LIMIT: usize = 10;
/// Feed size on the dedicated news and social pages.
pub const PAGE_FEED_LIMIT: usize = 20;
/// Horizon of every forecast request, in days.
pub const FORECAST_DAYS: u32 = 30;
/// Competitor tags shown per domain card.
pub const DOMAIN_TAG_LIMIT: usize = 5;
/// Pseudo-company selecting the whole-market forecast.
pub const AGGREGATE: &str = "aggregate";

/// Server-side configuration keys listed on the settings page.
pub const CONFIG_KEYS: [&str; 10] = [
    "OPENAI_API_KEY",
    "GNEWS_API_KEY",
    "SERPAPI_KEY",
    "FINNHUB_KEY",
    "ALPHAVANTAGE_KEY",
    "REDDIT_CLIENT_ID",
    "REDDIT_CLIENT_SECRET",
    "REDDIT_USER_AGENT",
    "TWITTER_BEARER_TOKEN",
    "SLACK_WEBHOOK_URL",
];

/// Snapshot of selection state a page needs to load.
#[derive(Debug, Clone, PartialEq)]
pub enum PageRequest {
    /// Dashboard for `domain`.
    Dashboard {
        /// Active domain slug.
        domain: String,
    },
    /// Domains page over the already-known domains.
    Domains {
        /// Known domains.
        domains: Vec<Domain>,
        /// Active domain slug.
        active: String,
    },
    /// Market page for `domain`.
    Market {
        /// Active domain slug.
        domain: String,
        /// Competitors already loaded for `domain`, if any.
        competitors: Option<Vec<Competitor>>,
    },
    /// Social page for `domain`.
    Social {
        /// Active domain slug.
        domain: String,
    },
    /// News page for `domain`.
    News {
        /// Active domain slug.
        domain: String,
    },
    /// Static settings page.
    Settings,
}

/// Everything a page fetched, ready to be turned into a [`View`].
#[derive(Debug, Clone, PartialEq)]
pub enum PageData {
    /// Dashboard inputs.
    Dashboard {
        /// Domain the data belongs to.
        domain: String,
        /// Competitors of `domain`.
        competitors: Vec<Competitor>,
        /// Rows in the domain's sample dataset.
        sample: Vec<FeedItem>,
        /// Domain news.
        news: Vec<FeedItem>,
        /// Domain social posts.
        social: Vec<FeedItem>,
    },
    /// Domains page inputs.
    Domains {
        /// Known domains.
        domains: Vec<Domain>,
        /// Active domain slug.
        active: String,
    },
    /// Market page inputs.
    Market {
        /// Domain the competitors belong to.
        domain: String,
        /// Competitors populating the selector.
        competitors: Vec<Competitor>,
        /// Aggregate forecast.
        forecast: Vec<ForecastPoint>,
    },
    /// Social page inputs.
    Social(Vec<FeedItem>),
    /// News page inputs.
    News(Vec<FeedItem>),
    /// Settings needs no data.
    Settings,
}

impl PageRequest {
    /// Page this request loads.
    pub fn page(&self) -> Page {
        match self {
            PageRequest::Dashboard { .. } => Page::Dashboard,
            PageRequest::Domains { .. } => Page::Domains,
            PageRequest::Market { .. } => Page::Market,
            PageRequest::Social { .. } => Page::Social,
            PageRequest::News { .. } => Page::News,
            PageRequest::Settings => Page::Settings,
        }
    }

    /// Run the page's fetch sequence.
    pub async fn fetch<T: Transport>(
        self,
        gateway: &Gateway<T>,
    ) -> Result<PageData, GatewayError> {
        debug!(page = %self.page(), "Fetching page data");
        match self {
            PageRequest::Dashboard { domain } => {
                let competitors = gateway.competitors(&domain).await?;
                let scope = FeedScope::Domain(domain.clone());
                let (news, social, sample) = tokio::try_join!(
                    gateway.news(&scope, DASHBOARD_FEED_LIMIT),
                    gateway.social(&scope, DASHBOARD_FEED_LIMIT),
                    gateway.csv_sample(&domain),
                )?;
                Ok(PageData::Dashboard {
                    domain,
                    competitors,
                    sample,
                    news,
                    social,
                })
            }
            PageRequest::Domains { domains, active } => Ok(PageData::Domains { domains, active }),
            PageRequest::Market {
                domain,
                competitors,
            } => {
                let (competitors, forecast) = match competitors {
                    Some(competitors) => {
                        (competitors, gateway.forecast(AGGREGATE, FORECAST_DAYS).await?)
                    }
                    None => tokio::try_join!(
                        gateway.competitors(&domain),
                        gateway.forecast(AGGREGATE, FORECAST_DAYS),
                    )?,
                };
                Ok(PageData::Market {
                    domain,
                    competitors,
                    forecast,
                })
            }
            PageRequest::Social { domain } => Ok(PageData::Social(
                gateway
                    .social(&FeedScope::Domain(domain), PAGE_FEED_LIMIT)
                    .await?,
            )),
            PageRequest::News { domain } => Ok(PageData::News(
                gateway
                    .news(&FeedScope::Domain(domain), PAGE_FEED_LIMIT)
                    .await?,
            )),
            PageRequest::Settings => Ok(PageData::Settings),
        }
    }
}

impl PageData {
    /// Competitors this load refreshed, with their domain.
    pub fn loaded_competitors(&self) -> Option<(&str, &[Competitor])> {
        match self {
            PageData::Dashboard {
                domain,
                competitors,
                ..
            }
            | PageData::Market {
                domain,
                competitors,
                ..
            } => Some((domain.as_str(), competitors.as_slice())),
            _ => None,
        }
    }

    /// Build the page's view.
    pub fn render(&self) -> View {
        match self {
            PageData::Dashboard {
                domain,
                competitors,
                sample,
                news,
                social,
            } => View::Dashboard(DashboardView {
                domain: domain.clone(),
                sample_size: sample.len(),
                competitors: competitors.iter().map(competitor_card).collect(),
                news: feed_entries(news),
                social: feed_entries(social),
            }),
            PageData::Domains { domains, active } => View::Domains(DomainsView {
                cards: domains
                    .iter()
                    .map(|domain| DomainCard {
                        slug: domain.slug.clone(),
                        name: domain.name.clone(),
                        tags: domain.competitor_names(DOMAIN_TAG_LIMIT),
                        active: domain.slug == *active,
                    })
                    .collect(),
            }),
            PageData::Market {
                competitors,
                forecast,
                ..
            } => View::Market(MarketView {
                options: std::iter::once(AGGREGATE.to_string())
                    .chain(competitors.iter().map(|competitor| competitor.name.clone()))
                    .collect(),
                selected: 0,
                charted: AGGREGATE.to_string(),
                chart: ChartSeries::forecast(forecast),
            }),
            PageData::Social(items) => View::Social(FeedView {
                items: feed_entries(items),
            }),
            PageData::News(items) => View::News(FeedView {
                items: feed_entries(items),
            }),
            PageData::Settings => View::Settings(SettingsView {
                keys: CONFIG_KEYS.to_vec(),
            }),
        }
    }
}

fn competitor_card(competitor: &Competitor) -> CompetitorCard {
    CompetitorCard {
        name: competitor.name.clone(),
        logo: LogoSource {
            primary: competitor.logo.clone(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::testing::FakeTransport;
    use serde_json::json;

    fn gateway(fake: FakeTransport) -> Gateway<FakeTransport> {
        Gateway::new(fake)
    }

    #[tokio::test]
    async fn dashboard_without_competitors_field_renders_empty_grid() {
        let fake = FakeTransport::new()
            .route("/api/competitors", json!({ "domain": "ai-ml" }))
            .route("/api/news", json!({}))
            .route("/api/social", json!({ "items": [{ "headline": "Buzz" }] }))
            .route("/api/csv-sample", json!({}));
        let data = PageRequest::Dashboard {
            domain: "ai-ml".to_string(),
        }
        .fetch(&gateway(fake))
        .await
        .unwrap();

        let View::Dashboard(view) = data.render() else {
            panic!("expected dashboard view");
        };
        assert!(view.competitors.is_empty());
        assert!(view.news.is_empty());
        assert_eq!(view.social.len(), 1);
        assert_eq!(view.social[0].source, "-");
    }

    #[tokio::test]
    async fn dashboard_requests_bounded_feeds_for_domain() {
        let fake = FakeTransport::new()
            .route(
                "/api/competitors",
                json!({ "competitors": [{ "name": "OpenAI", "logo": "logos/openai.png" }] }),
            )
            .route("/api/news", json!({ "items": [] }))
            .route("/api/social", json!({ "items": [] }))
            .route("/api/csv-sample", json!({ "items": [{ "headline": "row" }] }));
        let gateway = gateway(fake);
        let data = PageRequest::Dashboard {
            domain: "fintech".to_string(),
        }
        .fetch(&gateway)
        .await
        .unwrap();

        let requests = gateway.transport().requests();
        assert_eq!(requests[0].path, "/api/competitors");
        for path in ["/api/news", "/api/social"] {
            let request = gateway.transport().last_request(path).unwrap();
            assert_eq!(request.param("domain"), Some("fintech"));
            assert_eq!(request.param("limit"), Some("10"));
            assert_eq!(request.param("company"), None);
        }
        assert_eq!(
            data.loaded_competitors().map(|(domain, list)| (domain, list.len())),
            Some(("fintech", 1))
        );
        let View::Dashboard(view) = data.render() else {
            panic!("expected dashboard view");
        };
        assert_eq!(view.sample_size, 1);
        assert_eq!(view.competitors[0].logo.resolve(true), "logos/openai.png");
    }

    #[tokio::test]
    async fn market_reuses_loaded_competitors() {
        let fake = FakeTransport::new().route(
            "/api/forecast",
            json!({ "forecast": [{ "date": "2024-01-01", "yhat": 0.2 }] }),
        );
        let gateway = gateway(fake);
        let data = PageRequest::Market {
            domain: "ai-ml".to_string(),
            competitors: Some(vec![Competitor {
                name: "Anthropic".to_string(),
                logo: None,
            }]),
        }
        .fetch(&gateway)
        .await
        .unwrap();

        assert!(gateway.transport().requests_to("/api/competitors").is_empty());
        let request = gateway.transport().last_request("/api/forecast").unwrap();
        assert_eq!(request.param("company"), Some("aggregate"));
        assert_eq!(request.param("days"), Some("30"));

        let View::Market(view) = data.render() else {
            panic!("expected market view");
        };
        assert_eq!(view.options, vec!["aggregate", "Anthropic"]);
        assert_eq!(view.chart.values, vec![0.2]);
    }

    #[tokio::test]
    async fn feed_pages_use_larger_limit_and_keep_links() {
        let fake = FakeTransport::new().route(
            "/api/news",
            json!({ "items": [
                { "headline": "IPO", "source": "Wire", "link": "https://n.example/1" }
            ] }),
        );
        let gateway = gateway(fake);
        let data = PageRequest::News {
            domain: "ai-ml".to_string(),
        }
        .fetch(&gateway)
        .await
        .unwrap();

        let request = gateway.transport().last_request("/api/news").unwrap();
        assert_eq!(request.param("limit"), Some("20"));
        let View::News(view) = data.render() else {
            panic!("expected news view");
        };
        assert_eq!(view.items[0].link.as_deref(), Some("https://n.example/1"));
        assert_eq!(view.items[0].source, "Wire");
    }

    #[test]
    fn domains_cards_cap_tags_and_mark_active() {
        let domain = |slug: &str, count: usize| Domain {
            slug: slug.to_string(),
            name: slug.to_uppercase(),
            competitors: (0..count)
                .map(|index| crate::models::CompetitorRef {
                    name: format!("C{index}"),
                    logo_path: None,
                })
                .collect(),
        };
        let data = PageData::Domains {
            domains: vec![domain("ai-ml", 8), domain("fintech", 2)],
            active: "fintech".to_string(),
        };
        let View::Domains(view) = data.render() else {
            panic!("expected domains view");
        };
        assert_eq!(view.cards[0].tags.len(), 5);
        assert!(!view.cards[0].active);
        assert!(view.cards[1].active);
    }

    #[test]
    fn settings_lists_keys_only() {
        let View::Settings(view) = PageData::Settings.render() else {
            panic!("expected settings view");
        };
        assert_eq!(view.keys.len(), CONFIG_KEYS.len());
        assert!(view.keys.contains(&"SLACK_WEBHOOK_URL"));
    }
}
