//! Shared domain models.
//!
//! Every list and numeric field defaults when the server omits it, so a
//! partial response never fails to decode.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Market vertical grouping a set of competitors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Domain {
    /// Unique key (e.g. `ai-ml`).
    pub slug: String,
    /// Human-readable name.
    pub name: String,
    /// Competitors tracked in this domain, in server order.
    #[serde(default)]
    pub competitors: Vec<CompetitorRef>,
}

impl Domain {
    /// First `limit` competitor names, used for tag lists.
    pub fn competitor_names(&self, limit: usize) -> Vec<String> {
        self.competitors
            .iter()
            .take(limit)
            .map(|competitor| competitor.name.clone())
            .collect()
    }
}

/// Lightweight competitor entry embedded in a [`Domain`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompetitorRef {
    /// Company name.
    pub name: String,
    /// Relative logo path on the server.
    #[serde(default, alias = "logo")]
    pub logo_path: Option<String>,
}

/// Competitor as loaded for the active domain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Competitor {
    /// Company name, unique within a domain.
    pub name: String,
    /// Relative logo path on the server.
    #[serde(default)]
    pub logo: Option<String>,
}

/// News or social headline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedItem {
    /// Headline text.
    #[serde(default)]
    pub headline: String,
    /// Publisher or network.
    #[serde(default)]
    pub source: Option<String>,
    /// Article link (news only).
    #[serde(default)]
    pub link: Option<String>,
}

impl FeedItem {
    /// Source label, `-` when absent.
    pub fn source_label(&self) -> &str {
        self.source
            .as_deref()
            .filter(|value| !value.is_empty())
            .unwrap_or("-")
    }
}

/// Single predicted value in a forecast series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    /// ISO date (`YYYY-MM-DD`).
    pub date: String,
    /// Predicted value.
    #[serde(default)]
    pub yhat: f64,
    /// Lower confidence bound, when the model provides one.
    #[serde(default)]
    pub yhat_lower: Option<f64>,
    /// Upper confidence bound, when the model provides one.
    #[serde(default)]
    pub yhat_upper: Option<f64>,
}

impl ForecastPoint {
    /// Parsed calendar day, if the date is well formed.
    pub fn day(&self) -> Option<NaiveDate> {
        let prefix = self.date.get(..10).unwrap_or(&self.date);
        NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok()
    }
}

/// Insight text and sentiment KPI for one competitor.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct InsightReport {
    /// Free-text analysis.
    pub insights_text: String,
    /// Average sentiment; zero when the server omits it.
    pub sentiment_average: f64,
}

/// Envelope of `GET /api/domains`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DomainsResponse {
    /// Known domains.
    #[serde(default)]
    pub domains: Vec<Domain>,
}

/// Envelope of `GET /api/competitors`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CompetitorsResponse {
    /// Competitors of the requested domain.
    #[serde(default)]
    pub competitors: Vec<Competitor>,
}

/// Envelope of the news, social and csv-sample endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FeedResponse {
    /// Feed entries.
    #[serde(default)]
    pub items: Vec<FeedItem>,
}

/// Envelope of `GET /api/forecast`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ForecastResponse {
    /// Predicted series, ordered by date.
    #[serde(default)]
    pub forecast: Vec<ForecastPoint>,
}

/// Envelope of `GET /api/insights`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InsightsResponse {
    /// Free-text analysis.
    #[serde(default)]
    pub insights: Option<String>,
    /// Sentiment aggregate.
    #[serde(default)]
    pub sentiment_summary: Option<SentimentSummary>,
}

/// Sentiment aggregate embedded in [`InsightsResponse`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SentimentSummary {
    /// Mean sentiment score.
    #[serde(default)]
    pub average: Option<f64>,
}

impl From<InsightsResponse> for InsightReport {
    fn from(response: InsightsResponse) -> Self {
        Self {
            insights_text: response.insights.unwrap_or_default(),
            sentiment_average: response
                .sentiment_summary
                .and_then(|summary| summary.average)
                .unwrap_or(0.0),
        }
    }
}

/// Body of `POST /api/webhook/alerts`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlertPayload {
    /// Alert title, usually the insight panel title.
    pub title: String,
    /// Fixed severity label.
    pub severity: String,
    /// Alert message.
    pub message: String,
}

/// Envelope of `GET /api/health` and `POST /api/regenerate-csvs`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatusResponse {
    /// Server status label.
    #[serde(default)]
    pub status: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn missing_lists_decode_as_empty() {
        let competitors: CompetitorsResponse = serde_json::from_value(json!({})).unwrap();
        assert!(competitors.competitors.is_empty());

        let feed: FeedResponse = serde_json::from_value(json!({ "source": "x" })).unwrap();
        assert!(feed.items.is_empty());
    }

    #[test]
    fn insight_report_defaults_sentiment_to_zero() {
        let response: InsightsResponse =
            serde_json::from_value(json!({ "insights": "Strong quarter" })).unwrap();
        let report = InsightReport::from(response);
        assert_eq!(report.insights_text, "Strong quarter");
        assert_eq!(report.sentiment_average, 0.0);

        let response: InsightsResponse =
            serde_json::from_value(json!({ "sentiment_summary": { "average": 0.42 } })).unwrap();
        let report = InsightReport::from(response);
        assert_eq!(report.insights_text, "");
        assert_eq!(report.sentiment_average, 0.42);
    }

    #[test]
    fn domain_accepts_server_logo_field() {
        let domain: Domain = serde_json::from_value(json!({
            "slug": "ai-ml",
            "name": "AI/ML",
            "competitors": [{ "name": "OpenAI", "logo": "backend/logos/ai-ml/openai.png" }]
        }))
        .unwrap();
        assert_eq!(
            domain.competitors[0].logo_path.as_deref(),
            Some("backend/logos/ai-ml/openai.png")
        );
        assert_eq!(domain.competitor_names(5), vec!["OpenAI".to_string()]);
    }

    #[test]
    fn forecast_day_parses_iso_prefix() {
        let point = ForecastPoint {
            date: "2024-03-05T00:00:00".to_string(),
            yhat: 1.0,
            yhat_lower: None,
            yhat_upper: None,
        };
        assert_eq!(point.day(), NaiveDate::from_ymd_opt(2024, 3, 5));
    }
}
