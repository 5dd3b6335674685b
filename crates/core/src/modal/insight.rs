//! Competitor insight panel: hidden/shown with one active tab while shown.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{anyhow, Context, Result};
use tracing::info;

use crate::{
    gateway::{FeedScope, Gateway, GatewayError, Transport},
    pages::{AGGREGATE, DASHBOARD_FEED_LIMIT, FORECAST_DAYS},
    view::{feed_entries, ChartSeries, FeedEntry},
};

/// File name used when exporting insight text.
pub const EXPORT_FILE_NAME: &str = "insights.txt";
/// Title used for alerts when the panel has none.
pub const DEFAULT_ALERT_TITLE: &str = "Alert";
/// Body shown by the domain forecast preview.
pub const PREVIEW_TEXT: &str =
    "Forecast preview — use the Dashboard to open competitor insights.";

/// Panes of the insight panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum InsightTab {
    /// Free-text insight and sentiment KPI.
    #[default]
    Insights,
    /// Forecast chart.
    Forecast,
    /// Company news.
    News,
    /// Company social posts.
    Social,
}

impl InsightTab {
    /// Tab order.
    pub const ALL: [InsightTab; 4] = [
        InsightTab::Insights,
        InsightTab::Forecast,
        InsightTab::News,
        InsightTab::Social,
    ];

    /// Tab label.
    pub fn title(self) -> &'static str {
        match self {
            InsightTab::Insights => "Insights",
            InsightTab::Forecast => "Forecast",
            InsightTab::News => "News",
            InsightTab::Social => "Social",
        }
    }

    /// Neighbouring tab `delta` steps away, wrapping around.
    pub fn offset(self, delta: isize) -> InsightTab {
        let len = Self::ALL.len() as isize;
        let index = Self::ALL
            .iter()
            .position(|tab| *tab == self)
            .unwrap_or_default() as isize;
        Self::ALL[(index + delta).rem_euclid(len) as usize]
    }
}

/// What to load into the panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsightRequest {
    /// Full insight for one competitor.
    Company {
        /// Company name.
        company: String,
        /// Active domain slug.
        domain: String,
    },
    /// Aggregate forecast preview for a domain.
    DomainForecast {
        /// Domain display name.
        domain_name: String,
    },
}

/// Fetched panel content.
#[derive(Debug, Clone, PartialEq)]
pub struct InsightData {
    /// Panel title.
    pub title: String,
    /// Insight body text.
    pub body: String,
    /// Average sentiment, absent for previews.
    pub sentiment: Option<f64>,
    /// Forecast series.
    pub chart: ChartSeries,
    /// Company news.
    pub news: Vec<FeedEntry>,
    /// Company social posts.
    pub social: Vec<FeedEntry>,
}

impl InsightRequest {
    /// Issue the panel's fetches; a company load runs all four concurrently.
    pub async fn fetch<T: Transport>(
        self,
        gateway: &Gateway<T>,
    ) -> Result<InsightData, GatewayError> {
        match self {
            InsightRequest::Company { company, domain } => {
                let scope = FeedScope::Company {
                    company: company.clone(),
                    domain: domain.clone(),
                };
                let (report, forecast, news, social) = tokio::try_join!(
                    gateway.insights(&company, &domain),
                    gateway.forecast(&company, FORECAST_DAYS),
                    gateway.news(&scope, DASHBOARD_FEED_LIMIT),
                    gateway.social(&scope, DASHBOARD_FEED_LIMIT),
                )?;
                Ok(InsightData {
                    title: company,
                    body: report.insights_text,
                    sentiment: Some(report.sentiment_average),
                    chart: ChartSeries::forecast(&forecast),
                    news: feed_entries(&news),
                    social: feed_entries(&social),
                })
            }
            InsightRequest::DomainForecast { domain_name } => {
                let forecast = gateway.forecast(AGGREGATE, FORECAST_DAYS).await?;
                Ok(InsightData {
                    title: format!("{domain_name} — Market Forecast"),
                    body: PREVIEW_TEXT.to_string(),
                    sentiment: None,
                    chart: ChartSeries::forecast(&forecast),
                    news: Vec::new(),
                    social: Vec::new(),
                })
            }
        }
    }
}

/// Rendered state of a shown panel.
#[derive(Debug, Clone, PartialEq)]
pub struct InsightPanelView {
    /// Loaded content.
    pub data: InsightData,
    /// Visible pane.
    pub active_tab: InsightTab,
}

impl InsightPanelView {
    /// KPI line, e.g. `Avg Sentiment: 0`.
    pub fn kpi(&self) -> Option<String> {
        self.data
            .sentiment
            .map(|average| format!("Avg Sentiment: {average}"))
    }
}

/// Hidden or shown; tab and actions exist only while shown.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InsightPanel {
    shown: Option<InsightPanelView>,
}

impl InsightPanel {
    /// Whether the panel is visible.
    pub fn is_shown(&self) -> bool {
        self.shown.is_some()
    }

    /// Current content, `None` while hidden.
    pub fn view(&self) -> Option<&InsightPanelView> {
        self.shown.as_ref()
    }

    /// Populate and show the panel on its first tab.
    pub fn show(&mut self, data: InsightData) {
        info!(title = %data.title, "Insight panel shown");
        self.shown = Some(InsightPanelView {
            data,
            active_tab: InsightTab::default(),
        });
    }

    /// Hide the panel, dropping its content.
    pub fn close(&mut self) {
        self.shown = None;
    }

    /// Switch to `tab`. Returns `false` while hidden.
    pub fn select_tab(&mut self, tab: InsightTab) -> bool {
        match self.shown.as_mut() {
            Some(view) => {
                view.active_tab = tab;
                true
            }
            None => false,
        }
    }

    /// Move `delta` tabs, wrapping around.
    pub fn cycle_tab(&mut self, delta: isize) -> bool {
        let Some(current) = self.shown.as_ref().map(|view| view.active_tab) else {
            return false;
        };
        self.select_tab(current.offset(delta))
    }

    /// Title to attach to an alert, while shown.
    pub fn alert_title(&self) -> Option<String> {
        self.shown.as_ref().map(|view| {
            let title = view.data.title.trim();
            if title.is_empty() {
                DEFAULT_ALERT_TITLE.to_string()
            } else {
                title.to_string()
            }
        })
    }

    /// Write the insight text to `dir/insights.txt`, returning the file path.
    pub fn export(&self, dir: impl AsRef<Path>) -> Result<PathBuf> {
        let view = self
            .shown
            .as_ref()
            .ok_or_else(|| anyhow!("insight panel is not open"))?;
        let dir = dir.as_ref();
        fs::create_dir_all(dir).with_context(|| format!("failed to create {}", dir.display()))?;
        let path = dir.join(EXPORT_FILE_NAME);
        fs::write(&path, &view.data.body)
            .with_context(|| format!("failed to write {}", path.display()))?;
        info!(path = %path.display(), "Insights exported");
        Ok(path)
    }
}
