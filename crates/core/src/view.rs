//! Declarative descriptions of what each page shows.
//!
//! Frontends map these onto widgets; nothing here knows about a toolkit.

use crate::{
    models::{FeedItem, ForecastPoint},
    router::Page,
};

/// Asset shown when a competitor has no logo or it fails to load.
pub const DEFAULT_LOGO: &str = "assets/default-logo.png";

/// Logo reference with its fallback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogoSource {
    /// Server-provided path, if any.
    pub primary: Option<String>,
}

impl LogoSource {
    /// Path to display given whether the primary image loaded.
    pub fn resolve(&self, loaded: bool) -> &str {
        match self.primary.as_deref() {
            Some(path) if loaded && !path.is_empty() => path,
            _ => DEFAULT_LOGO,
        }
    }
}

/// Competitor card; activating it opens the insight panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompetitorCard {
    /// Company name.
    pub name: String,
    /// Logo to draw.
    pub logo: LogoSource,
}

/// List row of a news or social feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedEntry {
    /// Headline text.
    pub headline: String,
    /// Source label (`-` when unknown).
    pub source: String,
    /// Target when the row is a link.
    pub link: Option<String>,
}

impl From<&FeedItem> for FeedEntry {
    fn from(item: &FeedItem) -> Self {
        Self {
            headline: item.headline.clone(),
            source: item.source_label().to_string(),
            link: item.link.clone().filter(|link| !link.is_empty()),
        }
    }
}

/// Map feed items into rows.
pub fn feed_entries(items: &[FeedItem]) -> Vec<FeedEntry> {
    items.iter().map(FeedEntry::from).collect()
}

/// Line series handed to the charting layer.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ChartSeries {
    /// Legend label.
    pub label: String,
    /// X-axis labels (dates).
    pub labels: Vec<String>,
    /// Predicted values.
    pub values: Vec<f64>,
    /// Lower and upper bounds, present only when every point carries both.
    pub band: Option<(Vec<f64>, Vec<f64>)>,
}

impl ChartSeries {
    /// Build a forecast series from points, preserving order.
    pub fn forecast(points: &[ForecastPoint]) -> Self {
        let band = points
            .iter()
            .map(|point| point.yhat_lower.zip(point.yhat_upper))
            .collect::<Option<Vec<_>>>()
            .filter(|bounds| !bounds.is_empty())
            .map(|bounds| bounds.into_iter().unzip());
        Self {
            label: "Forecast".to_string(),
            labels: points.iter().map(|point| point.date.clone()).collect(),
            values: points.iter().map(|point| point.yhat).collect(),
            band,
        }
    }

    /// Whether there is anything to plot.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Smallest and largest plotted value, bounds included.
    pub fn value_range(&self) -> Option<(f64, f64)> {
        let mut all = self.values.iter().copied().collect::<Vec<_>>();
        if let Some((lower, upper)) = &self.band {
            all.extend(lower.iter().chain(upper.iter()).copied());
        }
        all.into_iter().fold(None, |range, value| match range {
            None => Some((value, value)),
            Some((min, max)) => Some((min.min(value), max.max(value))),
        })
    }
}

/// Dashboard content.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardView {
    /// Domain the dashboard was built for.
    pub domain: String,
    /// Rows available in the domain's sample dataset.
    pub sample_size: usize,
    /// One card per competitor.
    pub competitors: Vec<CompetitorCard>,
    /// Domain news.
    pub news: Vec<FeedEntry>,
    /// Domain social posts.
    pub social: Vec<FeedEntry>,
}

/// Card on the domains page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainCard {
    /// Domain slug.
    pub slug: String,
    /// Display name.
    pub name: String,
    /// Leading competitor names.
    pub tags: Vec<String>,
    /// Whether this is the active domain.
    pub active: bool,
}

/// Domains page content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainsView {
    /// One card per known domain.
    pub cards: Vec<DomainCard>,
}

/// Market page content.
#[derive(Debug, Clone, PartialEq)]
pub struct MarketView {
    /// Selector options; the first is always the aggregate.
    pub options: Vec<String>,
    /// Index of the highlighted option.
    pub selected: usize,
    /// Company the chart currently shows.
    pub charted: String,
    /// Forecast for `charted`.
    pub chart: ChartSeries,
}

impl MarketView {
    /// Option under the selector.
    pub fn selected_company(&self) -> &str {
        self.options
            .get(self.selected)
            .map(String::as_str)
            .unwrap_or(crate::pages::AGGREGATE)
    }

    /// Move the selector by `delta`, wrapping around.
    pub fn cycle(&mut self, delta: isize) {
        let len = self.options.len() as isize;
        if len == 0 {
            return;
        }
        self.selected = (self.selected as isize + delta).rem_euclid(len) as usize;
    }
}

/// Plain feed page content (news or social).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedView {
    /// Rows in server order.
    pub items: Vec<FeedEntry>,
}

/// Settings page content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsView {
    /// Configuration keys the server recognizes; values are never shown.
    pub keys: Vec<&'static str>,
}

/// Content region of the active page.
#[derive(Debug, Clone, PartialEq)]
pub enum View {
    /// Fetches for `page` are in flight.
    Loading(Page),
    /// Dashboard page.
    Dashboard(DashboardView),
    /// Domains page.
    Domains(DomainsView),
    /// Market page.
    Market(MarketView),
    /// Social page.
    Social(FeedView),
    /// News page.
    News(FeedView),
    /// Settings page.
    Settings(SettingsView),
    /// Inline error banner replacing a page that failed to load.
    Error {
        /// Page that failed.
        page: Page,
        /// Human-readable failure.
        message: String,
    },
}

impl View {
    /// Page this content belongs to.
    pub fn page(&self) -> Page {
        match self {
            View::Loading(page) | View::Error { page, .. } => *page,
            View::Dashboard(_) => Page::Dashboard,
            View::Domains(_) => Page::Domains,
            View::Market(_) => Page::Market,
            View::Social(_) => Page::Social,
            View::News(_) => Page::News,
            View::Settings(_) => Page::Settings,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(date: &str, yhat: f64, bounds: Option<(f64, f64)>) -> ForecastPoint {
        ForecastPoint {
            date: date.to_string(),
            yhat,
            yhat_lower: bounds.map(|(lower, _)| lower),
            yhat_upper: bounds.map(|(_, upper)| upper),
        }
    }

    #[test]
    fn logo_falls_back_when_missing_or_broken() {
        let logo = LogoSource {
            primary: Some("backend/logos/ai-ml/openai.png".to_string()),
        };
        assert_eq!(logo.resolve(true), "backend/logos/ai-ml/openai.png");
        assert_eq!(logo.resolve(false), DEFAULT_LOGO);
        assert_eq!(LogoSource { primary: None }.resolve(true), DEFAULT_LOGO);
    }

    #[test]
    fn band_requires_bounds_on_every_point() {
        let full = ChartSeries::forecast(&[
            point("2024-01-01", 1.0, Some((0.5, 1.5))),
            point("2024-01-02", 2.0, Some((1.0, 3.0))),
        ]);
        assert_eq!(full.band, Some((vec![0.5, 1.0], vec![1.5, 3.0])));
        assert_eq!(full.value_range(), Some((0.5, 3.0)));

        let partial = ChartSeries::forecast(&[
            point("2024-01-01", 1.0, Some((0.5, 1.5))),
            point("2024-01-02", 2.0, None),
        ]);
        assert_eq!(partial.band, None);
        assert_eq!(partial.labels, vec!["2024-01-01", "2024-01-02"]);
    }

    #[test]
    fn market_selector_wraps() {
        let mut market = MarketView {
            options: vec!["aggregate".into(), "OpenAI".into()],
            selected: 0,
            charted: "aggregate".into(),
            chart: ChartSeries::default(),
        };
        market.cycle(-1);
        assert_eq!(market.selected_company(), "OpenAI");
        market.cycle(1);
        assert_eq!(market.selected_company(), "aggregate");
    }
}
