//! Page router: exactly one named page is active at a time.

use std::{fmt, str::FromStr};

/// Named pages reachable from the navigation bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Page {
    /// Competitor cards plus domain news and social.
    Dashboard,
    /// Every known domain with a switch and a forecast preview.
    Domains,
    /// Forecast chart for a selectable company.
    Market,
    /// Domain social feed.
    Social,
    /// Domain news feed.
    News,
    /// Recognized configuration keys and maintenance actions.
    Settings,
}

impl Page {
    /// Navigation order.
    pub const ALL: [Page; 6] = [
        Page::Dashboard,
        Page::Domains,
        Page::Market,
        Page::Social,
        Page::News,
        Page::Settings,
    ];

    /// Identifier used in navigation requests.
    pub fn as_str(self) -> &'static str {
        match self {
            Page::Dashboard => "dashboard",
            Page::Domains => "domains",
            Page::Market => "market",
            Page::Social => "social",
            Page::News => "news",
            Page::Settings => "settings",
        }
    }

    /// Label shown on the navigation control.
    pub fn title(self) -> &'static str {
        match self {
            Page::Dashboard => "Dashboard",
            Page::Domains => "Domains",
            Page::Market => "Market",
            Page::Social => "Social",
            Page::News => "News",
            Page::Settings => "Settings",
        }
    }

    /// Resolve a page name, treating anything unknown as the dashboard.
    pub fn resolve(name: &str) -> Page {
        name.parse().unwrap_or(Page::Dashboard)
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Name that matches no page.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown page {0:?}")]
pub struct UnknownPage(pub String);

impl FromStr for Page {
    type Err = UnknownPage;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Page::ALL
            .into_iter()
            .find(|page| page.as_str() == value)
            .ok_or_else(|| UnknownPage(value.to_string()))
    }
}

/// One entry of the navigation bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavControl {
    /// Target page.
    pub page: Page,
    /// Whether this control is highlighted.
    pub active: bool,
}

/// Tracks which page is active. No history is kept.
#[derive(Debug, Clone, Default)]
pub struct Router {
    active: Option<Page>,
}

impl Router {
    /// Router with nothing rendered yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Page currently shown, `None` before the first navigation.
    pub fn active(&self) -> Option<Page> {
        self.active
    }

    /// Activate the page called `name`, falling back to the dashboard.
    pub fn navigate(&mut self, name: &str) -> Page {
        self.activate(Page::resolve(name))
    }

    /// Activate `page`.
    pub fn activate(&mut self, page: Page) -> Page {
        self.active = Some(page);
        page
    }

    /// Navigation bar state; at most one control is active.
    pub fn nav_controls(&self) -> Vec<NavControl> {
        Page::ALL
            .into_iter()
            .map(|page| NavControl {
                page,
                active: self.active == Some(page),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_names_resolve_to_dashboard() {
        let mut router = Router::new();
        for name in ["", "Dashboard", "admin", "news "] {
            assert_eq!(router.navigate(name), Page::Dashboard, "{name:?}");
        }
        assert_eq!(router.navigate("news"), Page::News);
    }

    #[test]
    fn exactly_one_control_is_active_after_navigation() {
        let mut router = Router::new();
        assert!(router.nav_controls().iter().all(|control| !control.active));

        for name in ["market", "bogus", "settings"] {
            let resolved = router.navigate(name);
            let active: Vec<_> = router
                .nav_controls()
                .into_iter()
                .filter(|control| control.active)
                .collect();
            assert_eq!(active.len(), 1);
            assert_eq!(active[0].page, resolved);
        }
    }

    #[test]
    fn names_round_trip() {
        for page in Page::ALL {
            assert_eq!(page.as_str().parse::<Page>(), Ok(page));
        }
    }

    #[test]
    fn unknown_name_fails_to_parse_with_its_name() {
        let err = "pricing".parse::<Page>().unwrap_err();
        assert_eq!(err, UnknownPage("pricing".to_string()));
        assert_eq!(err.to_string(), "unknown page \"pricing\"");
    }
}
