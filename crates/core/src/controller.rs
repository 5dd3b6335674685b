//! Application controller: owns selection, routing and overlay state, and
//! turns user intents into [`Job`]s whose [`Outcome`]s are applied back.
//!
//! Every page load, market redraw and insight open is tagged with a
//! generation number. An outcome whose generation has been superseded (the
//! user navigated away, re-applied, or closed the panel) is dropped instead of
//! overwriting newer state.

use std::{path::PathBuf, sync::Arc};

use tracing::{debug, error, info, warn};

use crate::{
    gateway::{Gateway, GatewayError, Transport},
    modal::{DomainPicker, DomainTile, InsightData, InsightPanel, InsightRequest},
    models::{AlertPayload, Domain, ForecastPoint},
    pages::{PageData, PageRequest, FORECAST_DAYS},
    router::{NavControl, Page, Router},
    selection::SelectionStore,
    storage::KeyValueStore,
    view::{ChartSeries, View},
};

/// Status label the server returns when regeneration did not complete.
const REGENERATE_FAILED: &str = "failed";

/// Unit of asynchronous work requested by the controller.
#[derive(Debug, Clone, PartialEq)]
pub enum Job {
    /// Load the domain list at startup.
    LoadDomains,
    /// Load a page.
    Page {
        /// Page pass this load belongs to.
        generation: u64,
        /// Snapshot of what to fetch.
        request: PageRequest,
    },
    /// Redraw the market chart for `company`.
    MarketForecast {
        /// Chart pass this load belongs to.
        generation: u64,
        /// Company to forecast.
        company: String,
    },
    /// Populate the insight panel.
    Insight {
        /// Panel pass this load belongs to.
        generation: u64,
        /// What to load.
        request: InsightRequest,
    },
    /// Ask the server to regenerate derived data.
    Regenerate,
    /// Raise a server-side alert.
    Alert {
        /// Alert title.
        title: String,
    },
}

/// Result of a [`Job`], fed back through [`AppController::apply`].
#[derive(Debug)]
pub enum Outcome {
    /// Startup domain list.
    DomainsLoaded(Result<Vec<Domain>, GatewayError>),
    /// Page load finished.
    Page {
        /// Page pass the load belonged to.
        generation: u64,
        /// Page that was loading.
        page: Page,
        /// Fetched data or failure.
        result: Result<PageData, GatewayError>,
    },
    /// Market chart load finished.
    MarketForecast {
        /// Chart pass the load belonged to.
        generation: u64,
        /// Forecasted company.
        company: String,
        /// Series or failure.
        result: Result<Vec<ForecastPoint>, GatewayError>,
    },
    /// Insight panel load finished.
    Insight {
        /// Panel pass the load belonged to.
        generation: u64,
        /// Panel content or failure.
        result: Result<InsightData, GatewayError>,
    },
    /// Regenerate action finished with the server's status label.
    Regenerated(Result<String, GatewayError>),
    /// Alert action finished.
    AlertCreated(Result<AlertPayload, GatewayError>),
}

impl Job {
    /// Execute the job against `gateway`.
    pub async fn run<T: Transport>(self, gateway: Gateway<T>) -> Outcome {
        match self {
            Job::LoadDomains => Outcome::DomainsLoaded(gateway.domains().await),
            Job::Page {
                generation,
                request,
            } => {
                let page = request.page();
                Outcome::Page {
                    generation,
                    page,
                    result: request.fetch(&gateway).await,
                }
            }
            Job::MarketForecast {
                generation,
                company,
            } => {
                let result = gateway.forecast(&company, FORECAST_DAYS).await;
                Outcome::MarketForecast {
                    generation,
                    company,
                    result,
                }
            }
            Job::Insight {
                generation,
                request,
            } => Outcome::Insight {
                generation,
                result: request.fetch(&gateway).await,
            },
            Job::Regenerate => Outcome::Regenerated(gateway.regenerate_derived_data().await),
            Job::Alert { title } => Outcome::AlertCreated(gateway.create_alert(&title).await),
        }
    }
}

/// Message that blocks further input until dismissed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Acknowledgement {
    /// Text to show.
    pub message: String,
    /// Whether it reports a failure.
    pub is_error: bool,
}

/// Session-lifetime state of the client.
pub struct AppController {
    selection: SelectionStore,
    router: Router,
    view: Option<View>,
    picker: DomainPicker,
    insight: InsightPanel,
    acknowledgement: Option<Acknowledgement>,
    status: String,
    export_dir: PathBuf,
    page_generation: u64,
    chart_generation: u64,
    insight_generation: u64,
}

impl AppController {
    /// Controller restoring its selection from `storage`.
    pub fn new(storage: Arc<dyn KeyValueStore>, export_dir: impl Into<PathBuf>) -> Self {
        Self {
            selection: SelectionStore::open(storage),
            router: Router::new(),
            view: None,
            picker: DomainPicker::default(),
            insight: InsightPanel::default(),
            acknowledgement: None,
            status: "Ready".to_string(),
            export_dir: export_dir.into(),
            page_generation: 0,
            chart_generation: 0,
            insight_generation: 0,
        }
    }

    /// First job of a session.
    pub fn start(&mut self) -> Job {
        self.status = "Loading domains…".to_string();
        Job::LoadDomains
    }

    /// Selection state.
    pub fn selection(&self) -> &SelectionStore {
        &self.selection
    }

    /// Content region of the active page, `None` before the first navigation.
    pub fn view(&self) -> Option<&View> {
        self.view.as_ref()
    }

    /// Page currently active.
    pub fn active_page(&self) -> Option<Page> {
        self.router.active()
    }

    /// Navigation bar state.
    pub fn nav_controls(&self) -> Vec<NavControl> {
        self.router.nav_controls()
    }

    /// Insight panel state.
    pub fn insight(&self) -> &InsightPanel {
        &self.insight
    }

    /// Domain picker state.
    pub fn picker(&self) -> &DomainPicker {
        &self.picker
    }

    /// Picker tiles over the known domains.
    pub fn picker_tiles(&self) -> Vec<DomainTile> {
        DomainPicker::tiles(
            self.selection.known_domains(),
            self.selection.active_domain(),
        )
    }

    /// Pending blocking message.
    pub fn acknowledgement(&self) -> Option<&Acknowledgement> {
        self.acknowledgement.as_ref()
    }

    /// Dismiss the blocking message.
    pub fn dismiss_acknowledgement(&mut self) {
        self.acknowledgement = None;
    }

    /// One-line status text.
    pub fn status(&self) -> &str {
        &self.status
    }

    /// Record a status line from the frontend.
    pub fn set_status(&mut self, status: impl Into<String>) {
        self.status = status.into();
    }

    /// Navigate to the page called `name`; unknown names go to the dashboard.
    pub fn navigate(&mut self, name: &str) -> Job {
        let page = self.router.navigate(name);
        self.load_page(page)
    }

    /// Navigate to `page`.
    pub fn navigate_to(&mut self, page: Page) -> Job {
        self.router.activate(page);
        self.load_page(page)
    }

    fn load_page(&mut self, page: Page) -> Job {
        self.page_generation += 1;
        self.chart_generation += 1;
        self.view = Some(View::Loading(page));
        let domain = self.selection.active_domain().to_string();
        let request = match page {
            Page::Dashboard => PageRequest::Dashboard { domain },
            Page::Domains => PageRequest::Domains {
                domains: self.selection.known_domains().to_vec(),
                active: domain,
            },
            Page::Market => PageRequest::Market {
                competitors: self.selection.competitors_for_active().map(<[_]>::to_vec),
                domain,
            },
            Page::Social => PageRequest::Social { domain },
            Page::News => PageRequest::News { domain },
            Page::Settings => PageRequest::Settings,
        };
        info!(page = %page, generation = self.page_generation, "Navigating");
        Job::Page {
            generation: self.page_generation,
            request,
        }
    }

    /// Make `slug` active, persist it and reload the dashboard.
    pub fn switch_domain(&mut self, slug: &str) -> Job {
        if let Err(err) = self.selection.set_active_domain(slug) {
            warn!(?err, domain = %slug, "Failed to persist active domain");
            self.status = format!("Domain not saved: {err}");
        } else {
            self.status = format!("Domain set to {slug}");
        }
        self.navigate_to(Page::Dashboard)
    }

    /// Show the domain picker.
    pub fn open_picker(&mut self) {
        self.picker.open(
            self.selection.known_domains(),
            self.selection.active_domain(),
        );
    }

    /// Hide the picker without changing the domain.
    pub fn close_picker(&mut self) {
        self.picker.close();
    }

    /// Move the picker highlight.
    pub fn move_picker(&mut self, delta: isize) {
        let len = self.selection.known_domains().len();
        self.picker.move_cursor(delta, len);
    }

    /// Choose the highlighted picker tile.
    pub fn pick_highlighted(&mut self) -> Option<Job> {
        let slug = self
            .selection
            .known_domains()
            .get(self.picker.cursor())?
            .slug
            .clone();
        Some(self.pick_domain(&slug))
    }

    /// Choose `slug` from the picker: persist, hide, show the dashboard.
    pub fn pick_domain(&mut self, slug: &str) -> Job {
        self.picker.close();
        self.switch_domain(slug)
    }

    /// Move the market selector.
    pub fn cycle_market(&mut self, delta: isize) {
        if let Some(View::Market(market)) = self.view.as_mut() {
            market.cycle(delta);
        }
    }

    /// Redraw the market chart for the selected company.
    pub fn apply_market(&mut self) -> Option<Job> {
        let Some(View::Market(market)) = self.view.as_ref() else {
            return None;
        };
        let company = market.selected_company().to_string();
        self.chart_generation += 1;
        debug!(%company, generation = self.chart_generation, "Applying market selection");
        Some(Job::MarketForecast {
            generation: self.chart_generation,
            company,
        })
    }

    /// Open the insight panel for a competitor of the active domain.
    pub fn open_competitor(&mut self, company: &str) -> Job {
        self.status = format!("Loading insights for {company}…");
        self.open_insight(InsightRequest::Company {
            company: company.to_string(),
            domain: self.selection.active_domain().to_string(),
        })
    }

    /// Open the insight panel with a domain's aggregate forecast.
    pub fn preview_domain_forecast(&mut self, slug: &str) -> Option<Job> {
        let domain_name = self.selection.domain(slug)?.name.clone();
        Some(self.open_insight(InsightRequest::DomainForecast { domain_name }))
    }

    fn open_insight(&mut self, request: InsightRequest) -> Job {
        self.insight_generation += 1;
        Job::Insight {
            generation: self.insight_generation,
            request,
        }
    }

    /// Hide the insight panel; its in-flight loads will be discarded.
    pub fn close_insight(&mut self) {
        self.insight_generation += 1;
        self.insight.close();
    }

    /// Switch insight tabs.
    pub fn cycle_insight_tab(&mut self, delta: isize) -> bool {
        self.insight.cycle_tab(delta)
    }

    /// Save the insight text locally; the outcome is acknowledged.
    pub fn export_insights(&mut self) {
        if !self.insight.is_shown() {
            return;
        }
        self.acknowledgement = Some(match self.insight.export(&self.export_dir) {
            Ok(path) => Acknowledgement {
                message: format!("Insights exported to {}", path.display()),
                is_error: false,
            },
            Err(err) => {
                error!(?err, "Export failed");
                Acknowledgement {
                    message: format!("Export failed: {err:#}"),
                    is_error: true,
                }
            }
        });
    }

    /// Raise an alert titled after the open panel.
    pub fn create_alert(&mut self) -> Option<Job> {
        let title = self.insight.alert_title()?;
        Some(Job::Alert { title })
    }

    /// Trigger server-side regeneration of derived data.
    pub fn regenerate(&mut self) -> Job {
        self.status = "Regenerating data…".to_string();
        Job::Regenerate
    }

    /// Apply a finished job. May return a follow-up job.
    pub fn apply(&mut self, outcome: Outcome) -> Option<Job> {
        match outcome {
            Outcome::DomainsLoaded(result) => {
                match result {
                    Ok(domains) => {
                        info!(total = domains.len(), "Domains loaded");
                        self.status = format!("Loaded {} domains", domains.len());
                        self.selection.set_known_domains(domains);
                    }
                    Err(err) => {
                        error!(?err, "Domain load failed");
                        self.status = format!("Failed to load domains: {err}");
                    }
                }
                if !self.selection.has_persisted_domain() {
                    self.open_picker();
                }
                Some(self.navigate_to(Page::Dashboard))
            }
            Outcome::Page {
                generation,
                page,
                result,
            } => {
                if generation != self.page_generation {
                    warn!(
                        page = %page,
                        generation,
                        current = self.page_generation,
                        "Discarding stale page load"
                    );
                    return None;
                }
                match result {
                    Ok(data) => {
                        if let Some((domain, competitors)) = data.loaded_competitors() {
                            self.selection
                                .set_active_competitors(domain, competitors.to_vec());
                        }
                        self.view = Some(data.render());
                    }
                    Err(err) => {
                        error!(?err, page = %page, "Page load failed");
                        self.view = Some(View::Error {
                            page,
                            message: err.to_string(),
                        });
                    }
                }
                None
            }
            Outcome::MarketForecast {
                generation,
                company,
                result,
            } => {
                if generation != self.chart_generation {
                    warn!(
                        %company,
                        generation,
                        current = self.chart_generation,
                        "Discarding stale market forecast"
                    );
                    return None;
                }
                let Some(View::Market(market)) = self.view.as_mut() else {
                    return None;
                };
                match result {
                    Ok(points) => {
                        market.chart = ChartSeries::forecast(&points);
                        market.charted = company;
                    }
                    Err(err) => {
                        error!(?err, %company, "Market forecast failed");
                        self.status = format!("Forecast for {company} failed: {err}");
                    }
                }
                None
            }
            Outcome::Insight { generation, result } => {
                if generation != self.insight_generation {
                    warn!(
                        generation,
                        current = self.insight_generation,
                        "Discarding stale insight load"
                    );
                    return None;
                }
                match result {
                    Ok(data) => {
                        self.status = format!("Insights: {}", data.title);
                        self.insight.show(data);
                    }
                    Err(err) => {
                        error!(?err, "Insight load failed");
                        self.status = format!("Failed to load insights: {err}");
                    }
                }
                None
            }
            Outcome::Regenerated(result) => {
                self.acknowledgement = Some(match result {
                    Ok(status) if status == REGENERATE_FAILED => {
                        warn!(%status, "Server reported failed regeneration");
                        Acknowledgement {
                            message: format!("Regeneration failed: server reported {status}"),
                            is_error: true,
                        }
                    }
                    Ok(_) => Acknowledgement {
                        message: "CSVs regenerated.".to_string(),
                        is_error: false,
                    },
                    Err(err) => Acknowledgement {
                        message: format!("Regeneration failed: {err}"),
                        is_error: true,
                    },
                });
                self.status = "Ready".to_string();
                None
            }
            Outcome::AlertCreated(result) => {
                self.acknowledgement = Some(match result {
                    Ok(payload) => {
                        info!(title = %payload.title, "Alert created");
                        Acknowledgement {
                            message: "Alert created".to_string(),
                            is_error: false,
                        }
                    }
                    Err(err) => Acknowledgement {
                        message: format!("Alert failed: {err}"),
                        is_error: true,
                    },
                });
                None
            }
        }
    }
}
