use std::{io, panic, thread, time::Duration};

use anyhow::{Context, Result};
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use insightiq_core::{
    controller::{AppController, Job, Outcome},
    router::Page,
    view::View,
    Gateway, HttpTransport,
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::{spawn, sync::mpsc};
use tracing::{debug, error, info};

use crate::render::{self, Theme};

const TICK_RATE: Duration = Duration::from_millis(250);

enum AppEvent {
    Input(Event),
    Tick,
    Finished(Outcome),
}

/// Terminal frontend driving an [`AppController`].
pub struct InsightApp {
    controller: AppController,
    gateway: Gateway<HttpTransport>,
    theme: Theme,
    cursor: usize,
    in_flight: usize,
    event_tx: Option<mpsc::Sender<AppEvent>>,
    should_quit: bool,
}

impl InsightApp {
    pub fn new(controller: AppController, gateway: Gateway<HttpTransport>) -> Self {
        Self {
            controller,
            gateway,
            theme: Theme::dark(),
            cursor: 0,
            in_flight: 0,
            event_tx: None,
            should_quit: false,
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        install_panic_hook();
        let mut stdout = io::stdout();
        enable_raw_mode().context("failed to enter raw mode")?;
        execute!(stdout, EnterAlternateScreen).context("failed to enter alternate screen")?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend).context("failed to create terminal")?;
        terminal.hide_cursor()?;
        terminal.clear()?;

        let (event_tx, mut event_rx) = mpsc::channel::<AppEvent>(128);
        spawn_input_thread(event_tx.clone());
        self.event_tx = Some(event_tx);

        let job = self.controller.start();
        self.dispatch(job);

        let result = loop {
            if let Err(err) = terminal.draw(|frame| {
                render::draw(frame, &self.controller, &self.theme, self.cursor, self.in_flight)
            }) {
                break Err(err.into());
            }
            if self.should_quit {
                break Ok(());
            }
            match event_rx.recv().await {
                Some(event) => self.process_app_event(event),
                None => break Ok(()),
            }
        };

        restore_terminal(&mut terminal)?;
        self.event_tx = None;
        info!("Session closed");
        result
    }

    fn dispatch(&mut self, job: Job) {
        let Some(sender) = self.event_tx.clone() else {
            error!("event_channel_missing");
            self.controller
                .set_status("Internal error: event channel unavailable");
            return;
        };
        debug!(?job, "Dispatching job");
        self.in_flight += 1;
        let gateway = self.gateway.clone();
        spawn(async move {
            let outcome = job.run(gateway).await;
            let _ = sender.send(AppEvent::Finished(outcome)).await;
        });
    }

    fn dispatch_opt(&mut self, job: Option<Job>) {
        if let Some(job) = job {
            self.dispatch(job);
        }
    }

    fn process_app_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::Input(Event::Key(key)) if key.kind != KeyEventKind::Release => {
                self.handle_key(key)
            }
            AppEvent::Input(_) | AppEvent::Tick => {}
            AppEvent::Finished(outcome) => {
                self.in_flight = self.in_flight.saturating_sub(1);
                let follow_up = self.controller.apply(outcome);
                self.clamp_cursor();
                self.dispatch_opt(follow_up);
            }
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }
        if self.controller.acknowledgement().is_some() {
            if matches!(key.code, KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ')) {
                self.controller.dismiss_acknowledgement();
            }
            return;
        }
        if self.controller.picker().is_shown() {
            self.handle_picker_key(key);
            return;
        }
        if self.controller.insight().is_shown() {
            self.handle_insight_key(key);
            return;
        }
        if self.handle_global_key(key) {
            return;
        }
        self.handle_page_key(key);
    }

    fn handle_global_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('d') => self.controller.open_picker(),
            KeyCode::Char('t') => self.theme = self.theme.toggled(),
            KeyCode::Char(ch @ '1'..='6') => {
                let index = ch as usize - '1' as usize;
                self.go_to(Page::ALL[index]);
            }
            _ => return false,
        }
        true
    }

    fn handle_picker_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.controller.move_picker(-1),
            KeyCode::Down | KeyCode::Char('j') => self.controller.move_picker(1),
            KeyCode::Enter => {
                let job = self.controller.pick_highlighted();
                self.cursor = 0;
                self.dispatch_opt(job);
            }
            KeyCode::Esc => self.controller.close_picker(),
            _ => {}
        }
    }

    fn handle_insight_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Tab | KeyCode::Right | KeyCode::Char('l') => {
                self.controller.cycle_insight_tab(1);
            }
            KeyCode::BackTab | KeyCode::Left | KeyCode::Char('h') => {
                self.controller.cycle_insight_tab(-1);
            }
            KeyCode::Char('e') => self.controller.export_insights(),
            KeyCode::Char('a') => {
                let job = self.controller.create_alert();
                self.dispatch_opt(job);
            }
            KeyCode::Esc | KeyCode::Char('x') => self.controller.close_insight(),
            _ => {}
        }
    }

    fn handle_page_key(&mut self, key: KeyEvent) {
        let Some(view) = self.controller.view() else {
            return;
        };
        match view {
            View::Dashboard(dashboard) => {
                let len = dashboard.competitors.len();
                let selected = dashboard
                    .competitors
                    .get(self.cursor)
                    .map(|card| card.name.clone());
                match key.code {
                    KeyCode::Up | KeyCode::Char('k') => self.move_cursor(-1, len),
                    KeyCode::Down | KeyCode::Char('j') => self.move_cursor(1, len),
                    KeyCode::Enter => {
                        if let Some(name) = selected {
                            let job = self.controller.open_competitor(&name);
                            self.dispatch(job);
                        }
                    }
                    _ => {}
                }
            }
            View::Domains(domains) => {
                let len = domains.cards.len();
                let selected = domains.cards.get(self.cursor).map(|card| card.slug.clone());
                match key.code {
                    KeyCode::Up | KeyCode::Char('k') => self.move_cursor(-1, len),
                    KeyCode::Down | KeyCode::Char('j') => self.move_cursor(1, len),
                    KeyCode::Enter => {
                        if let Some(slug) = selected {
                            let job = self.controller.switch_domain(&slug);
                            self.cursor = 0;
                            self.dispatch(job);
                        }
                    }
                    KeyCode::Char('f') => {
                        if let Some(slug) = selected {
                            let job = self.controller.preview_domain_forecast(&slug);
                            self.dispatch_opt(job);
                        }
                    }
                    _ => {}
                }
            }
            View::Market(_) => match key.code {
                KeyCode::Up | KeyCode::Left | KeyCode::Char('k') => {
                    self.controller.cycle_market(-1)
                }
                KeyCode::Down | KeyCode::Right | KeyCode::Char('j') => {
                    self.controller.cycle_market(1)
                }
                KeyCode::Enter => {
                    let job = self.controller.apply_market();
                    self.dispatch_opt(job);
                }
                _ => {}
            },
            View::Settings(_) => {
                if key.code == KeyCode::Char('r') {
                    let job = self.controller.regenerate();
                    self.dispatch(job);
                }
            }
            View::Error { page, .. } => {
                if key.code == KeyCode::Char('r') {
                    let page = *page;
                    self.go_to(page);
                }
            }
            View::Loading(_) | View::Social(_) | View::News(_) => {}
        }
    }

    fn go_to(&mut self, page: Page) {
        self.cursor = 0;
        let job = self.controller.navigate_to(page);
        self.dispatch(job);
    }

    fn move_cursor(&mut self, delta: isize, len: usize) {
        if len == 0 {
            self.cursor = 0;
            return;
        }
        let next = (self.cursor as isize + delta).clamp(0, len as isize - 1);
        self.cursor = next as usize;
    }

    fn clamp_cursor(&mut self) {
        let len = match self.controller.view() {
            Some(View::Dashboard(dashboard)) => dashboard.competitors.len(),
            Some(View::Domains(domains)) => domains.cards.len(),
            _ => 0,
        };
        if self.cursor >= len {
            self.cursor = len.saturating_sub(1);
        }
    }
}

fn install_panic_hook() {
    let default_hook = panic::take_hook();
    panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, cursor::Show);
        default_hook(info);
    }));
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode().context("failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("failed to leave alternate screen")?;
    terminal.show_cursor()?;
    Ok(())
}

fn spawn_input_thread(sender: mpsc::Sender<AppEvent>) {
    thread::spawn(move || loop {
        match event::poll(TICK_RATE) {
            Ok(true) => match event::read() {
                Ok(evt) => {
                    if sender.blocking_send(AppEvent::Input(evt)).is_err() {
                        break;
                    }
                }
                Err(_) => break,
            },
            Ok(false) => {
                if sender.blocking_send(AppEvent::Tick).is_err() {
                    break;
                }
            }
            Err(_) => break,
        }
    });
}
