//! Maps controller views onto ratatui widgets.

use std::path::Path;

use chrono::Local;
use insightiq_core::{
    controller::AppController,
    modal::{InsightPanelView, InsightTab},
    view::{ChartSeries, DashboardView, DomainsView, FeedEntry, MarketView, SettingsView, View},
};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{Axis, Block, Borders, Chart, Clear, Dataset, GraphType, Paragraph, Wrap},
    Frame,
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Theme {
    dark: bool,
    primary_bg: Color,
    primary_fg: Color,
    accent: Color,
    accent_alt: Color,
    muted: Color,
    selection_bg: Color,
    selection_fg: Color,
    success: Color,
    danger: Color,
}

impl Theme {
    pub fn dark() -> Self {
        Self {
            dark: true,
            primary_bg: Color::Black,
            primary_fg: Color::White,
            accent: Color::Cyan,
            accent_alt: Color::LightBlue,
            muted: Color::DarkGray,
            selection_bg: Color::DarkGray,
            selection_fg: Color::White,
            success: Color::Green,
            danger: Color::Red,
        }
    }

    pub fn light() -> Self {
        Self {
            dark: false,
            primary_bg: Color::White,
            primary_fg: Color::Black,
            accent: Color::Blue,
            accent_alt: Color::Magenta,
            muted: Color::Gray,
            selection_bg: Color::Blue,
            selection_fg: Color::White,
            success: Color::Green,
            danger: Color::Red,
        }
    }

    pub fn toggled(&self) -> Self {
        if self.dark {
            Self::light()
        } else {
            Self::dark()
        }
    }

    fn base(&self) -> Style {
        Style::default().bg(self.primary_bg).fg(self.primary_fg)
    }

    fn selected(&self) -> Style {
        Style::default()
            .bg(self.selection_bg)
            .fg(self.selection_fg)
            .add_modifier(Modifier::BOLD)
    }
}

pub fn draw(
    frame: &mut Frame,
    controller: &AppController,
    theme: &Theme,
    cursor: usize,
    in_flight: usize,
) {
    let area = frame.size();
    frame.render_widget(Block::default().style(theme.base()), area);
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(5),
            Constraint::Length(3),
        ])
        .split(area);

    render_nav(frame, chunks[0], controller, theme);
    match controller.view() {
        Some(view) => render_view(frame, chunks[1], view, theme, cursor),
        None => render_message(frame, chunks[1], "Starting…", theme),
    }
    render_status(frame, chunks[2], controller, theme, in_flight);

    if let Some(panel) = controller.insight().view() {
        render_insight(frame, area, panel, theme);
    }
    if controller.picker().is_shown() {
        render_picker(frame, area, controller, theme);
    }
    if let Some(ack) = controller.acknowledgement() {
        let width = notice_width(ack.message.len(), area.width);
        let popup = centered_rect(width, 5, area);
        let color = if ack.is_error { theme.danger } else { theme.success };
        let paragraph = Paragraph::new(vec![
            Line::from(Span::styled(ack.message.clone(), Style::default().fg(color))),
            Line::from(Span::styled("[Enter] OK", Style::default().fg(theme.muted))),
        ])
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).title("Notice"))
        .style(theme.base());
        frame.render_widget(Clear, popup);
        frame.render_widget(paragraph, popup);
    }
}

fn render_nav(frame: &mut Frame, area: Rect, controller: &AppController, theme: &Theme) {
    let mut spans = Vec::new();
    for (index, control) in controller.nav_controls().into_iter().enumerate() {
        let label = format!(" {} {} ", index + 1, control.page.title());
        let style = if control.active {
            Style::default()
                .fg(theme.accent)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default().fg(theme.primary_fg)
        };
        spans.push(Span::styled(label, style));
        spans.push(Span::raw("│"));
    }
    let title = format!("InsightIQ · {}", controller.selection().active_domain());
    let nav = Paragraph::new(Line::from(spans))
        .block(Block::default().borders(Borders::ALL).title(title));
    frame.render_widget(nav, area);
}

fn render_status(
    frame: &mut Frame,
    area: Rect,
    controller: &AppController,
    theme: &Theme,
    in_flight: usize,
) {
    let activity = if in_flight > 0 {
        format!("  ⟳ {in_flight} request(s)")
    } else {
        String::new()
    };
    let line = Line::from(vec![
        Span::styled(
            Local::now().format("%H:%M:%S ").to_string(),
            Style::default().fg(theme.muted),
        ),
        Span::raw(controller.status().to_string()),
        Span::styled(activity, Style::default().fg(theme.accent_alt)),
    ]);
    let help = Line::from(Span::styled(
        "1-6 pages · d domain · t theme · q quit",
        Style::default().fg(theme.muted),
    ));
    let paragraph = Paragraph::new(vec![line, help]).block(Block::default().borders(Borders::TOP));
    frame.render_widget(paragraph, area);
}

fn render_view(frame: &mut Frame, area: Rect, view: &View, theme: &Theme, cursor: usize) {
    match view {
        View::Loading(page) => {
            render_message(frame, area, &format!("Loading {}…", page.title()), theme)
        }
        View::Dashboard(dashboard) => render_dashboard(frame, area, dashboard, theme, cursor),
        View::Domains(domains) => render_domains(frame, area, domains, theme, cursor),
        View::Market(market) => render_market(frame, area, market, theme),
        View::Social(feed) => render_feed(frame, area, "Social", &feed.items, theme),
        View::News(feed) => render_feed(frame, area, "News", &feed.items, theme),
        View::Settings(settings) => render_settings(frame, area, settings, theme),
        View::Error { page, message } => {
            let paragraph = Paragraph::new(vec![
                Line::from(Span::styled(
                    format!("Could not load {}", page.title()),
                    Style::default().fg(theme.danger).add_modifier(Modifier::BOLD),
                )),
                Line::from(message.clone()),
                Line::from(Span::styled("[r] retry", Style::default().fg(theme.muted))),
            ])
            .wrap(Wrap { trim: true })
            .block(Block::default().borders(Borders::ALL).title("Error"));
            frame.render_widget(paragraph, area);
        }
    }
}

fn render_message(frame: &mut Frame, area: Rect, message: &str, theme: &Theme) {
    let text = Span::styled(message.to_string(), Style::default().fg(theme.muted));
    let paragraph = Paragraph::new(text)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(paragraph, area);
}

fn render_dashboard(
    frame: &mut Frame,
    area: Rect,
    dashboard: &DashboardView,
    theme: &Theme,
    cursor: usize,
) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(area);
    let feeds = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(columns[1]);

    let mut lines: Vec<Line> = Vec::new();
    if dashboard.competitors.is_empty() {
        lines.push(Line::from(Span::styled(
            "No competitors tracked",
            Style::default().fg(theme.muted),
        )));
    }
    for (index, card) in dashboard.competitors.iter().enumerate() {
        let logo = card.logo.primary.as_deref().map(Path::new);
        let logo = card.logo.resolve(logo.map(Path::exists).unwrap_or(false));
        let style = if index == cursor {
            theme.selected()
        } else {
            Style::default().fg(theme.primary_fg)
        };
        lines.push(Line::from(vec![
            Span::styled(format!("▶ {}", card.name), style),
            Span::styled(format!("  {logo}"), Style::default().fg(theme.muted)),
        ]));
    }
    let title = format!(
        "Strategic Intelligence — {} ({} sample rows) · [Enter] insights",
        dashboard.domain, dashboard.sample_size
    );
    let grid = Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title(title));
    frame.render_widget(grid, columns[0]);

    render_feed(frame, feeds[0], "News", &dashboard.news, theme);
    render_feed(frame, feeds[1], "Social", &dashboard.social, theme);
}

fn render_domains(
    frame: &mut Frame,
    area: Rect,
    domains: &DomainsView,
    theme: &Theme,
    cursor: usize,
) {
    let mut lines = Vec::new();
    for (index, card) in domains.cards.iter().enumerate() {
        let marker = if card.active { "●" } else { " " };
        let style = if index == cursor {
            theme.selected()
        } else {
            Style::default().fg(theme.primary_fg)
        };
        lines.push(Line::from(vec![
            Span::styled(format!("{marker} {}", card.name), style),
            Span::styled(format!("  {}", card.slug), Style::default().fg(theme.muted)),
        ]));
        let tags: Vec<Span> = card
            .tags
            .iter()
            .map(|tag| Span::styled(format!("[{tag}] "), Style::default().fg(theme.accent_alt)))
            .collect();
        lines.push(Line::from(tags));
    }
    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title("Domains · [Enter] switch · [f] forecast"),
    );
    frame.render_widget(paragraph, area);
}

fn render_market(frame: &mut Frame, area: Rect, market: &MarketView, theme: &Theme) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(5)])
        .split(area);
    let selector = Paragraph::new(Line::from(vec![
        Span::raw("Company: "),
        Span::styled(
            format!("◀ {} ▶", market.selected_company()),
            Style::default().fg(theme.accent).add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("   charted: {}", market.charted),
            Style::default().fg(theme.muted),
        ),
    ]))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title("Market · [←/→] choose · [Enter] apply"),
    );
    frame.render_widget(selector, chunks[0]);
    render_chart(frame, chunks[1], &market.chart, theme);
}

fn render_feed(frame: &mut Frame, area: Rect, title: &str, items: &[FeedEntry], theme: &Theme) {
    let mut lines = Vec::new();
    if items.is_empty() {
        lines.push(Line::from(Span::styled(
            "Nothing to show",
            Style::default().fg(theme.muted),
        )));
    }
    for item in items {
        let headline = match &item.link {
            Some(_) => Span::styled(
                format!("• {}", item.headline),
                Style::default()
                    .fg(theme.accent)
                    .add_modifier(Modifier::UNDERLINED),
            ),
            None => Span::raw(format!("• {}", item.headline)),
        };
        lines.push(Line::from(vec![
            headline,
            Span::styled(format!(" ({})", item.source), Style::default().fg(theme.muted)),
        ]));
        if let Some(link) = &item.link {
            lines.push(Line::from(Span::styled(
                format!("  {link}"),
                Style::default().fg(theme.muted),
            )));
        }
    }
    let paragraph = Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).title(title.to_string()));
    frame.render_widget(paragraph, area);
}

fn render_settings(frame: &mut Frame, area: Rect, settings: &SettingsView, theme: &Theme) {
    let mut lines = vec![Line::from("Server keys (edit backend/.env):")];
    lines.extend(settings.keys.iter().map(|key| {
        Line::from(Span::styled(
            format!("  {key}=..."),
            Style::default().fg(theme.muted),
        ))
    }));
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "[r] Regenerate CSVs",
        Style::default().fg(theme.accent),
    )));
    let paragraph =
        Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title("Settings"));
    frame.render_widget(paragraph, area);
}

fn render_chart(frame: &mut Frame, area: Rect, series: &ChartSeries, theme: &Theme) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(series.label.clone());
    let Some((min, max)) = series.value_range() else {
        let text = Span::styled("No forecast data", Style::default().fg(theme.muted));
        let empty = Paragraph::new(text)
            .alignment(Alignment::Center)
            .block(block);
        frame.render_widget(empty, area);
        return;
    };
    let indexed = |values: &[f64]| -> Vec<(f64, f64)> {
        values
            .iter()
            .enumerate()
            .map(|(index, value)| (index as f64, *value))
            .collect()
    };
    let main = indexed(&series.values);
    let band = series
        .band
        .as_ref()
        .map(|(lower, upper)| (indexed(lower), indexed(upper)));

    let mut datasets = vec![Dataset::default()
        .name(series.label.clone())
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(theme.accent))
        .data(&main)];
    if let Some((lower, upper)) = band.as_ref() {
        for points in [lower, upper] {
            datasets.push(
                Dataset::default()
                    .marker(symbols::Marker::Dot)
                    .graph_type(GraphType::Line)
                    .style(Style::default().fg(theme.muted))
                    .data(points),
            );
        }
    }

    let last = series.values.len().saturating_sub(1);
    let x_labels = [0, last / 2, last]
        .into_iter()
        .filter_map(|index| series.labels.get(index))
        .map(|label| Span::styled(label.clone(), Style::default().fg(theme.muted)))
        .collect::<Vec<_>>();
    let pad = ((max - min) * 0.1).max(0.01);
    let y_labels = [min, (min + max) / 2.0, max]
        .into_iter()
        .map(|value| Span::styled(format!("{value:.2}"), Style::default().fg(theme.muted)))
        .collect::<Vec<_>>();

    let chart = Chart::new(datasets)
        .block(block)
        .x_axis(
            Axis::default()
                .bounds([0.0, last.max(1) as f64])
                .labels(x_labels),
        )
        .y_axis(
            Axis::default()
                .bounds([min - pad, max + pad])
                .labels(y_labels),
        );
    frame.render_widget(chart, area);
}

fn render_insight(frame: &mut Frame, area: Rect, panel: &InsightPanelView, theme: &Theme) {
    let popup = centered_rect(
        area.width.saturating_sub(8).max(20),
        area.height.saturating_sub(4).max(10),
        area,
    );
    frame.render_widget(Clear, popup);
    let block = Block::default()
        .borders(Borders::ALL)
        .title(panel.data.title.clone())
        .style(theme.base());
    let inner = block.inner(popup);
    frame.render_widget(block, popup);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .split(inner);

    let mut tabs = Vec::new();
    for tab in InsightTab::ALL {
        let style = if tab == panel.active_tab {
            Style::default()
                .fg(theme.accent)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default().fg(theme.muted)
        };
        tabs.push(Span::styled(format!(" {} ", tab.title()), style));
    }
    frame.render_widget(Paragraph::new(Line::from(tabs)), chunks[0]);

    match panel.active_tab {
        InsightTab::Insights => {
            let mut lines = Vec::new();
            if let Some(kpi) = panel.kpi() {
                lines.push(Line::from(Span::styled(
                    kpi,
                    Style::default().fg(theme.success).add_modifier(Modifier::BOLD),
                )));
                lines.push(Line::from(""));
            }
            lines.extend(panel.data.body.lines().map(|line| Line::from(line.to_string())));
            frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), chunks[1]);
        }
        InsightTab::Forecast => render_chart(frame, chunks[1], &panel.data.chart, theme),
        InsightTab::News => render_feed(frame, chunks[1], "News", &panel.data.news, theme),
        InsightTab::Social => render_feed(frame, chunks[1], "Social", &panel.data.social, theme),
    }

    let help = Paragraph::new(Span::styled(
        "[Tab] switch · [e] export · [a] alert · [Esc] close",
        Style::default().fg(theme.muted),
    ));
    frame.render_widget(help, chunks[2]);
}

fn render_picker(frame: &mut Frame, area: Rect, controller: &AppController, theme: &Theme) {
    let tiles = controller.picker_tiles();
    let height = (tiles.len() as u16 + 4).min(area.height);
    let popup = centered_rect(48.min(area.width), height, area);
    let mut lines = Vec::new();
    if tiles.is_empty() {
        lines.push(Line::from(Span::styled(
            "No domains available",
            Style::default().fg(theme.muted),
        )));
    }
    for (index, tile) in tiles.iter().enumerate() {
        let style = if index == controller.picker().cursor() {
            theme.selected()
        } else {
            Style::default().fg(theme.primary_fg)
        };
        let marker = if tile.active { "●" } else { " " };
        lines.push(Line::from(vec![
            Span::styled(format!("{marker} {}", tile.name), style),
            Span::styled(format!("  {}", tile.slug), Style::default().fg(theme.muted)),
        ]));
    }
    let paragraph = Paragraph::new(lines).style(theme.base()).block(
        Block::default()
            .borders(Borders::ALL)
            .title("Choose a domain · [Enter] select · [Esc] close"),
    );
    frame.render_widget(Clear, popup);
    frame.render_widget(paragraph, popup);
}

/// Message width plus padding, at least 24 columns, never wider than the area.
fn notice_width(message_len: usize, area_width: u16) -> u16 {
    let padded = message_len.saturating_add(6).min(u16::MAX as usize) as u16;
    padded.max(24).min(area_width)
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use insightiq_core::{MemoryStore, Outcome};
    use ratatui::{backend::TestBackend, Terminal};

    use super::*;

    fn screen_text(terminal: &Terminal<TestBackend>) -> String {
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn notice_width_fits_narrow_areas() {
        assert_eq!(notice_width(4, 80), 24);
        assert_eq!(notice_width(40, 80), 46);
        assert_eq!(notice_width(40, 20), 20);
        assert_eq!(notice_width(usize::MAX, 12), 12);
    }

    #[test]
    fn acknowledgement_draws_in_a_narrow_terminal() {
        let mut controller = AppController::new(Arc::new(MemoryStore::new()), ".");
        controller.apply(Outcome::Regenerated(Ok("ok".to_string())));
        assert!(controller.acknowledgement().is_some());

        let mut terminal = Terminal::new(TestBackend::new(20, 12)).unwrap();
        terminal
            .draw(|frame| draw(frame, &controller, &Theme::dark(), 0, 0))
            .unwrap();

        assert!(screen_text(&terminal).contains("Notice"));
    }

    #[test]
    fn pages_and_overlays_draw_in_a_tiny_terminal() {
        let mut controller = AppController::new(Arc::new(MemoryStore::new()), ".");
        controller.open_picker();
        let mut terminal = Terminal::new(TestBackend::new(8, 4)).unwrap();
        terminal
            .draw(|frame| draw(frame, &controller, &Theme::light(), 0, 1))
            .unwrap();
    }
}
