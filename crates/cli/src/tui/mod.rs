use std::io::stdout;
use std::time::{Duration, Instant};

use crossterm::{
    event::{self, Event, KeyCode, KeyEvent},
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Sparkline},
    Frame, Terminal,
};

use cellboard_core::Cursor;
use cellboard_engine::path::CellPath;
use cellboard_recon::display::{DisplayNode, GaugeBand};
use cellboard_recon::detail::render_ledger;
use cellboard_recon::{Dashboard, DetailView, TickOutcome};

use crate::util;

struct DashboardApp {
    dashboard: Dashboard,
    cursor: Cursor,
    interval: Duration,
    /// Last tick that failed to reload, shown until the next good one
    stale_reason: Option<String>,
    /// Whether the last tick rebuilt the display
    rebuilt: bool,
    should_quit: bool,
    show_help: bool,
}

impl DashboardApp {
    fn new(dashboard: Dashboard, interval: Duration) -> Self {
        let mut cursor = Cursor::default();
        cursor.clamp_to(&dashboard.tree().column_lens());
        Self {
            dashboard,
            cursor,
            interval,
            stale_reason: None,
            rebuilt: false,
            should_quit: false,
            show_help: false,
        }
    }

    fn tick(&mut self) {
        match self.dashboard.tick() {
            TickOutcome::Reconciled(_) => {
                self.stale_reason = None;
                self.rebuilt = false;
            }
            TickOutcome::Rebuilt(_) => {
                self.stale_reason = None;
                self.rebuilt = true;
            }
            TickOutcome::Stale(err) => self.stale_reason = Some(err.to_string()),
        }
        self.cursor.clamp_to(&self.dashboard.tree().column_lens());
    }

    /// Node under the cursor.
    fn cursor_node(&self) -> Option<&DisplayNode> {
        self.dashboard
            .tree()
            .column(self.cursor.column)?
            .rows()
            .get(self.cursor.row)
            .copied()
    }

    fn select_under_cursor(&mut self) {
        if let Some(path) = self.cursor_node().map(|n| n.path.clone()) {
            self.dashboard.select_path(path);
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if self.show_help {
            self.show_help = false;
            return;
        }

        let lens = self.dashboard.tree().column_lens();
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Char('?') => self.show_help = true,
            KeyCode::Up | KeyCode::Char('k') => self.cursor.move_by(0, -1, &lens),
            KeyCode::Down | KeyCode::Char('j') => self.cursor.move_by(0, 1, &lens),
            KeyCode::Left | KeyCode::Char('h') => self.cursor.move_by(-1, 0, &lens),
            KeyCode::Right | KeyCode::Char('l') | KeyCode::Tab => self.cursor.move_by(1, 0, &lens),
            KeyCode::BackTab => self.cursor.move_by(-1, 0, &lens),
            KeyCode::Home | KeyCode::Char('g') => self.cursor.row = 0,
            KeyCode::End | KeyCode::Char('G') => self.cursor.move_by(0, isize::MAX / 2, &lens),
            KeyCode::Enter | KeyCode::Char(' ') => self.select_under_cursor(),
            KeyCode::Char('c') => self.dashboard.clear_selection(),
            KeyCode::Char('r') => self.tick(),
            _ => {}
        }
    }

    fn is_stale(&self, path: &CellPath) -> bool {
        self.dashboard
            .last_report()
            .is_some_and(|r| r.stale.contains(path))
    }

    fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        let chunks = Layout::vertical([
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .split(area);

        self.draw_title(frame, chunks[0]);

        let body = Layout::horizontal([Constraint::Percentage(62), Constraint::Percentage(38)])
            .split(chunks[1]);
        self.draw_grid(frame, body[0]);
        self.draw_detail(frame, body[1]);

        self.draw_status(frame, chunks[2]);

        if self.show_help {
            self.draw_help(frame, area);
        }
    }

    fn draw_title(&self, frame: &mut Frame, area: Rect) {
        let source = self.dashboard.source();
        let title = format!(
            " cellboard: {} ({}) | every {} ms ",
            source.path().display(),
            source.label(),
            self.interval.as_millis()
        );
        let para = Paragraph::new(Line::from(vec![Span::styled(
            title,
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )]))
        .style(Style::default().bg(Color::Cyan));
        frame.render_widget(para, area);
    }

    fn draw_grid(&self, frame: &mut Frame, area: Rect) {
        let tree = self.dashboard.tree();
        if tree.columns().is_empty() {
            let msg = Paragraph::new("(no columns)").style(Style::default().fg(Color::DarkGray));
            frame.render_widget(msg, area);
            return;
        }

        let constraints: Vec<Constraint> = tree
            .columns()
            .iter()
            .map(|_| Constraint::Ratio(1, tree.columns().len() as u32))
            .collect();
        let slots = Layout::horizontal(constraints).split(area);
        let selected = self.dashboard.selection().current();

        for (column, slot) in tree.columns().iter().zip(slots.iter()) {
            let active = column.index == self.cursor.column;
            let inner_width = slot.width.saturating_sub(2) as usize;
            let inner_height = slot.height.saturating_sub(2) as usize;
            let rows = column.rows();

            let scroll = if active && inner_height > 0 {
                self.cursor.row.saturating_sub(inner_height - 1)
            } else {
                0
            };

            let lines: Vec<Line> = rows
                .iter()
                .enumerate()
                .skip(scroll)
                .take(inner_height)
                .map(|(r, node)| {
                    let under_cursor = active && r == self.cursor.row;
                    let style = if under_cursor {
                        Style::default()
                            .fg(Color::Black)
                            .bg(Color::White)
                            .add_modifier(Modifier::BOLD)
                    } else if selected == Some(&node.path) {
                        Style::default().fg(Color::Yellow)
                    } else if self.is_stale(&node.path) {
                        Style::default().fg(Color::DarkGray)
                    } else {
                        Style::default().fg(Color::Gray)
                    };
                    Line::from(Span::styled(node_line(node, inner_width), style))
                })
                .collect();

            let border = if active { Color::Yellow } else { Color::DarkGray };
            let block = Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(border))
                .title(format!(" {} ", util::truncate_display(&column.header, inner_width)));
            frame.render_widget(Paragraph::new(lines).block(block), *slot);
        }
    }

    fn draw_detail(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan));

        let Some(detail) = self.dashboard.detail() else {
            // Nothing selected: the whole ledger.
            let ledger = render_ledger(self.dashboard.history());
            let mut lines = vec![Line::from(Span::styled(
                "Select a cell with Enter",
                Style::default().fg(Color::DarkGray),
            ))];
            lines.extend(ledger.lines().map(|l| Line::from(l.to_string())));
            frame.render_widget(Paragraph::new(lines).block(block.title(" History ")), area);
            return;
        };

        let parts = Layout::vertical([Constraint::Min(4), Constraint::Length(6)]).split(area);
        let para = Paragraph::new(detail_lines(&detail)).block(block.title(" Detail "));
        frame.render_widget(para, parts[0]);

        // Sparkline bars are unsigned; shift the series onto its own floor.
        let (floor, ceil) = detail.series.y_range();
        let span = (ceil - floor).max(f64::EPSILON);
        let bars: Vec<u64> = detail
            .series
            .values
            .iter()
            .map(|v| (((v - floor) / span) * 100.0).round() as u64 + 1)
            .collect();
        let spark = Sparkline::default()
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::DarkGray))
                    .title(format!(" {} ", detail.series.title())),
            )
            .max(101)
            .data(&bars)
            .style(Style::default().fg(Color::Green));
        frame.render_widget(spark, parts[1]);
    }

    fn draw_status(&self, frame: &mut Frame, area: Rect) {
        let mut left = match self.dashboard.last_report() {
            Some(report) => format!(
                " refreshed {}  {}",
                report.refreshed_at.format("%H:%M:%S"),
                report.summary()
            ),
            None => " not refreshed yet".to_string(),
        };
        if self.rebuilt {
            left.push_str("  [rebuilt]");
        } else if self.dashboard.last_report().is_some_and(|r| r.structure_changed()) {
            left.push_str("  [structure changed]");
        }
        if let Some(reason) = &self.stale_reason {
            left.push_str(&format!("  [stale: {}]", reason));
        }

        let right = format!(
            "history {}/{}  ?: help ",
            self.dashboard.history().len(),
            self.dashboard.history().total_values()
        );
        let width = area.width as usize;
        let left = util::truncate_display(&left, width.saturating_sub(util::display_width(&right)));
        let padding = width.saturating_sub(util::display_width(&left) + util::display_width(&right));
        let status = format!("{}{:pad$}{}", left, "", right, pad = padding);

        let bg = if self.stale_reason.is_some() { Color::Red } else { Color::DarkGray };
        let para = Paragraph::new(Line::from(vec![Span::styled(
            status,
            Style::default().fg(Color::Black).bg(bg),
        )]))
        .style(Style::default().bg(bg));
        frame.render_widget(para, area);
    }

    fn draw_help(&self, frame: &mut Frame, area: Rect) {
        let help_lines = [
            "",
            "  Navigation",
            "  ----------",
            "  arrows / hjkl     Move cursor",
            "  Tab / Shift+Tab   Next/prev column",
            "  Home / g          First row",
            "  End  / G          Last row",
            "",
            "  Dashboard",
            "  ---------",
            "  Enter / Space     Show cell in detail panel",
            "  c                 Clear selection",
            "  r                 Refresh now",
            "",
            "  General",
            "  -------",
            "  q / Esc           Quit",
            "  ?                 Toggle this help",
            "",
        ];
        let help_width: u16 = 48;
        let help_height: u16 = help_lines.len() as u16 + 2;

        let x = area.width.saturating_sub(help_width) / 2;
        let y = area.height.saturating_sub(help_height) / 2;
        let popup = Rect::new(
            area.x + x,
            area.y + y,
            help_width.min(area.width),
            help_height.min(area.height),
        );

        let lines: Vec<Line> = help_lines
            .iter()
            .map(|s| Line::from(Span::styled(*s, Style::default().fg(Color::White))))
            .collect();

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(" Keybindings ")
            .title_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
            .style(Style::default().bg(Color::Black));

        frame.render_widget(Clear, popup);
        frame.render_widget(Paragraph::new(lines).block(block), popup);
    }
}

/// One grid row: indented title on the left, value on the right.
fn node_line(node: &DisplayNode, width: usize) -> String {
    let mut text = if node.text.is_empty() { "-".to_string() } else { node.text.clone() };
    if let Some(gauge) = &node.gauge {
        text = format!("{} {}", text, band_mark(gauge.band));
    }
    let text_width = util::display_width(&text).min(width / 2);
    let title_width = width.saturating_sub(text_width + 1);
    let title = format!("{}{}", util::indent(node.path.depth()), node.title);
    format!(
        "{} {}",
        util::pad_right(&title, title_width),
        util::truncate_display(&text, text_width)
    )
}

fn band_mark(band: GaugeBand) -> &'static str {
    match band {
        GaugeBand::Cold => "▁",
        GaugeBand::Normal => "▃",
        GaugeBand::Warm => "▅",
        GaugeBand::Hot => "▇",
        GaugeBand::Critical => "█",
    }
}

fn detail_lines(detail: &DetailView) -> Vec<Line<'static>> {
    let label = Style::default().fg(Color::Cyan);
    let mut lines = vec![Line::from(Span::styled(
        detail.breadcrumb.clone(),
        Style::default().add_modifier(Modifier::BOLD),
    ))];
    if detail.partial {
        lines.push(Line::from(Span::styled(
            format!(
                "requested depth {}, showing depth {}",
                detail.requested.depth(),
                detail.resolved.depth()
            ),
            Style::default().fg(Color::Yellow),
        )));
    }
    lines.push(Line::from(vec![
        Span::styled("Content: ", label),
        Span::raw(detail.content.clone()),
    ]));
    let value = if detail.text.is_empty() { "-".to_string() } else { detail.text.clone() };
    lines.push(Line::from(vec![Span::styled("Value:   ", label), Span::raw(value)]));
    if let Some(gauge) = &detail.gauge {
        lines.push(Line::from(vec![
            Span::styled("Gauge:   ", label),
            Span::raw(format!(
                "{} {:?} (raw {})",
                util::gauge_bar(gauge.fraction, 12),
                gauge.band,
                gauge.raw
            )),
        ]));
    }
    if !detail.children.is_empty() {
        lines.push(Line::from(Span::styled("Sub-cells:", label)));
        for child in &detail.children {
            let text = if child.text.is_empty() { "-" } else { child.text.as_str() };
            lines.push(Line::from(format!("  {}: {}", child.content, text)));
        }
    }
    lines.push(Line::from(Span::styled("History:", label)));
    if detail.history.is_empty() {
        lines.push(Line::from(Span::styled("  (none)", Style::default().fg(Color::DarkGray))));
    }
    for entry in detail.history.iter().rev() {
        lines.push(Line::from(format!("  {}", entry)));
    }
    lines
}

/// Run the interactive dashboard until the user quits.
///
/// Ticks run on this thread: one fires once `interval` has passed since
/// the previous one started, and a slow reload only delays the next.
pub fn run(dashboard: Dashboard, interval: Duration) -> Result<(), String> {
    let app = DashboardApp::new(dashboard, interval);
    run_app(app)
}

fn run_app(mut app: DashboardApp) -> Result<(), String> {
    terminal::enable_raw_mode().map_err(|e| format!("failed to enable raw mode: {}", e))?;
    stdout()
        .execute(EnterAlternateScreen)
        .map_err(|e| format!("failed to enter alternate screen: {}", e))?;

    struct Cleanup;
    impl Drop for Cleanup {
        fn drop(&mut self) {
            let _ = stdout().execute(LeaveAlternateScreen);
            let _ = terminal::disable_raw_mode();
        }
    }
    let _cleanup = Cleanup;

    let backend = CrosstermBackend::new(stdout());
    let mut terminal =
        Terminal::new(backend).map_err(|e| format!("failed to create terminal: {}", e))?;

    let mut last_tick = Instant::now();
    loop {
        terminal
            .draw(|frame| app.draw(frame))
            .map_err(|e| format!("draw error: {}", e))?;

        let timeout = app.interval.saturating_sub(last_tick.elapsed());
        if event::poll(timeout).map_err(|e| format!("event poll error: {}", e))? {
            if let Event::Key(key) = event::read().map_err(|e| format!("event read error: {}", e))? {
                app.handle_key(key);
            }
        }

        if app.should_quit {
            break;
        }

        if last_tick.elapsed() >= app.interval {
            last_tick = Instant::now();
            app.tick();
        }
    }

    Ok(())
}
