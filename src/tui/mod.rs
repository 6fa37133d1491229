//! Ratatui-based terminal UI.
//!
//! A settings panel for tax, insurance, term and interest rate sits next to
//! the cost table. The live rate is fetched once at startup (and on `r`);
//! every other change recomputes the grid from the cached lookup.

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Cell, List, ListItem, Paragraph, Row, Table},
};
use tracing::{debug, info};

use crate::app::pipeline::{GridRun, fetch_live_rate, run_grid_with_live};
use crate::data::{EnvSecrets, LiveRate};
use crate::domain::GridConfig;
use crate::error::AppError;
use crate::io::DEFAULT_EXPORT_NAME;
use crate::report::fmt_currency;

/// Start the TUI.
pub fn run(config: GridConfig) -> Result<(), AppError> {
    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal =
        Terminal::new(backend).map_err(|e| AppError::runtime(format!("Failed to initialize terminal: {e}")))?;

    let mut app = App::new(config);
    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::runtime(format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::runtime(format!("Failed to enter alternate screen: {e}")));
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Tax,
    Insurance,
    Term,
    Rate,
}

impl Field {
    const ALL: [Field; 4] = [Field::Tax, Field::Insurance, Field::Term, Field::Rate];

    fn label(self) -> &'static str {
        match self {
            Field::Tax => "Property tax (%/yr)",
            Field::Insurance => "Insurance (%/yr)",
            Field::Term => "Loan term (years)",
            Field::Rate => "Interest rate (%)",
        }
    }

    /// Arrow-key increment, in percentage points.
    fn step(self) -> f64 {
        match self {
            Field::Tax => 0.1,
            Field::Insurance => 0.05,
            Field::Term => 0.0,
            Field::Rate => 0.01,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Focus {
    Settings,
    Grid,
}

struct App {
    config: GridConfig,
    secrets: EnvSecrets,
    live: LiveRate,
    run: Option<GridRun>,
    focus: Focus,
    selected_field: usize,
    cursor: (usize, usize),
    editing: bool,
    input: String,
    status: String,
}

impl App {
    fn new(config: GridConfig) -> Self {
        let secrets = EnvSecrets::load();
        let live = fetch_live_rate(&config, &secrets);
        let mut app = Self {
            config,
            secrets,
            live,
            run: None,
            focus: Focus::Settings,
            selected_field: 0,
            cursor: (0, 0),
            editing: false,
            input: String::new(),
            status: String::new(),
        };
        app.recompute();
        if let Some(run) = &app.run {
            app.status = run.rate.summary();
        }
        app
    }

    fn event_loop<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::runtime(format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::runtime(format!("Event poll error: {e}")))?
            {
                continue;
            }

            match event::read().map_err(|e| AppError::runtime(format!("Event read error: {e}")))? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key.code) {
                        break;
                    }
                    needs_redraw = true;
                }
                Event::Resize(_, _) => {
                    needs_redraw = true;
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Returns `true` to quit.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        if self.editing {
            self.handle_edit(code);
            return false;
        }

        match code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Tab => {
                self.focus = match self.focus {
                    Focus::Settings => Focus::Grid,
                    Focus::Grid => Focus::Settings,
                };
            }
            KeyCode::Up | KeyCode::Down | KeyCode::Left | KeyCode::Right => match self.focus {
                Focus::Settings => self.handle_settings_key(code),
                Focus::Grid => self.move_cursor(code),
            },
            KeyCode::Enter => {
                if self.focus == Focus::Settings && self.selected() != Field::Term {
                    self.editing = true;
                    self.input.clear();
                    self.status = format!("Editing {}. Enter to apply, Esc to cancel.", self.selected().label());
                }
            }
            KeyCode::Char('t') => {
                self.config.transpose = !self.config.transpose;
                self.cursor = (self.cursor.1, self.cursor.0);
                self.recompute();
                self.status = if self.config.transpose {
                    "Prices as rows.".to_string()
                } else {
                    "Down payments as rows.".to_string()
                };
            }
            KeyCode::Char('l') => {
                self.config.manual_rate_percent = None;
                self.recompute();
                self.status = "Using live/default rate.".to_string();
            }
            KeyCode::Char('r') => {
                self.refresh_live();
            }
            KeyCode::Char('e') => self.export(),
            _ => {}
        }

        false
    }

    fn selected(&self) -> Field {
        Field::ALL[self.selected_field]
    }

    fn handle_settings_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Up => self.selected_field = self.selected_field.saturating_sub(1),
            KeyCode::Down => {
                if self.selected_field + 1 < Field::ALL.len() {
                    self.selected_field += 1;
                }
            }
            KeyCode::Left => self.adjust_field(-1.0),
            KeyCode::Right => self.adjust_field(1.0),
            _ => {}
        }
    }

    fn move_cursor(&mut self, code: KeyCode) {
        let Some(run) = &self.run else {
            return;
        };
        let (rows, cols) = run.presented().dimensions();
        let (r, c) = &mut self.cursor;
        match code {
            KeyCode::Up => *r = r.saturating_sub(1),
            KeyCode::Down => *r = (*r + 1).min(rows.saturating_sub(1)),
            KeyCode::Left => *c = c.saturating_sub(1),
            KeyCode::Right => *c = (*c + 1).min(cols.saturating_sub(1)),
            _ => {}
        }
    }

    fn adjust_field(&mut self, direction: f64) {
        let field = self.selected();
        let delta = field.step() * direction;
        match field {
            Field::Tax => self.config.tax_percent = round_step(self.config.tax_percent + delta),
            Field::Insurance => self.config.insurance_percent = round_step(self.config.insurance_percent + delta),
            Field::Term => self.config.term = self.config.term.toggle(),
            Field::Rate => {
                let current = self.effective_rate();
                self.config.manual_rate_percent = Some(round_step(current + delta));
            }
        }
        self.recompute();
        self.status = format!("{}: {}", field.label(), self.field_value(field));
    }

    fn handle_edit(&mut self, code: KeyCode) {
        match code {
            KeyCode::Esc => {
                self.editing = false;
                self.status = "Edit canceled.".to_string();
            }
            KeyCode::Enter => {
                self.editing = false;
                self.apply_input();
            }
            KeyCode::Backspace => {
                self.input.pop();
            }
            KeyCode::Char(c) if c.is_ascii_digit() || c == '.' => self.input.push(c),
            _ => {}
        }
    }

    fn apply_input(&mut self) {
        let trimmed = self.input.trim();
        let value = match trimmed.parse::<f64>() {
            Ok(v) if v.is_finite() && v >= 0.0 => v,
            _ => {
                self.status = format!("Invalid value '{trimmed}'.");
                return;
            }
        };
        match self.selected() {
            Field::Tax => self.config.tax_percent = value,
            Field::Insurance => self.config.insurance_percent = value,
            Field::Rate => self.config.manual_rate_percent = Some(value),
            Field::Term => {}
        }
        self.recompute();
        self.status = format!("{}: {}", self.selected().label(), self.field_value(self.selected()));
    }

    fn refresh_live(&mut self) {
        if self.config.offline {
            self.status = "Offline mode; live rate disabled.".to_string();
            return;
        }
        self.live = fetch_live_rate(&self.config, &self.secrets);
        self.recompute();
        if let Some(run) = &self.run {
            self.status = run.rate.banner();
        }
    }

    fn recompute(&mut self) {
        match run_grid_with_live(&self.config, self.live.clone()) {
            Ok(run) => {
                let (rows, cols) = run.presented().dimensions();
                self.cursor.0 = self.cursor.0.min(rows.saturating_sub(1));
                self.cursor.1 = self.cursor.1.min(cols.saturating_sub(1));
                self.run = Some(run);
            }
            Err(err) => {
                debug!(error = %err, "recompute rejected");
                self.status = err.to_string();
            }
        }
    }

    fn export(&mut self) {
        let Some(run) = &self.run else {
            self.status = "Nothing to export.".to_string();
            return;
        };
        let path = self
            .config
            .export
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_EXPORT_NAME));
        self.status = match crate::io::write_grid_csv(&path, &run.presented()) {
            Ok(()) => {
                info!(path = %path.display(), "tui export");
                format!("Wrote {}", path.display())
            }
            Err(err) => format!("Export failed: {err}"),
        };
    }

    fn effective_rate(&self) -> f64 {
        self.run
            .as_ref()
            .map(|r| r.rate.percent)
            .or(self.config.manual_rate_percent)
            .unwrap_or(crate::domain::DEFAULT_RATE_PERCENT)
    }

    fn field_value(&self, field: Field) -> String {
        match field {
            Field::Tax => format!("{:.2}", self.config.tax_percent),
            Field::Insurance => format!("{:.2}", self.config.insurance_percent),
            Field::Term => self.config.term.years().to_string(),
            Field::Rate => {
                let source = self
                    .run
                    .as_ref()
                    .map(|r| r.rate.source.display_name())
                    .unwrap_or("-");
                format!("{:.2} ({source})", self.effective_rate())
            }
        }
    }

    fn draw(&self, frame: &mut ratatui::Frame<'_>) {
        let size = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(4), Constraint::Min(0), Constraint::Length(3)])
            .split(size);

        self.draw_header(frame, chunks[0]);
        self.draw_body(frame, chunks[1]);
        self.draw_footer(frame, chunks[2]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let mut lines: Vec<Line> = Vec::new();
        lines.push(Line::from(vec![
            Span::styled("hgrid", Style::default().fg(Color::Cyan)),
            Span::raw(" - expected monthly housing costs"),
        ]));

        if let Some(run) = &self.run {
            let banner_style = if run.rate.is_warning() {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default().fg(Color::Gray)
            };
            lines.push(Line::from(Span::styled(run.rate.banner(), banner_style)));
        }

        let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_body(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(34), Constraint::Min(0)])
            .split(area);

        let left = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(6), Constraint::Min(0)])
            .split(chunks[0]);

        self.draw_settings(frame, left[0]);
        self.draw_detail(frame, left[1]);
        self.draw_grid(frame, chunks[1]);
    }

    fn draw_settings(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let items: Vec<ListItem> = Field::ALL
            .iter()
            .map(|&f| {
                let value = if self.editing && f == self.selected() {
                    format!("{}_", self.input)
                } else {
                    self.field_value(f)
                };
                ListItem::new(format!("{}: {value}", f.label()))
            })
            .collect();

        let title = if self.focus == Focus::Settings { "Settings *" } else { "Settings" };
        let list = List::new(items)
            .block(Block::default().title(title).borders(Borders::ALL))
            .highlight_style(Style::default().fg(Color::Black).bg(Color::White))
            .highlight_symbol("» ");

        let mut state = ratatui::widgets::ListState::default();
        state.select(Some(self.selected_field));
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn draw_detail(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::default().title("Selected cell").borders(Borders::ALL);
        let Some(run) = &self.run else {
            frame.render_widget(Paragraph::new("-").block(block), area);
            return;
        };
        let (row, col) = self.cursor;
        let (Some((price, down)), Some(b)) = (run.cell_inputs(row, col), run.cell_breakdown(row, col)) else {
            frame.render_widget(Paragraph::new("-").block(block), area);
            return;
        };

        let lines = vec![
            Line::from(format!("Price:     {}", fmt_currency(price))),
            Line::from(format!("Down:      {}", fmt_currency(down))),
            Line::from(format!("Loan:      {}", fmt_currency(b.principal.round() as u64))),
            Line::from(format!("Mortgage:  ${:.2}", b.mortgage)),
            Line::from(format!("Tax:       ${:.2}", b.tax)),
            Line::from(format!("Insurance: ${:.2}", b.insurance)),
            Line::from(Span::styled(
                format!("Total:     {}", fmt_currency(b.rounded_total())),
                Style::default().add_modifier(Modifier::BOLD),
            )),
        ];
        frame.render_widget(Paragraph::new(Text::from(lines)).block(block), area);
    }

    fn draw_grid(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let title = if self.focus == Focus::Grid {
            "Expected Monthly Housing Costs *"
        } else {
            "Expected Monthly Housing Costs"
        };
        let block = Block::default().title(title).borders(Borders::ALL);

        let Some(run) = &self.run else {
            let msg = Paragraph::new("Waiting for data...")
                .style(Style::default().fg(Color::Yellow))
                .block(block);
            frame.render_widget(msg, area);
            return;
        };
        let grid = run.presented();

        let header_style = Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD);
        let header = Row::new(
            std::iter::once(Cell::from(""))
                .chain(grid.column_labels.iter().map(|l| Cell::from(l.clone())))
                .collect::<Vec<_>>(),
        )
        .style(header_style);

        let rows = grid.row_labels.iter().zip(&grid.rows).enumerate().map(|(r, (label, values))| {
            let cells = std::iter::once(Cell::from(label.clone()).style(header_style)).chain(
                values.iter().enumerate().map(|(c, &v)| {
                    let cell = Cell::from(fmt_currency(v));
                    if self.focus == Focus::Grid && (r, c) == self.cursor {
                        cell.style(Style::default().fg(Color::Black).bg(Color::White))
                    } else {
                        cell
                    }
                }),
            );
            Row::new(cells.collect::<Vec<_>>())
        });

        let label_width = grid.row_labels.iter().map(|l| l.len()).max().unwrap_or(0) as u16 + 1;
        let widths = std::iter::once(Constraint::Length(label_width))
            .chain(grid.column_labels.iter().map(|_| Constraint::Length(9)))
            .collect::<Vec<_>>();

        let table = Table::new(rows, widths).header(header).block(block);
        frame.render_widget(table, area);
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "Tab focus  ↑/↓/←/→ move/adjust  Enter edit  t transpose  l live rate  r refetch  e export  q quit";
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

/// Snap to two decimals and clamp at zero so repeated steps do not drift.
fn round_step(v: f64) -> f64 {
    ((v * 100.0).round() / 100.0).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::RateSource;
    use crate::domain::LoanTerm;

    fn offline_app(config: GridConfig) -> App {
        App::new(GridConfig { offline: true, ..config })
    }

    fn press(app: &mut App, keys: &[KeyCode]) {
        for &key in keys {
            assert!(!app.handle_key(key), "{key:?} should not quit");
        }
    }

    fn typed(text: &str) -> Vec<KeyCode> {
        text.chars().map(KeyCode::Char).collect()
    }

    #[test]
    fn starts_on_the_default_rate_when_offline() {
        let app = offline_app(GridConfig::default());
        let run = app.run.as_ref().unwrap();
        assert_eq!(run.rate.source, RateSource::Default);
        assert_eq!(run.grid.get(0, 0), Some(3200));
        assert_eq!(app.status, run.rate.summary());
    }

    #[test]
    fn rate_arrows_become_a_manual_override_and_l_reverts() {
        let mut app = offline_app(GridConfig::default());
        press(&mut app, &[KeyCode::Down, KeyCode::Down, KeyCode::Down]);
        assert_eq!(app.selected(), Field::Rate);

        press(&mut app, &[KeyCode::Right]);
        let manual = app.config.manual_rate_percent.unwrap();
        assert!((manual - 6.61).abs() < 1e-9);
        let run = app.run.as_ref().unwrap();
        assert_eq!(run.rate.source, RateSource::Manual);
        assert!((run.scenario.interest_rate - 0.0661).abs() < 1e-12);
        assert!(run.grid.get(0, 0).unwrap() > 3200);

        press(&mut app, &[KeyCode::Left, KeyCode::Left]);
        assert!((app.config.manual_rate_percent.unwrap() - 6.59).abs() < 1e-9);

        press(&mut app, &[KeyCode::Char('l')]);
        assert_eq!(app.config.manual_rate_percent, None);
        let run = app.run.as_ref().unwrap();
        assert_eq!(run.rate.source, RateSource::Default);
        assert_eq!(run.grid.get(0, 0), Some(3200));
    }

    #[test]
    fn typed_values_apply_on_enter() {
        let mut app = offline_app(GridConfig::default());
        assert_eq!(app.selected(), Field::Tax);

        press(&mut app, &[KeyCode::Enter]);
        assert!(app.editing);
        press(&mut app, &typed("2x.5"));
        assert_eq!(app.input, "2.5");
        press(&mut app, &[KeyCode::Enter]);

        assert!(!app.editing);
        assert_eq!(app.config.tax_percent, 2.5);
        let run = app.run.as_ref().unwrap();
        assert!((run.scenario.property_tax_rate - 0.025).abs() < 1e-12);
        assert_eq!(app.status, "Property tax (%/yr): 2.50");
    }

    #[test]
    fn bad_input_is_rejected_and_esc_cancels() {
        let mut app = offline_app(GridConfig::default());
        let before = app.run.as_ref().unwrap().grid.clone();

        press(&mut app, &[KeyCode::Enter, KeyCode::Enter]);
        assert_eq!(app.status, "Invalid value ''.");
        press(&mut app, &[KeyCode::Enter]);
        press(&mut app, &typed("1.2.3"));
        press(&mut app, &[KeyCode::Enter]);
        assert_eq!(app.status, "Invalid value '1.2.3'.");
        assert_eq!(app.config.tax_percent, 1.2);
        assert_eq!(app.run.as_ref().unwrap().grid, before);

        // Esc leaves edit mode instead of quitting.
        press(&mut app, &[KeyCode::Enter, KeyCode::Char('9'), KeyCode::Esc]);
        assert!(!app.editing);
        assert_eq!(app.config.tax_percent, 1.2);
        assert!(app.handle_key(KeyCode::Char('q')));
    }

    #[test]
    fn term_toggles_with_arrows_and_is_not_editable() {
        let mut app = offline_app(GridConfig::default());
        press(&mut app, &[KeyCode::Down, KeyCode::Down]);
        assert_eq!(app.selected(), Field::Term);

        press(&mut app, &[KeyCode::Enter]);
        assert!(!app.editing);

        let thirty = app.run.as_ref().unwrap().grid.get(0, 0).unwrap();
        press(&mut app, &[KeyCode::Right]);
        assert_eq!(app.config.term, LoanTerm::Fifteen);
        assert!(app.run.as_ref().unwrap().grid.get(0, 0).unwrap() > thirty);
    }

    #[test]
    fn transpose_swaps_the_cursor() {
        let mut app = offline_app(GridConfig::default());
        press(&mut app, &[KeyCode::Tab, KeyCode::Right, KeyCode::Right, KeyCode::Down]);
        assert_eq!(app.focus, Focus::Grid);
        assert_eq!(app.cursor, (1, 2));

        press(&mut app, &[KeyCode::Char('t')]);
        assert!(app.config.transpose);
        assert_eq!(app.cursor, (2, 1));
        let run = app.run.as_ref().unwrap();
        assert_eq!(run.presented().dimensions(), (11, 6));
        assert_eq!(run.cell_inputs(2, 1), Some((700_000, 150_000)));
        assert_eq!(app.status, "Prices as rows.");

        // Cursor stays inside the table.
        press(&mut app, &[KeyCode::Down; 20]);
        assert_eq!(app.cursor, (10, 1));
    }

    #[test]
    fn export_writes_the_presented_grid() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tui.csv");
        let mut app = offline_app(GridConfig {
            export: Some(path.clone()),
            transpose: true,
            ..GridConfig::default()
        });

        press(&mut app, &[KeyCode::Char('e')]);
        assert_eq!(app.status, format!("Wrote {}", path.display()));
        let expected = crate::io::grid_csv_bytes(&app.run.as_ref().unwrap().presented()).unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), expected);

        app.config.export = Some(dir.path().join("missing/tui.csv"));
        press(&mut app, &[KeyCode::Char('e')]);
        assert!(app.status.starts_with("Export failed"));
    }

    #[test]
    fn refetch_is_disabled_offline() {
        let mut app = offline_app(GridConfig::default());
        press(&mut app, &[KeyCode::Char('r')]);
        assert_eq!(app.status, "Offline mode; live rate disabled.");
        assert!(matches!(app.live, LiveRate::Skipped));
    }

    #[test]
    fn round_step_clamps_and_snaps() {
        assert_eq!(round_step(1.2000000000000002), 1.2);
        assert_eq!(round_step(-0.05), 0.0);
        assert_eq!(round_step(0.35 + 0.05), 0.4);
    }
}
