//! Interactive chart view: a city input line, metric/granularity selectors,
//! the line chart, a detail panel for the hovered point, and an error banner.
//!
//! Fetches run on spawned tasks and report back over a channel tagged with
//! the controller's sequence token, so a slow response never overwrites a
//! newer one. The granularity key stays live while a fetch is in flight;
//! submitting is ignored until the current fetch resolves.

use std::{
    io::{self, Stdout},
    time::Duration,
};

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Paragraph, Wrap},
};
use tokio::sync::mpsc;

use citycast_core::{
    CitySeries, Error, FetchRequest, Metric, OpenWeatherClient, ViewState, run_fetch,
};

struct FetchOutcome {
    seq: u64,
    result: citycast_core::Result<CitySeries>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InputMode {
    Normal,
    Editing,
}

pub async fn run(mut state: ViewState, provider: Option<OpenWeatherClient>) -> Result<()> {
    let mut terminal = setup_terminal()?;
    let (tx, mut rx) = mpsc::channel::<FetchOutcome>(16);

    let mut mode = if state.city_input.trim().is_empty() {
        InputMode::Editing
    } else {
        InputMode::Normal
    };
    let mut hover: usize = 0;

    tracing::debug!(configured = provider.is_some(), "chart view opened");

    // city passed on the command line: fetch right away
    if let Some(request) = state.submit_city() {
        spawn_fetch(&tx, provider.clone(), request);
    }

    let result = event_loop(
        &mut terminal,
        &mut state,
        &provider,
        &tx,
        &mut rx,
        &mut mode,
        &mut hover,
    )
    .await;

    restore_terminal(&mut terminal)?;
    result
}

#[allow(clippy::too_many_arguments)]
async fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    state: &mut ViewState,
    provider: &Option<OpenWeatherClient>,
    tx: &mpsc::Sender<FetchOutcome>,
    rx: &mut mpsc::Receiver<FetchOutcome>,
    mode: &mut InputMode,
    hover: &mut usize,
) -> Result<()> {
    loop {
        // drain finished fetches; stale tokens are dropped by the controller
        while let Ok(outcome) = rx.try_recv() {
            state.apply_outcome(outcome.seq, outcome.result);
        }
        if let Some(series) = &state.series {
            *hover = (*hover).min(series.points.len().saturating_sub(1));
        }

        terminal.draw(|f| draw(f, state, *mode, *hover))?;

        if !event::poll(Duration::from_millis(33))? {
            continue;
        }
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        match *mode {
            InputMode::Editing => match key.code {
                KeyCode::Esc => *mode = InputMode::Normal,
                KeyCode::Enter => {
                    // submit is disabled while a fetch is in flight
                    if !state.loading {
                        if let Some(request) = state.submit_city() {
                            spawn_fetch(tx, provider.clone(), request);
                        }
                        *mode = InputMode::Normal;
                    }
                }
                KeyCode::Backspace => {
                    state.city_input.pop();
                }
                KeyCode::Char(c) => state.city_input.push(c),
                _ => {}
            },
            InputMode::Normal => match key.code {
                KeyCode::Char('q') | KeyCode::Char('Q') => return Ok(()),
                KeyCode::Char('e') | KeyCode::Char('/') => *mode = InputMode::Editing,
                KeyCode::Char('m') | KeyCode::Char('M') => {
                    state.change_metric(state.metric.next());
                }
                KeyCode::Char('g') | KeyCode::Char('G') => {
                    // stays interactive during loading; the sequence token
                    // makes the newer request win
                    if let Some(request) = state.change_granularity(state.granularity.toggle()) {
                        spawn_fetch(tx, provider.clone(), request);
                    }
                }
                KeyCode::Left => *hover = hover.saturating_sub(1),
                KeyCode::Right => {
                    let last = state
                        .series
                        .as_ref()
                        .map(|s| s.points.len().saturating_sub(1))
                        .unwrap_or(0);
                    *hover = (*hover + 1).min(last);
                }
                _ => {}
            },
        }
    }
}

fn spawn_fetch(
    tx: &mpsc::Sender<FetchOutcome>,
    provider: Option<OpenWeatherClient>,
    request: FetchRequest,
) {
    let tx = tx.clone();
    tokio::spawn(async move {
        let result = match &provider {
            Some(client) => run_fetch(client, &request).await,
            None => Err(Error::MissingApiKey),
        };
        tx.send(FetchOutcome {
            seq: request.seq,
            result,
        })
        .await
        .ok();
    });
}

fn draw(f: &mut ratatui::Frame, state: &ViewState, mode: InputMode, hover: usize) {
    let mut constraints = vec![
        Constraint::Length(3), // city input
        Constraint::Length(1), // status line
    ];
    if state.error.is_some() {
        constraints.push(Constraint::Length(3));
    }
    constraints.push(Constraint::Min(8)); // chart
    constraints.push(Constraint::Length(7)); // detail panel

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(f.size());

    let mut i = 0;
    render_input(f, chunks[i], state, mode);
    i += 1;
    render_status(f, chunks[i], state, mode);
    i += 1;
    if state.error.is_some() {
        render_error(f, chunks[i], state);
        i += 1;
    }
    render_chart(f, chunks[i], state, hover);
    i += 1;
    render_detail(f, chunks[i], state, hover);
}

fn render_input(f: &mut ratatui::Frame, area: Rect, state: &ViewState, mode: InputMode) {
    let editing = mode == InputMode::Editing;
    let style = if editing {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };
    let title = if editing {
        "City (Enter submits, Esc cancels)"
    } else {
        "City (press e to edit)"
    };

    let input = Paragraph::new(state.city_input.as_str())
        .style(style)
        .block(Block::default().borders(Borders::ALL).title(title));
    f.render_widget(input, area);

    if editing {
        f.set_cursor(area.x + 1 + state.city_input.len() as u16, area.y + 1);
    }
}

fn render_status(f: &mut ratatui::Frame, area: Rect, state: &ViewState, mode: InputMode) {
    let mut spans = vec![
        Span::styled("m", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(format!(" metric: {}   ", state.metric)),
        Span::styled("g", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(format!(" granularity: {}   ", state.granularity)),
        Span::styled("←/→", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(" point   "),
        Span::styled("q", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(" quit"),
    ];
    if state.loading {
        spans.push(Span::styled(
            "   fetching…",
            Style::default().fg(Color::Cyan),
        ));
    }
    if mode == InputMode::Editing && state.loading {
        spans.push(Span::styled(
            " (submit disabled)",
            Style::default().fg(Color::DarkGray),
        ));
    }
    if let Some(series) = &state.series {
        let fetched = series.fetched_at.with_timezone(&chrono::Local);
        spans.push(Span::styled(
            format!("   fetched {}", fetched.format("%H:%M:%S")),
            Style::default().fg(Color::DarkGray),
        ));
    }

    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_error(f: &mut ratatui::Frame, area: Rect, state: &ViewState) {
    let message = state.error.as_deref().unwrap_or_default();
    let banner = Paragraph::new(message)
        .style(Style::default().fg(Color::Red).add_modifier(Modifier::BOLD))
        .block(Block::default().borders(Borders::ALL).title("Error"))
        .wrap(Wrap { trim: true });
    f.render_widget(banner, area);
}

fn render_chart(f: &mut ratatui::Frame, area: Rect, state: &ViewState, hover: usize) {
    let Some(series) = &state.series else {
        let placeholder = Paragraph::new("Enter a city name and press Enter to load a forecast.")
            .style(Style::default().fg(Color::DarkGray))
            .block(Block::default().borders(Borders::ALL).title("Forecast"));
        f.render_widget(placeholder, area);
        return;
    };
    if series.points.is_empty() {
        let placeholder = Paragraph::new("The forecast window contained no data points.")
            .style(Style::default().fg(Color::Yellow))
            .block(Block::default().borders(Borders::ALL).title("Forecast"));
        f.render_widget(placeholder, area);
        return;
    }

    let metric = state.metric;
    let data: Vec<(f64, f64)> = series
        .points
        .iter()
        .enumerate()
        .map(|(i, p)| (i as f64, metric.value_of(p)))
        .collect();

    let (mut y_min, mut y_max) = data
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), (_, y)| {
            (lo.min(*y), hi.max(*y))
        });
    if (y_max - y_min).abs() < f64::EPSILON {
        // flat series still needs a visible band
        y_min -= 1.0;
        y_max += 1.0;
    }
    let pad = (y_max - y_min) * 0.1;
    let bounds_y = [y_min - pad, y_max + pad];
    let x_max = (series.points.len() - 1).max(1) as f64;

    let hovered = data.get(hover).copied().unwrap_or(data[0]);
    let hover_point = [hovered];

    let datasets = vec![
        Dataset::default()
            .name(metric.label())
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(Color::Cyan))
            .data(&data),
        Dataset::default()
            .marker(symbols::Marker::Dot)
            .graph_type(GraphType::Scatter)
            .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
            .data(&hover_point),
    ];

    let first = series.points.first().map(|p| p.timestamp.clone()).unwrap_or_default();
    let mid = series
        .points
        .get(series.points.len() / 2)
        .map(|p| p.timestamp.clone())
        .unwrap_or_default();
    let last = series.points.last().map(|p| p.timestamp.clone()).unwrap_or_default();

    let chart = Chart::new(datasets)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("{} — {}", series.city_name, metric.label())),
        )
        .x_axis(
            Axis::default()
                .style(Style::default().fg(Color::Gray))
                .bounds([0.0, x_max])
                .labels(vec![Span::raw(first), Span::raw(mid), Span::raw(last)]),
        )
        .y_axis(
            Axis::default()
                .style(Style::default().fg(Color::Gray))
                .bounds(bounds_y)
                .labels(vec![
                    Span::raw(format!("{:.1}", bounds_y[0])),
                    Span::raw(format!("{:.1}", (bounds_y[0] + bounds_y[1]) / 2.0)),
                    Span::raw(format!("{:.1}", bounds_y[1])),
                ]),
        );

    f.render_widget(chart, area);
}

/// The tooltip equivalent: every metric plus the timestamp for the hovered
/// point, regardless of which metric the chart currently plots.
fn render_detail(f: &mut ratatui::Frame, area: Rect, state: &ViewState, hover: usize) {
    let block = Block::default().borders(Borders::ALL).title("Point");

    let Some(point) = state
        .series
        .as_ref()
        .and_then(|s| s.points.get(hover))
    else {
        f.render_widget(Paragraph::new("No point selected.").block(block), area);
        return;
    };

    let highlight = |m: Metric| {
        if state.metric == m {
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        }
    };

    let lines = vec![
        Line::from(Span::styled(
            point.timestamp.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            format!("Temperature: {:.1} °C", point.temperature),
            highlight(Metric::Temperature),
        )),
        Line::from(Span::styled(
            format!("Pressure:    {:.1} hPa", point.pressure),
            highlight(Metric::Pressure),
        )),
        Line::from(Span::styled(
            format!("Humidity:    {:.0} %", point.humidity),
            highlight(Metric::Humidity),
        )),
        Line::from(Span::styled(
            format!("Wind speed:  {:.1} m/s", point.wind_speed),
            highlight(Metric::WindSpeed),
        )),
    ];

    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    terminal::enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let terminal = Terminal::new(CrosstermBackend::new(stdout))?;
    Ok(terminal)
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    terminal::disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}
