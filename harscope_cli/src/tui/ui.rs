//! TUI rendering functions

use super::app::{DetailTab, Focus, TuiApp};
use harscope_core::har::Cookie;
use harscope_core::stats::{format_bytes, format_duration};
use harscope_core::timeline::{Bar, TimeAxis};
use harscope_core::window::Window;
use harscope_core::{Entry, EntryId, FilterType, ResourceType, SortKey, TimelineGeometry};
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
    Frame,
};
use std::borrow::Cow;

/// Rows inside the overview box: a tick row plus one per slot
const OVERVIEW_ROWS: u16 = 4;

const SELECTED_BG: Color = Color::Rgb(40, 40, 60);

/// Draw the TUI
pub fn draw(frame: &mut Frame, app: &mut TuiApp) {
    let filter_height = if app.prefs.show_filters { 2 } else { 1 };
    let overview_height = if app.prefs.show_overview { OVERVIEW_ROWS + 2 } else { 0 };
    let detail_height = if app.store.detail_open() && app.store.selected_entry().is_some() {
        app.prefs.detail_pane_height
    } else {
        0
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(filter_height),   // Filter text + category chips
            Constraint::Length(overview_height), // Timeline overview
            Constraint::Min(4),                  // Request table
            Constraint::Length(detail_height),   // Detail pane
            Constraint::Length(1),               // Status line
            Constraint::Length(1),               // Footer
        ])
        .split(frame.area());

    app.regions = Default::default();
    draw_filter_bar(frame, app, chunks[0]);
    if app.prefs.show_overview {
        draw_overview(frame, app, chunks[1]);
    } else {
        // Waterfall cells share the overview's axis
        app.timeline
            .sync(&app.store, TimelineGeometry::cells(chunks[2].width, OVERVIEW_ROWS));
    }
    draw_table(frame, app, chunks[2]);
    if detail_height > 0 {
        draw_detail(frame, app, chunks[3]);
    }
    draw_status_line(frame, app, chunks[4]);
    draw_footer(frame, app, chunks[5]);
}

// ============================================================================
// Filter bar
// ============================================================================

fn draw_filter_bar(frame: &mut Frame, app: &mut TuiApp, area: Rect) {
    let focused = app.focus == Focus::Filter;
    let filter = app.store.filter();
    let sort = app.store.sort();

    let mut spans = vec![
        Span::styled(" Filter ", Style::default().fg(Color::DarkGray)),
        Span::styled(
            if app.filter_input.is_empty() && !focused {
                "(press / to filter)".to_string()
            } else {
                app.filter_input.clone()
            },
            if focused {
                Style::default().fg(Color::White).add_modifier(Modifier::UNDERLINED)
            } else if app.filter_input.is_empty() {
                Style::default().fg(Color::DarkGray)
            } else {
                Style::default().fg(Color::White)
            },
        ),
    ];
    if focused {
        spans.push(Span::styled("█", Style::default().fg(Color::Cyan)));
    }
    spans.extend([
        Span::styled("  │ ", Style::default().fg(Color::DarkGray)),
        Span::styled(
            if filter.invert { "Invert ✓" } else { "Invert" },
            if filter.invert {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default().fg(Color::DarkGray)
            },
        ),
        Span::styled(" │ ", Style::default().fg(Color::DarkGray)),
        Span::styled("Sort ", Style::default().fg(Color::DarkGray)),
        Span::styled(
            format!("{} {}", sort.key, sort.direction.arrow()),
            Style::default().fg(Color::White),
        ),
    ]);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Length(1)])
        .split(area);
    frame.render_widget(Paragraph::new(Line::from(spans)), rows[0]);

    if app.prefs.show_filters {
        let mut chips = Vec::with_capacity(FilterType::ALL.len());
        let mut spans = vec![Span::raw(" ")];
        let mut x = rows[1].x + 1;
        for filter_type in FilterType::ALL {
            let label = format!(" {} ", filter_type.label());
            let width = label.chars().count() as u16;
            if x + width > rows[1].right() {
                break;
            }
            let style = if filter.types.contains(filter_type) {
                Style::default().fg(Color::Black).bg(Color::Cyan)
            } else {
                Style::default().fg(Color::Gray)
            };
            chips.push((filter_type, Rect::new(x, rows[1].y, width, 1)));
            spans.push(Span::styled(label, style));
            spans.push(Span::raw(" "));
            x += width + 1;
        }
        frame.render_widget(Paragraph::new(Line::from(spans)), rows[1]);
        app.regions.chips = chips;
    }
}

// ============================================================================
// Overview timeline
// ============================================================================

fn draw_overview(frame: &mut Frame, app: &mut TuiApp, area: Rect) {
    let block = Block::default()
        .title(" Overview ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));
    let inner = block.inner(area);
    app.timeline
        .sync(&app.store, TimelineGeometry::cells(inner.width, inner.height));

    let span = format!(" {} ", format_duration(app.timeline.axis().span_ms));
    let block = block.title(Line::from(span).alignment(Alignment::Right));
    frame.render_widget(block, area);

    let widget = TimelineWidget {
        bars: app.timeline.bars(),
        axis: app.timeline.axis(),
        selected: app.store.selected(),
    };
    frame.render_widget(widget, inner);
    app.regions.timeline = inner;
}

/// Paints projected bars onto terminal cells, one slot per line
struct TimelineWidget<'a> {
    bars: &'a [Bar],
    axis: &'a TimeAxis,
    selected: Option<EntryId>,
}

impl Widget for TimelineWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }

        // Tick labels along the top row
        let tick_count = (area.width / 14).max(2) as usize;
        for offset in self.axis.ticks(tick_count) {
            let label = format_duration(offset);
            let x = (offset / self.axis.span_ms * area.width as f64) as u16;
            let x = x.min(area.width.saturating_sub(label.chars().count() as u16));
            buf.set_string(area.x + x, area.y, &label, Style::default().fg(Color::DarkGray));
        }

        // Later bars overwrite earlier ones, matching hit testing
        for bar in self.bars {
            let row = bar.y.floor() as u16;
            if row >= area.height {
                continue;
            }
            let start = bar.x.floor().max(0.0) as u16;
            let end = ((bar.x + bar.width).ceil() as u16).min(area.width);
            let style = if Some(bar.entry) == self.selected {
                Style::default().fg(Color::White).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(type_color(bar.resource_type))
            };
            for col in start..end.max(start + 1).min(area.width) {
                if let Some(cell) = buf.cell_mut((area.x + col, area.y + row)) {
                    cell.set_symbol("▬").set_style(style);
                }
            }
        }
    }
}

// ============================================================================
// Request table
// ============================================================================

/// Column positions for a table `width` cells wide. Every column sorts by
/// the key it is tagged with.
fn columns(width: u16) -> Vec<(SortKey, u16, u16)> {
    let waterfall = if width >= 110 {
        24
    } else if width >= 80 {
        12
    } else {
        0
    };
    let fixed = [
        (SortKey::Status, 6),
        (SortKey::Method, 7),
        (SortKey::Type, 16),
        (SortKey::Size, 9),
        (SortKey::Duration, 9),
        (SortKey::StartTime, waterfall),
    ];
    let used: u16 = fixed.iter().map(|(_, w)| w + 1).sum();
    let name = width.saturating_sub(used).max(10);

    let mut x = 0;
    let mut out = vec![(SortKey::Name, x, name)];
    x += name + 1;
    for (key, w) in fixed {
        if w > 0 && x + w <= width {
            out.push((key, x, w));
            x += w + 1;
        }
    }
    out
}

fn draw_table(frame: &mut Frame, app: &mut TuiApp, area: Rect) {
    let stats_title = format!(
        " Requests ({} / {}) ",
        app.store.view_len(),
        app.store.trace().len()
    );
    let block = Block::default()
        .title(stats_title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));
    let inner = block.inner(area);
    frame.render_widget(block, area);
    if inner.height < 2 {
        return;
    }

    let header_area = Rect::new(inner.x, inner.y, inner.width, 1);
    let body = Rect::new(inner.x, inner.y + 1, inner.width, inner.height - 1);
    let cols = columns(inner.width);

    // Header
    let sort = app.store.sort();
    let mut header = Vec::new();
    for (key, x, w) in &cols {
        let label = if *key == sort.key {
            format!("{} {}", key.label(), sort.direction.arrow())
        } else {
            key.label().to_string()
        };
        header.push(Span::styled(
            fit(&label, *w as usize),
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::BOLD),
        ));
        header.push(Span::raw(" "));
        app.regions
            .table_header
            .push((*key, Rect::new(inner.x + x, inner.y, *w, 1)));
    }
    frame.render_widget(Paragraph::new(Line::from(header)), header_area);
    app.regions.table_body = body;

    // Body
    app.virtualizer.set_viewport_height(body.height as u32);
    let len = app.store.view_len();
    let window = match app.virtualizer.window(len) {
        Window::Empty => None,
        Window::Rows(rows) => Some(rows.clone()),
    };
    let Some(window) = window else {
        let message = if app.store.trace().is_empty() {
            "No requests yet. Press Ctrl+O to import a HAR file, or drop one here."
        } else {
            "No requests match the current filter."
        };
        let placeholder = Paragraph::new(message)
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center);
        let y = body.y + body.height / 2;
        frame.render_widget(placeholder, Rect::new(body.x, y, body.width, 1));
        return;
    };

    let axis = *app.timeline.axis();
    let selected = app.store.selected();
    let mut lines = vec![Line::default(); body.height as usize];
    for row in window.rows() {
        let Some(entry) = app.store.view_entry(row.index) else {
            continue;
        };
        let highlight = Some(entry.id()) == selected;
        for (i, line) in row_lines(entry, &cols, &axis, row.size).into_iter().enumerate() {
            let y = row.translate + i as i64;
            if y < 0 || y >= body.height as i64 {
                continue;
            }
            lines[y as usize] = if highlight {
                line.style(Style::default().bg(SELECTED_BG))
            } else {
                line
            };
        }
    }
    frame.render_widget(Paragraph::new(lines), body);
}

/// The terminal lines making up one table row
fn row_lines(entry: &Entry, cols: &[(SortKey, u16, u16)], axis: &TimeAxis, size: u32) -> Vec<Line<'static>> {
    let mut spans = Vec::new();
    for (key, _, w) in cols {
        let w = *w as usize;
        let span = match key {
            SortKey::Name => Span::styled(fit(entry.display_name(), w), Style::default().fg(Color::White)),
            SortKey::Status => Span::styled(fit(&entry.status().to_string(), w), status_style(entry.status())),
            SortKey::Method => Span::styled(fit(entry.method(), w), method_style(entry.method())),
            SortKey::Type => Span::styled(
                fit(entry.resource_type().as_str(), w),
                Style::default().fg(type_color(entry.resource_type())),
            ),
            SortKey::Size => Span::raw(fit(&format_bytes(entry.body_size().max(0) as u64), w)),
            SortKey::Duration => Span::raw(fit(&format_duration(entry.duration_ms()), w)),
            SortKey::StartTime => Span::styled(
                waterfall(entry, axis, w),
                Style::default().fg(type_color(entry.resource_type())),
            ),
        };
        spans.push(span);
        spans.push(Span::raw(" "));
    }

    let mut lines = vec![Line::from(spans)];
    if size > 1 {
        lines.push(Line::from(Span::styled(
            format!("  {}", entry.url()),
            Style::default().fg(Color::DarkGray),
        )));
    }
    lines
}

/// Per-row bar on the shared time axis
fn waterfall(entry: &Entry, axis: &TimeAxis, width: usize) -> String {
    let w = width as f64;
    let start = axis.to_x(entry.started_ms() as f64, w).clamp(0.0, w - 1.0) as usize;
    let len = ((entry.duration_ms() / axis.span_ms * w).round() as usize).max(1);
    let end = (start + len).min(width);
    let mut out = " ".repeat(start);
    out.push_str(&"█".repeat(end - start));
    out.push_str(&" ".repeat(width - end));
    out
}

// ============================================================================
// Detail pane
// ============================================================================

fn draw_detail(frame: &mut Frame, app: &mut TuiApp, area: Rect) {
    let Some(entry) = app.store.selected_entry().cloned() else {
        return;
    };

    let block = Block::default()
        .title(format!(" {} ", entry.display_name()))
        .title(Line::from(" d: hide  Tab: next tab ").alignment(Alignment::Right))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));
    let inner = block.inner(area);
    frame.render_widget(block, area);
    app.regions.detail = inner;
    if inner.height < 2 {
        return;
    }

    // Tabs
    let mut spans = Vec::new();
    let mut x = inner.x;
    for tab in DetailTab::ALL {
        let label = format!(" {} ", tab.label());
        let width = label.chars().count() as u16;
        let style = if tab == app.detail_tab {
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        app.regions.detail_tabs.push((tab, Rect::new(x, inner.y, width, 1)));
        spans.push(Span::styled(label, style));
        spans.push(Span::styled("│", Style::default().fg(Color::DarkGray)));
        x += width + 1;
    }
    frame.render_widget(
        Paragraph::new(Line::from(spans)),
        Rect::new(inner.x, inner.y, inner.width, 1),
    );

    let content = match app.detail_tab {
        DetailTab::Headers => headers_tab(&entry),
        DetailTab::Payload => payload_tab(&entry),
        DetailTab::Response => response_tab(&entry),
        DetailTab::Cookies => cookies_tab(&entry, inner.width),
        DetailTab::Timing => timing_tab(&entry, inner.width),
        DetailTab::Curl => entry
            .record()
            .request
            .to_curl()
            .lines()
            .map(|l| Line::from(l.to_string()))
            .collect(),
    };
    let paragraph = Paragraph::new(content)
        .wrap(Wrap { trim: false })
        .scroll((app.detail_scroll, 0));
    frame.render_widget(
        paragraph,
        Rect::new(inner.x, inner.y + 1, inner.width, inner.height - 1),
    );
}

fn section(title: &str) -> Line<'static> {
    Line::from(Span::styled(
        title.to_string(),
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
    ))
}

fn field(name: &str, value: impl Into<String>) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("  {}: ", name), Style::default().fg(Color::DarkGray)),
        Span::raw(value.into()),
    ])
}

fn headers_tab(entry: &Entry) -> Vec<Line<'static>> {
    let record = entry.record();
    let mut lines = vec![
        section("General"),
        field("Request URL", entry.url()),
        field("Request Method", entry.method()),
        Line::from(vec![
            Span::styled("  Status Code: ", Style::default().fg(Color::DarkGray)),
            Span::styled(
                format!("{} {}", entry.status(), record.response.status_text),
                status_style(entry.status()),
            ),
        ]),
    ];
    if let Some(ip) = &record.server_ip_address {
        lines.push(field("Remote Address", ip.clone()));
    }
    if let Some(initiator) = &record.initiator {
        let source = initiator.url.clone().unwrap_or_default();
        lines.push(field("Initiator", format!("{} {}", initiator.kind, source)));
    }

    lines.push(Line::default());
    lines.push(section(&format!("Response Headers ({})", record.response.headers.len())));
    lines.extend(record.response.headers.iter().map(|h| field(&h.name, h.value.clone())));

    lines.push(Line::default());
    lines.push(section(&format!("Request Headers ({})", record.request.headers.len())));
    lines.extend(record.request.headers.iter().map(|h| field(&h.name, h.value.clone())));
    lines
}

fn payload_tab(entry: &Entry) -> Vec<Line<'static>> {
    let request = &entry.record().request;
    let mut lines = Vec::new();
    if !request.query_string.is_empty() {
        lines.push(section("Query String Parameters"));
        lines.extend(request.query_string.iter().map(|q| field(&q.name, q.value.clone())));
        lines.push(Line::default());
    }
    if let Some(post) = &request.post_data {
        lines.push(section(&format!("Request Payload ({})", post.mime_type)));
        let text = post.text.as_deref().unwrap_or_default();
        lines.extend(text.lines().map(|l| Line::from(l.to_string())));
    }
    if lines.is_empty() {
        lines.push(Line::styled(
            "This request has no payload",
            Style::default().fg(Color::DarkGray),
        ));
    }
    lines
}

fn response_tab(entry: &Entry) -> Vec<Line<'static>> {
    let content = &entry.record().response.content;
    match content.decoded_text() {
        Some(text) if !text.is_empty() => pretty_body(&content.mime_type, &text)
            .lines()
            .map(|l| Line::from(l.to_string()))
            .collect(),
        _ => vec![Line::styled(
            "No response body captured",
            Style::default().fg(Color::DarkGray),
        )],
    }
}

/// JSON bodies are re-indented; anything else, or JSON that fails to
/// parse, is shown as captured
fn pretty_body<'a>(mime_type: &str, text: &'a str) -> Cow<'a, str> {
    if !mime_type.to_ascii_lowercase().contains("json") {
        return Cow::Borrowed(text);
    }
    serde_json::from_str::<serde_json::Value>(text)
        .and_then(|value| serde_json::to_string_pretty(&value))
        .map(Cow::Owned)
        .unwrap_or(Cow::Borrowed(text))
}

fn cookies_tab(entry: &Entry, width: u16) -> Vec<Line<'static>> {
    let record = entry.record();
    if record.request.cookies.is_empty() && record.response.cookies.is_empty() {
        return vec![Line::styled(
            "This request has no cookies",
            Style::default().fg(Color::DarkGray),
        )];
    }

    let mut lines = Vec::new();
    for (title, cookies) in [
        ("Request Cookies", &record.request.cookies),
        ("Response Cookies", &record.response.cookies),
    ] {
        if cookies.is_empty() {
            continue;
        }
        if !lines.is_empty() {
            lines.push(Line::default());
        }
        lines.push(section(&format!("{} ({})", title, cookies.len())));
        lines.extend(cookie_table(cookies, width));
    }
    lines
}

/// Name, Value, Domain, Path, Expires, HttpOnly, Secure
fn cookie_table(cookies: &[Cookie], width: u16) -> Vec<Line<'static>> {
    // Value takes whatever the fixed columns leave
    let value = (width as usize).saturating_sub(2 + 16 + 18 + 10 + 24 + 8 + 6 + 7).max(8);
    let widths = [16, value, 18, 10, 24, 8, 6];
    let row = |cells: [String; 7], style: Style| {
        let mut spans = vec![Span::raw("  ")];
        for (cell, w) in cells.iter().zip(widths) {
            spans.push(Span::styled(fit(cell, w), style));
            spans.push(Span::raw(" "));
        }
        Line::from(spans)
    };
    let flag = |set: Option<bool>| {
        let mark = if set.unwrap_or(false) { "✓" } else { "" };
        mark.to_string()
    };

    let mut lines = vec![row(
        ["Name", "Value", "Domain", "Path", "Expires", "HttpOnly", "Secure"].map(String::from),
        Style::default().fg(Color::DarkGray).add_modifier(Modifier::BOLD),
    )];
    for cookie in cookies {
        lines.push(row(
            [
                cookie.name.clone(),
                cookie.value.clone(),
                cookie.domain.clone().unwrap_or_default(),
                cookie.path.clone().unwrap_or_default(),
                cookie.expires.clone().unwrap_or_else(|| "Session".to_string()),
                flag(cookie.http_only),
                flag(cookie.secure),
            ],
            Style::default(),
        ));
    }
    lines
}

fn timing_tab(entry: &Entry, width: u16) -> Vec<Line<'static>> {
    let phases = entry.record().timings.phases();
    let total = entry.duration_ms().max(phases.iter().map(|(_, ms)| ms).sum());
    let bar_width = (width as usize).saturating_sub(36).max(4);

    let mut lines = vec![field(
        "Started at",
        entry.started_at().format("%Y-%m-%d %H:%M:%S%.3f UTC").to_string(),
    )];
    lines.push(Line::default());
    let mut offset = 0.0;
    for (phase, ms) in phases {
        let start = if total > 0.0 { (offset / total * bar_width as f64) as usize } else { 0 };
        let len = if total > 0.0 {
            ((ms / total * bar_width as f64).round() as usize).max(1)
        } else {
            1
        };
        let len = len.min(bar_width.saturating_sub(start)).max(1);
        lines.push(Line::from(vec![
            Span::styled(format!("  {:<20}", phase.label()), Style::default().fg(Color::DarkGray)),
            Span::raw(" ".repeat(start)),
            Span::styled("█".repeat(len), Style::default().fg(Color::Cyan)),
            Span::raw(format!(" {}", format_duration(ms))),
        ]));
        offset += ms;
    }
    lines.push(Line::default());
    lines.push(field("Total", format_duration(entry.duration_ms())));
    lines
}

// ============================================================================
// Status line and footer
// ============================================================================

fn draw_status_line(frame: &mut Frame, app: &TuiApp, area: Rect) {
    let line = if app.focus == Focus::ImportPrompt {
        Line::from(vec![
            Span::styled(" Import HAR file: ", Style::default().fg(Color::Cyan)),
            Span::raw(app.import_input.clone()),
            Span::styled("█", Style::default().fg(Color::Cyan)),
        ])
    } else if let Some(status) = &app.status {
        let style = if status.is_error {
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Green)
        };
        Line::from(Span::styled(format!(" {}", status.text), style))
    } else {
        let stats = app.store.stats();
        let mut spans = vec![
            Span::styled(
                format!(" {} / {} requests", stats.filtered_requests, stats.total_requests),
                Style::default().fg(Color::White),
            ),
            Span::styled(" │ ", Style::default().fg(Color::DarkGray)),
            Span::raw(format!("{} transferred", format_bytes(stats.transferred_bytes))),
            Span::styled(" │ ", Style::default().fg(Color::DarkGray)),
            Span::raw(format!("{} resources", format_bytes(stats.resource_bytes))),
            Span::styled(" │ ", Style::default().fg(Color::DarkGray)),
            Span::raw(format!("Finish: {}", format_duration(stats.finish_ms))),
        ];
        if app.store.import_pending() {
            spans.push(Span::styled(" │ Loading…", Style::default().fg(Color::Yellow)));
        }
        Line::from(spans)
    };

    let recording = if app.store.is_recording() {
        Span::styled("● REC ", Style::default().fg(Color::Red))
    } else {
        Span::styled("⏸ Paused ", Style::default().fg(Color::DarkGray))
    };
    let mut right = vec![recording];
    if let Some(addr) = app.listen_addr {
        right.insert(0, Span::styled(format!("{} ", addr), Style::default().fg(Color::Magenta)));
    }
    let right = Line::from(right).alignment(Alignment::Right);

    frame.render_widget(Paragraph::new(line), area);
    frame.render_widget(Paragraph::new(right), area);
}

/// Draw the footer with key hints
fn draw_footer(frame: &mut Frame, app: &TuiApp, area: Rect) {
    let hints: &[(&str, &str)] = match app.focus {
        Focus::Filter => &[("Enter", "Apply"), ("Esc", "Done"), ("Ctrl+U", "Clear")],
        Focus::ImportPrompt => &[("Enter", "Import"), ("Esc", "Cancel")],
        Focus::Table => &[
            ("↑/↓", "Select"),
            ("/", "Filter"),
            ("F1-F12", "Type"),
            ("i", "Invert"),
            ("s/S", "Sort"),
            ("Ctrl+O", "Import"),
            ("Ctrl+R", "Record"),
            ("Ctrl+L", "Clear"),
            ("b", "Rows"),
            ("v", "Overview"),
            ("q", "Quit"),
        ],
    };

    let mut spans = Vec::new();
    for (key, action) in hints {
        spans.push(Span::styled(*key, Style::default().fg(Color::Cyan)));
        spans.push(Span::styled(format!(" {}  ", action), Style::default().fg(Color::DarkGray)));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

// ============================================================================
// Styles and formatting
// ============================================================================

/// Get style for HTTP method
fn method_style(method: &str) -> Style {
    match method {
        "GET" => Style::default().fg(Color::Green),
        "POST" => Style::default().fg(Color::Yellow),
        "PUT" => Style::default().fg(Color::Blue),
        "PATCH" => Style::default().fg(Color::Magenta),
        "DELETE" => Style::default().fg(Color::Red),
        "HEAD" => Style::default().fg(Color::Cyan),
        _ => Style::default().fg(Color::White),
    }
}

/// Get style for HTTP status code
fn status_style(status: u16) -> Style {
    if status >= 400 {
        Style::default().fg(Color::Red)
    } else if status >= 300 {
        Style::default().fg(Color::Yellow)
    } else if status >= 200 {
        Style::default().fg(Color::Green)
    } else {
        Style::default().fg(Color::Gray)
    }
}

fn type_color(resource_type: ResourceType) -> Color {
    match resource_type {
        ResourceType::Document => Color::Blue,
        ResourceType::Stylesheet => Color::Magenta,
        ResourceType::Script => Color::Yellow,
        ResourceType::Xhr => Color::Green,
        ResourceType::Image => Color::LightMagenta,
        ResourceType::Media => Color::LightBlue,
        ResourceType::Font => Color::Red,
        ResourceType::WebSocket => Color::Cyan,
        ResourceType::Manifest => Color::LightCyan,
        ResourceType::Wasm => Color::LightRed,
        ResourceType::Other => Color::Gray,
    }
}

/// Truncate or pad to exactly `width` characters
fn fit(text: &str, width: usize) -> String {
    let count = text.chars().count();
    if count <= width {
        format!("{:<width$}", text, width = width)
    } else if width > 1 {
        let mut out: String = text.chars().take(width - 1).collect();
        out.push('…');
        out
    } else {
        text.chars().take(width).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Preferences;
    use chrono::{TimeZone, Utc};
    use harscope_core::generator::generate_entries;
    use harscope_core::TraceStore;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    fn app_with(count: usize) -> TuiApp {
        let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let mut store = TraceStore::new();
        store.set_entries(generate_entries(count, base, &mut StdRng::seed_from_u64(9)));
        TuiApp::new(store, Preferences::default())
    }

    fn render(app: &mut TuiApp, width: u16, height: u16) -> String {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal.draw(|f| draw(f, app)).unwrap();
        let buffer = terminal.backend().buffer().clone();
        (0..height)
            .map(|y| {
                (0..width)
                    .map(|x| buffer[(x, y)].symbol().to_string())
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_fit() {
        assert_eq!(fit("abc", 5), "abc  ");
        assert_eq!(fit("abcdef", 4), "abc…");
        assert_eq!(fit("abc", 0), "");
    }

    #[test]
    fn test_columns_fill_width() {
        for width in [40u16, 80, 120, 200] {
            let cols = columns(width);
            assert_eq!(cols[0].0, SortKey::Name);
            let (_, x, w) = cols[cols.len() - 1];
            assert!(x + w <= width.max(10));
        }
        assert!(columns(120).iter().any(|(k, _, _)| *k == SortKey::StartTime));
        assert!(!columns(60).iter().any(|(k, _, _)| *k == SortKey::StartTime));
    }

    #[test]
    fn test_empty_trace_shows_placeholder() {
        let mut app = app_with(0);
        let screen = render(&mut app, 100, 30);
        assert!(screen.contains("No requests yet"));
    }

    #[test]
    fn test_no_matches_shows_placeholder() {
        let mut app = app_with(10);
        app.store.set_filter_text("zzzz-nothing");
        let screen = render(&mut app, 100, 30);
        assert!(screen.contains("No requests match the current filter."));
    }

    #[test]
    fn test_render_materializes_only_the_window() {
        let mut app = app_with(5_000);
        let screen = render(&mut app, 120, 30);
        assert!(screen.contains("Requests (5000 / 5000)"));

        let visible = app.virtualizer.viewport_height();
        let window = app.virtualizer.window(5_000).rows().unwrap().clone();
        assert!(window.len() <= visible as usize + 1 + 2 * app.virtualizer.overscan());
    }

    #[test]
    fn test_render_records_click_regions() {
        let mut app = app_with(20);
        render(&mut app, 120, 40);
        assert_eq!(app.regions.chips.len(), FilterType::ALL.len());
        assert!(app.regions.timeline.height > 0);
        assert!(app.regions.table_body.height > 0);
        assert!(!app.regions.table_header.is_empty());
    }

    #[test]
    fn test_detail_pane_follows_selection() {
        let mut app = app_with(20);
        app.store.select_view_index(3);
        let name = app.store.selected_entry().unwrap().display_name().to_string();
        let screen = render(&mut app, 120, 40);
        assert!(screen.contains("Headers"));
        assert!(screen.contains(&name));
        assert!(app.regions.detail.height > 0);

        app.store.select(None);
        render(&mut app, 120, 40);
        assert_eq!(app.regions.detail, Rect::default());
    }

    #[test]
    fn test_every_detail_tab_renders() {
        let mut app = app_with(5);
        app.store.select_view_index(0);
        for tab in DetailTab::ALL {
            app.detail_tab = tab;
            let screen = render(&mut app, 120, 40);
            assert!(screen.contains(tab.label()));
        }
    }

    #[test]
    fn test_cookies_tab_lists_both_directions() {
        let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let mut records = generate_entries(1, base, &mut StdRng::seed_from_u64(9));
        records[0].request.cookies.push(Cookie {
            name: "session".to_string(),
            value: "abc123".to_string(),
            path: None,
            domain: None,
            expires: None,
            http_only: None,
            secure: None,
        });
        records[0].response.cookies.push(Cookie {
            name: "tracker".to_string(),
            value: "xyz".to_string(),
            path: Some("/".to_string()),
            domain: Some(".example.com".to_string()),
            expires: Some("2030-01-01T00:00:00Z".to_string()),
            http_only: Some(true),
            secure: Some(true),
        });
        let mut store = TraceStore::new();
        store.set_entries(records);
        let mut app = TuiApp::new(store, Preferences::default());
        app.store.select_view_index(0);
        app.detail_tab = DetailTab::Cookies;

        let screen = render(&mut app, 160, 50);
        assert!(screen.contains("Request Cookies (1)"));
        assert!(screen.contains("Response Cookies (1)"));
        assert!(screen.contains("abc123"));
        assert!(screen.contains(".example.com"));
        assert!(screen.contains("HttpOnly"));

        let lines = cookies_tab(app.store.selected_entry().unwrap(), 160);
        let tracker = lines
            .iter()
            .map(|l| l.spans.iter().map(|s| s.content.as_ref()).collect::<String>())
            .find(|l| l.contains("tracker"))
            .unwrap();
        assert_eq!(tracker.matches('✓').count(), 2);
    }

    #[test]
    fn test_cookies_tab_without_cookies() {
        let mut app = app_with(1);
        let lines = cookies_tab(app.store.view_entry(0).unwrap(), 120);
        assert_eq!(lines.len(), 1);
        app.store.select_view_index(0);
        app.detail_tab = DetailTab::Cookies;
        assert!(render(&mut app, 120, 40).contains("This request has no cookies"));
    }

    #[test]
    fn test_json_bodies_are_pretty_printed() {
        assert_eq!(
            pretty_body("application/json; charset=utf-8", r#"{"a":1,"b":[true]}"#),
            "{\n  \"a\": 1,\n  \"b\": [\n    true\n  ]\n}"
        );
        assert_eq!(pretty_body("application/json", "{not json"), "{not json");
        assert_eq!(pretty_body("text/plain", r#"{"a":1}"#), r#"{"a":1}"#);
    }
}
