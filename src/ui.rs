use chrono::{DateTime, Utc};
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Flex, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState, Wrap};

use crate::app::{App, InputMode, Liveness, PageData};
use crate::format::{format_byte_size, format_duration_ms, format_timestamp_age};
use crate::model::{DashboardData, DiskUsage, Payload, ResourceTab};
use crate::resources::{QueryOptions, TableView};
use crate::usage::{categories, percent_of, proportional_widths, shade_index, total_bytes, usage_breakdown};

const BG: Color = Color::Rgb(9, 15, 25);
const PANEL: Color = Color::Rgb(16, 27, 44);
const ACCENT: Color = Color::Rgb(52, 211, 153);
const MUTED: Color = Color::Rgb(140, 156, 178);
const WARN: Color = Color::Rgb(251, 191, 36);
const ERROR: Color = Color::Rgb(248, 113, 113);
const PL_A: Color = Color::Rgb(17, 94, 89);
const PL_B: Color = Color::Rgb(30, 64, 175);
const PL_C: Color = Color::Rgb(55, 48, 163);
const PL_D: Color = Color::Rgb(82, 24, 124);
const TRACK: Color = Color::Rgb(30, 41, 59);

// Lightest to darkest; the largest category takes the last entry.
const USAGE_SHADES: [Color; 7] = [
    Color::Rgb(204, 251, 241),
    Color::Rgb(153, 246, 228),
    Color::Rgb(94, 234, 212),
    Color::Rgb(45, 212, 191),
    Color::Rgb(20, 184, 166),
    Color::Rgb(13, 148, 136),
    Color::Rgb(17, 94, 89),
];

pub fn render(frame: &mut Frame, app: &mut App) {
    let now = Utc::now();
    let root = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(6),
            Constraint::Length(1),
        ])
        .split(frame.area());

    render_header(frame, root[0], app);
    render_body(frame, root[1], app, now);
    render_footer(frame, root[2], app);

    if app.show_help() {
        render_help_modal(frame, app);
    }
}

fn render_header(frame: &mut Frame, area: Rect, app: &App) {
    let left_line = build_left_header_line(app);
    if area.width < 42 {
        frame.render_widget(
            Paragraph::new(left_line).style(Style::default().bg(BG).fg(Color::White)),
            area,
        );
        return;
    }

    let right_line = build_right_header_line(app);
    let right_width = spans_width(&right_line.spans) as u16;
    if right_width == 0 || right_width >= area.width.saturating_sub(20) {
        frame.render_widget(
            Paragraph::new(left_line).style(Style::default().bg(BG).fg(Color::White)),
            area,
        );
        return;
    }
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(1), Constraint::Length(right_width)])
        .split(area);
    frame.render_widget(
        Paragraph::new(left_line).style(Style::default().bg(BG).fg(Color::White)),
        chunks[0],
    );
    frame.render_widget(
        Paragraph::new(right_line).style(Style::default().bg(BG)),
        chunks[1],
    );
}

fn build_left_header_line(app: &App) -> Line<'static> {
    let tab = app.active_tab();
    let query_label = app
        .active_query_options()
        .zip(app.query())
        .and_then(|(options, query)| {
            if query.is_default() {
                return None;
            }
            let mut parts = Vec::new();
            if !query.search.is_empty() {
                parts.push(format!("/{}", compact_text(&query.search, 16)));
            }
            if query.filter != crate::engine::ALL_FILTER {
                parts.push(format!("󰈲 {}", options.filter_label(&query.filter)));
            }
            if let Some(sort) = &query.sort {
                parts.push(format!(
                    "{} {}",
                    options.sort_label(&sort.field),
                    sort.direction.arrow()
                ));
            }
            Some(parts.join("  "))
        });

    let mut powerline = Powerline::default()
        .segment(" 󰡨 doku ", Color::White, PL_A)
        .segment(
            format!(" {} ", compact_text(app.source_label(), 32)),
            Color::White,
            PL_B,
        )
        .segment(
            format!(" {} {} ", tab_icon(tab), tab.title().to_ascii_lowercase()),
            Color::White,
            PL_C,
        );
    if let Some(label) = query_label {
        powerline = powerline.segment(format!(" {label} "), Color::White, PL_D);
    }

    Line::from(powerline.finish(BG))
}

/// Page strip: each page opens with a left-pointing arrow in its own colour.
fn build_right_header_line(app: &App) -> Line<'static> {
    let mut spans = Vec::new();
    let mut previous_bg = BG;
    for (index, tab) in app.tabs().iter().enumerate() {
        let (fg, bg) = if *tab == app.active_tab() {
            (Color::Black, Color::Rgb(59, 130, 246))
        } else {
            (Color::White, TRACK)
        };
        spans.push(Span::styled("", Style::default().fg(bg).bg(previous_bg)));
        spans.push(Span::styled(
            format!(" {}:{} ", index + 1, tab.short_token()),
            Style::default().fg(fg).bg(bg).add_modifier(Modifier::BOLD),
        ));
        previous_bg = bg;
    }
    if !spans.is_empty() {
        spans.push(Span::styled(" ", Style::default().bg(BG)));
    }
    Line::from(spans)
}

fn render_body(frame: &mut Frame, area: Rect, app: &mut App, now: DateTime<Utc>) {
    app.set_table_page_size(table_rows_visible(area));
    let tab = app.active_tab();

    match app.active_page_data() {
        PageData::Failed { error, .. } => render_error_panel(frame, area, tab, error),
        PageData::Loading => render_loading_panel(frame, area, tab),
        PageData::Ready {
            payload: Payload::Dashboard(data),
            ..
        } => render_dashboard(frame, area, data, now),
        PageData::Ready { .. } => match app.active_table(now) {
            Some(view) => render_resource_page(frame, area, app, &view),
            None => render_loading_panel(frame, area, tab),
        },
    }
}

fn render_error_panel(frame: &mut Frame, area: Rect, tab: ResourceTab, error: &str) {
    let text = format!("{error}\n\nPress r to retry.");
    let panel = Paragraph::new(Text::from(text))
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .title(format!("{} Error", tab.title()))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(ERROR))
                .style(Style::default().bg(PANEL)),
        )
        .style(Style::default().fg(ERROR));
    frame.render_widget(panel, area);
}

fn render_loading_panel(frame: &mut Frame, area: Rect, tab: ResourceTab) {
    let panel = Paragraph::new(format!("Loading {}…", tab.title().to_ascii_lowercase()))
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .title(tab.title())
                .borders(Borders::ALL)
                .border_style(Style::default().fg(MUTED))
                .style(Style::default().bg(PANEL)),
        )
        .style(Style::default().fg(MUTED));
    frame.render_widget(panel, area);
}

fn render_resource_page(frame: &mut Frame, area: Rect, app: &App, view: &TableView) {
    let tab = app.active_tab();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(3)])
        .split(area);

    frame.render_widget(
        Paragraph::new(build_filter_tabs_line(app, view)).style(Style::default().bg(BG)),
        chunks[0],
    );

    let sort_column = view.sort_column();
    let header_row = Row::new(view.columns.iter().enumerate().map(|(index, column)| {
        let title = if Some(index) == sort_column {
            format!("{} {}", column.title, view.sort.direction.arrow())
        } else {
            column.title.to_string()
        };
        Cell::from(title).style(Style::default().add_modifier(Modifier::BOLD))
    }))
    .height(1)
    .style(Style::default().fg(ACCENT));

    let rows = if view.is_empty() {
        vec![Row::new(vec![
            Cell::from("No records to display").style(Style::default().fg(MUTED)),
        ])]
    } else {
        view.rows
            .iter()
            .map(|cells| {
                Row::new(
                    cells
                        .iter()
                        .map(|cell| Cell::from(cell.clone()).style(Style::default().fg(Color::White))),
                )
            })
            .collect()
    };

    let mut title = format!(
        "{} (showing {} of {})",
        tab.title(),
        view.rows.len(),
        view.total
    );
    if let Some(containers) = view.distinct_containers {
        title.push_str(&format!(" · {containers} containers"));
    }
    if !view.is_empty() {
        title.push_str(&format!(" · {}", format_byte_size(view.visible_size)));
    }

    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(ACCENT))
        .style(Style::default().bg(PANEL));

    let table = Table::new(rows, column_constraints(view.columns.len()))
        .header(header_row)
        .block(block)
        .column_spacing(1)
        .row_highlight_style(
            Style::default()
                .bg(Color::Rgb(24, 36, 58))
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("󰜴 ");

    let mut state = TableState::default();
    if !view.is_empty() {
        state.select(Some(app.active_selected_index()));
    }
    frame.render_stateful_widget(table, chunks[1], &mut state);
}

fn build_filter_tabs_line(app: &App, view: &TableView) -> Line<'static> {
    let mut spans = vec![Span::raw(" ")];
    for tab in &view.filter_tabs {
        let style = if tab.active {
            Style::default()
                .fg(Color::Black)
                .bg(ACCENT)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(MUTED)
        };
        spans.push(Span::styled(format!(" {} ({}) ", tab.label, tab.count), style));
        spans.push(Span::raw(" "));
    }
    if let Some(query) = app.query()
        && !query.search.is_empty()
    {
        spans.push(Span::styled(
            format!(" 󰍉 {} ", compact_text(&query.search, 24)),
            Style::default().fg(WARN),
        ));
    }
    Line::from(spans)
}

fn render_dashboard(frame: &mut Frame, area: Rect, data: &DashboardData, now: DateTime<Utc>) {
    let block = Block::default()
        .title("Dashboard")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(ACCENT))
        .style(Style::default().bg(PANEL));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if inner.width < 20 || inner.height < 6 {
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(0),
        ])
        .split(inner);

    let version = &data.docker_version;
    let platform = if version.platform.name.is_empty() {
        String::new()
    } else {
        format!("  ·  {}", version.platform.name)
    };
    let version_line = format!(
        "󰡨 Docker {}  ·  API {}{platform}",
        or_dash(&version.version),
        or_dash(&version.api_version)
    );
    frame.render_widget(
        Paragraph::new(compact_text(&version_line, chunks[0].width as usize))
            .style(Style::default().fg(Color::Rgb(147, 197, 253))),
        chunks[0],
    );

    frame.render_widget(Paragraph::new(scan_status_line(data, now)), chunks[1]);

    render_disk_gauge(frame, chunks[2], &data.disk_usage);

    render_usage_bar(frame, chunks[4], data);
    render_summary_table(frame, chunks[5], data);
}

fn scan_status_line(data: &DashboardData, now: DateTime<Utc>) -> Line<'static> {
    let scan = &data.scan_status;
    let mut spans = Vec::new();
    if scan.is_scanning {
        spans.push(Span::styled(
            "󰑓 Scanning… ",
            Style::default().fg(WARN).add_modifier(Modifier::BOLD),
        ));
    }
    let last = scan
        .last_scan_time
        .as_deref()
        .map(|raw| format_timestamp_age(raw, now))
        .unwrap_or_else(|| "never".to_string());
    spans.push(Span::styled(
        format!("Last scan: {last}"),
        Style::default().fg(MUTED),
    ));
    if let Some(duration) = scan.scan_duration {
        spans.push(Span::styled(
            format!("  ·  took {}", format_duration_ms(duration)),
            Style::default().fg(MUTED),
        ));
    }
    Line::from(spans)
}

fn render_usage_bar(frame: &mut Frame, area: Rect, data: &DashboardData) {
    let shares = usage_breakdown(&data.summary);
    if shares.is_empty() || area.width == 0 {
        frame.render_widget(
            Paragraph::new("No usage recorded").style(Style::default().fg(MUTED)),
            area,
        );
        return;
    }

    let sizes = shares.iter().map(|share| share.bytes).collect::<Vec<_>>();
    let widths = proportional_widths(&sizes, area.width);
    let mut spans = Vec::with_capacity(shares.len());
    for (rank, (share, width)) in shares.iter().zip(widths).enumerate() {
        if width == 0 {
            continue;
        }
        let shade = USAGE_SHADES[shade_index(rank, shares.len(), USAGE_SHADES.len())];
        let label = format!("{} {}%", share.label, share.percent);
        let text = if label.chars().count() + 2 <= width as usize {
            format!(" {:<pad$}", label, pad = width as usize - 1)
        } else {
            " ".repeat(width as usize)
        };
        spans.push(Span::styled(
            text,
            Style::default().fg(text_on(shade)).bg(shade),
        ));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_summary_table(frame: &mut Frame, area: Rect, data: &DashboardData) {
    let shares = usage_breakdown(&data.summary);
    let total = total_bytes(&data.summary);

    let header_row = Row::new(
        ["", "RESOURCE", "COUNT", "SIZE", "SHARE"]
            .into_iter()
            .map(|title| Cell::from(title).style(Style::default().add_modifier(Modifier::BOLD))),
    )
    .style(Style::default().fg(ACCENT));

    let mut rows = categories(&data.summary)
        .into_iter()
        .map(|(label, tab, usage)| {
            let swatch = shares
                .iter()
                .position(|share| share.tab == tab)
                .map(|rank| {
                    let shade = USAGE_SHADES[shade_index(rank, shares.len(), USAGE_SHADES.len())];
                    Cell::from("██").style(Style::default().fg(shade))
                })
                .unwrap_or_else(|| Cell::from("··").style(Style::default().fg(MUTED)));
            Row::new(vec![
                swatch,
                Cell::from(format!("{} {label}", tab_icon(tab))),
                Cell::from(
                    usage
                        .count
                        .map(|count| count.to_string())
                        .unwrap_or_else(|| "-".to_string()),
                ),
                Cell::from(format_byte_size(usage.size)),
                Cell::from(format!("{}%", percent_of(usage.size, total))),
            ])
            .style(Style::default().fg(Color::White))
        })
        .collect::<Vec<_>>();
    rows.push(
        Row::new(vec![
            Cell::from(""),
            Cell::from("Total"),
            Cell::from(""),
            Cell::from(format_byte_size(total)),
            Cell::from(""),
        ])
        .style(Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)),
    );

    let table = Table::new(
        rows,
        [
            Constraint::Length(3),
            Constraint::Min(16),
            Constraint::Length(8),
            Constraint::Length(12),
            Constraint::Length(7),
        ],
    )
    .header(header_row)
    .column_spacing(1);
    frame.render_widget(table, area);
}

/// Used space fills from the left; the caption sits centred across both parts.
fn render_disk_gauge(frame: &mut Frame, area: Rect, disk: &DiskUsage) {
    if area.width == 0 || area.height == 0 {
        return;
    }

    let label = format!(
        "󰋊 Disk {} / {}",
        format_byte_size(disk.used_bytes),
        format_byte_size(disk.total_bytes)
    );
    let label_width = (label.chars().count() as u16 + 2).min(area.width / 2);
    let [label_area, bar_area] =
        Layout::horizontal([Constraint::Length(label_width), Constraint::Min(0)]).areas(area);
    frame.render_widget(
        Paragraph::new(compact_text(&label, label_area.width as usize))
            .style(Style::default().fg(Color::Rgb(94, 234, 212))),
        label_area,
    );

    let width = bar_area.width as usize;
    if width == 0 {
        return;
    }
    let percent = disk.used_percent.clamp(0.0, 100.0);
    let used_cells = ((width as f64 * percent / 100.0).round() as usize).min(width);

    let caption = compact_text(
        &format!(
            " {percent:.0}% used · {} free ",
            format_byte_size(disk.available_bytes)
        ),
        width,
    );
    let mut cells = vec![' '; width];
    let start = (width - caption.chars().count()) / 2;
    for (offset, ch) in caption.chars().enumerate() {
        cells[start + offset] = ch;
    }

    let used = cells[..used_cells].iter().collect::<String>();
    let free = cells[used_cells..].iter().collect::<String>();
    let line = Line::from(vec![
        Span::styled(
            used,
            Style::default()
                .fg(BG)
                .bg(disk_color(percent))
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(free, Style::default().fg(Color::Rgb(148, 163, 184)).bg(TRACK)),
    ]);
    frame.render_widget(Paragraph::new(line), bar_area);
}

fn disk_color(percent: f64) -> Color {
    match percent {
        p if p >= 90.0 => ERROR,
        p if p >= 75.0 => WARN,
        _ => ACCENT,
    }
}

fn text_on(shade: Color) -> Color {
    match shade {
        Color::Rgb(red, green, blue) if (red as u16 + green as u16 + blue as u16) > 450 => BG,
        _ => Color::White,
    }
}

fn render_footer(frame: &mut Frame, area: Rect, app: &App) {
    if matches!(app.mode(), InputMode::Normal) {
        let status_width_hint = area.width.saturating_sub(36).min(120) as usize;
        let spans = Powerline::default()
            .segment(" 󰘳 nrm ", Color::White, PL_A)
            .segment(
                format!(
                    " {} {} ",
                    footer_status_icon(app.status()),
                    compact_text(app.status(), status_width_hint.max(24))
                ),
                Color::White,
                PL_B,
            )
            .finish(BG);

        let right_spans = build_footer_glance_spans(app);
        let max_right = area.width.saturating_sub(28);
        let right_width = (spans_width(&right_spans) as u16).min(max_right);
        if right_width == 0 {
            frame.render_widget(
                Paragraph::new(Line::from(spans)).style(Style::default().bg(BG)),
                area,
            );
            return;
        }

        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(1), Constraint::Length(right_width)])
            .split(area);
        frame.render_widget(
            Paragraph::new(Line::from(spans)).style(Style::default().bg(BG)),
            chunks[0],
        );
        frame.render_widget(
            Paragraph::new(Line::from(right_spans))
                .style(Style::default().bg(BG))
                .alignment(Alignment::Right),
            chunks[1],
        );
        return;
    }

    let (label, prompt, prompt_bg) = match app.mode() {
        InputMode::Search => (" 󰍉 srch ", format!("/{}", app.input()), WARN),
        InputMode::Command => (" 󰘳 cmd ", format!(":{}", app.input()), ACCENT),
        InputMode::Normal => return,
    };

    let mut spans = Powerline::default()
        .segment(label, Color::Black, prompt_bg)
        .segment(format!(" {prompt}█ "), Color::White, PL_B)
        .finish(BG);
    let hint = match app.mode() {
        InputMode::Search => "  enter keep · esc restore",
        _ => "  enter run · esc cancel · :help",
    };
    spans.push(Span::styled(hint, Style::default().fg(MUTED)));

    frame.render_widget(
        Paragraph::new(Line::from(spans)).style(Style::default().bg(BG)),
        area,
    );
}

fn build_footer_glance_spans(app: &App) -> Vec<Span<'static>> {
    let mut spans = Vec::new();
    if app.scanning() {
        spans.push(Span::styled(
            "󰑓 scanning ",
            Style::default().fg(WARN).add_modifier(Modifier::BOLD),
        ));
    }
    let (dot, label, color) = match app.liveness() {
        Liveness::Online => ("●", "online".to_string(), ACCENT),
        Liveness::Offline(reason) => ("●", format!("offline: {}", compact_text(reason, 28)), ERROR),
        Liveness::Unknown => ("○", "connecting".to_string(), MUTED),
    };
    spans.push(Span::styled(format!("{dot} {label} "), Style::default().fg(color)));
    if let Some(at) = app.active_last_refresh() {
        spans.push(Span::styled(
            format!("󰥔 {at} "),
            Style::default().fg(MUTED),
        ));
    }
    spans
}

fn footer_status_icon(status_text: &str) -> &'static str {
    let lower = status_text.to_ascii_lowercase();
    if lower.contains("failed") || lower.contains("unknown") || lower.contains("error") {
        "󰅚"
    } else if lower.contains("refreshing") || lower.contains("scan") {
        "󰑓"
    } else {
        "󰄬"
    }
}

/// Left-to-right powerline. A segment's closing arrow is drawn once the
/// colour behind it is known.
#[derive(Default)]
struct Powerline {
    spans: Vec<Span<'static>>,
    open: Option<Color>,
}

impl Powerline {
    fn segment(mut self, content: impl Into<String>, fg: Color, bg: Color) -> Self {
        self.close(bg);
        self.spans.push(Span::styled(
            content.into(),
            Style::default().fg(fg).bg(bg).add_modifier(Modifier::BOLD),
        ));
        self.open = Some(bg);
        self
    }

    fn finish(mut self, trailing_bg: Color) -> Vec<Span<'static>> {
        self.close(trailing_bg);
        self.spans
    }

    fn close(&mut self, next_bg: Color) {
        if let Some(bg) = self.open.take() {
            self.spans
                .push(Span::styled("", Style::default().fg(bg).bg(next_bg)));
        }
    }
}

fn spans_width(spans: &[Span<'_>]) -> usize {
    spans.iter().map(|span| span.content.chars().count()).sum()
}

fn render_help_modal(frame: &mut Frame, app: &App) {
    let [column] = Layout::horizontal([Constraint::Percentage(78)])
        .flex(Flex::Center)
        .areas(frame.area());
    let [area] = Layout::vertical([Constraint::Percentage(72)])
        .flex(Flex::Center)
        .areas(column);
    frame.render_widget(Clear, area);

    let mut lines = vec![
        Line::from(format!(
            "doku help  mode:{}  page:{}",
            help_mode_label(app.mode()),
            app.active_tab().title()
        )),
        Line::from(""),
    ];
    for line in contextual_help_lines(app.active_tab()) {
        lines.push(Line::from(line));
    }

    let modal = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .title("Help")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(ACCENT))
                .style(Style::default().bg(PANEL)),
        )
        .style(Style::default().fg(Color::White));

    frame.render_widget(modal, area);
}

fn contextual_help_lines(tab: ResourceTab) -> Vec<String> {
    let mut lines = vec![
        "Pages: ←/→ or Tab/Shift+Tab cycle  1..8 jump".to_string(),
        "Rows: j/k ↑/↓ move  PgUp/PgDn page  gg/Home top  G bottom".to_string(),
        "Query: / search  f/F next/prev filter  s next sort  o flip  c clear".to_string(),
        "Data: r/F5 refresh  R rescan  ? help  q quit".to_string(),
        String::new(),
        "Commands:".to_string(),
        "  :filter <id>   :sort [field] [asc|desc]   :search <term>   :clear".to_string(),
        "  :tab <page>    :<page>   :refresh   :scan   :help   :quit".to_string(),
        format!(
            "  pages: {}",
            ResourceTab::ALL
                .iter()
                .map(|tab| tab.short_token())
                .collect::<Vec<_>>()
                .join(" ")
        ),
    ];

    if let Some(options) = QueryOptions::for_tab(tab) {
        lines.push(String::new());
        lines.push(format!("{}:", tab.title()));
        lines.push(format!("  filters: {}", options.filter_ids().join(", ")));
        lines.push(format!("  sort fields: {}", options.sort_field_ids().join(", ")));
        lines.push(format!(
            "  default: {} {}",
            options.default_sort.field,
            options.default_sort.direction.arrow()
        ));
    }

    lines
}

fn help_mode_label(mode: InputMode) -> &'static str {
    match mode {
        InputMode::Normal => "normal",
        InputMode::Search => "search",
        InputMode::Command => "command",
    }
}

fn table_rows_visible(area: Rect) -> usize {
    // Filter line, borders and header.
    area.height.saturating_sub(4).max(1) as usize
}

fn compact_text(value: &str, max_chars: usize) -> String {
    if value.char_indices().nth(max_chars).is_none() {
        return value.to_string();
    }
    let cut = value
        .char_indices()
        .nth(max_chars.saturating_sub(1))
        .map_or(value.len(), |(index, _)| index);
    format!("{}…", &value[..cut])
}

fn or_dash(value: &str) -> &str {
    if value.trim().is_empty() { "-" } else { value }
}

fn tab_icon(tab: ResourceTab) -> &'static str {
    match tab {
        ResourceTab::Dashboard => "",
        ResourceTab::Containers => "󰡨",
        ResourceTab::Images => "󰏗",
        ResourceTab::Volumes => "󰋊",
        ResourceTab::BuildCache => "󰃨",
        ResourceTab::Overlay2 => "󰌨",
        ResourceTab::Logs => "󰈙",
        ResourceTab::BindMounts => "󰉖",
    }
}

fn column_constraints(columns: usize) -> Vec<Constraint> {
    if columns == 0 {
        return vec![Constraint::Percentage(100)];
    }

    let width = (100 / columns as u16).max(1);
    (0..columns)
        .map(|_| Constraint::Percentage(width))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{ERROR, PL_A, PL_B, Powerline, WARN, compact_text, disk_color, render, text_on};
    use crate::app::App;
    use crate::input::Action;
    use crate::mock::MockData;
    use crate::model::ResourceTab;
    use chrono::Utc;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;
    use ratatui::style::Color;

    fn screen(app: &mut App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(160, 40)).unwrap();
        terminal.draw(|frame| render(frame, app)).unwrap();
        let buffer = terminal.backend().buffer().clone();
        let width = buffer.area.width as usize;
        buffer
            .content()
            .chunks(width)
            .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn loaded(tab: ResourceTab) -> App {
        let mut app = App::new("sample data");
        app.open_tab(tab);
        let data = MockData::new(Utc::now());
        app.apply_fetch(tab, Ok(data.payload(tab, Utc::now())));
        app
    }

    #[test]
    fn dashboard_shows_disk_and_categories() {
        let mut app = loaded(ResourceTab::Dashboard);
        let text = screen(&mut app);
        assert!(text.contains("Disk"));
        assert!(text.contains("% used"));
        assert!(text.contains("Build Cache"));
        assert!(text.contains("Total"));
    }

    #[test]
    fn resource_page_reports_visible_and_total() {
        let mut app = loaded(ResourceTab::Containers);
        let text = screen(&mut app);
        assert!(text.contains("Containers (showing 3 of 3)"));
        assert!(text.contains("All (3)"));
    }

    #[test]
    fn empty_view_renders_placeholder_row() {
        let mut app = loaded(ResourceTab::Volumes);
        app.apply_action(Action::StartSearch);
        for c in "no-such-volume".chars() {
            app.apply_action(Action::InputChar(c));
        }
        let text = screen(&mut app);
        assert!(text.contains("No records to display"));
        assert!(text.contains("showing 0 of 2"));
    }

    #[test]
    fn failed_page_shows_error_panel() {
        let mut app = App::new("api");
        app.open_tab(ResourceTab::Images);
        app.apply_fetch(
            ResourceTab::Images,
            Err("GET /images returned 502 Bad Gateway".to_string()),
        );
        let text = screen(&mut app);
        assert!(text.contains("Images Error"));
        assert!(text.contains("502 Bad Gateway"));
    }

    #[test]
    fn unloaded_page_shows_loading() {
        let mut app = App::new("api");
        app.open_tab(ResourceTab::Logs);
        assert!(screen(&mut app).contains("Loading logs"));
    }

    #[test]
    fn compact_text_adds_ellipsis() {
        assert_eq!(compact_text("abcdef", 4), "abc…");
        assert_eq!(compact_text("abc", 4), "abc");
    }

    #[test]
    fn powerline_arrows_take_the_following_colour() {
        let spans = Powerline::default()
            .segment(" a ", Color::White, PL_A)
            .segment(" b ", Color::White, PL_B)
            .finish(Color::Reset);
        assert_eq!(spans.len(), 4);
        assert_eq!(spans[1].style.fg, Some(PL_A));
        assert_eq!(spans[1].style.bg, Some(PL_B));
        assert_eq!(spans[3].style.bg, Some(Color::Reset));
        assert!(Powerline::default().finish(Color::Reset).is_empty());
    }

    #[test]
    fn disk_gauge_warns_as_space_runs_out() {
        assert_eq!(disk_color(80.0), WARN);
        assert_eq!(disk_color(95.5), ERROR);
    }

    #[test]
    fn light_shades_get_dark_text() {
        assert_ne!(text_on(Color::Rgb(204, 251, 241)), Color::White);
        assert_eq!(text_on(Color::Rgb(17, 94, 89)), Color::White);
    }
}
