use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, Tabs, Wrap},
    Frame,
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use super::{App, ListState, Screen};
use crate::api::EventsApi;
use crate::dashboard::filter::FilterCategory;
use crate::dashboard::view::{DashboardView, EventCard};

const ACCENT: Color = Color::Cyan;
const HEADER_BG: Color = Color::DarkGray;
const SELECTED_BG: Color = Color::Rgb(40, 40, 60);
const DIM: Color = Color::DarkGray;
const WARN: Color = Color::Yellow;
/// Badge colour for interviews and exams.
const URGENT: Color = Color::Rgb(252, 165, 165);
const CALM: Color = Color::Rgb(134, 239, 172);

const SPINNER: [&str; 4] = ["|", "/", "-", "\\"];

// ─── Main render ────────────────────────────────────────────────────────────

pub fn render<C: EventsApi + 'static>(f: &mut Frame, app: &mut App<C>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(f.area());

    let spinner = SPINNER[(app.frame_count / 3) as usize % SPINNER.len()];

    match &app.screen {
        Screen::Login => render_login(f, chunks[0]),
        Screen::SigningOut => render_centered(f, chunks[0], &format!("{spinner} Signing out...")),
        Screen::Dashboard(dashboard) => {
            let view = dashboard.view();
            if view.loading {
                render_centered(f, chunks[0], &format!("{spinner} Loading..."));
            } else {
                render_dashboard(f, &mut app.card_list_state, &view, spinner, chunks[0]);
            }
        }
    }

    render_status_bar(f, app, chunks[1]);
}

fn render_centered(f: &mut Frame, area: Rect, text: &str) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(45),
            Constraint::Length(1),
            Constraint::Min(0),
        ])
        .split(area);
    f.render_widget(
        Paragraph::new(text.to_string())
            .alignment(Alignment::Center)
            .style(Style::default().fg(WARN)),
        rows[1],
    );
}

// ─── Login ──────────────────────────────────────────────────────────────────

fn render_login(f: &mut Frame, area: Rect) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(30),
            Constraint::Length(9),
            Constraint::Min(0),
        ])
        .split(area);
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(56),
            Constraint::Min(0),
        ])
        .split(rows[1]);

    let card = Paragraph::new(vec![
        Line::from(Span::styled(
            "Personal Assistant",
            Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "Automate your email tracking for interviews and exams.",
            Style::default().fg(DIM),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("l", Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)),
            Span::raw("  Sign in with Google"),
        ]),
        Line::from(vec![
            Span::styled("Enter", Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)),
            Span::raw("  Continue to dashboard"),
        ]),
    ])
    .alignment(Alignment::Center)
    .block(Block::default().borders(Borders::ALL));

    f.render_widget(card, cols[1]);
}

// ─── Status Bar ─────────────────────────────────────────────────────────────

fn render_status_bar<C>(f: &mut Frame, app: &App<C>, area: Rect) {
    let hints = match app.screen {
        Screen::Login => "  q:quit  l:sign in  Enter:continue  ",
        Screen::Dashboard(_) => "  q:quit  1-4/Tab:filter  j/k:nav  s:sync  o:open link  x:switch account  ",
        Screen::SigningOut => "  q:quit  ",
    };

    let status = Paragraph::new(Line::from(vec![
        Span::styled(" ", Style::default()),
        Span::styled(&app.status_message, Style::default().fg(Color::White)),
        Span::styled(hints, Style::default().fg(DIM)),
    ]))
    .style(Style::default().bg(HEADER_BG));

    f.render_widget(status, area);
}

// ─── Dashboard ──────────────────────────────────────────────────────────────

fn render_dashboard(
    f: &mut Frame,
    list_state: &mut ListState,
    view: &DashboardView,
    spinner: &str,
    area: Rect,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)])
        .split(area);

    render_header(f, view, spinner, chunks[0]);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(chunks[1]);

    render_cards(f, view, list_state, body[0]);
    render_detail(f, view.cards.get(list_state.selected), body[1]);
}

fn render_header(f: &mut Frame, view: &DashboardView, spinner: &str, area: Rect) {
    let titles: Vec<Line> = FilterCategory::ALL
        .iter()
        .enumerate()
        .map(|(i, c)| {
            Line::from(vec![
                Span::styled(format!(" {} ", i + 1), Style::default().fg(DIM)),
                Span::styled(format!("{} ", c.label()), Style::default().fg(Color::White)),
            ])
        })
        .collect();

    let selected = FilterCategory::ALL
        .iter()
        .position(|c| *c == view.filter)
        .unwrap_or(0);

    let tabs = Tabs::new(titles)
        .block(
            Block::default()
                .borders(Borders::BOTTOM)
                .title(" Dashboard ")
                .title_style(Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)),
        )
        .select(selected)
        .highlight_style(
            Style::default()
                .fg(ACCENT)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
        );
    f.render_widget(tabs, area);

    let sync = if view.syncing {
        Span::styled(format!("{spinner} Syncing...  "), Style::default().fg(WARN))
    } else {
        Span::styled("s: Sync Emails  ", Style::default().fg(DIM))
    };
    let who = Span::styled(
        format!("Logged in as {} ", view.user.name),
        Style::default().fg(ACCENT),
    );
    let width = (sync.width() + who.width()) as u16;
    let right = Rect {
        x: area.right().saturating_sub(width),
        y: area.y,
        width: width.min(area.width),
        height: 1,
    };
    f.render_widget(Paragraph::new(Line::from(vec![sync, who])), right);
}

fn badge_color(card: &EventCard) -> Color {
    if card.is_urgent {
        URGENT
    } else {
        CALM
    }
}

fn render_cards(f: &mut Frame, view: &DashboardView, list_state: &mut ListState, area: Rect) {
    let selected = list_state.selected;
    let company_width = (area.width as usize).saturating_sub(34).max(8);

    let mut items: Vec<ListItem> = view
        .cards
        .iter()
        .enumerate()
        .map(|(i, card)| {
            let is_selected = i == selected;
            let marker = if is_selected { "> " } else { "  " };
            let bg = if is_selected { SELECTED_BG } else { Color::Reset };
            let edge = Span::styled("▌", Style::default().fg(badge_color(card)));

            ListItem::new(vec![
                Line::from(vec![
                    edge.clone(),
                    Span::styled(marker, Style::default().fg(ACCENT)),
                    Span::styled(
                        fit(&card.company, company_width),
                        Style::default()
                            .fg(Color::White)
                            .bg(bg)
                            .add_modifier(Modifier::BOLD),
                    ),
                    Span::styled(
                        format!(" {:>14}", card.date),
                        Style::default().fg(DIM).bg(bg),
                    ),
                ]),
                Line::from(vec![
                    edge,
                    Span::raw("  "),
                    Span::styled(
                        format!(" {} ", card.type_label.to_uppercase()),
                        Style::default().fg(badge_color(card)),
                    ),
                    Span::styled(
                        card.sender.clone().map(|s| format!("  {s}")).unwrap_or_default(),
                        Style::default().fg(DIM),
                    ),
                ]),
            ])
        })
        .collect();

    if let Some(msg) = view.empty_message {
        items.push(ListItem::new(format!("  {msg}")));
    }

    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!(" Events ({}/{}) ", view.cards.len(), view.total_events))
            .title_style(Style::default().fg(ACCENT)),
    );

    // One list item per card, so the logical index is the item index.
    list_state
        .inner
        .select((!view.cards.is_empty()).then_some(selected));
    f.render_stateful_widget(list, area, &mut list_state.inner);
}

fn render_detail(f: &mut Frame, card: Option<&EventCard>, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Detail ")
        .title_style(Style::default().fg(ACCENT));

    let Some(card) = card else {
        f.render_widget(
            Paragraph::new("  Select an event to view details.").block(block),
            area,
        );
        return;
    };

    let label = Style::default().fg(DIM);
    let mut lines = vec![
        Line::from(Span::styled(
            card.company.clone(),
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        )),
        Line::from(vec![
            Span::styled(card.type_label.clone(), Style::default().fg(badge_color(card))),
            Span::styled(format!("  ({})", card.kind.label()), label),
        ]),
        Line::from(""),
        Line::from(vec![Span::styled("When:    ", label), Span::raw(card.date_time.clone())]),
    ];
    if let Some(sender) = &card.sender {
        lines.push(Line::from(vec![
            Span::styled("From:    ", label),
            Span::raw(sender.clone()),
        ]));
    }
    if let Some(link) = &card.action_link {
        lines.push(Line::from(vec![
            Span::styled("Link:    ", label),
            Span::styled(link.clone(), Style::default().fg(ACCENT)),
        ]));
    }
    if let Some(created) = &card.created {
        lines.push(Line::from(vec![
            Span::styled("Found:   ", label),
            Span::raw(created.clone()),
        ]));
    }
    if card.reminded {
        lines.push(Line::from(Span::styled("Reminder sent", label)));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(format!("id {}", card.id), label)));

    f.render_widget(
        Paragraph::new(lines).wrap(Wrap { trim: true }).block(block),
        area,
    );
}

/// Pads or truncates to exactly `width` terminal columns.
fn fit(s: &str, width: usize) -> String {
    if s.width() <= width {
        return format!("{s}{}", " ".repeat(width - s.width()));
    }
    let mut out = String::new();
    let mut used = 0;
    for ch in s.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w + 1 > width {
            break;
        }
        out.push(ch);
        used += w;
    }
    out.push('…');
    used += 1;
    out.push_str(&" ".repeat(width.saturating_sub(used)));
    out
}
