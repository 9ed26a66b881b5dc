//! Stateless rendering: header, grid, footer, and the result overlay.

use chrono::Utc;
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
};
use sweeps_core::Coord2;

use crate::app::App;

/// Terminal columns per board cell.
pub const CELL_WIDTH: u16 = 2;

pub fn draw(frame: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(frame.area());

    draw_header(frame, chunks[0], app);
    draw_grid(frame, chunks[1], app);
    draw_footer(frame, chunks[2]);
    draw_result_overlay(frame, chunks[1], app);
}

fn draw_header(frame: &mut Frame, area: Rect, app: &App) {
    let board = app.board();
    // the engine lets flags outnumber mines; the display clamps at zero
    let remaining = board.mines_left().max(0);
    let time = format_time(app.elapsed_ms(Utc::now()));
    let best = app.best_ms().map_or_else(|| "00:00".to_string(), format_time);

    let line = Line::from(vec![
        Span::styled(
            format!(" Mines: {remaining:>3} "),
            Style::default().fg(Color::Red),
        ),
        Span::raw(format!(" Time: {time} ")),
        Span::raw(format!(" Hints: {} ", app.hints_left())),
        Span::styled(format!(" Best: {best} "), Style::default().fg(Color::Cyan)),
    ]);
    let header = Paragraph::new(line).block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!(" sweeps [{}] ", app.difficulty())),
    );
    frame.render_widget(header, area);
}

fn draw_grid(frame: &mut Frame, area: Rect, app: &mut App) {
    let cols = u16::from(app.board().cols());
    let rows = u16::from(app.board().rows());
    let rect = centered(area, cols * CELL_WIDTH, rows);
    app.set_grid_area(rect);

    let mut lines = Vec::with_capacity(rows as usize);
    for row in 0..app.board().rows() {
        let spans: Vec<Span> = (0..app.board().cols())
            .map(|col| cell_span(app, (col, row)))
            .collect();
        lines.push(Line::from(spans));
    }
    frame.render_widget(Paragraph::new(lines), rect);
}

fn cell_span(app: &App, coords: Coord2) -> Span<'static> {
    let cell = app.board().cell(coords).expect("drawn cells are in bounds");

    let (symbol, style) = if cell.is_revealed {
        if cell.is_mine {
            (
                "✶ ",
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            )
        } else if cell.adjacent > 0 {
            (
                number_symbol(cell.adjacent),
                Style::default().fg(number_color(cell.adjacent)),
            )
        } else {
            ("· ", Style::default().fg(Color::DarkGray))
        }
    } else if cell.is_flagged {
        ("⚑ ", Style::default().fg(Color::Yellow))
    } else {
        ("■ ", Style::default().fg(Color::Gray))
    };

    let style = if app.cursor() == coords {
        style.bg(Color::White).fg(Color::Black)
    } else if app.hint_target() == Some(coords) {
        style.bg(Color::Green).fg(Color::Black)
    } else {
        style
    };
    Span::styled(symbol, style)
}

const fn number_symbol(adjacent: u8) -> &'static str {
    match adjacent {
        1 => "1 ",
        2 => "2 ",
        3 => "3 ",
        4 => "4 ",
        5 => "5 ",
        6 => "6 ",
        7 => "7 ",
        _ => "8 ",
    }
}

const fn number_color(adjacent: u8) -> Color {
    match adjacent {
        1 => Color::Blue,
        2 => Color::Green,
        3 => Color::Red,
        4 => Color::Magenta,
        5 => Color::Cyan,
        6 => Color::LightMagenta,
        7 => Color::White,
        _ => Color::DarkGray,
    }
}

fn draw_footer(frame: &mut Frame, area: Rect) {
    let help = Paragraph::new(
        "arrows move | enter reveal | f flag | c chord | h hint | 1/2/3 difficulty | r restart | q quit",
    )
    .style(Style::default().fg(Color::DarkGray))
    .alignment(Alignment::Center);
    frame.render_widget(help, area);
}

fn draw_result_overlay(frame: &mut Frame, area: Rect, app: &App) {
    let board = app.board();
    let result = if board.game_over() {
        Some(("GAME OVER", Color::Red))
    } else if board.win() {
        Some(("GAME CLEAR", Color::Green))
    } else {
        None
    };
    let Some((text, color)) = result else {
        return;
    };

    let mut lines = vec![Line::styled(
        text,
        Style::default().fg(color).add_modifier(Modifier::BOLD),
    )];
    if board.win() && app.is_new_record() {
        let best = app.best_ms().unwrap_or_default();
        lines.push(Line::styled(
            format!("NEW RECORD {}", format_time(best)),
            Style::default().fg(Color::Yellow),
        ));
    }
    lines.push(Line::raw("press r to restart"));

    let rect = centered(area, 26, lines.len() as u16 + 2);
    frame.render_widget(Clear, rect);
    let overlay = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(overlay, rect);
}

/// Format milliseconds as mm:ss; minutes can exceed two digits on very long
/// games.
pub fn format_time(ms: u64) -> String {
    let total_seconds = ms / 1000;
    format!("{:02}:{:02}", total_seconds / 60, total_seconds % 60)
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    let x = area.x + (area.width - width) / 2;
    let y = area.y + (area.height - height) / 2;
    Rect::new(x, y, width, height)
}
