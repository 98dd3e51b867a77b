//! UI rendering for the debugger.

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph, List, ListItem},
    style::{Color, Style, Modifier},
};
use crate::cpu::Phase;
use crate::word::Word8;
use super::app::DebuggerApp;

/// Main draw function.
pub fn draw(frame: &mut Frame, app: &DebuggerApp) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(55),
            Constraint::Percentage(45),
        ])
        .split(frame.area());

    // Left side: memory and status
    let left_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(18),
            Constraint::Length(3),
        ])
        .split(chunks[0]);

    draw_memory(frame, left_chunks[0], app);
    draw_status(frame, left_chunks[1], app);

    // Right side: registers, ring counter, output and help
    let right_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(9),
            Constraint::Length(4),
            Constraint::Min(4),
            Constraint::Length(4),
        ])
        .split(chunks[1]);

    draw_registers(frame, right_chunks[0], app);
    draw_ring_counter(frame, right_chunks[1], app);
    draw_output(frame, right_chunks[2], app);
    draw_help(frame, right_chunks[3]);
}

/// Draw the 16 memory words with their disassembly.
fn draw_memory(frame: &mut Frame, area: Rect, app: &DebuggerApp) {
    let items: Vec<ListItem> = app
        .get_disassembly()
        .into_iter()
        .map(|(addr, instr, is_pc, is_mar)| {
            let word = app.cpu.mem.read(addr);
            let prefix = if is_pc { "▶" } else { " " };
            let mar = if is_mar { "◆" } else { " " };
            let bp = if app.breakpoints.contains(&addr) { "●" } else { " " };
            let text = format!("{}{}{} {:x}: {} {:<10} {:>4}", bp, prefix, mar, addr.value(), word, instr, word.value());

            let style = if is_pc {
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
            } else if app.breakpoints.contains(&addr) {
                Style::default().fg(Color::Red)
            } else if word.is_zero() {
                Style::default().fg(Color::DarkGray)
            } else {
                Style::default()
            };

            ListItem::new(text).style(style)
        })
        .collect();

    let list = List::new(items)
        .block(Block::default()
            .title(" Memory ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Magenta)));

    frame.render_widget(list, area);
}

fn register_line(name: &str, bits: String, value: u8) -> Line<'static> {
    Line::from(vec![
        Span::raw(format!("{:<4}", name)),
        Span::styled(format!("{:>8}", bits), Style::default().fg(Color::White)),
        Span::raw(format!(" = {:>3}", value)),
    ])
}

/// Draw register state.
fn draw_registers(frame: &mut Frame, area: Rect, app: &DebuggerApp) {
    let regs = &app.cpu.regs;

    let content = vec![
        register_line("PC", format!("{:04b}", regs.pc.value()), regs.pc.value()),
        register_line("MAR", format!("{:04b}", regs.mar.value()), regs.mar.value()),
        register_line("IR", regs.ir.to_string(), regs.ir.value()),
        register_line("A", regs.a.to_string(), regs.a.value()),
        register_line("B", regs.b.to_string(), regs.b.value()),
        Line::from(vec![
            Span::raw("Cycles: "),
            Span::styled(format!("{}", app.cpu.cycles), Style::default().fg(Color::Cyan)),
            Span::raw("   Instr: "),
            Span::styled(format!("{}", app.cpu.instructions), Style::default().fg(Color::Cyan)),
            Span::raw("   State: "),
            Span::styled(format!("{:?}", app.cpu.state),
                if app.cpu.is_running() {
                    Style::default().fg(Color::Green)
                } else {
                    Style::default().fg(Color::Red)
                }),
        ]),
    ];

    let paragraph = Paragraph::new(content)
        .block(Block::default()
            .title(" Registers ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Green)));

    frame.render_widget(paragraph, area);
}

/// Draw the six ring counter stages, active one lit.
fn draw_ring_counter(frame: &mut Frame, area: Rect, app: &DebuggerApp) {
    let active = app.cpu.phase();

    let spans: Vec<Span> = Phase::ALL
        .iter()
        .map(|&phase| {
            let style = if phase == active {
                Style::default().fg(Color::Black).bg(Color::Yellow)
            } else if phase.is_fetch_cycle() {
                Style::default().fg(Color::Cyan)
            } else {
                Style::default().fg(Color::DarkGray)
            };
            Span::styled(format!(" {} ", phase.t_state()), style)
        })
        .collect();

    let paragraph = Paragraph::new(vec![
        Line::from(spans),
        Line::from(format!("{:?} ({:06b})", active, active.one_hot())),
    ])
    .block(Block::default()
        .title(" Ring Counter ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan)));

    frame.render_widget(paragraph, area);
}

/// Draw the output latch and everything displayed so far.
fn draw_output(frame: &mut Frame, area: Rect, app: &DebuggerApp) {
    let latch = match app.cpu.out.value() {
        Some(word) => Line::from(vec![
            Span::raw("Latch: "),
            Span::styled(word.to_string(), sign_style(word)),
            Span::raw(format!(" = {}", crate::cpu::SignedDisplay(word))),
        ]),
        None => Line::from("Latch: (empty)"),
    };

    let paragraph = Paragraph::new(vec![latch, Line::from(app.output.clone())])
        .block(Block::default()
            .title(" Output ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Yellow)));

    frame.render_widget(paragraph, area);
}

/// Draw status bar.
fn draw_status(frame: &mut Frame, area: Rect, app: &DebuggerApp) {
    let status = Paragraph::new(app.status.clone())
        .style(Style::default().fg(Color::White))
        .block(Block::default()
            .title(" Status ")
            .borders(Borders::ALL));

    frame.render_widget(status, area);
}

/// Draw help panel.
fn draw_help(frame: &mut Frame, area: Rect) {
    let help = Paragraph::new(vec![
        Line::from("c: Clock  s: Step  r: Run  p: Pause"),
        Line::from("b: Breakpoint  x: Reset  q: Quit"),
    ])
    .style(Style::default().fg(Color::DarkGray))
    .block(Block::default()
        .title(" Help ")
        .borders(Borders::ALL));

    frame.render_widget(help, area);
}

/// Negative words in red.
fn sign_style(word: Word8) -> Style {
    if word.is_negative() {
        Style::default().fg(Color::Red)
    } else {
        Style::default().fg(Color::Green)
    }
}
