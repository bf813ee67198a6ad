use ratatui::layout::{Constraint, Layout};
use ratatui::style::{Color, Style, Stylize};
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;

use monkey_core::block::BlockKind;

use super::app::App;

pub fn draw(frame: &mut Frame, app: &App) {
    let [header, narration, actions, status, footer] = Layout::vertical([
        Constraint::Length(2),
        Constraint::Min(5),
        Constraint::Length(8),
        Constraint::Length(3),
        Constraint::Length(1),
    ])
    .areas(frame.area());

    let (current, total) = app.presenter.progress();
    let block = app.presenter.current_block();

    let title = app
        .presenter
        .front_matter()
        .title
        .as_deref()
        .unwrap_or("Code Monkey");
    let section = block.and_then(|b| b.section.as_deref()).unwrap_or("");
    let position = (current + 1).min(total.max(1));
    let header_line = format!(
        " {title}   [{position} / {total}]   {section}   {}",
        app.connection_label()
    );
    frame.render_widget(
        Paragraph::new(header_line)
            .style(Style::default().fg(Color::White).bold())
            .block(Block::default().borders(Borders::BOTTOM)),
        header,
    );

    let narration_text = block
        .and_then(|b| b.narration.as_deref())
        .unwrap_or("(no narration)");
    frame.render_widget(
        Paragraph::new(narration_text)
            .style(Style::default().fg(Color::White).bold())
            .wrap(Wrap { trim: false })
            .block(
                Block::default()
                    .title(" SAY ")
                    .title_style(Style::default().fg(Color::Yellow))
                    .borders(Borders::ALL),
            ),
        narration,
    );

    let action_lines: Vec<Line> = match block {
        Some(block) => match &block.kind {
            BlockKind::Action => block
                .actions
                .iter()
                .map(|a| Line::from(format!("  {a}")))
                .collect(),
            BlockKind::Pause(None) => vec![Line::from("  [PAUSE] (wait for Enter)")],
            BlockKind::Pause(Some(secs)) => {
                vec![Line::from(format!("  [PAUSE {secs}] (auto-continue)"))]
            }
            BlockKind::NarrationOnly => vec![Line::from("  (narration only)")],
        },
        None => vec![Line::from("(end of presentation)")],
    };
    frame.render_widget(
        Paragraph::new(action_lines)
            .style(Style::default().fg(Color::Cyan))
            .block(
                Block::default()
                    .title(" NEXT ")
                    .title_style(Style::default().fg(Color::Yellow))
                    .borders(Borders::ALL),
            ),
        actions,
    );

    let status_text = app.status.as_deref().unwrap_or("");
    let status_style = if status_text.contains("error") || status_text.contains("lost") {
        Style::default().fg(Color::Red)
    } else if status_text.contains("Executing") || status_text.contains("Waiting") {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::Green)
    };
    frame.render_widget(
        Paragraph::new(status_text)
            .style(status_style)
            .block(Block::default().borders(Borders::ALL)),
        status,
    );

    frame.render_widget(
        Paragraph::new("  Enter = execute   b = back   s = skip   q = quit")
            .style(Style::default().fg(Color::DarkGray)),
        footer,
    );
}
