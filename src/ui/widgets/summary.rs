// src/ui/widgets/summary.rs

use crate::app::{App, AppState};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph},
    text::Line,
};
use tls_verdict::core::report::summary::EXPIRY_WARNING_DAYS;
use tls_verdict::core::report::{Posture, Verdict};

/// Renders the summary widget: best grade, verdict tier and the aggregated checks.
///
/// Nothing is drawn inside the panel until the scan has finished.
pub fn render_summary(frame: &mut Frame, app: &App, area: Rect) {
    let summary_container = Block::default().borders(Borders::ALL).title("Summary");
    frame.render_widget(summary_container, area);

    let summary_chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3), // Grade & verdict
            Constraint::Length(1), // Spacer
            Constraint::Min(0),    // Security checks
        ])
        .split(area);

    if !matches!(app.state, AppState::Finished) {
        return;
    }

    let Some(posture) = &app.posture else {
        let text = if app.scan_error().is_some() { "Scan failed." } else { "No endpoint data." };
        frame.render_widget(
            Paragraph::new(text).alignment(Alignment::Center).style(Style::default().fg(Color::Red)),
            summary_chunks[0],
        );
        return;
    };

    // --- Grade & Verdict Section ---
    let verdict = posture.verdict();
    let verdict_style = match verdict {
        Verdict::Excellent => Style::default().fg(Color::Green),
        Verdict::Good => Style::default().fg(Color::Cyan),
        Verdict::Acceptable => Style::default().fg(Color::Yellow),
        Verdict::Poor | Verdict::VeryPoor => Style::default().fg(Color::Red),
    };
    let grade_text = Text::from(vec![
        Line::from("Overall Grade".bold()),
        Line::from(posture.best_grade.clone()).style(verdict_style.bold()),
        Line::from(verdict.to_string()).style(verdict_style),
    ]);
    frame.render_widget(Paragraph::new(grade_text).alignment(Alignment::Center), summary_chunks[0]);

    // --- Security Checks Section ---
    let checks_block = Block::default().title("SECURITY CHECKS".bold());
    frame.render_widget(Paragraph::new(check_lines(posture)).block(checks_block), summary_chunks[2]);
}

fn check_lines(posture: &Posture) -> Vec<Line<'static>> {
    let checks = [
        ("TLS 1.3 supported", posture.has_tls13),
        ("HSTS enabled", posture.has_hsts),
        ("No weak cipher suites", !posture.has_weak_ciphers),
        ("Certificate valid > 30 days", posture.min_expires_in_days > EXPIRY_WARNING_DAYS),
        ("Certificate chain clean", posture.max_chain_issues == 0),
        ("No configuration warnings", !posture.has_warnings),
    ];

    checks
        .into_iter()
        .map(|(name, passed)| {
            let (icon, style) = if passed {
                ("✓", Style::default().fg(Color::Green))
            } else {
                ("✗", Style::default().fg(Color::Red))
            };
            Line::from(vec![Span::styled(format!("{} ", icon), style), Span::raw(name)])
        })
        .collect()
}
