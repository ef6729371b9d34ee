// src/ui/widgets/report_view.rs

use crate::app::{App, AppState, SPINNER_CHARS};
use ratatui::{
    prelude::*,
    text::Line,
    widgets::{Block, Borders, Paragraph, Scrollbar, ScrollbarOrientation, Wrap},
};
use tls_verdict::core::models::FilteredEndpoint;

pub fn render_report_view(frame: &mut Frame, app: &mut App, area: Rect) {
    let main_block = Block::default()
        .borders(Borders::ALL)
        .title("TLS Report (Navigate with ↑ ↓)");

    match app.state {
        AppState::Idle => {
            let p = Paragraph::new("Scan results will appear here...").alignment(Alignment::Center);
            frame.render_widget(p.block(main_block), area);
            return;
        }
        AppState::Scanning => {
            let spinner_char = SPINNER_CHARS[app.spinner_frame];
            let scan_id = app.scan_id.map(|id| id.to_string()).unwrap_or_default();
            let text = Text::from(vec![
                Line::from(vec![
                    Span::styled(format!("{} ", spinner_char), Style::default().fg(Color::Cyan)),
                    Span::raw("Assessment in progress. This usually takes a few minutes."),
                ]),
                Line::from(Span::styled(format!("Scan ID: {}", scan_id), Style::default().fg(Color::DarkGray))),
            ]);
            let p = Paragraph::new(text).alignment(Alignment::Center);
            frame.render_widget(p.block(main_block), area);
            return;
        }
        AppState::Finished => {}
    }

    let mut lines: Vec<Line<'static>> = Vec::new();
    if let Some(report) = app.report() {
        lines.push(Line::from("SUMMARY".yellow().bold()));
        lines.push(Line::from(report.summary.clone()));
        lines.push(Line::from(""));
        for endpoint in &report.endpoints {
            lines.extend(endpoint_lines(endpoint));
            lines.push(Line::from(""));
        }
    } else {
        let message = app.scan_error().unwrap_or("The scan ended without a report.");
        lines.push(Line::from("SCAN FAILED".red().bold()));
        lines.push(Line::from(message.to_string()));
    }

    let content_length = lines.len();
    let p = Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .scroll((app.scroll_offset as u16, 0))
        .block(main_block);
    frame.render_widget(p, area);

    app.report_scroll_state = app.report_scroll_state.content_length(content_length);
    frame.render_stateful_widget(
        Scrollbar::new(ScrollbarOrientation::VerticalRight),
        area,
        &mut app.report_scroll_state,
    );
}

fn endpoint_lines(ep: &FilteredEndpoint) -> Vec<Line<'static>> {
    let grade_style = match ep.grade.chars().next() {
        Some('A') => Style::default().fg(Color::Green),
        Some('B') | Some('C') => Style::default().fg(Color::Yellow),
        _ => Style::default().fg(Color::Red),
    };
    let grade = if ep.grade.is_empty() { "-".to_string() } else { ep.grade.clone() };

    let mut lines = vec![
        Line::from(vec![
            Span::styled(format!("[{}] ", grade), grade_style.bold()),
            Span::styled(ep.ip_address.clone(), Style::default().fg(Color::Cyan)),
            Span::styled(format!("  {}", ep.status_message), Style::default().fg(Color::DarkGray)),
        ]),
        Line::from(format!("  Protocols: {}", ep.protocols.join(", "))),
        Line::from(format!(
            "  Ciphers: negotiated {} bits, max {} bits{}",
            ep.negotiated_cipher_strength,
            ep.max_cipher_strength,
            if ep.has_weak_ciphers { " (weak suites enabled)" } else { "" }
        )),
        Line::from(format!("  HSTS: {}", if ep.hsts.is_empty() { "unknown" } else { ep.hsts.as_str() })),
    ];

    if let Some(cert) = &ep.certificate {
        lines.push(Line::from(format!("  Certificate: {}", cert.subject)));
        lines.push(Line::from(format!("  Issuer: {}", cert.issuer)));
        lines.push(Line::from(format!(
            "  Validity: {:.1} years, expires in {:.1} days",
            cert.validity_years, cert.expires_in_days
        )));
    }
    if !ep.server.is_empty() {
        lines.push(Line::from(format!("  Server: {}", ep.server)));
    }
    if ep.chain_issues > 0 {
        lines.push(Line::from(Span::styled(
            format!("  Chain issues: {}", ep.chain_issues),
            Style::default().fg(Color::Yellow),
        )));
    }
    lines
}
