// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Transport display widget.

use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Paragraph, Widget},
};

use crate::session::{Mode, View};

/// Transport widget for displaying playback state and session settings
pub struct TransportWidget<'a> {
    view: &'a View,
    beat_flash: bool,
    block: Option<Block<'a>>,
}

impl<'a> TransportWidget<'a> {
    /// Create a new transport widget
    pub fn new(view: &'a View) -> Self {
        Self {
            view,
            beat_flash: false,
            block: None,
        }
    }

    /// Set beat flash state (for visual metronome)
    pub fn beat_flash(mut self, flash: bool) -> Self {
        self.beat_flash = flash;
        self
    }

    /// Set the block wrapper
    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = Some(block);
        self
    }
}

/// Indicator text and style for the transport state
fn indicator(view: &View) -> (String, Style) {
    if !view.running {
        return ("■ STOP".to_string(), Style::default().fg(Color::Yellow));
    }
    if let Some(remaining) = view.lead_in {
        return (
            format!("… {:.1}s", remaining),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        );
    }
    if view.demo {
        return (
            "▶ DEMO".to_string(),
            Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD),
        );
    }
    (
        "▶ PLAY".to_string(),
        Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
    )
}

/// Scroll speed label, e.g. "x1.5 (tempo)"
fn speed_label(view: &View) -> String {
    if view.scale_to_tempo {
        format!("x{:.1} (tempo)", view.speed_multiplier)
    } else {
        format!("x{:.1}", view.speed_multiplier)
    }
}

impl Widget for TransportWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let area = if let Some(block) = self.block {
            let inner = block.inner(area);
            block.render(area, buf);
            inner
        } else {
            area
        };

        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Length(10), // Play/Stop indicator
                Constraint::Length(2),  // Spacer
                Constraint::Length(11), // Tempo
                Constraint::Length(2),  // Spacer
                Constraint::Length(15), // Offset
                Constraint::Length(2),  // Spacer
                Constraint::Length(18), // Scroll speed
                Constraint::Length(2),  // Spacer
                Constraint::Length(12), // Mode
                Constraint::Length(2),  // Spacer
                Constraint::Min(0),     // Auto-randomize
            ])
            .split(area);

        let (text, style) = indicator(self.view);
        Paragraph::new(text).style(style).render(chunks[0], buf);

        let tempo_style = if self.beat_flash {
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Magenta)
        };
        Paragraph::new(format!("{:.0} BPM", self.view.bpm))
            .style(tempo_style)
            .render(chunks[2], buf);

        Paragraph::new(format!("Offset {:+.0}ms", self.view.offset * 1000.0))
            .style(Style::default().fg(Color::Cyan))
            .render(chunks[4], buf);

        Paragraph::new(format!("Speed {}", speed_label(self.view)))
            .style(Style::default().fg(Color::White))
            .render(chunks[6], buf);

        let mode_style = match self.view.mode {
            Mode::Game => Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
            Mode::Visualizer => Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
        };
        Paragraph::new(self.view.mode.to_string())
            .style(mode_style)
            .render(chunks[8], buf);

        if self.view.auto_randomize {
            Paragraph::new("AUTO-RANDOM")
                .style(Style::default().fg(Color::Yellow))
                .render(chunks[10], buf);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::NullSink;
    use crate::control::Command;
    use crate::session::Session;

    #[test]
    fn test_indicator_states() {
        let mut session = Session::default();
        assert_eq!(indicator(&session.view(0.0)).0, "■ STOP");

        session.apply(Command::ToggleTransport, 0.0).unwrap();
        session.tick(0.0, &mut NullSink);
        assert_eq!(indicator(&session.view(0.1)).0, "▶ PLAY");
    }

    #[test]
    fn test_speed_label() {
        let mut view = Session::default().view(0.0);
        assert_eq!(speed_label(&view), "x1.0 (tempo)");

        view.scale_to_tempo = false;
        view.speed_multiplier = 2.5;
        assert_eq!(speed_label(&view), "x2.5");
    }

    #[test]
    fn test_render_stopped() {
        let view = Session::default().view(0.0);
        let area = Rect::new(0, 0, 100, 1);
        let mut buf = Buffer::empty(area);
        TransportWidget::new(&view).render(area, &mut buf);

        let line: String = buf.content.iter().map(|cell| cell.symbol()).collect();
        assert!(line.contains("STOP"));
        assert!(line.contains("100 BPM"));
        assert!(line.contains("VISUALIZER"));
    }
}
