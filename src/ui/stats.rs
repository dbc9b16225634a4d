// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Session statistics panel.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Paragraph, Widget},
};

use super::timeline::rgb;
use crate::judge::{Judgment, SessionStats, Tip};

/// Format whole seconds as mm:ss
pub fn format_elapsed(secs: u64) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// Statistics widget
pub struct StatsWidget<'a> {
    stats: &'a SessionStats,
    elapsed_secs: u64,
    tip: Option<Tip>,
    block: Option<Block<'a>>,
}

impl<'a> StatsWidget<'a> {
    pub fn new(stats: &'a SessionStats, elapsed_secs: u64) -> Self {
        Self {
            stats,
            elapsed_secs,
            tip: None,
            block: None,
        }
    }

    /// Show a coaching tip under the counters
    pub fn tip(mut self, tip: Option<Tip>) -> Self {
        self.tip = tip;
        self
    }

    /// Set the block wrapper
    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = Some(block);
        self
    }

    fn lines(&self) -> Vec<Line<'static>> {
        let label = Style::default().fg(Color::DarkGray);
        let mut lines = vec![Line::from(vec![
            Span::styled("Time  ", label),
            Span::styled(
                format_elapsed(self.elapsed_secs),
                Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
            ),
        ])];

        let counters: Vec<Span> = Judgment::ALL
            .iter()
            .flat_map(|judgment| {
                [
                    Span::styled(
                        format!("{} ", judgment),
                        Style::default().fg(rgb(judgment.color())),
                    ),
                    Span::raw(format!("{:<5}", self.stats.count(*judgment))),
                ]
            })
            .collect();
        lines.push(Line::from(counters));

        lines.push(Line::from(vec![
            Span::styled("Combo ", label),
            Span::raw(format!("{:<5}", self.stats.combo)),
            Span::styled("Max ", label),
            Span::raw(self.stats.max_combo.to_string()),
        ]));

        if let Some(tip) = self.tip {
            lines.push(Line::from(Span::styled(
                tip.to_string(),
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            )));
        }
        lines
    }
}

impl Widget for StatsWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let lines = self.lines();
        let mut paragraph = Paragraph::new(lines);
        if let Some(block) = self.block {
            paragraph = paragraph.block(block);
        }
        paragraph.render(area, buf);
    }
}
