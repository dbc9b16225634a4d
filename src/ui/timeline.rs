// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Scrolling note timeline.
//!
//! Timeline units are mapped onto terminal columns. The top row carries the
//! judgment and combo, the middle row the notes, and the bottom row the
//! countdown or idle prompt.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    widgets::{Block, Widget},
};

use crate::pattern::NoteKind;
use crate::session::View;

/// Convert an RGB triple to a terminal color
pub fn rgb((r, g, b): (u8, u8, u8)) -> Color {
    Color::Rgb(r, g, b)
}

/// Column of a timeline position, if it lands inside `area`
pub fn column(x: f64, timeline_width: f64, area: Rect) -> Option<u16> {
    if !(0.0..timeline_width).contains(&x) || area.width == 0 {
        return None;
    }
    let col = (x / timeline_width * area.width as f64) as u16;
    Some(area.x + col.min(area.width - 1))
}

/// Timeline widget
pub struct TimelineWidget<'a> {
    view: &'a View,
    block: Option<Block<'a>>,
}

impl<'a> TimelineWidget<'a> {
    pub fn new(view: &'a View) -> Self {
        Self { view, block: None }
    }

    /// Set the block wrapper
    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = Some(block);
        self
    }

    fn note_style(kind: NoteKind) -> Style {
        Style::default().fg(rgb(kind.color())).add_modifier(Modifier::BOLD)
    }

    fn render_lane(&self, area: Rect, buf: &mut Buffer) {
        let width = self.view.viewport.width;
        let y = area.y;

        buf.set_string(
            area.x,
            y,
            "─".repeat(area.width as usize),
            Style::default().fg(Color::DarkGray),
        );

        for line in &self.view.grid {
            if let Some(x) = column(line.x, width, area) {
                let (symbol, style) = if line.strong {
                    ("┃", Style::default().fg(Color::Gray))
                } else {
                    ("┆", Style::default().fg(Color::DarkGray))
                };
                buf.set_string(x, y, symbol, style);
            }
        }

        if let Some(x) = column(self.view.viewport.hit_x, width, area) {
            let style = match self.view.hit_glow {
                Some((kind, _)) => Style::default()
                    .fg(rgb(kind.color()))
                    .add_modifier(Modifier::BOLD | Modifier::REVERSED),
                None => Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
            };
            buf.set_string(x, y, "◎", style);
        }

        for note in &self.view.notes {
            if let Some(x) = column(note.x, width, area) {
                buf.set_string(x, y, "●", Self::note_style(note.kind));
            }
        }
    }

    fn render_judgment(&self, area: Rect, buf: &mut Buffer) {
        let Some(hit) = column(self.view.viewport.hit_x, self.view.viewport.width, area) else {
            return;
        };

        if let Some(display) = self.view.judgment {
            let label = display.judgment.label();
            let mut style = Style::default()
                .fg(rgb(display.judgment.color()))
                .add_modifier(Modifier::BOLD);
            if display.opacity < 0.5 {
                style = style.add_modifier(Modifier::DIM);
            }
            let start = hit.saturating_sub(label.chars().count() as u16 / 2).max(area.x);
            buf.set_string(start, area.y, label, style);
        }

        if let Some(combo) = self.view.combo {
            let text = format!("{} COMBO", combo);
            let start = hit.saturating_add(4);
            if start < area.right() {
                buf.set_string(start, area.y, text, Style::default().fg(Color::White));
            }
        }
    }

    fn render_prompt(&self, area: Rect, buf: &mut Buffer) {
        let (text, style) = match (self.view.running, self.view.lead_in) {
            (false, _) => (
                "Press SPACE to start".to_string(),
                Style::default().fg(Color::DarkGray),
            ),
            (true, Some(remaining)) => (
                format!("Get ready... {}", remaining.ceil() as u64),
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            ),
            (true, None) => return,
        };
        let len = text.chars().count() as u16;
        let start = area.x + area.width.saturating_sub(len) / 2;
        buf.set_string(start, area.y, text, style);
    }
}

impl Widget for TimelineWidget<'_> {
    fn render(mut self, area: Rect, buf: &mut Buffer) {
        let area = if let Some(block) = self.block.take() {
            let inner = block.inner(area);
            block.render(area, buf);
            inner
        } else {
            area
        };
        if area.height < 3 || area.width == 0 {
            return;
        }

        let mid = area.y + area.height / 2;
        self.render_judgment(Rect { y: mid - 1, height: 1, ..area }, buf);
        self.render_lane(Rect { y: mid, height: 1, ..area }, buf);
        self.render_prompt(Rect { y: mid + 1, height: 1, ..area }, buf);
    }
}
