// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Step pattern editor row.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    widgets::{Block, Widget},
};

use super::timeline::rgb;
use crate::pattern::{Pattern, Step, PATTERN_LEN};
use crate::timing::SUB_BEATS_PER_BEAT;

/// Column offset of a slot: two cells per slot plus a gap between beats
pub fn slot_offset(index: usize) -> u16 {
    (index * 2 + index / SUB_BEATS_PER_BEAT as usize) as u16
}

fn step_symbol(step: Step) -> &'static str {
    match step {
        Step::None => "·",
        Step::Don => "D",
        Step::Ka => "K",
    }
}

/// Pattern widget showing every slot, the playing slot and the edit cursor
pub struct PatternWidget<'a> {
    pattern: &'a Pattern,
    playing: Option<usize>,
    cursor: usize,
    block: Option<Block<'a>>,
}

impl<'a> PatternWidget<'a> {
    pub fn new(pattern: &'a Pattern, cursor: usize) -> Self {
        Self {
            pattern,
            playing: None,
            cursor,
            block: None,
        }
    }

    /// Highlight the slot under the play position
    pub fn playing(mut self, index: Option<usize>) -> Self {
        self.playing = index;
        self
    }

    /// Set the block wrapper
    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = Some(block);
        self
    }
}

impl Widget for PatternWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let area = if let Some(block) = self.block {
            let inner = block.inner(area);
            block.render(area, buf);
            inner
        } else {
            area
        };
        if area.height == 0 {
            return;
        }

        for index in 0..PATTERN_LEN {
            let x = area.x + slot_offset(index);
            if x >= area.right() {
                break;
            }

            let step = self.pattern.step_at(index);
            let mut style = match step.note_kind() {
                Some(kind) => Style::default().fg(rgb(kind.color())).add_modifier(Modifier::BOLD),
                None => Style::default().fg(Color::DarkGray),
            };
            if self.playing == Some(index) {
                style = style.add_modifier(Modifier::REVERSED);
            }
            buf.set_string(x, area.y, step_symbol(step), style);

            if index == self.cursor && area.height > 1 {
                buf.set_string(x, area.y + 1, "▲", Style::default().fg(Color::Yellow));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_offsets() {
        assert_eq!(slot_offset(0), 0);
        assert_eq!(slot_offset(3), 6);
        assert_eq!(slot_offset(4), 9);
        assert_eq!(slot_offset(31), 69);
    }

    #[test]
    fn test_render_steps_and_cursor() {
        let mut raw = vec![0; PATTERN_LEN];
        raw[0] = 1;
        raw[4] = 2;
        let pattern = Pattern::from_raw(&raw);

        let area = Rect::new(0, 0, 72, 2);
        let mut buf = Buffer::empty(area);
        PatternWidget::new(&pattern, 4).playing(Some(0)).render(area, &mut buf);

        let symbols: Vec<&str> = buf.content.iter().map(|cell| cell.symbol()).collect();
        assert_eq!(symbols[0], "D");
        assert_eq!(symbols[2], "·");
        assert_eq!(symbols[9], "K");
        assert_eq!(symbols[72 + 9], "▲");
        assert!(buf.content[0].modifier.contains(Modifier::REVERSED));
    }
}
