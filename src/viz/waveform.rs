//! Oscilloscope widget for ratatui

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    widgets::{Block, Widget},
};

/// Draws a time-domain frame as a connected trace
pub struct Scope<'a> {
    samples: &'a [f32],
    style: Style,
    block: Option<Block<'a>>,
}

impl<'a> Scope<'a> {
    pub fn new(samples: &'a [f32]) -> Self {
        Self {
            samples,
            style: Style::default(),
            block: None,
        }
    }

    pub fn style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = Some(block);
        self
    }

    /// Row for a sample in [-1, 1]; +1 is the top row
    fn row_for(sample: f32, height: u16) -> u16 {
        let max_row = f32::from(height.saturating_sub(1));
        let scaled = (1.0 - sample.clamp(-1.0, 1.0)) / 2.0 * max_row;
        scaled.round() as u16
    }

    fn render_trace(&self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }

        let mid = area.y + Self::row_for(0.0, area.height);
        for x in area.left()..area.right() {
            buf.set_string(x, mid, "─", Style::default());
        }

        if self.samples.is_empty() {
            return;
        }

        let step = self.samples.len() as f32 / f32::from(area.width);
        let mut previous: Option<u16> = None;

        for col in 0..area.width {
            let idx = ((f32::from(col) * step) as usize).min(self.samples.len() - 1);
            let row = Self::row_for(self.samples[idx], area.height);
            let x = area.x + col;

            // Bridge jumps so the trace stays connected
            if let Some(prev) = previous {
                let (lo, hi) = if prev < row { (prev, row) } else { (row, prev) };
                for r in lo + 1..hi {
                    buf.set_string(x, area.y + r, "│", self.style);
                }
            }
            buf.set_string(x, area.y + row, "•", self.style);
            previous = Some(row);
        }
    }
}

impl Widget for Scope<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let inner = match &self.block {
            Some(block) => {
                let inner = block.inner(area);
                block.clone().render(area, buf);
                inner
            }
            None => area,
        };

        self.render_trace(inner, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn symbol(buf: &Buffer, x: u16, y: u16) -> &str {
        buf[(x, y)].symbol()
    }

    #[test]
    fn test_empty_frame_draws_midline() {
        let area = Rect::new(0, 0, 8, 5);
        let mut buf = Buffer::empty(area);
        Scope::new(&[]).render(area, &mut buf);

        assert_eq!(symbol(&buf, 0, 2), "─");
        assert_eq!(symbol(&buf, 7, 2), "─");
    }

    #[test]
    fn test_extremes_hit_edges() {
        let samples = [1.0, -1.0];
        let area = Rect::new(0, 0, 2, 5);
        let mut buf = Buffer::empty(area);
        Scope::new(&samples).render(area, &mut buf);

        assert_eq!(symbol(&buf, 0, 0), "•");
        assert_eq!(symbol(&buf, 1, 4), "•");
        // Bridge between the two points
        assert_eq!(symbol(&buf, 1, 2), "│");
    }

    #[test]
    fn test_zero_area_is_ignored() {
        let samples = [0.5; 4];
        let area = Rect::new(0, 0, 0, 0);
        let mut buf = Buffer::empty(Rect::new(0, 0, 1, 1));
        Scope::new(&samples).render(area, &mut buf);
    }

    #[test]
    fn test_block_shrinks_plot() {
        let samples = [0.0; 10];
        let area = Rect::new(0, 0, 12, 7);
        let mut buf = Buffer::empty(area);
        Scope::new(&samples)
            .block(Block::bordered().title("Scope"))
            .render(area, &mut buf);

        assert_eq!(symbol(&buf, 1, 3), "•");
        assert_ne!(symbol(&buf, 0, 3), "•");
    }
}
