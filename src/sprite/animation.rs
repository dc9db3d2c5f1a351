use crate::engine::{Point, Rect, Size, Surface};
use crate::sprite::SpriteSheet;
use std::ops::RangeInclusive;
use std::rc::Rc;

/// Where the cursor goes back to the first frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wrap {
    /// after the last frame of the sequence
    Loop,
    /// after the second to last frame, the last one is only reachable via
    /// `Animation::show` (mole dead frame)
    SkipLast,
}

/// Plays a sequence of sheet frames, one step every `cadence` ticks
///
/// ┌──────── cadence 4 ────────┐
/// │ tick   1  2  3  4  5 .. 8 │
/// │ cursor 0  0  0  1  1 .. 2 │
/// └───────────────────────────┘
#[derive(Debug, Clone)]
pub struct Animation {
    // shared, several entities play the same sheet
    sheet: Rc<SpriteSheet>,
    sequence: Vec<usize>,
    cadence: u32,
    counter: u32,
    cursor: usize,
    wrap: Wrap,
}

impl Animation {
    pub fn new(sheet: Rc<SpriteSheet>, sequence: Vec<usize>, cadence: u32) -> Self {
        debug_assert!(!sequence.is_empty(), "an animation needs at least one frame");
        Animation {
            sheet,
            sequence,
            cadence: cadence.max(1),
            counter: 0,
            cursor: 0,
            wrap: Wrap::Loop,
        }
    }

    pub fn from_range(sheet: Rc<SpriteSheet>, frames: RangeInclusive<usize>, cadence: u32) -> Self {
        Animation::new(sheet, frames.collect(), cadence)
    }

    pub fn with_wrap(mut self, wrap: Wrap) -> Self {
        self.wrap = wrap;
        self
    }

    /// called once per tick
    pub fn advance(&mut self) {
        self.counter += 1;
        if self.counter >= self.cadence {
            self.counter = 0;
            self.cursor = self.next_cursor();
        }
    }

    fn next_cursor(&self) -> usize {
        let last = match self.wrap {
            Wrap::Loop => self.sequence.len().saturating_sub(1),
            Wrap::SkipLast => self.sequence.len().saturating_sub(2),
        };
        if self.cursor >= last {
            0
        } else {
            self.cursor + 1
        }
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    /// sheet frame index under the cursor
    pub fn current_frame(&self) -> usize {
        self.sequence[self.cursor]
    }

    /// jump straight to a cursor position, clamped to the sequence
    pub fn show(&mut self, cursor: usize) {
        self.cursor = cursor.min(self.sequence.len().saturating_sub(1));
    }

    pub fn rewind(&mut self) {
        self.cursor = 0;
        self.counter = 0;
    }

    pub fn cadence(&self) -> u32 {
        self.cadence
    }

    pub fn set_cadence(&mut self, cadence: u32) {
        self.cadence = cadence.max(1);
    }

    pub fn frame_size(&self) -> Size {
        self.sheet.frame_size()
    }

    /// Blit the current frame into `destination`
    /// - the source rect takes the destination size, trimmed to the sheet
    /// - the destination shrinks by whatever was trimmed, so nothing stretches
    pub fn render(&self, surface: &dyn Surface, destination: Rect) {
        let source = self.sheet.source_rect(self.current_frame(), destination.size);
        if source.is_empty() {
            return;
        }
        let destination = Rect::new(destination.position, source.size);
        surface.draw_image(self.sheet.image().id, &source, &destination);
    }

    /// Blit the current frame at its natural size
    pub fn render_at(&self, surface: &dyn Surface, position: Point) {
        self.render(surface, Rect::new(position, self.frame_size()));
    }
}
