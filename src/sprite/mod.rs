// ┌──────────────────────────────────────────────────────────────────────────┐
// │                      Sprite Sheet Layouts                                │
// ├───────────────────┬──────────────────────────────────────────────────────┤
// │ Grid              │ fixed size cells read left to right, top to bottom   │
// │                   │ frame n -> (n % per_row, n / per_row) * frame_size   │
// │                   │ runner player walk cycle                             │
// ├───────────────────┼──────────────────────────────────────────────────────┤
// │ Atlas             │ hand placed frame origins                            │
// │                   │ frame n -> origins[n]                                │
// │                   │ moles, stars, score glyphs                           │
// └───────────────────┴──────────────────────────────────────────────────────┘
pub mod animation;

pub use self::animation::{Animation, Wrap};

use crate::engine::assets::Image;
use crate::engine::{Point, Rect, Size};

#[derive(Debug, Clone, PartialEq)]
pub enum FrameLayout {
    Grid,
    Atlas(Vec<Point>),
}

/// One image holding many frames of the same size
#[derive(Debug, Clone, PartialEq)]
pub struct SpriteSheet {
    image: Image,
    frame_size: Size,
    layout: FrameLayout,
}

impl SpriteSheet {
    pub fn grid(image: Image, frame_size: Size) -> Self {
        SpriteSheet {
            image,
            frame_size,
            layout: FrameLayout::Grid,
        }
    }

    pub fn atlas(image: Image, frame_size: Size, origins: &[(f32, f32)]) -> Self {
        SpriteSheet {
            image,
            frame_size,
            layout: FrameLayout::Atlas(origins.iter().map(|&(x, y)| Point::new(x, y)).collect()),
        }
    }

    pub fn image(&self) -> &Image {
        &self.image
    }

    pub fn frame_size(&self) -> Size {
        self.frame_size
    }

    /// Derived from the loaded image width, never below one
    pub fn frames_per_row(&self) -> usize {
        if self.frame_size.width <= 0.0 {
            return 1;
        }
        ((self.image.size.width / self.frame_size.width).floor() as usize).max(1)
    }

    pub fn frame_count(&self) -> usize {
        match &self.layout {
            FrameLayout::Grid => {
                let rows = if self.frame_size.height <= 0.0 {
                    1
                } else {
                    ((self.image.size.height / self.frame_size.height).floor() as usize).max(1)
                };
                self.frames_per_row() * rows
            }
            FrameLayout::Atlas(origins) => origins.len(),
        }
    }

    /// Top left corner of frame `index` inside the image
    pub fn frame_origin(&self, index: usize) -> Point {
        match &self.layout {
            FrameLayout::Grid => {
                let per_row = self.frames_per_row();
                Point::new(
                    (index % per_row) as f32 * self.frame_size.width,
                    (index / per_row) as f32 * self.frame_size.height,
                )
            }
            // out of range is a programming error, pin it to the last frame
            FrameLayout::Atlas(origins) => origins
                .get(index)
                .or_else(|| origins.last())
                .copied()
                .unwrap_or_default(),
        }
    }

    /// Source rectangle of `size` at frame `index`, trimmed to the image
    pub fn source_rect(&self, index: usize, size: Size) -> Rect {
        Rect::new(self.frame_origin(index), size).clamped_to(self.image.size)
    }
}
