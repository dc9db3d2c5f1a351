use crate::engine::assets::{AssetId, Image};
use crate::engine::{Point, Size, Surface};
use crate::runner::body::Body;

// half pixel shift keeps the tile edges crisp
const PIXEL_ALIGN: f32 = 0.5;

/// Every kind of scrolling sprite, tied to the image it is drawn with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TileKind {
    Grass,
    Grass1,
    Grass2,
    Bridge,
    Box,
    Cliff,
    Water,
    Plant,
    Bush1,
    Bush2,
    Spikes,
    Slime,
}

impl TileKind {
    pub fn asset_id(self) -> AssetId {
        match self {
            TileKind::Grass => "grass",
            TileKind::Grass1 => "grass1",
            TileKind::Grass2 => "grass2",
            TileKind::Bridge => "bridge",
            TileKind::Box => "box",
            TileKind::Cliff => "cliff",
            TileKind::Water => "water",
            TileKind::Plant => "plant",
            TileKind::Bush1 => "bush1",
            TileKind::Bush2 => "bush2",
            TileKind::Spikes => "spikes",
            TileKind::Slime => "slime",
        }
    }
}

/// Square sprite scrolling left with the world
#[derive(Debug, Clone, PartialEq)]
pub struct Tile {
    kind: TileKind,
    body: Body,
}

impl Tile {
    pub fn new(kind: TileKind, position: Point, side: f32) -> Self {
        Tile {
            kind,
            body: Body::new(position, Size::new(side, side)),
        }
    }

    pub fn kind(&self) -> TileKind {
        self.kind
    }

    pub fn body(&self) -> &Body {
        &self.body
    }

    pub fn x(&self) -> f32 {
        self.body.position.x
    }

    pub fn y(&self) -> f32 {
        self.body.position.y
    }

    pub fn set_x(&mut self, x: f32) {
        self.body.position.x = x;
    }

    pub fn update(&mut self, speed: f32) {
        self.body.dx = -speed;
        self.body.advance();
    }

    pub fn draw(&self, surface: &dyn Surface) {
        surface.save();
        surface.translate(PIXEL_ALIGN, PIXEL_ALIGN);
        surface.draw_image_at(self.kind.asset_id(), self.body.position);
        surface.restore();
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Layer {
    image: Image,
    x: f32,
    speed: f32,
}

impl Layer {
    fn new(image: Image, speed: f32) -> Self {
        Layer {
            image,
            x: 0.0,
            speed,
        }
    }

    /// snaps back once the previous pan moved the image fully off screen
    fn update(&mut self) {
        if self.x + self.image.width() <= 0.0 {
            self.x = 0.0;
        }
        self.x -= self.speed;
    }

    // two copies side by side so the seam never shows
    fn draw(&self, surface: &dyn Surface, view_width: f32) {
        surface.draw_image_at(self.image.id, Point::new(self.x, 0.0));
        surface.draw_image_at(self.image.id, Point::new(self.x + view_width, 0.0));
    }
}

/// Static backdrop plus three layers panning at different speeds
/// ┌────────────┬───────┐
/// │ Layer      │ Speed │
/// ├────────────┼───────┤
/// │ sky        │ 0.2   │
/// │ backdrop   │ 0.4   │
/// │ backdrop2  │ 0.6   │
/// └────────────┴───────┘
#[derive(Debug, Clone, PartialEq)]
pub struct Background {
    base: Image,
    layers: [Layer; 3],
    view_width: f32,
}

impl Background {
    pub fn new(base: Image, sky: Image, backdrop: Image, backdrop2: Image, view_width: f32) -> Self {
        Background {
            base,
            layers: [
                Layer::new(sky, 0.2),
                Layer::new(backdrop, 0.4),
                Layer::new(backdrop2, 0.6),
            ],
            view_width,
        }
    }

    pub fn reset(&mut self) {
        for layer in self.layers.iter_mut() {
            layer.x = 0.0;
        }
    }

    pub fn layer_offsets(&self) -> [f32; 3] {
        [self.layers[0].x, self.layers[1].x, self.layers[2].x]
    }

    pub fn update(&mut self) {
        for layer in self.layers.iter_mut() {
            layer.update();
        }
    }

    pub fn draw(&self, surface: &dyn Surface) {
        self.base.draw(surface, Point::default());
        for layer in self.layers.iter() {
            layer.draw(surface, self.view_width);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::testing::{DrawCall, RecordingSurface};
    use approx::assert_relative_eq;

    fn background() -> Background {
        Background::new(
            Image::new("bg", Size::new(800.0, 480.0)),
            Image::new("sky", Size::new(4.0, 100.0)),
            Image::new("backdrop", Size::new(800.0, 480.0)),
            Image::new("backdrop2", Size::new(800.0, 480.0)),
            800.0,
        )
    }

    #[test]
    fn test_tile_scrolls_by_speed() {
        let mut tile = Tile::new(TileKind::Grass, Point::new(100.0, 384.0), 32.0);
        tile.update(6.0);
        tile.update(6.0);
        assert_eq!(tile.x(), 88.0);
        assert_eq!(tile.y(), 384.0);
        assert_eq!(tile.body().dx, -6.0);
    }

    #[test]
    fn test_tile_draw_is_pixel_aligned() {
        let tile = Tile::new(TileKind::Slime, Point::new(40.0, 352.0), 32.0);
        let surface = RecordingSurface::default();
        tile.draw(&surface);
        assert_eq!(
            surface.calls(),
            vec![
                DrawCall::Save,
                DrawCall::Translate(0.5, 0.5),
                DrawCall::ImageAt {
                    image: "slime",
                    position: Point::new(40.0, 352.0),
                },
                DrawCall::Restore,
            ]
        );
    }

    #[test]
    fn test_layers_pan_at_their_speeds() {
        let mut background = background();
        for _ in 0..5 {
            background.update();
        }
        let [sky, backdrop, backdrop2] = background.layer_offsets();
        // the 4 px sky is still partly on screen
        assert_relative_eq!(sky, -1.0, epsilon = 1e-4);
        assert_relative_eq!(backdrop, -2.0, epsilon = 1e-4);
        assert_relative_eq!(backdrop2, -3.0, epsilon = 1e-4);
    }

    #[test]
    fn test_layer_wraps_once_off_screen() {
        let mut background = background();
        background.layers[0].x = -4.0;
        background.update();
        // reset to zero, then panned by this tick
        assert_relative_eq!(background.layer_offsets()[0], -0.2, epsilon = 1e-4);

        background.layers[0].x = -3.9;
        background.update();
        assert_relative_eq!(background.layer_offsets()[0], -4.1, epsilon = 1e-4);
    }

    #[test]
    fn test_background_draws_two_copies_per_layer() {
        let background = background();
        let surface = RecordingSurface::default();
        background.draw(&surface);
        assert_eq!(
            surface.images(),
            vec!["bg", "sky", "sky", "backdrop", "backdrop", "backdrop2", "backdrop2"]
        );
        assert_eq!(
            surface.calls()[2],
            DrawCall::ImageAt {
                image: "sky",
                position: Point::new(800.0, 0.0),
            }
        );
    }
}
