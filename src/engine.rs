use crate::browser;
use anyhow::{anyhow, ensure, Context, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
// web assembly is single threaded, so the loop closure is shared through
// Rc RefCell instead of a Mutex
use std::cell::RefCell;
use std::rc::Rc;
use web_sys::CanvasRenderingContext2d;

pub mod assets;
pub mod input;

use self::assets::{AssetId, Assets};
use self::input::InputState;

#[async_trait(?Send)]
pub trait Game {
    async fn initialize(&self) -> Result<Box<dyn Game>>;
    fn update(&mut self, input: &mut InputState);
    fn draw(&self, renderer: &Renderer);

    /// length of one update tick in milliseconds
    fn tick_length(&self) -> f32 {
        FRAME_SIZE
    }
}

// length of a frame in milliseconds
pub const FRAME_SIZE: f32 = 1.0 / 60.0 * 1000.0;
// backlog above this is dropped instead of replayed (hidden tab, debugger)
const MAX_BACKLOG: f32 = 250.0;
// canvas attribute naming an optional JSON config file
const CONFIG_ATTRIBUTE: &str = "data-config";

pub struct GameLoop {
    last_frame: f64,
    accumulated_delta: f32,
    tick_length: f32,
}

type SharedLoopClosure = Rc<RefCell<Option<browser::LoopClosure>>>;

impl GameLoop {
    pub async fn start(game: impl Game + 'static) -> Result<()> {
        let mut game = game.initialize().await?;
        let mut game_loop = GameLoop::new(game.tick_length(), browser::now()?)?;
        let mut input_receiver = input::prepare_input()?;
        let mut input_state = InputState::default();
        let renderer = Renderer {
            context: browser::context()?,
        };
        let f: SharedLoopClosure = Rc::new(RefCell::new(None));
        let g = f.clone();
        *g.borrow_mut() = Some(browser::create_raf_closure(move |perf: f64| {
            input::process_input(&mut input_state, &mut input_receiver);
            for _ in 0..game_loop.advance(perf) {
                game.update(&mut input_state);
            }
            game.draw(&renderer);
            if let Some(closure) = f.borrow().as_ref() {
                if let Err(err) = browser::request_animation_frame(closure) {
                    error!("GameLoop stopped : {:#}", err);
                }
            }
        }));

        browser::request_animation_frame(
            g.borrow()
                .as_ref()
                .ok_or_else(|| anyhow!("GameLoop: Loop is None"))?,
        )?;

        Ok(())
    }

    fn new(tick_length: f32, now: f64) -> Result<Self> {
        ensure!(
            tick_length > 0.0,
            "GameLoop: tick length must be positive, got {} ms",
            tick_length
        );
        Ok(GameLoop {
            last_frame: now,
            accumulated_delta: 0.0,
            tick_length,
        })
    }

    /// Update ticks owed at frame time `perf`
    fn advance(&mut self, perf: f64) -> u32 {
        self.accumulated_delta += (perf - self.last_frame) as f32;
        self.accumulated_delta = self.accumulated_delta.min(MAX_BACKLOG);
        self.last_frame = perf;
        let mut ticks = 0;
        while self.accumulated_delta > self.tick_length {
            self.accumulated_delta -= self.tick_length;
            ticks += 1;
        }
        ticks
    }
}

/// Tunables a game reads from JSON; rejected before the game starts when a
/// value would stall or break it
pub trait GameConfig: DeserializeOwned + Default {
    fn validate(&self) -> Result<()>;
}

/// Reads the game config named by the canvas `data-config` attribute, or the
/// defaults when the attribute is absent
pub async fn load_config<T: GameConfig>() -> Result<T> {
    match browser::canvas_attribute(CONFIG_ATTRIBUTE)? {
        Some(path) => {
            let config = browser::fetch_json::<T>(&path)
                .await
                .with_context(|| format!("Failed to load game config from : {}", path))?;
            config
                .validate()
                .with_context(|| format!("Invalid game config in : {}", path))?;
            Ok(config)
        }
        None => Ok(T::default()),
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Point { x, y }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub const fn new(width: f32, height: f32) -> Self {
        Size { width, height }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct Rect {
    pub position: Point,
    pub size: Size,
}

impl Rect {
    pub const fn new(position: Point, size: Size) -> Self {
        Rect { position, size }
    }

    pub const fn new_from_x_y(x: f32, y: f32, width: f32, height: f32) -> Self {
        Rect::new(Point { x, y }, Size { width, height })
    }

    pub fn x(&self) -> f32 {
        self.position.x
    }

    pub fn y(&self) -> f32 {
        self.position.y
    }

    pub fn width(&self) -> f32 {
        self.size.width
    }

    pub fn height(&self) -> f32 {
        self.size.height
    }

    pub fn right(&self) -> f32 {
        self.x() + self.width()
    }

    pub fn bottom(&self) -> f32 {
        self.y() + self.height()
    }

    pub fn is_empty(&self) -> bool {
        self.width() <= 0.0 || self.height() <= 0.0
    }

    /// Strict containment, points on the border are outside
    pub fn contains(&self, point: Point) -> bool {
        point.x > self.x() && point.y > self.y() && point.x < self.right() && point.y < self.bottom()
    }

    /// Intersection with `(0, 0, bounds)`; empty rects keep their origin
    pub fn clamped_to(&self, bounds: Size) -> Rect {
        let x = self.x().clamp(0.0, bounds.width);
        let y = self.y().clamp(0.0, bounds.height);
        let right = self.right().clamp(x, bounds.width);
        let bottom = self.bottom().clamp(y, bounds.height);
        Rect::new_from_x_y(x, y, right - x, bottom - y)
    }
}

/// 2D immediate mode drawing surface the games render into
pub trait Surface {
    fn clear(&self, rect: &Rect);
    /// blit `frame` of the image into `destination`
    fn draw_image(&self, image: AssetId, frame: &Rect, destination: &Rect);
    /// whole image stretched into `destination`
    fn draw_image_scaled(&self, image: AssetId, destination: &Rect);
    /// whole image at natural size
    fn draw_image_at(&self, image: AssetId, position: Point);
    fn fill_text(&self, text: &str, position: Point, font: &str);
    fn save(&self);
    fn restore(&self);
    fn translate(&self, x: f32, y: f32);
    fn rotate(&self, radians: f32);
}

/// On screen panels living outside the canvas (next level, game over ...)
pub trait Panels {
    fn show(&self, id: &str);
    fn hide(&self, id: &str);
    fn set_text(&self, id: &str, text: &str);
}

pub struct DomPanels;

impl Panels for DomPanels {
    fn show(&self, id: &str) {
        if let Err(err) = browser::set_visible(id, true) {
            log!("Panel unavailable : {:#}", err);
        }
    }

    fn hide(&self, id: &str) {
        if let Err(err) = browser::set_visible(id, false) {
            log!("Panel unavailable : {:#}", err);
        }
    }

    fn set_text(&self, id: &str, text: &str) {
        if let Err(err) = browser::set_text(id, text) {
            log!("Panel unavailable : {:#}", err);
        }
    }
}

pub struct Renderer {
    context: CanvasRenderingContext2d,
}

impl Renderer {
    /// Pairs the canvas with the images a game loaded, yielding a `Surface`
    pub fn with_assets<'a>(&'a self, assets: &'a Assets) -> Canvas<'a> {
        Canvas {
            context: &self.context,
            assets,
        }
    }
}

pub struct Canvas<'a> {
    context: &'a CanvasRenderingContext2d,
    assets: &'a Assets,
}

impl Canvas<'_> {
    fn report(&self, operation: &str, result: Result<(), wasm_bindgen::JsValue>) {
        if let Err(err) = result {
            error!("Canvas {} failed : {:#?}", operation, err);
        }
    }
}

impl Surface for Canvas<'_> {
    fn clear(&self, rect: &Rect) {
        self.context.clear_rect(
            rect.x().into(),
            rect.y().into(),
            rect.width().into(),
            rect.height().into(),
        );
    }

    fn draw_image(&self, image: AssetId, frame: &Rect, destination: &Rect) {
        let Some(element) = self.assets.get(image) else {
            error!("Image '{}' was never loaded", image);
            return;
        };
        let result = self
            .context
            .draw_image_with_html_image_element_and_sw_and_sh_and_dx_and_dy_and_dw_and_dh(
                element,
                frame.x().into(),
                frame.y().into(),
                frame.width().into(),
                frame.height().into(),
                destination.x().into(),
                destination.y().into(),
                destination.width().into(),
                destination.height().into(),
            );
        self.report("draw_image", result);
    }

    fn draw_image_scaled(&self, image: AssetId, destination: &Rect) {
        let Some(element) = self.assets.get(image) else {
            error!("Image '{}' was never loaded", image);
            return;
        };
        let result = self.context.draw_image_with_html_image_element_and_dw_and_dh(
            element,
            destination.x().into(),
            destination.y().into(),
            destination.width().into(),
            destination.height().into(),
        );
        self.report("draw_image_scaled", result);
    }

    fn draw_image_at(&self, image: AssetId, position: Point) {
        let Some(element) = self.assets.get(image) else {
            error!("Image '{}' was never loaded", image);
            return;
        };
        let result = self.context.draw_image_with_html_image_element(
            element,
            position.x.into(),
            position.y.into(),
        );
        self.report("draw_image_at", result);
    }

    fn fill_text(&self, text: &str, position: Point, font: &str) {
        self.context.set_font(font);
        let result = self
            .context
            .fill_text(text, position.x.into(), position.y.into());
        self.report("fill_text", result);
    }

    fn save(&self) {
        self.context.save();
    }

    fn restore(&self) {
        self.context.restore();
    }

    fn translate(&self, x: f32, y: f32) {
        let result = self.context.translate(x.into(), y.into());
        self.report("translate", result);
    }

    fn rotate(&self, radians: f32) {
        let result = self.context.rotate(radians.into());
        self.report("rotate", result);
    }
}

/// Test doubles for the drawing surface and panels
#[cfg(test)]
pub mod testing {
    use super::{AssetId, Panels, Point, Rect, Surface};
    use std::cell::RefCell;

    #[derive(Debug, Clone, PartialEq)]
    pub enum DrawCall {
        Clear(Rect),
        Image {
            image: AssetId,
            frame: Rect,
            destination: Rect,
        },
        ImageScaled {
            image: AssetId,
            destination: Rect,
        },
        ImageAt {
            image: AssetId,
            position: Point,
        },
        Text(String),
        Save,
        Restore,
        Translate(f32, f32),
        Rotate(f32),
    }

    #[derive(Default)]
    pub struct RecordingSurface {
        calls: RefCell<Vec<DrawCall>>,
    }

    impl RecordingSurface {
        pub fn calls(&self) -> Vec<DrawCall> {
            self.calls.borrow().clone()
        }

        /// every image id drawn, in order
        pub fn images(&self) -> Vec<AssetId> {
            self.calls
                .borrow()
                .iter()
                .filter_map(|call| match call {
                    DrawCall::Image { image, .. }
                    | DrawCall::ImageScaled { image, .. }
                    | DrawCall::ImageAt { image, .. } => Some(*image),
                    _ => None,
                })
                .collect()
        }

        fn record(&self, call: DrawCall) {
            self.calls.borrow_mut().push(call);
        }
    }

    impl Surface for RecordingSurface {
        fn clear(&self, rect: &Rect) {
            self.record(DrawCall::Clear(*rect));
        }

        fn draw_image(&self, image: AssetId, frame: &Rect, destination: &Rect) {
            self.record(DrawCall::Image {
                image,
                frame: *frame,
                destination: *destination,
            });
        }

        fn draw_image_scaled(&self, image: AssetId, destination: &Rect) {
            self.record(DrawCall::ImageScaled {
                image,
                destination: *destination,
            });
        }

        fn draw_image_at(&self, image: AssetId, position: Point) {
            self.record(DrawCall::ImageAt { image, position });
        }

        fn fill_text(&self, text: &str, _position: Point, _font: &str) {
            self.record(DrawCall::Text(text.to_string()));
        }

        fn save(&self) {
            self.record(DrawCall::Save);
        }

        fn restore(&self) {
            self.record(DrawCall::Restore);
        }

        fn translate(&self, x: f32, y: f32) {
            self.record(DrawCall::Translate(x, y));
        }

        fn rotate(&self, radians: f32) {
            self.record(DrawCall::Rotate(radians));
        }
    }

    #[derive(Default)]
    pub struct RecordingPanels {
        pub events: RefCell<Vec<String>>,
    }

    impl Panels for RecordingPanels {
        fn show(&self, id: &str) {
            self.events.borrow_mut().push(format!("show {}", id));
        }

        fn hide(&self, id: &str) {
            self.events.borrow_mut().push(format!("hide {}", id));
        }

        fn set_text(&self, id: &str, text: &str) {
            self.events.borrow_mut().push(format!("text {} {}", id, text));
        }
    }
}
