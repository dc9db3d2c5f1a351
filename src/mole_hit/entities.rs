use crate::engine::assets::AssetId;
use crate::engine::{Point, Rect, Size, Surface};
use crate::mole_hit::config::MoleHitConfig;
use crate::sprite::{Animation, SpriteSheet, Wrap};
use std::rc::Rc;

pub const MOLE_WIDTH: f32 = 130.0;
pub const FRAMES_PER_MOLE: usize = 4;
pub const STAR_SIZE: Size = Size::new(111.0, 72.0);
pub const POPUP_SIZE: Size = Size::new(106.0, 65.0);
pub const HAMMER_SIZE: Size = Size::new(98.0, 77.0);

// the clickable area sits above the sprite origin, over the visible mound
const HIT_BOX_LIFT: f32 = 50.0;
// cursor of the "knocked out" frame, only reachable through `show`
const DEAD_FRAME: usize = 3;
const STAR_LAST_FRAME: usize = 11;
// pressed hammer pivot and swing
const SWING_OFFSET: Point = Point::new(-30.0, 44.0);
const SWING_DEGREES: f32 = 330.0;

/// The five kinds of mole, each with its own score effect
///
/// ┌──────────┬──────────────────────────┬───────┐
/// │ Variant  │ Score effect             │ Glyph │
/// ├──────────┼──────────────────────────┼───────┤
/// │ Growth   │ score + score * 0.2      │ +20%  │
/// │ Bonus    │ score + 100              │ +100  │
/// │ Jackpot  │ score + 500              │ +500  │
/// │ Penalty  │ max(score - 100, 0)      │ -100  │
/// │ Halving  │ score / 2                │ x/2   │
/// └──────────┴──────────────────────────┴───────┘
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Variant {
    Growth,
    Bonus,
    Jackpot,
    Penalty,
    Halving,
}

impl Variant {
    /// order matches the rows of the mole sheet and the hit test order
    pub const ALL: [Variant; 5] = [
        Variant::Growth,
        Variant::Bonus,
        Variant::Jackpot,
        Variant::Penalty,
        Variant::Halving,
    ];

    pub fn apply(self, score: f64) -> f64 {
        match self {
            Variant::Growth => score + score * 0.2,
            Variant::Bonus => score + 100.0,
            Variant::Jackpot => score + 500.0,
            Variant::Penalty => (score - 100.0).max(0.0),
            Variant::Halving => score / 2.0,
        }
    }

    fn sheet_row(self) -> usize {
        match self {
            Variant::Growth => 0,
            Variant::Bonus => 1,
            Variant::Jackpot => 2,
            Variant::Penalty => 3,
            Variant::Halving => 4,
        }
    }

    // the taller sprites sit higher in the hole
    fn y_offset(self) -> f32 {
        match self {
            Variant::Penalty => -12.0,
            Variant::Halving => -25.0,
            _ => 0.0,
        }
    }

    fn final_height(self) -> f32 {
        match self {
            Variant::Penalty => 120.0,
            Variant::Halving => 130.0,
            _ => 106.0,
        }
    }

    /// where the score glyph of this variant sits on the icon sheet
    pub fn glyph_origin(self) -> Point {
        match self {
            Variant::Jackpot => Point::new(5.0, 0.0),
            Variant::Halving => Point::new(111.0, 0.0),
            Variant::Penalty => Point::new(207.0, 0.0),
            Variant::Bonus => Point::new(322.0, 0.0),
            Variant::Growth => Point::new(5.0, 65.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoleState {
    Hidden,
    Normal { rising: bool },
    Dead { countdown: u32 },
}

/// ┌──────────────── State Transition Flow ──────────────────┐
/// │  From State  →  Event   →  To State                     │
/// ├─────────────────────────────────────────────────────────┤
/// │  Hidden      →  Spawn   →  Normal (rising)              │
/// │  Normal      →  Hit     →  Dead                         │
/// │  -------        ------                                  │
/// │  Normal      →  Update  →  Normal (rise, then sink)     │
/// │  Normal      →  Update  →  Hidden (sunk below the hole) │
/// │  Dead        →  Update  →  Hidden (countdown over)      │
/// └─────────────────────────────────────────────────────────┘
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    Spawn,
    Hit,
    Update,
}

#[derive(Debug, Clone)]
pub struct Mole {
    variant: Variant,
    x: f32,
    final_y: f32,
    final_height: f32,
    y: f32,
    height: f32,
    rise_speed: f32,
    dead_ticks: u32,
    state: MoleState,
    anim: Animation,
}

impl Mole {
    pub fn new(
        variant: Variant,
        sheet: Rc<SpriteSheet>,
        position: Point,
        config: &MoleHitConfig,
    ) -> Self {
        let final_y = position.y + variant.y_offset();
        let final_height = variant.final_height();
        let first = variant.sheet_row() * FRAMES_PER_MOLE;
        Mole {
            variant,
            x: position.x,
            final_y,
            final_height,
            y: final_y + final_height,
            height: 0.0,
            rise_speed: config.rise_speed,
            dead_ticks: config.dead_ticks,
            state: MoleState::Hidden,
            anim: Animation::from_range(sheet, first..=first + FRAMES_PER_MOLE - 1, config.frame_cadence)
                .with_wrap(Wrap::SkipLast),
        }
    }

    pub fn variant(&self) -> Variant {
        self.variant
    }

    pub fn state(&self) -> MoleState {
        self.state
    }

    pub fn is_hidden(&self) -> bool {
        self.state == MoleState::Hidden
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn animation(&self) -> &Animation {
        &self.anim
    }

    /// clickable region, lifted above the sprite origin
    pub fn hit_box(&self) -> Rect {
        Rect::new_from_x_y(self.x, self.y - HIT_BOX_LIFT, MOLE_WIDTH, self.height)
    }

    pub fn spawn(&mut self) {
        self.transition(Event::Spawn);
    }

    /// Knocks the mole out when it is up and `point` is inside its hit box
    pub fn try_hit(&mut self, point: Point) -> bool {
        let hittable = matches!(self.state, MoleState::Normal { .. }) && self.hit_box().contains(point);
        if hittable {
            self.transition(Event::Hit);
        }
        hittable
    }

    pub fn update(&mut self) {
        self.transition(Event::Update);
    }

    /// back below the hole, ready to be spawned again
    pub fn reset(&mut self) {
        self.state = MoleState::Hidden;
        self.y = self.final_y + self.final_height;
        self.height = 0.0;
        self.anim.rewind();
    }

    fn transition(&mut self, event: Event) {
        self.state = match (self.state, event) {
            (MoleState::Hidden, Event::Spawn) => MoleState::Normal { rising: true },
            (MoleState::Normal { .. }, Event::Hit) => {
                self.anim.show(DEAD_FRAME);
                MoleState::Dead {
                    countdown: self.dead_ticks,
                }
            }
            (MoleState::Normal { rising }, Event::Update) => self.pop(rising),
            (MoleState::Dead { countdown }, Event::Update) => match countdown.saturating_sub(1) {
                0 => {
                    self.reset();
                    MoleState::Hidden
                }
                countdown => MoleState::Dead { countdown },
            },
            // anything else (spawning a visible mole, hitting a hidden one)
            // leaves the mole as it is
            (state, _) => state,
        };
    }

    /// rise until the final height is reached, then sink back
    fn pop(&mut self, rising: bool) -> MoleState {
        let rising = rising && self.y > self.final_y;
        if rising {
            self.y -= self.rise_speed;
            self.height += self.rise_speed;
        } else {
            self.y += self.rise_speed;
            self.height -= self.rise_speed;
        }

        if self.height < 0.0 {
            // sank without being hit
            self.reset();
            MoleState::Hidden
        } else {
            self.anim.advance();
            MoleState::Normal { rising }
        }
    }

    pub fn draw(&self, surface: &dyn Surface) {
        if self.is_hidden() {
            return;
        }
        self.anim.render(
            surface,
            Rect::new_from_x_y(self.x, self.y, MOLE_WIDTH, self.height),
        );
    }
}

/// Sparkle played where a mole was hit
#[derive(Debug, Clone)]
pub struct Star {
    position: Point,
    visible: bool,
    anim: Animation,
}

impl Star {
    pub fn new(sheet: Rc<SpriteSheet>, position: Point, config: &MoleHitConfig) -> Self {
        let frames = sheet.frame_count();
        Star {
            position,
            visible: false,
            anim: Animation::from_range(sheet, 0..=frames.saturating_sub(1), config.frame_cadence),
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn position(&self) -> Point {
        self.position
    }

    /// the x position is fixed per hole, only y follows the mole
    pub fn show(&mut self, y: f32) {
        self.visible = true;
        self.position.y = y;
    }

    pub fn hide(&mut self) {
        self.visible = false;
        self.anim.rewind();
    }

    pub fn update(&mut self) {
        if !self.visible {
            return;
        }
        // the last frame got its one draw, stop here
        if self.anim.cursor() >= STAR_LAST_FRAME {
            self.hide();
        } else {
            self.anim.advance();
        }
    }

    pub fn draw(&self, surface: &dyn Surface) {
        if self.visible {
            self.anim.render(surface, Rect::new(self.position, STAR_SIZE));
        }
    }
}

/// Floating score glyph (+500, x/2 ...) shown at the click position
#[derive(Debug, Clone)]
pub struct ScorePopup {
    icon: AssetId,
    variant: Option<Variant>,
    position: Point,
    ticks_left: u32,
    duration: u32,
}

impl ScorePopup {
    pub fn new(icon: AssetId, config: &MoleHitConfig) -> Self {
        ScorePopup {
            icon,
            variant: None,
            position: Point::default(),
            ticks_left: 0,
            duration: config.popup_ticks,
        }
    }

    pub fn variant(&self) -> Option<Variant> {
        self.variant
    }

    pub fn show(&mut self, variant: Variant, position: Point) {
        self.variant = Some(variant);
        self.position = position;
        self.ticks_left = self.duration;
    }

    pub fn hide(&mut self) {
        self.variant = None;
        self.ticks_left = 0;
    }

    pub fn update(&mut self) {
        if self.variant.is_none() {
            return;
        }
        self.ticks_left = self.ticks_left.saturating_sub(1);
        if self.ticks_left == 0 {
            self.variant = None;
        }
    }

    pub fn draw(&self, surface: &dyn Surface) {
        if let Some(variant) = self.variant {
            surface.draw_image(
                self.icon,
                &Rect::new(variant.glyph_origin(), POPUP_SIZE),
                &Rect::new(self.position, POPUP_SIZE),
            );
        }
    }
}

/// Cursor replacement, swung while the pointer button is held
#[derive(Debug, Clone)]
pub struct Hammer {
    image: AssetId,
    position: Point,
    pressed: bool,
}

impl Hammer {
    pub fn new(image: AssetId) -> Self {
        Hammer {
            image,
            position: Point::new(150.0, 150.0),
            pressed: false,
        }
    }

    pub fn follow(&mut self, position: Point, pressed: bool) {
        self.position = position;
        self.pressed = pressed;
    }

    pub fn position(&self) -> Point {
        self.position
    }

    pub fn draw(&self, surface: &dyn Surface) {
        if self.pressed {
            surface.save();
            surface.translate(
                self.position.x + SWING_OFFSET.x,
                self.position.y + SWING_OFFSET.y,
            );
            surface.rotate(SWING_DEGREES.to_radians());
            surface.draw_image_scaled(self.image, &Rect::new(Point::default(), HAMMER_SIZE));
            surface.restore();
        } else {
            surface.draw_image_scaled(self.image, &Rect::new(self.position, HAMMER_SIZE));
        }
    }
}
