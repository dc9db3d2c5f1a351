use crate::engine::{Point, Size, Surface};
use crate::runner::body::Body;
use crate::runner::config::RunnerConfig;
use crate::sprite::{Animation, SpriteSheet};
use std::rc::Rc;

pub const PLAYER_SIZE: Size = Size::new(60.0, 96.0);
const START_POSITION: Point = Point::new(64.0, 250.0);
// feet sink a little into the tile they stand on
const LANDING_SINK: f32 = 5.0;

const WALK_FRAMES: std::ops::RangeInclusive<usize> = 0..=15;
// single frame poses, start and end frame are the same
const JUMP_FRAMES: std::ops::RangeInclusive<usize> = 15..=15;
const FALL_FRAMES: std::ops::RangeInclusive<usize> = 11..=11;

/// Pose picked from the vertical velocity
/// ┌─────────┬──────────┬──────────────┐
/// │ dy      │ State    │ Frames       │
/// ├─────────┼──────────┼──────────────┤
/// │ < 0     │ Jumping  │ 15           │
/// │ = 0     │ Walking  │ 0..=15 loop  │
/// │ > 0     │ Falling  │ 11           │
/// └─────────┴──────────┴──────────────┘
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerState {
    Walking,
    Jumping,
    Falling,
}

pub struct Player {
    body: Body,
    // set by the jump start, cleared on landing
    jumping: bool,
    // the world clears this whenever the player stands on a tile
    falling: bool,
    jump_counter: u32,
    jump_velocity: f32,
    jump_hold_ticks: u32,
    gravity: f32,
    walk: Animation,
    jump: Animation,
    fall: Animation,
}

impl Player {
    pub fn new(sheet: Rc<SpriteSheet>, config: &RunnerConfig) -> Self {
        Player {
            body: Body::new(START_POSITION, PLAYER_SIZE),
            jumping: false,
            falling: false,
            jump_counter: 0,
            jump_velocity: config.jump_velocity,
            jump_hold_ticks: config.jump_hold_ticks,
            gravity: config.gravity,
            walk: Animation::from_range(sheet.clone(), WALK_FRAMES, config.walk_cadence),
            jump: Animation::from_range(sheet.clone(), JUMP_FRAMES, config.walk_cadence),
            fall: Animation::from_range(sheet, FALL_FRAMES, config.walk_cadence),
        }
    }

    pub fn body(&self) -> &Body {
        &self.body
    }

    pub fn state(&self) -> PlayerState {
        if self.body.dy < 0.0 {
            PlayerState::Jumping
        } else if self.body.dy > 0.0 {
            PlayerState::Falling
        } else {
            PlayerState::Walking
        }
    }

    pub fn is_jumping(&self) -> bool {
        self.jumping
    }

    pub fn walk_cadence(&self) -> u32 {
        self.walk.cadence()
    }

    /// back on the start spot, standing still
    pub fn reset(&mut self) {
        self.body.position = START_POSITION;
        self.body.dy = 0.0;
        self.jumping = false;
        self.falling = false;
        self.jump_counter = 0;
        self.walk.rewind();
    }

    /// leg speed follows the scroll speed
    pub fn set_walk_cadence(&mut self, cadence: u32) {
        self.walk.set_cadence(cadence);
    }

    /// called before the ground check; a tile under the feet clears it again
    pub fn start_falling(&mut self) {
        self.falling = true;
    }

    /// One tick of movement
    /// - a jump only starts from standing (dy == 0) and not mid jump
    /// - holding the key keeps the jump velocity for the hold budget
    /// - gravity pulls while falling or jumping
    pub fn update(&mut self, jump_held: bool) {
        if jump_held && self.body.dy == 0.0 && !self.jumping {
            self.jumping = true;
            self.body.dy = self.jump_velocity;
            self.jump_counter = self.jump_hold_ticks;
        }

        if jump_held && self.jump_counter > 0 {
            self.body.dy = self.jump_velocity;
        }
        self.jump_counter = self.jump_counter.saturating_sub(1);

        self.body.advance();

        if self.falling || self.jumping {
            self.body.dy += self.gravity;
        }

        self.animation_mut().advance();
    }

    /// Stand on the tile whose top is at `tile_y`
    pub fn land_on(&mut self, tile_y: f32) {
        self.jumping = false;
        self.falling = false;
        self.body.position.y = tile_y - self.body.size.height + LANDING_SINK;
        self.body.dy = 0.0;
    }

    fn animation(&self) -> &Animation {
        match self.state() {
            PlayerState::Walking => &self.walk,
            PlayerState::Jumping => &self.jump,
            PlayerState::Falling => &self.fall,
        }
    }

    fn animation_mut(&mut self) -> &mut Animation {
        match self.state() {
            PlayerState::Walking => &mut self.walk,
            PlayerState::Jumping => &mut self.jump,
            PlayerState::Falling => &mut self.fall,
        }
    }

    pub fn draw(&self, surface: &dyn Surface) {
        self.animation().render_at(surface, self.body.position);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::assets::Image;
    use crate::engine::testing::{DrawCall, RecordingSurface};
    use crate::engine::Rect;

    fn player() -> Player {
        let sheet = Rc::new(SpriteSheet::grid(
            Image::new("avatar_normal", Size::new(240.0, 384.0)),
            PLAYER_SIZE,
        ));
        Player::new(sheet, &RunnerConfig::default())
    }

    #[test]
    fn test_jump_starts_only_from_standing() {
        let mut player = player();
        player.update(true);
        assert!(player.is_jumping());
        assert_eq!(player.state(), PlayerState::Jumping);
        assert_eq!(player.body().position.y, 240.0);
        // gravity already pulled once
        assert_eq!(player.body().dy, -9.0);
    }

    #[test]
    fn test_no_jump_while_falling() {
        let mut player = player();
        player.start_falling();
        player.update(false);
        assert_eq!(player.body().dy, 1.0);
        player.update(true);
        assert!(!player.is_jumping());
        assert_eq!(player.state(), PlayerState::Falling);
    }

    #[test]
    fn test_held_jump_sustained_for_hold_budget() {
        let mut player = player();
        for _ in 0..12 {
            player.update(true);
        }
        assert_eq!(player.body().position.y, 250.0 - 120.0);
        // budget spent, gravity takes over even though the key is held
        player.update(true);
        assert_eq!(player.body().position.y, 130.0 - 9.0);
        assert_eq!(player.body().dy, -8.0);
    }

    #[test]
    fn test_released_jump_stops_sustaining() {
        let mut player = player();
        player.update(true);
        player.update(false);
        assert_eq!(player.body().position.y, 240.0 - 9.0);
        assert_eq!(player.body().dy, -8.0);
        assert!(player.is_jumping());
    }

    #[test]
    fn test_no_second_jump_at_apex() {
        let mut player = player();
        for _ in 0..12 {
            player.update(true);
        }
        // rise until dy reaches zero at the top of the arc
        while player.body().dy < 0.0 {
            player.update(false);
        }
        assert_eq!(player.body().dy, 0.0);
        player.update(true);
        assert_eq!(player.body().dy, 1.0);
        assert_eq!(player.state(), PlayerState::Falling);
    }

    #[test]
    fn test_land_on_tile() {
        let mut player = player();
        player.update(true);
        player.land_on(304.0);
        assert!(!player.is_jumping());
        assert_eq!(player.state(), PlayerState::Walking);
        assert_eq!(player.body().position.y, 304.0 - 96.0 + 5.0);

        // standing still, no gravity until the next fall check
        player.update(false);
        assert_eq!(player.body().dy, 0.0);
    }

    #[test]
    fn test_pose_frames() {
        let mut player = player();
        let surface = RecordingSurface::default();
        player.update(true);
        player.draw(&surface);
        player.land_on(304.0);
        player.start_falling();
        player.update(false);
        player.update(false);
        player.draw(&surface);

        let frames: Vec<Rect> = surface
            .calls()
            .into_iter()
            .filter_map(|call| match call {
                DrawCall::Image { frame, .. } => Some(frame),
                _ => None,
            })
            .collect();
        // frame 15 and frame 11 of a 4 wide grid
        assert_eq!(frames[0], Rect::new(Point::new(180.0, 288.0), PLAYER_SIZE));
        assert_eq!(frames[1], Rect::new(Point::new(180.0, 192.0), PLAYER_SIZE));
    }

    #[test]
    fn test_reset_after_fall() {
        let mut player = player();
        player.start_falling();
        for _ in 0..10 {
            player.update(false);
        }
        player.reset();
        assert_eq!(player.body().position, Point::new(64.0, 250.0));
        assert_eq!(player.state(), PlayerState::Walking);
        player.update(true);
        assert!(player.is_jumping());
    }

    #[test]
    fn test_walk_cadence_retuned() {
        let mut player = player();
        assert_eq!(player.walk_cadence(), 4);
        player.set_walk_cadence(3);
        assert_eq!(player.walk_cadence(), 3);
    }
}
