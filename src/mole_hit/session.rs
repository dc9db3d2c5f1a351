use crate::engine::assets::Image;
use crate::engine::input::InputState;
use crate::engine::{Point, Rect, Size, Surface};
use crate::mole_hit::config::MoleHitConfig;
use crate::mole_hit::entities::{Hammer, Mole, ScorePopup, Star, Variant, MOLE_WIDTH, STAR_SIZE};
use crate::sprite::SpriteSheet;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::Rng;
use std::rc::Rc;

pub const ROWS: usize = 3;
pub const COLS: usize = 3;
pub const BOARD_SIZE: Size = Size::new(750.0, 550.0);
pub const PAUSE_KEY: &str = "KeyP";

// hole positions, rows further down the lawn spread wider
const MOLE_X: [[f32; COLS]; ROWS] = [
    [130.0, 322.0, 516.0],
    [106.0, 322.0, 522.0],
    [97.0, 322.0, 544.0],
];
const MOLE_Y: [f32; ROWS] = [170.0, 262.0, 362.0];
const STAR_X_OFFSET: f32 = 10.0;

// bands of the cover image drawn over each row, so moles look like they
// come out of the ground
const COVER_BANDS: [(f32, f32); ROWS] = [(0.0, 302.0), (302.0, 100.0), (400.0, 100.0)];

const MOLE_FRAME_ROWS: [f32; 5] = [9.0, 126.0, 239.0, 348.0, 467.0];
const MOLE_FRAME_COLUMNS: [[f32; 4]; 5] = [
    [14.0, 145.0, 284.0, 415.0],
    [14.0, 145.0, 284.0, 415.0],
    [14.0, 145.0, 284.0, 415.0],
    [14.0, 145.0, 284.0, 415.0],
    [14.0, 145.0, 284.0, 418.0],
];
const STAR_FRAME_ROWS: [f32; 3] = [0.0, 72.0, 144.0];
const STAR_FRAME_COLUMNS: [f32; 4] = [0.0, 111.0, 236.0, 375.0];

// countdown glyphs on the icon sheet: (source, destination)
const COUNTDOWN_GLYPHS: [(Rect, Point); 4] = [
    (Rect::new_from_x_y(449.0, 296.0, 51.0, 87.0), Point::new(360.0, 300.0)),
    (Rect::new_from_x_y(390.0, 296.0, 54.0, 87.0), Point::new(360.0, 300.0)),
    (Rect::new_from_x_y(329.0, 296.0, 52.0, 87.0), Point::new(360.0, 300.0)),
    (Rect::new_from_x_y(15.0, 296.0, 293.0, 87.0), Point::new(245.0, 300.0)),
];
// blank second + 3, 2, 1, start
const COUNTDOWN_STEPS: f32 = 5.0;

/// Images the board is drawn from
#[derive(Debug, Clone, Copy)]
pub struct MoleHitImages {
    pub hole: Image,
    pub hole_cover: Image,
    pub mole: Image,
    pub star: Image,
    pub icon: Image,
    pub hammer: Image,
    pub time_roller: Image,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Phase {
    /// 3, 2, 1, start countdown
    Ready { elapsed_ms: f32 },
    Playing,
    Paused,
    /// waiting for a click to start the next level
    LevelCleared,
    /// waiting for a click to start over
    GameOver,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelOutcome {
    Advanced {
        level: u32,
        require_score: u32,
        final_score: u32,
    },
    Failed {
        final_score: u32,
    },
}

/// Phase changes the outside (panels, score display) reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    Started,
    LevelEnded(LevelOutcome),
    Paused,
    Resumed,
    Restarted,
}

/// Level number, score requirement and the level clock
#[derive(Debug, Clone, PartialEq)]
pub struct Level {
    number: u32,
    require_score: u32,
    elapsed_ticks: u32,
    duration_ticks: u32,
    base_require_score: u32,
    require_score_step: u32,
}

impl Level {
    pub fn new(config: &MoleHitConfig) -> Self {
        Level {
            number: 1,
            require_score: config.base_require_score,
            elapsed_ticks: 0,
            duration_ticks: config.level_ticks,
            base_require_score: config.base_require_score,
            require_score_step: config.require_score_step,
        }
    }

    pub fn number(&self) -> u32 {
        self.number
    }

    pub fn require_score(&self) -> u32 {
        self.require_score
    }

    pub fn elapsed_ticks(&self) -> u32 {
        self.elapsed_ticks
    }

    /// One playing tick. Once the clock has run past the level length the
    /// score is judged and the clock starts over.
    pub fn tick(&mut self, score: f64) -> Option<LevelOutcome> {
        if self.elapsed_ticks <= self.duration_ticks {
            self.elapsed_ticks += 1;
            return None;
        }

        self.elapsed_ticks = 0;
        let final_score = score.floor() as u32;
        if score >= f64::from(self.require_score) {
            self.number += 1;
            self.require_score += self.require_score_step;
            Some(LevelOutcome::Advanced {
                level: self.number,
                require_score: self.require_score,
                final_score,
            })
        } else {
            self.number = 1;
            self.require_score = self.base_require_score;
            Some(LevelOutcome::Failed { final_score })
        }
    }
}

/// Everything living in one hole of the lawn
#[derive(Debug, Clone)]
pub struct Hole {
    moles: [Mole; 5],
    star: Star,
    popup: ScorePopup,
}

impl Hole {
    /// occupied while any of its moles is out
    pub fn is_occupied(&self) -> bool {
        self.moles.iter().any(|mole| !mole.is_hidden())
    }

    pub fn mole(&self, variant: Variant) -> &Mole {
        &self.moles[Self::slot(variant)]
    }

    pub fn star(&self) -> &Star {
        &self.star
    }

    pub fn popup(&self) -> &ScorePopup {
        &self.popup
    }

    fn slot(variant: Variant) -> usize {
        Variant::ALL
            .iter()
            .position(|&candidate| candidate == variant)
            .unwrap_or_default()
    }

    fn update(&mut self) {
        for mole in self.moles.iter_mut() {
            mole.update();
        }
        self.star.update();
        self.popup.update();
    }

    fn reset(&mut self) {
        for mole in self.moles.iter_mut() {
            mole.reset();
        }
        self.star.hide();
        self.popup.hide();
    }
}

pub struct MoleHitSession {
    config: MoleHitConfig,
    images: MoleHitImages,
    holes: [[Hole; COLS]; ROWS],
    hammer: Hammer,
    score: f64,
    level: Level,
    phase: Phase,
    spawn_elapsed_ms: f32,
    rng: StdRng,
}

impl MoleHitSession {
    pub fn new(config: MoleHitConfig, images: MoleHitImages, rng: StdRng) -> Self {
        let mole_sheet = Rc::new(SpriteSheet::atlas(
            images.mole,
            Size::new(MOLE_WIDTH, 106.0),
            &mole_frame_origins(),
        ));
        let star_sheet = Rc::new(SpriteSheet::atlas(images.star, STAR_SIZE, &star_frame_origins()));

        let holes = [0, 1, 2].map(|row| {
            [0, 1, 2].map(|col| {
                let origin = Point::new(MOLE_X[row][col], MOLE_Y[row]);
                Hole {
                    moles: Variant::ALL
                        .map(|variant| Mole::new(variant, mole_sheet.clone(), origin, &config)),
                    star: Star::new(
                        star_sheet.clone(),
                        Point::new(origin.x + STAR_X_OFFSET, origin.y),
                        &config,
                    ),
                    popup: ScorePopup::new(images.icon.id, &config),
                }
            })
        });

        MoleHitSession {
            level: Level::new(&config),
            hammer: Hammer::new(images.hammer.id),
            score: 0.0,
            phase: Phase::Ready { elapsed_ms: 0.0 },
            spawn_elapsed_ms: 0.0,
            holes,
            images,
            config,
            rng,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn level(&self) -> &Level {
        &self.level
    }

    pub fn score(&self) -> f64 {
        self.score
    }

    /// score as shown to the player, fractions dropped
    pub fn display_score(&self) -> u32 {
        self.score.floor() as u32
    }

    pub fn hole(&self, row: usize, col: usize) -> &Hole {
        &self.holes[row][col]
    }

    /// 3x3 existence grid
    pub fn occupancy(&self) -> [[bool; COLS]; ROWS] {
        [0, 1, 2].map(|row| [0, 1, 2].map(|col| self.holes[row][col].is_occupied()))
    }

    pub fn pause(&mut self) -> Option<Notice> {
        if self.phase != Phase::Playing {
            return None;
        }
        self.phase = Phase::Paused;
        Some(Notice::Paused)
    }

    pub fn resume(&mut self) -> Option<Notice> {
        match self.phase {
            Phase::Paused | Phase::LevelCleared => {
                self.phase = Phase::Playing;
                Some(Notice::Resumed)
            }
            _ => None,
        }
    }

    /// back to the countdown with a fresh board and a zero score, the level
    /// is kept
    pub fn restart(&mut self) -> Option<Notice> {
        self.clear_board();
        self.score = 0.0;
        self.spawn_elapsed_ms = 0.0;
        self.phase = Phase::Ready { elapsed_ms: 0.0 };
        Some(Notice::Restarted)
    }

    /// One tick of the game
    /// - hammer follows the pointer in every phase
    /// - clicks resume or restart when the game is waiting for one
    /// - while playing: entities advance, clicks hit moles, the spawn and
    ///   level clocks run
    pub fn update(&mut self, input: &mut InputState) -> Option<Notice> {
        self.hammer.follow(input.pointer(), input.is_pointer_down());
        let clicks = input.take_clicks();
        let pause_pressed = input
            .take_key_presses()
            .iter()
            .any(|code| code == PAUSE_KEY);

        match self.phase {
            Phase::Ready { elapsed_ms } => {
                let elapsed_ms = elapsed_ms + self.config.tick_ms;
                if elapsed_ms >= self.config.countdown_step_ms * COUNTDOWN_STEPS {
                    self.phase = Phase::Playing;
                    self.spawn_elapsed_ms = 0.0;
                    Some(Notice::Started)
                } else {
                    self.phase = Phase::Ready { elapsed_ms };
                    None
                }
            }
            Phase::Paused => pause_pressed.then(|| self.resume()).flatten(),
            Phase::LevelCleared => (!clicks.is_empty()).then(|| self.resume()).flatten(),
            Phase::GameOver => (!clicks.is_empty()).then(|| self.restart()).flatten(),
            Phase::Playing => {
                if pause_pressed {
                    return self.pause();
                }
                self.play(&clicks)
            }
        }
    }

    fn play(&mut self, clicks: &[Point]) -> Option<Notice> {
        self.holes
            .iter_mut()
            .flatten()
            .for_each(|hole| hole.update());

        for &click in clicks {
            self.hit(click);
        }

        self.spawn_elapsed_ms += self.config.tick_ms;
        if self.spawn_elapsed_ms >= self.config.spawn_interval_ms {
            self.spawn_elapsed_ms -= self.config.spawn_interval_ms;
            self.spawn_moles();
        }

        let outcome = self.level.tick(self.score)?;
        self.end_level(outcome);
        Some(Notice::LevelEnded(outcome))
    }

    fn end_level(&mut self, outcome: LevelOutcome) {
        match outcome {
            LevelOutcome::Advanced { level, require_score, final_score } => {
                log!("Level cleared with {} points, level {} needs {}", final_score, level, require_score);
                self.phase = Phase::LevelCleared;
            }
            LevelOutcome::Failed { final_score } => {
                log!("Game over with {} points", final_score);
                self.phase = Phase::GameOver;
            }
        }
        self.score = 0.0;
        self.spawn_elapsed_ms = 0.0;
        self.clear_board();
    }

    fn clear_board(&mut self) {
        self.holes
            .iter_mut()
            .flatten()
            .for_each(|hole| hole.reset());
    }

    /// Pops 1 or 2 moles of random variants into distinct free holes
    pub fn spawn_moles(&mut self) {
        let count = self.rng.gen_range(1..=2);
        let free: Vec<(usize, usize)> = (0..ROWS)
            .flat_map(|row| (0..COLS).map(move |col| (row, col)))
            .filter(|&(row, col)| !self.holes[row][col].is_occupied())
            .collect();
        let chosen: Vec<(usize, usize)> = free
            .choose_multiple(&mut self.rng, count)
            .copied()
            .collect();

        for (row, col) in chosen {
            let variant = Variant::ALL[self.rng.gen_range(0..Variant::ALL.len())];
            self.spawn_at(row, col, variant);
        }
    }

    /// Pops `variant` out of hole (row, col) unless the hole is taken
    pub fn spawn_at(&mut self, row: usize, col: usize, variant: Variant) -> bool {
        let hole = &mut self.holes[row][col];
        if hole.is_occupied() {
            return false;
        }
        hole.moles[Hole::slot(variant)].spawn();
        true
    }

    /// Hammer strike at `point`. The first visible mole whose hit box holds
    /// the point is knocked out, its score effect applied.
    pub fn hit(&mut self, point: Point) -> Option<Variant> {
        for row in 0..ROWS {
            for col in 0..COLS {
                let hole = &mut self.holes[row][col];
                if !hole.is_occupied() {
                    continue;
                }
                let Some(mole) = hole
                    .moles
                    .iter_mut()
                    .find_map(|mole| mole.try_hit(point).then_some(mole))
                else {
                    continue;
                };
                let variant = mole.variant();
                let mole_y = mole.position().y;
                hole.star.show(mole_y);
                hole.popup.show(variant, point);
                self.score = variant.apply(self.score);
                return Some(variant);
            }
        }
        None
    }

    pub fn draw(&self, surface: &dyn Surface) {
        let board = Rect::new(Point::default(), BOARD_SIZE);
        surface.clear(&board);
        surface.draw_image_scaled(self.images.hole.id, &board);

        if let Phase::Ready { elapsed_ms } = self.phase {
            self.draw_countdown(surface, elapsed_ms);
            return;
        }

        for (row, holes) in self.holes.iter().enumerate() {
            for hole in holes.iter() {
                hole.moles.iter().for_each(|mole| mole.draw(surface));
            }
            for hole in holes.iter() {
                hole.star.draw(surface);
            }
            let (top, height) = COVER_BANDS[row];
            let band = Rect::new_from_x_y(0.0, top, BOARD_SIZE.width, height);
            surface.draw_image(self.images.hole_cover.id, &band, &band);
        }

        self.holes
            .iter()
            .flatten()
            .for_each(|hole| hole.popup.draw(surface));
        self.draw_time_roller(surface);
        self.hammer.draw(surface);
    }

    fn draw_countdown(&self, surface: &dyn Surface, elapsed_ms: f32) {
        let step = (elapsed_ms / self.config.countdown_step_ms).floor() as usize;
        // the first step only shows the empty lawn
        if let Some((frame, position)) = step.checked_sub(1).and_then(|i| COUNTDOWN_GLYPHS.get(i)) {
            surface.draw_image(
                self.images.icon.id,
                frame,
                &Rect::new(*position, frame.size),
            );
        }
    }

    /// level clock: frame, remaining time fill, glass
    fn draw_time_roller(&self, surface: &dyn Surface) {
        let roller = self.images.time_roller.id;
        let passed = self.level.elapsed_ticks() as f32 / 10.0;
        surface.draw_image(
            roller,
            &Rect::new_from_x_y(0.0, 80.0, 373.0, 68.0),
            &Rect::new_from_x_y(183.0, 149.0, 220.0, 40.0),
        );
        let fill_width = (220.0 - passed).max(0.0);
        if fill_width > 0.0 {
            surface.draw_image(
                roller,
                &Rect::new_from_x_y(0.0, 152.0, (373.0 - passed).max(0.0), 40.0),
                &Rect::new_from_x_y(182.0 + passed, 163.0, fill_width, 25.0),
            );
        }
        surface.draw_image(
            roller,
            &Rect::new_from_x_y(0.0, 0.0, 373.0, 80.0),
            &Rect::new_from_x_y(183.0, 143.0, 220.0, 51.0),
        );
    }
}

fn mole_frame_origins() -> Vec<(f32, f32)> {
    MOLE_FRAME_ROWS
        .iter()
        .zip(MOLE_FRAME_COLUMNS.iter())
        .flat_map(|(&y, columns)| columns.map(|x| (x, y)))
        .collect()
}

fn star_frame_origins() -> Vec<(f32, f32)> {
    STAR_FRAME_ROWS
        .iter()
        .flat_map(|&y| STAR_FRAME_COLUMNS.map(|x| (x, y)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::input::InputEvent;
    use crate::engine::testing::RecordingSurface;
    use crate::mole_hit::entities::MoleState;
    use approx::assert_relative_eq;
    use rand::SeedableRng;

    fn images() -> MoleHitImages {
        MoleHitImages {
            hole: Image::new("bg_hole", BOARD_SIZE),
            hole_cover: Image::new("bg_holeHide", BOARD_SIZE),
            mole: Image::new("mouse", Size::new(560.0, 600.0)),
            star: Image::new("star", Size::new(486.0, 216.0)),
            icon: Image::new("icon", Size::new(500.0, 400.0)),
            hammer: Image::new("hammer", Size::new(98.0, 77.0)),
            time_roller: Image::new("time_roller", Size::new(373.0, 192.0)),
        }
    }

    fn session(seed: u64) -> MoleHitSession {
        MoleHitSession::new(MoleHitConfig::default(), images(), StdRng::seed_from_u64(seed))
    }

    fn playing_session(seed: u64) -> MoleHitSession {
        let mut session = session(seed);
        let mut input = InputState::default();
        while session.phase() != Phase::Playing {
            session.update(&mut input);
        }
        session
    }

    /// tick until the mole in (row, col) is fully up
    fn raise(session: &mut MoleHitSession, row: usize, col: usize, variant: Variant) {
        assert!(session.spawn_at(row, col, variant));
        for _ in 0..20 {
            session.holes[row][col].update();
        }
    }

    fn aim_at(session: &MoleHitSession, row: usize, col: usize, variant: Variant) -> Point {
        let hit_box = session.hole(row, col).mole(variant).hit_box();
        Point::new(hit_box.x() + 10.0, hit_box.y() + 10.0)
    }

    fn assert_grid_matches_moles(session: &MoleHitSession) {
        let grid = session.occupancy();
        for row in 0..ROWS {
            for col in 0..COLS {
                let hole = session.hole(row, col);
                let out = Variant::ALL
                    .iter()
                    .filter(|&&variant| !hole.mole(variant).is_hidden())
                    .count();
                assert_eq!(grid[row][col], out > 0);
                assert!(out <= 1, "hole ({}, {}) has {} moles out", row, col, out);
            }
        }
    }

    #[test]
    fn test_countdown_then_play() {
        let mut session = session(1);
        let mut input = InputState::default();
        let mut notices = Vec::new();
        let mut ticks = 0;
        while session.phase() != Phase::Playing {
            if let Some(notice) = session.update(&mut input) {
                notices.push(notice);
            }
            ticks += 1;
        }
        // five one second steps at 30 ms a tick
        assert_eq!(ticks, 167);
        assert_eq!(notices, vec![Notice::Started]);
    }

    #[test]
    fn test_spawn_fills_free_holes_only() {
        let mut session = playing_session(7);
        for _ in 0..40 {
            session.spawn_moles();
            assert_grid_matches_moles(&session);
        }
        // nine holes, nothing ever sinks because no tick ran
        assert!(session.occupancy().iter().flatten().all(|&occupied| occupied));
    }

    #[test]
    fn test_spawn_at_refuses_occupied_hole() {
        let mut session = playing_session(3);
        assert!(session.spawn_at(1, 1, Variant::Bonus));
        assert!(!session.spawn_at(1, 1, Variant::Jackpot));
        assert!(session.hole(1, 1).mole(Variant::Jackpot).is_hidden());
        assert_grid_matches_moles(&session);
    }

    #[test]
    fn test_grid_tracks_moles_through_play() {
        let mut session = playing_session(11);
        let mut input = InputState::default();
        for tick in 0..1500 {
            if tick % 7 == 0 {
                let target = Point::new(150.0 + (tick % 400) as f32, 150.0 + (tick % 300) as f32);
                input.apply(InputEvent::PointerUp(target));
            }
            session.update(&mut input);
            assert_grid_matches_moles(&session);
        }
    }

    #[test]
    fn test_spawner_runs_every_two_seconds() {
        let mut session = playing_session(5);
        let mut input = InputState::default();
        // 66 ticks = 1980 ms, nothing yet
        for _ in 0..66 {
            session.update(&mut input);
        }
        assert!(session.occupancy().iter().flatten().all(|&occupied| !occupied));
        session.update(&mut input);
        let out = session.occupancy().iter().flatten().filter(|&&occupied| occupied).count();
        assert!((1..=2).contains(&out));
    }

    #[test]
    fn test_hit_scores_and_shows_feedback() {
        let mut session = playing_session(2);
        session.score = 1000.0;
        raise(&mut session, 0, 1, Variant::Jackpot);
        let aim = aim_at(&session, 0, 1, Variant::Jackpot);

        assert_eq!(session.hit(aim), Some(Variant::Jackpot));
        assert_relative_eq!(session.score(), 1500.0);

        let hole = session.hole(0, 1);
        assert!(matches!(hole.mole(Variant::Jackpot).state(), MoleState::Dead { .. }));
        assert!(hole.star().is_visible());
        assert_eq!(hole.star().position().y, hole.mole(Variant::Jackpot).position().y);
        assert_eq!(hole.popup().variant(), Some(Variant::Jackpot));
    }

    #[test]
    fn test_score_deltas_follow_variant_table() {
        let cases = [
            (Variant::Growth, 1000.0, 1200.0),
            (Variant::Bonus, 1000.0, 1100.0),
            (Variant::Jackpot, 1000.0, 1500.0),
            (Variant::Penalty, 60.0, 0.0),
            (Variant::Halving, 1001.0, 500.5),
        ];
        for (variant, before, after) in cases {
            let mut session = playing_session(9);
            session.score = before;
            raise(&mut session, 2, 2, variant);
            let aim = aim_at(&session, 2, 2, variant);
            assert_eq!(session.hit(aim), Some(variant));
            assert_relative_eq!(session.score(), after);
        }
    }

    #[test]
    fn test_display_score_rounds_down() {
        let mut session = playing_session(4);
        session.score = 1234.0;
        raise(&mut session, 1, 0, Variant::Growth);
        let aim = aim_at(&session, 1, 0, Variant::Growth);
        session.hit(aim);
        assert_relative_eq!(session.score(), 1480.8, epsilon = 1e-9);
        assert_eq!(session.display_score(), 1480);
    }

    #[test]
    fn test_knocked_out_mole_takes_no_second_hit() {
        let mut session = playing_session(3);
        session.score = 1000.0;
        raise(&mut session, 2, 0, Variant::Bonus);
        let aim = aim_at(&session, 2, 0, Variant::Bonus);

        assert_eq!(session.hit(aim), Some(Variant::Bonus));
        assert_eq!(session.hit(aim), None);
        assert_relative_eq!(session.score(), 1100.0);
    }

    #[test]
    fn test_miss_changes_nothing() {
        let mut session = playing_session(6);
        session.score = 300.0;
        raise(&mut session, 0, 0, Variant::Bonus);
        let hit_box = session.hole(0, 0).mole(Variant::Bonus).hit_box();
        // inside the sprite, below the lifted hit box
        let below = Point::new(hit_box.x() + 10.0, hit_box.bottom() + 5.0);

        assert_eq!(session.hit(below), None);
        assert_relative_eq!(session.score(), 300.0);
        assert!(matches!(
            session.hole(0, 0).mole(Variant::Bonus).state(),
            MoleState::Normal { .. }
        ));
    }

    #[test]
    fn test_click_during_play_hits() {
        let mut session = playing_session(8);
        raise(&mut session, 1, 2, Variant::Bonus);
        let aim = aim_at(&session, 1, 2, Variant::Bonus);
        let mut input = InputState::default();
        input.apply(InputEvent::PointerUp(aim));
        session.update(&mut input);
        assert!(session.score() >= 100.0);
    }

    fn run_level(session: &mut MoleHitSession, score: f64) -> LevelOutcome {
        let mut input = InputState::default();
        for _ in 0..10_000 {
            session.score = score;
            // keep the lawn empty so stray spawns cannot change the score
            session.clear_board();
            if let Some(Notice::LevelEnded(outcome)) = session.update(&mut input) {
                return outcome;
            }
        }
        panic!("level never ended");
    }

    #[test]
    fn test_level_cleared_at_requirement() {
        let mut session = playing_session(12);
        let outcome = run_level(&mut session, 2000.0);

        assert_eq!(
            outcome,
            LevelOutcome::Advanced {
                level: 2,
                require_score: 2400,
                final_score: 2000,
            }
        );
        assert_eq!(session.level().number(), 2);
        assert_eq!(session.level().require_score(), 2400);
        assert_relative_eq!(session.score(), 0.0);
        assert_eq!(session.phase(), Phase::LevelCleared);
    }

    #[test]
    fn test_level_failed_below_requirement() {
        let mut session = playing_session(13);
        run_level(&mut session, 2000.0);
        session.resume();
        let outcome = run_level(&mut session, 1999.0);

        assert_eq!(outcome, LevelOutcome::Failed { final_score: 1999 });
        assert_eq!(session.level().number(), 1);
        assert_eq!(session.level().require_score(), 2000);
        assert_relative_eq!(session.score(), 0.0);
        assert_eq!(session.phase(), Phase::GameOver);
    }

    #[test]
    fn test_level_clock_length() {
        let mut level = Level::new(&MoleHitConfig::default());
        let mut ticks = 0;
        while level.tick(0.0).is_none() {
            ticks += 1;
        }
        assert_eq!(ticks, 2101);
        assert_eq!(level.elapsed_ticks(), 0);
    }

    #[test]
    fn test_click_resumes_after_cleared_level() {
        let mut session = playing_session(14);
        run_level(&mut session, 2500.0);
        let mut input = InputState::default();
        assert_eq!(session.update(&mut input), None);
        assert_eq!(session.phase(), Phase::LevelCleared);

        input.apply(InputEvent::PointerUp(Point::new(10.0, 10.0)));
        assert_eq!(session.update(&mut input), Some(Notice::Resumed));
        assert_eq!(session.phase(), Phase::Playing);
    }

    #[test]
    fn test_click_restarts_after_game_over() {
        let mut session = playing_session(15);
        run_level(&mut session, 0.0);
        assert_eq!(session.phase(), Phase::GameOver);

        let mut input = InputState::default();
        input.apply(InputEvent::PointerUp(Point::new(10.0, 10.0)));
        assert_eq!(session.update(&mut input), Some(Notice::Restarted));
        assert_eq!(session.phase(), Phase::Ready { elapsed_ms: 0.0 });
    }

    #[test]
    fn test_restart_keeps_level_and_zeroes_score() {
        let mut session = playing_session(18);
        run_level(&mut session, 2000.0);
        assert_eq!(session.level().number(), 2);
        session.score = 700.0;
        raise(&mut session, 1, 2, Variant::Growth);

        assert_eq!(session.restart(), Some(Notice::Restarted));
        assert_eq!(session.level().number(), 2);
        assert_eq!(session.level().require_score(), 2400);
        assert_relative_eq!(session.score(), 0.0);
        assert!(!session.hole(1, 2).is_occupied());
        assert_eq!(session.phase(), Phase::Ready { elapsed_ms: 0.0 });
    }

    #[test]
    fn test_pause_freezes_everything() {
        let mut session = playing_session(16);
        raise(&mut session, 0, 0, Variant::Bonus);
        let mut input = InputState::default();
        input.apply(InputEvent::KeyDown(PAUSE_KEY.into()));
        assert_eq!(session.update(&mut input), Some(Notice::Paused));
        input.apply(InputEvent::KeyUp(PAUSE_KEY.into()));

        let before = session.hole(0, 0).mole(Variant::Bonus).position();
        let clock = session.level().elapsed_ticks();
        for _ in 0..100 {
            assert_eq!(session.update(&mut input), None);
        }
        assert_eq!(session.hole(0, 0).mole(Variant::Bonus).position(), before);
        assert_eq!(session.level().elapsed_ticks(), clock);

        input.apply(InputEvent::KeyDown(PAUSE_KEY.into()));
        assert_eq!(session.update(&mut input), Some(Notice::Resumed));
        assert_eq!(session.phase(), Phase::Playing);
    }

    #[test]
    fn test_draw_layers_rows_under_covers() {
        let mut session = playing_session(17);
        raise(&mut session, 1, 1, Variant::Bonus);
        let surface = RecordingSurface::default();
        session.draw(&surface);

        let images = surface.images();
        assert_eq!(images[0], "bg_hole");
        let mole = images.iter().position(|&id| id == "mouse").unwrap();
        let covers: Vec<usize> = images
            .iter()
            .enumerate()
            .filter(|(_, &id)| id == "bg_holeHide")
            .map(|(i, _)| i)
            .collect();
        assert_eq!(covers.len(), 3);
        // second row mole sits between the first and second cover band
        assert!(covers[0] < mole && mole < covers[1]);
        assert_eq!(images.last(), Some(&"hammer"));
    }

    #[test]
    fn test_draw_countdown_glyphs() {
        let mut session = session(18);
        let surface = RecordingSurface::default();
        session.draw(&surface);
        assert_eq!(surface.images(), vec!["bg_hole"]);

        let mut input = InputState::default();
        // 1.05 s in, the "3" glyph
        for _ in 0..35 {
            session.update(&mut input);
        }
        let surface = RecordingSurface::default();
        session.draw(&surface);
        assert_eq!(surface.images(), vec!["bg_hole", "icon"]);
    }
}
