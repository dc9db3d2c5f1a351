use crate::engine::assets::Image;
use crate::engine::{Point, Rect, Size, Surface};
use crate::runner::config::RunnerConfig;
use crate::runner::player::{Player, PLAYER_SIZE};
use crate::runner::scenery::{Background, Tile, TileKind};
use crate::sprite::SpriteSheet;
use rand::rngs::StdRng;
use rand::Rng;
use std::collections::VecDeque;
use std::rc::Rc;

const SCORE_FONT: &str = "16px arial, sans-serif";
const SCORE_OFFSET: Point = Point::new(140.0, 30.0);
const MAX_HEIGHT_LEVEL: i32 = 4;
const START_HEIGHT_LEVEL: i32 = 2;
const START_RUN_LENGTH: i32 = 15;
// ground tiles of the opening run overlap a little
const START_TILE_OVERLAP: f32 = 3.0;
// decoration and enemies only show up once the run is under way
const ENVIRONMENT_MIN_SCORE: u32 = 40;
const ENEMY_MIN_SCORE: u32 = 100;
const ENEMY_CHANCE: f64 = 0.04;
const MAX_ENEMIES: usize = 3;

/// Images the runner world is drawn from
#[derive(Debug, Clone, Copy)]
pub struct RunnerImages {
    pub bg: Image,
    pub sky: Image,
    pub backdrop: Image,
    pub backdrop2: Image,
    pub player: Image,
}

/// Why the run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Crash {
    FellOff,
    HitEnemy,
}

/// Ground generator state: gap tiles still to skip, the height level of the
/// current run and the tiles left in it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Platform {
    gap_length: i32,
    height: i32,
    length: i32,
}

/// ┌──────────────────── Runner Tick ─────────────────────┐
/// │ 1. pan background                                    │
/// │ 2. water, environment                                │
/// │ 3. player (crash when below the canvas)              │
/// │ 4. ground, landing checks                            │
/// │ 5. enemies (crash on contact)                        │
/// │ 6. spawn step every spawn_period ticks               │
/// │ 7. speed up while airborne, once per 20 tile widths  │
/// └──────────────────────────────────────────────────────┘
pub struct World {
    config: RunnerConfig,
    view: Size,
    background: Background,
    player: Player,
    ground: VecDeque<Tile>,
    water: VecDeque<Tile>,
    environment: VecDeque<Tile>,
    enemies: VecDeque<Tile>,
    platform: Platform,
    speed: u32,
    score: u32,
    ticker: u32,
    crash: Option<Crash>,
    rng: StdRng,
}

impl World {
    pub fn new(config: RunnerConfig, view: Size, images: RunnerImages, rng: StdRng) -> Self {
        let sheet = Rc::new(SpriteSheet::grid(images.player, PLAYER_SIZE));
        let mut world = World {
            background: Background::new(
                images.bg,
                images.sky,
                images.backdrop,
                images.backdrop2,
                view.width,
            ),
            player: Player::new(sheet, &config),
            ground: VecDeque::new(),
            water: VecDeque::new(),
            environment: VecDeque::new(),
            enemies: VecDeque::new(),
            platform: Platform {
                gap_length: 0,
                height: START_HEIGHT_LEVEL,
                length: START_RUN_LENGTH,
            },
            speed: config.start_speed,
            score: 0,
            ticker: 0,
            crash: None,
            view,
            config,
            rng,
        };
        world.restart();
        world
    }

    /// Fresh run: flat grass under the player, full water strip, start speed
    pub fn restart(&mut self) {
        let side = self.config.platform_width;
        self.ground.clear();
        self.water.clear();
        self.environment.clear();
        self.enemies.clear();
        self.platform = Platform {
            gap_length: 0,
            height: START_HEIGHT_LEVEL,
            length: START_RUN_LENGTH,
        };
        self.speed = self.config.start_speed;
        self.player.set_walk_cadence(self.config.walk_cadence);
        self.player.reset();
        self.score = 0;
        self.ticker = 0;
        self.crash = None;

        let ground_y = self.ground_y();
        for i in 0..self.config.start_ground_tiles {
            let x = i as f32 * (side - START_TILE_OVERLAP);
            self.ground
                .push_back(Tile::new(TileKind::Grass, Point::new(x, ground_y), side));
        }

        let water_tiles = (self.view.width / side + 2.0).ceil() as usize;
        for i in 0..water_tiles {
            self.water.push_back(Tile::new(
                TileKind::Water,
                Point::new(i as f32 * side, self.platform_base()),
                side,
            ));
        }

        self.background.reset();
        log!("Runner started");
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn speed(&self) -> u32 {
        self.speed
    }

    pub fn crash(&self) -> Option<Crash> {
        self.crash
    }

    pub fn is_over(&self) -> bool {
        self.crash.is_some()
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn ground(&self) -> &VecDeque<Tile> {
        &self.ground
    }

    pub fn water(&self) -> &VecDeque<Tile> {
        &self.water
    }

    pub fn environment(&self) -> &VecDeque<Tile> {
        &self.environment
    }

    pub fn enemies(&self) -> &VecDeque<Tile> {
        &self.enemies
    }

    pub fn score_text(&self) -> String {
        format!("Score: {}m", self.score)
    }

    fn platform_base(&self) -> f32 {
        self.view.height - self.config.platform_width
    }

    /// top of a ground tile at the current height level
    fn ground_y(&self) -> f32 {
        self.platform_base() - self.platform.height as f32 * self.config.platform_spacer
    }

    /// new sprites appear just past the right edge
    fn spawn_x(&self) -> f32 {
        self.view.width + self.config.platform_width % self.speed as f32
    }

    /// Runs one tick; does nothing once the run has crashed
    pub fn update(&mut self, jump_held: bool) -> Option<Crash> {
        if self.crash.is_some() {
            return None;
        }

        self.background.update();
        self.update_water();
        self.update_environment();

        self.player.update(jump_held);
        let player_bottom = self.player.body().position.y + self.player.body().size.height;
        if player_bottom >= self.view.height {
            return self.end(Crash::FellOff);
        }

        self.update_ground();
        if self.update_enemies() {
            return self.end(Crash::HitEnemy);
        }

        let period = self.config.spawn_period(self.speed);
        if self.ticker % period == 0 {
            self.spawn_sprites();
        }

        let speed_up_at = period * self.speed * 20;
        if self.ticker > speed_up_at && self.player.body().dy != 0.0 {
            self.increase_speed();
        }

        self.ticker += 1;
        None
    }

    fn end(&mut self, crash: Crash) -> Option<Crash> {
        log!("Runner over after {}m : {:?}", self.score, crash);
        self.crash = Some(crash);
        Some(crash)
    }

    fn update_water(&mut self) {
        let speed = self.speed as f32;
        let side = self.config.platform_width;
        self.water.iter_mut().for_each(|tile| tile.update(speed));

        // recycle the tile that left on the left behind the last one
        if self.water.front().map_or(false, |tile| tile.x() < -side) {
            if let Some(mut tile) = self.water.pop_front() {
                let last_x = self.water.back().map_or(0.0, |last| last.x());
                tile.set_x(last_x + side);
                self.water.push_back(tile);
            }
        }
    }

    fn update_environment(&mut self) {
        let speed = self.speed as f32;
        self.environment.iter_mut().for_each(|tile| tile.update(speed));
        Self::drop_passed(&mut self.environment, self.config.platform_width);
    }

    fn update_ground(&mut self) {
        let speed = self.speed as f32;
        let reach = self.player.body().size.height / 2.0 + self.config.platform_width / 2.0;

        self.player.start_falling();
        for tile in self.ground.iter_mut() {
            tile.update(speed);
            let body = self.player.body();
            if body.min_dist(tile.body()) <= reach {
                let bearing = body.bearing_degrees(tile.body());
                if bearing > -130.0 && bearing < -50.0 {
                    self.player.land_on(tile.y());
                }
            }
        }
        Self::drop_passed(&mut self.ground, self.config.platform_width);
    }

    /// true once the player touched an enemy
    fn update_enemies(&mut self) -> bool {
        let speed = self.speed as f32;
        let reach = self.player.body().size.width - self.config.platform_width / 2.0;
        let mut hit = false;
        for enemy in self.enemies.iter_mut() {
            enemy.update(speed);
            if self.player.body().min_dist(enemy.body()) <= reach {
                hit = true;
            }
        }
        Self::drop_passed(&mut self.enemies, self.config.platform_width);
        hit
    }

    // a speed change moves the spawn point by a few pixels; never let a new
    // tile land in front of the last one
    fn push_ordered(queue: &mut VecDeque<Tile>, mut tile: Tile) {
        if let Some(last) = queue.back() {
            tile.set_x(tile.x().max(last.x()));
        }
        queue.push_back(tile);
    }

    // at most one per tick, the queue is ordered by x
    fn drop_passed(queue: &mut VecDeque<Tile>, side: f32) {
        if queue.front().map_or(false, |tile| tile.x() < -side) {
            queue.pop_front();
        }
    }

    /// Ground generator step
    /// - skip the pending gap first
    /// - then lay the tiles of the current run, with decoration and enemies
    /// - then roll the next gap, height level and run length
    fn spawn_sprites(&mut self) {
        self.score += 1;

        if self.platform.gap_length > 0 {
            self.platform.gap_length -= 1;
        } else if self.platform.length > 0 {
            self.push_ground_tile();
            self.spawn_environment();
            self.spawn_enemy();
        } else {
            let speed = self.speed as i32;
            let height = self.platform.height;
            self.platform.gap_length = self.rng.gen_range((speed - 2)..=speed);
            let step_up = self.rng.gen_range(0..=2);
            self.platform.height = self
                .rng
                .gen_range(0..=height + step_up)
                .clamp(0, MAX_HEIGHT_LEVEL);
            self.platform.length = self.rng.gen_range((speed / 2)..=speed * 4);
        }
    }

    fn push_ground_tile(&mut self) {
        let kind = self.ground_kind();
        let tile = Tile::new(
            kind,
            Point::new(self.spawn_x(), self.ground_y()),
            self.config.platform_width,
        );
        Self::push_ordered(&mut self.ground, tile);
        self.platform.length -= 1;
    }

    /// Tile kind by height level; the last tile of a low run may be a cliff
    fn ground_kind(&mut self) -> TileKind {
        let kind = match self.platform.height {
            0 | 1 => {
                if self.rng.gen_bool(0.5) {
                    TileKind::Grass1
                } else {
                    TileKind::Grass2
                }
            }
            2 => TileKind::Grass,
            3 => TileKind::Bridge,
            _ => TileKind::Box,
        };
        if self.platform.length == 1 && self.platform.height < 3 && self.rng.gen_range(0..=3) == 0 {
            TileKind::Cliff
        } else {
            kind
        }
    }

    fn spawn_environment(&mut self) {
        if self.score <= ENVIRONMENT_MIN_SCORE
            || self.rng.gen_range(0..=20) != 0
            || self.platform.height >= 3
        {
            return;
        }
        let side = self.config.platform_width;
        let y = self.ground_y() - side;
        let x = self.spawn_x();
        if self.rng.gen_bool(0.5) {
            Self::push_ordered(
                &mut self.environment,
                Tile::new(TileKind::Plant, Point::new(x, y), side),
            );
        } else if self.platform.length > 2 {
            Self::push_ordered(
                &mut self.environment,
                Tile::new(TileKind::Bush1, Point::new(x, y), side),
            );
            Self::push_ordered(
                &mut self.environment,
                Tile::new(TileKind::Bush2, Point::new(x + side, y), side),
            );
        }
    }

    fn spawn_enemy(&mut self) {
        let side = self.config.platform_width;
        if self.score <= ENEMY_MIN_SCORE
            || !self.rng.gen_bool(ENEMY_CHANCE)
            || self.enemies.len() >= MAX_ENEMIES
            || self.platform.length <= 5
        {
            return;
        }
        // keep enemies three tiles apart, or close enough to read as a pair
        let spaced = self.enemies.back().map_or(true, |last| {
            let distance = self.view.width - last.x();
            distance >= side * 3.0 || distance < side
        });
        if !spaced {
            return;
        }
        let kind = if self.rng.gen_bool(0.5) {
            TileKind::Spikes
        } else {
            TileKind::Slime
        };
        let position = Point::new(self.spawn_x(), self.ground_y() - side);
        Self::push_ordered(&mut self.enemies, Tile::new(kind, position, side));
    }

    /// One step faster up to the cap, legs retuned to the new speed, and a
    /// filler tile so the speed change does not open a gap
    fn increase_speed(&mut self) {
        self.speed = (self.speed + 1).min(self.config.max_speed);
        let cadence = self.config.spawn_period(self.speed).saturating_sub(1);
        self.player.set_walk_cadence(cadence);
        self.ticker = 0;
        log!("Runner speed {}", self.speed);

        if self.platform.gap_length == 0 {
            self.push_ground_tile();
        }
    }

    pub fn draw(&self, surface: &dyn Surface) {
        surface.clear(&Rect::new(Point::default(), self.view));
        self.background.draw(surface);
        self.water.iter().for_each(|tile| tile.draw(surface));
        self.environment.iter().for_each(|tile| tile.draw(surface));
        self.player.draw(surface);
        self.ground.iter().for_each(|tile| tile.draw(surface));
        self.enemies.iter().for_each(|tile| tile.draw(surface));
        surface.fill_text(
            &self.score_text(),
            Point::new(self.view.width - SCORE_OFFSET.x, SCORE_OFFSET.y),
            SCORE_FONT,
        );
    }
}
