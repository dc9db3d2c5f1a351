pub mod body;
pub mod config;
pub mod player;
pub mod scenery;
pub mod world;

use self::config::RunnerConfig;
use self::world::{RunnerImages, World};
use crate::browser;
use crate::engine::assets::{AssetEntry, Assets};
use crate::engine::input::InputState;
use crate::engine::{self, DomPanels, Game, Panels, Renderer, Size};
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::SeedableRng;

const GAME_OVER_PANEL: &str = "game-over";
// message line above the canvas, empty unless startup failed
const STATUS_PANEL: &str = "status";
const JUMP_KEY: &str = "Space";
const RESTART_KEY: &str = "Enter";

const MANIFEST: [AssetEntry; 17] = [
    AssetEntry::new("bg", "imgs/bg.png"),
    AssetEntry::new("sky", "imgs/sky.png"),
    AssetEntry::new("backdrop", "imgs/backdrop.png"),
    AssetEntry::new("backdrop2", "imgs/backdrop_ground.png"),
    AssetEntry::new("grass", "imgs/grass.png"),
    AssetEntry::new("avatar_normal", "imgs/normal_walk.png"),
    AssetEntry::new("water", "imgs/water.png"),
    AssetEntry::new("grass1", "imgs/grassMid1.png"),
    AssetEntry::new("grass2", "imgs/grassMid2.png"),
    AssetEntry::new("bridge", "imgs/bridge.png"),
    AssetEntry::new("plant", "imgs/plant.png"),
    AssetEntry::new("bush1", "imgs/bush1.png"),
    AssetEntry::new("bush2", "imgs/bush2.png"),
    AssetEntry::new("cliff", "imgs/grassCliffRight.png"),
    AssetEntry::new("spikes", "imgs/spikes.png"),
    AssetEntry::new("box", "imgs/boxCoin.png"),
    AssetEntry::new("slime", "imgs/slime.png"),
];

pub enum Runner {
    Loading,
    Loaded(Box<Track>),
}

impl Runner {
    pub fn new() -> Self {
        Runner::Loading
    }
}

impl Default for Runner {
    fn default() -> Self {
        Runner::new()
    }
}

pub struct Track {
    world: World,
    assets: Assets,
    panels: DomPanels,
}

#[async_trait(?Send)]
impl Game for Runner {
    async fn initialize(&self) -> Result<Box<dyn Game>> {
        match self {
            Runner::Loading => {
                let panels = DomPanels;
                let track = match load_track().await {
                    Ok(track) => track,
                    Err(err) => {
                        show_load_failure(&panels, &err);
                        return Err(err);
                    }
                };
                panels.hide(GAME_OVER_PANEL);
                Ok(Box::new(Runner::Loaded(Box::new(track))))
            }
            Runner::Loaded(_) => Err(anyhow!("Runner is already initialized")),
        }
    }

    fn update(&mut self, input: &mut InputState) {
        if let Runner::Loaded(track) = self {
            step(&mut track.world, input, &track.panels);
        }
    }

    fn draw(&self, renderer: &Renderer) {
        if let Runner::Loaded(track) = self {
            track.world.draw(&renderer.with_assets(&track.assets));
        }
    }
}

async fn load_track() -> Result<Track> {
    let config: RunnerConfig = engine::load_config().await?;
    let assets = Assets::load(&MANIFEST, |loaded, total| {
        log!("Runner assets {}/{}", loaded, total);
    })
    .await?;

    let canvas = browser::canvas()?;
    let view = Size::new(canvas.width() as f32, canvas.height() as f32);
    let images = RunnerImages {
        bg: assets.image("bg")?,
        sky: assets.image("sky")?,
        backdrop: assets.image("backdrop")?,
        backdrop2: assets.image("backdrop2")?,
        player: assets.image("avatar_normal")?,
    };
    let world = World::new(config, view, images, StdRng::from_entropy());

    Ok(Track {
        world,
        assets,
        panels: DomPanels,
    })
}

/// Puts the load error on the page, next to the console
fn show_load_failure(panels: &dyn Panels, err: &anyhow::Error) {
    error!("Runner failed to load : {:#}", err);
    panels.set_text(STATUS_PANEL, &format!("Loading failed : {:#}", err));
    panels.show(STATUS_PANEL);
}

/// One runner tick: the world runs while alive, after a crash Enter or a
/// click starts a fresh run
fn step(world: &mut World, input: &mut InputState, panels: &dyn Panels) {
    let clicks = input.take_clicks();
    let restart_pressed = input
        .take_key_presses()
        .iter()
        .any(|code| code == RESTART_KEY);

    if world.is_over() {
        if restart_pressed || !clicks.is_empty() {
            panels.hide(GAME_OVER_PANEL);
            world.restart();
        }
        return;
    }

    if world.update(input.is_pressed(JUMP_KEY)).is_some() {
        panels.show(GAME_OVER_PANEL);
    }
}
