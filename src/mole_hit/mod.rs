pub mod config;
pub mod entities;
pub mod session;

use self::config::MoleHitConfig;
use self::session::{LevelOutcome, MoleHitImages, MoleHitSession, Notice};
use crate::engine::assets::{AssetEntry, Assets};
use crate::engine::input::InputState;
use crate::engine::{self, DomPanels, Game, Panels, Renderer};
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::SeedableRng;

// ids of the HTML panels around the canvas
mod panel {
    pub const PROGRESS: &str = "progressText";
    pub const SCORE: &str = "number";
    pub const NEXT_LEVEL: &str = "nextLoding";
    pub const CURRENT_SCORE: &str = "currentScore";
    pub const REQUIRE_SCORE: &str = "requireScore";
    pub const GAME_OVER: &str = "gameOver";
    pub const FINAL_SCORE: &str = "score";
}

const MANIFEST: [AssetEntry; 7] = [
    AssetEntry::new("hammer", "images/hammer.png"),
    AssetEntry::new("bg_hole", "images/bg_canvas.png"),
    AssetEntry::new("bg_holeHide", "images/bg_hole.png"),
    AssetEntry::new("mouse", "images/mouse.png"),
    AssetEntry::new("star", "images/star.png"),
    AssetEntry::new("icon", "images/icon.png"),
    AssetEntry::new("time_roller", "images/time_roller.png"),
];

/// ┌──────────────── Mole Hit Lifecycle ─────────────────┐
/// │  Loading  ── assets + config ──►  Loaded(Board)     │
/// │                                                     │
/// │  Board::update                                      │
/// │    └─► session.update(input) ─► Option<Notice>      │
/// │          └─► Hud reflects it in the HTML panels     │
/// └─────────────────────────────────────────────────────┘
pub enum MoleHit {
    Loading,
    Loaded(Box<Board>),
}

impl MoleHit {
    pub fn new() -> Self {
        MoleHit::Loading
    }
}

impl Default for MoleHit {
    fn default() -> Self {
        MoleHit::new()
    }
}

pub struct Board {
    session: MoleHitSession,
    assets: Assets,
    hud: Hud<DomPanels>,
    tick_ms: f32,
}

#[async_trait(?Send)]
impl Game for MoleHit {
    async fn initialize(&self) -> Result<Box<dyn Game>> {
        match self {
            MoleHit::Loading => {
                let panels = DomPanels;
                let config: MoleHitConfig = match engine::load_config().await {
                    Ok(config) => config,
                    Err(err) => {
                        error!("Mole hit config rejected : {:#}", err);
                        panels.set_text(panel::PROGRESS, &format!("Loading failed : {:#}", err));
                        return Err(err);
                    }
                };
                let assets = match Assets::load(&MANIFEST, |loaded, total| {
                    panels.set_text(panel::PROGRESS, &progress_text(loaded, total));
                })
                .await
                {
                    Ok(assets) => assets,
                    Err(err) => {
                        error!("Mole hit failed to load : {:#}", err);
                        panels.set_text(panel::PROGRESS, &format!("Loading failed : {:#}", err));
                        return Err(err);
                    }
                };
                panels.hide(panel::PROGRESS);
                log!("Mole hit assets loaded");

                let images = MoleHitImages {
                    hole: assets.image("bg_hole")?,
                    hole_cover: assets.image("bg_holeHide")?,
                    mole: assets.image("mouse")?,
                    star: assets.image("star")?,
                    icon: assets.image("icon")?,
                    hammer: assets.image("hammer")?,
                    time_roller: assets.image("time_roller")?,
                };
                let tick_ms = config.tick_ms;
                let session = MoleHitSession::new(config, images, StdRng::from_entropy());
                let mut hud = Hud::new(panels);
                hud.show_score(session.display_score());

                Ok(Box::new(MoleHit::Loaded(Box::new(Board {
                    session,
                    assets,
                    hud,
                    tick_ms,
                }))))
            }
            MoleHit::Loaded(_) => Err(anyhow!("Mole hit is already initialized")),
        }
    }

    fn update(&mut self, input: &mut InputState) {
        if let MoleHit::Loaded(board) = self {
            if let Some(notice) = board.session.update(input) {
                board.hud.notice(notice);
            }
            board.hud.show_score(board.session.display_score());
        }
    }

    fn draw(&self, renderer: &Renderer) {
        if let MoleHit::Loaded(board) = self {
            board.session.draw(&renderer.with_assets(&board.assets));
        }
    }

    fn tick_length(&self) -> f32 {
        match self {
            MoleHit::Loaded(board) => board.tick_ms,
            MoleHit::Loading => MoleHitConfig::default().tick_ms,
        }
    }
}

fn progress_text(loaded: usize, total: usize) -> String {
    let percent = if total == 0 { 100 } else { loaded * 100 / total };
    format!("Loading images... ({}%)", percent)
}

/// Keeps the HTML panels around the canvas in step with the session
pub struct Hud<P: Panels> {
    panels: P,
    shown_score: Option<u32>,
}

impl<P: Panels> Hud<P> {
    pub fn new(panels: P) -> Self {
        Hud {
            panels,
            shown_score: None,
        }
    }

    /// only touches the DOM when the number changed
    pub fn show_score(&mut self, score: u32) {
        if self.shown_score != Some(score) {
            self.panels.set_text(panel::SCORE, &score.to_string());
            self.shown_score = Some(score);
        }
    }

    pub fn notice(&mut self, notice: Notice) {
        match notice {
            Notice::LevelEnded(LevelOutcome::Advanced {
                final_score,
                require_score,
                ..
            }) => {
                self.panels
                    .set_text(panel::CURRENT_SCORE, &final_score.to_string());
                self.panels
                    .set_text(panel::REQUIRE_SCORE, &require_score.to_string());
                self.panels.show(panel::NEXT_LEVEL);
            }
            Notice::LevelEnded(LevelOutcome::Failed { final_score }) => {
                self.panels
                    .set_text(panel::FINAL_SCORE, &format!("Your score : {}", final_score));
                self.panels.show(panel::GAME_OVER);
            }
            Notice::Resumed => self.panels.hide(panel::NEXT_LEVEL),
            Notice::Restarted => {
                log!("Mole hit restarted");
                self.panels.hide(panel::GAME_OVER);
            }
            Notice::Started | Notice::Paused => {}
        }
    }
}
