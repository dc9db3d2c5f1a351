// ==================== Imports ====================
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsValue;

#[macro_use]
mod browser;
pub mod engine;
pub mod mole_hit;
pub mod runner;
pub mod sprite;

use engine::GameLoop;
use mole_hit::MoleHit;
use runner::Runner;

// canvas attribute picking the game, anything else starts the runner
const GAME_ATTRIBUTE: &str = "data-game";
const MOLE_HIT: &str = "mole-hit";

// ==================== Main Functions ====================
/// Main entry for Webassembly module
/// - reads which game the canvas hosts
/// - starts its game loop on the local executor
#[wasm_bindgen]
pub fn main_js() -> Result<(), JsValue> {
    // setup better panic messages for debugging
    console_error_panic_hook::set_once();

    let game = browser::canvas_attribute(GAME_ATTRIBUTE)
        .map_err(|err| JsValue::from_str(&format!("{:#}", err)))?;

    // spawns a new asynchronous task in local thread, for web assembly
    // environment, using wasm_bindgen_futures
    browser::spawn_local(async move {
        let started = match game.as_deref() {
            Some(MOLE_HIT) => GameLoop::start(MoleHit::new()).await,
            _ => GameLoop::start(Runner::new()).await,
        };
        if let Err(err) = started {
            error!("Could not start game : {:#}", err);
        }
    });

    Ok(())
}
