use crate::browser;
use crate::engine::{Point, Size, Surface};
use anyhow::{anyhow, Context, Error, Result};
use futures::channel::oneshot::channel;
use futures::stream::{FuturesUnordered, TryStreamExt};
use futures::FutureExt;
use std::cell::RefCell;
use std::collections::HashMap;
use std::future::Future;
use std::rc::Rc;
use wasm_bindgen::{
    // unchecked_ref (unsafe) cast from Javascript type to Rust type
    // - we create the closure and know its signature, so the cast holds
    JsCast,
    JsValue,
};
use web_sys::HtmlImageElement;

/// Key an asset is registered under in a manifest
pub type AssetId = &'static str;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssetEntry {
    pub id: AssetId,
    pub path: &'static str,
}

impl AssetEntry {
    pub const fn new(id: AssetId, path: &'static str) -> Self {
        AssetEntry { id, path }
    }
}

/// Handle to a loaded image: its id plus natural size
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Image {
    pub id: AssetId,
    pub size: Size,
}

impl Image {
    pub const fn new(id: AssetId, size: Size) -> Self {
        Image { id, size }
    }

    pub fn width(&self) -> f32 {
        self.size.width
    }

    pub fn draw(&self, surface: &dyn Surface, position: Point) {
        surface.draw_image_at(self.id, position);
    }
}

pub struct Assets {
    images: HashMap<AssetId, HtmlImageElement>,
}

impl Assets {
    /// Loads the whole manifest concurrently
    /// # Arguments
    /// * `manifest` - ids and paths of every image the game needs
    /// * `on_progress` - called with (loaded, total) before the first and after
    ///   every completed load
    /// # Returns
    /// * `Ok(Assets)` - once every image resolved
    /// * `Err` - on the first image that failed, naming it
    pub async fn load(
        manifest: &[AssetEntry],
        on_progress: impl FnMut(usize, usize),
    ) -> Result<Self> {
        let images = load_all(manifest, |entry| load_image(entry.path), on_progress).await?;
        Ok(Assets {
            images: images.into_iter().collect(),
        })
    }

    pub fn get(&self, id: &str) -> Option<&HtmlImageElement> {
        self.images.get(id)
    }

    pub fn image(&self, id: AssetId) -> Result<Image> {
        let element = self
            .get(id)
            .ok_or_else(|| anyhow!("Image '{}' is not part of the loaded assets", id))?;
        Ok(Image::new(
            id,
            Size::new(element.natural_width() as f32, element.natural_height() as f32),
        ))
    }
}

/// Drives one load future per manifest entry at once and gathers the results
/// into a single `Result`; progress is reported as loads complete.
pub async fn load_all<T, F, Fut>(
    manifest: &[AssetEntry],
    mut load: F,
    mut on_progress: impl FnMut(usize, usize),
) -> Result<Vec<(AssetId, T)>>
where
    F: FnMut(AssetEntry) -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let total = manifest.len();
    on_progress(0, total);

    let mut pending: FuturesUnordered<_> = manifest
        .iter()
        .map(|&entry| {
            load(entry).map(move |result| {
                result
                    .with_context(|| {
                        format!("Failed to load asset '{}' from : {}", entry.id, entry.path)
                    })
                    .map(|asset| (entry.id, asset))
            })
        })
        .collect();

    let mut loaded = Vec::with_capacity(total);
    while let Some(asset) = pending.try_next().await? {
        loaded.push(asset);
        on_progress(loaded.len(), total);
    }

    Ok(loaded)
}

/// Asynchronously load an image from a given source path
/// # Arguments
/// * `source` - string slice to path/url
/// # Returns
/// * `Ok(HtmlImageElement)` - on load success
/// * `Err` - on load fail
pub async fn load_image(source: &str) -> Result<HtmlImageElement> {
    let image = browser::new_image()?;
    let (tx, rx) = channel::<Result<(), Error>>();
    let success_tx = Rc::new(RefCell::new(Some(tx)));
    let error_tx = success_tx.clone();

    let success_callback = browser::closure_once(move || {
        if let Some(tx) = success_tx.borrow_mut().take() {
            let _ = tx.send(Ok(()));
        }
    });

    let error_callback = browser::closure_once(move |err: JsValue| {
        if let Some(tx) = error_tx.borrow_mut().take() {
            let _ = tx.send(Err(anyhow!(
                "[assets.rs::load_image] Error loading image: {:#?}",
                err
            )));
        }
    });

    image.set_onload(Some(success_callback.as_ref().unchecked_ref()));
    image.set_onerror(Some(error_callback.as_ref().unchecked_ref()));
    image.set_src(source);

    // keep callback alive until image is loaded or errors
    success_callback.forget();
    error_callback.forget();

    // ?? - Result<Result<(), Error>, oneshot::Canceled>
    // - first ? yields the channel result
    // - second ? yields the image load result
    rx.await??;

    Ok(image)
}
