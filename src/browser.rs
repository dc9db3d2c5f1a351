use anyhow::{anyhow, Result};
use serde::de::DeserializeOwned;
use std::future::Future;
use wasm_bindgen::closure::{Closure, WasmClosure, WasmClosureFnOnce};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;

#[rustfmt::skip]
use web_sys::{
    Document,
    Window,
    CanvasRenderingContext2d,
    HtmlCanvasElement,
    HtmlElement,
    HtmlImageElement,
    Response,
};

// log! and error! must be defined before any module that uses them, which is
// why lib.rs declares `browser` first with #[macro_use]
macro_rules! log {
    ($($t:tt)*) => {
        $crate::browser::console_log(&format!($($t)*))
    };
}

macro_rules! error {
    ($($t:tt)*) => {
        $crate::browser::console_error(&format!($($t)*))
    };
}

// ==================== Constants ====================
// Constants related to HTML elements
mod html {
    pub const CANVAS_ID: &str = "canvas";
    pub const CONTEXT_2D: &str = "2d";
    pub const DISPLAY: &str = "display";
    pub const SHOWN: &str = "block";
    pub const HIDDEN: &str = "none";
}

pub type LoopClosure = Closure<dyn FnMut(f64)>;

// console output only exists inside the browser, native test runs go to stderr
pub fn console_log(message: &str) {
    #[cfg(target_arch = "wasm32")]
    web_sys::console::log_1(&JsValue::from_str(message));
    #[cfg(not(target_arch = "wasm32"))]
    eprintln!("{}", message);
}

pub fn console_error(message: &str) {
    #[cfg(target_arch = "wasm32")]
    web_sys::console::error_1(&JsValue::from_str(message));
    #[cfg(not(target_arch = "wasm32"))]
    eprintln!("ERROR {}", message);
}

pub fn new_image() -> Result<HtmlImageElement> {
    HtmlImageElement::new()
        .map_err(|err| anyhow!("Could not create image element : {:#?}", err))
}

pub fn context() -> Result<CanvasRenderingContext2d> {
    canvas()?
        .get_context(html::CONTEXT_2D)
        // Result<Option<Object>, JsValue>
        // - map the JsValue error into anyhow
        // - map the None case into an error as well
        .map_err(|js_value| anyhow!("Error getting context : {:#?}", js_value))?
        .ok_or_else(|| anyhow!("No 2d context found"))?
        .dyn_into::<CanvasRenderingContext2d>()
        .map_err(|element| {
            anyhow!(
                "Error converting {:#?} to CanvasRenderingContext2d",
                element
            )
        })
}

pub fn canvas() -> Result<HtmlCanvasElement> {
    document()?
        .get_element_by_id(html::CANVAS_ID)
        .ok_or_else(|| anyhow!("No Canvas Element found with ID : '{:#?}'", html::CANVAS_ID))?
        .dyn_into::<HtmlCanvasElement>()
        .map_err(|element| anyhow!("Error converting {:#?} to HtmlCanvasElement", element))
}

/// `data-*` style attribute read from the game canvas
pub fn canvas_attribute(name: &str) -> Result<Option<String>> {
    Ok(canvas()?.get_attribute(name))
}

pub fn window() -> Result<Window> {
    web_sys::window().ok_or_else(|| anyhow!("Window not found"))
}

pub fn document() -> Result<Document> {
    window()?
        .document()
        .ok_or_else(|| anyhow!("No Document Found"))
}

pub fn element(id: &str) -> Result<HtmlElement> {
    document()?
        .get_element_by_id(id)
        .ok_or_else(|| anyhow!("No Element found with ID : '{}'", id))?
        .dyn_into::<HtmlElement>()
        .map_err(|element| anyhow!("Error converting {:#?} to HtmlElement", element))
}

pub fn set_visible(id: &str, visible: bool) -> Result<()> {
    let display = if visible { html::SHOWN } else { html::HIDDEN };
    element(id)?
        .style()
        .set_property(html::DISPLAY, display)
        .map_err(|err| anyhow!("Could not set display of '{}' : {:#?}", id, err))
}

pub fn set_text(id: &str, text: &str) -> Result<()> {
    element(id)?.set_inner_text(text);
    Ok(())
}

pub fn closure_once<F, A, R>(f: F) -> Closure<F::FnMut>
where
    F: 'static + WasmClosureFnOnce<A, R>,
{
    Closure::once(f)
}

pub fn closure_wrap<T: WasmClosure + ?Sized>(data: Box<T>) -> Closure<T> {
    Closure::wrap(data)
}

pub fn create_raf_closure(f: impl FnMut(f64) + 'static) -> LoopClosure {
    closure_wrap(Box::new(f))
}

pub fn request_animation_frame(callback: &LoopClosure) -> Result<i32> {
    window()?
        .request_animation_frame(callback.as_ref().unchecked_ref())
        .map_err(|err| anyhow!("Cannot request animation frame : {:#?}", err))
}

/// Milliseconds from `performance.now()`
pub fn now() -> Result<f64> {
    Ok(window()?
        .performance()
        .ok_or_else(|| anyhow!("Performance object not found"))?
        .now())
}

pub fn spawn_local<F>(future: F)
where
    F: Future<Output = ()> + 'static,
{
    wasm_bindgen_futures::spawn_local(future);
}

pub async fn fetch_json<T>(json_path: &str) -> Result<T>
where
    T: DeserializeOwned,
{
    let resp_value = fetch_with_str(json_path).await?;
    let resp: Response = resp_value
        .dyn_into()
        .map_err(|element| anyhow!("error converting [{:#?}] to Response", element))?;
    let json = resp
        .json()
        .map_err(|err| anyhow!("Could not get JSON from response [{:#?}]", err))?;

    let json_value = JsFuture::from(json)
        .await
        .map_err(|err| anyhow!("error fetching [{:#?}]", err))?;

    serde_wasm_bindgen::from_value(json_value)
        .map_err(|err| anyhow!("error converting response : {:#?}", err))
}

async fn fetch_with_str(resource: &str) -> Result<JsValue> {
    let resp = window()?.fetch_with_str(resource);

    JsFuture::from(resp)
        .await
        .map_err(|err| anyhow!("error fetching : {:#?}", err))
}
