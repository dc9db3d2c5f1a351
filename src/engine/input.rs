use crate::browser;
use crate::engine::Point;
use anyhow::Result;
use futures::channel::mpsc::{unbounded, UnboundedReceiver, UnboundedSender};
use std::collections::HashSet;
use wasm_bindgen::JsCast;
use web_sys::{KeyboardEvent, MouseEvent};

// keys whose browser default (page scroll) is swallowed while playing
const CAPTURED_KEYS: [&str; 1] = ["Space"];

/// Browser input, converted at the event listener so the game side never
/// touches `web_sys` types
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    KeyDown(String),
    KeyUp(String),
    PointerMove(Point),
    PointerDown(Point),
    PointerUp(Point),
}

/// Input as seen by one update tick
/// - held keys and pointer state are levels
/// - clicks and key presses are edges, queued until a tick takes them
#[derive(Debug, Default)]
pub struct InputState {
    pressed_keys: HashSet<String>,
    key_presses: Vec<String>,
    pointer: Point,
    pointer_down: bool,
    clicks: Vec<Point>,
}

impl InputState {
    pub fn is_pressed(&self, code: &str) -> bool {
        self.pressed_keys.contains(code)
    }

    pub fn pointer(&self) -> Point {
        self.pointer
    }

    pub fn is_pointer_down(&self) -> bool {
        self.pointer_down
    }

    /// pointer releases since the last call, oldest first
    pub fn take_clicks(&mut self) -> Vec<Point> {
        std::mem::take(&mut self.clicks)
    }

    /// key codes pressed since the last call; auto repeat is ignored
    pub fn take_key_presses(&mut self) -> Vec<String> {
        std::mem::take(&mut self.key_presses)
    }

    pub fn apply(&mut self, event: InputEvent) {
        match event {
            InputEvent::KeyDown(code) => {
                if self.pressed_keys.insert(code.clone()) {
                    self.key_presses.push(code);
                }
            }
            InputEvent::KeyUp(code) => {
                self.pressed_keys.remove(&code);
            }
            InputEvent::PointerMove(position) => self.pointer = position,
            InputEvent::PointerDown(position) => {
                self.pointer = position;
                self.pointer_down = true;
            }
            InputEvent::PointerUp(position) => {
                self.pointer = position;
                self.pointer_down = false;
                self.clicks.push(position);
            }
        }
    }
}

/// Registers keyboard listeners on the window and pointer listeners on the
/// canvas; every event lands in the returned channel
pub fn prepare_input() -> Result<UnboundedReceiver<InputEvent>> {
    let (sender, receiver) = unbounded();
    let window = browser::window()?;
    let canvas = browser::canvas()?;

    let keydown_sender = sender.clone();
    let onkeydown = browser::closure_wrap(Box::new(move |event: KeyboardEvent| {
        let code = event.code();
        if CAPTURED_KEYS.contains(&code.as_str()) {
            event.prevent_default();
        }
        send(&keydown_sender, InputEvent::KeyDown(code));
    }) as Box<dyn FnMut(KeyboardEvent)>);

    let keyup_sender = sender.clone();
    let onkeyup = browser::closure_wrap(Box::new(move |event: KeyboardEvent| {
        send(&keyup_sender, InputEvent::KeyUp(event.code()));
    }) as Box<dyn FnMut(KeyboardEvent)>);

    let move_sender = sender.clone();
    let onmousemove = browser::closure_wrap(Box::new(move |event: MouseEvent| {
        send(&move_sender, InputEvent::PointerMove(offset(&event)));
    }) as Box<dyn FnMut(MouseEvent)>);

    let down_sender = sender.clone();
    let onmousedown = browser::closure_wrap(Box::new(move |event: MouseEvent| {
        send(&down_sender, InputEvent::PointerDown(offset(&event)));
    }) as Box<dyn FnMut(MouseEvent)>);

    let up_sender = sender;
    let onmouseup = browser::closure_wrap(Box::new(move |event: MouseEvent| {
        send(&up_sender, InputEvent::PointerUp(offset(&event)));
    }) as Box<dyn FnMut(MouseEvent)>);

    window.set_onkeydown(Some(onkeydown.as_ref().unchecked_ref()));
    window.set_onkeyup(Some(onkeyup.as_ref().unchecked_ref()));
    canvas.set_onmousemove(Some(onmousemove.as_ref().unchecked_ref()));
    canvas.set_onmousedown(Some(onmousedown.as_ref().unchecked_ref()));
    canvas.set_onmouseup(Some(onmouseup.as_ref().unchecked_ref()));

    // listeners live as long as the page
    onkeydown.forget();
    onkeyup.forget();
    onmousemove.forget();
    onmousedown.forget();
    onmouseup.forget();

    Ok(receiver)
}

/// Drains every pending event into `state`
pub fn process_input(state: &mut InputState, receiver: &mut UnboundedReceiver<InputEvent>) {
    // Ok(None) means every sender is gone, Err means nothing is queued
    while let Ok(Some(event)) = receiver.try_next() {
        state.apply(event);
    }
}

fn send(sender: &UnboundedSender<InputEvent>, event: InputEvent) {
    if let Err(err) = sender.unbounded_send(event) {
        log!("Dropped input event : {:?}", err);
    }
}

fn offset(event: &MouseEvent) -> Point {
    Point::new(event.offset_x() as f32, event.offset_y() as f32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_press_is_an_edge() {
        let mut input = InputState::default();
        input.apply(InputEvent::KeyDown("Space".into()));
        // browser auto repeat
        input.apply(InputEvent::KeyDown("Space".into()));

        assert!(input.is_pressed("Space"));
        assert_eq!(input.take_key_presses(), vec!["Space".to_string()]);
        assert!(input.take_key_presses().is_empty());

        input.apply(InputEvent::KeyUp("Space".into()));
        assert!(!input.is_pressed("Space"));
    }

    #[test]
    fn test_clicks_queue_until_taken() {
        let mut input = InputState::default();
        input.apply(InputEvent::PointerDown(Point::new(5.0, 6.0)));
        assert!(input.is_pointer_down());
        input.apply(InputEvent::PointerUp(Point::new(7.0, 8.0)));
        input.apply(InputEvent::PointerMove(Point::new(9.0, 10.0)));

        assert!(!input.is_pointer_down());
        assert_eq!(input.pointer(), Point::new(9.0, 10.0));
        assert_eq!(input.take_clicks(), vec![Point::new(7.0, 8.0)]);
        assert!(input.take_clicks().is_empty());
    }

    #[test]
    fn test_process_input_drains_channel() {
        let (sender, mut receiver) = unbounded();
        sender
            .unbounded_send(InputEvent::KeyDown("KeyP".into()))
            .unwrap();
        sender
            .unbounded_send(InputEvent::PointerUp(Point::new(1.0, 2.0)))
            .unwrap();

        let mut input = InputState::default();
        process_input(&mut input, &mut receiver);

        assert!(input.is_pressed("KeyP"));
        assert_eq!(input.take_clicks().len(), 1);

        // nothing queued and the sender is still alive
        process_input(&mut input, &mut receiver);
        assert!(input.take_clicks().is_empty());
    }
}
