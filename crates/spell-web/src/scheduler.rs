use std::cell::{Cell, RefCell};
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

/// `requestAnimationFrame` loop that only stays scheduled while its step
/// function asks for another frame.
///
/// The callback keeps a handle to itself so it can re-request; the loop lives
/// for the whole page, so that cycle is never collected.
pub struct FrameLoop {
    callback: FrameCallback,
    running: Rc<Cell<bool>>,
}

impl FrameLoop {
    /// `step` receives the frame timestamp in ms and returns whether to continue.
    pub fn new(mut step: impl FnMut(f64) -> bool + 'static) -> Self {
        let callback: FrameCallback = Rc::new(RefCell::new(None));
        let running = Rc::new(Cell::new(false));

        let handle = callback.clone();
        let flag = running.clone();
        *callback.borrow_mut() = Some(Closure::wrap(Box::new(move |timestamp: f64| {
            let again = step(timestamp) && request_frame(&handle);
            flag.set(again);
        }) as Box<dyn FnMut(f64)>));

        Self { callback, running }
    }

    pub fn is_running(&self) -> bool {
        self.running.get()
    }

    /// Schedule the next frame unless one is already pending.
    pub fn ensure_running(&self) {
        if self.running.get() {
            return;
        }
        if request_frame(&self.callback) {
            self.running.set(true);
        } else {
            log::warn!("frame loop: requestAnimationFrame unavailable");
        }
    }
}

fn request_frame(callback: &FrameCallback) -> bool {
    let Some(window) = web_sys::window() else {
        return false;
    };
    let slot = callback.borrow();
    match slot.as_ref() {
        Some(closure) => window
            .request_animation_frame(closure.as_ref().unchecked_ref())
            .is_ok(),
        None => false,
    }
}
