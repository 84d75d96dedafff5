//! Scoped teardown. Every listener, timer or frame request registered by a
//! component hands a cancellation closure to the component's `Disposer`;
//! disposing (or dropping) runs them all, newest first.

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Event, EventTarget};

use crate::error::Error;

pub struct Disposer {
    handles: Vec<Box<dyn FnOnce()>>,
}

impl Default for Disposer {
    fn default() -> Self {
        Self::new()
    }
}

impl Disposer {
    pub fn new() -> Self {
        Self {
            handles: Vec::new(),
        }
    }

    pub fn add(&mut self, cancel: impl FnOnce() + 'static) {
        self.handles.push(Box::new(cancel));
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Run every cancellation handle in reverse registration order. Safe to call
    /// more than once; later calls only see handles added since.
    pub fn dispose(&mut self) {
        while let Some(cancel) = self.handles.pop() {
            cancel();
        }
    }
}

impl Drop for Disposer {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl std::fmt::Debug for Disposer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Disposer")
            .field("pending", &self.handles.len())
            .finish()
    }
}

/// Register `handler` for `event` on `target`; the listener is removed and its
/// closure freed when `disposer` runs.
pub fn listen(
    target: &EventTarget,
    event: &'static str,
    disposer: &mut Disposer,
    handler: impl FnMut(Event) + 'static,
) -> Result<(), JsValue> {
    let closure = Closure::<dyn FnMut(Event)>::new(handler);
    target.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())?;
    let target = target.clone();
    disposer.add(move || {
        let callback: &js_sys::Function = closure.as_ref().unchecked_ref();
        if let Err(err) = target.remove_event_listener_with_callback(event, callback) {
            log::warn!("could not remove {event} listener: {}", Error::from(err));
        }
        drop(closure);
    });
    Ok(())
}
