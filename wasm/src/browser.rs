// Browser geolocation host — navigator.geolocation + navigator.permissions
//
// Implements `GeolocationHost` directly over the browser APIs via web-sys.
// One-shot requests hand their callbacks to JS with `Closure::once_into_js`;
// watch callbacks are owned here, keyed by the browser's watch id, and
// released when that watch is cleared.

use crate::convert;
use async_trait::async_trait;
use fused_location_core::{
    GeolocationHost, LocationError, OneShotCallback, PositionResult, ResolvedPositionOptions,
    Result, WatchEventCallback,
};
use parking_lot::Mutex;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{Geolocation, Navigator, Position, PositionError};

/// JS callbacks registered for one watch. Dropping them invalidates the
/// functions the browser holds, so they must outlive the watch.
struct WatchClosures {
    _on_position: Closure<dyn FnMut(Position)>,
    _on_error: Closure<dyn FnMut(PositionError)>,
}

#[derive(Default)]
pub struct BrowserGeolocation {
    watches: Mutex<HashMap<i32, WatchClosures>>,
}

impl std::fmt::Debug for BrowserGeolocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BrowserGeolocation")
            .field("active_watches", &self.watches.lock().len())
            .finish()
    }
}

impl BrowserGeolocation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active_watches(&self) -> usize {
        self.watches.lock().len()
    }

    fn geolocation(&self) -> Result<Geolocation> {
        let navigator = navigator().ok_or_else(geolocation_unavailable)?;
        if !has_property(&navigator, "geolocation") {
            return Err(geolocation_unavailable());
        }
        navigator
            .geolocation()
            .map_err(|e| LocationError::Unavailable(convert::describe_js_error(&e)))
    }
}

fn navigator() -> Option<Navigator> {
    web_sys::window().map(|w| w.navigator())
}

fn has_property(target: &JsValue, name: &str) -> bool {
    js_sys::Reflect::get(target, &JsValue::from_str(name))
        .map(|v| !v.is_undefined() && !v.is_null())
        .unwrap_or(false)
}

fn geolocation_unavailable() -> LocationError {
    LocationError::Unavailable(fused_location_core::error::GEOLOCATION_UNAVAILABLE.to_string())
}

fn deliver(on_event: &RefCell<WatchEventCallback>, result: PositionResult) {
    let mut callback = on_event.borrow_mut();
    (*callback)(result);
}

fn browser_options(options: &ResolvedPositionOptions) -> web_sys::PositionOptions {
    let js = web_sys::PositionOptions::new();
    js.set_enable_high_accuracy(options.enable_high_accuracy);
    js.set_timeout(options.timeout);
    js.set_maximum_age(options.maximum_age);
    js
}

#[async_trait(?Send)]
impl GeolocationHost for BrowserGeolocation {
    fn has_geolocation(&self) -> bool {
        navigator().is_some_and(|n| has_property(&n, "geolocation"))
    }

    fn has_permissions(&self) -> bool {
        navigator().is_some_and(|n| has_property(&n, "permissions"))
    }

    fn get_current_position(
        &self,
        options: ResolvedPositionOptions,
        on_result: OneShotCallback,
    ) -> Result<()> {
        let geolocation = self.geolocation()?;

        // The browser calls exactly one of the two; whichever runs takes it.
        let slot: Rc<RefCell<Option<OneShotCallback>>> = Rc::new(RefCell::new(Some(on_result)));
        let slot_err = Rc::clone(&slot);

        let on_position = Closure::once_into_js(move |position: Position| {
            if let Some(cb) = slot.borrow_mut().take() {
                cb(Ok(convert::position_from_js(&position)));
            }
        });
        let on_error = Closure::once_into_js(move |error: PositionError| {
            if let Some(cb) = slot_err.borrow_mut().take() {
                cb(Err(convert::host_error_from_js(&error)));
            }
        });

        geolocation
            .get_current_position_with_error_callback_and_options(
                on_position.unchecked_ref(),
                Some(on_error.unchecked_ref()),
                &browser_options(&options),
            )
            .map_err(|e| LocationError::Unavailable(convert::describe_js_error(&e)))
    }

    fn watch_position(
        &self,
        options: ResolvedPositionOptions,
        on_event: WatchEventCallback,
    ) -> Result<i32> {
        let geolocation = self.geolocation()?;

        let shared: Rc<RefCell<WatchEventCallback>> = Rc::new(RefCell::new(on_event));

        let shared_pos = Rc::clone(&shared);
        let on_position = Closure::wrap(Box::new(move |position: Position| {
            deliver(&shared_pos, Ok(convert::position_from_js(&position)));
        }) as Box<dyn FnMut(Position)>);

        let shared_err = Rc::clone(&shared);
        let on_error = Closure::wrap(Box::new(move |error: PositionError| {
            let error = convert::host_error_from_js(&error);
            tracing::debug!("watch error {}: {}", error.code, error.message);
            deliver(&shared_err, Err(error));
        }) as Box<dyn FnMut(PositionError)>);

        let handle = geolocation
            .watch_position_with_error_callback_and_options(
                on_position.as_ref().unchecked_ref(),
                Some(on_error.as_ref().unchecked_ref()),
                &browser_options(&options),
            )
            .map_err(|e| LocationError::Unavailable(convert::describe_js_error(&e)))?;

        self.watches.lock().insert(
            handle,
            WatchClosures {
                _on_position: on_position,
                _on_error: on_error,
            },
        );
        Ok(handle)
    }

    fn clear_watch(&self, handle: i32) {
        match self.geolocation() {
            Ok(geolocation) => geolocation.clear_watch(handle),
            Err(e) => tracing::warn!("clearWatch({}) skipped: {}", handle, e),
        }

        if let Some(closures) = self.watches.lock().remove(&handle) {
            // Released on the next microtask: a watch may be cleared from
            // inside its own callback.
            wasm_bindgen_futures::spawn_local(async move {
                drop(closures);
            });
        }
    }

    async fn query_geolocation_permission(&self) -> Result<String> {
        let navigator = navigator().ok_or_else(|| {
            LocationError::Unavailable(
                fused_location_core::error::PERMISSIONS_UNAVAILABLE.to_string(),
            )
        })?;
        let to_error = |e: JsValue| LocationError::Unavailable(convert::describe_js_error(&e));

        let permissions = navigator.permissions().map_err(to_error)?;
        let descriptor = js_sys::Object::new();
        js_sys::Reflect::set(
            &descriptor,
            &JsValue::from_str("name"),
            &JsValue::from_str("geolocation"),
        )
        .map_err(to_error)?;

        let status = JsFuture::from(permissions.query(&descriptor).map_err(to_error)?)
            .await
            .map_err(to_error)?;
        let state = js_sys::Reflect::get(&status, &JsValue::from_str("state")).map_err(to_error)?;

        state.as_string().ok_or_else(|| {
            LocationError::Unavailable("Permission query returned no state".to_string())
        })
    }
}
