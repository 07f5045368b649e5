#![cfg(target_arch = "wasm32")]

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use glam::Vec2;
use js_sys::{Function, Object, Reflect, JSON};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{window, Window};

use crate::anchor::{Anchor, AnchorDirection};
use crate::config::DemoChanges;
use crate::fit::{compute_fit, Dimensions, ScaleResult, ViewportSize};
use crate::manager::{AnchorId, SafeScaleManager};
use crate::viewport::ViewportProvider;

#[wasm_bindgen(start)]
pub fn bootstrap() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Debug);
}

/// Reads `window.innerWidth` / `window.innerHeight`.
struct BrowserViewport {
    window: Window,
}

impl ViewportProvider for BrowserViewport {
    fn viewport_size(&self) -> ViewportSize {
        let width = self.window.inner_width().ok().and_then(|v| v.as_f64());
        let height = self.window.inner_height().ok().and_then(|v| v.as_f64());
        ViewportSize::new(width.unwrap_or(1.0) as f32, height.unwrap_or(1.0) as f32)
    }
}

/// JavaScript handle around [`SafeScaleManager`] bound to the window's resize event.
#[wasm_bindgen]
pub struct WasmSafeScale {
    manager: Rc<RefCell<SafeScaleManager>>,
    latest: Rc<Cell<ScaleResult>>,
    window: Window,
    resize_listener: Closure<dyn FnMut()>,
}

#[wasm_bindgen]
impl WasmSafeScale {
    /// `callback` receives `{ scaleRatio, viewArea }` after every recompute.
    #[wasm_bindgen(constructor)]
    pub fn new(
        max_width: f32,
        max_height: f32,
        safe_width: f32,
        safe_height: f32,
        callback: Function,
    ) -> Result<WasmSafeScale, JsValue> {
        let window = window().ok_or_else(|| JsValue::from_str("window not available"))?;
        let viewport = BrowserViewport {
            window: window.clone(),
        };
        let dimensions = Dimensions::new(max_width, max_height, safe_width, safe_height);
        let latest = Rc::new(Cell::new(compute_fit(
            &dimensions.normalized(),
            &viewport.viewport_size(),
        )));
        let sink = Rc::clone(&latest);
        let manager = SafeScaleManager::new(dimensions, viewport, move |result: &ScaleResult| {
            sink.set(*result);
            let payload = scale_object(result);
            if let Err(err) = callback.call1(&JsValue::NULL, &payload) {
                web_sys::console::error_1(&err);
            }
        });
        let manager = Rc::new(RefCell::new(manager));

        let listener_manager = Rc::clone(&manager);
        let resize_listener = Closure::wrap(Box::new(move || {
            match listener_manager.try_borrow_mut() {
                Ok(mut manager) => manager.on_resize(),
                Err(_) => log::warn!("resize ignored: safe scale manager is busy"),
            }
        }) as Box<dyn FnMut()>);
        window
            .add_event_listener_with_callback("resize", resize_listener.as_ref().unchecked_ref())?;

        manager.borrow_mut().on_resize();
        Ok(Self {
            manager,
            latest,
            window,
            resize_listener,
        })
    }

    /// Recomputes as if the window had been resized.
    pub fn resize(&self) -> Result<(), JsValue> {
        self.with_manager(|manager| manager.on_resize())
    }

    /// Merges a partial `{maxWidth, maxHeight, safeWidth, safeHeight}` payload.
    pub fn configure(&self, payload: JsValue) -> Result<(), JsValue> {
        let text = JSON::stringify(&payload)?
            .as_string()
            .unwrap_or_else(|| "null".to_string());
        let changes =
            DemoChanges::from_json_str(&text).map_err(|err| JsValue::from_str(&err.to_string()))?;
        self.with_manager(|manager| {
            let patch = changes.dimensions(&manager.dimensions());
            manager.configure(patch);
        })
    }

    /// Registers an anchor; `callback` receives `{ x, y }` right away and on every recompute.
    #[wasm_bindgen(js_name = addEntity)]
    pub fn add_entity(
        &self,
        x: f32,
        y: f32,
        direction_x: f32,
        direction_y: f32,
        callback: Function,
    ) -> Result<f64, JsValue> {
        let anchor = Anchor::new(
            Vec2::new(x, y),
            AnchorDirection::from_signs(direction_x, direction_y),
        );
        let mut id = None;
        self.with_manager(|manager| {
            id = Some(manager.add_entity(anchor, move |position: Vec2| {
                let point = point_object(position);
                if let Err(err) = callback.call1(&JsValue::NULL, &point) {
                    web_sys::console::error_1(&err);
                }
            }));
        })?;
        id.map(|id| id.value() as f64)
            .ok_or_else(|| JsValue::from_str("anchor was not registered"))
    }

    #[wasm_bindgen(js_name = removeEntity)]
    pub fn remove_entity(&self, id: f64) -> Result<bool, JsValue> {
        let mut removed = false;
        self.with_manager(|manager| {
            removed = manager
                .remove_entity(AnchorId::from_value(id as u64))
                .is_some();
        })?;
        Ok(removed)
    }

    /// Merges a partial `{position: {x, y}, direction: {x, y}}` payload into an anchor.
    #[wasm_bindgen(js_name = updateEntity)]
    pub fn update_entity(&self, id: f64, payload: JsValue) -> Result<bool, JsValue> {
        let text = JSON::stringify(&payload)?
            .as_string()
            .unwrap_or_else(|| "null".to_string());
        let changes =
            DemoChanges::from_json_str(&text).map_err(|err| JsValue::from_str(&err.to_string()))?;
        let mut updated = false;
        self.with_manager(|manager| {
            updated = manager
                .update_entity(AnchorId::from_value(id as u64), &changes.anchor_patch())
                .is_some();
        })?;
        Ok(updated)
    }

    /// Readable from inside callbacks; reports the fit being notified.
    #[wasm_bindgen(getter, js_name = scaleRatio)]
    pub fn scale_ratio(&self) -> f32 {
        self.latest.get().scale_ratio
    }

    #[wasm_bindgen(getter, js_name = viewArea)]
    pub fn view_area(&self) -> JsValue {
        scale_object(&self.latest.get())
    }
}

impl WasmSafeScale {
    /// Callbacks calling back into the handle would alias the manager, so
    /// those calls are refused.
    fn with_manager<F>(&self, action: F) -> Result<(), JsValue>
    where
        F: FnOnce(&mut SafeScaleManager),
    {
        let mut manager = self
            .manager
            .try_borrow_mut()
            .map_err(|_| JsValue::from_str("safe scale manager is busy notifying callbacks"))?;
        action(&mut manager);
        Ok(())
    }
}

impl Drop for WasmSafeScale {
    fn drop(&mut self) {
        let _ = self.window.remove_event_listener_with_callback(
            "resize",
            self.resize_listener.as_ref().unchecked_ref(),
        );
    }
}

fn scale_object(result: &ScaleResult) -> JsValue {
    let area = result.view_area;
    let view_area = Object::new();
    for (key, value) in [
        ("x", area.x),
        ("y", area.y),
        ("width", area.width),
        ("height", area.height),
        ("left", area.left),
        ("right", area.right),
        ("top", area.top),
        ("bottom", area.bottom),
    ] {
        set_number(&view_area, key, value);
    }
    let payload = Object::new();
    set_number(&payload, "scaleRatio", result.scale_ratio);
    let _ = Reflect::set(&payload, &JsValue::from_str("viewArea"), &view_area);
    payload.into()
}

fn point_object(position: Vec2) -> JsValue {
    let point = Object::new();
    set_number(&point, "x", position.x);
    set_number(&point, "y", position.y);
    point.into()
}

fn set_number(target: &Object, key: &str, value: f32) {
    let _ = Reflect::set(
        target,
        &JsValue::from_str(key),
        &JsValue::from_f64(value as f64),
    );
}
