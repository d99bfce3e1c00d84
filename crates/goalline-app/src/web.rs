//! WebAssembly entry point and DOM bindings.

use crate::config::AppConfig;
use crate::error::{AppError, AppResult};
use goalline_core::{
    ASSET_NAMES, EventChannel, GoalEntry, HandlerRegistry, ImageCache, InboundHandler, MouseButton,
};
use goalline_render::{Canvas2dSurface, GoalLineView};
use kurbo::{Point, Size};
use serde::Serialize;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Event, EventTarget, HtmlCanvasElement, HtmlImageElement, MouseEvent, Window};

type JsClosure<T> = Closure<dyn FnMut(T)>;
type SharedView = Rc<RefCell<GoalLineView<Canvas2dSurface, JsEventChannel>>>;

impl From<AppError> for JsValue {
    fn from(e: AppError) -> Self {
        JsValue::from_str(&e.to_string())
    }
}

fn dom_error(e: JsValue) -> AppError {
    AppError::Dom(e.as_string().unwrap_or_else(|| format!("{:?}", e)))
}

/// Initialize logging for the WASM module.
#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();

    if let Err(e) = console_log::init_with_level(log::Level::Info) {
        web_sys::console::warn_1(&format!("Logger not initialized: {}", e).into());
    }
}

/// [`EventChannel`] over a JavaScript emit function, e.g. a bound
/// `socket.emit`. Inbound events are delivered through [`GoalLine::receive`].
pub struct JsEventChannel {
    emit: js_sys::Function,
    handlers: HandlerRegistry,
}

impl JsEventChannel {
    pub fn new(emit: js_sys::Function) -> Self {
        Self {
            emit,
            handlers: HandlerRegistry::new(),
        }
    }

    /// Deliver an inbound event to its handlers.
    pub fn dispatch(&mut self, event: &str, payload: &serde_json::Value) -> bool {
        self.handlers.dispatch(event, payload)
    }
}

impl EventChannel for JsEventChannel {
    fn send(&mut self, event: &str, payload: serde_json::Value) {
        let serializer = serde_wasm_bindgen::Serializer::json_compatible();
        let value = match payload.serialize(&serializer) {
            Ok(value) => value,
            Err(e) => {
                log::error!("Failed to convert {} payload: {}", event, e);
                return;
            }
        };
        if let Err(e) = self.emit.call2(&JsValue::NULL, &JsValue::from_str(event), &value) {
            log::error!("Emitting {} failed: {:?}", event, e);
        }
    }

    fn on(&mut self, event: &str, handler: InboundHandler) {
        self.handlers.register(event, handler);
    }
}

fn viewport_size(window: &Window) -> AppResult<Size> {
    let width = window.inner_width().map_err(dom_error)?.as_f64();
    let height = window.inner_height().map_err(dom_error)?.as_f64();
    match (width, height) {
        (Some(w), Some(h)) => Ok(Size::new(w, h)),
        _ => Err(AppError::Dom("viewport size unavailable".to_string())),
    }
}

fn canvas_origin(canvas: &HtmlCanvasElement) -> Point {
    let rect = canvas.get_bounding_client_rect();
    Point::new(rect.left(), rect.top())
}

fn client_point(e: &MouseEvent) -> Point {
    Point::new(f64::from(e.client_x()), f64::from(e.client_y()))
}

/// Run `f` on the view unless it is already borrowed (a re-entrant call
/// from JavaScript), in which case the event is dropped.
fn with_view(view: &SharedView, f: impl FnOnce(&mut GoalLineView<Canvas2dSurface, JsEventChannel>)) {
    match view.try_borrow_mut() {
        Ok(mut view) => f(&mut view),
        Err(_) => log::warn!("Goal line busy, dropping event"),
    }
}

fn listen<T>(target: &EventTarget, name: &str, cb: &JsClosure<T>) -> AppResult<()> {
    target
        .add_event_listener_with_callback(name, cb.as_ref().unchecked_ref())
        .map_err(dom_error)
}

fn unlisten<T>(target: &EventTarget, name: &str, cb: &JsClosure<T>) {
    if let Err(e) = target.remove_event_listener_with_callback(name, cb.as_ref().unchecked_ref()) {
        log::warn!("Failed to remove {} listener: {:?}", name, e);
    }
}

fn preload_assets(window: &Window, config: &AppConfig) -> AppResult<ImageCache<HtmlImageElement>> {
    let document = window
        .document()
        .ok_or_else(|| AppError::Dom("no document".to_string()))?;
    let mut cache = ImageCache::new();
    for name in ASSET_NAMES {
        let image = document
            .create_element("img")
            .map_err(dom_error)?
            .dyn_into::<HtmlImageElement>()
            .map_err(|_| AppError::Dom("img is not an HtmlImageElement".to_string()))?;
        image.set_src(&config.asset_url(name));
        cache.insert(name, image);
    }
    Ok(cache)
}

/// The goal canvas of one game page.
#[wasm_bindgen]
pub struct GoalLine {
    view: SharedView,
    canvas: HtmlCanvasElement,
    window: Window,
    assets: ImageCache<HtmlImageElement>,
    input_registered: bool,
    mouse_down_cb: JsClosure<MouseEvent>,
    mouse_up_cb: JsClosure<MouseEvent>,
    mouse_move_cb: JsClosure<MouseEvent>,
    context_menu_cb: JsClosure<MouseEvent>,
    resize_cb: JsClosure<Event>,
}

#[wasm_bindgen]
impl GoalLine {
    /// Bind the goal canvas. `emit(event, payload)` sends to the server.
    #[wasm_bindgen(constructor)]
    pub fn new(emit: js_sys::Function, config_json: Option<String>) -> Result<GoalLine, JsValue> {
        Ok(Self::build(emit, config_json.as_deref())?)
    }

    /// Use a decoded image for one asset name (e.g. `"g3.png"`).
    #[wasm_bindgen(js_name = registerAsset)]
    pub fn register_asset(&mut self, name: &str, image: HtmlImageElement) {
        self.assets.insert(name, image);
    }

    /// Replace the goal line with the server's `[{idx, x, orientation}]`.
    pub fn initialize(&mut self, goal: JsValue, cube_index: Vec<i32>) -> Result<(), JsValue> {
        let entries: Vec<GoalEntry> = serde_wasm_bindgen::from_value(goal)?;
        let mut view = self
            .view
            .try_borrow_mut()
            .map_err(|_| AppError::Dom("goal line busy".to_string()))?;
        view.initialize(&entries, &self.assets, &cube_index)
            .map_err(AppError::from)?;
        Ok(())
    }

    /// Move a cube image from the resources onto the goal line. The element
    /// is removed from the page; the goal line keeps a copy.
    #[wasm_bindgen(js_name = addToken)]
    pub fn add_token(&mut self, source_index: usize, image: HtmlImageElement) -> Result<(), JsValue> {
        let copy = image
            .clone_node_with_deep(true)?
            .dyn_into::<HtmlImageElement>()
            .map_err(|_| AppError::Dom("cloned node is not an image".to_string()))?;
        image.remove();
        with_view(&self.view, |v| {
            v.add_token(source_index, copy);
        });
        Ok(())
    }

    pub fn clear(&mut self) {
        with_view(&self.view, |v| v.clear());
    }

    /// Apply one inbound update: `kind` is `"x_pos"` or `"orientation"`.
    /// Malformed updates are ignored and return false.
    #[wasm_bindgen(js_name = applyRemoteUpdate)]
    pub fn apply_remote_update(&mut self, kind: &str, order: usize, new_val: f64) -> bool {
        let mut applied = false;
        with_view(&self.view, |v| applied = v.apply_remote_parts(kind, order, new_val));
        applied
    }

    /// Deliver a server event (e.g. `"update_goalline"`) to the goal line.
    /// Returns the number of updates applied; unreadable payloads apply none.
    pub fn receive(&mut self, event: &str, payload: JsValue) -> usize {
        let payload: serde_json::Value = match serde_wasm_bindgen::from_value(payload) {
            Ok(payload) => payload,
            Err(e) => {
                log::warn!("Ignoring unreadable '{}' payload: {}", event, e);
                return 0;
            }
        };
        let mut applied = 0;
        with_view(&self.view, |v| {
            if v.widget_mut().channel_mut().dispatch(event, &payload) {
                applied = v.sync_remote();
            }
        });
        applied
    }

    /// Let the local player drag and rotate cubes.
    #[wasm_bindgen(js_name = registerInputHandlers)]
    pub fn register_input_handlers(&mut self) -> Result<(), JsValue> {
        if self.input_registered {
            return Ok(());
        }
        let target: &EventTarget = self.canvas.as_ref();
        listen(target, "mousedown", &self.mouse_down_cb)?;
        listen(target, "mouseup", &self.mouse_up_cb)?;
        listen(target, "mousemove", &self.mouse_move_cb)?;
        listen(target, "contextmenu", &self.context_menu_cb)?;
        self.input_registered = true;
        with_view(&self.view, |v| v.register_input_handlers());
        Ok(())
    }

    #[wasm_bindgen(js_name = deregisterInputHandlers)]
    pub fn deregister_input_handlers(&mut self) {
        self.remove_input_listeners();
        with_view(&self.view, |v| v.deregister_input_handlers());
    }

    /// Number of cubes on the goal line.
    #[wasm_bindgen(getter)]
    pub fn len(&self) -> usize {
        self.view.try_borrow().map_or(0, |v| v.widget().len())
    }
}

impl GoalLine {
    fn build(emit: js_sys::Function, config_json: Option<&str>) -> AppResult<GoalLine> {
        let config = match config_json {
            Some(json) => AppConfig::from_json(json)?,
            None => AppConfig::default(),
        };
        let window = web_sys::window().ok_or_else(|| AppError::Dom("no window".to_string()))?;
        let canvas = window
            .document()
            .and_then(|d| d.get_element_by_id(&config.canvas_id))
            .ok_or_else(|| AppError::Dom(format!("no element #{}", config.canvas_id)))?
            .dyn_into::<HtmlCanvasElement>()
            .map_err(|_| AppError::Dom(format!("#{} is not a canvas", config.canvas_id)))?;

        let view = GoalLineView::new(
            Canvas2dSurface::new(canvas.clone())?,
            viewport_size(&window)?,
            canvas_origin(&canvas),
            config.goal_line.clone(),
            JsEventChannel::new(emit),
        )?;
        let view: SharedView = Rc::new(RefCell::new(view));

        let assets = if config.preload_assets {
            preload_assets(&window, &config)?
        } else {
            ImageCache::new()
        };

        let mouse_down_cb = {
            let view = Rc::clone(&view);
            Closure::wrap(Box::new(move |e: MouseEvent| {
                if MouseButton::from_dom(e.button()) != Some(MouseButton::Left) {
                    return;
                }
                e.prevent_default();
                e.stop_propagation();
                with_view(&view, |v| {
                    v.pointer_down(client_point(&e));
                });
            }) as Box<dyn FnMut(MouseEvent)>)
        };

        let mouse_up_cb = {
            let view = Rc::clone(&view);
            Closure::wrap(Box::new(move |e: MouseEvent| {
                if MouseButton::from_dom(e.button()) != Some(MouseButton::Left) {
                    return;
                }
                e.prevent_default();
                e.stop_propagation();
                with_view(&view, |v| {
                    v.pointer_up();
                });
            }) as Box<dyn FnMut(MouseEvent)>)
        };

        let mouse_move_cb = {
            let view = Rc::clone(&view);
            Closure::wrap(Box::new(move |e: MouseEvent| {
                with_view(&view, |v| {
                    if v.pointer_move(client_point(&e)) {
                        e.prevent_default();
                        e.stop_propagation();
                    }
                });
            }) as Box<dyn FnMut(MouseEvent)>)
        };

        let context_menu_cb = {
            let view = Rc::clone(&view);
            Closure::wrap(Box::new(move |e: MouseEvent| {
                e.prevent_default();
                e.stop_propagation();
                with_view(&view, |v| {
                    v.secondary_click(client_point(&e));
                });
            }) as Box<dyn FnMut(MouseEvent)>)
        };

        let resize_cb = {
            let view = Rc::clone(&view);
            let window = window.clone();
            let canvas = canvas.clone();
            Closure::wrap(Box::new(move |_: Event| {
                let size = match viewport_size(&window) {
                    Ok(size) => size,
                    Err(e) => {
                        log::warn!("Ignoring resize: {}", e);
                        return;
                    }
                };
                with_view(&view, |v| {
                    if let Err(e) = v.resize(size, canvas_origin(&canvas)) {
                        log::error!("Goal line resize failed: {}", e);
                    }
                });
            }) as Box<dyn FnMut(Event)>)
        };
        listen(&window, "resize", &resize_cb)?;

        log::info!("Goal line bound to #{}", config.canvas_id);
        Ok(GoalLine {
            view,
            canvas,
            window,
            assets,
            input_registered: false,
            mouse_down_cb,
            mouse_up_cb,
            mouse_move_cb,
            context_menu_cb,
            resize_cb,
        })
    }

    fn remove_input_listeners(&mut self) {
        if !self.input_registered {
            return;
        }
        let target: &EventTarget = self.canvas.as_ref();
        unlisten(target, "mousedown", &self.mouse_down_cb);
        unlisten(target, "mouseup", &self.mouse_up_cb);
        unlisten(target, "mousemove", &self.mouse_move_cb);
        unlisten(target, "contextmenu", &self.context_menu_cb);
        self.input_registered = false;
    }
}

impl Drop for GoalLine {
    fn drop(&mut self) {
        self.remove_input_listeners();
        unlisten(&self.window, "resize", &self.resize_cb);
    }
}
