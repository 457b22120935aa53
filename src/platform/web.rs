//! Browser facade
//!
//! Exposes a simulation to JavaScript. Canvas drawing, pointer capture and
//! the `requestAnimationFrame` loop stay on the JS side: the page calls
//! `frame()` once per animation frame, forwards canvas clicks to `click()`
//! and draws from `renderJson()`.
//!
//! JS listeners get a `FrameCommands` handle as their last argument. Calling
//! back into the `ChainReaction` object from inside a listener would be a
//! recursive borrow, so mutations go through that handle instead.

use std::cell::RefCell;
use std::rc::Rc;

use js_sys::Function;
use serde::Serialize;
use wasm_bindgen::prelude::*;

use crate::config::SimConfig;
use crate::sim::{Ball, BallSpec, Command, Commands, ExplosionView, ListenerId, Simulation, Snapshot};

fn js_error(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// Commands queued by JS listeners during one dispatch
#[wasm_bindgen]
pub struct FrameCommands {
    queue: Rc<RefCell<Vec<Command>>>,
}

#[wasm_bindgen]
impl FrameCommands {
    pub fn explode(&self, pos_x: f32, pos_y: f32, max_radius: f32) {
        self.queue.borrow_mut().push(Command::Explode {
            pos: glam::Vec2::new(pos_x, pos_y),
            max_radius,
        });
    }

    #[wasm_bindgen(js_name = removeBall)]
    pub fn remove_ball(&self, id: String) {
        self.queue.borrow_mut().push(Command::RemoveBall(id));
    }

    #[wasm_bindgen(js_name = addBall)]
    pub fn add_ball(&self, pos_x: f32, pos_y: f32, color: Option<String>) {
        let mut spec = BallSpec::new().pos(pos_x, pos_y);
        spec.color = color;
        self.queue.borrow_mut().push(Command::AddBall(spec));
    }
}

/// Run a JS listener, moving whatever it queued into `commands`
fn call_listener(
    listener: &Function,
    args: &[JsValue],
    commands: &mut Commands,
) -> anyhow::Result<()> {
    let queue = Rc::new(RefCell::new(Vec::new()));
    let handle = JsValue::from(FrameCommands {
        queue: queue.clone(),
    });

    let call_args = js_sys::Array::new();
    for arg in args {
        call_args.push(arg);
    }
    call_args.push(&handle);

    let result = listener.apply(&JsValue::NULL, &call_args);
    for command in queue.borrow_mut().drain(..) {
        commands.push(command);
    }
    result
        .map(|_| ())
        .map_err(|err| anyhow::anyhow!("{:?}", err))
}

#[derive(Serialize)]
struct RenderFrame<'a> {
    balls: &'a [Ball],
    explosions: Vec<ExplosionView>,
}

/// A chain reaction simulation driven from JavaScript
#[wasm_bindgen]
pub struct ChainReaction {
    sim: Simulation,
    listeners: Vec<(Function, ListenerId)>,
}

#[wasm_bindgen]
impl ChainReaction {
    #[wasm_bindgen(constructor)]
    pub fn new(width: f32, height: f32) -> Result<ChainReaction, JsValue> {
        console_error_panic_hook::set_once();
        // A second instance finds the logger already installed
        let _ = console_log::init_with_level(log::Level::Info);

        let sim = Simulation::new(SimConfig::with_size(width, height)).map_err(js_error)?;
        Ok(Self {
            sim,
            listeners: Vec::new(),
        })
    }

    /// Add a ball; unset fields are randomized. Returns the id.
    #[wasm_bindgen(js_name = addBall)]
    pub fn add_ball(
        &mut self,
        id: Option<String>,
        pos_x: Option<f32>,
        pos_y: Option<f32>,
        speed_x: Option<f32>,
        speed_y: Option<f32>,
        color: Option<String>,
    ) -> String {
        self.sim.add_ball(BallSpec {
            id,
            pos_x,
            pos_y,
            speed_x,
            speed_y,
            color,
        })
    }

    #[wasm_bindgen(js_name = removeBall)]
    pub fn remove_ball(&mut self, id: &str) {
        self.sim.remove_ball(id);
    }

    pub fn explode(&mut self, pos_x: f32, pos_y: f32, max_radius: f32) -> bool {
        self.sim.explode(pos_x, pos_y, max_radius)
    }

    /// Register `listener(posX, posY, commands)`; returns the listener
    #[wasm_bindgen(js_name = onClick)]
    pub fn on_click(&mut self, listener: Function) -> Function {
        let callback = listener.clone();
        let id = self.sim.on_click(move |pos, commands| {
            call_listener(
                &callback,
                &[JsValue::from_f64(pos.x as f64), JsValue::from_f64(pos.y as f64)],
                commands,
            )
        });
        self.listeners.push((listener.clone(), id));
        listener
    }

    /// Register `listener(posX, posY, ballId, commands)`; returns the listener
    #[wasm_bindgen(js_name = onTouchExplosion)]
    pub fn on_touch_explosion(&mut self, listener: Function) -> Function {
        let callback = listener.clone();
        let id = self.sim.on_touch_explosion(move |touch, commands| {
            call_listener(
                &callback,
                &[
                    JsValue::from_f64(touch.pos.x as f64),
                    JsValue::from_f64(touch.pos.y as f64),
                    JsValue::from_str(&touch.ball_id),
                ],
                commands,
            )
        });
        self.listeners.push((listener.clone(), id));
        listener
    }

    /// Unregister a listener by identity
    #[wasm_bindgen(js_name = removeListener)]
    pub fn remove_listener(&mut self, listener: &Function) -> bool {
        let Some(index) = self
            .listeners
            .iter()
            .position(|(f, _)| js_sys::Object::is(f, listener))
        else {
            return false;
        };
        let (_, id) = self.listeners.remove(index);
        self.sim.remove_listener(id)
    }

    /// Forward a canvas-relative click
    pub fn click(&mut self, pos_x: f32, pos_y: f32) {
        self.sim.click(pos_x, pos_y);
    }

    /// One animation frame; returns the number of touched balls
    pub fn frame(&mut self) -> usize {
        self.sim.tick().touched.len()
    }

    /// Balls and explosions for drawing, as JSON
    #[wasm_bindgen(js_name = renderJson)]
    pub fn render_json(&self) -> Result<String, JsValue> {
        let frame = RenderFrame {
            balls: self.sim.balls(),
            explosions: self.sim.render_explosions(),
        };
        serde_json::to_string(&frame).map_err(js_error)
    }

    #[wasm_bindgen(js_name = toJson)]
    pub fn to_json(&self) -> Result<String, JsValue> {
        self.sim.serialize().to_json().map_err(js_error)
    }

    #[wasm_bindgen(js_name = fromJson)]
    pub fn from_json(&mut self, json: &str) -> Result<(), JsValue> {
        let snapshot = Snapshot::from_json(json).map_err(js_error)?;
        self.sim.deserialize(snapshot).map_err(js_error)
    }

    pub fn reset(&mut self) {
        self.sim.reset();
    }

    #[wasm_bindgen(js_name = isEmpty)]
    pub fn is_empty(&self) -> bool {
        self.sim.is_empty()
    }

    #[wasm_bindgen(js_name = ballCount)]
    pub fn ball_count(&self) -> usize {
        self.sim.ball_count()
    }
}
