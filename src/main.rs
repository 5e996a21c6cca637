//! Tilt Sandbox entry point
//!
//! Handles platform-specific initialization and runs the frame loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, HtmlCanvasElement, HtmlSelectElement, MouseEvent, TouchEvent};

    use tilt_sandbox::consts::FIRST_FRAME_DELTA;
    use tilt_sandbox::platform::web::WebSensors;
    use tilt_sandbox::renderer::RenderState;
    use tilt_sandbox::sim::{
        FrameInput, GameEvent, Sandbox, ScreenSize, TouchKind, tick,
    };
    use tilt_sandbox::{Result, SandboxError, Settings};

    /// Sandbox instance holding all state
    struct Game {
        sandbox: Sandbox,
        settings: Settings,
        render_state: Option<RenderState>,
        sensors: WebSensors,
        /// Inputs collected since the last frame
        input: FrameInput,
        last_time: f64,
        // FPS tracking
        frame_times: [f64; 60],
        frame_index: usize,
        fps: u32,
    }

    impl Game {
        fn new(settings: Settings, screen: ScreenSize) -> Self {
            let mut input = FrameInput::idle(FIRST_FRAME_DELTA, screen);
            input.events.push(GameEvent::Started);
            Self {
                sandbox: Sandbox::new(settings.physics.clone(), screen),
                settings,
                render_state: None,
                sensors: WebSensors::default(),
                input,
                last_time: 0.0,
                frame_times: [0.0; 60],
                frame_index: 0,
                fps: 0,
            }
        }

        fn push_touch(&mut self, kind: TouchKind, x: f32, y: f32) {
            self.input.touches.push(tilt_sandbox::sim::TouchEvent {
                kind,
                pos: glam::Vec2::new(x, y),
            });
        }

        /// Run one frame step
        fn update(&mut self, dt: f32, time: f64) {
            self.input.delta = dt;
            tick(&mut self.sandbox, &self.input);
            // Clear one-shot inputs after processing
            self.input.clear();

            // Track frame times for FPS
            self.frame_times[self.frame_index] = time;
            self.frame_index = (self.frame_index + 1) % 60;

            // Calculate FPS from oldest to newest frame
            let oldest_time = self.frame_times[self.frame_index];
            if oldest_time > 0.0 {
                let elapsed = time - oldest_time;
                if elapsed > 0.0 {
                    self.fps = (60000.0 / elapsed).round() as u32;
                }
            }
        }

        /// Render the current frame
        fn render(&mut self) {
            if let Some(ref mut render_state) = self.render_state {
                match render_state.render(&self.sandbox) {
                    Ok(_) => {}
                    Err(wgpu::SurfaceError::Lost) => {
                        let (w, h) = render_state.size;
                        let logical = render_state.logical_size;
                        render_state.resize(w, h, logical);
                    }
                    Err(wgpu::SurfaceError::OutOfMemory) => {
                        log::error!("Out of memory!");
                    }
                    Err(e) => log::warn!("Render error: {:?}", e),
                }
            }
        }

        fn toggle_sensor(&mut self) {
            match self.sandbox.toggle_sensor(&mut self.sensors) {
                Ok(enabled) => log::info!("Sensor gravity {}", if enabled { "on" } else { "off" }),
                Err(e) => log::warn!("Sensor toggle failed: {}", e),
            }
        }

        /// Switch preset, persist it and rebuild the scene
        fn select_preset(&mut self, name: &str) {
            let preset = match self.settings.select_preset(name) {
                Ok(preset) => preset,
                Err(e) => {
                    log::warn!("{}", e);
                    return;
                }
            };
            self.sandbox
                .reconfigure(self.settings.physics.clone(), &mut self.sensors);
            self.input.clear();
            log::info!("Preset: {}", preset.as_str());
            if self.settings.sensor_on_start {
                self.toggle_sensor();
            }
        }

        /// Update HUD elements in DOM
        fn update_hud(&self, document: &Document) {
            if let Some(el) = document.query_selector("#hud-entities .hud-value").ok().flatten() {
                el.set_text_content(Some(&self.sandbox.entity_count().to_string()));
            }
            if let Some(el) = document.get_element_by_id("hud-entities") {
                let class = if self.settings.show_entity_count { "hud-item" } else { "hud-item hidden" };
                let _ = el.set_attribute("class", class);
            }

            if let Some(el) = document.query_selector("#hud-fps .hud-value").ok().flatten() {
                el.set_text_content(Some(&self.fps.to_string()));
            }
            if let Some(el) = document.get_element_by_id("hud-fps") {
                let class = if self.settings.show_fps { "hud-item" } else { "hud-item hidden" };
                let _ = el.set_attribute("class", class);
            }

            if let Some(btn) = document.get_element_by_id("sensor-btn") {
                let gravity = &self.sandbox.gravity;
                if gravity.source().uses_sensor() {
                    let state = if gravity.is_enabled() { "on" } else { "off" };
                    btn.set_text_content(Some(&format!("{}: {}", gravity.source().as_str(), state)));
                    let _ = btn.set_attribute("class", "");
                } else {
                    let _ = btn.set_attribute("class", "hidden");
                }
            }
        }
    }

    /// Logical and physical canvas size
    fn canvas_size(canvas: &HtmlCanvasElement) -> (ScreenSize, u32, u32) {
        let dpr = web_sys::window().map(|w| w.device_pixel_ratio()).unwrap_or(1.0);
        let client_w = canvas.client_width();
        let client_h = canvas.client_height();
        (
            ScreenSize::new(client_w as f32, client_h as f32),
            (client_w as f64 * dpr) as u32,
            (client_h as f64 * dpr) as u32,
        )
    }

    pub async fn run() -> Result<()> {
        console_error_panic_hook::set_once();
        if let Err(e) = console_log::init_with_level(log::Level::Info) {
            web_sys::console::warn_1(&format!("Logger init failed: {}", e).into());
        }

        log::info!("Tilt Sandbox starting...");

        let window = web_sys::window().ok_or_else(|| SandboxError::Graphics("no window".into()))?;
        let document = window
            .document()
            .ok_or_else(|| SandboxError::Graphics("no document".into()))?;

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .ok_or_else(|| SandboxError::Graphics("no canvas".into()))?
            .dyn_into()
            .map_err(|_| SandboxError::Graphics("#canvas is not a canvas".into()))?;

        let (screen, width, height) = canvas_size(&canvas);
        canvas.set_width(width);
        canvas.set_height(height);

        let settings = Settings::load();
        log::info!("Preset: {}", settings.preset.as_str());
        let sensor_on_start = settings.sensor_on_start;
        let game = Rc::new(RefCell::new(Game::new(settings, screen)));

        // Initialize WebGPU
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU | wgpu::Backends::GL,
            ..Default::default()
        });

        let surface = instance
            .create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))
            .map_err(|e| SandboxError::Graphics(e.to_string()))?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::LowPower,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| SandboxError::Graphics(e.to_string()))?;

        log::info!("Using adapter: {:?}", adapter.get_info().name);

        let render_state =
            RenderState::new(surface, &adapter, width, height, (screen.width, screen.height)).await?;
        game.borrow_mut().render_state = Some(render_state);

        if sensor_on_start {
            game.borrow_mut().toggle_sensor();
        }

        setup_input_handlers(&canvas, game.clone());
        setup_buttons(&document, game.clone());
        setup_resize(&canvas, game.clone());

        // Hide loading indicator
        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        // Start frame loop
        request_animation_frame(game);

        log::info!("Tilt Sandbox running!");
        Ok(())
    }

    fn setup_input_handlers(canvas: &HtmlCanvasElement, game: Rc<RefCell<Game>>) {
        // Touches: every changed touch becomes one event
        for (name, kind) in [
            ("touchstart", TouchKind::Press),
            ("touchmove", TouchKind::Move),
            ("touchend", TouchKind::Release),
        ] {
            let game = game.clone();
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                let rect = canvas_clone.get_bounding_client_rect();
                let touches = event.changed_touches();
                let mut g = game.borrow_mut();
                for i in 0..touches.length() {
                    if let Some(touch) = touches.get(i) {
                        let x = touch.client_x() as f32 - rect.left() as f32;
                        let y = touch.client_y() as f32 - rect.top() as f32;
                        g.push_touch(kind, x, y);
                    }
                }
            });
            let _ = canvas.add_event_listener_with_callback(name, closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Mouse click acts as a press on desktop
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                game.borrow_mut()
                    .push_touch(TouchKind::Press, event.offset_x() as f32, event.offset_y() as f32);
            });
            let _ = canvas
                .add_event_listener_with_callback("mousedown", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_buttons(document: &Document, game: Rc<RefCell<Game>>) {
        if let Some(btn) = document.get_element_by_id("reset-btn") {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                event.stop_propagation();
                game.borrow_mut().input.events.push(GameEvent::Reset);
                log::info!("Reset requested");
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        if let Some(btn) = document.get_element_by_id("sensor-btn") {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                event.stop_propagation();
                game.borrow_mut().toggle_sensor();
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        let select = document
            .get_element_by_id("preset-select")
            .and_then(|el| el.dyn_into::<HtmlSelectElement>().ok());
        if let Some(select) = select {
            select.set_value(game.borrow().settings.preset.as_str());
            let select_clone = select.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                game.borrow_mut().select_preset(&select_clone.value());
            });
            let _ = select.add_event_listener_with_callback("change", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_resize(canvas: &HtmlCanvasElement, game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let canvas = canvas.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            let (screen, width, height) = canvas_size(&canvas);
            canvas.set_width(width);
            canvas.set_height(height);
            let mut g = game.borrow_mut();
            g.input.screen = screen;
            if let Some(ref mut render_state) = g.render_state {
                render_state.resize(width, height, (screen.width, screen.height));
            }
        });
        let _ = window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        {
            let mut g = game.borrow_mut();

            // Calculate delta time
            let dt = if g.last_time > 0.0 {
                ((time - g.last_time) / 1000.0) as f32
            } else {
                FIRST_FRAME_DELTA
            };
            g.last_time = time;

            g.update(dt, time);
            g.render();
            if let Some(document) = web_sys::window().and_then(|w| w.document()) {
                g.update_hud(&document);
            }
        }

        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    if let Err(e) = wasm_game::run().await {
        log::error!("Tilt Sandbox failed to start: {}", e);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Tilt Sandbox (native) starting...");
    log::info!("Native mode runs a headless session - run with `trunk serve` for the web version");

    let mut settings = tilt_sandbox::Settings::load();
    if let Some(name) = std::env::args().nth(1) {
        match tilt_sandbox::Settings::from_preset_name(&name) {
            Ok(preset) => settings = preset,
            Err(e) => {
                log::error!("{}", e);
                std::process::exit(2);
            }
        }
    }

    headless::run(&settings, 0x5eed);
}

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use glam::Vec2;
    use rand::{Rng, SeedableRng};
    use rand_pcg::Pcg32;

    use tilt_sandbox::Settings;
    use tilt_sandbox::platform::ScriptedSensors;
    use tilt_sandbox::sim::{
        FrameInput, GameEvent, Sandbox, ScreenSize, SensorSample, TouchEvent, tick,
    };

    const DT: f32 = 1.0 / 60.0;

    /// Scripted session: start, random taps, tilt, reset
    pub fn run(settings: &Settings, seed: u64) {
        let screen = ScreenSize::new(390.0, 844.0);
        let mut rng = Pcg32::seed_from_u64(seed);
        let mut sensors = ScriptedSensors::default();
        let mut sandbox = Sandbox::new(settings.physics.clone(), screen);

        let mut input = FrameInput::idle(DT, screen);
        input.events.push(GameEvent::Started);
        tick(&mut sandbox, &input);
        log::info!("Started with {} entities", sandbox.entity_count());

        if sandbox.gravity.source().uses_sensor() {
            match sandbox.toggle_sensor(&mut sensors) {
                Ok(enabled) => log::info!("Sensor gravity enabled: {}", enabled),
                Err(e) => log::warn!("{}", e),
            }
        }

        for frame in 0..180u32 {
            let mut input = FrameInput::idle(DT, screen);
            if frame % 20 == 0 {
                let x = rng.random_range(40.0..screen.width - 40.0);
                let y = rng.random_range(80.0..screen.height / 2.0);
                input.touches.push(TouchEvent::press(x, y));
            }
            if frame == 90 {
                // Tip the device to the left
                sensors.emit(SensorSample::new(-0.7, 0.7, 0.0));
            }
            tick(&mut sandbox, &input);
        }
        log::info!(
            "After 180 frames: {} entities, gravity {:?}",
            sandbox.entity_count(),
            sandbox.world().gravity()
        );
        for entity in sandbox.entities().filter(|e| !e.is_static) {
            if let Some((pos, angle)) = sandbox.pose(entity.id) {
                log::info!(
                    "  #{:<3} {:?} at ({:.0}, {:.0}) angle {:.2}",
                    entity.id,
                    entity.role,
                    pos.x,
                    pos.y,
                    angle
                );
            }
        }

        let mut input = FrameInput::idle(DT, screen);
        input.events.push(GameEvent::Reset);
        tick(&mut sandbox, &input);
        while !sandbox.is_running() {
            tick(&mut sandbox, &FrameInput::idle(DT, screen));
        }
        log::info!(
            "After reset: {} entities, {} bodies",
            sandbox.entity_count(),
            sandbox.world().body_count()
        );

        let start = sandbox.entities().next().map(|e| e.id);
        if let Some((pos, _)) = start.and_then(|id| sandbox.pose(id)) {
            let center = Vec2::new(screen.width / 2.0, screen.height / 2.0);
            log::info!("Start box re-seeded at {:?} (centre {:?})", pos, center);
        }
    }
}
