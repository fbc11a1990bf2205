//! Neon Invaders entry point
//!
//! Browser: wires the DOM (canvas, buttons, keys, HUD) to a [`Session`] and
//! drives it from `requestAnimationFrame`.
//! Native: runs the same session headless under the autopilot.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{CanvasRenderingContext2d, Document, HtmlCanvasElement, KeyboardEvent};

    use neon_invaders::audio::WebAudio;
    use neon_invaders::renderer::{CanvasPainter, RenderFrame};
    use neon_invaders::sim::{Arena, Control, GameEvent, InputSource, Session};
    use neon_invaders::{FrameLoop, LoopTicket, Settings, Tuning};

    /// Everything the page callbacks share
    struct Game {
        session: Session,
        audio: WebAudio,
        painter: CanvasPainter,
        canvas: HtmlCanvasElement,
        frame_loop: FrameLoop,
    }

    impl Game {
        /// Run one display frame
        fn frame(&mut self, time: f64) {
            self.session.frame(time, &self.audio);
            let events = self.session.drain_events();
            if !events.is_empty() {
                update_hud(&events);
            }
            self.painter.paint(&RenderFrame::capture(self.session.state()));
        }

        /// Match the canvas to its container
        fn fit_canvas(&mut self) {
            let (w, h) = container_size(&self.canvas);
            self.canvas.set_width(w);
            self.canvas.set_height(h);
            self.session.resize(Arena::new(w as f32, h as f32));
        }
    }

    fn document() -> Option<Document> {
        web_sys::window()?.document()
    }

    fn now_ms() -> f64 {
        web_sys::window()
            .and_then(|w| w.performance())
            .map(|p| p.now())
            .unwrap_or_else(js_sys::Date::now)
    }

    /// Canvas size from the parent element (falls back to the window)
    fn container_size(canvas: &HtmlCanvasElement) -> (u32, u32) {
        if let Some(parent) = canvas.parent_element() {
            let (w, h) = (parent.client_width(), parent.client_height());
            if w > 0 && h > 0 {
                return (w as u32, h as u32);
            }
        }
        let window = web_sys::window();
        let dim = |v: Option<Result<JsValue, JsValue>>| {
            v.and_then(|r| r.ok())
                .and_then(|v| v.as_f64())
                .unwrap_or(0.0) as u32
        };
        (
            dim(window.as_ref().map(|w| w.inner_width())),
            dim(window.as_ref().map(|w| w.inner_height())),
        )
    }

    /// JSON embedded in the page under `id`, if any
    fn page_json(document: &Document, id: &str) -> Option<String> {
        document
            .get_element_by_id(id)?
            .text_content()
            .filter(|s| !s.trim().is_empty())
    }

    fn load_tuning(document: &Document) -> Tuning {
        let Some(json) = page_json(document, "tuning") else {
            return Tuning::default();
        };
        match Tuning::from_json(&json) {
            Ok(tuning) => {
                log::info!("Using page tuning");
                tuning
            }
            Err(e) => {
                log::warn!("Invalid tuning ({}) - using defaults", e);
                Tuning::default()
            }
        }
    }

    fn set_active(document: &Document, id: &str, active: bool) {
        if let Some(el) = document.get_element_by_id(id) {
            let classes = el.class_list();
            let _ = if active {
                classes.add_1("active")
            } else {
                classes.remove_1("active")
            };
        }
    }

    fn set_text(document: &Document, id: &str, text: &str) {
        if let Some(el) = document.get_element_by_id(id) {
            el.set_text_content(Some(text));
        }
    }

    /// Reflect game events in the DOM
    fn update_hud(events: &[GameEvent]) {
        let Some(document) = document() else {
            return;
        };
        for event in events {
            match *event {
                GameEvent::SessionStarted => {
                    set_active(&document, "start-screen", false);
                    set_active(&document, "game-over-screen", false);
                }
                GameEvent::ScoreChanged(score) => {
                    set_text(&document, "score", &score.to_string());
                }
                GameEvent::GameOver { final_score } => {
                    set_text(&document, "final-score", &final_score.to_string());
                    set_active(&document, "game-over-screen", true);
                }
                GameEvent::WaveCleared { wave } | GameEvent::WaveStarted { wave } => {
                    log::debug!("{:?} (wave {})", event, wave + 1);
                }
            }
        }
    }

    pub fn run() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        if console_log::init_with_level(log::Level::Info).is_err() {
            web_sys::console::warn_1(&"Logger already initialized".into());
        }

        log::info!("Neon Invaders starting...");

        let document = document().ok_or("no document")?;
        let canvas: HtmlCanvasElement = document
            .get_element_by_id("gameCanvas")
            .or_else(|| document.get_element_by_id("canvas"))
            .ok_or("no canvas")?
            .dyn_into()?;
        let ctx: CanvasRenderingContext2d = canvas
            .get_context("2d")?
            .ok_or("2d context unavailable")?
            .dyn_into()?;

        let settings = page_json(&document, "settings")
            .map(|json| Settings::from_json_or_default(&json))
            .unwrap_or_default();
        let tuning = load_tuning(&document);

        let (w, h) = container_size(&canvas);
        canvas.set_width(w);
        canvas.set_height(h);

        let seed = js_sys::Date::now() as u64;
        let audio = WebAudio::new();
        audio.apply_settings(&settings);

        let game = Rc::new(RefCell::new(Game {
            session: Session::new(seed, Arena::new(w as f32, h as f32), tuning, settings),
            audio,
            painter: CanvasPainter::new(ctx),
            canvas,
            frame_loop: FrameLoop::new(),
        }));
        log::info!("Game initialized with seed: {}", seed);

        setup_keyboard(&document, game.clone());
        for (id, control) in [
            ("btn-left", Control::Left),
            ("btn-right", Control::Right),
            ("btn-fire", Control::Fire),
        ] {
            setup_touch_button(&document, id, control, game.clone());
        }
        for id in ["start-btn", "restart-btn"] {
            setup_start_button(&document, id, game.clone());
        }
        setup_resize(game.clone());
        setup_auto_pause(&document, game.clone());

        // Title screen backdrop animates too
        start_loop(&game);

        log::info!("Neon Invaders running!");
        Ok(())
    }

    /// Retire any running frame chain and start a fresh one
    fn start_loop(game: &Rc<RefCell<Game>>) {
        let (ticket, stale) = game.borrow_mut().frame_loop.restart();
        if let (Some(id), Some(window)) = (stale, web_sys::window()) {
            let _ = window.cancel_animation_frame(id);
            log::debug!("Cancelled frame request {}", id);
        }
        request_animation_frame(game.clone(), ticket);
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>, ticket: LoopTicket) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let callback_game = game.clone();
        let closure = Closure::once(move |time: f64| {
            game_loop(callback_game, ticket, time);
        });
        match window.request_animation_frame(closure.as_ref().unchecked_ref()) {
            Ok(id) => {
                game.borrow_mut().frame_loop.record_request(ticket, id);
            }
            Err(e) => log::warn!("requestAnimationFrame failed: {:?}", e),
        }
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, ticket: LoopTicket, time: f64) {
        {
            let mut g = game.borrow_mut();
            if !g.frame_loop.is_current(ticket) {
                log::debug!("Dropping frame from retired loop");
                return;
            }
            g.frame_loop.frame_started(ticket);
            g.frame(time);
        }

        request_animation_frame(game, ticket);
    }

    fn setup_keyboard(document: &Document, game: Rc<RefCell<Game>>) {
        let key_control = |code: &str| match code {
            "ArrowLeft" | "KeyA" => Some(Control::Left),
            "ArrowRight" | "KeyD" => Some(Control::Right),
            "Space" => Some(Control::Fire),
            _ => None,
        };

        // Key down
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let code = event.code();
                if code == "Escape" {
                    game.borrow_mut().session.toggle_pause();
                    return;
                }
                let Some(control) = key_control(&code) else {
                    return;
                };
                event.prevent_default();
                // Holding space must not auto-fire
                if matches!(control, Control::Fire) && event.repeat() {
                    return;
                }
                game.borrow_mut()
                    .session
                    .control(control, InputSource::Keyboard, true);
            });
            let _ = document
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Key up
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                if let Some(control) = key_control(&event.code()) {
                    game.borrow_mut()
                        .session
                        .control(control, InputSource::Keyboard, false);
                }
            });
            let _ = document
                .add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    /// On-screen button: touch and mouse both hold/release the control, and a
    /// press resumes a paused game
    fn setup_touch_button(
        document: &Document,
        id: &str,
        control: Control,
        game: Rc<RefCell<Game>>,
    ) {
        let Some(btn) = document.get_element_by_id(id) else {
            log::debug!("No #{} button on this page", id);
            return;
        };
        for (event_name, held) in [
            ("touchstart", true),
            ("touchend", false),
            ("touchcancel", false),
            ("mousedown", true),
            ("mouseup", false),
            ("mouseleave", false),
        ] {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::Event| {
                event.prevent_default();
                // A mouse leaving never fires
                if !held && matches!(control, Control::Fire) {
                    return;
                }
                // Also resumes a paused game on press
                game.borrow_mut()
                    .session
                    .control(control, InputSource::Touch, held);
            });
            let _ = btn.add_event_listener_with_callback(event_name, closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_start_button(document: &Document, id: &str, game: Rc<RefCell<Game>>) {
        let Some(btn) = document.get_element_by_id(id) else {
            return;
        };
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
            {
                let mut g = game.borrow_mut();
                // First user gesture unlocks audio
                g.audio.resume();
                g.session.start(now_ms());
                let events = g.session.drain_events();
                update_hud(&events);
            }
            start_loop(&game);
        });
        let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_resize(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            game.borrow_mut().fit_canvas();
        });
        let _ = window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_auto_pause(document: &Document, game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };

        // Visibility change (tab switch, minimize)
        {
            let game = game.clone();
            let document_clone = document.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                if document_clone.visibility_state() == web_sys::VisibilityState::Hidden {
                    let mut g = game.borrow_mut();
                    if g.session.settings().auto_pause {
                        g.session.set_paused(true);
                        log::info!("Auto-paused (tab hidden)");
                    }
                }
            });
            let _ = document.add_event_listener_with_callback(
                "visibilitychange",
                closure.as_ref().unchecked_ref(),
            );
            closure.forget();
        }

        // Window blur (click outside)
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                let mut g = game.borrow_mut();
                if g.session.settings().auto_pause {
                    g.session.set_paused(true);
                    log::info!("Auto-paused (window blur)");
                }
            });
            let _ = window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use std::path::PathBuf;

    use anyhow::{Context, Result, ensure};
    use clap::Parser;

    use neon_invaders::audio::{SoundEffect, SoundLog};
    use neon_invaders::sim::{Arena, GameEvent, GamePhase, Session};
    use neon_invaders::{Settings, Tuning};

    /// Play Neon Invaders headless with the autopilot at the controls
    #[derive(Parser, Debug)]
    #[command(name = "neon-invaders", version, about)]
    struct Args {
        /// RNG seed
        #[arg(long, default_value_t = 1)]
        seed: u64,
        /// Simulated play time
        #[arg(long, default_value_t = 60.0)]
        seconds: f64,
        /// Simulated display refresh rate
        #[arg(long, default_value_t = 60.0)]
        fps: f64,
        /// Arena width (px)
        #[arg(long, default_value_t = 800.0)]
        width: f32,
        /// Arena height (px)
        #[arg(long, default_value_t = 600.0)]
        height: f32,
        /// JSON file overriding gameplay tuning
        #[arg(long)]
        tuning: Option<PathBuf>,
        /// Print every game event
        #[arg(long)]
        verbose: bool,
    }

    fn load_tuning(path: Option<&PathBuf>) -> Result<Tuning> {
        let Some(path) = path else {
            return Ok(Tuning::default());
        };
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Tuning::from_json(&json).with_context(|| format!("invalid tuning in {}", path.display()))
    }

    pub fn run() -> Result<()> {
        let args = Args::parse();
        ensure!(args.fps.is_finite() && args.fps > 0.0, "--fps must be positive");
        ensure!(
            args.seconds.is_finite() && args.seconds >= 0.0,
            "--seconds must not be negative"
        );
        ensure!(
            args.width > 0.0 && args.height > 0.0,
            "arena must have a positive size"
        );

        let tuning = load_tuning(args.tuning.as_ref())?;
        let mut session = Session::new(
            args.seed,
            Arena::new(args.width, args.height),
            tuning,
            Settings::default(),
        );
        session.set_autopilot(true);

        let sounds = SoundLog::default();
        let frame_ms = 1000.0 / args.fps;
        let total_frames = (args.seconds * args.fps).round() as u64;
        let mut waves_cleared = 0u32;

        session.start(0.0);
        for i in 1..=total_frames {
            let now = i as f64 * frame_ms;
            session.frame(now, &sounds);
            for event in session.drain_events() {
                if args.verbose {
                    println!("{:>10.1} ms  {:?}", now, event);
                }
                if let GameEvent::WaveCleared { .. } = event {
                    waves_cleared += 1;
                }
            }
            if session.phase() == GamePhase::GameOver {
                break;
            }
        }

        let state = session.state();
        let outcome = match state.phase {
            GamePhase::GameOver => "ship destroyed",
            _ => "survived",
        };
        println!("seed:          {}", args.seed);
        println!("outcome:       {}", outcome);
        println!("score:         {}", state.score);
        println!("wave:          {}", state.wave + 1);
        println!("waves cleared: {}", waves_cleared);
        println!("frames:        {}", state.frames);
        println!(
            "shots:         {} ({} explosions)",
            sounds.count(SoundEffect::Shoot),
            sounds.count(SoundEffect::Explosion)
        );
        Ok(())
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() -> Result<(), JsValue> {
    wasm_game::run()
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> anyhow::Result<()> {
    env_logger::init();
    headless::run()
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
