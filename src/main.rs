//! Stardust entry point
//!
//! The web build runs the simulation once per animation frame, draws it with
//! WebGPU and plays merge tones. The native build runs headless and logs
//! statistics.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_app {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{HtmlCanvasElement, KeyboardEvent, MouseEvent};

    use stardust::audio::AudioManager;
    use stardust::renderer::{RenderState, scene};
    use stardust::sim::{Simulation, tick};
    use stardust::{SimConfig, Settings};

    /// App instance holding all state
    struct App {
        sim: Simulation,
        settings: Settings,
        audio: AudioManager,
        render_state: Option<RenderState>,
    }

    impl App {
        fn new(config: SimConfig, seed: u64) -> Self {
            let settings = Settings::default();
            let mut audio = AudioManager::new(&config);
            audio.set_master_volume(settings.master_volume);
            Self {
                sim: Simulation::new(config, seed),
                settings,
                audio,
                render_state: None,
            }
        }

        /// One simulation step plus its sound
        fn update(&mut self) {
            tick(&mut self.sim);
            for mass in self.sim.merge_events() {
                self.audio.play_merge(mass);
            }
            self.audio.update();
        }

        fn render(&mut self) {
            let Some(render_state) = self.render_state.as_mut() else {
                return;
            };
            let vertices = scene(
                &self.sim.snapshot(),
                self.settings.trails,
                self.sim.config.trail_opacity,
                self.settings.quality.disc_detail(),
            );
            match render_state.render(&vertices) {
                Ok(_) => {}
                Err(wgpu::SurfaceError::Lost) => {
                    render_state.resize(render_state.size.0, render_state.size.1);
                }
                Err(wgpu::SurfaceError::OutOfMemory) => {
                    log::error!("Out of memory!");
                }
                Err(e) => log::warn!("Render error: {:?}", e),
            }
        }

        fn toggle_mute(&mut self) {
            let muted = !self.audio.is_muted();
            self.audio.set_muted(muted);
            log::info!("Audio {}", if muted { "muted" } else { "unmuted" });
        }

        fn cycle_quality(&mut self) {
            self.settings.quality = self.settings.quality.next();
            log::info!("Quality: {:?}", self.settings.quality);
        }

        fn restart(&mut self, seed: u64) {
            let config = self.sim.config.clone();
            self.sim = Simulation::new(config, seed);
        }
    }

    pub async fn run() {
        console_error_panic_hook::set_once();
        if console_log::init_with_level(log::Level::Info).is_err() {
            return;
        }

        log::info!("Stardust starting...");

        let Some(window) = web_sys::window() else {
            log::error!("no window");
            return;
        };
        let Some(document) = window.document() else {
            log::error!("no document");
            return;
        };
        let Some(canvas) = document
            .get_element_by_id("canvas")
            .and_then(|el| el.dyn_into::<HtmlCanvasElement>().ok())
        else {
            log::error!("no canvas element");
            return;
        };

        let config = SimConfig::default();
        canvas.set_width(config.width as u32);
        canvas.set_height(config.height as u32);
        let (width, height) = (canvas.width(), canvas.height());

        let seed = js_sys::Date::now() as u64;
        let app = Rc::new(RefCell::new(App::new(config.clone(), seed)));

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU | wgpu::Backends::GL,
            ..Default::default()
        });

        match instance.create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone())) {
            Ok(surface) => {
                let adapter = instance
                    .request_adapter(&wgpu::RequestAdapterOptions {
                        power_preference: wgpu::PowerPreference::HighPerformance,
                        compatible_surface: Some(&surface),
                        force_fallback_adapter: false,
                    })
                    .await;
                match adapter {
                    Ok(adapter) => {
                        log::info!("Using adapter: {:?}", adapter.get_info().name);
                        match RenderState::new(
                            surface,
                            &adapter,
                            width,
                            height,
                            (config.width, config.height),
                        )
                        .await
                        {
                            Ok(state) => app.borrow_mut().render_state = Some(state),
                            Err(e) => log::warn!("Failed to create device: {:?}", e),
                        }
                    }
                    Err(e) => log::warn!("No WebGPU adapter, rendering disabled: {:?}", e),
                }
            }
            Err(e) => log::warn!("Failed to create surface: {:?}", e),
        }

        setup_input_handlers(&canvas, app.clone());
        request_animation_frame(app);

        log::info!("Stardust running!");
    }

    fn setup_input_handlers(canvas: &HtmlCanvasElement, app: Rc<RefCell<App>>) {
        // Browsers only start audio after a user gesture
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                app.borrow().audio.resume();
            });
            let _ = canvas
                .add_event_listener_with_callback("mousedown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
            let mut a = app.borrow_mut();
            match event.key().as_str() {
                "m" | "M" => a.toggle_mute(),
                "t" | "T" => a.settings.trails = !a.settings.trails,
                "q" | "Q" => a.cycle_quality(),
                "r" | "R" => a.restart(js_sys::Date::now() as u64),
                _ => {}
            }
        });
        let _ =
            window.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn request_animation_frame(app: Rc<RefCell<App>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |_time: f64| {
            frame_loop(app);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn frame_loop(app: Rc<RefCell<App>>) {
        {
            let mut a = app.borrow_mut();
            a.update();
            a.render();
        }

        request_animation_frame(app);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    wasm_app::run().await;
}

/// Frames simulated by the headless driver
#[cfg(not(target_arch = "wasm32"))]
const HEADLESS_FRAMES: u64 = 3600;

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use stardust::SimConfig;
    use stardust::sim::{SimEvent, Simulation, tick};

    env_logger::init();
    log::info!("Stardust (native) starting headless run...");
    log::info!("Rendering and audio need the web build - run with `trunk serve`");

    let config = match std::env::var("STARDUST_CONFIG") {
        Ok(json) => match SimConfig::from_json(&json) {
            Ok(config) => config,
            Err(e) => {
                log::error!("{}", e);
                std::process::exit(1);
            }
        },
        Err(_) => SimConfig::default(),
    };

    let mut sim = Simulation::new(config, 0x5747_4152);
    let initial_mass = sim.total_mass();
    let (mut merges, mut splits) = (0usize, 0usize);

    for _ in 0..HEADLESS_FRAMES {
        tick(&mut sim);
        for event in sim.events() {
            match event {
                SimEvent::Merge { .. } => merges += 1,
                SimEvent::Split { .. } => splits += 1,
            }
        }
        if sim.frame() % 600 == 0 {
            let largest = sim
                .stars()
                .iter()
                .map(|s| s.radius())
                .fold(0.0f32, f32::max);
            log::info!(
                "frame {}: {} stars, largest radius {:.1}, {} merges, {} splits",
                sim.frame(),
                sim.star_count(),
                largest,
                merges,
                splits
            );
        }
    }

    let drift = (sim.total_mass() - initial_mass).abs() / initial_mass;
    log::info!("Done. Relative mass drift: {:.2e}", drift);
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
