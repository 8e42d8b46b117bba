//! Lightballs: shoot the green spheres from a lightcycle on a reflective floor.

mod config;
mod controls;
mod events;
mod hud;
mod player;
mod render;
mod scene;
mod selection;
mod simulation;

use std::sync::Arc;

use anyhow::Result;
use engine_core::Time;
use input::InputState;
use renderer::{Renderer, RendererError};
use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Fullscreen, Window, WindowId},
};

use config::GameConfig;
use scene::Scene;

/// Everything the event loop drives.
struct GameState {
    renderer: Renderer,
    scene: Scene,
    input: InputState,
    time: Time,
    config: GameConfig,
    running: bool,
}

impl GameState {
    async fn new(window: Arc<Window>, config: GameConfig) -> Result<Self> {
        let renderer = Renderer::new(window, config.vsync, &scene::floor_mesh()).await?;

        let mut scene = Scene::new(config.seed, config.follow_radius);
        let (width, height) = renderer.dimensions();
        scene.camera.set_aspect(width, height);
        log::info!("Spawned {} spheres", scene.spheres.len());

        Ok(Self {
            renderer,
            scene,
            input: InputState::new(),
            time: Time::new(),
            config,
            running: true,
        })
    }
}

struct App {
    state: Option<GameState>,
}

impl App {
    fn new() -> Self {
        Self { state: None }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() {
            return;
        }
        let config = GameConfig::load();
        let mut window_attrs = Window::default_attributes()
            .with_title("Lightballs")
            .with_inner_size(winit::dpi::LogicalSize::new(config.window_width, config.window_height));
        if config.fullscreen {
            window_attrs = window_attrs.with_fullscreen(Some(Fullscreen::Borderless(None)));
        }

        let window = match event_loop.create_window(window_attrs) {
            Ok(w) => Arc::new(w),
            Err(e) => {
                log::error!("Failed to create window: {}", e);
                event_loop.exit();
                return;
            }
        };

        match pollster::block_on(GameState::new(window.clone(), config)) {
            Ok(s) => {
                self.state = Some(s);
                window.request_redraw();
            }
            Err(e) => {
                if let Some(err @ RendererError::StencilUnsupported) = e.downcast_ref::<RendererError>() {
                    eprintln!("{err}");
                    std::process::exit(1);
                }
                log::error!("Failed to initialize: {}", e);
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        if let Some(state) = &mut self.state {
            if state.handle_window_event(event) || !state.running {
                event_loop.exit();
            }
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    println!("╔════════════════════════════════════════════════════╗");
    println!("║                    LIGHTBALLS                      ║");
    println!("╠════════════════════════════════════════════════════╣");
    println!("║  CONTROLS:                                         ║");
    println!("║    W / S      - Ride forward / back                ║");
    println!("║    A / D      - Strafe left / right                ║");
    println!("║    Q / Z      - Pitch camera up / down             ║");
    println!("║    Mouse      - Turn                               ║");
    println!("║    Left Click - Shoot                              ║");
    println!("║    Middle Drag - Move the light                    ║");
    println!("║    Escape     - Quit                               ║");
    println!("╚════════════════════════════════════════════════════╝");

    log::info!("Starting Lightballs");

    let event_loop = EventLoop::new()?;
    // Redraw continuously; the scene animates without input.
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new();
    event_loop.run_app(&mut app)?;

    Ok(())
}
