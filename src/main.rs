mod camera;
mod config;
mod controls;
mod graphics;
mod physics;
mod sampler;

use config::SamplerConfig;
use controls::OrbitControls;
use graphics::{build_vertices, Graphics};
use sampler::generate_points_parallel;
use std::sync::Arc;
use std::time::Instant;
use tracing_subscriber::EnvFilter;
use winit::{
    event::{ElementState, Event, MouseButton, WindowEvent},
    event_loop::EventLoop,
    keyboard::{Key, NamedKey},
    window::WindowBuilder,
};

/// Distance (in a₀) mapped to the red end of the colour gradient
const COLOR_RADIUS: f32 = 10.0;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    println!("Hydrogen 2p_z Orbital Visualizer - Rust");
    println!("=======================================");

    let mut args = pico_args::Arguments::from_env();
    let config = match SamplerConfig::from_args(&mut args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };
    let unused = args.finish();
    if !unused.is_empty() {
        tracing::warn!("ignoring unrecognized arguments: {:?}", unused);
    }

    if let Err(e) = run(config) {
        tracing::error!("{e}");
        std::process::exit(1);
    }
}

fn run(config: SamplerConfig) -> Result<(), Box<dyn std::error::Error>> {
    let params = config.density_parameters();
    let seed = config.resolve_seed();

    let started = Instant::now();
    let cloud = generate_points_parallel(&params, config.num_points, seed, config.workers);
    tracing::info!(
        candidates = cloud.candidates(),
        accepted = cloud.len(),
        acceptance = cloud.acceptance_ratio(),
        seed,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "sampled 2p_z orbital"
    );

    let event_loop = EventLoop::new()?;
    let window = WindowBuilder::new()
        .with_title("Schrödinger's Wave Function Visualization")
        .with_inner_size(winit::dpi::LogicalSize::new(800.0, 600.0))
        .build(&event_loop)?;
    let window = Arc::new(window);

    let mut graphics = pollster::block_on(Graphics::new(window.clone()))?;
    graphics.update_vertices(&build_vertices(&cloud, COLOR_RADIUS * params.bohr_radius()));

    let mut controls = OrbitControls::default();
    let mut last_render = Instant::now();

    event_loop.run(move |event, target| match event {
        Event::WindowEvent {
            ref event,
            window_id,
        } if window_id == window.id() => match event {
            WindowEvent::CloseRequested => target.exit(),
            WindowEvent::Resized(physical_size) => {
                graphics.resize(*physical_size);
                window.request_redraw();
            }
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => {
                controls.on_left_button(*state == ElementState::Pressed);
            }
            WindowEvent::CursorMoved { position, .. } => {
                controls.on_cursor_moved(position.x, position.y);
            }
            WindowEvent::CursorLeft { .. } => controls.on_cursor_left(),
            WindowEvent::KeyboardInput { event, .. } if event.state == ElementState::Pressed => {
                match event.logical_key.as_ref() {
                    Key::Named(NamedKey::Escape) => target.exit(),
                    Key::Named(NamedKey::ArrowLeft) => controls.nudge(0.0, -1.0),
                    Key::Named(NamedKey::ArrowRight) => controls.nudge(0.0, 1.0),
                    Key::Named(NamedKey::ArrowUp) => controls.nudge(-1.0, 0.0),
                    Key::Named(NamedKey::ArrowDown) => controls.nudge(1.0, 0.0),
                    _ => {}
                }
            }
            WindowEvent::RedrawRequested => match graphics.render(&controls) {
                Ok(()) => {}
                Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                    let (width, height) = graphics.size();
                    tracing::debug!(width, height, "surface lost, reconfiguring");
                    graphics.reconfigure();
                }
                Err(wgpu::SurfaceError::OutOfMemory) => {
                    tracing::error!("GPU out of memory");
                    target.exit();
                }
                Err(e) => tracing::warn!("render error: {:?}", e),
            },
            _ => {}
        },
        Event::AboutToWait => {
            // ~60 FPS
            let now = Instant::now();
            if now.duration_since(last_render).as_millis() > 16 {
                window.request_redraw();
                last_render = now;
            }
        }
        _ => {}
    })?;

    Ok(())
}
