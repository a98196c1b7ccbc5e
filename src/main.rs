// Sakura backdrop: a full-window, pointer-reactive point field.
// The field is drawn through an egui background layer on top of a plain
// wgpu clear pass.

mod config;
mod engine;

use std::sync::Arc;

use anyhow::Context;
use winit::{
    event::{ElementState, Event as WinitEvent, KeyEvent, WindowEvent},
    event_loop::EventLoop,
    keyboard::{KeyCode, PhysicalKey},
    window::Window,
};

use config::AppConfig;
use engine::debug_overlay::{DebugOverlay, DebugStats, FrameTimer, ShapeSurface};
use engine::{Animator, DisplayMode, FieldEvent, Palette, SurfaceMetrics};

// ============================================================================
// GPU STATE
// ============================================================================

struct State {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    size: winit::dpi::PhysicalSize<u32>,
    overlay: DebugOverlay,
}

impl State {
    async fn new(window: Arc<Window>, show_stats: bool) -> anyhow::Result<Self> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance
            .create_surface(window.clone())
            .context("failed to create drawing surface")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::LowPower,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("no graphics adapter compatible with the window surface")?;
        log::info!("Using adapter {:?}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: None,
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: wgpu::MemoryHints::default(),
                },
                None,
            )
            .await
            .context("failed to open graphics device")?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first().copied())
            .context("surface reports no texture formats")?;

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };

        surface.configure(&device, &config);

        let overlay = DebugOverlay::new(&window, &device, surface_format, show_stats);

        Ok(Self {
            surface,
            device,
            queue,
            config,
            size,
            overlay,
        })
    }

    fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.size = new_size;
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            self.surface.configure(&self.device, &self.config);
        }
    }

    fn render(
        &mut self,
        window: &Window,
        field: &mut ShapeSurface,
        palette: &Palette,
        stats: Option<&DebugStats>,
    ) -> Result<(), wgpu::SurfaceError> {
        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        // Background clear; the field is drawn over it by the overlay pass.
        {
            let _clear_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Clear Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(palette.background.to_wgpu()),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            });
        }

        let stats = stats.filter(|_| self.overlay.visible);
        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [self.config.width, self.config.height],
            pixels_per_point: field.pixels_per_point(),
        };

        self.overlay.render(
            &self.device,
            &self.queue,
            &mut encoder,
            window,
            &view,
            &screen_descriptor,
            field.shapes_mut(),
            stats,
        );

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }
}

// ============================================================================
// MAIN
// ============================================================================

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let app_config = AppConfig::from_env();
    let max_extent = app_config.field.max_extent;

    let event_loop = EventLoop::new().context("failed to create event loop")?;

    let window_attributes = Window::default_attributes()
        .with_title(app_config.window.title.clone())
        .with_inner_size(winit::dpi::LogicalSize::new(
            app_config.window.width,
            app_config.window.height,
        ));

    #[allow(deprecated)]
    let window = Arc::new(
        event_loop
            .create_window(window_attributes)
            .context("failed to create window")?,
    );

    // A fixed mode from the config wins over the system theme.
    let fixed_mode = app_config.window.display_mode;
    let initial_mode = fixed_mode
        .or_else(|| window.theme().map(DisplayMode::from_theme))
        .unwrap_or_default();

    let mut animator: Animator<ShapeSurface> = Animator::new(app_config.field, initial_mode);

    // Without a drawing surface the backdrop is simply absent; the window
    // keeps running.
    let mut state = match pollster::block_on(State::new(window.clone(), app_config.debug.show_stats)) {
        Ok(state) => {
            let size = window.inner_size();
            let metrics =
                SurfaceMetrics::from_physical(size.width, size.height, window.scale_factor(), max_extent);
            animator.mount(ShapeSurface::new(), metrics);
            Some(state)
        }
        Err(e) => {
            log::error!("Backdrop disabled: {e:#}");
            None
        }
    };

    let mut frame_timer = FrameTimer::new();

    #[allow(deprecated)]
    let result = event_loop.run(move |event, control_flow| match event {
        WinitEvent::WindowEvent {
            ref event,
            window_id,
        } if window_id == window.id() => {
            if let Some(state) = state.as_mut() {
                let _ = state.overlay.handle_window_event(&window, event);
            }

            match event {
                WindowEvent::CloseRequested
                | WindowEvent::KeyboardInput {
                    event:
                        KeyEvent {
                            state: ElementState::Pressed,
                            physical_key: PhysicalKey::Code(KeyCode::Escape),
                            ..
                        },
                    ..
                } => {
                    animator.unmount();
                    control_flow.exit();
                }
                WindowEvent::KeyboardInput {
                    event:
                        KeyEvent {
                            state: ElementState::Pressed,
                            physical_key: PhysicalKey::Code(key),
                            repeat: false,
                            ..
                        },
                    ..
                } => match key {
                    KeyCode::F3 => {
                        if let Some(state) = state.as_mut() {
                            state.overlay.toggle();
                        }
                    }
                    KeyCode::KeyT => animator.toggle_mode(),
                    _ => {}
                },
                WindowEvent::RedrawRequested => {
                    let Some(frame) = animator.tick() else {
                        return;
                    };

                    let Some(gpu) = state.as_mut() else {
                        return;
                    };
                    let palette = Palette::for_mode(animator.mode());
                    let debug_stats = frame_timer.stats(
                        frame,
                        (gpu.size.width, gpu.size.height),
                        animator.metrics().scale_factor(),
                        animator.mode(),
                    );
                    let Some(field) = animator.surface_mut() else {
                        return;
                    };

                    match gpu.render(&window, field, palette, Some(&debug_stats)) {
                        Ok(()) => {}
                        Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                            gpu.resize(gpu.size)
                        }
                        Err(wgpu::SurfaceError::OutOfMemory) => {
                            log::error!("GPU out of memory, disabling backdrop");
                            animator.unmount();
                            state = None;
                        }
                        Err(e) => log::warn!("Skipping frame: {e:?}"),
                    }

                    if frame_timer.record() {
                        log::debug!(
                            "FPS: {} | Points: {} | Edges: {}",
                            frame_timer.fps(),
                            frame.points,
                            frame.edges
                        );
                    }
                }
                other => {
                    if let WindowEvent::Resized(size) = other {
                        if let Some(state) = state.as_mut() {
                            state.resize(*size);
                        }
                    }
                    match FieldEvent::from_window_event(other) {
                        Some(FieldEvent::ThemeChanged(_)) if fixed_mode.is_some() => {}
                        Some(field_event) => animator.dispatch(field_event),
                        None => {}
                    }
                }
            }
        }
        WinitEvent::AboutToWait => {
            if animator.wants_frame() {
                window.request_redraw();
            }
        }
        _ => {}
    });
    result.context("event loop terminated with an error")?;

    Ok(())
}
