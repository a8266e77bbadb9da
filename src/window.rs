//! Window management using winit, and the event loop that drives the renderer

use crate::backend::{BackendError, GraphicsBackend};
use crate::error::{QuadError, QuadResult};
use crate::host::{RenderCallbacks, RenderHost};
use crate::mix::BlendDirection;
use crate::renderer::QuadRenderer;
use crate::{QuadConfig, WgpuBackend};
use std::sync::Arc;
use winit::{
    dpi::{LogicalSize, PhysicalSize},
    event::{ElementState, Event, KeyEvent, WindowEvent},
    event_loop::{ControlFlow, EventLoop, EventLoopWindowTarget},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window as WinitWindow, WindowBuilder},
};

/// Wrapper around winit window with additional state
pub struct Window {
    window: Arc<WinitWindow>,
    size: LogicalSize<f64>,
}

/// Logical size of a physical window size, or `None` while a side is 0
///
/// The result is kept fractional so that scaling it back by the same factor
/// gives the physical size again.
pub fn logical_size(size: PhysicalSize<u32>, scale_factor: f64) -> Option<LogicalSize<f64>> {
    if size.width == 0 || size.height == 0 {
        return None;
    }
    Some(size.to_logical(scale_factor))
}

impl Window {
    /// Create a new window with the given title and logical dimensions
    pub fn new(event_loop: &EventLoop<()>, title: &str, width: u32, height: u32) -> QuadResult<Self> {
        let window = WindowBuilder::new()
            .with_title(title)
            .with_inner_size(LogicalSize::new(width, height))
            .build(event_loop)
            .map_err(|e| QuadError::Window(e.to_string()))?;

        let size = logical_size(window.inner_size(), window.scale_factor())
            .unwrap_or_else(|| LogicalSize::new(width as f64, height as f64));

        Ok(Self {
            window: Arc::new(window),
            size,
        })
    }

    /// Get arc reference to window
    pub fn window_arc(&self) -> Arc<WinitWindow> {
        Arc::clone(&self.window)
    }

    /// Last non-empty logical size
    pub fn dimensions(&self) -> (f64, f64) {
        (self.size.width, self.size.height)
    }

    /// Track the window size. Returns true when it changed to a drawable size;
    /// a minimized (zero-sized) window leaves the last size in place.
    pub fn handle_event(&mut self, event: &WindowEvent) -> bool {
        match event {
            WindowEvent::Resized(size) => match logical_size(*size, self.window.scale_factor()) {
                Some(logical) => {
                    self.size = logical;
                    true
                }
                None => {
                    log::debug!("Window minimized; keeping {}x{}", self.size.width, self.size.height);
                    false
                }
            },
            _ => false,
        }
    }
}

impl RenderHost for Window {
    fn device_pixel_ratio(&self) -> f64 {
        self.window.scale_factor()
    }

    fn request_redraw(&self) {
        self.window.request_redraw();
    }
}

/// Open a window and run the quad renderer until the window closes.
///
/// Up and Down arrows change the mix ratio; Escape quits.
pub fn run(config: QuadConfig) -> QuadResult<()> {
    let event_loop = EventLoop::new().map_err(|e| QuadError::Window(e.to_string()))?;
    let mut window = Window::new(&event_loop, &config.title, config.width, config.height)?;
    let mut backend = WgpuBackend::new(window.window_arc(), config.vsync)?;

    let mut renderer = QuadRenderer::new(&config);
    renderer.initialize(&mut backend)?;
    let (width, height) = window.dimensions();
    renderer.resize(&mut backend, width, height, window.device_pixel_ratio());

    println!("Controls:");
    println!("  Up/Down  - Change mix ratio");
    println!("  Escape   - Exit");

    let mut failure: Option<QuadError> = None;

    event_loop
        .run(|event, elwt: &EventLoopWindowTarget<()>| {
            elwt.set_control_flow(ControlFlow::Wait);

            let Event::WindowEvent { event, .. } = event else {
                return;
            };

            if window.handle_event(&event) {
                let (width, height) = window.dimensions();
                renderer.resize(&mut backend, width, height, window.device_pixel_ratio());
                window.request_redraw();
            }

            match event {
                WindowEvent::CloseRequested => elwt.exit(),
                WindowEvent::KeyboardInput {
                    event:
                        KeyEvent {
                            physical_key: PhysicalKey::Code(code),
                            state: ElementState::Pressed,
                            ..
                        },
                    ..
                } => {
                    if code == KeyCode::Escape {
                        elwt.exit();
                    } else if let Some(direction) = BlendDirection::from_key(code) {
                        renderer.adjust_blend_ratio(direction, &window);
                    }
                }
                WindowEvent::RedrawRequested => {
                    if let Err(e) = draw_frame(&mut renderer, &mut backend) {
                        match e {
                            QuadError::Backend(BackendError::SurfaceLost) => {
                                log::warn!("Surface lost; reconfiguring");
                                let (width, height) = backend.surface_size();
                                backend.resize(width, height);
                                window.request_redraw();
                            }
                            e => {
                                log::error!("Frame failed: {e}");
                                failure = Some(e);
                                elwt.exit();
                            }
                        }
                    }
                }
                _ => {}
            }
        })
        .map_err(|e| QuadError::Window(e.to_string()))?;

    match failure {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

fn draw_frame<B: GraphicsBackend>(renderer: &mut QuadRenderer, backend: &mut B) -> QuadResult<()> {
    let frame = backend.begin_frame()?;
    let drawn = renderer.draw(backend, &frame);
    backend.end_frame()?;
    drawn
}
