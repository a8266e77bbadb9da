//! Callback seam between the renderer and whatever owns the window
//!
//! The host (a winit window in [`crate::window`], or a test double) drives the
//! renderer through [`RenderCallbacks`] and receives redraw requests through
//! [`RenderHost`]. All calls happen on one thread, never re-entrantly.

use crate::backend::{FrameContext, GraphicsBackend};
use crate::error::QuadResult;

/// Services the host offers to the renderer
pub trait RenderHost {
    /// Physical pixels per logical pixel
    fn device_pixel_ratio(&self) -> f64;

    /// Ask for `draw` to be called again soon
    fn request_redraw(&self);
}

/// Per-frame callbacks the host invokes
pub trait RenderCallbacks<B: GraphicsBackend + ?Sized> {
    /// One-time GPU setup. Errors are fatal.
    fn initialize(&mut self, backend: &mut B) -> QuadResult<()>;

    /// The widget changed size, in logical pixels.
    ///
    /// Logical sizes may be fractional; `width * device_pixel_ratio` is the
    /// physical width.
    fn resize(&mut self, backend: &mut B, width: f64, height: f64, device_pixel_ratio: f64);

    /// Record one frame into the given swapchain image
    fn draw(&mut self, backend: &mut B, frame: &FrameContext) -> QuadResult<()>;
}

/// Host with no window: fixed pixel ratio, counts redraw requests
#[derive(Debug)]
pub struct HeadlessHost {
    pixel_ratio: f64,
    redraws: std::cell::Cell<u32>,
}

impl HeadlessHost {
    pub fn new(pixel_ratio: f64) -> Self {
        Self {
            pixel_ratio,
            redraws: std::cell::Cell::new(0),
        }
    }

    pub fn redraw_requests(&self) -> u32 {
        self.redraws.get()
    }
}

impl Default for HeadlessHost {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl RenderHost for HeadlessHost {
    fn device_pixel_ratio(&self) -> f64 {
        self.pixel_ratio
    }

    fn request_redraw(&self) {
        self.redraws.set(self.redraws.get() + 1);
    }
}
