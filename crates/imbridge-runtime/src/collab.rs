#![forbid(unsafe_code)]

//! Collaborator interfaces consumed by the lifecycle controller.
//!
//! The controller never talks to a host engine, a GUI library, or a graphics
//! backend directly. Each is reached through one of these traits:
//!
//! - [`Platform`] - display geometry and frame timing
//! - [`GuiContext`] - the immediate-mode GUI library's context and input API
//! - [`Renderer`] - consumes the library's draw data
//!
//! All calls happen on the host's main thread.

use imbridge_core::event::{KeyCode, Modifiers, MouseButton, Vec2};

/// Per-frame values the platform supplies during frame preparation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameMetrics {
    /// Display size in logical pixels.
    pub display_size: Vec2,
    /// Ratio of framebuffer pixels to logical pixels.
    pub framebuffer_scale: Vec2,
    /// Seconds since the previous prepared frame.
    pub delta_time: f32,
}

impl Default for FrameMetrics {
    fn default() -> Self {
        Self {
            display_size: Vec2::ZERO,
            framebuffer_scale: Vec2::ONE,
            delta_time: 1.0 / 60.0,
        }
    }
}

/// Host platform services used while preparing a frame.
pub trait Platform {
    /// Geometry and elapsed time for the frame being prepared.
    fn frame_metrics(&mut self) -> FrameMetrics;

    /// Release platform resources. Called once from `shutdown`.
    fn shutdown(&mut self) {}
}

/// The GUI library's context.
///
/// The library's context is process-wide mutable state. Every method other
/// than [`activate`](Self::activate) assumes the context is current.
pub trait GuiContext {
    /// Draw data produced by [`render`](Self::render).
    type DrawData;

    /// Make this context the current one.
    fn activate(&mut self);

    /// Leave no context current.
    fn deactivate(&mut self);

    /// Whether the library can render (font atlas built).
    fn is_ready_to_render(&self) -> bool;

    fn set_frame_metrics(&mut self, metrics: &FrameMetrics);

    fn add_key_event(&mut self, key: KeyCode, down: bool);

    fn add_modifiers(&mut self, modifiers: Modifiers);

    fn add_input_character(&mut self, character: char);

    fn add_mouse_button_event(&mut self, button: MouseButton, down: bool);

    fn add_mouse_pos_event(&mut self, position: Vec2);

    fn add_mouse_wheel_event(&mut self, delta: Vec2);

    /// Start a new frame; layout may be issued afterwards.
    fn new_frame(&mut self);

    /// Finish the frame and build draw data.
    fn render(&mut self);

    /// Draw data of the last [`render`](Self::render).
    fn draw_data(&self) -> &Self::DrawData;
}

/// Submits draw data to a graphics backend.
pub trait Renderer<D> {
    /// Submit one frame's draw data.
    fn submit(&mut self, draw_data: &D);

    /// Release render resources. Called once from `shutdown`, after any
    /// forced final render.
    fn shutdown(&mut self) {}
}
