//! Contract with the immediate-mode GUI library
//!
//! A [`GuiBackend`] builds the shared font atlas and creates one
//! [`GuiContext`] per proxy; each context runs begin-frame, hands out its
//! widget API for draw callbacks, and exposes the draw output of the
//! finished frame.
//!
//! [`imgui`] binds Dear ImGui through `dear-imgui-rs` (behind the `imgui`
//! feature). [`headless`] is an in-process stand-in used by tests.

pub mod headless;
#[cfg(feature = "imgui")]
pub mod imgui;

use crate::error::MultiplexResult;
use crate::fonts::{FontAtlas, SharedFontAtlas};
use crate::input::{KeyModFlags, MouseButton, MouseCursor, NavInput};
use crate::input_state::InputState;
use crate::render::DrawData;

/// Per-frame input pushed into a context before begin-frame
#[derive(Copy, Clone, Debug)]
pub struct FrameInput<'a> {
    /// Seconds since the previous frame, always positive
    pub delta_time: f32,
    pub display_size: [f32; 2],
    pub input: &'a InputState,
}

impl FrameInput<'_> {
    pub fn mouse_position(&self) -> Option<[f32; 2]> {
        self.input.mouse_position()
    }

    pub fn mouse_down(&self) -> [bool; MouseButton::COUNT] {
        self.input.mouse_down()
    }

    pub fn modifiers(&self) -> KeyModFlags {
        self.input.modifiers()
    }

    /// Navigation inputs, zeroed when gamepad navigation is disabled
    pub fn nav_inputs(&self) -> [f32; NavInput::COUNT] {
        if self.input.is_gamepad_navigation_enabled() {
            *self.input.nav_inputs()
        } else {
            [0.0; NavInput::COUNT]
        }
    }
}

/// Factory for contexts of one GUI library
pub trait GuiBackend {
    type Context: GuiContext;

    /// Rasterize the font atlas shared by every context
    fn build_font_atlas(&mut self) -> MultiplexResult<FontAtlas>;

    /// Create a context drawing with the shared atlas
    fn create_context(
        &mut self,
        name: &str,
        font_atlas: &SharedFontAtlas,
    ) -> MultiplexResult<Self::Context>;
}

/// One immediate-mode GUI state machine
pub trait GuiContext {
    /// Widget API handed to draw callbacks during a frame
    type Ui: FrameUi;

    /// Make this the library's current context on the calling thread
    fn make_current(&mut self);

    /// Start a frame with the given input and return its widget API
    ///
    /// Returns `None` when the library could not switch to this context; the
    /// frame is skipped and [`render`](GuiContext::render) yields no output.
    fn new_frame(&mut self, input: &FrameInput<'_>) -> Option<&mut Self::Ui>;

    /// End the frame and expose its draw output
    ///
    /// The returned view is only valid until the next frame starts.
    fn render(&mut self) -> DrawData<'_>;
}

/// Minimal text output used by surface debug overlays
pub trait DebugUi {
    fn debug_text(&mut self, text: &str);
}

/// Frame state read back after the draw callbacks ran
pub trait FrameUi: DebugUi {
    /// Cursor requested so far this frame
    fn mouse_cursor(&self) -> MouseCursor;

    /// Whether an item is active (focused or pressed) this frame
    fn has_active_item(&self) -> bool;
}
