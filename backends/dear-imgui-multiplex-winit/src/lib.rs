//! Winit adapter for dear-imgui-multiplex
//!
//! Translates winit window events into the multiplexer's input events and
//! routes them into a [`Surface`](dear_imgui_multiplex::Surface), and maps
//! the surface's cursor answer back onto the window.
//!
//! # Example
//!
//! ```rust,no_run
//! use dear_imgui_multiplex::backend::headless::{HeadlessBackend, HeadlessTextureFactory};
//! use dear_imgui_multiplex::{ModuleManager, Settings};
//! use dear_imgui_multiplex_winit::{CursorSettings, WinitSurfaceInput};
//!
//! let mut module = ModuleManager::new(
//!     HeadlessBackend::new(),
//!     HeadlessTextureFactory::default(),
//!     Settings::default(),
//! )
//! .unwrap();
//! let mut surface = module.create_surface(Some("Game"));
//! let mut input = WinitSurfaceInput::new(1.0);
//! let mut cursor = CursorSettings::new();
//!
//! // In the window event handler:
//! // input.handle_window_event(&mut surface, &event);
//! // cursor.apply(&window, surface.cursor_query());
//! ```

mod cursor;
mod events;
mod input;

pub use cursor::{CursorSettings, to_winit_cursor};
pub use events::WinitSurfaceInput;
pub use input::{to_key, to_key_mod_flags, to_mouse_button};
