//! # Dear ImGui Multiplex
//!
//! Runs several independent Dear ImGui contexts inside one host application
//! (one per world, editor or play-in-editor session) and routes host input to
//! them and their draw output back to the host renderer.
//!
//! ## Features
//!
//! - Named contexts created on demand, all sharing one font atlas
//! - Each context ticked at most once per application frame
//! - Input ownership queue when several surfaces show the same context
//! - Draw output captured into buffers that outlive the frame
//! - Per-context and multi-context draw delegates with panic isolation
//! - Consume or pass-through input policy that keeps host hotkeys working
//!
//! Enable the `imgui` feature for the Dear ImGui backend
//! (`backend::imgui::ImguiBackend`); the example below uses the in-process
//! headless backend.
//!
//! ## Quick Start
//!
//! ```no_run
//! use dear_imgui_multiplex::backend::headless::{HeadlessBackend, HeadlessTextureFactory};
//! use dear_imgui_multiplex::*;
//!
//! let mut module = ModuleManager::new(
//!     HeadlessBackend::new(),
//!     HeadlessTextureFactory::default(),
//!     Settings::default(),
//! )?;
//! module.load_textures()?;
//!
//! module.add_context_delegate(Some("Game"), |ui| {
//!     ui.add_rect_filled([10.0, 10.0], [110.0, 40.0], 0xFF20_2020);
//! });
//!
//! let mut surface = module.create_surface(Some("Game"));
//! surface.on_mouse_enter(&PointerEvent::new([0.0, 0.0]));
//!
//! module.tick(1.0 / 60.0);
//! let elements = surface.paint([0.0, 0.0, 1280.0, 720.0], 1.0 / 60.0, module.texture_manager());
//! # Ok::<(), MultiplexError>(())
//! ```

#![deny(rust_2018_idioms)]
#![cfg_attr(test, allow(clippy::float_cmp))]

pub mod backend;
pub mod config;
pub mod context;
pub mod delegates;
pub mod error;
pub mod events;
pub mod fonts;
pub mod input;
pub mod input_handler;
pub mod input_state;
pub mod logging;
pub mod manager;
pub mod module;
pub mod proxy;
pub mod render;
pub mod surface;
pub mod texture;

pub use backend::{DebugUi, FrameInput, FrameUi, GuiBackend, GuiContext};
pub use config::{InputChord, InputSettings, Settings, SharedSettings};
pub use context::ContextToken;
pub use delegates::{DelegateCategory, DelegateHandle, DelegateId, MulticastDelegate};
pub use error::{MultiplexError, MultiplexResult};
pub use events::{AnalogInputEvent, CharacterEvent, EventReply, InputKey, KeyEvent, PointerEvent};
pub use fonts::{FontAtlas, SharedFontAtlas};
pub use input::{
    GamepadAxis, GamepadKey, Key, KeyModFlags, MouseButton, MouseButtons, MouseCursor, NavInput,
};
pub use input_handler::{
    DefaultInputHandler, DefaultInputHandlerFactory, InputHandler, InputHandlerFactory,
    InputResponse,
};
pub use input_state::{InputOwnership, InputState, SurfaceId};
pub use manager::{ContextManager, DEFAULT_CONTEXT_NAME, WorldKind, context_name_for_world};
pub use module::{FONT_ATLAS_TEXTURE_NAME, ModuleManager};
pub use proxy::{ContextProxy, DEFAULT_DELTA_TIME, FrameCounter, ProxyHandle, WeakProxyHandle};
pub use render::{DrawBatch, DrawCmd, DrawData, DrawDataBuffer, DrawIdx, DrawList, DrawVert};
pub use surface::{InputMode, Surface, SurfaceDrawElement};
pub use texture::{PLAIN_TEXTURE_NAME, TextureFactory, TextureId, TextureManager};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
