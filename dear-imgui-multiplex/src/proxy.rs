//! Context proxy: drives one GUI context through its frame lifecycle
//!
//! A proxy owns one [`GuiContext`] and advances it at most once per global
//! frame: begin-frame with the collected input, per-context draw listeners,
//! shared multi-context listeners, end-frame, and a copy of the draw output
//! into a [`DrawDataBuffer`] the render pass can hold on to.
//!
//! Proxies live behind `Rc<RefCell<_>>` handles owned by the
//! [`ContextManager`](crate::manager::ContextManager). Surfaces keep
//! [`WeakProxyHandle`]s and tolerate the proxy going away.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use std::sync::Arc;

use crate::backend::{FrameInput, FrameUi, GuiContext};
use crate::context::{self, ContextToken};
use crate::delegates::MulticastDelegate;
use crate::fonts::SharedFontAtlas;
use crate::input::MouseCursor;
use crate::input_state::{InputOwnership, InputState, SurfaceId};
use crate::render::DrawDataBuffer;

/// Delta time used when the caller passes a non-positive value
pub const DEFAULT_DELTA_TIME: f32 = 1.0 / 60.0;

/// Shared owning handle to a proxy
pub type ProxyHandle<C> = Rc<RefCell<ContextProxy<C>>>;

/// Non-owning handle held by surfaces
pub type WeakProxyHandle<C> = Weak<RefCell<ContextProxy<C>>>;

/// Draw delegate shared by every proxy of a manager
pub type SharedDrawDelegate<U> = Rc<RefCell<MulticastDelegate<U>>>;

/// Global frame number shared by a manager and its proxies
#[derive(Clone, Debug, Default)]
pub struct FrameCounter(Rc<Cell<u64>>);

impl FrameCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> u64 {
        self.0.get()
    }

    /// Move to the next frame and return its number
    pub fn advance(&self) -> u64 {
        let next = self.0.get() + 1;
        self.0.set(next);
        next
    }
}

/// Owner and driver of one GUI context
pub struct ContextProxy<C: GuiContext> {
    name: String,
    token: ContextToken,
    gui: Option<C>,
    font_atlas: SharedFontAtlas,

    display_size: [f32; 2],
    mouse_cursor: MouseCursor,
    has_active_item: bool,

    frame_counter: FrameCounter,
    last_frame: Option<u64>,

    on_draw: MulticastDelegate<C::Ui>,
    multi_context_draw: SharedDrawDelegate<C::Ui>,

    input_state: InputState,
    input_ownership: InputOwnership,

    draw_data: Arc<DrawDataBuffer>,
}

impl<C: GuiContext> ContextProxy<C> {
    /// Create a proxy; `gui` is `None` when the library failed to create a context
    pub(crate) fn new(
        name: impl Into<String>,
        gui: Option<C>,
        font_atlas: SharedFontAtlas,
        frame_counter: FrameCounter,
        multi_context_draw: SharedDrawDelegate<C::Ui>,
    ) -> Self {
        Self {
            name: name.into(),
            token: ContextToken::next(),
            gui,
            font_atlas,
            display_size: [0.0, 0.0],
            mouse_cursor: MouseCursor::None,
            has_active_item: false,
            frame_counter,
            last_frame: None,
            on_draw: MulticastDelegate::new(),
            multi_context_draw,
            input_state: InputState::new(),
            input_ownership: InputOwnership::new(),
            draw_data: Arc::new(DrawDataBuffer::default()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn token(&self) -> ContextToken {
        self.token
    }

    /// Whether the underlying GUI context was created
    pub fn is_initialized(&self) -> bool {
        self.gui.is_some()
    }

    pub fn gui(&self) -> Option<&C> {
        self.gui.as_ref()
    }

    pub fn gui_mut(&mut self) -> Option<&mut C> {
        self.gui.as_mut()
    }

    pub fn font_atlas(&self) -> &SharedFontAtlas {
        &self.font_atlas
    }

    // Current context

    /// Make this proxy's context current on the calling thread
    pub fn set_as_current(&mut self) {
        context::set_current(Some(self.token));
        if let Some(gui) = self.gui.as_mut() {
            gui.make_current();
        }
    }

    pub fn is_current_context(&self) -> bool {
        context::is_current(self.token)
    }

    // Cached frame state

    pub fn display_size(&self) -> [f32; 2] {
        self.display_size
    }

    /// Set the canvas size used by the next frame
    pub fn set_display_size(&mut self, size: impl Into<mint::Vector2<f32>>) {
        let size: mint::Vector2<f32> = size.into();
        self.display_size = [size.x, size.y];
    }

    /// Cursor requested by the last completed frame
    pub fn mouse_cursor(&self) -> MouseCursor {
        self.mouse_cursor
    }

    /// Whether the last completed frame had an active item
    pub fn has_active_item(&self) -> bool {
        self.has_active_item
    }

    /// Global frame number this proxy last processed
    pub fn last_frame(&self) -> Option<u64> {
        self.last_frame
    }

    /// Draw output of the last completed frame
    pub fn draw_data(&self) -> Arc<DrawDataBuffer> {
        Arc::clone(&self.draw_data)
    }

    // Delegates

    /// Per-context draw delegate, run before the shared delegate
    pub fn on_draw(&mut self) -> &mut MulticastDelegate<C::Ui> {
        &mut self.on_draw
    }

    pub fn multi_context_draw(&self) -> &SharedDrawDelegate<C::Ui> {
        &self.multi_context_draw
    }

    // Input ownership

    /// Register `surface` as wanting this context's input
    ///
    /// Returns whether `surface` owns the input state after the call.
    pub fn request_input_state(&mut self, surface: SurfaceId) -> bool {
        let had_owner = self.input_ownership.owner();
        let owns = self.input_ownership.request(surface);
        if had_owner.is_none() && owns {
            crate::multiplex_debug!("Context '{}': input owned by {:?}", self.name, surface);
        } else if !owns {
            crate::multiplex_debug!(
                "Context '{}': {:?} queued behind {:?}",
                self.name,
                surface,
                had_owner
            );
        }
        owns
    }

    /// Drop `surface` from the request queue; a no-op if it is not queued
    pub fn release_input_state(&mut self, surface: SurfaceId) {
        let was_owner = self.input_ownership.is_owner(surface);
        let promoted = self.input_ownership.release(surface);
        if was_owner {
            crate::multiplex_debug!(
                "Context '{}': {:?} released input, new owner {:?}",
                self.name,
                surface,
                promoted
            );
        }
        #[cfg(not(feature = "tracing"))]
        let _ = (was_owner, promoted);
    }

    /// Input state, if `surface` currently owns it
    pub fn try_input_state(&self, surface: SurfaceId) -> Option<&InputState> {
        self.input_ownership
            .is_owner(surface)
            .then_some(&self.input_state)
    }

    /// Mutable input state, if `surface` currently owns it
    pub fn try_input_state_mut(&mut self, surface: SurfaceId) -> Option<&mut InputState> {
        if self.input_ownership.is_owner(surface) {
            Some(&mut self.input_state)
        } else {
            None
        }
    }

    pub fn input_owner(&self) -> Option<SurfaceId> {
        self.input_ownership.owner()
    }

    /// Read-only view of the input state regardless of ownership
    pub fn input_state(&self) -> &InputState {
        &self.input_state
    }

    pub(crate) fn input_state_unchecked_mut(&mut self) -> &mut InputState {
        &mut self.input_state
    }

    // Frame

    /// Advance the context one frame
    ///
    /// Does nothing if this proxy already processed the current global frame
    /// or its GUI context failed to initialize.
    pub fn tick(&mut self, delta_seconds: f32) {
        let frame = self.frame_counter.get();
        if self.last_frame == Some(frame) {
            crate::multiplex_trace!("Context '{}' already ticked in frame {}", self.name, frame);
            return;
        }
        self.last_frame = Some(frame);

        if self.gui.is_none() {
            return;
        }

        self.set_as_current();
        let Some(gui) = self.gui.as_mut() else {
            return;
        };

        let delta_time = if delta_seconds.is_finite() && delta_seconds > 0.0 {
            delta_seconds
        } else {
            DEFAULT_DELTA_TIME
        };

        context::debug_assert_current(self.token);
        let frame_input = FrameInput {
            delta_time,
            display_size: self.display_size,
            input: &self.input_state,
        };
        if let Some(ui) = gui.new_frame(&frame_input) {
            self.on_draw.broadcast(&self.name, ui);
            match self.multi_context_draw.try_borrow_mut() {
                Ok(mut shared) => {
                    shared.broadcast(&self.name, ui);
                }
                Err(_) => {
                    crate::multiplex_error!(
                        "Context '{}': multi-context delegate is busy, skipping it this frame",
                        self.name
                    );
                }
            }
            self.mouse_cursor = ui.mouse_cursor();
            self.has_active_item = ui.has_active_item();
        } else {
            crate::multiplex_warn!("Context '{}' could not start a frame", self.name);
        }

        let draw_data = gui.render();
        let buffer = DrawDataBuffer::from_draw_data(&draw_data);
        drop(draw_data);
        crate::logging::log_capture_stats(
            &self.name,
            buffer.batches().len(),
            buffer.vertex_count(),
            buffer.index_count(),
        );
        self.draw_data = Arc::new(buffer);

        self.input_state.clear_update_state();
    }
}

impl<C: GuiContext> std::fmt::Debug for ContextProxy<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContextProxy")
            .field("name", &self.name)
            .field("token", &self.token)
            .field("initialized", &self.gui.is_some())
            .field("display_size", &self.display_size)
            .field("mouse_cursor", &self.mouse_cursor)
            .field("has_active_item", &self.has_active_item)
            .field("last_frame", &self.last_frame)
            .field("input_owner", &self.input_ownership.owner())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::GuiBackend;
    use crate::backend::headless::{HeadlessBackend, HeadlessContext, HeadlessUi};
    use crate::input::{Key, MouseButton};
    use std::rc::Rc;

    fn proxy(name: &str) -> (ContextProxy<HeadlessContext>, FrameCounter) {
        let mut backend = HeadlessBackend::new();
        let atlas = Rc::new(backend.build_font_atlas().unwrap());
        let gui = backend.create_context(name, &atlas).unwrap();
        let counter = FrameCounter::new();
        let shared: SharedDrawDelegate<HeadlessUi> = Rc::default();
        (
            ContextProxy::new(name, Some(gui), atlas, counter.clone(), shared),
            counter,
        )
    }

    #[test]
    fn test_tick_once_per_frame() {
        let (mut proxy, counter) = proxy("Game");
        let calls = Rc::new(Cell::new(0));
        let seen = Rc::clone(&calls);
        proxy.on_draw().add(move |_| seen.set(seen.get() + 1));

        proxy.tick(0.016);
        proxy.tick(0.016);
        proxy.tick(0.016);
        assert_eq!(calls.get(), 1);
        assert_eq!(proxy.gui().unwrap().frame_count(), 1);

        counter.advance();
        proxy.tick(0.016);
        assert_eq!(calls.get(), 2);
        assert_eq!(proxy.last_frame(), Some(1));
    }

    #[test]
    fn test_tick_makes_context_current() {
        let (mut proxy, _) = proxy("Game");
        proxy.tick(0.016);
        assert!(proxy.is_current_context());
        assert_eq!(proxy.gui().unwrap().make_current_count(), 1);
    }

    #[test]
    fn test_display_size_and_cursor() {
        let (mut proxy, _) = proxy("Game");
        assert_eq!(proxy.mouse_cursor(), MouseCursor::None);
        proxy.set_display_size([800.0, 600.0]);
        proxy.tick(0.016);
        assert_eq!(proxy.display_size(), [800.0, 600.0]);
        assert_eq!(proxy.mouse_cursor(), MouseCursor::Arrow);
        let seen = proxy.gui().unwrap().last_input().unwrap();
        assert_eq!(seen.display_size, [800.0, 600.0]);
    }

    #[test]
    fn test_non_positive_delta_defaults() {
        let (mut proxy, _) = proxy("Game");
        proxy.tick(0.0);
        let seen = proxy.gui().unwrap().last_input().unwrap();
        approx::assert_relative_eq!(seen.delta_time, DEFAULT_DELTA_TIME);
    }

    #[test]
    fn test_transient_input_cleared_after_frame() {
        let (mut proxy, counter) = proxy("Game");
        let surface = SurfaceId::next();
        assert!(proxy.request_input_state(surface));
        {
            let state = proxy.try_input_state_mut(surface).unwrap();
            state.add_character('x');
            state.add_mouse_wheel_delta(2.0);
            state.set_key_down(Key::X, true);
            state.set_mouse_down(MouseButton::Left, true);
        }

        proxy.tick(0.016);
        let seen = proxy.gui().unwrap().last_input().unwrap().clone();
        assert_eq!(seen.characters, vec!['x']);
        assert_eq!(seen.mouse_wheel, 2.0);

        let state = proxy.input_state();
        assert!(state.characters().is_empty());
        assert_eq!(state.mouse_wheel(), 0.0);
        assert!(state.is_key_down(Key::X));
        assert!(state.is_mouse_down(MouseButton::Left));

        counter.advance();
        proxy.tick(0.016);
        let seen = proxy.gui().unwrap().last_input().unwrap();
        assert!(seen.characters.is_empty());
        assert_eq!(seen.keys_down, vec![Key::X]);
    }

    #[test]
    fn test_non_owner_gets_no_input_state() {
        let (mut proxy, _) = proxy("Game");
        let (a, b) = (SurfaceId::next(), SurfaceId::next());
        assert!(proxy.request_input_state(a));
        assert!(!proxy.request_input_state(b));
        assert!(proxy.try_input_state(b).is_none());
        proxy.release_input_state(a);
        assert!(proxy.try_input_state(b).is_some());
    }

    #[test]
    fn test_uninitialized_proxy_is_inert() {
        let mut backend = HeadlessBackend::new();
        let atlas = Rc::new(backend.build_font_atlas().unwrap());
        let shared: SharedDrawDelegate<HeadlessUi> = Rc::default();
        let mut proxy: ContextProxy<HeadlessContext> =
            ContextProxy::new("Broken", None, atlas, FrameCounter::new(), shared);
        let calls = Rc::new(Cell::new(0));
        let seen = Rc::clone(&calls);
        proxy.on_draw().add(move |_| seen.set(seen.get() + 1));

        proxy.tick(0.016);

        assert!(!proxy.is_initialized());
        assert_eq!(calls.get(), 0);
        assert!(proxy.draw_data().is_empty());
    }
}
