//! Context manager: the table of proxies and the shared font atlas
//!
//! Proxies are created lazily by name and never evicted. When the world a
//! proxy belongs to goes away the proxy is simply left frozen: nobody draws
//! into it, its widget state survives, and the next world using the same
//! name picks it up again.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::thread::{self, ThreadId};

use crate::backend::{GuiBackend, GuiContext};
use crate::config::InputSettings;
use crate::delegates::MulticastDelegate;
use crate::error::MultiplexResult;
use crate::fonts::SharedFontAtlas;
use crate::proxy::{ContextProxy, FrameCounter, ProxyHandle, SharedDrawDelegate};

/// Name of the always-present default context
pub const DEFAULT_CONTEXT_NAME: &str = "";

/// Kind of host world a context is looked up for
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum WorldKind {
    Editor,
    EditorPreview,
    Game,
    /// Play-in-editor session with its instance index
    Pie(u32),
    Other,
}

/// Context name used for a world
///
/// Editor worlds and a missing world share the default context and get
/// `None`.
pub fn context_name_for_world(world: Option<WorldKind>) -> Option<String> {
    match world? {
        WorldKind::Editor | WorldKind::EditorPreview => None,
        WorldKind::Game => Some("Game".to_owned()),
        WorldKind::Pie(index) => Some(format!("PIEContext{}", index)),
        WorldKind::Other => Some("Other".to_owned()),
    }
}

type UiOf<B> = <<B as GuiBackend>::Context as GuiContext>::Ui;

/// Owner of every context proxy
pub struct ContextManager<B: GuiBackend> {
    backend: B,
    font_atlas: SharedFontAtlas,
    proxies: Vec<ProxyHandle<B::Context>>,
    index: HashMap<String, usize>,
    frame_counter: FrameCounter,
    multi_context_draw: SharedDrawDelegate<UiOf<B>>,
    gamepad_navigation: bool,
    keyboard_navigation: bool,
    update_thread: ThreadId,
}

impl<B: GuiBackend> ContextManager<B> {
    /// Build the font atlas and the default context
    pub fn new(mut backend: B) -> MultiplexResult<Self> {
        let font_atlas = Rc::new(backend.build_font_atlas()?);
        crate::multiplex_info!(
            "Font atlas built ({}x{})",
            font_atlas.width(),
            font_atlas.height()
        );

        let mut manager = Self {
            backend,
            font_atlas,
            proxies: Vec::new(),
            index: HashMap::new(),
            frame_counter: FrameCounter::new(),
            multi_context_draw: Rc::new(RefCell::new(MulticastDelegate::new())),
            gamepad_navigation: false,
            keyboard_navigation: false,
            update_thread: thread::current().id(),
        };
        manager.get_or_create_proxy(None);
        Ok(manager)
    }

    /// Proxy for `name`, created on first request
    ///
    /// `None` means the default context.
    pub fn get_or_create_proxy(&mut self, name: Option<&str>) -> ProxyHandle<B::Context> {
        self.assert_update_thread();
        let name = name.unwrap_or(DEFAULT_CONTEXT_NAME);
        if let Some(&slot) = self.index.get(name) {
            return Rc::clone(&self.proxies[slot]);
        }

        let gui = match self.backend.create_context(name, &self.font_atlas) {
            Ok(gui) => Some(gui),
            Err(err) => {
                crate::multiplex_error!("Context '{}' will stay inert: {}", name, err);
                #[cfg(not(feature = "tracing"))]
                let _ = err;
                None
            }
        };

        let mut proxy = ContextProxy::new(
            name,
            gui,
            Rc::clone(&self.font_atlas),
            self.frame_counter.clone(),
            Rc::clone(&self.multi_context_draw),
        );
        let state = proxy.input_state_unchecked_mut();
        state.set_gamepad_navigation(self.gamepad_navigation);
        state.set_keyboard_navigation(self.keyboard_navigation);

        crate::multiplex_info!("Created context '{}'", name);
        let handle = Rc::new(RefCell::new(proxy));
        self.index.insert(name.to_owned(), self.proxies.len());
        self.proxies.push(Rc::clone(&handle));
        handle
    }

    /// Proxy used for a world, created on first request
    pub fn get_world_proxy(&mut self, world: Option<WorldKind>) -> ProxyHandle<B::Context> {
        let name = context_name_for_world(world);
        self.get_or_create_proxy(name.as_deref())
    }

    /// Existing proxy for `name`, without creating one
    pub fn find_proxy(&self, name: Option<&str>) -> Option<ProxyHandle<B::Context>> {
        let name = name.unwrap_or(DEFAULT_CONTEXT_NAME);
        self.index
            .get(name)
            .map(|&slot| Rc::clone(&self.proxies[slot]))
    }

    /// The default context
    pub fn default_proxy(&mut self) -> ProxyHandle<B::Context> {
        self.get_or_create_proxy(None)
    }

    /// Start a new global frame and tick every proxy in creation order
    pub fn tick(&mut self, delta_seconds: f32) {
        self.assert_update_thread();
        let frame = self.frame_counter.advance();
        crate::multiplex_trace!("Frame {}: ticking {} contexts", frame, self.proxies.len());
        #[cfg(not(feature = "tracing"))]
        let _ = frame;

        for proxy in &self.proxies {
            match proxy.try_borrow_mut() {
                Ok(mut proxy) => proxy.tick(delta_seconds),
                Err(_) => {
                    crate::multiplex_error!("A context is borrowed during tick; skipping it");
                }
            }
        }
    }

    /// Delegate run once per context per frame, after that context's own delegate
    pub fn on_draw_multi_context(&self) -> &SharedDrawDelegate<UiOf<B>> {
        &self.multi_context_draw
    }

    /// Apply navigation switches to every context, now and for new ones
    pub fn apply_input_settings(&mut self, settings: &InputSettings) {
        self.gamepad_navigation = settings.gamepad_navigation;
        self.keyboard_navigation = settings.keyboard_navigation;
        for proxy in &self.proxies {
            let mut proxy = proxy.borrow_mut();
            let state = proxy.input_state_unchecked_mut();
            state.set_gamepad_navigation(settings.gamepad_navigation);
            state.set_keyboard_navigation(settings.keyboard_navigation);
        }
    }

    pub fn font_atlas(&self) -> &SharedFontAtlas {
        &self.font_atlas
    }

    /// Current global frame number
    pub fn frame(&self) -> u64 {
        self.frame_counter.get()
    }

    pub fn proxies(&self) -> impl Iterator<Item = &ProxyHandle<B::Context>> {
        self.proxies.iter()
    }

    pub fn len(&self) -> usize {
        self.proxies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.proxies.is_empty()
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    fn assert_update_thread(&self) {
        debug_assert_eq!(
            thread::current().id(),
            self.update_thread,
            "context manager used off its update thread"
        );
    }
}

impl<B: GuiBackend> std::fmt::Debug for ContextManager<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContextManager")
            .field("contexts", &self.index.keys().collect::<Vec<_>>())
            .field("frame", &self.frame_counter.get())
            .finish()
    }
}
