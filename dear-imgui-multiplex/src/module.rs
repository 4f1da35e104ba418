//! Module facade
//!
//! [`ModuleManager`] is the one object a host keeps around: it owns the
//! [`ContextManager`], the [`TextureManager`] and the shared settings, runs the
//! per-frame update with its pre/post events, and hands out surfaces and
//! delegate handles.

use std::cell::Ref;
use std::rc::Rc;

use crate::backend::{GuiBackend, GuiContext};
use crate::config::{Settings, SharedSettings};
use crate::delegates::{DelegateCategory, DelegateHandle, MulticastDelegate};
use crate::error::MultiplexResult;
use crate::input_handler::{DefaultInputHandlerFactory, InputHandlerFactory};
use crate::manager::{ContextManager, DEFAULT_CONTEXT_NAME, WorldKind, context_name_for_world};
use crate::proxy::ProxyHandle;
use crate::surface::Surface;
use crate::texture::{TextureFactory, TextureId, TextureManager};

/// Name the font atlas texture is registered under
pub const FONT_ATLAS_TEXTURE_NAME: &str = "ImGuiModule_FontAtlas";

type UiOf<B> = <<B as GuiBackend>::Context as GuiContext>::Ui;

/// Top-level owner of contexts, textures and settings
pub struct ModuleManager<B: GuiBackend, F: TextureFactory> {
    contexts: ContextManager<B>,
    textures: TextureManager<F>,
    settings: SharedSettings,
    handler_factory: Rc<dyn InputHandlerFactory>,
    pre_update: MulticastDelegate<()>,
    post_update: MulticastDelegate<()>,
}

impl<B, F> ModuleManager<B, F>
where
    B: GuiBackend,
    B::Context: 'static,
    F: TextureFactory,
{
    /// Create the context manager (with its default context) and the plain texture
    ///
    /// Call [`load_textures`](Self::load_textures) once the host renderer can
    /// accept uploads.
    pub fn new(backend: B, texture_factory: F, settings: Settings) -> MultiplexResult<Self> {
        settings.validate()?;
        let mut contexts = ContextManager::new(backend)?;
        contexts.apply_input_settings(&settings.input);
        let textures = TextureManager::new(texture_factory)?;

        crate::multiplex_info!("Module started");
        Ok(Self {
            contexts,
            textures,
            settings: SharedSettings::new(settings),
            handler_factory: Rc::new(DefaultInputHandlerFactory),
            pre_update: MulticastDelegate::new(),
            post_update: MulticastDelegate::new(),
        })
    }

    /// Use `factory` for input handlers of surfaces created from now on
    pub fn with_input_handler_factory(mut self, factory: impl InputHandlerFactory + 'static) -> Self {
        self.handler_factory = Rc::new(factory);
        self
    }

    /// Upload the font atlas and store its texture id back into the atlas
    ///
    /// Calling it again re-uploads the atlas under the same id.
    pub fn load_textures(&mut self) -> MultiplexResult<TextureId> {
        let atlas = Rc::clone(self.contexts.font_atlas());
        let id = self.textures.create_texture(
            FONT_ATLAS_TEXTURE_NAME,
            atlas.width(),
            atlas.height(),
            atlas.pixels(),
        )?;
        atlas.set_texture_id(id);
        crate::multiplex_info!("Font atlas uploaded as texture {:?}", id);
        Ok(id)
    }

    /// Run one application frame
    ///
    /// Broadcasts the pre-update event, ticks every context, then broadcasts
    /// the post-update event.
    pub fn tick(&mut self, delta_seconds: f32) {
        self.pre_update.broadcast("pre-update", &mut ());
        self.contexts.tick(delta_seconds);
        self.post_update.broadcast("post-update", &mut ());
    }

    // Delegates

    /// Draw into every context once per frame
    ///
    /// Must not be called from inside a multi-context listener.
    pub fn add_multi_context_delegate(
        &mut self,
        listener: impl FnMut(&mut UiOf<B>) + 'static,
    ) -> DelegateHandle {
        let id = self
            .contexts
            .on_draw_multi_context()
            .borrow_mut()
            .add(listener);
        DelegateHandle::new(id, DelegateCategory::MultiContext, None)
    }

    /// Draw into one context, created if it does not exist yet
    pub fn add_context_delegate(
        &mut self,
        name: Option<&str>,
        listener: impl FnMut(&mut UiOf<B>) + 'static,
    ) -> DelegateHandle {
        let name = name.unwrap_or(DEFAULT_CONTEXT_NAME);
        let proxy = self.contexts.get_or_create_proxy(Some(name));
        let id = proxy.borrow_mut().on_draw().add(listener);
        DelegateHandle::new(id, DelegateCategory::Default, Some(name.to_owned()))
    }

    /// Draw into the context used for `world`
    pub fn add_world_delegate(
        &mut self,
        world: Option<WorldKind>,
        listener: impl FnMut(&mut UiOf<B>) + 'static,
    ) -> DelegateHandle {
        let name = context_name_for_world(world);
        self.add_context_delegate(name.as_deref(), listener)
    }

    pub fn add_pre_update(&mut self, mut listener: impl FnMut() + 'static) -> DelegateHandle {
        let id = self.pre_update.add(move |_: &mut ()| listener());
        DelegateHandle::new(id, DelegateCategory::PreUpdate, None)
    }

    pub fn add_post_update(&mut self, mut listener: impl FnMut() + 'static) -> DelegateHandle {
        let id = self.post_update.add(move |_: &mut ()| listener());
        DelegateHandle::new(id, DelegateCategory::PostUpdate, None)
    }

    /// Remove a listener from the delegate its handle was issued by
    ///
    /// Returns whether a listener was removed.
    pub fn remove_delegate(&mut self, handle: &DelegateHandle) -> bool {
        match handle.category() {
            DelegateCategory::Default => {
                let Some(proxy) = self.contexts.find_proxy(handle.context()) else {
                    return false;
                };
                let Ok(mut proxy) = proxy.try_borrow_mut() else {
                    crate::multiplex_warn!(
                        "Context {:?} is busy, delegate {:?} not removed",
                        handle.context(),
                        handle.id()
                    );
                    return false;
                };
                proxy.on_draw().remove(handle.id())
            }
            DelegateCategory::MultiContext => self
                .contexts
                .on_draw_multi_context()
                .borrow_mut()
                .remove(handle.id()),
            DelegateCategory::PreUpdate => self.pre_update.remove(handle.id()),
            DelegateCategory::PostUpdate => self.post_update.remove(handle.id()),
        }
    }

    // Contexts

    /// Make an existing context current; returns whether it was found
    pub fn set_context_as_current(&mut self, name: Option<&str>) -> bool {
        match self.contexts.find_proxy(name) {
            Some(proxy) => {
                proxy.borrow_mut().set_as_current();
                true
            }
            None => false,
        }
    }

    /// Proxy for `name`, created on first request
    pub fn context_proxy(&mut self, name: Option<&str>) -> ProxyHandle<B::Context> {
        self.contexts.get_or_create_proxy(name)
    }

    pub fn world_context_proxy(&mut self, world: Option<WorldKind>) -> ProxyHandle<B::Context> {
        self.contexts.get_world_proxy(world)
    }

    // Surfaces

    /// Create a surface bound to the context `name`
    pub fn create_surface(&mut self, name: Option<&str>) -> Surface<B::Context> {
        let proxy = self.contexts.get_or_create_proxy(name);
        Surface::new(
            &proxy,
            self.settings.clone(),
            Rc::clone(&self.handler_factory),
        )
    }

    /// Create a surface bound to the context used for `world`
    pub fn create_world_surface(&mut self, world: Option<WorldKind>) -> Surface<B::Context> {
        let name = context_name_for_world(world);
        self.create_surface(name.as_deref())
    }

    // Settings

    pub fn settings(&self) -> Ref<'_, Settings> {
        self.settings.get()
    }

    /// Replace the settings
    ///
    /// Navigation switches apply to every context at once; surfaces rebuild
    /// their input handler on their next event. Invalid settings are rejected
    /// and the current ones kept.
    pub fn set_settings(&mut self, settings: Settings) -> MultiplexResult<()> {
        settings.validate()?;
        self.contexts.apply_input_settings(&settings.input);
        self.settings.replace(settings);
        crate::multiplex_debug!("Settings replaced (generation {})", self.settings.generation());
        Ok(())
    }

    // Accessors

    pub fn context_manager(&self) -> &ContextManager<B> {
        &self.contexts
    }

    pub fn context_manager_mut(&mut self) -> &mut ContextManager<B> {
        &mut self.contexts
    }

    pub fn texture_manager(&self) -> &TextureManager<F> {
        &self.textures
    }

    pub fn texture_manager_mut(&mut self) -> &mut TextureManager<F> {
        &mut self.textures
    }
}

impl<B: GuiBackend, F: TextureFactory> std::fmt::Debug for ModuleManager<B, F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModuleManager")
            .field("contexts", &self.contexts)
            .field("textures", &self.textures.len())
            .field("settings_generation", &self.settings.generation())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::headless::{HeadlessBackend, HeadlessTextureFactory};
    use crate::context;
    use crate::error::MultiplexError;
    use std::cell::RefCell;

    type TestModule = ModuleManager<HeadlessBackend, HeadlessTextureFactory>;

    fn module() -> TestModule {
        ModuleManager::new(
            HeadlessBackend::new(),
            HeadlessTextureFactory::default(),
            Settings::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_load_textures_writes_atlas_id() {
        let mut module = module();
        let id = module.load_textures().unwrap();
        assert_eq!(id, TextureId::new(1));
        assert_eq!(module.context_manager().font_atlas().texture_id(), id);
        assert_eq!(
            module.texture_manager().texture_name(id),
            Some(FONT_ATLAS_TEXTURE_NAME)
        );

        assert_eq!(module.load_textures().unwrap(), id);
        assert_eq!(module.texture_manager().len(), 2);
    }

    #[test]
    fn test_tick_order() {
        let mut module = module();
        let log = Rc::new(RefCell::new(Vec::new()));

        let pre = Rc::clone(&log);
        module.add_pre_update(move || pre.borrow_mut().push("pre"));
        let draw = Rc::clone(&log);
        module.add_context_delegate(None, move |_| draw.borrow_mut().push("draw"));
        let post = Rc::clone(&log);
        module.add_post_update(move || post.borrow_mut().push("post"));

        module.tick(0.016);
        assert_eq!(*log.borrow(), ["pre", "draw", "post"]);
    }

    #[test]
    fn test_remove_routes_by_category() {
        let mut module = module();
        let calls = Rc::new(RefCell::new(Vec::new()));

        let multi = Rc::clone(&calls);
        let multi = module.add_multi_context_delegate(move |_| multi.borrow_mut().push("multi"));
        let single = Rc::clone(&calls);
        let single =
            module.add_context_delegate(Some("Game"), move |_| single.borrow_mut().push("game"));

        assert_eq!(multi.category(), DelegateCategory::MultiContext);
        assert_eq!(single.context(), Some("Game"));

        assert!(module.remove_delegate(&multi));
        assert!(!module.remove_delegate(&multi));

        module.tick(0.016);
        assert_eq!(*calls.borrow(), ["game"]);

        assert!(module.remove_delegate(&single));
        module.tick(0.016);
        assert_eq!(calls.borrow().len(), 1);
    }

    #[test]
    fn test_remove_from_unknown_context() {
        let mut module = module();
        let handle = DelegateHandle::new(
            MulticastDelegate::<()>::new().add(|_| {}),
            DelegateCategory::Default,
            Some("Missing".to_owned()),
        );
        assert!(!module.remove_delegate(&handle));
        assert!(module.context_manager().find_proxy(Some("Missing")).is_none());
    }

    #[test]
    fn test_set_context_as_current() {
        let mut module = module();
        let game = module.context_proxy(Some("Game"));
        assert!(module.set_context_as_current(Some("Game")));
        assert_eq!(context::current(), Some(game.borrow().token()));
        assert!(!module.set_context_as_current(Some("Nope")));
    }

    #[test]
    fn test_set_settings_rejects_invalid() {
        let mut module = module();
        let result = module.set_settings(Settings {
            canvas_size: [-1.0, 10.0],
            ..Settings::default()
        });
        assert!(matches!(result, Err(MultiplexError::Configuration { .. })));
        assert_eq!(module.settings().canvas_size, [3840.0, 2160.0]);
    }

    #[test]
    fn test_world_surface_uses_world_context() {
        let mut module = module();
        let surface = module.create_world_surface(Some(WorldKind::Pie(1)));
        assert_eq!(surface.context_name(), "PIEContext1");
        assert!(module.context_manager().find_proxy(Some("PIEContext1")).is_some());
    }
}
