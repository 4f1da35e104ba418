//! Visual surface binding: one host widget bound to one context proxy
//!
//! A [`Surface`] receives the host's raw input callbacks, asks its
//! [`InputHandler`] whether to process and consume each one, and folds
//! processed events into the proxy's input state while it owns that state.
//! At paint time it ticks the proxy (a no-op if the frame was already
//! processed) and turns the captured draw batches into screen-space elements
//! for the host renderer.
//!
//! Input mode follows keyboard focus and hover:
//!
//! | focus | hover | mode               |
//! |-------|-------|--------------------|
//! | yes   | any   | `Full`             |
//! | no    | yes   | `MousePointerOnly` |
//! | no    | no    | `None`             |
//!
//! Leaving `None` requests the context's input state, entering `None`
//! releases it.

use std::cell::Cell;
use std::rc::Rc;

use crate::backend::{DebugUi, GuiContext};
use crate::config::SharedSettings;
use crate::delegates::DelegateId;
use crate::events::{
    AnalogInputEvent, CharacterEvent, EventReply, InputKey, KeyEvent, PointerEvent,
};
use crate::input::{MouseButton, MouseButtons, MouseCursor};
use crate::input_handler::{InputHandler, InputHandlerFactory, InputResponse};
use crate::input_state::{InputState, SurfaceId};
use crate::proxy::{ContextProxy, ProxyHandle, WeakProxyHandle};
use crate::render::DrawVert;
use crate::texture::{TextureFactory, TextureManager};

/// How much input a surface currently takes
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
pub enum InputMode {
    /// Neither focused nor hovered
    #[default]
    None,
    /// Hovered without keyboard focus
    MousePointerOnly,
    /// Has keyboard focus
    Full,
}

impl InputMode {
    fn from_state(has_keyboard_focus: bool, has_mouse_pointer: bool) -> Self {
        if has_keyboard_focus {
            InputMode::Full
        } else if has_mouse_pointer {
            InputMode::MousePointerOnly
        } else {
            InputMode::None
        }
    }
}

/// One batch ready for the host renderer, in screen space
#[derive(Clone, Debug, PartialEq)]
pub struct SurfaceDrawElement<H> {
    pub texture: H,
    pub vertices: Vec<DrawVert>,
    pub indices: Vec<u32>,
    /// Batch clip rectangle intersected with the surface clip rectangle
    pub clip_rect: [f32; 4],
}

#[derive(Debug, Default)]
struct DebugState {
    mode: Cell<InputMode>,
    hovered: Cell<bool>,
    focused: Cell<bool>,
    has_mouse_pointer: Cell<bool>,
}

/// Binding between a host widget and a context proxy
pub struct Surface<C: GuiContext> {
    id: SurfaceId,
    proxy: WeakProxyHandle<C>,
    context_name: String,
    settings: SharedSettings,
    settings_generation: u64,
    handler_factory: Rc<dyn InputHandlerFactory>,
    handler: Box<dyn InputHandler>,
    input_mode: InputMode,
    has_keyboard_focus: bool,
    is_hovered: bool,
    mouse_event_notification: bool,
    cursor_override: MouseCursor,
    origin: Cell<[f32; 2]>,
    /// Pointer as this surface last saw it, kept while queued
    pressed_buttons: Cell<MouseButtons>,
    pointer_position: Cell<Option<[f32; 2]>>,
    was_owner: Cell<bool>,
    debug: Rc<DebugState>,
    debug_listener: Option<DelegateId>,
}

impl<C: GuiContext + 'static> Surface<C> {
    /// Bind a new surface to `proxy`
    ///
    /// Registers the surface debug overlay on the proxy's draw delegate and
    /// creates the input handler from the current settings.
    pub fn new(
        proxy: &ProxyHandle<C>,
        settings: SharedSettings,
        handler_factory: Rc<dyn InputHandlerFactory>,
    ) -> Self {
        let id = SurfaceId::next();
        let debug = Rc::new(DebugState::default());
        let handler = handler_factory.new_handler(&settings.get().input);

        let (context_name, debug_listener) = {
            let mut proxy = proxy.borrow_mut();
            let context_name = proxy.name().to_owned();
            let overlay_settings = settings.clone();
            let overlay_state = Rc::clone(&debug);
            let overlay_name = context_name.clone();
            let listener = proxy.on_draw().add(move |ui: &mut C::Ui| {
                if overlay_settings.get().debug_surface {
                    draw_debug_overlay(ui, id, &overlay_name, &overlay_state);
                }
            });
            (context_name, listener)
        };

        crate::multiplex_debug!("Surface {:?} bound to context '{}'", id, context_name);

        Self {
            id,
            proxy: Rc::downgrade(proxy),
            context_name,
            settings_generation: settings.generation(),
            settings,
            handler_factory,
            handler,
            input_mode: InputMode::None,
            has_keyboard_focus: false,
            is_hovered: false,
            mouse_event_notification: false,
            cursor_override: MouseCursor::None,
            origin: Cell::new([0.0, 0.0]),
            pressed_buttons: Cell::new(MouseButtons::empty()),
            pointer_position: Cell::new(None),
            was_owner: Cell::new(false),
            debug,
            debug_listener: Some(debug_listener),
        }
    }

    pub fn id(&self) -> SurfaceId {
        self.id
    }

    pub fn context_name(&self) -> &str {
        &self.context_name
    }

    /// Whether the bound proxy still exists
    pub fn is_bound(&self) -> bool {
        self.proxy.strong_count() > 0
    }

    pub fn input_mode(&self) -> InputMode {
        self.input_mode
    }

    /// Whether this surface currently owns the context's input state
    pub fn owns_input(&self) -> bool {
        self.with_proxy(|proxy| proxy.input_owner() == Some(self.id))
            .unwrap_or(false)
    }

    /// Size the surface asks the host layout for
    pub fn desired_size(&self) -> [f32; 2] {
        self.settings.get().canvas_size
    }

    // Keyboard

    pub fn on_key_char(&mut self, event: &CharacterEvent) -> EventReply {
        self.refresh_handler();
        let Some(response) = self.respond(|handler, _| handler.on_key_char(event)) else {
            return EventReply::Unhandled;
        };
        if response.process {
            self.with_input_state(|state| state.add_character(event.character));
        }
        EventReply::from_consumed(response.consume)
    }

    pub fn on_key_down(&mut self, event: &KeyEvent) -> EventReply {
        self.refresh_handler();
        if let InputKey::Gamepad(key) = event.key {
            if !self.gamepad_navigation_enabled() {
                return EventReply::Unhandled;
            }
            let Some(response) =
                self.respond(|handler, active| handler.on_key_down(event, active))
            else {
                return EventReply::Unhandled;
            };
            if response.process {
                self.with_input_state(|state| state.set_gamepad_nav_key(key, true));
            }
            return EventReply::from_consumed(response.consume);
        }

        let Some(response) = self.respond(|handler, active| handler.on_key_down(event, active))
        else {
            return EventReply::Unhandled;
        };
        if response.process
            && let Some(key) = event.keyboard_key()
        {
            self.with_input_state(|state| {
                state.set_key_down(key, true);
                state.set_modifiers(event.modifiers);
            });
        }
        EventReply::from_consumed(response.consume)
    }

    /// Key up always clears the key so nothing stays stuck
    pub fn on_key_up(&mut self, event: &KeyEvent) -> EventReply {
        self.refresh_handler();
        match event.key {
            InputKey::Gamepad(key) => {
                if !self.gamepad_navigation_enabled() {
                    return EventReply::Unhandled;
                }
                self.with_input_state(|state| state.set_gamepad_nav_key(key, false));
            }
            InputKey::Keyboard(key) => {
                self.with_input_state(|state| {
                    state.set_key_down(key, false);
                    state.set_modifiers(event.modifiers);
                });
            }
        }
        self.respond(|handler, _| handler.on_key_up(event))
            .map_or(EventReply::Unhandled, |response| {
                EventReply::from_consumed(response.consume)
            })
    }

    pub fn on_analog_value_changed(&mut self, event: &AnalogInputEvent) -> EventReply {
        self.refresh_handler();
        if !self.gamepad_navigation_enabled() {
            return EventReply::Unhandled;
        }
        let Some(response) = self.respond(|handler, _| handler.on_analog_value_changed(event))
        else {
            return EventReply::Unhandled;
        };
        if response.process {
            self.with_input_state(|state| state.set_gamepad_nav_axis(event.axis, event.value));
        }
        EventReply::from_consumed(response.consume)
    }

    // Mouse

    pub fn on_mouse_button_down(&mut self, event: &PointerEvent) -> EventReply {
        self.refresh_handler();
        self.track_button(event, true);
        self.pointer_event(event, |handler| handler.on_mouse_button_down(event), |state| {
            if let Some(button) = event.button {
                state.set_mouse_down(button, true);
            }
        })
    }

    pub fn on_mouse_button_double_click(&mut self, event: &PointerEvent) -> EventReply {
        self.refresh_handler();
        self.track_button(event, true);
        self.pointer_event(
            event,
            |handler| handler.on_mouse_button_double_click(event),
            |state| {
                if let Some(button) = event.button {
                    state.set_mouse_down(button, true);
                }
            },
        )
    }

    pub fn on_mouse_button_up(&mut self, event: &PointerEvent) -> EventReply {
        self.refresh_handler();
        self.track_button(event, false);
        self.pointer_event(event, |handler| handler.on_mouse_button_up(event), |state| {
            if let Some(button) = event.button {
                state.set_mouse_down(button, false);
            }
        })
    }

    pub fn on_mouse_wheel(&mut self, event: &PointerEvent) -> EventReply {
        self.refresh_handler();
        self.pointer_event(event, |handler| handler.on_mouse_wheel(event), |state| {
            state.add_mouse_wheel_delta(event.wheel_delta)
        })
    }

    pub fn on_mouse_move(&mut self, event: &PointerEvent) -> EventReply {
        self.refresh_handler();
        self.mouse_event_notification = true;
        let [ox, oy] = self.origin.get();
        let [x, y] = event.screen_position;
        let position = [x - ox, y - oy];
        self.pointer_position.set(Some(position));
        self.pointer_event(event, |handler| handler.on_mouse_move(event), |state| {
            state.set_mouse_position(Some(position))
        })
    }

    /// Pointer entered the surface: take input and resync held buttons
    pub fn on_mouse_enter(&mut self, event: &PointerEvent) {
        self.refresh_handler();
        self.is_hovered = true;
        self.pressed_buttons.set(event.pressed_buttons);
        self.update_input_mode(self.has_keyboard_focus, true);
        self.with_input_state(|state| {
            for button in MouseButton::ALL {
                state.set_mouse_down(button, event.is_pressed(button));
            }
        });
    }

    pub fn on_mouse_leave(&mut self) {
        self.is_hovered = false;
        self.pressed_buttons.set(MouseButtons::empty());
        self.pointer_position.set(None);
        self.update_input_mode(self.has_keyboard_focus, false);
    }

    // Focus

    pub fn on_focus_received(&mut self) {
        self.has_keyboard_focus = true;
        self.update_input_mode(true, self.is_hovered);
    }

    pub fn on_focus_lost(&mut self) {
        self.has_keyboard_focus = false;
        self.update_input_mode(false, self.is_hovered);
    }

    /// Per host tick check recovering from lost focus or mouse-leave events
    ///
    /// Mouse-leave can be lost when another viewport captures the mouse. In
    /// pointer-only mode a tick without any mouse move since the previous one
    /// re-evaluates hover from `hovered`.
    pub fn update_mouse_status(&mut self, hovered: bool, has_keyboard_focus: bool) {
        if self.input_mode == InputMode::Full && !has_keyboard_focus {
            self.has_keyboard_focus = false;
            self.update_input_mode(false, hovered);
        }

        if self.input_mode == InputMode::MousePointerOnly {
            if !self.mouse_event_notification {
                self.is_hovered = hovered;
                self.update_input_mode(false, hovered);
            }
            self.mouse_event_notification = false;
        }
    }

    // Cursor

    /// Cursor the host should show over this surface
    ///
    /// An explicit override wins; otherwise the context's cursor when the
    /// host draws the cursor, or `None` when the GUI draws its own.
    pub fn cursor_query(&self) -> MouseCursor {
        if self.cursor_override != MouseCursor::None {
            return self.cursor_override;
        }
        if self.settings.get().draw_mouse_cursor {
            return MouseCursor::None;
        }
        self.with_proxy(|proxy| proxy.mouse_cursor())
            .unwrap_or(MouseCursor::None)
    }

    /// Force a host cursor; `MouseCursor::None` removes the override
    pub fn set_mouse_cursor_override(&mut self, cursor: MouseCursor) {
        if self.cursor_override != cursor {
            self.cursor_override = cursor;
            self.sync_mouse_pointer();
        }
    }

    // Paint

    /// Tick the proxy if needed and convert its draw output to screen space
    ///
    /// `clip_rect` is the surface's visible rectangle in screen space; its
    /// rounded top-left corner is the canvas origin and its size becomes the
    /// context display size.
    pub fn paint<F: TextureFactory>(
        &self,
        clip_rect: [f32; 4],
        delta_seconds: f32,
        textures: &TextureManager<F>,
    ) -> Vec<SurfaceDrawElement<F::Handle>> {
        let origin = [clip_rect[0].round(), clip_rect[1].round()];
        self.origin.set(origin);
        self.sync_promoted_state();

        let Some(draw_data) = self.with_proxy(|proxy| {
            proxy.set_display_size([clip_rect[2] - clip_rect[0], clip_rect[3] - clip_rect[1]]);
            proxy.tick(delta_seconds);
            proxy.draw_data()
        }) else {
            return Vec::new();
        };

        draw_data
            .batches()
            .iter()
            .map(|batch| {
                let texture = textures.resolve(batch.texture_id).clone();
                let batch_clip = [
                    batch.clip_rect[0] + origin[0],
                    batch.clip_rect[1] + origin[1],
                    batch.clip_rect[2] + origin[0],
                    batch.clip_rect[3] + origin[1],
                ];
                SurfaceDrawElement {
                    texture,
                    vertices: batch
                        .vertices
                        .iter()
                        .map(|vertex| DrawVert {
                            pos: [vertex.pos[0] + origin[0], vertex.pos[1] + origin[1]],
                            ..*vertex
                        })
                        .collect(),
                    indices: batch.indices.clone(),
                    clip_rect: intersect_rects(batch_clip, clip_rect),
                }
            })
            .collect()
    }

    // Internals

    fn with_proxy<R>(&self, f: impl FnOnce(&mut ContextProxy<C>) -> R) -> Option<R> {
        let proxy = self.proxy.upgrade()?;
        let Ok(mut proxy) = proxy.try_borrow_mut() else {
            crate::multiplex_warn!(
                "Surface {:?}: context '{}' is busy, dropping call",
                self.id,
                self.context_name
            );
            return None;
        };
        Some(f(&mut proxy))
    }

    /// Run `f` on the input state if this surface owns it
    fn with_input_state(&self, f: impl FnOnce(&mut InputState)) {
        let id = self.id;
        self.with_proxy(|proxy| {
            if let Some(state) = proxy.try_input_state_mut(id) {
                f(state);
            }
        });
    }

    fn respond(
        &self,
        f: impl FnOnce(&dyn InputHandler, bool) -> InputResponse,
    ) -> Option<InputResponse> {
        let has_active_item = self.with_proxy(|proxy| proxy.has_active_item())?;
        Some(f(self.handler.as_ref(), has_active_item))
    }

    fn pointer_event(
        &mut self,
        event: &PointerEvent,
        decide: impl FnOnce(&dyn InputHandler) -> InputResponse,
        apply: impl FnOnce(&mut InputState),
    ) -> EventReply {
        let Some(response) = self.respond(|handler, _| decide(handler)) else {
            return EventReply::Unhandled;
        };
        if response.process {
            let copy_modifiers = self.input_mode == InputMode::MousePointerOnly;
            self.with_input_state(|state| {
                apply(state);
                if copy_modifiers {
                    state.set_modifiers(event.modifiers);
                }
            });
            self.sync_mouse_pointer();
        }
        EventReply::from_consumed(response.consume)
    }

    fn gamepad_navigation_enabled(&self) -> bool {
        self.with_proxy(|proxy| proxy.input_state().is_gamepad_navigation_enabled())
            .unwrap_or(false)
    }

    fn refresh_handler(&mut self) {
        let generation = self.settings.generation();
        if generation != self.settings_generation {
            self.handler = self.handler_factory.new_handler(&self.settings.get().input);
            self.settings_generation = generation;
            crate::multiplex_debug!("Surface {:?}: input handler recreated", self.id);
        }
        self.sync_promoted_state();
    }

    fn track_button(&self, event: &PointerEvent, down: bool) {
        if let Some(button) = event.button {
            let mut pressed = self.pressed_buttons.get();
            pressed.set(button.flag(), down);
            self.pressed_buttons.set(pressed);
        }
    }

    /// Replay this surface's pointer into the input state after a queue promotion
    ///
    /// The previous owner resets the state on release, so a surface that was
    /// waiting in the queue starts from a blank pointer otherwise.
    fn sync_promoted_state(&self) {
        let owns = self.owns_input();
        if owns && !self.was_owner.get() {
            let pressed = self.pressed_buttons.get();
            let position = self.pointer_position.get().filter(|_| self.is_hovered);
            self.with_input_state(|state| {
                for button in MouseButton::ALL {
                    state.set_mouse_down(button, pressed.contains(button.flag()));
                }
                if position.is_some() {
                    state.set_mouse_position(position);
                }
            });
            self.sync_mouse_pointer();
            crate::multiplex_debug!(
                "Surface {:?} promoted to input owner of '{}'",
                self.id,
                self.context_name
            );
        }
        self.was_owner.set(owns);
    }

    fn wants_mouse_pointer(&self) -> bool {
        self.cursor_override == MouseCursor::None
            && self.is_hovered
            && self.settings.get().draw_mouse_cursor
    }

    fn sync_mouse_pointer(&self) {
        let has_pointer = self.wants_mouse_pointer();
        self.debug.has_mouse_pointer.set(has_pointer);
        self.with_input_state(|state| state.set_mouse_pointer(has_pointer));
    }

    fn update_input_mode(&mut self, has_keyboard_focus: bool, has_mouse_pointer: bool) {
        let new_mode = InputMode::from_state(has_keyboard_focus, has_mouse_pointer);
        let old_mode = self.input_mode;

        if new_mode != old_mode {
            crate::multiplex_debug!(
                "Surface {:?} ('{}'): input mode {:?} -> {:?}",
                self.id,
                self.context_name,
                old_mode,
                new_mode
            );

            let id = self.id;
            self.with_proxy(|proxy| {
                if new_mode == InputMode::None {
                    if let Some(state) = proxy.try_input_state_mut(id) {
                        state.set_mouse_pointer(false);
                        state.reset_state();
                    }
                    proxy.release_input_state(id);
                } else {
                    if old_mode == InputMode::None {
                        proxy.request_input_state(id);
                    }
                    if old_mode == InputMode::Full
                        && let Some(state) = proxy.try_input_state_mut(id)
                    {
                        state.reset_keyboard_state();
                        state.reset_navigation_state();
                    }
                }
            });

            self.input_mode = new_mode;
            self.mouse_event_notification = false;
            self.was_owner.set(self.owns_input());
        }

        self.debug.mode.set(self.input_mode);
        self.debug.hovered.set(self.is_hovered);
        self.debug.focused.set(self.has_keyboard_focus);
        self.sync_mouse_pointer();
    }
}

impl<C: GuiContext> Drop for Surface<C> {
    fn drop(&mut self) {
        let Some(proxy) = self.proxy.upgrade() else {
            return;
        };
        match proxy.try_borrow_mut() {
            Ok(mut proxy) => {
                if let Some(listener) = self.debug_listener.take() {
                    proxy.on_draw().remove(listener);
                }
                proxy.release_input_state(self.id);
            }
            Err(_) => {
                crate::multiplex_warn!(
                    "Surface {:?} dropped while context '{}' is busy; binding left behind",
                    self.id,
                    self.context_name
                );
            }
        }
    }
}

fn draw_debug_overlay<U: DebugUi>(ui: &mut U, id: SurfaceId, context: &str, state: &DebugState) {
    ui.debug_text(&format!("Surface {} -> context '{}'", id.id(), context));
    ui.debug_text(&format!("Input mode: {:?}", state.mode.get()));
    ui.debug_text(&format!(
        "Has mouse pointer: {}",
        state.has_mouse_pointer.get()
    ));
    ui.debug_text(&format!(
        "Hovered: {}, keyboard focus: {}",
        state.hovered.get(),
        state.focused.get()
    ));
}

/// Intersection of two (x0, y0, x1, y1) rectangles; empty results collapse to zero size
fn intersect_rects(a: [f32; 4], b: [f32; 4]) -> [f32; 4] {
    let x0 = a[0].max(b[0]);
    let y0 = a[1].max(b[1]);
    let x1 = a[2].min(b[2]).max(x0);
    let y1 = a[3].min(b[3]).max(y0);
    [x0, y0, x1, y1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::headless::{HeadlessBackend, HeadlessContext};
    use crate::config::{InputSettings, Settings};
    use crate::input::{GamepadKey, Key, KeyModFlags, MouseButtons, NavInput};
    use crate::input_handler::DefaultInputHandlerFactory;
    use crate::manager::ContextManager;

    fn setup(settings: Settings) -> (ContextManager<HeadlessBackend>, SharedSettings) {
        let mut manager = ContextManager::new(HeadlessBackend::new()).unwrap();
        manager.apply_input_settings(&settings.input);
        (manager, SharedSettings::new(settings))
    }

    fn bind_surface(
        manager: &mut ContextManager<HeadlessBackend>,
        settings: &SharedSettings,
    ) -> Surface<HeadlessContext> {
        let proxy = manager.get_or_create_proxy(Some("Game"));
        Surface::new(&proxy, settings.clone(), Rc::new(DefaultInputHandlerFactory))
    }

    #[test]
    fn test_intersect_rects() {
        assert_eq!(
            intersect_rects([0.0, 0.0, 10.0, 10.0], [5.0, 5.0, 20.0, 20.0]),
            [5.0, 5.0, 10.0, 10.0]
        );
        assert_eq!(
            intersect_rects([0.0, 0.0, 1.0, 1.0], [5.0, 5.0, 6.0, 6.0]),
            [5.0, 5.0, 5.0, 5.0]
        );
    }

    #[test]
    fn test_input_modes() {
        let (mut manager, settings) = setup(Settings::default());
        let mut surface = bind_surface(&mut manager, &settings);
        assert_eq!(surface.input_mode(), InputMode::None);

        surface.on_mouse_enter(&PointerEvent::new([0.0, 0.0]));
        assert_eq!(surface.input_mode(), InputMode::MousePointerOnly);
        assert!(surface.owns_input());

        surface.on_focus_received();
        assert_eq!(surface.input_mode(), InputMode::Full);

        surface.on_mouse_leave();
        assert_eq!(surface.input_mode(), InputMode::Full);
        assert!(surface.owns_input());

        surface.on_focus_lost();
        assert_eq!(surface.input_mode(), InputMode::None);
        assert!(!surface.owns_input());
    }

    #[test]
    fn test_downgrade_from_full_resets_keyboard() {
        let (mut manager, settings) = setup(Settings::default());
        let mut surface = bind_surface(&mut manager, &settings);
        surface.on_mouse_enter(&PointerEvent::new([0.0, 0.0]));
        surface.on_focus_received();
        surface.on_key_down(&KeyEvent::new(Key::W));
        surface.on_mouse_button_down(&PointerEvent::new([0.0, 0.0]).with_button(MouseButton::Left));

        surface.on_focus_lost();

        let proxy = manager.get_or_create_proxy(Some("Game"));
        let proxy = proxy.borrow();
        assert!(!proxy.input_state().is_key_down(Key::W));
        assert!(proxy.input_state().is_mouse_down(MouseButton::Left));
    }

    #[test]
    fn test_key_up_always_clears() {
        let settings = Settings {
            input: InputSettings {
                console_keys: vec![Key::GraveAccent],
                ..InputSettings::default()
            },
            ..Settings::default()
        };
        let (mut manager, settings) = setup(settings);
        let mut surface = bind_surface(&mut manager, &settings);
        surface.on_focus_received();
        surface.on_key_down(&KeyEvent::new(Key::A));

        surface.on_key_up(&KeyEvent::new(Key::A));

        let proxy = manager.get_or_create_proxy(Some("Game"));
        assert!(!proxy.borrow().input_state().is_key_down(Key::A));
    }

    #[test]
    fn test_console_key_is_not_consumed() {
        let (mut manager, settings) = setup(Settings::default());
        let mut surface = bind_surface(&mut manager, &settings);
        surface.on_focus_received();

        let reply = surface.on_key_down(&KeyEvent::new(Key::GraveAccent));

        assert_eq!(reply, EventReply::Unhandled);
        let proxy = manager.get_or_create_proxy(Some("Game"));
        assert!(!proxy.borrow().input_state().is_key_down(Key::GraveAccent));
    }

    #[test]
    fn test_key_down_copies_modifiers() {
        let (mut manager, settings) = setup(Settings::default());
        let mut surface = bind_surface(&mut manager, &settings);
        surface.on_focus_received();

        let reply =
            surface.on_key_down(&KeyEvent::new(Key::C).with_modifiers(KeyModFlags::CTRL));

        assert!(reply.is_handled());
        let proxy = manager.get_or_create_proxy(Some("Game"));
        assert_eq!(proxy.borrow().input_state().modifiers(), KeyModFlags::CTRL);
    }

    #[test]
    fn test_gamepad_keys_need_navigation() {
        let (mut manager, settings) = setup(Settings::default());
        let mut surface = bind_surface(&mut manager, &settings);
        surface.on_focus_received();
        let event = KeyEvent::new(GamepadKey::FaceButtonBottom);
        assert!(matches!(event.key, InputKey::Gamepad(_)));

        assert_eq!(surface.on_key_down(&event), EventReply::Unhandled);

        let enabled = Settings {
            input: InputSettings {
                gamepad_navigation: true,
                ..InputSettings::default()
            },
            ..Settings::default()
        };
        let (mut manager, settings) = setup(enabled);
        let mut surface = bind_surface(&mut manager, &settings);
        surface.on_focus_received();

        assert_eq!(surface.on_key_down(&event), EventReply::Handled);
        let proxy = manager.get_or_create_proxy(Some("Game"));
        assert_eq!(proxy.borrow().input_state().nav_input(NavInput::Activate), 1.0);
    }

    #[test]
    fn test_modifiers_from_pointer_only_in_pointer_mode() {
        let (mut manager, settings) = setup(Settings::default());
        let mut surface = bind_surface(&mut manager, &settings);
        surface.on_mouse_enter(&PointerEvent::new([0.0, 0.0]));
        surface.on_mouse_move(&PointerEvent::new([1.0, 1.0]).with_modifiers(KeyModFlags::SHIFT));
        let proxy = manager.get_or_create_proxy(Some("Game"));
        assert_eq!(proxy.borrow().input_state().modifiers(), KeyModFlags::SHIFT);

        surface.on_focus_received();
        surface.on_mouse_move(&PointerEvent::new([2.0, 2.0]).with_modifiers(KeyModFlags::ALT));
        assert_eq!(proxy.borrow().input_state().modifiers(), KeyModFlags::SHIFT);
        assert_eq!(proxy.borrow().input_state().mouse_position(), Some([2.0, 2.0]));
    }

    #[test]
    fn test_mouse_enter_resyncs_buttons() {
        let (mut manager, settings) = setup(Settings::default());
        let mut surface = bind_surface(&mut manager, &settings);
        surface.on_mouse_enter(
            &PointerEvent::new([0.0, 0.0])
                .with_pressed_buttons(MouseButtons::RIGHT | MouseButtons::EXTRA2),
        );

        let proxy = manager.get_or_create_proxy(Some("Game"));
        let proxy = proxy.borrow();
        assert!(proxy.input_state().is_mouse_down(MouseButton::Right));
        assert!(proxy.input_state().is_mouse_down(MouseButton::Extra2));
        assert!(!proxy.input_state().is_mouse_down(MouseButton::Left));
    }

    #[test]
    fn test_cursor_query() {
        let (mut manager, settings) = setup(Settings::default());
        let mut surface = bind_surface(&mut manager, &settings);
        assert_eq!(surface.cursor_query(), MouseCursor::None);

        manager.tick(0.016);
        assert_eq!(surface.cursor_query(), MouseCursor::Arrow);

        surface.set_mouse_cursor_override(MouseCursor::Hand);
        assert_eq!(surface.cursor_query(), MouseCursor::Hand);
        surface.set_mouse_cursor_override(MouseCursor::None);

        settings.replace(Settings {
            draw_mouse_cursor: true,
            ..Settings::default()
        });
        assert_eq!(surface.cursor_query(), MouseCursor::None);
    }

    #[test]
    fn test_mouse_pointer_flag_follows_draw_cursor() {
        let (mut manager, settings) = setup(Settings {
            draw_mouse_cursor: true,
            ..Settings::default()
        });
        let mut surface = bind_surface(&mut manager, &settings);
        surface.on_mouse_enter(&PointerEvent::new([0.0, 0.0]));
        let proxy = manager.get_or_create_proxy(Some("Game"));
        assert!(proxy.borrow().input_state().has_mouse_pointer());

        surface.set_mouse_cursor_override(MouseCursor::TextInput);
        assert!(!proxy.borrow().input_state().has_mouse_pointer());
    }

    #[test]
    fn test_lost_mouse_leave_recovery() {
        let (mut manager, settings) = setup(Settings::default());
        let mut surface = bind_surface(&mut manager, &settings);
        surface.on_mouse_enter(&PointerEvent::new([0.0, 0.0]));
        surface.on_mouse_move(&PointerEvent::new([1.0, 1.0]));

        surface.update_mouse_status(false, false);
        assert_eq!(surface.input_mode(), InputMode::MousePointerOnly);

        surface.update_mouse_status(false, false);
        assert_eq!(surface.input_mode(), InputMode::None);
        assert!(!surface.owns_input());
    }

    #[test]
    fn test_paint_translates_to_screen_space() {
        let (mut manager, settings) = setup(Settings::default());
        let surface = bind_surface(&mut manager, &settings);
        let proxy = manager.get_or_create_proxy(Some("Game"));
        proxy
            .borrow_mut()
            .on_draw()
            .add(|ui| ui.add_rect_filled([10.0, 10.0], [20.0, 20.0], 0xFF00_00FF));
        let textures =
            TextureManager::new(crate::backend::headless::HeadlessTextureFactory::default())
                .unwrap();

        let elements = surface.paint([100.0, 50.0, 900.0, 650.0], 0.016, &textures);

        assert_eq!(elements.len(), 1);
        let element = &elements[0];
        assert_eq!(element.vertices[0].pos, [110.0, 60.0]);
        assert_eq!(element.indices, vec![0, 1, 2, 0, 2, 3]);
        assert_eq!(element.texture.name, crate::texture::PLAIN_TEXTURE_NAME);
        assert_eq!(element.clip_rect, [100.0, 50.0, 900.0, 650.0]);
        assert_eq!(proxy.borrow().display_size(), [800.0, 600.0]);
    }

    #[test]
    fn test_paint_without_proxy_is_empty() {
        let (mut manager, settings) = setup(Settings::default());
        let surface = bind_surface(&mut manager, &settings);
        drop(manager);
        let textures =
            TextureManager::new(crate::backend::headless::HeadlessTextureFactory::default())
                .unwrap();

        assert!(!surface.is_bound());
        assert!(surface.paint([0.0, 0.0, 10.0, 10.0], 0.016, &textures).is_empty());
    }

    #[test]
    fn test_debug_overlay() {
        let (mut manager, settings) = setup(Settings {
            debug_surface: true,
            ..Settings::default()
        });
        let _surface = bind_surface(&mut manager, &settings);
        manager.tick(0.016);

        let proxy = manager.get_or_create_proxy(Some("Game"));
        let proxy = proxy.borrow();
        let lines = proxy.gui().unwrap().debug_lines();
        assert!(lines[0].contains("context 'Game'"));
        assert_eq!(lines[1], "Input mode: None");
    }

    #[test]
    fn test_drop_releases_binding() {
        let (mut manager, settings) = setup(Settings::default());
        let mut surface = bind_surface(&mut manager, &settings);
        surface.on_mouse_enter(&PointerEvent::new([0.0, 0.0]));
        let proxy = manager.get_or_create_proxy(Some("Game"));
        assert_eq!(proxy.borrow_mut().on_draw().len(), 1);

        drop(surface);

        assert_eq!(proxy.borrow().input_owner(), None);
        assert!(proxy.borrow_mut().on_draw().is_empty());
    }
}
