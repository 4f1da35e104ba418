//! Dear ImGui backend built on `dear-imgui-rs`
//!
//! Every [`ImguiContext`] owns one Dear ImGui context created against the
//! backend's shared font atlas. Dear ImGui keeps a single current context per
//! process, so the contexts of one backend share a context pool that
//! suspends whichever context is current before activating another.
//!
//! Frames run the library's own `NewFrame`/`Render`; the finished draw data is
//! copied through the library's frame snapshot and exposed as a [`DrawData`]
//! view until the next frame.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use dear_imgui_rs::render::snapshot::{
    DrawCmdSnapshot, DrawDataSnapshot, FrameSnapshot, SnapshotOptions, TextureBinding,
    UserCallbackPolicy,
};
use dear_imgui_rs::texture::{TextureFormat, TextureId as ImTextureId};
use dear_imgui_rs::{
    ConfigFlags, Context, FontConfig, Io, Key as ImKey, MouseButton as ImMouseButton,
    MouseCursor as ImCursor, SuspendedContext, Ui,
};

use crate::backend::{DebugUi, FrameInput, FrameUi, GuiBackend, GuiContext};
use crate::error::{IntoMultiplexError, MultiplexError, MultiplexResult};
use crate::fonts::{FontAtlas, SharedFontAtlas};
use crate::input::{Key, KeyModFlags, MouseButton, MouseCursor, NavInput};
use crate::render::{DrawCmd, DrawData, DrawIdx, DrawList, DrawVert};
use crate::texture::TextureId;

/// Pixel size of the default font
pub const DEFAULT_FONT_SIZE: f32 = 13.0;

/// Navigation inputs above this count as a held key
const NAV_PRESS_THRESHOLD: f32 = 0.5;

const SNAPSHOT_OPTIONS: SnapshotOptions = SnapshotOptions {
    user_callback_policy: UserCallbackPolicy::Drop,
    capture_texture_requests: false,
};

const MOUSE_BUTTONS: [(MouseButton, ImMouseButton); 3] = [
    (MouseButton::Left, ImMouseButton::Left),
    (MouseButton::Right, ImMouseButton::Right),
    (MouseButton::Middle, ImMouseButton::Middle),
];

const MODIFIER_KEYS: [(KeyModFlags, ImKey); 4] = [
    (KeyModFlags::CTRL, ImKey::LeftCtrl),
    (KeyModFlags::SHIFT, ImKey::LeftShift),
    (KeyModFlags::ALT, ImKey::LeftAlt),
    (KeyModFlags::SUPER, ImKey::LeftSuper),
];

/// Gamepad navigation replayed as keyboard navigation keys
const NAV_KEYS: [(NavInput, ImKey); 11] = [
    (NavInput::Activate, ImKey::Space),
    (NavInput::Cancel, ImKey::Escape),
    (NavInput::Input, ImKey::Enter),
    (NavInput::DpadLeft, ImKey::LeftArrow),
    (NavInput::DpadRight, ImKey::RightArrow),
    (NavInput::DpadUp, ImKey::UpArrow),
    (NavInput::DpadDown, ImKey::DownArrow),
    (NavInput::LStickLeft, ImKey::LeftArrow),
    (NavInput::LStickRight, ImKey::RightArrow),
    (NavInput::LStickUp, ImKey::UpArrow),
    (NavInput::LStickDown, ImKey::DownArrow),
];

/// Backend producing [`ImguiContext`]s that share one font atlas
#[derive(Debug)]
pub struct ImguiBackend {
    font_atlas: dear_imgui_rs::SharedFontAtlas,
    font_size: f32,
    pool: Rc<RefCell<ContextPool>>,
    next_id: u64,
}

impl Default for ImguiBackend {
    fn default() -> Self {
        Self {
            font_atlas: dear_imgui_rs::SharedFontAtlas::create(),
            font_size: DEFAULT_FONT_SIZE,
            pool: Rc::new(RefCell::new(ContextPool::default())),
            next_id: 0,
        }
    }
}

impl ImguiBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_font_size(mut self, font_size: f32) -> Self {
        self.font_size = font_size;
        self
    }
}

impl GuiBackend for ImguiBackend {
    type Context = ImguiContext;

    /// Add the default font to the shared atlas and copy out its pixels
    ///
    /// A temporary context is activated for the build, so any context of this
    /// backend that is current gets suspended first.
    fn build_font_atlas(&mut self) -> MultiplexResult<FontAtlas> {
        if !self.pool.borrow_mut().suspend_active() {
            return Err(MultiplexError::font_atlas(
                "a context is mid-frame, cannot build the font atlas",
            ));
        }

        let suspended = SuspendedContext::create_with_shared_font_atlas(self.font_atlas.clone())
            .map_err(IntoMultiplexError::into_multiplex_error)?;
        let mut context = suspended.activate().map_err(|_| {
            MultiplexError::font_atlas("another Dear ImGui context is current on this thread")
        })?;

        let mut atlas = context.font_atlas_mut();
        let config = FontConfig::new().size_pixels(self.font_size);
        atlas.add_font_default(Some(&config));
        if !atlas.build() {
            return Err(MultiplexError::font_atlas("Dear ImGui could not build the atlas"));
        }
        let white_pixel_uv = atlas.get_tex_uv_white_pixel();

        let Some(texture) = atlas.tex_data_mut() else {
            return Err(MultiplexError::font_atlas("atlas has no texture data"));
        };
        let (width, height) = (texture.width(), texture.height());
        let Some(pixels) = texture.pixels() else {
            return Err(MultiplexError::font_atlas("atlas texture has no pixels"));
        };
        let rgba = match texture.format() {
            TextureFormat::RGBA32 => pixels.to_vec(),
            TextureFormat::Alpha8 => expand_alpha8(pixels),
        };
        let (Ok(width), Ok(height)) = (u32::try_from(width), u32::try_from(height)) else {
            return Err(MultiplexError::font_atlas(format!(
                "atlas reports negative size {}x{}",
                width, height
            )));
        };

        crate::multiplex_debug!(
            "Built Dear ImGui font atlas {}x{} at {}px",
            width,
            height,
            self.font_size
        );
        FontAtlas::new(width, height, rgba, self.font_size, white_pixel_uv)
    }

    fn create_context(
        &mut self,
        name: &str,
        font_atlas: &SharedFontAtlas,
    ) -> MultiplexResult<ImguiContext> {
        let suspended = SuspendedContext::create_with_shared_font_atlas(self.font_atlas.clone())
            .map_err(|err| MultiplexError::context_creation(name, err.to_string()))?;

        self.next_id += 1;
        let id = self.next_id;
        self.pool
            .borrow_mut()
            .parked
            .insert(id, Parked::Suspended(suspended));

        crate::multiplex_debug!("Created Dear ImGui context '{}' (slot {})", name, id);
        Ok(ImguiContext {
            id,
            name: name.to_owned(),
            pool: Rc::clone(&self.pool),
            frame_context: None,
            font_atlas: font_atlas.clone(),
            applied_font_texture: None,
            configured: false,
            submitted: SubmittedInput::default(),
            display_pos: [0.0, 0.0],
            display_size: [0.0, 0.0],
            lists: Vec::new(),
        })
    }
}

#[derive(Debug)]
enum Parked {
    Current(Context),
    Suspended(SuspendedContext),
    /// Checked out by a frame in progress
    InFrame,
}

/// Library contexts of one backend, at most one of them current
#[derive(Debug, Default)]
struct ContextPool {
    parked: HashMap<u64, Parked>,
    current: Option<u64>,
}

impl ContextPool {
    /// Suspend the current context; false if it is mid-frame
    fn suspend_active(&mut self) -> bool {
        let Some(current) = self.current else {
            return true;
        };
        match self.parked.remove(&current) {
            Some(Parked::Current(context)) => {
                self.parked
                    .insert(current, Parked::Suspended(context.suspend()));
            }
            Some(Parked::InFrame) => {
                self.parked.insert(current, Parked::InFrame);
                return false;
            }
            Some(parked) => {
                self.parked.insert(current, parked);
            }
            None => {}
        }
        self.current = None;
        true
    }

    fn activate(&mut self, id: u64) -> bool {
        if self.current == Some(id) {
            return true;
        }
        if !self.suspend_active() {
            crate::multiplex_warn!("Dear ImGui context switch requested mid-frame, ignoring");
            return false;
        }

        match self.parked.remove(&id) {
            Some(Parked::Suspended(context)) => match context.activate() {
                Ok(context) => {
                    self.parked.insert(id, Parked::Current(context));
                    self.current = Some(id);
                    true
                }
                Err(context) => {
                    self.parked.insert(id, Parked::Suspended(context));
                    crate::multiplex_warn!(
                        "Another Dear ImGui context is current on this thread, cannot switch"
                    );
                    false
                }
            },
            Some(parked) => {
                self.parked.insert(id, parked);
                false
            }
            None => false,
        }
    }

    fn check_out(&mut self, id: u64) -> Option<Context> {
        if self.current != Some(id) {
            return None;
        }
        match self.parked.remove(&id)? {
            Parked::Current(context) => {
                self.parked.insert(id, Parked::InFrame);
                Some(context)
            }
            other => {
                self.parked.insert(id, other);
                None
            }
        }
    }

    fn check_in(&mut self, id: u64, context: Context) {
        self.parked.insert(id, Parked::Current(context));
    }

    fn remove(&mut self, id: u64) {
        self.parked.remove(&id);
        if self.current == Some(id) {
            self.current = None;
        }
    }
}

/// Input already pushed to the library, diffed against each new frame
#[derive(Debug, Default)]
struct SubmittedInput {
    keys: HashSet<ImKey>,
    mouse_down: [bool; MOUSE_BUTTONS.len()],
    mouse_position: Option<[f32; 2]>,
}

#[derive(Debug)]
struct CapturedList {
    vertices: Vec<DrawVert>,
    indices: Vec<DrawIdx>,
    commands: Vec<DrawCmd>,
}

/// One Dear ImGui context
#[derive(Debug)]
pub struct ImguiContext {
    id: u64,
    name: String,
    pool: Rc<RefCell<ContextPool>>,
    frame_context: Option<Context>,
    font_atlas: SharedFontAtlas,
    applied_font_texture: Option<TextureId>,
    configured: bool,
    submitted: SubmittedInput,
    display_pos: [f32; 2],
    display_size: [f32; 2],
    lists: Vec<CapturedList>,
}

impl ImguiContext {
    pub fn name(&self) -> &str {
        &self.name
    }

    fn prepare(&mut self, context: &mut Context, input: &FrameInput<'_>) {
        if !self.configured {
            if let Err(err) = context.set_ini_filename(None::<std::path::PathBuf>) {
                crate::multiplex_warn!("Context '{}': could not disable ini file: {}", self.name, err);
            }
            self.configured = true;
        }

        let atlas_texture = self.font_atlas.texture_id();
        if !atlas_texture.is_null() && self.applied_font_texture != Some(atlas_texture) {
            context
                .font_atlas_mut()
                .set_texture_id(ImTextureId::new(atlas_texture.id()));
            self.applied_font_texture = Some(atlas_texture);
        }

        let io = context.io_mut();
        io.set_display_size(input.display_size);
        io.set_delta_time(input.delta_time);
        io.set_mouse_draw_cursor(input.input.has_mouse_pointer());

        let mut flags = io.config_flags();
        flags.set(
            ConfigFlags::NAV_ENABLE_KEYBOARD,
            input.input.is_keyboard_navigation_enabled()
                || input.input.is_gamepad_navigation_enabled(),
        );
        io.set_config_flags(flags);

        self.submit_mouse(io, input);
        self.submit_keys(io, input);
        for &character in input.input.characters() {
            io.add_input_character(character);
        }
    }

    fn submit_mouse(&mut self, io: &mut Io, input: &FrameInput<'_>) {
        let position = input.mouse_position();
        if position != self.submitted.mouse_position {
            io.add_mouse_pos_event(position.unwrap_or([-f32::MAX, -f32::MAX]));
            self.submitted.mouse_position = position;
        }

        for (slot, (button, im_button)) in MOUSE_BUTTONS.iter().enumerate() {
            let down = input.input.is_mouse_down(*button);
            if down != self.submitted.mouse_down[slot] {
                io.add_mouse_button_event(*im_button, down);
                self.submitted.mouse_down[slot] = down;
            }
        }

        let wheel = input.input.mouse_wheel();
        if wheel != 0.0 {
            io.add_mouse_wheel_event([0.0, wheel]);
        }
    }

    fn submit_keys(&mut self, io: &mut Io, input: &FrameInput<'_>) {
        let pressed = pressed_keys(input);
        for &key in self.submitted.keys.difference(&pressed) {
            io.add_key_event(key, false);
        }
        for &key in pressed.difference(&self.submitted.keys) {
            io.add_key_event(key, true);
        }
        self.submitted.keys = pressed;
    }

    fn capture(&mut self, draw: DrawDataSnapshot) {
        let atlas_texture = self.font_atlas.texture_id();
        self.display_pos = draw.display_pos;
        self.display_size = draw.display_size;
        self.lists = draw
            .draw_lists
            .into_iter()
            .map(|list| CapturedList {
                vertices: list
                    .vtx
                    .iter()
                    .map(|vertex| DrawVert::new(vertex.pos, vertex.uv, vertex.col))
                    .collect(),
                indices: list.idx,
                commands: list
                    .commands
                    .iter()
                    .filter_map(|command| match *command {
                        DrawCmdSnapshot::Elements {
                            count,
                            clip_rect,
                            texture,
                            vtx_offset,
                            idx_offset,
                        } => Some(DrawCmd {
                            elem_count: count,
                            clip_rect,
                            texture_id: resolve_texture(texture, atlas_texture),
                            vtx_offset,
                            idx_offset,
                        }),
                        DrawCmdSnapshot::ResetRenderState => None,
                    })
                    .collect(),
            })
            .collect();
    }
}

impl GuiContext for ImguiContext {
    type Ui = Ui;

    fn make_current(&mut self) {
        if self.frame_context.is_none() {
            self.pool.borrow_mut().activate(self.id);
        }
    }

    fn new_frame(&mut self, input: &FrameInput<'_>) -> Option<&mut Ui> {
        if !self.pool.borrow_mut().activate(self.id) {
            return None;
        }
        let mut context = self.pool.borrow_mut().check_out(self.id)?;
        self.prepare(&mut context, input);
        Some(self.frame_context.insert(context).frame())
    }

    fn render(&mut self) -> DrawData<'_> {
        match self.frame_context.take() {
            Some(mut context) => {
                let snapshot = FrameSnapshot::from_draw_data(context.render(), SNAPSHOT_OPTIONS);
                self.pool.borrow_mut().check_in(self.id, context);
                match snapshot {
                    Ok(snapshot) => self.capture(snapshot.draw),
                    Err(err) => {
                        crate::multiplex_warn!(
                            "Context '{}': draw data capture failed: {}",
                            self.name,
                            err
                        );
                        self.lists.clear();
                    }
                }
            }
            None => self.lists.clear(),
        }

        DrawData {
            display_pos: self.display_pos,
            display_size: self.display_size,
            draw_lists: self
                .lists
                .iter()
                .map(|list| DrawList {
                    vtx_buffer: &list.vertices,
                    idx_buffer: &list.indices,
                    commands: &list.commands,
                })
                .collect(),
        }
    }
}

impl Drop for ImguiContext {
    fn drop(&mut self) {
        // A context dropped mid-frame is still current; dropping it clears that
        self.frame_context.take();
        match self.pool.try_borrow_mut() {
            Ok(mut pool) => pool.remove(self.id),
            Err(_) => {
                crate::multiplex_warn!(
                    "Context '{}' dropped while its pool is busy; library context leaked until the backend drops",
                    self.name
                );
            }
        }
    }
}

impl DebugUi for Ui {
    fn debug_text(&mut self, text: &str) {
        self.text(text);
    }
}

impl FrameUi for Ui {
    fn mouse_cursor(&self) -> MouseCursor {
        from_imgui_cursor(Ui::mouse_cursor(self))
    }

    fn has_active_item(&self) -> bool {
        self.is_any_item_active()
    }
}

/// Keys the library should see held this frame
fn pressed_keys(input: &FrameInput<'_>) -> HashSet<ImKey> {
    let mut keys: HashSet<ImKey> = input.input.keys_down().filter_map(to_imgui_key).collect();

    let modifiers = input.modifiers();
    for (flag, key) in MODIFIER_KEYS {
        if modifiers.contains(flag) {
            keys.insert(key);
        }
    }

    let nav_inputs = input.nav_inputs();
    for (nav, key) in NAV_KEYS {
        if nav_inputs[nav as usize] > NAV_PRESS_THRESHOLD {
            keys.insert(key);
        }
    }
    keys
}

/// Library key for `key`; punctuation, lock and keypad keys have none
fn to_imgui_key(key: Key) -> Option<ImKey> {
    let mapped = match key {
        Key::Tab => ImKey::Tab,
        Key::LeftArrow => ImKey::LeftArrow,
        Key::RightArrow => ImKey::RightArrow,
        Key::UpArrow => ImKey::UpArrow,
        Key::DownArrow => ImKey::DownArrow,
        Key::PageUp => ImKey::PageUp,
        Key::PageDown => ImKey::PageDown,
        Key::Home => ImKey::Home,
        Key::End => ImKey::End,
        Key::Insert => ImKey::Insert,
        Key::Delete => ImKey::Delete,
        Key::Backspace => ImKey::Backspace,
        Key::Space => ImKey::Space,
        Key::Enter | Key::KeypadEnter => ImKey::Enter,
        Key::Escape => ImKey::Escape,
        Key::LeftCtrl => ImKey::LeftCtrl,
        Key::LeftShift => ImKey::LeftShift,
        Key::LeftAlt => ImKey::LeftAlt,
        Key::LeftSuper => ImKey::LeftSuper,
        Key::RightCtrl => ImKey::RightCtrl,
        Key::RightShift => ImKey::RightShift,
        Key::RightAlt => ImKey::RightAlt,
        Key::RightSuper => ImKey::RightSuper,
        Key::Menu => ImKey::Menu,
        Key::Key0 | Key::Keypad0 => ImKey::Key0,
        Key::Key1 | Key::Keypad1 => ImKey::Key1,
        Key::Key2 | Key::Keypad2 => ImKey::Key2,
        Key::Key3 | Key::Keypad3 => ImKey::Key3,
        Key::Key4 | Key::Keypad4 => ImKey::Key4,
        Key::Key5 | Key::Keypad5 => ImKey::Key5,
        Key::Key6 | Key::Keypad6 => ImKey::Key6,
        Key::Key7 | Key::Keypad7 => ImKey::Key7,
        Key::Key8 | Key::Keypad8 => ImKey::Key8,
        Key::Key9 | Key::Keypad9 => ImKey::Key9,
        Key::A => ImKey::A,
        Key::B => ImKey::B,
        Key::C => ImKey::C,
        Key::D => ImKey::D,
        Key::E => ImKey::E,
        Key::F => ImKey::F,
        Key::G => ImKey::G,
        Key::H => ImKey::H,
        Key::I => ImKey::I,
        Key::J => ImKey::J,
        Key::K => ImKey::K,
        Key::L => ImKey::L,
        Key::M => ImKey::M,
        Key::N => ImKey::N,
        Key::O => ImKey::O,
        Key::P => ImKey::P,
        Key::Q => ImKey::Q,
        Key::R => ImKey::R,
        Key::S => ImKey::S,
        Key::T => ImKey::T,
        Key::U => ImKey::U,
        Key::V => ImKey::V,
        Key::W => ImKey::W,
        Key::X => ImKey::X,
        Key::Y => ImKey::Y,
        Key::Z => ImKey::Z,
        Key::F1 => ImKey::F1,
        Key::F2 => ImKey::F2,
        Key::F3 => ImKey::F3,
        Key::F4 => ImKey::F4,
        Key::F5 => ImKey::F5,
        Key::F6 => ImKey::F6,
        Key::F7 => ImKey::F7,
        Key::F8 => ImKey::F8,
        Key::F9 => ImKey::F9,
        Key::F10 => ImKey::F10,
        Key::F11 => ImKey::F11,
        Key::F12 => ImKey::F12,
        _ => return None,
    };
    Some(mapped)
}

fn from_imgui_cursor(cursor: Option<ImCursor>) -> MouseCursor {
    match cursor {
        Some(ImCursor::Arrow) => MouseCursor::Arrow,
        Some(ImCursor::TextInput) => MouseCursor::TextInput,
        Some(ImCursor::ResizeAll) => MouseCursor::ResizeAll,
        Some(ImCursor::ResizeNS) => MouseCursor::ResizeNS,
        Some(ImCursor::ResizeEW) => MouseCursor::ResizeEW,
        Some(ImCursor::ResizeNESW) => MouseCursor::ResizeNESW,
        Some(ImCursor::ResizeNWSE) => MouseCursor::ResizeNWSE,
        Some(ImCursor::Hand) => MouseCursor::Hand,
        Some(ImCursor::NotAllowed) => MouseCursor::NotAllowed,
        Some(ImCursor::None) | None => MouseCursor::None,
    }
}

/// Draw commands on the font atlas carry a managed or null binding until the
/// host texture id is pushed; both resolve to the atlas texture.
fn resolve_texture(binding: TextureBinding, atlas_texture: TextureId) -> TextureId {
    match binding {
        TextureBinding::Legacy(id) if id.id() != 0 => TextureId::new(id.id()),
        _ => atlas_texture,
    }
}

fn expand_alpha8(alpha: &[u8]) -> Vec<u8> {
    alpha.iter().flat_map(|&a| [255, 255, 255, a]).collect()
}
