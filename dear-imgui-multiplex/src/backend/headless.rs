//! In-process GUI library stand-in
//!
//! [`HeadlessBackend`] implements the backend contract without a real widget
//! library: callbacks draw rectangles, images and block-glyph text into a
//! single draw list, and every frame's input is recorded for inspection.
//! Tests and headless tools use it.

use std::collections::HashSet;

use crate::backend::{DebugUi, FrameInput, FrameUi, GuiBackend, GuiContext};
use crate::error::{MultiplexError, MultiplexResult};
use crate::fonts::{FontAtlas, SharedFontAtlas};
use crate::input::{Key, KeyModFlags, MouseButton, MouseCursor, NavInput};
use crate::render::{DrawCmd, DrawData, DrawIdx, DrawList, DrawVert};
use crate::texture::{TextureFactory, TextureId};

const WHITE: u32 = 0xFFFF_FFFF;

/// Backend producing [`HeadlessContext`]s
#[derive(Debug)]
pub struct HeadlessBackend {
    atlas_size: u32,
    font_size: f32,
    failing: HashSet<String>,
    created: Vec<String>,
}

impl Default for HeadlessBackend {
    fn default() -> Self {
        Self {
            atlas_size: 64,
            font_size: 13.0,
            failing: HashSet::new(),
            created: Vec::new(),
        }
    }
}

impl HeadlessBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make context creation fail for `name`
    pub fn with_failing_context(mut self, name: impl Into<String>) -> Self {
        self.failing.insert(name.into());
        self
    }

    pub fn with_font_size(mut self, font_size: f32) -> Self {
        self.font_size = font_size;
        self
    }

    /// Names of every context created so far, in creation order
    pub fn created_contexts(&self) -> &[String] {
        &self.created
    }
}

impl GuiBackend for HeadlessBackend {
    type Context = HeadlessContext;

    fn build_font_atlas(&mut self) -> MultiplexResult<FontAtlas> {
        let size = self.atlas_size;
        let mut pixels = vec![0u8; size as usize * size as usize * 4];
        // Opaque white block in the top-left corner, glyph coverage elsewhere
        for (i, texel) in pixels.chunks_exact_mut(4).enumerate() {
            let (x, y) = (i as u32 % size, i as u32 / size);
            let alpha = if (x < 2 && y < 2) || (x + y) % 3 == 0 { 255 } else { 0 };
            texel.copy_from_slice(&[255, 255, 255, alpha]);
        }
        let white_uv = [0.5 / size as f32, 0.5 / size as f32];
        FontAtlas::new(size, size, pixels, self.font_size, white_uv)
    }

    fn create_context(
        &mut self,
        name: &str,
        font_atlas: &SharedFontAtlas,
    ) -> MultiplexResult<HeadlessContext> {
        if self.failing.contains(name) {
            return Err(MultiplexError::context_creation(
                name,
                "headless backend configured to fail",
            ));
        }
        self.created.push(name.to_owned());
        Ok(HeadlessContext::new(name, font_atlas.clone()))
    }
}

/// Copy of the input a context saw at the start of a frame
#[derive(Clone, Debug, PartialEq)]
pub struct RecordedFrameInput {
    pub delta_time: f32,
    pub display_size: [f32; 2],
    pub mouse_position: Option<[f32; 2]>,
    pub mouse_down: [bool; MouseButton::COUNT],
    pub mouse_wheel: f32,
    pub characters: Vec<char>,
    /// Keys held down, sorted
    pub keys_down: Vec<Key>,
    pub modifiers: KeyModFlags,
    pub nav_inputs: [f32; NavInput::COUNT],
    pub keyboard_navigation: bool,
    pub has_mouse_pointer: bool,
}

impl RecordedFrameInput {
    fn from_frame_input(input: &FrameInput<'_>) -> Self {
        let mut keys_down: Vec<Key> = input.input.keys_down().collect();
        keys_down.sort();
        Self {
            delta_time: input.delta_time,
            display_size: input.display_size,
            mouse_position: input.mouse_position(),
            mouse_down: input.mouse_down(),
            mouse_wheel: input.input.mouse_wheel(),
            characters: input.input.characters().to_vec(),
            keys_down,
            modifiers: input.modifiers(),
            nav_inputs: input.nav_inputs(),
            keyboard_navigation: input.input.is_keyboard_navigation_enabled(),
            has_mouse_pointer: input.input.has_mouse_pointer(),
        }
    }
}

/// One headless GUI context
#[derive(Debug)]
pub struct HeadlessContext {
    name: String,
    ui: HeadlessUi,
    frame_count: u64,
    make_current_count: u64,
    last_input: Option<RecordedFrameInput>,
}

impl HeadlessContext {
    fn new(name: &str, font_atlas: SharedFontAtlas) -> Self {
        Self {
            name: name.to_owned(),
            ui: HeadlessUi::new(font_atlas),
            frame_count: 0,
            make_current_count: 0,
            last_input: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of frames started
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn make_current_count(&self) -> u64 {
        self.make_current_count
    }

    /// Input seen by the most recent frame
    pub fn last_input(&self) -> Option<&RecordedFrameInput> {
        self.last_input.as_ref()
    }

    /// Debug text lines emitted during the most recent frame
    pub fn debug_lines(&self) -> &[String] {
        &self.ui.text_lines
    }
}

impl GuiContext for HeadlessContext {
    type Ui = HeadlessUi;

    fn make_current(&mut self) {
        self.make_current_count += 1;
    }

    fn new_frame(&mut self, input: &FrameInput<'_>) -> Option<&mut HeadlessUi> {
        self.frame_count += 1;
        self.last_input = Some(RecordedFrameInput::from_frame_input(input));
        self.ui.begin(input, self.frame_count);
        Some(&mut self.ui)
    }

    fn render(&mut self) -> DrawData<'_> {
        self.ui.end();
        DrawData {
            display_pos: [0.0, 0.0],
            display_size: self.ui.display_size,
            draw_lists: vec![DrawList {
                vtx_buffer: &self.ui.vertices,
                idx_buffer: &self.ui.indices,
                commands: &self.ui.commands,
            }],
        }
    }
}

/// Widget API of a headless context
#[derive(Debug)]
pub struct HeadlessUi {
    font_atlas: SharedFontAtlas,
    frame: u64,
    delta_time: f32,
    display_size: [f32; 2],
    mouse_position: Option<[f32; 2]>,
    mouse_down: [bool; MouseButton::COUNT],
    draw_cursor: bool,
    clip_stack: Vec<[f32; 4]>,
    vertices: Vec<DrawVert>,
    indices: Vec<DrawIdx>,
    commands: Vec<DrawCmd>,
    mouse_cursor: MouseCursor,
    active_item: bool,
    text_lines: Vec<String>,
}

impl HeadlessUi {
    fn new(font_atlas: SharedFontAtlas) -> Self {
        Self {
            font_atlas,
            frame: 0,
            delta_time: 0.0,
            display_size: [0.0, 0.0],
            mouse_position: None,
            mouse_down: [false; MouseButton::COUNT],
            draw_cursor: false,
            clip_stack: Vec::new(),
            vertices: Vec::new(),
            indices: Vec::new(),
            commands: Vec::new(),
            mouse_cursor: MouseCursor::Arrow,
            active_item: false,
            text_lines: Vec::new(),
        }
    }

    fn begin(&mut self, input: &FrameInput<'_>, frame: u64) {
        self.frame = frame;
        self.delta_time = input.delta_time;
        self.display_size = input.display_size;
        self.mouse_position = input.mouse_position();
        self.mouse_down = input.mouse_down();
        self.draw_cursor = input.input.has_mouse_pointer();
        self.clip_stack.clear();
        self.vertices.clear();
        self.indices.clear();
        self.commands.clear();
        self.mouse_cursor = MouseCursor::Arrow;
        self.active_item = false;
        self.text_lines.clear();
    }

    fn end(&mut self) {
        if self.draw_cursor
            && self.mouse_cursor != MouseCursor::None
            && let Some([x, y]) = self.mouse_position
        {
            self.add_rect_filled([x, y], [x + 8.0, y + 12.0], WHITE);
        }
    }

    /// Frame number of this context, starting at 1
    pub fn frame_count(&self) -> u64 {
        self.frame
    }

    pub fn delta_time(&self) -> f32 {
        self.delta_time
    }

    pub fn display_size(&self) -> [f32; 2] {
        self.display_size
    }

    pub fn mouse_position(&self) -> Option<[f32; 2]> {
        self.mouse_position
    }

    pub fn is_mouse_down(&self, button: MouseButton) -> bool {
        self.mouse_down[button.index()]
    }

    /// Request a cursor shape for this frame
    pub fn set_mouse_cursor(&mut self, cursor: MouseCursor) {
        self.mouse_cursor = cursor;
    }

    /// Mark an item as active (focused or pressed) for this frame
    pub fn set_active_item(&mut self, active: bool) {
        self.active_item = active;
    }

    pub fn push_clip_rect(&mut self, clip_rect: [f32; 4]) {
        self.clip_stack.push(clip_rect);
    }

    pub fn pop_clip_rect(&mut self) {
        self.clip_stack.pop();
    }

    fn clip_rect(&self) -> [f32; 4] {
        self.clip_stack
            .last()
            .copied()
            .unwrap_or([0.0, 0.0, self.display_size[0], self.display_size[1]])
    }

    /// Untextured filled rectangle, drawn with the atlas white texel
    pub fn add_rect_filled(&mut self, min: [f32; 2], max: [f32; 2], col: u32) {
        let uv = self.font_atlas.white_pixel_uv();
        let texture = self.font_atlas.texture_id();
        self.push_quad(min, max, uv, uv, col, texture);
    }

    /// Rectangle sampling a whole texture
    pub fn add_image(&mut self, texture_id: TextureId, min: [f32; 2], max: [f32; 2]) {
        self.push_quad(min, max, [0.0, 0.0], [1.0, 1.0], WHITE, texture_id);
    }

    /// Block-glyph text: one quad per visible character
    pub fn add_text(&mut self, pos: [f32; 2], col: u32, text: &str) {
        let size = self.font_atlas.font_size();
        let advance = size * 0.5;
        let texture = self.font_atlas.texture_id();
        let mut x = pos[0];
        for ch in text.chars() {
            if !ch.is_whitespace() {
                self.push_quad(
                    [x, pos[1]],
                    [x + advance, pos[1] + size],
                    [0.0, 0.0],
                    [1.0, 1.0],
                    col,
                    texture,
                );
            }
            x += advance;
        }
    }

    fn push_quad(
        &mut self,
        min: [f32; 2],
        max: [f32; 2],
        uv_min: [f32; 2],
        uv_max: [f32; 2],
        col: u32,
        texture_id: TextureId,
    ) {
        let clip_rect = self.clip_rect();
        let start_new = match self.commands.last() {
            Some(cmd) => {
                cmd.texture_id != texture_id
                    || cmd.clip_rect != clip_rect
                    || self.vertices.len() - cmd.vtx_offset + 4 > DrawIdx::MAX as usize + 1
            }
            None => true,
        };
        if start_new {
            self.commands.push(DrawCmd {
                elem_count: 0,
                clip_rect,
                texture_id,
                vtx_offset: self.vertices.len(),
                idx_offset: self.indices.len(),
            });
        }
        let cmd_index = self.commands.len() - 1;
        let base = (self.vertices.len() - self.commands[cmd_index].vtx_offset) as DrawIdx;

        self.vertices.extend_from_slice(&[
            DrawVert::new(min, uv_min, col),
            DrawVert::new([max[0], min[1]], [uv_max[0], uv_min[1]], col),
            DrawVert::new(max, uv_max, col),
            DrawVert::new([min[0], max[1]], [uv_min[0], uv_max[1]], col),
        ]);
        self.indices
            .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
        self.commands[cmd_index].elem_count += 6;
    }
}

impl DebugUi for HeadlessUi {
    fn debug_text(&mut self, text: &str) {
        let line = self.text_lines.len() as f32;
        let y = 4.0 + line * self.font_atlas.font_size();
        self.add_text([4.0, y], WHITE, text);
        self.text_lines.push(text.to_owned());
    }
}

impl FrameUi for HeadlessUi {
    fn mouse_cursor(&self) -> MouseCursor {
        self.mouse_cursor
    }

    fn has_active_item(&self) -> bool {
        self.active_item
    }
}

/// Texture handle produced by [`HeadlessTextureFactory`]
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct HeadlessTexture {
    pub handle: u64,
    pub name: String,
    pub width: u32,
    pub height: u32,
}

/// Texture factory that hands out sequential handles
#[derive(Debug, Default)]
pub struct HeadlessTextureFactory {
    next_handle: u64,
}

impl TextureFactory for HeadlessTextureFactory {
    type Handle = HeadlessTexture;

    fn create_texture(
        &mut self,
        name: &str,
        width: u32,
        height: u32,
        _rgba: &[u8],
    ) -> MultiplexResult<HeadlessTexture> {
        self.next_handle += 1;
        Ok(HeadlessTexture {
            handle: self.next_handle,
            name: name.to_owned(),
            width,
            height,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input_state::InputState;
    use std::rc::Rc;

    fn context() -> HeadlessContext {
        let mut backend = HeadlessBackend::new();
        let atlas = Rc::new(backend.build_font_atlas().unwrap());
        backend.create_context("test", &atlas).unwrap()
    }

    fn frame_input(state: &InputState) -> FrameInput<'_> {
        FrameInput {
            delta_time: 1.0 / 60.0,
            display_size: [800.0, 600.0],
            input: state,
        }
    }

    #[test]
    fn test_rects_batch_into_one_command() {
        let mut ctx = context();
        let state = InputState::new();
        let ui = ctx.new_frame(&frame_input(&state)).unwrap();
        ui.add_rect_filled([0.0, 0.0], [10.0, 10.0], WHITE);
        ui.add_rect_filled([20.0, 0.0], [30.0, 10.0], WHITE);

        let draw_data = ctx.render();
        let list = &draw_data.draw_lists[0];
        assert_eq!(list.commands.len(), 1);
        assert_eq!(list.commands[0].elem_count, 12);
        assert_eq!(list.vtx_buffer.len(), 8);
        assert_eq!(list.commands[0].clip_rect, [0.0, 0.0, 800.0, 600.0]);
    }

    #[test]
    fn test_texture_change_starts_command() {
        let mut ctx = context();
        let state = InputState::new();
        let ui = ctx.new_frame(&frame_input(&state)).unwrap();
        ui.add_rect_filled([0.0, 0.0], [10.0, 10.0], WHITE);
        ui.add_image(TextureId::new(7), [0.0, 0.0], [4.0, 4.0]);

        let draw_data = ctx.render();
        let commands = draw_data.draw_lists[0].commands;
        assert_eq!(commands.len(), 2);
        assert_eq!(commands[1].texture_id, TextureId::new(7));
        assert_eq!(commands[1].vtx_offset, 4);
    }

    #[test]
    fn test_cursor_resets_to_arrow() {
        let mut ctx = context();
        let state = InputState::new();
        let ui = ctx.new_frame(&frame_input(&state)).unwrap();
        ui.set_mouse_cursor(MouseCursor::Hand);
        assert_eq!(ui.mouse_cursor(), MouseCursor::Hand);
        let _ = ctx.render();

        let ui = ctx.new_frame(&frame_input(&state)).unwrap();
        assert_eq!(ui.mouse_cursor(), MouseCursor::Arrow);
    }

    #[test]
    fn test_failing_context() {
        let mut backend = HeadlessBackend::new().with_failing_context("Broken");
        let atlas = Rc::new(backend.build_font_atlas().unwrap());
        assert!(backend.create_context("Broken", &atlas).is_err());
        assert!(backend.create_context("Fine", &atlas).is_ok());
        assert_eq!(backend.created_contexts(), ["Fine".to_owned()]);
    }
}
