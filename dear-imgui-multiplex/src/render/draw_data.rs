//! Borrowed views of a GUI library's per-frame draw output
//!
//! These types point into buffers the library owns and overwrites on the next
//! frame. Copy them into a [`DrawDataBuffer`](super::DrawDataBuffer) before the
//! borrow ends.

use crate::texture::TextureId;

/// A single vertex
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Default)]
pub struct DrawVert {
    /// Position (2D)
    pub pos: [f32; 2],
    /// UV coordinates
    pub uv: [f32; 2],
    /// Color (packed RGBA, red in the lowest byte)
    pub col: u32,
}

impl DrawVert {
    pub const fn new(pos: [f32; 2], uv: [f32; 2], col: u32) -> Self {
        Self { pos, uv, col }
    }
}

/// Index type used by the GUI library
pub type DrawIdx = u16;

/// One indexed triangle list command within a draw list
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct DrawCmd {
    /// Number of indices
    pub elem_count: usize,
    /// Clip rectangle (x0, y0, x1, y1) in display space
    pub clip_rect: [f32; 4],
    pub texture_id: TextureId,
    /// Start offset in the vertex buffer, added to every index
    pub vtx_offset: usize,
    /// Start offset in the index buffer
    pub idx_offset: usize,
}

/// A draw list: shared vertex and index buffers plus the commands using them
#[derive(Copy, Clone, Debug)]
pub struct DrawList<'a> {
    pub vtx_buffer: &'a [DrawVert],
    pub idx_buffer: &'a [DrawIdx],
    pub commands: &'a [DrawCmd],
}

/// Everything one frame produced
#[derive(Clone, Debug)]
pub struct DrawData<'a> {
    /// Upper-left position of the rendered area
    pub display_pos: [f32; 2],
    /// Size of the rendered area
    pub display_size: [f32; 2],
    pub draw_lists: Vec<DrawList<'a>>,
}

impl<'a> DrawData<'a> {
    /// Draw data with no lists, as produced by an inert context
    pub fn empty() -> Self {
        Self {
            display_pos: [0.0, 0.0],
            display_size: [0.0, 0.0],
            draw_lists: Vec::new(),
        }
    }

    pub fn draw_lists(&self) -> impl Iterator<Item = &DrawList<'a>> {
        self.draw_lists.iter()
    }

    pub fn total_vtx_count(&self) -> usize {
        self.draw_lists.iter().map(|list| list.vtx_buffer.len()).sum()
    }

    pub fn total_idx_count(&self) -> usize {
        self.draw_lists.iter().map(|list| list.idx_buffer.len()).sum()
    }
}
