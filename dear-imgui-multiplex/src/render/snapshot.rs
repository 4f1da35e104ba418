//! Owned copy of one frame's draw output
//!
//! A [`DrawDataBuffer`] holds no pointers into library memory, so the render
//! pass can keep it (or send it to another thread) while the next frame is
//! being built.

use crate::render::draw_data::{DrawData, DrawList, DrawVert};
use crate::texture::TextureId;

/// One draw command with its own vertices and indices
#[derive(Clone, Debug, PartialEq)]
pub struct DrawBatch {
    pub vertices: Vec<DrawVert>,
    /// Indices into `vertices`
    pub indices: Vec<u32>,
    /// Clip rectangle (x0, y0, x1, y1) in context space
    ///
    /// Context space has its origin at the draw data's display position.
    pub clip_rect: [f32; 4],
    pub texture_id: TextureId,
}

/// Draw batches captured from one completed frame, in library order
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DrawDataBuffer {
    display_size: [f32; 2],
    batches: Vec<DrawBatch>,
}

impl DrawDataBuffer {
    /// Copy draw output out of the library's transient buffers
    ///
    /// Every command becomes one batch carrying only the vertices its indices
    /// touch, with indices rebased onto that range. Positions and clip
    /// rectangles are shifted by `-display_pos`. Commands whose ranges fall
    /// outside their list's buffers are skipped.
    pub fn from_draw_data(draw_data: &DrawData<'_>) -> Self {
        let mut batches = Vec::new();
        for list in draw_data.draw_lists() {
            capture_draw_list(list, draw_data.display_pos, &mut batches);
        }
        Self {
            display_size: draw_data.display_size,
            batches,
        }
    }

    pub fn batches(&self) -> &[DrawBatch] {
        &self.batches
    }

    pub fn display_size(&self) -> [f32; 2] {
        self.display_size
    }

    pub fn is_empty(&self) -> bool {
        self.batches.is_empty()
    }

    pub fn vertex_count(&self) -> usize {
        self.batches.iter().map(|batch| batch.vertices.len()).sum()
    }

    pub fn index_count(&self) -> usize {
        self.batches.iter().map(|batch| batch.indices.len()).sum()
    }
}

fn capture_draw_list(list: &DrawList<'_>, display_pos: [f32; 2], batches: &mut Vec<DrawBatch>) {
    let [dx, dy] = display_pos;
    for cmd in list.commands {
        if cmd.elem_count == 0 {
            continue;
        }

        let Some(indices) = list
            .idx_buffer
            .get(cmd.idx_offset..cmd.idx_offset + cmd.elem_count)
        else {
            crate::multiplex_warn!(
                "Draw command index range {}+{} exceeds buffer of {}",
                cmd.idx_offset,
                cmd.elem_count,
                list.idx_buffer.len()
            );
            continue;
        };

        let (min, max) = indices
            .iter()
            .fold((usize::MAX, 0), |(min, max), &idx| {
                (min.min(idx as usize), max.max(idx as usize))
            });

        let Some(vertices) = list
            .vtx_buffer
            .get(cmd.vtx_offset + min..=cmd.vtx_offset + max)
        else {
            crate::multiplex_warn!(
                "Draw command vertex range {}..={} exceeds buffer of {}",
                cmd.vtx_offset + min,
                cmd.vtx_offset + max,
                list.vtx_buffer.len()
            );
            continue;
        };

        batches.push(DrawBatch {
            vertices: vertices
                .iter()
                .map(|vertex| DrawVert {
                    pos: [vertex.pos[0] - dx, vertex.pos[1] - dy],
                    ..*vertex
                })
                .collect(),
            indices: indices
                .iter()
                .map(|&idx| (idx as usize - min) as u32)
                .collect(),
            clip_rect: [
                cmd.clip_rect[0] - dx,
                cmd.clip_rect[1] - dy,
                cmd.clip_rect[2] - dx,
                cmd.clip_rect[3] - dy,
            ],
            texture_id: cmd.texture_id,
        });
    }
}
