//! The font atlas shared by every context

use std::cell::Cell;
use std::rc::Rc;

use crate::error::{MultiplexError, MultiplexResult};
use crate::texture::TextureId;

/// Shared handle to the font atlas
pub type SharedFontAtlas = Rc<FontAtlas>;

/// Rasterized glyph atlas built once and shared by all contexts
///
/// Pixels and metrics never change after construction. Only the texture id
/// is written, once the host has uploaded the pixels.
#[derive(Debug)]
pub struct FontAtlas {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
    font_size: f32,
    white_pixel_uv: [f32; 2],
    texture_id: Cell<TextureId>,
}

impl FontAtlas {
    /// Wrap an RGBA32 pixel buffer produced by the GUI library
    pub fn new(
        width: u32,
        height: u32,
        pixels: Vec<u8>,
        font_size: f32,
        white_pixel_uv: [f32; 2],
    ) -> MultiplexResult<Self> {
        if width == 0 || height == 0 {
            return Err(MultiplexError::font_atlas(format!(
                "atlas has empty dimensions {}x{}",
                width, height
            )));
        }
        let expected = width as usize * height as usize * 4;
        if pixels.len() != expected {
            return Err(MultiplexError::font_atlas(format!(
                "expected {} bytes of RGBA32 data, got {}",
                expected,
                pixels.len()
            )));
        }
        Ok(Self {
            width,
            height,
            pixels,
            font_size,
            white_pixel_uv,
            texture_id: Cell::new(TextureId::null()),
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// RGBA32 pixel data, row-major
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn font_size(&self) -> f32 {
        self.font_size
    }

    /// UV of a fully white texel, used for untextured shapes
    pub fn white_pixel_uv(&self) -> [f32; 2] {
        self.white_pixel_uv
    }

    /// Texture the atlas was uploaded to; null until uploaded
    pub fn texture_id(&self) -> TextureId {
        self.texture_id.get()
    }

    pub fn set_texture_id(&self, id: TextureId) {
        self.texture_id.set(id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_atlas_validates_size() {
        assert!(FontAtlas::new(2, 2, vec![0; 16], 13.0, [0.0, 0.0]).is_ok());
        assert!(matches!(
            FontAtlas::new(2, 2, vec![0; 15], 13.0, [0.0, 0.0]),
            Err(MultiplexError::FontAtlas { .. })
        ));
        assert!(FontAtlas::new(0, 2, Vec::new(), 13.0, [0.0, 0.0]).is_err());
    }

    #[test]
    fn test_texture_id_written_back() {
        let atlas = FontAtlas::new(1, 1, vec![255; 4], 13.0, [0.5, 0.5]).unwrap();
        assert!(atlas.texture_id().is_null());
        atlas.set_texture_id(TextureId::new(1));
        assert_eq!(atlas.texture_id(), TextureId::new(1));
    }
}
