//! Texture ids and the texture manager
//!
//! Draw batches reference textures through an opaque [`TextureId`]. The
//! [`TextureManager`] maps those ids to whatever handle the host renderer
//! uses, created through a [`TextureFactory`] the host supplies.

use crate::error::{MultiplexError, MultiplexResult};

/// Opaque texture identifier carried by draw batches
///
/// Id `0` is reserved for the plain white texture, so a null id always
/// resolves to something drawable.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct TextureId(usize);

impl TextureId {
    /// Creates a new texture id with the given identifier
    #[inline]
    pub const fn new(id: usize) -> Self {
        Self(id)
    }

    /// Returns the raw id
    #[inline]
    pub const fn id(self) -> usize {
        self.0
    }

    /// Creates a null texture id
    #[inline]
    pub const fn null() -> Self {
        Self(0)
    }

    /// Checks if this texture id is null
    #[inline]
    pub const fn is_null(self) -> bool {
        self.0 == 0
    }
}

impl From<usize> for TextureId {
    #[inline]
    fn from(id: usize) -> Self {
        TextureId(id)
    }
}

impl Default for TextureId {
    #[inline]
    fn default() -> Self {
        Self::null()
    }
}

/// Name of the plain white texture created with every manager
pub const PLAIN_TEXTURE_NAME: &str = "ImGuiModule_Plain";

/// Host-side texture creation
pub trait TextureFactory {
    /// Handle the host renderer draws with
    type Handle: Clone;

    /// Create a texture from tightly packed RGBA8 pixels
    fn create_texture(
        &mut self,
        name: &str,
        width: u32,
        height: u32,
        rgba: &[u8],
    ) -> MultiplexResult<Self::Handle>;
}

#[derive(Debug)]
struct TextureEntry<H> {
    name: String,
    handle: H,
}

/// Maps texture ids to renderer handles
///
/// Index 0 always holds the plain white texture.
#[derive(Debug)]
pub struct TextureManager<F: TextureFactory> {
    factory: F,
    entries: Vec<TextureEntry<F::Handle>>,
}

impl<F: TextureFactory> TextureManager<F> {
    /// Create a manager and its plain white texture
    pub fn new(factory: F) -> MultiplexResult<Self> {
        let mut manager = Self {
            factory,
            entries: Vec::new(),
        };
        let plain = manager.create_plain_texture(PLAIN_TEXTURE_NAME, 2, 2, [255; 4])?;
        debug_assert!(plain.is_null());
        Ok(manager)
    }

    /// Create a texture, or replace the handle of an existing one with the same name
    pub fn create_texture(
        &mut self,
        name: &str,
        width: u32,
        height: u32,
        rgba: &[u8],
    ) -> MultiplexResult<TextureId> {
        let expected = width as usize * height as usize * 4;
        if width == 0 || height == 0 || rgba.len() != expected {
            return Err(MultiplexError::texture(format!(
                "'{}' expects {}x{} RGBA8 ({} bytes), got {} bytes",
                name,
                width,
                height,
                expected,
                rgba.len()
            )));
        }

        let handle = self.factory.create_texture(name, width, height, rgba)?;
        match self.find_texture(name) {
            Some(id) => {
                self.entries[id.id()].handle = handle;
                Ok(id)
            }
            None => {
                self.entries.push(TextureEntry {
                    name: name.to_owned(),
                    handle,
                });
                Ok(TextureId::new(self.entries.len() - 1))
            }
        }
    }

    /// Create a texture filled with a single color
    pub fn create_plain_texture(
        &mut self,
        name: &str,
        width: u32,
        height: u32,
        color: [u8; 4],
    ) -> MultiplexResult<TextureId> {
        let pixels: Vec<u8> = color
            .iter()
            .copied()
            .cycle()
            .take(width as usize * height as usize * 4)
            .collect();
        self.create_texture(name, width, height, &pixels)
    }

    pub fn find_texture(&self, name: &str) -> Option<TextureId> {
        self.entries
            .iter()
            .position(|entry| entry.name == name)
            .map(TextureId::new)
    }

    pub fn texture_name(&self, id: TextureId) -> Option<&str> {
        self.entries.get(id.id()).map(|entry| entry.name.as_str())
    }

    /// Resolve a draw batch texture to a renderer handle
    ///
    /// Null and unknown ids fall back to the plain white texture.
    pub fn resolve(&self, id: TextureId) -> &F::Handle {
        match self.entries.get(id.id()) {
            Some(entry) => &entry.handle,
            None => {
                crate::multiplex_trace!("Unknown texture {:?}, using plain texture", id);
                &self.entries[0].handle
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn factory(&self) -> &F {
        &self.factory
    }
}
