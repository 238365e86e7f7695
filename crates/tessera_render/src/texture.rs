use std::{collections::HashMap, path::Path};

use glam::{Vec2, vec2};

use crate::{
    device::{GraphicsDevice, TextureId},
    error::{AssetLoadError, RenderError},
};

/// Byte length of tightly packed RGBA8 pixels, `None` on overflow
pub(crate) fn rgba_len(width: u32, height: u32) -> Option<usize> {
    (width as usize)
        .checked_mul(height as usize)?
        .checked_mul(4)
}

/// A copyable reference to an uploaded texture
///
/// Does not own the GPU texture; the [`Texture`] it came from must outlive it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureHandle {
    pub id: TextureId,
    pub width: u32,
    pub height: u32,
}

impl TextureHandle {
    pub fn size(&self) -> Vec2 {
        vec2(self.width as f32, self.height as f32)
    }
}

/// An uploaded RGBA texture, released exactly once through [`Texture::release`]
#[derive(Debug)]
pub struct Texture {
    handle: TextureHandle,
}

impl Texture {
    /// Decodes a PNG or JPEG file & uploads it
    pub fn from_file(
        gpu: &mut impl GraphicsDevice,
        path: impl AsRef<Path>,
    ) -> Result<Self, AssetLoadError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|source| AssetLoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let image = image::load_from_memory(&bytes).map_err(|source| AssetLoadError::Image {
            path: path.to_path_buf(),
            source,
        })?;
        let rgba = image.to_rgba8();
        log::debug!(
            "loaded texture {} ({}x{})",
            path.display(),
            rgba.width(),
            rgba.height()
        );
        Ok(Self::from_rgba(gpu, rgba.width(), rgba.height(), &rgba))
    }

    /// Decodes an in-memory PNG or JPEG image & uploads it
    pub fn from_bytes(gpu: &mut impl GraphicsDevice, bytes: &[u8]) -> Result<Self, AssetLoadError> {
        let rgba = image::load_from_memory(bytes)
            .map_err(|source| AssetLoadError::Image {
                path: "<memory>".into(),
                source,
            })?
            .to_rgba8();
        Ok(Self::from_rgba(gpu, rgba.width(), rgba.height(), &rgba))
    }

    /// Uploads tightly packed RGBA8 pixels
    pub fn from_rgba(gpu: &mut impl GraphicsDevice, width: u32, height: u32, rgba: &[u8]) -> Self {
        let id = gpu.create_texture(width, height, rgba);
        Self {
            handle: TextureHandle { id, width, height },
        }
    }

    /// A fully transparent texture of the given size
    pub fn empty(
        gpu: &mut impl GraphicsDevice,
        width: u32,
        height: u32,
    ) -> Result<Self, RenderError> {
        let len = rgba_len(width, height).ok_or(RenderError::TextureTooLarge { width, height })?;
        let pixels = vec![0u8; len];
        Ok(Self::from_rgba(gpu, width, height, &pixels))
    }

    pub fn handle(&self) -> TextureHandle {
        self.handle
    }

    pub fn id(&self) -> TextureId {
        self.handle.id
    }

    pub fn width(&self) -> u32 {
        self.handle.width
    }

    pub fn height(&self) -> u32 {
        self.handle.height
    }

    pub fn release(self, gpu: &mut impl GraphicsDevice) {
        gpu.release_texture(self.handle.id);
    }
}

/// Textures loaded by file & looked up by a caller-chosen key
#[derive(Debug, Default)]
pub struct TextureStorage {
    textures: HashMap<String, Texture>,
}

impl TextureStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads `path` under `key`, keeping an earlier texture with that key
    pub fn load(
        &mut self,
        gpu: &mut impl GraphicsDevice,
        path: impl AsRef<Path>,
        key: &str,
    ) -> Result<TextureHandle, AssetLoadError> {
        if let Some(texture) = self.textures.get(key) {
            log::debug!("texture `{key}` already loaded");
            return Ok(texture.handle());
        }
        let texture = Texture::from_file(gpu, path)?;
        let handle = texture.handle();
        self.textures.insert(key.to_string(), texture);
        Ok(handle)
    }

    /// Stores an already uploaded texture, releasing any texture it replaces
    pub fn insert(
        &mut self,
        gpu: &mut impl GraphicsDevice,
        key: &str,
        texture: Texture,
    ) -> TextureHandle {
        let handle = texture.handle();
        if let Some(old) = self.textures.insert(key.to_string(), texture) {
            old.release(gpu);
        }
        handle
    }

    pub fn get(&self, key: &str) -> Option<TextureHandle> {
        self.textures.get(key).map(Texture::handle)
    }

    pub fn len(&self) -> usize {
        self.textures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }

    pub fn release(&mut self, gpu: &mut impl GraphicsDevice, key: &str) {
        if let Some(texture) = self.textures.remove(key) {
            texture.release(gpu);
        }
    }

    pub fn release_all(&mut self, gpu: &mut impl GraphicsDevice) {
        for (_, texture) in self.textures.drain() {
            texture.release(gpu);
        }
    }
}
