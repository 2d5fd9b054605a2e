use std::{
    cell::RefCell,
    fmt,
    path::{Path, PathBuf},
    rc::Rc,
};

use crate::data::LoadedTexture;

struct TextureData {
    path: PathBuf,
    width: u32,
    height: u32,
    pixels: RefCell<Option<Vec<u8>>>,
}

/// Shared handle to a decoded texture.
///
/// Clones point at the same pixel buffer. `dispose` releases the pixels for
/// every clone at once and may be called any number of times.
#[derive(Clone)]
pub struct Texture {
    inner: Rc<TextureData>,
}

impl Texture {
    pub fn from_loaded_data(data: LoadedTexture) -> Self {
        Self {
            inner: Rc::new(TextureData {
                path: data.path,
                width: data.width,
                height: data.height,
                pixels: RefCell::new(Some(data.data)),
            }),
        }
    }

    pub fn path(&self) -> &Path {
        &self.inner.path
    }

    pub fn width(&self) -> u32 {
        self.inner.width
    }

    pub fn height(&self) -> u32 {
        self.inner.height
    }

    pub fn is_disposed(&self) -> bool {
        self.inner.pixels.borrow().is_none()
    }

    pub fn byte_len(&self) -> usize {
        self.inner.pixels.borrow().as_ref().map_or(0, Vec::len)
    }

    pub fn dispose(&self) {
        if self.inner.pixels.borrow_mut().take().is_some() {
            log::debug!("Disposed texture {:?}", self.inner.path);
        }
    }

    pub fn same_as(&self, other: &Texture) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for Texture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Texture")
            .field("path", &self.inner.path)
            .field("width", &self.inner.width)
            .field("height", &self.inner.height)
            .field("disposed", &self.is_disposed())
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct TextureRegion {
    pub texture: Texture,
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl TextureRegion {
    pub fn whole(texture: &Texture) -> Self {
        Self {
            texture: texture.clone(),
            x: 0,
            y: 0,
            width: texture.width(),
            height: texture.height(),
        }
    }
}

/// A region split into a stretchable centre and fixed-size borders.
#[derive(Debug, Clone)]
pub struct NinePatch {
    pub region: TextureRegion,
    pub left: u32,
    pub right: u32,
    pub top: u32,
    pub bottom: u32,
}

impl NinePatch {
    pub fn new(region: TextureRegion, left: u32, right: u32, top: u32, bottom: u32) -> Self {
        Self {
            region,
            left,
            right,
            top,
            bottom,
        }
    }

    pub fn min_width(&self) -> f32 {
        (self.left + self.right) as f32
    }

    pub fn min_height(&self) -> f32 {
        (self.top + self.bottom) as f32
    }
}

#[cfg(test)]
pub(crate) fn test_texture(path: &str, width: u32, height: u32) -> Texture {
    Texture::from_loaded_data(LoadedTexture {
        path: PathBuf::from(path),
        width,
        height,
        data: vec![255; (width * height * 4) as usize],
    })
}
