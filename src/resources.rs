use std::{
    cell::RefCell,
    collections::HashMap,
    fmt,
    path::{Path, PathBuf},
    rc::Rc,
};

use crate::error::GameResult;

pub const BASE_FONT_SIZE: f32 = 30.0;

struct FontData {
    path: PathBuf,
    size: f32,
    bytes: RefCell<Option<Vec<u8>>>,
}

/// Shared handle to a cached font face.
#[derive(Clone)]
pub struct Font {
    inner: Rc<FontData>,
}

impl Font {
    fn new(path: PathBuf, size: f32, bytes: Vec<u8>) -> Self {
        Self {
            inner: Rc::new(FontData {
                path,
                size,
                bytes: RefCell::new(Some(bytes)),
            }),
        }
    }

    pub fn path(&self) -> &Path {
        &self.inner.path
    }

    pub fn size(&self) -> f32 {
        self.inner.size
    }

    // Fixed-advance metrics; glyph shaping belongs to the renderer.
    pub fn text_width(&self, text: &str) -> f32 {
        text.chars().count() as f32 * self.inner.size * 0.6
    }

    pub fn line_height(&self) -> f32 {
        self.inner.size * 1.2
    }

    pub fn is_disposed(&self) -> bool {
        self.inner.bytes.borrow().is_none()
    }

    pub fn dispose(&self) {
        self.inner.bytes.borrow_mut().take();
    }

    pub fn same_as(&self, other: &Font) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for Font {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Font")
            .field("path", &self.inner.path)
            .field("size", &self.inner.size)
            .field("disposed", &self.is_disposed())
            .finish()
    }
}

pub struct CachedFontManager {
    root: PathBuf,
    fonts: HashMap<PathBuf, Font>,
}

impl CachedFontManager {
    fn new(root: PathBuf) -> Self {
        Self {
            root,
            fonts: HashMap::new(),
        }
    }

    pub fn load_font<P: AsRef<Path>>(&mut self, path: P) -> GameResult<Font> {
        let path = path.as_ref();

        if let Some(font) = self.fonts.get(path) {
            log::debug!("Font cache hit for {:?}", path);
            return Ok(font.clone());
        }

        let bytes = std::fs::read(self.root.join(path))?;
        let font = Font::new(path.to_path_buf(), BASE_FONT_SIZE, bytes);
        self.fonts.insert(path.to_path_buf(), font.clone());
        log::debug!("Loaded font {:?}", path);

        Ok(font)
    }

    pub fn cached_count(&self) -> usize {
        self.fonts.len()
    }

    fn clear(&mut self) {
        for (_, font) in self.fonts.drain() {
            font.dispose();
        }
    }
}

/// Reference-counted access to the session's font cache.
pub struct FontManagerService {
    manager: CachedFontManager,
    refs: usize,
}

impl FontManagerService {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            manager: CachedFontManager::new(root.as_ref().to_path_buf()),
            refs: 0,
        }
    }

    pub fn get_instance(&mut self) -> &mut CachedFontManager {
        self.refs += 1;
        &mut self.manager
    }

    pub fn ref_count(&self) -> usize {
        self.refs
    }

    pub fn cached_count(&self) -> usize {
        self.manager.cached_count()
    }

    pub fn free_instance(&mut self) {
        if self.refs == 0 {
            log::warn!("Font manager released with no outstanding references");
            return;
        }

        self.refs -= 1;
        if self.refs == 0 {
            log::debug!("Clearing font cache ({} fonts)", self.manager.cached_count());
            self.manager.clear();
        }
    }
}

#[cfg(test)]
pub(crate) fn test_font(size: f32) -> Font {
    Font::new(PathBuf::from("test.ttf"), size, Vec::new())
}
