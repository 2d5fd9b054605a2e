use std::{fmt, rc::Rc};

use crate::{data::LoadedAsset, textures::Texture};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetKind {
    Texture,
    Binary,
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetKind::Texture => write!(f, "texture"),
            AssetKind::Binary => write!(f, "binary"),
        }
    }
}

/// A resident asset, owned by the loader until a consumer clones it out.
#[derive(Debug, Clone)]
pub enum AssetHandle {
    Texture(Texture),
    Binary(Rc<Vec<u8>>),
}

impl AssetHandle {
    pub fn kind(&self) -> AssetKind {
        match self {
            AssetHandle::Texture(_) => AssetKind::Texture,
            AssetHandle::Binary(_) => AssetKind::Binary,
        }
    }

    pub fn as_texture(&self) -> Option<&Texture> {
        if let AssetHandle::Texture(texture) = self {
            Some(texture)
        } else {
            None
        }
    }

    pub fn as_binary(&self) -> Option<&Rc<Vec<u8>>> {
        if let AssetHandle::Binary(bytes) = self {
            Some(bytes)
        } else {
            None
        }
    }
}

impl From<LoadedAsset> for AssetHandle {
    fn from(asset: LoadedAsset) -> Self {
        match asset {
            LoadedAsset::Texture(texture) => AssetHandle::Texture(Texture::from_loaded_data(texture)),
            LoadedAsset::Binary(binary) => AssetHandle::Binary(Rc::new(binary.bytes)),
        }
    }
}
