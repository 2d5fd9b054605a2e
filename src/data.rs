use std::path::PathBuf;

/// Raw results produced by the loader worker. They cross the thread
/// boundary, so they only hold plain owned data.
#[derive(Debug)]
pub struct LoadedTexture {
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>, // RGBA8 pixels
}

#[derive(Debug)]
pub struct LoadedBinary {
    pub path: PathBuf,
    pub bytes: Vec<u8>,
}

#[derive(Debug)]
pub enum LoadedAsset {
    Texture(LoadedTexture),
    Binary(LoadedBinary),
}
