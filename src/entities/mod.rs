//! Two-phase entity construction.
//!
//! Phase one creates bare entities and queues their textures; phase two runs
//! once the loader batch is resident and attaches the loaded textures.

pub mod pong;

pub use pong::PongEntityInitializer;

use crate::{ecs::Engine, error::GameResult, loader::AssetLoaderService};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitializerPhase {
    Uninitialized,
    EntitiesCreated,
    AssetsLoaded,
    Disposed,
}

pub trait EntityInitializer {
    fn phase(&self) -> InitializerPhase;

    /// Creates the entities with their structural components and queues the
    /// assets they need.
    fn create_all_entities(
        &mut self,
        engine: &mut Engine,
        loaders: &mut AssetLoaderService,
    ) -> GameResult<()>;

    /// Attaches loaded resources and releases the loader.
    fn set_loadable_assets(
        &mut self,
        engine: &mut Engine,
        loaders: &mut AssetLoaderService,
    ) -> GameResult<()>;

    fn dispose_assets(&mut self, engine: &mut Engine) -> GameResult<()>;
}
