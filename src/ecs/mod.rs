//! Entity store.
//!
//! Entities are generational ids; components live in one arena per type,
//! indexed by entity index. Removed components go back to a per-type pool
//! and are reset when handed out again.

mod component;
mod engine;
mod entity;

pub use component::{Component, ComponentStore};
pub use engine::Engine;
pub use entity::Entity;
