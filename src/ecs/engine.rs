use std::{any::TypeId, collections::HashMap};

use super::{
    component::{AnyStore, Component, ComponentStore},
    Entity,
};
use crate::error::{GameError, GameResult};

/// Entity container with pooled component allocation.
pub struct Engine {
    generations: Vec<u32>,
    alive: Vec<bool>,
    free_indices: Vec<u32>,
    stores: HashMap<TypeId, Box<dyn AnyStore>>,
}

impl Engine {
    pub fn new() -> Self {
        Engine {
            generations: Vec::new(),
            alive: Vec::new(),
            free_indices: Vec::new(),
            stores: HashMap::new(),
        }
    }

    pub fn create_entity(&mut self) -> Entity {
        if let Some(index) = self.free_indices.pop() {
            self.alive[index as usize] = true;
            return Entity::new(index, self.generations[index as usize]);
        }

        let index = self.generations.len() as u32;
        self.generations.push(0);
        self.alive.push(true);
        Entity::new(index, 0)
    }

    /// Returns every component of the entity to its pool.
    pub fn remove_entity(&mut self, entity: Entity) -> bool {
        if !self.is_alive(entity) {
            return false;
        }

        let index = entity.index() as usize;
        for store in self.stores.values_mut() {
            store.release(index);
        }

        self.alive[index] = false;
        self.generations[index] = self.generations[index].wrapping_add(1);
        self.free_indices.push(entity.index());
        true
    }

    pub fn is_alive(&self, entity: Entity) -> bool {
        let index = entity.index() as usize;
        self.alive.get(index).copied().unwrap_or(false)
            && self.generations[index] == entity.generation()
    }

    pub fn entity_count(&self) -> usize {
        self.alive.iter().filter(|alive| **alive).count()
    }

    pub fn entities(&self) -> impl Iterator<Item = Entity> + '_ {
        self.alive
            .iter()
            .enumerate()
            .filter(|(_, alive)| **alive)
            .map(|(index, _)| Entity::new(index as u32, self.generations[index]))
    }

    /// Hands out a pooled instance when one is available.
    pub fn create_component<T: Component + Default>(&mut self) -> T {
        self.store_or_insert::<T>()
            .and_then(|store| store.obtain())
            .unwrap_or_default()
    }

    /// Attaches a component; an existing component of the same type is
    /// replaced and returned to the pool.
    pub fn add_component<T: Component>(&mut self, entity: Entity, component: T) -> GameResult<()> {
        if !self.is_alive(entity) {
            return Err(GameError::invalid_state(format!(
                "cannot add a component to dead {}",
                entity
            )));
        }

        let store = self.store_or_insert::<T>().ok_or_else(|| {
            GameError::invalid_state(format!("no store for {}", std::any::type_name::<T>()))
        })?;
        if let Some(previous) = store.insert(entity.index() as usize, component) {
            store.recycle(previous);
        }
        Ok(())
    }

    pub fn remove_component<T: Component>(&mut self, entity: Entity) -> Option<T> {
        if !self.is_alive(entity) {
            return None;
        }
        self.store_mut::<T>()?.remove(entity.index() as usize)
    }

    pub fn get_component<T: Component>(&self, entity: Entity) -> Option<&T> {
        if !self.is_alive(entity) {
            return None;
        }
        self.store::<T>()?.get(entity.index() as usize)
    }

    pub fn get_component_mut<T: Component>(&mut self, entity: Entity) -> Option<&mut T> {
        if !self.is_alive(entity) {
            return None;
        }
        self.store_mut::<T>()?.get_mut(entity.index() as usize)
    }

    pub fn has_component<T: Component>(&self, entity: Entity) -> bool {
        self.get_component::<T>(entity).is_some()
    }

    pub fn component_count(&self, entity: Entity) -> usize {
        if !self.is_alive(entity) {
            return 0;
        }
        let index = entity.index() as usize;
        self.stores
            .values()
            .filter(|store| store.get_dyn(index).is_some())
            .count()
    }

    /// Every component attached to the entity, in no particular order.
    pub fn components_mut(&mut self, entity: Entity) -> Vec<&mut dyn Component> {
        if !self.is_alive(entity) {
            return Vec::new();
        }
        let index = entity.index() as usize;
        self.stores
            .values_mut()
            .filter_map(|store| store.get_dyn_mut(index))
            .collect()
    }

    pub fn clear(&mut self) {
        for store in self.stores.values_mut() {
            store.clear();
        }
        self.generations.clear();
        self.alive.clear();
        self.free_indices.clear();
    }

    fn store<T: Component>(&self) -> Option<&ComponentStore<T>> {
        self.stores
            .get(&TypeId::of::<T>())
            .and_then(|store| store.as_any().downcast_ref::<ComponentStore<T>>())
    }

    fn store_mut<T: Component>(&mut self) -> Option<&mut ComponentStore<T>> {
        self.stores
            .get_mut(&TypeId::of::<T>())
            .and_then(|store| store.as_any_mut().downcast_mut::<ComponentStore<T>>())
    }

    fn store_or_insert<T: Component>(&mut self) -> Option<&mut ComponentStore<T>> {
        self.stores
            .entry(TypeId::of::<T>())
            .or_insert_with(|| Box::new(ComponentStore::<T>::new()))
            .as_any_mut()
            .downcast_mut::<ComponentStore<T>>()
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}
