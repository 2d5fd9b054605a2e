use std::any::Any;

const MAX_POOLED: usize = 64;

/// Plain data attached to an entity.
pub trait Component: Any {
    /// Restores the component to its freshly constructed state. Called when a
    /// pooled instance is handed out again.
    fn reset(&mut self);

    /// Releases any framework resource the component owns. Components that
    /// own nothing keep the default.
    fn dispose_resources(&mut self) {}

    fn holds_resources(&self) -> bool {
        false
    }
}

/// Arena storage for one component type.
pub struct ComponentStore<T: Component> {
    slots: Vec<Option<T>>,
    pool: Vec<T>,
}

impl<T: Component> ComponentStore<T> {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            pool: Vec::new(),
        }
    }

    /// Returns the replaced component, if any.
    pub fn insert(&mut self, index: usize, component: T) -> Option<T> {
        if index >= self.slots.len() {
            self.slots.resize_with(index + 1, || None);
        }
        self.slots[index].replace(component)
    }

    pub fn remove(&mut self, index: usize) -> Option<T> {
        self.slots.get_mut(index).and_then(Option::take)
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.slots.get(index).and_then(Option::as_ref)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.slots.get_mut(index).and_then(Option::as_mut)
    }

    pub fn contains(&self, index: usize) -> bool {
        self.get(index).is_some()
    }

    pub fn recycle(&mut self, component: T) {
        if self.pool.len() < MAX_POOLED {
            self.pool.push(component);
        }
    }

    pub fn obtain(&mut self) -> Option<T> {
        let mut component = self.pool.pop()?;
        component.reset();
        Some(component)
    }

    pub fn pooled(&self) -> usize {
        self.pool.len()
    }
}

impl<T: Component> Default for ComponentStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Type-erased view used by the engine to walk every store.
pub(crate) trait AnyStore {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
    fn get_dyn(&self, index: usize) -> Option<&dyn Component>;
    fn get_dyn_mut(&mut self, index: usize) -> Option<&mut dyn Component>;
    fn release(&mut self, index: usize);
    fn clear(&mut self);
}

impl<T: Component> AnyStore for ComponentStore<T> {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn get_dyn(&self, index: usize) -> Option<&dyn Component> {
        self.get(index).map(|c| c as &dyn Component)
    }

    fn get_dyn_mut(&mut self, index: usize) -> Option<&mut dyn Component> {
        self.get_mut(index).map(|c| c as &mut dyn Component)
    }

    fn release(&mut self, index: usize) {
        if let Some(component) = self.remove(index) {
            self.recycle(component);
        }
    }

    fn clear(&mut self) {
        self.slots.clear();
        self.pool.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default, PartialEq)]
    struct Counter(u32);

    impl Component for Counter {
        fn reset(&mut self) {
            self.0 = 0;
        }
    }

    #[test]
    fn test_insert_overwrites() {
        let mut store = ComponentStore::new();
        assert_eq!(store.insert(3, Counter(1)), None);
        assert_eq!(store.insert(3, Counter(2)), Some(Counter(1)));
        assert_eq!(store.get(3), Some(&Counter(2)));
        assert!(!store.contains(0));
    }

    #[test]
    fn test_pooled_component_is_reset_on_reuse() {
        let mut store = ComponentStore::new();
        store.insert(0, Counter(9));
        store.release(0);
        assert_eq!(store.pooled(), 1);

        assert_eq!(store.obtain(), Some(Counter(0)));
        assert_eq!(store.obtain(), None);
    }
}
