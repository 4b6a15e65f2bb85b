//! In-memory keyed collection.
//!
//! Services keep their entities in insertion order behind a `RwLock`.
//! A poisoned lock is recovered rather than propagated: every mutation
//! below leaves the vector in a valid state even if a caller's closure
//! panics.

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

pub trait Entity: Clone + Send + Sync + 'static {
    fn id(&self) -> &str;
}

#[derive(Debug)]
pub struct Store<T> {
    items: RwLock<Vec<T>>,
}

impl<T: Entity> Default for Store<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Entity> Store<T> {
    pub fn new() -> Self {
        Self::with_items(Vec::new())
    }

    /// Seeded store.
    pub fn with_items(items: Vec<T>) -> Self {
        Self {
            items: RwLock::new(items),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Vec<T>> {
        self.items.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<T>> {
        self.items.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn insert(&self, item: T) -> T {
        self.write().push(item.clone());
        item
    }

    pub fn get(&self, id: &str) -> Option<T> {
        self.read().iter().find(|item| item.id() == id).cloned()
    }

    pub fn all(&self) -> Vec<T> {
        self.read().clone()
    }

    pub fn filter(&self, predicate: impl Fn(&T) -> bool) -> Vec<T> {
        self.read().iter().filter(|item| predicate(item)).cloned().collect()
    }

    /// Apply `change` to the item with `id` and return the updated copy.
    pub fn update(&self, id: &str, change: impl FnOnce(&mut T)) -> Option<T> {
        let mut items = self.write();
        let item = items.iter_mut().find(|item| item.id() == id)?;
        change(item);
        Some(item.clone())
    }

    /// Like [`Store::update`], but `change` may reject the update. The
    /// item is only modified when `change` returns `Ok`.
    pub fn try_update<E>(
        &self,
        id: &str,
        change: impl FnOnce(&T) -> Result<T, E>,
    ) -> Option<Result<T, E>> {
        let mut items = self.write();
        let item = items.iter_mut().find(|item| item.id() == id)?;
        Some(change(item).map(|updated| {
            *item = updated.clone();
            updated
        }))
    }

    pub fn remove(&self, id: &str) -> Option<T> {
        let mut items = self.write();
        let index = items.iter().position(|item| item.id() == id)?;
        Some(items.remove(index))
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Widget {
        id: String,
        stock: i64,
    }

    impl Entity for Widget {
        fn id(&self) -> &str {
            &self.id
        }
    }

    fn widget(id: &str, stock: i64) -> Widget {
        Widget {
            id: id.to_string(),
            stock,
        }
    }

    fn seeded() -> Store<Widget> {
        Store::with_items(vec![widget("1", 10), widget("2", 0), widget("3", 5)])
    }

    #[test]
    fn test_get_and_filter_preserve_order() {
        let store = seeded();

        assert_eq!(store.get("2"), Some(widget("2", 0)));
        assert_eq!(store.get("9"), None);

        let in_stock: Vec<String> = store
            .filter(|w| w.stock > 0)
            .into_iter()
            .map(|w| w.id)
            .collect();
        assert_eq!(in_stock, vec!["1", "3"]);
    }

    #[test]
    fn test_insert_appends() {
        let store = Store::new();
        assert!(store.is_empty());

        store.insert(widget("a", 1));
        store.insert(widget("b", 2));

        assert_eq!(store.len(), 2);
        assert_eq!(store.all().last().map(|w| w.id.clone()), Some("b".to_string()));
    }

    #[test]
    fn test_update_returns_new_value() {
        let store = seeded();

        let updated = store.update("1", |w| w.stock -= 3);

        assert_eq!(updated, Some(widget("1", 7)));
        assert_eq!(store.get("1"), Some(widget("1", 7)));
        assert_eq!(store.update("missing", |w| w.stock = 0), None);
    }

    #[test]
    fn test_rejected_update_leaves_item_unchanged() {
        let store = seeded();

        let result = store.try_update("3", |w| {
            let stock = w.stock - 8;
            if stock < 0 {
                return Err("Insufficient stock");
            }
            Ok(Widget { stock, ..w.clone() })
        });

        assert_eq!(result, Some(Err("Insufficient stock")));
        assert_eq!(store.get("3"), Some(widget("3", 5)));
    }

    #[test]
    fn test_remove() {
        let store = seeded();

        assert_eq!(store.remove("2"), Some(widget("2", 0)));
        assert_eq!(store.remove("2"), None);
        assert_eq!(store.len(), 2);
    }
}
