//! Active-notification registry
//!
//! In-memory map from application-assigned notification id to the live
//! backend handle. The registry itself never talks to the OS: register
//! and remove hand evicted handles back to the caller (the broker), which
//! is responsible for closing them. Reverse lookup is a linear scan;
//! notification counts are human-interactive scale.

use std::collections::HashMap;

/// id → 存活通知句柄
#[derive(Debug)]
pub struct NotificationRegistry<H> {
    active: HashMap<String, H>,
}

impl<H: PartialEq> NotificationRegistry<H> {
    pub fn new() -> Self {
        Self {
            active: HashMap::new(),
        }
    }

    /// Insert or overwrite the handle for `id`.
    ///
    /// Returns the superseded handle, if any, so the caller can close it
    /// explicitly instead of leaking it.
    pub fn register(&mut self, id: &str, handle: H) -> Option<H> {
        self.active.insert(id.to_string(), handle)
    }

    /// Remove the entry for `id`, returning its handle. Unknown id is a no-op.
    pub fn remove(&mut self, id: &str) -> Option<H> {
        self.active.remove(id)
    }

    /// Remove every entry, returning all handles for closing.
    pub fn drain(&mut self) -> Vec<(String, H)> {
        self.active.drain().collect()
    }

    /// Translate an opaque backend handle back into the application id.
    pub fn resolve_id(&self, handle: &H) -> Option<String> {
        self.active
            .iter()
            .find(|(_, h)| *h == handle)
            .map(|(id, _)| id.clone())
    }

    /// Remove the entry holding `handle`, returning its id.
    ///
    /// Used by close callbacks: a handle superseded by a newer show no
    /// longer appears here, so its late close event resolves to nothing.
    pub fn evict_handle(&mut self, handle: &H) -> Option<String> {
        let id = self.resolve_id(handle)?;
        self.active.remove(&id);
        Some(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.active.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }
}

impl<H: PartialEq> Default for NotificationRegistry<H> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_and_resolve() {
        let mut registry: NotificationRegistry<u32> = NotificationRegistry::new();
        assert!(registry.register("n1", 11).is_none());
        assert!(registry.register("n2", 22).is_none());

        assert_eq!(registry.resolve_id(&11), Some("n1".to_string()));
        assert_eq!(registry.resolve_id(&22), Some("n2".to_string()));
        assert_eq!(registry.resolve_id(&99), None);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_register_same_id_returns_superseded_handle() {
        let mut registry: NotificationRegistry<u32> = NotificationRegistry::new();
        registry.register("n1", 11);

        let superseded = registry.register("n1", 12);
        assert_eq!(superseded, Some(11));

        // old handle no longer resolves
        assert_eq!(registry.resolve_id(&11), None);
        assert_eq!(registry.resolve_id(&12), Some("n1".to_string()));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_remove_unknown_id_is_noop() {
        let mut registry: NotificationRegistry<u32> = NotificationRegistry::new();
        assert!(registry.remove("ghost").is_none());
        assert!(registry.remove("ghost").is_none());
    }

    #[test]
    fn test_evict_handle() {
        let mut registry: NotificationRegistry<u32> = NotificationRegistry::new();
        registry.register("n1", 11);

        assert_eq!(registry.evict_handle(&11), Some("n1".to_string()));
        assert!(registry.is_empty());

        // stale handle after eviction is a no-op
        assert_eq!(registry.evict_handle(&11), None);
    }

    #[test]
    fn test_stale_handle_after_supersede_is_noop() {
        let mut registry: NotificationRegistry<u32> = NotificationRegistry::new();
        registry.register("n1", 11);
        registry.register("n1", 12);

        // late close event for the superseded handle must not evict n1
        assert_eq!(registry.evict_handle(&11), None);
        assert!(registry.contains("n1"));
    }

    #[test]
    fn test_drain_returns_everything() {
        let mut registry: NotificationRegistry<u32> = NotificationRegistry::new();
        registry.register("n1", 11);
        registry.register("n2", 22);

        let mut drained = registry.drain();
        drained.sort();
        assert_eq!(
            drained,
            vec![("n1".to_string(), 11), ("n2".to_string(), 22)]
        );
        assert!(registry.is_empty());
    }
}
