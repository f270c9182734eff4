//! The set of active instances, kept cooperatively in the shared store as a
//! JSON object `instanceId -> geometry`.
//!
//! Entries are only removed by `deregister` or a full store clear. An
//! instance killed without running its teardown leaves its descriptor behind.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::defaults::INSTANCE_REGISTRY_KEY;
use crate::store::{SharedStore, StoreError, StoreExt};
use crate::InstanceId;
use crate::log;

/// Self-reported absolute screen origin and viewport extent, in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Geometry {
    pub screen_x: i32,
    pub screen_y: i32,
    pub width: i32,
    pub height: i32,
}

impl Geometry {
    pub fn new(screen_x: i32, screen_y: i32, width: i32, height: i32) -> Self {
        Self {
            screen_x,
            screen_y,
            width,
            height,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InstanceDescriptor {
    pub instance_id: InstanceId,
    pub geometry: Geometry,
}

impl InstanceDescriptor {
    pub fn new(instance_id: InstanceId, geometry: Geometry) -> Self {
        Self {
            instance_id,
            geometry,
        }
    }
}

type RegistryMap = BTreeMap<InstanceId, Geometry>;

pub struct InstanceRegistry<'a> {
    store: &'a dyn SharedStore,
}

impl<'a> InstanceRegistry<'a> {
    pub fn new(store: &'a dyn SharedStore) -> Self {
        Self { store }
    }

    fn load(&self) -> Result<RegistryMap, StoreError> {
        Ok(self
            .store
            .read::<RegistryMap>(INSTANCE_REGISTRY_KEY)?
            .unwrap_or_default())
    }

    /// Read-only views see an unreadable registry as empty for this frame;
    /// the next frame reads again.
    fn snapshot(&self) -> RegistryMap {
        self.load().unwrap_or_else(|e| {
            log!("Reading the instance registry failed: {}", e);
            RegistryMap::new()
        })
    }

    /// Writes the descriptor unless some entry, under any id, already has the
    /// identical geometry. Returns whether a write happened.
    pub fn register(&self, descriptor: &InstanceDescriptor) -> Result<bool, StoreError> {
        let mut entries = self.load()?;
        if entries.values().any(|g| *g == descriptor.geometry) {
            return Ok(false);
        }
        entries.insert(descriptor.instance_id.clone(), descriptor.geometry);
        self.store.write(INSTANCE_REGISTRY_KEY, &entries)?;
        Ok(true)
    }

    pub fn deregister(&self, instance_id: &InstanceId) -> Result<(), StoreError> {
        let mut entries = self.load()?;
        if entries.remove(instance_id).is_some() {
            self.store.write(INSTANCE_REGISTRY_KEY, &entries)?;
        }
        Ok(())
    }

    /// Re-asserts the descriptor, picking up a moved or resized instance.
    pub fn heartbeat(&self, descriptor: &InstanceDescriptor) -> Result<bool, StoreError> {
        self.register(descriptor)
    }

    /// One snapshot of the registry in id order. The iterator owns the
    /// snapshot; call again for a fresh read.
    pub fn list_all(&self) -> impl Iterator<Item = InstanceDescriptor> + use<> {
        self.snapshot()
            .into_iter()
            .map(|(instance_id, geometry)| InstanceDescriptor::new(instance_id, geometry))
    }

    pub fn geometry_of(&self, instance_id: &InstanceId) -> Option<Geometry> {
        self.snapshot().get(instance_id).copied()
    }

    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{FailingReads, MemoryStore};

    fn descriptor(id: &str, x: i32, y: i32) -> InstanceDescriptor {
        InstanceDescriptor::new(InstanceId::from(id), Geometry::new(x, y, 500, 500))
    }

    #[test]
    fn test_register_adds_descriptor() {
        let store = MemoryStore::new();
        let registry = InstanceRegistry::new(&store);
        assert!(registry.register(&descriptor("a", 0, 0)).unwrap());
        assert_eq!(
            registry.geometry_of(&InstanceId::from("a")),
            Some(Geometry::new(0, 0, 500, 500))
        );
    }

    #[test]
    fn test_same_geometry_under_other_id_is_skipped() {
        let store = MemoryStore::new();
        let registry = InstanceRegistry::new(&store);
        registry.register(&descriptor("a", 0, 0)).unwrap();
        assert!(!registry.register(&descriptor("b", 0, 0)).unwrap());

        let all: Vec<_> = registry.list_all().collect();
        assert_eq!(all, vec![descriptor("a", 0, 0)]);
    }

    #[test]
    fn test_heartbeat_after_move_overwrites_own_entry() {
        let store = MemoryStore::new();
        let registry = InstanceRegistry::new(&store);
        registry.register(&descriptor("a", 0, 0)).unwrap();
        assert!(registry.heartbeat(&descriptor("a", 40, 0)).unwrap());
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.geometry_of(&InstanceId::from("a")).unwrap().screen_x, 40);
    }

    #[test]
    fn test_deregister_removes_only_that_instance() {
        let store = MemoryStore::new();
        let registry = InstanceRegistry::new(&store);
        registry.register(&descriptor("a", 0, 0)).unwrap();
        registry.register(&descriptor("b", 600, 0)).unwrap();
        registry.deregister(&InstanceId::from("a")).unwrap();
        let ids: Vec<_> = registry.list_all().map(|d| d.instance_id).collect();
        assert_eq!(ids, vec![InstanceId::from("b")]);
    }

    #[test]
    fn test_list_all_is_in_id_order() {
        let store = MemoryStore::new();
        let registry = InstanceRegistry::new(&store);
        registry.register(&descriptor("c", 0, 0)).unwrap();
        registry.register(&descriptor("a", 600, 0)).unwrap();
        registry.register(&descriptor("b", 0, 600)).unwrap();
        let ids: Vec<String> = registry.list_all().map(|d| d.instance_id.into()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_malformed_registry_reads_as_empty() {
        let store = MemoryStore::new();
        store.set_raw(INSTANCE_REGISTRY_KEY, r#"["a", "b"]"#).unwrap();
        let registry = InstanceRegistry::new(&store);
        assert!(registry.is_empty());
        assert_eq!(registry.list_all().count(), 0);
    }

    #[test]
    fn test_stored_as_camel_case_object() {
        let store = MemoryStore::new();
        InstanceRegistry::new(&store)
            .register(&descriptor("a", 1, 2))
            .unwrap();
        let raw = store.get_raw(INSTANCE_REGISTRY_KEY).unwrap().unwrap();
        assert_eq!(raw, r#"{"a":{"screenX":1,"screenY":2,"width":500,"height":500}}"#);
    }

    #[test]
    fn test_unreadable_registry_is_not_overwritten() {
        let memory = MemoryStore::new();
        InstanceRegistry::new(&memory).register(&descriptor("a", 0, 0)).unwrap();

        let failing = FailingReads::new(memory.clone(), 1);
        assert!(InstanceRegistry::new(&failing).register(&descriptor("b", 600, 0)).is_err());

        let ids: Vec<_> = InstanceRegistry::new(&memory)
            .list_all()
            .map(|d| d.instance_id)
            .collect();
        assert_eq!(ids, vec![InstanceId::from("a")]);
    }
}
