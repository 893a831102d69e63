//! Scene graph seam
//!
//! The session never draws; it only creates, moves, and removes entities
//! through this trait. The browser build forwards to the JS renderer,
//! tests and the native runner use `HeadlessScene`.

use std::collections::BTreeMap;

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Opaque handle to a scene entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityHandle(pub u32);

/// Kind of sprite the scene should create
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityKind {
    /// Hand-controlled interceptor
    Player,
    /// Protected target enemies converge on
    Target,
    Enemy,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Player => "player",
            EntityKind::Target => "target",
            EntityKind::Enemy => "enemy",
        }
    }
}

/// Rendering collaborator
pub trait Scene {
    fn add_entity(&mut self, kind: EntityKind) -> EntityHandle;
    fn remove_entity(&mut self, handle: EntityHandle);
    fn set_entity_position(&mut self, handle: EntityHandle, pos: Vec2);
    /// Current position, `None` for unknown handles
    fn entity_position(&self, handle: EntityHandle) -> Option<Vec2>;
    /// Visible half-width/half-height of the gameplay plane
    fn world_bounds(&self) -> Vec2;
}

/// A headless scene entity
#[derive(Debug, Clone, PartialEq)]
pub struct SceneEntity {
    pub kind: EntityKind,
    pub pos: Vec2,
}

/// In-memory scene without rendering
#[derive(Debug, Clone)]
pub struct HeadlessScene {
    entities: BTreeMap<EntityHandle, SceneEntity>,
    bounds: Vec2,
    next_id: u32,
}

impl Default for HeadlessScene {
    fn default() -> Self {
        Self::new(crate::visible_half_extents(16.0 / 9.0))
    }
}

impl HeadlessScene {
    pub fn new(bounds: Vec2) -> Self {
        Self {
            entities: BTreeMap::new(),
            bounds,
            next_id: 1,
        }
    }

    pub fn set_bounds(&mut self, bounds: Vec2) {
        self.bounds = bounds;
    }

    pub fn entity(&self, handle: EntityHandle) -> Option<&SceneEntity> {
        self.entities.get(&handle)
    }

    /// Number of live entities of `kind`
    pub fn count(&self, kind: EntityKind) -> usize {
        self.entities.values().filter(|e| e.kind == kind).count()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

impl Scene for HeadlessScene {
    fn add_entity(&mut self, kind: EntityKind) -> EntityHandle {
        let handle = EntityHandle(self.next_id);
        self.next_id += 1;
        self.entities.insert(
            handle,
            SceneEntity {
                kind,
                pos: Vec2::ZERO,
            },
        );
        handle
    }

    fn remove_entity(&mut self, handle: EntityHandle) {
        self.entities.remove(&handle);
    }

    fn set_entity_position(&mut self, handle: EntityHandle, pos: Vec2) {
        if let Some(entity) = self.entities.get_mut(&handle) {
            entity.pos = pos;
        }
    }

    fn entity_position(&self, handle: EntityHandle) -> Option<Vec2> {
        self.entities.get(&handle).map(|e| e.pos)
    }

    fn world_bounds(&self) -> Vec2 {
        self.bounds
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headless_scene_lifecycle() {
        let mut scene = HeadlessScene::new(Vec2::new(4.0, 3.0));
        let a = scene.add_entity(EntityKind::Enemy);
        let b = scene.add_entity(EntityKind::Player);
        assert_ne!(a, b);
        assert_eq!(scene.count(EntityKind::Enemy), 1);

        scene.set_entity_position(a, Vec2::new(1.0, 2.0));
        assert_eq!(scene.entity_position(a), Some(Vec2::new(1.0, 2.0)));

        scene.remove_entity(a);
        assert_eq!(scene.entity_position(a), None);
        // Moving a removed entity is ignored
        scene.set_entity_position(a, Vec2::ONE);
        assert_eq!(scene.len(), 1);
        assert_eq!(scene.world_bounds(), Vec2::new(4.0, 3.0));
    }
}
