use bevy::prelude::*;

/// How a registered scene object came to exist.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ObjectOrigin {
    Primitive,
    Asset,
    Fallback,
    Placeholder,
}

impl ObjectOrigin {
    pub fn label(self) -> &'static str {
        match self {
            ObjectOrigin::Primitive => "primitive",
            ObjectOrigin::Asset => "asset",
            ObjectOrigin::Fallback => "fallback",
            ObjectOrigin::Placeholder => "placeholder",
        }
    }
}

pub struct SceneObject {
    pub id: u64,
    pub entity: Entity,
    pub name: String,
    pub origin: ObjectOrigin,
}

/// Insertion-ordered record of every object the API has created. Written only
/// from the Update dispatch systems, so no locking is needed.
#[derive(Resource, Default)]
pub struct SceneRegistry {
    objects: Vec<SceneObject>,
    next_id: u64,
}

impl SceneRegistry {
    pub fn register(
        &mut self,
        entity: Entity,
        name: impl Into<String>,
        origin: ObjectOrigin,
    ) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.objects.push(SceneObject {
            id,
            entity,
            name: name.into(),
            origin,
        });
        id
    }

    /// First object whose display name contains `needle` (substring, not exact).
    pub fn find_by_name(&self, needle: &str) -> Option<&SceneObject> {
        self.objects.iter().find(|obj| obj.name.contains(needle))
    }

    pub fn iter(&self) -> impl Iterator<Item = &SceneObject> {
        self.objects.iter()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Despawns every tracked object and returns the pre-clear count.
    pub fn clear_all(&mut self, commands: &mut Commands) -> usize {
        let count = self.objects.len();
        for obj in self.objects.drain(..) {
            if let Some(entity) = commands.get_entity(obj.entity) {
                entity.despawn_recursive();
            }
        }
        count
    }
}
