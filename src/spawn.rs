use bevy::prelude::*;
use bevy::render::mesh::MeshBuilder;

/// Body color of the fallback composite, a fox-ish orange.
pub const FALLBACK_BODY_COLOR: Color = Color::srgb(0.8, 0.4, 0.1);

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum PrimitiveKind {
    Cube,
    Sphere,
    Capsule,
    Cylinder,
    Plane,
}

impl PrimitiveKind {
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "cube" => Some(Self::Cube),
            "sphere" => Some(Self::Sphere),
            "capsule" => Some(Self::Capsule),
            "cylinder" => Some(Self::Cylinder),
            "plane" => Some(Self::Plane),
            _ => None,
        }
    }

    fn mesh(self) -> Mesh {
        match self {
            PrimitiveKind::Cube => Cuboid::new(1.0, 1.0, 1.0).into(),
            PrimitiveKind::Sphere => Sphere::new(0.5).into(),
            PrimitiveKind::Capsule => Capsule3d::new(0.5, 1.0).into(),
            PrimitiveKind::Cylinder => Cylinder::new(0.5, 2.0).into(),
            PrimitiveKind::Plane => Plane3d::default().mesh().size(10.0, 10.0).build(),
        }
    }
}

/// Creates a primitive at the requested transform. Mesh and material are only
/// attached when the render assets exist (windowed mode); headless spawns are
/// bare transforms so the registry and queries still behave identically.
pub fn spawn_primitive(
    commands: &mut Commands,
    meshes: Option<&mut Assets<Mesh>>,
    materials: Option<&mut Assets<StandardMaterial>>,
    kind: PrimitiveKind,
    name: &str,
    position: Vec3,
    scale: Vec3,
    color: Color,
) -> Entity {
    let mut entity = commands.spawn((
        Name::new(name.to_string()),
        Transform::from_translation(position).with_scale(scale),
        Visibility::default(),
    ));
    if let (Some(meshes), Some(materials)) = (meshes, materials) {
        entity.insert((
            Mesh3d(meshes.add(kind.mesh())),
            MeshMaterial3d(materials.add(StandardMaterial {
                base_color: color,
                ..Default::default()
            })),
        ));
    }
    entity.id()
}

/// Opaque stand-in for an unrecognized object name: a plain cylinder at the
/// requested position, left at unit scale and default color.
pub fn spawn_placeholder(
    commands: &mut Commands,
    meshes: Option<&mut Assets<Mesh>>,
    materials: Option<&mut Assets<StandardMaterial>>,
    name: &str,
    position: Vec3,
) -> Entity {
    let mut entity = commands.spawn((
        Name::new(name.to_string()),
        Transform::from_translation(position),
        Visibility::default(),
    ));
    if let (Some(meshes), Some(materials)) = (meshes, materials) {
        entity.insert((
            Mesh3d(meshes.add(PrimitiveKind::Cylinder.mesh())),
            MeshMaterial3d(materials.add(StandardMaterial::default())),
        ));
    }
    entity.id()
}

/// Deterministic substitute for a failed asset load: an orange capsule body
/// with a sphere head at (0, 0.7, 0) and a sphere tail at (0, 0, -1.2).
pub fn spawn_fallback_composite(
    commands: &mut Commands,
    mut meshes: Option<&mut Assets<Mesh>>,
    mut materials: Option<&mut Assets<StandardMaterial>>,
    name: &str,
    position: Vec3,
    scale: Vec3,
) -> Entity {
    let visuals = match (meshes.as_deref_mut(), materials.as_deref_mut()) {
        (Some(meshes), Some(materials)) => {
            let body_mesh = meshes.add(Capsule3d::new(0.5, 1.0));
            let part_mesh = meshes.add(Sphere::new(0.5));
            let body_material = materials.add(StandardMaterial {
                base_color: FALLBACK_BODY_COLOR,
                ..Default::default()
            });
            let part_material = materials.add(StandardMaterial::default());
            Some((body_mesh, part_mesh, body_material, part_material))
        }
        _ => None,
    };

    let mut body = commands.spawn((
        Name::new(name.to_string()),
        Transform::from_translation(position).with_scale(scale),
        Visibility::default(),
    ));
    if let Some((body_mesh, _, body_material, _)) = &visuals {
        body.insert((
            Mesh3d(body_mesh.clone()),
            MeshMaterial3d(body_material.clone()),
        ));
    }
    body.with_children(|parent| {
        let mut head = parent.spawn((
            Name::new("Fallback_Head"),
            Transform::from_xyz(0.0, 0.7, 0.0).with_scale(Vec3::splat(0.6)),
            Visibility::default(),
        ));
        if let Some((_, part_mesh, _, part_material)) = &visuals {
            head.insert((
                Mesh3d(part_mesh.clone()),
                MeshMaterial3d(part_material.clone()),
            ));
        }
        let mut tail = parent.spawn((
            Name::new("Fallback_Tail"),
            Transform::from_xyz(0.0, 0.0, -1.2).with_scale(Vec3::splat(0.4)),
            Visibility::default(),
        ));
        if let Some((_, part_mesh, _, part_material)) = &visuals {
            tail.insert((
                Mesh3d(part_mesh.clone()),
                MeshMaterial3d(part_material.clone()),
            ));
        }
    });
    body.id()
}
