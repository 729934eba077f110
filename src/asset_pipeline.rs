//! Asynchronous asset-backed spawns: a forward-only state machine advanced one
//! step per tick, with deterministic fallback substitution on any failure.

use bevy::asset::LoadState;
use bevy::ecs::system::SystemParam;
use bevy::gltf::GltfAssetLabel;
use bevy::prelude::*;
use bevy::render::mesh::MeshAabb;
use bevy::scene::SceneInstance;
use std::path::PathBuf;

use crate::api::types::SpawnRequest;
use crate::registry::{ObjectOrigin, SceneRegistry};
use crate::spawn;

const IMPORT_SUBDIR: &str = "imported";

/// Object names carrying a binary 3D asset extension go through the pipeline.
pub fn is_asset_name(name: &str) -> bool {
    name.contains(".glb") || name.contains(".gltf")
}

/// Root directory the asset server reads from, resolved once at startup so
/// the file checks here and `AssetPlugin` always agree on the same tree.
#[derive(Resource)]
pub struct AssetsRoot(pub PathBuf);

impl Default for AssetsRoot {
    fn default() -> Self {
        Self(resolve_assets_root(None))
    }
}

/// Env override wins, then the startup config value, then `assets`.
pub fn resolve_assets_root(configured: Option<&str>) -> PathBuf {
    let env = std::env::var("SCENEFORGE_ASSETS_DIR").ok();
    resolve_root_from(env.as_deref(), configured)
}

fn resolve_root_from(env: Option<&str>, configured: Option<&str>) -> PathBuf {
    env.filter(|s| !s.is_empty())
        .or_else(|| configured.filter(|s| !s.is_empty()))
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("assets"))
}

fn model_stem(name: &str) -> &str {
    name.rsplit_once('.').map(|(stem, _)| stem).unwrap_or(name)
}

fn model_display_name(object_name: &str) -> String {
    format!("Model_{}", model_stem(object_name))
}

const TARGET_SIZES: [(&[&str], f32); 7] = [
    (&["fox", "animal", "pet"], 1.5),
    (&["car", "vehicle", "truck"], 4.0),
    (&["tree", "plant"], 3.0),
    (&["house", "building", "structure"], 8.0),
    (&["furniture", "chair", "table"], 1.0),
    (&["tool", "weapon", "item"], 0.5),
    (&["character", "person", "human"], 1.8),
];

pub const DEFAULT_TARGET_SIZE: f32 = 1.0;

/// Intended real-world linear size for an imported model, keyed on name hints.
/// Case-insensitive substring match, first row wins.
pub fn target_size_for(object_name: &str) -> f32 {
    let name = object_name.to_ascii_lowercase();
    for (hints, size) in TARGET_SIZES {
        if hints.iter().any(|hint| name.contains(hint)) {
            return size;
        }
    }
    DEFAULT_TARGET_SIZE
}

/// Per-axis scale normalizing a model of `max_dimension` to `target_size`,
/// with the caller's requested scale applied on top.
pub fn normalized_scale(target_size: f32, max_dimension: f32, requested: Vec3) -> Vec3 {
    let max_dimension = if max_dimension > f32::EPSILON {
        max_dimension
    } else {
        1.0
    };
    requested * (target_size / max_dimension)
}

pub enum LoadStage {
    Fetching,
    Parsing { scene: Handle<Scene> },
    Instantiating { root: Entity },
    Scaling { root: Entity },
}

pub struct AssetLoadJob {
    pub object_name: String,
    pub position: Vec3,
    pub scale: Vec3,
    pub stage: LoadStage,
}

impl AssetLoadJob {
    pub fn new(req: &SpawnRequest) -> Self {
        Self {
            object_name: req.object_name.clone(),
            position: req.position.into(),
            scale: req.scale.into(),
            stage: LoadStage::Fetching,
        }
    }
}

/// Jobs currently in flight. Completions may interleave in any order.
#[derive(Resource, Default)]
pub struct ActiveLoads(pub Vec<AssetLoadJob>);

enum StepOutcome {
    InFlight,
    Complete { root: Entity },
    Failed { reason: String, partial_root: Option<Entity> },
}

#[derive(SystemParam)]
pub struct AssetLoadCtx<'w, 's> {
    commands: Commands<'w, 's>,
    active: ResMut<'w, ActiveLoads>,
    registry: ResMut<'w, SceneRegistry>,
    assets_root: Res<'w, AssetsRoot>,
    asset_server: Option<Res<'w, AssetServer>>,
    scene_spawner: Option<Res<'w, SceneSpawner>>,
    meshes: Option<ResMut<'w, Assets<Mesh>>>,
    materials: Option<ResMut<'w, Assets<StandardMaterial>>>,
    instances: Query<'w, 's, &'static SceneInstance>,
    children: Query<'w, 's, &'static Children>,
    mesh_items: Query<'w, 's, (&'static Mesh3d, &'static GlobalTransform)>,
}

/// Advances every in-flight load by at most one stage per tick. A finished job
/// registers exactly one object: the model on success, the fallback composite
/// otherwise.
pub fn advance_asset_loads(ctx: AssetLoadCtx) {
    let AssetLoadCtx {
        mut commands,
        mut active,
        mut registry,
        assets_root,
        asset_server,
        scene_spawner,
        mut meshes,
        mut materials,
        instances,
        children,
        mesh_items,
    } = ctx;

    let jobs = std::mem::take(&mut active.0);
    let mut in_flight = Vec::with_capacity(jobs.len());

    for mut job in jobs {
        let outcome = step_job(
            &mut job,
            &mut commands,
            &assets_root,
            asset_server.as_deref(),
            scene_spawner.as_deref(),
            meshes.as_deref(),
            &instances,
            &children,
            &mesh_items,
        );
        match outcome {
            StepOutcome::InFlight => in_flight.push(job),
            StepOutcome::Complete { root } => {
                let name = model_display_name(&job.object_name);
                println!("[AssetLoad] Completed {} as '{name}'", job.object_name);
                registry.register(root, name, ObjectOrigin::Asset);
            }
            StepOutcome::Failed { reason, partial_root } => {
                eprintln!(
                    "[AssetLoad] {} failed ({reason}); substituting fallback",
                    job.object_name
                );
                if let Some(root) = partial_root {
                    if let Some(entity) = commands.get_entity(root) {
                        entity.despawn_recursive();
                    }
                }
                let name = format!("Fallback_{}", model_stem(&job.object_name));
                let entity = spawn::spawn_fallback_composite(
                    &mut commands,
                    meshes.as_deref_mut(),
                    materials.as_deref_mut(),
                    &name,
                    job.position,
                    job.scale,
                );
                registry.register(entity, name, ObjectOrigin::Fallback);
            }
        }
    }

    active.0 = in_flight;
}

#[allow(clippy::too_many_arguments)]
fn step_job(
    job: &mut AssetLoadJob,
    commands: &mut Commands,
    assets_root: &AssetsRoot,
    asset_server: Option<&AssetServer>,
    scene_spawner: Option<&SceneSpawner>,
    meshes: Option<&Assets<Mesh>>,
    instances: &Query<&SceneInstance>,
    children: &Query<&Children>,
    mesh_items: &Query<(&Mesh3d, &GlobalTransform)>,
) -> StepOutcome {
    match &job.stage {
        LoadStage::Fetching => {
            let path = assets_root.0.join(IMPORT_SUBDIR).join(&job.object_name);
            if !path.is_file() {
                return StepOutcome::Failed {
                    reason: format!("asset file not found: {}", path.display()),
                    partial_root: None,
                };
            }
            let Some(asset_server) = asset_server else {
                return StepOutcome::Failed {
                    reason: "asset server unavailable".to_string(),
                    partial_root: None,
                };
            };
            let scene = asset_server.load(
                GltfAssetLabel::Scene(0)
                    .from_asset(format!("{IMPORT_SUBDIR}/{}", job.object_name)),
            );
            job.stage = LoadStage::Parsing { scene };
            StepOutcome::InFlight
        }
        LoadStage::Parsing { scene } => {
            let Some(asset_server) = asset_server else {
                return StepOutcome::Failed {
                    reason: "asset server unavailable".to_string(),
                    partial_root: None,
                };
            };
            match asset_server.get_load_state(scene.id()) {
                Some(LoadState::Failed(err)) => StepOutcome::Failed {
                    reason: format!("parse error: {err}"),
                    partial_root: None,
                },
                Some(LoadState::Loaded) => {
                    let root = commands
                        .spawn((
                            Name::new(model_display_name(&job.object_name)),
                            Transform::from_translation(job.position),
                            Visibility::default(),
                            SceneRoot(scene.clone()),
                        ))
                        .id();
                    job.stage = LoadStage::Instantiating { root };
                    StepOutcome::InFlight
                }
                _ => StepOutcome::InFlight,
            }
        }
        LoadStage::Instantiating { root } => {
            let root = *root;
            if commands.get_entity(root).is_none() {
                return StepOutcome::Failed {
                    reason: "instantiated model disappeared".to_string(),
                    partial_root: None,
                };
            }
            let Some(scene_spawner) = scene_spawner else {
                return StepOutcome::Failed {
                    reason: "scene spawner unavailable".to_string(),
                    partial_root: Some(root),
                };
            };
            match instances.get(root) {
                Ok(instance) if scene_spawner.instance_is_ready(**instance) => {
                    job.stage = LoadStage::Scaling { root };
                    StepOutcome::InFlight
                }
                _ => StepOutcome::InFlight,
            }
        }
        LoadStage::Scaling { root } => {
            let root = *root;
            let extent = model_extent(root, meshes, children, mesh_items);
            let target = target_size_for(&job.object_name);
            let scale = normalized_scale(target, extent.max_element(), job.scale);
            let Some(mut entity) = commands.get_entity(root) else {
                return StepOutcome::Failed {
                    reason: "instantiated model disappeared".to_string(),
                    partial_root: None,
                };
            };
            entity.insert(Transform::from_translation(job.position).with_scale(scale));
            StepOutcome::Complete { root }
        }
    }
}

/// World-space extent of the model: merged AABBs of every descendant mesh,
/// defaulting to a unit extent when the scene carries no meshes.
fn model_extent(
    root: Entity,
    meshes: Option<&Assets<Mesh>>,
    children: &Query<&Children>,
    mesh_items: &Query<(&Mesh3d, &GlobalTransform)>,
) -> Vec3 {
    let Some(meshes) = meshes else {
        return Vec3::ONE;
    };
    let mut min = Vec3::MAX;
    let mut max = Vec3::MIN;
    let mut found = false;
    let mut stack = vec![root];
    while let Some(entity) = stack.pop() {
        if let Ok(list) = children.get(entity) {
            stack.extend(list.iter().copied());
        }
        let Ok((mesh, global)) = mesh_items.get(entity) else {
            continue;
        };
        let Some(aabb) = meshes.get(&mesh.0).and_then(|m| m.compute_aabb()) else {
            continue;
        };
        for corner in aabb_corners(Vec3::from(aabb.min()), Vec3::from(aabb.max())) {
            let world = global.transform_point(corner);
            min = min.min(world);
            max = max.max(world);
            found = true;
        }
    }
    if found {
        max - min
    } else {
        Vec3::ONE
    }
}

fn aabb_corners(min: Vec3, max: Vec3) -> [Vec3; 8] {
    [
        Vec3::new(min.x, min.y, min.z),
        Vec3::new(min.x, min.y, max.z),
        Vec3::new(min.x, max.y, min.z),
        Vec3::new(min.x, max.y, max.z),
        Vec3::new(max.x, min.y, min.z),
        Vec3::new(max.x, min.y, max.z),
        Vec3::new(max.x, max.y, min.z),
        Vec3::new(max.x, max.y, max.z),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn asset_names_need_a_model_extension() {
        assert!(is_asset_name("fox.glb"));
        assert!(is_asset_name("fancy_house.gltf"));
        assert!(!is_asset_name("cube"));
        assert!(!is_asset_name("glb_lover"));
    }

    #[test]
    fn target_size_table_matches_hints() {
        assert_eq!(target_size_for("fox.glb"), 1.5);
        assert_eq!(target_size_for("sports_car.glb"), 4.0);
        assert_eq!(target_size_for("oak_tree.gltf"), 3.0);
        assert_eq!(target_size_for("farm_house.glb"), 8.0);
        assert_eq!(target_size_for("office_chair.glb"), 1.0);
        assert_eq!(target_size_for("hammer_tool.glb"), 0.5);
        assert_eq!(target_size_for("npc_character.glb"), 1.8);
        assert_eq!(target_size_for("mystery_blob.glb"), DEFAULT_TARGET_SIZE);
    }

    #[test]
    fn target_size_is_case_insensitive_and_first_match_wins() {
        assert_eq!(target_size_for("FOX.GLB"), 1.5);
        // "fox" row is checked before "car", even though both match.
        assert_eq!(target_size_for("fox_car.glb"), 1.5);
    }

    #[test]
    fn normalized_scale_hits_target_dimension() {
        // A "car" model of any raw size should end up ~4.0 units across,
        // times the requested multiplier.
        for raw_dimension in [0.3, 1.0, 57.5] {
            let target = target_size_for("car.glb");
            let scale = normalized_scale(target, raw_dimension, Vec3::splat(2.0));
            let post_scale_dim = scale.x * raw_dimension;
            assert!((post_scale_dim - 4.0 * 2.0).abs() < 1e-3, "{raw_dimension}");
        }
    }

    #[test]
    fn normalized_scale_guards_degenerate_bounds() {
        let scale = normalized_scale(4.0, 0.0, Vec3::ONE);
        assert!(scale.x.is_finite());
        assert_eq!(scale, Vec3::splat(4.0));
    }

    #[test]
    fn model_stem_strips_the_extension() {
        assert_eq!(model_stem("fox.glb"), "fox");
        assert_eq!(model_stem("a.b.gltf"), "a.b");
        assert_eq!(model_stem("noext"), "noext");
        assert_eq!(model_display_name("fox.glb"), "Model_fox");
    }

    #[test]
    fn assets_root_prefers_env_then_config_then_default() {
        assert_eq!(
            resolve_root_from(Some("from_env"), Some("from_config")),
            PathBuf::from("from_env")
        );
        assert_eq!(
            resolve_root_from(None, Some("from_config")),
            PathBuf::from("from_config")
        );
        assert_eq!(
            resolve_root_from(Some(""), Some("from_config")),
            PathBuf::from("from_config")
        );
        assert_eq!(resolve_root_from(None, None), PathBuf::from("assets"));
        assert_eq!(resolve_root_from(None, Some("")), PathBuf::from("assets"));
    }

    fn pipeline_app() -> App {
        let mut app = App::new();
        app.insert_resource(Assets::<Mesh>::default())
            .insert_resource(Assets::<StandardMaterial>::default())
            .init_resource::<SceneRegistry>()
            .init_resource::<AssetsRoot>()
            .init_resource::<ActiveLoads>()
            .add_systems(Update, advance_asset_loads);
        app
    }

    fn push_scaling_job(app: &mut App, object_name: &str, position: Vec3, scale: Vec3, root: Entity) {
        app.world_mut()
            .resource_mut::<ActiveLoads>()
            .0
            .push(AssetLoadJob {
                object_name: object_name.to_string(),
                position,
                scale,
                stage: LoadStage::Scaling { root },
            });
    }

    #[test]
    fn scaling_merges_child_bounds_and_registers_the_model() {
        let mut app = pipeline_app();
        let (cab, trailer) = {
            let mut meshes = app.world_mut().resource_mut::<Assets<Mesh>>();
            (
                meshes.add(Cuboid::new(2.0, 1.0, 1.0)),
                meshes.add(Cuboid::new(1.0, 1.0, 1.0)),
            )
        };
        let child = app
            .world_mut()
            .spawn((Mesh3d(trailer), GlobalTransform::from_xyz(0.0, 0.0, 5.0)))
            .id();
        let root = app
            .world_mut()
            .spawn((Mesh3d(cab), GlobalTransform::IDENTITY))
            .add_child(child)
            .id();
        push_scaling_job(
            &mut app,
            "cargo_truck.glb",
            Vec3::new(1.0, 0.0, 2.0),
            Vec3::ONE,
            root,
        );
        app.update();

        let registry = app.world().resource::<SceneRegistry>();
        assert_eq!(registry.len(), 1);
        let obj = registry.iter().next().expect("registered model");
        assert_eq!(obj.name, "Model_cargo_truck");
        assert_eq!(obj.origin, ObjectOrigin::Asset);
        assert_eq!(obj.entity, root);
        assert!(app.world().resource::<ActiveLoads>().0.is_empty());

        // Merged bounds span x [-1, 1] and z [-0.5, 5.5], so the max dimension
        // is 6.0; a "truck" normalizes toward 4.0 units.
        let transform = app.world().get::<Transform>(root).expect("scaled transform");
        assert!((transform.scale.x - 4.0 / 6.0).abs() < 1e-4, "{}", transform.scale.x);
        assert_eq!(transform.translation, Vec3::new(1.0, 0.0, 2.0));
    }

    #[test]
    fn scaling_without_meshes_defaults_to_unit_extent() {
        let mut app = pipeline_app();
        let root = app.world_mut().spawn(GlobalTransform::IDENTITY).id();
        push_scaling_job(&mut app, "mystery.glb", Vec3::ZERO, Vec3::splat(2.0), root);
        app.update();

        let registry = app.world().resource::<SceneRegistry>();
        let obj = registry.iter().next().expect("registered model");
        assert_eq!(obj.name, "Model_mystery");
        assert_eq!(obj.origin, ObjectOrigin::Asset);

        let transform = app.world().get::<Transform>(root).expect("scaled transform");
        assert_eq!(transform.scale, Vec3::splat(2.0));
    }

    #[test]
    fn scaling_a_vanished_root_substitutes_the_fallback() {
        let mut app = pipeline_app();
        let root = app.world_mut().spawn_empty().id();
        app.world_mut().despawn(root);
        push_scaling_job(&mut app, "ghost_fox.glb", Vec3::ZERO, Vec3::ONE, root);
        app.update();

        let registry = app.world().resource::<SceneRegistry>();
        assert_eq!(registry.len(), 1);
        let obj = registry.iter().next().expect("substituted object");
        assert_eq!(obj.name, "Fallback_ghost_fox");
        assert_eq!(obj.origin, ObjectOrigin::Fallback);
        assert!(app.world().resource::<ActiveLoads>().0.is_empty());
    }
}
