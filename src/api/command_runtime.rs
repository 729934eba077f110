use bevy::ecs::system::SystemParam;
use bevy::prelude::*;

use super::commands::{ApiChannels, ApiCommand};
use super::types::{ApiResponse, QueryRequest, SimulationRequest, SpawnRequest};
use crate::asset_pipeline::{self, ActiveLoads, AssetLoadJob};
use crate::lighting;
use crate::registry::{ObjectOrigin, SceneRegistry};
use crate::simulation::{ActiveSimulations, SimulationRun};
use crate::spawn::{self, PrimitiveKind};
use crate::vision;
use crate::HeadlessMode;

#[derive(SystemParam)]
pub(super) struct ApiRuntimeCtx<'w, 's> {
    channels: Res<'w, ApiChannels>,
    commands: Commands<'w, 's>,
    registry: ResMut<'w, SceneRegistry>,
    active_loads: ResMut<'w, ActiveLoads>,
    simulations: ResMut<'w, ActiveSimulations>,
    headless: Res<'w, HeadlessMode>,
    meshes: Option<ResMut<'w, Assets<Mesh>>>,
    materials: Option<ResMut<'w, Assets<StandardMaterial>>>,
    lights: Query<'w, 's, &'static mut DirectionalLight>,
    clear_color: Option<ResMut<'w, ClearColor>>,
    transforms: Query<'w, 's, &'static Transform>,
}

/// Drains every command queued since the last tick and dispatches them in
/// arrival order. Runs once per Update tick on the mutation side.
pub(super) fn process_api_commands(ctx: ApiRuntimeCtx) {
    let ApiRuntimeCtx {
        channels,
        mut commands,
        mut registry,
        mut active_loads,
        mut simulations,
        headless,
        mut meshes,
        mut materials,
        mut lights,
        mut clear_color,
        transforms,
    } = ctx;

    while let Ok(cmd) = channels.receiver.try_recv() {
        match cmd {
            ApiCommand::Spawn(req, reply) => {
                let response = handle_spawn(
                    &req,
                    &mut commands,
                    &mut registry,
                    &mut active_loads,
                    meshes.as_deref_mut(),
                    materials.as_deref_mut(),
                );
                let _ = reply.send(response);
            }
            ApiCommand::ClearScene(reply) => {
                let count = registry.clear_all(&mut commands);
                let _ = reply.send(ApiResponse::success(format!(
                    "Cleared scene - destroyed {count} objects."
                )));
            }
            ApiCommand::SetLighting(req, reply) => {
                let _ = reply.send(lighting::apply_preset(
                    &req.preset,
                    &mut lights,
                    clear_color.as_deref_mut(),
                ));
            }
            ApiCommand::CaptureVision(reply) => {
                let _ = reply.send(vision::request_capture(&mut commands, headless.0));
            }
            ApiCommand::RunSimulation(req, reply) => {
                let _ = reply.send(handle_run_simulation(
                    &req,
                    &registry,
                    &mut simulations,
                    &transforms,
                ));
            }
            ApiCommand::GetObjectPosition(req, reply) => {
                let _ = reply.send(handle_get_position(&req, &registry, &transforms));
            }
            ApiCommand::ListAllObjects(reply) => {
                let _ = reply.send(list_objects(&registry));
            }
        }
    }
}

fn handle_spawn(
    req: &SpawnRequest,
    commands: &mut Commands,
    registry: &mut SceneRegistry,
    active_loads: &mut ActiveLoads,
    meshes: Option<&mut Assets<Mesh>>,
    materials: Option<&mut Assets<StandardMaterial>>,
) -> ApiResponse {
    // Asset-backed spawns are acknowledged before the pipeline even fetches;
    // the eventual outcome is only observable via list_all_objects.
    if asset_pipeline::is_asset_name(&req.object_name) {
        println!("[SceneForge API] Starting asset load for {}", req.object_name);
        active_loads.0.push(AssetLoadJob::new(req));
        return ApiResponse::success(format!("Asset loading started for {}", req.object_name));
    }

    if let Some(kind) = PrimitiveKind::parse(&req.object_name) {
        let name = format!("Primitive_{}", req.object_name);
        let entity = spawn::spawn_primitive(
            commands,
            meshes,
            materials,
            kind,
            &name,
            req.position.into(),
            req.scale.into(),
            req.color.unwrap_or_default().into(),
        );
        registry.register(entity, name.clone(), ObjectOrigin::Primitive);
        return ApiResponse::success(format!("Successfully spawned '{name}'."));
    }

    let name = format!("Unknown_{}", req.object_name);
    let entity = spawn::spawn_placeholder(commands, meshes, materials, &name, req.position.into());
    registry.register(entity, name, ObjectOrigin::Placeholder);
    ApiResponse::success(format!(
        "Created placeholder for unknown object: {}",
        req.object_name
    ))
}

fn handle_run_simulation(
    req: &SimulationRequest,
    registry: &SceneRegistry,
    simulations: &mut ActiveSimulations,
    transforms: &Query<&Transform>,
) -> ApiResponse {
    let Some(robot) = registry.find_by_name(&req.robot_name) else {
        return ApiResponse::failure(format!("Robot object '{}' not found.", req.robot_name));
    };
    let Some(target) = registry.find_by_name(&req.target_name) else {
        return ApiResponse::failure(format!("Target object '{}' not found.", req.target_name));
    };
    let (Ok(robot_at), Ok(target_at)) = (transforms.get(robot.entity), transforms.get(target.entity))
    else {
        return ApiResponse::failure("Simulation objects are missing transforms.");
    };
    let distance = robot_at.translation.distance(target_at.translation);
    simulations
        .0
        .push(SimulationRun::new(robot.entity, target.entity, distance, req.duration));
    ApiResponse::success(format!(
        "Simulation started: '{}' pursuing '{}' for {:.1}s.",
        robot.name, target.name, req.duration
    ))
}

fn handle_get_position(
    req: &QueryRequest,
    registry: &SceneRegistry,
    transforms: &Query<&Transform>,
) -> ApiResponse {
    let Some(object) = registry.find_by_name(&req.object_name) else {
        return ApiResponse::failure(format!("Object '{}' not found.", req.object_name));
    };
    match transforms.get(object.entity) {
        Ok(transform) => {
            let p = transform.translation;
            ApiResponse::success(format!(
                "'{}' is at ({:.2}, {:.2}, {:.2})",
                object.name, p.x, p.y, p.z
            ))
        }
        Err(_) => ApiResponse::failure(format!("Object '{}' has no transform.", object.name)),
    }
}

fn list_objects(registry: &SceneRegistry) -> ApiResponse {
    if registry.is_empty() {
        return ApiResponse::success("Scene contains 0 objects.");
    }
    let listing: Vec<String> = registry
        .iter()
        .map(|obj| format!("{} ({})", obj.name, obj.origin.label()))
        .collect();
    ApiResponse::success(format!(
        "Scene contains {} objects: {}",
        registry.len(),
        listing.join(", ")
    ))
}
