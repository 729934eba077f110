mod api;
mod asset_pipeline;
mod lighting;
mod registry;
mod simulation;
mod spawn;
mod vision;

use bevy::prelude::*;
use bevy::render::mesh::MeshBuilder;

#[derive(Resource)]
pub struct HeadlessMode(pub bool);

#[derive(serde::Deserialize, Default)]
struct StartupConfig {
    window_title: Option<String>,
    window_width: Option<f32>,
    window_height: Option<f32>,
    assets_dir: Option<String>,
}

fn load_startup_config() -> StartupConfig {
    let path = std::env::var("SCENEFORGE_CONFIG")
        .ok()
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "sceneforge.json".to_string());
    match std::fs::read_to_string(&path) {
        Ok(contents) => match serde_json::from_str::<StartupConfig>(&contents) {
            Ok(cfg) => {
                println!("[SceneForge] Loaded startup config from {path}");
                cfg
            }
            Err(e) => {
                eprintln!("[SceneForge] Failed to parse {path}: {e}");
                StartupConfig::default()
            }
        },
        Err(_) => StartupConfig::default(),
    }
}

fn main() {
    let args: Vec<String> = std::env::args().collect();
    let headless = args.iter().any(|a| a == "--headless");
    let config = load_startup_config();

    // Resolved once, then shared with the asset pipeline so file checks and
    // `AssetPlugin` read the same tree.
    let assets_root = asset_pipeline::resolve_assets_root(config.assets_dir.as_deref());
    if assets_root != std::path::Path::new("assets") {
        println!("[SceneForge] Using assets dir: {}", assets_root.display());
    }

    let mut app = App::new();
    app.insert_resource(HeadlessMode(headless));
    app.insert_resource(asset_pipeline::AssetsRoot(assets_root.clone()));

    if headless {
        // Headless mode: no window, no rendering, just ECS + API. Asset-backed
        // spawns take the fallback path since there is no asset server.
        app.add_plugins(MinimalPlugins);
        println!("[SceneForge] Starting in HEADLESS mode");
    } else {
        app.add_plugins(
            DefaultPlugins
                .set(WindowPlugin {
                    primary_window: Some(Window {
                        title: config
                            .window_title
                            .unwrap_or_else(|| "SceneForge".to_string()),
                        resolution: (
                            config.window_width.unwrap_or(1280.0),
                            config.window_height.unwrap_or(720.0),
                        )
                            .into(),
                        ..Default::default()
                    }),
                    ..Default::default()
                })
                .set(AssetPlugin {
                    file_path: assets_root.to_string_lossy().into_owned(),
                    ..Default::default()
                }),
        );
    }

    app.add_plugins(api::ApiPlugin)
        .add_systems(Startup, setup_scene)
        .run();
}

/// Camera, default directional light, and ground. The light spawns in headless
/// mode too so lighting presets still have something to drive.
fn setup_scene(
    mut commands: Commands,
    headless: Res<HeadlessMode>,
    mut meshes: Option<ResMut<Assets<Mesh>>>,
    mut materials: Option<ResMut<Assets<StandardMaterial>>>,
) {
    commands.spawn((
        DirectionalLight {
            illuminance: 10_000.0,
            shadows_enabled: true,
            ..Default::default()
        },
        Transform::from_rotation(Quat::from_euler(EulerRot::XYZ, -0.9, 0.6, 0.0)),
    ));

    if headless.0 {
        return;
    }

    commands.spawn((
        Camera3d::default(),
        Transform::from_xyz(8.0, 6.0, 8.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));
    if let (Some(meshes), Some(materials)) = (meshes.as_deref_mut(), materials.as_deref_mut()) {
        commands.spawn((
            Name::new("Ground"),
            Mesh3d(meshes.add(Plane3d::default().mesh().size(40.0, 40.0).build())),
            MeshMaterial3d(materials.add(StandardMaterial {
                base_color: Color::srgb(0.35, 0.45, 0.35),
                ..Default::default()
            })),
        ));
    }
    commands.insert_resource(ClearColor(Color::srgb(0.5, 0.75, 1.0)));
}
