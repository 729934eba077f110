use bevy::app::AppExit;
use bevy::prelude::*;
use crossbeam_channel::Sender;
use std::time::{Duration, Instant};

pub mod commands;
mod command_runtime;
mod router;
mod routes;
pub mod types;

use commands::{ApiChannels, ApiCommand};
use crate::asset_pipeline::{advance_asset_loads, ActiveLoads, AssetsRoot};
use crate::registry::SceneRegistry;
use crate::simulation::{tick_simulations, ActiveSimulations};

/// Shared state handed to every HTTP handler: the sending half of the
/// command channel into the update loop.
#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) sender: Sender<ApiCommand>,
}

#[derive(Resource)]
struct ApiServerHandle {
    shutdown: Option<tokio::sync::oneshot::Sender<()>>,
    thread: Option<std::thread::JoinHandle<()>>,
}

fn bind_addr() -> String {
    std::env::var("SCENEFORGE_API_ADDR").unwrap_or_else(|_| "127.0.0.1:8080".to_string())
}

/// Runs the HTTP control server on its own thread with its own tokio runtime,
/// bridging requests into the update loop over a crossbeam channel.
pub struct ApiPlugin;

impl Plugin for ApiPlugin {
    fn build(&self, app: &mut App) {
        let (sender, receiver) = crossbeam_channel::unbounded::<ApiCommand>();
        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

        let state = AppState { sender };
        let thread = std::thread::spawn(move || run_server(state, shutdown_rx));

        app.insert_resource(ApiChannels { receiver })
            .insert_resource(ApiServerHandle {
                shutdown: Some(shutdown_tx),
                thread: Some(thread),
            })
            .init_resource::<SceneRegistry>()
            .init_resource::<ActiveLoads>()
            .init_resource::<ActiveSimulations>()
            .init_resource::<AssetsRoot>()
            .add_systems(
                Update,
                (
                    command_runtime::process_api_commands,
                    advance_asset_loads,
                    tick_simulations,
                )
                    .chain(),
            )
            .add_systems(Last, stop_api_server);
    }
}

fn run_server(state: AppState, shutdown_rx: tokio::sync::oneshot::Receiver<()>) {
    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("[SceneForge API] Failed to build runtime: {e}");
            return;
        }
    };

    runtime.block_on(async move {
        let addr = bind_addr();
        let listener = match tokio::net::TcpListener::bind(&addr).await {
            Ok(listener) => listener,
            Err(e) => {
                eprintln!("[SceneForge API] Failed to bind {addr}: {e}");
                return;
            }
        };
        println!("[SceneForge API] Listening on http://{addr}");

        let app = router::build_router(state);
        if let Err(e) = axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
            })
            .await
        {
            eprintln!("[SceneForge API] Server error: {e}");
        }
    });
}

/// On exit, signals the server to stop accepting and gives it a bounded
/// window to drain in-flight requests before the process ends.
fn stop_api_server(mut exits: EventReader<AppExit>, mut handle: ResMut<ApiServerHandle>) {
    if exits.read().next().is_none() {
        return;
    }
    let Some(shutdown) = handle.shutdown.take() else {
        return;
    };
    let _ = shutdown.send(());

    if let Some(thread) = handle.thread.take() {
        let deadline = Instant::now() + Duration::from_secs(2);
        while !thread.is_finished() && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(10));
        }
        if thread.is_finished() {
            let _ = thread.join();
            println!("[SceneForge API] Server stopped.");
        } else {
            eprintln!("[SceneForge API] Server did not stop in time, detaching.");
        }
    }
}
