use bevy::prelude::*;
use bevy::render::view::screenshot::{save_to_disk, Screenshot};
use std::path::PathBuf;

use crate::api::types::ApiResponse;

pub fn capture_path() -> PathBuf {
    std::env::var("SCENEFORGE_CAPTURE_PATH")
        .ok()
        .map(PathBuf::from)
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from("capture.png"))
}

/// Queues a screenshot of the primary window; the capture lands on disk a few
/// frames later via the `save_to_disk` observer.
pub fn request_capture(commands: &mut Commands, headless: bool) -> ApiResponse {
    if headless {
        return ApiResponse::failure("Vision capture requires a window.");
    }
    let path = capture_path();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            let _ = std::fs::create_dir_all(parent);
        }
    }
    println!("[SceneForge] Vision capture requested: {}", path.display());
    commands
        .spawn(Screenshot::primary_window())
        .observe(save_to_disk(path.clone()));
    ApiResponse::success(format!("Vision capture started, saving to {}", path.display()))
}
