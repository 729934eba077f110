use bevy::prelude::*;

use crate::api::types::ApiResponse;

pub struct LightingPreset {
    pub light_color: Color,
    pub illuminance: f32,
    pub sky_color: Color,
}

pub fn preset_by_name(name: &str) -> Option<LightingPreset> {
    match name.to_ascii_lowercase().as_str() {
        "day" => Some(LightingPreset {
            light_color: Color::WHITE,
            illuminance: 10_000.0,
            sky_color: Color::srgb(0.5, 0.75, 1.0),
        }),
        "night" => Some(LightingPreset {
            light_color: Color::srgb(0.2, 0.2, 0.4),
            illuminance: 3_000.0,
            sky_color: Color::srgb(0.02, 0.02, 0.08),
        }),
        "sunset" => Some(LightingPreset {
            light_color: Color::srgb(1.0, 0.6, 0.3),
            illuminance: 7_000.0,
            sky_color: Color::srgb(0.9, 0.5, 0.3),
        }),
        _ => None,
    }
}

/// Applies a named preset to the scene's directional light and sky color.
/// The light check comes first: a valid preset with no light is still a failure.
pub fn apply_preset(
    preset: &str,
    lights: &mut Query<&mut DirectionalLight>,
    clear_color: Option<&mut ClearColor>,
) -> ApiResponse {
    let Ok(mut light) = lights.get_single_mut() else {
        return ApiResponse::failure("Directional light not assigned.");
    };
    let Some(settings) = preset_by_name(preset) else {
        return ApiResponse::failure(format!("Unknown lighting preset: {preset}"));
    };
    light.color = settings.light_color;
    light.illuminance = settings.illuminance;
    if let Some(clear_color) = clear_color {
        clear_color.0 = settings.sky_color;
    }
    ApiResponse::success(format!("Lighting set to {preset}."))
}
