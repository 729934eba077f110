use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use bevy::math::Vec3;
use bevy::prelude::Color;
use serde::{Deserialize, Serialize};

/// Wire response for every endpoint: 200 when `success`, 400 otherwise.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ApiResponse {
    pub success: bool,
    pub message: String,
}

impl ApiResponse {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiResponse {
    fn into_response(self) -> Response {
        let status = if self.success {
            StatusCode::OK
        } else {
            StatusCode::BAD_REQUEST
        };
        (status, Json(self)).into_response()
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct Vec3Def {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3Def {
    pub fn one() -> Self {
        Self {
            x: 1.0,
            y: 1.0,
            z: 1.0,
        }
    }
}

impl From<Vec3Def> for Vec3 {
    fn from(v: Vec3Def) -> Self {
        Vec3::new(v.x, v.y, v.z)
    }
}

fn default_component() -> f32 {
    1.0
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug)]
pub struct ColorDef {
    #[serde(default = "default_component")]
    pub r: f32,
    #[serde(default = "default_component")]
    pub g: f32,
    #[serde(default = "default_component")]
    pub b: f32,
}

impl Default for ColorDef {
    fn default() -> Self {
        Self {
            r: 1.0,
            g: 1.0,
            b: 1.0,
        }
    }
}

impl From<ColorDef> for Color {
    fn from(c: ColorDef) -> Self {
        Color::srgb(c.r, c.g, c.b)
    }
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct SpawnRequest {
    pub object_name: String,
    pub position: Vec3Def,
    #[serde(default = "Vec3Def::one")]
    pub scale: Vec3Def,
    #[serde(default)]
    pub color: Option<ColorDef>,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct LightingRequest {
    pub preset: String,
}

fn default_duration() -> f32 {
    10.0
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct SimulationRequest {
    pub robot_name: String,
    pub target_name: String,
    #[serde(default = "default_duration")]
    pub duration: f32,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct QueryRequest {
    pub object_name: String,
}
