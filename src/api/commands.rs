use bevy::prelude::*;
use crossbeam_channel::Receiver;

use super::types::{ApiResponse, LightingRequest, QueryRequest, SimulationRequest, SpawnRequest};

pub type Responder = tokio::sync::oneshot::Sender<ApiResponse>;

/// Commands sent from the HTTP thread to the Bevy update loop. Each carries
/// the oneshot the waiting handler completes with the acknowledgment.
pub enum ApiCommand {
    Spawn(SpawnRequest, Responder),
    ClearScene(Responder),
    SetLighting(LightingRequest, Responder),
    CaptureVision(Responder),
    RunSimulation(SimulationRequest, Responder),
    GetObjectPosition(QueryRequest, Responder),
    ListAllObjects(Responder),
}

#[derive(Resource)]
pub struct ApiChannels {
    pub receiver: Receiver<ApiCommand>,
}
