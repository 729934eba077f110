use bevy::prelude::*;

/// One in-flight pursuit run started by `run_simulation`.
pub struct SimulationRun {
    pub robot: Entity,
    pub target: Entity,
    pub speed: f32,
    pub remaining: f32,
}

impl SimulationRun {
    /// Speed is fixed so the robot arrives right as the run expires.
    pub fn new(robot: Entity, target: Entity, initial_distance: f32, duration: f32) -> Self {
        let duration = duration.max(0.001);
        Self {
            robot,
            target,
            speed: initial_distance / duration,
            remaining: duration,
        }
    }
}

#[derive(Resource, Default)]
pub struct ActiveSimulations(pub Vec<SimulationRun>);

/// Moves `current` toward `target` by at most `step`, clamping at arrival.
pub fn step_toward(current: Vec3, target: Vec3, step: f32) -> Vec3 {
    let offset = target - current;
    let distance = offset.length();
    if distance <= step || distance <= f32::EPSILON {
        target
    } else {
        current + offset / distance * step
    }
}

/// Advances every pursuit run once per tick. Runs end on arrival, on expiry,
/// or when either participant has been despawned.
pub fn tick_simulations(
    time: Res<Time>,
    mut simulations: ResMut<ActiveSimulations>,
    mut transforms: Query<&mut Transform>,
) {
    let dt = time.delta_secs();
    simulations.0.retain_mut(|run| {
        let Ok(target_position) = transforms.get(run.target).map(|t| t.translation) else {
            return false;
        };
        let Ok(mut robot) = transforms.get_mut(run.robot) else {
            return false;
        };
        robot.translation = step_toward(robot.translation, target_position, run.speed * dt);
        run.remaining -= dt;
        run.remaining > 0.0 && robot.translation.distance(target_position) > f32::EPSILON
    });
}
