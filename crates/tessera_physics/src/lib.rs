pub mod data;
pub mod debug_draw;
pub mod scene;

use tessera_render::AssetLoadError;
use thiserror::Error;

pub use data::{PropertyValue, Vector, WorldData};
pub use debug_draw::{DebugColors, DebugDraw};
pub use scene::{BodyState, Fixture, FixtureShape, PhysicsScene};

pub use rapier2d;

#[derive(Debug, Error)]
pub enum SceneError {
    #[error(transparent)]
    Asset(#[from] AssetLoadError),
    #[error("invalid scene json: {0}")]
    Json(#[from] serde_json::Error),
}
