//! Skyhawk: arcade flight presentation layer.
//!
//! Camera rigs (chase and cinematic title), the flight HUD projector, the particle engine,
//! and the scenes that wire them to an aircraft in a `hecs` world.

pub mod aircraft;
pub mod config;
pub mod follow_camera;
pub mod hud;
pub mod particles;
pub mod scene;
pub mod title_camera;

pub use config::GameConfig;
pub use follow_camera::FollowCamera;
pub use hud::FlightHud;
pub use particles::{ParticleEngine, ParticleError};
pub use scene::{Scene, SceneId, SceneManager};
pub use title_camera::{TitleCamera, TitlePhase};
