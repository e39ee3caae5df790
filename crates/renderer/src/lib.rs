//! Rendering support for Skyhawk: cameras, GPU record types, particle shapes and the
//! seams through which simulation code submits draws.

pub mod batcher;
pub mod camera;
pub mod shapes;
pub mod submit;
pub mod texture;
pub mod vertex;

pub use batcher::*;
pub use camera::*;
pub use shapes::*;
pub use submit::*;
pub use texture::*;
pub use vertex::*;
