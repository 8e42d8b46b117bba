//! wgpu rendering for the sphere field: stencil reflection, projected
//! shadows, HUD overlay and picking.

pub mod camera;
pub mod frame;
pub mod mesh;
pub mod picking;
pub mod pipeline;
pub mod renderer;
pub mod texture;
pub mod vertex;

pub use camera::*;
pub use frame::*;
pub use mesh::*;
pub use picking::*;
pub use pipeline::*;
pub use renderer::*;
pub use texture::*;
pub use vertex::*;
