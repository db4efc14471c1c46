//! # NanoPOV Renderer
//!
//! Turns a tiled lattice scene into something a ray tracer can draw: a
//! heuristic camera and light placement framing the device, a
//! renderer-independent [`Scene`], and the POV-Ray text writer.

pub mod camera;
pub mod pov;
pub mod scene;

pub use camera::{guess_camera, Camera, CameraOptions, CameraPlacement, CameraStyle, LightSource};
pub use pov::{to_pov_string, PovWriter};
pub use scene::{HeaderOptions, Scene};
