//! Orbit camera state and the matrices derived from it.
//!
//! `ViewParameters` is the only mutable camera state; input handlers mutate it
//! through `ViewController`, and `ViewController::compute_transform` derives a
//! fresh `CameraTransform` every frame. Nothing caches the eye position across
//! frames.

mod controller;
mod params;
mod transform;
mod viewport;

pub use controller::{ViewController, ViewSettings};
pub use params::{eye_from_spherical, ViewParameters};
pub use transform::{CameraTransform, ProjectionSettings};
pub use viewport::Viewport;
