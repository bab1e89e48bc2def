mod camera;
pub mod demo;
pub mod geometry;
pub mod renderer;
pub mod scene;
pub mod util;

pub use camera::{Camera, CameraError};
pub use renderer::{RenderSettings, render};
pub use scene::{Grid, Scene};
