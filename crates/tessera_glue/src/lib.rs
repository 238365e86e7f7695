pub mod app;
pub mod camera_controller;

pub use app::{App, Frame, Setup};
pub use camera_controller::CameraMouseController;
