pub use tessera_render as render;
pub use tessera_render::{Camera2D, Color, Context, Primitive2D, ShaderProgram, Texture};

pub mod math {
    pub use tessera_render::math::*;
}

#[cfg(feature = "text")]
pub mod text {
    pub use tessera_text::{BmFont, Font, FontError, Text, layout};
}

#[cfg(feature = "physics")]
pub mod physics {
    pub use tessera_physics::*;
}

#[cfg(feature = "windowing")]
pub mod app {
    pub use tessera_app::{AppConfig, AppError, ConfigError};
    pub use tessera_glue::{App, CameraMouseController, Frame, Setup};
}

#[cfg(feature = "windowing")]
pub mod input {
    pub use tessera_app::input::{Input, KeyCode, MouseButton};
    pub use tessera_app::{
        Axis, Button, ButtonStates, ControllerMapping, GameController, JoystickController,
        JoystickSnapshot, JoystickSource, KeyboardController,
    };
}

#[cfg(feature = "windowing")]
pub mod time {
    pub use tessera_app::time::{FpsCounter, FrameTimer};
}
