pub mod controller;
pub mod input;
pub mod joystick_controller;
pub mod keyboard_controller;
pub mod mappings;
pub mod time;

use crate::{input::Input, time::FrameTimer};
use std::sync::Arc;
use thiserror::Error;
use winit::{
    application::ApplicationHandler,
    error::{EventLoopError, OsError},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop, EventLoopProxy},
    window::WindowId,
};
pub use winit::{event::WindowEvent, window::Window};

pub use controller::{Axis, Button, ButtonStates, GameController};
pub use joystick_controller::{JoystickController, JoystickSnapshot, JoystickSource};
pub use keyboard_controller::KeyboardController;
pub use mappings::ControllerMapping;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("window size must be non-zero, got {width}x{height}")]
    ZeroSize { width: u32, height: u32 },
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("failed to create the event loop: {0}")]
    EventLoop(#[from] EventLoopError),
    #[error("failed to create the window: {0}")]
    Window(#[from] OsError),
    /// Raised by [`AppHandler::with_resource`]
    #[error("failed to create the app resource: {0}")]
    Resource(Box<dyn std::error::Error>),
}

impl AppError {
    pub fn resource(err: impl std::error::Error + 'static) -> Self {
        Self::Resource(Box::new(err))
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub resizable: bool,
    pub vsync: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            title: "Tessera App".to_string(),
            width: 800,
            height: 600,
            resizable: true,
            vsync: true,
        }
    }
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::ZeroSize {
                width: self.width,
                height: self.height,
            });
        }
        Ok(())
    }
}

/// Trait defining application behavior
///
/// Implement this for your app logic. Hooks are called during window creation,
/// every frame, on resize, & before quitting
#[allow(async_fn_in_trait)]
pub trait AppHandler<R> {
    /// Called for every WindowEvent before default input handling
    fn on_window_event(&mut self, _window: &Window, _event: &WindowEvent) {}
    /// Called once the window exists; should create & return the resource
    async fn with_resource(&mut self, window: Arc<Window>) -> Result<R, AppError>;
    /// Called after the resource is initialized & window is ready
    fn on_ready(&mut self, _window: &Window, _resource: &mut R) {}
    /// Called every frame
    fn frame(&mut self, _window: &Window, _resource: &mut R, _input: &Input, _timer: &FrameTimer) {}
    /// Called on window resize
    fn resize(&mut self, _w: u32, _h: u32, _resource: &mut R) {}
    /// Called when the window is requested to close
    fn on_quit(&mut self) {}
}

type Ready<R, H> = (Result<R, AppError>, H);

/// Generic application entry point
///
/// Manages window creation, input, the event loop, & delegating hooks
/// to your `AppHandler`. Errors during startup end the loop & are returned
/// from [`AppRunner::run`]
pub struct AppRunner<R: 'static, H: AppHandler<R> + 'static> {
    handler: Option<H>,
    resource: Option<R>,
    window: Option<Arc<Window>>,
    proxy: Option<EventLoopProxy<Ready<R, H>>>,
    input: Input,
    timer: FrameTimer,
    config: AppConfig,
    error: Option<AppError>,
}

impl<R, H: AppHandler<R> + 'static> AppRunner<R, H> {
    fn fail(&mut self, event_loop: &ActiveEventLoop, err: AppError) {
        log::error!("{err}");
        self.error = Some(err);
        event_loop.exit();
    }
}

#[doc(hidden)]
impl<R, H: AppHandler<R> + 'static> ApplicationHandler<Ready<R, H>> for AppRunner<R, H> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        // Called when window is ready; initializes the resource async (wasm) or sync (native)
        let Some(proxy) = self.proxy.take() else {
            return;
        };
        let win_attrs = {
            use winit::dpi::PhysicalSize;

            #[allow(unused_mut)]
            let mut attrs = Window::default_attributes()
                .with_title(&self.config.title)
                .with_resizable(self.config.resizable)
                .with_inner_size(PhysicalSize::new(self.config.width, self.config.height));

            #[cfg(target_arch = "wasm32")]
            {
                use winit::platform::web::WindowAttributesExtWebSys;
                attrs = attrs.with_append(true);
            }

            #[cfg(not(target_arch = "wasm32"))]
            {
                attrs = attrs.with_visible(false);
            }

            attrs
        };
        let window = match event_loop.create_window(win_attrs) {
            Ok(window) => Arc::new(window),
            Err(err) => return self.fail(event_loop, err.into()),
        };
        self.window = Some(window.clone());
        let Some(mut handler) = self.handler.take() else {
            return;
        };

        #[cfg(target_arch = "wasm32")]
        {
            // Wait for DOM and canvas to be ready before initializing
            wasm_bindgen_futures::spawn_local(async move {
                let resource = handler.with_resource(window).await;
                _ = proxy.send_event((resource, handler));
            });
        }
        #[cfg(not(target_arch = "wasm32"))]
        {
            let resource = pollster::block_on(handler.with_resource(window));
            _ = proxy.send_event((resource, handler));
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _: WindowId, event: WindowEvent) {
        if let (Some(handler), Some(window)) = (&mut self.handler, &self.window) {
            handler.on_window_event(window, &event);
        }

        match event {
            WindowEvent::CloseRequested => {
                if let Some(handler) = &mut self.handler {
                    handler.on_quit();
                }
                event_loop.exit();
            }
            WindowEvent::RedrawRequested => {
                if let (Some(w), Some(r), Some(handler)) = (
                    self.window.as_ref(),
                    self.resource.as_mut(),
                    self.handler.as_mut(),
                ) {
                    self.timer.update();
                    handler.frame(w, r, &self.input, &self.timer);
                    self.input.end_frame();
                }
                if let Some(w) = self.window.as_ref() {
                    w.request_redraw();
                }
            }
            WindowEvent::Resized(size) => {
                if let (Some(r), Some(handler)) = (self.resource.as_mut(), self.handler.as_mut()) {
                    handler.resize(size.width, size.height, r);
                }
            }
            WindowEvent::KeyboardInput { event, .. } => self.input.keyboard(event),
            WindowEvent::MouseInput { button, state, .. } => self.input.mouse(button, state),
            WindowEvent::CursorMoved { position, .. } => self.input.cursor(position),
            WindowEvent::MouseWheel { delta, .. } => self.input.wheel(delta),
            _ => {}
        }
    }

    fn user_event(&mut self, event_loop: &ActiveEventLoop, (resource, handler): Ready<R, H>) {
        self.handler = Some(handler);
        let resource = match resource {
            Ok(resource) => resource,
            Err(err) => return self.fail(event_loop, err),
        };
        self.resource = Some(resource);

        if let (Some(r), Some(h), Some(w)) = (&mut self.resource, &mut self.handler, &self.window) {
            h.on_ready(w, r);

            #[cfg(not(target_arch = "wasm32"))]
            {
                h.frame(w, r, &self.input, &self.timer);
                w.set_visible(true);
            }
        }
    }
}

impl<R, H: AppHandler<R> + 'static> AppRunner<R, H> {
    /// Creates a new runner with the given handler & configuration
    pub fn new(handler: H, config: AppConfig) -> Self {
        Self {
            handler: Some(handler),
            resource: None,
            window: None,
            proxy: None,
            input: Input::default(),
            timer: FrameTimer::default(),
            config,
            error: None,
        }
    }

    /// Starts the app & runs the event loop
    ///
    /// On the web this returns right away; errors there are only logged
    pub fn run(mut self) -> Result<(), AppError> {
        self.config.validate()?;

        let event_loop = EventLoop::<Ready<R, H>>::with_user_event().build()?;
        event_loop.set_control_flow(ControlFlow::Poll);

        self.proxy = Some(event_loop.create_proxy());
        self.start(event_loop)
    }

    #[cfg(target_arch = "wasm32")]
    fn start(self, event_loop: EventLoop<Ready<R, H>>) -> Result<(), AppError> {
        #[cfg(feature = "log")]
        {
            std::panic::set_hook(Box::new(console_error_panic_hook::hook));
            _ = console_log::init_with_level(log::Level::Warn);
        }

        use winit::platform::web::EventLoopExtWebSys;
        wasm_bindgen_futures::spawn_local(async move {
            event_loop.spawn_app(self);
        });
        Ok(())
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn start(mut self, event_loop: EventLoop<Ready<R, H>>) -> Result<(), AppError> {
        #[cfg(feature = "log")]
        {
            let env = env_logger::Env::default().default_filter_or("warn");
            _ = env_logger::Builder::from_env(env).try_init();
        }

        event_loop.run_app(&mut self)?;
        match self.error.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        // 800x600, resizable, vsync on
        let config = AppConfig::default();
        assert_eq!((config.width, config.height), (800, 600));
        assert!(config.resizable && config.vsync);
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn zero_sized_window_is_rejected() {
        // either side at zero fails before any window exists
        let config = AppConfig {
            height: 0,
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::ZeroSize {
                width: 800,
                height: 0
            })
        );
    }

    #[test]
    fn resource_errors_keep_their_message() {
        // the boxed source is displayed in the wrapper
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "no adapter");
        let err = AppError::resource(io);
        assert_eq!(err.to_string(), "failed to create the app resource: no adapter");
    }
}
