use std::{error::Error, sync::Arc};

#[cfg(feature = "text")]
use std::path::PathBuf;
#[cfg(feature = "text")]
use tessera_text::{Font, Text};

use tessera_app::{
    AppConfig, AppError, AppHandler, AppRunner, Window, input::Input, time::FrameTimer,
};
use tessera_render::{Camera2D, Color, Context, GraphicsDevice, Renderer};

/// Everything a frame callback may touch
///
/// `world` uses the camera built from the app settings, `ui` a fixed
/// top-left camera in window pixels. Both share one device: after drawing
/// immediately into one, call `reset_bindings` on the other before drawing
/// immediately into it.
pub struct Frame<'a> {
    pub gpu: &'a mut Renderer,
    pub world: &'a mut Context,
    pub ui: &'a mut Context,
    pub input: &'a Input,
    pub timer: &'a FrameTimer,
}

impl Frame<'_> {
    /// Surface size in pixels
    pub fn screen_size(&self) -> (f32, f32) {
        self.gpu.surface_size()
    }
}

/// Handed to the setup closure once the GPU is ready
pub struct Setup<'a> {
    pub gpu: &'a mut Renderer,
    pub world: &'a mut Context,
    pub ui: &'a mut Context,
}

type SetupFn<S> = dyn FnMut(&mut Setup) -> Result<S, Box<dyn Error>>;
type FrameFn<S> = dyn FnMut(&mut S, &mut Frame);

/// Resources living as long as the window
#[doc(hidden)]
pub struct Stage<S> {
    renderer: Renderer,
    world: Context,
    ui: Context,
    #[cfg(feature = "text")]
    fps_text: Option<(Font, Text)>,
    state: S,
}

/// A window with a renderer, a world & a UI context, & an optional FPS readout
///
/// Each frame runs: update, render, FPS text, UI context, world context, present.
/// Contexts are emptied after they render.
pub struct App<S> {
    config: AppConfig,
    centered: bool,
    clear_color: Color,
    #[cfg(feature = "text")]
    font: Option<PathBuf>,
    setup: Box<SetupFn<S>>,
    update: Option<Box<FrameFn<S>>>,
    render: Option<Box<FrameFn<S>>>,
    on_quit: Option<Box<dyn FnMut()>>,
}

impl<S: 'static> App<S> {
    /// Create a new [`App`] whose state is built by `setup` once the window exists
    ///
    /// `setup` runs again if the window is ever recreated
    pub fn new(setup: impl FnMut(&mut Setup) -> Result<S, Box<dyn Error>> + 'static) -> Self {
        Self {
            config: AppConfig::default(),
            centered: false,
            clear_color: Color::BLACK,
            #[cfg(feature = "text")]
            font: None,
            setup: Box::new(setup),
            update: None,
            render: None,
            on_quit: None,
        }
    }

    /// Set application title
    pub fn title(mut self, title: &str) -> Self {
        self.config.title = title.into();
        self
    }

    /// Set window size (width, height in pixels)
    pub fn screen_size(mut self, width: u32, height: u32) -> Self {
        self.config.width = width;
        self.config.height = height;
        self
    }

    /// Enable or disable window resizing (defaults to true)
    pub fn resizable(mut self, resizable: bool) -> Self {
        self.config.resizable = resizable;
        self
    }

    /// Enable or disable vsync
    pub fn vsync(mut self, enabled: bool) -> Self {
        self.config.vsync = enabled;
        self
    }

    /// Put the world origin at the window center instead of the top-left corner
    pub fn centered(mut self, centered: bool) -> Self {
        self.centered = centered;
        self
    }

    pub fn clear_color(mut self, color: Color) -> Self {
        self.clear_color = color;
        self
    }

    /// Show the frame rate in the top-left corner with this `.fnt` font
    #[cfg(feature = "text")]
    pub fn fps_font(mut self, fnt: impl Into<PathBuf>) -> Self {
        self.font = Some(fnt.into());
        self
    }

    /// Called first every frame
    pub fn update(mut self, f: impl FnMut(&mut S, &mut Frame) + 'static) -> Self {
        self.update = Some(Box::new(f));
        self
    }

    /// Called after update; enqueue into the contexts or draw directly
    pub fn render(mut self, f: impl FnMut(&mut S, &mut Frame) + 'static) -> Self {
        self.render = Some(Box::new(f));
        self
    }

    /// Sets a closure to call when the app is quitting
    pub fn on_quit(mut self, f: impl FnMut() + 'static) -> Self {
        self.on_quit = Some(Box::new(f));
        self
    }

    /// Opens the window & runs until it closes
    pub fn run(self) -> Result<(), AppError> {
        let config = self.config.clone();
        AppRunner::new(self, config).run()
    }
}

/// Renders & empties both contexts, then forgets their cached bindings
///
/// Each context only knows what it bound itself, so next frame's immediate
/// draws must bind again.
fn flush_contexts(gpu: &mut impl GraphicsDevice, ui: &mut Context, world: &mut Context) {
    ui.render(gpu);
    ui.erase();
    world.render(gpu);
    world.erase();
    ui.reset_bindings();
    world.reset_bindings();
}

impl<S: 'static> AppHandler<Stage<S>> for App<S> {
    async fn with_resource(&mut self, window: Arc<Window>) -> Result<Stage<S>, AppError> {
        let size = window.inner_size();
        let mut renderer = Renderer::new(size.width, size.height, window)
            .await
            .map_err(AppError::resource)?;
        renderer.set_vsync(self.config.vsync);
        renderer.clear(self.clear_color);

        let (w, h) = renderer.surface_size();
        let mut world = Context::new(Camera2D::new(w, h, 1.0, self.centered, false));
        let mut ui = Context::new(Camera2D::new(w, h, 1.0, false, false));

        #[cfg(feature = "text")]
        let fps_text = match &self.font {
            Some(path) => {
                let font = Font::from_file(&mut renderer, path).map_err(AppError::resource)?;
                let text = Text::new(
                    &mut renderer,
                    &font,
                    "0",
                    glam::vec3(10.0, 10.0, -1.0),
                    glam::vec2(25.0, 25.0),
                    Color::RED,
                );
                Some((font, text))
            }
            None => None,
        };

        let state = (self.setup)(&mut Setup {
            gpu: &mut renderer,
            world: &mut world,
            ui: &mut ui,
        })
        .map_err(AppError::Resource)?;

        Ok(Stage {
            renderer,
            world,
            ui,
            #[cfg(feature = "text")]
            fps_text,
            state,
        })
    }

    fn on_ready(&mut self, _window: &Window, _stage: &mut Stage<S>) {
        #[cfg(target_arch = "wasm32")]
        self.resize(_window.inner_size().width, _window.inner_size().height, _stage);
    }

    fn frame(&mut self, _window: &Window, stage: &mut Stage<S>, input: &Input, timer: &FrameTimer) {
        let Stage {
            renderer,
            world,
            ui,
            state,
            ..
        } = &mut *stage;
        let mut frame = Frame {
            gpu: renderer,
            world,
            ui,
            input,
            timer,
        };

        if let Some(update) = &mut self.update {
            update(state, &mut frame);
        }
        if let Some(render) = &mut self.render {
            render(state, &mut frame);
        }

        #[cfg(feature = "text")]
        if let Some((_, text)) = &mut stage.fps_text {
            text.set_text(&mut stage.renderer, &timer.fps.to_string());
            stage.ui.enqueue(text);
        }

        flush_contexts(&mut stage.renderer, &mut stage.ui, &mut stage.world);

        if let Err(err) = stage.renderer.render_frame() {
            log::warn!("frame dropped: {err}");
        }
    }

    fn resize(&mut self, width: u32, height: u32, stage: &mut Stage<S>) {
        stage.renderer.resize(width, height);
        let (w, h) = (width as f32, height as f32);
        stage.world.camera_mut().set_viewport_size(w, h);
        stage.ui.camera_mut().set_viewport_size(w, h);
    }

    fn on_quit(&mut self) {
        if let Some(f) = &mut self.on_quit {
            f();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use glam::{Vec2, Vec3};
    use tessera_render::{Primitive2D, ShaderProgram, Texture, device::mock::MockDevice};

    use super::*;

    fn textured_quad(gpu: &mut MockDevice, program: &Rc<ShaderProgram>) -> (Primitive2D, Texture) {
        let texture = Texture::empty(gpu, 4, 4).unwrap();
        let mut quad = Primitive2D::quad(gpu, program.clone(), Vec3::ZERO, Vec2::ONE);
        quad.set_texture(Some(texture.handle()));
        (quad, texture)
    }

    #[test]
    fn immediate_draw_rebinds_after_both_contexts_render() {
        // the world's texture is bound last, so the ui must bind its own again
        let mut gpu = MockDevice::new();
        let program = Rc::new(ShaderProgram::default_program(&mut gpu).unwrap());
        let (mut a, a_texture) = textured_quad(&mut gpu, &program);
        let (mut b, _b_texture) = textured_quad(&mut gpu, &program);
        let mut ui = Context::new(Camera2D::new(100.0, 100.0, 1.0, false, false));
        let mut world = Context::new(Camera2D::new(100.0, 100.0, 1.0, true, false));

        ui.enqueue(&mut a);
        world.enqueue(&mut b);
        flush_contexts(&mut gpu, &mut ui, &mut world);
        assert!(ui.is_empty() && world.is_empty());

        gpu.clear();
        a.draw(&mut gpu, &mut ui);
        assert_eq!(gpu.texture_binds(), vec![a_texture.id()]);
        assert_eq!(gpu.program_binds(), 1);
    }
}
