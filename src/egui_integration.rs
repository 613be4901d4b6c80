use anyhow::Result;
use egui_winit::EventResponse;
use glow::HasContext;
use glutin::display::GlDisplay;
use std::sync::Arc;
use std::time::Duration;

/// Ties egui to a winit window drawn through glow.
pub struct EguiGlue {
    pub ctx: egui::Context,
    winit_state: egui_winit::State,
    gl: Arc<glow::Context>,
    painter: egui_glow::Painter,
    shapes: Vec<egui::epaint::ClippedShape>,
    textures_delta: egui::TexturesDelta,
    pixels_per_point: f32,
}

impl EguiGlue {
    /// The GL context created on `display` must be current on this thread.
    pub fn new(
        window: &winit::window::Window,
        display: &glutin::display::Display,
    ) -> Result<Self> {
        let gl = unsafe {
            glow::Context::from_loader_function_cstr(|s| display.get_proc_address(s))
        };
        let gl = Arc::new(gl);
        let painter = egui_glow::Painter::new(gl.clone(), "", None, false)?;

        let ctx = egui::Context::default();
        let winit_state = egui_winit::State::new(
            ctx.clone(),
            egui::ViewportId::ROOT,
            window,
            None,
            None,
            None,
        );

        Ok(Self {
            ctx,
            winit_state,
            gl,
            painter,
            shapes: Vec::new(),
            textures_delta: Default::default(),
            pixels_per_point: window.scale_factor() as f32,
        })
    }

    pub fn on_window_event(
        &mut self,
        window: &winit::window::Window,
        event: &winit::event::WindowEvent,
    ) -> EventResponse {
        self.winit_state.on_window_event(window, event)
    }

    /// Run one UI pass. Returns how long egui is happy to wait before the next one.
    pub fn run(
        &mut self,
        window: &winit::window::Window,
        build: impl FnMut(&egui::Context),
    ) -> Duration {
        let raw_input = self.winit_state.take_egui_input(window);
        let output = self.ctx.run(raw_input, build);

        self.winit_state
            .handle_platform_output(window, output.platform_output);
        self.shapes = output.shapes;
        self.textures_delta.append(output.textures_delta);
        self.pixels_per_point = output.pixels_per_point;

        output
            .viewport_output
            .get(&egui::ViewportId::ROOT)
            .map(|v| v.repaint_delay)
            .unwrap_or(Duration::MAX)
    }

    /// Clear the framebuffer and paint the last UI pass.
    pub fn paint(&mut self, window: &winit::window::Window) {
        let size = window.inner_size();
        let clear = self.ctx.style().visuals.panel_fill;
        unsafe {
            self.gl.viewport(0, 0, size.width as i32, size.height as i32);
            self.gl.clear_color(
                clear.r() as f32 / 255.0,
                clear.g() as f32 / 255.0,
                clear.b() as f32 / 255.0,
                1.0,
            );
            self.gl.clear(glow::COLOR_BUFFER_BIT);
        }

        let shapes = std::mem::take(&mut self.shapes);
        let textures_delta = std::mem::take(&mut self.textures_delta);
        let meshes = self.ctx.tessellate(shapes, self.pixels_per_point);
        self.painter.paint_and_update_textures(
            [size.width, size.height],
            self.pixels_per_point,
            &meshes,
            &textures_delta,
        );
    }
}

impl Drop for EguiGlue {
    fn drop(&mut self) {
        self.painter.destroy();
    }
}
