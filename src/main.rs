use anyhow::{anyhow, Context as _, Result};
use std::num::NonZeroU32;
use std::time::{Duration, Instant};

use glutin::{
    config::{ConfigTemplateBuilder, GlConfig},
    context::{ContextApi, ContextAttributesBuilder, PossiblyCurrentContext},
    display::{GetGlDisplay, GlDisplay},
    prelude::{GlSurface, NotCurrentGlContext},
    surface::{Surface as GlutinSurface, SurfaceAttributesBuilder, WindowSurface},
};
use glutin_winit::DisplayBuilder;
use raw_window_handle::HasWindowHandle;
use winit::{
    application::ApplicationHandler,
    dpi::LogicalSize,
    event::{ElementState, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{Key, NamedKey},
    window::Window,
};

use busymask::config::Config;
use busymask::dispatcher::Dispatcher;
use busymask::egui_integration::EguiGlue;
use busymask::job::{Job, JobEvent};
use busymask::overlay::BusyOverlay;
use busymask::ui::{self, UiAction, UiState};

/// How often to wake up and poll a running job.
const JOB_POLL_INTERVAL: Duration = Duration::from_millis(16);

struct Env {
    gl_surface: GlutinSurface<WindowSurface>,
    gl_context: PossiblyCurrentContext,
    window: Window,
}

struct App {
    // Drops before `env` so the painter goes away while the GL context is alive.
    egui: EguiGlue,
    env: Env,
    dispatcher: Dispatcher,
    overlay: BusyOverlay,
    config: Config,
    ui_state: UiState,
    job: Option<Job>,
    repaint_at: Option<Instant>,
    last_frame: Instant,
}

impl App {
    fn start_job(&mut self) {
        if self.job.is_some() {
            return;
        }
        let duration = Duration::from_millis(self.config.job_duration_ms);
        match Job::start(duration, self.config.job_steps) {
            Ok(job) => {
                self.job = Some(job);
                self.overlay.set_progress_value(0.0);
                self.overlay.set_busy(true);
            }
            Err(e) => log::error!("Failed to start job: {:#}", e),
        }
    }

    fn cancel_job(&mut self) {
        match &self.job {
            // Busy ends when the worker acknowledges.
            Some(job) => job.cancel(),
            None => self.overlay.set_busy(false),
        }
    }

    fn poll_job(&mut self) {
        let Some(job) = self.job.as_mut() else {
            return;
        };
        for event in job.poll() {
            match event {
                JobEvent::Progress(pct) => self.overlay.set_progress_value(pct),
                JobEvent::Finished | JobEvent::Cancelled => self.overlay.set_busy(false),
            }
        }
        if job.is_done() {
            self.job = None;
            // A worker that died without reporting still ends the busy period.
            self.overlay.set_busy(false);
        }
    }

    fn apply_overlay_config(&mut self) {
        let mut overlay_config = self.config.overlay.clone();
        // Progress belongs to the running job, not to the settings.
        overlay_config.progress_value = self.overlay.progress_value();
        self.overlay.apply_config(overlay_config);
        self.egui.ctx.set_zoom_factor(self.config.ui_scale);
    }

    fn process_actions(&mut self, event_loop: &ActiveEventLoop, actions: Vec<UiAction>) {
        for action in actions {
            log::debug!("UI action: {:?}", action);
            match action {
                UiAction::StartJob => self.start_job(),
                UiAction::CancelJob => self.cancel_job(),
                UiAction::SetBusy(busy) => self.overlay.set_busy(busy),
                UiAction::ConfigChanged => self.apply_overlay_config(),
                UiAction::Quit => event_loop.exit(),
            }
        }
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let size = self.env.window.inner_size();
        if size.width == 0 || size.height == 0 {
            return;
        }
        self.last_frame = Instant::now();

        self.poll_job();
        self.dispatcher.run_due(&mut self.egui.ctx);

        let mut actions = Vec::new();
        let job_running = self.job.is_some();
        let pending_tasks = self.dispatcher.pending_count();
        let repaint_delay = self.egui.run(&self.env.window, |ctx| {
            actions = ui::build_ui(
                ctx,
                ui::FrameInputs {
                    ui_state: &mut self.ui_state,
                    overlay: &mut self.overlay,
                    config: &mut self.config,
                    job_running,
                    pending_tasks,
                },
            );
        });
        self.repaint_at = Instant::now().checked_add(repaint_delay);

        self.process_actions(event_loop, actions);

        self.egui.paint(&self.env.window);
        if let Err(e) = self.env.gl_surface.swap_buffers(&self.env.gl_context) {
            log::warn!("swap_buffers failed: {}", e);
        }
    }

    fn next_wake(&self) -> Option<Instant> {
        let job_poll = self
            .job
            .as_ref()
            .map(|_| self.last_frame + JOB_POLL_INTERVAL);
        [self.repaint_at, self.dispatcher.next_deadline(), job_poll]
            .into_iter()
            .flatten()
            .min()
    }
}

fn non_zero(v: u32) -> NonZeroU32 {
    NonZeroU32::new(v).unwrap_or(NonZeroU32::MIN)
}

impl ApplicationHandler for App {
    fn resumed(&mut self, _event_loop: &ActiveEventLoop) {}

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        let response = self.egui.on_window_event(&self.env.window, &event);
        if response.repaint {
            self.env.window.request_redraw();
        }

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),

            WindowEvent::Resized(physical_size) => {
                self.env.gl_surface.resize(
                    &self.env.gl_context,
                    non_zero(physical_size.width),
                    non_zero(physical_size.height),
                );
                self.env.window.request_redraw();
            }

            WindowEvent::KeyboardInput { event, .. } if !response.consumed => {
                if event.state == ElementState::Pressed
                    && event.logical_key == Key::Named(NamedKey::Escape)
                {
                    event_loop.exit();
                }
            }

            WindowEvent::RedrawRequested => self.redraw(event_loop),

            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        match self.next_wake() {
            Some(at) if at <= Instant::now() => {
                self.env.window.request_redraw();
                event_loop.set_control_flow(ControlFlow::Wait);
            }
            Some(at) => event_loop.set_control_flow(ControlFlow::WaitUntil(at)),
            None => event_loop.set_control_flow(ControlFlow::Wait),
        }
    }
}

fn create_env(el: &EventLoop<()>) -> Result<(Env, glutin::display::Display)> {
    let window_attributes = Window::default_attributes()
        .with_inner_size(LogicalSize::new(640.0, 420.0))
        .with_resizable(true)
        .with_title("busymask");

    let template = ConfigTemplateBuilder::new().with_alpha_size(8);
    let display_builder = DisplayBuilder::new().with_window_attributes(Some(window_attributes));
    let (window, gl_config) = display_builder
        .build(el, template, |configs| {
            configs
                .reduce(|accum, config| {
                    if config.num_samples() < accum.num_samples() {
                        config
                    } else {
                        accum
                    }
                })
                .expect("glutin offered no GL configs")
        })
        .map_err(|e| anyhow!("Failed to build GL display: {}", e))?;
    let window = window.context("Could not create window with OpenGL context")?;
    let raw_window_handle = window.window_handle()?.as_raw();

    let display = gl_config.display();
    let context_attributes = ContextAttributesBuilder::new().build(Some(raw_window_handle));
    let fallback_context_attributes = ContextAttributesBuilder::new()
        .with_context_api(ContextApi::Gles(None))
        .build(Some(raw_window_handle));

    let not_current_gl_context = unsafe {
        match display.create_context(&gl_config, &context_attributes) {
            Ok(context) => context,
            Err(_) => display
                .create_context(&gl_config, &fallback_context_attributes)
                .context("Failed to create GL context")?,
        }
    };

    let (width, height): (u32, u32) = window.inner_size().into();
    let attrs = SurfaceAttributesBuilder::<WindowSurface>::new().build(
        raw_window_handle,
        non_zero(width),
        non_zero(height),
    );
    let gl_surface = unsafe {
        display
            .create_window_surface(&gl_config, &attrs)
            .context("Could not create GL window surface")?
    };
    let gl_context = not_current_gl_context
        .make_current(&gl_surface)
        .context("Could not make GL context current")?;

    Ok((
        Env {
            gl_surface,
            gl_context,
            window,
        },
        display,
    ))
}

fn main() -> Result<()> {
    env_logger::init();

    let config = Config::load();
    let el = EventLoop::new()?;
    let (env, display) = create_env(&el)?;
    let egui = EguiGlue::new(&env.window, &display)?;
    egui.ctx.set_zoom_factor(config.ui_scale);

    let dispatcher = Dispatcher::new();
    let mut overlay = BusyOverlay::with_config(dispatcher.clone(), config.overlay.clone());
    overlay.set_focus_target(Some(ui::name_field_id()));
    overlay.set_state_listener(|state, _| log::info!("Overlay is now {}", state.name()));

    let mut app = App {
        egui,
        env,
        dispatcher,
        overlay,
        config,
        ui_state: UiState::default(),
        job: None,
        repaint_at: None,
        last_frame: Instant::now(),
    };

    el.run_app(&mut app)?;
    app.overlay.on_detached();

    Ok(())
}
