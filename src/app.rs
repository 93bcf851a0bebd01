use crate::config::Config;
use omgl::{ClearFlags, Context, SharedContext};
use omgl_math::*;
use prelude_plus::*;
use sdl2::event::{Event, WindowEvent};
use sdl2::keyboard::Keycode;
use sdl2::video::{GLContext, GLProfile, SwapInterval, Window};

/// A window with a current GL context.
pub struct App {
  pub gl: SharedContext,
  pub window: Window,
  pub event_pump: sdl2::EventPump,
  _sdl_gl_ctx: GLContext,
  _video_subsystem: sdl2::VideoSubsystem,
  _sdl_context: sdl2::Sdl,
}

impl fmt::Debug for App {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("App").field("gl", &self.gl).field("window", &self.window.id()).finish_non_exhaustive()
  }
}

/// Timing of the frame being drawn.
#[derive(Debug, Copy, Clone)]
pub struct Frame {
  pub delta_time: f32,
  pub time: f32,
  pub aspect: f32,
}

impl App {
  pub fn init(config: &Config) -> AnyResult<Self> {
    let sdl_context = sdl2::init().map_err(AnyError::msg).context("failed to initialize SDL")?;
    let video_subsystem = sdl_context.video().map_err(AnyError::msg)?;

    let gl_attr = video_subsystem.gl_attr();
    gl_attr.set_context_profile(GLProfile::Core);
    gl_attr.set_context_version(config.gl_version.0, config.gl_version.1);
    gl_attr.set_context_flags().debug().forward_compatible().set();
    gl_attr.set_depth_size(24);

    let window = video_subsystem
      .window(&config.window_title, config.window_size.x, config.window_size.y)
      .resizable()
      .opengl()
      .allow_highdpi()
      .build()?;

    let sdl_gl_ctx = window.gl_create_context().map_err(AnyError::msg).context("failed to create a GL context")?;
    ensure!(
      gl_attr.context_version() >= config.gl_version,
      "got a GL {:?} context instead of {:?}",
      gl_attr.context_version(),
      config.gl_version,
    );

    let swap_interval = if config.vsync { SwapInterval::VSync } else { SwapInterval::Immediate };
    if let Err(err) = video_subsystem.gl_set_swap_interval(swap_interval) {
      warn!("failed to set the swap interval: {}", err);
    }

    let gl = Rc::new(Context::load_with(|name| video_subsystem.gl_get_proc_address(name) as *const c_void));
    let event_pump = sdl_context.event_pump().map_err(AnyError::msg)?;

    let app = Self {
      gl,
      window,
      event_pump,
      _sdl_gl_ctx: sdl_gl_ctx,
      _video_subsystem: video_subsystem,
      _sdl_context: sdl_context,
    };
    app.reset_viewport();
    app.gl.set_clear_color(config.clear_color);
    Ok(app)
  }

  pub fn aspect(&self) -> f32 {
    let (w, h) = self.window.drawable_size();
    w as f32 / h.max(1) as f32
  }

  fn reset_viewport(&self) {
    let (w, h) = self.window.drawable_size();
    self.gl.set_viewport(vec2(0, 0), vec2(w as i32, h as i32));
  }

  /// Calls `draw` once per frame on a cleared framebuffer until the window is
  /// closed or Escape is pressed.
  pub fn run<F>(&mut self, mut draw: F) -> AnyResult<()>
  where
    F: FnMut(&SharedContext, Frame) -> AnyResult<()>,
  {
    let start_time = Instant::now();
    let mut prev_time = start_time;
    'game_loop: loop {
      let mut resized = false;
      for event in self.event_pump.poll_iter() {
        match event {
          Event::Quit { .. } | Event::KeyUp { keycode: Some(Keycode::Escape), .. } => {
            break 'game_loop;
          }
          Event::Window { win_event: WindowEvent::SizeChanged(..), .. } => resized = true,
          _ => {}
        }
      }
      if resized {
        self.reset_viewport();
      }

      let current_time = Instant::now();
      let frame = Frame {
        delta_time: (current_time - prev_time).as_secs_f32(),
        time: (current_time - start_time).as_secs_f32(),
        aspect: self.aspect(),
      };
      prev_time = current_time;

      self.gl.clear(ClearFlags::COLOR | ClearFlags::DEPTH);
      draw(&self.gl, frame)?;
      self.window.gl_swap_window();
    }
    Ok(())
  }
}
