use std::path::PathBuf;
use std::time::{Duration, Instant};

use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::PhysicalKey;
use winit::window::{Window, WindowId};

use ceidec_pong::config::{EXIT_FAILURE, EXIT_SUCCESS};
use ceidec_pong::input::{InputEvent, InputTranslator};
use ceidec_pong::renderer::RecordingBatch;
use ceidec_pong::{GameConfig, GameCore, GameResult};

const TITLE: &str = "Ceidec Pong";

struct Timer {
    last_frame: Instant,
    delta_time: f32,
}

impl Timer {
    fn new() -> Timer {
        Timer {
            last_frame: Instant::now(),
            delta_time: 0.0,
        }
    }

    fn update(&mut self) {
        let now = Instant::now();
        self.delta_time = now.duration_since(self.last_frame).as_secs_f32();
        self.last_frame = now;
    }
}

struct App {
    core: GameCore,
    window: Option<Window>,
    window_size: PhysicalSize<u32>,
    input: InputTranslator,
    batch: RecordingBatch,
    timer: Timer,
    exit_code: i32,
}

impl App {
    fn new(core: GameCore, window_size: PhysicalSize<u32>) -> Self {
        Self {
            core,
            window: None,
            window_size,
            input: InputTranslator::new(),
            batch: RecordingBatch::new(),
            timer: Timer::new(),
            exit_code: EXIT_SUCCESS,
        }
    }

    fn dispatch(&mut self, event: Option<InputEvent>) {
        if let Some(event) = event {
            self.core.handle_input(event);
        }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, context: &str, error: impl std::fmt::Display) {
        log::error!("{}: {}", context, error);
        self.exit_code = EXIT_FAILURE;
        event_loop.exit();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let attributes = Window::default_attributes()
            .with_title(TITLE)
            .with_inner_size(self.window_size);

        match event_loop.create_window(attributes) {
            Ok(window) => {
                let size = window.inner_size();
                self.core.resize(size.width, size.height);
                self.window = Some(window);
            }
            Err(e) => self.fail(event_loop, "Failed to create window", e),
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                log::info!("Close requested");
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                self.core.resize(size.width, size.height);
            }
            WindowEvent::CursorMoved { position, .. } => {
                let event = self.input.cursor_moved(position.x as f32, position.y as f32);
                self.dispatch(event);
            }
            WindowEvent::MouseInput { state, button, .. } => {
                let event = self.input.mouse_input(state, button);
                self.dispatch(event);
            }
            WindowEvent::Touch(touch) => {
                let event = self.input.touch(
                    touch.phase,
                    touch.id,
                    touch.location.x as f32,
                    touch.location.y as f32,
                );
                self.dispatch(Some(event));
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(code) = event.physical_key {
                    let event = self.input.key(event.state, code, event.repeat);
                    self.dispatch(event);
                }
            }
            WindowEvent::RedrawRequested => {
                self.timer.update();

                if let Err(e) = self.core.render(self.timer.delta_time, &mut self.batch) {
                    self.fail(event_loop, "Frame failed", e);
                    return;
                }

                let commands = self.batch.take_commands();
                log::trace!("Frame recorded {} draw commands", commands.len());

                if self.core.should_exit() {
                    self.exit_code = self.core.exit_code().unwrap_or(EXIT_SUCCESS);
                    event_loop.exit();
                }
            }
            _ => (),
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = self.window.as_ref() {
            window.request_redraw();
        }
    }
}

fn cli() -> Command {
    Command::new("ceidec_pong")
        .about("A small pong game")
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("FILE")
                .help("RON file with game settings")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("assets")
                .long("assets")
                .value_name("DIR")
                .help("Root directory asset paths are resolved against")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("width")
                .long("width")
                .help("Window width in pixels")
                .value_parser(value_parser!(u32)),
        )
        .arg(
            Arg::new("height")
                .long("height")
                .help("Window height in pixels")
                .value_parser(value_parser!(u32)),
        )
        .arg(
            Arg::new("load-timeout-ms")
                .long("load-timeout-ms")
                .help("How long a headless run waits for an asset batch")
                .value_parser(value_parser!(u64)),
        )
        .arg(
            Arg::new("headless")
                .long("headless")
                .help("Load the main menu, render one frame and exit")
                .action(ArgAction::SetTrue),
        )
}

fn build_config(matches: &ArgMatches) -> GameResult<GameConfig> {
    let mut config = match matches.get_one::<PathBuf>("config") {
        Some(path) => GameConfig::load(path)?,
        None => GameConfig::default(),
    };

    if let Some(assets) = matches.get_one::<PathBuf>("assets") {
        config.assets_root = assets.clone();
    }
    if let Some(width) = matches.get_one::<u32>("width") {
        config.window_width = *width;
    }
    if let Some(height) = matches.get_one::<u32>("height") {
        config.window_height = *height;
    }
    if let Some(timeout) = matches.get_one::<u64>("load-timeout-ms") {
        config.load_timeout_ms = *timeout;
    }

    Ok(config)
}

fn init_logging(debug: bool) {
    let default_filter = if debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();
}

fn run_headless(config: GameConfig) -> GameResult<i32> {
    let timeout = Duration::from_millis(config.load_timeout_ms);
    let mut core = GameCore::new(config)?;
    let mut batch = RecordingBatch::new();

    core.block_until_ready(timeout)?;
    core.render(0.0, &mut batch)?;

    println!(
        "state: {:?}, frames: {}, draw commands: {}",
        core.current_state_id(),
        batch.frames(),
        batch.commands.len()
    );

    core.shutdown()?;
    Ok(EXIT_SUCCESS)
}

fn run_windowed(config: GameConfig) -> GameResult<i32> {
    let window_size = PhysicalSize::new(config.window_width, config.window_height);
    let core = GameCore::new(config)?;

    let event_loop = match EventLoop::new() {
        Ok(event_loop) => event_loop,
        Err(e) => {
            log::error!("Failed to create event loop: {}", e);
            return Ok(EXIT_FAILURE);
        }
    };
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(core, window_size);
    if let Err(e) = event_loop.run_app(&mut app) {
        log::error!("Event loop stopped: {}", e);
        app.exit_code = EXIT_FAILURE;
    }

    app.core.shutdown()?;
    Ok(app.exit_code)
}

fn main() {
    let matches = cli().get_matches();

    let config = match build_config(&matches) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(EXIT_FAILURE);
        }
    };
    init_logging(config.debug);

    let result = if matches.get_flag("headless") {
        run_headless(config)
    } else {
        run_windowed(config)
    };

    let code = match result {
        Ok(code) => code,
        Err(e) => {
            log::error!("{}", e);
            EXIT_FAILURE
        }
    };
    std::process::exit(code);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_overrides_config() {
        let matches = cli().get_matches_from([
            "ceidec_pong",
            "--assets",
            "data",
            "--width",
            "800",
            "--load-timeout-ms",
            "250",
            "--headless",
        ]);
        let config = build_config(&matches).unwrap();

        assert_eq!(config.assets_root, PathBuf::from("data"));
        assert_eq!(config.window_width, 800);
        assert_eq!(config.window_height, GameConfig::default().window_height);
        assert_eq!(config.load_timeout_ms, 250);
        assert!(matches.get_flag("headless"));
    }
}
