//! Application states: one screen each, with its own asset cycle, camera and
//! input handling.

pub mod in_game;
pub mod main_menu;

pub use in_game::InGameState;
pub use main_menu::MainMenuState;

use cgmath::Point2;
use winit::{event::MouseButton, keyboard::KeyCode};

use crate::{
    camera::{Camera, OrthographicCamera},
    error::{GameError, GameResult},
    game::Services,
    input::{InputEvent, PointerId},
    loader::AssetsLoadedListener,
    rect::Rectangle,
    renderer::SpriteBatch,
    viewport::Viewport,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameStateId {
    MainMenu,
    InGame,
    Quit,
}

/// What a state asks of the game core after handling input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateSignal {
    Transition(GameStateId),
    Exit,
}

pub trait BaseState: AssetsLoadedListener {
    fn id(&self) -> GameStateId;

    /// Fails with `InvalidState` until the state's assets are resident.
    fn render(&mut self, delta: f32, batch: &mut dyn SpriteBatch) -> GameResult<()>;

    fn dispose(&mut self, services: &mut Services) -> GameResult<()>;

    fn is_ready(&self) -> bool;

    fn base(&self) -> &StateBase;
    fn base_mut(&mut self) -> &mut StateBase;

    fn touch_down(&mut self, screen_x: f32, screen_y: f32, pointer: PointerId, button: MouseButton) -> bool;
    fn touch_up(&mut self, screen_x: f32, screen_y: f32, pointer: PointerId, button: MouseButton) -> bool;
    fn touch_dragged(&mut self, screen_x: f32, screen_y: f32, pointer: PointerId) -> bool;
    fn key_down(&mut self, keycode: KeyCode) -> bool;

    fn is_enabled(&self) -> bool {
        self.base().enabled
    }

    fn on_state_enabled(&mut self) {
        self.base_mut().enabled = true;
    }

    fn on_state_disabled(&mut self) {
        self.base_mut().enabled = false;
    }

    fn take_signal(&mut self) -> Option<StateSignal> {
        self.base_mut().signal.take()
    }

    fn handle_input(&mut self, event: InputEvent) -> bool {
        match event {
            InputEvent::TouchDown { x, y, pointer, button } => self.touch_down(x, y, pointer, button),
            InputEvent::TouchUp { x, y, pointer, button } => self.touch_up(x, y, pointer, button),
            InputEvent::TouchDragged { x, y, pointer } => self.touch_dragged(x, y, pointer),
            InputEvent::KeyDown(keycode) => self.key_down(keycode),
        }
    }
}

/// Data every state carries: the enabled flag, a pixel-perfect camera over
/// the framebuffer and the window viewport touches arrive in.
pub struct StateBase {
    pub enabled: bool,
    pub camera: OrthographicCamera,
    pub viewport: Viewport,
    pub signal: Option<StateSignal>,
    framebuffer: (u32, u32),
}

impl StateBase {
    pub fn new(services: &Services) -> GameResult<Self> {
        let config = &services.config;
        let (width, height) = (config.framebuffer_width, config.framebuffer_height);
        if width == 0 || height == 0 {
            return Err(GameError::Configuration(format!(
                "framebuffer size must be positive, got {}x{}",
                width, height
            )));
        }

        Ok(Self {
            enabled: false,
            camera: OrthographicCamera::pixel_perfect(width, height),
            viewport: services.screen,
            signal: None,
            framebuffer: (width, height),
        })
    }

    pub fn unproject_touch(&self, screen_x: f32, screen_y: f32) -> Option<Point2<f32>> {
        self.camera.unproject(screen_x, screen_y, &self.viewport)
    }

    /// The framebuffer in world coordinates.
    pub fn world_area(&self) -> Rectangle {
        let (width, height) = (self.framebuffer.0 as f32, self.framebuffer.1 as f32);
        Rectangle::new(-width / 2.0, -height / 2.0, width, height)
    }
}
