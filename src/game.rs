use std::time::Duration;

use crate::{
    config::{GameConfig, EXIT_SUCCESS},
    error::GameResult,
    input::InputEvent,
    loader::{AssetLoaderService, ListenerId},
    renderer::SpriteBatch,
    resources::FontManagerService,
    states::{BaseState, GameStateId, InGameState, MainMenuState, StateSignal},
    viewport::Viewport,
};

/// Session-wide services handed to states and initializers by reference.
pub struct Services {
    pub config: GameConfig,
    pub loaders: AssetLoaderService,
    pub fonts: FontManagerService,
    pub screen: Viewport,
}

impl Services {
    pub fn new(config: GameConfig) -> Self {
        Self {
            loaders: AssetLoaderService::new(&config.assets_root),
            fonts: FontManagerService::new(&config.assets_root),
            screen: Viewport::from_size(config.window_width, config.window_height),
            config,
        }
    }
}

/// Owns the services and the active state, and drives them once per frame.
pub struct GameCore {
    services: Services,
    state: Option<Box<dyn BaseState>>,
    exit_code: Option<i32>,
}

impl GameCore {
    pub fn new(config: GameConfig) -> GameResult<Self> {
        let mut core = Self {
            services: Services::new(config),
            state: None,
            exit_code: None,
        };
        core.switch_to(GameStateId::MainMenu)?;
        Ok(core)
    }

    pub fn services(&self) -> &Services {
        &self.services
    }

    pub fn state(&self) -> Option<&dyn BaseState> {
        self.state.as_deref()
    }

    pub fn state_mut(&mut self) -> Option<&mut (dyn BaseState + 'static)> {
        self.state.as_deref_mut()
    }

    pub fn current_state_id(&self) -> Option<GameStateId> {
        self.state.as_ref().map(|s| s.id())
    }

    pub fn exit_code(&self) -> Option<i32> {
        self.exit_code
    }

    pub fn should_exit(&self) -> bool {
        self.exit_code.is_some()
    }

    /// Polls the loader and hands a resolved batch to its listener.
    pub fn update(&mut self) -> GameResult<()> {
        let Some(loader) = self.services.loaders.instance_mut() else {
            return Ok(());
        };

        let notified = match loader.update() {
            Ok(notified) => notified,
            Err(e) => {
                log::error!("Asset loading failed: {}", e);
                return Err(e);
            }
        };
        self.dispatch(notified)
    }

    /// Waits for the pending batch, if any, and dispatches it. Headless runs
    /// use this instead of spinning on `update`.
    pub fn block_until_ready(&mut self, timeout: Duration) -> GameResult<()> {
        let Some(loader) = self.services.loaders.instance_mut() else {
            return Ok(());
        };

        let notified = loader.block_until_resolved(timeout)?;
        self.dispatch(notified)
    }

    pub fn render(&mut self, delta: f32, batch: &mut dyn SpriteBatch) -> GameResult<()> {
        self.update()?;

        if let Some(state) = self.state.as_mut() {
            if state.is_ready() {
                state.render(delta, batch)?;
            }
        }

        self.apply_signal()
    }

    pub fn handle_input(&mut self, event: InputEvent) -> bool {
        match self.state.as_mut() {
            Some(state) if state.is_enabled() => state.handle_input(event),
            _ => false,
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.services.screen = Viewport::from_size(width, height);
        if let Some(state) = self.state.as_mut() {
            state.base_mut().viewport = self.services.screen;
        }
    }

    pub fn switch_to(&mut self, id: GameStateId) -> GameResult<()> {
        self.dispose_current()?;

        let mut next: Box<dyn BaseState> = match id {
            GameStateId::MainMenu => Box::new(MainMenuState::new(&mut self.services)?),
            GameStateId::InGame => Box::new(InGameState::new(&mut self.services)?),
            GameStateId::Quit => {
                self.exit_code = Some(EXIT_SUCCESS);
                return Ok(());
            }
        };

        next.on_state_enabled();
        log::info!("Entered state {:?}", id);
        self.state = Some(next);
        Ok(())
    }

    pub fn shutdown(&mut self) -> GameResult<()> {
        self.dispose_current()?;
        self.services.loaders.free_instance();
        Ok(())
    }

    fn apply_signal(&mut self) -> GameResult<()> {
        let Some(signal) = self.state.as_mut().and_then(|s| s.take_signal()) else {
            return Ok(());
        };

        match signal {
            StateSignal::Transition(id) => self.switch_to(id),
            StateSignal::Exit => {
                log::info!("Exit requested");
                self.dispose_current()?;
                self.exit_code = Some(EXIT_SUCCESS);
                Ok(())
            }
        }
    }

    fn dispatch(&mut self, notified: Option<ListenerId>) -> GameResult<()> {
        let Some(listener) = notified else {
            return Ok(());
        };

        match self.state.as_mut() {
            Some(state) if state.listener_id() == Some(listener) => {
                state.on_assets_loaded(&mut self.services)
            }
            _ => {
                log::warn!("No consumer for loader listener {:?}", listener);
                Ok(())
            }
        }
    }

    fn dispose_current(&mut self) -> GameResult<()> {
        if let Some(mut state) = self.state.take() {
            state.on_state_disabled();
            state.dispose(&mut self.services)?;
            log::info!("Left state {:?}", state.id());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use winit::{event::MouseButton, keyboard::KeyCode};

    use super::*;
    use crate::{
        error::GameError,
        renderer::RecordingBatch,
        resources::{test_font, BASE_FONT_SIZE},
        test_support::{test_config, to_screen, write_game_assets},
    };

    const TIMEOUT: Duration = Duration::from_secs(10);

    fn tap(core: &mut GameCore, (x, y): (f32, f32)) {
        let button = MouseButton::Left;
        core.handle_input(InputEvent::TouchDown { x, y, pointer: 0, button });
        core.handle_input(InputEvent::TouchUp { x, y, pointer: 0, button });
    }

    fn press_key(core: &mut GameCore, keycode: KeyCode) {
        core.handle_input(InputEvent::KeyDown(keycode));
    }

    // The start button is centred on the origin and quit sits one button
    // height plus spacing below it.
    fn start_button() -> (f32, f32) {
        to_screen(0.0, 0.0)
    }

    fn quit_button() -> (f32, f32) {
        let height = test_font(BASE_FONT_SIZE).line_height() + 90.0;
        to_screen(0.0, -height - 10.0)
    }

    fn ready_core(dir: &std::path::Path) -> GameCore {
        write_game_assets(dir);
        let mut core = GameCore::new(test_config(dir)).unwrap();
        core.block_until_ready(TIMEOUT).unwrap();
        core
    }

    #[test]
    fn test_starts_in_main_menu() {
        let dir = tempfile::tempdir().unwrap();
        write_game_assets(dir.path());
        let mut core = GameCore::new(test_config(dir.path())).unwrap();

        assert_eq!(core.current_state_id(), Some(GameStateId::MainMenu));
        assert!(!core.state().unwrap().is_ready());
        assert!(core.state().unwrap().is_enabled());

        // Nothing is drawn until the batch resolves.
        let mut batch = RecordingBatch::new();
        core.render(0.0, &mut batch).unwrap();
        if !core.state().unwrap().is_ready() {
            assert!(batch.commands.is_empty());
        }

        core.block_until_ready(TIMEOUT).unwrap();
        assert!(core.state().unwrap().is_ready());
        assert!(!core.services().loaders.is_allocated());
    }

    #[test]
    fn test_full_session() {
        let dir = tempfile::tempdir().unwrap();
        let mut core = ready_core(dir.path());
        let mut batch = RecordingBatch::new();

        tap(&mut core, start_button());
        core.render(0.016, &mut batch).unwrap();
        assert_eq!(core.current_state_id(), Some(GameStateId::InGame));
        assert_eq!(core.services().fonts.ref_count(), 0);

        core.block_until_ready(TIMEOUT).unwrap();
        core.render(0.016, &mut batch).unwrap();
        assert!(core.state().unwrap().is_ready());

        press_key(&mut core, KeyCode::Escape);
        core.render(0.016, &mut batch).unwrap();
        assert_eq!(core.current_state_id(), Some(GameStateId::MainMenu));

        core.block_until_ready(TIMEOUT).unwrap();
        tap(&mut core, quit_button());
        core.render(0.016, &mut batch).unwrap();

        assert!(core.should_exit());
        assert_eq!(core.exit_code(), Some(EXIT_SUCCESS));
        assert!(core.state().is_none());
        core.shutdown().unwrap();
    }

    #[test]
    fn test_cancel_in_menu_exits() {
        let dir = tempfile::tempdir().unwrap();
        let mut core = ready_core(dir.path());

        press_key(&mut core, KeyCode::Escape);
        core.render(0.016, &mut RecordingBatch::new()).unwrap();

        assert_eq!(core.exit_code(), Some(EXIT_SUCCESS));
        assert!(core.state().is_none());
        assert!(!core.handle_input(InputEvent::KeyDown(KeyCode::Escape)));
    }

    #[test]
    fn test_load_failure_is_reported_once() {
        let dir = tempfile::tempdir().unwrap();
        write_game_assets(dir.path());
        std::fs::remove_file(dir.path().join(crate::states::main_menu::BACKGROUND_TEXTURE)).unwrap();
        let mut core = GameCore::new(test_config(dir.path())).unwrap();

        assert!(matches!(
            core.block_until_ready(TIMEOUT),
            Err(GameError::LoadFailed { .. })
        ));
        core.update().unwrap();
        assert!(!core.state().unwrap().is_ready());
    }

    #[test]
    fn test_resize_updates_state_viewport() {
        let dir = tempfile::tempdir().unwrap();
        write_game_assets(dir.path());
        let mut core = GameCore::new(test_config(dir.path())).unwrap();

        core.resize(800, 600);
        assert_eq!(core.services().screen, Viewport::from_size(800, 600));
        assert_eq!(core.state().unwrap().base().viewport, Viewport::from_size(800, 600));
    }

    #[test]
    fn test_zero_framebuffer_is_a_configuration_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = test_config(dir.path());
        config.framebuffer_height = 0;

        assert!(matches!(
            GameCore::new(config),
            Err(GameError::Configuration(_))
        ));
    }
}
