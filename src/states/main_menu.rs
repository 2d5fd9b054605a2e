use std::rc::Rc;

use winit::{event::MouseButton, keyboard::KeyCode};

use crate::{
    camera::Camera,
    effects::ScrollingBackground,
    error::{GameError, GameResult},
    game::Services,
    gui::{TextButton, TextButtonStyle},
    handles::AssetKind,
    input::{is_cancel_key, PointerId},
    loader::{AssetsLoadedListener, AsyncAssetLoader, ListenerId},
    rect::Rectangle,
    renderer::{Color, SpriteBatch},
    resources::Font,
    textures::{NinePatch, Texture, TextureRegion},
};

use super::{BaseState, GameStateId, StateBase, StateSignal};

pub const BUTTON_ENABLED_TEXTURE: &str = "data/gfx/gui/Anonymous_Pill_Button_Yellow.png";
pub const BUTTON_DISABLED_TEXTURE: &str = "data/gfx/gui/Anonymous_Pill_Button_Cyan.png";
pub const BUTTON_PRESSED_TEXTURE: &str = "data/gfx/gui/Anonymous_Pill_Button_Blue.png";
pub const BUTTON_FONT: &str = "data/fonts/d-puntillas-B-to-tiptoe.ttf";
pub const BACKGROUND_TEXTURE: &str = "data/gfx/textures/grass.png";

const PATCH_LEFT: u32 = 49;
const PATCH_RIGHT: u32 = 49;
const PATCH_TOP: u32 = 45;
const PATCH_BOTTOM: u32 = 45;
const BUTTON_SPACING: f32 = 10.0;

/// A button plus its touch tracking. At most one control on the menu is
/// pressed at a time.
struct MenuControl {
    button: TextButton,
    bbox: Rectangle,
    touched: bool,
    pointer: Option<PointerId>,
    target: GameStateId,
}

impl MenuControl {
    fn new(button: TextButton, target: GameStateId) -> Self {
        Self {
            bbox: button.bounds(),
            button,
            touched: false,
            pointer: None,
            target,
        }
    }

    fn place(&mut self, x: f32, y: f32) {
        self.button.set_position(x, y);
        self.bbox.set_position(x, y);
    }

    fn press(&mut self, pointer: PointerId) {
        self.button.set_checked(true);
        self.touched = true;
        self.pointer = Some(pointer);
    }

    fn release(&mut self) {
        self.button.set_checked(false);
        self.touched = false;
        self.pointer = None;
    }
}

struct MenuTextures {
    enabled: Texture,
    disabled: Texture,
    pressed: Texture,
}

pub struct MainMenuState {
    base: StateBase,
    listener: Option<ListenerId>,
    assets_loaded: bool,
    disposed: bool,

    button_font: Font,
    background: ScrollingBackground,
    textures: Option<MenuTextures>,
    // Index 0 is start, index 1 is quit.
    controls: Vec<MenuControl>,
}

impl MainMenuState {
    pub const START: usize = 0;
    pub const QUIT: usize = 1;

    pub fn new(services: &mut Services) -> GameResult<Self> {
        let base = StateBase::new(services)?;

        let button_font = match services.fonts.get_instance().load_font(BUTTON_FONT) {
            Ok(font) => font,
            Err(e) => {
                services.fonts.free_instance();
                return Err(e);
            }
        };

        let (background, listener) = match Self::queue_assets(services.loaders.get_instance()) {
            Ok(queued) => queued,
            Err(e) => {
                services.loaders.free_instance();
                services.fonts.free_instance();
                return Err(e);
            }
        };

        log::info!("Main menu created");
        Ok(Self {
            base,
            listener: Some(listener),
            assets_loaded: false,
            disposed: false,
            button_font,
            background,
            textures: None,
            controls: Vec::new(),
        })
    }

    fn queue_assets(loader: &mut AsyncAssetLoader) -> GameResult<(ScrollingBackground, ListenerId)> {
        loader.add_asset_to_load(BUTTON_ENABLED_TEXTURE, AssetKind::Texture)?;
        loader.add_asset_to_load(BUTTON_DISABLED_TEXTURE, AssetKind::Texture)?;
        loader.add_asset_to_load(BUTTON_PRESSED_TEXTURE, AssetKind::Texture)?;
        let background = ScrollingBackground::new(BACKGROUND_TEXTURE, loader)?;
        let listener = loader.register_listener()?;
        Ok((background, listener))
    }

    pub fn button(&self, index: usize) -> Option<&TextButton> {
        self.controls.get(index).map(|c| &c.button)
    }

    pub fn button_bounds(&self, index: usize) -> Option<Rectangle> {
        self.controls.get(index).map(|c| c.bbox)
    }

    pub fn is_pressed(&self, index: usize) -> bool {
        self.controls.get(index).map_or(false, |c| c.touched)
    }

    pub fn touch_pointer(&self, index: usize) -> Option<PointerId> {
        self.controls.get(index).and_then(|c| c.pointer)
    }

    pub fn set_button_disabled(&mut self, index: usize, disabled: bool) {
        if let Some(control) = self.controls.get_mut(index) {
            control.button.set_disabled(disabled);
        }
    }

    fn build_controls(&mut self, textures: &MenuTextures) {
        let patch = |texture: &Texture| {
            NinePatch::new(
                TextureRegion::whole(texture),
                PATCH_LEFT,
                PATCH_RIGHT,
                PATCH_TOP,
                PATCH_BOTTOM,
            )
        };

        let style = Rc::new(TextButtonStyle {
            font: self.button_font.clone(),
            up: patch(&textures.enabled),
            checked: patch(&textures.pressed),
            disabled: patch(&textures.disabled),
            font_color: Color::BLACK,
            down_font_color: Color::WHITE,
            disabled_font_color: Color::BLACK,
        });

        let mut start = MenuControl::new(
            TextButton::new("Start game", Rc::clone(&style)),
            GameStateId::InGame,
        );
        let mut quit = MenuControl::new(TextButton::new("Quit", style), GameStateId::Quit);

        start.place(-(start.button.width() / 2.0), -(start.button.height() / 2.0));
        quit.place(
            -(quit.button.width() / 2.0),
            (start.button.y() - start.button.height()) - BUTTON_SPACING,
        );

        self.controls = vec![start, quit];
    }
}

impl AssetsLoadedListener for MainMenuState {
    fn listener_id(&self) -> Option<ListenerId> {
        self.listener
    }

    fn on_assets_loaded(&mut self, services: &mut Services) -> GameResult<()> {
        if self.assets_loaded {
            return Err(GameError::invalid_state("main menu assets already loaded"));
        }

        {
            let loader = services.loaders.loaded_instance()?;
            let textures = MenuTextures {
                enabled: loader.get_texture(BUTTON_ENABLED_TEXTURE)?,
                disabled: loader.get_texture(BUTTON_DISABLED_TEXTURE)?,
                pressed: loader.get_texture(BUTTON_PRESSED_TEXTURE)?,
            };
            self.background.on_assets_loaded(loader)?;
            self.build_controls(&textures);
            self.textures = Some(textures);
        }

        self.assets_loaded = true;
        services.loaders.free_instance();
        log::info!("Main menu ready");
        Ok(())
    }
}

impl BaseState for MainMenuState {
    fn id(&self) -> GameStateId {
        GameStateId::MainMenu
    }

    fn render(&mut self, delta: f32, batch: &mut dyn SpriteBatch) -> GameResult<()> {
        if !self.assets_loaded {
            return Err(GameError::invalid_state(
                "attempted to render before assets were loaded",
            ));
        }

        self.background.update(delta);

        batch.clear(Color::WHITE);
        batch.set_projection(self.base.camera.combined());
        batch.begin()?;
        self.background.render(batch, self.base.world_area())?;
        for control in &self.controls {
            control.button.draw(batch);
        }
        batch.end()
    }

    fn dispose(&mut self, services: &mut Services) -> GameResult<()> {
        if self.disposed {
            return Err(GameError::invalid_state("main menu already disposed"));
        }

        if let Some(textures) = self.textures.take() {
            textures.enabled.dispose();
            textures.disabled.dispose();
            textures.pressed.dispose();
        } else {
            // Leaving before the batch resolved: nobody else will consume it.
            services.loaders.free_instance();
        }
        self.background.dispose();
        self.controls.clear();
        services.fonts.free_instance();

        self.disposed = true;
        Ok(())
    }

    fn is_ready(&self) -> bool {
        self.assets_loaded
    }

    fn base(&self) -> &StateBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut StateBase {
        &mut self.base
    }

    fn touch_down(&mut self, screen_x: f32, screen_y: f32, pointer: PointerId, _button: MouseButton) -> bool {
        if !self.assets_loaded {
            return false;
        }
        let Some(point) = self.base.unproject_touch(screen_x, screen_y) else {
            return false;
        };

        let hit = (0..self.controls.len()).find(|&i| {
            let control = &self.controls[i];
            let other_pressed = self
                .controls
                .iter()
                .enumerate()
                .any(|(j, other)| j != i && other.touched);
            !control.button.is_disabled() && control.bbox.contains(point) && !other_pressed
        });

        if let Some(index) = hit {
            self.controls[index].press(pointer);
        }
        true
    }

    fn touch_up(&mut self, screen_x: f32, screen_y: f32, _pointer: PointerId, _button: MouseButton) -> bool {
        if !self.assets_loaded {
            return false;
        }
        let Some(point) = self.base.unproject_touch(screen_x, screen_y) else {
            return false;
        };

        let released = self.controls.iter_mut().find(|control| {
            !control.button.is_disabled() && control.bbox.contains(point) && control.touched
        });

        if let Some(control) = released {
            control.release();
            log::info!("Menu button {:?} activated", control.button.text());
            self.base.signal = Some(StateSignal::Transition(control.target));
        }
        true
    }

    fn touch_dragged(&mut self, screen_x: f32, screen_y: f32, pointer: PointerId) -> bool {
        if !self.assets_loaded {
            return false;
        }
        let Some(point) = self.base.unproject_touch(screen_x, screen_y) else {
            return false;
        };

        let cancelled = self.controls.iter_mut().find(|control| {
            !control.button.is_disabled()
                && control.touched
                && control.pointer == Some(pointer)
                && !control.bbox.contains(point)
        });

        if let Some(control) = cancelled {
            control.release();
        }
        true
    }

    fn key_down(&mut self, keycode: KeyCode) -> bool {
        if is_cancel_key(keycode) {
            self.base.signal = Some(StateSignal::Exit);
            return true;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::{
        config::GameConfig,
        renderer::{DrawCommand, RecordingBatch},
        test_support::{test_config, to_screen, write_game_assets},
    };

    const TIMEOUT: Duration = Duration::from_secs(10);
    const LEFT: MouseButton = MouseButton::Left;

    fn loaded_menu(config: GameConfig) -> (Services, MainMenuState) {
        let mut services = Services::new(config);
        let mut menu = MainMenuState::new(&mut services).unwrap();

        let notified = services
            .loaders
            .instance_mut()
            .unwrap()
            .block_until_resolved(TIMEOUT)
            .unwrap();
        assert_eq!(notified, menu.listener_id());
        menu.on_assets_loaded(&mut services).unwrap();

        (services, menu)
    }

    fn centre_of(menu: &MainMenuState, index: usize) -> (f32, f32) {
        let centre = menu.button_bounds(index).unwrap().center();
        to_screen(centre.x, centre.y)
    }

    #[test]
    fn test_assets_loaded_builds_buttons_and_frees_loader() {
        let dir = tempfile::tempdir().unwrap();
        write_game_assets(dir.path());
        let (services, menu) = loaded_menu(test_config(dir.path()));

        assert!(menu.is_ready());
        assert!(!services.loaders.is_allocated());
        assert_eq!(menu.button(MainMenuState::START).unwrap().text(), "Start game");
        assert_eq!(menu.button(MainMenuState::QUIT).unwrap().text(), "Quit");

        let start = menu.button_bounds(MainMenuState::START).unwrap();
        let quit = menu.button_bounds(MainMenuState::QUIT).unwrap();
        assert!(quit.y + quit.height < start.y);
    }

    #[test]
    fn test_tap_start_emits_single_transition() {
        let dir = tempfile::tempdir().unwrap();
        write_game_assets(dir.path());
        let (_services, mut menu) = loaded_menu(test_config(dir.path()));
        let (x, y) = centre_of(&menu, MainMenuState::START);

        assert!(menu.touch_down(x, y, 0, LEFT));
        assert!(menu.is_pressed(MainMenuState::START));
        assert_eq!(menu.touch_pointer(MainMenuState::START), Some(0));
        assert!(menu.button(MainMenuState::START).unwrap().is_checked());

        assert!(menu.touch_up(x, y, 0, LEFT));
        assert!(!menu.is_pressed(MainMenuState::START));
        assert_eq!(
            menu.take_signal(),
            Some(StateSignal::Transition(GameStateId::InGame))
        );
        assert_eq!(menu.take_signal(), None);

        // A second release with nothing pressed does nothing.
        menu.touch_up(x, y, 0, LEFT);
        assert_eq!(menu.take_signal(), None);
    }

    #[test]
    fn test_tap_quit_targets_quit() {
        let dir = tempfile::tempdir().unwrap();
        write_game_assets(dir.path());
        let (_services, mut menu) = loaded_menu(test_config(dir.path()));
        let (x, y) = centre_of(&menu, MainMenuState::QUIT);

        menu.touch_down(x, y, 3, LEFT);
        menu.touch_up(x, y, 3, LEFT);
        assert_eq!(
            menu.take_signal(),
            Some(StateSignal::Transition(GameStateId::Quit))
        );
    }

    #[test]
    fn test_drag_out_cancels_press() {
        let dir = tempfile::tempdir().unwrap();
        write_game_assets(dir.path());
        let (_services, mut menu) = loaded_menu(test_config(dir.path()));
        let (x, y) = centre_of(&menu, MainMenuState::START);

        menu.touch_down(x, y, 0, LEFT);
        // Dragging a different pointer out leaves the press alone.
        menu.touch_dragged(0.0, 0.0, 7);
        assert!(menu.is_pressed(MainMenuState::START));

        menu.touch_dragged(0.0, 0.0, 0);
        assert!(!menu.is_pressed(MainMenuState::START));
        assert!(!menu.button(MainMenuState::START).unwrap().is_checked());

        menu.touch_up(x, y, 0, LEFT);
        assert_eq!(menu.take_signal(), None);
    }

    #[test]
    fn test_disabled_button_ignores_touches() {
        let dir = tempfile::tempdir().unwrap();
        write_game_assets(dir.path());
        let (_services, mut menu) = loaded_menu(test_config(dir.path()));
        let (x, y) = centre_of(&menu, MainMenuState::START);

        menu.set_button_disabled(MainMenuState::START, true);
        menu.touch_down(x, y, 0, LEFT);
        assert!(!menu.is_pressed(MainMenuState::START));
        menu.touch_up(x, y, 0, LEFT);
        assert_eq!(menu.take_signal(), None);
    }

    #[test]
    fn test_only_one_button_pressed_at_a_time() {
        let dir = tempfile::tempdir().unwrap();
        write_game_assets(dir.path());
        let (_services, mut menu) = loaded_menu(test_config(dir.path()));
        let (sx, sy) = centre_of(&menu, MainMenuState::START);
        let (qx, qy) = centre_of(&menu, MainMenuState::QUIT);

        menu.touch_down(sx, sy, 0, LEFT);
        menu.touch_down(qx, qy, 1, LEFT);

        assert!(menu.is_pressed(MainMenuState::START));
        assert!(!menu.is_pressed(MainMenuState::QUIT));
        assert_eq!(menu.touch_pointer(MainMenuState::QUIT), None);
    }

    #[test]
    fn test_touches_before_load_are_ignored() {
        let dir = tempfile::tempdir().unwrap();
        write_game_assets(dir.path());
        let mut services = Services::new(test_config(dir.path()));
        let mut menu = MainMenuState::new(&mut services).unwrap();

        assert!(!menu.touch_down(960.0, 540.0, 0, LEFT));
        assert!(!menu.touch_dragged(960.0, 540.0, 0));
        assert!(!menu.touch_up(960.0, 540.0, 0, LEFT));
    }

    #[test]
    fn test_cancel_key_requests_exit() {
        let dir = tempfile::tempdir().unwrap();
        write_game_assets(dir.path());
        let (_services, mut menu) = loaded_menu(test_config(dir.path()));

        assert!(!menu.key_down(KeyCode::Space));
        assert_eq!(menu.take_signal(), None);

        assert!(menu.key_down(KeyCode::Escape));
        assert_eq!(menu.take_signal(), Some(StateSignal::Exit));
    }

    #[test]
    fn test_render_requires_loaded_assets() {
        let dir = tempfile::tempdir().unwrap();
        write_game_assets(dir.path());
        let mut services = Services::new(test_config(dir.path()));
        let mut menu = MainMenuState::new(&mut services).unwrap();
        let mut batch = RecordingBatch::new();

        assert!(matches!(
            menu.render(0.016, &mut batch),
            Err(GameError::InvalidState(_))
        ));
        assert!(batch.commands.is_empty());
    }

    #[test]
    fn test_render_draws_background_and_buttons() {
        let dir = tempfile::tempdir().unwrap();
        write_game_assets(dir.path());
        let (_services, mut menu) = loaded_menu(test_config(dir.path()));
        let mut batch = RecordingBatch::new();

        menu.render(0.016, &mut batch).unwrap();
        let commands = batch.take_commands();

        assert_eq!(commands[0], DrawCommand::Clear(Color::WHITE));
        let patches = commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::NinePatch { .. }))
            .count();
        let labels = commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Text { .. }))
            .count();
        assert_eq!((patches, labels), (2, 2));
        assert_eq!(batch.frames(), 1);
    }

    #[test]
    fn test_dispose_releases_everything_once() {
        let dir = tempfile::tempdir().unwrap();
        write_game_assets(dir.path());
        let (mut services, mut menu) = loaded_menu(test_config(dir.path()));
        let font = menu.button_font.clone();

        menu.dispose(&mut services).unwrap();
        assert!(font.is_disposed());
        assert_eq!(services.fonts.ref_count(), 0);

        assert!(matches!(
            menu.dispose(&mut services),
            Err(GameError::InvalidState(_))
        ));
    }

    #[test]
    fn test_dispose_before_load_frees_loader() {
        let dir = tempfile::tempdir().unwrap();
        write_game_assets(dir.path());
        let mut services = Services::new(test_config(dir.path()));
        let mut menu = MainMenuState::new(&mut services).unwrap();
        assert!(services.loaders.is_allocated());

        menu.dispose(&mut services).unwrap();
        assert!(!services.loaders.is_allocated());
    }

    #[test]
    fn test_failed_construction_can_be_retried() {
        let dir = tempfile::tempdir().unwrap();
        let mut services = Services::new(test_config(dir.path()));

        assert!(MainMenuState::new(&mut services).is_err());
        assert_eq!(services.fonts.ref_count(), 0);
        assert!(!services.loaders.is_allocated());

        write_game_assets(dir.path());
        let menu = MainMenuState::new(&mut services).unwrap();
        assert_eq!(services.loaders.instance().unwrap().queued_count(), 4);
        assert!(menu.listener_id().is_some());
    }

    #[test]
    fn test_queueing_failure_releases_loader_and_fonts() {
        let dir = tempfile::tempdir().unwrap();
        write_game_assets(dir.path());
        let mut services = Services::new(test_config(dir.path()));
        services.loaders.get_instance().register_listener().unwrap();

        assert!(matches!(
            MainMenuState::new(&mut services),
            Err(GameError::InvalidState(_))
        ));
        assert!(!services.loaders.is_allocated());
        assert_eq!(services.fonts.ref_count(), 0);

        assert!(MainMenuState::new(&mut services).is_ok());
    }
}
