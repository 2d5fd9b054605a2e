use winit::{event::MouseButton, keyboard::KeyCode};

use crate::{
    camera::Camera,
    components::{
        BoundingBoxComponent, PlayerComponent, PositionComponent, SpriteComponent,
        TextureComponent,
    },
    ecs::{Engine, Entity},
    entities::{EntityInitializer, PongEntityInitializer},
    error::{GameError, GameResult},
    game::Services,
    input::{is_cancel_key, PointerId},
    loader::{AssetsLoadedListener, ListenerId},
    rect::Rectangle,
    renderer::{Color, SpriteBatch},
    textures::TextureRegion,
};

use super::{BaseState, GameStateId, StateBase, StateSignal};

/// The table: a ball and two paddles, the human one following the finger.
pub struct InGameState {
    base: StateBase,
    listener: Option<ListenerId>,
    assets_loaded: bool,
    disposed: bool,

    engine: Engine,
    initializer: PongEntityInitializer,
    drag_pointer: Option<PointerId>,
}

impl InGameState {
    pub fn new(services: &mut Services) -> GameResult<Self> {
        let base = StateBase::new(services)?;
        let mut engine = Engine::new();
        let mut initializer = PongEntityInitializer::new();

        let queued = initializer
            .create_all_entities(&mut engine, &mut services.loaders)
            .and_then(|()| services.loaders.get_instance().register_listener());
        let listener = match queued {
            Ok(listener) => listener,
            Err(e) => {
                services.loaders.free_instance();
                return Err(e);
            }
        };

        Ok(Self {
            base,
            listener: Some(listener),
            assets_loaded: false,
            disposed: false,
            engine,
            initializer,
            drag_pointer: None,
        })
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn initializer(&self) -> &PongEntityInitializer {
        &self.initializer
    }

    pub fn human_paddle(&self) -> Option<Entity> {
        self.initializer.paddles().iter().copied().find(|paddle| {
            self.engine
                .get_component::<PlayerComponent>(*paddle)
                .map_or(false, PlayerComponent::is_human)
        })
    }

    /// Centres the human paddle on `world_y`, kept inside the table.
    fn move_human_paddle(&mut self, world_y: f32) {
        let Some(paddle) = self.human_paddle() else {
            return;
        };
        let Some(height) = self
            .engine
            .get_component::<SpriteComponent>(paddle)
            .map(|sprite| sprite.height)
        else {
            return;
        };

        let area = self.base.world_area();
        let y = (world_y - height / 2.0).clamp(area.y, area.y + area.height - height);

        if let Some(position) = self.engine.get_component_mut::<PositionComponent>(paddle) {
            position.y = y;
        }
        if let Some(bounds) = self.engine.get_component_mut::<BoundingBoxComponent>(paddle) {
            bounds.bbox.y = y;
        }
    }
}

impl AssetsLoadedListener for InGameState {
    fn listener_id(&self) -> Option<ListenerId> {
        self.listener
    }

    fn on_assets_loaded(&mut self, services: &mut Services) -> GameResult<()> {
        self.initializer
            .set_loadable_assets(&mut self.engine, &mut services.loaders)?;
        self.assets_loaded = true;
        log::info!("Game table ready");
        Ok(())
    }
}

impl BaseState for InGameState {
    fn id(&self) -> GameStateId {
        GameStateId::InGame
    }

    fn render(&mut self, _delta: f32, batch: &mut dyn SpriteBatch) -> GameResult<()> {
        if !self.assets_loaded {
            return Err(GameError::invalid_state(
                "attempted to render before assets were loaded",
            ));
        }

        batch.clear(Color::BLACK);
        batch.set_projection(self.base.camera.combined());
        batch.begin()?;
        for entity in self.engine.entities() {
            let (Some(position), Some(sprite), Some(texture)) = (
                self.engine.get_component::<PositionComponent>(entity),
                self.engine.get_component::<SpriteComponent>(entity),
                self.engine.get_component::<TextureComponent>(entity),
            ) else {
                continue;
            };

            if sprite.visible {
                batch.draw_region(
                    &TextureRegion::whole(&texture.texture),
                    Rectangle::new(position.x, position.y, sprite.width, sprite.height),
                );
            }
        }
        batch.end()
    }

    fn dispose(&mut self, services: &mut Services) -> GameResult<()> {
        if self.disposed {
            return Err(GameError::invalid_state("game state already disposed"));
        }

        if self.assets_loaded {
            self.initializer.dispose_assets(&mut self.engine)?;
        } else {
            services.loaders.free_instance();
        }
        self.engine.clear();

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
        if !self.assets_loaded || self.drag_pointer.is_some() {
            return false;
        }
        let Some(point) = self.base.unproject_touch(screen_x, screen_y) else {
            return false;
        };

        // Only the left half of the table steers the human paddle.
        if point.x > 0.0 {
            return false;
        }
        self.drag_pointer = Some(pointer);
        self.move_human_paddle(point.y);
        true
    }

    fn touch_up(&mut self, _screen_x: f32, _screen_y: f32, pointer: PointerId, _button: MouseButton) -> bool {
        if self.drag_pointer != Some(pointer) {
            return false;
        }
        self.drag_pointer = None;
        true
    }

    fn touch_dragged(&mut self, screen_x: f32, screen_y: f32, pointer: PointerId) -> bool {
        if self.drag_pointer != Some(pointer) {
            return false;
        }
        let Some(point) = self.base.unproject_touch(screen_x, screen_y) else {
            return false;
        };
        self.move_human_paddle(point.y);
        true
    }

    fn key_down(&mut self, keycode: KeyCode) -> bool {
        if is_cancel_key(keycode) {
            self.base.signal = Some(StateSignal::Transition(GameStateId::MainMenu));
            return true;
        }
        false
    }
}
