use crate::{
    components::{
        BoundingBoxComponent, PlayerComponent, PositionComponent, SpriteComponent,
        TextureComponent,
    },
    config::FB_WIDTH,
    ecs::{Engine, Entity},
    error::{GameError, GameResult},
    handles::AssetKind,
    loader::AssetLoaderService,
    rect::Rectangle,
};

use super::{EntityInitializer, InitializerPhase};

pub const BALL_TEXTURE: &str = "data/gfx/textures/ball.png";
pub const PADDLE_TEXTURE: &str = "data/gfx/textures/paddle.png";

const BALL_SIZE: f32 = 64.0;
const PADDLE_WIDTH: f32 = 32.0;
const PADDLE_HEIGHT: f32 = 256.0;
const PADDLE_MARGIN: f32 = 64.0;

/// Builds the ball and the two paddles.
pub struct PongEntityInitializer {
    phase: InitializerPhase,
    ball: Option<Entity>,
    paddles: Vec<Entity>,
}

impl PongEntityInitializer {
    pub fn new() -> Self {
        Self {
            phase: InitializerPhase::Uninitialized,
            ball: None,
            paddles: Vec::new(),
        }
    }

    pub fn ball(&self) -> Option<Entity> {
        self.ball
    }

    pub fn paddles(&self) -> &[Entity] {
        &self.paddles
    }

    fn owned_entities(&self) -> impl Iterator<Item = Entity> + '_ {
        self.ball.iter().chain(self.paddles.iter()).copied()
    }

    fn create_body(
        engine: &mut Engine,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    ) -> GameResult<Entity> {
        let entity = engine.create_entity();

        let mut position: PositionComponent = engine.create_component();
        position.set(x, y);
        engine.add_component(entity, position)?;

        let mut sprite: SpriteComponent = engine.create_component();
        sprite.width = width;
        sprite.height = height;
        engine.add_component(entity, sprite)?;

        let mut bounds: BoundingBoxComponent = engine.create_component();
        bounds.bbox = Rectangle::new(x, y, width, height);
        engine.add_component(entity, bounds)?;

        Ok(entity)
    }
}

impl Default for PongEntityInitializer {
    fn default() -> Self {
        Self::new()
    }
}

impl EntityInitializer for PongEntityInitializer {
    fn phase(&self) -> InitializerPhase {
        self.phase
    }

    fn create_all_entities(
        &mut self,
        engine: &mut Engine,
        loaders: &mut AssetLoaderService,
    ) -> GameResult<()> {
        if self.phase != InitializerPhase::Uninitialized {
            return Err(GameError::invalid_state("entities have already been created"));
        }

        let loader = loaders.get_instance();
        loader.add_asset_to_load(BALL_TEXTURE, AssetKind::Texture)?;
        loader.add_asset_to_load(PADDLE_TEXTURE, AssetKind::Texture)?;

        let ball = Self::create_body(
            engine,
            -BALL_SIZE / 2.0,
            -BALL_SIZE / 2.0,
            BALL_SIZE,
            BALL_SIZE,
        )?;
        self.ball = Some(ball);

        let half_width = FB_WIDTH as f32 / 2.0;
        let paddle_y = -PADDLE_HEIGHT / 2.0;
        let sides = [
            (PlayerComponent::HUMAN_PLAYER, -half_width + PADDLE_MARGIN),
            (
                PlayerComponent::COMPUTER_PLAYER,
                half_width - PADDLE_MARGIN - PADDLE_WIDTH,
            ),
        ];

        for (player_id, x) in sides {
            let paddle = Self::create_body(engine, x, paddle_y, PADDLE_WIDTH, PADDLE_HEIGHT)?;
            let mut player: PlayerComponent = engine.create_component();
            player.id = player_id;
            engine.add_component(paddle, player)?;
            self.paddles.push(paddle);
        }

        log::info!("Created {} pong entities", self.paddles.len() + 1);
        self.phase = InitializerPhase::EntitiesCreated;
        Ok(())
    }

    fn set_loadable_assets(
        &mut self,
        engine: &mut Engine,
        loaders: &mut AssetLoaderService,
    ) -> GameResult<()> {
        if self.phase != InitializerPhase::EntitiesCreated {
            return Err(GameError::invalid_state(format!(
                "entities must be created before setting assets (phase {:?})",
                self.phase
            )));
        }

        let loader = loaders.loaded_instance()?;
        let ball_texture = loader.get_texture(BALL_TEXTURE)?;
        let paddle_texture = loader.get_texture(PADDLE_TEXTURE)?;

        if let Some(ball) = self.ball {
            engine.add_component(ball, TextureComponent::new(ball_texture))?;
        }
        for paddle in &self.paddles {
            engine.add_component(*paddle, TextureComponent::new(paddle_texture.clone()))?;
        }

        loaders.free_instance();
        self.phase = InitializerPhase::AssetsLoaded;
        Ok(())
    }

    fn dispose_assets(&mut self, engine: &mut Engine) -> GameResult<()> {
        match self.phase {
            InitializerPhase::Uninitialized => {
                return Err(GameError::invalid_state(
                    "entities have not been created before disposing assets",
                ))
            }
            InitializerPhase::EntitiesCreated => {
                return Err(GameError::invalid_state(
                    "assets have not been loaded before disposing",
                ))
            }
            InitializerPhase::Disposed => {
                return Err(GameError::invalid_state("assets have already been disposed"))
            }
            InitializerPhase::AssetsLoaded => {}
        }

        let entities: Vec<Entity> = self.owned_entities().collect();
        for entity in entities {
            for component in engine.components_mut(entity) {
                if component.holds_resources() {
                    component.dispose_resources();
                }
            }
        }

        self.phase = InitializerPhase::Disposed;
        Ok(())
    }
}
