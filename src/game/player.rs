//! Player controller
//!
//! Walk, fall, and jump on top of the movement resolver. All velocities are
//! fixed-point so a run replays identically from the same inputs.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::config::PlayerConfig;
use crate::math::{Fixed, FixedPoint, Rectangle};

use super::actor::{Actor, ActorContext, Behavior};
use super::draw::{Canvas, Color};
use super::tag::{Tag, TagQuery};

const BODY_COLOR: Color = Color::hex(0xd95763);
const EYE_COLOR: Color = Color::WHITE;

/// Controls sampled once per tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerInput {
    /// -1 left, 0 none, 1 right
    pub x: i32,
    /// Jump button held
    pub jump: bool,
}

pub struct Player {
    config: PlayerConfig,
    velocity: FixedPoint,
    input: PlayerInput,
    /// Jump state on the previous tick, for edge detection
    jump_was_held: bool,
    facing: i32,
}

impl Player {
    pub fn new(config: PlayerConfig) -> Self {
        Self {
            config,
            velocity: FixedPoint::ZERO,
            input: PlayerInput::default(),
            jump_was_held: false,
            facing: 1,
        }
    }

    /// Build the player's actor with its hitbox placed relative to `spawn`.
    pub fn actor(spawn: FixedPoint, config: &PlayerConfig) -> Actor {
        let (w, h) = config.size;
        let size = FixedPoint::from_pixels(w, h);
        Actor::body(Rectangle::from_parts(spawn + config.spawn_offset, size))
            .with_tag(Tag::PLAYER_COLLIDABLE)
            .with_depth(0)
            .with_collision(Some(TagQuery::any_of(Tag::PLAYER_COLLIDABLE)))
    }

    pub fn set_input(&mut self, input: PlayerInput) {
        self.input = input;
    }

    pub fn input(&self) -> PlayerInput {
        self.input
    }

    pub fn velocity(&self) -> FixedPoint {
        self.velocity
    }

    fn walk(&mut self, on_ground: bool) {
        let cfg = &self.config;
        let dir = self.input.x.signum();
        if dir != 0 {
            self.facing = dir;
            let accel = if on_ground { cfg.ground_accel } else { cfg.air_accel };
            self.velocity.x = self.velocity.x.approach(cfg.max_walk_speed * dir, accel);
        } else {
            self.velocity.x = self.velocity.x.approach(Fixed::ZERO, cfg.friction);
        }
    }

    fn fall(&mut self, on_ground: bool) {
        let cfg = &self.config;
        let pressed = self.input.jump && !self.jump_was_held;
        self.jump_was_held = self.input.jump;

        if on_ground && pressed {
            self.velocity.y = -cfg.jump_speed;
        }

        let rising = self.velocity.y < Fixed::ZERO;
        let gravity = if rising && self.input.jump { cfg.jump_gravity } else { cfg.gravity };
        self.velocity.y = (self.velocity.y + gravity).min(cfg.max_fall_speed);
    }
}

impl Behavior for Player {
    fn update(&mut self, ctx: &mut ActorContext<'_>) {
        let on_ground = ctx.is_colliding(Fixed::ZERO, Fixed::UNIT);
        self.walk(on_ground);
        self.fall(on_ground);

        let velocity = &mut self.velocity;
        let _ = ctx.move_x(velocity.x, || velocity.x = Fixed::ZERO);
        let _ = ctx.move_y(velocity.y, || velocity.y = Fixed::ZERO);

        let on_ground = ctx.is_colliding(Fixed::ZERO, Fixed::UNIT);
        ctx.actor_mut().set_on_ground(on_ground);
    }

    fn squished(&mut self, _ctx: &mut ActorContext<'_>) {
        debug!("player: squished");
        self.velocity = FixedPoint::ZERO;
    }

    fn draw(&self, actor: &Actor, canvas: &mut dyn Canvas) {
        let hitbox = actor.hitbox();
        canvas.fill_rect(hitbox, BODY_COLOR);

        let eye_x = if self.facing > 0 { hitbox.right() - Fixed::ONE * 3 } else { hitbox.left() + Fixed::ONE };
        let eye = Rectangle::new(eye_x, hitbox.top() + Fixed::ONE * 3, Fixed::ONE * 2, Fixed::ONE * 2);
        canvas.fill_rect(eye, EYE_COLOR);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::world::World;

    const PX: Fixed = Fixed::ONE;

    fn floor(world: &mut World) {
        let floor = Actor::solid_box(Rectangle::from_pixels(0, 64, 512, 16))
            .with_depth(50)
            .with_tag(Tag::PLAYER_COLLIDABLE);
        world.register(floor).unwrap();
    }

    #[test]
    fn test_player_settles_on_floor() {
        let mut world = World::new();
        floor(&mut world);

        let config = PlayerConfig::default();
        let mut actor = Player::actor(FixedPoint::ZERO, &config);
        // Bottom 0x20 raw units above the floor
        actor.set_position(FixedPoint::new(PX * 10, PX * 64 - PX * 14 - Fixed(0x20)));
        let id = world.register_with(actor, Player::new(config)).unwrap();

        world.start();
        world.update();

        let actor = world.actor(id).unwrap();
        assert_eq!(actor.position().y, Fixed((64 << 9) - (14 << 9)));
        assert!(actor.on_ground());
        assert_eq!(world.behavior::<Player>(id).unwrap().velocity().y, Fixed::ZERO);
    }

    #[test]
    fn test_spawn_offset() {
        let config = PlayerConfig::default();
        let actor = Player::actor(FixedPoint::from_pixels(40, 64), &config);
        assert_eq!(actor.hitbox(), Rectangle::from_pixels(36, 50, 8, 14));
        assert_eq!(actor.tag(), Tag::PLAYER_COLLIDABLE);
    }

    #[test]
    fn test_walk_accelerates_to_max_speed() {
        let mut world = World::new();
        floor(&mut world);
        let config = PlayerConfig::default();
        let max = config.max_walk_speed;
        let id = world
            .register_with(Player::actor(FixedPoint::from_pixels(40, 64), &config), Player::new(config))
            .unwrap();
        world.start();

        world.behavior_mut::<Player>(id).unwrap().set_input(PlayerInput { x: 1, jump: false });
        world.update();
        assert_eq!(world.behavior::<Player>(id).unwrap().velocity().x, Fixed(0x55));

        for _ in 0..20 {
            world.update();
        }
        assert_eq!(world.behavior::<Player>(id).unwrap().velocity().x, max);
        assert!(world.actor(id).unwrap().position().x > PX * 36);

        // Friction brings it back to rest
        world.behavior_mut::<Player>(id).unwrap().set_input(PlayerInput::default());
        for _ in 0..20 {
            world.update();
        }
        assert_eq!(world.behavior::<Player>(id).unwrap().velocity().x, Fixed::ZERO);
    }

    #[test]
    fn test_jump_leaves_ground_and_lands() {
        let mut world = World::new();
        floor(&mut world);
        let config = PlayerConfig::default();
        let id = world
            .register_with(Player::actor(FixedPoint::from_pixels(40, 64), &config), Player::new(config))
            .unwrap();
        world.start();
        world.update();
        assert!(world.actor(id).unwrap().on_ground());

        world.behavior_mut::<Player>(id).unwrap().set_input(PlayerInput { x: 0, jump: true });
        world.update();
        assert!(!world.actor(id).unwrap().on_ground());
        assert!(world.actor(id).unwrap().hitbox().bottom() < PX * 64);

        world.behavior_mut::<Player>(id).unwrap().set_input(PlayerInput::default());
        for _ in 0..100 {
            world.update();
        }
        let actor = world.actor(id).unwrap();
        assert!(actor.on_ground());
        assert_eq!(actor.hitbox().bottom(), PX * 64);
    }

    #[test]
    fn test_held_jump_does_not_rejump() {
        let mut world = World::new();
        floor(&mut world);
        let config = PlayerConfig::default();
        let id = world
            .register_with(Player::actor(FixedPoint::from_pixels(40, 64), &config), Player::new(config))
            .unwrap();
        world.start();
        world.behavior_mut::<Player>(id).unwrap().set_input(PlayerInput { x: 0, jump: true });

        // First tick on the ground jumps; keep holding until it lands again
        for _ in 0..200 {
            world.update();
        }
        assert!(world.actor(id).unwrap().on_ground());
        assert_eq!(world.behavior::<Player>(id).unwrap().velocity().y, Fixed::ZERO);
    }
}
