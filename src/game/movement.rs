//! Movement resolver
//!
//! Bodies move one raw unit at a time so they stop flush against solids.
//! Horizontal moves follow single-unit slopes: a one-unit ledge ahead is
//! climbed, and a one-unit drop ahead is stepped down, so walking over
//! gentle stairs or diagonal tiles doesn't stall or make the body hop.
//!
//! Solid boxes route their moves through the carrier instead, and tile
//! grids ignore move requests entirely.

use crate::math::Fixed;

use super::actor::ActorKind;
use super::entity::ActorId;
use super::world::{World, WorldError};

/// Result of a single move request
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// The full displacement was applied (or nothing needed to move)
    Moved,
    /// A solid stopped the move; the rest of the displacement was discarded
    Blocked,
}

impl MoveOutcome {
    pub fn is_blocked(self) -> bool {
        self == MoveOutcome::Blocked
    }
}

enum Mover {
    Body,
    Carrier,
    Static,
}

impl World {
    /// Move an actor horizontally. See the module docs for slope handling.
    pub fn move_x(&mut self, id: ActorId, delta: Fixed) -> Result<MoveOutcome, WorldError> {
        let index = self.index_of(id)?;
        Ok(self.move_x_at(index, delta))
    }

    /// Move an actor vertically.
    pub fn move_y(&mut self, id: ActorId, delta: Fixed) -> Result<MoveOutcome, WorldError> {
        let index = self.index_of(id)?;
        Ok(self.move_y_at(index, delta))
    }

    /// Would `id` hit a solid (through its own collision query) if shifted by `(dx, dy)`?
    pub fn is_colliding(&self, id: ActorId, dx: Fixed, dy: Fixed) -> Result<bool, WorldError> {
        let index = self.index_of(id)?;
        Ok(self.collides_at(index, dx, dy))
    }

    fn mover(&self, index: usize) -> Mover {
        match &self.slots[index].actor.kind {
            ActorKind::Body => Mover::Body,
            ActorKind::Solid(state) if state.shape.is_static() => Mover::Static,
            ActorKind::Solid(_) => Mover::Carrier,
        }
    }

    /// Nothing could ever block this actor
    fn moves_freely(&self, index: usize) -> bool {
        self.solids.is_empty() || self.slots[index].actor.collision.is_none()
    }

    pub(crate) fn collides_at(&self, index: usize, dx: Fixed, dy: Fixed) -> bool {
        let actor = &self.slots[index].actor;
        let Some(query) = actor.collision else {
            return false;
        };
        let probe = actor.hitbox.shift(dx, dy);
        self.find_solid_index(&probe, Some(query), Some(index)).is_some()
    }

    pub(crate) fn move_x_at(&mut self, index: usize, delta: Fixed) -> MoveOutcome {
        if delta.is_zero() {
            return MoveOutcome::Moved;
        }
        match self.mover(index) {
            Mover::Static => return MoveOutcome::Moved,
            Mover::Carrier => {
                self.move_solid_at(index, delta, Fixed::ZERO);
                return MoveOutcome::Moved;
            }
            Mover::Body => {}
        }

        if self.moves_freely(index) {
            self.slots[index].actor.hitbox.x += delta;
            return MoveOutcome::Moved;
        }

        let step = delta.signum();
        let mut remaining = delta;
        while !remaining.is_zero() {
            let ahead = self.collides_at(index, step, Fixed::ZERO);

            if ahead && !self.collides_at(index, step, -Fixed::UNIT) {
                // One-unit ledge: climb it
                let hitbox = &mut self.slots[index].actor.hitbox;
                hitbox.x += step;
                hitbox.y -= Fixed::UNIT;
            } else if !ahead {
                // One-unit dip: follow it down
                let drop = !self.collides_at(index, step, Fixed::UNIT)
                    && self.collides_at(index, step, Fixed::UNIT * 2);
                let hitbox = &mut self.slots[index].actor.hitbox;
                if drop {
                    hitbox.y += Fixed::UNIT;
                }
                hitbox.x += step;
            } else {
                return MoveOutcome::Blocked;
            }

            remaining -= step;
        }
        MoveOutcome::Moved
    }

    pub(crate) fn move_y_at(&mut self, index: usize, delta: Fixed) -> MoveOutcome {
        if delta.is_zero() {
            return MoveOutcome::Moved;
        }
        match self.mover(index) {
            Mover::Static => return MoveOutcome::Moved,
            Mover::Carrier => {
                self.move_solid_at(index, Fixed::ZERO, delta);
                return MoveOutcome::Moved;
            }
            Mover::Body => {}
        }

        if self.moves_freely(index) {
            self.slots[index].actor.hitbox.y += delta;
            return MoveOutcome::Moved;
        }

        let step = delta.signum();
        let mut remaining = delta;
        while !remaining.is_zero() {
            if self.collides_at(index, Fixed::ZERO, step) {
                return MoveOutcome::Blocked;
            }
            self.slots[index].actor.hitbox.y += step;
            remaining -= step;
        }
        MoveOutcome::Moved
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::actor::{Actor, ActorContext, Behavior};
    use crate::game::tag::{Tag, TagQuery};
    use crate::math::{FixedPoint, Rectangle};

    const PX: Fixed = Fixed::ONE;

    fn body_at(x: i32, y: i32) -> Actor {
        Actor::body(Rectangle::from_pixels(x, y, 8, 14))
    }

    /// Moves by a fixed amount each update and counts blocked callbacks
    struct Walker {
        delta: FixedPoint,
        blocked: u32,
    }

    impl Behavior for Walker {
        fn update(&mut self, ctx: &mut ActorContext<'_>) {
            let _ = ctx.move_x(self.delta.x, || self.blocked += 1);
            let _ = ctx.move_y(self.delta.y, || self.blocked += 1);
        }
    }

    #[test]
    fn test_zero_delta_is_noop() {
        let mut world = World::new();
        world.register(Actor::solid_box(Rectangle::from_pixels(8, 0, 8, 8))).unwrap();
        let walker = Walker { delta: FixedPoint::ZERO, blocked: 0 };
        let id = world.register_with(Actor::body(Rectangle::from_pixels(0, 0, 8, 8)), walker).unwrap();
        world.start();
        world.update();

        assert_eq!(world.actor(id).unwrap().position(), FixedPoint::ZERO);
        assert_eq!(world.behavior::<Walker>(id).unwrap().blocked, 0);
    }

    #[test]
    fn test_no_solids_applies_full_move() {
        let mut world = World::new();
        let id = world.register(body_at(0, 0)).unwrap();
        assert_eq!(world.move_x(id, PX * 1000), Ok(MoveOutcome::Moved));
        assert_eq!(world.move_y(id, -PX * 3), Ok(MoveOutcome::Moved));
        assert_eq!(world.actor(id).unwrap().position(), FixedPoint::from_pixels(1000, -3));
    }

    #[test]
    fn test_blocked_exactly_at_wall_with_one_callback() {
        let mut world = World::new();
        world.register(Actor::solid_box(Rectangle::from_pixels(32, 0, 16, 32))).unwrap();
        let walker = Walker { delta: FixedPoint::new(PX * 40, Fixed::ZERO), blocked: 0 };
        let id = world.register_with(body_at(0, 0), walker).unwrap();
        world.start();
        world.update();

        let actor = world.actor(id).unwrap();
        assert_eq!(actor.hitbox().right(), PX * 32);
        assert_eq!(actor.position().y, Fixed::ZERO);
        assert_eq!(world.behavior::<Walker>(id).unwrap().blocked, 1);
    }

    #[test]
    fn test_fall_lands_flush_on_floor() {
        let mut world = World::new();
        world.register(Actor::solid_box(Rectangle::from_pixels(0, 64, 64, 16))).unwrap();
        let id = world.register(body_at(4, 0)).unwrap();

        assert_eq!(world.move_y(id, PX * 100), Ok(MoveOutcome::Blocked));
        assert_eq!(world.actor(id).unwrap().hitbox().bottom(), PX * 64);
        assert_eq!(world.is_colliding(id, Fixed::ZERO, Fixed::UNIT), Ok(true));
        assert_eq!(world.is_colliding(id, Fixed::ZERO, Fixed::ZERO), Ok(false));
    }

    #[test]
    fn test_climbs_one_unit_ledge() {
        let mut world = World::new();
        world.register(Actor::solid_box(Rectangle::from_pixels(0, 64, 16, 16))).unwrap();
        // Ledge one raw unit higher than the floor, starting at x = 16
        let ledge = Rectangle::new(PX * 16, PX * 64 - Fixed::UNIT, PX * 64, PX * 16);
        world.register(Actor::solid_box(ledge)).unwrap();
        let id = world.register(body_at(4, 50)).unwrap();

        assert_eq!(world.move_x(id, PX * 20), Ok(MoveOutcome::Moved));
        let hitbox = world.actor(id).unwrap().hitbox();
        assert_eq!(hitbox.x, PX * 24);
        assert_eq!(hitbox.bottom(), PX * 64 - Fixed::UNIT);
    }

    #[test]
    fn test_two_unit_ledge_blocks() {
        let mut world = World::new();
        world.register(Actor::solid_box(Rectangle::from_pixels(0, 64, 16, 16))).unwrap();
        let wall = Rectangle::new(PX * 16, PX * 64 - Fixed::UNIT * 2, PX * 64, PX * 16);
        world.register(Actor::solid_box(wall)).unwrap();
        let id = world.register(body_at(4, 50)).unwrap();

        assert_eq!(world.move_x(id, PX * 20), Ok(MoveOutcome::Blocked));
        let hitbox = world.actor(id).unwrap().hitbox();
        assert_eq!(hitbox.right(), PX * 16);
        assert_eq!(hitbox.bottom(), PX * 64);
    }

    #[test]
    fn test_descends_one_unit_dip() {
        let mut world = World::new();
        world.register(Actor::solid_box(Rectangle::from_pixels(0, 64, 32, 16))).unwrap();
        let lower = Rectangle::new(PX * 32, PX * 64 + Fixed::UNIT, PX * 64, PX * 16);
        let lower_id = world.register(Actor::solid_box(lower)).unwrap();
        let id = world.register(body_at(20, 50)).unwrap();

        assert_eq!(world.move_x(id, PX * 16), Ok(MoveOutcome::Moved));
        let hitbox = world.actor(id).unwrap().hitbox();
        assert_eq!(hitbox.x, PX * 36);
        assert_eq!(hitbox.bottom(), PX * 64 + Fixed::UNIT);
        assert_eq!(world.is_riding(id, lower_id), Ok(true));
    }

    #[test]
    fn test_collision_query_filters_solids() {
        let mut world = World::new();
        world
            .register(Actor::solid_box(Rectangle::from_pixels(16, 0, 16, 16)).with_tag(Tag::ENEMY_COLLIDABLE))
            .unwrap();
        let player = world
            .register(body_at(0, 0).with_collision(Some(TagQuery::any_of(Tag::PLAYER_COLLIDABLE))))
            .unwrap();
        let ghost = world.register(body_at(0, 20).with_collision(None)).unwrap();

        assert_eq!(world.move_x(player, PX * 32), Ok(MoveOutcome::Moved));
        assert_eq!(world.move_y(ghost, -PX * 20), Ok(MoveOutcome::Moved));
        assert_eq!(world.move_x(ghost, PX * 16), Ok(MoveOutcome::Moved));
        assert_eq!(world.actor(ghost).unwrap().position(), FixedPoint::from_pixels(16, 0));
    }

    #[test]
    fn test_tilemap_ignores_moves() {
        use crate::game::shape::TileGrid;

        let mut world = World::new();
        let map = world.register(Actor::tilemap(FixedPoint::ZERO, TileGrid::empty(4, 4, PX * 16))).unwrap();
        assert_eq!(world.move_x(map, PX * 5), Ok(MoveOutcome::Moved));
        assert_eq!(world.actor(map).unwrap().position(), FixedPoint::ZERO);
    }

    #[test]
    fn test_stale_id_is_an_error() {
        let mut world = World::new();
        let id = world.register(body_at(0, 0)).unwrap();
        world.start();
        world.teardown();
        assert_eq!(world.move_x(id, PX), Err(WorldError::UnknownActor(id)));
    }
}
