//! Solid carrier
//!
//! Moving a solid box displaces other actors:
//! - actors it ends up overlapping are **pushed** out by the overlap, through
//!   the movement resolver, and get their `squished` hook if that push is
//!   blocked
//! - actors that were standing on it before the move are **carried** by the
//!   same delta, without collision checks
//!
//! The rider set is captured once before anything moves and reused for both
//! axes. The vertical axis is resolved first. While it moves, the solid is
//! neither collidable nor carriable, so pushed actors can't snag on it and it
//! can never push or carry itself.

use log::trace;

use crate::math::Fixed;

use super::actor::ActorKind;
use super::entity::ActorId;
use super::world::{HookEvent, World, WorldError};

#[derive(Clone, Copy)]
enum Axis {
    X,
    Y,
}

impl World {
    /// Move a solid box by `(dx, dy)`, pushing and carrying other actors.
    ///
    /// Bodies and tile grids are rejected.
    pub fn move_solid(&mut self, id: ActorId, dx: Fixed, dy: Fixed) -> Result<(), WorldError> {
        let index = self.index_of(id)?;
        match &self.slots[index].actor.kind {
            ActorKind::Solid(state) if !state.shape.is_static() => {
                self.move_solid_at(index, dx, dy);
                Ok(())
            }
            _ => Err(WorldError::NotASolid(id)),
        }
    }

    pub(crate) fn move_solid_at(&mut self, index: usize, dx: Fixed, dy: Fixed) {
        if dx.is_zero() && dy.is_zero() {
            return;
        }
        match &self.slots[index].actor.kind {
            ActorKind::Solid(state) if !state.shape.is_static() => {}
            _ => return,
        }

        let candidates: Vec<usize> = (0..self.slots.len())
            .filter(|&i| i != index && self.slots[i].actor.enabled)
            .collect();
        let riders: Vec<usize> = candidates
            .iter()
            .copied()
            .filter(|&i| self.rides(i, index))
            .collect();

        self.set_solid_flags(index, false);

        if !dy.is_zero() {
            self.slots[index].actor.hitbox.y += dy;
            self.displace(index, Axis::Y, dy, &candidates, &riders);
        }
        if !dx.is_zero() {
            self.slots[index].actor.hitbox.x += dx;
            self.displace(index, Axis::X, dx, &candidates, &riders);
        }

        self.set_solid_flags(index, true);
    }

    fn set_solid_flags(&mut self, index: usize, on: bool) {
        if let Some(state) = self.slots[index].actor.solid_mut() {
            state.collidable = on;
            state.carriable = on;
        }
    }

    fn displace(&mut self, index: usize, axis: Axis, delta: Fixed, candidates: &[usize], riders: &[usize]) {
        for &other in candidates {
            let target = &self.slots[other].actor;
            if target.solid().is_some_and(|s| !s.carriable) {
                continue;
            }

            let solid = &self.slots[index].actor;
            if solid.shape_intersects(&target.hitbox) {
                let push = match (axis, delta.0 > 0) {
                    (Axis::Y, true) => solid.hitbox.bottom() - target.hitbox.top(),
                    (Axis::Y, false) => solid.hitbox.top() - target.hitbox.bottom(),
                    (Axis::X, true) => solid.hitbox.right() - target.hitbox.left(),
                    (Axis::X, false) => solid.hitbox.left() - target.hitbox.right(),
                };
                let outcome = match axis {
                    Axis::Y => self.move_y_at(other, push),
                    Axis::X => self.move_x_at(other, push),
                };
                if outcome.is_blocked() {
                    trace!("carrier: actor {} squished", self.slots[other].actor.id);
                    self.fire(other, HookEvent::Squished);
                }
            } else if riders.contains(&other) {
                self.carry(other, axis, delta);
            }
        }
    }

    /// Translate a rider without collision checks
    fn carry(&mut self, index: usize, axis: Axis, delta: Fixed) {
        let (dx, dy) = match axis {
            Axis::X => (delta, Fixed::ZERO),
            Axis::Y => (Fixed::ZERO, delta),
        };
        match &self.slots[index].actor.kind {
            ActorKind::Body => {
                let hitbox = &mut self.slots[index].actor.hitbox;
                hitbox.x += dx;
                hitbox.y += dy;
            }
            ActorKind::Solid(state) if !state.shape.is_static() => self.move_solid_at(index, dx, dy),
            ActorKind::Solid(_) => {}
        }
    }
}
