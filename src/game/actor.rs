//! Actors and behaviours
//!
//! An [`Actor`] is the plain state the world simulates: hitbox, tag, depth
//! and flags. What an actor *does* lives in an optional [`Behavior`] stored
//! next to it. Hooks get an [`ActorContext`] giving mutable access to their
//! own actor and to the rest of the world.

use std::any::Any;

use crate::math::{Fixed, FixedPoint, Rectangle};

use super::draw::Canvas;
use super::entity::ActorId;
use super::movement::MoveOutcome;
use super::shape::{SolidShape, TileGrid};
use super::tag::{Tag, TagQuery};
use super::world::{World, WorldError};

// =============================================================================
// State
// =============================================================================

/// Solid-specific state
#[derive(Debug, Clone, PartialEq)]
pub struct SolidState {
    pub shape: SolidShape,
    /// Blocks movers and shows up in solid queries
    pub collidable: bool,
    /// Can be pushed or carried by other solids
    pub carriable: bool,
}

/// The one specialisation axis of an actor
#[derive(Debug, Clone, PartialEq)]
pub enum ActorKind {
    /// Moves through the resolver and can ride solids
    Body,
    Solid(SolidState),
}

/// Simulation state of one registered actor.
#[derive(Debug, Clone)]
pub struct Actor {
    pub(crate) id: ActorId,
    pub(crate) hitbox: Rectangle,
    pub(crate) tag: Tag,
    pub(crate) depth: i32,
    pub(crate) enabled: bool,
    pub(crate) disposed: bool,
    pub(crate) on_ground: bool,
    /// Mask used when probing solids; `None` never collides
    pub(crate) collision: Option<TagQuery>,
    pub(crate) kind: ActorKind,
}

impl Actor {
    fn with_kind(hitbox: Rectangle, kind: ActorKind) -> Self {
        Self {
            id: ActorId::NULL,
            hitbox,
            tag: Tag::NONE,
            depth: 0,
            enabled: true,
            disposed: false,
            on_ground: false,
            collision: Some(TagQuery::ANY),
            kind,
        }
    }

    /// A non-solid mover
    pub fn body(hitbox: Rectangle) -> Self {
        Self::with_kind(hitbox, ActorKind::Body)
    }

    /// A solid box covering its hitbox
    pub fn solid_box(hitbox: Rectangle) -> Self {
        Self::with_kind(
            hitbox,
            ActorKind::Solid(SolidState { shape: SolidShape::Box, collidable: true, carriable: true }),
        )
    }

    /// A static tile grid anchored at `origin`
    pub fn tilemap(origin: FixedPoint, grid: TileGrid) -> Self {
        let hitbox = Rectangle::from_parts(origin, grid.size());
        let mut actor = Self::with_kind(
            hitbox,
            ActorKind::Solid(SolidState { shape: SolidShape::Grid(grid), collidable: true, carriable: false }),
        );
        actor.collision = None;
        actor
    }

    pub fn with_tag(mut self, tag: Tag) -> Self {
        self.tag = tag;
        self
    }

    pub fn with_depth(mut self, depth: i32) -> Self {
        self.depth = depth;
        self
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn with_collision(mut self, query: Option<TagQuery>) -> Self {
        self.collision = query;
        self
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    pub fn id(&self) -> ActorId {
        self.id
    }

    pub fn hitbox(&self) -> Rectangle {
        self.hitbox
    }

    pub fn position(&self) -> FixedPoint {
        self.hitbox.location()
    }

    pub fn tag(&self) -> Tag {
        self.tag
    }

    pub fn depth(&self) -> i32 {
        self.depth
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    pub fn on_ground(&self) -> bool {
        self.on_ground
    }

    pub fn collision(&self) -> Option<TagQuery> {
        self.collision
    }

    pub fn kind(&self) -> &ActorKind {
        &self.kind
    }

    pub fn is_solid(&self) -> bool {
        matches!(self.kind, ActorKind::Solid(_))
    }

    pub fn solid(&self) -> Option<&SolidState> {
        match &self.kind {
            ActorKind::Solid(state) => Some(state),
            ActorKind::Body => None,
        }
    }

    pub fn solid_mut(&mut self) -> Option<&mut SolidState> {
        match &mut self.kind {
            ActorKind::Solid(state) => Some(state),
            ActorKind::Body => None,
        }
    }

    // -------------------------------------------------------------------------
    // Direct state edits (no collision)
    // -------------------------------------------------------------------------

    pub fn set_hitbox(&mut self, hitbox: Rectangle) {
        self.hitbox = hitbox;
    }

    /// Teleport without collision checks
    pub fn set_position(&mut self, position: FixedPoint) {
        self.hitbox.x = position.x;
        self.hitbox.y = position.y;
    }

    pub fn set_tag(&mut self, tag: Tag) {
        self.tag = tag;
    }

    pub fn set_on_ground(&mut self, on_ground: bool) {
        self.on_ground = on_ground;
    }

    pub fn set_collision(&mut self, query: Option<TagQuery>) {
        self.collision = query;
    }

    /// Solid shape hit test. Bodies and non-collidable solids never match.
    pub(crate) fn solid_intersects(&self, rect: &Rectangle) -> bool {
        match &self.kind {
            ActorKind::Solid(state) => state.collidable && state.shape.intersects(&self.hitbox, rect),
            ActorKind::Body => false,
        }
    }

    /// Shape hit test ignoring the collidable flag, used by the carrier
    pub(crate) fn shape_intersects(&self, rect: &Rectangle) -> bool {
        match &self.kind {
            ActorKind::Solid(state) => state.shape.intersects(&self.hitbox, rect),
            ActorKind::Body => self.hitbox.intersects(rect),
        }
    }
}

// =============================================================================
// Behaviour
// =============================================================================

/// Upcast helper so behaviours can be queried by concrete type.
pub trait AsAny: Any {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Lifecycle hooks. Every hook has an empty default.
///
/// Hooks are never re-entered: while a hook runs, the behaviour is checked
/// out of the world, so hooks the world would fire on the same actor in the
/// meantime (e.g. `squished` from a push it caused itself) are skipped.
#[allow(unused_variables)]
pub trait Behavior: AsAny {
    /// Before registration locks; may register more actors
    fn pre_start(&mut self, ctx: &mut ActorContext<'_>) {}
    /// After registration locks
    fn start(&mut self, ctx: &mut ActorContext<'_>) {}
    /// Once per frame while enabled
    fn update(&mut self, ctx: &mut ActorContext<'_>) {}
    fn draw(&self, actor: &Actor, canvas: &mut dyn Canvas) {}
    fn draw_ui(&self, actor: &Actor, canvas: &mut dyn Canvas) {}
    /// The actor was just disabled
    fn disabled(&mut self, ctx: &mut ActorContext<'_>) {}
    /// A solid pushed the actor into something it couldn't get out of
    fn squished(&mut self, ctx: &mut ActorContext<'_>) {}
    /// The world is being torn down
    fn disposed(&mut self, actor: &Actor) {}
}

// =============================================================================
// Hook context
// =============================================================================

/// Access to the running actor and its world from inside a hook.
pub struct ActorContext<'w> {
    world: &'w mut World,
    id: ActorId,
}

impl<'w> ActorContext<'w> {
    pub(crate) fn new(world: &'w mut World, id: ActorId) -> Self {
        Self { world, id }
    }

    pub fn id(&self) -> ActorId {
        self.id
    }

    pub fn actor(&self) -> &Actor {
        self.world.actor_at(self.id.index())
    }

    pub fn actor_mut(&mut self) -> &mut Actor {
        self.world.actor_at_mut(self.id.index())
    }

    pub fn world(&self) -> &World {
        self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        self.world
    }

    /// Move horizontally, calling `on_blocked` once if a solid stops the move.
    pub fn move_x(&mut self, delta: Fixed, on_blocked: impl FnOnce()) -> MoveOutcome {
        let outcome = self.world.move_x_at(self.id.index(), delta);
        if outcome == MoveOutcome::Blocked {
            on_blocked();
        }
        outcome
    }

    /// Move vertically, calling `on_blocked` once if a solid stops the move.
    pub fn move_y(&mut self, delta: Fixed, on_blocked: impl FnOnce()) -> MoveOutcome {
        let outcome = self.world.move_y_at(self.id.index(), delta);
        if outcome == MoveOutcome::Blocked {
            on_blocked();
        }
        outcome
    }

    /// Move this solid, pushing and carrying other actors. No-op for bodies.
    pub fn move_solid(&mut self, dx: Fixed, dy: Fixed) {
        self.world.move_solid_at(self.id.index(), dx, dy);
    }

    /// Would this actor hit a solid if displaced by `(dx, dy)`?
    pub fn is_colliding(&self, dx: Fixed, dy: Fixed) -> bool {
        self.world.collides_at(self.id.index(), dx, dy)
    }

    /// Is this actor standing on `solid`?
    pub fn is_riding(&self, solid: ActorId) -> Result<bool, WorldError> {
        self.world.is_riding(self.id, solid)
    }

    pub fn set_depth(&mut self, depth: i32) {
        self.world.set_depth_at(self.id.index(), depth);
    }

    /// Register another actor; only valid before the world locks.
    pub fn register(&mut self, actor: Actor, behavior: impl Behavior) -> Result<ActorId, WorldError> {
        self.world.register_with(actor, behavior)
    }
}
