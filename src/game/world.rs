//! Actor Registry
//!
//! The World owns every actor of the running session:
//! - Registration with monotonic ids, locked once the session starts
//! - Lifecycle passes (pre_start, start, update, draw, draw_ui, teardown)
//! - An index of enabled solids for collision queries
//! - A lazily sorted draw order keyed on depth
//!
//! Actors live in an arena of slots indexed by registration number. A
//! slot's behaviour is checked out while one of its hooks runs, so the hook
//! can borrow the whole world mutably through its [`ActorContext`].

use std::collections::BTreeSet;
use std::fmt;

use log::{debug, error, warn};
use serde::{Deserialize, Serialize};

use crate::math::{Fixed, Rectangle};

use super::actor::{Actor, ActorContext, Behavior};
use super::draw::Canvas;
use super::entity::{ActorId, IdAllocator};
use super::tag::{self, Tag, TagQuery};

/// Error type for registry operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorldError {
    /// Registration attempted after the session started
    RegistrationLocked,
    /// Id is stale (previous session) or was never issued
    UnknownActor(ActorId),
    /// A solid was required
    NotASolid(ActorId),
    /// Tile values don't match the grid dimensions
    GridSize { expected: usize, found: usize },
}

impl fmt::Display for WorldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorldError::RegistrationLocked => write!(f, "cannot register actors after the session has started"),
            WorldError::UnknownActor(id) => write!(f, "unknown actor {}", id),
            WorldError::NotASolid(id) => write!(f, "actor {} is not a solid", id),
            WorldError::GridSize { expected, found } => {
                write!(f, "tile grid expects {} values, got {}", expected, found)
            }
        }
    }
}

impl std::error::Error for WorldError {}

/// Plain position/flag record for save systems and debugging.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActorSnapshot {
    pub id: u64,
    pub hitbox: Rectangle,
    pub tag: Tag,
    pub depth: i32,
    pub enabled: bool,
    pub on_ground: bool,
    pub solid: bool,
}

pub(super) struct Slot {
    pub(super) actor: Actor,
    pub(super) behavior: Option<Box<dyn Behavior>>,
    /// Behaviour is checked out for a hook
    running: bool,
}

/// Hooks that other code fires on an actor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum HookEvent {
    Disabled,
    Squished,
}

/// Registry of every actor in the running session.
pub struct World {
    ids: IdAllocator,
    pub(super) slots: Vec<Slot>,

    /// Enabled solids by slot index, iterated in registration order
    pub(super) solids: BTreeSet<usize>,

    /// Slot indices sorted by descending depth
    draw_order: Vec<usize>,
    draw_order_dirty: bool,

    active: bool,
    locked: bool,

    /// Hooks currently on the call stack
    hook_depth: u32,

    /// Hooks aimed at a running actor, fired once its hook returns
    deferred: Vec<(usize, HookEvent)>,
}

impl World {
    /// Create a new empty world.
    pub fn new() -> Self {
        Self {
            ids: IdAllocator::new(),
            slots: Vec::new(),
            solids: BTreeSet::new(),
            draw_order: Vec::new(),
            draw_order_dirty: true,
            active: false,
            locked: false,
            hook_depth: 0,
            deferred: Vec::new(),
        }
    }

    // =========================================================================
    // Registration
    // =========================================================================

    /// Register an actor with no behaviour.
    pub fn register(&mut self, actor: Actor) -> Result<ActorId, WorldError> {
        self.insert(actor, None)
    }

    /// Register an actor driven by `behavior`.
    pub fn register_with(&mut self, actor: Actor, behavior: impl Behavior) -> Result<ActorId, WorldError> {
        self.insert(actor, Some(Box::new(behavior)))
    }

    fn insert(&mut self, mut actor: Actor, behavior: Option<Box<dyn Behavior>>) -> Result<ActorId, WorldError> {
        if self.locked {
            error!("world: registration after session start (session {})", self.ids.session());
            return Err(WorldError::RegistrationLocked);
        }

        let id = self.ids.allocate();
        let index = self.slots.len();
        debug_assert_eq!(index, id.index());

        actor.id = id;
        actor.disposed = false;
        if actor.enabled && actor.is_solid() {
            self.solids.insert(index);
        }

        self.slots.push(Slot { actor, behavior, running: false });
        self.draw_order_dirty = true;
        Ok(id)
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Run `pre_start` then `start` over every enabled actor, locking
    /// registration in between. Does nothing if already started.
    pub fn start(&mut self) {
        if self.active {
            return;
        }
        self.active = true;

        // Index loop: pre_start may append actors, which are visited too
        let mut i = 0;
        while i < self.slots.len() {
            if self.slots[i].actor.enabled {
                self.run_hook(i, |b, ctx| b.pre_start(ctx));
            }
            i += 1;
        }

        self.locked = true;

        for i in 0..self.slots.len() {
            if self.slots[i].actor.enabled {
                self.run_hook(i, |b, ctx| b.start(ctx));
            }
        }

        debug!(
            "world: session {} started with {} actors ({} solids)",
            self.ids.session(),
            self.slots.len(),
            self.solids.len()
        );
    }

    /// Update every enabled actor in registration order.
    pub fn update(&mut self) {
        if !self.active {
            return;
        }
        for i in 0..self.slots.len() {
            if self.slots[i].actor.enabled {
                self.run_hook(i, |b, ctx| b.update(ctx));
            }
        }
    }

    /// Draw every enabled actor, back to front by depth.
    pub fn draw(&mut self, canvas: &mut dyn Canvas) {
        if !self.active {
            return;
        }
        self.refresh_draw_order();
        for &i in &self.draw_order {
            let slot = &self.slots[i];
            if !slot.actor.enabled {
                continue;
            }
            if let Some(behavior) = slot.behavior.as_deref() {
                behavior.draw(&slot.actor, canvas);
            }
        }
    }

    /// Same order as [`draw`](Self::draw), for screen-space overlays.
    pub fn draw_ui(&mut self, canvas: &mut dyn Canvas) {
        if !self.active {
            return;
        }
        self.refresh_draw_order();
        for &i in &self.draw_order {
            let slot = &self.slots[i];
            if !slot.actor.enabled {
                continue;
            }
            if let Some(behavior) = slot.behavior.as_deref() {
                behavior.draw_ui(&slot.actor, canvas);
            }
        }
    }

    /// Dispose every actor and reset the registry for a new session.
    ///
    /// Does nothing before `start`, and is refused while a hook is running.
    pub fn teardown(&mut self) {
        if !self.active {
            return;
        }
        if self.hook_depth > 0 {
            warn!("world: teardown requested from inside a hook, ignored");
            return;
        }
        self.active = false;

        for slot in &mut self.slots {
            if slot.actor.disposed {
                continue;
            }
            slot.actor.disposed = true;
            if let Some(behavior) = slot.behavior.as_mut() {
                behavior.disposed(&slot.actor);
            }
        }

        let count = self.slots.len();
        self.clear();
        debug!("world: torn down {} actors, now session {}", count, self.ids.session());
    }

    /// Empty the registry for a new session whether or not it was started.
    ///
    /// A started world is torn down. Registrations on an unstarted world are
    /// dropped without hooks, and their ids go stale.
    pub fn reset(&mut self) {
        if self.active {
            self.teardown();
        } else if !self.slots.is_empty() {
            debug!("world: dropped {} unstarted actors", self.slots.len());
            self.clear();
        }
    }

    fn clear(&mut self) {
        self.slots.clear();
        self.solids.clear();
        self.deferred.clear();
        self.draw_order.clear();
        self.draw_order_dirty = true;
        self.ids.reset();
        self.locked = false;
    }

    /// Check out the behaviour of slot `index` and run `hook` on it.
    /// Returns false if the slot has no behaviour or it is already running.
    pub(super) fn run_hook(
        &mut self,
        index: usize,
        hook: impl FnOnce(&mut dyn Behavior, &mut ActorContext<'_>),
    ) -> bool {
        let Some(slot) = self.slots.get_mut(index) else {
            return false;
        };
        let Some(mut behavior) = slot.behavior.take() else {
            return false;
        };
        slot.running = true;
        let id = slot.actor.id;

        self.hook_depth += 1;
        {
            let mut ctx = ActorContext::new(self, id);
            hook(&mut *behavior, &mut ctx);
        }
        self.hook_depth -= 1;

        if let Some(slot) = self.slots.get_mut(index) {
            slot.behavior = Some(behavior);
            slot.running = false;
        }
        self.flush_deferred(index);
        true
    }

    /// Fire `event` on slot `index`, or queue it until the actor's
    /// running hook returns.
    pub(super) fn fire(&mut self, index: usize, event: HookEvent) {
        if self.slots.get(index).is_some_and(|s| s.running) {
            self.deferred.push((index, event));
            return;
        }
        match event {
            HookEvent::Disabled => self.run_hook(index, |b, ctx| b.disabled(ctx)),
            HookEvent::Squished => self.run_hook(index, |b, ctx| b.squished(ctx)),
        };
    }

    fn flush_deferred(&mut self, index: usize) {
        if !self.deferred.iter().any(|&(i, _)| i == index) {
            return;
        }
        let mut events = Vec::new();
        self.deferred.retain(|&(i, event)| {
            if i == index {
                events.push(event);
                false
            } else {
                true
            }
        });
        for event in events {
            self.fire(index, event);
        }
    }

    // =========================================================================
    // Flags
    // =========================================================================

    /// Enable or disable an actor. Disabling fires its `disabled` hook.
    pub fn set_enabled(&mut self, id: ActorId, enabled: bool) -> Result<(), WorldError> {
        let index = self.index_of(id)?;
        self.set_enabled_at(index, enabled);
        Ok(())
    }

    pub(crate) fn set_enabled_at(&mut self, index: usize, enabled: bool) {
        let actor = &mut self.slots[index].actor;
        if actor.enabled == enabled {
            return;
        }
        actor.enabled = enabled;
        let solid = actor.is_solid();

        if enabled {
            if solid {
                self.solids.insert(index);
            }
        } else {
            if solid {
                self.solids.remove(&index);
            }
            self.fire(index, HookEvent::Disabled);
        }
    }

    pub fn set_depth(&mut self, id: ActorId, depth: i32) -> Result<(), WorldError> {
        let index = self.index_of(id)?;
        self.set_depth_at(index, depth);
        Ok(())
    }

    pub(crate) fn set_depth_at(&mut self, index: usize, depth: i32) {
        let actor = &mut self.slots[index].actor;
        if actor.depth != depth {
            actor.depth = depth;
            self.draw_order_dirty = true;
        }
    }

    fn refresh_draw_order(&mut self) {
        if !self.draw_order_dirty {
            return;
        }
        let mut order: Vec<usize> = (0..self.slots.len()).collect();
        // Stable: equal depths keep registration order
        order.sort_by(|&a, &b| self.slots[b].actor.depth.cmp(&self.slots[a].actor.depth));
        self.draw_order = order;
        self.draw_order_dirty = false;
    }

    /// Current draw order (back to front), including disabled actors.
    pub fn draw_order(&mut self) -> Vec<ActorId> {
        self.refresh_draw_order();
        self.draw_order.iter().map(|&i| self.slots[i].actor.id).collect()
    }

    // =========================================================================
    // Queries
    // =========================================================================

    pub(super) fn find_solid_index(
        &self,
        rect: &Rectangle,
        query: Option<TagQuery>,
        exclude: Option<usize>,
    ) -> Option<usize> {
        self.solids.iter().copied().find(|&i| {
            let actor = &self.slots[i].actor;
            Some(i) != exclude
                && actor.enabled
                && tag::accepts(query.as_ref(), actor.tag)
                && actor.solid_intersects(rect)
        })
    }

    /// First enabled, collidable solid overlapping `rect` whose tag passes `query`.
    pub fn find_solid_at(&self, rect: &Rectangle, query: Option<TagQuery>) -> Option<ActorId> {
        self.find_solid_index(rect, query, None).map(|i| self.slots[i].actor.id)
    }

    pub fn solid_meeting(&self, rect: &Rectangle, query: Option<TagQuery>) -> bool {
        self.find_solid_index(rect, query, None).is_some()
    }

    /// Every solid [`find_solid_at`](Self::find_solid_at) would accept, in index order.
    pub fn find_all_solids_at(&self, rect: &Rectangle, query: Option<TagQuery>) -> Vec<ActorId> {
        self.solids
            .iter()
            .map(|&i| &self.slots[i].actor)
            .filter(|a| a.enabled && tag::accepts(query.as_ref(), a.tag) && a.solid_intersects(rect))
            .map(|a| a.id)
            .collect()
    }

    /// Enabled actors whose behaviour is a `T`.
    pub fn query_by_type<T: Behavior>(&self, query: Option<TagQuery>) -> Vec<ActorId> {
        self.slots
            .iter()
            .filter(|s| {
                s.actor.enabled
                    && tag::accepts(query.as_ref(), s.actor.tag)
                    && s.behavior.as_deref().is_some_and(|b| b.as_any().is::<T>())
            })
            .map(|s| s.actor.id)
            .collect()
    }

    /// Every enabled actor passing `query`, in registration order.
    pub fn query_enabled(&self, query: Option<TagQuery>) -> Vec<ActorId> {
        self.slots
            .iter()
            .filter(|s| s.actor.enabled && tag::accepts(query.as_ref(), s.actor.tag))
            .map(|s| s.actor.id)
            .collect()
    }

    /// Is `rider` standing on `solid` (one unit below it overlaps the shape)?
    pub fn is_riding(&self, rider: ActorId, solid: ActorId) -> Result<bool, WorldError> {
        let r = self.index_of(rider)?;
        let s = self.index_of(solid)?;
        if !self.slots[s].actor.is_solid() {
            return Err(WorldError::NotASolid(solid));
        }
        Ok(self.rides(r, s))
    }

    pub(super) fn rides(&self, rider: usize, solid: usize) -> bool {
        let rider = &self.slots[rider].actor;
        if rider.solid().is_some_and(|s| s.shape.is_static()) {
            return false;
        }
        self.slots[solid]
            .actor
            .shape_intersects(&rider.hitbox.shift(Fixed::ZERO, Fixed::UNIT))
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub(crate) fn index_of(&self, id: ActorId) -> Result<usize, WorldError> {
        if self.ids.is_current(id) {
            Ok(id.index())
        } else {
            Err(WorldError::UnknownActor(id))
        }
    }

    pub fn contains(&self, id: ActorId) -> bool {
        self.ids.is_current(id)
    }

    pub fn actor(&self, id: ActorId) -> Option<&Actor> {
        self.index_of(id).ok().map(|i| &self.slots[i].actor)
    }

    pub fn actor_mut(&mut self, id: ActorId) -> Option<&mut Actor> {
        let index = self.index_of(id).ok()?;
        Some(&mut self.slots[index].actor)
    }

    pub(crate) fn actor_at(&self, index: usize) -> &Actor {
        &self.slots[index].actor
    }

    pub(crate) fn actor_at_mut(&mut self, index: usize) -> &mut Actor {
        &mut self.slots[index].actor
    }

    /// Typed access to an actor's behaviour. `None` while its own hook runs.
    pub fn behavior<T: Behavior>(&self, id: ActorId) -> Option<&T> {
        let index = self.index_of(id).ok()?;
        self.slots[index].behavior.as_deref()?.as_any().downcast_ref::<T>()
    }

    pub fn behavior_mut<T: Behavior>(&mut self, id: ActorId) -> Option<&mut T> {
        let index = self.index_of(id).ok()?;
        self.slots[index].behavior.as_deref_mut()?.as_any_mut().downcast_mut::<T>()
    }

    /// Iterate all actors in registration order
    pub fn actors(&self) -> impl Iterator<Item = &Actor> {
        self.slots.iter().map(|s| &s.actor)
    }

    pub fn snapshot(&self) -> Vec<ActorSnapshot> {
        self.actors()
            .map(|a| ActorSnapshot {
                id: a.id.id(),
                hitbox: a.hitbox,
                tag: a.tag,
                depth: a.depth,
                enabled: a.enabled,
                on_ground: a.on_ground,
                solid: a.is_solid(),
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Number of enabled solids in the collision index
    pub fn solid_count(&self) -> usize {
        self.solids.len()
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn session(&self) -> u32 {
        self.ids.session()
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::draw::{Color, DrawCall, RecordingCanvas};
    use crate::game::tag::TagFilter;
    use std::cell::RefCell;
    use std::rc::Rc;

    type Log = Rc<RefCell<Vec<String>>>;

    struct Probe {
        name: &'static str,
        log: Log,
        spawn_child: bool,
    }

    impl Probe {
        fn new(name: &'static str, log: &Log) -> Self {
            Self { name, log: log.clone(), spawn_child: false }
        }

        fn note(&self, event: &str) {
            self.log.borrow_mut().push(format!("{} {}", event, self.name));
        }
    }

    impl Behavior for Probe {
        fn pre_start(&mut self, ctx: &mut ActorContext<'_>) {
            self.note("pre_start");
            if self.spawn_child {
                self.spawn_child = false;
                let child = Probe::new("child", &self.log);
                ctx.register(Actor::body(Rectangle::from_pixels(0, 0, 4, 4)), child).unwrap();
            }
        }

        fn start(&mut self, _ctx: &mut ActorContext<'_>) {
            self.note("start");
        }

        fn update(&mut self, _ctx: &mut ActorContext<'_>) {
            self.note("update");
        }

        fn draw(&self, actor: &Actor, canvas: &mut dyn Canvas) {
            canvas.fill_rect(actor.hitbox(), Color::WHITE);
        }

        fn draw_ui(&self, actor: &Actor, canvas: &mut dyn Canvas) {
            canvas.outline_rect(actor.hitbox(), Color::WHITE);
        }

        fn disabled(&mut self, _ctx: &mut ActorContext<'_>) {
            self.note("disabled");
        }

        fn disposed(&mut self, _actor: &Actor) {
            self.note("disposed");
        }
    }

    struct Other;
    impl Behavior for Other {}

    /// Disables itself on its first update
    #[derive(Default)]
    struct SelfDisabler {
        disabled_calls: u32,
        updates: u32,
    }

    impl Behavior for SelfDisabler {
        fn update(&mut self, ctx: &mut ActorContext<'_>) {
            self.updates += 1;
            let id = ctx.id();
            ctx.world_mut().set_enabled(id, false).unwrap();
            // Hook runs after this one returns, not inside it
            assert_eq!(self.disabled_calls, 0);
        }

        fn disabled(&mut self, _ctx: &mut ActorContext<'_>) {
            self.disabled_calls += 1;
        }
    }

    fn body() -> Actor {
        Actor::body(Rectangle::from_pixels(0, 0, 8, 8))
    }

    fn take(log: &Log) -> Vec<String> {
        std::mem::take(&mut *log.borrow_mut())
    }

    #[test]
    fn test_registration_locks_after_start() {
        let mut world = World::new();
        world.register(body()).unwrap();
        world.start();
        assert!(world.is_locked());
        assert_eq!(world.register(body()), Err(WorldError::RegistrationLocked));
        assert_eq!(world.len(), 1);
    }

    #[test]
    fn test_ids_strictly_increase() {
        let mut world = World::new();
        let ids: Vec<_> = (0..5).map(|_| world.register(body()).unwrap()).collect();
        for pair in ids.windows(2) {
            assert!(pair[0].id() < pair[1].id());
        }
    }

    #[test]
    fn test_pre_start_registrations_are_visited() {
        let log = Log::default();
        let mut world = World::new();
        let mut parent = Probe::new("parent", &log);
        parent.spawn_child = true;
        world.register_with(body(), parent).unwrap();
        world.register_with(body(), Probe::new("sibling", &log)).unwrap();

        world.start();
        assert_eq!(world.len(), 3);
        assert_eq!(
            take(&log),
            vec![
                "pre_start parent",
                "pre_start sibling",
                "pre_start child",
                "start parent",
                "start sibling",
                "start child",
            ]
        );
    }

    #[test]
    fn test_disabled_actors_skip_hooks() {
        let log = Log::default();
        let mut world = World::new();
        world.register_with(body().with_enabled(false), Probe::new("off", &log)).unwrap();
        let on = world.register_with(body(), Probe::new("on", &log)).unwrap();
        world.start();
        world.update();
        assert_eq!(take(&log), vec!["pre_start on", "start on", "update on"]);

        world.set_enabled(on, false).unwrap();
        world.set_enabled(on, false).unwrap();
        world.update();
        assert_eq!(take(&log), vec!["disabled on"]);
    }

    #[test]
    fn test_update_before_start_does_nothing() {
        let log = Log::default();
        let mut world = World::new();
        world.register_with(body(), Probe::new("a", &log)).unwrap();
        world.update();
        world.teardown();
        assert!(take(&log).is_empty());
        assert_eq!(world.len(), 1);
    }

    #[test]
    fn test_disabling_a_solid_updates_index() {
        let mut world = World::new();
        let solid = world.register(Actor::solid_box(Rectangle::from_pixels(0, 0, 16, 16))).unwrap();
        let probe = Rectangle::from_pixels(4, 4, 4, 4);
        assert_eq!(world.solid_count(), 1);
        assert_eq!(world.find_solid_at(&probe, None), Some(solid));

        world.set_enabled(solid, false).unwrap();
        assert_eq!(world.solid_count(), 0);
        assert_eq!(world.find_solid_at(&probe, None), None);

        world.set_enabled(solid, true).unwrap();
        assert_eq!(world.solid_count(), 1);
        assert!(world.solid_meeting(&probe, None));
    }

    #[test]
    fn test_find_solid_respects_tags_and_order() {
        let mut world = World::new();
        let area = Rectangle::from_pixels(0, 0, 16, 16);
        let enemy_wall = world.register(Actor::solid_box(area).with_tag(Tag::ENEMY_COLLIDABLE)).unwrap();
        let player_wall = world.register(Actor::solid_box(area).with_tag(Tag::PLAYER_COLLIDABLE)).unwrap();
        let probe = Rectangle::from_pixels(2, 2, 2, 2);

        assert_eq!(world.find_solid_at(&probe, None), Some(enemy_wall));
        assert_eq!(world.find_solid_at(&probe, Some(TagQuery::any_of(Tag::PLAYER_COLLIDABLE))), Some(player_wall));
        assert_eq!(
            world.find_solid_at(&probe, Some(TagQuery::new(Tag::PLAYER_COLLIDABLE, TagFilter::None))),
            Some(enemy_wall)
        );
        assert_eq!(world.find_all_solids_at(&probe, None), vec![enemy_wall, player_wall]);
        assert!(world.find_all_solids_at(&Rectangle::from_pixels(16, 0, 4, 4), None).is_empty());
    }

    #[test]
    fn test_draw_order_descending_depth_and_stable() {
        let mut world = World::new();
        let a = world.register(body().with_depth(0)).unwrap();
        let b = world.register(body().with_depth(50)).unwrap();
        let c = world.register(body().with_depth(0)).unwrap();
        assert_eq!(world.draw_order(), vec![b, a, c]);

        world.set_depth(c, 100).unwrap();
        assert_eq!(world.draw_order(), vec![c, b, a]);
    }

    #[test]
    fn test_draw_skips_disabled() {
        let log = Log::default();
        let mut world = World::new();
        let hidden = world.register_with(body().with_depth(10), Probe::new("hidden", &log)).unwrap();
        world.register_with(Actor::body(Rectangle::from_pixels(1, 1, 1, 1)), Probe::new("shown", &log)).unwrap();
        world.start();
        world.set_enabled(hidden, false).unwrap();

        let mut canvas = RecordingCanvas::default();
        world.draw(&mut canvas);
        assert_eq!(canvas.calls, vec![DrawCall::Fill(Rectangle::from_pixels(1, 1, 1, 1), Color::WHITE)]);
    }

    #[test]
    fn test_teardown_disposes_and_resets() {
        let log = Log::default();
        let mut world = World::new();
        let old = world.register_with(body(), Probe::new("a", &log)).unwrap();
        world.register_with(body().with_enabled(false), Probe::new("b", &log)).unwrap();
        world.start();
        take(&log);

        world.teardown();
        assert_eq!(take(&log), vec!["disposed a", "disposed b"]);
        assert!(world.is_empty());
        assert!(!world.is_locked());
        assert!(!world.is_active());
        assert!(world.actor(old).is_none());
        assert_eq!(world.set_enabled(old, false), Err(WorldError::UnknownActor(old)));

        // Numbering restarts for the new session
        let fresh = world.register(body()).unwrap();
        assert_eq!(fresh.id(), 0);
        assert_ne!(fresh, old);
    }

    #[test]
    fn test_query_by_type() {
        let log = Log::default();
        let mut world = World::new();
        let p = world.register_with(body().with_tag(Tag(4)), Probe::new("p", &log)).unwrap();
        let q = world.register_with(body(), Probe::new("q", &log)).unwrap();
        world.register_with(body(), Other).unwrap();
        world.register(body()).unwrap();

        assert_eq!(world.query_by_type::<Probe>(None), vec![p, q]);
        assert_eq!(world.query_by_type::<Probe>(Some(TagQuery::any_of(Tag(4)))), vec![p]);
        assert_eq!(world.query_enabled(None).len(), 4);
        assert!(world.behavior::<Other>(p).is_none());
        assert_eq!(world.behavior::<Probe>(q).map(|b| b.name), Some("q"));
    }

    #[test]
    fn test_is_riding() {
        let mut world = World::new();
        let floor = world.register(Actor::solid_box(Rectangle::from_pixels(0, 16, 32, 16))).unwrap();
        let rider = world.register(Actor::body(Rectangle::from_pixels(4, 8, 8, 8))).unwrap();
        let floater = world.register(Actor::body(Rectangle::from_pixels(4, 0, 8, 8))).unwrap();

        assert_eq!(world.is_riding(rider, floor), Ok(true));
        assert_eq!(world.is_riding(floater, floor), Ok(false));
        assert_eq!(world.is_riding(rider, floater), Err(WorldError::NotASolid(floater)));
        assert_eq!(world.is_riding(ActorId::NULL, floor), Err(WorldError::UnknownActor(ActorId::NULL)));
    }

    #[test]
    fn test_snapshot() {
        let mut world = World::new();
        world.register(body().with_tag(Tag::PLAYER_COLLIDABLE)).unwrap();
        world.register(Actor::solid_box(Rectangle::from_pixels(0, 0, 1, 1))).unwrap();
        let snap = world.snapshot();
        assert_eq!(snap.len(), 2);
        assert_eq!(snap[0].tag, Tag::PLAYER_COLLIDABLE);
        assert!(!snap[0].solid);
        assert!(snap[1].solid);
    }

    #[test]
    fn test_self_disable_fires_disabled_once() {
        let mut world = World::new();
        let id = world.register_with(body(), SelfDisabler::default()).unwrap();
        world.start();
        world.update();
        world.update();

        let behavior = world.behavior::<SelfDisabler>(id).unwrap();
        assert_eq!(behavior.disabled_calls, 1);
        assert_eq!(behavior.updates, 1);
        assert!(!world.actor(id).unwrap().is_enabled());
    }

    #[test]
    fn test_start_twice_runs_hooks_once() {
        let log = Log::default();
        let mut world = World::new();
        world.register_with(body(), Probe::new("a", &log)).unwrap();
        world.start();
        world.start();
        assert_eq!(take(&log), vec!["pre_start a", "start a"]);
        assert!(world.is_active());
    }

    #[test]
    fn test_draw_ui_follows_draw_order() {
        let log = Log::default();
        let mut world = World::new();
        let rect = |x| Rectangle::from_pixels(x, 0, 1, 1);
        world.register_with(Actor::body(rect(0)).with_depth(0), Probe::new("a", &log)).unwrap();
        world.register_with(Actor::body(rect(1)).with_depth(50), Probe::new("b", &log)).unwrap();
        world.register_with(Actor::body(rect(2)).with_depth(0), Probe::new("c", &log)).unwrap();
        world.start();

        let mut canvas = RecordingCanvas::default();
        world.draw_ui(&mut canvas);
        assert_eq!(
            canvas.calls,
            vec![
                DrawCall::Outline(rect(1), Color::WHITE),
                DrawCall::Outline(rect(0), Color::WHITE),
                DrawCall::Outline(rect(2), Color::WHITE),
            ]
        );
    }

    #[test]
    fn test_reset_drops_unstarted_actors() {
        let log = Log::default();
        let mut world = World::new();
        let old = world.register_with(body(), Probe::new("a", &log)).unwrap();
        world.reset();
        assert!(world.is_empty());
        assert!(!world.contains(old));
        assert!(take(&log).is_empty());

        let fresh = world.register(body()).unwrap();
        world.start();
        world.reset();
        assert!(!world.is_active());
        assert!(!world.contains(fresh));
    }
}
