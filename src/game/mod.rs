//! Game Foundation Module
//!
//! A deterministic, single-threaded actor framework for a 2D tile platformer.
//! All positions are 9-bit fixed-point so a run replays bit-for-bit from the
//! same inputs.
//!
//! Key concepts:
//! - Actor: a hitbox plus an optional [`Behavior`] with lifecycle hooks
//! - Solid: an actor other actors collide with (a box, or a static tile grid)
//! - World: the registry owning every actor of one level session
//! - Coroutine: frame-stepped scripts driven by a [`CoroutineRunner`]
//!
//! Movement resolves one raw unit at a time, climbing and descending
//! one-unit slopes. Moving a solid box pushes actors out of its way and
//! carries the ones riding it.

pub mod tag;
pub mod entity;
pub mod shape;
pub mod actor;
pub mod world;
pub mod movement;
pub mod carrier;
pub mod coroutine;
pub mod draw;
pub mod fade;
pub mod player;
pub mod platform;
pub mod runtime;

// Re-export main types
pub use actor::{Actor, ActorContext, ActorKind, Behavior, SolidState};
pub use coroutine::{Coroutine, CoroutineError, CoroutineHandle, CoroutineRunner, Script, Step};
pub use draw::{Canvas, Color, DrawCall, RecordingCanvas};
pub use entity::{ActorId, IdAllocator};
pub use fade::{FadeState, HasFade, ScreenFade};
pub use movement::MoveOutcome;
pub use platform::{MovingPlatform, SolidBox};
pub use player::{Player, PlayerInput};
pub use runtime::{Runtime, Session};
pub use shape::{SolidShape, TileGrid};
pub use tag::{Tag, TagFilter, TagQuery};
pub use world::{ActorSnapshot, World, WorldError};
