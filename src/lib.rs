//! MageQuest: deterministic physics core for a 2D tile platformer
//!
//! - [`math`]: 9-bit fixed-point scalars, points, and rectangles
//! - [`game`]: actors, the world registry, movement, solid carrying,
//!   coroutines, and the frame driver
//! - [`world`]: level data and loading
//! - [`config`]: RON configuration
//!
//! The library never touches a window. The `magequest` binary hosts it with
//! macroquad.

/// Version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod config;
pub mod game;
pub mod math;
pub mod world;
