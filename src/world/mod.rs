//! World module - level data for the platformer core
//!
//! Tile grids, entrances, and platforms described as plain data, loaded from
//! RON files and turned into actors in a [`crate::game::World`].

mod level;

pub use level::*;
