//! Drawing surface
//!
//! The simulation never talks to a graphics API. Draw hooks paint through
//! [`Canvas`], which the host implements for whatever backend it uses.

use crate::math::Rectangle;

/// Packed 0xRRGGBB color with separate alpha
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub rgb: u32,
    pub alpha: u8,
}

impl Color {
    pub const BLACK: Color = Color::hex(0x000000);
    pub const WHITE: Color = Color::hex(0xffffff);
    pub const RED: Color = Color::hex(0xff0000);

    /// Opaque color from 0xRRGGBB
    pub const fn hex(rgb: u32) -> Self {
        Self { rgb: rgb & 0x00ff_ffff, alpha: 255 }
    }

    pub const fn with_alpha(self, alpha: u8) -> Self {
        Self { rgb: self.rgb, alpha }
    }

    pub const fn r(&self) -> u8 {
        (self.rgb >> 16) as u8
    }

    pub const fn g(&self) -> u8 {
        (self.rgb >> 8) as u8
    }

    pub const fn b(&self) -> u8 {
        self.rgb as u8
    }
}

/// Target for draw hooks. Rectangles are in fixed-point world space.
pub trait Canvas {
    fn fill_rect(&mut self, rect: Rectangle, color: Color);
    fn outline_rect(&mut self, rect: Rectangle, color: Color);
}

/// Canvas that records every call, for tests and headless runs
#[derive(Debug, Default)]
pub struct RecordingCanvas {
    pub calls: Vec<DrawCall>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawCall {
    Fill(Rectangle, Color),
    Outline(Rectangle, Color),
}

impl Canvas for RecordingCanvas {
    fn fill_rect(&mut self, rect: Rectangle, color: Color) {
        self.calls.push(DrawCall::Fill(rect, color));
    }

    fn outline_rect(&mut self, rect: Rectangle, color: Color) {
        self.calls.push(DrawCall::Outline(rect, color));
    }
}
