//! Solid box behaviors: a static block and a platform that shuttles back
//! and forth, carrying whatever stands on it.

use crate::math::{Fixed, FixedPoint, Rectangle};

use super::actor::{Actor, ActorContext, Behavior};
use super::draw::{Canvas, Color};
use super::tag::Tag;

const CHECKER_CELL: i32 = 8;
const CHECKER_DARK: Color = Color::hex(0x24213d);
const CHECKER_LIGHT: Color = Color::hex(0x76428a);
const SOLID_DEPTH: i32 = 50;

/// Paint `hitbox` as a checkerboard clipped to its bounds, then outline it.
fn draw_checker(hitbox: Rectangle, canvas: &mut dyn Canvas) {
    let cell = Fixed::from_pixels(CHECKER_CELL);
    let mut row = 0;
    let mut y = hitbox.top();
    while y < hitbox.bottom() {
        let mut col = 0;
        let mut x = hitbox.left();
        while x < hitbox.right() {
            let tile = Rectangle::new(x, y, cell, cell);
            if let Some(clipped) = tile.intersection(&hitbox) {
                let color = if (row + col) % 2 == 0 { CHECKER_DARK } else { CHECKER_LIGHT };
                canvas.fill_rect(clipped, color);
            }
            x += cell;
            col += 1;
        }
        y += cell;
        row += 1;
    }
    canvas.outline_rect(hitbox, Color::RED);
}

/// Static solid block
#[derive(Debug, Default)]
pub struct SolidBox;

impl SolidBox {
    pub fn actor(hitbox: Rectangle) -> Actor {
        Actor::solid_box(hitbox)
            .with_tag(Tag::PLAYER_COLLIDABLE | Tag::ENEMY_COLLIDABLE)
            .with_depth(SOLID_DEPTH)
    }
}

impl Behavior for SolidBox {
    fn draw(&self, actor: &Actor, canvas: &mut dyn Canvas) {
        draw_checker(actor.hitbox(), canvas);
    }
}

/// Solid box moving at a constant velocity, reversing every `period` frames
#[derive(Debug)]
pub struct MovingPlatform {
    velocity: FixedPoint,
    period: u32,
    frame: u32,
}

impl MovingPlatform {
    pub fn new(velocity: FixedPoint, period: u32) -> Self {
        Self { velocity, period: period.max(1), frame: 0 }
    }

    pub fn velocity(&self) -> FixedPoint {
        self.velocity
    }
}

impl Behavior for MovingPlatform {
    fn update(&mut self, ctx: &mut ActorContext<'_>) {
        ctx.move_solid(self.velocity.x, self.velocity.y);
        self.frame += 1;
        if self.frame >= self.period {
            self.frame = 0;
            self.velocity = -self.velocity;
        }
    }

    fn draw(&self, actor: &Actor, canvas: &mut dyn Canvas) {
        draw_checker(actor.hitbox(), canvas);
    }
}
