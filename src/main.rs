//! MageQuest demo host
//!
//! Runs the platformer core in a macroquad window at a fixed tick rate.
//! Arrow keys walk, Z or Space jumps, R restarts the level, P pauses.
//! Pass a `.ron` level path as the first argument to play it instead of the
//! built-in room.

use macroquad::prelude::*;

use magequest::config::GameConfig;
use magequest::game::{Canvas, Color as GameColor, PlayerInput, Runtime};
use magequest::math::Rectangle;
use magequest::world::{demo_level, load_level, LevelData};
use magequest::VERSION;

const CONFIG_PATH: &str = "magequest.ron";
/// Most ticks simulated per rendered frame before the clock gives up
const MAX_CATCH_UP: f64 = 5.0;

fn window_conf() -> Conf {
    let defaults = GameConfig::default();
    Conf {
        window_title: format!("MageQuest v{}", VERSION),
        window_width: defaults.screen.0 * defaults.pixel_scale as i32,
        window_height: defaults.screen.1 * defaults.pixel_scale as i32,
        window_resizable: true,
        ..Default::default()
    }
}

/// Paints world-space rectangles scaled to the window
struct MacroquadCanvas {
    scale: f32,
    offset: Vec2,
}

impl MacroquadCanvas {
    fn to_screen(&self, rect: Rectangle) -> (f32, f32, f32, f32) {
        (
            self.offset.x + rect.x.to_f32() * self.scale,
            self.offset.y + rect.y.to_f32() * self.scale,
            rect.width.to_f32() * self.scale,
            rect.height.to_f32() * self.scale,
        )
    }
}

fn to_mq(color: GameColor) -> Color {
    Color::from_rgba(color.r(), color.g(), color.b(), color.alpha)
}

impl Canvas for MacroquadCanvas {
    fn fill_rect(&mut self, rect: Rectangle, color: GameColor) {
        let (x, y, w, h) = self.to_screen(rect);
        draw_rectangle(x, y, w, h, to_mq(color));
    }

    fn outline_rect(&mut self, rect: Rectangle, color: GameColor) {
        let (x, y, w, h) = self.to_screen(rect);
        draw_rectangle_lines(x, y, w, h, self.scale.max(1.0), to_mq(color));
    }
}

fn initial_level() -> LevelData {
    let Some(path) = std::env::args().nth(1) else {
        return demo_level();
    };
    match load_level(&path) {
        Ok(level) => {
            log::info!("Loaded level {} from {}", level.id, path);
            level
        }
        Err(e) => {
            log::error!("Failed to load level {}: {}, using the demo level", path, e);
            demo_level()
        }
    }
}

fn read_input() -> PlayerInput {
    let right = is_key_down(KeyCode::Right) as i32;
    let left = is_key_down(KeyCode::Left) as i32;
    PlayerInput {
        x: right - left,
        jump: is_key_down(KeyCode::Z) || is_key_down(KeyCode::Space),
    }
}

#[macroquad::main(window_conf)]
async fn main() {
    // Initialize crash logging FIRST (before any other code)
    #[cfg(not(target_arch = "wasm32"))]
    {
        crashlog::setup!(crashlog::cargo_metadata!().capitalized(), false);
        env_logger::init();
    }

    let config = GameConfig::load_or_default(CONFIG_PATH);
    let tick = config.tick_seconds();
    let (game_w, game_h) = (config.screen.0 as f32, config.screen.1 as f32);

    let mut runtime = Runtime::new(config);
    if let Err(e) = runtime.load_level(initial_level(), 0) {
        log::error!("Failed to build level: {}", e);
    }

    let mut accumulator = 0.0f64;
    loop {
        if is_key_pressed(KeyCode::Escape) {
            break;
        }
        if is_key_pressed(KeyCode::R) {
            runtime.reset_level();
        }
        if is_key_pressed(KeyCode::P) {
            let paused = runtime.is_paused();
            runtime.set_paused(!paused);
        }
        runtime.set_player_input(read_input());

        accumulator = (accumulator + get_frame_time() as f64).min(tick * MAX_CATCH_UP);
        while accumulator >= tick {
            if let Err(e) = runtime.tick() {
                log::error!("Tick failed: {}", e);
            }
            accumulator -= tick;
        }

        clear_background(BLACK);
        let scale = (screen_width() / game_w).min(screen_height() / game_h).floor().max(1.0);
        let offset = vec2((screen_width() - game_w * scale) / 2.0, (screen_height() - game_h * scale) / 2.0);
        let mut canvas = MacroquadCanvas { scale, offset };
        runtime.draw(&mut canvas);
        runtime.draw_ui(&mut canvas);

        let opacity = runtime.session().fade.opacity();
        if opacity > 0 {
            draw_rectangle(offset.x, offset.y, game_w * scale, game_h * scale, Color::from_rgba(0, 0, 0, opacity));
        }
        if runtime.is_paused() {
            draw_text("PAUSED", offset.x + 8.0, offset.y + 24.0, 24.0, WHITE);
        }

        next_frame().await;
    }
}
