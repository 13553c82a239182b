//! Frame driver
//!
//! [`Runtime`] owns the session state and both coroutine runners, and runs
//! one fixed-rate tick at a time:
//!
//! 1. global coroutines (screen transitions, level resets)
//! 2. unless paused: level coroutines, actor updates, level frame counter
//! 3. a pending level reload, if one was requested this tick
//! 4. the screen fade and the global frame counter
//!
//! Level coroutines are stopped whenever the level is rebuilt; global ones
//! survive.

use log::{debug, warn};

use crate::config::GameConfig;
use crate::world::LevelData;

use super::coroutine::{CoroutineRunner, Script};
use super::draw::Canvas;
use super::entity::ActorId;
use super::fade::{fade_in, fade_out, HasFade, ScreenFade};
use super::player::{Player, PlayerInput};
use super::world::{World, WorldError};

/// Name of the global coroutine that runs screen transitions
pub const FADE_ROUTINE: &str = "fade";

/// Everything coroutines can touch
pub struct Session {
    pub world: World,
    pub fade: ScreenFade,
    pub paused: bool,
    /// Ticks simulated in the current level, excluding paused ones
    pub frame: u64,
    /// Ticks since the runtime started
    pub global_frame: u64,
    config: GameConfig,
    level: Option<LevelData>,
    entrance: usize,
    player: Option<ActorId>,
    reload_requested: bool,
}

impl Session {
    fn new(config: GameConfig) -> Self {
        Self {
            world: World::new(),
            fade: ScreenFade::new(),
            paused: false,
            frame: 0,
            global_frame: 0,
            config,
            level: None,
            entrance: 0,
            player: None,
            reload_requested: false,
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn level(&self) -> Option<&LevelData> {
        self.level.as_ref()
    }

    pub fn entrance(&self) -> usize {
        self.entrance
    }

    pub fn player(&self) -> Option<ActorId> {
        self.player
    }

    /// Rebuild the current level at the end of this tick.
    pub fn request_reload(&mut self) {
        self.reload_requested = true;
    }

    pub fn reload_pending(&self) -> bool {
        self.reload_requested
    }

    fn rebuild(&mut self) -> Result<Option<ActorId>, WorldError> {
        self.player = None;
        self.frame = 0;
        let Some(level) = self.level.as_ref() else {
            warn!("runtime: reload requested with no level loaded");
            return Ok(None);
        };
        self.player = level.load_into(&mut self.world, self.entrance, &self.config.player)?;
        Ok(self.player)
    }
}

impl HasFade for Session {
    fn fade(&self) -> &ScreenFade {
        &self.fade
    }

    fn fade_mut(&mut self) -> &mut ScreenFade {
        &mut self.fade
    }
}

pub struct Runtime {
    session: Session,
    global: CoroutineRunner<Session>,
    level: CoroutineRunner<Session>,
}

impl Runtime {
    pub fn new(config: GameConfig) -> Self {
        Self {
            session: Session::new(config),
            global: CoroutineRunner::new(),
            level: CoroutineRunner::new(),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    pub fn world(&self) -> &World {
        &self.session.world
    }

    pub fn global_coroutines(&mut self) -> &mut CoroutineRunner<Session> {
        &mut self.global
    }

    pub fn level_coroutines(&mut self) -> &mut CoroutineRunner<Session> {
        &mut self.level
    }

    /// Make `level` current and build it with the player at `entrance`.
    pub fn load_level(&mut self, level: LevelData, entrance: usize) -> Result<Option<ActorId>, WorldError> {
        debug!("runtime: loading level {} at entrance {}", level.id, entrance);
        self.level.stop_all();
        self.session.level = Some(level);
        self.session.entrance = entrance;
        self.session.reload_requested = false;
        self.session.rebuild()
    }

    /// Advance one fixed-rate tick.
    pub fn tick(&mut self) -> Result<(), WorldError> {
        self.global.update(&mut self.session);

        if !self.session.paused {
            self.level.update(&mut self.session);
            self.session.world.update();
            self.session.frame += 1;
        }

        if self.session.reload_requested {
            self.session.reload_requested = false;
            self.level.stop_all();
            self.session.rebuild()?;
        }

        self.session.fade.update();
        self.session.global_frame += 1;
        Ok(())
    }

    /// Fade out, rebuild the current level, fade back in.
    ///
    /// Returns false if a transition is already running or nothing is loaded.
    pub fn reset_level(&mut self) -> bool {
        if self.session.level.is_none() {
            warn!("runtime: reset requested with no level loaded");
            return false;
        }
        let script = fade_out::<Session>()
            .then(|session: &mut Session, _| session.request_reload())
            .chain(fade_in());
        self.global.try_run(FADE_ROUTINE, script, 0).is_some()
    }

    pub fn is_transitioning(&self) -> bool {
        self.global.is_running(FADE_ROUTINE)
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.session.paused = paused;
    }

    pub fn is_paused(&self) -> bool {
        self.session.paused
    }

    /// Forward this tick's controls to the player, if there is one.
    pub fn set_player_input(&mut self, input: PlayerInput) {
        let Some(id) = self.session.player else {
            return;
        };
        if let Some(player) = self.session.world.behavior_mut::<Player>(id) {
            player.set_input(input);
        }
    }

    pub fn draw(&mut self, canvas: &mut dyn Canvas) {
        self.session.world.draw(canvas);
    }

    pub fn draw_ui(&mut self, canvas: &mut dyn Canvas) {
        self.session.world.draw_ui(canvas);
    }
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new(GameConfig::default())
    }
}

/// A script that runs `action` once, `frames` ticks after it starts
pub fn after_frames(frames: u32, action: impl FnMut(&mut Session, &mut CoroutineRunner<Session>) + 'static) -> Script<Session> {
    Script::new().wait(frames).then(action)
}
