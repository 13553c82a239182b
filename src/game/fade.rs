//! Screen fade transitions
//!
//! A small state machine advanced once per frame. Scripts built by
//! [`fade_out`], [`fade_in`] and [`fade_in_out`] drive it from a coroutine
//! and finish once the fade settles. Painting the overlay is up to the host;
//! it only needs [`ScreenFade::opacity`].

use super::coroutine::Script;

/// Frames a full fade takes
pub const MAX_FADE: u32 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FadeState {
    /// Nothing on screen
    #[default]
    Idle,
    /// Covering the screen
    FadeOut,
    /// Uncovering the screen
    FadeIn,
    /// Fully covered
    IdleOut,
    /// Fully uncovered, waiting to go idle
    IdleIn,
}

#[derive(Debug, Clone, Default)]
pub struct ScreenFade {
    state: FadeState,
    progress: u32,
}

impl ScreenFade {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> FadeState {
        self.state
    }

    /// Frames into the current fade, 0..=MAX_FADE
    pub fn progress(&self) -> u32 {
        self.progress
    }

    /// Switch state. Progress restarts only when the state actually changes.
    pub fn set_state(&mut self, state: FadeState) {
        if self.state != state {
            self.state = state;
            self.progress = 0;
        }
    }

    /// Advance one frame
    pub fn update(&mut self) {
        let settled = match self.state {
            FadeState::FadeOut => FadeState::IdleOut,
            FadeState::FadeIn => FadeState::IdleIn,
            _ => return,
        };
        self.progress = (self.progress + 1).min(MAX_FADE);
        if self.progress == MAX_FADE {
            self.state = settled;
        }
    }

    /// Overlay coverage, 0 (clear) to 255 (covered)
    pub fn opacity(&self) -> u8 {
        let covered = match self.state {
            FadeState::Idle | FadeState::IdleIn => 0,
            FadeState::IdleOut => MAX_FADE,
            FadeState::FadeOut => self.progress,
            FadeState::FadeIn => MAX_FADE - self.progress,
        };
        (covered * 255 / MAX_FADE) as u8
    }

    pub fn is_covered(&self) -> bool {
        self.state == FadeState::IdleOut
    }
}

/// Access to the fade from a coroutine context
pub trait HasFade {
    fn fade(&self) -> &ScreenFade;
    fn fade_mut(&mut self) -> &mut ScreenFade;
}

impl HasFade for ScreenFade {
    fn fade(&self) -> &ScreenFade {
        self
    }

    fn fade_mut(&mut self) -> &mut ScreenFade {
        self
    }
}

fn fade_to<C: HasFade + 'static>(start: FadeState, settled: FadeState) -> Script<C> {
    Script::new()
        .then(move |ctx: &mut C, _| ctx.fade_mut().set_state(start))
        .until(move |ctx: &C| ctx.fade().state() == settled)
}

/// Cover the screen and stay covered
pub fn fade_out<C: HasFade + 'static>() -> Script<C> {
    fade_to(FadeState::FadeOut, FadeState::IdleOut)
}

/// Uncover the screen, then go idle
pub fn fade_in<C: HasFade + 'static>() -> Script<C> {
    fade_to(FadeState::FadeIn, FadeState::IdleIn).then(|ctx: &mut C, _| ctx.fade_mut().set_state(FadeState::Idle))
}

/// Cover, then uncover, then go idle
pub fn fade_in_out<C: HasFade + 'static>() -> Script<C> {
    fade_out().chain(fade_in())
}
