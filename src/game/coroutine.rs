//! Coroutine scheduler
//!
//! Frame-stepped cooperative tasks for scripted sequences (fades, level
//! transitions, timed events). A coroutine is resumable state: each
//! [`resume`](Coroutine::resume) runs until the next suspension point and
//! reports how long to sleep.
//!
//! Coroutines are keyed by name and resumed in the order they were started.
//! Starting or stopping coroutines from inside a running coroutine is safe:
//! new ones are buffered and join after the current pass, and finished ones
//! are removed only once the pass is over.

use std::collections::VecDeque;
use std::fmt;

use log::{trace, warn};

/// What a coroutine wants after a resume
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Resume on the next update
    Wait,
    /// Resume on the n-th update from now
    WaitFrames(u32),
    /// Finished; remove it
    Done,
}

/// A resumable computation driven by a [`CoroutineRunner`].
pub trait Coroutine<C> {
    fn resume(&mut self, ctx: &mut C, runner: &mut CoroutineRunner<C>) -> Step;
}

/// Coroutine backed by a closure, see [`from_fn`].
pub struct FromFn<F>(F);

impl<C, F> Coroutine<C> for FromFn<F>
where
    F: FnMut(&mut C, &mut CoroutineRunner<C>) -> Step,
{
    fn resume(&mut self, ctx: &mut C, runner: &mut CoroutineRunner<C>) -> Step {
        (self.0)(ctx, runner)
    }
}

/// Wrap a closure as a coroutine. The closure is called once per resume.
pub fn from_fn<C, F>(f: F) -> FromFn<F>
where
    F: FnMut(&mut C, &mut CoroutineRunner<C>) -> Step,
{
    FromFn(f)
}

/// Error type for scheduler lookups
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoroutineError {
    NotFound(String),
}

impl fmt::Display for CoroutineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoroutineError::NotFound(name) => write!(f, "no coroutine named '{}'", name),
        }
    }
}

impl std::error::Error for CoroutineError {}

// =============================================================================
// Handles and runner
// =============================================================================

/// A scheduled coroutine
pub struct CoroutineHandle<C> {
    name: String,
    serial: u64,
    /// Updates left before the next resume
    delay: u32,
    /// Checked out while resuming
    routine: Option<Box<dyn Coroutine<C>>>,
}

impl<C> CoroutineHandle<C> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn delay(&self) -> u32 {
        self.delay
    }

    /// Unique per start, even when a name is reused
    pub fn serial(&self) -> u64 {
        self.serial
    }
}

impl<C> fmt::Debug for CoroutineHandle<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CoroutineHandle")
            .field("name", &self.name)
            .field("serial", &self.serial)
            .field("delay", &self.delay)
            .finish()
    }
}

/// Owns coroutines and resumes them once per [`update`](Self::update).
///
/// `C` is the context every coroutine receives mutably.
pub struct CoroutineRunner<C> {
    handles: Vec<CoroutineHandle<C>>,
    /// Started during a pass, merged after it
    pending: Vec<CoroutineHandle<C>>,
    /// Serials that returned `Done` this pass
    finished: Vec<u64>,
    running: bool,
    next_serial: u64,
}

impl<C> CoroutineRunner<C> {
    pub fn new() -> Self {
        Self {
            handles: Vec::new(),
            pending: Vec::new(),
            finished: Vec::new(),
            running: false,
            next_serial: 0,
        }
    }

    fn live_position(&self, name: &str) -> Option<usize> {
        self.handles
            .iter()
            .position(|h| h.name == name && !self.finished.contains(&h.serial))
    }

    fn position_of(&self, serial: u64) -> Option<usize> {
        self.handles.iter().position(|h| h.serial == serial)
    }

    /// Start `routine` under `name`, first resumed after `delay` updates
    /// (0 or 1 means the next update).
    ///
    /// If `name` is already running, nothing changes and the existing handle
    /// is returned.
    pub fn run(
        &mut self,
        name: impl Into<String>,
        routine: impl Coroutine<C> + 'static,
        delay: u32,
    ) -> &CoroutineHandle<C> {
        let name = name.into();
        if let Some(pos) = self.live_position(&name) {
            return &self.handles[pos];
        }
        if let Some(pos) = self.pending.iter().position(|h| h.name == name) {
            return &self.pending[pos];
        }

        let serial = self.next_serial;
        self.next_serial += 1;
        trace!("coroutine: start '{}' (delay {})", name, delay);

        let handle = CoroutineHandle { name, serial, delay, routine: Some(Box::new(routine)) };
        let target = if self.running { &mut self.pending } else { &mut self.handles };
        let index = target.len();
        target.push(handle);
        &target[index]
    }

    /// Like [`run`](Self::run), but `None` if `name` is already running.
    pub fn try_run(
        &mut self,
        name: impl Into<String>,
        routine: impl Coroutine<C> + 'static,
        delay: u32,
    ) -> Option<&CoroutineHandle<C>> {
        let name = name.into();
        if self.is_running(&name) {
            return None;
        }
        Some(self.run(name, routine, delay))
    }

    /// Stop whatever runs under `name`, then start `routine`.
    pub fn restart(
        &mut self,
        name: impl Into<String>,
        routine: impl Coroutine<C> + 'static,
        delay: u32,
    ) -> &CoroutineHandle<C> {
        let name = name.into();
        self.stop(&name);
        self.run(name, routine, delay)
    }

    /// Remove a coroutine immediately. Returns whether one was running.
    pub fn stop(&mut self, name: &str) -> bool {
        if let Some(pos) = self.live_position(name) {
            self.handles.remove(pos);
            trace!("coroutine: stop '{}'", name);
            return true;
        }
        if let Some(pos) = self.pending.iter().position(|h| h.name == name) {
            self.pending.remove(pos);
            trace!("coroutine: stop pending '{}'", name);
            return true;
        }
        false
    }

    pub fn stop_all(&mut self) {
        trace!("coroutine: stop all ({})", self.len());
        self.handles.clear();
        self.pending.clear();
        self.finished.clear();
    }

    /// True from `run` until the coroutine finishes or is stopped.
    pub fn is_running(&self, name: &str) -> bool {
        self.live_position(name).is_some() || self.pending.iter().any(|h| h.name == name)
    }

    pub fn handle(&self, name: &str) -> Result<&CoroutineHandle<C>, CoroutineError> {
        self.live_position(name)
            .map(|pos| &self.handles[pos])
            .or_else(|| self.pending.iter().find(|h| h.name == name))
            .ok_or_else(|| CoroutineError::NotFound(name.to_string()))
    }

    /// Running coroutines, including ones waiting to join
    pub fn len(&self) -> usize {
        self.handles.len() - self.finished.len() + self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Names in resume order
    pub fn names(&self) -> Vec<&str> {
        self.handles
            .iter()
            .filter(|h| !self.finished.contains(&h.serial))
            .chain(self.pending.iter())
            .map(|h| h.name.as_str())
            .collect()
    }

    /// Resume every due coroutine once, in start order.
    pub fn update(&mut self, ctx: &mut C) {
        if self.running {
            warn!("coroutine: nested update ignored");
            return;
        }
        self.merge_pending();
        self.running = true;

        let serials: Vec<u64> = self.handles.iter().map(|h| h.serial).collect();
        for serial in serials {
            // Gone if stopped earlier in this pass
            let Some(pos) = self.position_of(serial) else {
                continue;
            };
            let handle = &mut self.handles[pos];
            if handle.delay > 0 {
                handle.delay -= 1;
                if handle.delay > 0 {
                    continue;
                }
            }
            let Some(mut routine) = handle.routine.take() else {
                continue;
            };

            let step = routine.resume(ctx, self);

            // Stopped from inside its own resume: drop it
            let Some(pos) = self.position_of(serial) else {
                continue;
            };
            match step {
                Step::Done => {
                    trace!("coroutine: '{}' finished", self.handles[pos].name);
                    self.finished.push(serial);
                }
                Step::Wait => {
                    let handle = &mut self.handles[pos];
                    handle.delay = 1;
                    handle.routine = Some(routine);
                }
                Step::WaitFrames(frames) => {
                    let handle = &mut self.handles[pos];
                    handle.delay = frames;
                    handle.routine = Some(routine);
                }
            }
        }

        self.running = false;
        self.merge_pending();
        self.drain_finished();
    }

    fn merge_pending(&mut self) {
        self.handles.append(&mut self.pending);
    }

    fn drain_finished(&mut self) {
        if self.finished.is_empty() {
            return;
        }
        let finished = std::mem::take(&mut self.finished);
        self.handles.retain(|h| !finished.contains(&h.serial));
    }
}

impl<C> Default for CoroutineRunner<C> {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Scripts
// =============================================================================

type Action<C> = Box<dyn FnMut(&mut C, &mut CoroutineRunner<C>)>;
type Condition<C> = Box<dyn FnMut(&C) -> bool>;

enum ScriptStep<C> {
    Run(Action<C>),
    Wait(u32),
    Until(Condition<C>),
}

/// A coroutine built from a linear list of steps.
///
/// ```
/// use magequest::game::coroutine::{CoroutineRunner, Script};
///
/// let mut runner: CoroutineRunner<u32> = CoroutineRunner::new();
/// let script = Script::new()
///     .then(|n: &mut u32, _| *n += 1)
///     .wait(2)
///     .then(|n: &mut u32, _| *n += 10);
/// runner.run("count", script, 0);
///
/// let mut n = 0;
/// runner.update(&mut n);
/// assert_eq!(n, 1);
/// runner.update(&mut n);
/// runner.update(&mut n);
/// assert_eq!(n, 11);
/// assert!(!runner.is_running("count"));
/// ```
pub struct Script<C> {
    steps: VecDeque<ScriptStep<C>>,
}

impl<C> Script<C> {
    pub fn new() -> Self {
        Self { steps: VecDeque::new() }
    }

    /// Run `action`, then continue with the next step in the same resume
    pub fn then(mut self, action: impl FnMut(&mut C, &mut CoroutineRunner<C>) + 'static) -> Self {
        self.steps.push_back(ScriptStep::Run(Box::new(action)));
        self
    }

    /// Sleep `frames` updates (0 does nothing)
    pub fn wait(mut self, frames: u32) -> Self {
        self.steps.push_back(ScriptStep::Wait(frames));
        self
    }

    /// Poll `condition` once per update until it holds
    pub fn until(mut self, condition: impl FnMut(&C) -> bool + 'static) -> Self {
        self.steps.push_back(ScriptStep::Until(Box::new(condition)));
        self
    }

    /// Append every step of `other`
    pub fn chain(mut self, other: Script<C>) -> Self {
        self.steps.extend(other.steps);
        self
    }

    pub fn is_finished(&self) -> bool {
        self.steps.is_empty()
    }
}

impl<C> Default for Script<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> Coroutine<C> for Script<C> {
    fn resume(&mut self, ctx: &mut C, runner: &mut CoroutineRunner<C>) -> Step {
        while let Some(step) = self.steps.front_mut() {
            match step {
                ScriptStep::Run(action) => {
                    action(&mut *ctx, &mut *runner);
                    self.steps.pop_front();
                }
                ScriptStep::Wait(frames) => {
                    let frames = *frames;
                    self.steps.pop_front();
                    if frames > 0 {
                        return Step::WaitFrames(frames);
                    }
                }
                ScriptStep::Until(condition) => {
                    if !condition(&*ctx) {
                        return Step::Wait;
                    }
                    self.steps.pop_front();
                }
            }
        }
        Step::Done
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type Log = Vec<String>;

    /// Logs its name on every resume, then sleeps `wait`; finishes after `runs` resumes
    fn ticker(name: &'static str, wait: Step, runs: u32) -> impl Coroutine<Log> {
        let mut count = 0;
        from_fn(move |log: &mut Log, _runner: &mut CoroutineRunner<Log>| {
            log.push(name.to_string());
            count += 1;
            if count >= runs {
                Step::Done
            } else {
                wait
            }
        })
    }

    fn frames_with(runner: &mut CoroutineRunner<Log>, log: &mut Log, updates: usize, name: &str) -> Vec<usize> {
        (1..=updates)
            .filter(|_| {
                runner.update(log);
                let hit = log.iter().any(|n| n == name);
                log.clear();
                hit
            })
            .collect()
    }

    #[test]
    fn test_wait_frames_resumes_on_nth_update() {
        let mut runner = CoroutineRunner::new();
        let mut log = Log::new();
        runner.run("t", ticker("t", Step::WaitFrames(3), 10), 0);
        assert_eq!(frames_with(&mut runner, &mut log, 8, "t"), vec![1, 4, 7]);
    }

    #[test]
    fn test_wait_resumes_next_update() {
        let mut runner = CoroutineRunner::new();
        let mut log = Log::new();
        runner.run("t", ticker("t", Step::Wait, 10), 0);
        assert_eq!(frames_with(&mut runner, &mut log, 3, "t"), vec![1, 2, 3]);
    }

    #[test]
    fn test_initial_delay() {
        let mut runner = CoroutineRunner::new();
        let mut log = Log::new();
        runner.run("t", ticker("t", Step::Wait, 10), 2);
        assert_eq!(frames_with(&mut runner, &mut log, 3, "t"), vec![2, 3]);
    }

    #[test]
    fn test_done_is_removed_after_pass() {
        let mut runner = CoroutineRunner::new();
        let mut log = Log::new();
        runner.run("once", ticker("once", Step::Wait, 1), 0);
        assert!(runner.is_running("once"));
        runner.update(&mut log);
        assert_eq!(log, vec!["once"]);
        assert!(!runner.is_running("once"));
        assert!(runner.is_empty());
        assert_eq!(runner.handle("once").unwrap_err(), CoroutineError::NotFound("once".into()));
    }

    #[test]
    fn test_resume_order_is_start_order() {
        let mut runner = CoroutineRunner::new();
        let mut log = Log::new();
        for name in ["c", "a", "b"] {
            runner.run(name, ticker(name, Step::Wait, 5), 0);
        }
        runner.update(&mut log);
        assert_eq!(log, vec!["c", "a", "b"]);
        assert_eq!(runner.names(), vec!["c", "a", "b"]);
    }

    #[test]
    fn test_run_from_inside_joins_next_update() {
        let mut runner = CoroutineRunner::new();
        let mut log = Log::new();
        runner.run(
            "spawner",
            from_fn(|log: &mut Log, runner: &mut CoroutineRunner<Log>| {
                log.push("spawner".into());
                runner.run("child", ticker("child", Step::Wait, 5), 0);
                assert!(runner.is_running("child"));
                Step::Done
            }),
            0,
        );

        runner.update(&mut log);
        assert_eq!(log, vec!["spawner"]);
        assert!(runner.is_running("child"));
        log.clear();

        runner.update(&mut log);
        assert_eq!(log, vec!["child"]);
    }

    #[test]
    fn test_duplicate_name_is_noop() {
        let mut runner = CoroutineRunner::new();
        let mut log = Log::new();
        let serial = runner.run("t", ticker("first", Step::Wait, 5), 0).serial();
        assert_eq!(runner.run("t", ticker("second", Step::Wait, 5), 0).serial(), serial);
        assert!(runner.try_run("t", ticker("third", Step::Wait, 5), 0).is_none());
        assert_eq!(runner.len(), 1);

        runner.update(&mut log);
        assert_eq!(log, vec!["first"]);
    }

    #[test]
    fn test_restart_replaces() {
        let mut runner = CoroutineRunner::new();
        let mut log = Log::new();
        runner.run("t", ticker("first", Step::Wait, 5), 0);
        runner.restart("t", ticker("second", Step::Wait, 5), 0);
        runner.update(&mut log);
        assert_eq!(log, vec!["second"]);
    }

    #[test]
    fn test_stop_during_pass_skips_later_coroutine() {
        let mut runner = CoroutineRunner::new();
        let mut log = Log::new();
        runner.run(
            "killer",
            from_fn(|_: &mut Log, runner: &mut CoroutineRunner<Log>| {
                assert!(runner.stop("victim"));
                Step::Done
            }),
            0,
        );
        runner.run("victim", ticker("victim", Step::Wait, 5), 0);
        runner.update(&mut log);
        assert!(log.is_empty());
        assert!(!runner.is_running("victim"));
    }

    #[test]
    fn test_stop_self() {
        let mut runner = CoroutineRunner::new();
        let mut log = Log::new();
        runner.run(
            "quitter",
            from_fn(|log: &mut Log, runner: &mut CoroutineRunner<Log>| {
                log.push("quitter".into());
                runner.stop("quitter");
                Step::Wait
            }),
            0,
        );
        runner.update(&mut log);
        runner.update(&mut log);
        assert_eq!(log, vec!["quitter"]);
        assert!(runner.is_empty());
    }

    #[test]
    fn test_rerun_after_finish_in_same_pass() {
        let mut runner = CoroutineRunner::new();
        let mut log = Log::new();
        runner.run("job", ticker("job", Step::Wait, 1), 0);
        runner.run(
            "requeue",
            from_fn(|_: &mut Log, runner: &mut CoroutineRunner<Log>| {
                // "job" finished earlier in this pass
                runner.try_run("job", ticker("job again", Step::Wait, 1), 0);
                Step::Done
            }),
            0,
        );
        runner.update(&mut log);
        assert!(runner.is_running("job"));
        runner.update(&mut log);
        assert_eq!(log, vec!["job", "job again"]);
    }

    #[test]
    fn test_stop_all() {
        let mut runner = CoroutineRunner::new();
        runner.run("a", ticker("a", Step::Wait, 5), 0);
        runner.run("b", ticker("b", Step::Wait, 5), 0);
        assert!(runner.stop("a"));
        assert!(!runner.stop("a"));
        runner.stop_all();
        assert!(runner.is_empty());
        assert!(!runner.is_running("b"));
    }

    #[test]
    fn test_script_until() {
        let mut runner: CoroutineRunner<u32> = CoroutineRunner::new();
        let script = Script::new()
            .until(|n: &u32| *n >= 3)
            .then(|n: &mut u32, _| *n = 100);
        runner.run("s", script, 0);

        let mut n = 0;
        for _ in 0..3 {
            runner.update(&mut n);
            assert!(n < 100);
            n += 1;
        }
        runner.update(&mut n);
        assert_eq!(n, 100);
        assert!(runner.is_empty());
    }
}
