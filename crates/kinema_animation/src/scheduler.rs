//! Animation scheduler
//!
//! Owns every animation instance and the active set, and advances all active
//! instances from a single frame timestamp.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use slotmap::{new_key_type, SlotMap};

use crate::anime::{Anime, AnimeState, TickOutcome};
use crate::clock::{FrameClock, FrameRequest, ManualClock};

new_key_type! {
    pub struct AnimeId;
}

/// A control operation queued through a [`SchedulerHandle`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    Play(AnimeId),
    Pause(AnimeId),
    Restart(AnimeId),
    Reverse(AnimeId),
}

/// Cloneable handle for controlling instances from inside callbacks
///
/// Callbacks run while the scheduler is borrowed, so they cannot call it
/// directly. Commands queued here are applied after the instance that is
/// currently ticking returns.
#[derive(Clone, Debug, Default)]
pub struct SchedulerHandle {
    queue: Rc<RefCell<VecDeque<Command>>>,
}

impl SchedulerHandle {
    pub fn play(&self, id: AnimeId) {
        self.push(Command::Play(id));
    }

    pub fn pause(&self, id: AnimeId) {
        self.push(Command::Pause(id));
    }

    pub fn restart(&self, id: AnimeId) {
        self.push(Command::Restart(id));
    }

    pub fn reverse(&self, id: AnimeId) {
        self.push(Command::Reverse(id));
    }

    pub fn push(&self, command: Command) {
        self.queue.borrow_mut().push_back(command);
    }

    fn pop(&self) -> Option<Command> {
        self.queue.borrow_mut().pop_front()
    }

    /// Number of commands waiting to be applied
    pub fn pending(&self) -> usize {
        self.queue.borrow().len()
    }
}

/// The animation scheduler that ticks all active animations
pub struct AnimationScheduler<C: FrameClock = ManualClock> {
    animes: SlotMap<AnimeId, Anime>,
    /// Playing instances, in the order they started playing
    active: Vec<AnimeId>,
    /// Outstanding frame request; `None` while the loop is stopped
    frame: Option<FrameRequest>,
    clock: C,
    handle: SchedulerHandle,
}

impl AnimationScheduler<ManualClock> {
    pub fn new() -> Self {
        Self::with_clock(ManualClock::new())
    }
}

impl Default for AnimationScheduler<ManualClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: FrameClock> AnimationScheduler<C> {
    pub fn with_clock(clock: C) -> Self {
        Self {
            animes: SlotMap::with_key(),
            active: Vec::new(),
            frame: None,
            clock,
            handle: SchedulerHandle::default(),
        }
    }

    /// A handle sharing this scheduler's command queue
    pub fn handle(&self) -> SchedulerHandle {
        self.handle.clone()
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn clock_mut(&mut self) -> &mut C {
        &mut self.clock
    }

    /// Register an instance, starting it when it is configured to auto-play
    pub fn add(&mut self, anime: Anime) -> AnimeId {
        let auto_play = anime.auto_play();
        let id = self.animes.insert(anime);
        if auto_play {
            self.play(id);
        }
        id
    }

    /// Drop an instance, taking it out of the active set
    pub fn remove(&mut self, id: AnimeId) -> Option<Anime> {
        self.active.retain(|active| *active != id);
        self.animes.remove(id)
    }

    pub fn get(&self, id: AnimeId) -> Option<&Anime> {
        self.animes.get(id)
    }

    pub fn get_mut(&mut self, id: AnimeId) -> Option<&mut Anime> {
        self.animes.get_mut(id)
    }

    /// Start or resume playback
    ///
    /// Playing an already active instance does nothing. Playing a completed
    /// instance rewinds it first.
    pub fn play(&mut self, id: AnimeId) {
        let Some(anime) = self.animes.get_mut(id) else {
            tracing::warn!(?id, "play on unknown anime");
            return;
        };
        if self.active.contains(&id) {
            return;
        }
        if anime.state() == AnimeState::Completed {
            anime.restart();
        }
        anime.mark_playing();
        self.active.push(id);
        tracing::debug!(?id, active = self.active.len(), "play");

        if self.frame.is_none() {
            self.frame = Some(self.clock.request_frame());
            tracing::debug!("frame loop started");
        }
    }

    /// Stop advancing an instance, keeping its elapsed time
    pub fn pause(&mut self, id: AnimeId) {
        let Some(anime) = self.animes.get_mut(id) else {
            tracing::warn!(?id, "pause on unknown anime");
            return;
        };
        anime.pause();
        self.active.retain(|active| *active != id);
        tracing::debug!(?id, active = self.active.len(), "pause");
    }

    /// Rewind to the beginning and play again
    pub fn restart(&mut self, id: AnimeId) {
        let Some(anime) = self.animes.get_mut(id) else {
            tracing::warn!(?id, "restart on unknown anime");
            return;
        };
        anime.restart();
        self.active.retain(|active| *active != id);
        tracing::debug!(?id, "restart");
        self.play(id);
    }

    /// Flip the playback direction of an active instance
    pub fn reverse(&mut self, id: AnimeId) {
        if !self.active.contains(&id) {
            tracing::warn!(?id, "reverse ignored, anime is not playing");
            return;
        }
        if let Some(anime) = self.animes.get_mut(id) {
            anime.reverse();
            tracing::debug!(?id, reversed = anime.is_reversed(), "reverse");
        }
    }

    pub fn is_active(&self, id: AnimeId) -> bool {
        self.active.contains(&id)
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    /// Whether a frame request is outstanding
    pub fn is_running(&self) -> bool {
        self.frame.is_some()
    }

    pub fn len(&self) -> usize {
        self.animes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.animes.is_empty()
    }

    /// Iterate over all registered instances
    pub fn iter(&self) -> impl Iterator<Item = (AnimeId, &Anime)> {
        self.animes.iter()
    }

    /// Advance every active instance to `timestamp`
    ///
    /// Called by the host once per delivered frame. Requests the next frame
    /// while anything is still playing and stops the loop otherwise.
    pub fn on_frame(&mut self, timestamp: f64) {
        // Commands queued outside a frame
        self.apply_commands();

        if self.active.is_empty() {
            self.stop_loop();
            return;
        }

        tracing::trace!(timestamp, active = self.active.len(), "frame");
        let snapshot = self.active.clone();
        for id in snapshot {
            if !self.active.contains(&id) {
                continue;
            }
            let outcome = match self.animes.get_mut(id) {
                Some(anime) => anime.tick(timestamp),
                None => {
                    self.active.retain(|active| *active != id);
                    continue;
                }
            };
            if outcome == TickOutcome::Completed {
                self.active.retain(|active| *active != id);
                tracing::debug!(?id, "complete");
            }
            self.apply_commands();
        }

        if self.active.is_empty() {
            self.stop_loop();
        } else {
            self.frame = Some(self.clock.request_frame());
        }
    }

    /// Drain the handle's queue
    pub fn apply_commands(&mut self) {
        while let Some(command) = self.handle.pop() {
            match command {
                Command::Play(id) => self.play(id),
                Command::Pause(id) => self.pause(id),
                Command::Restart(id) => self.restart(id),
                Command::Reverse(id) => self.reverse(id),
            }
        }
    }

    fn stop_loop(&mut self) {
        if let Some(request) = self.frame.take() {
            self.clock.cancel_frame(request);
            tracing::debug!("frame loop stopped");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AnimeConfig;

    fn anime(auto_play: bool) -> Anime {
        Anime::from_config(
            AnimeConfig::new()
                .duration(100.0)
                .easing("linear")
                .auto_play(auto_play)
                .property("x", [0.0, 1.0]),
        )
        .unwrap()
    }

    #[test]
    fn test_auto_play_requests_frame() {
        let mut scheduler = AnimationScheduler::new();
        let id = scheduler.add(anime(true));
        assert!(scheduler.is_active(id));
        assert!(scheduler.is_running());
        assert_eq!(scheduler.clock().request_count(), 1);
    }

    #[test]
    fn test_manual_play() {
        let mut scheduler = AnimationScheduler::new();
        let id = scheduler.add(anime(false));
        assert!(!scheduler.is_active(id));
        assert!(!scheduler.is_running());
        assert_eq!(scheduler.get(id).unwrap().state(), AnimeState::Idle);

        scheduler.play(id);
        scheduler.play(id);
        assert_eq!(scheduler.active_count(), 1);
        assert_eq!(scheduler.clock().request_count(), 1);
        assert_eq!(scheduler.get(id).unwrap().state(), AnimeState::Playing);
    }

    #[test]
    fn test_pause_removes_from_active_set() {
        let mut scheduler = AnimationScheduler::new();
        let id = scheduler.add(anime(true));
        scheduler.on_frame(0.0);
        scheduler.pause(id);
        assert!(!scheduler.is_active(id));
        assert_eq!(scheduler.get(id).unwrap().state(), AnimeState::Paused);

        // Next frame finds nothing to do and stops the loop
        scheduler.on_frame(16.0);
        assert!(!scheduler.is_running());
        assert_eq!(scheduler.clock().pending(), None);
    }

    #[test]
    fn test_reverse_requires_active() {
        let mut scheduler = AnimationScheduler::new();
        let id = scheduler.add(anime(false));
        scheduler.reverse(id);
        assert!(!scheduler.get(id).unwrap().is_reversed());
    }

    #[test]
    fn test_remove() {
        let mut scheduler = AnimationScheduler::new();
        let id = scheduler.add(anime(true));
        assert!(scheduler.remove(id).is_some());
        assert!(!scheduler.is_active(id));
        assert!(scheduler.get(id).is_none());
        assert!(scheduler.is_empty());
        // Unknown ids are ignored
        scheduler.play(id);
        assert_eq!(scheduler.active_count(), 0);
    }

    #[test]
    fn test_handle_commands_outside_frame() {
        let mut scheduler = AnimationScheduler::new();
        let id = scheduler.add(anime(false));
        let handle = scheduler.handle();
        handle.play(id);
        assert_eq!(handle.pending(), 1);
        scheduler.apply_commands();
        assert_eq!(handle.pending(), 0);
        assert!(scheduler.is_active(id));
    }

    #[test]
    fn test_play_after_complete_rewinds() {
        let mut scheduler = AnimationScheduler::new();
        let id = scheduler.add(anime(true));
        scheduler.on_frame(0.0);
        scheduler.on_frame(100.0);
        assert_eq!(scheduler.get(id).unwrap().state(), AnimeState::Completed);

        scheduler.play(id);
        scheduler.on_frame(500.0);
        let x = scheduler.get(id).unwrap().target()["x"].as_number();
        assert_eq!(x, Some(0.0));
    }
}
