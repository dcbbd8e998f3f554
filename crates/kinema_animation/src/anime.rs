//! Animation instances
//!
//! An [`Anime`] owns the tweens of every animated property plus its playback
//! clock. It is driven by an [`AnimationScheduler`], which owns the active set
//! and calls [`Anime::tick`] once per frame with a shared timestamp.
//!
//! Time terms used below:
//! - *engine time*: wall time since the cycle started, scaled by `speed`
//! - *instant time*: engine time clamped to the timeline and mirrored while
//!   reversed; this is what selects and evaluates tweens
//!
//! [`AnimationScheduler`]: crate::scheduler::AnimationScheduler

use indexmap::IndexMap;

use crate::config::{AnimeConfig, Direction, Loop};
use crate::easing::Easing;
use crate::error::Result;
use crate::tween::{PropertyAnimation, TweenTiming};
use crate::value::{Components, Value};

/// Composed output: property key to current value, in declaration order
///
/// The instance keeps one target and overwrites it in place every frame.
/// Callbacks only borrow it; clone it to keep a snapshot.
pub type Target = IndexMap<String, Value>;

/// Notification invoked with the current target
pub type Callback = Box<dyn FnMut(&Target)>;

/// Caller supplied notifications
#[derive(Default)]
pub struct Callbacks {
    begin: Option<Callback>,
    update: Option<Callback>,
    complete: Option<Callback>,
}

impl Callbacks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fired once, on the first evaluated frame of a play-through
    pub fn on_begin<F: FnMut(&Target) + 'static>(mut self, f: F) -> Self {
        self.begin = Some(Box::new(f));
        self
    }

    /// Fired after every evaluation, including frames spent in the delay
    pub fn on_update<F: FnMut(&Target) + 'static>(mut self, f: F) -> Self {
        self.update = Some(Box::new(f));
        self
    }

    /// Fired once the last loop cycle ends
    pub fn on_complete<F: FnMut(&Target) + 'static>(mut self, f: F) -> Self {
        self.complete = Some(Box::new(f));
        self
    }
}

impl std::fmt::Debug for Callbacks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Callbacks")
            .field("begin", &self.begin.is_some())
            .field("update", &self.update.is_some())
            .field("complete", &self.complete.is_some())
            .finish()
    }
}

/// Playback state
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AnimeState {
    /// Constructed, never played
    #[default]
    Idle,
    /// In the scheduler's active set
    Playing,
    /// Removed from the active set, resumable
    Paused,
    /// Last cycle finished
    Completed,
}

/// Result of one tick
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    /// Still inside the current cycle
    Running,
    /// Reached a cycle boundary and started the next one
    Looped,
    /// Reached the final boundary; the instance should leave the active set
    Completed,
}

/// One playable animation
pub struct Anime {
    timing: TweenTiming,
    easing: Easing,
    elasticity: f64,
    direction: Direction,
    looping: Loop,
    speed: f64,
    round: f64,
    auto_play: bool,
    animations: Vec<PropertyAnimation>,
    callbacks: Callbacks,

    /// Last timestamp seen
    now: f64,
    /// Timestamp the current cycle started at, set lazily on the first tick
    start_time: Option<f64>,
    /// Unscaled elapsed time saved by a pause, applied on the next tick
    pause_time: Option<f64>,
    reversed: bool,
    remaining: Loop,
    began: bool,
    state: AnimeState,
    target: Target,
    scratch: Components,
}

impl Anime {
    /// Build an instance, validating the whole configuration up front
    pub fn new(config: AnimeConfig, callbacks: Callbacks) -> Result<Self> {
        config.validate()?;
        let easing = config.resolve_easing()?;
        let timing = config.timing();
        let animations = config
            .data_progress
            .iter()
            .map(|(key, values)| PropertyAnimation::new(key.as_str(), values, timing))
            .collect::<Result<Vec<_>>>()?;

        tracing::debug!(
            properties = animations.len(),
            duration = timing.duration,
            easing = %config.easing,
            "created anime"
        );

        Ok(Self {
            timing,
            easing,
            elasticity: config.normalized_elasticity(),
            direction: config.direction,
            looping: config.looping,
            speed: config.speed,
            round: config.round,
            auto_play: config.auto_play,
            animations,
            callbacks,
            now: 0.0,
            start_time: None,
            pause_time: None,
            reversed: config.direction == Direction::Reverse,
            remaining: config.looping,
            began: false,
            state: AnimeState::Idle,
            target: Target::new(),
            scratch: Components::new(),
        })
    }

    /// Build an instance without callbacks
    pub fn from_config(config: AnimeConfig) -> Result<Self> {
        Self::new(config, Callbacks::default())
    }

    /// Replace the callbacks
    pub fn set_callbacks(&mut self, callbacks: Callbacks) {
        self.callbacks = callbacks;
    }

    pub fn state(&self) -> AnimeState {
        self.state
    }

    /// The last composed output
    pub fn target(&self) -> &Target {
        &self.target
    }

    pub fn animations(&self) -> &[PropertyAnimation] {
        &self.animations
    }

    /// `delay + duration + end_delay`
    pub fn total_duration(&self) -> f64 {
        self.timing.total()
    }

    pub fn is_reversed(&self) -> bool {
        self.reversed
    }

    /// Loop budget left for the current play-through
    pub fn remaining_loops(&self) -> Loop {
        self.remaining
    }

    pub fn auto_play(&self) -> bool {
        self.auto_play
    }

    pub fn easing(&self) -> Easing {
        self.easing
    }

    pub fn elasticity(&self) -> f64 {
        self.elasticity
    }

    // =========================================================================
    // Playback transitions, invoked by the scheduler
    // =========================================================================

    pub(crate) fn mark_playing(&mut self) {
        self.state = AnimeState::Playing;
    }

    /// Save elapsed time so the next tick resumes from the same point
    pub(crate) fn pause(&mut self) {
        if let Some(start) = self.start_time.take() {
            self.pause_time = Some(self.now - start);
        }
        if self.state == AnimeState::Playing {
            self.state = AnimeState::Paused;
        }
    }

    /// Rewind to time 0 with the configured direction and loop budget
    pub(crate) fn restart(&mut self) {
        self.start_time = None;
        self.pause_time = None;
        self.reversed = self.direction == Direction::Reverse;
        self.remaining = self.looping;
        self.began = false;
        self.state = AnimeState::Idle;
    }

    /// Mirror the playhead and flip direction, continuing smoothly
    ///
    /// Before the first tick there is no playhead to mirror, so only the
    /// direction flips and playback starts from the other end. A pending
    /// resume is mirrored in `pause_time` and resolved by the next tick
    /// against its own timestamp.
    pub(crate) fn reverse(&mut self) {
        let total = self.total_duration();
        let mirror = |elapsed: f64, speed: f64| (total - (elapsed * speed).clamp(0.0, total)) / speed;
        match (self.start_time, self.pause_time) {
            (Some(start), _) => {
                let mirrored = mirror(self.now - start, self.speed);
                self.start_time = Some(self.now - mirrored);
            }
            (None, Some(elapsed)) => {
                self.pause_time = Some(mirror(elapsed, self.speed));
            }
            (None, None) => {}
        }
        self.reversed = !self.reversed;
    }

    // =========================================================================
    // Frame evaluation
    // =========================================================================

    /// Advance to `timestamp` (milliseconds on the host's monotonic clock)
    pub fn tick(&mut self, timestamp: f64) -> TickOutcome {
        if self.state == AnimeState::Completed {
            return TickOutcome::Completed;
        }

        self.now = timestamp;
        if let Some(elapsed) = self.pause_time.take() {
            self.start_time = Some(self.now - elapsed);
        }
        let start = *self.start_time.get_or_insert(self.now);
        let engine_time = (self.now - start) * self.speed;
        self.set_progress(engine_time)
    }

    /// Evaluate at `engine_time` and handle cycle boundaries
    ///
    /// The first evaluation of a play-through fires `begin` with the freshly
    /// composed target, before `update`.
    pub fn set_progress(&mut self, engine_time: f64) -> TickOutcome {
        let total = self.total_duration();
        let (mut instant, boundary) = if engine_time < total {
            (engine_time, false)
        } else {
            (total, true)
        };
        if self.reversed {
            instant = total - instant;
        }

        self.write_target(instant);
        if !self.began {
            self.began = true;
            if let Some(begin) = self.callbacks.begin.as_mut() {
                begin(&self.target);
            }
        }
        self.notify_update();

        if !boundary {
            return TickOutcome::Running;
        }

        let next_cycle = match self.remaining {
            Loop::Forever(forever) => forever,
            Loop::Count(count) => count > 1,
        };

        if next_cycle {
            self.start_time = Some(self.now);
            if let Loop::Count(count) = &mut self.remaining {
                *count -= 1;
            }
            if self.direction == Direction::Alternate {
                self.reversed = !self.reversed;
            }
            tracing::trace!(remaining = ?self.remaining, reversed = self.reversed, "anime looped");
            TickOutcome::Looped
        } else {
            self.state = AnimeState::Completed;
            tracing::debug!("anime completed");
            if let Some(complete) = self.callbacks.complete.as_mut() {
                complete(&self.target);
            }
            TickOutcome::Completed
        }
    }

    /// Jump the playhead to `engine_time` and evaluate immediately
    ///
    /// Fires `update` but never `complete`, even at the end of the timeline.
    pub fn seek(&mut self, engine_time: f64) -> &Target {
        let total = self.total_duration();
        let time = engine_time.clamp(0.0, total);
        let elapsed = time / self.speed;
        if self.start_time.is_some() {
            self.start_time = Some(self.now - elapsed);
        } else {
            self.pause_time = Some(elapsed);
        }

        let instant = if self.reversed { total - time } else { time };
        self.set_animations_progress(instant);
        &self.target
    }

    /// Compose every property at `instant` without touching playback state
    pub fn value_at(&self, instant: f64) -> Target {
        let mut target = Target::with_capacity(self.animations.len());
        let mut scratch = Components::new();
        for animation in &self.animations {
            let value = self.evaluate(animation, instant, &mut scratch);
            target.insert(animation.key().to_string(), value);
        }
        target
    }

    /// Write every property at `instant` into the target, then fire `update`
    fn set_animations_progress(&mut self, instant: f64) {
        self.write_target(instant);
        self.notify_update();
    }

    fn write_target(&mut self, instant: f64) {
        let mut scratch = std::mem::take(&mut self.scratch);
        for index in 0..self.animations.len() {
            let animation = &self.animations[index];
            let value = self.evaluate(animation, instant, &mut scratch);
            match self.target.get_mut(animation.key()) {
                Some(slot) => *slot = value,
                None => {
                    let key = animation.key().to_string();
                    self.target.insert(key, value);
                }
            }
        }
        self.scratch = scratch;
    }

    fn notify_update(&mut self) {
        if let Some(update) = self.callbacks.update.as_mut() {
            update(&self.target);
        }
    }

    fn evaluate(&self, animation: &PropertyAnimation, instant: f64, scratch: &mut Components) -> Value {
        let tween = animation.tween_at(instant);
        let eased = self.easing.apply(tween.progress_at(instant), self.elasticity);
        tween.interpolate_into(eased, scratch);
        if self.round > 0.0 {
            for component in scratch.iter_mut() {
                *component = (*component * self.round).round() / self.round;
            }
        }
        animation.kind().compose(scratch.as_slice())
    }
}

impl std::fmt::Debug for Anime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Anime")
            .field("timing", &self.timing)
            .field("easing", &self.easing)
            .field("state", &self.state)
            .field("reversed", &self.reversed)
            .field("remaining", &self.remaining)
            .field("target", &self.target)
            .finish_non_exhaustive()
    }
}
