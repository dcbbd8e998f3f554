//! Kinema Animation Engine
//!
//! Keyframe tweens over numbers, lists, colors and coordinate strings, driven
//! by a frame clock.
//!
//! # Features
//!
//! - **Easing**: the Penner cubic-bezier catalog plus elastic curves
//! - **Value Codec**: colors and coordinate strings decompose to numeric components
//! - **Tweens**: keyframes split evenly across the duration, with delays
//! - **Playback**: direction, looping, alternate, speed, pause/resume, reverse, seek
//! - **Scheduler**: one frame callback advances every active instance
//!
//! # Example
//!
//! ```ignore
//! let mut scheduler = AnimationScheduler::new();
//! let anime = Anime::new(
//!     AnimeConfig::new()
//!         .duration(800.0)
//!         .easing("easeOutQuad")
//!         .property("x", [0.0, 100.0])
//!         .property("fill", ["#000", "#ff8800"]),
//!     Callbacks::new().on_update(|target| println!("{target:?}")),
//! )?;
//! let id = scheduler.add(anime);
//!
//! // Host frame loop
//! scheduler.on_frame(0.0);
//! scheduler.on_frame(16.7);
//! ```

pub mod anime;
pub mod clock;
pub mod config;
pub mod easing;
pub mod error;
pub mod scheduler;
pub mod tween;
pub mod value;

pub use anime::{Anime, AnimeState, Callback, Callbacks, Target, TickOutcome};
pub use clock::{FrameClock, FrameRequest, ManualClock};
pub use config::{AnimeConfig, Direction, Loop};
pub use easing::{CubicBezier, Easing};
pub use error::{AnimeError, Result};
pub use scheduler::{AnimationScheduler, AnimeId, Command, SchedulerHandle};
pub use tween::{PropertyAnimation, Tween, TweenTiming};
pub use value::{classify, decompose, KeyframeValue, Rgba, Value, ValueKind};
