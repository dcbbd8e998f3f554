//! Animation error types

use thiserror::Error;

use crate::value::ValueKind;

/// Configuration errors reported while building an animation
///
/// Every variant is raised synchronously at construction time. Nothing on the
/// per-frame path returns an error.
#[derive(Error, Debug)]
pub enum AnimeError {
    /// Bezier x control points must lie in [0, 1]
    #[error("Invalid cubic bezier: x1={x1} and x2={x2} must both be within [0, 1]")]
    InvalidBezier { x1: f64, x2: f64 },

    /// Easing name is not part of the catalog
    #[error("Unknown easing: {0}")]
    UnknownEasing(String),

    /// A property needs at least two keyframes to form a tween
    #[error("Property `{key}` has {count} keyframe(s), at least 2 are required")]
    NotEnoughKeyframes { key: String, count: usize },

    /// Keyframes of one property classify to different value kinds
    #[error("Property `{key}` mixes keyframe types: expected {expected:?}, found {found:?}")]
    MixedKeyframeTypes {
        key: String,
        expected: ValueKind,
        found: ValueKind,
    },

    /// Adjacent keyframes decompose to a different number of components
    #[error("Property `{key}` keyframes have mismatched components: expected {expected}, found {found}")]
    ComponentMismatch {
        key: String,
        expected: usize,
        found: usize,
    },

    /// Timing or playback setting out of range
    #[error("Invalid animation config: {0}")]
    InvalidConfig(String),

    /// Config document could not be parsed
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Result type for animation construction
pub type Result<T> = std::result::Result<T, AnimeError>;
