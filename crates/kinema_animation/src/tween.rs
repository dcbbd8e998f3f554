//! Tween segmentation
//!
//! A property with `n` keyframes is split into `n - 1` tweens of equal length
//! placed back to back on the instance timeline:
//!
//! ```text
//! delay        duration / (n-1) each                 end_delay
//! |----|----------|----------|----------|--------------|
//!      t0         t1         t2         t3 (+end_delay)
//! ```

use crate::error::{AnimeError, Result};
use crate::value::{Components, KeyframeValue, ValueKind};

/// Timing shared by every property of one instance, in milliseconds
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TweenTiming {
    pub duration: f64,
    pub delay: f64,
    pub end_delay: f64,
}

impl TweenTiming {
    /// Length of the whole timeline: `delay + duration + end_delay`
    pub fn total(&self) -> f64 {
        self.delay + self.duration + self.end_delay
    }
}

/// One value-to-value segment with an absolute time window
#[derive(Clone, Debug, PartialEq)]
pub struct Tween {
    pub from: Components,
    pub to: Components,
    /// Window start on the instance timeline
    pub start: f64,
    /// Window end; the last tween's end also covers the end delay
    pub end: f64,
    /// Interpolation length, excluding any end delay
    pub duration: f64,
}

impl Tween {
    /// Linear progress through this tween at `instant`, in [0, 1]
    ///
    /// A zero-length tween is always complete.
    pub fn progress_at(&self, instant: f64) -> f64 {
        if self.duration <= 0.0 {
            return 1.0;
        }
        (instant - self.start).clamp(0.0, self.duration) / self.duration
    }

    /// Write `from + eased * (to - from)` per component into `out`
    pub fn interpolate_into(&self, eased: f64, out: &mut Components) {
        out.clear();
        out.extend(
            self.from
                .iter()
                .zip(self.to.iter())
                .map(|(from, to)| eased * (to - from) + from),
        );
    }
}

/// Split keyframes into contiguous tweens
///
/// The value kind is resolved from `values[0]`; every other keyframe must be
/// of a compatible kind and decompose to the same number of components.
pub fn segment(key: &str, values: &[KeyframeValue], timing: TweenTiming) -> Result<(ValueKind, Vec<Tween>)> {
    if values.len() < 2 {
        return Err(AnimeError::NotEnoughKeyframes {
            key: key.to_string(),
            count: values.len(),
        });
    }

    let kind = ValueKind::of(&values[0]);
    let mut decomposed: Vec<Components> = Vec::with_capacity(values.len());
    for value in values {
        let found = ValueKind::of(value);
        if !kind.accepts(found) {
            return Err(AnimeError::MixedKeyframeTypes {
                key: key.to_string(),
                expected: kind,
                found,
            });
        }
        let components = kind.decompose(value);
        if let Some(first) = decomposed.first() {
            let expected = first.len();
            if components.len() != expected {
                return Err(AnimeError::ComponentMismatch {
                    key: key.to_string(),
                    expected,
                    found: components.len(),
                });
            }
        }
        decomposed.push(components);
    }

    let count = values.len() - 1;
    let duration = timing.duration / count as f64;
    let mut start = timing.delay;
    let mut tweens: Vec<Tween> = decomposed
        .windows(2)
        .map(|pair| {
            let tween = Tween {
                from: pair[0].clone(),
                to: pair[1].clone(),
                start,
                end: start + duration,
                duration,
            };
            start = tween.end;
            tween
        })
        .collect();

    if let Some(last) = tweens.last_mut() {
        last.end += timing.end_delay;
    }

    Ok((kind, tweens))
}

/// All tweens of one animated property
#[derive(Clone, Debug)]
pub struct PropertyAnimation {
    key: String,
    kind: ValueKind,
    tweens: Vec<Tween>,
}

impl PropertyAnimation {
    pub fn new(key: impl Into<String>, values: &[KeyframeValue], timing: TweenTiming) -> Result<Self> {
        let key = key.into();
        let (kind, tweens) = segment(&key, values, timing)?;
        Ok(Self { key, kind, tweens })
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn kind(&self) -> ValueKind {
        self.kind
    }

    pub fn tweens(&self) -> &[Tween] {
        &self.tweens
    }

    /// The tween active at `instant`: the first one whose end lies past it,
    /// otherwise the last
    pub fn tween_at(&self, instant: f64) -> &Tween {
        let last = self.tweens.len() - 1;
        self.tweens
            .iter()
            .find(|tween| instant < tween.end)
            .unwrap_or(&self.tweens[last])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn timing(duration: f64, delay: f64, end_delay: f64) -> TweenTiming {
        TweenTiming {
            duration,
            delay,
            end_delay,
        }
    }

    fn values(raw: &[f64]) -> Vec<KeyframeValue> {
        raw.iter().map(|v| KeyframeValue::from(*v)).collect()
    }

    #[test]
    fn test_equal_division() {
        let (kind, tweens) = segment("x", &values(&[0.0, 10.0, 20.0, 30.0]), timing(900.0, 0.0, 0.0)).unwrap();
        assert_eq!(kind, ValueKind::Scalar);
        assert_eq!(tweens.len(), 3);
        for (i, tween) in tweens.iter().enumerate() {
            assert_eq!(tween.duration, 300.0);
            assert_eq!(tween.start, i as f64 * 300.0);
            assert_eq!(tween.end, (i + 1) as f64 * 300.0);
        }
    }

    #[test]
    fn test_delay_and_end_delay() {
        let (_, tweens) = segment("x", &values(&[0.0, 1.0, 2.0]), timing(1000.0, 200.0, 50.0)).unwrap();
        assert_eq!(tweens[0].start, 200.0);
        assert_eq!(tweens[0].end, 700.0);
        assert_eq!(tweens[1].start, 700.0);
        assert_eq!(tweens[1].end, 1250.0);
        assert_eq!(tweens[1].duration, 500.0);
    }

    #[test]
    fn test_tweens_are_contiguous() {
        let (_, tweens) = segment("x", &values(&[0.0, 5.0, 1.0, 7.0, 3.0]), timing(1000.0, 100.0, 0.0)).unwrap();
        for pair in tweens.windows(2) {
            assert_eq!(pair[0].end, pair[1].start);
            assert_eq!(pair[0].to, pair[1].from);
        }
    }

    #[test]
    fn test_single_keyframe_is_rejected() {
        let err = segment("opacity", &values(&[1.0]), timing(1000.0, 0.0, 0.0)).unwrap_err();
        assert!(matches!(err, AnimeError::NotEnoughKeyframes { count: 1, .. }));
    }

    #[test]
    fn test_mixed_types_are_rejected() {
        let mixed = vec![KeyframeValue::from(100.0), KeyframeValue::from("#fff")];
        let err = segment("x", &mixed, timing(1000.0, 0.0, 0.0)).unwrap_err();
        assert!(matches!(
            err,
            AnimeError::MixedKeyframeTypes {
                expected: ValueKind::Scalar,
                found: ValueKind::Color,
                ..
            }
        ));
    }

    #[test]
    fn test_component_mismatch_is_rejected() {
        let points = vec![KeyframeValue::from("0 0"), KeyframeValue::from("10 10 10")];
        let err = segment("points", &points, timing(1000.0, 0.0, 0.0)).unwrap_err();
        assert!(matches!(
            err,
            AnimeError::ComponentMismatch {
                expected: 2,
                found: 3,
                ..
            }
        ));
    }

    #[test]
    fn test_tween_lookup() {
        let anim = PropertyAnimation::new("x", &values(&[0.0, 1.0, 2.0]), timing(1000.0, 0.0, 100.0)).unwrap();
        assert_eq!(anim.tween_at(0.0).start, 0.0);
        assert_eq!(anim.tween_at(499.9).start, 0.0);
        assert_eq!(anim.tween_at(500.0).start, 500.0);
        // Inside the end delay and beyond it fall back to the last tween
        assert_eq!(anim.tween_at(1050.0).start, 500.0);
        assert_eq!(anim.tween_at(5000.0).start, 500.0);
    }

    #[test]
    fn test_zero_duration_progress_is_complete() {
        let (_, tweens) = segment("x", &values(&[0.0, 1.0]), timing(0.0, 0.0, 0.0)).unwrap();
        assert_eq!(tweens[0].progress_at(0.0), 1.0);
    }

    #[test]
    fn test_progress_clamps() {
        let (_, tweens) = segment("x", &values(&[0.0, 1.0]), timing(100.0, 100.0, 0.0)).unwrap();
        assert_eq!(tweens[0].progress_at(50.0), 0.0);
        assert_eq!(tweens[0].progress_at(150.0), 0.5);
        assert_eq!(tweens[0].progress_at(500.0), 1.0);
    }

    #[test]
    fn test_interpolate_components() {
        let (_, tweens) = segment(
            "color",
            &[KeyframeValue::from("#000"), KeyframeValue::from("#fff")],
            timing(100.0, 0.0, 0.0),
        )
        .unwrap();
        let mut out = Components::new();
        tweens[0].interpolate_into(0.5, &mut out);
        assert_eq!(out.as_slice(), &[127.5, 127.5, 127.5, 1.0]);
    }
}
