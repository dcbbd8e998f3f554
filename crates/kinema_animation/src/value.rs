//! Keyframe values and their numeric decomposition
//!
//! Interpolation works on flat lists of numbers. A [`KeyframeValue`] is
//! decomposed into such a list once, when tweens are built, and every frame
//! the interpolated list is composed back into an output [`Value`] by the
//! property's [`ValueKind`].
//!
//! Supported shapes:
//! - Numbers and number lists
//! - Colors: hex (`#rgb`, `#rrggbb`), `rgb()`, `rgba()`, `hsl()`, `hsla()`
//! - Coordinates: any other string, read as space separated numbers

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Numeric components of one keyframe value
///
/// Four inline slots cover scalars, colors and 2D/3D coordinates without
/// touching the heap.
pub type Components = SmallVec<[f64; 4]>;

/// A user supplied keyframe
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum KeyframeValue {
    Number(f64),
    List(Vec<f64>),
    Text(String),
}

impl From<f64> for KeyframeValue {
    fn from(value: f64) -> Self {
        KeyframeValue::Number(value)
    }
}

impl From<i32> for KeyframeValue {
    fn from(value: i32) -> Self {
        KeyframeValue::Number(value as f64)
    }
}

impl From<Vec<f64>> for KeyframeValue {
    fn from(value: Vec<f64>) -> Self {
        KeyframeValue::List(value)
    }
}

impl<const N: usize> From<[f64; N]> for KeyframeValue {
    fn from(value: [f64; N]) -> Self {
        KeyframeValue::List(value.to_vec())
    }
}

impl From<&str> for KeyframeValue {
    fn from(value: &str) -> Self {
        KeyframeValue::Text(value.to_string())
    }
}

impl From<String> for KeyframeValue {
    fn from(value: String) -> Self {
        KeyframeValue::Text(value)
    }
}

/// A composed output value, as handed to update/complete callbacks
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Number(f64),
    List(Vec<f64>),
    Text(String),
}

impl Value {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[f64]> {
        match self {
            Value::List(list) => Some(list.as_slice()),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(text) => Some(text.as_str()),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => write!(f, "{n}"),
            Value::List(list) => write!(f, "{}", join_components(list, ",")),
            Value::Text(text) => f.write_str(text),
        }
    }
}

/// Value family, resolved once per property from its first keyframe
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ValueKind {
    Scalar,
    List,
    Color,
    Coordinates,
}

impl ValueKind {
    /// Classify a keyframe value
    pub fn of(value: &KeyframeValue) -> Self {
        match value {
            KeyframeValue::Number(_) => ValueKind::Scalar,
            KeyframeValue::List(_) => ValueKind::List,
            KeyframeValue::Text(text) if is_color(text) => ValueKind::Color,
            KeyframeValue::Text(_) => ValueKind::Coordinates,
        }
    }

    /// Whether a value of kind `other` can share a property with this kind
    ///
    /// Numbers and lists both decompose to plain component lists, so they mix.
    pub fn accepts(self, other: ValueKind) -> bool {
        match self {
            ValueKind::Scalar | ValueKind::List => {
                matches!(other, ValueKind::Scalar | ValueKind::List)
            }
            _ => self == other,
        }
    }

    /// Decompose a keyframe already known to be of this kind
    pub fn decompose(self, value: &KeyframeValue) -> Components {
        match (self, value) {
            (ValueKind::Color, KeyframeValue::Text(text)) => Rgba::parse(text)
                .map(Rgba::to_components)
                .unwrap_or_else(|| scan_numbers(text)),
            (ValueKind::Coordinates, KeyframeValue::Text(text)) => scan_numbers(text),
            _ => decompose(value),
        }
    }

    /// Build the output value from interpolated components
    pub fn compose(self, components: &[f64]) -> Value {
        match self {
            ValueKind::Color => {
                let channel = |i: usize, fallback: f64| components.get(i).copied().unwrap_or(fallback);
                Value::Text(format!(
                    "rgba({},{},{},{})",
                    channel(0, 0.0),
                    channel(1, 0.0),
                    channel(2, 0.0),
                    channel(3, 1.0)
                ))
            }
            ValueKind::Coordinates => Value::Text(join_components(components, " ")),
            ValueKind::Scalar | ValueKind::List => match components {
                [single] => Value::Number(*single),
                _ => Value::List(components.to_vec()),
            },
        }
    }
}

/// Classify a keyframe value, see [`ValueKind::of`]
pub fn classify(value: &KeyframeValue) -> ValueKind {
    ValueKind::of(value)
}

/// Decompose a keyframe value into numeric components
///
/// Colors are normalized to `[r, g, b, a]` with channels in 0..=255. Strings
/// without any numeric token decompose to `[0]`.
pub fn decompose(value: &KeyframeValue) -> Components {
    match value {
        KeyframeValue::Number(n) => smallvec::smallvec![*n],
        KeyframeValue::List(list) => list.iter().copied().collect(),
        KeyframeValue::Text(text) => {
            if is_color(text) {
                if let Some(rgba) = Rgba::parse(text) {
                    return rgba.to_components();
                }
            }
            scan_numbers(text)
        }
    }
}

/// An RGBA color with 0..=255 channels and 0..=1 alpha
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rgba {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

impl Rgba {
    pub fn new(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self { r, g, b, a }
    }

    /// Parse hex, `rgb()` and `hsl()`/`hsla()` colors
    ///
    /// `rgba()` strings already carry their components and return `None`;
    /// callers scan their numbers directly.
    pub fn parse(input: &str) -> Option<Self> {
        let input = input.trim();
        if is_hex(input) {
            return parse_hex(input);
        }
        if let Some(caps) = rgb_pattern().captures(input) {
            let channel = |i: usize| caps.get(i).and_then(|m| m.as_str().parse::<f64>().ok());
            return Some(Self::new(channel(1)?, channel(2)?, channel(3)?, 1.0));
        }
        if input.starts_with("hsl") {
            return parse_hsl(input);
        }
        None
    }

    pub fn to_components(self) -> Components {
        smallvec::smallvec![self.r, self.g, self.b, self.a]
    }
}

fn parse_hex(input: &str) -> Option<Rgba> {
    let digits = input.strip_prefix('#')?;
    let expanded: String = if digits.len() == 3 {
        digits.chars().flat_map(|c| [c, c]).collect()
    } else {
        digits.to_string()
    };
    let channel = |i: usize| {
        expanded
            .get(i..i + 2)
            .and_then(|pair| u8::from_str_radix(pair, 16).ok())
            .map(f64::from)
    };
    Some(Rgba::new(channel(0)?, channel(2)?, channel(4)?, 1.0))
}

fn parse_hsl(input: &str) -> Option<Rgba> {
    let caps = hsl_pattern()
        .captures(input)
        .or_else(|| hsla_pattern().captures(input))?;
    let number = |i: usize| caps.get(i).and_then(|m| m.as_str().parse::<f64>().ok());

    let h = number(1)? / 360.0;
    let s = number(2)? / 100.0;
    let l = number(3)? / 100.0;
    let a = match caps.get(4) {
        Some(m) => m.as_str().parse::<f64>().ok()?,
        None => 1.0,
    };

    let (r, g, b) = if s == 0.0 {
        (l, l, l)
    } else {
        let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
        let p = 2.0 * l - q;
        (
            hue_to_rgb(p, q, h + 1.0 / 3.0),
            hue_to_rgb(p, q, h),
            hue_to_rgb(p, q, h - 1.0 / 3.0),
        )
    };
    Some(Rgba::new(r * 255.0, g * 255.0, b * 255.0, a))
}

fn hue_to_rgb(p: f64, q: f64, mut t: f64) -> f64 {
    if t < 0.0 {
        t += 1.0;
    }
    if t > 1.0 {
        t -= 1.0;
    }
    if t < 1.0 / 6.0 {
        return p + (q - p) * 6.0 * t;
    }
    if t < 1.0 / 2.0 {
        return q;
    }
    if t < 2.0 / 3.0 {
        return p + (q - p) * (2.0 / 3.0 - t) * 6.0;
    }
    p
}

fn is_hex(text: &str) -> bool {
    hex_pattern().is_match(text)
}

fn is_color(text: &str) -> bool {
    is_hex(text) || text.starts_with("rgb") || text.starts_with("hsl")
}

/// Extract every number in `text`, or `[0]` if there are none
fn scan_numbers(text: &str) -> Components {
    let numbers: Components = numeric_token()
        .find_iter(text)
        .filter_map(|m| m.as_str().parse::<f64>().ok())
        .collect();
    if numbers.is_empty() {
        smallvec::smallvec![0.0]
    } else {
        numbers
    }
}

fn join_components(components: &[f64], separator: &str) -> String {
    components
        .iter()
        .map(|c| c.to_string())
        .collect::<Vec<_>>()
        .join(separator)
}

fn hex_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)(^#[0-9a-f]{6}$)|(^#[0-9a-f]{3}$)").expect("valid hex regex"))
}

fn rgb_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^rgb\(\s*(\d+)\s*,\s*(\d+)\s*,\s*(\d+)\s*\)").expect("valid rgb regex")
    })
}

fn hsl_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^hsl\(\s*([\d.]+)\s*,\s*([\d.]+)%\s*,\s*([\d.]+)%\s*\)").expect("valid hsl regex")
    })
}

fn hsla_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^hsla\(\s*([\d.]+)\s*,\s*([\d.]+)%\s*,\s*([\d.]+)%\s*,\s*([\d.]+)\s*\)")
            .expect("valid hsla regex")
    })
}

fn numeric_token() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"-?\d*\.?\d+").expect("valid number regex"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round_trip(value: &KeyframeValue) -> Value {
        ValueKind::of(value).compose(&decompose(value))
    }

    fn rgba_tuple(value: &Value) -> Vec<f64> {
        scan_numbers(value.as_str().expect("color composes to text")).to_vec()
    }

    #[test]
    fn test_classify() {
        assert_eq!(ValueKind::of(&12.0.into()), ValueKind::Scalar);
        assert_eq!(ValueKind::of(&[1.0, 2.0].into()), ValueKind::List);
        assert_eq!(ValueKind::of(&"#FFF".into()), ValueKind::Color);
        assert_eq!(ValueKind::of(&"#a1b2c3".into()), ValueKind::Color);
        assert_eq!(ValueKind::of(&"rgb(1, 2, 3)".into()), ValueKind::Color);
        assert_eq!(ValueKind::of(&"rgba(1,2,3,0.5)".into()), ValueKind::Color);
        assert_eq!(ValueKind::of(&"hsla(120, 50%, 50%, 0.3)".into()), ValueKind::Color);
        assert_eq!(ValueKind::of(&"10 20 30".into()), ValueKind::Coordinates);
        // Neither 3 nor 6 digits: not a hex color
        assert_eq!(ValueKind::of(&"#abcd".into()), ValueKind::Coordinates);
        assert_eq!(classify(&"hsl(0, 0%, 0%)".into()), ValueKind::Color);
    }

    #[test]
    fn test_kind_decompose_matches_free_decompose() {
        for raw in ["#0f0", "rgba(1,2,3,0.5)", "hsl(240, 100%, 50%)", "4px 8px"] {
            let value = KeyframeValue::from(raw);
            assert_eq!(classify(&value).decompose(&value), decompose(&value), "{raw}");
        }
    }

    #[test]
    fn test_hex_decompose() {
        assert_eq!(decompose(&"#fff".into()).as_slice(), &[255.0, 255.0, 255.0, 1.0]);
        assert_eq!(decompose(&"#FF8000".into()).as_slice(), &[255.0, 128.0, 0.0, 1.0]);
        assert_eq!(decompose(&"#1a2".into()).as_slice(), &[17.0, 170.0, 34.0, 1.0]);
    }

    #[test]
    fn test_rgb_and_rgba_decompose() {
        assert_eq!(decompose(&"rgb(10, 20, 30)".into()).as_slice(), &[10.0, 20.0, 30.0, 1.0]);
        assert_eq!(
            decompose(&"rgba(100,200,255,0.7)".into()).as_slice(),
            &[100.0, 200.0, 255.0, 0.7]
        );
    }

    #[test]
    fn test_hsl_decompose() {
        let red = decompose(&"hsl(0, 100%, 50%)".into());
        assert_eq!(red.as_slice(), &[255.0, 0.0, 0.0, 1.0]);

        let grey = decompose(&"hsl(200, 0%, 50%)".into());
        assert_eq!(grey.as_slice(), &[127.5, 127.5, 127.5, 1.0]);

        let translucent = decompose(&"hsla(120, 100%, 50%, 0.25)".into());
        assert!((translucent[1] - 255.0).abs() < 1e-9);
        assert_eq!(translucent[3], 0.25);
    }

    #[test]
    fn test_coordinates_decompose() {
        assert_eq!(
            decompose(&"10 -20.5 .5".into()).as_slice(),
            &[10.0, -20.5, 0.5]
        );
        assert_eq!(decompose(&"none".into()).as_slice(), &[0.0]);
    }

    #[test]
    fn test_round_trip_numbers() {
        assert_eq!(round_trip(&42.5.into()), Value::Number(42.5));
        assert_eq!(round_trip(&[1.0, -2.0, 3.5].into()), Value::List(vec![1.0, -2.0, 3.5]));
    }

    #[test]
    fn test_round_trip_colors() {
        for (input, expected) in [
            ("#000000", [0.0, 0.0, 0.0, 1.0]),
            ("#f0a", [255.0, 0.0, 170.0, 1.0]),
            ("rgb(1,2,3)", [1.0, 2.0, 3.0, 1.0]),
            ("rgba(4,5,6,0.5)", [4.0, 5.0, 6.0, 0.5]),
            ("hsl(0, 100%, 50%)", [255.0, 0.0, 0.0, 1.0]),
        ] {
            let composed = round_trip(&input.into());
            assert!(composed.as_str().unwrap().starts_with("rgba("));
            assert_eq!(rgba_tuple(&composed), expected.to_vec(), "{input}");
        }
    }

    #[test]
    fn test_round_trip_coordinates() {
        let composed = round_trip(&"0 0 100 50".into());
        assert_eq!(composed, Value::Text("0 0 100 50".to_string()));
    }

    #[test]
    fn test_single_element_list_unwraps() {
        assert_eq!(ValueKind::List.compose(&[3.0]), Value::Number(3.0));
    }

    #[test]
    fn test_kind_compatibility() {
        assert!(ValueKind::Scalar.accepts(ValueKind::List));
        assert!(!ValueKind::Scalar.accepts(ValueKind::Color));
        assert!(!ValueKind::Color.accepts(ValueKind::Coordinates));
    }

    #[test]
    fn test_keyframe_value_from_json() {
        let values: Vec<KeyframeValue> =
            serde_json::from_str(r##"[1, [2, 3], "#fff"]"##).unwrap();
        assert_eq!(values[0], KeyframeValue::Number(1.0));
        assert_eq!(values[1], KeyframeValue::List(vec![2.0, 3.0]));
        assert_eq!(values[2], KeyframeValue::Text("#fff".to_string()));
    }
}
