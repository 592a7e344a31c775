mod coerce;
mod factory;

use indexmap::map::Entry;
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;
use tracing::warn;

pub use coerce::coerce_default;
pub use factory::build_control;

/// RGB color as reported for `org.scijava.util.ColorRGB` defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ColorRgb {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

impl ColorRgb {
    pub const fn new(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// Accepts `{"red":..,"green":..,"blue":..}` objects and `"r,g,b"` strings.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Object(obj) => {
                let channel = |key: &str| {
                    obj.get(key)
                        .and_then(Value::as_u64)
                        .and_then(|v| u8::try_from(v).ok())
                };
                Some(Self::new(channel("red")?, channel("green")?, channel("blue")?))
            }
            Value::String(raw) => {
                let mut parts = raw.split(',').map(|part| part.trim().parse::<u8>().ok());
                let red = parts.next()??;
                let green = parts.next()??;
                let blue = parts.next()??;
                if parts.next().is_some() {
                    return None;
                }
                Some(Self::new(red, green, blue))
            }
            _ => None,
        }
    }

    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.red, self.green, self.blue)
    }
}

/// Synthesized UI control for one operation input (or one host-owned setting).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ControlSpec {
    Binary {
        label: String,
        default: bool,
    },
    Color {
        label: String,
        default: Option<ColorRgb>,
    },
    Directory {
        label: String,
    },
    Path {
        label: String,
        default: String,
    },
    Float {
        label: String,
        default: f64,
        min: Option<f64>,
        max: Option<f64>,
    },
    /// Reference to an image produced earlier in the host pipeline, resolved by name at run time.
    ImageReference {
        label: String,
    },
    /// Name under which the host publishes an image produced by this module.
    ImageOutput {
        label: String,
        default: String,
    },
    Integer {
        label: String,
        default: i64,
        min: Option<i64>,
        max: Option<i64>,
    },
    MultilineText {
        label: String,
        default: String,
    },
    Text {
        label: String,
        default: String,
    },
    Choice {
        label: String,
        options: Vec<String>,
    },
}

impl ControlSpec {
    pub fn label(&self) -> &str {
        match self {
            Self::Binary { label, .. }
            | Self::Color { label, .. }
            | Self::Directory { label }
            | Self::Path { label, .. }
            | Self::Float { label, .. }
            | Self::ImageReference { label }
            | Self::ImageOutput { label, .. }
            | Self::Integer { label, .. }
            | Self::MultilineText { label, .. }
            | Self::Text { label, .. }
            | Self::Choice { label, .. } => label.as_str(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Binary { .. } => "binary",
            Self::Color { .. } => "color",
            Self::Directory { .. } => "directory",
            Self::Path { .. } => "path",
            Self::Float { .. } => "float",
            Self::ImageReference { .. } => "image_reference",
            Self::ImageOutput { .. } => "image_output",
            Self::Integer { .. } => "integer",
            Self::MultilineText { .. } => "multiline_text",
            Self::Text { .. } => "text",
            Self::Choice { .. } => "choice",
        }
    }
}

/// Controls for one operation keyed by input name, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ControlSet(IndexMap<String, ControlSpec>);

impl ControlSet {
    pub fn new() -> Self {
        Self(IndexMap::new())
    }

    /// Adds `control` under `name`. A repeated name keeps the first declaration.
    pub fn append(&mut self, name: impl Into<String>, control: ControlSpec) {
        match self.0.entry(name.into()) {
            Entry::Vacant(slot) => {
                slot.insert(control);
            }
            Entry::Occupied(existing) => {
                warn!(
                    input = %existing.key(),
                    kept = existing.get().kind(),
                    dropped = control.kind(),
                    "duplicate operation input name"
                );
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&ControlSpec> {
        self.0.get(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ControlSpec)> {
        self.0.iter().map(|(name, control)| (name.as_str(), control))
    }
}
