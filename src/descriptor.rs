use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One declared input of a remote operation, as reported by the module detail endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InputDescriptor {
    pub name: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub generic_type: Option<String>,
    #[serde(default)]
    pub raw_type: Option<String>,
    #[serde(default)]
    pub default_value: Option<Value>,
    #[serde(default)]
    pub minimum_value: Option<Value>,
    #[serde(default)]
    pub maximum_value: Option<Value>,
    #[serde(default)]
    pub widget_style: Option<String>,
    #[serde(default)]
    pub choices: Option<Vec<String>>,
}

/// Detail record for one operation. Outputs are not consumed yet.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OperationDetail {
    #[serde(default)]
    pub inputs: Vec<InputDescriptor>,
}

/// Strips generic parameters and modifiers: `"java.util.List<java.lang.String>"` is
/// `"java.util.List"`, `"final double"` is `"double"`.
pub fn raw_type_of(generic_type: &str) -> &str {
    let head = generic_type.split('<').next().unwrap_or_default();
    head.split(' ').next_back().unwrap_or_default()
}

impl InputDescriptor {
    pub fn new(name: impl Into<String>, generic_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            generic_type: Some(generic_type.into()),
            ..Self::default()
        }
    }

    /// Raw type derived from `genericType`, falling back to the record's own `rawType`.
    pub fn resolved_raw_type(&self) -> &str {
        match self.generic_type.as_deref() {
            Some(generic) => raw_type_of(generic),
            None => self.raw_type.as_deref().map(raw_type_of).unwrap_or_default(),
        }
    }

    /// Display text: the label when non-empty, else the input name.
    pub fn display_text(&self) -> &str {
        self.label
            .as_deref()
            .filter(|v| !v.is_empty())
            .unwrap_or(self.name.as_str())
    }

    pub fn widget_style_lower(&self) -> String {
        self.widget_style
            .as_deref()
            .map(str::to_lowercase)
            .unwrap_or_default()
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_default(mut self, value: Value) -> Self {
        self.default_value = Some(value);
        self
    }

    pub fn with_bounds(mut self, min: Option<Value>, max: Option<Value>) -> Self {
        self.minimum_value = min;
        self.maximum_value = max;
        self
    }

    pub fn with_widget_style(mut self, style: impl Into<String>) -> Self {
        self.widget_style = Some(style.into());
        self
    }

    pub fn with_choices<I, S>(mut self, choices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.choices = Some(choices.into_iter().map(Into::into).collect());
        self
    }
}

/// Non-finite values ("NaN", "inf") read as missing.
pub(crate) fn value_as_f64(value: Option<&Value>) -> Option<f64> {
    let parsed = match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|v| v.is_finite())
}

pub(crate) fn value_as_i64(value: Option<&Value>) -> Option<i64> {
    match value? {
        Value::Number(n) => n.as_i64().or_else(|| truncate_finite(n.as_f64())),
        Value::String(s) => {
            let trimmed = s.trim();
            trimmed
                .parse::<i64>()
                .ok()
                .or_else(|| truncate_finite(trimmed.parse::<f64>().ok()))
        }
        _ => None,
    }
}

fn truncate_finite(value: Option<f64>) -> Option<i64> {
    value.filter(|v| v.is_finite()).map(|v| v.trunc() as i64)
}

pub(crate) fn value_as_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}
