use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::DataScope;

/// Value conversion applied to one field before display.
pub trait Transform<In: ?Sized, Out> {
    /// Converts the stored value into its display form.
    fn apply(&self, input: &In) -> Out;
}

impl<In: ?Sized, Out, F> Transform<In, Out> for F
where
    F: Fn(&In) -> Out,
{
    fn apply(&self, input: &In) -> Out {
        self(input)
    }
}

/// Display transforms the grid and detail renderers know how to apply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DisplayTransform {
    /// Replaces null or empty values with a placeholder.
    Placeholder {
        /// Text shown instead of the empty value.
        text: String,
    },
    /// Shows the `name` of the first related record.
    FirstRelationName,
    /// Shows the `name` of every related record, or nothing when empty.
    RelationNames,
    /// Shows the data scope label for a stored scope value.
    DataScopeLabel,
    /// Wraps the value in a styled badge.
    Badge {
        /// Badge style understood by the engine.
        style: String,
    },
}

impl DisplayTransform {
    /// The `--` placeholder used for unset timestamps.
    #[must_use]
    pub fn dashes() -> Self {
        Self::Placeholder {
            text: "--".to_owned(),
        }
    }

    /// A badge with the given style.
    #[must_use]
    pub fn badge(style: impl Into<String>) -> Self {
        Self::Badge {
            style: style.into(),
        }
    }
}

impl Transform<Value, Value> for DisplayTransform {
    fn apply(&self, input: &Value) -> Value {
        match self {
            Self::Placeholder { text } => match input {
                Value::Null => Value::String(text.clone()),
                Value::String(value) if value.is_empty() => Value::String(text.clone()),
                other => other.clone(),
            },
            Self::FirstRelationName => input
                .as_array()
                .and_then(|related| related.first())
                .and_then(|first| first.get("name"))
                .cloned()
                .unwrap_or(Value::Null),
            Self::RelationNames => match input.as_array() {
                Some(related) if !related.is_empty() => Value::Array(
                    related
                        .iter()
                        .filter_map(|record| record.get("name").cloned())
                        .collect(),
                ),
                _ => Value::Null,
            },
            Self::DataScopeLabel => {
                let scope = match input.as_i64() {
                    Some(1) => DataScope::SelfAndCreated,
                    _ => DataScope::All,
                };
                Value::String(scope.label().to_owned())
            }
            Self::Badge { style } => json!({ "badge": style, "text": input }),
        }
    }
}
