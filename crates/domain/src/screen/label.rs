use serde::{Deserialize, Serialize};

/// Translation key with the literal shown when no translation exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    key: String,
    fallback: String,
}

impl Label {
    /// Creates a label.
    #[must_use]
    pub fn new(key: impl Into<String>, fallback: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            fallback: fallback.into(),
        }
    }

    /// Creates a label whose key is `admin.<field>` and whose fallback is the
    /// field name with underscores replaced and the first letter capitalized.
    #[must_use]
    pub fn admin(field: &str) -> Self {
        let spaced = field.replace('_', " ");
        let mut characters = spaced.chars();
        let fallback = match characters.next() {
            Some(first) => first.to_uppercase().chain(characters).collect(),
            None => String::new(),
        };

        Self::new(format!("admin.{field}"), fallback)
    }

    /// Returns the translation key.
    #[must_use]
    pub fn key(&self) -> &str {
        self.key.as_str()
    }

    /// Returns the fallback literal.
    #[must_use]
    pub fn fallback(&self) -> &str {
        self.fallback.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::Label;

    #[test]
    fn admin_label_derives_fallback_from_field() {
        let label = Label::admin("start_time");
        assert_eq!(label.key(), "admin.start_time");
        assert_eq!(label.fallback(), "Start time");
    }
}
