use serde::{Deserialize, Serialize};
use warden_core::{AppError, AppResult};

/// Unique identifier for a role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleId(i64);

impl RoleId {
    /// Creates a role identifier from its storage value.
    #[must_use]
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    /// Returns the storage value.
    #[must_use]
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for RoleId {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Rows a role holder may see and edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataScope {
    /// The holder's own account and accounts the holder created.
    #[default]
    SelfAndCreated,
    /// Every row.
    All,
}

impl DataScope {
    /// Returns the stable storage value.
    #[must_use]
    pub fn as_storage(&self) -> i16 {
        match self {
            Self::SelfAndCreated => 1,
            Self::All => 2,
        }
    }

    /// Parses a storage value.
    pub fn from_storage(value: i64) -> AppResult<Self> {
        match value {
            1 => Ok(Self::SelfAndCreated),
            2 => Ok(Self::All),
            _ => Err(AppError::Validation(format!(
                "unknown data scope value '{value}'"
            ))),
        }
    }

    /// Returns the display label used by grids and detail views.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::SelfAndCreated => "Self and self-created users",
            Self::All => "All",
        }
    }

    /// Returns the option label used by the form radio editor.
    #[must_use]
    pub fn option_label(&self) -> &'static str {
        match self {
            Self::SelfAndCreated => "1 - Self and self-created users",
            Self::All => "All",
        }
    }

    /// Returns every scope in option order.
    #[must_use]
    pub fn all() -> &'static [Self] {
        &[Self::SelfAndCreated, Self::All]
    }
}
