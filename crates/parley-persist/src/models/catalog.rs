use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use std::fmt;
use std::str::FromStr;

use crate::error::PersistError;

/// A hosted model users can select. `name` is unique, `provider_id` is not.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelProfile {
    /// Display key users select by
    pub name: String,
    /// Wire identifier sent to the provider (e.g. `anthropic/claude-3-haiku`)
    pub provider_id: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "enabled_by_default")]
    pub is_enabled: bool,
    #[serde(default)]
    pub access_tier: AccessTier,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

fn enabled_by_default() -> bool {
    true
}

impl ModelProfile {
    pub fn new(
        name: impl Into<String>,
        provider_id: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            provider_id: provider_id.into(),
            api_key: api_key.into(),
            is_enabled: true,
            access_tier: AccessTier::Public,
            created_at: Utc::now(),
        }
    }

    pub fn restricted(mut self) -> Self {
        self.access_tier = AccessTier::Restricted;
        self
    }

    pub fn disabled(mut self) -> Self {
        self.is_enabled = false;
        self
    }
}

// API keys stay out of logs
impl fmt::Debug for ModelProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelProfile")
            .field("name", &self.name)
            .field("provider_id", &self.provider_id)
            .field("api_key", &"<redacted>")
            .field("is_enabled", &self.is_enabled)
            .field("access_tier", &self.access_tier)
            .finish()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessTier {
    #[default]
    Public,
    /// Only requesters on the allow-list
    Restricted,
}

impl AccessTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccessTier::Public => "public",
            AccessTier::Restricted => "restricted",
        }
    }
}

impl FromStr for AccessTier {
    type Err = PersistError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "public" => Ok(AccessTier::Public),
            "restricted" => Ok(AccessTier::Restricted),
            other => Err(PersistError::InvalidRecord(format!("unknown access tier '{}'", other))),
        }
    }
}

/// Which model a user talks to. One row per user, last write wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserModelSelection {
    pub user_id: String,
    /// Not a foreign key: may name a deleted or disabled model
    pub model_name: String,
    pub updated_at: DateTime<Utc>,
}
