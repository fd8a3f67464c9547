//! Named, reusable workout configurations.

mod query;
mod store;

pub use query::{TemplateQuery, TemplateSort};
pub use store::{TemplateStore, FAVORITES_LIMIT};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::workout::WorkoutConfig;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkoutTemplate {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub config: WorkoutConfig,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub is_favorite: bool,
    #[serde(default)]
    pub times_used: u32,
}

impl WorkoutTemplate {
    /// Refresh `updated_at`. Successive touches always move it forward,
    /// even when the clock has not.
    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = if now > self.updated_at {
            now
        } else {
            self.updated_at + Duration::milliseconds(1)
        };
    }
}

/// Fields that `TemplateStore::update` may change.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplatePatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl TemplatePatch {
    pub fn name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            description: None,
        }
    }

    pub fn description(description: impl Into<String>) -> Self {
        Self {
            name: None,
            description: Some(description.into()),
        }
    }
}
