//! Filtering and ordering for the template library view.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use super::WorkoutTemplate;
use crate::workout::WorkoutMode;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateSort {
    /// Most recently updated first.
    #[default]
    Recent,
    Oldest,
    Name,
    /// Most used first.
    Popular,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateQuery {
    /// Case-insensitive match against name or description. Empty matches all.
    #[serde(default)]
    pub search: String,
    #[serde(default)]
    pub mode: Option<WorkoutMode>,
    #[serde(default)]
    pub favorites_only: bool,
    #[serde(default)]
    pub sort: TemplateSort,
}

impl TemplateQuery {
    pub fn search(search: impl Into<String>) -> Self {
        Self {
            search: search.into(),
            ..Self::default()
        }
    }

    pub fn with_mode(mut self, mode: WorkoutMode) -> Self {
        self.mode = Some(mode);
        self
    }

    pub fn favorites(mut self) -> Self {
        self.favorites_only = true;
        self
    }

    pub fn sorted_by(mut self, sort: TemplateSort) -> Self {
        self.sort = sort;
        self
    }

    pub fn matches(&self, template: &WorkoutTemplate) -> bool {
        let needle = self.search.trim().to_lowercase();
        let matches_search = needle.is_empty()
            || template.name.to_lowercase().contains(&needle)
            || template.description.to_lowercase().contains(&needle);
        let matches_mode = self.mode.map_or(true, |m| template.config.mode == m);
        let matches_favorite = !self.favorites_only || template.is_favorite;
        matches_search && matches_mode && matches_favorite
    }

    pub fn compare(&self, a: &WorkoutTemplate, b: &WorkoutTemplate) -> Ordering {
        match self.sort {
            TemplateSort::Recent => b.updated_at.cmp(&a.updated_at),
            TemplateSort::Oldest => a.updated_at.cmp(&b.updated_at),
            TemplateSort::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
            TemplateSort::Popular => b.times_used.cmp(&a.times_used),
        }
    }
}
