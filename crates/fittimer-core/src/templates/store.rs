//! Template lifecycle: save, load, edit, favorite, duplicate, delete.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::{TemplatePatch, TemplateQuery, WorkoutTemplate};
use crate::error::ValidationError;
use crate::history::History;
use crate::workout::WorkoutConfig;

/// Size of the quick-launch favorites list.
pub const FAVORITES_LIMIT: usize = 5;

const COPY_SUFFIX: &str = " (copy)";

/// In-memory collection of templates, keyed by id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateStore {
    templates: Vec<WorkoutTemplate>,
}

impl TemplateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_templates(templates: Vec<WorkoutTemplate>) -> Self {
        Self { templates }
    }

    pub fn all(&self) -> &[WorkoutTemplate] {
        &self.templates
    }

    pub fn get(&self, id: &str) -> Option<&WorkoutTemplate> {
        self.templates.iter().find(|t| t.id == id)
    }

    fn get_mut(&mut self, id: &str) -> Option<&mut WorkoutTemplate> {
        self.templates.iter_mut().find(|t| t.id == id)
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Create a template from a config. The name must not be blank.
    pub fn save(
        &mut self,
        name: &str,
        description: &str,
        config: WorkoutConfig,
        now: DateTime<Utc>,
    ) -> Result<WorkoutTemplate, ValidationError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::EmptyName);
        }
        let template = WorkoutTemplate {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            description: description.trim().to_string(),
            config,
            created_at: now,
            updated_at: now,
            is_favorite: false,
            times_used: 0,
        };
        tracing::debug!(template_id = %template.id, name = %template.name, "Template saved");
        self.templates.push(template.clone());
        Ok(template)
    }

    /// Snapshot a finished session's config into a new template.
    ///
    /// Returns `Ok(None)` when the session is not in the history.
    pub fn create_from_history(
        &mut self,
        history: &History,
        session_id: &str,
        name: &str,
        description: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<WorkoutTemplate>, ValidationError> {
        if name.trim().is_empty() {
            return Err(ValidationError::EmptyName);
        }
        let Some(session) = history.get(session_id) else {
            return Ok(None);
        };
        let config = session.config.clone();
        self.save(name, description, config, now).map(Some)
    }

    /// Hand out a template's config and count the use.
    pub fn load(&mut self, id: &str, now: DateTime<Utc>) -> Option<WorkoutConfig> {
        let template = self.get_mut(id)?;
        template.times_used += 1;
        template.touch(now);
        tracing::debug!(template_id = %id, times_used = template.times_used, "Template loaded");
        Some(template.config.clone())
    }

    /// Merge name/description changes. A blank name is ignored.
    pub fn update(&mut self, id: &str, patch: TemplatePatch, now: DateTime<Utc>) -> bool {
        let Some(template) = self.get_mut(id) else {
            return false;
        };
        if let Some(name) = patch.name {
            let name = name.trim();
            if !name.is_empty() {
                template.name = name.to_string();
            }
        }
        if let Some(description) = patch.description {
            template.description = description.trim().to_string();
        }
        template.touch(now);
        true
    }

    pub fn replace_config(&mut self, id: &str, config: WorkoutConfig, now: DateTime<Utc>) -> bool {
        let Some(template) = self.get_mut(id) else {
            return false;
        };
        template.config = config;
        template.touch(now);
        true
    }

    /// Flip the favorite flag. Returns the new value.
    pub fn toggle_favorite(&mut self, id: &str, now: DateTime<Utc>) -> Option<bool> {
        let template = self.get_mut(id)?;
        template.is_favorite = !template.is_favorite;
        template.touch(now);
        Some(template.is_favorite)
    }

    pub fn duplicate(&mut self, id: &str, now: DateTime<Utc>) -> Option<WorkoutTemplate> {
        let source = self.get(id)?;
        let copy = WorkoutTemplate {
            id: Uuid::new_v4().to_string(),
            name: format!("{}{}", source.name, COPY_SUFFIX),
            description: source.description.clone(),
            config: source.config.clone(),
            created_at: now,
            updated_at: now,
            is_favorite: false,
            times_used: 0,
        };
        self.templates.push(copy.clone());
        Some(copy)
    }

    pub fn delete(&mut self, id: &str) -> bool {
        let before = self.templates.len();
        self.templates.retain(|t| t.id != id);
        before != self.templates.len()
    }

    /// Favorite templates, most used first, capped for quick launch.
    pub fn favorites(&self) -> Vec<&WorkoutTemplate> {
        let mut favorites: Vec<_> = self.templates.iter().filter(|t| t.is_favorite).collect();
        favorites.sort_by(|a, b| b.times_used.cmp(&a.times_used));
        favorites.truncate(FAVORITES_LIMIT);
        favorites
    }

    pub fn query(&self, query: &TemplateQuery) -> Vec<&WorkoutTemplate> {
        let mut found: Vec<_> = self.templates.iter().filter(|t| query.matches(t)).collect();
        found.sort_by(|a, b| query.compare(a, b));
        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::templates::TemplateSort;
    use crate::workout::{WorkoutMode, WorkoutSession};
    use chrono::Duration;

    fn config() -> WorkoutConfig {
        WorkoutConfig::with_names(WorkoutMode::PairedSet, ["Bench", "Row"], 40, 60)
    }

    #[test]
    fn save_rejects_blank_name() {
        let mut store = TemplateStore::new();
        assert_eq!(
            store.save("   ", "", config(), Utc::now()),
            Err(ValidationError::EmptyName)
        );
        assert!(store.is_empty());
    }

    #[test]
    fn save_initializes_counters() {
        let mut store = TemplateStore::new();
        let now = Utc::now();
        let t = store.save("  Push day ", "chest", config(), now).unwrap();
        assert_eq!(t.name, "Push day");
        assert_eq!(t.times_used, 0);
        assert!(!t.is_favorite);
        assert_eq!(t.created_at, now);
        assert_eq!(t.updated_at, now);
    }

    #[test]
    fn load_counts_uses_and_moves_updated_at_forward() {
        let mut store = TemplateStore::new();
        let now = Utc::now();
        let config = config();
        let id = store.save("Push", "", config.clone(), now).unwrap().id;

        let mut last = store.get(&id).unwrap().updated_at;
        for _ in 0..3 {
            // Same instant every time: updated_at must still increase.
            assert_eq!(store.load(&id, now).as_ref(), Some(&config));
            let updated = store.get(&id).unwrap().updated_at;
            assert!(updated > last);
            last = updated;
        }
        assert_eq!(store.get(&id).unwrap().times_used, 3);
    }

    #[test]
    fn load_unknown_id_is_noop() {
        let mut store = TemplateStore::new();
        assert!(store.load("missing", Utc::now()).is_none());
    }

    #[test]
    fn update_merges_fields() {
        let mut store = TemplateStore::new();
        let id = store.save("Push", "old", config(), Utc::now()).unwrap().id;
        assert!(store.update(&id, TemplatePatch::description("new"), Utc::now()));
        assert!(store.update(&id, TemplatePatch::name(" "), Utc::now()));
        let t = store.get(&id).unwrap();
        assert_eq!(t.name, "Push");
        assert_eq!(t.description, "new");
        assert!(!store.update("missing", TemplatePatch::name("x"), Utc::now()));
    }

    #[test]
    fn toggle_favorite_flips() {
        let mut store = TemplateStore::new();
        let id = store.save("Push", "", config(), Utc::now()).unwrap().id;
        assert_eq!(store.toggle_favorite(&id, Utc::now()), Some(true));
        assert_eq!(store.toggle_favorite(&id, Utc::now()), Some(false));
        assert_eq!(store.toggle_favorite("missing", Utc::now()), None);
    }

    #[test]
    fn duplicate_resets_usage() {
        let mut store = TemplateStore::new();
        let id = store.save("Push", "desc", config(), Utc::now()).unwrap().id;
        store.load(&id, Utc::now());
        store.toggle_favorite(&id, Utc::now());

        let copy = store.duplicate(&id, Utc::now()).unwrap();
        assert_ne!(copy.id, id);
        assert_eq!(copy.name, "Push (copy)");
        assert_eq!(copy.description, "desc");
        assert_eq!(copy.times_used, 0);
        assert!(!copy.is_favorite);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn delete_removes_template() {
        let mut store = TemplateStore::new();
        let id = store.save("Push", "", config(), Utc::now()).unwrap().id;
        assert!(store.delete(&id));
        assert!(!store.delete(&id));
        assert!(store.is_empty());
    }

    #[test]
    fn create_from_history_snapshots_config() {
        let mut history = History::new();
        let now = Utc::now();
        let config = config();
        let session = WorkoutSession::begin(config.clone(), now)
            .finish(3, now + Duration::seconds(300));
        let session_id = session.id.clone();
        history.append(session);

        let mut store = TemplateStore::new();
        let t = store
            .create_from_history(&history, &session_id, "Replay", "", now)
            .unwrap()
            .unwrap();
        assert_eq!(t.config, config);
        assert_eq!(store.create_from_history(&history, "missing", "x", "", now), Ok(None));
        assert_eq!(
            store.create_from_history(&history, &session_id, "", "", now),
            Err(ValidationError::EmptyName)
        );
    }

    #[test]
    fn favorites_sorted_by_use_and_capped() {
        let mut store = TemplateStore::new();
        let now = Utc::now();
        for i in 0..7u32 {
            let id = store.save(&format!("T{i}"), "", config(), now).unwrap().id;
            store.toggle_favorite(&id, now);
            for _ in 0..i {
                store.load(&id, now);
            }
        }
        store.save("Plain", "", config(), now).unwrap();

        let favorites = store.favorites();
        assert_eq!(favorites.len(), FAVORITES_LIMIT);
        let uses: Vec<u32> = favorites.iter().map(|t| t.times_used).collect();
        assert_eq!(uses, vec![6, 5, 4, 3, 2]);
    }

    #[test]
    fn query_filters_and_sorts() {
        let mut store = TemplateStore::new();
        let now = Utc::now();
        let legs = WorkoutConfig::with_names(WorkoutMode::GiantSet, ["Squat"], 40, 60);
        let curls = WorkoutConfig::with_names(WorkoutMode::DropSet, ["Curl"], 30, 90);
        store.save("Legs", "squat focus", legs, now).unwrap();
        let arms = store.save("arms", "", curls, now).unwrap().id;
        store.save("Back", "", config(), now).unwrap();
        store.load(&arms, now);

        let found = store.query(&TemplateQuery::search("SQUAT"));
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Legs");

        let drop_only = store.query(&TemplateQuery::default().with_mode(WorkoutMode::DropSet));
        assert_eq!(drop_only.len(), 1);

        let by_name: Vec<_> = store
            .query(&TemplateQuery::default().sorted_by(TemplateSort::Name))
            .iter()
            .map(|t| t.name.clone())
            .collect();
        assert_eq!(by_name, vec!["arms", "Back", "Legs"]);

        let recent = store.query(&TemplateQuery::default());
        assert_eq!(recent[0].name, "arms");

        assert!(store.query(&TemplateQuery::default().favorites()).is_empty());
    }
}
