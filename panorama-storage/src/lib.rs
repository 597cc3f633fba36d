//! Panorama Storage - Storage Trait and In-Memory Implementation
//!
//! Defines the storage abstraction layer for Panorama entities and ships the
//! in-memory `MemoryStore` backend. A SQL-backed implementation would live
//! behind the same trait.
//!
//! All tables sit behind a single lock so that constraint-checked writes and
//! cascading deletes commit atomically: either the whole cascade lands or
//! none of it does.

pub mod cache;
pub mod history;

pub use cache::{CacheConfig, CacheStats, SessionListCache, SessionSnapshot};
pub use history::{HistoryLog, HistoryRecord};

use panorama_core::{
    Assessment, AssessmentFilter, ChangeKind, Competency, EntityId, EntityType, Evaluator,
    PanoramaResult, Profile, Project, Session, SessionCompetency, StaffRole, StorageError, User,
    VisitLog,
};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::sync::RwLock;
use uuid::Uuid;

// ============================================================================
// UPDATE TYPES
// ============================================================================

/// Update payload for profiles.
///
/// `avatar_path` and `resume_path` are doubly-optional: the outer `None`
/// leaves the field untouched, `Some(None)` clears it.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub full_name: Option<String>,
    pub department: Option<String>,
    pub role: Option<StaffRole>,
    pub hire_date: Option<chrono::NaiveDate>,
    pub is_active: Option<bool>,
    pub avatar_path: Option<Option<String>>,
    pub resume_path: Option<Option<String>>,
    pub portfolio: Option<String>,
    pub project_ids: Option<Vec<EntityId>>,
}

/// Update payload for competencies.
#[derive(Debug, Clone, Default)]
pub struct CompetencyUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub department: Option<String>,
}

impl CompetencyUpdate {
    /// Whether any field is set.
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none() && self.department.is_none()
    }
}

/// Update payload for sessions.
#[derive(Debug, Clone, Default)]
pub struct SessionUpdate {
    pub title: Option<String>,
    pub is_active: Option<bool>,
}

/// Update payload for assessments. `created_at` is immutable and has no slot
/// here on purpose.
#[derive(Debug, Clone, Default)]
pub struct AssessmentUpdate {
    pub score: Option<i16>,
    pub comment: Option<String>,
}

/// Per-session average over all of its assessment scores.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionAverage {
    pub session_id: EntityId,
    pub title: String,
    /// Arithmetic mean of all scores; `None` when the session has no
    /// assessments (never zero, never an error).
    pub average_score: Option<f64>,
}

// ============================================================================
// STORAGE TRAIT
// ============================================================================

/// Storage trait for Panorama entities.
///
/// Write operations enforce the uniqueness invariants at this layer,
/// independent of any query path: duplicate `(session, competency,
/// evaluator)` assessments, duplicate `(session, evaluator)` rows and
/// duplicate `(session, competency)` links are rejected with
/// `StorageError::UniqueViolation`. Deletes cascade atomically.
pub trait StorageTrait: Send + Sync {
    // === User Operations ===

    /// Insert a new user. The username must be unique.
    fn user_insert(&self, user: &User) -> PanoramaResult<()>;

    /// Get a user by ID.
    fn user_get(&self, id: EntityId) -> PanoramaResult<Option<User>>;

    /// Get a user by username (exact match).
    fn user_get_by_username(&self, username: &str) -> PanoramaResult<Option<User>>;

    /// List all users, oldest first.
    fn user_list(&self) -> PanoramaResult<Vec<User>>;

    /// Delete a user, cascading to their profile, authored assessments,
    /// evaluator memberships, visit rows, and sessions they are evaluated in.
    fn user_delete(&self, id: EntityId) -> PanoramaResult<()>;

    // === Profile Operations ===

    /// Insert a new profile. One profile per user; a blank `full_name` is
    /// populated from the owning user's name exactly once, here.
    fn profile_insert(&self, profile: &Profile) -> PanoramaResult<Profile>;

    /// Get a profile by ID.
    fn profile_get(&self, id: EntityId) -> PanoramaResult<Option<Profile>>;

    /// Get the profile owned by a user.
    fn profile_get_by_user(&self, user_id: EntityId) -> PanoramaResult<Option<Profile>>;

    /// Update a profile.
    fn profile_update(&self, id: EntityId, update: ProfileUpdate) -> PanoramaResult<Profile>;

    /// Delete a profile.
    fn profile_delete(&self, id: EntityId) -> PanoramaResult<()>;

    /// List all profiles.
    fn profile_list(&self) -> PanoramaResult<Vec<Profile>>;

    // === Project Operations ===

    /// Insert a new project.
    fn project_insert(&self, project: &Project) -> PanoramaResult<()>;

    /// Get a project by ID.
    fn project_get(&self, id: EntityId) -> PanoramaResult<Option<Project>>;

    /// List all projects.
    fn project_list(&self) -> PanoramaResult<Vec<Project>>;

    /// Delete a project and detach it from all profiles.
    fn project_delete(&self, id: EntityId) -> PanoramaResult<()>;

    /// Case-insensitive substring search over project names.
    fn project_search_name(&self, query: &str) -> PanoramaResult<Vec<Project>>;

    /// Projects with an end date set, most recently started first.
    fn projects_current(&self, limit: usize) -> PanoramaResult<Vec<Project>>;

    // === Competency Operations (history-tracked) ===

    /// Insert a new competency.
    fn competency_insert(&self, competency: &Competency) -> PanoramaResult<()>;

    /// Get a competency by ID.
    fn competency_get(&self, id: EntityId) -> PanoramaResult<Option<Competency>>;

    /// List all competencies.
    fn competency_list(&self) -> PanoramaResult<Vec<Competency>>;

    /// Update a competency.
    fn competency_update(&self, id: EntityId, update: CompetencyUpdate)
        -> PanoramaResult<Competency>;

    /// Delete a competency, cascading to its session links and assessments.
    fn competency_delete(&self, id: EntityId) -> PanoramaResult<()>;

    /// Case-insensitive substring search over competency names.
    fn competency_search_icontains(&self, name: &str) -> PanoramaResult<Vec<Competency>>;

    /// Case-sensitive substring search over competency names.
    fn competency_search_contains(&self, name: &str) -> PanoramaResult<Vec<Competency>>;

    /// All distinct competency names.
    fn competency_names(&self) -> PanoramaResult<Vec<String>>;

    /// Number of competencies.
    fn competency_count(&self) -> PanoramaResult<usize>;

    /// Whether a competency with exactly this name exists.
    fn competency_exists(&self, name: &str) -> PanoramaResult<bool>;

    /// Competencies matching both name and department, case-insensitively.
    fn competency_filter_by_name_department(
        &self,
        name: &str,
        department: &str,
    ) -> PanoramaResult<Vec<Competency>>;

    /// Competencies ranked by the number of distinct sessions they are
    /// attached to, most popular first.
    fn competency_session_counts(&self) -> PanoramaResult<Vec<(Competency, usize)>>;

    // === Session Operations (history-tracked) ===

    /// Insert a new session. The evaluated user must exist.
    fn session_insert(&self, session: &Session) -> PanoramaResult<()>;

    /// Get a session by ID.
    fn session_get(&self, id: EntityId) -> PanoramaResult<Option<Session>>;

    /// List all sessions, oldest first.
    fn session_list(&self) -> PanoramaResult<Vec<Session>>;

    /// Update a session.
    fn session_update(&self, id: EntityId, update: SessionUpdate) -> PanoramaResult<Session>;

    /// Delete a session, cascading to its competency links, evaluators, and
    /// assessments.
    fn session_delete(&self, id: EntityId) -> PanoramaResult<()>;

    /// Number of sessions.
    fn session_count(&self) -> PanoramaResult<usize>;

    /// Case-insensitive substring search over session titles.
    fn session_search_title(&self, query: &str) -> PanoramaResult<Vec<Session>>;

    /// Active sessions, newest first.
    fn sessions_recent_active(&self, limit: usize) -> PanoramaResult<Vec<Session>>;

    /// Average assessment score per session, `None` where a session has no
    /// assessments.
    fn session_average_scores(&self) -> PanoramaResult<Vec<SessionAverage>>;

    // === Session/Competency Links ===

    /// Attach a competency to a session. The (session, competency) pair must
    /// be unique and both sides must exist.
    fn session_competency_add(&self, link: &SessionCompetency) -> PanoramaResult<()>;

    /// Links for a session.
    fn session_competencies_for(&self, session_id: EntityId)
        -> PanoramaResult<Vec<SessionCompetency>>;

    // === Evaluator Operations ===

    /// Register a user as evaluator on a session. The (session, user) pair
    /// must be unique and both sides must exist.
    fn evaluator_add(&self, evaluator: &Evaluator) -> PanoramaResult<()>;

    /// Evaluators registered on a session.
    fn evaluators_for(&self, session_id: EntityId) -> PanoramaResult<Vec<Evaluator>>;

    // === Assessment Operations (history-tracked) ===

    /// Insert a new assessment. The (session, competency, evaluator) triple
    /// must be unique; session, competency, and evaluator user must exist.
    fn assessment_insert(&self, assessment: &Assessment) -> PanoramaResult<()>;

    /// Get an assessment by ID.
    fn assessment_get(&self, id: EntityId) -> PanoramaResult<Option<Assessment>>;

    /// Update an assessment's score or comment. `created_at` never changes.
    fn assessment_update(
        &self,
        id: EntityId,
        update: AssessmentUpdate,
    ) -> PanoramaResult<Assessment>;

    /// Delete an assessment.
    fn assessment_delete(&self, id: EntityId) -> PanoramaResult<()>;

    /// List assessments matching the filter, newest first.
    fn assessment_list(&self, filter: AssessmentFilter) -> PanoramaResult<Vec<Assessment>>;

    /// Assessments authored by a user, newest first.
    fn assessments_by_evaluator(&self, user_id: EntityId) -> PanoramaResult<Vec<Assessment>>;

    // === Visit Log ===

    /// Append one visit row.
    fn visit_append(&self, visit: &VisitLog) -> PanoramaResult<()>;

    /// All visit rows, newest first.
    fn visit_list(&self) -> PanoramaResult<Vec<VisitLog>>;

    // === History ===

    /// History records for one entity, oldest first.
    fn history_for(
        &self,
        entity_type: EntityType,
        entity_id: EntityId,
    ) -> PanoramaResult<Vec<HistoryRecord>>;

    /// Total number of history records.
    fn history_len(&self) -> PanoramaResult<usize>;
}

// ============================================================================
// IN-MEMORY STORE
// ============================================================================

#[derive(Debug, Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    profiles: HashMap<Uuid, Profile>,
    projects: HashMap<Uuid, Project>,
    competencies: HashMap<Uuid, Competency>,
    sessions: HashMap<Uuid, Session>,
    session_competencies: HashMap<Uuid, SessionCompetency>,
    evaluators: HashMap<Uuid, Evaluator>,
    assessments: HashMap<Uuid, Assessment>,
    visits: Vec<VisitLog>,
    history: HistoryLog,
}

/// In-memory storage backend.
///
/// A single `RwLock` guards every table, so each write operation - including
/// multi-table cascades - executes under one exclusive guard and is atomic
/// with its history records.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> PanoramaResult<std::sync::RwLockReadGuard<'_, Tables>> {
        self.tables
            .read()
            .map_err(|_| StorageError::LockPoisoned.into())
    }

    fn write(&self) -> PanoramaResult<std::sync::RwLockWriteGuard<'_, Tables>> {
        self.tables
            .write()
            .map_err(|_| StorageError::LockPoisoned.into())
    }
}

fn not_found(entity_type: EntityType, id: Uuid) -> panorama_core::PanoramaError {
    StorageError::NotFound { entity_type, id }.into()
}

fn unique_violation(entity_type: EntityType, constraint: &str) -> panorama_core::PanoramaError {
    StorageError::UniqueViolation {
        entity_type,
        constraint: constraint.to_string(),
    }
    .into()
}

/// Record a history snapshot before committing the primary write. Called
/// under the same write guard as the write itself, so the trail stays
/// ordered and atomic with the change.
fn record_history<T: Serialize>(
    tables: &mut Tables,
    entity_type: EntityType,
    entity_id: EntityId,
    change: ChangeKind,
    state: &T,
) -> PanoramaResult<()> {
    let snapshot = serde_json::to_value(state).map_err(|e| StorageError::InsertFailed {
        entity_type,
        reason: format!("history snapshot serialization failed: {}", e),
    })?;
    tables
        .history
        .append(entity_type, entity_id, change, snapshot);
    Ok(())
}

/// Remove a session and its dependent rows. Assessments removed by the
/// cascade get their own delete snapshots.
fn delete_session_rows(tables: &mut Tables, session_id: Uuid) -> PanoramaResult<()> {
    let session = tables
        .sessions
        .get(&session_id)
        .cloned()
        .ok_or_else(|| not_found(EntityType::Session, session_id))?;

    let doomed: Vec<Assessment> = tables
        .assessments
        .values()
        .filter(|a| a.session_id == session_id)
        .cloned()
        .collect();
    for assessment in doomed {
        record_history(
            tables,
            EntityType::Assessment,
            assessment.assessment_id,
            ChangeKind::Delete,
            &assessment,
        )?;
        tables.assessments.remove(&assessment.assessment_id);
    }

    tables
        .session_competencies
        .retain(|_, link| link.session_id != session_id);
    tables
        .evaluators
        .retain(|_, e| e.session_id != session_id);

    record_history(
        tables,
        EntityType::Session,
        session_id,
        ChangeKind::Delete,
        &session,
    )?;
    tables.sessions.remove(&session_id);
    Ok(())
}

fn icontains(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

impl StorageTrait for MemoryStore {
    // === User Operations ===

    fn user_insert(&self, user: &User) -> PanoramaResult<()> {
        let mut tables = self.write()?;
        if tables.users.contains_key(&user.user_id) {
            return Err(unique_violation(EntityType::User, "(user_id)"));
        }
        if tables.users.values().any(|u| u.username == user.username) {
            return Err(unique_violation(EntityType::User, "(username)"));
        }
        tables.users.insert(user.user_id, user.clone());
        Ok(())
    }

    fn user_get(&self, id: EntityId) -> PanoramaResult<Option<User>> {
        let tables = self.read()?;
        Ok(tables.users.get(&id).cloned())
    }

    fn user_get_by_username(&self, username: &str) -> PanoramaResult<Option<User>> {
        let tables = self.read()?;
        Ok(tables
            .users
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    fn user_list(&self) -> PanoramaResult<Vec<User>> {
        let tables = self.read()?;
        let mut users: Vec<User> = tables.users.values().cloned().collect();
        users.sort_by_key(|u| u.created_at);
        Ok(users)
    }

    fn user_delete(&self, id: EntityId) -> PanoramaResult<()> {
        let mut tables = self.write()?;
        if !tables.users.contains_key(&id) {
            return Err(not_found(EntityType::User, id));
        }

        // Sessions where this user is the evaluated subject cascade in full.
        let doomed_sessions: Vec<Uuid> = tables
            .sessions
            .values()
            .filter(|s| s.evaluated == id)
            .map(|s| s.session_id)
            .collect();
        for session_id in doomed_sessions {
            delete_session_rows(&mut tables, session_id)?;
        }

        let authored: Vec<Assessment> = tables
            .assessments
            .values()
            .filter(|a| a.evaluator == id)
            .cloned()
            .collect();
        for assessment in authored {
            record_history(
                &mut tables,
                EntityType::Assessment,
                assessment.assessment_id,
                ChangeKind::Delete,
                &assessment,
            )?;
            tables.assessments.remove(&assessment.assessment_id);
        }

        tables.evaluators.retain(|_, e| e.user_id != id);
        tables.profiles.retain(|_, p| p.user_id != id);
        tables.visits.retain(|v| v.user_id != id);
        tables.users.remove(&id);
        Ok(())
    }

    // === Profile Operations ===

    fn profile_insert(&self, profile: &Profile) -> PanoramaResult<Profile> {
        let mut tables = self.write()?;
        if tables.profiles.contains_key(&profile.profile_id) {
            return Err(unique_violation(EntityType::Profile, "(profile_id)"));
        }
        if tables
            .profiles
            .values()
            .any(|p| p.user_id == profile.user_id)
        {
            return Err(unique_violation(EntityType::Profile, "(user)"));
        }
        let owner = tables
            .users
            .get(&profile.user_id)
            .ok_or_else(|| not_found(EntityType::User, profile.user_id))?;

        let mut stored = profile.clone();
        // Populated from the owning user exactly once, at first save, and
        // never overwritten by this rule afterwards.
        let blank = stored
            .full_name
            .as_deref()
            .map_or(true, |name| name.trim().is_empty());
        if blank {
            let derived = owner.full_name();
            stored.full_name = if derived.is_empty() {
                None
            } else {
                Some(derived)
            };
        }

        tables.profiles.insert(stored.profile_id, stored.clone());
        Ok(stored)
    }

    fn profile_get(&self, id: EntityId) -> PanoramaResult<Option<Profile>> {
        let tables = self.read()?;
        Ok(tables.profiles.get(&id).cloned())
    }

    fn profile_get_by_user(&self, user_id: EntityId) -> PanoramaResult<Option<Profile>> {
        let tables = self.read()?;
        Ok(tables
            .profiles
            .values()
            .find(|p| p.user_id == user_id)
            .cloned())
    }

    fn profile_update(&self, id: EntityId, update: ProfileUpdate) -> PanoramaResult<Profile> {
        let mut tables = self.write()?;
        let profile = tables
            .profiles
            .get_mut(&id)
            .ok_or_else(|| not_found(EntityType::Profile, id))?;

        if let Some(full_name) = update.full_name {
            profile.full_name = Some(full_name);
        }
        if let Some(department) = update.department {
            profile.department = Some(department);
        }
        if let Some(role) = update.role {
            profile.role = role;
        }
        if let Some(hire_date) = update.hire_date {
            profile.hire_date = Some(hire_date);
        }
        if let Some(is_active) = update.is_active {
            profile.is_active = is_active;
        }
        if let Some(avatar_path) = update.avatar_path {
            profile.avatar_path = avatar_path;
        }
        if let Some(resume_path) = update.resume_path {
            profile.resume_path = resume_path;
        }
        if let Some(portfolio) = update.portfolio {
            profile.portfolio = Some(portfolio);
        }
        if let Some(project_ids) = update.project_ids {
            profile.project_ids = project_ids;
        }

        Ok(profile.clone())
    }

    fn profile_delete(&self, id: EntityId) -> PanoramaResult<()> {
        let mut tables = self.write()?;
        tables
            .profiles
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| not_found(EntityType::Profile, id))
    }

    fn profile_list(&self) -> PanoramaResult<Vec<Profile>> {
        let tables = self.read()?;
        let mut profiles: Vec<Profile> = tables.profiles.values().cloned().collect();
        profiles.sort_by_key(|p| p.profile_id);
        Ok(profiles)
    }

    // === Project Operations ===

    fn project_insert(&self, project: &Project) -> PanoramaResult<()> {
        let mut tables = self.write()?;
        if tables.projects.contains_key(&project.project_id) {
            return Err(unique_violation(EntityType::Project, "(project_id)"));
        }
        tables.projects.insert(project.project_id, project.clone());
        Ok(())
    }

    fn project_get(&self, id: EntityId) -> PanoramaResult<Option<Project>> {
        let tables = self.read()?;
        Ok(tables.projects.get(&id).cloned())
    }

    fn project_list(&self) -> PanoramaResult<Vec<Project>> {
        let tables = self.read()?;
        let mut projects: Vec<Project> = tables.projects.values().cloned().collect();
        projects.sort_by_key(|p| p.project_id);
        Ok(projects)
    }

    fn project_delete(&self, id: EntityId) -> PanoramaResult<()> {
        let mut tables = self.write()?;
        if tables.projects.remove(&id).is_none() {
            return Err(not_found(EntityType::Project, id));
        }
        for profile in tables.profiles.values_mut() {
            profile.project_ids.retain(|pid| *pid != id);
        }
        Ok(())
    }

    fn project_search_name(&self, query: &str) -> PanoramaResult<Vec<Project>> {
        let tables = self.read()?;
        let mut projects: Vec<Project> = tables
            .projects
            .values()
            .filter(|p| icontains(&p.name, query))
            .cloned()
            .collect();
        projects.sort_by_key(|p| p.project_id);
        Ok(projects)
    }

    fn projects_current(&self, limit: usize) -> PanoramaResult<Vec<Project>> {
        let tables = self.read()?;
        let mut projects: Vec<Project> = tables
            .projects
            .values()
            .filter(|p| p.end_date.is_some())
            .cloned()
            .collect();
        projects.sort_by(|a, b| b.start_date.cmp(&a.start_date));
        projects.truncate(limit);
        Ok(projects)
    }

    // === Competency Operations ===

    fn competency_insert(&self, competency: &Competency) -> PanoramaResult<()> {
        let mut tables = self.write()?;
        if tables.competencies.contains_key(&competency.competency_id) {
            return Err(unique_violation(EntityType::Competency, "(competency_id)"));
        }
        record_history(
            &mut tables,
            EntityType::Competency,
            competency.competency_id,
            ChangeKind::Create,
            competency,
        )?;
        tables
            .competencies
            .insert(competency.competency_id, competency.clone());
        Ok(())
    }

    fn competency_get(&self, id: EntityId) -> PanoramaResult<Option<Competency>> {
        let tables = self.read()?;
        Ok(tables.competencies.get(&id).cloned())
    }

    fn competency_list(&self) -> PanoramaResult<Vec<Competency>> {
        let tables = self.read()?;
        let mut competencies: Vec<Competency> = tables.competencies.values().cloned().collect();
        competencies.sort_by_key(|c| c.competency_id);
        Ok(competencies)
    }

    fn competency_update(
        &self,
        id: EntityId,
        update: CompetencyUpdate,
    ) -> PanoramaResult<Competency> {
        let mut tables = self.write()?;
        let mut updated = tables
            .competencies
            .get(&id)
            .cloned()
            .ok_or_else(|| not_found(EntityType::Competency, id))?;

        if let Some(name) = update.name {
            updated.name = name;
        }
        if let Some(description) = update.description {
            updated.description = Some(description);
        }
        if let Some(department) = update.department {
            updated.department = Some(department);
        }

        record_history(
            &mut tables,
            EntityType::Competency,
            id,
            ChangeKind::Update,
            &updated,
        )?;
        tables.competencies.insert(id, updated.clone());
        Ok(updated)
    }

    fn competency_delete(&self, id: EntityId) -> PanoramaResult<()> {
        let mut tables = self.write()?;
        let competency = tables
            .competencies
            .get(&id)
            .cloned()
            .ok_or_else(|| not_found(EntityType::Competency, id))?;

        let doomed: Vec<Assessment> = tables
            .assessments
            .values()
            .filter(|a| a.competency_id == id)
            .cloned()
            .collect();
        for assessment in doomed {
            record_history(
                &mut tables,
                EntityType::Assessment,
                assessment.assessment_id,
                ChangeKind::Delete,
                &assessment,
            )?;
            tables.assessments.remove(&assessment.assessment_id);
        }

        tables
            .session_competencies
            .retain(|_, link| link.competency_id != id);

        record_history(
            &mut tables,
            EntityType::Competency,
            id,
            ChangeKind::Delete,
            &competency,
        )?;
        tables.competencies.remove(&id);
        Ok(())
    }

    fn competency_search_icontains(&self, name: &str) -> PanoramaResult<Vec<Competency>> {
        let tables = self.read()?;
        let mut competencies: Vec<Competency> = tables
            .competencies
            .values()
            .filter(|c| icontains(&c.name, name))
            .cloned()
            .collect();
        competencies.sort_by_key(|c| c.competency_id);
        Ok(competencies)
    }

    fn competency_search_contains(&self, name: &str) -> PanoramaResult<Vec<Competency>> {
        let tables = self.read()?;
        let mut competencies: Vec<Competency> = tables
            .competencies
            .values()
            .filter(|c| c.name.contains(name))
            .cloned()
            .collect();
        competencies.sort_by_key(|c| c.competency_id);
        Ok(competencies)
    }

    fn competency_names(&self) -> PanoramaResult<Vec<String>> {
        let mut seen = HashSet::new();
        Ok(self
            .competency_list()?
            .into_iter()
            .map(|c| c.name)
            .filter(|name| seen.insert(name.clone()))
            .collect())
    }

    fn competency_count(&self) -> PanoramaResult<usize> {
        let tables = self.read()?;
        Ok(tables.competencies.len())
    }

    fn competency_exists(&self, name: &str) -> PanoramaResult<bool> {
        let tables = self.read()?;
        Ok(tables.competencies.values().any(|c| c.name == name))
    }

    fn competency_filter_by_name_department(
        &self,
        name: &str,
        department: &str,
    ) -> PanoramaResult<Vec<Competency>> {
        let tables = self.read()?;
        let mut competencies: Vec<Competency> = tables
            .competencies
            .values()
            .filter(|c| {
                icontains(&c.name, name)
                    && c.department
                        .as_deref()
                        .map_or(false, |d| icontains(d, department))
            })
            .cloned()
            .collect();
        competencies.sort_by_key(|c| c.competency_id);
        Ok(competencies)
    }

    fn competency_session_counts(&self) -> PanoramaResult<Vec<(Competency, usize)>> {
        let tables = self.read()?;
        let mut ranked: Vec<(Competency, usize)> = tables
            .competencies
            .values()
            .map(|c| {
                let sessions: HashSet<Uuid> = tables
                    .session_competencies
                    .values()
                    .filter(|link| link.competency_id == c.competency_id)
                    .map(|link| link.session_id)
                    .collect();
                (c.clone(), sessions.len())
            })
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.name.cmp(&b.0.name)));
        Ok(ranked)
    }

    // === Session Operations ===

    fn session_insert(&self, session: &Session) -> PanoramaResult<()> {
        let mut tables = self.write()?;
        if tables.sessions.contains_key(&session.session_id) {
            return Err(unique_violation(EntityType::Session, "(session_id)"));
        }
        if !tables.users.contains_key(&session.evaluated) {
            return Err(not_found(EntityType::User, session.evaluated));
        }
        record_history(
            &mut tables,
            EntityType::Session,
            session.session_id,
            ChangeKind::Create,
            session,
        )?;
        tables.sessions.insert(session.session_id, session.clone());
        Ok(())
    }

    fn session_get(&self, id: EntityId) -> PanoramaResult<Option<Session>> {
        let tables = self.read()?;
        Ok(tables.sessions.get(&id).cloned())
    }

    fn session_list(&self) -> PanoramaResult<Vec<Session>> {
        let tables = self.read()?;
        let mut sessions: Vec<Session> = tables.sessions.values().cloned().collect();
        sessions.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.session_id.cmp(&b.session_id))
        });
        Ok(sessions)
    }

    fn session_update(&self, id: EntityId, update: SessionUpdate) -> PanoramaResult<Session> {
        let mut tables = self.write()?;
        let mut updated = tables
            .sessions
            .get(&id)
            .cloned()
            .ok_or_else(|| not_found(EntityType::Session, id))?;

        if let Some(title) = update.title {
            updated.title = title;
        }
        if let Some(is_active) = update.is_active {
            updated.is_active = is_active;
        }

        record_history(
            &mut tables,
            EntityType::Session,
            id,
            ChangeKind::Update,
            &updated,
        )?;
        tables.sessions.insert(id, updated.clone());
        Ok(updated)
    }

    fn session_delete(&self, id: EntityId) -> PanoramaResult<()> {
        let mut tables = self.write()?;
        delete_session_rows(&mut tables, id)
    }

    fn session_count(&self) -> PanoramaResult<usize> {
        let tables = self.read()?;
        Ok(tables.sessions.len())
    }

    fn session_search_title(&self, query: &str) -> PanoramaResult<Vec<Session>> {
        let tables = self.read()?;
        let mut sessions: Vec<Session> = tables
            .sessions
            .values()
            .filter(|s| icontains(&s.title, query))
            .cloned()
            .collect();
        sessions.sort_by_key(|s| s.session_id);
        Ok(sessions)
    }

    fn sessions_recent_active(&self, limit: usize) -> PanoramaResult<Vec<Session>> {
        let tables = self.read()?;
        let mut sessions: Vec<Session> = tables
            .sessions
            .values()
            .filter(|s| s.is_active)
            .cloned()
            .collect();
        sessions.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        sessions.truncate(limit);
        Ok(sessions)
    }

    fn session_average_scores(&self) -> PanoramaResult<Vec<SessionAverage>> {
        let tables = self.read()?;
        let mut sessions: Vec<&Session> = tables.sessions.values().collect();
        sessions.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.session_id.cmp(&b.session_id))
        });

        Ok(sessions
            .into_iter()
            .map(|session| {
                let scores: Vec<i16> = tables
                    .assessments
                    .values()
                    .filter(|a| a.session_id == session.session_id)
                    .map(|a| a.score)
                    .collect();
                let average_score = if scores.is_empty() {
                    None
                } else {
                    Some(scores.iter().map(|s| f64::from(*s)).sum::<f64>() / scores.len() as f64)
                };
                SessionAverage {
                    session_id: session.session_id,
                    title: session.title.clone(),
                    average_score,
                }
            })
            .collect())
    }

    // === Session/Competency Links ===

    fn session_competency_add(&self, link: &SessionCompetency) -> PanoramaResult<()> {
        let mut tables = self.write()?;
        if !tables.sessions.contains_key(&link.session_id) {
            return Err(not_found(EntityType::Session, link.session_id));
        }
        if !tables.competencies.contains_key(&link.competency_id) {
            return Err(not_found(EntityType::Competency, link.competency_id));
        }
        if tables.session_competencies.values().any(|existing| {
            existing.session_id == link.session_id && existing.competency_id == link.competency_id
        }) {
            return Err(unique_violation(
                EntityType::SessionCompetency,
                "(session, competency)",
            ));
        }
        tables
            .session_competencies
            .insert(link.link_id, link.clone());
        Ok(())
    }

    fn session_competencies_for(
        &self,
        session_id: EntityId,
    ) -> PanoramaResult<Vec<SessionCompetency>> {
        let tables = self.read()?;
        let mut links: Vec<SessionCompetency> = tables
            .session_competencies
            .values()
            .filter(|link| link.session_id == session_id)
            .cloned()
            .collect();
        links.sort_by_key(|link| link.link_id);
        Ok(links)
    }

    // === Evaluator Operations ===

    fn evaluator_add(&self, evaluator: &Evaluator) -> PanoramaResult<()> {
        let mut tables = self.write()?;
        if !tables.sessions.contains_key(&evaluator.session_id) {
            return Err(not_found(EntityType::Session, evaluator.session_id));
        }
        if !tables.users.contains_key(&evaluator.user_id) {
            return Err(not_found(EntityType::User, evaluator.user_id));
        }
        if tables.evaluators.values().any(|existing| {
            existing.session_id == evaluator.session_id && existing.user_id == evaluator.user_id
        }) {
            return Err(unique_violation(
                EntityType::Evaluator,
                "(session, evaluator)",
            ));
        }
        tables
            .evaluators
            .insert(evaluator.evaluator_id, evaluator.clone());
        Ok(())
    }

    fn evaluators_for(&self, session_id: EntityId) -> PanoramaResult<Vec<Evaluator>> {
        let tables = self.read()?;
        let mut evaluators: Vec<Evaluator> = tables
            .evaluators
            .values()
            .filter(|e| e.session_id == session_id)
            .cloned()
            .collect();
        evaluators.sort_by_key(|e| e.evaluator_id);
        Ok(evaluators)
    }

    // === Assessment Operations ===

    fn assessment_insert(&self, assessment: &Assessment) -> PanoramaResult<()> {
        let mut tables = self.write()?;
        if tables.assessments.contains_key(&assessment.assessment_id) {
            return Err(unique_violation(EntityType::Assessment, "(assessment_id)"));
        }
        if !tables.sessions.contains_key(&assessment.session_id) {
            return Err(not_found(EntityType::Session, assessment.session_id));
        }
        if !tables
            .competencies
            .contains_key(&assessment.competency_id)
        {
            return Err(not_found(EntityType::Competency, assessment.competency_id));
        }
        if !tables.users.contains_key(&assessment.evaluator) {
            return Err(not_found(EntityType::User, assessment.evaluator));
        }
        if tables.assessments.values().any(|existing| {
            existing.session_id == assessment.session_id
                && existing.competency_id == assessment.competency_id
                && existing.evaluator == assessment.evaluator
        }) {
            return Err(unique_violation(
                EntityType::Assessment,
                "(session, competency, evaluator)",
            ));
        }
        record_history(
            &mut tables,
            EntityType::Assessment,
            assessment.assessment_id,
            ChangeKind::Create,
            assessment,
        )?;
        tables
            .assessments
            .insert(assessment.assessment_id, assessment.clone());
        Ok(())
    }

    fn assessment_get(&self, id: EntityId) -> PanoramaResult<Option<Assessment>> {
        let tables = self.read()?;
        Ok(tables.assessments.get(&id).cloned())
    }

    fn assessment_update(
        &self,
        id: EntityId,
        update: AssessmentUpdate,
    ) -> PanoramaResult<Assessment> {
        let mut tables = self.write()?;
        let mut updated = tables
            .assessments
            .get(&id)
            .cloned()
            .ok_or_else(|| not_found(EntityType::Assessment, id))?;

        if let Some(score) = update.score {
            updated.score = score;
        }
        if let Some(comment) = update.comment {
            updated.comment = Some(comment);
        }

        record_history(
            &mut tables,
            EntityType::Assessment,
            id,
            ChangeKind::Update,
            &updated,
        )?;
        tables.assessments.insert(id, updated.clone());
        Ok(updated)
    }

    fn assessment_delete(&self, id: EntityId) -> PanoramaResult<()> {
        let mut tables = self.write()?;
        let assessment = tables
            .assessments
            .get(&id)
            .cloned()
            .ok_or_else(|| not_found(EntityType::Assessment, id))?;
        record_history(
            &mut tables,
            EntityType::Assessment,
            id,
            ChangeKind::Delete,
            &assessment,
        )?;
        tables.assessments.remove(&id);
        Ok(())
    }

    fn assessment_list(&self, filter: AssessmentFilter) -> PanoramaResult<Vec<Assessment>> {
        let tables = self.read()?;
        let mut assessments: Vec<Assessment> = tables
            .assessments
            .values()
            .filter(|a| filter.score.map_or(true, |score| a.score == score))
            .filter(|a| {
                filter
                    .session_id
                    .map_or(true, |session_id| a.session_id == session_id)
            })
            .cloned()
            .collect();
        // Newest first is the default ordering for assessments.
        assessments.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.assessment_id.cmp(&a.assessment_id))
        });
        Ok(assessments)
    }

    fn assessments_by_evaluator(&self, user_id: EntityId) -> PanoramaResult<Vec<Assessment>> {
        let tables = self.read()?;
        let mut assessments: Vec<Assessment> = tables
            .assessments
            .values()
            .filter(|a| a.evaluator == user_id)
            .cloned()
            .collect();
        assessments.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.assessment_id.cmp(&a.assessment_id))
        });
        Ok(assessments)
    }

    // === Visit Log ===

    fn visit_append(&self, visit: &VisitLog) -> PanoramaResult<()> {
        let mut tables = self.write()?;
        tables.visits.push(visit.clone());
        Ok(())
    }

    fn visit_list(&self) -> PanoramaResult<Vec<VisitLog>> {
        let tables = self.read()?;
        let mut visits = tables.visits.clone();
        visits.sort_by(|a, b| {
            b.timestamp
                .cmp(&a.timestamp)
                .then_with(|| b.visit_id.cmp(&a.visit_id))
        });
        Ok(visits)
    }

    // === History ===

    fn history_for(
        &self,
        entity_type: EntityType,
        entity_id: EntityId,
    ) -> PanoramaResult<Vec<HistoryRecord>> {
        let tables = self.read()?;
        Ok(tables.history.for_entity(entity_type, entity_id))
    }

    fn history_len(&self) -> PanoramaResult<usize> {
        let tables = self.read()?;
        Ok(tables.history.len())
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use panorama_core::StaffRole;

    fn make_test_user(username: &str) -> User {
        User::new(username, "0f0f0f", "ab12").with_name("Test", "User")
    }

    fn seed_user(store: &MemoryStore, username: &str) -> User {
        let user = make_test_user(username);
        store.user_insert(&user).unwrap();
        user
    }

    fn seed_session(store: &MemoryStore, title: &str, evaluated: EntityId) -> Session {
        let session = Session::new(title, evaluated);
        store.session_insert(&session).unwrap();
        session
    }

    fn seed_competency(store: &MemoryStore, name: &str) -> Competency {
        let competency = Competency::new(name);
        store.competency_insert(&competency).unwrap();
        competency
    }

    // ========================================================================
    // User Tests
    // ========================================================================

    #[test]
    fn test_user_insert_get() {
        let store = MemoryStore::new();
        let user = seed_user(&store, "alice");

        let retrieved = store.user_get(user.user_id).unwrap();
        assert_eq!(retrieved.unwrap().username, "alice");

        let by_name = store.user_get_by_username("alice").unwrap();
        assert_eq!(by_name.unwrap().user_id, user.user_id);
    }

    #[test]
    fn test_user_duplicate_username_rejected() {
        let store = MemoryStore::new();
        let first = seed_user(&store, "alice");

        let second = make_test_user("alice");
        let result = store.user_insert(&second);
        assert!(result.is_err());

        // The original account is untouched.
        let kept = store.user_get(first.user_id).unwrap().unwrap();
        assert_eq!(kept.password_hash, first.password_hash);
    }

    #[test]
    fn test_user_delete_cascades() {
        let store = MemoryStore::new();
        let evaluated = seed_user(&store, "subject");
        let rater = seed_user(&store, "rater");

        let session = seed_session(&store, "Review", evaluated.user_id);
        let competency = seed_competency(&store, "Communication");

        store
            .profile_insert(&Profile::new(evaluated.user_id, StaffRole::Employee))
            .unwrap();
        store
            .evaluator_add(&Evaluator::new(session.session_id, rater.user_id))
            .unwrap();
        store
            .assessment_insert(&Assessment::new(
                session.session_id,
                competency.competency_id,
                rater.user_id,
                7,
            ))
            .unwrap();

        store.user_delete(evaluated.user_id).unwrap();

        // The evaluated subject's session cascades in full.
        assert!(store.session_get(session.session_id).unwrap().is_none());
        assert_eq!(
            store.assessment_list(AssessmentFilter::default()).unwrap(),
            vec![]
        );
        assert!(store.evaluators_for(session.session_id).unwrap().is_empty());
        assert!(store
            .profile_get_by_user(evaluated.user_id)
            .unwrap()
            .is_none());
        // The rater survives.
        assert!(store.user_get(rater.user_id).unwrap().is_some());
    }

    // ========================================================================
    // Profile Tests
    // ========================================================================

    #[test]
    fn test_profile_full_name_defaults_from_user_once() {
        let store = MemoryStore::new();
        let user = seed_user(&store, "alice");

        let stored = store
            .profile_insert(&Profile::new(user.user_id, StaffRole::Employee))
            .unwrap();
        assert_eq!(stored.full_name.as_deref(), Some("Test User"));

        // The rule never overwrites an explicit name afterwards.
        let updated = store
            .profile_update(
                stored.profile_id,
                ProfileUpdate {
                    full_name: Some("Someone Else".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(updated.full_name.as_deref(), Some("Someone Else"));
    }

    #[test]
    fn test_profile_explicit_name_kept() {
        let store = MemoryStore::new();
        let user = seed_user(&store, "alice");

        let stored = store
            .profile_insert(
                &Profile::new(user.user_id, StaffRole::Employee).with_full_name("Alice Wonder"),
            )
            .unwrap();
        assert_eq!(stored.full_name.as_deref(), Some("Alice Wonder"));
    }

    #[test]
    fn test_profile_one_per_user() {
        let store = MemoryStore::new();
        let user = seed_user(&store, "alice");

        store
            .profile_insert(&Profile::new(user.user_id, StaffRole::Employee))
            .unwrap();
        let result = store.profile_insert(&Profile::new(user.user_id, StaffRole::TeamLead));
        assert!(result.is_err());
    }

    #[test]
    fn test_profile_requires_existing_user() {
        let store = MemoryStore::new();
        let result = store.profile_insert(&Profile::new(Uuid::now_v7(), StaffRole::Employee));
        assert!(result.is_err());
    }

    #[test]
    fn test_profile_update_clears_avatar() {
        let store = MemoryStore::new();
        let user = seed_user(&store, "alice");
        let stored = store
            .profile_insert(&Profile::new(user.user_id, StaffRole::Employee))
            .unwrap();

        store
            .profile_update(
                stored.profile_id,
                ProfileUpdate {
                    avatar_path: Some(Some("avatars/a.png".to_string())),
                    ..Default::default()
                },
            )
            .unwrap();
        let cleared = store
            .profile_update(
                stored.profile_id,
                ProfileUpdate {
                    avatar_path: Some(None),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(cleared.avatar_path, None);
    }

    // ========================================================================
    // Constraint Tests
    // ========================================================================

    #[test]
    fn test_assessment_unique_triple() {
        let store = MemoryStore::new();
        let evaluated = seed_user(&store, "subject");
        let rater = seed_user(&store, "rater");
        let session = seed_session(&store, "Review", evaluated.user_id);
        let competency = seed_competency(&store, "Delivery");

        let first = Assessment::new(
            session.session_id,
            competency.competency_id,
            rater.user_id,
            9,
        );
        store.assessment_insert(&first).unwrap();

        let duplicate = Assessment::new(
            session.session_id,
            competency.competency_id,
            rater.user_id,
            3,
        );
        assert!(store.assessment_insert(&duplicate).is_err());

        // The first assessment is unchanged.
        let kept = store.assessment_get(first.assessment_id).unwrap().unwrap();
        assert_eq!(kept.score, 9);
    }

    #[test]
    fn test_evaluator_unique_pair() {
        let store = MemoryStore::new();
        let evaluated = seed_user(&store, "subject");
        let rater = seed_user(&store, "rater");
        let session = seed_session(&store, "Review", evaluated.user_id);

        store
            .evaluator_add(&Evaluator::new(session.session_id, rater.user_id))
            .unwrap();
        let result = store.evaluator_add(&Evaluator::new(session.session_id, rater.user_id));
        assert!(result.is_err());
    }

    #[test]
    fn test_session_competency_unique_pair() {
        let store = MemoryStore::new();
        let evaluated = seed_user(&store, "subject");
        let session = seed_session(&store, "Review", evaluated.user_id);
        let competency = seed_competency(&store, "Communication");

        store
            .session_competency_add(&SessionCompetency::new(
                session.session_id,
                competency.competency_id,
            ))
            .unwrap();
        let result = store.session_competency_add(&SessionCompetency::new(
            session.session_id,
            competency.competency_id,
        ));
        assert!(result.is_err());
    }

    #[test]
    fn test_session_requires_existing_evaluated_user() {
        let store = MemoryStore::new();
        let result = store.session_insert(&Session::new("Review", Uuid::now_v7()));
        assert!(result.is_err());
    }

    // ========================================================================
    // Cascade Tests
    // ========================================================================

    #[test]
    fn test_session_delete_cascades_and_spares_others() {
        let store = MemoryStore::new();
        let evaluated = seed_user(&store, "subject");
        let rater = seed_user(&store, "rater");
        let competency = seed_competency(&store, "Communication");

        let doomed = seed_session(&store, "Doomed", evaluated.user_id);
        let kept = seed_session(&store, "Kept", evaluated.user_id);

        for session in [&doomed, &kept] {
            store
                .session_competency_add(&SessionCompetency::new(
                    session.session_id,
                    competency.competency_id,
                ))
                .unwrap();
            store
                .evaluator_add(&Evaluator::new(session.session_id, rater.user_id))
                .unwrap();
            store
                .assessment_insert(&Assessment::new(
                    session.session_id,
                    competency.competency_id,
                    rater.user_id,
                    5,
                ))
                .unwrap();
        }

        store.session_delete(doomed.session_id).unwrap();

        assert!(store.session_get(doomed.session_id).unwrap().is_none());
        assert!(store
            .session_competencies_for(doomed.session_id)
            .unwrap()
            .is_empty());
        assert!(store.evaluators_for(doomed.session_id).unwrap().is_empty());

        // The other session's rows are untouched.
        assert_eq!(
            store
                .session_competencies_for(kept.session_id)
                .unwrap()
                .len(),
            1
        );
        assert_eq!(store.evaluators_for(kept.session_id).unwrap().len(), 1);
        assert_eq!(
            store
                .assessment_list(AssessmentFilter::default().with_session(kept.session_id))
                .unwrap()
                .len(),
            1
        );
    }

    #[test]
    fn test_competency_delete_cascades() {
        let store = MemoryStore::new();
        let evaluated = seed_user(&store, "subject");
        let rater = seed_user(&store, "rater");
        let session = seed_session(&store, "Review", evaluated.user_id);
        let competency = seed_competency(&store, "Communication");

        store
            .session_competency_add(&SessionCompetency::new(
                session.session_id,
                competency.competency_id,
            ))
            .unwrap();
        store
            .assessment_insert(&Assessment::new(
                session.session_id,
                competency.competency_id,
                rater.user_id,
                6,
            ))
            .unwrap();

        store.competency_delete(competency.competency_id).unwrap();

        assert!(store
            .competency_get(competency.competency_id)
            .unwrap()
            .is_none());
        assert!(store
            .session_competencies_for(session.session_id)
            .unwrap()
            .is_empty());
        assert!(store
            .assessment_list(AssessmentFilter::default())
            .unwrap()
            .is_empty());
        // The session itself survives.
        assert!(store.session_get(session.session_id).unwrap().is_some());
    }

    // ========================================================================
    // Aggregation Tests
    // ========================================================================

    #[test]
    fn test_average_score_scenario() {
        // A scores Communication = 8, B scores Communication = 6,
        // A scores Delivery = 10 => average (8+6+10)/3 = 8.0.
        let store = MemoryStore::new();
        let subject = seed_user(&store, "subject");
        let a = seed_user(&store, "a");
        let b = seed_user(&store, "b");
        let session = seed_session(&store, "Q1 Review", subject.user_id);
        let communication = seed_competency(&store, "Communication");
        let delivery = seed_competency(&store, "Delivery");

        for competency in [&communication, &delivery] {
            store
                .session_competency_add(&SessionCompetency::new(
                    session.session_id,
                    competency.competency_id,
                ))
                .unwrap();
        }
        for rater in [&a, &b] {
            store
                .evaluator_add(&Evaluator::new(session.session_id, rater.user_id))
                .unwrap();
        }

        store
            .assessment_insert(&Assessment::new(
                session.session_id,
                communication.competency_id,
                a.user_id,
                8,
            ))
            .unwrap();
        store
            .assessment_insert(&Assessment::new(
                session.session_id,
                communication.competency_id,
                b.user_id,
                6,
            ))
            .unwrap();
        store
            .assessment_insert(&Assessment::new(
                session.session_id,
                delivery.competency_id,
                a.user_id,
                10,
            ))
            .unwrap();

        let averages = store.session_average_scores().unwrap();
        let entry = averages
            .iter()
            .find(|avg| avg.session_id == session.session_id)
            .unwrap();
        assert_eq!(entry.average_score, Some(8.0));
    }

    #[test]
    fn test_average_score_empty_is_none() {
        let store = MemoryStore::new();
        let subject = seed_user(&store, "subject");
        let session = seed_session(&store, "Empty", subject.user_id);

        let averages = store.session_average_scores().unwrap();
        let entry = averages
            .iter()
            .find(|avg| avg.session_id == session.session_id)
            .unwrap();
        assert_eq!(entry.average_score, None);
    }

    #[test]
    fn test_competency_contains_vs_icontains() {
        let store = MemoryStore::new();
        seed_competency(&store, "Team Leadership");
        seed_competency(&store, "Leading Change");
        seed_competency(&store, "leadership");

        let insensitive = store.competency_search_icontains("lead").unwrap();
        assert_eq!(insensitive.len(), 3);

        // Case-sensitive "Lead" excludes the lowercase spelling.
        let sensitive = store.competency_search_contains("Lead").unwrap();
        let names: Vec<&str> = sensitive.iter().map(|c| c.name.as_str()).collect();
        assert!(names.contains(&"Team Leadership"));
        assert!(names.contains(&"Leading Change"));
        assert!(!names.contains(&"leadership"));
    }

    #[test]
    fn test_competency_names_are_distinct() {
        let store = MemoryStore::new();
        seed_competency(&store, "Communication");
        seed_competency(&store, "Communication");
        seed_competency(&store, "Delivery");

        let names = store.competency_names().unwrap();
        assert_eq!(names.len(), 2);
        assert_eq!(store.competency_count().unwrap(), 3);
    }

    #[test]
    fn test_competency_session_counts_ranked() {
        let store = MemoryStore::new();
        let subject = seed_user(&store, "subject");
        let popular = seed_competency(&store, "Popular");
        let niche = seed_competency(&store, "Niche");

        let s1 = seed_session(&store, "One", subject.user_id);
        let s2 = seed_session(&store, "Two", subject.user_id);

        for session in [&s1, &s2] {
            store
                .session_competency_add(&SessionCompetency::new(
                    session.session_id,
                    popular.competency_id,
                ))
                .unwrap();
        }
        store
            .session_competency_add(&SessionCompetency::new(s1.session_id, niche.competency_id))
            .unwrap();

        let ranked = store.competency_session_counts().unwrap();
        assert_eq!(ranked[0].0.competency_id, popular.competency_id);
        assert_eq!(ranked[0].1, 2);
        assert_eq!(ranked[1].1, 1);
    }

    #[test]
    fn test_assessment_filters_compose_with_and() {
        let store = MemoryStore::new();
        let subject = seed_user(&store, "subject");
        let rater = seed_user(&store, "rater");
        let other = seed_user(&store, "other");
        let s1 = seed_session(&store, "One", subject.user_id);
        let s2 = seed_session(&store, "Two", subject.user_id);
        let competency = seed_competency(&store, "Communication");

        store
            .assessment_insert(&Assessment::new(
                s1.session_id,
                competency.competency_id,
                rater.user_id,
                7,
            ))
            .unwrap();
        store
            .assessment_insert(&Assessment::new(
                s1.session_id,
                competency.competency_id,
                other.user_id,
                4,
            ))
            .unwrap();
        store
            .assessment_insert(&Assessment::new(
                s2.session_id,
                competency.competency_id,
                rater.user_id,
                7,
            ))
            .unwrap();

        let by_score = store
            .assessment_list(AssessmentFilter::default().with_score(7))
            .unwrap();
        assert_eq!(by_score.len(), 2);

        let by_session = store
            .assessment_list(AssessmentFilter::default().with_session(s1.session_id))
            .unwrap();
        assert_eq!(by_session.len(), 2);

        let both = store
            .assessment_list(
                AssessmentFilter::default()
                    .with_score(7)
                    .with_session(s1.session_id),
            )
            .unwrap();
        assert_eq!(both.len(), 1);
        assert_eq!(both[0].evaluator, rater.user_id);
    }

    #[test]
    fn test_assessment_list_newest_first() {
        let store = MemoryStore::new();
        let subject = seed_user(&store, "subject");
        let rater = seed_user(&store, "rater");
        let session = seed_session(&store, "Review", subject.user_id);
        let c1 = seed_competency(&store, "One");
        let c2 = seed_competency(&store, "Two");

        let first = Assessment::new(session.session_id, c1.competency_id, rater.user_id, 5);
        let second = Assessment::new(session.session_id, c2.competency_id, rater.user_id, 6);
        store.assessment_insert(&first).unwrap();
        store.assessment_insert(&second).unwrap();

        let listed = store.assessment_list(AssessmentFilter::default()).unwrap();
        assert_eq!(listed[0].assessment_id, second.assessment_id);
        assert_eq!(listed[1].assessment_id, first.assessment_id);
    }

    // ========================================================================
    // Visit Log Tests
    // ========================================================================

    #[test]
    fn test_visit_list_reverse_chronological() {
        let store = MemoryStore::new();
        let user = seed_user(&store, "alice");

        store
            .visit_append(&VisitLog::new(user.user_id, "/", "GET"))
            .unwrap();
        store
            .visit_append(&VisitLog::new(user.user_id, "/sessions", "GET"))
            .unwrap();

        let visits = store.visit_list().unwrap();
        assert_eq!(visits.len(), 2);
        assert_eq!(visits[0].path, "/sessions");
        assert_eq!(visits[1].path, "/");
    }

    // ========================================================================
    // History Tests
    // ========================================================================

    #[test]
    fn test_history_records_create_update_delete() {
        let store = MemoryStore::new();
        let competency = seed_competency(&store, "Communication");

        store
            .competency_update(
                competency.competency_id,
                CompetencyUpdate {
                    description: Some("Listens well".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();
        store.competency_delete(competency.competency_id).unwrap();

        let trail = store
            .history_for(EntityType::Competency, competency.competency_id)
            .unwrap();
        assert_eq!(trail.len(), 3);
        assert_eq!(trail[0].change, ChangeKind::Create);
        assert_eq!(trail[1].change, ChangeKind::Update);
        assert_eq!(trail[2].change, ChangeKind::Delete);

        // The update snapshot captured the state at that point.
        assert_eq!(
            trail[1].snapshot.get("description").and_then(|v| v.as_str()),
            Some("Listens well")
        );
        // The trail outlives the live row.
        assert!(store
            .competency_get(competency.competency_id)
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_untracked_entities_leave_no_history() {
        let store = MemoryStore::new();
        let user = seed_user(&store, "alice");
        store
            .profile_insert(&Profile::new(user.user_id, StaffRole::Employee))
            .unwrap();
        store
            .project_insert(&Project::new(
                "Apollo",
                chrono::NaiveDate::from_ymd_opt(2025, 1, 15).unwrap(),
            ))
            .unwrap();

        assert_eq!(store.history_len().unwrap(), 0);
    }
}

// ============================================================================
// PROPERTY-BASED TESTS
// ============================================================================
