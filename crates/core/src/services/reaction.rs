//! Reactions on artworks.
//!
//! Each user holds at most one reaction per artwork. [`ReactionTransition`]
//! decides what a request does to the stored state; [`ReactionEngine`]
//! carries it out inside one transaction, with the artwork row locked, so
//! that the reaction counters always equal the number of reaction rows of
//! each type.

use std::sync::Arc;

use crate::services::counter::{CounterSync, db_err};
use crate::services::visibility;
use serde::Serialize;
use tokapu_common::{AppError, AppResult};
use tokapu_db::{
    entities::{artwork::EngagementCounter, artwork_reaction::ReactionType},
    repositories::{ArtworkRepository, ReactionRepository, RelationshipStore},
};
use sea_orm::{DatabaseConnection, TransactionTrait};

/// What a reaction request does to a user's reaction on one artwork.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReactionTransition {
    /// No reaction yet; create one.
    Create(ReactionType),
    /// Same type again; nothing changes.
    Unchanged(ReactionType),
    /// Replace one type with another.
    Switch { from: ReactionType, to: ReactionType },
    /// Delete the existing reaction.
    Remove(ReactionType),
}

impl ReactionTransition {
    /// Plan a `react` request.
    #[must_use]
    pub fn react(current: Option<ReactionType>, requested: ReactionType) -> Self {
        match current {
            None => Self::Create(requested),
            Some(old) if old == requested => Self::Unchanged(old),
            Some(old) => Self::Switch {
                from: old,
                to: requested,
            },
        }
    }

    /// Plan a `remove` request. There must be a reaction to remove.
    pub fn remove(current: Option<ReactionType>) -> AppResult<Self> {
        current
            .map(Self::Remove)
            .ok_or_else(|| AppError::NotFound("Reaction not found".to_string()))
    }

    /// The reaction held once the transition is applied.
    #[must_use]
    pub const fn final_type(self) -> Option<ReactionType> {
        match self {
            Self::Create(t) | Self::Unchanged(t) | Self::Switch { to: t, .. } => Some(t),
            Self::Remove(_) => None,
        }
    }

    /// Counter decrement to apply before the relation row changes.
    #[must_use]
    pub fn decrement(self) -> Option<EngagementCounter> {
        match self {
            Self::Switch { from: t, .. } | Self::Remove(t) => Some(t.counter()),
            Self::Create(_) | Self::Unchanged(_) => None,
        }
    }

    /// Counter increment to apply after the relation row changes.
    #[must_use]
    pub fn increment(self) -> Option<EngagementCounter> {
        match self {
            Self::Create(t) | Self::Switch { to: t, .. } => Some(t.counter()),
            Self::Unchanged(_) | Self::Remove(_) => None,
        }
    }
}

/// Outcome of [`ReactionEngine::react`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReactionOutcome {
    /// The reaction the user now holds.
    pub final_type: ReactionType,
    /// What was done to get there.
    pub transition: ReactionTransition,
}

/// Reaction state machine over the store.
#[derive(Clone)]
pub struct ReactionEngine {
    db: Arc<DatabaseConnection>,
    reaction_repo: ReactionRepository,
    artwork_repo: ArtworkRepository,
    counters: CounterSync,
}

impl ReactionEngine {
    /// Create a new reaction engine.
    #[must_use]
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self {
            reaction_repo: ReactionRepository::new(db.clone()),
            artwork_repo: ArtworkRepository::new(db.clone()),
            counters: CounterSync::new(db.clone()),
            db,
        }
    }

    /// React to an artwork with `reaction_type` (case-insensitive).
    ///
    /// Reacting again with the same type is a no-op; a different type
    /// replaces the old one.
    pub async fn react(
        &self,
        user_id: &str,
        artwork_id: &str,
        reaction_type: &str,
    ) -> AppResult<ReactionOutcome> {
        let requested: ReactionType = reaction_type.parse()?;

        let txn = self.db.begin().await.map_err(db_err)?;

        let artwork = self.artwork_repo.find_for_update(&txn, artwork_id).await?;
        visibility::ensure_visible(artwork, Some(user_id))?;

        let existing = self.reaction_repo.find(&txn, user_id, artwork_id).await?;
        let transition =
            ReactionTransition::react(existing.as_ref().map(|r| r.reaction_type), requested);

        if let Some(counter) = transition.decrement() {
            self.counters.adjust(&txn, artwork_id, counter, -1).await?;
        }
        match (transition, existing) {
            (ReactionTransition::Create(t), _) => {
                self.reaction_repo
                    .create(&txn, user_id, artwork_id, t)
                    .await?;
            }
            (ReactionTransition::Switch { to, .. }, Some(reaction)) => {
                self.reaction_repo.update_type(&txn, reaction, to).await?;
            }
            _ => {}
        }
        if let Some(counter) = transition.increment() {
            self.counters.adjust(&txn, artwork_id, counter, 1).await?;
        }

        txn.commit().await.map_err(db_err)?;

        tracing::debug!(
            user_id = %user_id,
            artwork_id = %artwork_id,
            reaction = %requested,
            transition = ?transition,
            "Reaction applied"
        );
        Ok(ReactionOutcome {
            final_type: requested,
            transition,
        })
    }

    /// Remove the user's reaction. Fails with `NotFound` if there is none.
    pub async fn remove(&self, user_id: &str, artwork_id: &str) -> AppResult<()> {
        let txn = self.db.begin().await.map_err(db_err)?;

        self.artwork_repo.find_for_update(&txn, artwork_id).await?;

        let existing = self.reaction_repo.find(&txn, user_id, artwork_id).await?;
        let transition = ReactionTransition::remove(existing.map(|r| r.reaction_type))?;

        if let Some(counter) = transition.decrement() {
            self.counters.adjust(&txn, artwork_id, counter, -1).await?;
        }
        self.reaction_repo
            .delete(&txn, user_id, artwork_id)
            .await?;

        txn.commit().await.map_err(db_err)?;

        tracing::debug!(user_id = %user_id, artwork_id = %artwork_id, "Reaction removed");
        Ok(())
    }

    /// The user's current reaction on an artwork, if any.
    pub async fn current(&self, user_id: &str, artwork_id: &str) -> AppResult<Option<ReactionType>> {
        self.reaction_repo.current_type(user_id, artwork_id).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::services::counter::tests::{create_test_artwork, exec};
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::collections::HashMap;
    use tokapu_db::entities::{artwork, artwork_reaction};

    /// Reaction rows and counters held in memory, driven by the planner.
    #[derive(Default)]
    struct Tally {
        reactions: HashMap<(&'static str, &'static str), ReactionType>,
        counters: HashMap<EngagementCounter, i32>,
    }

    impl Tally {
        fn bump(&mut self, counter: EngagementCounter, delta: i32) {
            let value = self.counters.entry(counter).or_insert(0);
            *value = (*value + delta).max(0);
        }

        fn apply(&mut self, key: (&'static str, &'static str), t: ReactionTransition) {
            if let Some(c) = t.decrement() {
                self.bump(c, -1);
            }
            match t.final_type() {
                Some(rt) => self.reactions.insert(key, rt),
                None => self.reactions.remove(&key),
            };
            if let Some(c) = t.increment() {
                self.bump(c, 1);
            }
        }

        fn react(&mut self, user: &'static str, art: &'static str, t: ReactionType) {
            let plan = ReactionTransition::react(self.current(user, art), t);
            self.apply((user, art), plan);
        }

        fn remove(&mut self, user: &'static str, art: &'static str) -> AppResult<()> {
            let plan = ReactionTransition::remove(self.current(user, art))?;
            self.apply((user, art), plan);
            Ok(())
        }

        fn current(&self, user: &'static str, art: &'static str) -> Option<ReactionType> {
            self.reactions.get(&(user, art)).copied()
        }

        fn get(&self, t: ReactionType) -> i32 {
            self.counters.get(&t.counter()).copied().unwrap_or(0)
        }

        fn rows_of(&self, t: ReactionType) -> i32 {
            self.reactions.values().filter(|x| **x == t).count() as i32
        }
    }

    #[test]
    fn test_react_increments_exactly_once() {
        for t in ReactionType::ALL {
            let mut tally = Tally::default();
            tally.react("u1", "a1", t);
            assert_eq!(tally.current("u1", "a1"), Some(t));
            assert_eq!(tally.get(t), 1);
        }
    }

    #[test]
    fn test_switch_moves_the_count() {
        for x in ReactionType::ALL {
            for y in ReactionType::ALL.into_iter().filter(|y| *y != x) {
                let mut tally = Tally::default();
                tally.react("u1", "a1", x);
                tally.react("u1", "a1", y);
                assert_eq!(tally.get(x), 0);
                assert_eq!(tally.get(y), 1);
                assert!(tally.counters.values().all(|v| *v >= 0));
            }
        }
    }

    #[test]
    fn test_react_is_idempotent() {
        let mut once = Tally::default();
        once.react("u1", "a1", ReactionType::Wow);

        let mut twice = Tally::default();
        twice.react("u1", "a1", ReactionType::Wow);
        twice.react("u1", "a1", ReactionType::Wow);

        assert_eq!(once.counters, twice.counters);
        assert_eq!(
            ReactionTransition::react(Some(ReactionType::Wow), ReactionType::Wow),
            ReactionTransition::Unchanged(ReactionType::Wow)
        );
    }

    #[test]
    fn test_remove_restores_counter() {
        let mut tally = Tally::default();
        tally.react("u1", "a1", ReactionType::Clap);
        tally.remove("u1", "a1").unwrap();
        assert_eq!(tally.get(ReactionType::Clap), 0);
        assert_eq!(tally.current("u1", "a1"), None);
    }

    #[test]
    fn test_remove_without_reaction_is_not_found() {
        let mut tally = Tally::default();
        assert!(matches!(tally.remove("u1", "a1"), Err(AppError::NotFound(_))));
    }

    #[test]
    fn test_mixed_scenario() {
        let mut tally = Tally::default();

        tally.react("u1", "a1", ReactionType::Like);
        assert_eq!(tally.get(ReactionType::Like), 1);

        tally.react("u1", "a1", ReactionType::Love);
        assert_eq!(tally.get(ReactionType::Like), 0);
        assert_eq!(tally.get(ReactionType::Love), 1);

        tally.react("u2", "a1", ReactionType::Like);
        assert_eq!(tally.get(ReactionType::Like), 1);

        tally.remove("u1", "a1").unwrap();

        assert_eq!(tally.get(ReactionType::Like), 1);
        assert_eq!(tally.get(ReactionType::Love), 0);
        assert_eq!(tally.get(ReactionType::Wow), 0);
        assert_eq!(tally.get(ReactionType::Clap), 0);
        for t in ReactionType::ALL {
            assert_eq!(tally.get(t), tally.rows_of(t));
        }
    }

    fn create_test_reaction(t: ReactionType) -> artwork_reaction::Model {
        artwork_reaction::Model {
            id: "r1".to_string(),
            user_id: "u1".to_string(),
            artwork_id: "art1".to_string(),
            reaction_type: t,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn test_react_rejects_unknown_type_before_touching_store() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let engine = ReactionEngine::new(db);

        match engine.react("u1", "art1", "meh").await {
            Err(AppError::Validation(msg)) => assert!(msg.contains("meh")),
            other => panic!("Expected Validation error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_react_creates_and_counts() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_artwork("art1", "owner")]])
                .append_query_results([Vec::<artwork_reaction::Model>::new()])
                .append_query_results([[create_test_reaction(ReactionType::Like)]])
                .append_exec_results([exec(1)])
                .into_connection(),
        );
        let engine = ReactionEngine::new(db.clone());

        let outcome = engine.react("u1", "art1", "like").await.unwrap();

        assert_eq!(outcome.final_type, ReactionType::Like);
        assert_eq!(outcome.transition, ReactionTransition::Create(ReactionType::Like));

        drop(engine);
        let log = format!("{:?}", Arc::try_unwrap(db).unwrap().into_transaction_log());
        assert!(log.contains("FOR UPDATE"));
        assert!(log.contains("COALESCE(likes_count, 0) + (1)"));
    }

    #[tokio::test]
    async fn test_react_switch_updates_both_counters() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_artwork("art1", "owner")]])
                .append_query_results([[create_test_reaction(ReactionType::Like)]])
                .append_query_results([[create_test_reaction(ReactionType::Love)]])
                .append_exec_results([exec(1), exec(1)])
                .into_connection(),
        );
        let engine = ReactionEngine::new(db.clone());

        let outcome = engine.react("u1", "art1", "LOVE").await.unwrap();
        assert_eq!(
            outcome.transition,
            ReactionTransition::Switch {
                from: ReactionType::Like,
                to: ReactionType::Love
            }
        );

        drop(engine);
        let log = format!("{:?}", Arc::try_unwrap(db).unwrap().into_transaction_log());
        let likes = log.find("COALESCE(likes_count, 0) + (-1)").unwrap();
        let loves = log.find("COALESCE(loves_count, 0) + (1)").unwrap();
        assert!(likes < loves);
    }

    #[tokio::test]
    async fn test_react_same_type_changes_nothing() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_artwork("art1", "owner")]])
                .append_query_results([[create_test_reaction(ReactionType::Wow)]])
                .into_connection(),
        );
        let engine = ReactionEngine::new(db);

        let outcome = engine.react("u1", "art1", "wow").await.unwrap();
        assert_eq!(outcome.transition, ReactionTransition::Unchanged(ReactionType::Wow));
    }

    #[tokio::test]
    async fn test_react_hidden_artwork_is_not_found() {
        let mut pending = create_test_artwork("art1", "owner");
        pending.status = artwork::ArtworkStatus::Pending;

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[pending]])
                .into_connection(),
        );
        let engine = ReactionEngine::new(db);

        let result = engine.react("u1", "art1", "clap").await;
        assert!(matches!(result, Err(AppError::ArtworkNotFound(_))));
    }

    #[tokio::test]
    async fn test_remove_without_reaction() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_artwork("art1", "owner")]])
                .append_query_results([Vec::<artwork_reaction::Model>::new()])
                .into_connection(),
        );
        let engine = ReactionEngine::new(db);

        let result = engine.remove("u1", "art1").await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_remove_decrements_then_deletes() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_artwork("art1", "owner")]])
                .append_query_results([[create_test_reaction(ReactionType::Clap)]])
                .append_exec_results([exec(1), exec(1)])
                .into_connection(),
        );
        let engine = ReactionEngine::new(db.clone());

        engine.remove("u1", "art1").await.unwrap();

        drop(engine);
        let log = format!("{:?}", Arc::try_unwrap(db).unwrap().into_transaction_log());
        assert!(log.contains("COALESCE(claps_count, 0) + (-1)"));
        assert!(log.contains("DELETE FROM"));
    }

    #[tokio::test]
    async fn test_current() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_reaction(ReactionType::Love)]])
                .into_connection(),
        );
        let engine = ReactionEngine::new(db);

        assert_eq!(
            engine.current("u1", "art1").await.unwrap(),
            Some(ReactionType::Love)
        );
    }
}
