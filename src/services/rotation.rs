use std::collections::HashMap;
use std::sync::Arc;

use rand::seq::SliceRandom;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::models::mood::MoodKind;

/// Per-user, per-mood "seen tips" lists, held in process memory for the
/// lifetime of the user's session and passed around explicitly via
/// `AppState`. Two concurrent rotations for the same user may double-select;
/// that inconsistency is accepted.
#[derive(Clone, Default)]
pub struct TipSessions {
    entries: Arc<Mutex<HashMap<Uuid, HashMap<MoodKind, Vec<i64>>>>>,
}

impl TipSessions {
    pub fn new() -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Pick a tip id for this user and mood, excluding ids already shown in
    /// this session. When the whole catalog has been shown, the seen list is
    /// cleared and reselection happens from the full set, so afterwards it
    /// contains exactly the new pick. Returns None only when `candidates` is
    /// empty.
    pub async fn rotate(&self, user_id: Uuid, mood: MoodKind, candidates: &[i64]) -> Option<i64> {
        if candidates.is_empty() {
            return None;
        }

        let mut entries = self.entries.lock().await;
        let seen = entries
            .entry(user_id)
            .or_default()
            .entry(mood)
            .or_default();

        let unseen: Vec<i64> = candidates
            .iter()
            .copied()
            .filter(|id| !seen.contains(id))
            .collect();

        let pool = if unseen.is_empty() {
            seen.clear();
            candidates
        } else {
            unseen.as_slice()
        };

        let chosen = *pool.choose(&mut rand::thread_rng())?;
        seen.push(chosen);
        Some(chosen)
    }

    /// Drop all session state for a user (called on logout).
    pub async fn forget(&self, user_id: Uuid) {
        self.entries.lock().await.remove(&user_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn seen_list(sessions: &TipSessions, user: Uuid, mood: MoodKind) -> Vec<i64> {
        sessions
            .entries
            .lock()
            .await
            .get(&user)
            .and_then(|moods| moods.get(&mood))
            .cloned()
            .unwrap_or_default()
    }

    #[tokio::test]
    async fn test_empty_catalog_yields_none() {
        let sessions = TipSessions::new();
        let user = Uuid::new_v4();
        assert_eq!(sessions.rotate(user, MoodKind::Triste, &[]).await, None);
    }

    #[tokio::test]
    async fn test_single_unseen_tip_is_selected_and_recorded() {
        let sessions = TipSessions::new();
        let user = Uuid::new_v4();

        let chosen = sessions.rotate(user, MoodKind::Triste, &[10]).await;
        assert_eq!(chosen, Some(10));
        assert_eq!(seen_list(&sessions, user, MoodKind::Triste).await, vec![10]);
    }

    #[tokio::test]
    async fn test_seen_tips_are_excluded() {
        let sessions = TipSessions::new();
        let user = Uuid::new_v4();
        let catalog = [1, 2, 3];

        let mut picked = Vec::new();
        for _ in 0..3 {
            picked.push(sessions.rotate(user, MoodKind::Ansioso, &catalog).await.unwrap());
        }
        picked.sort_unstable();
        assert_eq!(picked, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_exhausted_catalog_resets_to_exactly_the_new_pick() {
        let sessions = TipSessions::new();
        let user = Uuid::new_v4();
        let catalog = [1, 2, 3];

        for _ in 0..3 {
            sessions.rotate(user, MoodKind::Calmo, &catalog).await.unwrap();
        }

        let next = sessions.rotate(user, MoodKind::Calmo, &catalog).await.unwrap();
        assert!(catalog.contains(&next));
        assert_eq!(seen_list(&sessions, user, MoodKind::Calmo).await, vec![next]);
    }

    #[tokio::test]
    async fn test_moods_have_independent_seen_lists() {
        let sessions = TipSessions::new();
        let user = Uuid::new_v4();

        sessions.rotate(user, MoodKind::Triste, &[5]).await.unwrap();
        assert!(seen_list(&sessions, user, MoodKind::Feliz).await.is_empty());
    }

    #[tokio::test]
    async fn test_forget_clears_all_state_for_user() {
        let sessions = TipSessions::new();
        let user = Uuid::new_v4();

        sessions.rotate(user, MoodKind::Triste, &[5]).await.unwrap();
        sessions.forget(user).await;
        assert!(seen_list(&sessions, user, MoodKind::Triste).await.is_empty());
    }
}
