// one lock per match, held across fetch, apply and write

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use dashmap::DashMap;
use parking_lot::Mutex;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;
use serde::Serialize;
use tokio::sync::Mutex as MatchLock;
use tracing::{info, warn};
use crate::{Character, CoupError, EngineConfig, Intent, Match, MatchId, MatchStore};

/// Confirmation returned by `end_match`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Deletion {
    pub id: MatchId,
    pub num_deleted: usize,
}

pub struct MatchManager<S> {
    store: S,
    config: EngineConfig,
    locks: DashMap<MatchId, Arc<MatchLock<()>>>,
    rng: Mutex<Pcg64>,
}

impl<S: MatchStore> MatchManager<S> {
    pub fn new(store: S, config: EngineConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => Pcg64::seed_from_u64(seed),
            None => Pcg64::from_entropy(),
        };

        MatchManager {
            store,
            config,
            locks: DashMap::new(),
            rng: Mutex::new(rng),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub async fn create_match(&self, player_count: Option<usize>) -> Result<Match, CoupError> {
        let player_count = player_count.unwrap_or(self.config.default_player_count);

        let record = {
            let mut rng = self.rng.lock();
            let id = format!("{:016x}", rng.gen::<u64>());
            Match::new(id, player_count, now_millis(), &mut *rng)?
        };

        self.store.insert(&record).await?;
        info!(match_id = %record.id, player_count, "match created");
        Ok(record)
    }

    pub async fn list_matches(&self) -> Result<Vec<MatchId>, CoupError> {
        Ok(self.store.list_ids().await?)
    }

    pub async fn get_status(&self, match_id: &str) -> Result<Match, CoupError> {
        self.store
            .get(match_id)
            .await?
            .ok_or_else(|| CoupError::NotFound(match_id.to_string()))
    }

    pub async fn submit_action(&self, match_id: &str, action_name: &str, player: usize, target: Option<usize>) -> Result<Match, CoupError> {
        let action = action_name.parse()?;
        self.apply(match_id, Intent::Act { player, action, target }).await
    }

    pub async fn submit_challenge(&self, match_id: &str, challenger: Option<usize>) -> Result<Match, CoupError> {
        self.apply(match_id, Intent::Challenge { challenger }).await
    }

    pub async fn submit_counteract(&self, match_id: &str, challenger: Option<usize>, blocking_role: Option<&str>) -> Result<Match, CoupError> {
        let blocking_role = blocking_role.map(str::parse::<Character>).transpose()?;
        self.apply(match_id, Intent::Counteract { challenger, blocking_role }).await
    }

    pub async fn submit_lose_influence(&self, match_id: &str, player: usize, role: &str) -> Result<Match, CoupError> {
        let role = role.parse()?;
        self.apply(match_id, Intent::LoseInfluence { player, role }).await
    }

    pub async fn end_match(&self, match_id: &str) -> Result<Deletion, CoupError> {
        let lock = self.lock_for(match_id);
        let _guard = lock.lock().await;

        let num_deleted = self.store.delete(match_id).await?;
        self.locks.remove(match_id);
        if num_deleted == 0 {
            return Err(CoupError::NotFound(match_id.to_string()));
        }

        info!(match_id, "match ended");
        Ok(Deletion { id: match_id.to_string(), num_deleted })
    }

    /// Runs one intent against the latest stored record and writes the result back.
    pub async fn apply(&self, match_id: &str, intent: Intent) -> Result<Match, CoupError> {
        let lock = self.lock_for(match_id);
        let _guard = lock.lock().await;

        let Some(mut record) = self.store.get(match_id).await? else {
            self.locks.remove(match_id);
            return Err(CoupError::NotFound(match_id.to_string()));
        };

        let applied = {
            let mut rng = self.rng.lock();
            record.apply(intent.clone(), &mut *rng)
        };
        if let Err(err) = applied {
            warn!(match_id, ?intent, error = %err, "intent rejected");
            return Err(err);
        }

        self.store.put(&record).await?;
        Ok(record)
    }

    fn lock_for(&self, match_id: &str) -> Arc<MatchLock<()>> {
        self.locks
            .entry(match_id.to_string())
            .or_insert_with(|| Arc::new(MatchLock::new(())))
            .clone()
    }
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as u64)
        .unwrap_or_default()
}
