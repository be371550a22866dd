use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::analysis::OutcomeError;
use crate::models::{TradeAnalysis, TradeOutcome, TradeSetup};

/// Entries kept per session; older ones fall off the front.
pub const MAX_ENTRIES_PER_SESSION: usize = 20;
/// Tracked outcomes kept per session, oldest dropped first.
pub const MAX_OUTCOMES_PER_SESSION: usize = 100;

#[derive(Debug, Clone, Serialize)]
pub struct SessionEntry {
    pub recorded_at: DateTime<Utc>,
    pub setup: TradeSetup,
    pub analysis: TradeAnalysis,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionHistory {
    pub session_id: Uuid,
    pub last_activity: DateTime<Utc>,
    pub entries: Vec<SessionEntry>,
}

struct Session {
    last_activity: DateTime<Utc>,
    entries: VecDeque<SessionEntry>,
    outcomes: VecDeque<TradeOutcome>,
}

impl Session {
    fn open(id: Uuid, now: DateTime<Utc>) -> Self {
        tracing::debug!(session_id = %id, "Session store: opened session");
        Self {
            last_activity: now,
            entries: VecDeque::new(),
            outcomes: VecDeque::new(),
        }
    }
}

/// Per-session analysis history and trade outcomes with idle eviction.
///
/// Sessions idle for longer than the TTL are dropped by `sweep`, which
/// `spawn_sweeper` runs on a timer. Their outcomes go with them.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<Mutex<HashMap<Uuid, Session>>>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: Arc::new(Mutex::new(HashMap::new())),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Append an analysis to `session_id`, opening a new session when none is
    /// given or the id is unknown. Returns the session id used.
    pub async fn record(
        &self,
        session_id: Option<Uuid>,
        setup: TradeSetup,
        analysis: TradeAnalysis,
    ) -> Uuid {
        self.record_at(session_id, setup, analysis, Utc::now()).await
    }

    pub async fn record_at(
        &self,
        session_id: Option<Uuid>,
        setup: TradeSetup,
        analysis: TradeAnalysis,
        now: DateTime<Utc>,
    ) -> Uuid {
        let id = session_id.unwrap_or_else(Uuid::new_v4);
        let mut sessions = self.inner.lock().await;

        let session = sessions.entry(id).or_insert_with(|| Session::open(id, now));

        session.last_activity = now;
        session.entries.push_back(SessionEntry {
            recorded_at: now,
            setup,
            analysis,
        });
        while session.entries.len() > MAX_ENTRIES_PER_SESSION {
            session.entries.pop_front();
        }

        id
    }

    /// Oldest-first history for a session, if it is still alive.
    pub async fn history(&self, session_id: &Uuid) -> Option<SessionHistory> {
        let sessions = self.inner.lock().await;
        sessions.get(session_id).map(|s| SessionHistory {
            session_id: *session_id,
            last_activity: s.last_activity,
            entries: s.entries.iter().cloned().collect(),
        })
    }

    /// Open a `Planned` outcome for an analysis just recorded in `session_id`.
    pub async fn track_outcome(
        &self,
        session_id: Uuid,
        setup: TradeSetup,
        analysis: &TradeAnalysis,
        now: DateTime<Utc>,
    ) -> TradeOutcome {
        let outcome = TradeOutcome::planned(session_id, setup, analysis, now);
        let mut sessions = self.inner.lock().await;
        let session = sessions
            .entry(session_id)
            .or_insert_with(|| Session::open(session_id, now));

        session.last_activity = now;
        session.outcomes.push_back(outcome.clone());
        while session.outcomes.len() > MAX_OUTCOMES_PER_SESSION {
            session.outcomes.pop_front();
        }
        outcome
    }

    pub async fn outcome(&self, outcome_id: &Uuid) -> Option<TradeOutcome> {
        let sessions = self.inner.lock().await;
        sessions
            .values()
            .flat_map(|s| s.outcomes.iter())
            .find(|o| o.id == *outcome_id)
            .cloned()
    }

    /// Apply `update` to an outcome in place. `None` when the outcome is
    /// unknown; a rejected update leaves it unchanged.
    pub async fn update_outcome<F>(
        &self,
        outcome_id: &Uuid,
        now: DateTime<Utc>,
        update: F,
    ) -> Option<Result<TradeOutcome, OutcomeError>>
    where
        F: FnOnce(&mut TradeOutcome) -> Result<(), OutcomeError>,
    {
        let mut sessions = self.inner.lock().await;
        let session = sessions
            .values_mut()
            .find(|s| s.outcomes.iter().any(|o| o.id == *outcome_id))?;
        let outcome = session.outcomes.iter_mut().find(|o| o.id == *outcome_id)?;

        let mut next = outcome.clone();
        let result = update(&mut next).map(|()| {
            *outcome = next.clone();
            next
        });
        if result.is_ok() {
            session.last_activity = now;
        }
        Some(result)
    }

    /// Newest-first outcomes for a live session.
    pub async fn session_outcomes(&self, session_id: &Uuid) -> Option<Vec<TradeOutcome>> {
        let sessions = self.inner.lock().await;
        sessions
            .get(session_id)
            .map(|s| newest_first(s.outcomes.iter().cloned().collect()))
    }

    /// Newest-first outcomes across every live session.
    pub async fn all_outcomes(&self) -> Vec<TradeOutcome> {
        let sessions = self.inner.lock().await;
        newest_first(
            sessions
                .values()
                .flat_map(|s| s.outcomes.iter().cloned())
                .collect(),
        )
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.lock().await.is_empty()
    }

    /// Drop sessions idle for longer than the TTL. Returns how many were removed.
    pub async fn sweep(&self, now: DateTime<Utc>) -> usize {
        let mut sessions = self.inner.lock().await;
        let before = sessions.len();
        let cutoff = now - self.ttl;
        sessions.retain(|_, s| s.last_activity >= cutoff);
        let removed = before - sessions.len();

        if removed > 0 {
            tracing::info!(
                removed,
                remaining = sessions.len(),
                "Session store: swept idle sessions"
            );
        }
        removed
    }
}

fn newest_first(mut outcomes: Vec<TradeOutcome>) -> Vec<TradeOutcome> {
    outcomes.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    outcomes
}

/// Run `sweep` every `interval_secs` until the task is aborted.
pub fn spawn_sweeper(store: SessionStore, interval_secs: u64) -> JoinHandle<()> {
    tokio::spawn(async move {
        let period = std::time::Duration::from_secs(interval_secs.max(1));
        let mut ticker = tokio::time::interval(period);
        loop {
            ticker.tick().await;
            store.sweep(Utc::now()).await;
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Recommendation, RiskMetrics};
    use rust_decimal::Decimal;

    fn setup() -> TradeSetup {
        TradeSetup {
            trading_pair: "ETH/USDT".into(),
            entry_price: Decimal::from(100),
            entry_reasoning: String::new(),
            take_profit_price: Decimal::from(110),
            take_profit_reasoning: String::new(),
            stop_loss_price: Decimal::from(95),
            stop_loss_reasoning: String::new(),
            position_size: Decimal::from(1_000),
            time_frame: "swing".into(),
            leverage: Decimal::ONE,
        }
    }

    fn analysis(confidence: u8) -> TradeAnalysis {
        TradeAnalysis {
            trading_pair: "ETH/USDT".into(),
            risk_metrics: RiskMetrics {
                risk_reward_ratio: Decimal::from(2),
                potential_profit: Decimal::from(10),
                potential_loss: Decimal::from(5),
                profit_percentage: Decimal::from(10),
                loss_percentage: Decimal::from(5),
                is_valid_setup: true,
                warnings: vec![],
            },
            recommendation: Recommendation::Buy,
            confidence,
            analysis: String::new(),
            key_points: vec![],
            onchain_summary: None,
        }
    }

    #[tokio::test]
    async fn test_record_opens_and_reuses_session() {
        let store = SessionStore::new(Duration::hours(24));
        let id = store.record(None, setup(), analysis(70)).await;
        let same = store.record(Some(id), setup(), analysis(75)).await;
        assert_eq!(id, same);

        let history = store.history(&id).await.unwrap();
        assert_eq!(history.entries.len(), 2);
        assert_eq!(history.entries[1].analysis.confidence, 75);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_history_keeps_last_twenty() {
        let store = SessionStore::new(Duration::hours(24));
        let id = Uuid::new_v4();
        for i in 0..25u8 {
            store.record(Some(id), setup(), analysis(i)).await;
        }
        let history = store.history(&id).await.unwrap();
        assert_eq!(history.entries.len(), MAX_ENTRIES_PER_SESSION);
        assert_eq!(history.entries[0].analysis.confidence, 5);
        assert_eq!(history.entries[19].analysis.confidence, 24);
    }

    #[tokio::test]
    async fn test_sweep_drops_idle_sessions() {
        let store = SessionStore::new(Duration::hours(24));
        let t0 = Utc::now();
        let stale = store
            .record_at(None, setup(), analysis(60), t0 - Duration::hours(30))
            .await;
        let fresh = store.record_at(None, setup(), analysis(60), t0).await;

        assert_eq!(store.sweep(t0).await, 1);
        assert!(store.history(&stale).await.is_none());
        assert!(store.history(&fresh).await.is_some());
        assert_eq!(store.sweep(t0).await, 0);
    }

    #[tokio::test]
    async fn test_activity_refreshes_ttl() {
        let store = SessionStore::new(Duration::hours(24));
        let t0 = Utc::now();
        let id = store
            .record_at(None, setup(), analysis(60), t0 - Duration::hours(30))
            .await;
        store
            .record_at(Some(id), setup(), analysis(61), t0 - Duration::hours(1))
            .await;

        assert_eq!(store.sweep(t0).await, 0);
        assert_eq!(store.history(&id).await.unwrap().entries.len(), 2);
    }

    #[tokio::test]
    async fn test_outcomes_follow_their_session() {
        let store = SessionStore::new(Duration::hours(24));
        let t0 = Utc::now();
        let id = store.record_at(None, setup(), analysis(70), t0).await;
        let planned = store.track_outcome(id, setup(), &analysis(70), t0).await;
        assert_eq!(planned.session_id, id);
        assert_eq!(planned.confidence, 70);

        let other = store.record_at(None, setup(), analysis(60), t0).await;
        store
            .track_outcome(other, setup(), &analysis(60), t0 + Duration::seconds(1))
            .await;

        assert_eq!(store.session_outcomes(&id).await.unwrap().len(), 1);
        let all = store.all_outcomes().await;
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].session_id, other);
        assert!(store.session_outcomes(&Uuid::new_v4()).await.is_none());

        assert_eq!(store.sweep(t0 + Duration::hours(25)).await, 2);
        assert!(store.outcome(&planned.id).await.is_none());
    }

    #[tokio::test]
    async fn test_rejected_update_leaves_outcome_unchanged() {
        use crate::analysis::performance::{record_entry, record_exit};
        use crate::models::{ExitReason, OutcomeStatus};

        let store = SessionStore::new(Duration::hours(24));
        let t0 = Utc::now();
        let id = store.record_at(None, setup(), analysis(70), t0).await;
        let planned = store.track_outcome(id, setup(), &analysis(70), t0).await;

        let rejected = store
            .update_outcome(&planned.id, t0, |o| {
                record_exit(o, Decimal::from(110), ExitReason::Manual, String::new(), t0)
            })
            .await
            .unwrap();
        assert!(rejected.is_err());
        assert_eq!(
            store.outcome(&planned.id).await.unwrap().status,
            OutcomeStatus::Planned
        );

        let entered = store
            .update_outcome(&planned.id, t0, |o| {
                record_entry(o, Decimal::from(100), String::new(), t0)
            })
            .await
            .unwrap()
            .unwrap();
        assert_eq!(entered.status, OutcomeStatus::Entered);
        assert!(store
            .update_outcome(&Uuid::new_v4(), t0, |_| Ok(()))
            .await
            .is_none());
    }
}
