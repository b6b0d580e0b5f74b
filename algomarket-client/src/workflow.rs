//! Moderation workflow manager.
//!
//! Owns the moderation queue of one view, loads it through a
//! [`ModerationApi`], and applies verdicts. Backend failures are classified
//! into [`ModerationError`] here and recorded for display; the queue is
//! only ever replaced by a successful load or shortened by a successful
//! decision.

use tokio::sync::Mutex;

use algomarket_core::{AlgorithmId, Decision, DecisionRequest, ModeratedAlgorithm, Verdict};

use crate::api::{ModerationApi, Scope};
use crate::error::{ModerationError, Operation};

/// Progress of the most recent load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum LoadState {
    #[default]
    Idle,
    Loading,
    Error,
}

/// Result of a [`ModerationWorkflow::load`] call that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The response replaced the queue.
    Applied { count: usize },
    /// A later load was started before this one completed; its response was dropped.
    Superseded,
}

/// Point-in-time copy of the workflow state, for rendering.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueueSnapshot {
    pub queue: Vec<ModeratedAlgorithm>,
    pub scope: Scope,
    pub load_state: LoadState,
    pub last_error: Option<ModerationError>,
    /// At least one decision request is awaiting its response.
    pub deciding: bool,
}

impl QueueSnapshot {
    /// Algorithms still awaiting a verdict, in backend order.
    #[must_use]
    pub fn pending(&self) -> Vec<ModeratedAlgorithm> {
        self.queue.iter().filter(|a| a.is_pending()).cloned().collect()
    }

    /// What the current scope displays: pending only, or everything.
    #[must_use]
    pub fn visible(&self) -> Vec<ModeratedAlgorithm> {
        match self.scope {
            Scope::PendingOnly => self.pending(),
            Scope::All => self.queue.clone(),
        }
    }
}

#[derive(Debug, Default)]
struct QueueState {
    view: QueueSnapshot,
    /// Ticket of the most recently started load.
    generation: u64,
    /// Ids decided while the latest load was in flight; stripped from its response.
    decided_during_load: Vec<AlgorithmId>,
    /// Decision requests awaiting a response.
    decisions_in_flight: usize,
}

impl QueueState {
    fn set_decisions_in_flight(&mut self, count: usize) {
        self.decisions_in_flight = count;
        self.view.deciding = count > 0;
    }
}

/// Drives algorithms through moderation for one view.
///
/// All methods take `&self`; overlapping loads are allowed and resolve
/// last-write-wins. A verdict that succeeds while a load is in flight stays
/// applied when that load's response lands. The state lock is never held
/// across an API call. Wrap the workflow in an `Arc` to share it between tasks.
pub struct ModerationWorkflow<A: ModerationApi> {
    api: A,
    state: Mutex<QueueState>,
}

impl<A: ModerationApi> ModerationWorkflow<A> {
    /// Create a workflow with an empty queue.
    #[must_use]
    pub fn new(api: A) -> Self {
        Self { api, state: Mutex::new(QueueState::default()) }
    }

    /// The API collaborator this workflow talks to.
    pub fn api(&self) -> &A {
        &self.api
    }

    /// Load the algorithms in `scope`, replacing the queue on success.
    ///
    /// Each call supersedes every earlier one: a response arriving after a
    /// newer load was started is discarded, whether it succeeded or failed.
    /// The recorded error is cleared when the load starts.
    ///
    /// # Errors
    /// Returns the classified failure. The previous queue is kept and the
    /// error is also recorded in [`QueueSnapshot::last_error`].
    pub async fn load(&self, scope: Scope) -> Result<LoadOutcome, ModerationError> {
        let ticket = {
            let mut state = self.state.lock().await;
            state.generation += 1;
            state.decided_during_load.clear();
            state.view.scope = scope;
            state.view.load_state = LoadState::Loading;
            state.view.last_error = None;
            state.generation
        };

        tracing::info!(?scope, ticket, "loading moderation queue");
        let result = self.api.list(scope).await;

        let mut state = self.state.lock().await;
        if state.generation != ticket {
            tracing::debug!(ticket, latest = state.generation, "discarding superseded load");
            return Ok(LoadOutcome::Superseded);
        }

        match result {
            Ok(mut algorithms) => {
                let decided = std::mem::take(&mut state.decided_during_load);
                if !decided.is_empty() {
                    algorithms.retain(|a| !decided.contains(&a.id));
                    tracing::debug!(stripped = decided.len(), "dropped algorithms decided during load");
                }
                for algorithm in &algorithms {
                    if let Err(e) = algorithm.check_invariants() {
                        tracing::warn!(error = %e, "backend returned an inconsistent record");
                    }
                }
                let count = algorithms.len();
                state.view.queue = algorithms;
                state.view.load_state = LoadState::Idle;
                state.view.last_error = None;
                tracing::info!(?scope, count, "moderation queue loaded");
                Ok(LoadOutcome::Applied { count })
            }
            Err(e) => {
                let error = ModerationError::classify(&e, Operation::Load);
                tracing::warn!(?scope, error = %e, "failed to load moderation queue");
                state.view.load_state = LoadState::Error;
                state.view.last_error = Some(error.clone());
                Err(error)
            }
        }
    }

    /// Issue a verdict for `id`.
    ///
    /// A rejection without a non-blank `reason` is refused before any
    /// request is sent. `reason` is ignored when approving.
    ///
    /// # Errors
    /// Returns [`ModerationError::Validation`] for a blank rejection reason
    /// (nothing is recorded), or the classified backend failure (recorded,
    /// queue unchanged).
    pub async fn decide(
        &self,
        id: &AlgorithmId,
        verdict: Verdict,
        reason: Option<&str>,
    ) -> Result<(), ModerationError> {
        let decision = Decision::new(verdict, reason)?;
        self.apply_decision(id, &decision).await
    }

    /// Send an already validated decision. On success `id` leaves the queue.
    ///
    /// # Errors
    /// Returns the classified backend failure; the queue is left unchanged.
    pub async fn apply_decision(
        &self,
        id: &AlgorithmId,
        decision: &Decision,
    ) -> Result<(), ModerationError> {
        let request = DecisionRequest::from(decision);
        {
            let mut state = self.state.lock().await;
            let in_flight = state.decisions_in_flight + 1;
            state.set_decisions_in_flight(in_flight);
        }

        tracing::info!(algorithm = %id, verdict = %decision.verdict(), "submitting moderation decision");
        let result = self.api.moderate(id, &request).await;

        let mut state = self.state.lock().await;
        let in_flight = state.decisions_in_flight.saturating_sub(1);
        state.set_decisions_in_flight(in_flight);
        match result {
            Ok(()) => {
                state.view.queue.retain(|a| &a.id != id);
                if state.view.load_state == LoadState::Loading {
                    state.decided_during_load.push(id.clone());
                }
                state.view.last_error = None;
                tracing::info!(algorithm = %id, verdict = %decision.verdict(), "moderation decision applied");
                Ok(())
            }
            Err(e) => {
                let error = ModerationError::classify(&e, Operation::Decide);
                tracing::warn!(algorithm = %id, error = %e, "moderation decision failed");
                state.view.last_error = Some(error.clone());
                Err(error)
            }
        }
    }

    /// Algorithms still awaiting a verdict, in backend order.
    pub async fn pending(&self) -> Vec<ModeratedAlgorithm> {
        self.state.lock().await.view.pending()
    }

    /// Number of pending algorithms in the queue.
    pub async fn pending_count(&self) -> usize {
        self.state.lock().await.view.queue.iter().filter(|a| a.is_pending()).count()
    }

    /// Algorithms shown for the current scope.
    pub async fn visible(&self) -> Vec<ModeratedAlgorithm> {
        self.state.lock().await.view.visible()
    }

    /// Copy of the full view state.
    pub async fn snapshot(&self) -> QueueSnapshot {
        self.state.lock().await.view.clone()
    }

    /// The last recorded error, if any.
    pub async fn last_error(&self) -> Option<ModerationError> {
        self.state.lock().await.view.last_error.clone()
    }

    /// Clear the recorded error (the banner's close button).
    pub async fn dismiss_error(&self) {
        self.state.lock().await.view.last_error = None;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use async_trait::async_trait;
    use chrono::Utc;
    use tokio::sync::Notify;

    use algomarket_core::samples::sample_queue;
    use algomarket_core::{AlgorithmStatus, CoreError, NewAlgorithm};
    use proptest::prelude::*;

    use super::*;
    use crate::ApiError;

    #[derive(Default)]
    struct ScriptedApi {
        pending: Vec<ModeratedAlgorithm>,
        all: Vec<ModeratedAlgorithm>,
        list_error: Option<ApiError>,
        moderate_error: Option<ApiError>,
        pending_gate: Option<Arc<Notify>>,
        /// Holds back the decision for one id until notified.
        moderate_gate: Option<(AlgorithmId, Arc<Notify>)>,
        list_calls: AtomicUsize,
        moderate_calls: AtomicUsize,
    }

    #[async_trait]
    impl ModerationApi for ScriptedApi {
        async fn list(&self, scope: Scope) -> Result<Vec<ModeratedAlgorithm>, ApiError> {
            self.list_calls.fetch_add(1, Ordering::SeqCst);
            if scope == Scope::PendingOnly {
                if let Some(gate) = &self.pending_gate {
                    gate.notified().await;
                }
            }
            if let Some(e) = &self.list_error {
                return Err(e.clone());
            }
            Ok(match scope {
                Scope::PendingOnly => self.pending.clone(),
                Scope::All => self.all.clone(),
            })
        }

        async fn moderate(&self, id: &AlgorithmId, _request: &DecisionRequest) -> Result<(), ApiError> {
            self.moderate_calls.fetch_add(1, Ordering::SeqCst);
            if let Some((held, gate)) = &self.moderate_gate {
                if held == id {
                    gate.notified().await;
                }
            }
            match &self.moderate_error {
                Some(e) => Err(e.clone()),
                None => Ok(()),
            }
        }

        async fn submit(&self, _algorithm: &NewAlgorithm) -> Result<ModeratedAlgorithm, ApiError> {
            Err(ApiError::Transport("not scripted".to_owned()))
        }
    }

    fn http(status: u16) -> ApiError {
        ApiError::Status { status, path: "/test".to_owned(), body: String::new() }
    }

    fn pending_only() -> Vec<ModeratedAlgorithm> {
        sample_queue().into_iter().filter(ModeratedAlgorithm::is_pending).collect()
    }

    fn ids(list: &[ModeratedAlgorithm]) -> Vec<&str> {
        list.iter().map(|a| a.id.as_str()).collect()
    }

    #[tokio::test]
    async fn new_workflow_is_idle_and_empty() {
        let wf = ModerationWorkflow::new(ScriptedApi::default());
        let snap = wf.snapshot().await;
        assert!(snap.queue.is_empty());
        assert_eq!(snap.load_state, LoadState::Idle);
        assert_eq!(snap.scope, Scope::PendingOnly);
        assert!(snap.last_error.is_none());
    }

    #[tokio::test]
    async fn load_replaces_queue_and_goes_idle() {
        let api = ScriptedApi { pending: pending_only(), ..ScriptedApi::default() };
        let wf = ModerationWorkflow::new(api);
        assert_eq!(wf.load(Scope::PendingOnly).await, Ok(LoadOutcome::Applied { count: 2 }));
        let snap = wf.snapshot().await;
        assert_eq!(ids(&snap.queue), vec!["a", "b"]);
        assert_eq!(snap.load_state, LoadState::Idle);
    }

    #[tokio::test]
    async fn all_scope_shows_every_status_but_pending_filters() {
        let api = ScriptedApi { all: sample_queue(), ..ScriptedApi::default() };
        let wf = ModerationWorkflow::new(api);
        assert!(wf.load(Scope::All).await.is_ok());
        assert_eq!(ids(&wf.visible().await), vec!["a", "b", "c", "d"]);
        assert_eq!(ids(&wf.pending().await), vec!["a", "b"]);
        assert_eq!(wf.pending_count().await, 2);
    }

    #[tokio::test]
    async fn failed_load_keeps_previous_queue() {
        let api = ScriptedApi { pending: pending_only(), ..ScriptedApi::default() };
        let mut wf = ModerationWorkflow::new(api);
        assert!(wf.load(Scope::PendingOnly).await.is_ok());
        let before = wf.snapshot().await.queue;

        // Swap in a failing script; the workflow is not shared yet.
        wf.api.list_error = Some(http(500));
        let result = wf.load(Scope::PendingOnly).await;
        assert_eq!(result, Err(ModerationError::Failed { operation: Operation::Load }));

        let snap = wf.snapshot().await;
        assert_eq!(snap.queue, before, "failed load must not clear the queue");
        assert_eq!(snap.load_state, LoadState::Error);
        assert_eq!(snap.last_error, Some(ModerationError::Failed { operation: Operation::Load }));
    }

    #[tokio::test]
    async fn load_errors_are_classified() {
        for (status, expected) in [
            (403, ModerationError::Forbidden),
            (404, ModerationError::EndpointMissing),
            (502, ModerationError::Failed { operation: Operation::Load }),
        ] {
            let api = ScriptedApi { list_error: Some(http(status)), ..ScriptedApi::default() };
            let wf = ModerationWorkflow::new(api);
            assert_eq!(wf.load(Scope::All).await, Err(expected.clone()), "status {status}");
            assert_eq!(wf.last_error().await, Some(expected));
        }
    }

    #[tokio::test]
    async fn successful_load_clears_previous_error() {
        let api = ScriptedApi { pending: pending_only(), list_error: Some(http(500)), ..ScriptedApi::default() };
        let mut wf = ModerationWorkflow::new(api);
        assert!(wf.load(Scope::PendingOnly).await.is_err());
        wf.api.list_error = None;
        assert!(wf.load(Scope::PendingOnly).await.is_ok());
        assert!(wf.last_error().await.is_none());
    }

    #[tokio::test]
    async fn blank_rejection_never_reaches_the_api() {
        let api = ScriptedApi { pending: pending_only(), ..ScriptedApi::default() };
        let wf = ModerationWorkflow::new(api);
        assert!(wf.load(Scope::PendingOnly).await.is_ok());
        let before = wf.snapshot().await;

        for reason in [None, Some(""), Some("   ")] {
            let result = wf.decide(&AlgorithmId::new("a"), Verdict::Rejected, reason).await;
            assert_eq!(result, Err(ModerationError::Validation(CoreError::EmptyRejectionReason)));
        }
        assert_eq!(wf.api().moderate_calls.load(Ordering::SeqCst), 0, "no request may be issued");
        assert_eq!(wf.snapshot().await, before, "validation failure must not touch state");
    }

    #[tokio::test]
    async fn approve_removes_exactly_that_item_in_order() {
        let mut queue = pending_only();
        let mut extra = ModeratedAlgorithm::pending(AlgorithmId::new("z"), "t", "d", "x", Utc::now());
        extra.tags.push("misc".to_owned());
        queue.insert(1, extra);
        let api = ScriptedApi { pending: queue, ..ScriptedApi::default() };
        let wf = ModerationWorkflow::new(api);
        assert!(wf.load(Scope::PendingOnly).await.is_ok());
        assert_eq!(ids(&wf.pending().await), vec!["a", "z", "b"]);

        assert!(wf.decide(&AlgorithmId::new("z"), Verdict::Approved, Some("ignored")).await.is_ok());
        assert_eq!(ids(&wf.pending().await), vec!["a", "b"]);
        assert_eq!(wf.api().moderate_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failed_decision_leaves_queue_identical() {
        let api = ScriptedApi {
            all: sample_queue(),
            moderate_error: Some(http(500)),
            ..ScriptedApi::default()
        };
        let wf = ModerationWorkflow::new(api);
        assert!(wf.load(Scope::All).await.is_ok());
        let before = wf.snapshot().await.queue;

        let result = wf.decide(&AlgorithmId::new("a"), Verdict::Rejected, Some("duplicate")).await;
        assert_eq!(result, Err(ModerationError::Failed { operation: Operation::Decide }));

        let snap = wf.snapshot().await;
        assert_eq!(snap.queue, before);
        assert!(!snap.deciding, "in-flight flag must be cleared after failure");
        assert_eq!(snap.last_error, Some(ModerationError::Failed { operation: Operation::Decide }));
    }

    #[tokio::test]
    async fn superseded_load_does_not_overwrite_latest() {
        let gate = Arc::new(Notify::new());
        let api = ScriptedApi {
            pending: pending_only(),
            all: sample_queue(),
            pending_gate: Some(Arc::clone(&gate)),
            ..ScriptedApi::default()
        };
        let wf = ModerationWorkflow::new(api);

        let (slow, fast) = tokio::join!(wf.load(Scope::PendingOnly), async {
            let outcome = wf.load(Scope::All).await;
            gate.notify_one();
            outcome
        });

        assert_eq!(fast, Ok(LoadOutcome::Applied { count: 4 }));
        assert_eq!(slow, Ok(LoadOutcome::Superseded));
        let snap = wf.snapshot().await;
        assert_eq!(snap.scope, Scope::All);
        assert_eq!(ids(&snap.queue), vec!["a", "b", "c", "d"]);
        assert_eq!(snap.load_state, LoadState::Idle);
        assert_eq!(wf.api().list_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn superseded_failure_is_not_recorded() {
        let gate = Arc::new(Notify::new());
        let api = ScriptedApi {
            list_error: Some(http(403)),
            pending_gate: Some(Arc::clone(&gate)),
            ..ScriptedApi::default()
        };
        let wf = ModerationWorkflow::new(api);

        let (slow, _fast) = tokio::join!(wf.load(Scope::PendingOnly), async {
            let outcome = wf.load(Scope::All).await;
            wf.dismiss_error().await;
            gate.notify_one();
            outcome
        });

        assert_eq!(slow, Ok(LoadOutcome::Superseded));
        assert!(wf.last_error().await.is_none(), "stale failure must not resurface");
    }

    #[tokio::test]
    async fn decision_during_slow_load_stays_applied() {
        let gate = Arc::new(Notify::new());
        let api = ScriptedApi {
            pending: pending_only(),
            pending_gate: Some(Arc::clone(&gate)),
            ..ScriptedApi::default()
        };
        let wf = ModerationWorkflow::new(api);

        let (loaded, decided) = tokio::join!(wf.load(Scope::PendingOnly), async {
            while wf.snapshot().await.load_state != LoadState::Loading {
                tokio::task::yield_now().await;
            }
            let outcome = wf.decide(&AlgorithmId::new("a"), Verdict::Approved, None).await;
            gate.notify_one();
            outcome
        });

        assert_eq!(decided, Ok(()));
        assert_eq!(loaded, Ok(LoadOutcome::Applied { count: 1 }));
        let snap = wf.snapshot().await;
        assert_eq!(ids(&snap.queue), vec!["b"], "approved algorithm must not come back");
        assert_eq!(snap.load_state, LoadState::Idle);

        // The next load starts clean and shows whatever the backend returns.
        gate.notify_one();
        assert_eq!(wf.load(Scope::PendingOnly).await, Ok(LoadOutcome::Applied { count: 2 }));
    }

    #[tokio::test]
    async fn deciding_stays_set_until_every_decision_returns() {
        let gate = Arc::new(Notify::new());
        let api = ScriptedApi {
            pending: pending_only(),
            moderate_gate: Some((AlgorithmId::new("a"), Arc::clone(&gate))),
            ..ScriptedApi::default()
        };
        let wf = ModerationWorkflow::new(api);
        assert!(wf.load(Scope::PendingOnly).await.is_ok());

        let id_a = AlgorithmId::new("a");
        let (slow, fast) = tokio::join!(wf.decide(&id_a, Verdict::Approved, None), async {
            while !wf.snapshot().await.deciding {
                tokio::task::yield_now().await;
            }
            let outcome = wf.decide(&AlgorithmId::new("b"), Verdict::Approved, None).await;
            assert!(wf.snapshot().await.deciding, "decision for a is still in flight");
            gate.notify_one();
            outcome
        });

        assert_eq!(slow, Ok(()));
        assert_eq!(fast, Ok(()));
        let snap = wf.snapshot().await;
        assert!(!snap.deciding);
        assert!(snap.queue.is_empty());
    }

    #[tokio::test]
    async fn starting_a_load_clears_the_previous_error() {
        let gate = Arc::new(Notify::new());
        let api = ScriptedApi { pending: pending_only(), list_error: Some(http(500)), ..ScriptedApi::default() };
        let mut wf = ModerationWorkflow::new(api);
        assert!(wf.load(Scope::All).await.is_err());
        assert!(wf.last_error().await.is_some());

        wf.api.list_error = None;
        wf.api.pending_gate = Some(Arc::clone(&gate));
        let (loaded, seen) = tokio::join!(wf.load(Scope::PendingOnly), async {
            while wf.snapshot().await.load_state != LoadState::Loading {
                tokio::task::yield_now().await;
            }
            let seen = wf.last_error().await;
            gate.notify_one();
            seen
        });

        assert!(seen.is_none(), "error banner must clear while reloading");
        assert_eq!(loaded, Ok(LoadOutcome::Applied { count: 2 }));
    }

    #[tokio::test]
    async fn dismiss_error_clears_banner_only() {
        let api = ScriptedApi { list_error: Some(http(404)), ..ScriptedApi::default() };
        let wf = ModerationWorkflow::new(api);
        assert!(wf.load(Scope::PendingOnly).await.is_err());
        wf.dismiss_error().await;
        let snap = wf.snapshot().await;
        assert!(snap.last_error.is_none());
        assert_eq!(snap.load_state, LoadState::Error);
    }

    proptest! {
        #[test]
        fn approve_removes_only_the_chosen_id(len in 1usize..16, pick in any::<prop::sample::Index>()) {
            let queue: Vec<_> = (0..len)
                .map(|i| ModeratedAlgorithm::pending(AlgorithmId::new(format!("id-{i}")), "t", "d", "x", Utc::now()))
                .collect();
            let chosen = queue[pick.index(len)].id.clone();
            let expected: Vec<String> =
                queue.iter().filter(|a| a.id != chosen).map(|a| a.id.to_string()).collect();

            let runtime = match tokio::runtime::Builder::new_current_thread().build() {
                Ok(rt) => rt,
                Err(e) => panic!("failed to build runtime: {e}"),
            };
            let (decided, remaining) = runtime.block_on(async {
                let wf = ModerationWorkflow::new(ScriptedApi { pending: queue, ..ScriptedApi::default() });
                let _ = wf.load(Scope::PendingOnly).await;
                let decided = wf.decide(&chosen, Verdict::Approved, None).await;
                (decided, wf.pending().await)
            });

            prop_assert_eq!(decided, Ok(()));
            let remaining: Vec<String> = remaining.iter().map(|a| a.id.to_string()).collect();
            prop_assert_eq!(remaining, expected);
        }
    }

    #[test]
    fn snapshot_pending_keeps_backend_order() {
        let mut queue = sample_queue();
        queue.reverse();
        let snap = QueueSnapshot { queue, ..QueueSnapshot::default() };
        assert_eq!(ids(&snap.pending()), vec!["b", "a"]);
        assert!(snap.pending().iter().all(|a| a.status == AlgorithmStatus::Pending));
    }
}
