//! Pin / unpin / sync dispatch.
//!
//! Every request resolves its completion exactly once. The completion lives in
//! a take-once slot: the remote reply, the timeout and a caller's `cancel`
//! all race to take it, and only the winner's outcome is delivered.
//!
//! Unresolved completions are also tracked in [`InFlight`], so that closing
//! the link fails them with `ActionError::Connection` instead of dropping
//! them along with their tasks.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tokio::task::AbortHandle;

use syncbridge_core::{ActionError, ActionKind};

use crate::client::Shared;
use crate::transport::{round_trip, DaemonCall};

pub(crate) type OnDone = Box<dyn FnOnce(Result<(), ActionError>) + Send + 'static>;

struct Completion {
    slot: Mutex<Option<OnDone>>,
}

impl Completion {
    fn new(on_done: OnDone) -> Self {
        Self {
            slot: Mutex::new(Some(on_done)),
        }
    }

    /// Deliver `outcome` if nobody has yet. Returns whether this call won.
    fn resolve(&self, outcome: Result<(), ActionError>) -> bool {
        let on_done = self
            .slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        match on_done {
            Some(on_done) => {
                on_done(outcome);
                true
            }
            None => false,
        }
    }

    fn is_resolved(&self) -> bool {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_none()
    }
}

/// Completions that have been sent but not yet resolved.
#[derive(Default)]
pub(crate) struct InFlight {
    next_id: AtomicU64,
    pending: Mutex<HashMap<u64, Arc<Completion>>>,
}

impl InFlight {
    fn register(&self, completion: Arc<Completion>) -> u64 {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.lock().insert(id, completion);
        id
    }

    fn release(&self, id: u64) {
        self.lock().remove(&id);
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.lock().len()
    }

    /// Resolve every tracked completion with `outcome`. Returns how many
    /// callbacks this delivered.
    pub(crate) fn fail_all(&self, outcome: ActionError) -> usize {
        let drained: Vec<Arc<Completion>> = self.lock().drain().map(|(_, c)| c).collect();
        drained
            .into_iter()
            .filter(|completion| completion.resolve(Err(outcome.clone())))
            .count()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<u64, Arc<Completion>>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Handle on an in-flight action.
///
/// Dropping the handle does not cancel the action.
pub struct ActionHandle {
    kind: ActionKind,
    completion: Arc<Completion>,
    task: Option<(AbortHandle, u64, Arc<InFlight>)>,
}

impl ActionHandle {
    pub fn kind(&self) -> ActionKind {
        self.kind
    }

    /// Withdraw interest. If no outcome has been delivered yet the callback
    /// receives `ActionError::Cancelled` and the request is abandoned.
    ///
    /// Returns `false` when an outcome had already been delivered.
    pub fn cancel(&self) -> bool {
        if !self.completion.resolve(Err(ActionError::Cancelled)) {
            return false;
        }
        if let Some((task, id, in_flight)) = &self.task {
            task.abort();
            in_flight.release(*id);
        }
        true
    }

    pub fn is_resolved(&self) -> bool {
        self.completion.is_resolved()
    }
}

/// Send one action to the daemon.
///
/// Without a daemon the callback runs on the calling thread with
/// `ActionError::Connection` before this returns; nothing is sent.
pub(crate) fn dispatch(
    shared: &Arc<Shared>,
    kind: ActionKind,
    path: PathBuf,
    on_done: OnDone,
) -> ActionHandle {
    let completion = Arc::new(Completion::new(on_done));

    let Some(calls) = shared.supervisor.calls() else {
        tracing::debug!(action = %kind, path = %path.display(), "daemon unavailable; failing fast");
        completion.resolve(Err(ActionError::Connection));
        return ActionHandle {
            kind,
            completion,
            task: None,
        };
    };

    let limit = shared.config.action_timeout();
    let wire_path = path.to_string_lossy().into_owned();
    let in_flight = shared.in_flight.clone();
    let id = in_flight.register(completion.clone());
    let done = completion.clone();
    let tracker = in_flight.clone();
    let task = shared.runtime.spawn(async move {
        tracing::debug!(action = %kind, path = %wire_path, "dispatching action");
        let outcome = round_trip(&calls, limit, |respond_to| DaemonCall::Action {
            kind,
            path: wire_path.clone(),
            respond_to,
        })
        .await
        .map_err(ActionError::from);

        if let Err(err) = &outcome {
            tracing::warn!(action = %kind, path = %wire_path, error = %err, "action failed");
        }
        done.resolve(outcome);
        tracker.release(id);
    });

    ActionHandle {
        kind,
        completion,
        task: Some((task.abort_handle(), id, in_flight)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    fn counting() -> (Arc<AtomicUsize>, OnDone) {
        let count = Arc::new(AtomicUsize::new(0));
        let seen = count.clone();
        (
            count,
            Box::new(move |_| {
                seen.fetch_add(1, Ordering::SeqCst);
            }),
        )
    }

    #[test]
    fn completion_resolves_once() {
        let (count, on_done) = counting();
        let completion = Completion::new(on_done);
        assert!(completion.resolve(Ok(())));
        assert!(!completion.resolve(Err(ActionError::Cancelled)));
        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert!(completion.is_resolved());
    }

    #[test]
    fn fail_all_resolves_only_unresolved_completions() {
        let in_flight = InFlight::default();
        let (pending_count, pending) = counting();
        let (done_count, done) = counting();
        let pending = Arc::new(Completion::new(pending));
        let done = Arc::new(Completion::new(done));
        in_flight.register(pending.clone());
        in_flight.register(done.clone());
        assert!(done.resolve(Ok(())));

        assert_eq!(in_flight.fail_all(ActionError::Connection), 1);
        assert_eq!(pending_count.load(Ordering::SeqCst), 1);
        assert_eq!(done_count.load(Ordering::SeqCst), 1);
        assert_eq!(in_flight.len(), 0);
        assert_eq!(in_flight.fail_all(ActionError::Connection), 0);
    }

    #[test]
    fn racing_resolvers_deliver_one_outcome() {
        for _ in 0..100 {
            let (count, on_done) = counting();
            let completion = Arc::new(Completion::new(on_done));
            let racers: Vec<_> = (0..4)
                .map(|i| {
                    let completion = completion.clone();
                    std::thread::spawn(move || {
                        let outcome = if i % 2 == 0 {
                            Ok(())
                        } else {
                            Err(ActionError::Cancelled)
                        };
                        completion.resolve(outcome)
                    })
                })
                .collect();
            let winners = racers
                .into_iter()
                .map(|r| r.join().expect("racer"))
                .filter(|won| *won)
                .count();
            assert_eq!(winners, 1);
            assert_eq!(count.load(Ordering::SeqCst), 1);
        }
    }
}
