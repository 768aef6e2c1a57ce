//! The serializing actor: the concurrency primitive shared by every
//! [`crate::Column`] and [`crate::Table`].
//!
//! Re-entrancy is keyed by *object identity* (this actor's unique id),
//! tracked in a thread-local set of ids currently "held" by whichever OS
//! thread is running. The distilled design keyed this by object *type*,
//! modeling a goroutine-identity trick from a source implementation without
//! a native equivalent here; keying by identity instead means two
//! independent actors are never accidentally forced inline into each
//! other's ordering, while a callback that calls back into the *same*
//! object still takes the inline fast path and cannot deadlock.
use std::{
    cell::RefCell,
    collections::HashSet,
    sync::{
        atomic::{AtomicBool, AtomicU64, Ordering},
        mpsc, Mutex,
    },
    thread,
};

use crate::config;

static NEXT_ACTOR_ID: AtomicU64 = AtomicU64::new(1);

thread_local! {
    static HELD: RefCell<HashSet<u64>> = RefCell::new(HashSet::new());
}

type Job = Box<dyn FnOnce() + Send>;

#[derive(Default)]
struct Worker {
    sender: Option<mpsc::SyncSender<Job>>,
}

/// A per-object single-worker-thread command queue.
pub(crate) struct Actor {
    id: u64,
    closed: AtomicBool,
    worker: Mutex<Worker>,
}

impl Actor {
    pub(crate) fn new() -> Self {
        Self {
            id: NEXT_ACTOR_ID.fetch_add(1, Ordering::SeqCst),
            closed: AtomicBool::new(false),
            worker: Mutex::new(Worker::default()),
        }
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Runs `f`, serialized through this actor's worker thread unless one
    /// of the inline fast paths applies.
    pub(crate) fn atomic_do<F, R>(&self, f: F) -> R
    where
        F: FnOnce() -> R + Send + 'static,
        R: Send + 'static,
    {
        if !config::is_thread_safe() {
            return f();
        }
        if self.is_closed() {
            return f();
        }
        if HELD.with(|held| held.borrow().contains(&self.id)) {
            return f();
        }

        let sender = self.sender();
        let (result_tx, result_rx) = mpsc::channel::<R>();
        let job: Job = Box::new(move || {
            let _ = result_tx.send(f());
        });
        match sender.send(job) {
            Ok(()) => result_rx.recv().expect("actor worker vanished without responding"),
            Err(mpsc::SendError(job)) => {
                // The worker's receiver is gone (a close() race); degrade
                // to running inline rather than losing the operation.
                job();
                result_rx.recv().expect("actor worker vanished without responding")
            }
        }
    }

    fn sender(&self) -> mpsc::SyncSender<Job> {
        let mut worker = self.worker.lock().unwrap();
        if let Some(sender) = &worker.sender {
            return sender.clone();
        }
        let (tx, rx) = mpsc::sync_channel::<Job>(0);
        let id = self.id;
        thread::Builder::new()
            .name(format!("ccl-actor-{id}"))
            .spawn(move || {
                tracing::info!(actor = id, "actor worker started");
                HELD.with(|held| held.borrow_mut().insert(id));
                for job in rx {
                    job();
                }
                tracing::info!(actor = id, "actor worker stopped");
            })
            .expect("failed to spawn actor worker thread");
        worker.sender = Some(tx.clone());
        tx
    }

    /// Marks this actor closed and drops its held sender, so future calls
    /// degrade to inline execution and the worker thread (once any
    /// in-flight clones of the sender are also dropped) exits.
    pub(crate) fn close(&self) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        tracing::info!(actor = self.id, "actor closing");
        self.worker.lock().unwrap().sender = None;
    }
}

impl Drop for Actor {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn runs_serialized_operations_and_returns_result() {
        let actor = Actor::new();
        let got = actor.atomic_do(|| 2 + 2);
        assert_eq!(got, 4);
    }

    #[test]
    fn reentrant_call_from_inside_the_same_actor_runs_inline() {
        let actor = Arc::new(Actor::new());
        let inner = Arc::clone(&actor);
        let got = actor.atomic_do(move || inner.atomic_do(|| 7));
        assert_eq!(got, 7);
    }

    #[test]
    fn closed_actor_degrades_to_inline() {
        let actor = Actor::new();
        actor.close();
        assert!(actor.is_closed());
        assert_eq!(actor.atomic_do(|| 5), 5);
    }

    #[test]
    fn disabling_thread_safe_runs_everything_inline() {
        config::set_thread_safe(false);
        let actor = Actor::new();
        assert_eq!(actor.atomic_do(|| 9), 9);
        config::set_thread_safe(true);
    }

    #[test]
    fn independent_actors_do_not_share_reentrancy_state() {
        let a = Arc::new(Actor::new());
        let b = Arc::new(Actor::new());
        let b2 = Arc::clone(&b);
        // Running inside `a`'s worker and calling into `b` must still block
        // through b's own channel rather than being treated as reentrant.
        let got = a.atomic_do(move || b2.atomic_do(|| 11));
        assert_eq!(got, 11);
    }
}
