//! Process-wide configuration, backed by static atomics rather than a
//! per-table setting, matching the actor's process-wide `thread_safe` flag
//! and the process-wide function registry.
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

static THREAD_SAFE: AtomicBool = AtomicBool::new(true);
static WARNING_CAPACITY: AtomicUsize = AtomicUsize::new(64);

/// Enables or disables actor-based serialization process-wide.
///
/// Disabling runs every `atomic_do` inline, trading the ordering guarantee
/// for the cost of spawning and communicating with worker threads. Mainly
/// useful for single-threaded embedding or deterministic tests.
pub fn set_thread_safe(enabled: bool) {
    THREAD_SAFE.store(enabled, Ordering::SeqCst);
}

/// Reads the current `thread_safe` flag.
pub fn is_thread_safe() -> bool {
    THREAD_SAFE.load(Ordering::SeqCst)
}

/// Sets the capacity of the per-object warning ring buffer described in the
/// logging design (`Table::warnings()` / `Column::warnings()`). Does not
/// retroactively shrink buffers already holding more than `capacity`
/// entries; the next push trims them down.
pub fn set_warning_capacity(capacity: usize) {
    WARNING_CAPACITY.store(capacity, Ordering::SeqCst);
}

/// Reads the current warning ring-buffer capacity.
pub fn warning_capacity() -> usize {
    WARNING_CAPACITY.load(Ordering::SeqCst)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // Guards against the two config tests racing on the shared statics.
    static LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn thread_safe_round_trips() {
        let _guard = LOCK.lock().unwrap();
        let original = is_thread_safe();
        set_thread_safe(false);
        assert!(!is_thread_safe());
        set_thread_safe(true);
        assert!(is_thread_safe());
        set_thread_safe(original);
    }

    #[test]
    fn warning_capacity_round_trips() {
        let _guard = LOCK.lock().unwrap();
        let original = warning_capacity();
        set_warning_capacity(8);
        assert_eq!(warning_capacity(), 8);
        set_warning_capacity(original);
    }
}
