use std::collections::VecDeque;
use std::sync::Mutex;

use crate::config;

/// A bounded ring buffer of structural warnings, mirrored alongside every
/// `tracing::warn!` emitted by a [`crate::Column`] or [`crate::Table`] so
/// hosts without a `tracing` subscriber installed can still inspect
/// failures programmatically.
#[derive(Default)]
pub(crate) struct WarningLog {
    entries: Mutex<VecDeque<String>>,
}

impl WarningLog {
    pub(crate) fn push(&self, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!("{message}");
        let mut entries = self.entries.lock().unwrap();
        entries.push_back(message);
        let cap = config::warning_capacity();
        while entries.len() > cap {
            entries.pop_front();
        }
    }

    pub(crate) fn snapshot(&self) -> Vec<String> {
        self.entries.lock().unwrap().iter().cloned().collect()
    }

    pub(crate) fn clear(&self) {
        self.entries.lock().unwrap().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn warnings_accumulate_and_clear() {
        let log = WarningLog::default();
        log.push("first");
        log.push("second");
        assert_eq!(log.snapshot(), vec!["first".to_string(), "second".to_string()]);
        log.clear();
        assert!(log.snapshot().is_empty());
    }

    #[test]
    fn warnings_respect_capacity() {
        let log = WarningLog::default();
        config::set_warning_capacity(2);
        log.push("a");
        log.push("b");
        log.push("c");
        assert_eq!(log.snapshot(), vec!["b".to_string(), "c".to_string()]);
        config::set_warning_capacity(64);
    }
}
