//! Events emitted while an audit runs
//!
//! The audit core never formats output. Callers pass an [`EventSink`] and
//! render events to a terminal, a log, or a file.

use crate::types::Finding;

/// Progress of a running audit
#[derive(Debug, Clone, PartialEq)]
pub enum AuditEvent {
    /// The dependency set was loaded and scanning begins
    ScanStarted { count: usize },
    /// A registry lookup is about to start (`index` is zero-based)
    Checking {
        name: String,
        index: usize,
        total: usize,
    },
    /// One dependency was classified
    Finding(Finding),
    /// Every dependency has a finding
    ScanComplete { total: usize, total_issues: usize },
}

/// Receives audit events as they are produced
pub trait EventSink {
    fn emit(&self, event: &AuditEvent);
}

impl<F> EventSink for F
where
    F: Fn(&AuditEvent),
{
    fn emit(&self, event: &AuditEvent) {
        self(event)
    }
}

/// Sink that discards every event
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&self, _event: &AuditEvent) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[test]
    fn test_closure_sink() {
        let seen = RefCell::new(Vec::new());
        let sink = |event: &AuditEvent| seen.borrow_mut().push(event.clone());

        sink.emit(&AuditEvent::ScanStarted { count: 2 });
        sink.emit(&AuditEvent::ScanComplete {
            total: 2,
            total_issues: 0,
        });

        assert_eq!(seen.borrow().len(), 2);
        assert_eq!(seen.borrow()[0], AuditEvent::ScanStarted { count: 2 });
    }
}
