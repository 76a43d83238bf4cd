//! Transition events and the observers that turn them into side effects.
//!
//! The lifecycle machine only emits [`TransitionEvent`]s. Notifications,
//! metrics and logging are observers registered on the [`OperationEnv`]
//! (see `lifecycle.rs`), keyed by operation name so repeated attempts
//! replace earlier messages instead of stacking.
//!
//! [`OperationEnv`]: crate::operations::OperationEnv

use alloy::primitives::TxHash;

use crate::observability::metrics;
use crate::operations::error::OperationError;
use crate::operations::state::Phase;

/// One phase change of one attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionEvent {
    /// Operation name; doubles as the notification dedupe key.
    pub operation: &'static str,
    pub attempt: u64,
    pub from: Phase,
    pub to: Phase,
    pub transaction_hash: Option<TxHash>,
    /// Set when `to` is `Failed`.
    pub error: Option<OperationError>,
    /// Set when `to` is `Confirmed`.
    pub success_message: Option<String>,
}

impl TransitionEvent {
    pub fn dedupe_key(&self) -> &'static str {
        self.operation
    }
}

/// Receives every transition of the operations it is registered with.
pub trait TransitionObserver: Send + Sync {
    fn on_transition(&self, event: &TransitionEvent);
}

/// User-facing notification surface (toasts, status lines).
///
/// Calls with the same `key` replace each other rather than stack.
pub trait NotificationSink: Send + Sync {
    fn loading(&self, message: &str, key: &str);
    fn success(&self, message: &str, key: &str);
    fn error(&self, message: &str, key: &str);
}

/// Maps transitions onto a [`NotificationSink`].
///
/// Success and error fire once per attempt because terminal phases are
/// entered once per attempt.
pub struct NotificationObserver<S> {
    sink: S,
}

impl<S: NotificationSink> NotificationObserver<S> {
    pub fn new(sink: S) -> Self {
        Self { sink }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }
}

impl<S: NotificationSink> TransitionObserver for NotificationObserver<S> {
    fn on_transition(&self, event: &TransitionEvent) {
        let key = event.dedupe_key();
        match event.to {
            Phase::AwaitingDependency => self
                .sink
                .loading(&format!("Preparing {}: approval required", event.operation), key),
            Phase::Submitting => self.sink.loading(
                &format!("Confirm the {} transaction in your wallet", event.operation),
                key,
            ),
            Phase::PendingConfirmation => self.sink.loading(
                &format!("{} submitted, waiting for confirmation", event.operation),
                key,
            ),
            Phase::Confirmed => {
                let message = event
                    .success_message
                    .clone()
                    .unwrap_or_else(|| format!("{} confirmed", event.operation));
                self.sink.success(&message, key);
            }
            Phase::Failed => {
                let message = event
                    .error
                    .as_ref()
                    .map(|e| e.message.as_str())
                    .unwrap_or("Transaction failed");
                self.sink.error(message, key);
            }
            Phase::Idle | Phase::Validating => {}
        }
    }
}

/// Notification sink writing to the log, used by the CLI.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl NotificationSink for TracingSink {
    fn loading(&self, message: &str, key: &str) {
        tracing::info!(key = key, "{}", message);
    }

    fn success(&self, message: &str, key: &str) {
        tracing::info!(key = key, "✔ {}", message);
    }

    fn error(&self, message: &str, key: &str) {
        tracing::error!(key = key, "✘ {}", message);
    }
}

/// Records transitions as Prometheus metrics.
#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsObserver;

impl TransitionObserver for MetricsObserver {
    fn on_transition(&self, event: &TransitionEvent) {
        metrics::record_transition(event.operation, event.to.as_str());
        match (event.to, &event.error) {
            (Phase::PendingConfirmation, _) => metrics::record_submission(event.operation),
            (Phase::Failed, Some(error)) => metrics::record_failure(event.operation, error.kind.as_str()),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operations::error::ErrorKind;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Captured(Mutex<Vec<(String, String, String)>>);

    impl NotificationSink for Captured {
        fn loading(&self, message: &str, key: &str) {
            self.0.lock().unwrap().push(("loading".into(), message.into(), key.into()));
        }
        fn success(&self, message: &str, key: &str) {
            self.0.lock().unwrap().push(("success".into(), message.into(), key.into()));
        }
        fn error(&self, message: &str, key: &str) {
            self.0.lock().unwrap().push(("error".into(), message.into(), key.into()));
        }
    }

    fn event(from: Phase, to: Phase) -> TransitionEvent {
        TransitionEvent {
            operation: "buy",
            attempt: 1,
            from,
            to,
            transaction_hash: None,
            error: None,
            success_message: None,
        }
    }

    #[test]
    fn test_maps_phases_to_notifications() {
        let observer = NotificationObserver::new(Captured::default());

        observer.on_transition(&event(Phase::Idle, Phase::Validating));
        observer.on_transition(&event(Phase::Validating, Phase::Submitting));
        observer.on_transition(&event(Phase::Submitting, Phase::PendingConfirmation));
        let mut confirmed = event(Phase::PendingConfirmation, Phase::Confirmed);
        confirmed.success_message = Some("Purchase complete".into());
        observer.on_transition(&confirmed);

        let calls = observer.sink().0.lock().unwrap().clone();
        assert_eq!(calls.len(), 3);
        assert_eq!(calls[0].0, "loading");
        assert_eq!(calls[2], ("success".into(), "Purchase complete".into(), "buy".into()));
        assert!(calls.iter().all(|(_, _, key)| key == "buy"));
    }

    #[test]
    fn test_failure_uses_error_message() {
        let observer = NotificationObserver::new(Captured::default());
        let mut failed = event(Phase::Submitting, Phase::Failed);
        failed.error = Some(OperationError::new(ErrorKind::UserRejected, "Rejected in wallet"));
        observer.on_transition(&failed);

        let calls = observer.sink().0.lock().unwrap().clone();
        assert_eq!(calls, vec![("error".into(), "Rejected in wallet".into(), "buy".into())]);
    }
}
