use jiff::Timestamp;
use tracing::{Level, event};
use uuid::Uuid;

use crate::errors::Error;

#[derive(Clone, Debug)]
pub enum RefreshOutcome {
    Success,
    Failed,
}

/// Structured events for one token refresh, tied together by `attempt_id`.
#[derive(Clone, Debug)]
pub struct RefreshTelemetry {
    attempt_id: Uuid,
    context: String,
}

impl RefreshTelemetry {
    pub fn new(context: impl Into<String>) -> Self {
        Self {
            attempt_id: Uuid::new_v4(),
            context: context.into(),
        }
    }

    pub fn attempt_id(&self) -> Uuid {
        self.attempt_id
    }

    pub fn context(&self) -> &str {
        &self.context
    }

    pub fn emit_start(&self, at: Timestamp) {
        event!(
            Level::INFO,
            attempt_id = %self.attempt_id,
            context = %self.context,
            timestamp = %at,
            "refresh.start"
        );
    }

    pub fn emit_success(&self, outcome: RefreshOutcome, at: Timestamp) {
        event!(
            Level::INFO,
            attempt_id = %self.attempt_id,
            context = %self.context,
            timestamp = %at,
            outcome = ?outcome,
            "refresh.success"
        );
    }

    pub fn emit_failure(&self, error: &Error, at: Timestamp) {
        event!(
            Level::ERROR,
            attempt_id = %self.attempt_id,
            context = %self.context,
            timestamp = %at,
            outcome = ?RefreshOutcome::Failed,
            error_kind = %error.kind(),
            error = %error,
            "refresh.failure"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn telemetry_preserves_context_and_id() {
        let telemetry = RefreshTelemetry::new("ctx");
        assert_eq!(telemetry.context(), "ctx");
        let first = telemetry.attempt_id();
        assert_eq!(first, telemetry.attempt_id());
        assert_ne!(first, RefreshTelemetry::new("ctx").attempt_id());
    }
}
