// src/notify/escalator.rs

use tracing::{error, info, warn};

use crate::errors::NotificationError;
use crate::notify::Notifier;
use crate::types::NotificationEvent;

/// What happened to an escalation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EscalationOutcome {
    Sent,
    /// Sender or recipient not configured.
    Skipped,
    /// Transport failed; already logged.
    Failed(NotificationError),
}

/// Sends one mail per exhausted retry sequence.
///
/// Best effort: a missing address skips the mail and a transport failure is
/// logged and swallowed, so escalation can never take down the supervisor.
#[derive(Debug)]
pub struct FailureEscalator<N> {
    notifier: N,
    sender: String,
    recipient: String,
}

impl<N: Notifier> FailureEscalator<N> {
    pub fn new(notifier: N, sender: impl Into<String>, recipient: impl Into<String>) -> Self {
        Self {
            notifier,
            sender: sender.into(),
            recipient: recipient.into(),
        }
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    pub fn is_enabled(&self) -> bool {
        !self.sender.trim().is_empty() && !self.recipient.trim().is_empty()
    }

    /// Send the mail, surfacing transport errors.
    ///
    /// Returns `Ok(false)` when escalation is disabled.
    pub async fn try_escalate(&self, event: &NotificationEvent) -> Result<bool, NotificationError> {
        if !self.is_enabled() {
            return Ok(false);
        }

        let subject = subject(event);
        let body = body(event);
        self.notifier
            .send(self.sender.trim(), self.recipient.trim(), &subject, &body)
            .await?;
        Ok(true)
    }

    /// Escalate `event`; never fails.
    pub async fn escalate(&self, event: &NotificationEvent) -> EscalationOutcome {
        match self.try_escalate(event).await {
            Ok(true) => {
                info!(
                    operation = %event.operation,
                    recipient = %self.recipient,
                    "failure notification sent"
                );
                EscalationOutcome::Sent
            }
            Ok(false) => {
                warn!(
                    operation = %event.operation,
                    attempts = event.attempts,
                    "no sender/recipient configured; failure notification not sent"
                );
                EscalationOutcome::Skipped
            }
            Err(err) => {
                error!(
                    operation = %event.operation,
                    error = %err,
                    "failed to send failure notification"
                );
                EscalationOutcome::Failed(err)
            }
        }
    }
}

pub fn subject(event: &NotificationEvent) -> String {
    format!(
        "Deployment watcher: {} failed after {} attempt(s)",
        event.operation, event.attempts
    )
}

pub fn body(event: &NotificationEvent) -> String {
    format!(
        "Operation: {}\nAttempts: {}\nTime: {}\nLast error: {}\n",
        event.operation,
        event.attempts,
        event.timestamp.format("%Y-%m-%d %H:%M:%S UTC"),
        event.message,
    )
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::types::{BoxFuture, Operation};

    #[derive(Default)]
    struct Outbox {
        fail: bool,
        sent: Mutex<Vec<(String, String, String)>>,
    }

    impl Notifier for Outbox {
        fn send<'a>(
            &'a self,
            sender: &'a str,
            recipient: &'a str,
            subject: &'a str,
            _body: &'a str,
        ) -> BoxFuture<'a, Result<(), NotificationError>> {
            self.sent.lock().unwrap().push((
                sender.to_string(),
                recipient.to_string(),
                subject.to_string(),
            ));
            let res = if self.fail {
                Err(NotificationError("connection refused".to_string()))
            } else {
                Ok(())
            };
            Box::pin(async move { res })
        }
    }

    fn event() -> NotificationEvent {
        NotificationEvent::new(Operation::Deploy, "deploy stage 'up' failed: boom", 3)
    }

    #[tokio::test]
    async fn sends_when_configured() {
        let esc = FailureEscalator::new(Outbox::default(), "deploy@x", "ops@x");
        assert_eq!(esc.escalate(&event()).await, EscalationOutcome::Sent);

        let sent = esc.notifier().sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].1, "ops@x");
        assert_eq!(sent[0].2, "Deployment watcher: deploy failed after 3 attempt(s)");
    }

    #[tokio::test]
    async fn empty_recipient_skips_send() {
        let esc = FailureEscalator::new(Outbox::default(), "deploy@x", "");
        assert_eq!(esc.escalate(&event()).await, EscalationOutcome::Skipped);
        assert!(esc.notifier().sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn empty_sender_skips_send() {
        let esc = FailureEscalator::new(Outbox::default(), "  ", "ops@x");
        assert_eq!(esc.escalate(&event()).await, EscalationOutcome::Skipped);
    }

    #[tokio::test]
    async fn transport_failure_is_swallowed() {
        let outbox = Outbox {
            fail: true,
            ..Outbox::default()
        };
        let esc = FailureEscalator::new(outbox, "deploy@x", "ops@x");

        match esc.escalate(&event()).await {
            EscalationOutcome::Failed(e) => assert!(e.0.contains("refused")),
            other => panic!("expected Failed, got {other:?}"),
        }
        assert!(esc.try_escalate(&event()).await.is_err());
    }

    #[test]
    fn body_mentions_everything() {
        let b = body(&event());
        assert!(b.contains("Operation: deploy"));
        assert!(b.contains("Attempts: 3"));
        assert!(b.contains("boom"));
    }
}
