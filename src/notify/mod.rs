// src/notify/mod.rs

//! Operator notification.
//!
//! - [`Notifier`] is the mail transport seam; [`sendmail::SendmailNotifier`]
//!   pipes a message into a local `sendmail`.
//! - [`escalator::FailureEscalator`] turns an exhausted retry sequence into a
//!   single best-effort mail.

pub mod escalator;
pub mod sendmail;

pub use escalator::{EscalationOutcome, FailureEscalator};
pub use sendmail::SendmailNotifier;

use crate::errors::NotificationError;
use crate::types::BoxFuture;

pub trait Notifier: Send + Sync {
    fn send<'a>(
        &'a self,
        sender: &'a str,
        recipient: &'a str,
        subject: &'a str,
        body: &'a str,
    ) -> BoxFuture<'a, Result<(), NotificationError>>;
}
