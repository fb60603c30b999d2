// src/notify/sendmail.rs

use std::path::PathBuf;

use crate::errors::NotificationError;
use crate::exec::run_command;
use crate::notify::Notifier;
use crate::types::BoxFuture;

/// Hands a plain-text message to a sendmail-compatible program
/// (`sendmail -t -oi`), which reads the recipients from the headers.
#[derive(Debug, Clone)]
pub struct SendmailNotifier {
    program: PathBuf,
}

impl SendmailNotifier {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Notifier for SendmailNotifier {
    fn send<'a>(
        &'a self,
        sender: &'a str,
        recipient: &'a str,
        subject: &'a str,
        body: &'a str,
    ) -> BoxFuture<'a, Result<(), NotificationError>> {
        Box::pin(async move {
            let message = render_message(sender, recipient, subject, body);

            let output = run_command(&self.program, &["-t", "-oi"], None, Some(message.as_bytes()))
                .await
                .map_err(|e| NotificationError(format!("{e:#}")))?;

            if output.success {
                Ok(())
            } else {
                Err(NotificationError(output.failure_message()))
            }
        })
    }
}

/// Minimal RFC 5322 message. Header values are flattened to one line.
pub fn render_message(sender: &str, recipient: &str, subject: &str, body: &str) -> String {
    format!(
        "From: {}\r\nTo: {}\r\nSubject: {}\r\nMIME-Version: 1.0\r\nContent-Type: text/plain; charset=utf-8\r\n\r\n{}\r\n",
        header_value(sender),
        header_value(recipient),
        header_value(subject),
        body.replace("\r\n", "\n").replace('\n', "\r\n"),
    )
}

fn header_value(v: &str) -> String {
    v.split(['\r', '\n'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
