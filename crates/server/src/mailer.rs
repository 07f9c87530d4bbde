// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Mail transport used when no SMTP relay is configured.

use cadence::{EmailMessage, MailError, Mailer};
use tracing::info;

/// Writes every message to the log instead of delivering it.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogMailer;

impl Mailer for LogMailer {
    fn send(&self, message: &EmailMessage) -> Result<(), MailError> {
        if message.to.trim().is_empty() {
            return Err(MailError::Rejected(String::from("empty recipient")));
        }
        info!(
            to = %message.to,
            subject = %message.subject,
            body_len = message.body.len(),
            "Email queued"
        );
        Ok(())
    }
}
