// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use thiserror::Error;

/// An outgoing email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Email delivery failures.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MailError {
    /// The mail transport could not be reached.
    #[error("Mail transport unavailable: {0}")]
    Unavailable(String),

    /// The message was refused.
    #[error("Mail rejected: {0}")]
    Rejected(String),
}

/// Sends email on behalf of the scheduler.
///
/// Delivery is best effort; callers log failures and carry on.
pub trait Mailer: Send + Sync {
    /// Sends a single message.
    ///
    /// # Errors
    ///
    /// Returns an error if the message could not be delivered.
    fn send(&self, message: &EmailMessage) -> Result<(), MailError>;
}
