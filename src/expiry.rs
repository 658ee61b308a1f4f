//! Session expiry
//!
//! The scheduler holds two deadlines derived from the last cart activity: a
//! warning deadline (`timeout - lead` after the activity) and a hard expiry
//! deadline (`timeout` after it). Both live inside a single [`ExpiryState`]
//! value, so re-arming replaces the pair in one assignment and there is never
//! more than one pending expiry.
//!
//! The scheduler does not own a thread or a timer. The host asks it for the
//! [`next_deadline`](ExpiryScheduler::next_deadline) and calls
//! [`poll`](ExpiryScheduler::poll) once that time has passed.

use jiff::{SignedDuration, Timestamp};
use thiserror::Error;
use tracing::debug;

/// Errors building an expiry policy.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExpiryPolicyError {
    /// Timeout must be positive.
    #[error("session timeout must be positive, got {0}")]
    NonPositiveTimeout(SignedDuration),

    /// Warning lead must be positive and shorter than the timeout.
    #[error("warning lead {lead} must be positive and shorter than the timeout {timeout}")]
    InvalidWarningLead {
        /// Requested warning lead
        lead: SignedDuration,
        /// Session timeout
        timeout: SignedDuration,
    },
}

/// How long an idle cart lives, and how early the user is warned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpiryPolicy {
    session_timeout: SignedDuration,
    warning_lead: SignedDuration,
}

impl ExpiryPolicy {
    /// Create a policy.
    ///
    /// # Errors
    ///
    /// Returns an error if the timeout is not positive, or if the warning
    /// lead is not strictly between zero and the timeout.
    pub fn new(
        session_timeout: SignedDuration,
        warning_lead: SignedDuration,
    ) -> Result<Self, ExpiryPolicyError> {
        if !session_timeout.is_positive() {
            return Err(ExpiryPolicyError::NonPositiveTimeout(session_timeout));
        }

        if !warning_lead.is_positive() || warning_lead >= session_timeout {
            return Err(ExpiryPolicyError::InvalidWarningLead {
                lead: warning_lead,
                timeout: session_timeout,
            });
        }

        Ok(Self {
            session_timeout,
            warning_lead,
        })
    }

    /// Idle time after which the cart is cleared
    pub fn session_timeout(&self) -> SignedDuration {
        self.session_timeout
    }

    /// How long before expiry the warning fires
    pub fn warning_lead(&self) -> SignedDuration {
        self.warning_lead
    }

    /// Whether a session whose last activity was at `activity` is still live at `now`.
    pub fn is_live(&self, activity: Timestamp, now: Timestamp) -> bool {
        now.duration_since(activity) < self.session_timeout
    }
}

impl Default for ExpiryPolicy {
    /// 15 minute timeout with a 1 minute warning.
    fn default() -> Self {
        Self {
            session_timeout: SignedDuration::from_mins(15),
            warning_lead: SignedDuration::from_mins(1),
        }
    }
}

/// Scheduler state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpiryState {
    /// No deadlines armed (cart empty).
    Idle,

    /// Both deadlines armed.
    Active {
        /// When the warning fires
        warn_at: Timestamp,
        /// When the cart is cleared
        expires_at: Timestamp,
    },

    /// Warning delivered; only the expiry deadline remains.
    Warning {
        /// When the cart is cleared
        expires_at: Timestamp,
    },
}

/// Something the scheduler wants the cart owner to act on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpiryEvent {
    /// The warning deadline passed.
    Warning {
        /// Time left until expiry
        remaining: SignedDuration,
    },

    /// The session expired; the cart must be cleared.
    Expired,
}

/// Expiry state machine for a single cart session.
#[derive(Debug, Clone)]
pub struct ExpiryScheduler {
    policy: ExpiryPolicy,
    state: ExpiryState,
}

impl ExpiryScheduler {
    /// Create an idle scheduler.
    pub fn new(policy: ExpiryPolicy) -> Self {
        Self {
            policy,
            state: ExpiryState::Idle,
        }
    }

    /// The policy in use
    pub fn policy(&self) -> &ExpiryPolicy {
        &self.policy
    }

    /// Current state
    pub fn state(&self) -> ExpiryState {
        self.state
    }

    /// Cancel any pending deadlines and arm a fresh pair from `activity`.
    pub fn arm(&mut self, activity: Timestamp) {
        let expires_at = activity
            .checked_add(self.policy.session_timeout)
            .unwrap_or(Timestamp::MAX);

        let warn_at = expires_at
            .checked_sub(self.policy.warning_lead)
            .unwrap_or(activity);

        debug!(%warn_at, %expires_at, "armed cart expiry");

        self.state = ExpiryState::Active {
            warn_at,
            expires_at,
        };
    }

    /// Cancel both deadlines.
    pub fn cancel(&mut self) {
        if self.state != ExpiryState::Idle {
            debug!("cancelled cart expiry");
        }

        self.state = ExpiryState::Idle;
    }

    /// The earliest pending deadline, if any.
    pub fn next_deadline(&self) -> Option<Timestamp> {
        match self.state {
            ExpiryState::Idle => None,
            ExpiryState::Active { warn_at, .. } => Some(warn_at),
            ExpiryState::Warning { expires_at } => Some(expires_at),
        }
    }

    /// Advance the state machine to `now`, returning the event that fired.
    ///
    /// A poll that arrives after the expiry deadline skips the warning and
    /// reports [`ExpiryEvent::Expired`] directly.
    pub fn poll(&mut self, now: Timestamp) -> Option<ExpiryEvent> {
        match self.state {
            ExpiryState::Idle => None,
            ExpiryState::Active { expires_at, .. } | ExpiryState::Warning { expires_at }
                if now >= expires_at =>
            {
                self.state = ExpiryState::Idle;

                Some(ExpiryEvent::Expired)
            }
            ExpiryState::Active {
                warn_at,
                expires_at,
            } if now >= warn_at => {
                self.state = ExpiryState::Warning { expires_at };

                Some(ExpiryEvent::Warning {
                    remaining: expires_at.duration_since(now),
                })
            }
            ExpiryState::Active { .. } | ExpiryState::Warning { .. } => None,
        }
    }
}
