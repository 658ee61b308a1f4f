//! Cart Observer

use jiff::SignedDuration;

/// One-way notifications for the view layer (cart drawer, expiry warning).
///
/// Every method has an empty default so an observer only implements the
/// notifications it cares about.
pub trait CartObserver {
    /// An item was added; the cart drawer should be shown.
    fn on_show_cart(&mut self) {}

    /// The session is about to expire.
    ///
    /// # Parameters
    ///
    /// - `remaining`: time left before the cart is cleared
    fn on_expiry_warning(&mut self, _remaining: SignedDuration) {}

    /// The expiry warning should be hidden (session extended or warning dismissed).
    fn on_warning_hidden(&mut self) {}

    /// The session expired and the cart was cleared.
    fn on_cart_expired(&mut self) {}
}

/// Observer that ignores every notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl CartObserver for NoopObserver {}

/// A notification, as captured by [`RecordingObserver`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartNotification {
    /// See [`CartObserver::on_show_cart`]
    ShowCart,

    /// See [`CartObserver::on_expiry_warning`]
    ExpiryWarning(SignedDuration),

    /// See [`CartObserver::on_warning_hidden`]
    WarningHidden,

    /// See [`CartObserver::on_cart_expired`]
    CartExpired,
}

/// Observer that records every notification in order.
#[derive(Debug, Clone, Default)]
pub struct RecordingObserver {
    notifications: Vec<CartNotification>,
}

impl RecordingObserver {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Notifications received so far
    pub fn notifications(&self) -> &[CartNotification] {
        &self.notifications
    }

    /// Take the recorded notifications, leaving the recorder empty.
    pub fn drain(&mut self) -> Vec<CartNotification> {
        std::mem::take(&mut self.notifications)
    }
}

impl CartObserver for RecordingObserver {
    fn on_show_cart(&mut self) {
        self.notifications.push(CartNotification::ShowCart);
    }

    fn on_expiry_warning(&mut self, remaining: SignedDuration) {
        self.notifications
            .push(CartNotification::ExpiryWarning(remaining));
    }

    fn on_warning_hidden(&mut self) {
        self.notifications.push(CartNotification::WarningHidden);
    }

    fn on_cart_expired(&mut self) {
        self.notifications.push(CartNotification::CartExpired);
    }
}
