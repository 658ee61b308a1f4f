//! Cart store
//!
//! [`CartStore`] is the single owner of the live cart. Every mutation goes
//! through it, and every mutation leaves three things in step with each other:
//! the cart totals, the persisted snapshot and the expiry deadlines.
//!
//! Persistence is best effort. A failed write is logged and otherwise ignored;
//! the in-memory cart stays authoritative.

use jiff::Timestamp;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::{
    cart::{Cart, LineId},
    catalog::CatalogLookup,
    clock::{Clock, SystemClock},
    config::CartConfig,
    expiry::{ExpiryEvent, ExpiryScheduler, ExpiryState},
    observer::{CartObserver, NoopObserver},
    orders::Order,
    products::ProductId,
    snapshot::PersistedCart,
    storage::KeyValueStore,
};

/// Errors returned by cart operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CartError {
    /// Items must be added at least one at a time.
    #[error("quantity must be at least 1")]
    InvalidQuantity,

    /// The catalog has no product with this id.
    #[error("Product not found: {0}")]
    UnknownProduct(ProductId),

    /// The product is priced in a different currency from the cart.
    #[error("Product {product} is priced in {found}, but the cart uses {expected}")]
    CurrencyMismatch {
        /// Offending product
        product: ProductId,
        /// Cart currency
        expected: &'static str,
        /// Product currency
        found: &'static str,
    },

    /// Checkout needs at least one line.
    #[error("cannot check out an empty cart")]
    EmptyCart,
}

/// What [`CartStore::restore`] found in storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestoreOutcome {
    /// A live snapshot was adopted.
    Restored,

    /// There was no snapshot.
    NotFound,

    /// The snapshot was older than the session timeout and was deleted.
    Expired,

    /// The snapshot could not be used (unreadable, malformed, wrong currency
    /// or empty) and was deleted.
    Discarded,
}

/// Owner of the live cart and its session.
#[derive(Debug)]
pub struct CartStore<S, C, K = SystemClock, O = NoopObserver> {
    storage: S,
    catalog: C,
    clock: K,
    observer: O,
    config: CartConfig,
    cart: Cart,
    last_activity_at: Timestamp,
    expiry: ExpiryScheduler,
    warning_shown: bool,
}

impl<S: KeyValueStore, C: CatalogLookup> CartStore<S, C> {
    /// Create a store with an empty cart, the system clock and no observer.
    pub fn new(storage: S, catalog: C, config: CartConfig) -> Self {
        Self::with_collaborators(storage, catalog, SystemClock, NoopObserver, config)
    }
}

impl<S, C, K, O> CartStore<S, C, K, O>
where
    S: KeyValueStore,
    C: CatalogLookup,
    K: Clock,
    O: CartObserver,
{
    /// Create a store with an empty cart and explicit collaborators.
    pub fn with_collaborators(
        storage: S,
        catalog: C,
        clock: K,
        observer: O,
        config: CartConfig,
    ) -> Self {
        let now = clock.now();
        let expiry = ExpiryScheduler::new(config.expiry);

        Self {
            storage,
            catalog,
            clock,
            observer,
            cart: Cart::new(config.currency, now),
            config,
            last_activity_at: now,
            expiry,
            warning_shown: false,
        }
    }

    /// Add `quantity` units of a catalog product.
    ///
    /// If the cart already has a line for the product its quantity is
    /// increased, otherwise a new line is appended. Returns the line id.
    ///
    /// # Errors
    ///
    /// - [`CartError::InvalidQuantity`] if `quantity` is zero.
    /// - [`CartError::UnknownProduct`] if the catalog has no such product.
    /// - [`CartError::CurrencyMismatch`] if the product is priced in another currency.
    pub fn add_item(&mut self, product_id: &ProductId, quantity: u32) -> Result<LineId, CartError> {
        if quantity == 0 {
            return Err(CartError::InvalidQuantity);
        }

        let product = self
            .catalog
            .product(product_id)
            .ok_or_else(|| CartError::UnknownProduct(product_id.clone()))?;

        let currency = product.price.currency();

        if currency != self.cart.currency() {
            return Err(CartError::CurrencyMismatch {
                product: product_id.clone(),
                expected: self.cart.currency().iso_alpha_code,
                found: currency.iso_alpha_code,
            });
        }

        let now = self.clock.now();
        let line_id = self.cart.add(product, quantity, &self.config.pricing, now);

        debug!(%product_id, quantity, %line_id, "added item to cart");

        self.after_mutation(now);
        self.observer.on_show_cart();

        Ok(line_id)
    }

    /// Remove a line. Returns `false`, and changes nothing, if there is no such line.
    pub fn remove_item(&mut self, line_id: LineId) -> bool {
        let now = self.clock.now();

        if !self.cart.remove(line_id, &self.config.pricing, now) {
            return false;
        }

        debug!(%line_id, "removed item from cart");

        self.after_mutation(now);

        true
    }

    /// Set a line's quantity.
    ///
    /// A quantity of zero or less removes the line, exactly as
    /// [`remove_item`](Self::remove_item) does. Returns `false`, and changes
    /// nothing, if there is no such line.
    pub fn update_quantity(&mut self, line_id: LineId, quantity: i64) -> bool {
        if quantity <= 0 {
            return self.remove_item(line_id);
        }

        let quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
        let now = self.clock.now();

        if !self
            .cart
            .set_quantity(line_id, quantity, &self.config.pricing, now)
        {
            return false;
        }

        debug!(%line_id, quantity, "updated cart item quantity");

        self.after_mutation(now);

        true
    }

    /// Empty the cart, delete the persisted snapshot and cancel expiry.
    ///
    /// The snapshot is deleted even if the cart was already empty.
    pub fn clear(&mut self) {
        let now = self.clock.now();

        self.cart.clear(&self.config.pricing, now);
        self.expiry.cancel();
        self.hide_warning();
        self.forget();

        debug!(cart_id = %self.cart.id(), "cleared cart");
    }

    /// Reset the activity clock and push the expiry deadlines out from it.
    ///
    /// Hides the expiry warning if it is showing. Does not change the lines.
    pub fn extend_session(&mut self) {
        let now = self.clock.now();

        self.last_activity_at = now;

        if !self.cart.is_empty() {
            self.expiry.arm(now);
            self.persist();
        }

        debug!(%now, "extended cart session");

        self.hide_warning();
    }

    /// Hide the expiry warning without extending the session.
    ///
    /// The expiry deadline is left in place and the cart is still cleared
    /// when it passes.
    pub fn dismiss_warning(&mut self) {
        self.hide_warning();
    }

    /// Load the persisted snapshot, if it is still within the session timeout.
    ///
    /// A live snapshot replaces the current cart and the expiry deadlines are
    /// armed from the snapshot's activity time, or from now if that time lies
    /// in the future. Expired or unusable snapshots
    /// are deleted and the cart is left empty.
    pub fn restore(&mut self) -> RestoreOutcome {
        let now = self.clock.now();
        let key = self.config.storage_key.clone();

        let json = match self.storage.get(&key) {
            Ok(Some(json)) => json,
            Ok(None) => return RestoreOutcome::NotFound,
            Err(err) => {
                warn!(error = %err, %key, "failed to read cart snapshot");

                return RestoreOutcome::Discarded;
            }
        };

        let snapshot = match PersistedCart::decode(&json) {
            Ok(snapshot) => snapshot,
            Err(err) => return self.discard_snapshot(&err),
        };

        let activity = match snapshot.activity() {
            Ok(activity) => activity,
            Err(err) => return self.discard_snapshot(&err),
        };

        // A snapshot stamped in the future never extends the session past now.
        if activity > now {
            debug!(%activity, %now, "cart snapshot stamped in the future");
        }

        let activity = activity.min(now);

        if !self.config.expiry.is_live(activity, now) {
            info!(%activity, "cart snapshot expired");

            self.reset_cart(now);
            self.forget();

            return RestoreOutcome::Expired;
        }

        let cart = match snapshot.into_cart(&self.config.pricing) {
            Ok(cart) => cart,
            Err(err) => return self.discard_snapshot(&err),
        };

        if cart.currency() != self.config.currency || cart.is_empty() {
            debug!(
                currency = cart.currency().iso_alpha_code,
                lines = cart.len(),
                "discarding unusable cart snapshot"
            );

            self.reset_cart(now);
            self.forget();

            return RestoreOutcome::Discarded;
        }

        info!(cart_id = %cart.id(), lines = cart.len(), "restored cart");

        self.cart = cart;
        self.last_activity_at = activity;
        self.expiry.arm(activity);
        self.hide_warning();

        RestoreOutcome::Restored
    }

    /// Fire any expiry deadline that has passed.
    ///
    /// Hosts call this whenever [`next_deadline`](Self::next_deadline) has
    /// been reached (or simply on a regular interval). Returns the event that
    /// fired, if any.
    pub fn tick(&mut self) -> Option<ExpiryEvent> {
        let now = self.clock.now();
        let event = self.expiry.poll(now)?;

        match event {
            ExpiryEvent::Warning { remaining } => {
                info!(remaining_secs = remaining.as_secs(), "cart about to expire");

                self.warning_shown = true;
                self.observer.on_expiry_warning(remaining);
            }
            ExpiryEvent::Expired => {
                info!(cart_id = %self.cart.id(), "cart session expired");

                self.clear();
                self.observer.on_cart_expired();
            }
        }

        Some(event)
    }

    /// Place an order for the cart's contents and clear the cart.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::EmptyCart`] if there is nothing to order.
    pub fn checkout(&mut self) -> Result<Order, CartError> {
        if self.cart.is_empty() {
            return Err(CartError::EmptyCart);
        }

        let order = Order::from_cart(&self.cart, self.clock.now());

        info!(order_id = %order.id, total = %order.total, "checked out cart");

        self.clear();

        Ok(order)
    }

    /// The live cart
    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    /// Time of the last mutation or session extension
    pub fn last_activity_at(&self) -> Timestamp {
        self.last_activity_at
    }

    /// Expiry state machine state
    pub fn expiry_state(&self) -> ExpiryState {
        self.expiry.state()
    }

    /// When [`tick`](Self::tick) next has something to do, if ever.
    pub fn next_deadline(&self) -> Option<Timestamp> {
        self.expiry.next_deadline()
    }

    /// Whether the expiry warning is currently showing.
    pub fn is_warning_shown(&self) -> bool {
        self.warning_shown
    }

    /// Configuration in use
    pub fn config(&self) -> &CartConfig {
        &self.config
    }

    /// The storage collaborator
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Mutable access to the storage collaborator
    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    /// The catalog collaborator
    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    /// The observer
    pub fn observer(&self) -> &O {
        &self.observer
    }

    /// Mutable access to the observer
    pub fn observer_mut(&mut self) -> &mut O {
        &mut self.observer
    }

    /// Tear the store down, returning its storage so it can be reopened.
    pub fn into_storage(self) -> S {
        self.storage
    }

    fn after_mutation(&mut self, now: Timestamp) {
        self.last_activity_at = now;
        self.hide_warning();

        if self.cart.is_empty() {
            self.expiry.cancel();
            self.forget();
        } else {
            self.expiry.arm(now);
            self.persist();
        }
    }

    fn hide_warning(&mut self) {
        if self.warning_shown {
            self.warning_shown = false;
            self.observer.on_warning_hidden();
        }
    }

    fn reset_cart(&mut self, now: Timestamp) {
        self.cart = Cart::new(self.config.currency, now);
        self.expiry.cancel();
        self.hide_warning();
    }

    fn discard_snapshot(&mut self, err: &dyn std::error::Error) -> RestoreOutcome {
        warn!(error = %err, "discarding unreadable cart snapshot");

        self.reset_cart(self.clock.now());
        self.forget();

        RestoreOutcome::Discarded
    }

    fn persist(&mut self) {
        let key = &self.config.storage_key;

        let json = match PersistedCart::capture(&self.cart, self.last_activity_at).encode() {
            Ok(json) => json,
            Err(err) => {
                warn!(error = %err, %key, "failed to encode cart snapshot");

                return;
            }
        };

        if let Err(err) = self.storage.set(key, &json) {
            warn!(error = %err, %key, "failed to persist cart snapshot");
        }
    }

    fn forget(&mut self) {
        let key = &self.config.storage_key;

        if let Err(err) = self.storage.remove(key) {
            warn!(error = %err, %key, "failed to delete cart snapshot");
        }
    }
}
