//! Cartwheel prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    cart::{Cart, CartId, CartItem, LineId},
    catalog::{Catalog, CatalogError, CatalogLookup, ProductKey},
    clock::{Clock, ManualClock, SystemClock},
    config::{CartConfig, ConfigError},
    expiry::{ExpiryEvent, ExpiryPolicy, ExpiryPolicyError, ExpiryScheduler, ExpiryState},
    money::{PriceError, parse_percentage, parse_price},
    observer::{CartNotification, CartObserver, NoopObserver, RecordingObserver},
    orders::{Order, OrderId, OrderStatus, PaymentStatus},
    pricing::{CartTotals, PricingRules, compute_totals},
    products::{Product, ProductId},
    snapshot::{PersistedCart, SnapshotError},
    storage::{FileStore, KeyValueStore, MemoryStore, StorageError},
    store::{CartError, CartStore, RestoreOutcome},
};
