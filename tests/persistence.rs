//! Integration tests for persisting and restoring the cart across restarts.

use jiff::{SignedDuration, Timestamp};
use testresult::TestResult;

use cartwheel::prelude::*;

type Store<S> = CartStore<S, Catalog, ManualClock>;

fn open<S: KeyValueStore>(storage: S, clock: &ManualClock) -> TestResult<Store<S>> {
    let catalog = Catalog::from_file("fixtures/catalog/storefront.yml")?;

    Ok(CartStore::with_collaborators(
        storage,
        catalog,
        clock.clone(),
        NoopObserver,
        CartConfig::default(),
    ))
}

fn start() -> ManualClock {
    ManualClock::new(Timestamp::from_second(1_760_000_000).unwrap_or(Timestamp::UNIX_EPOCH))
}

#[test]
fn restart_within_timeout_restores_cart() -> TestResult {
    let dir = tempfile::tempdir()?;
    let clock = start();

    let mut before = open(FileStore::open(dir.path())?, &clock)?;

    before.add_item(&ProductId::new("2"), 2)?;
    before.add_item(&ProductId::new("4"), 1)?;

    let expected = before.cart().clone();
    drop(before);

    clock.advance(SignedDuration::from_mins(10));

    let mut after = open(FileStore::open(dir.path())?, &clock)?;

    assert_eq!(after.restore(), RestoreOutcome::Restored);
    assert_eq!(after.cart().id(), expected.id());
    assert_eq!(after.cart().items(), expected.items());
    assert_eq!(after.cart().totals(), expected.totals());

    Ok(())
}

#[test]
fn restored_session_keeps_remaining_window() -> TestResult {
    let clock = start();
    let mut before = open(MemoryStore::new(), &clock)?;

    before.add_item(&ProductId::new("1"), 1)?;

    clock.advance(SignedDuration::from_mins(10));

    let mut after = open(before.into_storage(), &clock)?;

    assert_eq!(after.restore(), RestoreOutcome::Restored);

    clock.advance(SignedDuration::from_mins(4));

    assert!(matches!(after.tick(), Some(ExpiryEvent::Warning { .. })));

    clock.advance(SignedDuration::from_mins(1));

    assert_eq!(after.tick(), Some(ExpiryEvent::Expired));
    assert!(after.cart().is_empty());

    Ok(())
}

#[test]
fn restart_after_timeout_starts_empty() -> TestResult {
    let dir = tempfile::tempdir()?;
    let clock = start();

    let mut before = open(FileStore::open(dir.path())?, &clock)?;
    before.add_item(&ProductId::new("5"), 3)?;
    drop(before);

    clock.advance(SignedDuration::from_mins(16));

    let storage = FileStore::open(dir.path())?;
    let mut after = open(storage, &clock)?;

    assert_eq!(after.restore(), RestoreOutcome::Expired);
    assert!(after.cart().is_empty());
    assert_eq!(after.storage().get("cart")?, None);

    Ok(())
}

#[test]
fn snapshot_exactly_at_timeout_is_stale() -> TestResult {
    let clock = start();
    let mut before = open(MemoryStore::new(), &clock)?;

    before.add_item(&ProductId::new("5"), 1)?;

    clock.advance(SignedDuration::from_mins(15));

    let mut after = open(before.into_storage(), &clock)?;

    assert_eq!(after.restore(), RestoreOutcome::Expired);

    Ok(())
}

#[test]
fn snapshot_tracks_every_mutation() -> TestResult {
    let clock = start();
    let mut store = open(MemoryStore::new(), &clock)?;

    let line = store.add_item(&ProductId::new("2"), 1)?;
    store.update_quantity(line, 4);

    let json = store.storage().get("cart")?.ok_or("snapshot missing")?;
    let snapshot = PersistedCart::decode(&json)?;

    assert_eq!(snapshot.cart.items.len(), 1);
    assert_eq!(
        snapshot.cart.items.first().map(|item| item.quantity),
        Some(4)
    );
    assert_eq!(snapshot.cart.subtotal, 11_996);
    assert_eq!(snapshot.activity()?, clock.now());

    Ok(())
}

#[test]
fn clear_is_idempotent_and_drops_stale_snapshot() -> TestResult {
    let clock = start();
    let mut storage = MemoryStore::new();
    storage.set("cart", "left over from an old session")?;

    let mut store = open(storage, &clock)?;

    store.clear();

    assert!(store.cart().is_empty());
    assert!(!store.storage().contains_key("cart"));

    store.clear();

    assert!(store.cart().is_empty());
    assert_eq!(store.cart().total().to_minor_units(), 0);

    Ok(())
}

#[test]
fn extend_session_rewrites_snapshot_timestamp() -> TestResult {
    let clock = start();
    let mut store = open(MemoryStore::new(), &clock)?;

    store.add_item(&ProductId::new("3"), 1)?;

    clock.advance(SignedDuration::from_mins(5));
    store.extend_session();

    let json = store.storage().get("cart")?.ok_or("snapshot missing")?;

    assert_eq!(PersistedCart::decode(&json)?.activity()?, clock.now());

    Ok(())
}
