//! Integration tests for cart totals across sequences of mutations.
//!
//! The storefront catalog fixture is priced in USD with an 8% tax rate and a
//! $10.00 shipping fee that is waived once the subtotal exceeds $100.00.

use rusty_money::{Money, iso::USD};
use testresult::TestResult;

use cartwheel::prelude::*;

fn store() -> TestResult<CartStore<MemoryStore, Catalog, ManualClock>> {
    let catalog = Catalog::from_file("fixtures/catalog/storefront.yml")?;

    Ok(CartStore::with_collaborators(
        MemoryStore::new(),
        catalog,
        ManualClock::default(),
        NoopObserver,
        CartConfig::default(),
    ))
}

fn assert_totals_consistent(cart: &Cart) {
    let subtotal: i64 = cart
        .iter()
        .map(|line| line.product.price.to_minor_units() * i64::from(line.quantity))
        .sum();

    let tax = (subtotal * 8 + 50) / 100;
    let shipping = if subtotal > 10_000 || cart.is_empty() {
        0
    } else {
        1_000
    };

    assert_eq!(cart.subtotal().to_minor_units(), subtotal, "subtotal");
    assert_eq!(cart.tax().to_minor_units(), tax, "tax");
    assert_eq!(cart.shipping().to_minor_units(), shipping, "shipping");
    assert_eq!(
        cart.total().to_minor_units(),
        subtotal + tax + shipping,
        "total"
    );
}

/// Small deterministic generator so the mutation sequence is reproducible.
struct Lcg(u64);

impl Lcg {
    fn next(&mut self, bound: u64) -> u64 {
        self.0 = self
            .0
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);

        (self.0 >> 33) % bound
    }
}

#[test]
fn totals_stay_consistent_across_mutations() -> TestResult {
    let mut store = store()?;
    let mut rng = Lcg(42);

    for _ in 0..500 {
        let lines = u64::try_from(store.cart().len())?;

        match rng.next(5) {
            0 | 1 => {
                let product = ProductId::new((rng.next(6) + 1).to_string());
                let quantity = u32::try_from(rng.next(3) + 1)?;

                store.add_item(&product, quantity)?;
            }
            2 if lines > 0 => {
                let index = usize::try_from(rng.next(lines))?;
                let line = store.cart().items().get(index).map(|line| line.id);

                store.remove_item(line.ok_or("line missing")?);
            }
            3 if lines > 0 => {
                let index = usize::try_from(rng.next(lines))?;
                let line = store.cart().items().get(index).map(|line| line.id);
                let quantity = i64::try_from(rng.next(6))? - 1;

                store.update_quantity(line.ok_or("line missing")?, quantity);
            }
            4 => {
                if rng.next(10) == 0 {
                    store.clear();
                }
            }
            _ => {}
        }

        assert_totals_consistent(store.cart());
        assert!(
            store.cart().iter().all(|line| line.quantity >= 1),
            "every line has a positive quantity"
        );
    }

    Ok(())
}

#[test]
fn thirty_plus_twenty_pays_shipping() -> TestResult {
    let mut catalog = Catalog::new();
    catalog.insert(Product::new("p1", "Mug", Money::from_minor(3000, USD)))?;
    catalog.insert(Product::new("p2", "Cap", Money::from_minor(2000, USD)))?;

    let mut store = CartStore::with_collaborators(
        MemoryStore::new(),
        catalog,
        ManualClock::default(),
        NoopObserver,
        CartConfig::default(),
    );

    store.add_item(&ProductId::new("p1"), 1)?;
    store.add_item(&ProductId::new("p2"), 1)?;
    store.add_item(&ProductId::new("p2"), 1)?;

    let cart = store.cart();

    assert_eq!(cart.len(), 2);
    assert_eq!(
        cart.line_for_product(&ProductId::new("p2"))
            .map(|line| line.quantity),
        Some(2)
    );
    assert_eq!(cart.subtotal(), Money::from_minor(7000, USD));
    assert_eq!(cart.tax(), Money::from_minor(560, USD));
    assert_eq!(cart.shipping(), Money::from_minor(1000, USD));
    assert_eq!(cart.total(), Money::from_minor(8560, USD));

    Ok(())
}

#[test]
fn merging_up_to_and_past_free_shipping() -> TestResult {
    let mut catalog = Catalog::new();
    catalog.insert(Product::new("p1", "Mug", Money::from_minor(3000, USD)))?;
    catalog.insert(Product::new("p2", "Cap", Money::from_minor(2000, USD)))?;

    let mut store = CartStore::with_collaborators(
        MemoryStore::new(),
        catalog,
        ManualClock::default(),
        NoopObserver,
        CartConfig::default(),
    );

    let mug = store.add_item(&ProductId::new("p1"), 2)?;

    assert_eq!(store.cart().subtotal(), Money::from_minor(6000, USD));
    assert_eq!(store.cart().tax(), Money::from_minor(480, USD));
    assert_eq!(store.cart().shipping(), Money::from_minor(1000, USD));
    assert_eq!(store.cart().total(), Money::from_minor(7480, USD));

    assert_eq!(store.add_item(&ProductId::new("p1"), 1)?, mug);

    assert_eq!(store.cart().len(), 1);
    assert_eq!(store.cart().subtotal(), Money::from_minor(9000, USD));
    assert_eq!(store.cart().tax(), Money::from_minor(720, USD));
    assert_eq!(store.cart().shipping(), Money::from_minor(1000, USD));
    assert_eq!(store.cart().total(), Money::from_minor(10_720, USD));

    store.add_item(&ProductId::new("p2"), 1)?;

    assert_eq!(store.cart().len(), 2);
    assert_eq!(store.cart().subtotal(), Money::from_minor(11_000, USD));
    assert_eq!(store.cart().tax(), Money::from_minor(880, USD));
    assert_eq!(store.cart().shipping(), Money::from_minor(0, USD));
    assert_eq!(store.cart().total(), Money::from_minor(11_880, USD));

    Ok(())
}

#[test]
fn subtotal_over_threshold_ships_free() -> TestResult {
    let mut store = store()?;

    store.add_item(&ProductId::new("1"), 1)?;

    assert_eq!(store.cart().subtotal(), Money::from_minor(19_999, USD));
    assert_eq!(store.cart().shipping(), Money::from_minor(0, USD));
    assert_eq!(store.cart().tax(), Money::from_minor(1600, USD));

    Ok(())
}

#[test]
fn zero_quantity_update_matches_remove() -> TestResult {
    let mut updated = store()?;
    let mut removed = store()?;

    for target in [&mut updated, &mut removed] {
        target.add_item(&ProductId::new("2"), 2)?;
        target.add_item(&ProductId::new("5"), 1)?;
    }

    let updated_line = updated
        .cart()
        .line_for_product(&ProductId::new("2"))
        .map(|line| line.id)
        .ok_or("line missing")?;
    let removed_line = removed
        .cart()
        .line_for_product(&ProductId::new("2"))
        .map(|line| line.id)
        .ok_or("line missing")?;

    assert!(updated.update_quantity(updated_line, 0));
    assert!(removed.remove_item(removed_line));

    assert_eq!(updated.cart().len(), removed.cart().len());
    assert_eq!(updated.cart().totals(), removed.cart().totals());
    assert!(updated.cart().line(updated_line).is_none());

    Ok(())
}

#[test]
fn negative_quantity_removes_line() -> TestResult {
    let mut store = store()?;

    let line = store.add_item(&ProductId::new("3"), 1)?;

    assert!(store.update_quantity(line, -3));
    assert!(store.cart().is_empty());
    assert_totals_consistent(store.cart());

    Ok(())
}

#[test]
fn adding_same_product_merges_lines() -> TestResult {
    let mut store = store()?;

    let first = store.add_item(&ProductId::new("6"), 2)?;
    let second = store.add_item(&ProductId::new("6"), 3)?;

    assert_eq!(first, second);
    assert_eq!(store.cart().len(), 1);
    assert_eq!(store.cart().item_count(), 5);

    Ok(())
}
