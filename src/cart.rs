//! Cart

use jiff::Timestamp;
use rusty_money::{Money, iso::Currency};

use crate::{
    ids::TypedUuid,
    pricing::{CartTotals, PricingRules, compute_totals},
    products::{Product, ProductId},
};

mod summary;

/// Cart Id
pub type CartId = TypedUuid<Cart>;

/// Cart line Id. Unique per line, not per product.
pub type LineId = TypedUuid<CartItem>;

/// One row in the cart, pairing a product snapshot with a quantity.
#[derive(Debug, Clone, PartialEq)]
pub struct CartItem {
    /// Line id
    pub id: LineId,

    /// Catalog product this line refers to
    pub product_id: ProductId,

    /// Product data as it was when the line was added
    pub product: Product,

    /// Always at least 1
    pub quantity: u32,
}

impl CartItem {
    /// Unit price × quantity.
    pub fn line_total(&self) -> Money<'static, Currency> {
        let minor = self
            .product
            .price
            .to_minor_units()
            .saturating_mul(i64::from(self.quantity));

        Money::from_minor(minor, self.product.price.currency())
    }
}

/// Cart
///
/// Lines keep their insertion order. The monetary totals are private and only
/// ever replaced as a whole by [`compute_totals`] after the lines change.
#[derive(Debug, Clone, PartialEq)]
pub struct Cart {
    id: CartId,
    currency: &'static Currency,
    items: Vec<CartItem>,
    totals: CartTotals<'static>,
    created_at: Timestamp,
    updated_at: Timestamp,
}

impl Cart {
    /// Create an empty cart.
    pub fn new(currency: &'static Currency, now: Timestamp) -> Self {
        Self {
            id: CartId::new(),
            currency,
            items: Vec::new(),
            totals: CartTotals::zero(currency),
            created_at: now,
            updated_at: now,
        }
    }

    /// Rebuild a cart from stored parts, recomputing its totals.
    pub(crate) fn from_parts(
        id: CartId,
        currency: &'static Currency,
        items: Vec<CartItem>,
        created_at: Timestamp,
        updated_at: Timestamp,
        rules: &PricingRules,
    ) -> Self {
        let totals = compute_totals(&items, rules, currency);

        Self {
            id,
            currency,
            items,
            totals,
            created_at,
            updated_at,
        }
    }

    /// Add `quantity` of a product, merging into the existing line for that
    /// product if there is one. Returns the id of the affected line.
    pub(crate) fn add(
        &mut self,
        product: Product,
        quantity: u32,
        rules: &PricingRules,
        now: Timestamp,
    ) -> LineId {
        let line_id = if let Some(line) = self
            .items
            .iter_mut()
            .find(|line| line.product_id == product.id)
        {
            line.quantity = line.quantity.saturating_add(quantity);
            line.id
        } else {
            let line = CartItem {
                id: LineId::new(),
                product_id: product.id.clone(),
                product,
                quantity,
            };
            let id = line.id;

            self.items.push(line);
            id
        };

        self.touch(rules, now);

        line_id
    }

    /// Remove a line. Returns `false` if there was no such line.
    pub(crate) fn remove(
        &mut self,
        line_id: LineId,
        rules: &PricingRules,
        now: Timestamp,
    ) -> bool {
        let before = self.items.len();

        self.items.retain(|line| line.id != line_id);

        if self.items.len() == before {
            return false;
        }

        self.touch(rules, now);

        true
    }

    /// Set a line's quantity. Returns `false` if there was no such line.
    pub(crate) fn set_quantity(
        &mut self,
        line_id: LineId,
        quantity: u32,
        rules: &PricingRules,
        now: Timestamp,
    ) -> bool {
        let Some(line) = self.items.iter_mut().find(|line| line.id == line_id) else {
            return false;
        };

        line.quantity = quantity;

        self.touch(rules, now);

        true
    }

    /// Drop every line.
    pub(crate) fn clear(&mut self, rules: &PricingRules, now: Timestamp) {
        self.items.clear();
        self.touch(rules, now);
    }

    fn touch(&mut self, rules: &PricingRules, now: Timestamp) {
        self.totals = compute_totals(&self.items, rules, self.currency);
        self.updated_at = now;
    }

    /// Cart id
    pub fn id(&self) -> CartId {
        self.id
    }

    /// Currency every line is priced in
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }

    /// Lines in insertion order
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Iterate over the lines in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &CartItem> {
        self.items.iter()
    }

    /// Find a line by id.
    pub fn line(&self, line_id: LineId) -> Option<&CartItem> {
        self.items.iter().find(|line| line.id == line_id)
    }

    /// Find the line holding a product.
    pub fn line_for_product(&self, product_id: &ProductId) -> Option<&CartItem> {
        self.items.iter().find(|line| &line.product_id == product_id)
    }

    /// All derived totals
    pub fn totals(&self) -> &CartTotals<'static> {
        &self.totals
    }

    /// Sum of price × quantity
    pub fn subtotal(&self) -> Money<'static, Currency> {
        self.totals.subtotal
    }

    /// Tax on the subtotal
    pub fn tax(&self) -> Money<'static, Currency> {
        self.totals.tax
    }

    /// Shipping charge
    pub fn shipping(&self) -> Money<'static, Currency> {
        self.totals.shipping
    }

    /// Grand total
    pub fn total(&self) -> Money<'static, Currency> {
        self.totals.total
    }

    /// Number of units across all lines.
    pub fn item_count(&self) -> u64 {
        self.items.iter().map(|line| u64::from(line.quantity)).sum()
    }

    /// Number of lines.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if the cart has no lines.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// When the cart was created
    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    /// When the lines last changed
    pub fn updated_at(&self) -> Timestamp {
        self.updated_at
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::USD;

    use super::*;

    fn product(id: &str, price_minor: i64) -> Product {
        Product::new(id, id.to_uppercase(), Money::from_minor(price_minor, USD))
    }

    #[test]
    fn new_cart_is_empty_with_zero_totals() {
        let cart = Cart::new(USD, Timestamp::UNIX_EPOCH);

        assert!(cart.is_empty());
        assert_eq!(cart.item_count(), 0);
        assert_eq!(cart.totals(), &CartTotals::zero(USD));
    }

    #[test]
    fn add_merges_lines_for_the_same_product() {
        let rules = PricingRules::default();
        let mut cart = Cart::new(USD, Timestamp::UNIX_EPOCH);

        let first = cart.add(product("p1", 3000), 2, &rules, Timestamp::UNIX_EPOCH);
        let second = cart.add(product("p1", 3000), 1, &rules, Timestamp::UNIX_EPOCH);

        assert_eq!(first, second);
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.line(first).map(|line| line.quantity), Some(3));
        assert_eq!(cart.subtotal(), Money::from_minor(9000, USD));
    }

    #[test]
    fn lines_keep_insertion_order_across_updates() {
        let rules = PricingRules::default();
        let now = Timestamp::UNIX_EPOCH;
        let mut cart = Cart::new(USD, now);

        let a = cart.add(product("a", 100), 1, &rules, now);
        cart.add(product("b", 200), 1, &rules, now);
        cart.set_quantity(a, 5, &rules, now);
        cart.add(product("c", 300), 1, &rules, now);

        let ids: Vec<&str> = cart.iter().map(|line| line.product_id.as_str()).collect();

        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn remove_missing_line_reports_false() {
        let rules = PricingRules::default();
        let mut cart = Cart::new(USD, Timestamp::UNIX_EPOCH);

        cart.add(product("a", 100), 1, &rules, Timestamp::UNIX_EPOCH);

        assert!(!cart.remove(LineId::new(), &rules, Timestamp::UNIX_EPOCH));
        assert_eq!(cart.len(), 1);
    }

    #[test]
    fn item_count_sums_quantities() {
        let rules = PricingRules::default();
        let now = Timestamp::UNIX_EPOCH;
        let mut cart = Cart::new(USD, now);

        cart.add(product("a", 100), 2, &rules, now);
        cart.add(product("b", 100), 3, &rules, now);

        assert_eq!(cart.item_count(), 5);
    }

    #[test]
    fn line_total_multiplies_price_by_quantity() {
        let line = CartItem {
            id: LineId::new(),
            product_id: ProductId::new("a"),
            product: product("a", 1250),
            quantity: 3,
        };

        assert_eq!(line.line_total(), Money::from_minor(3750, USD));
    }
}
