//! Shopping cart view types.
//!
//! A [`ShoppingCart`] is never stored. It is assembled on every read by
//! joining the user's cart rows with the current product rows, so catalog
//! price and stock changes show up on the next read.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Serialize, Serializer};

use easyshop_core::ProductId;

use super::Product;

/// One line of a cart: the current product plus the stored quantity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShoppingCartItem {
    pub product: Product,
    pub quantity: i32,
    /// Percentage off the line (0-100). No discount engine exists yet, so
    /// items are always built with zero.
    pub discount_percent: Decimal,
}

impl ShoppingCartItem {
    /// Build a line item with no discount.
    #[must_use]
    pub const fn new(product: Product, quantity: i32) -> Self {
        Self {
            product,
            quantity,
            discount_percent: Decimal::ZERO,
        }
    }

    /// Price of the line after discount, rounded to cents.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        let gross = self.product.price * Decimal::from(self.quantity);
        let discount = gross * self.discount_percent / Decimal::ONE_HUNDRED;
        (gross - discount).round_dp(2)
    }
}

impl Serialize for ShoppingCartItem {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct Item<'a> {
            product: &'a Product,
            quantity: i32,
            discount_percent: Decimal,
            line_total: Decimal,
        }

        Item {
            product: &self.product,
            quantity: self.quantity,
            discount_percent: self.discount_percent,
            line_total: self.line_total(),
        }
        .serialize(serializer)
    }
}

/// A user's cart, keyed by product.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShoppingCart {
    items: BTreeMap<ProductId, ShoppingCartItem>,
}

impl ShoppingCart {
    /// Create an empty cart.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Insert a line item, keyed by its product id.
    pub fn add(&mut self, item: ShoppingCartItem) {
        self.items.insert(item.product.id, item);
    }

    /// Look up the line for a product.
    #[must_use]
    pub fn get(&self, product_id: ProductId) -> Option<&ShoppingCartItem> {
        self.items.get(&product_id)
    }

    /// Whether the cart has a line for the product.
    #[must_use]
    pub fn contains(&self, product_id: ProductId) -> bool {
        self.items.contains_key(&product_id)
    }

    /// Quantity stored for a product, zero if absent.
    #[must_use]
    pub fn quantity_of(&self, product_id: ProductId) -> i32 {
        self.get(product_id).map_or(0, |item| item.quantity)
    }

    /// All line items ordered by product id.
    pub fn items(&self) -> impl Iterator<Item = &ShoppingCartItem> {
        self.items.values()
    }

    /// Number of distinct products.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of all line totals.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.items.values().map(ShoppingCartItem::line_total).sum()
    }
}

impl FromIterator<ShoppingCartItem> for ShoppingCart {
    fn from_iter<I: IntoIterator<Item = ShoppingCartItem>>(iter: I) -> Self {
        let mut cart = Self::empty();
        for item in iter {
            cart.add(item);
        }
        cart
    }
}

impl Serialize for ShoppingCart {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct Cart<'a> {
            items: &'a BTreeMap<ProductId, ShoppingCartItem>,
            total: Decimal,
        }

        Cart {
            items: &self.items,
            total: self.total(),
        }
        .serialize(serializer)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use easyshop_core::CategoryId;

    use super::*;

    fn product(id: i32, cents: i64) -> Product {
        Product {
            id: ProductId::new(id),
            name: format!("Product {id}"),
            price: Decimal::new(cents, 2),
            category_id: CategoryId::new(1),
            description: String::new(),
            subcategory: String::new(),
            stock: 10,
            featured: false,
            image_url: String::new(),
        }
    }

    #[test]
    fn test_line_total_without_discount() {
        let item = ShoppingCartItem::new(product(10, 5999), 2);
        assert_eq!(item.discount_percent, Decimal::ZERO);
        assert_eq!(item.line_total(), Decimal::new(11998, 2));
    }

    #[test]
    fn test_line_total_with_discount() {
        let mut item = ShoppingCartItem::new(product(10, 1000), 3);
        item.discount_percent = Decimal::new(10, 0);
        assert_eq!(item.line_total(), Decimal::new(2700, 2));
    }

    #[test]
    fn test_cart_keys_by_product() {
        let cart: ShoppingCart = [
            ShoppingCartItem::new(product(10, 5999), 2),
            ShoppingCartItem::new(product(11, 1000), 1),
        ]
        .into_iter()
        .collect();

        assert_eq!(cart.len(), 2);
        assert_eq!(cart.quantity_of(ProductId::new(10)), 2);
        assert_eq!(cart.quantity_of(ProductId::new(99)), 0);
        assert!(!cart.contains(ProductId::new(99)));
        assert_eq!(cart.total(), Decimal::new(12998, 2));
    }

    #[test]
    fn test_empty_cart() {
        let cart = ShoppingCart::empty();
        assert!(cart.is_empty());
        assert_eq!(cart.total(), Decimal::ZERO);

        let json = serde_json::to_value(&cart).unwrap();
        assert_eq!(json["items"], serde_json::json!({}));
        assert_eq!(json["total"], "0");
    }

    #[test]
    fn test_cart_serializes_items_by_product_id() {
        let cart: ShoppingCart =
            std::iter::once(ShoppingCartItem::new(product(10, 5999), 2)).collect();
        let json = serde_json::to_value(&cart).unwrap();

        let item = &json["items"]["10"];
        assert_eq!(item["quantity"], 2);
        assert_eq!(item["discountPercent"], "0");
        assert_eq!(item["lineTotal"], "119.98");
        assert_eq!(item["product"]["productId"], 10);
        assert_eq!(json["total"], "119.98");
    }
}
