//! Mock pharmacy cart: flat-priced refill lines and a pretend checkout.
//!
//! Prices are fake and nothing is charged; the point is exercising the
//! order flow end to end. Checkout rules live in `core_state`, which
//! owns the single-checkout-at-a-time flag.

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::config;
use crate::models::MedicationRecord;

#[derive(Debug, Error)]
pub enum CartError {
    #[error("Cart is empty")]
    EmptyCart,

    #[error("Checkout already in progress")]
    CheckoutInFlight,
}

/// One refill line. `cart_quantity` counts refills ordered and has
/// nothing to do with the pills-remaining count on the medication.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CartLineItem {
    pub medication_id: Uuid,
    pub name: String,
    pub dosage: String,
    pub cart_quantity: u32,
    pub unit_price_cents: i64,
}

impl CartLineItem {
    pub fn line_total_cents(&self) -> i64 {
        self.unit_price_cents * i64::from(self.cart_quantity)
    }
}

/// Cart snapshot served to the shop page.
#[derive(Debug, Clone, Serialize)]
pub struct CartView {
    pub items: Vec<CartLineItem>,
    pub total_cents: i64,
    /// Decimal string like "30.00"; the UI adds the currency sign.
    pub total: String,
}

/// Receipt returned by a successful mock checkout.
#[derive(Debug, Clone, Serialize)]
pub struct OrderReceipt {
    pub order_id: Uuid,
    pub total_cents: i64,
    pub total: String,
    /// Total refill units across all lines.
    pub item_count: u32,
    pub placed_at: DateTime<Utc>,
}

/// The cart itself. At most one line per medication; adding the same
/// medication again bumps that line's quantity.
#[derive(Debug, Default)]
pub struct Cart {
    items: Vec<CartLineItem>,
}

impl Cart {
    pub fn items(&self) -> &[CartLineItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn add(&mut self, med: &MedicationRecord) {
        if let Some(line) = self.items.iter_mut().find(|l| l.medication_id == med.id) {
            line.cart_quantity += 1;
            return;
        }
        self.items.push(CartLineItem {
            medication_id: med.id,
            name: med.name.clone(),
            dosage: med.dosage.clone(),
            cart_quantity: 1,
            unit_price_cents: config::UNIT_PRICE_CENTS,
        });
    }

    /// Drop the whole line for a medication. Unknown ids are a no-op;
    /// the remove button can race a checkout that already cleared it.
    pub fn remove(&mut self, medication_id: &Uuid) {
        self.items.retain(|l| l.medication_id != *medication_id);
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn total_cents(&self) -> i64 {
        self.items.iter().map(CartLineItem::line_total_cents).sum()
    }

    /// Refill units across all lines.
    pub fn unit_count(&self) -> u32 {
        self.items.iter().map(|l| l.cart_quantity).sum()
    }

    pub fn view(&self) -> CartView {
        let total_cents = self.total_cents();
        CartView {
            items: self.items.clone(),
            total_cents,
            total: format_cents(total_cents),
        }
    }
}

/// Render cents as a two-decimal string, "1500" becoming "15.00".
pub fn format_cents(cents: i64) -> String {
    format!("{}.{:02}", cents / 100, cents % 100)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Frequency;

    fn med(name: &str) -> MedicationRecord {
        MedicationRecord {
            id: Uuid::new_v4(),
            name: name.to_string(),
            dosage: "10mg".to_string(),
            quantity: 30,
            frequency: Frequency::OnceDaily,
            refills: 0,
        }
    }

    #[test]
    fn adding_same_medication_twice_bumps_quantity() {
        let m = med("Lisinopril");
        let mut cart = Cart::default();

        cart.add(&m);
        cart.add(&m);

        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.items()[0].cart_quantity, 2);
        assert_eq!(cart.total_cents(), 3000);
    }

    #[test]
    fn different_medications_get_separate_lines() {
        let mut cart = Cart::default();
        cart.add(&med("A"));
        cart.add(&med("B"));

        assert_eq!(cart.items().len(), 2);
        assert_eq!(cart.unit_count(), 2);
        assert_eq!(cart.total_cents(), 3000);
    }

    #[test]
    fn line_uses_flat_unit_price() {
        let mut cart = Cart::default();
        cart.add(&med("A"));
        assert_eq!(cart.items()[0].unit_price_cents, 1500);
    }

    #[test]
    fn remove_drops_the_whole_line() {
        let m = med("A");
        let mut cart = Cart::default();
        cart.add(&m);
        cart.add(&m);

        cart.remove(&m.id);
        assert!(cart.is_empty());
    }

    #[test]
    fn remove_unknown_id_is_a_no_op() {
        let mut cart = Cart::default();
        cart.add(&med("A"));
        cart.remove(&Uuid::new_v4());
        assert_eq!(cart.items().len(), 1);
    }

    #[test]
    fn clear_empties_everything() {
        let mut cart = Cart::default();
        cart.add(&med("A"));
        cart.add(&med("B"));
        cart.clear();

        assert!(cart.is_empty());
        assert_eq!(cart.total_cents(), 0);
    }

    #[test]
    fn view_formats_the_total() {
        let m = med("A");
        let mut cart = Cart::default();
        cart.add(&m);
        cart.add(&m);
        cart.add(&med("B"));

        let view = cart.view();
        assert_eq!(view.items.len(), 2);
        assert_eq!(view.total_cents, 4500);
        assert_eq!(view.total, "45.00");
    }

    #[test]
    fn format_cents_pads_to_two_decimals() {
        assert_eq!(format_cents(0), "0.00");
        assert_eq!(format_cents(5), "0.05");
        assert_eq!(format_cents(1500), "15.00");
        assert_eq!(format_cents(4509), "45.09");
        assert_eq!(format_cents(100000), "1000.00");
    }

    #[test]
    fn empty_cart_view() {
        let view = Cart::default().view();
        assert!(view.items.is_empty());
        assert_eq!(view.total, "0.00");
    }
}
