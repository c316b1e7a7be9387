use serde::Serialize;

use crate::models::{OrderItem, TicketType};
use crate::utils::AppError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub ticket_type: TicketType,
    pub quantity: u32,
}

/// Ticket-type quantities picked on an event page before ordering.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Cart {
    lines: Vec<CartLine>,
}

/// Item count and price of a cart, both checked against overflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartTotals {
    pub items: u32,
    /// Minor currency units.
    pub price: i64,
}

const CART_TOO_LARGE: &str = "Too many tickets in one order.";

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Setting a quantity of zero removes the line.
    pub fn set_quantity(&mut self, ticket_type: &TicketType, quantity: u32) {
        let existing = self
            .lines
            .iter()
            .position(|line| line.ticket_type.id == ticket_type.id);
        match (existing, quantity) {
            (Some(index), 0) => {
                self.lines.remove(index);
            }
            (Some(index), _) => self.lines[index].quantity = quantity,
            (None, 0) => {}
            (None, _) => self.lines.push(CartLine {
                ticket_type: ticket_type.clone(),
                quantity,
            }),
        }
    }

    /// Add to the quantity already picked for a ticket type.
    pub fn add_quantity(&mut self, ticket_type: &TicketType, quantity: u32) -> Result<(), AppError> {
        let current = self
            .lines
            .iter()
            .find(|line| line.ticket_type.id == ticket_type.id)
            .map_or(0, |line| line.quantity);
        let total = current
            .checked_add(quantity)
            .ok_or_else(|| AppError::ValidationError(CART_TOO_LARGE.to_string()))?;
        self.set_quantity(ticket_type, total);
        Ok(())
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// `None` when the count does not fit a `u32`.
    pub fn total_items(&self) -> Option<u32> {
        self.lines
            .iter()
            .try_fold(0u32, |sum, line| sum.checked_add(line.quantity))
    }

    /// Minor currency units; `None` on overflow.
    pub fn total_price(&self) -> Option<i64> {
        self.lines.iter().try_fold(0i64, |sum, line| {
            line.ticket_type
                .price
                .checked_mul(i64::from(line.quantity))
                .and_then(|subtotal| sum.checked_add(subtotal))
        })
    }

    pub fn totals(&self) -> Result<CartTotals, AppError> {
        match (self.total_items(), self.total_price()) {
            (Some(items), Some(price)) => Ok(CartTotals { items, price }),
            _ => Err(AppError::ValidationError(CART_TOO_LARGE.to_string())),
        }
    }

    /// The order lines, once the cart is non-empty and its totals fit.
    pub fn order_items(&self) -> Result<Vec<OrderItem>, AppError> {
        if self.lines.is_empty() {
            return Err(AppError::ValidationError(
                "Select at least one ticket.".to_string(),
            ));
        }
        self.totals()?;
        Ok(self
            .lines
            .iter()
            .map(|line| OrderItem {
                ticket_type_id: line.ticket_type.id.clone(),
                quantity: line.quantity,
            })
            .collect())
    }
}
