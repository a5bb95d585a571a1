//! Shopping cart state.
//!
//! The cart is an ordered list of lines keyed by product id. Adding a product
//! that is already in the cart bumps its quantity instead of appending a new
//! line. Quantities never drop below 1; removing a line is its own operation.
//!
//! Every mutator is total: an unknown id is a no-op, never an error.

use metafora_core::{Price, Product, ProductId};

/// A product and how many units of it are in the cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartLine {
    product: Product,
    quantity: u32,
}

impl CartLine {
    /// The product on this line.
    #[must_use]
    pub const fn product(&self) -> &Product {
        &self.product
    }

    /// Id of the product on this line.
    #[must_use]
    pub const fn product_id(&self) -> &ProductId {
        &self.product.id
    }

    /// Units of the product, always at least 1.
    #[must_use]
    pub const fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Unit price times quantity.
    #[must_use]
    pub fn total(&self) -> Price {
        self.product.price.times(self.quantity)
    }
}

/// The session's cart.
#[derive(Debug, Clone, Default)]
pub struct CartStore {
    lines: Vec<CartLine>,
}

impl CartStore {
    /// Create an empty cart.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one unit of a product.
    ///
    /// Returns the line's quantity after the add.
    pub fn add(&mut self, product: &Product) -> u32 {
        self.add_quantity(product, 1)
    }

    /// Add `units` of a product in one step.
    ///
    /// Merges into an existing line or appends a new one at the end, keeping
    /// first-insertion order. Adding zero units changes nothing. Returns the
    /// line's quantity afterwards (0 if the product is not in the cart).
    pub fn add_quantity(&mut self, product: &Product, units: u32) -> u32 {
        if units == 0 {
            return self.line(&product.id).map_or(0, CartLine::quantity);
        }

        if let Some(line) = self.line_mut(&product.id) {
            line.quantity = line.quantity.saturating_add(units);
            return line.quantity;
        }

        self.lines.push(CartLine {
            product: product.clone(),
            quantity: units,
        });
        units
    }

    /// Change a line's quantity by `delta`, flooring at 1.
    ///
    /// Decrementing a quantity of 1 leaves it at 1; it does not remove the
    /// line. Returns the new quantity, or `None` if the product is not in
    /// the cart.
    pub fn update_quantity(&mut self, id: &ProductId, delta: i64) -> Option<u32> {
        let line = self.line_mut(id)?;
        let next = i64::from(line.quantity)
            .saturating_add(delta)
            .clamp(1, i64::from(u32::MAX));
        line.quantity = u32::try_from(next).unwrap_or(u32::MAX);
        Some(line.quantity)
    }

    /// Remove a product's line. Returns the removed line, if any.
    pub fn remove(&mut self, id: &ProductId) -> Option<CartLine> {
        let index = self.lines.iter().position(|l| l.product_id() == id)?;
        Some(self.lines.remove(index))
    }

    /// The line for a product, if present.
    #[must_use]
    pub fn line(&self, id: &ProductId) -> Option<&CartLine> {
        self.lines.iter().find(|l| l.product_id() == id)
    }

    fn line_mut(&mut self, id: &ProductId) -> Option<&mut CartLine> {
        self.lines.iter_mut().find(|l| l.product_id() == id)
    }

    /// All lines in first-insertion order.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Sum of every line total.
    #[must_use]
    pub fn total(&self) -> Price {
        self.lines.iter().map(CartLine::total).sum()
    }

    /// Number of units across all lines (not the number of lines).
    #[must_use]
    pub fn count(&self) -> u64 {
        self.lines.iter().map(|l| u64::from(l.quantity)).sum()
    }

    /// Number of distinct lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}
