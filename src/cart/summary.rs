//! Cart summary table

use std::io;

use tabled::{
    builder::Builder,
    settings::{
        Alignment, Style,
        object::{Columns, Rows},
    },
};

use super::Cart;

impl Cart {
    /// Write the cart lines and totals as a table.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to `out` fails.
    pub fn write_to(&self, mut out: impl io::Write) -> io::Result<()> {
        let mut builder = Builder::default();

        builder.push_record(["Item", "SKU", "Unit Price", "Qty", "Line Total"]);

        for line in self.iter() {
            builder.push_record([
                line.product.name.clone(),
                line.product.sku.clone(),
                line.product.price.to_string(),
                line.quantity.to_string(),
                line.line_total().to_string(),
            ]);
        }

        let mut table = builder.build();

        table.with(Style::modern_rounded());
        table.modify(Columns::new(2..), Alignment::right());
        table.modify(Rows::first(), Alignment::center());

        writeln!(out, "{table}")?;

        let rows = [
            ("Subtotal:", self.subtotal().to_string()),
            ("Tax:", self.tax().to_string()),
            ("Shipping:", self.shipping().to_string()),
            ("Total:", self.total().to_string()),
        ];

        let value_width = rows.iter().map(|(_, value)| value.len()).max().unwrap_or(0);

        for (label, value) in rows {
            writeln!(out, " {label:<10}{value:>value_width$}")?;
        }

        writeln!(out, " Items:    {}", self.item_count())
    }
}
