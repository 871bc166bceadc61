use serde::Serialize;

/// A normalized invoice, ready for commission calculation.
///
/// Upstream payloads are heterogeneous (status vs. invoice_status vs.
/// current_sub_status, date vs. invoice_date, numbers as strings). All of
/// that is resolved before an `Invoice` is constructed — see
/// `zoho::payload` — so the engine never deals with schema drift.
#[derive(Debug, Clone, Serialize)]
pub struct Invoice {
    pub id: String,
    pub number: String,
    pub customer_name: String,
    /// Issue date as ISO `YYYY-MM-DD`, or empty when the payload had none.
    pub date: String,
    /// Last payment date as ISO `YYYY-MM-DD`, or empty.
    pub paid_date: String,
    pub status: String,
    pub invoice_type: String,
    /// Outstanding balance; `Some(0.0)` marks a settled invoice even when
    /// the status string says otherwise.
    pub balance: Option<f64>,
    pub sub_total: Option<f64>,
    pub total: f64,
    /// When true, line rates already contain tax.
    pub is_inclusive_tax: bool,
    pub discount: EntityDiscount,
    pub line_items: Vec<LineItem>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LineItem {
    pub item_id: Option<String>,
    pub quantity: f64,
    pub rate: f64,
    pub discount: Option<LineDiscount>,
    /// Line tax percent; the engine substitutes the configured fallback
    /// when absent.
    pub tax_percentage: Option<f64>,
    /// Manufacturer embedded on the line, used when the item lookup has no
    /// entry for this item.
    pub manufacturer: Option<String>,
}

/// A line-level discount. Absolute amount and percentage are mutually
/// exclusive; when the payload carries both, the amount wins.
#[derive(Debug, Clone, Copy, Serialize)]
pub enum LineDiscount {
    Amount(f64),
    Percent(f64),
}

/// A whole-invoice ("entity level") discount, prorated across all lines in
/// proportion to their share of the pre-discount subtotal.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub enum EntityDiscount {
    #[default]
    None,
    Percent(f64),
    Amount(f64),
}
