use serde::Serialize;

/// One row per commissionable invoice. Field names follow the JSON the
/// reporting endpoint serves.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CommissionRow {
    pub invoice_id: String,
    pub invoice_number: String,
    pub customer_name: String,
    pub date: String,
    pub paid_date: String,
    pub qty_vida: f64,
    pub qty_otros: f64,
    pub base_vida: f64,
    pub com_vida: f64,
    pub base_otros: f64,
    pub com_otros: f64,
    pub com_total: f64,
    pub status: String,
}

/// Grand totals across all rows, each field independently rounded to two
/// decimals.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct Totals {
    pub qty_vida: f64,
    pub qty_otros: f64,
    pub base_vida: f64,
    pub com_vida: f64,
    pub base_otros: f64,
    pub com_otros: f64,
    pub com_total: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CommissionReport {
    pub rows: Vec<CommissionRow>,
    pub totals: Totals,
}
