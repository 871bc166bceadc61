use std::collections::HashMap;

use serde::Serialize;

use super::invoice::{EntityDiscount, Invoice, LineDiscount, LineItem};
use super::report::{CommissionReport, CommissionRow, Totals};

/// Commission rates as fractions (0.08 = 8%) plus the distinguished
/// manufacturer they key on. One shared default for every call site:
/// 8% for the distinguished manufacturer, 5% for everyone else.
#[derive(Debug, Clone, Serialize)]
pub struct RateConfig {
    /// Manufacturer that earns `vida`; matched case-insensitively.
    pub manufacturer: String,
    pub vida: f64,
    pub otros: f64,
    /// Tax percent assumed when a line carries none.
    pub iva_fallback: f64,
}

impl Default for RateConfig {
    fn default() -> Self {
        Self {
            manufacturer: "VIDA".to_string(),
            vida: 0.08,
            otros: 0.05,
            iva_fallback: 15.0,
        }
    }
}

/// Round to 2 decimals, half away from zero. Matches the upstream
/// reporting system, which rounds every money value at the point it is
/// computed rather than once at the end.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// An invoice earns commission iff it is paid, is not a credit note, is
/// not voided, and carries positive monetary value.
pub fn is_commissionable(inv: &Invoice) -> bool {
    let status = inv.status.to_lowercase();
    let invoice_type = inv.invoice_type.to_lowercase();

    let is_paid = status == "paid" || inv.balance == Some(0.0);
    let is_credit = status.contains("credit") || invoice_type.contains("credit");
    let is_void = status == "void";
    let non_positive = inv.sub_total.unwrap_or(inv.total) <= 0.0;

    is_paid && !is_credit && !is_void && !non_positive
}

/// Tax-exclusive base of one line: quantity x rate, minus the line
/// discount, with embedded tax stripped when the invoice is
/// tax-inclusive. Discounts apply on the tax-inclusive gross because the
/// upstream system reports `rate` as list price and the discount as a
/// reduction of that price prior to tax stripping.
pub fn line_base_ex_vat(line: &LineItem, inclusive_tax: bool, iva_fallback: f64) -> f64 {
    let mut base = line.quantity * line.rate;

    match line.discount {
        Some(LineDiscount::Amount(amount)) => base -= amount,
        Some(LineDiscount::Percent(percent)) => base -= base * (percent / 100.0),
        None => {}
    }

    let tax_pct = line.tax_percentage.unwrap_or(iva_fallback);
    if inclusive_tax && tax_pct > 0.0 {
        base /= 1.0 + tax_pct / 100.0;
    }

    round2(base).max(0.0)
}

/// Multiplier in (0, 1] for a whole-invoice discount, prorated across all
/// lines. Returns 1 when there is nothing to apply, including the
/// zero-subtotal case for absolute discounts.
pub fn entity_discount_factor(discount: &EntityDiscount, pre_tax_subtotal: f64) -> f64 {
    match *discount {
        EntityDiscount::Percent(percent) if percent > 0.0 => 1.0 - percent / 100.0,
        EntityDiscount::Amount(amount) if amount > 0.0 && pre_tax_subtotal > 0.0 => {
            (pre_tax_subtotal - amount) / pre_tax_subtotal
        }
        _ => 1.0,
    }
}

/// Manufacturer for a line: the lookup wins whenever it has an entry for
/// the line's item id, even an empty one; otherwise the manufacturer
/// embedded on the line, trimmed.
pub fn resolve_manufacturer(
    line: &LineItem,
    lookup: Option<&HashMap<String, String>>,
) -> String {
    if let (Some(map), Some(item_id)) = (lookup, line.item_id.as_deref()) {
        if let Some(manufacturer) = map.get(item_id) {
            return manufacturer.clone();
        }
    }
    line.manufacturer
        .as_deref()
        .map(str::trim)
        .unwrap_or("")
        .to_string()
}

/// Compute commission rows plus grand totals for a batch of invoices.
///
/// Pure and synchronous: rows preserve input order, nothing is mutated,
/// and identical inputs produce identical output. Non-commissionable
/// invoices are skipped entirely; an invoice whose lines all resolve to
/// zero base still yields a row of zeros (a bonified shipment).
pub fn calculate_commissions(
    invoices: &[Invoice],
    manufacturer_lookup: Option<&HashMap<String, String>>,
    rates: &RateConfig,
) -> CommissionReport {
    let vida_upper = rates.manufacturer.to_uppercase();

    let mut rows = Vec::new();
    let mut totals = Totals::default();

    for inv in invoices {
        if !is_commissionable(inv) {
            continue;
        }

        let mut base_vida_pre = 0.0;
        let mut base_otros_pre = 0.0;
        let mut pre_tax_subtotal = 0.0;
        let mut qty_vida = 0.0;
        let mut qty_otros = 0.0;

        for line in &inv.line_items {
            let manufacturer = resolve_manufacturer(line, manufacturer_lookup);
            let base = line_base_ex_vat(line, inv.is_inclusive_tax, rates.iva_fallback);

            pre_tax_subtotal += base;

            if manufacturer.to_uppercase() == vida_upper {
                base_vida_pre += base;
                qty_vida += line.quantity;
            } else {
                base_otros_pre += base;
                qty_otros += line.quantity;
            }
        }

        // Whole-invoice discount scales both buckets by their share of the
        // pre-discount subtotal.
        let factor = entity_discount_factor(&inv.discount, pre_tax_subtotal);
        let base_vida = round2(base_vida_pre * factor);
        let base_otros = round2(base_otros_pre * factor);

        let com_vida = round2(base_vida * rates.vida);
        let com_otros = round2(base_otros * rates.otros);
        let com_total = round2(com_vida + com_otros);

        totals.qty_vida += qty_vida;
        totals.qty_otros += qty_otros;
        totals.base_vida += base_vida;
        totals.com_vida += com_vida;
        totals.base_otros += base_otros;
        totals.com_otros += com_otros;
        totals.com_total += com_total;

        rows.push(CommissionRow {
            invoice_id: inv.id.clone(),
            invoice_number: inv.number.clone(),
            customer_name: inv.customer_name.clone(),
            date: inv.date.clone(),
            paid_date: inv.paid_date.clone(),
            qty_vida,
            qty_otros,
            base_vida,
            com_vida,
            base_otros,
            com_otros,
            com_total,
            status: inv.status.clone(),
        });
    }

    totals.qty_vida = round2(totals.qty_vida);
    totals.qty_otros = round2(totals.qty_otros);
    totals.base_vida = round2(totals.base_vida);
    totals.com_vida = round2(totals.com_vida);
    totals.base_otros = round2(totals.base_otros);
    totals.com_otros = round2(totals.com_otros);
    totals.com_total = round2(totals.com_total);

    CommissionReport { rows, totals }
}
