use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::commission::{EntityDiscount, Invoice, LineDiscount, LineItem};

/// Zoho serializes numbers inconsistently: plain numbers, numeric strings,
/// sometimes decorated strings like "5.00%". Anything that does not parse
/// cleanly becomes None so the caller can coerce to zero; nothing ever
/// fails deserialization over a malformed number.
fn flex_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawInvoice {
    #[serde(default)]
    pub invoice_id: String,
    #[serde(default)]
    pub invoice_number: String,
    #[serde(default)]
    pub customer_name: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub invoice_status: String,
    #[serde(default)]
    pub current_sub_status: String,
    #[serde(default)]
    pub invoice_type: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub invoice_date: String,
    #[serde(default)]
    pub last_payment_date: String,
    #[serde(default)]
    pub paid_date: String,
    #[serde(default, deserialize_with = "flex_f64")]
    pub balance: Option<f64>,
    #[serde(default, deserialize_with = "flex_f64")]
    pub sub_total: Option<f64>,
    #[serde(default, deserialize_with = "flex_f64")]
    pub total: Option<f64>,
    #[serde(default)]
    pub is_inclusive_tax: bool,
    #[serde(default)]
    pub discount_type: String,
    #[serde(default, deserialize_with = "flex_f64")]
    pub discount: Option<f64>,
    #[serde(default, deserialize_with = "flex_f64")]
    pub discount_amount: Option<f64>,
    #[serde(default)]
    pub line_items: Vec<RawLineItem>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawLineItem {
    #[serde(default)]
    pub item_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "flex_f64")]
    pub quantity: Option<f64>,
    #[serde(default, deserialize_with = "flex_f64")]
    pub rate: Option<f64>,
    #[serde(default, deserialize_with = "flex_f64")]
    pub discount: Option<f64>,
    #[serde(default, deserialize_with = "flex_f64")]
    pub discount_amount: Option<f64>,
    #[serde(default, deserialize_with = "flex_f64")]
    pub tax_percentage: Option<f64>,
    #[serde(default)]
    pub manufacturer: String,
}

impl RawInvoice {
    /// Collapse the heterogeneous Zoho payload into the strict shape the
    /// engine consumes. Fallback chains: status is invoice_status, then
    /// status, then current_sub_status; issue date is date, then
    /// invoice_date; paid date is last_payment_date, then paid_date.
    pub fn normalize(self) -> Invoice {
        let status = first_non_empty(&[
            self.invoice_status.as_str(),
            self.status.as_str(),
            self.current_sub_status.as_str(),
        ]);
        let date = to_iso_date(first_non_empty(&[
            self.date.as_str(),
            self.invoice_date.as_str(),
        ]));
        let paid_date = to_iso_date(first_non_empty(&[
            self.last_payment_date.as_str(),
            self.paid_date.as_str(),
        ]));

        let discount = if self.discount_type == "entity_level" {
            match (self.discount, self.discount_amount) {
                (Some(pct), _) if pct > 0.0 => EntityDiscount::Percent(pct),
                (_, Some(amount)) if amount > 0.0 => EntityDiscount::Amount(amount),
                _ => EntityDiscount::None,
            }
        } else {
            EntityDiscount::None
        };

        Invoice {
            id: self.invoice_id,
            number: self.invoice_number,
            customer_name: self.customer_name,
            date,
            paid_date,
            status,
            invoice_type: self.invoice_type,
            balance: self.balance,
            sub_total: self.sub_total,
            total: self.total.unwrap_or(0.0),
            is_inclusive_tax: self.is_inclusive_tax,
            discount,
            line_items: self.line_items.into_iter().map(RawLineItem::normalize).collect(),
        }
    }
}

impl RawLineItem {
    fn normalize(self) -> LineItem {
        // Absolute amount wins when the payload carries both forms.
        let discount = match (self.discount_amount, self.discount) {
            (Some(amount), _) => Some(LineDiscount::Amount(amount)),
            (None, Some(pct)) => Some(LineDiscount::Percent(pct)),
            (None, None) => None,
        };

        LineItem {
            item_id: non_empty(self.item_id),
            quantity: self.quantity.unwrap_or(0.0),
            rate: self.rate.unwrap_or(0.0),
            discount,
            tax_percentage: self.tax_percentage,
            manufacturer: non_empty(self.manufacturer),
        }
    }
}

fn first_non_empty(candidates: &[&str]) -> String {
    candidates
        .iter()
        .map(|s| s.trim())
        .find(|s| !s.is_empty())
        .unwrap_or("")
        .to_string()
}

fn non_empty(s: String) -> Option<String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Normalize a Zoho date to ISO `YYYY-MM-DD`, or empty when missing or
/// unparseable. Zoho sends plain dates and occasionally timestamped
/// variants with a compact offset.
fn to_iso_date(raw: String) -> String {
    let raw = raw.trim();
    if raw.is_empty() {
        return String::new();
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date.to_string();
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.date_naive().to_string();
    }
    if let Ok(dt) = DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%z") {
        return dt.date_naive().to_string();
    }
    String::new()
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageContext {
    #[serde(default)]
    pub has_more_page: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct InvoiceListPage {
    #[serde(default)]
    pub invoices: Vec<RawInvoice>,
    #[serde(default)]
    pub page_context: PageContext,
}

#[derive(Debug, Default, Deserialize)]
pub struct InvoicePage {
    pub invoice: Option<RawInvoice>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawItem {
    #[serde(default)]
    pub item_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub manufacturer: String,
    #[serde(default, deserialize_with = "flex_f64")]
    pub weight: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ItemListPage {
    #[serde(default)]
    pub items: Vec<RawItem>,
    #[serde(default)]
    pub page_context: PageContext,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Salesperson {
    #[serde(default)]
    pub salesperson_id: String,
    #[serde(default)]
    pub salesperson_name: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct SalespersonListPage {
    #[serde(default)]
    pub data: Vec<Salesperson>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(value: serde_json::Value) -> RawInvoice {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn numeric_strings_parse_and_garbage_coerces() {
        let inv = raw(json!({
            "invoice_id": "88",
            "sub_total": "250.50",
            "total": 290.0,
            "balance": null,
            "line_items": [
                { "item_id": "A", "quantity": "3", "rate": "10.5", "discount": "5.00%" }
            ]
        }));
        assert_eq!(inv.sub_total, Some(250.50));
        assert_eq!(inv.balance, None);

        let norm = inv.normalize();
        let li = &norm.line_items[0];
        assert_eq!(li.quantity, 3.0);
        assert_eq!(li.rate, 10.5);
        // "5.00%" is not a number; it is dropped, not an error.
        assert!(li.discount.is_none());
    }

    #[test]
    fn missing_numbers_coerce_to_zero() {
        let inv = raw(json!({
            "invoice_id": "1",
            "line_items": [{ "item_id": "A" }]
        }))
        .normalize();
        assert_eq!(inv.total, 0.0);
        assert_eq!(inv.line_items[0].quantity, 0.0);
        assert_eq!(inv.line_items[0].rate, 0.0);
    }

    #[test]
    fn status_fallback_chain() {
        let inv = raw(json!({ "invoice_status": "paid", "status": "sent" })).normalize();
        assert_eq!(inv.status, "paid");

        let inv = raw(json!({ "status": "sent", "current_sub_status": "paid" })).normalize();
        assert_eq!(inv.status, "sent");

        let inv = raw(json!({ "current_sub_status": "paid" })).normalize();
        assert_eq!(inv.status, "paid");
    }

    #[test]
    fn date_fallbacks_and_iso_normalization() {
        let inv = raw(json!({
            "invoice_date": "2025-04-02",
            "last_payment_date": "2025-04-20T08:30:00-0600"
        }))
        .normalize();
        assert_eq!(inv.date, "2025-04-02");
        assert_eq!(inv.paid_date, "2025-04-20");

        let inv = raw(json!({ "date": "not a date" })).normalize();
        assert_eq!(inv.date, "");
        assert_eq!(inv.paid_date, "");
    }

    #[test]
    fn line_discount_amount_wins_over_percent() {
        let inv = raw(json!({
            "line_items": [
                { "item_id": "A", "quantity": 1, "rate": 100, "discount": 10, "discount_amount": 25 }
            ]
        }))
        .normalize();
        match inv.line_items[0].discount {
            Some(LineDiscount::Amount(a)) => assert_eq!(a, 25.0),
            other => panic!("expected amount discount, got {other:?}"),
        }
    }

    #[test]
    fn entity_discount_requires_entity_level_type() {
        let inv = raw(json!({ "discount_type": "item_level", "discount": 10 })).normalize();
        assert!(matches!(inv.discount, EntityDiscount::None));

        let inv = raw(json!({ "discount_type": "entity_level", "discount": 10 })).normalize();
        assert!(matches!(inv.discount, EntityDiscount::Percent(p) if p == 10.0));

        let inv =
            raw(json!({ "discount_type": "entity_level", "discount_amount": 12.5 })).normalize();
        assert!(matches!(inv.discount, EntityDiscount::Amount(a) if a == 12.5));

        // Zero-valued discount descriptors are a no-op.
        let inv = raw(json!({ "discount_type": "entity_level", "discount": 0 })).normalize();
        assert!(matches!(inv.discount, EntityDiscount::None));
    }

    #[test]
    fn empty_item_id_and_manufacturer_become_none() {
        let inv = raw(json!({
            "line_items": [{ "item_id": "", "manufacturer": "  " }]
        }))
        .normalize();
        assert!(inv.line_items[0].item_id.is_none());
        assert!(inv.line_items[0].manufacturer.is_none());
    }

    #[test]
    fn list_page_parses_page_context() {
        let page: InvoiceListPage = serde_json::from_value(json!({
            "invoices": [{ "invoice_id": "1" }],
            "page_context": { "page": 1, "has_more_page": true }
        }))
        .unwrap();
        assert_eq!(page.invoices.len(), 1);
        assert!(page.page_context.has_more_page);

        let last: InvoiceListPage = serde_json::from_value(json!({ "invoices": [] })).unwrap();
        assert!(!last.page_context.has_more_page);
    }
}
