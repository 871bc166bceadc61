use std::io::Write;

use crate::commission::CommissionReport;
use crate::error::Result;

/// Write commission rows plus a TOTALS footer as CSV. Money columns carry
/// two decimals; quantities are written as-is.
pub fn write_csv<W: Write>(writer: W, report: &CommissionReport) -> Result<()> {
    let mut out = csv::Writer::from_writer(writer);

    out.write_record([
        "invoice_number",
        "customer_name",
        "date",
        "paid_date",
        "qty_vida",
        "qty_otros",
        "base_vida",
        "com_vida",
        "base_otros",
        "com_otros",
        "com_total",
        "status",
    ])?;

    for row in &report.rows {
        out.write_record([
            row.invoice_number.as_str(),
            row.customer_name.as_str(),
            row.date.as_str(),
            row.paid_date.as_str(),
            &row.qty_vida.to_string(),
            &row.qty_otros.to_string(),
            &format!("{:.2}", row.base_vida),
            &format!("{:.2}", row.com_vida),
            &format!("{:.2}", row.base_otros),
            &format!("{:.2}", row.com_otros),
            &format!("{:.2}", row.com_total),
            row.status.as_str(),
        ])?;
    }

    let totals = &report.totals;
    out.write_record([
        "TOTALS",
        "",
        "",
        "",
        &totals.qty_vida.to_string(),
        &totals.qty_otros.to_string(),
        &format!("{:.2}", totals.base_vida),
        &format!("{:.2}", totals.com_vida),
        &format!("{:.2}", totals.base_otros),
        &format!("{:.2}", totals.com_otros),
        &format!("{:.2}", totals.com_total),
        "",
    ])?;

    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commission::{CommissionRow, Totals};

    fn report() -> CommissionReport {
        CommissionReport {
            rows: vec![CommissionRow {
                invoice_id: "1".to_string(),
                invoice_number: "INV-001".to_string(),
                customer_name: "Farmacia Norte".to_string(),
                date: "2025-02-10".to_string(),
                paid_date: "2025-02-20".to_string(),
                qty_vida: 2.0,
                qty_otros: 0.0,
                base_vida: 100.0,
                com_vida: 8.0,
                base_otros: 0.0,
                com_otros: 0.0,
                com_total: 8.0,
                status: "paid".to_string(),
            }],
            totals: Totals {
                qty_vida: 2.0,
                qty_otros: 0.0,
                base_vida: 100.0,
                com_vida: 8.0,
                base_otros: 0.0,
                com_otros: 0.0,
                com_total: 8.0,
            },
        }
    }

    #[test]
    fn writes_header_rows_and_totals() {
        let mut buf = Vec::new();
        write_csv(&mut buf, &report()).unwrap();
        let csv = String::from_utf8(buf).unwrap();

        let mut lines = csv.lines();
        assert!(lines.next().unwrap().starts_with("invoice_number,customer_name"));
        assert_eq!(
            lines.next().unwrap(),
            "INV-001,Farmacia Norte,2025-02-10,2025-02-20,2,0,100.00,8.00,0.00,0.00,8.00,paid"
        );
        assert_eq!(
            lines.next().unwrap(),
            "TOTALS,,,,2,0,100.00,8.00,0.00,0.00,8.00,"
        );
        assert!(lines.next().is_none());
    }

    #[test]
    fn empty_report_still_has_header_and_totals() {
        let mut buf = Vec::new();
        write_csv(
            &mut buf,
            &CommissionReport {
                rows: vec![],
                totals: Totals::default(),
            },
        )
        .unwrap();
        let csv = String::from_utf8(buf).unwrap();
        assert_eq!(csv.lines().count(), 2);
    }
}
