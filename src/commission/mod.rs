mod engine;
mod invoice;
mod report;

pub use engine::{
    calculate_commissions, entity_discount_factor, is_commissionable, line_base_ex_vat,
    resolve_manufacturer, round2, RateConfig,
};
pub use invoice::{EntityDiscount, Invoice, LineDiscount, LineItem};
pub use report::{CommissionReport, CommissionRow, Totals};
