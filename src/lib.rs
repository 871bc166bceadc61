pub mod commission;
pub mod config;
pub mod error;
pub mod export;
pub mod zoho;

pub use commission::{
    calculate_commissions, CommissionReport, CommissionRow, Invoice, LineItem, RateConfig, Totals,
};
pub use error::{CommissionError, Result};
