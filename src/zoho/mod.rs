mod client;
mod items;
pub mod payload;
mod token;

pub use client::{InvoiceQuery, ZohoClient};
pub use items::{ItemsCache, ItemsIndex, ITEMS_CACHE_TTL};
pub use payload::{RawInvoice, RawItem, Salesperson};
pub use token::TokenCache;
