use std::time::{Duration, Instant};

use serde::de::DeserializeOwned;
use ureq::Agent;

use crate::config::ZohoConfig;
use crate::error::{CommissionError, Result};

use super::items::{ItemsCache, ItemsIndex};
use super::payload::{
    InvoiceListPage, InvoicePage, ItemListPage, RawInvoice, RawItem, Salesperson,
    SalespersonListPage,
};
use super::token::TokenCache;

const PER_PAGE: u32 = 200;

/// Filters for the invoice listing. Dates are ISO `YYYY-MM-DD`.
#[derive(Debug, Clone, Default)]
pub struct InvoiceQuery {
    pub salesperson_id: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
    /// Restrict upstream to settled invoices. The engine re-checks
    /// commissionability either way.
    pub paid_only: bool,
}

/// Client for the Zoho Books/Inventory REST APIs: token refresh plus
/// `page_context`-driven pagination over one shared agent.
pub struct ZohoClient {
    agent: Agent,
    config: ZohoConfig,
    tokens: TokenCache,
    items_cache: ItemsCache,
}

impl ZohoClient {
    pub fn new(config: ZohoConfig) -> Result<Self> {
        if config.client_id.trim().is_empty() {
            return Err(CommissionError::MissingCredential("client_id"));
        }
        if config.client_secret.trim().is_empty() {
            return Err(CommissionError::MissingCredential("client_secret"));
        }
        if config.refresh_token.trim().is_empty() {
            return Err(CommissionError::MissingCredential("refresh_token"));
        }
        if config.organization_id.trim().is_empty() {
            return Err(CommissionError::MissingCredential("organization_id"));
        }

        let agent: Agent = Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(30)))
            .build()
            .into();

        Ok(Self {
            agent,
            config,
            tokens: TokenCache::new(),
            items_cache: ItemsCache::new(),
        })
    }

    fn get_parsed<T: DeserializeOwned>(&mut self, url: &str, endpoint: &str) -> Result<T> {
        let token = self.tokens.access_token(&self.agent, &self.config)?;
        let body = self
            .agent
            .get(url)
            .header("Authorization", &format!("Zoho-oauthtoken {token}"))
            .call()?
            .body_mut()
            .read_to_string()?;

        serde_json::from_str(&body).map_err(|e| CommissionError::Api {
            endpoint: endpoint.to_string(),
            detail: e.to_string(),
        })
    }

    /// All invoices matching the query, with line items
    /// (`detailedlist=true`), paged until `has_more_page` goes false.
    pub fn list_invoices(&mut self, query: &InvoiceQuery) -> Result<Vec<RawInvoice>> {
        let mut invoices = Vec::new();
        let mut page = 1;

        loop {
            let url = invoice_list_url(&self.config.api_domain, &self.config.organization_id, query, page);
            let parsed: InvoiceListPage = self.get_parsed(&url, "invoices")?;
            invoices.extend(parsed.invoices);

            if !parsed.page_context.has_more_page {
                break;
            }
            page += 1;
        }

        Ok(invoices)
    }

    /// One invoice by id, with its line items.
    pub fn get_invoice(&mut self, invoice_id: &str) -> Result<RawInvoice> {
        let url = format!(
            "{}/books/v3/invoices/{}?organization_id={}",
            self.config.api_domain, invoice_id, self.config.organization_id
        );
        let parsed: InvoicePage = self.get_parsed(&url, "invoice")?;
        parsed
            .invoice
            .ok_or_else(|| CommissionError::InvoiceNotFound(invoice_id.to_string()))
    }

    /// Every active item in the Inventory catalog.
    pub fn list_items(&mut self) -> Result<Vec<RawItem>> {
        let mut items = Vec::new();
        let mut page = 1;

        loop {
            let url = format!(
                "{}/inventory/v1/items?organization_id={}&page={}&per_page={}&status=active",
                self.config.api_domain, self.config.organization_id, page, PER_PAGE
            );
            let parsed: ItemListPage = self.get_parsed(&url, "items")?;
            items.extend(parsed.items);

            if !parsed.page_context.has_more_page {
                break;
            }
            page += 1;
        }

        Ok(items)
    }

    pub fn list_salespersons(&mut self) -> Result<Vec<Salesperson>> {
        let url = format!(
            "{}/books/v3/salespersons?organization_id={}",
            self.config.api_domain, self.config.organization_id
        );
        let parsed: SalespersonListPage = self.get_parsed(&url, "salespersons")?;
        Ok(parsed.data)
    }

    /// The items index, fetched at most once per cache window.
    pub fn items_index(&mut self) -> Result<ItemsIndex> {
        if let Some(index) = self.items_cache.get(Instant::now()) {
            return Ok(index.clone());
        }

        let items = self.list_items()?;
        let index = ItemsIndex::from_items(items);
        self.items_cache.store(index.clone(), Instant::now());
        Ok(index)
    }
}

fn invoice_list_url(api_domain: &str, org_id: &str, query: &InvoiceQuery, page: u32) -> String {
    let mut url = format!(
        "{api_domain}/books/v3/invoices?organization_id={org_id}&page={page}&per_page={PER_PAGE}\
         &detailedlist=true&sort_column=customer_name&sort_order=A"
    );
    if query.paid_only {
        url.push_str("&status=paid");
    }
    if let Some(id) = &query.salesperson_id {
        url.push_str("&salesperson_id=");
        url.push_str(id);
    }
    if let Some(start) = &query.start {
        url.push_str("&date_start=");
        url.push_str(start);
    }
    if let Some(end) = &query.end {
        url.push_str("&date_end=");
        url.push_str(end);
    }
    url
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ZohoConfig {
        ZohoConfig {
            client_id: "id".to_string(),
            client_secret: "secret".to_string(),
            refresh_token: "token".to_string(),
            organization_id: "42".to_string(),
            api_domain: "https://www.zohoapis.com".to_string(),
            accounts_domain: "https://accounts.zoho.com".to_string(),
        }
    }

    #[test]
    fn missing_credentials_are_rejected_up_front() {
        let mut cfg = config();
        cfg.refresh_token = String::new();
        match ZohoClient::new(cfg) {
            Err(CommissionError::MissingCredential(name)) => assert_eq!(name, "refresh_token"),
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("expected MissingCredential"),
        }
    }

    #[test]
    fn invoice_list_url_carries_filters() {
        let query = InvoiceQuery {
            salesperson_id: Some("777".to_string()),
            start: Some("2025-01-01".to_string()),
            end: Some("2025-01-31".to_string()),
            paid_only: true,
        };
        let url = invoice_list_url("https://www.zohoapis.com", "42", &query, 3);

        assert!(url.starts_with("https://www.zohoapis.com/books/v3/invoices?organization_id=42"));
        assert!(url.contains("page=3"));
        assert!(url.contains("detailedlist=true"));
        assert!(url.contains("status=paid"));
        assert!(url.contains("salesperson_id=777"));
        assert!(url.contains("date_start=2025-01-01"));
        assert!(url.contains("date_end=2025-01-31"));
    }

    #[test]
    fn invoice_list_url_omits_absent_filters() {
        let url = invoice_list_url("https://www.zohoapis.com", "42", &InvoiceQuery::default(), 1);
        assert!(!url.contains("status=paid"));
        assert!(!url.contains("salesperson_id"));
        assert!(!url.contains("date_start"));
    }
}
