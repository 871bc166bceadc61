mod commission;
mod config;
mod error;
mod export;
mod zoho;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tabled::{settings::Style, Table, Tabled};

use crate::commission::{calculate_commissions, CommissionReport, CommissionRow, RateConfig};
use crate::config::{config_dir, load_config, CommissionConfig, Config, CONFIG_TEMPLATE};
use crate::error::{CommissionError, Result};
use crate::zoho::{InvoiceQuery, RawInvoice, ZohoClient};

#[derive(Parser)]
#[command(name = "comisiones")]
#[command(version, about = "Sales commission reporting for Zoho Books/Inventory", long_about = None)]
struct Cli {
    /// Path to config directory (default: ~/.comisiones or XDG config)
    #[arg(short = 'C', long, global = true)]
    config_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize config directory with a credentials template
    Init,

    /// Compute the commission report over paid invoices
    Report {
        /// Restrict to one salesperson (id from 'salespersons')
        #[arg(short, long)]
        salesperson: Option<String>,

        /// Include invoices from this date (YYYY-MM-DD)
        #[arg(long)]
        from: Option<String>,

        /// Include invoices up to this date (YYYY-MM-DD)
        #[arg(long)]
        to: Option<String>,

        /// Commission percent for the distinguished manufacturer (e.g. 8)
        #[arg(long, value_name = "PCT")]
        rate_vida: Option<f64>,

        /// Commission percent for every other manufacturer (e.g. 5)
        #[arg(long, value_name = "PCT")]
        rate_otros: Option<f64>,

        /// Print the report as JSON ({ rows, totals, rates })
        #[arg(long)]
        json: bool,

        /// Export rows and totals as CSV to this path
        #[arg(long, value_name = "PATH")]
        csv: Option<PathBuf>,
    },

    /// List salespersons
    Salespersons,

    /// List invoice summaries
    Invoices {
        /// Number of invoices to show (default: all)
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Show one invoice with its total shipping weight
    Invoice {
        /// Invoice id
        invoice: String,
    },
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let cfg_dir = match cli.config_dir {
        Some(p) => p,
        None => config_dir()?,
    };

    match cli.command {
        Commands::Init => cmd_init(&cfg_dir),
        Commands::Report {
            salesperson,
            from,
            to,
            rate_vida,
            rate_otros,
            json,
            csv,
        } => cmd_report(&cfg_dir, salesperson, from, to, rate_vida, rate_otros, json, csv),
        Commands::Salespersons => cmd_salespersons(&cfg_dir),
        Commands::Invoices { limit } => cmd_invoices(&cfg_dir, limit),
        Commands::Invoice { invoice } => cmd_invoice(&cfg_dir, &invoice),
    }
}

/// Initialize config directory with the credentials template
fn cmd_init(cfg_dir: &PathBuf) -> Result<()> {
    use std::fs;

    if cfg_dir.exists() {
        return Err(CommissionError::AlreadyInitialized(cfg_dir.clone()));
    }

    fs::create_dir_all(cfg_dir)?;
    fs::write(cfg_dir.join("config.toml"), CONFIG_TEMPLATE)?;

    println!("Initialized comisiones config at: {}", cfg_dir.display());
    println!();
    println!("Next steps:");
    println!(
        "  1. Add your Zoho credentials:  $EDITOR {}/config.toml",
        cfg_dir.display()
    );
    println!("  2. Run your first report:      comisiones report --from 2025-01-01");

    Ok(())
}

fn load_workspace(cfg_dir: &PathBuf) -> Result<Config> {
    if !cfg_dir.exists() {
        return Err(CommissionError::ConfigNotFound(cfg_dir.clone()));
    }
    load_config(cfg_dir)
}

/// Validate an ISO date argument without reinterpreting it.
fn parse_date_arg(value: Option<String>) -> Result<Option<String>> {
    match value {
        None => Ok(None),
        Some(s) => match chrono::NaiveDate::parse_from_str(&s, "%Y-%m-%d") {
            Ok(_) => Ok(Some(s)),
            Err(_) => Err(CommissionError::InvalidDate(s)),
        },
    }
}

/// A human percentage (8 means 8%) as a fraction, the flag overriding the
/// configured value.
fn rate_fraction(flag: Option<f64>, configured_pct: f64) -> Result<f64> {
    let pct = flag.unwrap_or(configured_pct);
    if !pct.is_finite() || !(0.0..=100.0).contains(&pct) {
        return Err(CommissionError::InvalidRate(pct.to_string()));
    }
    Ok(pct / 100.0)
}

fn rates_from(settings: &CommissionConfig, rate_vida: Option<f64>, rate_otros: Option<f64>) -> Result<RateConfig> {
    Ok(RateConfig {
        manufacturer: settings.manufacturer.clone(),
        vida: rate_fraction(rate_vida, settings.rate_vida)?,
        otros: rate_fraction(rate_otros, settings.rate_otros)?,
        iva_fallback: settings.iva_default,
    })
}

// Table row structs for tabled
#[derive(Tabled)]
struct ReportTableRow {
    #[tabled(rename = "NUMBER")]
    number: String,
    #[tabled(rename = "CUSTOMER")]
    customer: String,
    #[tabled(rename = "DATE")]
    date: String,
    #[tabled(rename = "PAID")]
    paid: String,
    #[tabled(rename = "QTY V")]
    qty_vida: String,
    #[tabled(rename = "QTY O")]
    qty_otros: String,
    #[tabled(rename = "BASE VIDA")]
    base_vida: String,
    #[tabled(rename = "COM VIDA")]
    com_vida: String,
    #[tabled(rename = "BASE OTROS")]
    base_otros: String,
    #[tabled(rename = "COM OTROS")]
    com_otros: String,
    #[tabled(rename = "TOTAL")]
    com_total: String,
    #[tabled(rename = "STATUS")]
    status: String,
}

#[derive(Tabled)]
struct SalespersonRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "NAME")]
    name: String,
}

#[derive(Tabled)]
struct InvoiceSummaryRow {
    #[tabled(rename = "NUMBER")]
    number: String,
    #[tabled(rename = "DATE")]
    date: String,
    #[tabled(rename = "STATUS")]
    status: String,
    #[tabled(rename = "TOTAL")]
    total: String,
}

#[derive(Tabled)]
struct LineTableRow {
    #[tabled(rename = "ITEM")]
    item: String,
    #[tabled(rename = "QTY")]
    quantity: String,
    #[tabled(rename = "RATE")]
    rate: String,
}

/// A row whose bases and commission are all zero is a bonified (free)
/// shipment; flag it next to the status the way the report page did.
fn display_status(row: &CommissionRow) -> String {
    if row.com_total == 0.0 && row.base_vida == 0.0 && row.base_otros == 0.0 {
        format!("{} (bonificada)", row.status)
    } else {
        row.status.clone()
    }
}

fn fmt_qty(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

/// Compute the commission report over paid invoices
#[allow(clippy::too_many_arguments)]
fn cmd_report(
    cfg_dir: &PathBuf,
    salesperson: Option<String>,
    from: Option<String>,
    to: Option<String>,
    rate_vida: Option<f64>,
    rate_otros: Option<f64>,
    json: bool,
    csv: Option<PathBuf>,
) -> Result<()> {
    let config = load_workspace(cfg_dir)?;
    let rates = rates_from(&config.commission, rate_vida, rate_otros)?;

    let query = InvoiceQuery {
        salesperson_id: salesperson,
        start: parse_date_arg(from)?,
        end: parse_date_arg(to)?,
        paid_only: true,
    };

    let mut client = ZohoClient::new(config.zoho)?;
    let items = client.items_index()?;
    let invoices: Vec<_> = client
        .list_invoices(&query)?
        .into_iter()
        .map(RawInvoice::normalize)
        .collect();

    let report = calculate_commissions(&invoices, Some(items.manufacturers()), &rates);

    if let Some(path) = &csv {
        let file = std::fs::File::create(path)?;
        export::write_csv(file, &report)?;
        println!("Exported {} rows to {}", report.rows.len(), path.display());
    }

    if json {
        let payload = serde_json::json!({
            "rows": report.rows,
            "totals": report.totals,
            "rates": { "vida": rates.vida, "otros": rates.otros },
        });
        println!("{}", serde_json::to_string_pretty(&payload).unwrap_or_default());
        return Ok(());
    }

    if report.rows.is_empty() {
        println!("No commissionable invoices found for the given filters.");
        return Ok(());
    }

    print_report_table(&report, &rates);
    Ok(())
}

fn print_report_table(report: &CommissionReport, rates: &RateConfig) {
    let rows: Vec<ReportTableRow> = report
        .rows
        .iter()
        .map(|r| ReportTableRow {
            number: r.invoice_number.clone(),
            customer: r.customer_name.clone(),
            date: r.date.clone(),
            paid: r.paid_date.clone(),
            qty_vida: fmt_qty(r.qty_vida),
            qty_otros: fmt_qty(r.qty_otros),
            base_vida: format!("{:.2}", r.base_vida),
            com_vida: format!("{:.2}", r.com_vida),
            base_otros: format!("{:.2}", r.base_otros),
            com_otros: format!("{:.2}", r.com_otros),
            com_total: format!("{:.2}", r.com_total),
            status: display_status(r),
        })
        .collect();

    let table = Table::new(rows).with(Style::rounded()).to_string();
    println!("{table}");

    let totals = &report.totals;
    println!();
    println!(
        "Rates: {} {:.2}% / otros {:.2}%",
        rates.manufacturer,
        rates.vida * 100.0,
        rates.otros * 100.0
    );
    println!("Totals over {} invoices:", report.rows.len());
    println!(
        "  {}: qty {}  base {:.2}  commission {:.2}",
        rates.manufacturer,
        fmt_qty(totals.qty_vida),
        totals.base_vida,
        totals.com_vida
    );
    println!(
        "  Otros: qty {}  base {:.2}  commission {:.2}",
        fmt_qty(totals.qty_otros),
        totals.base_otros,
        totals.com_otros
    );
    println!("  Total commission: {:.2}", totals.com_total);
}

/// List salespersons
fn cmd_salespersons(cfg_dir: &PathBuf) -> Result<()> {
    let config = load_workspace(cfg_dir)?;
    let mut client = ZohoClient::new(config.zoho)?;

    let salespersons = client.list_salespersons()?;
    if salespersons.is_empty() {
        println!("No salespersons configured in Zoho Books.");
        return Ok(());
    }

    let rows: Vec<SalespersonRow> = salespersons
        .into_iter()
        .map(|sp| SalespersonRow {
            id: sp.salesperson_id,
            name: sp.salesperson_name,
        })
        .collect();

    let table = Table::new(rows).with(Style::rounded()).to_string();
    println!("{table}");

    Ok(())
}

/// List invoice summaries
fn cmd_invoices(cfg_dir: &PathBuf, limit: Option<usize>) -> Result<()> {
    let config = load_workspace(cfg_dir)?;
    let mut client = ZohoClient::new(config.zoho)?;

    let invoices = client.list_invoices(&InvoiceQuery::default())?;
    if invoices.is_empty() {
        println!("No invoices found.");
        return Ok(());
    }

    let total_count = invoices.len();
    let shown = match limit {
        Some(n) => &invoices[..n.min(total_count)],
        None => &invoices[..],
    };

    let rows: Vec<InvoiceSummaryRow> = shown
        .iter()
        .map(|inv| {
            let normalized = inv.clone().normalize();
            InvoiceSummaryRow {
                number: normalized.number,
                date: normalized.date,
                status: normalized.status,
                total: format!("{:.2}", normalized.total),
            }
        })
        .collect();

    let table = Table::new(rows).with(Style::rounded()).to_string();
    println!("{table}");
    println!();
    println!("Total: {total_count} invoices");

    Ok(())
}

/// Show one invoice with its total shipping weight
fn cmd_invoice(cfg_dir: &PathBuf, invoice_id: &str) -> Result<()> {
    let config = load_workspace(cfg_dir)?;
    let mut client = ZohoClient::new(config.zoho)?;

    let raw = client.get_invoice(invoice_id)?;
    let items = client.items_index()?;

    let line_rows: Vec<LineTableRow> = raw
        .line_items
        .iter()
        .map(|li| LineTableRow {
            item: if li.name.is_empty() {
                li.item_id.clone()
            } else {
                li.name.clone()
            },
            quantity: fmt_qty(li.quantity.unwrap_or(0.0)),
            rate: format!("{:.2}", li.rate.unwrap_or(0.0)),
        })
        .collect();

    let invoice = raw.normalize();
    let weight = items.total_weight(&invoice.line_items);

    println!("Invoice {}", invoice.number);
    println!("{}", "-".repeat(50));
    println!("Customer:     {}", invoice.customer_name);
    println!("Date:         {}", invoice.date);
    println!("Status:       {}", invoice.status);
    println!("Total:        {:.2}", invoice.total);
    println!("Total weight: {weight:.2}");

    if !line_rows.is_empty() {
        println!();
        let table = Table::new(line_rows).with(Style::rounded()).to_string();
        println!("{table}");
    }

    Ok(())
}
