//! Command-line surface: one subcommand per screen action.

use clap::{Args, Parser, Subcommand};
use serde_json::Value;

use crate::api::ApiClient;
use crate::commands::{self, Alert};
use crate::config::AppConfig;
use crate::diagnostics;
use crate::documents::DocumentKind;
use crate::enquiry::{self, EnquiryForm, PaymentReceived};
use crate::kits::MAX_KIT_SLOTS;
use crate::orders::StatusField;

#[derive(Parser, Debug)]
#[command(name = "rcc-kit", version, about = "Sunrack RCC Kit sales order tracking")]
pub struct Cli {
    /// Sales backend base URL. Defaults to the RCC Kit portal.
    #[arg(long, global = true, env = "RCC_API_BASE_URL")]
    pub api_base_url: Option<String>,
    /// Per-request timeout in seconds. Defaults to 30.
    #[arg(long, global = true, env = "RCC_API_TIMEOUT_SECS")]
    pub timeout_secs: Option<u64>,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Log in and remember the session.
    Login {
        #[arg(long)]
        username: String,
        #[arg(long, env = "RCC_PASSWORD", hide_env_values = true)]
        password: String,
    },
    Logout,
    Whoami,
    /// Version and build details.
    About,
    /// Client names already on file.
    Clients,
    /// Create a new sales order.
    CreateEnquiry(EnquiryArgs),
    /// List orders, optionally filtered by client name or project id.
    Orders {
        #[arg(long)]
        search: Option<String>,
    },
    /// Change production status, dispatch status or production unit.
    SetStatus {
        order_id: String,
        field: StatusField,
        value: String,
    },
    /// Ordered, dispatched and pending kits for an order.
    Kits { order_id: String },
    /// Record a kit dispatch lot, e.g. `dispatch-kits 12 1=40 3=10`.
    DispatchKits {
        order_id: String,
        #[arg(required = true, value_parser = parse_slot_qty)]
        kits: Vec<(usize, i64)>,
    },
    /// Percentage dispatch lots for an order SR.
    Lots { sr: String },
    AddLot { sr: String, percentage: String },
    DeleteLot { lot_id: String },
    /// QC or dispatch documents for an order SR.
    Docs { kind: DocumentKind, sr: String },
    DeleteDoc { kind: DocumentKind, doc_id: String },
}

#[derive(Args, Debug)]
pub struct EnquiryArgs {
    #[arg(long)]
    pub customer: String,
    #[arg(long)]
    pub delivery_address: String,
    #[arg(long)]
    pub billing_address: String,
    /// YYYY-MM-DD
    #[arg(long)]
    pub po_date: String,
    /// Yes, No or Partial.
    #[arg(long)]
    pub payment_received: Option<PaymentReceived>,
    #[arg(long)]
    pub payment_percentage: Option<String>,
    /// Catalog slot and quantity, e.g. `--kit 3=12`. Repeatable.
    #[arg(long = "kit", value_parser = parse_slot_qty)]
    pub kits: Vec<(usize, i64)>,
    /// YYYY-MM-DD
    #[arg(long)]
    pub delivery_date: String,
    /// Yes or No.
    #[arg(long, default_value = "No")]
    pub partial_delivery: String,
    #[arg(long, default_value = "")]
    pub remarks: String,
}

/// `slot=qty` with a 1-based slot.
pub fn parse_slot_qty(raw: &str) -> Result<(usize, i64), String> {
    let (slot, qty) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected SLOT=QTY, got {raw:?}"))?;
    let slot: usize = slot
        .trim()
        .parse()
        .map_err(|_| format!("invalid kit slot {slot:?}"))?;
    if slot == 0 {
        return Err("kit slots start at 1".to_string());
    }
    let qty: i64 = qty
        .trim()
        .parse()
        .map_err(|_| format!("invalid quantity {qty:?}"))?;
    Ok((slot, qty))
}

impl EnquiryArgs {
    pub fn into_form(self) -> Result<EnquiryForm, Alert> {
        let mut quantities = [0; MAX_KIT_SLOTS];
        for (slot, qty) in self.kits {
            if slot > MAX_KIT_SLOTS {
                return Err(Alert::invalid(format!(
                    "Kit slot {slot} is out of range (1-{MAX_KIT_SLOTS})"
                )));
            }
            quantities[slot - 1] = qty;
        }
        let partial_delivery_allowed = enquiry::parse_yes_no(&self.partial_delivery)
            .map_err(|e| Alert::invalid(e.to_string()))?;
        Ok(EnquiryForm {
            customer_name: self.customer,
            delivery_address: self.delivery_address,
            billing_address: self.billing_address,
            po_date: self.po_date,
            payment_received: self.payment_received,
            payment_percentage: self.payment_percentage,
            quantities,
            delivery_date: self.delivery_date,
            partial_delivery_allowed,
            remarks: self.remarks,
        })
    }
}

/// Run one subcommand. Login is the only action that does not need `client`
/// to carry a session.
pub async fn execute(command: Command, config: &AppConfig, client: &ApiClient) -> Result<Value, Alert> {
    match command {
        Command::Login { username, password } => {
            commands::auth::login(config, &username, password).await
        }
        Command::Logout => commands::auth::logout(client).await,
        Command::Whoami => commands::auth::whoami(client),
        Command::About => Ok(diagnostics::get_about_info(config)),
        Command::Clients => commands::enquiries::existing_clients(client).await,
        Command::CreateEnquiry(args) => {
            let form = args.into_form()?;
            commands::enquiries::create_enquiry(client, &form).await
        }
        Command::Orders { search } => {
            commands::orders::list_orders(client, search.as_deref()).await
        }
        Command::SetStatus {
            order_id,
            field,
            value,
        } => commands::orders::update_status(client, &order_id, field, &value).await,
        Command::Kits { order_id } => {
            let order = commands::orders::get_order(client, &order_id).await?;
            commands::kits::load_kits(client, &order).await
        }
        Command::DispatchKits { order_id, kits } => {
            let order = commands::orders::get_order(client, &order_id).await?;
            commands::kits::save_lot(client, &order, &kits).await
        }
        Command::Lots { sr } => commands::lots::list_lots(client, &sr).await,
        Command::AddLot { sr, percentage } => commands::lots::add_lot(client, &sr, &percentage).await,
        Command::DeleteLot { lot_id } => commands::lots::delete_lot(client, &lot_id).await,
        Command::Docs { kind, sr } => commands::documents::list_documents(client, kind, &sr).await,
        Command::DeleteDoc { kind, doc_id } => {
            commands::documents::delete_document(client, kind, &doc_id).await
        }
    }
}
