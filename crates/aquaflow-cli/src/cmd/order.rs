use crate::output::{print_json, print_table};
use anyhow::Context;
use aquaflow_core::{
    backend::{DeliveryBackend, DirectoryBackend},
    config::ServiceConfig,
    invoice::Invoice,
    io, paths,
    product::Catalog,
    ratelimit::{AttemptDb, RateLimiter},
    sanitize::{sanitize, DEFAULT_MAX_LEN},
    submit::{submit_order, OrderRequest},
    types::{OrderStatus, Role},
    AquaError,
};
use std::path::Path;

// ---------------------------------------------------------------------------
// Subcommand types
// ---------------------------------------------------------------------------

#[derive(clap::Subcommand)]
pub enum OrderSubcommand {
    /// Place a new order
    Place {
        /// Ordering user id
        #[arg(long)]
        user: String,
        /// Product id (see `aquaflow products`)
        #[arg(long)]
        product: String,
        /// Number of cans
        #[arg(long, default_value = "1")]
        quantity: u32,
        /// Receiver name
        #[arg(long)]
        name: String,
        /// Delivery pincode
        #[arg(long)]
        pincode: String,
        /// Area / locality
        #[arg(long)]
        area: String,
        /// Street address
        #[arg(long)]
        address: String,
        /// 10-digit mobile number
        #[arg(long)]
        phone: String,
        /// Confirm an empty can will be provided for exchange
        #[arg(long = "empty-can")]
        empty_can: bool,
    },

    /// List orders (all of them, or one user's)
    List {
        #[arg(long)]
        user: Option<String>,
    },

    /// Show a single order
    Show { id: String },

    /// Show delivery progress for an order (defaults to the last one placed)
    Track { id: Option<String> },

    /// Set an order's delivery status (operator surface)
    SetStatus {
        id: String,
        /// Target status: placed, confirmed, out-for-delivery, delivered
        status: String,
        /// Acting user id; must hold the admin role when given
        #[arg(long = "as")]
        acting_user: Option<String>,
    },

    /// Print the invoice for an order (defaults to the last one placed)
    Bill { id: Option<String> },
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

pub fn run(root: &Path, subcmd: OrderSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        OrderSubcommand::Place {
            user,
            product,
            quantity,
            name,
            pincode,
            area,
            address,
            phone,
            empty_can,
        } => place(
            root,
            OrderRequest {
                user_id: user,
                product_id: product,
                quantity,
                name,
                pincode,
                area,
                address,
                phone,
                empty_can_provided: empty_can,
            },
            json,
        ),
        OrderSubcommand::List { user } => list(root, user.as_deref(), json),
        OrderSubcommand::Show { id } => show(root, &id, json),
        OrderSubcommand::Track { id } => track(root, id.as_deref(), json),
        OrderSubcommand::SetStatus {
            id,
            status,
            acting_user,
        } => set_status(root, &id, &status, acting_user.as_deref(), json),
        OrderSubcommand::Bill { id } => bill(root, id.as_deref(), json),
    }
}

// ---------------------------------------------------------------------------
// place
// ---------------------------------------------------------------------------

fn place(root: &Path, req: OrderRequest, json: bool) -> anyhow::Result<()> {
    let cfg = ServiceConfig::load(root).context("failed to load config")?;
    let catalog = Catalog::load(root);
    let product = catalog.get(&req.product_id)?.clone();

    let backend = DirectoryBackend::open(root)?;
    let store = AttemptDb::open(&paths::attempts_db_path(root))?;
    let limiter = RateLimiter::new(Box::new(store));

    let order = submit_order(&backend, &limiter, &cfg, &req)?;
    io::atomic_write(&paths::last_order_path(root), order.id.as_bytes())?;

    if json {
        print_json(&order)?;
    } else {
        println!("Order placed: {}", order.id);
        println!("  {}x {} — status: {}", order.quantity, product.name, order.status);
        println!("  Payment will be collected at the place of delivery.");
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// list / show
// ---------------------------------------------------------------------------

fn list(root: &Path, user: Option<&str>, json: bool) -> anyhow::Result<()> {
    let backend = DirectoryBackend::open(root)?;
    let orders = backend.orders_for(user)?;

    if json {
        print_json(&orders)?;
        return Ok(());
    }

    if orders.is_empty() {
        println!("No orders.");
        return Ok(());
    }
    let rows = orders
        .iter()
        .map(|o| {
            vec![
                o.id.clone(),
                o.status.to_string(),
                o.quantity.to_string(),
                o.product_id.clone(),
                o.area.clone(),
                o.created_at.format("%Y-%m-%d %H:%M").to_string(),
            ]
        })
        .collect();
    print_table(&["ID", "STATUS", "QTY", "PRODUCT", "AREA", "CREATED"], rows);
    Ok(())
}

fn show(root: &Path, id: &str, json: bool) -> anyhow::Result<()> {
    let backend = DirectoryBackend::open(root)?;
    let order = backend.order(id)?;

    if json {
        print_json(&order)?;
        return Ok(());
    }

    println!("Order:    {}", order.id);
    println!("Status:   {}", order.status);
    println!("Receiver: {} ({})", order.name, order.phone);
    println!("Address:  {}, {} — {}", order.address, order.area, order.pincode);
    println!("Items:    {}x {}", order.quantity, order.product_id);
    println!("Placed:   {}", order.created_at.format("%Y-%m-%d %H:%M"));
    Ok(())
}

// ---------------------------------------------------------------------------
// track
// ---------------------------------------------------------------------------

fn track(root: &Path, id: Option<&str>, json: bool) -> anyhow::Result<()> {
    let id = resolve_order_id(root, id)?;
    let backend = DirectoryBackend::open(root)?;
    let order = match backend.order(&id) {
        Ok(order) => order,
        Err(AquaError::OrderNotFound(_)) => anyhow::bail!("Order ID not found."),
        Err(e) => return Err(e.into()),
    };

    if json {
        let (step, of) = order.progress();
        print_json(&serde_json::json!({
            "order": order,
            "progress": { "step": step, "of": of },
        }))?;
        return Ok(());
    }

    println!("Order {} — {}", order.id, order.status);
    for status in OrderStatus::all() {
        let marker = match status.index().cmp(&order.status.index()) {
            std::cmp::Ordering::Less => "[x]",
            std::cmp::Ordering::Equal => "[>]",
            std::cmp::Ordering::Greater => "[ ]",
        };
        println!("  {marker} {status}");
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// set-status
// ---------------------------------------------------------------------------

fn set_status(
    root: &Path,
    id: &str,
    status: &str,
    acting_user: Option<&str>,
    json: bool,
) -> anyhow::Result<()> {
    let status: OrderStatus = status.parse()?;
    let backend = DirectoryBackend::open(root)?;

    if let Some(user_id) = acting_user {
        let role = backend.user_role(user_id)?;
        if role != Role::Admin {
            anyhow::bail!("user '{user_id}' does not hold the admin role");
        }
    }

    let order = backend.update_status(id, status)?;
    if json {
        print_json(&order)?;
    } else {
        println!("Order {} is now: {}", order.id, order.status);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// bill
// ---------------------------------------------------------------------------

fn bill(root: &Path, id: Option<&str>, json: bool) -> anyhow::Result<()> {
    let id = resolve_order_id(root, id)?;
    let backend = DirectoryBackend::open(root)?;
    let order = backend.order(&id)?;
    let catalog = Catalog::load(root);
    let invoice = Invoice::for_order(&order, &catalog)?;

    if json {
        print_json(&invoice)?;
    } else {
        println!("{invoice}");
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Use the given id (sanitized and uppercased, as typed into the tracking
/// form) or fall back to the most recently placed order.
fn resolve_order_id(root: &Path, id: Option<&str>) -> anyhow::Result<String> {
    match id {
        Some(id) => Ok(sanitize(id, DEFAULT_MAX_LEN).to_uppercase()),
        None => {
            let path = paths::last_order_path(root);
            let id = std::fs::read_to_string(&path)
                .context("no order id given and no order placed yet")?;
            Ok(id.trim().to_string())
        }
    }
}
