//! Shopfront - storefront command line client
//!
//! Browses the catalogue through the persisted caches, manages a cart kept
//! in `SHOPFRONT_STORAGE_DIR`, and runs the admin and operator listings.

use clap::{Parser, Subcommand, ValueEnum};
use tracing::info;
use tracing_subscriber::EnvFilter;

use shopfront::models::{
    AuditAction, AuditFilter, CheckoutDetails, Credentials, Page, Registration, Sale, SaleStatus,
};
use shopfront::{Config, Storefront};

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

#[derive(Debug, Parser)]
#[command(name = "shopfront", version, about = "Storefront command line client")]
struct Cli {
    /// Log in with these credentials before running the command.
    #[arg(long, global = true, requires = "password")]
    email: Option<String>,

    #[arg(long, global = true, requires = "email")]
    password: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List products from the cache
    Products {
        /// Ignore the cache and re-fetch
        #[arg(long)]
        refresh: bool,
    },
    /// Show one product
    Product { id: i64 },
    /// List categories from the cache
    Categories,
    /// Search products by name
    Search { query: String },
    /// Products in the same category as the given product
    Related { product_id: i64 },
    /// Create an account
    Register {
        name: String,
        email: String,
        password: String,
        #[arg(long)]
        address: Option<String>,
        #[arg(long)]
        phone: Option<String>,
    },
    /// Show the logged-in identity
    Whoami,
    /// Close the session
    Logout,
    /// Manage the cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Place the cart as sales
    Checkout {
        #[arg(long)]
        address: String,
        #[arg(long)]
        phone: String,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Paginated sales listing (administrators)
    AdminSales {
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long, default_value_t = 20)]
        limit: u32,
    },
    /// Paginated sales listing (operators)
    OperatorSales {
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long, default_value_t = 20)]
        limit: u32,
    },
    /// Change a sale's status (operators)
    SetStatus { id: i64, status: StatusArg },
    /// List or search users (administrators)
    Users {
        #[arg(long)]
        search: Option<String>,
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long, default_value_t = 20)]
        limit: u32,
    },
    /// Audit trail (auditors)
    Audit {
        #[arg(long)]
        user: Option<String>,
        #[arg(long)]
        table: Option<String>,
        #[arg(long)]
        action: Option<ActionArg>,
        #[arg(long)]
        search: Option<String>,
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long, default_value_t = 20)]
        limit: u32,
    },
}

#[derive(Debug, Subcommand)]
enum CartAction {
    /// Show cart lines
    List,
    /// Add one unit of a product
    Add {
        product_id: i64,
        #[arg(long, default_value = "")]
        color: String,
        #[arg(long, default_value = "")]
        size: String,
    },
    /// Set a line's quantity
    Set { identifier: String, quantity: u32 },
    /// Remove a line
    Remove { identifier: String },
    /// Empty the cart
    Clear,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum StatusArg {
    Pending,
    Processing,
    Completed,
    Cancelled,
    Refunded,
}

impl From<StatusArg> for SaleStatus {
    fn from(arg: StatusArg) -> Self {
        match arg {
            StatusArg::Pending => Self::Pending,
            StatusArg::Processing => Self::Processing,
            StatusArg::Completed => Self::Completed,
            StatusArg::Cancelled => Self::Cancelled,
            StatusArg::Refunded => Self::Refunded,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ActionArg {
    Create,
    Read,
    Update,
    Delete,
}

impl From<ActionArg> for AuditAction {
    fn from(arg: ActionArg) -> Self {
        match arg {
            ActionArg::Create => Self::Create,
            ActionArg::Read => Self::Read,
            ActionArg::Update => Self::Update,
            ActionArg::Delete => Self::Delete,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file first (before anything else)
    dotenvy::dotenv().ok();

    // If RUST_LOG is not set, default to "info" level for our crate
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("shopfront=info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = Config::from_env()?;
    info!("Configuration loaded, backend at {}", config.api_url);

    let storefront = Storefront::from_config(&config)?;

    if let (Some(email), Some(password)) = (&cli.email, &cli.password) {
        let identity = storefront
            .session()
            .login_with_credentials(&Credentials::new(email.as_str(), password.as_str()))
            .await?;
        info!("Logged in as {} ({})", identity.email, identity.role);
    }

    run(&storefront, cli.command).await
}

async fn run(storefront: &Storefront, command: Command) -> anyhow::Result<()> {
    match command {
        Command::Products { refresh } => {
            let products = if refresh {
                storefront.products().refresh().await?
            } else {
                storefront.products().read().await?
            };
            for product in &products.items {
                println!(
                    "{:>5}  {:<40} {:>10.2}  stock {}",
                    product.id, product.name, product.price, product.stock
                );
            }
        }
        Command::Product { id } => match storefront.products().read_one(id).await? {
            Some(product) => println!("{}", serde_json::to_string_pretty(&product)?),
            None => anyhow::bail!("product {id} not found"),
        },
        Command::Categories => {
            let categories = storefront.categories().read().await?;
            for category in &categories.items {
                println!("{:>5}  {}", category.id, category.name);
            }
        }
        Command::Search { query } => {
            for product in storefront.api().search_products(&query).await? {
                println!("{:>5}  {}", product.id, product.name);
            }
        }
        Command::Related { product_id } => {
            let Some(product) = storefront.products().read_one(product_id).await? else {
                anyhow::bail!("product {product_id} not found");
            };
            let Some(category_id) = product.category_id else {
                return Ok(());
            };
            for related in storefront.api().related_products(category_id, product.id).await? {
                println!("{:>5}  {}", related.id, related.name);
            }
        }
        Command::Register {
            name,
            email,
            password,
            address,
            phone,
        } => {
            let registration = Registration {
                name,
                email,
                password,
                address,
                phone,
            };
            storefront.api().register(&registration).await?;
            println!("Account created");
        }
        Command::Whoami => match storefront.session().verify(true).await {
            Some(identity) => println!(
                "{} <{}> ({})",
                identity.display_name, identity.email, identity.role
            ),
            None => println!("Not logged in"),
        },
        Command::Logout => storefront.session().logout().await,
        Command::Cart { action } => run_cart(storefront, action).await?,
        Command::Checkout {
            address,
            phone,
            notes,
        } => {
            let details = CheckoutDetails {
                shipping_address: address,
                contact_phone: phone,
                notes,
            };
            let placed = storefront.checkout(&details).await?;
            println!("Placed {placed} sales");
        }
        Command::AdminSales { page, limit } => {
            let sales = storefront.api().admin_sales(page, limit).await?;
            print_sales(&sales);
        }
        Command::OperatorSales { page, limit } => {
            let sales = storefront.api().operator_sales(page, limit).await?;
            print_sales(&sales);
        }
        Command::SetStatus { id, status } => {
            storefront.api().update_sale_status(id, status.into()).await?;
            println!("Sale {id} updated");
        }
        Command::Users {
            search,
            page,
            limit,
        } => {
            let users = match search {
                Some(term) => storefront.api().search_users(&term).await?,
                None => {
                    let page = storefront.api().admin_users(page, limit).await?;
                    println!("page {}/{}", page.page, page.total_pages);
                    page.items
                }
            };
            for user in users {
                println!("{:>5}  {:<30} {}", user.id, user.email, user.role);
            }
        }
        Command::Audit {
            user,
            table,
            action,
            search,
            page,
            limit,
        } => {
            let filter = AuditFilter {
                user_email: user,
                table,
                action: action.map(Into::into),
                search,
            };
            let logs = storefront.api().audit_logs(&filter, page, limit).await?;
            println!("page {}/{}", logs.page, logs.total_pages);
            for log in logs.items {
                println!(
                    "{:>6}  {:<7} {:<12} {}",
                    log.id,
                    log.action.as_str(),
                    log.table,
                    log.description
                );
            }
        }
    }
    Ok(())
}

async fn run_cart(storefront: &Storefront, action: CartAction) -> anyhow::Result<()> {
    let cart = storefront.cart();
    match action {
        CartAction::List => {}
        CartAction::Add {
            product_id,
            color,
            size,
        } => {
            let Some(product) = storefront.products().read_one(product_id).await? else {
                anyhow::bail!("product {product_id} not found");
            };
            cart.add(&product, &color, &size);
        }
        CartAction::Set {
            identifier,
            quantity,
        } => cart.update_quantity(&identifier, quantity),
        CartAction::Remove { identifier } => cart.remove(&identifier),
        CartAction::Clear => cart.clear(),
    }

    for item in cart.items() {
        println!(
            "{:<16} {:<30} x{:<3} {:>10.2}",
            item.identifier,
            item.product.name,
            item.quantity,
            item.line_total()
        );
    }
    println!("{} items, total {:.2}", cart.total_items(), cart.total_price());
    Ok(())
}

fn print_sales(sales: &Page<Sale>) {
    println!("page {}/{}", sales.page, sales.total_pages);
    for sale in &sales.items {
        println!(
            "{:>6}  product {:<5} x{:<3} {:>10.2}  {:?}",
            sale.id, sale.product_id, sale.quantity, sale.total_price, sale.status
        );
    }
}
