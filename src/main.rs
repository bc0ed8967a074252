//! Cart Ledger CLI
//!
//! Inspect and edit a file-backed cart from the command line.

use std::{io, path::PathBuf, process::ExitCode};

use clap::{Args, Parser, Subcommand, ValueEnum};
use rust_decimal::Decimal;
use tracing_subscriber::EnvFilter;

use cart_ledger::{
    cart::Cart,
    checkout::{ShippingMethod, summary::write_summary},
    config::StorefrontConfig,
    discounts::checked_percentage,
    items::LineItem,
    storage::{FileStore, StoreRepository},
};

#[derive(Debug, Parser)]
#[command(name = "cart-ledger", about = "Cart Ledger CLI", long_about = None)]
struct Cli {
    /// Directory holding the persisted cart
    #[arg(long, env = "CART_LEDGER_DIR", default_value = ".cart-ledger")]
    storage_dir: PathBuf,

    /// Storefront configuration file (YAML)
    #[arg(long, env = "CART_LEDGER_CONFIG")]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "RUST_LOG", default_value = "warn")]
    log_level: String,

    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Compact)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogFormat {
    Compact,
    Json,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Print the cart and its totals
    Show,

    /// Add a line item, merging with an existing line of the same id and size
    Add(AddArgs),

    /// Remove every line for a product
    Remove {
        /// Product identifier
        id: String,
    },

    /// Change a product's quantity by a signed amount (never below 1)
    Quantity {
        /// Product identifier
        id: String,

        /// Amount to add, negative to reduce
        #[arg(allow_hyphen_values = true)]
        delta: i64,
    },

    /// Discount a product by a percentage of its original price
    Discount {
        /// Product identifier
        id: String,

        /// Percentage between 0 and 100
        percentage: Decimal,
    },

    /// Restore a product's original price
    Undiscount {
        /// Product identifier
        id: String,
    },

    /// Empty the cart
    Clear,

    /// Print the cart with shipping, tax and coupon applied
    Checkout(CheckoutArgs),
}

#[derive(Debug, Args)]
struct AddArgs {
    /// Product identifier
    #[arg(long)]
    id: String,

    /// Display name
    #[arg(long)]
    name: String,

    /// Selected size
    #[arg(long)]
    size: String,

    /// Unit price
    #[arg(long)]
    price: Decimal,

    /// Number of units
    #[arg(long, default_value_t = 1)]
    quantity: u32,

    /// Image reference
    #[arg(long)]
    image: Option<String>,

    /// Colour label
    #[arg(long)]
    color: Option<String>,

    /// Discount tier the price was taken from
    #[arg(long)]
    tier_id: Option<u64>,
}

#[derive(Debug, Args)]
struct CheckoutArgs {
    /// Shipping method
    #[arg(long, value_enum, default_value_t = ShippingMethod::Standard)]
    shipping: ShippingMethod,

    /// Coupon code to apply
    #[arg(long)]
    coupon: Option<String>,
}

pub fn main() -> ExitCode {
    let cli = Cli::parse();

    init_logging(&cli.log_level, cli.log_format);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            #[expect(
                clippy::print_stderr,
                reason = "user-facing error output for the CLI"
            )]
            {
                eprintln!("{error}");
            }

            ExitCode::FAILURE
        }
    }
}

fn init_logging(level: &str, format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr);

    match format {
        LogFormat::Compact => builder.compact().init(),
        LogFormat::Json => builder.json().init(),
    }
}

fn run(cli: Cli) -> Result<(), String> {
    let config = match &cli.config {
        Some(path) => StorefrontConfig::load(path)
            .map_err(|error| format!("failed to load {}: {error}", path.display()))?,
        None => StorefrontConfig::default(),
    };

    let store = FileStore::open(&cli.storage_dir).map_err(|error| {
        format!(
            "failed to open storage at {}: {error}",
            cli.storage_dir.display()
        )
    })?;

    let repository = StoreRepository::with_keys(store, config.storage.clone());
    let mut cart = Cart::open(repository, config.currency);
    let mut checkout = config.checkout();

    match cli.command {
        Commands::Show => {}
        Commands::Add(args) => {
            let mut item = LineItem::new(args.id, args.name, args.size, args.price)
                .with_quantity(args.quantity);

            if let Some(image) = args.image {
                item = item.with_image(image);
            }

            if let Some(color) = args.color {
                item = item.with_color(color);
            }

            if let Some(tier_id) = args.tier_id {
                item = item.with_discount_tier_id(tier_id);
            }

            cart.add(item);
        }
        Commands::Remove { id } => cart.remove(&id),
        Commands::Quantity { id, delta } => cart.update_quantity(&id, delta),
        Commands::Discount { id, percentage } => {
            let percentage = checked_percentage(percentage).map_err(|error| error.to_string())?;

            if !cart.contains(&id) {
                return Err(format!("{id} is not in the cart"));
            }

            cart.apply_discount_to_item(&id, percentage);
        }
        Commands::Undiscount { id } => cart.remove_discount_from_item(&id),
        Commands::Clear => cart.clear(),
        Commands::Checkout(args) => {
            checkout.select_shipping(args.shipping);

            if let Some(code) = args.coupon {
                checkout
                    .apply_coupon(&code, &cart)
                    .map_err(|error| error.to_string())?;
            }
        }
    }

    let stdout = io::stdout();

    write_summary(stdout.lock(), &cart, &checkout).map_err(|error| error.to_string())
}
