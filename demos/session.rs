//! Cart Session Example
//!
//! Walks a cart through a scripted shopping session on a manual clock: items
//! are added, the session nearly expires, is extended, and finally lapses.
//!
//! Use `-c` to load a different catalog fixture
//! Use `--config` to load cart configuration from YAML
//! Use `-s` to choose where the cart snapshot is written
//!
//! Set `RUST_LOG=cartwheel=debug` to see the store's own logging.

use std::{io, path::PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use jiff::{SignedDuration, Timestamp};
use tracing_subscriber::EnvFilter;

use cartwheel::prelude::*;

/// Arguments for the session example
#[derive(Debug, Parser)]
struct SessionArgs {
    /// Catalog fixture
    #[clap(short, long, default_value = "fixtures/catalog/storefront.yml")]
    catalog: PathBuf,

    /// Cart configuration file
    #[clap(long)]
    config: Option<PathBuf>,

    /// Directory the cart snapshot is written to
    #[clap(short, long, default_value = "target/cart-state")]
    state_dir: PathBuf,
}

/// Observer that narrates notifications to stdout.
#[derive(Debug, Default)]
struct Narrator;

#[expect(clippy::print_stdout, reason = "Example code")]
impl CartObserver for Narrator {
    fn on_show_cart(&mut self) {
        println!("> cart drawer opened");
    }

    fn on_expiry_warning(&mut self, remaining: SignedDuration) {
        println!("> your cart expires in {}s", remaining.as_secs());
    }

    fn on_warning_hidden(&mut self) {
        println!("> expiry warning hidden");
    }

    fn on_cart_expired(&mut self) {
        println!("> your cart expired and was emptied");
    }
}

/// Cart Session Example
#[expect(clippy::print_stdout, reason = "Example code")]
pub fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = SessionArgs::parse();

    let catalog = Catalog::from_file(&args.catalog)
        .with_context(|| format!("loading catalog {}", args.catalog.display()))?;

    let config = match args.config.as_deref() {
        Some(path) => CartConfig::from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => CartConfig::default(),
    };

    let storage = FileStore::open(&args.state_dir)?;
    let clock = ManualClock::new(Timestamp::now());

    let mut store =
        CartStore::with_collaborators(storage, catalog, clock.clone(), Narrator, config);

    println!("restore: {:?}", store.restore());

    let headphones = store.add_item(&ProductId::new("1"), 1)?;
    store.add_item(&ProductId::new("2"), 2)?;
    store.add_item(&ProductId::new("2"), 1)?;

    let stdout = io::stdout();
    let mut handle = stdout.lock();

    store.cart().write_to(&mut handle)?;

    let lead = store.config().expiry.warning_lead();
    let timeout = store.config().expiry.session_timeout();

    clock.advance(timeout - lead);
    store.tick();
    store.extend_session();

    store.update_quantity(headphones, 0);
    println!("\nAfter removing the headphones:");
    store.cart().write_to(&mut handle)?;

    clock.advance(timeout);
    store.tick();

    println!("\nItems left: {}", store.cart().item_count());

    Ok(())
}
