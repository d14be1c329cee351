//! Diner simulation driving the toolkit end to end.
//!
//! Cook threads `put` dishes onto a bounded table; customer threads
//! `take_matching` only their own dish kind. A `Latch` gates the start so
//! every thread begins together, and a shared `CancelToken` shuts the diner
//! down deterministically: workers observe cancellation at their blocking
//! points, finish, and are joined before the process exits.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use clap::Parser;
use waitpoint::{BoundedChannel, CancelToken, Latch, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Dish {
    Donut,
    Burger,
}

impl Dish {
    const fn name(self) -> &'static str {
        match self {
            Self::Donut => "donut",
            Self::Burger => "burger",
        }
    }

    const fn other(self) -> Self {
        match self {
            Self::Donut => Self::Burger,
            Self::Burger => Self::Donut,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "diner", version, about = "Producer/consumer simulation on the waitpoint toolkit")]
struct Cli {
    /// Table capacity (maximum dishes waiting at once)
    #[arg(long, default_value_t = 6)]
    capacity: usize,

    /// Number of cook threads
    #[arg(long, default_value_t = 1)]
    cooks: usize,

    /// Customer threads per dish kind
    #[arg(long, default_value_t = 1)]
    customers: usize,

    /// How long to run before shutting down, in milliseconds
    #[arg(long, default_value_t = 2000)]
    run_ms: u64,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let table = Arc::new(BoundedChannel::new(cli.capacity)?);
    let cancel = CancelToken::new();
    // Every worker arrives, then waits for the full crew.
    let start = Arc::new(Latch::new(cli.cooks + cli.customers * 2));

    let mut cooks = Vec::new();
    for id in 0..cli.cooks {
        let table = Arc::clone(&table);
        let start = Arc::clone(&start);
        let cancel = cancel.clone();
        cooks.push(thread::spawn(move || run_cook(id, &table, &start, &cancel)));
    }

    let mut customers = Vec::new();
    for kind in [Dish::Donut, Dish::Burger] {
        for id in 0..cli.customers {
            let table = Arc::clone(&table);
            let start = Arc::clone(&start);
            let cancel = cancel.clone();
            customers.push(thread::spawn(move || {
                run_customer(id, kind, &table, &start, &cancel)
            }));
        }
    }

    thread::sleep(Duration::from_millis(cli.run_ms));
    tracing::info!("closing time");
    cancel.cancel();

    let mut served = 0u64;
    for handle in cooks {
        served += handle.join().expect("cook panicked");
    }
    let mut eaten = 0u64;
    for handle in customers {
        eaten += handle.join().expect("customer panicked");
    }

    tracing::info!(served, eaten, left_over = table.len(), "diner closed");
    Ok(())
}

fn run_cook(id: usize, table: &BoundedChannel<Dish>, start: &Latch, cancel: &CancelToken) -> u64 {
    start.arrive();
    if start.wait(cancel).is_err() {
        return 0;
    }

    let mut served = 0u64;
    let mut next = Dish::Donut;
    loop {
        match table.put(cancel, next) {
            Ok(()) => {
                served += 1;
                tracing::debug!(cook = id, dish = next.name(), "served");
                next = next.other();
            }
            Err(err) => {
                tracing::debug!(cook = id, %err, "cook going home");
                break;
            }
        }
        thread::sleep(Duration::from_millis(5));
    }
    served
}

fn run_customer(
    id: usize,
    kind: Dish,
    table: &BoundedChannel<Dish>,
    start: &Latch,
    cancel: &CancelToken,
) -> u64 {
    start.arrive();
    if start.wait(cancel).is_err() {
        return 0;
    }

    let mut eaten = 0u64;
    loop {
        match table.take_matching(cancel, |dish| *dish == kind) {
            Ok(dish) => {
                eaten += 1;
                tracing::debug!(customer = id, dish = dish.name(), "ate");
            }
            Err(err) => {
                tracing::debug!(customer = id, %err, "customer going home");
                break;
            }
        }
        thread::sleep(Duration::from_millis(10));
    }
    eaten
}
