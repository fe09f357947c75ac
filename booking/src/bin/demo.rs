//! Booking demo binary
//!
//! Walks one session through the wizard against the demo catalog: show
//! selection, a rejected advance, seat selection, payment, and the automatic
//! reset after confirmation.

use anyhow::Context;
use marquee_booking::{
    BookingConfig, BookingEnvironment, BookingStore, Catalog, Format, SeatStatus, StaticCatalog,
    StepChange, TheaterId, upcoming_dates,
};
use marquee_core::environment::{Clock, SystemClock};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Missing .env is fine
    let _ = dotenvy::dotenv();
    let config = BookingConfig::from_env();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.logging.filter.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
    marquee_runtime::metrics::describe_store_metrics();

    tracing::info!(
        max_tickets = config.session.max_tickets,
        reset_delay_ms = config.session.reset_delay_ms,
        base_fare = %config.pricing.base_fare,
        "Configuration loaded"
    );

    let catalog = Arc::new(StaticCatalog::demo());
    let clock = Arc::new(SystemClock);
    let env = BookingEnvironment::from_config(clock.clone(), catalog.clone(), &config);
    let store = BookingStore::new(env);

    println!("=== {} ===\n", catalog.show().title);

    let dates = upcoming_dates(clock.now().date_naive(), config.session.bookable_days);
    let labels: Vec<String> = dates
        .iter()
        .map(|d| format!("{} {} {}", d.weekday, d.day, d.month))
        .collect();
    println!("Dates: {}", labels.join(" | "));
    for theater in catalog.theaters() {
        println!(
            "{} ({}, {}): {}",
            theater.name,
            theater.location,
            theater.distance,
            theater.showtimes.join(", ")
        );
    }

    println!("\n>>> Advance with nothing selected");
    if let Err(error) = store.advance().await {
        println!("Rejected: {error}");
    }

    println!("\n>>> Select show");
    let date = dates.first().map(|d| d.date).context("no bookable dates configured")?;
    store.select_date(date).await?;
    store.select_theater(TheaterId::new("th1")).await?;
    store.select_showtime("7:45 PM").await?;
    store.select_format(Format::Imax).await?;
    print_step(&store.advance().await?);

    println!("\n>>> Choose seats");
    store.set_ticket_count(2).await?;
    for id in ["A3", "A1", "C1", "C3"] {
        let seat = id.parse()?;
        match store.toggle_seat(seat).await {
            Ok(toggle) => println!("{id}: {toggle:?}"),
            Err(error) => println!("{id}: {error}"),
        }
    }
    print_seat_map(&store).await;
    let snapshot = store.snapshot().await;
    println!("Total: {}", snapshot.total_amount());
    print_step(&store.advance().await?);

    println!("\n>>> Payment");
    let summary = store.order_summary().await;
    for line in &summary.lines {
        println!("  {} {}", line.seat, line.price);
    }
    println!("  Subtotal    {}", summary.subtotal);
    println!("  Booking fee {}", summary.booking_fee);
    println!("  Amount due  {}", summary.amount_due);
    print_step(&store.advance().await?);

    let snapshot = store.snapshot().await;
    println!("\nSnapshot:\n{}", serde_json::to_string_pretty(&snapshot)?);

    println!("\n>>> Waiting for the session to reset");
    let mut actions = store.subscribe();
    tokio::time::timeout(config.session.reset_delay() + Duration::from_secs(1), actions.recv())
        .await
        .context("session did not reset in time")??;
    // The reset is broadcast before it is applied
    tokio::time::sleep(Duration::from_millis(10)).await;
    let snapshot = store.snapshot().await;
    println!("Step after reset: {}", snapshot.step());

    store.shutdown(Duration::from_secs(1)).await?;
    Ok(())
}

fn print_step(change: &StepChange) {
    match change {
        StepChange::Advanced(step) => println!("Step {}: {step}", step.number()),
        StepChange::Confirmed(confirmation) => println!(
            "Confirmed {} for {}",
            confirmation.reference, confirmation.summary.amount_due
        ),
    }
}

async fn print_seat_map(store: &BookingStore) {
    for (row, seats) in store.seat_map().await {
        let cells: String = seats
            .iter()
            .map(|(_, status)| match status {
                SeatStatus::Available => '.',
                SeatStatus::Selected => 'o',
                SeatStatus::Booked => 'x',
            })
            .collect();
        println!("{row} {cells}");
    }
}
