//! Fetch one week of April 2008 into ./data, printing progress events.
//!
//! Run with: cargo run --example basic_fetch

use fillbass::{Config, DateDescriptor, DateRange, Event, GamedayFetcher, ResumeMode};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("fillbass=info")),
        )
        .init();

    let config = Config {
        max_concurrent_days: 4,
        resume: ResumeMode::Manifest,
        ..Default::default()
    };
    let fetcher = GamedayFetcher::new(config)?;

    let mut events = fetcher.subscribe();
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            match event {
                Event::DayFinished { report } => {
                    println!(
                        "{}: {:?}, {} games, {} new players",
                        report.date, report.status, report.games_completed, report.entities_downloaded
                    );
                }
                Event::DayFailed { date, error } => println!("{date}: failed: {error}"),
                Event::GameFailed { game, error } => println!("  {game}: {error}"),
                _ => {}
            }
        }
    });

    let range = DateRange::new(
        DateDescriptor::parse_dmy("01/04/2008")?,
        DateDescriptor::parse_dmy("07/04/2008")?,
    )?;
    let summary = fillbass::run_with_shutdown(fetcher, range).await;

    println!("\n{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
