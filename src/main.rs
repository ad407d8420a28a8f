use anyhow::Result;
use rss_books::config::{Config, CONFIG_FILE};
use rss_books::feed::http::HttpFeed;
use rss_books::pipeline;
use std::path::Path;
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("rss_books=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = Config::load_or_default(Path::new(CONFIG_FILE))?;
    let mut feed = HttpFeed::new(&config.feed)?;
    let today = chrono::Local::now().date_naive();

    let Some(summary) = pipeline::run(&mut feed, &config, today).await? else {
        println!("No books found. Exiting.");
        return Ok(());
    };

    println!("Found {} books", summary.fetched);
    println!(
        "Filtered out {} books ({} language, {} excluded title, {} duplicate title)",
        summary.rejected.total(),
        summary.rejected.language,
        summary.rejected.excluded_title,
        summary.rejected.duplicate_title,
    );
    if summary.merged() > 0 {
        println!(
            "Merged {} editions into existing works",
            summary.merged()
        );
    }
    println!("Included {} books", summary.included);
    println!("Successfully generated {}", summary.output.display());
    Ok(())
}
