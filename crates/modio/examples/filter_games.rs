//! List games matching a name pattern and page through their newest mods
//!
//! Reads `MODIO_API_KEY` (and optionally `MODIO_TEST_ENV`) from the
//! environment or a `.env` file.
//!
//! Run this example with:
//! ```
//! cargo run --example filter_games -- knight
//! ```

use anyhow::Context;
use modio::{Client, Filter, SortDirection};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let pattern = std::env::args().nth(1).unwrap_or_else(|| "knight".to_string());
    let client = Client::from_env().context("failed to configure mod.io client")?;

    let filter = Filter::games()
        .like("name", format!("*{}*", pattern))?
        .sort("date_live", SortDirection::Descending)?
        .limit(5)?;

    let games = client.get_games(Some(filter)).await?;
    println!("Found {} games matching '{}'", games.pagination.total, pattern);

    for game in &games {
        println!("{} [{}] {}", game.id, game.name_id, game.name);

        let mut filter = Filter::mods()
            .sort("date_updated", SortDirection::Descending)?
            .limit(20)?;

        // Stop after three pages
        for _ in 0..3 {
            let mods = game.get_mods(Some(filter.clone())).await?;
            for m in &mods {
                println!("    {} {} ({} tags)", m.id, m.name, m.tags.len());
            }

            match filter.page_after(&mods.pagination) {
                Some(next) => filter = next,
                None => break,
            }
        }
    }

    println!("{}", client.rate_limit_status().format_status());
    Ok(())
}
