//! Poll a game's mod events and print the new ones
//!
//! Run this example with:
//! ```
//! cargo run --example poll_events -- <game id>
//! ```

use anyhow::{bail, Context};
use modio::filter::Filter;
use modio::{Client, SortDirection};
use std::time::Duration;

const POLL_INTERVAL: Duration = Duration::from_secs(30);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let Some(game_id) = std::env::args().nth(1) else {
        bail!("usage: poll_events <game id>");
    };
    let game_id: u32 = game_id.parse().context("game id must be a number")?;

    let client = Client::from_env()?;
    let game = client.get_game(game_id).await?;
    println!("Watching mod events of {}", game.name);

    let mut since = chrono::Utc::now().timestamp();
    loop {
        let filter = Filter::events()
            .greater_than("date_added", since)?
            .sort("id", SortDirection::Ascending)?;

        match game.get_mod_events(Some(filter)).await {
            Ok(events) => {
                for event in &events {
                    println!(
                        "{} mod {} by user {}: {:?}",
                        event.date_added, event.mod_id, event.user_id, event.event_type
                    );
                    since = since.max(event.date_added.raw());
                }
            }
            Err(e) if e.is_recoverable() => {
                eprintln!("{}", e.detailed_report());
            }
            Err(e) => return Err(e.into()),
        }

        tokio::time::sleep(POLL_INTERVAL).await;
    }
}
