use std::path::PathBuf;
use clap::Parser;
use coup_table::{Actor, CoupError, Lobby, MatchConfig, RandomBot};

/// Plays a full match between random bots and prints the winner.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Number of bots at the table
    #[arg(short, long, default_value_t = 4)]
    players: usize,

    /// Seed for the deck, and for the bots
    #[arg(short, long)]
    seed: Option<u64>,

    /// JSON match config; flags override it
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), CoupError> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let mut config = match args.config {
        Some(ref path) => MatchConfig::from_path(path)?,
        None => MatchConfig::default(),
    };
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    let bot_seed = config.seed.unwrap_or_default();

    let mut lobby = Lobby::new(config);
    let mut names = Vec::with_capacity(args.players);
    for i in 0..args.players {
        let seat = lobby.join(format!("bot {i}"))?;
        names.push((seat.id(), seat.name().to_string()));
        Actor::spawn(seat, Box::new(RandomBot::new(bot_seed.wrapping_add(i as u64))));
    }

    let outcome = lobby.start()?.run().await?;

    let winner = outcome
        .winner
        .and_then(|id| names.iter().find(|(seat, _)| *seat == id))
        .map(|(_, name)| name.as_str())
        .unwrap_or("nobody");
    println!("{winner} wins after {} turns", outcome.turns);

    Ok(())
}
