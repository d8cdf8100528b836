use clap::Parser;
use client::api::{ClientError, QuizClient};
use client::bot::Bot;
use client::game::{play_round, AnswerSource, RoundSummary};
use client::input::TerminalInput;
use log::{info, warn};
use shared::LeaderboardReply;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Base URL of the quiz server
    #[arg(short = 's', long, default_value = "http://127.0.0.1:10000")]
    server: String,

    /// Reuse an existing player id to keep the best score
    #[arg(short = 'p', long)]
    player_id: Option<String>,

    /// Let a bot play instead of reading answers from the terminal
    #[arg(short = 'a', long)]
    auto: bool,

    /// Probability that the bot answers correctly
    #[arg(long, default_value = "0.9")]
    accuracy: f64,

    /// Number of rounds to play
    #[arg(short = 'r', long, default_value = "1")]
    rounds: u32,

    /// Seed for the bot's random choices
    #[arg(long)]
    seed: Option<u64>,

    /// Bot delay before each answer in milliseconds
    #[arg(long, default_value = "300")]
    think_ms: u64,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    if std::env::var("RUST_LOG").is_err() {
        eprintln!("Set RUST_LOG=info for detailed logging");
    }

    let args = Args::parse();
    let client = QuizClient::new(&args.server);

    info!("Connecting to: {}", client.base_url());
    let health = client.health().await?;
    info!(
        "Server is {} with {} players, up {}s",
        health.status, health.players, health.uptime_secs
    );

    let summaries = if args.auto {
        let bot = match args.seed {
            Some(seed) => Bot::seeded(seed, args.accuracy),
            None => Bot::new(args.accuracy),
        };
        let mut bot = bot.with_think_time(Duration::from_millis(args.think_ms));
        info!("Bot playing with accuracy {:.2}", bot.accuracy());
        play_rounds(&client, args.player_id, args.rounds, &mut bot).await?
    } else {
        println!("Decide whether each statement is true. Type y, n, or q to quit.");
        let mut input = TerminalInput::stdin();
        play_rounds(&client, args.player_id, args.rounds, &mut input).await?
    };

    for (round, summary) in summaries.iter().enumerate() {
        println!(
            "Round {}: {} scored {} ({} of {} correct)",
            round + 1,
            summary.player_id,
            summary.final_score,
            summary.correct,
            summary.answered
        );
    }

    match client.leaderboard().await? {
        LeaderboardReply::Success { players } => {
            println!("Leaderboard:");
            for (rank, entry) in players.iter().take(10).enumerate() {
                let marker = if entry.active { " (playing)" } else { "" };
                println!("{:>3}. {} {}{}", rank + 1, entry.player_id, entry.score, marker);
            }
        }
        LeaderboardReply::Error { message } => warn!("Leaderboard unavailable: {}", message),
    }

    Ok(())
}

/// Plays up to `rounds` rounds under one player id. Stops early if the player
/// quits a round.
async fn play_rounds<S>(
    client: &QuizClient,
    mut player_id: Option<String>,
    rounds: u32,
    source: &mut S,
) -> Result<Vec<RoundSummary>, ClientError>
where
    S: AnswerSource,
{
    let mut summaries = Vec::new();

    for _ in 0..rounds {
        let summary = play_round(client, player_id.as_deref(), source).await?;
        player_id = Some(summary.player_id.clone());

        let finished = summary.finished;
        summaries.push(summary);
        if !finished {
            break;
        }
    }

    Ok(summaries)
}
