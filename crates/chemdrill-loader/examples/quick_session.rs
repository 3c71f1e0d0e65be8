//! Quick session example — minimal programmatic usage of chemdrill.
//!
//! Loads the compounds pool (falling back to the bundled dataset when the
//! configured endpoint is unreachable), runs one batch of ten questions
//! answering each from its own choice set, and records the score.
//!
//! ```bash
//! cargo run --example quick_session
//! ```

use std::sync::Arc;
use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::SeedableRng;

use chemdrill_core::model::{
    AnswerField, BatchSize, CountMode, OrderMode, PoolType, QuizSettings,
};
use chemdrill_core::session::QuizSession;
use chemdrill_loader::{create_loader, load_config};
use chemdrill_store::{HistoryStore, JsonFileStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("chemdrill=info".parse().unwrap()),
        )
        .init();

    // Load chemdrill.toml (or defaults) and build the loader.
    let config = load_config()?;
    let loader = create_loader(&config)?;

    let pool = loader.load("general", PoolType::Compounds).await?;
    println!("Loaded pool: {} compounds", pool.len());

    let settings = QuizSettings {
        count: CountMode::Batch {
            size: BatchSize::Ten,
            start: 1,
        },
        order: OrderMode::Shuffle,
    };

    let mut rng = StdRng::seed_from_u64(2024);
    let mut session = QuizSession::new(
        PoolType::Compounds,
        pool,
        settings,
        AnswerField::Answer,
        &mut rng,
    );
    println!("Session {}: {} questions\n", session.id(), session.question_count());

    while let Some(question) = session.current_question() {
        let prompt = question.name.clone();
        let choices = session
            .choices(3, &mut rng)
            .expect("session has a current question");

        println!("What is the formula of {prompt}?");
        for (i, choice) in choices.choices.iter().enumerate() {
            println!("  {}. {choice}", i + 1);
        }

        // A real shell would wait for the learner; here we answer from the
        // choice set to exercise the full flow.
        let started = Instant::now();
        let answer = choices.choices[choices.correct_index].clone();
        let outcome = session
            .submit(&answer, started.elapsed() + Duration::from_millis(1500))
            .expect("session accepts an answer");

        println!(
            "  -> {} (+{} points, streak {})\n",
            if outcome.is_correct { "correct" } else { "wrong" },
            outcome.points,
            outcome.streak
        );
        session.advance();
    }

    let summary = session.summary();
    println!(
        "Finished: {}/{} correct, {} points",
        summary.correct_count, summary.total_count, summary.score
    );

    // Record the run in the per-scope leaderboard.
    let durable = Arc::new(JsonFileStore::open(&config.store_path)?);
    let history = HistoryStore::new(durable);
    let scope = summary.scope();

    if history.is_new_record(&scope, summary.score) {
        println!("New personal best for this range!");
    }
    history.record(&scope, summary.into_history_entry());

    println!("\nTop scores for {scope}:");
    for (rank, entry) in history.top_n(&scope, 5).iter().enumerate() {
        println!(
            "  {}. {} points ({}/{}) on {}",
            rank + 1,
            entry.score,
            entry.correct_count,
            entry.total_count,
            entry.recorded_at.format("%Y-%m-%d %H:%M")
        );
    }

    Ok(())
}
