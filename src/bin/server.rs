use std::net::SocketAddr;

use axum::{
    Router,
    extract::{MatchedPath, Request},
};
use axum_server::Handle;
use clap::Parser;
use rusqlite::Connection;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use guildhall::{AppState, FALLBACK_TIMEZONE, RewardConfig, build_router, graceful_shutdown};

/// The REST API server for guildhall.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the application SQLite database.
    #[arg(long)]
    db_path: String,

    /// The port to serve the API from.
    #[arg(short, long, default_value_t = 4000)]
    port: u16,

    /// The timezone for users who have not configured one.
    #[arg(long, default_value = FALLBACK_TIMEZONE)]
    timezone: String,

    /// The XP awarded for logging a transaction.
    #[arg(long, default_value_t = 50)]
    xp_per_transaction: i64,

    /// The gold awarded for logging a transaction.
    #[arg(long, default_value_t = 20)]
    gold_per_transaction: i64,

    /// The XP needed to advance one level.
    #[arg(long, default_value_t = 500)]
    xp_per_level: i64,

    /// The XP bonus per budget category settled under its limit.
    #[arg(long, default_value_t = 300)]
    budget_bonus_xp: i64,

    /// The gold bonus per budget category settled under its limit.
    #[arg(long, default_value_t = 150)]
    budget_bonus_gold: i64,
}

impl Args {
    fn reward_config(&self) -> RewardConfig {
        RewardConfig {
            xp_per_transaction: self.xp_per_transaction,
            gold_per_transaction: self.gold_per_transaction,
            xp_per_level: self.xp_per_level,
            budget_bonus_xp: self.budget_bonus_xp,
            budget_bonus_gold: self.budget_bonus_gold,
        }
    }
}

#[tokio::main]
async fn main() {
    setup_logging();

    let args = Args::parse();

    let addr = SocketAddr::from(([127, 0, 0, 1], args.port));

    let connection = Connection::open(&args.db_path).expect("Could not open database.");
    let state = AppState::new(connection, args.reward_config(), &args.timezone)
        .expect("Could not initialize database.");

    let handle = Handle::new();
    tokio::spawn(graceful_shutdown(handle.clone()));

    let router = add_tracing_layer(build_router(state));

    tracing::info!("HTTP server listening on {}", addr);
    axum_server::bind(addr)
        .handle(handle)
        .serve(router.into_make_service())
        .await
        .expect("Could not start server.");
}

fn setup_logging() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn add_tracing_layer(router: Router) -> Router {
    let tracing_layer = TraceLayer::new_for_http()
        .make_span_with(|req: &Request| {
            let method = req.method();
            let uri = req.uri();

            let matched_path = req
                .extensions()
                .get::<MatchedPath>()
                .map(|matched_path| matched_path.as_str());

            tracing::debug_span!("request", %method, %uri, matched_path)
        })
        // Errors are logged where they occur, so skip TraceLayer's own 5xx
        // logging.
        .on_failure(());

    router.layer(tracing_layer)
}
