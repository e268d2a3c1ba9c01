use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing::info;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use transit_planner::domain::{Criterion, TimeOfDay};
use transit_planner::planner::{
    DistanceHeuristic, InvalidMetric, Metric, Planner, SearchConfig, SearchError, SearchRequest,
    TourConfig, TourPlanner, TourRequest,
};
use transit_planner::report::{ItineraryDto, TourDto};
use transit_planner::timetable::{
    GraphConfig, LoadError, TimetableError, TimetableGraph, load_timetable_csv,
};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Timetable CSV file
    #[arg(long, env = "TIMETABLE_PATH")]
    timetable: PathBuf,

    /// Give up on a query after this many seconds
    #[arg(long, env = "SEARCH_TIMEOUT_SECS", default_value_t = 30)]
    timeout_secs: u64,

    /// Transfer units charged for each change of line
    #[arg(long, env = "TRANSFER_PENALTY", default_value_t = 10)]
    transfer_penalty: u32,

    /// Print JSON instead of text
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand, Debug)]
enum Command {
    /// Find a route between two stops
    Route {
        #[arg(long)]
        from: String,
        #[arg(long)]
        to: String,
        /// Time ready at the start (HH:MM:SS)
        #[arg(long)]
        at: TimeOfDay,
        /// "time" or "changes"
        #[arg(long, default_value = "time")]
        criterion: Criterion,
        /// none, manhattan, euclidean, chebyshev or haversine
        #[arg(long, default_value = "none", value_parser = parse_heuristic)]
        heuristic: HeuristicChoice,
        /// Assumed top speed for the distance heuristic
        #[arg(long, default_value_t = 60.0)]
        speed_kmh: f64,
    },
    /// Visit several stops and return to the start
    Tour {
        #[arg(long)]
        from: String,
        /// Stops to visit, separated by ';'
        #[arg(long, value_delimiter = ';', required = true)]
        visit: Vec<String>,
        /// Time ready at the start (HH:MM:SS)
        #[arg(long)]
        at: TimeOfDay,
        /// "time" or "changes"
        #[arg(long, default_value = "time")]
        criterion: Criterion,
    },
}

#[derive(Debug, Clone, Copy)]
enum HeuristicChoice {
    None,
    Distance(Metric),
}

fn parse_heuristic(s: &str) -> Result<HeuristicChoice, InvalidMetric> {
    if s.eq_ignore_ascii_case("none") {
        return Ok(HeuristicChoice::None);
    }
    s.parse().map(HeuristicChoice::Distance)
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Timetable(#[from] TimetableError),

    #[error(transparent)]
    Search(#[from] SearchError),

    #[error("query did not finish within {0} s")]
    Timeout(u64),

    #[error("query task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error("cannot encode output: {0}")]
    Json(#[from] serde_json::Error),
}

fn init_logger() {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();
    let result = tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .try_init();
    if let Err(err) = result {
        eprintln!("Failed to set up logging: {err}");
    }
}

/// Run `query` on the blocking pool, abandoning it once `budget` runs out.
async fn with_budget<T, F>(budget: Duration, query: F) -> Result<T, CliError>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    let task = tokio::task::spawn_blocking(query);
    match tokio::time::timeout(budget, task).await {
        Ok(joined) => Ok(joined?),
        Err(_) => Err(CliError::Timeout(budget.as_secs())),
    }
}

async fn run(args: Args) -> Result<String, CliError> {
    let rows = load_timetable_csv(&args.timetable)?;
    let graph = TimetableGraph::build(&rows, &GraphConfig::default())?;
    info!(
        path = %args.timetable.display(),
        stops = graph.stop_count(),
        trips = graph.trip_count(),
        "Timetable loaded"
    );

    let config = SearchConfig {
        transfer_penalty: args.transfer_penalty,
        ..SearchConfig::default()
    };
    let planner = Arc::new(Planner::new(Arc::new(graph), config));
    let budget = Duration::from_secs(args.timeout_secs);

    match args.command {
        Command::Route {
            from,
            to,
            at,
            criterion,
            heuristic,
            speed_kmh,
        } => {
            let mut request = SearchRequest::new(from, to, at).with_criterion(criterion);
            if let HeuristicChoice::Distance(metric) = heuristic {
                request = request.with_heuristic(DistanceHeuristic::new(metric, speed_kmh));
            }

            let itinerary = with_budget(budget, move || planner.search(&request)).await??;
            info!(cost = itinerary.cost(), legs = itinerary.legs().len(), "Route found");

            if args.json {
                Ok(serde_json::to_string_pretty(&ItineraryDto::from_itinerary(
                    &itinerary,
                ))?)
            } else {
                Ok(itinerary.to_string())
            }
        }
        Command::Tour {
            from,
            visit,
            at,
            criterion,
        } => {
            let request = TourRequest::new(from, visit, at).with_criterion(criterion);

            let tour = with_budget(budget, move || {
                TourPlanner::new(&planner, TourConfig::default()).plan(&request)
            })
            .await??;
            info!(cost = tour.cost(), order = ?tour.order(), "Tour found");

            if args.json {
                Ok(serde_json::to_string_pretty(&TourDto::from_tour(&tour))?)
            } else {
                Ok(tour.to_string())
            }
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    init_logger();
    let args = Args::parse();

    match run(args).await {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
