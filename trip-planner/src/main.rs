use std::process::ExitCode;
use std::sync::Arc;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use trip_planner::service::{CacheConfig, RequestFile, RoutingService};
use trip_planner::transit::{NetworkFile, TransitDataProvider};

const USAGE: &str = "usage: trip-planner <network.json> <request.json>\n\
    (or set TRIP_PLANNER_NETWORK and TRIP_PLANNER_REQUEST)";

/// Take a path from the command line, falling back to an environment
/// variable.
fn input_path(args: &mut impl Iterator<Item = String>, var: &str) -> Option<String> {
    args.next().or_else(|| std::env::var(var).ok())
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = std::env::args().skip(1);
    let (Some(network_path), Some(request_path)) = (
        input_path(&mut args, "TRIP_PLANNER_NETWORK"),
        input_path(&mut args, "TRIP_PLANNER_REQUEST"),
    ) else {
        return Err(USAGE.into());
    };

    let network = NetworkFile::load(&network_path)?;
    let slack = network.slack.clone();
    let timetable = Arc::new(network.into_timetable()?);
    info!(
        stops = timetable.num_stops(),
        patterns = timetable.num_patterns(),
        trips = timetable.num_trips(),
        "loaded network from {network_path}"
    );

    let requests = RequestFile::list_from_json(&std::fs::read_to_string(&request_path)?)?
        .into_iter()
        .map(|file| file.into_request(&timetable))
        .collect::<Result<Vec<_>, _>>()?;

    let service = RoutingService::new(Arc::clone(&timetable), slack, &CacheConfig::default());
    let results = service.search_all(requests).await;

    let stop_name = |stop| timetable.stop_name(stop).unwrap_or("?").to_string();
    for (i, result) in results.into_iter().enumerate() {
        println!("Request {}:", i + 1);
        match result {
            Ok(result) => {
                if let Some(reason) = result.no_result {
                    println!("  no paths: {reason}");
                }
                for path in &result.paths {
                    println!("  {}", path.to_string_with(stop_name));
                }
            }
            Err(e) => println!("  failed: {e}"),
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("trip_planner=info")),
        )
        .init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}
