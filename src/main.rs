//! `aqmon`: command-line front end for the air-quality service.
//!
//! Live commands (`current`, `hourly`, `daily`) query Open-Meteo; `history`
//! queries the bundled city/day dataset. Records are printed to stdout as
//! JSON; logs go to stderr.

use std::path::PathBuf;
use std::process::ExitCode;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueHint};
use serde_json::json;

use aqmon_service::alert::categories::health_recommendations;
use aqmon_service::analysis::index::sub_indices;
use aqmon_service::analysis::series::{daily_index_series, hourly_pollutant_series, location_comparison_series};
use aqmon_service::analysis::stats::{monthly_averages, pollutant_stats};
use aqmon_service::assembler::ReadingAssembler;
use aqmon_service::collect::collect_current_readings;
use aqmon_service::config::ServiceConfig;
use aqmon_service::ingest::history::HistoricalDataset;
use aqmon_service::logging::{self, DataSource};
use aqmon_service::model::{Pollutant, CONCENTRATION_UNIT};
use aqmon_service::summary::{print_summary, CollectionSummary};

#[derive(Parser, Debug)]
#[command(name = "aqmon", version, about = "Air-quality index readings, forecasts and history", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Latest reading per location (every configured location if none given)
    Current {
        locations: Vec<String>,
        /// Print the comparison chart series instead of the readings
        #[arg(long)]
        chart: bool,
    },
    /// Hourly readings, up to 5 days ahead
    Hourly {
        location: String,
        days: Option<u32>,
        /// Print one pollutant's chart series (e.g. pm10, ozone)
        #[arg(long, value_parser = parse_pollutant)]
        pollutant: Option<Pollutant>,
    },
    /// Daily averages of the hourly forecast
    Daily {
        location: String,
        days: Option<u32>,
        /// Print the daily index chart series instead of the summaries
        #[arg(long)]
        chart: bool,
    },
    /// Configured location names
    Locations,
    /// Queries over the historical city/day dataset
    History(HistoryArgs),
}

#[derive(Args, Debug)]
struct HistoryArgs {
    /// Dataset CSV (defaults to `dataset_path` from the config)
    #[arg(long, value_hint = ValueHint::FilePath)]
    dataset: Option<PathBuf>,

    #[command(subcommand)]
    query: HistoryQuery,
}

#[derive(Subcommand, Debug)]
enum HistoryQuery {
    /// Cities present in the dataset
    Cities,
    /// Most recent day on record for a city
    Latest { city: String },
    /// Daily index for a city, optionally within a date range
    Trend {
        city: String,
        #[arg(long)]
        start: Option<NaiveDate>,
        #[arg(long)]
        end: Option<NaiveDate>,
        /// Print the chart series instead of the daily records
        #[arg(long)]
        chart: bool,
    },
    /// Month-by-month average index for a city
    Monthly { city: String },
    /// Per-pollutant statistics for a city
    Pollutants { city: String },
    /// Latest day for several cities side by side
    Compare {
        #[arg(required = true)]
        cities: Vec<String>,
    },
    /// Record count, date span and index range across all cities
    Stats,
}

fn parse_pollutant(text: &str) -> Result<Pollutant, String> {
    Pollutant::from_api_field(text).ok_or_else(|| {
        let known: Vec<_> = Pollutant::ALL.iter().map(|p| p.api_field()).collect();
        format!("unknown pollutant '{}' (expected one of: {})", text, known.join(", "))
    })
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn run_history(args: HistoryArgs, config: &ServiceConfig) -> Result<(), Box<dyn std::error::Error>> {
    let path = args.dataset.unwrap_or_else(|| PathBuf::from(&config.dataset_path));
    let dataset = HistoricalDataset::load(&path)?;

    match args.query {
        HistoryQuery::Cities => {
            let cities = dataset.cities();
            print_json(&json!({ "cities": cities, "count": cities.len() }))?;
        }
        HistoryQuery::Latest { city } => print_json(&dataset.latest(&city)?)?,
        HistoryQuery::Trend { city, start, end, chart } => {
            let days = dataset.city_days(&city, start, end)?;
            if chart {
                print_json(&daily_index_series(&city, days))?;
            } else {
                print_json(&json!({ "city": city, "data": days, "count": days.len() }))?;
            }
        }
        HistoryQuery::Monthly { city } => {
            let days = dataset.city_days(&city, None, None)?;
            print_json(&json!({ "city": city, "data": monthly_averages(days) }))?;
        }
        HistoryQuery::Pollutants { city } => {
            let days = dataset.city_days(&city, None, None)?;
            print_json(&json!({ "city": city, "pollutants": pollutant_stats(days) }))?;
        }
        HistoryQuery::Compare { cities } => {
            let latest = dataset.compare(&cities);
            print_json(&json!({ "cities": latest, "count": latest.len() }))?;
        }
        HistoryQuery::Stats => {
            let overview = dataset.overview().ok_or("dataset has no records")?;
            print_json(&overview)?;
        }
    }
    Ok(())
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = ServiceConfig::from_env()?;
    logging::init_logger(
        config.logging.level,
        config.logging.file.as_deref(),
        config.logging.timestamps,
    );
    logging::debug(
        DataSource::Config,
        None,
        &format!(
            "timezone {}, {} retry attempt(s), {} configured location(s)",
            config.timezone,
            config.retry_attempts,
            config.locations.len()
        ),
    );
    logging::debug(DataSource::System, None, &format!("command: {:?}", cli.command));

    let default_days = config.forecast_days;
    let daily_days = config.daily_days;

    match cli.command {
        Command::Locations => {
            print_json(&config.location_table().names())?;
        }
        Command::History(args) => run_history(args, &config)?,
        Command::Current { locations, chart } => {
            let assembler = ReadingAssembler::from_config(config)?;
            let locations = if locations.is_empty() {
                assembler.locations().names().into_iter().map(String::from).collect()
            } else {
                locations
            };
            let outcomes = collect_current_readings(&assembler, &locations);

            if chart {
                let readings: Vec<_> = outcomes.iter().filter_map(|o| o.result.as_ref().ok()).cloned().collect();
                print_json(&location_comparison_series(&readings))?;
            } else {
                let records: Vec<serde_json::Value> = outcomes
                    .iter()
                    .map(|o| match &o.result {
                        Ok(reading) => json!({
                            "location": o.location,
                            "reading": reading,
                            "sub_indices": sub_indices(&reading.concentrations),
                            "units": CONCENTRATION_UNIT,
                            "guidance": health_recommendations(reading.index_value),
                        }),
                        Err(err) => json!({
                            "location": o.location,
                            "error": err.to_string(),
                        }),
                    })
                    .collect();
                print_json(&records)?;
            }
            print_summary(&CollectionSummary::from_outcomes(&outcomes));
        }
        Command::Hourly { location, days, pollutant } => {
            let assembler = ReadingAssembler::from_config(config)?;
            let readings = assembler.assemble_hourly_readings(&location, days.unwrap_or(default_days))?;
            match pollutant {
                Some(p) => print_json(&hourly_pollutant_series(&location, &readings, p))?,
                None => print_json(&readings)?,
            }
        }
        Command::Daily { location, days, chart } => {
            let assembler = ReadingAssembler::from_config(config)?;
            let summaries = assembler.daily_summaries(&location, days.unwrap_or(daily_days))?;
            if chart {
                print_json(&daily_index_series(&location, &summaries))?;
            } else {
                print_json(&summaries)?;
            }
        }
    }

    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("aqmon: {}", e);
            ExitCode::FAILURE
        }
    }
}
