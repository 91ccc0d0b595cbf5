//! # UKC Calculator Entry Point
//!
//! Command-line front end for the calculator. Each subcommand is one user
//! action: look up a station, confirm it, fetch predictions, or run a
//! calculation. `session` keeps a prompt open so several actions can be run
//! in a row; a failed action is reported and the prompt stays usable.

#[cfg(test)]
mod tests;

use clap::{Parser, Subcommand};
use log::{error, info};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use ukc_lib::{
    calculator,
    config::{Config, CONFIG_FILE},
    noaa::{self, NoaaClient, PredictionQuery},
    renderer, ClearanceRequest, PassageTime, RouteParameters, UkcError, VesselParameters,
};

#[derive(Parser, Debug)]
#[command(name = "ukc-calculator")]
#[command(about = "Under-keel clearance calculator backed by NOAA tide predictions")]
#[command(version)]
struct Cli {
    /// Configuration file
    #[arg(short, long, global = true, default_value = CONFIG_FILE)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
enum Command {
    /// Search tide stations by name
    Search {
        /// Part of the station name (e.g. Boston)
        #[arg(required = true, num_args = 1..)]
        name: Vec<String>,
    },

    /// Confirm a station id and list its datums
    Station {
        /// NOAA station id, or a "Name (id)" label from a search
        #[arg(required = true, num_args = 1..)]
        id: Vec<String>,
    },

    /// Fetch tide predictions for a date
    Tides {
        /// NOAA station id
        #[arg(short, long)]
        station: String,

        /// Date (YYYYMMDD)
        #[arg(short, long)]
        date: String,

        /// Datum (defaults to the configured datum)
        #[arg(long)]
        datum: Option<String>,
    },

    /// Estimate squat from block coefficient and speed
    Squat {
        /// Block coefficient (dimensionless)
        #[arg(short, long)]
        block_coefficient: String,

        /// Speed of transit in knots
        #[arg(short, long)]
        speed: String,
    },

    /// Interpolate the height of tide between a high and a low water
    Height {
        /// Clock time of high water (HH:MM)
        #[arg(long)]
        high_time: String,

        /// Height of high water in meters
        #[arg(long, allow_hyphen_values = true)]
        high: String,

        /// Clock time of low water (HH:MM)
        #[arg(long)]
        low_time: String,

        /// Height of low water in meters
        #[arg(long, allow_hyphen_values = true)]
        low: String,

        /// Clock time of passage (HH:MM)
        #[arg(short, long)]
        passage: String,
    },

    /// Estimate under-keel clearance for a transit
    Clearance {
        /// Block coefficient (dimensionless)
        #[arg(short, long)]
        block_coefficient: String,

        /// Speed of transit in knots
        #[arg(short, long)]
        speed: String,

        /// Deep draft in meters
        #[arg(long)]
        draft: String,

        /// Shallowest charted depth on the route in meters
        #[arg(long)]
        depth: String,

        /// Lowest predicted tide in meters (taken from predictions when omitted)
        #[arg(long, allow_hyphen_values = true)]
        lowest_tide: Option<String>,

        /// NOAA station id used to fetch predictions
        #[arg(long)]
        station: Option<String>,

        /// Date of transit (YYYYMMDD), required with --station
        #[arg(short, long)]
        date: Option<String>,

        /// Datum for predictions
        #[arg(long)]
        datum: Option<String>,

        /// Clock time of passage (HH:MM)
        #[arg(short, long)]
        passage: Option<String>,
    },

    /// Run commands interactively, one per line
    Session,
}

/// Run one user action and render its outcome.
async fn execute(command: Command, client: &NoaaClient) -> Result<String, UkcError> {
    match command {
        Command::Search { name } => {
            let stations = client.search_stations(&name.join(" ")).await?;
            Ok(renderer::format_stations(&stations))
        }
        Command::Station { id } => {
            let entry = id.join(" ");
            let id = ukc_lib::TideStation::from_label(&entry)
                .map(|station| station.id)
                .unwrap_or(entry);
            let details = client.station_details(&id).await?;
            Ok(renderer::format_station_details(&details))
        }
        Command::Tides {
            station,
            date,
            datum,
        } => {
            let query = PredictionQuery {
                station_id: station,
                begin_date: calculator::parse_date(&date)?,
                datum,
                range_hours: None,
            };
            let readings = client.predictions(&query).await?;
            Ok(renderer::format_predictions(&readings))
        }
        Command::Squat {
            block_coefficient,
            speed,
        } => {
            let squat = calculator::compute_squat(
                calculator::parse_number("block coefficient", &block_coefficient)?,
                calculator::parse_number("speed", &speed)?,
            )?;
            Ok(format!("Estimated squat: {squat:.2} meters\n"))
        }
        Command::Height {
            high_time,
            high,
            low_time,
            low,
            passage,
        } => {
            let hours = |text: &str| -> Result<f64, UkcError> {
                let t = PassageTime::parse(text)?;
                Ok(t.hour as f64 + t.minute as f64 / 60.0)
            };
            let (time_high, time_low, time_of_passage) = calculator::unwrap_clock_hours(
                hours(&high_time)?,
                hours(&low_time)?,
                hours(&passage)?,
            );
            let height = calculator::compute_height_of_tide(
                time_high,
                time_low,
                calculator::parse_number("height of high water", &high)?,
                calculator::parse_number("height of low water", &low)?,
                time_of_passage,
            )?;
            Ok(format!("Height of tide at {passage}: {height:.2} meters\n"))
        }
        Command::Clearance {
            block_coefficient,
            speed,
            draft,
            depth,
            lowest_tide,
            station,
            date,
            datum,
            passage,
        } => {
            let vessel = VesselParameters::new(
                calculator::parse_number("block coefficient", &block_coefficient)?,
                calculator::parse_number("speed", &speed)?,
                calculator::parse_number("deep draft", &draft)?,
            )?;
            let depth = calculator::parse_number("shallowest depth", &depth)?;
            let passage = passage.as_deref().map(PassageTime::parse).transpose()?;
            let date = date.as_deref().map(calculator::parse_date).transpose()?;

            if passage.is_some() && station.is_none() {
                return Err(UkcError::invalid(
                    "a passage time needs --station to interpolate the height of tide",
                ));
            }

            let day = date.unwrap_or_else(|| chrono::Local::now().date_naive());
            let readings = match station {
                Some(station_id) => {
                    if date.is_none() {
                        return Err(UkcError::invalid("a date is required when a station is given"));
                    }
                    // a passage near either end of the day needs the
                    // neighbouring days' high and low waters
                    let (begin_date, range_hours) = match passage {
                        Some(_) => {
                            let previous = day.pred_opt().ok_or_else(|| {
                                UkcError::invalid(format!("no day before {day}"))
                            })?;
                            (previous, Some(72))
                        }
                        None => (day, None),
                    };
                    let query = PredictionQuery {
                        station_id,
                        begin_date,
                        datum,
                        range_hours,
                    };
                    client.predictions(&query).await?
                }
                None => Vec::new(),
            };

            let lowest_tide = match lowest_tide {
                Some(text) => calculator::parse_number("lowest tide", &text)?,
                None => noaa::lowest_reading(&noaa::readings_on(&readings, day))
                    .map(|r| r.height_m)
                    .ok_or_else(|| {
                        UkcError::invalid("lowest tide is required when no predictions cover the day")
                    })?,
            };

            let passage_at = passage.map(|p| p.on(day));
            let tide_window = match passage_at {
                Some(at) if !readings.is_empty() => Some(noaa::tide_window(&readings, at)?),
                _ => None,
            };

            let request = ClearanceRequest {
                vessel,
                route: RouteParameters::new(depth, lowest_tide)?,
                passage: passage_at.unwrap_or_else(|| day.and_time(chrono::NaiveTime::MIN)),
                tide_window,
            };
            let result = calculator::calculate(&request)?;
            Ok(renderer::format_report(&result))
        }
        Command::Session => Err(UkcError::invalid("already in a session")),
    }
}

/// Split a session line into arguments, honouring double quotes.
fn split_line(line: &str) -> Vec<String> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut quoted = false;
    for c in line.chars() {
        match c {
            '"' => quoted = !quoted,
            c if c.is_whitespace() && !quoted => {
                if !current.is_empty() {
                    args.push(std::mem::take(&mut current));
                }
            }
            c => current.push(c),
        }
    }
    if !current.is_empty() {
        args.push(current);
    }
    args
}

/// Interactive loop: every line is a subcommand. Failures are printed and the
/// loop continues; `quit`, `exit` or end of input leaves.
fn run_session(rt: &tokio::runtime::Runtime, client: &NoaaClient) -> anyhow::Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    println!("UKC calculator session. Type 'help' for commands, 'quit' to leave.");

    loop {
        print!("ukc> ");
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let args = split_line(&line);
        match args.first().map(String::as_str) {
            None => continue,
            Some("quit") | Some("exit") => break,
            _ => {}
        }

        let argv = std::iter::once("ukc-calculator".to_string()).chain(args);
        let cli = match Cli::try_parse_from(argv) {
            Ok(cli) => cli,
            Err(e) => {
                // help and version land here too
                println!("{e}");
                continue;
            }
        };

        match rt.block_on(execute(cli.command, client)) {
            Ok(output) => print!("{output}"),
            Err(e) => eprintln!("{}", renderer::format_error(&e)),
        }
    }
    Ok(())
}

/// Main application entry point.
fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let config = Config::load_from_path(&cli.config);
    let client = NoaaClient::new(config)?;

    // Create Tokio runtime for async operations
    let rt = tokio::runtime::Runtime::new()?;

    if cli.command == Command::Session {
        info!("Starting interactive session");
        return run_session(&rt, &client);
    }

    match rt.block_on(execute(cli.command, &client)) {
        Ok(output) => {
            print!("{output}");
            Ok(())
        }
        Err(e) => {
            error!("Action failed: {e}");
            Err(anyhow::anyhow!(renderer::format_error(&e)))
        }
    }
}
