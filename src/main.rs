pub mod types;
pub mod config;
pub mod error;
pub mod data;
pub mod processing;
pub mod render;
pub mod server;

use anyhow::Context;
use clap::{Parser, Subcommand};
use error::DashboardError;
use std::path::PathBuf;
use types::{CoordinateRange, Field};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print area, postal-code, coordinate-range and address results
    Report {
        #[arg(short, long, value_name = "FILE", default_value = "config.toml")]
        config: PathBuf,
        /// Administrative area to report on; defaults to the first in sorted order
        #[arg(long)]
        area: Option<String>,
        /// Easting bounds, inclusive
        #[arg(long, num_args = 2, value_names = ["MIN", "MAX"])]
        easting: Option<Vec<f64>>,
        /// Northing bounds, inclusive
        #[arg(long, num_args = 2, value_names = ["MIN", "MAX"])]
        northing: Option<Vec<f64>>,
        /// Exact venue address to look up
        #[arg(long)]
        address: Option<String>,
    },
    /// List the selectable values of one column
    Options {
        #[arg(short, long, value_name = "FILE", default_value = "config.toml")]
        config: PathBuf,
        #[arg(long, value_enum, default_value = "area")]
        field: Field,
    },
    /// Serve the query API
    Serve {
        #[arg(short, long, value_name = "FILE", default_value = "config.toml")]
        config: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Report { config, area, easting, northing, address } => {
            let app_config = config::AppConfig::load_from_file(&config)?;
            let dataset = load(&app_config)?;

            if dataset.is_empty() {
                println!("No venues loaded.");
            } else {
                let area = area.unwrap_or_else(|| {
                    processing::distinct_sorted(&dataset, Field::Area)
                        .into_iter()
                        .next()
                        .unwrap_or_default()
                });
                report_area(&app_config, &dataset, &area)?;
                report_range(&app_config, &dataset, easting, northing)?;
            }

            if let Some(address) = address {
                let venue = processing::find_by_address(&dataset, &address)
                    .context("query stage: address lookup")?;
                println!("\n== Venue at {} ==", address);
                print!("{}", render::venue_card(venue));
            }
        }
        Commands::Options { config, field } => {
            let app_config = config::AppConfig::load_from_file(&config)?;
            let dataset = load(&app_config)?;
            for value in processing::distinct_sorted(&dataset, field) {
                println!("{}", value);
            }
        }
        Commands::Serve { config } => {
            let app_config = config::AppConfig::load_from_file(&config)?;
            let dataset = load(&app_config)?;
            server::start_server(app_config, dataset).await?;
        }
    }

    Ok(())
}

fn load(config: &config::AppConfig) -> anyhow::Result<data::Dataset> {
    data::load_dataset(&config.input.dataset, &config.input.null_marker)
        .context("load stage: could not read venue dataset")
}

fn pair(bounds: Option<Vec<f64>>) -> Option<(f64, f64)> {
    bounds.and_then(|b| match b[..] {
        [min, max] => Some((min, max)),
        _ => None,
    })
}

fn report_area(
    config: &config::AppConfig,
    dataset: &data::Dataset,
    area: &str,
) -> anyhow::Result<()> {
    println!("== Venues in {} ==", area);
    let selection = match processing::filter_by_area(dataset, area) {
        Ok(selection) => selection,
        Err(DashboardError::EmptySelection { .. }) => {
            println!("No venues found.");
            return Ok(());
        }
        Err(e) => return Err(e).context("query stage: area filter"),
    };

    println!(
        "{} venues, centred on {:.6}, {:.6}\n",
        selection.venues.len(),
        selection.centroid.latitude,
        selection.centroid.longitude
    );
    print!("{}", render::venue_table(&selection));

    let groups = processing::group_by_postal_prefix(
        selection.venues.iter().copied(),
        config.query.postal_prefix_len,
    );
    println!("\n== Venues in {} by postal code ==", area);
    print!("{}", render::prefix_chart(&groups));
    Ok(())
}

fn report_range(
    config: &config::AppConfig,
    dataset: &data::Dataset,
    easting: Option<Vec<f64>>,
    northing: Option<Vec<f64>>,
) -> anyhow::Result<()> {
    let range_config = &config.range;
    let easting = pair(easting).unwrap_or(range_config.default_easting);
    let northing = pair(northing).unwrap_or(range_config.default_northing);
    let range = CoordinateRange::new(
        easting,
        northing,
        range_config.easting_domain,
        range_config.northing_domain,
    )
    .context("query stage: invalid coordinate range")?;
    let summary = processing::filter_by_range(dataset, &range);
    println!(
        "\n== Venues in easting {:?} / northing {:?} ==",
        range.easting(),
        range.northing()
    );
    print!("{}", render::range_summary(&summary));
    Ok(())
}
