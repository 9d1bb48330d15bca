pub mod types;
pub mod config;
pub mod data;
pub mod boundary;
pub mod filter;
pub mod session;
pub mod render;
pub mod server;
pub mod html;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a one-shot map page from a CSV file
    Render {
        #[arg(short, long, value_name = "FILE", default_value = "config.toml")]
        config: PathBuf,
        /// CSV file of center records
        #[arg(short, long, value_name = "FILE")]
        data: PathBuf,
        #[arg(short, long, value_name = "FILE", default_value = "map.html")]
        output: PathBuf,
    },
    /// Serve the interactive dashboard
    Serve {
        #[arg(short, long, value_name = "FILE", default_value = "config.toml")]
        config: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match &cli.command {
        Commands::Render {
            config,
            data,
            output,
        } => {
            println!("Rendering map with config: {:?}", config);
            let app_config = config::AppConfig::load_from_file(config)?;

            // 1. Load the boundary (once, held by the composition root)
            let boundary = boundary::load_boundary(&app_config)?;
            let boundary_geojson = render::boundary_geojson(&boundary)?;

            // 2. Load records and apply the default (unrestricted) filters
            let set = data::load_records_from_path(data, &app_config.columns)?;
            println!("Loaded {} records", set.records.len());

            let spec = filter::FilterSpec {
                year_range: filter::year_bounds(&set),
                ..Default::default()
            };
            let filtered = spec.apply(&set);
            if filtered.is_empty() {
                println!("No records to render; nothing written.");
                return Ok(());
            }

            // 3. Render
            let popup_fields = vec![
                app_config.columns.facility_name.clone(),
                app_config.columns.address.clone(),
            ];
            let markers = render::build_markers(&filtered, &app_config.columns, &popup_fields);
            let html = render::render_map(&boundary_geojson, &markers, true, &app_config.map)?;
            std::fs::write(output, html)?;
            println!("Wrote map with {} markers to {:?}", markers.len(), output);
        }
        Commands::Serve { config } => {
            println!("Serving dashboard with config: {:?}", config);
            let app_config = config::AppConfig::load_from_file(config)?;

            let boundary = boundary::load_boundary(&app_config)?;

            server::start_server(app_config, boundary).await?;
        }
    }

    Ok(())
}
