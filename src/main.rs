use clap::{Parser, Subcommand};
use epiatlas::atlas::Atlas;
use epiatlas::config::{default_settings_path, default_snapshot_path, Settings};
use epiatlas::danger::DangerOptions;
use epiatlas::dataset::{NameScheme, Snapshot};
use epiatlas::timeline::local_today;
use epiatlas::{server, Error, Result};
use serde::Serialize;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Epiatlas: epidemic danger-zone rollups with phonetic region resolution.
///
/// Reads a snapshot of the upstream page (areaStat / worldStat / timeline
/// blocks) and prints JSON to stdout. Logs go to stderr; set RUST_LOG to
/// raise verbosity.
///
/// Examples:
///   epiatlas region
///   epiatlas danger --no-areas
///   epiatlas detail --province 上海 --city 杨浦区
///   epiatlas province 北京 --days 14
///   epiatlas city auto
///   epiatlas country France --scheme latin
///   epiatlas serve --port 3000
#[derive(Parser)]
#[command(name = "epiatlas", version, about, long_about = None)]
struct Cli {
    /// Snapshot JSON file. Defaults to ~/.epiatlas/snapshot.json.
    #[arg(long, global = true)]
    snapshot: Option<PathBuf>,

    /// Settings JSON file. Defaults to ~/.epiatlas/settings.json.
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    /// Never call the geolocation service; `auto` places stay unresolved.
    #[arg(long, global = true)]
    offline: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Resolve the caller's own country, province and city.
    Region,

    /// Danger-area rollup for every province with danger presence.
    Danger {
        /// Leave out per-city danger counts.
        #[arg(long)]
        no_cities: bool,
        /// Leave out per-province danger counts.
        #[arg(long)]
        no_counts: bool,
        /// Leave out danger-area names.
        #[arg(long)]
        no_areas: bool,
    },

    /// Per-city danger breakdown; one city with --city (`auto` for your own).
    Detail {
        #[arg(long)]
        province: Option<String>,
        #[arg(long)]
        city: Option<String>,
    },

    /// Case counts for every province.
    Provinces {
        /// Include each province's cities.
        #[arg(long)]
        cities: bool,
    },

    /// Case counts for one province (`auto` for your own).
    Province {
        name: String,
        /// Return the timeline of the last N days instead.
        #[arg(long)]
        days: Option<u32>,
    },

    /// Case counts for one city (`auto` for your own).
    City {
        city: String,
        /// Owning province; required unless the city is `auto`.
        #[arg(long, short)]
        province: Option<String>,
        /// Include the city's high/mid danger-area counts.
        #[arg(long)]
        danger_counts: bool,
    },

    /// Case counts for every country.
    World {
        /// "native" or "latin" country names.
        #[arg(long, default_value = "native")]
        scheme: NameScheme,
    },

    /// Case counts for one country (`auto` for your own).
    Country {
        name: String,
        #[arg(long, default_value = "native")]
        scheme: NameScheme,
        /// Return the timeline of the last N days instead.
        #[arg(long)]
        days: Option<u32>,
    },

    /// Latest news; with --province, the first item about that province.
    News {
        #[arg(long)]
        province: Option<String>,
        #[arg(long)]
        no_summary: bool,
    },

    /// Serve the same queries over HTTP.
    Serve {
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
        #[arg(long, default_value_t = 3000)]
        port: u16,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let settings = Settings::load(cli.settings.unwrap_or_else(default_settings_path))?;
    let snapshot = load_snapshot(cli.snapshot.unwrap_or_else(default_snapshot_path))?;
    let atlas = Atlas::from_settings(snapshot, settings, cli.offline);
    atlas.resolver().warn_on_collisions();

    let today = local_today();

    match cli.command {
        Command::Region => print(&atlas.region()),
        Command::Danger { no_cities, no_counts, no_areas } => print(&atlas.danger(DangerOptions {
            include_cities: !no_cities,
            include_counts: !no_counts,
            include_danger_areas: !no_areas,
        })?),
        Command::Detail { province, city: Some(city) } => {
            print(&atlas.city_detail(province.as_deref(), &city)?)
        }
        Command::Detail { city: None, .. } => print(&atlas.detail()),
        Command::Provinces { cities } => print(&atlas.provinces(cities)),
        Command::Province { name, days } => print(&atlas.province(&name, days, today)?),
        Command::City { city, province, danger_counts } => {
            let province = match province {
                Some(p) => p,
                None if city == epiatlas::atlas::AUTO => String::new(),
                None => {
                    return Err(Error::Configuration(
                        "--province is required unless the city is 'auto'".into(),
                    ))
                }
            };
            print(&atlas.city(&province, &city, danger_counts)?)
        }
        Command::World { scheme } => print(&atlas.world(scheme)),
        Command::Country { name, scheme, days } => print(&atlas.country(&name, scheme, days, today)?),
        Command::News { province, no_summary } => print(&atlas.news(province.as_deref(), !no_summary)),
        Command::Serve { host, port } => {
            let runtime = tokio::runtime::Runtime::new()?;
            runtime.block_on(server::start(atlas, &host, port))
        }
    }
}

fn load_snapshot(path: PathBuf) -> Result<Snapshot> {
    Snapshot::load(&path).map_err(|e| match e {
        Error::Io(io) if io.kind() == ErrorKind::NotFound => {
            Error::Configuration(format!("snapshot not found at {} (use --snapshot)", path.display()))
        }
        other => other,
    })
}

fn print<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
