use anyhow::Context;
use clap::{Parser, Subcommand};
use skytag::settings::{self, OutputFormat, Settings};
use skytag::{lookup_one, report};
use skytag_core::angle::AngleUnits;
use std::io::Write;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "skytag")]
#[command(version, about = "Locate sky positions within the credibility regions of HEALPix sky maps")]
struct Cli {
    /// Settings file (default ~/.config/skytag/skytag.yaml)
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write the default settings file if it does not exist yet
    Init,
    /// Report the credibility region a sky position falls in
    Locate {
        /// Right ascension (degrees, or HMS e.g. 00h41m22s, 00:41:22.4)
        #[arg(allow_hyphen_values = true)]
        ra: String,
        /// Declination (degrees, or DMS e.g. +14d20m44s, -40:31:56)
        #[arg(allow_hyphen_values = true)]
        dec: String,
        /// Multi-order HEALPix FITS map (optionally gzipped)
        map: PathBuf,
        /// Modified Julian Date of the transient
        #[arg(long)]
        mjd: Option<f64>,
        /// Also estimate the distance along the line of sight
        #[arg(long)]
        distance: bool,
        /// Also report the probability density of the enclosing pixel
        #[arg(long)]
        probdensity: bool,
        /// Output format (overrides the settings file)
        #[arg(long, value_enum)]
        format: Option<OutputFormat>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let settings = match (&cli.command, &cli.settings) {
        (Commands::Init, _) => Settings::default(),
        (_, Some(path)) => Settings::load(path)?,
        (_, None) => Settings::load_default()?,
    };

    let level = if cli.verbose {
        "debug"
    } else {
        settings.log_level.as_str()
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format(|buf, record| {
            writeln!(
                buf,
                "[{}] {} - {}",
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();
    log::debug!("Settings: {:?}", settings);

    match cli.command {
        Commands::Init => {
            let path = match cli.settings {
                Some(path) => path,
                None => settings::default_path()
                    .context("Cannot locate a home directory for the settings file")?,
            };
            if Settings::init(&path)? {
                println!("Wrote default settings to {}", path.display());
            } else {
                println!("Settings file already exists at {}", path.display());
            }
        }
        Commands::Locate {
            ra,
            dec,
            map,
            mjd,
            distance,
            probdensity,
            format,
        } => {
            let ra_deg = parse_ra(&ra)?;
            let dec_deg = parse_dec(&dec)?;

            let options = settings
                .lookup_options()
                .with_distance(distance)
                .with_probability_density(probdensity);

            let result = lookup_one(ra_deg, dec_deg, &map, mjd, &options)
                .with_context(|| format!("Lookup of ({}, {}) failed", ra, dec))?;

            match format.unwrap_or(settings.output.format) {
                OutputFormat::Sentence => println!("{}", report::sentence(&result)),
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&result)?),
            }
        }
    }

    Ok(())
}

fn parse_ra(s: &str) -> anyhow::Result<f64> {
    s.hms()
        .or_else(|_| s.deg())
        .map(|a| a.degrees())
        .map_err(|e| anyhow::anyhow!("Cannot parse RA '{}': {}", s, e))
}

fn parse_dec(s: &str) -> anyhow::Result<f64> {
    s.dms()
        .or_else(|_| s.deg())
        .map(|a| a.degrees())
        .map_err(|e| anyhow::anyhow!("Cannot parse Dec '{}': {}", s, e))
}
