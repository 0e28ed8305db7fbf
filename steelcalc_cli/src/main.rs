//! # SteelCalc CLI Application
//!
//! Command-line front end for oxygen lance and Laval nozzle calculations and
//! the per-user calculation history.
//!
//! ```text
//! steelcalc --owner 1 lance --flow 1500 --pressure 2.5 --diameter 15 --save "Converter #2"
//! steelcalc --owner 1 list --type laval-nozzle --from 2025-01-01
//! steelcalc --owner 1 export --out history.json
//! ```

mod print;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use clap::{Parser, Subcommand, ValueEnum};

use steelcalc_core::calculations::gases::{known_gas_names, GasProperties};
use steelcalc_core::calculations::{compute, ApparatusInput, LavalNozzleInput, OxygenLanceInput};
use steelcalc_core::file_io::{read_import, write_export};
use steelcalc_core::record::{CalculationRecord, CalculationType, OwnerId, RecordFilter, RecordId};
use steelcalc_core::{AppConfig, CalcError, CalculationRepository};

#[derive(Parser)]
#[command(name = "steelcalc", author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// JSON configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Database file, overrides STEELCALC_DB and the configuration
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Owner of the calculations (defaults to `default_owner_id` from the config)
    #[arg(long, global = true)]
    owner: Option<OwnerId>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Calculate an oxygen lance jet
    Lance {
        /// Oxygen flow rate, m³/h
        #[arg(long)]
        flow: f64,
        /// Supply pressure, MPa
        #[arg(long)]
        pressure: f64,
        /// Nozzle diameter, mm
        #[arg(long)]
        diameter: f64,
        /// Oxygen temperature, °C
        #[arg(long, default_value_t = 25.0)]
        temperature: f64,
        /// Oxygen purity, %
        #[arg(long, default_value_t = 99.5)]
        purity: f64,
        /// Material being processed
        #[arg(long, default_value = "")]
        material: String,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Calculate a Laval nozzle
    Nozzle {
        /// Working gas
        #[arg(long, default_value = "Oxygen")]
        gas: String,
        /// Inlet (stagnation) pressure, atm
        #[arg(long)]
        inlet: f64,
        /// Outlet pressure, atm
        #[arg(long)]
        outlet: f64,
        /// Inlet temperature, K
        #[arg(long, default_value_t = 300.0)]
        temperature: f64,
        /// Mass flow rate, kg/s
        #[arg(long)]
        flow: f64,
        /// Exit-to-throat area ratio
        #[arg(long)]
        ratio: f64,
        /// Design for a subsonic exit
        #[arg(long)]
        subsonic: bool,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// List saved calculations, newest first
    List {
        /// Only this apparatus
        #[arg(long = "type", value_enum)]
        kind: Option<KindArg>,
        /// Earliest date (YYYY-MM-DD or RFC 3339), inclusive
        #[arg(long)]
        from: Option<String>,
        /// Latest date (YYYY-MM-DD or RFC 3339), inclusive
        #[arg(long)]
        to: Option<String>,
    },
    /// Show one saved calculation
    Show { id: RecordId },
    /// Search saved calculations by title
    Search { term: String },
    /// Summary of saved calculations
    Stats,
    /// Delete saved calculations
    Delete {
        #[arg(required = true)]
        ids: Vec<RecordId>,
    },
    /// Export saved calculations as JSON
    Export {
        /// Write to a file instead of stdout
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Import calculations from a JSON export
    Import { file: PathBuf },
    /// Recompute a saved calculation from its stored inputs
    Recalc {
        id: RecordId,
        /// Store the recomputed results
        #[arg(long)]
        update: bool,
    },
}

#[derive(clap::Args)]
struct OutputArgs {
    /// Save the result under this title
    #[arg(long)]
    save: Option<String>,
    /// Print the result as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum KindArg {
    OxygenLance,
    LavalNozzle,
}

impl From<KindArg> for CalculationType {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::OxygenLance => CalculationType::OxygenLance,
            KindArg::LavalNozzle => CalculationType::LavalNozzle,
        }
    }
}

/// Resolved settings shared by all commands
struct Session {
    config: AppConfig,
    owner: Option<OwnerId>,
}

impl Session {
    fn repository(&self) -> Result<CalculationRepository> {
        CalculationRepository::from_config(&self.config)
            .with_context(|| format!("cannot open {}", self.config.database_path.display()))
    }

    fn owner(&self) -> Result<OwnerId> {
        self.owner
            .or(self.config.default_owner_id)
            .context("no owner given: pass --owner or set default_owner_id in the config")
    }
}

fn init_logging(verbose: bool) {
    let mut builder = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            if let Some(calc_error) = e.downcast_ref::<CalcError>() {
                if let Ok(json) = serde_json::to_string_pretty(calc_error) {
                    eprintln!();
                    eprintln!("Error JSON:");
                    eprintln!("{}", json);
                }
            }
            ExitCode::FAILURE
        }
    }
}

/// Config file (or defaults), then `STEELCALC_DB`, then `--db`
fn resolve_config(path: Option<&Path>, db: Option<PathBuf>) -> Result<AppConfig> {
    let config = match path {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };
    Ok(config.with_env().with_database_override(db))
}

fn run(cli: Cli) -> Result<()> {
    let session = Session {
        config: resolve_config(cli.config.as_deref(), cli.db)?,
        owner: cli.owner,
    };

    match cli.command {
        Commands::Lance {
            flow,
            pressure,
            diameter,
            temperature,
            purity,
            material,
            output,
        } => {
            let input = OxygenLanceInput::new(flow, pressure, diameter, temperature, material).with_purity(purity);
            calculate(&session, ApparatusInput::OxygenLance(input), &output)
        }
        Commands::Nozzle {
            gas,
            inlet,
            outlet,
            temperature,
            flow,
            ratio,
            subsonic,
            output,
        } => {
            if GasProperties::lookup(&gas).is_none() {
                let known: Vec<_> = known_gas_names().collect();
                log::warn!("unknown gas '{}', using air properties (known: {})", gas, known.join(", "));
            }
            let input = LavalNozzleInput {
                gas_type: gas,
                inlet_pressure_atm: inlet,
                outlet_pressure_atm: outlet,
                temperature_k: temperature,
                mass_flow_rate_kg_s: flow,
                expansion_ratio: ratio,
                is_supersonic: !subsonic,
            };
            calculate(&session, ApparatusInput::LavalNozzle(input), &output)
        }
        Commands::List { kind, from, to } => {
            let mut filter = RecordFilter::all();
            if let Some(kind) = kind {
                filter = filter.of_type(kind.into());
            }
            if from.is_some() || to.is_some() {
                let start = from.as_deref().map(|s| parse_date(s, false)).transpose()?;
                let end = to.as_deref().map(|s| parse_date(s, true)).transpose()?;
                filter = filter.between(start.unwrap_or_else(earliest), end.unwrap_or_else(latest));
            }
            let records = session.repository()?.get_by_owner(session.owner()?, &filter)?;
            print::record_table(&records);
            Ok(())
        }
        Commands::Show { id } => {
            let record = session.repository()?.get_by_id(id)?;
            if record.owner_id != session.owner()? {
                bail!(CalcError::NotFound { id });
            }
            print::record_detail(&record);
            Ok(())
        }
        Commands::Search { term } => {
            let records = session.repository()?.search_by_title(session.owner()?, &term)?;
            print::record_table(&records);
            Ok(())
        }
        Commands::Stats => {
            let stats = session.repository()?.statistics(session.owner()?)?;
            print::statistics(&stats);
            Ok(())
        }
        Commands::Delete { ids } => {
            let owner = session.owner()?;
            let removed = session.repository()?.delete_many(&ids, owner)?;
            println!("Deleted {} of {} calculation(s).", removed, ids.len());
            Ok(())
        }
        Commands::Export { out } => {
            let json = session.repository()?.export_json(session.owner()?)?;
            match out {
                Some(path) => {
                    write_export(&path, &json)?;
                    println!("Exported to {}", path.display());
                }
                None => println!("{}", json),
            }
            Ok(())
        }
        Commands::Import { file } => {
            let text = read_import(&file)?;
            let report = session.repository()?.import_json_report(session.owner()?, &text)?;
            print::import_report(&report);
            Ok(())
        }
        Commands::Recalc { id, update } => recalc(&session, id, update),
    }
}

fn calculate(session: &Session, input: ApparatusInput, output_args: &OutputArgs) -> Result<()> {
    let output = compute(&input)?;

    if output_args.json {
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        print::apparatus_output(&output);
    }

    if let Some(title) = &output_args.save {
        let mut record = CalculationRecord::from_apparatus(session.owner()?, title.as_str(), &input, &output)?;
        let id = session.repository()?.save(&mut record)?;
        println!();
        println!("Saved as calculation #{}", id);
    }
    Ok(())
}

fn recalc(session: &Session, id: RecordId, update: bool) -> Result<()> {
    let owner = session.owner()?;
    let repo = session.repository()?;
    let mut record = repo.get_by_id(id)?;
    if record.owner_id != owner {
        bail!(CalcError::NotFound { id });
    }

    if record.calculation_type == CalculationType::LavalNozzle
        && !LavalNozzleInput::has_gas_parameters(&record.input_parameters)
    {
        if update {
            bail!("calculation #{} does not record its gas; refusing to overwrite it", id);
        }
        log::warn!("calculation #{} does not record its gas, recomputing as Oxygen", id);
    }

    let input = record
        .apparatus_input()
        .with_context(|| format!("calculation #{} cannot be recomputed", id))?;
    let output = compute(&input)?;
    let fresh = output.to_parameters();

    print::parameter_diff(&record.output_results, &fresh);

    if update {
        record.output_results = fresh;
        record.notes = output.notes().to_string();
        if !repo.update(&record)? {
            bail!(CalcError::NotFound { id });
        }
        println!();
        println!("Calculation #{} updated.", id);
    }
    Ok(())
}

fn earliest() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(1, 1, 1, 0, 0, 0).single().unwrap_or(DateTime::<Utc>::MIN_UTC)
}

fn latest() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(9999, 12, 31, 23, 59, 59).single().unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// Parse `YYYY-MM-DD` (start or end of that day, UTC) or an RFC 3339 timestamp
fn parse_date(text: &str, end_of_day: bool) -> Result<DateTime<Utc>> {
    if let Ok(date) = DateTime::parse_from_rfc3339(text) {
        return Ok(date.with_timezone(&Utc));
    }
    let day = NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .with_context(|| format!("invalid date '{}': expected YYYY-MM-DD or RFC 3339", text))?;
    let time = if end_of_day {
        NaiveTime::from_hms_micro_opt(23, 59, 59, 999_999)
    } else {
        NaiveTime::from_hms_opt(0, 0, 0)
    }
    .context("invalid time of day")?;
    Ok(day.and_time(time).and_utc())
}
