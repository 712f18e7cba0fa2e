use chrono::NaiveDate;
use clap::{ArgGroup, Args, Parser, Subcommand};
use mycometric_core::config::OutputFormat;
use mycometric_core::logging::level_for_verbosity;
use mycometric_core::*;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "mycometric")]
#[command(about = "Psilocybin dosage calculator", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Use this config file instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Calculate a dosage range (default)
    Calc(CalcArgs),

    /// List species and sclerotia
    Species {
        /// Only list one category (mushroom, sclerotia)
        #[arg(long, value_parser = parse_category)]
        category: Option<BotanicalCategory>,

        #[arg(long)]
        json: bool,
    },

    /// List synthetic compounds
    Compounds {
        #[arg(long)]
        json: bool,
    },

    /// List intensity tiers and their targets
    Intensities {
        #[arg(long)]
        json: bool,
    },

    /// Show current tolerance assuming a standard 25mg last dose
    #[command(group(ArgGroup::new("when").required(true).args(["days", "last_dose_on"])))]
    Tolerance {
        /// Days since the last dose
        #[arg(long)]
        days: Option<f64>,

        /// Date of the last dose (YYYY-MM-DD)
        #[arg(long)]
        last_dose_on: Option<NaiveDate>,

        #[arg(long)]
        json: bool,
    },

    /// Show raw psilocybin/psilocin/baeocystin content of a species
    Composition {
        species: String,

        #[arg(long)]
        json: bool,
    },

    /// Inspect or create the config file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective configuration
    Show,

    /// Write a default config file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Args, Default)]
struct CalcArgs {
    /// microdose, threshold, light, moderate, strong or heroic
    #[arg(long, value_parser = parse_intensity)]
    intensity: Option<IntensityLevel>,

    /// Species or sclerotia id (see `mycometric species`)
    #[arg(long, conflicts_with = "compound")]
    species: Option<String>,

    /// Synthetic compound id (see `mycometric compounds`)
    #[arg(long)]
    compound: Option<String>,

    /// Material is weighed fresh
    #[arg(long, conflicts_with = "dried")]
    fresh: bool,

    /// Material is weighed dried
    #[arg(long)]
    dried: bool,

    /// Body weight in kg
    #[arg(long)]
    weight: Option<f64>,

    /// Scale the dose by body weight (off by default)
    #[arg(long)]
    adjust_weight: bool,

    /// Psilocybin-equivalent mg of the last dose
    #[arg(long)]
    last_dose_mg: Option<f64>,

    /// Days since the last dose
    #[arg(long, conflicts_with = "last_dose_on")]
    days_since: Option<f64>,

    /// Date of the last dose (YYYY-MM-DD)
    #[arg(long)]
    last_dose_on: Option<NaiveDate>,

    /// Currently taking an MAOI
    #[arg(long)]
    maoi: bool,

    /// optimal, average or poor
    #[arg(long, value_parser = parse_drying)]
    drying: Option<DryingQuality>,

    /// Estimated storage potency loss in percent (0-50)
    #[arg(long, value_parser = parse_storage_loss)]
    storage_loss: Option<f64>,

    /// Print the full result as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    mycometric_core::logging::init_with_level(level_for_verbosity(cli.verbose));

    let catalog = default_catalog();
    let errors = catalog.validate();
    if !errors.is_empty() {
        eprintln!("Catalog validation errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        return Err(Error::CatalogValidation("Invalid catalog".into()));
    }

    // Every command except `config init` runs against a valid config file
    let load_config = || -> Result<Config> {
        let config = match &cli.config {
            Some(path) => Config::load_from(path)?,
            None => Config::load()?,
        };
        config.validate(catalog)?;
        Ok(config)
    };

    match cli.command {
        Some(Commands::Config {
            action: ConfigAction::Init { force },
        }) => cmd_config_init(cli.config.as_deref(), force),
        Some(Commands::Config {
            action: ConfigAction::Show,
        }) => {
            print!("{}", load_config()?.to_toml()?);
            Ok(())
        }
        Some(Commands::Calc(args)) => cmd_calc(catalog, &load_config()?, args),
        Some(Commands::Species { category, json }) => {
            load_config()?;
            cmd_species(catalog, category, json)
        }
        Some(Commands::Compounds { json }) => {
            load_config()?;
            cmd_compounds(catalog, json)
        }
        Some(Commands::Intensities { json }) => {
            load_config()?;
            cmd_intensities(json)
        }
        Some(Commands::Tolerance {
            days,
            last_dose_on,
            json,
        }) => {
            load_config()?;
            cmd_tolerance(days, last_dose_on, json)
        }
        Some(Commands::Composition { species, json }) => {
            load_config()?;
            cmd_composition(catalog, &species, json)
        }
        None => {
            // Default to "calc" with configured defaults
            cmd_calc(catalog, &load_config()?, CalcArgs::default())
        }
    }
}

fn cmd_calc(catalog: &Catalog, config: &Config, args: CalcArgs) -> Result<()> {
    let input = build_input(catalog, config, &args)?;
    let result = compute(&input)?;

    if args.json || config.output.format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        display_result(catalog, &input, &result);
    }
    Ok(())
}

fn build_input(catalog: &Catalog, config: &Config, args: &CalcArgs) -> Result<DosageInput> {
    let defaults = &config.defaults;

    let substance = match (&args.compound, &args.species) {
        (Some(compound_id), _) => SubstanceSelector::Synthetic {
            compound_id: compound_id.clone(),
        },
        (None, species) => {
            let species_id = species.as_deref().unwrap_or(&defaults.species);
            let record = catalog.find_species(species_id)?;
            let form = if args.fresh {
                MaterialForm::Fresh
            } else if args.dried {
                MaterialForm::Dried
            } else {
                defaults.form
            };
            SubstanceSelector::Botanical {
                category: record.category,
                species_id: record.id.clone(),
                form,
            }
        }
    };

    let days_since = match (args.days_since, args.last_dose_on) {
        (Some(days), _) => Some(days),
        (None, Some(date)) => Some(days_since(date)),
        (None, None) => None,
    };
    let tolerance = match (args.last_dose_mg, days_since) {
        (Some(last_dose_mg), Some(days_since_last_dose)) => Some(ToleranceInput {
            last_dose_mg,
            days_since_last_dose,
        }),
        (None, None) => None,
        _ => {
            tracing::warn!(
                "Tolerance needs both the last dose amount and its timing; ignoring partial input"
            );
            None
        }
    };

    let mut input = DosageInput::new(
        args.intensity.unwrap_or(IntensityLevel::Moderate),
        substance,
    );
    input.body_weight_kg = args.weight.or(defaults.body_weight_kg);
    input.use_weight_adjustment = args.adjust_weight || defaults.use_weight_adjustment;
    input.tolerance = tolerance;
    input.on_maoi = args.maoi;
    input.drying_quality = args.drying.unwrap_or(defaults.drying_quality);
    input.storage_degradation = args.storage_loss.unwrap_or(0.0);

    tracing::debug!("Built input: {:?}", input);
    Ok(input)
}

/// Whole days between `date` and today
fn days_since(date: NaiveDate) -> f64 {
    let today = chrono::Local::now().date_naive();
    let days = (today - date).num_days();
    if days < 0 {
        tracing::warn!("Last dose date {} is in the future; treating as today", date);
    }
    days as f64
}

fn cmd_species(catalog: &Catalog, category: Option<BotanicalCategory>, json: bool) -> Result<()> {
    let species = catalog.list_species(category);
    if json {
        println!("{}", serde_json::to_string_pretty(&species)?);
        return Ok(());
    }

    for s in species {
        println!(
            "{:<34} {:<26} {:<24} ×{:.2}",
            s.id,
            s.name,
            s.common_name,
            s.relative_potency
        );
    }
    Ok(())
}

fn cmd_compounds(catalog: &Catalog, json: bool) -> Result<()> {
    let compounds = catalog.list_synthetics();
    if json {
        println!("{}", serde_json::to_string_pretty(&compounds)?);
        return Ok(());
    }

    for c in compounds {
        println!("{:<12} {:<26} ×{:.2} vs psilocybin", c.id, c.name, c.equivalent_ratio);
    }
    Ok(())
}

fn cmd_intensities(json: bool) -> Result<()> {
    let tiers = list_intensity_levels();
    if json {
        println!("{}", serde_json::to_string_pretty(&tiers)?);
        return Ok(());
    }

    for tier in tiers {
        println!("{:<10} {}", tier.label, tier.range_description);
    }
    Ok(())
}

/// Days since the last dose, from whichever of the two flags was given
fn resolve_days(days: Option<f64>, last_dose_on: Option<NaiveDate>) -> Result<f64> {
    match (days, last_dose_on) {
        (Some(days), _) => Ok(days),
        (None, Some(date)) => Ok(days_since(date)),
        (None, None) => Err(Error::Config(
            "tolerance needs --days or --last-dose-on".into(),
        )),
    }
}

fn cmd_tolerance(days: Option<f64>, last_dose_on: Option<NaiveDate>, json: bool) -> Result<()> {
    let days = resolve_days(days, last_dose_on)?;
    let status = estimate_tolerance_status(days);

    if json {
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    println!("Tolerance: {}%", status.tolerance_percent);
    println!("Full reset in: {} days", status.days_to_full_reset);
    println!("{}", status.recommendation);
    Ok(())
}

fn cmd_composition(catalog: &Catalog, species_id: &str, json: bool) -> Result<()> {
    let composition = catalog
        .species_composition(species_id)
        .ok_or_else(|| Error::UnknownSpeciesId(species_id.to_string()))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&composition)?);
        return Ok(());
    }

    println!("{} (mg per gram dried)", composition.name);
    println!("  Psilocybin:  {:.1}", composition.psilocybin);
    println!("  Psilocin:    {:.1}", composition.psilocin);
    println!("  Baeocystin:  {:.1}", composition.baeocystin);
    Ok(())
}

fn cmd_config_init(path: Option<&std::path::Path>, force: bool) -> Result<()> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => Config::default_config_path()?,
    };
    if path.exists() && !force {
        println!("Config already exists at {} (use --force to overwrite)", path.display());
        return Ok(());
    }

    Config::default().save_to(&path)?;
    println!("✓ Wrote default config to {}", path.display());
    Ok(())
}

fn substance_name(catalog: &Catalog, substance: &SubstanceSelector) -> String {
    match substance {
        SubstanceSelector::Botanical {
            species_id, form, ..
        } => {
            let name = catalog
                .find_species(species_id)
                .map(|s| s.name.clone())
                .unwrap_or_else(|_| species_id.clone());
            match form {
                MaterialForm::Fresh => format!("{} (fresh)", name),
                MaterialForm::Dried => format!("{} (dried)", name),
            }
        }
        SubstanceSelector::Synthetic { compound_id } => catalog
            .synthetic(compound_id)
            .map(|c| c.name.clone())
            .unwrap_or_else(|_| compound_id.clone()),
    }
}

fn display_result(catalog: &Catalog, input: &DosageInput, result: &DosageResult) {
    let decimals = match result.unit {
        DoseUnit::Grams => 2,
        DoseUnit::Milligrams => 1,
    };
    let unit = result.unit.symbol();
    let breakdown = &result.calculation_breakdown;

    println!("\n╭─────────────────────────────────────────╮");
    println!("│  {} DOSE", input.intensity.label().to_uppercase());
    println!("╰─────────────────────────────────────────╯");
    println!();
    println!("  {}", substance_name(catalog, &input.substance));
    println!();
    println!(
        "  → {:.*} {}  (range {:.*}-{:.*} {})",
        decimals,
        result.amount.median,
        unit,
        decimals,
        result.amount.min,
        decimals,
        result.amount.max,
        unit
    );
    println!(
        "  → {:.1} mg psilocybin-equivalent ({:.1}-{:.1})",
        result.psilocybin_equivalent_mg.median,
        result.psilocybin_equivalent_mg.min,
        result.psilocybin_equivalent_mg.max
    );
    println!("  → Confidence: {}", result.confidence.id());

    if !result.warnings.is_empty() {
        println!();
        for warning in &result.warnings {
            println!("  ⚠ [{:?}] {}", warning.severity, warning.message);
        }
    }

    println!();
    println!("  Breakdown:");
    println!("    Base target        {:.1} mg", breakdown.base_target_mg);
    println!(
        "    After weight       {:.1} mg (×{:.2})",
        breakdown.after_weight_adjustment, breakdown.weight_factor
    );
    println!(
        "    After tolerance    {:.1} mg (×{:.2})",
        breakdown.after_tolerance, breakdown.tolerance_multiplier
    );
    println!(
        "    After MAOI         {:.1} mg (×{:.2})",
        breakdown.after_maoi, breakdown.maoi_factor
    );
    println!(
        "    Potency            {:.2} mg/g ({:.2}-{:.2})",
        breakdown.potency_mg_per_g.median,
        breakdown.potency_mg_per_g.min,
        breakdown.potency_mg_per_g.max
    );

    if !result.notes.is_empty() {
        println!();
        for note in &result.notes {
            println!("  • {}", note);
        }
    }

    for citation in &result.citations {
        println!();
        println!(
            "  ℹ {} ({}) {}",
            citation.authors, citation.year, citation.title
        );
        println!("    {}", citation.link);
    }

    println!();
}

fn parse_intensity(s: &str) -> std::result::Result<IntensityLevel, String> {
    IntensityLevel::from_id(s).ok_or_else(|| {
        format!("unknown intensity '{}' (expected microdose, threshold, light, moderate, strong or heroic)", s)
    })
}

fn parse_category(s: &str) -> std::result::Result<BotanicalCategory, String> {
    match s.to_lowercase().as_str() {
        "mushroom" => Ok(BotanicalCategory::Mushroom),
        "sclerotia" => Ok(BotanicalCategory::Sclerotia),
        _ => Err(format!("unknown category '{}' (expected mushroom or sclerotia)", s)),
    }
}

fn parse_drying(s: &str) -> std::result::Result<DryingQuality, String> {
    match s.to_lowercase().as_str() {
        "optimal" => Ok(DryingQuality::Optimal),
        "average" => Ok(DryingQuality::Average),
        "poor" => Ok(DryingQuality::Poor),
        _ => Err(format!("unknown drying quality '{}' (expected optimal, average or poor)", s)),
    }
}

/// Percent on the command line, fraction in the input
fn parse_storage_loss(s: &str) -> std::result::Result<f64, String> {
    let percent: f64 = s
        .parse()
        .map_err(|_| format!("'{}' is not a number", s))?;
    if !(0.0..=50.0).contains(&percent) {
        return Err(format!("storage loss must be between 0 and 50 percent, got {}", percent));
    }
    Ok(percent / 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_days_prefers_explicit_days() {
        let date = NaiveDate::from_ymd_opt(2000, 1, 1).unwrap();
        assert_eq!(resolve_days(Some(3.0), Some(date)).unwrap(), 3.0);
        assert!(resolve_days(None, Some(date)).unwrap() > 14.0);
    }

    #[test]
    fn test_resolve_days_without_timing_is_an_error() {
        let err = resolve_days(None, None).unwrap_err();
        assert!(err.to_string().contains("--days or --last-dose-on"));
    }
}
