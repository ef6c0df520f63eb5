mod profile;

use clap::{Args, Parser, Subcommand};
use profile::{
    JsonProfileStore, PatientProfile, ProfileStore, KNOWN_ALLERGIES, KNOWN_CONDITIONS,
};
use rxdose_core::*;
use std::borrow::Cow;
use std::io::Read;
use std::path::PathBuf;

/// Key under which the CLI keeps its single saved profile
const PROFILE_KEY: &str = "default";

#[derive(Parser)]
#[command(name = "rxdose")]
#[command(about = "Medication lookup and pediatric dosage recommendations", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Drug database CSV (overrides config)
    #[arg(long, global = true, conflicts_with = "sample_db")]
    db: Option<PathBuf>,

    /// Use the bundled sample drug database
    #[arg(long, global = true)]
    sample_db: bool,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Enable debug logging
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Show database summary and available features (default)
    Dashboard,

    /// List every medication in the database
    List,

    /// Look up one medication and compute dosage recommendations
    Check {
        /// Generic name (case-insensitive)
        drug: String,

        #[command(flatten)]
        patient: PatientArgs,
    },

    /// Run the single-drug check for several medications
    Multi {
        /// Generic names, in display order
        #[arg(required = true)]
        drugs: Vec<String>,

        #[command(flatten)]
        patient: PatientArgs,
    },

    /// Find medications in prescription text (reads stdin if no input given)
    Parse {
        /// Prescription text
        #[arg(long, group = "input")]
        text: Option<String>,

        /// File with prescription text, e.g. OCR output
        #[arg(long, group = "input")]
        file: Option<PathBuf>,

        /// Use the built-in sample prescription
        #[arg(long, group = "input")]
        sample: bool,

        #[command(flatten)]
        patient: PatientArgs,
    },

    /// Manage the saved patient profile
    Profile {
        #[command(subcommand)]
        action: ProfileAction,
    },
}

#[derive(Subcommand)]
enum ProfileAction {
    /// Save the patient profile
    Save {
        #[arg(long, value_parser = clap::value_parser!(u32).range(0..=120))]
        age: u32,

        #[arg(long, value_parser = parse_weight)]
        weight: f64,

        /// Height in cm
        #[arg(long, value_parser = clap::value_parser!(u32).range(50..))]
        height: u32,

        /// Medical condition (repeatable)
        #[arg(long = "condition", value_parser = KNOWN_CONDITIONS.to_vec())]
        conditions: Vec<String>,

        /// Drug allergy (repeatable)
        #[arg(long = "allergy", value_parser = KNOWN_ALLERGIES.to_vec())]
        allergies: Vec<String>,
    },

    /// Show the saved patient profile
    Show,
}

#[derive(Args, Clone, Copy)]
struct PatientArgs {
    /// Patient age in years (defaults to saved profile, then config)
    #[arg(long, value_parser = clap::value_parser!(u32).range(0..=120))]
    age: Option<u32>,

    /// Patient weight in kg (defaults to saved profile, then config)
    #[arg(long, value_parser = parse_weight)]
    weight: Option<f64>,
}

fn parse_weight(s: &str) -> std::result::Result<f64, String> {
    let weight: f64 = s.parse().map_err(|_| format!("'{}' is not a number", s))?;
    if weight > 0.0 && weight.is_finite() {
        Ok(weight)
    } else {
        Err("weight must be greater than 0".into())
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.verbose {
        rxdose_core::logging::init_with_level("debug");
    } else {
        rxdose_core::logging::init();
    }

    let mut config = Config::load()?;
    if let Some(data_dir) = cli.data_dir.clone() {
        config.data.data_dir = data_dir;
    }
    if let Some(db) = cli.db.clone() {
        config.data.drug_db = Some(db);
    }

    // Registry-backed commands load the database first; a missing one is fatal
    let open_registry = || -> Result<Cow<'static, DrugRegistry>> {
        if cli.sample_db {
            Ok(Cow::Borrowed(sample_registry()))
        } else {
            DrugRegistry::load(&config.drug_db_path()).map(Cow::Owned)
        }
    };

    match cli.command.unwrap_or(Commands::Dashboard) {
        Commands::Profile { action } => cmd_profile(action, &config, cli.json),
        Commands::Dashboard => cmd_dashboard(&*open_registry()?, cli.json),
        Commands::List => cmd_list(&*open_registry()?, cli.json),
        Commands::Check { drug, patient } => {
            let registry = open_registry()?;
            let patient = resolve_patient(patient, &config)?;
            let result = Recommender::new(&registry).recommend_for(&drug, &patient);
            render_results(&[result], &patient, cli.json)
        }
        Commands::Multi { drugs, patient } => {
            let registry = open_registry()?;
            let patient = resolve_patient(patient, &config)?;
            let results = Recommender::new(&registry).recommend_for_each(drugs.as_slice(), &patient);
            if !cli.json {
                println!("Selected {} medications for analysis", drugs.len());
            }
            render_results(&results, &patient, cli.json)
        }
        Commands::Parse {
            text,
            file,
            sample,
            patient,
        } => {
            let registry = open_registry()?;
            let patient = resolve_patient(patient, &config)?;
            let text = read_prescription_text(text, file, sample)?;
            let results = Recommender::new(&registry).recommend_for_text(Some(&text), &patient);
            if results.is_empty() && !cli.json {
                println!("No medications found in the text. Make sure drug names match your database.");
                return Ok(());
            }
            if !cli.json {
                println!("Found {} medication(s)", results.len());
            }
            render_results(&results, &patient, cli.json)
        }
    }
}

fn cmd_dashboard(registry: &DrugRegistry, json: bool) -> Result<()> {
    if json {
        let summary = serde_json::json!({ "total_medications": registry.len() });
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    let today = chrono::Local::now().format("%A, %B %d, %Y");
    println!("Good day! Today is {}", today);
    println!();
    println!("  Total medications: {}", registry.len());
    println!();
    println!("  check    Look up a medication and get dosage recommendations");
    println!("  multi    Run the single-drug check for several medications");
    println!("  parse    Extract medications from prescription or OCR text");
    println!("  profile  Save patient details used as defaults");
    println!();
    println!("For educational purposes only. Always consult healthcare professionals.");
    Ok(())
}

fn cmd_list(registry: &DrugRegistry, json: bool) -> Result<()> {
    let names = registry.all_names();
    if json {
        println!("{}", serde_json::to_string_pretty(&names)?);
    } else {
        for name in names {
            println!("{}", name);
        }
    }
    Ok(())
}

fn cmd_profile(action: ProfileAction, config: &Config, json: bool) -> Result<()> {
    let mut store = JsonProfileStore::new(config.profiles_path());

    match action {
        ProfileAction::Save {
            age,
            weight,
            height,
            conditions,
            allergies,
        } => {
            let profile = PatientProfile {
                age,
                weight_kg: weight,
                height_cm: height,
                conditions,
                allergies,
                saved_at: chrono::Utc::now(),
            };
            store.put(PROFILE_KEY, profile)?;
            println!("✓ Profile saved!");
            println!("  File: {}", store.path().display());
        }
        ProfileAction::Show => match store.get(PROFILE_KEY)? {
            Some(profile) if json => println!("{}", serde_json::to_string_pretty(&profile)?),
            Some(profile) => {
                println!("Age: {}", profile.age);
                println!("Weight: {} kg", profile.weight_kg);
                println!("Height: {} cm", profile.height_cm);
                println!("Conditions: {}", join_or_none(&profile.conditions));
                println!("Allergies: {}", join_or_none(&profile.allergies));
                println!("Saved: {}", profile.saved_at.to_rfc3339());
            }
            None => println!("No saved profile."),
        },
    }
    Ok(())
}

/// Flag, then saved profile, then config default, per field
fn resolve_patient(args: PatientArgs, config: &Config) -> Result<PatientParameters> {
    let profile = if args.age.is_none() || args.weight.is_none() {
        JsonProfileStore::new(config.profiles_path()).get(PROFILE_KEY)?
    } else {
        None
    };

    let saved = profile.as_ref().map(PatientProfile::patient_parameters);

    let age = args
        .age
        .map(f64::from)
        .or(saved.map(|p| p.age))
        .unwrap_or_else(|| f64::from(config.patient.default_age));
    let weight_kg = args
        .weight
        .or(saved.map(|p| p.weight_kg))
        .unwrap_or(config.patient.default_weight_kg);

    tracing::debug!("Resolved patient: {} years, {} kg", age, weight_kg);
    Ok(PatientParameters::new(age, weight_kg))
}

fn read_prescription_text(
    text: Option<String>,
    file: Option<PathBuf>,
    sample: bool,
) -> Result<String> {
    if let Some(text) = text {
        return Ok(text);
    }
    if let Some(path) = file {
        return Ok(std::fs::read_to_string(path)?);
    }
    if sample {
        return Ok(SAMPLE_PRESCRIPTION.to_string());
    }

    let mut buffer = String::new();
    std::io::stdin().read_to_string(&mut buffer)?;
    Ok(buffer)
}

fn render_results(
    results: &[RecommendationResult],
    patient: &PatientParameters,
    json: bool,
) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(results)?);
        return Ok(());
    }

    println!("Patient: {} years, {} kg", patient.age, patient.weight_kg);

    for result in results {
        println!();
        match result {
            RecommendationResult::Found {
                drug,
                recommendations,
                ..
            } => {
                println!("── {} ──", drug.generic_name);
                println!("  Drug Class: {}", or_na(&drug.drug_class));
                println!("  Common Uses: {}", or_na(&drug.common_uses));
                println!("  Side Effects: {}", or_na(&drug.side_effects));
                println!("  Contraindications: {}", or_na(&drug.contraindications));
                println!("  Adult Dose: {}", or_na(&drug.adult_dose));

                if !recommendations.is_empty() {
                    println!("  Dosage Recommendations:");
                    for (rule, dose) in recommendations.iter() {
                        println!("    → {}: {} mg", rule, dose);
                    }
                }
            }
            RecommendationResult::NotFound { name } => {
                println!("⚠ Drug '{}' not found in database", name);
            }
        }
    }

    Ok(())
}

fn or_na(field: &Option<String>) -> &str {
    field.as_deref().unwrap_or("N/A")
}

fn join_or_none(items: &[String]) -> String {
    if items.is_empty() {
        "none".into()
    } else {
        items.join(", ")
    }
}
