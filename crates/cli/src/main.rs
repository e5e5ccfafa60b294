use clap::{Parser, Subcommand};
use clinrisk_core::{
    resolve_model_dir, AppConfig, Gender, InferenceContext, ModelRegistry, VitalsRecord,
};
use std::collections::HashMap;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "clinrisk")]
#[command(about = "Clinical risk engine CLI")]
struct Cli {
    /// Directory holding the six model artifacts (defaults to CLINRISK_MODEL_DIR, then models/)
    #[arg(long, global = true)]
    model_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Load every model artifact and report what was found
    CheckModels,
    /// Run stage-1 screening on a set of vitals
    Screen {
        #[arg(long)]
        age: i64,
        /// Male or Female
        #[arg(long)]
        gender: String,
        #[arg(long)]
        systolic_bp: f64,
        #[arg(long)]
        diastolic_bp: f64,
        #[arg(long)]
        glucose: i64,
        #[arg(long)]
        cholesterol: f64,
        #[arg(long)]
        bmi: f64,
        /// 1 if the patient smokes
        #[arg(long, default_value_t = 0)]
        smoking: i64,
        /// 1 if the patient drinks alcohol
        #[arg(long, default_value_t = 0)]
        alcohol: i64,
        /// 1 if there is a family history of disease
        #[arg(long, default_value_t = 0)]
        family_history: i64,
    },
    /// Run stage-2 risk estimation for one disease
    Assess {
        /// heart, diabetes or hypertension
        disease: String,
        /// Form field as key=value (repeatable), e.g. -f Glucose=120
        #[arg(short = 'f', long = "field", value_parser = parse_field)]
        fields: Vec<(String, String)>,
        /// Reject unknown diseases instead of falling through to diabetes
        #[arg(long)]
        strict: bool,
    },
}

fn parse_field(input: &str) -> Result<(String, String), String> {
    match input.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected key=value, got {input:?}")),
    }
}

fn load_registry(model_dir: Option<PathBuf>) -> Result<ModelRegistry, Box<dyn std::error::Error>> {
    let mut cfg = AppConfig::from_env()?;
    if let Some(dir) = model_dir {
        cfg = cfg.with_model_dir(dir);
    }
    let dir = resolve_model_dir(cfg.model_dir_override())?;
    println!("Loading models from {}", dir.display());
    Ok(ModelRegistry::load(&dir)?)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::CheckModels) => {
            let registry = load_registry(cli.model_dir)?;
            for (disease, stage, classifier) in registry.entries() {
                println!(
                    "{disease} {stage}: {} ({} features)",
                    classifier.name(),
                    classifier.feature_names().len()
                );
            }
            println!("All models loaded.");
        }
        Some(Commands::Screen {
            age,
            gender,
            systolic_bp,
            diastolic_bp,
            glucose,
            cholesterol,
            bmi,
            smoking,
            alcohol,
            family_history,
        }) => {
            let ctx = InferenceContext::new(load_registry(cli.model_dir)?, false);
            let vitals = VitalsRecord {
                age,
                gender: Gender::from_form_value(&gender),
                systolic_bp,
                diastolic_bp,
                glucose,
                cholesterol,
                bmi,
                smoking,
                alcohol,
                family_history,
            };
            let screening = ctx.screen(&vitals)?;
            for ranked in &screening.ranking {
                println!("{:<14} {:.3}", ranked.disease.as_str(), ranked.probability);
            }
            println!("Top disease: {}", screening.top_disease);
        }
        Some(Commands::Assess {
            disease,
            fields,
            strict,
        }) => {
            let ctx = InferenceContext::new(load_registry(cli.model_dir)?, strict);
            let fields: HashMap<String, String> = fields.into_iter().collect();
            let assessment = ctx.assess_form(&disease, &fields)?;
            println!("Disease: {}", assessment.disease.as_str().to_uppercase());
            println!("Probability: {}", assessment.probability);
            println!("Risk: {}", assessment.tier);
            println!("{}", assessment.note);
            println!("{}", assessment.disclaimer);
        }
        None => {
            println!("Use 'clinrisk --help' for commands");
        }
    }

    Ok(())
}
