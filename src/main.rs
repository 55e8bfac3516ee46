//! cardiorisk: screening command line
//!
//! Scores patients against a pre-trained classifier artifact and prints a
//! report or JSON results.

use std::io::{BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use cardiorisk::adapters::sanitize::SanitizingMakeWriter;
use cardiorisk::adapters::FileModelProvider;
use cardiorisk::application::report::{self, InputSummary};
use cardiorisk::domain::{ClinicalInput, Gender, HeartAttackInput, Level, PatientInput};
use cardiorisk::ports::{ModelProvider, Predictor};
use cardiorisk::{AssessmentService, PipelineConfig, ToolVariant};

#[derive(Parser, Debug)]
#[command(name = "cardiorisk", version, about = "Cardiovascular risk screening")]
struct Cli {
    /// Screening tool: cardiac, cardiac-hub or heart-attack
    #[arg(long, global = true, default_value = "cardiac")]
    variant: ToolVariant,

    /// Model artifact path (overrides CARDIORISK_MODEL_PATH)
    #[arg(long, global = true)]
    model: Option<PathBuf>,

    /// Operating threshold in [0, 1] (overrides CARDIORISK_THRESHOLD)
    #[arg(long, global = true)]
    threshold: Option<f64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Score a single patient
    Assess {
        /// JSON file with the patient's values ("-" for stdin)
        #[arg(long)]
        input: Option<PathBuf>,

        /// Print the result as JSON instead of a report
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        cardiac: CardiacArgs,
    },
    /// Score a JSON array of patients, one JSON result per output line
    Batch {
        #[arg(long)]
        input: PathBuf,
    },
    /// Load the model artifact and describe it
    CheckModel,
}

/// Cardiac tool values given as flags; defaults match the intake form.
#[derive(Args, Debug)]
struct CardiacArgs {
    #[arg(long, default_value_t = 55)]
    age: u32,
    /// 1 = female, 2 = male
    #[arg(long, default_value_t = 1)]
    gender: u8,
    #[arg(long, default_value_t = 165.0)]
    height: f64,
    #[arg(long, default_value_t = 65.0)]
    weight: f64,
    #[arg(long, default_value_t = 120)]
    systolic: i32,
    #[arg(long, default_value_t = 80)]
    diastolic: i32,
    /// 1 = normal, 2 = above normal, 3 = well above normal
    #[arg(long, default_value_t = 1)]
    cholesterol: u8,
    #[arg(long, default_value_t = 1)]
    glucose: u8,
    #[arg(long)]
    smoker: bool,
    #[arg(long)]
    alcohol: bool,
    #[arg(long)]
    inactive: bool,
}

impl CardiacArgs {
    fn to_input(&self) -> Result<PatientInput> {
        let gender = Gender::from_code(self.gender)
            .with_context(|| format!("gender must be 1 or 2, got {}", self.gender))?;
        let cholesterol = Level::from_code(self.cholesterol)
            .with_context(|| format!("cholesterol must be 1-3, got {}", self.cholesterol))?;
        let glucose = Level::from_code(self.glucose)
            .with_context(|| format!("glucose must be 1-3, got {}", self.glucose))?;

        Ok(PatientInput {
            age: self.age,
            gender,
            height: self.height,
            weight: self.weight,
            systolic_bp: self.systolic,
            diastolic_bp: self.diastolic,
            cholesterol,
            glucose,
            smoker: self.smoker,
            alcohol_user: self.alcohol,
            physically_active: !self.inactive,
        })
    }
}

fn init_logging() -> Result<tracing_appender::non_blocking::WorkerGuard> {
    // stdout carries results, so logs go to stderr unless a file is configured.
    let (writer, guard) = match std::env::var("CARDIORISK_LOG_FILE") {
        Ok(log_file) if !log_file.trim().is_empty() => {
            if let Some(parent) = Path::new(&log_file).parent() {
                let _ = std::fs::create_dir_all(parent);
            }
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&log_file)
                .with_context(|| format!("opening log file {log_file}"))?;
            tracing_appender::non_blocking(file)
        }
        _ => tracing_appender::non_blocking(std::io::stderr()),
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(SanitizingMakeWriter::new(writer)))
        .init();

    Ok(guard)
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let mut raw = String::new();
    if path == Path::new("-") {
        std::io::stdin().read_to_string(&mut raw)?;
    } else {
        raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
    }
    serde_json::from_str(&raw).with_context(|| format!("parsing {}", path.display()))
}

fn assess_one<I>(
    service: &AssessmentService<FileModelProvider>,
    title: &str,
    input: I,
    json: bool,
) -> Result<()>
where
    I: ClinicalInput + InputSummary + Serialize,
{
    let result = service.assess(input)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print!("{}", report::render(title, &result));
    }
    Ok(())
}

fn run_batch<I>(service: &AssessmentService<FileModelProvider>, path: &Path) -> Result<()>
where
    I: ClinicalInput + Serialize + DeserializeOwned,
{
    let inputs: Vec<I> = read_json(path)?;
    let stdout = std::io::stdout();
    let mut out = BufWriter::new(stdout.lock());

    for (index, outcome) in service.assess_batch(inputs).into_iter().enumerate() {
        let line = match outcome {
            Ok(result) => serde_json::to_string(&result)?,
            Err(e) => serde_json::json!({ "index": index, "error": e.to_string() }).to_string(),
        };
        writeln!(out, "{line}")?;
    }
    out.flush()?;
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let _guard = init_logging()?;

    let mut config = PipelineConfig::from_env(cli.variant)?;
    if let Some(model) = &cli.model {
        config = config.with_model_path(model);
    }
    if let Some(threshold) = cli.threshold {
        config = config.with_threshold(threshold)?;
    }
    tracing::info!(
        "Starting cardiorisk (variant={}, threshold={:.2})",
        config.variant(),
        config.threshold()
    );

    let provider = Arc::new(config.model_provider());
    let service = AssessmentService::new(Arc::clone(&provider), config.scorer());
    let variant = config.variant();

    match cli.command {
        Command::CheckModel => {
            let model = provider
                .load()
                .with_context(|| format!("loading {}", config.model_path().display()))?;
            println!("{}: {} model", config.model_path().display(), model.kind());
            println!("features ({}): {}", model.feature_names().len(), model.feature_names().join(", "));
            match variant {
                ToolVariant::HeartAttack => service.initialize::<HeartAttackInput>()?,
                _ => service.initialize::<PatientInput>()?,
            }
            println!("feature order matches the {variant} tool");
        }
        Command::Assess {
            input,
            json,
            cardiac,
        } => match (variant, input) {
            (ToolVariant::HeartAttack, Some(path)) => {
                let input: HeartAttackInput = read_json(&path)?;
                assess_one(&service, variant.title(), input, json)?;
            }
            (ToolVariant::HeartAttack, None) => {
                bail!("the heart-attack tool needs --input <file.json>");
            }
            (_, Some(path)) => {
                let input: PatientInput = read_json(&path)?;
                assess_one(&service, variant.title(), input, json)?;
            }
            (_, None) => {
                assess_one(&service, variant.title(), cardiac.to_input()?, json)?;
            }
        },
        Command::Batch { input } => match variant {
            ToolVariant::HeartAttack => run_batch::<HeartAttackInput>(&service, &input)?,
            _ => run_batch::<PatientInput>(&service, &input)?,
        },
    }

    tracing::info!("cardiorisk finished.");
    Ok(())
}
