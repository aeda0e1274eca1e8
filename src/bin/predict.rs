use anyhow::{Context, Result};
use clap::Parser;
use emotion_service::pipeline::EmotionPrediction;
use emotion_service::{artifacts, config};
use std::path::PathBuf;

#[derive(Parser)]
#[clap(
    name = env!("CARGO_BIN_NAME"),
    about = "Predict the emotion of a piece of text with the local model artifacts",
    rename_all = "kebab-case",
    version
)]
struct Args {
    /// Configuration file; defaults apply when omitted.
    #[clap(long, short)]
    config: Option<PathBuf>,

    /// Override the artifacts directory from the configuration.
    #[clap(long)]
    model_dir: Option<PathBuf>,

    /// Print the raw JSON result instead of a report.
    #[clap(long)]
    json: bool,

    /// Text to classify. Multiple arguments are joined with spaces.
    #[clap(required = true)]
    text: Vec<String>,
}

fn render_report(prediction: &EmotionPrediction) -> String {
    let mut out = String::new();
    out.push_str(&format!("Input text: {}\n", prediction.input_text));
    out.push_str(&format!(
        "Predicted emotion: {}\n",
        prediction.predicted_emotion
    ));
    out.push_str(&format!("Confidence: {:.2}%\n", prediction.confidence));
    out.push_str("\nAll emotion probabilities:\n");
    for score in &prediction.all_emotions {
        out.push_str(&format!("  {}: {:.2}%\n", score.emotion, score.probability));
    }
    out
}

async fn run(args: Args) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => config::load_from_path(path)
            .await
            .with_context(|| format!("failed to load {}", path.display()))?,
        None => config::Config::default(),
    };
    if let Some(dir) = args.model_dir {
        config.model.artifacts_dir = dir;
    }
    config::validate(&config)?;

    let model_config = config.model.clone();
    let pipeline = tokio::task::spawn_blocking(move || artifacts::load_pipeline(&model_config))
        .await?
        .context("failed to load model artifacts")?;

    let text = args.text.join(" ");
    let prediction = pipeline.predict(&text)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&prediction)?);
    } else {
        print!("{}", render_report(&prediction));
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(Args::parse()).await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
