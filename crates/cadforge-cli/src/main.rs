//! CadForge CLI - natural language to validated CAD exports.
//!
//! ## Commands
//!
//! - `generate`: run one description through the full pipeline and archive
//!   the exports
//! - `chat`: interactive loop, one generation run per line

use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::Level;

use cadforge_core::{
    archive_exports, init_tracing, GenerationPipeline, PipelineError, RetryPolicy, SandboxConfig,
};
use cadforge_llm::{
    ChatClient, DesignPlanner, ModelConfig, ScriptGenerator, StaticKnowledgeBase,
};

#[derive(Parser)]
#[command(name = "cadforge")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "LLM-driven parametric CAD generation", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Clone)]
struct RunOptions {
    /// Sandbox working directory the candidate writes its exports into
    #[arg(long, env = "CADFORGE_WORKDIR", default_value = ".cadforge/work")]
    workdir: PathBuf,

    /// Directory validated exports are archived into
    #[arg(long, env = "CADFORGE_OUT_DIR", default_value = "out")]
    out_dir: PathBuf,

    /// Maximum candidate attempts per run
    #[arg(long, env = "CADFORGE_MAX_ATTEMPTS", default_value_t = 3)]
    max_attempts: u32,

    /// Hard wall-clock deadline for one sandbox execution (seconds)
    #[arg(long, env = "CADFORGE_SANDBOX_TIMEOUT_SECS", default_value_t = 60)]
    timeout_secs: u64,

    /// Interpreter used to run the sandbox driver
    #[arg(long, env = "CADFORGE_PYTHON", default_value = "python3")]
    python_bin: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate, validate, and export one object from a description
    Generate {
        /// Natural-language description of the object
        prompt: String,

        #[command(flatten)]
        options: RunOptions,
    },

    /// Interactive loop: one generation run per line, `exit` to quit
    Chat {
        #[command(flatten)]
        options: RunOptions,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    init_tracing(cli.json, level);

    match cli.command {
        Commands::Generate { prompt, options } => run_once(&prompt, &options).await,
        Commands::Chat { options } => chat_loop(&options).await,
    }
}

async fn run_once(prompt: &str, options: &RunOptions) -> Result<()> {
    let model_config = ModelConfig::from_env();
    let planner = DesignPlanner::new(
        ChatClient::new(model_config.clone()).context("building planner client")?,
    );

    let dimensions = planner
        .extract_dimensions(prompt)
        .await
        .context("extracting dimensions")?;
    println!("▶ Dimensions:\n{dimensions}");

    let brief = planner
        .design_brief(prompt, &dimensions)
        .await
        .context("synthesizing design brief")?;
    println!("▶ Design instructions:");
    for (i, step) in brief.design_instructions.iter().enumerate() {
        println!("  {}. {step}", i + 1);
    }

    let mut sandbox =
        SandboxConfig::in_workdir(&options.workdir).with_timeout_secs(options.timeout_secs);
    sandbox.python_bin = options.python_bin.clone();

    let generator = ScriptGenerator::new(
        ChatClient::new(model_config).context("building generator client")?,
        Arc::new(StaticKnowledgeBase::bundled()),
        brief.clone(),
        dimensions,
    );

    let pipeline = GenerationPipeline::new(generator, sandbox)
        .context("configuring sandbox")?
        .with_policy(RetryPolicy {
            max_attempts: options.max_attempts,
        });

    match pipeline.run(prompt).await {
        Ok(success) => {
            let archived = archive_exports(&options.workdir, &options.out_dir, &brief.object_name)
                .context("archiving exports")?;
            println!(
                "▶ Validated after {} attempt(s) ({} ms)",
                success.attempts.len(),
                success.duration_ms
            );
            for warning in &success.artifact.warnings {
                println!("  warning: {warning}");
            }
            println!("▶ Exports:");
            for path in archived {
                println!("  {}", path.display());
            }
            Ok(())
        }
        Err(PipelineError::ExhaustedRetries {
            attempts, last, ..
        }) => {
            println!("▶ No valid program after {attempts} attempt(s)");
            println!("  last failure: {last}");
            for warning in &last.warnings {
                println!("  warning: {warning}");
            }
            Err(anyhow!("generation exhausted {attempts} attempt(s)"))
        }
        Err(err) => Err(err).context("pipeline run failed"),
    }
}

async fn chat_loop(options: &RunOptions) -> Result<()> {
    let stdin = std::io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        print!("User: ");
        std::io::stdout().flush().ok();

        let Some(line) = lines.next() else {
            break;
        };
        let prompt = line.context("reading stdin")?;
        let prompt = prompt.trim();

        if prompt.is_empty() {
            continue;
        }
        if prompt == "exit" {
            break;
        }

        if let Err(err) = run_once(prompt, options).await {
            eprintln!("error: {err:#}");
        }
    }
    Ok(())
}
