use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use crisisbrief_common::{logger, AppConfig};
use crisisbrief_llm::{AbstractionLevel, AudienceRole, GenerationRequest, OllamaClient, Summarizer};
use crisisbrief_report::{evaluate_batch, normalize_headers, rouge, today};
use crisisbrief_server::{ollama_engine_cache, PipelineOutputs, ReportPipeline};
use crisisbrief_stt::{create_transcriber, transcribe_file};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Find project root by looking for .git directory
fn find_project_root() -> Option<PathBuf> {
    let mut current_dir = std::env::current_dir().ok()?;

    loop {
        if current_dir.join(".git").exists() {
            return Some(current_dir);
        }

        if !current_dir.pop() {
            break;
        }
    }

    None
}

/// Load .env file from project root
fn load_dotenv_from_project_root() {
    if let Some(root) = find_project_root() {
        let env_path = root.join(".env");
        if env_path.exists() {
            dotenv::from_path(&env_path).ok();
        }
    } else {
        dotenv::dotenv().ok();
    }
}

#[derive(Parser)]
#[command(name = "crisisbrief")]
#[command(about = "CrisisBrief - multi-audience disaster report summarization", long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve {
        #[arg(long)]
        host: Option<String>,

        #[arg(long)]
        port: Option<u16>,
    },

    /// Summarize a disaster report
    Summarize {
        /// Report text (otherwise --file or stdin)
        #[arg(long, conflicts_with = "file")]
        text: Option<String>,

        #[arg(long)]
        file: Option<PathBuf>,

        /// Structured assessment report instead of the strategic summary
        #[arg(long)]
        structured: bool,

        /// Single guided pass for this audience
        #[arg(long, requires = "level")]
        role: Option<AudienceRole>,

        /// Abstraction level of the guided pass
        #[arg(long, requires = "role")]
        level: Option<AbstractionLevel>,

        #[arg(long, default_value_t = 30)]
        min_length: usize,

        #[arg(long, default_value_t = 130)]
        max_length: usize,

        /// Model override
        #[arg(long)]
        model: Option<String>,

        /// Use the alternate model family
        #[arg(long)]
        alternate: bool,

        /// Print the plain-text export instead
        #[arg(long)]
        export: bool,
    },

    /// Transcribe an audio file
    Transcribe {
        audio: PathBuf,

        #[arg(long)]
        language: Option<String>,

        /// Prefix segments with timestamps
        #[arg(long)]
        timestamps: bool,
    },

    /// Transcribe an audio file and summarize the transcript
    Process {
        audio: PathBuf,

        #[arg(long)]
        language: Option<String>,

        #[arg(long)]
        structured: bool,

        #[arg(long)]
        export: bool,
    },

    /// ROUGE scores of a candidate summary against a reference
    Evaluate {
        reference: PathBuf,

        candidate: PathBuf,

        /// Score line by line and average
        #[arg(long)]
        per_line: bool,
    },

    /// Canonicalize section headers of a report file
    Normalize { file: PathBuf },

    /// Check that the Ollama server is reachable
    Check,
}

fn read_input(text: Option<String>, file: Option<&Path>) -> Result<String> {
    if let Some(text) = text {
        return Ok(text);
    }
    if let Some(path) = file {
        return std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()));
    }

    let mut buffer = String::new();
    std::io::stdin()
        .read_to_string(&mut buffer)
        .context("Failed to read report from stdin")?;
    Ok(buffer)
}

fn print_outputs(outputs: &PipelineOutputs) {
    println!("\nGENERAL PUBLIC ALERT:\n{}", outputs.alert);
    println!("\nEMERGENCY RESPONDER OPERATIONAL SUMMARY:\n{}", outputs.operational);
    if let Some(strategic) = &outputs.strategic {
        println!("\nAUTHORITIES STRATEGIC SUMMARY:\n{}", strategic);
    }
    if let Some(report) = &outputs.structured_report {
        println!("\nAUTHORITIES STRUCTURED ASSESSMENT REPORT:\n{}", report);
    }
}

async fn summarizer_for(config: &AppConfig, model: Option<String>, alternate: bool) -> Result<Arc<Summarizer>> {
    let mut engine = config.engine_config();
    if let Some(model) = model {
        engine.model = model;
    }
    if alternate {
        engine.use_alternate_family = true;
    }

    Ok(ollama_engine_cache(config).get_or_create(&engine).await?)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    load_dotenv_from_project_root();
    let mut config = AppConfig::load(cli.config.as_deref())?;

    match cli.command.unwrap_or(Commands::Serve { host: None, port: None }) {
        Commands::Serve { host, port } => {
            if let Some(host) = host {
                config.server_host = host;
            }
            if let Some(port) = port {
                config.server_port = port;
            }
            config.validate()?;
            config.ensure_directories()?;
            logger::setup_logging(&config.log_dir, &config.log_level)?;

            tracing::info!("CrisisBrief starting...");
            tracing::info!("  Bind: {}", config.server_bind_address());
            tracing::info!("  Ollama: {}", config.ollama_base_url);
            tracing::info!("  Model: {}", config.engine_config().resolved_model());

            println!("Server listening on http://{}", config.server_bind_address());
            crisisbrief_server::start_server(config).await?;
        }

        Commands::Summarize {
            text,
            file,
            structured,
            role,
            level,
            min_length,
            max_length,
            model,
            alternate,
            export,
        } => {
            logger::setup_console_logging(&config.log_level)?;
            if min_length > max_length {
                anyhow::bail!(
                    "--min-length ({}) must not exceed --max-length ({})",
                    min_length,
                    max_length
                );
            }
            let input = read_input(text, file.as_deref())?;
            let summarizer = summarizer_for(&config, model, alternate).await?;

            if let (Some(role), Some(level)) = (role, level) {
                let request = GenerationRequest::try_new(input, min_length, max_length)?.for_audience(role, level);
                println!("{}", summarizer.run(&request).await);
                return Ok(());
            }

            let pipeline = ReportPipeline::new(summarizer, create_transcriber(&config));
            let outputs = pipeline.summarize(&input, structured).await;

            if export {
                print!("{}", outputs.into_export(&input, None).render_plain_text());
            } else {
                print_outputs(&outputs);
            }
        }

        Commands::Transcribe {
            audio,
            language,
            timestamps,
        } => {
            logger::setup_console_logging(&config.log_level)?;
            let transcriber = create_transcriber(&config);
            let transcription = tokio::task::spawn_blocking(move || {
                transcribe_file(transcriber.as_ref(), &audio, language.as_deref())
            })
            .await??;

            if timestamps {
                println!("{}", transcription.to_timestamped_text());
            } else {
                println!("{}", transcription.text);
            }
        }

        Commands::Process {
            audio,
            language,
            structured,
            export,
        } => {
            logger::setup_console_logging(&config.log_level)?;
            let bytes = std::fs::read(&audio).with_context(|| format!("Failed to read {}", audio.display()))?;
            let suffix = audio
                .extension()
                .and_then(|e| e.to_str())
                .unwrap_or("wav")
                .to_string();

            let summarizer = summarizer_for(&config, None, false).await?;
            let pipeline = ReportPipeline::new(summarizer, create_transcriber(&config));
            let outputs = pipeline.process_audio(bytes, &suffix, language, structured).await?;

            if export {
                let transcript = outputs.transcript.clone();
                let bundle = outputs.summaries.into_export(&transcript, Some(transcript.clone()));
                print!("{}", bundle.render_plain_text());
            } else {
                println!("TRANSCRIBED TEXT:\n{}", outputs.transcript);
                print_outputs(&outputs.summaries);
            }
        }

        Commands::Evaluate {
            reference,
            candidate,
            per_line,
        } => {
            logger::setup_console_logging(&config.log_level)?;
            let reference = std::fs::read_to_string(&reference)
                .with_context(|| format!("Failed to read {}", reference.display()))?;
            let candidate = std::fs::read_to_string(&candidate)
                .with_context(|| format!("Failed to read {}", candidate.display()))?;

            let metrics = if per_line {
                let lines = |text: &str| -> Vec<String> {
                    text.lines()
                        .map(str::trim)
                        .filter(|line| !line.is_empty())
                        .map(str::to_string)
                        .collect()
                };
                evaluate_batch(&lines(&reference), &lines(&candidate))?
            } else {
                rouge(&reference, &candidate)
            };

            println!("{}", metrics.render("Evaluation Metrics"));
        }

        Commands::Normalize { file } => {
            let text = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            println!("{}", normalize_headers(&text, today()));
        }

        Commands::Check => {
            logger::setup_console_logging(&config.log_level)?;
            let engine = config.engine_config();
            let client = OllamaClient::new(config.ollama_base_url.clone(), &engine)?;

            if client.test_connection().await? {
                println!("Ollama reachable at {} (model: {})", config.ollama_base_url, engine.resolved_model());
            } else {
                anyhow::bail!("Ollama at {} did not respond", config.ollama_base_url);
            }
        }
    }

    Ok(())
}
