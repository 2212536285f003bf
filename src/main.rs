use anyhow::{Context, Result};
use clap::Parser;
use console::{style, Term};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use caption_forge::cli::{Cli, Commands};
use caption_forge::config::Config;
use caption_forge::pipeline::{ContentPipeline, GenerationRequest};
use caption_forge::{output, utils};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize tracing
    let default_filter = if cli.verbose {
        "caption_forge=debug"
    } else {
        "caption_forge=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(e) = run(cli).await {
        eprintln!("{} {:#}", style("error:").red().bold(), e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    if let Commands::Config { init: true, .. } = cli.command {
        let path = match cli.config {
            Some(path) => path,
            None => Config::default_save_path()?,
        };
        if path.exists() {
            anyhow::bail!("Config file already exists: {}", path.display());
        }
        Config::default().save(&path)?;
        println!("Default configuration written to: {}", path.display());
        return Ok(());
    }

    let mut config = Config::load(cli.config.as_deref())?;
    if cli.quiet {
        config.app.show_progress = false;
    }

    match cli.command {
        Commands::Generate {
            url,
            api_key,
            language,
            output,
            format,
        } => {
            let api_key = match api_key {
                Some(key) => key,
                None => prompt_api_key()?,
            };
            let request = GenerationRequest {
                url,
                api_key,
                language: language.unwrap_or(config.synthesis.default_language),
            };
            let format = format.unwrap_or(config.app.default_output_format);

            let pipeline = ContentPipeline::new(&config)?;

            tracing::info!("Starting generation for URL: {}", request.url);
            let result = pipeline.generate(&request).await?;

            let meta = &result.metadata;
            eprintln!(
                "{} {} captions from {} in {}",
                style("Success!").green().bold(),
                meta.caption_track.locale_code(),
                utils::extract_domain(&meta.endpoint).unwrap_or_else(|| meta.endpoint.clone()),
                utils::format_duration(meta.processing_duration)
            );
            if meta.truncated {
                eprintln!(
                    "   (transcript of {} characters was truncated to {})",
                    meta.transcript_chars, config.synthesis.max_transcript_chars
                );
            }

            match output {
                Some(path) => {
                    output::save_to_file(&result, &path, format)?;
                    println!("Content saved to: {}", path.display());
                }
                None => {
                    output::print_to_console(&result, format)?;
                }
            }
        }
        Commands::Fetch { url, output } => {
            let pipeline = ContentPipeline::new(&config)?;
            let transcript = pipeline.fetch_only(&url).await?;

            output::write_transcript(&transcript, output.as_deref())?;
            if let Some(path) = output {
                println!(
                    "Captions ({}) saved to: {}",
                    transcript.track.locale_code(),
                    path.display()
                );
            }
        }
        Commands::Config { show, .. } => {
            if show {
                config.display();
            } else {
                match cli.config.clone().or_else(Config::config_path) {
                    Some(path) if path.exists() => println!("Config file: {}", path.display()),
                    Some(path) => println!("No config file yet (defaults in use): {}", path.display()),
                    None => println!("No config directory found; defaults in use"),
                }
                println!("Run `caption-forge config --show` to print the settings or `--init` to create the file.");
            }
        }
        Commands::Proxies => {
            println!("Caption proxies (tried in this order):");
            for (i, endpoint) in config.proxy.endpoints.iter().enumerate() {
                println!(
                    "  {}. {}",
                    i + 1,
                    utils::extract_domain(endpoint).unwrap_or_else(|| endpoint.clone())
                );
            }
        }
    }

    Ok(())
}

/// Ask for the API key without echoing it; only when attached to a terminal
fn prompt_api_key() -> Result<String> {
    let term = Term::stderr();
    if !term.is_term() {
        return Ok(String::new());
    }

    term.write_str("Enter Gemini API Key: ")
        .context("Failed to write prompt")?;
    term.read_secure_line().context("Failed to read API key")
}
