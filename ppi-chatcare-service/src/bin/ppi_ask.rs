use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use ppi_chatcare_service::{ServiceConfig, answer_question, build_assistant};
use ppi_guidance::{
    SUPPORTED_INDICATIONS, SUPPORTED_PPIS, canonical_drug_name, extract_citations,
    generate_patient_handout, handout_file_name, lookup_interaction,
};
use std::fs;
use std::io::Read;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ppi-ask")]
#[command(version)]
#[command(about = "PPI interaction checks, handouts and referenced answers from the terminal", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check a PPI against another medication
    Interaction {
        /// Proton pump inhibitor, e.g. omeprazole
        #[arg(long)]
        ppi: String,

        /// Other medication, e.g. clopidogrel
        #[arg(long)]
        drug: String,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Extract `[n] ...` references from text (reads stdin when no text is given)
    Citations {
        #[arg(value_name = "TEXT")]
        text: Option<String>,
    },

    /// Write a patient handout
    Handout {
        #[arg(long)]
        ppi: String,

        #[arg(long)]
        indication: String,

        /// Directory to write the handout into; prints to stdout when omitted
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,
    },

    /// Ask the configured assistant a question
    Ask {
        #[arg(value_name = "QUESTION")]
        question: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Interaction { ppi, drug, json } => {
            let ppi = canonical_drug_name(&ppi);
            let drug = canonical_drug_name(&drug);
            if drug.is_empty() {
                bail!("Please enter a medication name to check for interactions.");
            }

            let report = lookup_interaction(&ppi, &drug)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
                return Ok(());
            }

            println!("{} + {}", ppi, drug);
            println!("Severity:   {} ({})", report.severity, report.risk_tier());
            println!("Score:      {}", report.score);
            println!("Mechanism:  {}", report.description);
            println!("Management: {}", report.management);
            println!("Evidence:   {}", report.evidence);
            if let Some(sources) = &report.sources {
                println!("Sources:");
                for source in sources {
                    println!("  {}", source);
                }
            }
        }

        Commands::Citations { text } => {
            let text = match text {
                Some(text) => text,
                None => {
                    let mut buf = String::new();
                    std::io::stdin()
                        .read_to_string(&mut buf)
                        .context("Failed to read text from stdin")?;
                    buf
                }
            };
            println!("{}", serde_json::to_string_pretty(&extract_citations(&text))?);
        }

        Commands::Handout {
            ppi,
            indication,
            output,
        } => {
            let ppi = canonical_drug_name(&ppi);
            let indication = indication.trim();
            if !SUPPORTED_PPIS.contains(&ppi.as_str()) {
                bail!("Unsupported medication '{}'. Choose one of: {}", ppi, SUPPORTED_PPIS.join(", "));
            }
            if !SUPPORTED_INDICATIONS.contains(&indication) {
                bail!(
                    "Unsupported condition '{}'. Choose one of: {}",
                    indication,
                    SUPPORTED_INDICATIONS.join(", ")
                );
            }

            let handout = generate_patient_handout(&ppi, indication);
            match output {
                Some(dir) => {
                    let path = dir.join(handout_file_name(&ppi, indication));
                    fs::write(&path, handout)
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    println!("Wrote {}", path.display());
                }
                None => print!("{}", handout),
            }
        }

        Commands::Ask { question } => {
            let config = ServiceConfig::from_env()?;
            let assistant = build_assistant(&config)?;
            let reply = answer_question(assistant.as_ref(), &question).await?;

            println!("{}", reply.content);
            if !reply.references.is_empty() {
                println!("\nReferences found: {}", reply.references.len());
                for citation in &reply.references {
                    match &citation.url {
                        Some(url) => println!("  [{}] {} <{}>", citation.number, citation.text, url),
                        None => println!("  [{}] {}", citation.number, citation.text),
                    }
                }
            }
        }
    }

    Ok(())
}
