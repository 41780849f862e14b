//! Command line interface for SPASE record conversion and DOI maintenance.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::rc::Rc;

use clap::{Parser, Subcommand};

use spase_soso::maintenance;
use spase_soso::{ConvertConfig, DataCiteClient, Error, FilesystemResolver, Spase, SpaseDocument};

#[derive(Parser)]
#[command(name = "spase-soso", version, about = "Convert SPASE XML records to schema.org JSON-LD")]
struct Cli {
    /// Root directory of the local SPASE installation
    #[arg(long)]
    spase_root: Option<PathBuf>,

    /// Directory of locally adjusted external records
    #[arg(long)]
    override_dir: Option<PathBuf>,

    /// Directory converted JSON records are written to
    #[arg(long)]
    output_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Convert a SPASE XML record and write its JSON-LD
    Convert {
        /// Path to the SPASE XML record
        file: PathBuf,

        /// Print the record instead of writing it to the output directory
        #[arg(long)]
        stdout: bool,

        /// Newline-delimited list of records whose author string must not be split
        #[arg(long)]
        no_split_file: Option<PathBuf>,
    },
    /// Delete a draft DataCite DOI and its local JSON record
    DeleteDraft {
        /// The bare DOI, without https://doi.org/
        doi: String,

        /// The SPASE ResourceID the draft was registered for
        resource_id: String,
    },
}

fn main() -> Result<(), Error> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    let mut config = match &cli.spase_root {
        Some(root) => ConvertConfig::new(root),
        None => ConvertConfig::default(),
    };
    if let Some(dir) = cli.override_dir {
        config.override_dir = Some(dir);
    }
    if let Some(dir) = cli.output_dir {
        config.output_dir = dir;
    }

    match cli.command {
        Command::Convert {
            file,
            stdout,
            no_split_file,
        } => {
            if let Some(path) = no_split_file {
                config = config.with_no_split_file(path)?;
            }
            let mut resolver = FilesystemResolver::new(&config.spase_root);
            if let Some(dir) = &config.override_dir {
                resolver = resolver.with_overrides(dir);
            }
            let remote = DataCiteClient::new()?;
            let doc = Rc::new(SpaseDocument::from_file(&file)?);
            let spase = Spase::new(Rc::clone(&doc), &resolver, &remote, &config);
            let record = spase.to_json_ld()?;

            if stdout {
                println!("{}", serde_json::to_string_pretty(&record).unwrap_or_default());
            } else {
                let resource_id = doc.resource_id()?.unwrap_or_default().to_string();
                let path = maintenance::write_record_json(&config.output_dir, &resource_id, &record)?;
                println!("Wrote {}", path.display());
            }
            if spase.truncated() {
                eprintln!("Warning: related-record resolution was truncated (cycle or depth limit)");
            }
        }
        Command::DeleteDraft { doi, resource_id } => {
            let username = credential("DATACITE_USERNAME", "Enter DataCite username: ")?;
            let password = credential("DATACITE_PASSWORD", "Enter DataCite password: ")?;
            let client = DataCiteClient::new()?;
            client.delete_draft(&doi, &username, &password)?;
            println!("Successfully deleted DataCite draft metadata record for {doi}");

            match maintenance::remove_record_json(&config.output_dir, &resource_id) {
                Ok(()) => println!("Removed local JSON record for {resource_id}"),
                Err(err) => eprintln!(
                    "Could not delete local JSON record ({err}). \
                     Check the ResourceID and try again or delete manually."
                ),
            }
        }
    }
    Ok(())
}

fn credential(env_var: &str, prompt: &str) -> Result<String, Error> {
    if let Ok(value) = std::env::var(env_var) {
        return Ok(value);
    }
    print!("{prompt}");
    io::stdout().flush()?;
    let mut value = String::new();
    io::stdin().lock().read_line(&mut value)?;
    Ok(value.trim().to_string())
}
