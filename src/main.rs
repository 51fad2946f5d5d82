use clap::{Parser, Subcommand};
use flexarc::archive::RawArchive;
use flexarc::writer::FlexWriter;
use std::fs::File;
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "flexarc", about = "Flex archive inspection and packing CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Pack input files into a Flex archive, one record per file
    Pack {
        #[arg(short, long)]
        output: PathBuf,
        /// Number of empty records to append after the inputs
        #[arg(long, default_value = "0")]
        empty: u32,
        #[arg(short, long, required = true, num_args = 1..)]
        input: Vec<PathBuf>,
    },
    /// List the record directory
    List {
        input: PathBuf,
        /// Emit the directory as JSON instead of a table
        #[arg(long)]
        json: bool,
        /// Include a CRC-32 column (reads every record)
        #[arg(long)]
        checksums: bool,
        /// Include a hex preview of each record's first bytes
        #[arg(long)]
        preview: bool,
    },
    /// Show archive summary
    Info {
        input: PathBuf,
    },
    /// Write one record to stdout or a file
    Cat {
        input: PathBuf,
        index: u32,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Extract every non-empty record into a directory
    Extract {
        input: PathBuf,
        #[arg(short = 'C', long, default_value = ".")]
        output_dir: PathBuf,
    },
    /// Validate the directory and read every record
    Verify {
        input: PathBuf,
    },
}

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<ExitCode, Box<dyn std::error::Error>> {
    match Cli::parse().command {

        // ── Pack ─────────────────────────────────────────────────────────────
        Commands::Pack { output, input, empty } => {
            let mut w = FlexWriter::new(File::create(&output)?);
            for path in &input {
                let data = std::fs::read(path)?;
                w.add_record(&data)?;
                println!("  packed  {} ({} bytes)", path.display(), data.len());
            }
            for _ in 0..empty {
                w.add_empty_record();
            }
            let count = w.record_count();
            w.finalize()?;
            println!("Created: {} ({count} records)", output.display());
        }

        // ── List ─────────────────────────────────────────────────────────────
        Commands::List { input, json, checksums, preview } => {
            let mut ar = RawArchive::open(&input)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&ar.manifest())?);
                return Ok(ExitCode::SUCCESS);
            }

            println!("Archive: {}", input.display());
            println!("{:>6} {:>10} {:>10}  {}", "Index", "Offset", "Length", "Notes");
            for info in ar.manifest().records {
                let mut notes = String::new();
                if info.empty {
                    notes.push_str("empty");
                } else {
                    if checksums {
                        if let Some(crc) = ar.record_crc32(info.index)? {
                            notes.push_str(&format!("crc32={crc:08x} "));
                        }
                    }
                    if preview {
                        if let Some(bytes) = ar.read_record(info.index)? {
                            let head = &bytes[..bytes.len().min(16)];
                            notes.push_str(&hex::encode(head));
                        }
                    }
                }
                println!("{:>6} {:>10} {:>10}  {}", info.index, info.offset, info.length, notes);
            }
        }

        // ── Info ─────────────────────────────────────────────────────────────
        Commands::Info { input } => {
            let ar = RawArchive::open(&input)?;
            let manifest = ar.manifest();
            let empty = manifest.records.iter().filter(|r| r.empty).count();
            let payload: u64 = manifest.records.iter().map(|r| r.length as u64).sum();
            let source_len = std::fs::metadata(&input)?.len();

            println!("── Flex archive ─────────────────────────────────────────");
            println!("  Path          {}", input.display());
            println!("  Source size   {source_len} B");
            println!("  Records       {}", manifest.record_count);
            println!("  Empty slots   {empty}");
            println!("  Payload bytes {payload}");
        }

        // ── Cat ──────────────────────────────────────────────────────────────
        Commands::Cat { input, index, output } => {
            let mut ar = RawArchive::open(&input)?;
            match ar.read_record(index)? {
                Some(bytes) => match output {
                    Some(path) => {
                        File::create(&path)?.write_all(&bytes)?;
                        println!("Wrote record {index} ({} bytes) to {}", bytes.len(), path.display());
                    }
                    None => std::io::stdout().write_all(&bytes)?,
                },
                None => {
                    eprintln!("record {index} is empty or out of range");
                    return Ok(ExitCode::FAILURE);
                }
            }
        }

        // ── Extract ──────────────────────────────────────────────────────────
        Commands::Extract { input, output_dir } => {
            let mut ar = RawArchive::open(&input)?;
            if !output_dir.exists() {
                std::fs::create_dir_all(&output_dir)?;
            }
            let mut written = 0u32;
            for i in 0..ar.record_count() {
                if let Some(bytes) = ar.read_record(i)? {
                    let path = output_dir.join(format!("record_{i:04}.bin"));
                    File::create(&path)?.write_all(&bytes)?;
                    written += 1;
                }
            }
            println!("Extracted {written} record(s) to {}", output_dir.display());
        }

        // ── Verify ───────────────────────────────────────────────────────────
        Commands::Verify { input } => {
            // open() already re-validates the directory against source size.
            let mut ar = match RawArchive::open(&input) {
                Ok(ar) => ar,
                Err(e) => {
                    eprintln!("MALFORMED: {e}");
                    return Ok(ExitCode::FAILURE);
                }
            };
            for i in 0..ar.record_count() {
                match ar.record_crc32(i)? {
                    Some(crc) => println!("  record {i:>4}: crc32={crc:08x}"),
                    None => println!("  record {i:>4}: empty"),
                }
            }
            println!("OK: {} ({} records)", input.display(), ar.record_count());
        }
    }

    Ok(ExitCode::SUCCESS)
}
