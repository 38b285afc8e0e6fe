use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use gaseous_core::{
    pack_client_hello, pack_raw, parse_client_hello, unpack_client_hello, unpack_server_hello,
    Algo, HelloType, PackOptions, TemplateRegistry,
};
use gaseous_specs::SpecDb;

#[derive(Parser)]
#[command(name = "gaseous")]
#[command(about = "Pack, unpack, and inspect Gaseous-framed TLS hellos")]
struct Cli {
    /// Extra fingerprint specs to load (JSON array file)
    #[arg(long, global = true)]
    specs: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a raw ClientHello file and print its structured fields
    Inspect {
        /// File holding the hello (handshake layer; record layer accepted)
        file: PathBuf,
    },

    /// Pack a raw ClientHello file into a Gaseous frame
    Pack {
        file: PathBuf,
        /// Output file for the frame
        #[arg(short, long)]
        out: PathBuf,
        /// Force raw mode with this algorithm instead of fingerprint
        /// matching (none, flate, gzip, brotli, zstd, lz4, xz, lz4-block)
        #[arg(long)]
        algo: Option<String>,
        /// Skip the leading 0xFE record marker
        #[arg(long)]
        no_marker: bool,
        /// Fingerprint match threshold
        #[arg(long)]
        threshold: Option<u32>,
    },

    /// Unpack a Gaseous frame file back into hello bytes
    Unpack {
        file: PathBuf,
        #[arg(short, long)]
        out: PathBuf,
        /// Expected direction: client or server
        #[arg(long, default_value = "client")]
        hello_type: String,
    },

    /// List the fingerprint spec database
    Specs {
        /// Emit the full database as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .init();

    let mut db = SpecDb::builtin();
    if let Some(path) = &cli.specs {
        let stats = db
            .load_json(path)
            .with_context(|| format!("Failed to load specs from {}", path.display()))?;
        println!(
            "Loaded {}: {} imported, {} skipped",
            path.display(),
            stats.imported,
            stats.skipped
        );
    }

    match cli.command {
        Commands::Inspect { file } => {
            let raw = std::fs::read(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let hello = parse_client_hello(&raw)
                .with_context(|| format!("Failed to parse {}", file.display()))?;

            println!("Version:      0x{:04x}", hello.version);
            println!("Random:       {}", hex::encode(hello.random));
            println!("Session id:   {}", hex_or_none(&hello.session_id));
            println!("SNI:          {}", hello.sni.as_deref().unwrap_or("(none)"));
            let suites: Vec<String> = hello
                .cipher_suites
                .iter()
                .map(|c| format!("0x{c:04x}"))
                .collect();
            println!("Ciphers:      {}", suites.join(", "));
            println!("Compression:  {}", hex::encode(&hello.compression_methods));
            if !hello.alpn.is_empty() {
                println!("ALPN:         {}", hello.alpn.join(", "));
            }
            let exts: Vec<String> = hello
                .extension_types()
                .iter()
                .map(|e| format!("0x{e:04x}"))
                .collect();
            println!("Extensions:   {}", exts.join(", "));
        }

        Commands::Pack {
            file,
            out,
            algo,
            no_marker,
            threshold,
        } => {
            let raw = std::fs::read(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;

            let mut opts = PackOptions::default();
            opts.with_marker = !no_marker;
            if let Some(t) = threshold {
                opts.threshold = t;
            }

            let frame = match algo.as_deref() {
                Some(name) => {
                    let algo = parse_algo(name)?;
                    pack_raw(HelloType::Client, &raw, algo, 0, opts.with_marker)?
                }
                None => pack_client_hello(&raw, &db, &opts)?,
            };

            std::fs::write(&out, &frame)
                .with_context(|| format!("Failed to write {}", out.display()))?;
            println!(
                "Packed {} bytes into {} ({} bytes on the wire)",
                raw.len(),
                out.display(),
                frame.len()
            );
        }

        Commands::Unpack {
            file,
            out,
            hello_type,
        } => {
            let data = std::fs::read(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let registry = TemplateRegistry::new();

            let hello = match hello_type.as_str() {
                "client" => unpack_client_hello(&data, &registry, &db)?,
                "server" => unpack_server_hello(&data, &registry)?,
                other => bail!(
                    "Invalid hello type '{}'. Expected 'client' or 'server'.",
                    other
                ),
            };

            std::fs::write(&out, &hello)
                .with_context(|| format!("Failed to write {}", out.display()))?;
            println!("Unpacked {} hello bytes into {}", hello.len(), out.display());
        }

        Commands::Specs { json } => {
            use gaseous_core::fingerprint::FingerprintEngine;
            if json {
                println!("{}", serde_json::to_string_pretty(db.specs())?);
            } else {
                for spec in db.specs() {
                    println!(
                        "{:<20} {:>2} ciphers, {:>2} extensions, alpn [{}]",
                        spec.id,
                        spec.cipher_suites.len(),
                        spec.extensions.len(),
                        spec.alpn.join(", ")
                    );
                }
                println!("{} specs total", db.len());
            }
        }
    }

    Ok(())
}

fn hex_or_none(bytes: &[u8]) -> String {
    if bytes.is_empty() {
        "(empty)".to_string()
    } else {
        hex::encode(bytes)
    }
}

fn parse_algo(name: &str) -> Result<Algo> {
    let algo = match name {
        "none" => Algo::None,
        "flate" => Algo::Flate,
        "gzip" => Algo::Gzip,
        "brotli" => Algo::Brotli,
        "zstd" => Algo::Zstd,
        "lz4" => Algo::Lz4,
        "xz" => Algo::Xz,
        "lz4-block" => Algo::Lz4Block,
        other => bail!("Unknown algorithm '{}'.", other),
    };
    Ok(algo)
}
