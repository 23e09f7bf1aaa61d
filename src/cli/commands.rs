use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "auxpow", about = "Inspect and verify side-chain merged-mining proofs")]
pub struct Opt {
    #[arg(
        long = "config",
        global = true,
        help = "TOML file with verifier settings"
    )]
    pub config: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    #[command(name = "inspect", about = "Decode a proof and print a JSON summary")]
    Inspect {
        #[arg(help = "Hex-encoded proof", required_unless_present = "file")]
        proof: Option<String>,
        #[arg(
            long = "file",
            conflicts_with = "proof",
            help = "Read the proof from a file (raw bytes or hex text)"
        )]
        file: Option<PathBuf>,
    },
    #[command(name = "check", about = "Verify a proof for a side-chain block hash")]
    Check {
        #[arg(long = "proof", help = "Hex-encoded proof")]
        proof: String,
        #[arg(long = "hash", help = "Side-chain block hash (display order hex)")]
        hash: String,
    },
    #[command(
        name = "sample",
        about = "Assemble a self-consistent proof for a side-chain block hash"
    )]
    Sample {
        #[arg(long = "hash", help = "Side-chain block hash (display order hex)")]
        hash: String,
    },
}
