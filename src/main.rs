// Entry point for the auxpow command-line tool
use clap::Parser;
use data_encoding::{HEXLOWER, HEXLOWER_PERMISSIVE};
use log::{error, info, LevelFilter};
use serde::Serialize;
use sidechain_auxpow::{
    AuxPow, Command, Header, Opt, OuterProof, SideAuxPow, SideChainPow, Transaction, Uint256,
    VerifierConfig, GLOBAL_CONFIG,
};
use std::fs;
use std::path::Path;
use std::process;

/// JSON view printed by `inspect`
#[derive(Debug, Serialize)]
struct ProofSummary {
    tx_hash: Uint256,
    tx_type: String,
    merkle_branch: Vec<Uint256>,
    merkle_index: u32,
    main_header_hash: Uint256,
    main_merkle_root: Uint256,
    main_height: u32,
    outer_proof: &'static str,
    bound_hash: Option<Uint256>,
}

impl ProofSummary {
    fn new(proof: &SideAuxPow) -> ProofSummary {
        let header = &proof.main_block_header;
        ProofSummary {
            tx_hash: proof.side_aux_block_tx.hash(),
            tx_type: proof.side_aux_block_tx.get_tx_type().to_string(),
            merkle_branch: proof.side_aux_merkle_branch.clone(),
            merkle_index: proof.side_aux_merkle_index,
            main_header_hash: header.hash(),
            main_merkle_root: header.merkle_root,
            main_height: header.height,
            outer_proof: header.aux_pow.kind(),
            bound_hash: proof.payload_hash().ok(),
        }
    }
}

fn main() {
    // Info level shows why a proof was rejected without the per-step debug noise
    env_logger::builder().filter_level(LevelFilter::Info).init();

    let opt = Opt::parse();

    if let Err(e) = run_command(opt) {
        error!("Error: {e}");
        process::exit(1);
    }
}

fn run_command(opt: Opt) -> Result<(), Box<dyn std::error::Error>> {
    // A config file replaces the env-derived settings before any proof is read
    if let Some(path) = &opt.config {
        GLOBAL_CONFIG.set(VerifierConfig::from_file(path)?);
        info!("Loaded verifier settings from {}", path.display());
    }

    match opt.command {
        Command::Inspect { proof, file } => {
            // Decode only; the summary is printed even for proofs that would not check
            let bytes = match (proof, file) {
                (Some(hex), _) => decode_hex(&hex)?,
                (None, Some(path)) => read_proof_file(&path)?,
                (None, None) => return Err("a proof or --file is required".into()),
            };
            let proof = SideAuxPow::from_bytes(&bytes)?;
            println!("{}", serde_json::to_string_pretty(&ProofSummary::new(&proof))?);
        }
        Command::Check { proof, hash } => {
            // Any rejection bubbles up to main, gets logged and exits with status 1
            let proof = SideAuxPow::from_bytes(&decode_hex(&proof)?)?;
            let side_hash: Uint256 = hash.parse()?;
            proof.check(&side_hash)?;
            println!("Proof is valid for {side_hash}");
        }
        Command::Sample { hash } => {
            // Handy for feeding a relay a proof that is known to pass
            let side_hash: Uint256 = hash.parse()?;
            let proof = build_sample(side_hash);
            println!("{}", HEXLOWER.encode(&proof.to_bytes()));
        }
    }
    Ok(())
}

fn decode_hex(text: &str) -> Result<Vec<u8>, Box<dyn std::error::Error>> {
    let text = text.trim();
    let text = text.strip_prefix("0x").unwrap_or(text);
    Ok(HEXLOWER_PERMISSIVE.decode(text.as_bytes())?)
}

/// Proof files may hold hex text or the raw encoding
fn read_proof_file(path: &Path) -> Result<Vec<u8>, Box<dyn std::error::Error>> {
    let bytes = fs::read(path)?;
    let decoded = std::str::from_utf8(&bytes)
        .ok()
        .filter(|text| !text.trim().is_empty())
        .and_then(|text| decode_hex(text).ok());
    Ok(decoded.unwrap_or(bytes))
}

/// One-transaction main block holding the side mining tx, merge-mined as
/// the only child of a parent block
fn build_sample(side_hash: Uint256) -> SideAuxPow {
    let tx = Transaction::new_side_chain_pow(SideChainPow::new(side_hash, Uint256::ZERO, 0));
    let mut header = Header {
        merkle_root: tx.hash(),
        ..Default::default()
    };
    header.aux_pow = OuterProof::Aux(AuxPow::single_chain(&header.hash()));
    SideAuxPow::new(vec![], 0, tx, header)
}
