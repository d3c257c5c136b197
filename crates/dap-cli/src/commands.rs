use std::sync::Arc;

use anyhow::Context;
use colored::Colorize;
use metrics_exporter_prometheus::PrometheusBuilder;
use tokio_util::sync::CancellationToken;

use dap_crypto::{compute_root, Hash};
use dap_protocol::CommitmentCodec;
use dap_server::{ProxyConfig, ProxyServer};
use dap_store::{AvailabilityConfig, ObjectStoreConfig, ObjectStoreKind};
use dap_types::{BlobKey, Commitment};

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Serve(args) => cmd_serve(args),
        Command::Encode(args) => cmd_encode(args),
        Command::Decode(args) => cmd_decode(args),
        Command::VerifyProof(args) => cmd_verify_proof(args),
    }
}

fn load_config(args: &ServeArgs) -> anyhow::Result<ProxyConfig> {
    let mut config = if args.memstore {
        memstore_config()
    } else if let Some(path) = &args.config {
        ProxyConfig::from_file(path)?
    } else {
        anyhow::bail!("either --config or --memstore is required");
    };
    if let Some(bind) = args.bind {
        config.server.bind_addr = bind;
    }
    config.validate()?;
    Ok(config)
}

fn memstore_config() -> ProxyConfig {
    ProxyConfig {
        availability: Some(AvailabilityConfig::default()),
        object_store: Some(ObjectStoreConfig {
            kind: ObjectStoreKind::Memory,
            ..Default::default()
        }),
        ..Default::default()
    }
}

fn cmd_serve(args: ServeArgs) -> anyhow::Result<()> {
    let config = load_config(&args)?;
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start tokio runtime")?;
    runtime.block_on(serve(config))
}

async fn serve(config: ProxyConfig) -> anyhow::Result<()> {
    if config.metrics.enabled {
        PrometheusBuilder::new()
            .with_http_listener(config.metrics.bind_addr)
            .install()
            .context("failed to install prometheus exporter")?;
        tracing::info!(addr = %config.metrics.bind_addr, "serving metrics");
    }

    let storage = Arc::new(config.build_storage()?);
    let server = ProxyServer::new(config.server.clone(), storage);

    let shutdown = CancellationToken::new();
    let signal = shutdown.clone();
    tokio::spawn(async move {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to listen for shutdown signal");
        }
        tracing::info!("shutting down");
        signal.cancel();
    });

    server.serve(shutdown).await?;
    Ok(())
}

fn encode(args: &EncodeArgs) -> anyhow::Result<String> {
    let key = BlobKey::from_hex(&args.key)?;
    Ok(CommitmentCodec::encode_string(&key, args.mode)?)
}

fn cmd_encode(args: EncodeArgs) -> anyhow::Result<()> {
    let commitment = encode(&args)?;
    println!("{}", commitment);
    Ok(())
}

fn cmd_decode(args: DecodeArgs) -> anyhow::Result<()> {
    let commitment: Commitment = CommitmentCodec::decode_commitment(&args.commitment, args.mode)?;
    println!("Mode:    {}", commitment.mode.to_string().cyan());
    println!("Version: {}", commitment.version);
    println!("Key:     {}", commitment.key.to_string().yellow());
    Ok(())
}

fn parse_hash(label: &str, text: &str) -> anyhow::Result<Hash> {
    let key = BlobKey::from_hex(text).with_context(|| format!("invalid {label}"))?;
    Ok(*key.as_bytes())
}

fn proof_root(args: &VerifyProofArgs) -> anyhow::Result<Hash> {
    let leaf = parse_hash("leaf", &args.leaf)?;
    let proof = args.proof.strip_prefix("0x").unwrap_or(&args.proof);
    let proof = hex::decode(proof).context("invalid proof hex")?;
    Ok(compute_root(&proof, leaf, args.index)?)
}

fn cmd_verify_proof(args: VerifyProofArgs) -> anyhow::Result<()> {
    let expected = parse_hash("root", &args.root)?;
    let computed = proof_root(&args)?;
    if computed == expected {
        println!("{} Inclusion proof verified", "✓".green().bold());
        Ok(())
    } else {
        println!("{} Root mismatch", "✗".red().bold());
        println!("  expected: {}", BlobKey::from_hash(expected).to_string().yellow());
        println!("  computed: {}", BlobKey::from_hash(computed).to_string().red());
        anyhow::bail!("inclusion proof does not match root")
    }
}
