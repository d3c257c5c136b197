use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use dap_types::Mode;

#[derive(Parser)]
#[command(
    name = "da-proxy",
    about = "Data-availability proxy: commitment-addressed blob storage",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the HTTP proxy
    Serve(ServeArgs),
    /// Print the wire commitment for a blob key
    Encode(EncodeArgs),
    /// Print the blob key inside a commitment
    Decode(DecodeArgs),
    /// Check a merkle inclusion proof offline
    VerifyProof(VerifyProofArgs),
}

#[derive(Args)]
pub struct ServeArgs {
    /// TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// Override the listen address
    #[arg(long)]
    pub bind: Option<SocketAddr>,
    /// Use in-memory backends only
    #[arg(long)]
    pub memstore: bool,
}

#[derive(Args)]
pub struct EncodeArgs {
    #[arg(long, default_value = "optimism_generic")]
    pub mode: Mode,
    /// 32-byte key, hex encoded
    pub key: String,
}

#[derive(Args)]
pub struct DecodeArgs {
    #[arg(long, default_value = "optimism_generic")]
    pub mode: Mode,
    /// Hex commitment, with or without 0x
    pub commitment: String,
}

#[derive(Args)]
pub struct VerifyProofArgs {
    /// Leaf hash, hex encoded
    #[arg(long)]
    pub leaf: String,
    #[arg(long)]
    pub index: u64,
    /// Expected root, hex encoded
    #[arg(long)]
    pub root: String,
    /// Concatenated 32-byte sibling hashes
    #[arg(default_value = "")]
    pub proof: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_serve_flags() {
        let cli = Cli::parse_from(["da-proxy", "serve", "--memstore", "--bind", "0.0.0.0:4000"]);
        match cli.command {
            Command::Serve(args) => {
                assert!(args.memstore);
                assert_eq!(args.bind, Some("0.0.0.0:4000".parse().unwrap()));
                assert!(args.config.is_none());
            }
            _ => panic!("expected serve"),
        }
    }

    #[test]
    fn parses_mode_by_wire_name() {
        let cli = Cli::parse_from(["da-proxy", "decode", "--mode", "optimism_keccak256", "0x00ab"]);
        match cli.command {
            Command::Decode(args) => assert_eq!(args.mode, Mode::OptimismGeneric),
            _ => panic!("expected decode"),
        }
        assert!(Cli::try_parse_from(["da-proxy", "encode", "--mode", "bogus", "00"]).is_err());
    }
}
