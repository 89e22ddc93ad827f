//! # CLI Interface
//!
//! Defines the command-line argument structure for `gmsm` using `clap`
//! derive. Keys, signatures and binary data travel as hex; plain-text
//! messages can be passed directly.

use clap::{Args, Parser, Subcommand};
use gmsm::CipherMode;

/// SM2 / SM3 / SM4 from the command line.
///
/// Generates SM2 key pairs, signs and verifies messages, hashes with SM3,
/// and encrypts with SM4 in ECB, CBC, CFB or OFB mode.
#[derive(Parser, Debug)]
#[command(name = "gmsm", about = "Pooled SM2/SM3/SM4 toolkit", version, propagate_version = true)]
pub struct GmsmCli {
    /// Print results as JSON on stdout.
    #[arg(long, global = true)]
    pub json: bool,

    /// Log format on stderr: "pretty" or "json".
    #[arg(long, global = true, env = "GMSM_LOG_FORMAT", default_value = "pretty")]
    pub log_format: String,

    /// SM2 distinguishing identifier used when signing and verifying.
    #[arg(long, global = true, env = "GMSM_DISTID", default_value = gmsm::config::DEFAULT_DISTINGUISHING_ID)]
    pub distid: String,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate a fresh SM2 key pair.
    Keygen,
    /// Sign a message with an SM2 private key.
    Sign(SignArgs),
    /// Verify an SM2 signature.
    Verify(VerifyArgs),
    /// SM3 digest of a message.
    Hash(HashArgs),
    /// SM4-encrypt data.
    Encrypt(CipherArgs),
    /// SM4-decrypt data.
    Decrypt(CipherArgs),
    /// Run a quick functional and timing check of every primitive.
    Validate,
    /// Print version information and exit.
    Version,
}

/// Message input shared by the commands that consume one.
#[derive(Args, Debug, Clone)]
pub struct MessageInput {
    /// Message as UTF-8 text.
    #[arg(long, short = 'm', conflicts_with = "message_hex", required_unless_present = "message_hex")]
    pub message: Option<String>,

    /// Message as hex.
    #[arg(long)]
    pub message_hex: Option<String>,
}

/// Arguments for `sign`.
#[derive(Args, Debug)]
pub struct SignArgs {
    /// Hex-encoded 32-byte SM2 private scalar.
    #[arg(long, short = 'k', env = "GMSM_PRIVATE_KEY", hide_env_values = true)]
    pub key: String,

    #[command(flatten)]
    pub input: MessageInput,
}

/// Arguments for `verify`.
#[derive(Args, Debug)]
pub struct VerifyArgs {
    /// Hex-encoded SEC1 public key (compressed or uncompressed).
    #[arg(long, short = 'p')]
    pub pubkey: String,

    /// Hex-encoded 64-byte `r || s` signature.
    #[arg(long, short = 's')]
    pub signature: String,

    #[command(flatten)]
    pub input: MessageInput,
}

/// Arguments for `hash`.
#[derive(Args, Debug)]
pub struct HashArgs {
    #[command(flatten)]
    pub input: MessageInput,
}

/// Arguments for `encrypt` and `decrypt`.
#[derive(Args, Debug)]
pub struct CipherArgs {
    /// Hex-encoded 16-byte SM4 key.
    #[arg(long, short = 'k', env = "GMSM_SM4_KEY", hide_env_values = true)]
    pub key: String,

    /// Cipher mode: ecb, cbc, cfb or ofb.
    #[arg(long, default_value = "cbc")]
    pub mode: CipherMode,

    /// Input data. Plaintext for `encrypt` may be text or hex (see
    /// `--hex-input`); ciphertext for `decrypt` is always hex.
    #[arg(long, short = 'd')]
    pub data: String,

    /// Treat `--data` as hex when encrypting.
    #[arg(long)]
    pub hex_input: bool,
}
