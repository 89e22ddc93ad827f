// Copyright (c) 2026 gmsm contributors. MIT License.
// See LICENSE for details.

//! # gmsm command-line tool
//!
//! Entry point for the `gmsm` binary. Parses CLI arguments, initializes
//! logging, builds one [`Gmsm`] context and runs the requested command
//! against it.
//!
//! Subcommands:
//!
//! - `keygen`   - generate an SM2 key pair
//! - `sign`     - SM2-sign a message
//! - `verify`   - check an SM2 signature
//! - `hash`     - SM3 digest
//! - `encrypt`  - SM4 encrypt in any supported mode
//! - `decrypt`  - SM4 decrypt
//! - `validate` - functional and timing check of every primitive
//! - `version`  - print build version information

mod cli;
mod logging;

use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use clap::Parser;
use serde::Serialize;
use serde_json::json;
use zeroize::Zeroizing;

use gmsm::{CipherMode, Gmsm, GmsmConfig, PoolStatsSnapshot, Sm2PrivateKey, Sm2PublicKey};

use cli::{CipherArgs, Commands, GmsmCli, MessageInput};
use logging::LogFormat;

fn main() -> Result<()> {
    let cli = GmsmCli::parse();
    logging::init_logging(logging::DEFAULT_FILTER, LogFormat::from_str_lossy(&cli.log_format));

    let gm = Gmsm::with_config(GmsmConfig::default().with_distinguishing_id(cli.distid.clone()));
    let out = Output { json: cli.json };

    match cli.command {
        Commands::Keygen => keygen(&gm, out),
        Commands::Sign(args) => {
            let key = Sm2PrivateKey::from_hex(&args.key).context("failed to parse SM2 private key")?;
            let message = message_bytes(&args.input)?;
            let signature = gm.sign(&key, &message).context("signing failed")?;
            out.emit(json!({ "signature": hex::encode(&signature) }), || {
                println!("{}", hex::encode(&signature))
            })
        }
        Commands::Verify(args) => {
            let key = Sm2PublicKey::from_hex(&args.pubkey).context("failed to parse SM2 public key")?;
            let signature = hex::decode(args.signature.trim()).context("signature is not valid hex")?;
            let message = message_bytes(&args.input)?;
            let valid = gm.verify(&key, &message, &signature);
            out.emit(json!({ "valid": valid }), || println!("valid: {valid}"))?;
            if !valid {
                bail!("signature verification failed");
            }
            Ok(())
        }
        Commands::Hash(args) => {
            let digest = gm.hash(&message_bytes(&args.input)?);
            out.emit(json!({ "sm3": hex::encode(digest) }), || {
                println!("{}", hex::encode(digest))
            })
        }
        Commands::Encrypt(args) => encrypt(&gm, &args, out),
        Commands::Decrypt(args) => decrypt(&gm, &args, out),
        Commands::Validate => {
            let report = validate(&gm)?;
            out.emit(serde_json::to_value(&report)?, || report.print())?;
            if !report.passed() {
                bail!("validation failed");
            }
            Ok(())
        }
        Commands::Version => {
            print_version();
            Ok(())
        }
    }
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// Chooses between JSON and human-readable output on stdout.
#[derive(Debug, Clone, Copy)]
struct Output {
    json: bool,
}

impl Output {
    fn emit(self, value: serde_json::Value, human: impl FnOnce()) -> Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(&value)?);
        } else {
            human();
        }
        Ok(())
    }
}

fn message_bytes(input: &MessageInput) -> Result<Vec<u8>> {
    match (&input.message, &input.message_hex) {
        (Some(text), None) => Ok(text.as_bytes().to_vec()),
        (None, Some(h)) => hex::decode(h.trim()).context("message is not valid hex"),
        _ => bail!("exactly one of --message or --message-hex is required"),
    }
}

fn sm4_key(hex_key: &str) -> Result<Zeroizing<Vec<u8>>> {
    hex::decode(hex_key.trim())
        .map(Zeroizing::new)
        .context("SM4 key is not valid hex")
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

fn keygen(gm: &Gmsm, out: Output) -> Result<()> {
    let (private, public) = gm.generate_key_pair().context("key generation failed")?;
    let private_hex = private.to_hex();
    let public_hex = public.to_hex();
    tracing::info!(public_key = %public_hex, "generated SM2 key pair");

    out.emit(
        json!({ "private_key": private_hex.as_str(), "public_key": public_hex }),
        || {
            println!("private key : {}", private_hex.as_str());
            println!("public key  : {public_hex}");
        },
    )
}

fn encrypt(gm: &Gmsm, args: &CipherArgs, out: Output) -> Result<()> {
    let key = sm4_key(&args.key)?;
    let plaintext = if args.hex_input {
        hex::decode(args.data.trim()).context("data is not valid hex")?
    } else {
        args.data.as_bytes().to_vec()
    };

    let ciphertext = gm
        .cipher_encrypt(&key, &plaintext, args.mode)
        .with_context(|| format!("SM4-{} encryption failed", args.mode))?;

    out.emit(
        json!({ "mode": args.mode, "ciphertext": hex::encode(&ciphertext) }),
        || println!("{}", hex::encode(&ciphertext)),
    )
}

fn decrypt(gm: &Gmsm, args: &CipherArgs, out: Output) -> Result<()> {
    let key = sm4_key(&args.key)?;
    let ciphertext = hex::decode(args.data.trim()).context("ciphertext is not valid hex")?;

    let plaintext = gm
        .cipher_decrypt(&key, &ciphertext, args.mode)
        .with_context(|| format!("SM4-{} decryption failed", args.mode))?;
    let text = std::str::from_utf8(&plaintext).ok();

    out.emit(
        json!({ "mode": args.mode, "plaintext": hex::encode(&plaintext), "text": text }),
        || match text {
            Some(t) => println!("{t}"),
            None => println!("{}", hex::encode(&plaintext)),
        },
    )
}

fn print_version() {
    println!("gmsm      {}", env!("CARGO_PKG_VERSION"));
    println!("curve     {}", gmsm::config::SM2_CURVE_NAME);
    println!("modes     {}", CipherMode::ALL.map(CipherMode::as_str).join(", "));
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

const VALIDATION_KEY: &[u8; 16] = b"1234567890abcdef";

#[derive(Debug, Serialize)]
struct Check {
    name: &'static str,
    ok: bool,
    elapsed_ms: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    throughput_mib_s: Option<f64>,
}

#[derive(Debug, Serialize)]
struct ValidationReport {
    checks: Vec<Check>,
    key_pool: PoolStatsSnapshot,
    hasher_pool: PoolStatsSnapshot,
}

impl ValidationReport {
    fn passed(&self) -> bool {
        self.checks.iter().all(|c| c.ok)
    }

    fn print(&self) {
        for c in &self.checks {
            let status = if c.ok { "ok" } else { "FAILED" };
            match c.throughput_mib_s {
                Some(t) => println!("{:<28} {:>6}  {:>10.3} ms  {:>8.1} MiB/s", c.name, status, c.elapsed_ms, t),
                None => println!("{:<28} {:>6}  {:>10.3} ms", c.name, status, c.elapsed_ms),
            }
        }
        for (label, s) in [("key pool", &self.key_pool), ("hasher pool", &self.hasher_pool)] {
            println!(
                "{label:<12} created={} acquired={} reused={} released={}",
                s.created, s.acquired, s.reused, s.released
            );
        }
    }
}

fn check(name: &'static str, ok: bool, elapsed: Duration, bytes: Option<usize>) -> Check {
    let secs = elapsed.as_secs_f64();
    Check {
        name,
        ok,
        elapsed_ms: secs * 1000.0,
        throughput_mib_s: bytes
            .filter(|_| secs > 0.0)
            .map(|b| b as f64 / (1024.0 * 1024.0) / secs),
    }
}

/// Exercises SM3, SM4 and SM2 through `gm` and times each step.
///
/// Primitive failures propagate as errors. A wrong answer (mismatched round
/// trip, rejected signature) is recorded as a failed check instead so the
/// whole report still prints.
fn validate(gm: &Gmsm) -> Result<ValidationReport> {
    let mut checks = Vec::new();

    // SM3
    for (name, size) in [("sm3 1 KiB", 1024usize), ("sm3 1 MiB", 1024 * 1024)] {
        let data = vec![0x61u8; size];
        let t = Instant::now();
        let a = gm.hash(&data);
        let elapsed = t.elapsed();
        checks.push(check(name, a == gm.hash(&data), elapsed, Some(size)));
    }

    // SM4-ECB
    let small = b"This is confidential data";
    let t = Instant::now();
    let ct = gm.cipher_encrypt(VALIDATION_KEY, small, CipherMode::Ecb)?;
    let pt = gm.cipher_decrypt(VALIDATION_KEY, &ct, CipherMode::Ecb)?;
    checks.push(check("sm4-ecb round trip", pt == small, t.elapsed(), None));

    let large: Vec<u8> = (0..1024 * 1024).map(|i: usize| (i % 256) as u8).collect();
    let t = Instant::now();
    let ct = gm.cipher_encrypt(VALIDATION_KEY, &large, CipherMode::Ecb)?;
    let pt = gm.cipher_decrypt(VALIDATION_KEY, &ct, CipherMode::Ecb)?;
    checks.push(check("sm4-ecb 1 MiB", pt == large, t.elapsed(), Some(2 * large.len())));

    // SM2
    let t = Instant::now();
    let (private, public) = gm.generate_key_pair()?;
    checks.push(check("sm2 keygen", true, t.elapsed(), None));

    let message = b"Important message to sign";
    let t = Instant::now();
    let signature = gm.sign(&private, message)?;
    checks.push(check("sm2 sign", true, t.elapsed(), None));

    let t = Instant::now();
    let valid = gm.verify(&public, message, &signature);
    checks.push(check("sm2 verify", valid, t.elapsed(), None));

    let messages = ["Message 1", "Message 2", "Message 3"];
    let t = Instant::now();
    let signatures = gm.batch_sign(&private, &messages)?;
    let results = gm.batch_verify(&public, &messages, &signatures)?;
    checks.push(check("sm2 batch of 3", results.iter().all(|ok| *ok), t.elapsed(), None));

    let t = Instant::now();
    let pooled_ok = {
        let key = gm.acquire_key()?;
        let sig = gm.sign(&key, message)?;
        gm.verify(key.public_key(), message, &sig)
    };
    checks.push(check("sm2 pooled key", pooled_ok, t.elapsed(), None));

    tracing::info!(checks = checks.len(), "validation finished");

    Ok(ValidationReport {
        checks,
        key_pool: gm.key_pool().stats().snapshot(),
        hasher_pool: gm.hasher_pool().stats().snapshot(),
    })
}
