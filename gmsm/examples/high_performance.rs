//! Walkthrough of the gmsm API with timings.
//!
//! Hashes, encrypts with SM4, signs and encrypts with SM2, runs a batch,
//! and finishes with a 1 MiB pass through SM3 and SM4-ECB. Pool counters are
//! printed at the end so you can see containers being reused.
//!
//! Run with:
//!   cargo run --example high_performance --release

use std::time::Instant;

use gmsm::{CipherMode, Gmsm, GmsmConfig};

// ---------------------------------------------------------------------------
// ANSI color constants
// ---------------------------------------------------------------------------

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";

const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const MAGENTA: &str = "\x1b[35m";
const CYAN: &str = "\x1b[36m";
const WHITE: &str = "\x1b[37m";

const BG_BLUE: &str = "\x1b[44m";

// ---------------------------------------------------------------------------
// Display helpers
// ---------------------------------------------------------------------------

fn banner() {
    println!();
    println!("{BG_BLUE}{BOLD}{WHITE}                                                        {RESET}");
    println!("{BG_BLUE}{BOLD}{WHITE}    gmsm  --  Pooled SM2 / SM3 / SM4 Walkthrough        {RESET}");
    println!("{BG_BLUE}{BOLD}{WHITE}                                                        {RESET}");
    println!();
}

fn section(num: u32, title: &str) {
    println!();
    println!("{BOLD}{CYAN}===[{YELLOW} Step {num} {CYAN}]=========================================={RESET}");
    println!("{BOLD}{WHITE}  {title}{RESET}");
}

fn success(text: &str) {
    println!("{GREEN}  [OK] {text}{RESET}");
}

fn info(label: &str, value: &str) {
    println!("{WHITE}  {BOLD}{label}:{RESET} {YELLOW}{value}{RESET}");
}

fn timing(label: &str, elapsed: std::time::Duration) {
    let ms = elapsed.as_secs_f64() * 1000.0;
    println!("{DIM}{MAGENTA}  [{label}: {ms:.3} ms]{RESET}");
}

fn short_hex(bytes: &[u8]) -> String {
    let h = hex::encode(bytes);
    if h.len() <= 32 {
        h
    } else {
        format!("{}...{} ({} bytes)", &h[..16], &h[h.len() - 16..], bytes.len())
    }
}

fn main() -> gmsm::Result<()> {
    banner();

    let gm = Gmsm::with_config(
        GmsmConfig::default()
            .with_key_pool_prewarm(4)
            .with_hasher_pool_prewarm(4),
    );

    // -- 1. SM3 ---------------------------------------------------------------
    section(1, "SM3 hashing through the pool");
    let data = b"Hello, this is test data for SM3 hashing";
    let t = Instant::now();
    let digest = gm.hash(data);
    timing("sm3", t.elapsed());
    info("digest", &hex::encode(digest));

    // -- 2. SM4 ---------------------------------------------------------------
    section(2, "SM4-CBC round trip");
    let key = b"1234567890abcdef";
    let plaintext = b"This is confidential data";
    let t = Instant::now();
    let encrypted = gm.cipher_encrypt(key, plaintext, CipherMode::Cbc)?;
    let decrypted = gm.cipher_decrypt(key, &encrypted, CipherMode::Cbc)?;
    timing("sm4-cbc encrypt+decrypt", t.elapsed());
    info("ciphertext (iv || body)", &short_hex(&encrypted));
    assert_eq!(decrypted, plaintext);
    success("decrypted text matches");

    // -- 3. SM2 signatures ----------------------------------------------------
    section(3, "SM2 sign and verify");
    let (private, public) = gm.generate_key_pair()?;
    info("public key", &short_hex(&public.to_sec1_bytes()));
    let message = b"Important message to sign";
    let t = Instant::now();
    let signature = gm.sign(&private, message)?;
    timing("sign", t.elapsed());
    let t = Instant::now();
    let valid = gm.verify(&public, message, &signature);
    timing("verify", t.elapsed());
    info("signature", &short_hex(&signature));
    info("valid", &valid.to_string());

    // -- 4. SM2 encryption ----------------------------------------------------
    section(4, "SM2 public-key encryption");
    let confidential = b"This is highly confidential data";
    let encrypted = gm.encrypt(&public, confidential)?;
    let decrypted = gm.decrypt(&private, &encrypted)?;
    info("ciphertext", &short_hex(&encrypted));
    assert_eq!(decrypted, confidential);
    success("decrypted text matches");

    // -- 5. Batches -----------------------------------------------------------
    section(5, "Batch sign and verify");
    let messages = ["Message 1", "Message 2", "Message 3"];
    let t = Instant::now();
    let signatures = gm.batch_sign(&private, &messages)?;
    let results = gm.batch_verify(&public, &messages, &signatures)?;
    timing("batch of 3", t.elapsed());
    for (i, (msg, ok)) in messages.iter().zip(&results).enumerate() {
        println!("  Message {}: {msg} - valid: {ok}", i + 1);
    }

    // -- 6. Pooled keys -------------------------------------------------------
    section(6, "Pooled, self-scrubbing keys");
    for round in 1..=3 {
        let key = gm.acquire_key()?;
        let sig = gm.sign(&key, b"short-lived key")?;
        info(
            &format!("round {round}"),
            &format!("container #{} valid={}", key.id(), gm.verify(key.public_key(), b"short-lived key", &sig)),
        );
    }

    // -- 7. Large data --------------------------------------------------------
    section(7, "1 MiB through SM3 and SM4-ECB");
    let large: Vec<u8> = (0..1024 * 1024).map(|i| (i % 256) as u8).collect();
    let t = Instant::now();
    let digest = gm.hash(&large);
    timing("sm3 1 MiB", t.elapsed());
    info("digest", &hex::encode(digest));
    let t = Instant::now();
    let encrypted = gm.cipher_encrypt(key, &large, CipherMode::Ecb)?;
    let decrypted = gm.cipher_decrypt(key, &encrypted, CipherMode::Ecb)?;
    timing("sm4-ecb 1 MiB encrypt+decrypt", t.elapsed());
    assert_eq!(decrypted, large);
    success("large round trip matches");

    // -- Pool counters --------------------------------------------------------
    section(8, "Pool counters");
    let keys = gm.key_pool().stats().snapshot();
    let hashers = gm.hasher_pool().stats().snapshot();
    info(
        "key pool",
        &format!("created={} acquired={} reused={}", keys.created, keys.acquired, keys.reused),
    );
    info(
        "hasher pool",
        &format!("created={} acquired={} reused={}", hashers.created, hashers.acquired, hashers.reused),
    );

    println!();
    success("walkthrough complete");
    Ok(())
}
