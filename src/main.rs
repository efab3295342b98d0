//! natrium-token issues and reads PASETO tokens from the command line.
//!
//! Keys are read as PASERKs from the file named by `NATRIUM_CONFIG`. Claims
//! are read from stdin as a JSON object, tokens are read from stdin as text.
//!
//! ```text
//! natrium-token keygen local|public
//! natrium-token encrypt|sign < claims.json
//! natrium-token decrypt|verify < token.txt
//! ```

use std::env::{args, var};
use std::io::{self, Read};

use anyhow::{anyhow, bail, Context, Result};
use natrium_token::claims::{validate, FooterClaims, PayloadClaims};
use natrium_token::config::Config;
use natrium_token::{KeyPair, Paserk, SharedKey, Token, TokenService, Verified};
use serde_json::{Map, Value};
use time::OffsetDateTime;
use tracing::{debug, info};

fn read_stdin() -> Result<String> {
    let mut input = String::new();
    io::stdin()
        .read_to_string(&mut input)
        .context("unable to read stdin")?;

    Ok(input.trim().to_string())
}

fn read_claims(service: &TokenService) -> Result<PayloadClaims> {
    let claims: Map<String, Value> =
        serde_json::from_str(&read_stdin()?).context("claims must be a json object")?;

    let mut builder = service.claims();
    for (claim, value) in claims {
        builder = match (claim.as_str(), value.as_str()) {
            ("iss", Some(iss)) => builder.with_issuer(iss)?,
            ("sub", Some(sub)) => builder.with_subject(sub)?,
            ("aud", Some(aud)) => builder.with_audience(aud)?,
            ("iss" | "sub" | "aud", None) => bail!("claim {} must be a string", claim),
            _ => builder.with_custom_claim(&claim, value.clone())?,
        };
    }

    Ok(builder.build()?)
}

fn print_verified(verified: &Verified) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(verified.payload.claims())?);

    if !validate(&verified.payload, OffsetDateTime::now_utc()) {
        bail!("token is authentic but expired or not yet valid");
    }

    Ok(())
}

fn local_key(config: &Config) -> Result<SharedKey> {
    config
        .local_key()?
        .ok_or_else(|| anyhow!("local_key is not configured"))
}

fn secret_key(config: &Config) -> Result<KeyPair> {
    config
        .secret_key()?
        .ok_or_else(|| anyhow!("secret_key is not configured"))
}

fn keygen(config: &Config, kind: &str) -> Result<()> {
    let version = config.version.paserk_version();

    match kind {
        "local" => {
            let key = Paserk::local(version, &SharedKey::generate()?)?;
            println!("{key}");
            println!("{}", key.lid()?);
        }
        "public" => {
            let pair = KeyPair::generate()?;
            let public = Paserk::public(version, &pair.public_key())?;
            println!("{}", Paserk::secret(version, &pair)?);
            println!("{public}");
            println!("{}", public.pid()?);
        }
        _ => bail!("unknown key type {}, expected local or public", kind),
    }

    Ok(())
}

fn run(command: &str, operand: Option<&str>) -> Result<()> {
    let config = Config::try_env().context("invalid configuration")?;
    debug!("loaded configuration {:?}", config);

    let service = TokenService::from_config(&config)?;
    let implicit = config.implicit_assertion();

    match command {
        "keygen" => keygen(&config, operand.unwrap_or("local"))?,
        "encrypt" => {
            let issued = service.encrypt(
                &local_key(&config)?,
                read_claims(&service)?,
                FooterClaims::new(),
                implicit,
            )?;
            info!("issued token {}", issued.payload.token_identifier());
            println!("{}", issued.token);
        }
        "sign" => {
            let issued = service.sign(
                &secret_key(&config)?,
                read_claims(&service)?,
                FooterClaims::new(),
                implicit,
            )?;
            info!("issued token {}", issued.payload.token_identifier());
            println!("{}", issued.token);
        }
        "decrypt" => {
            let token = Token::parse(&read_stdin()?)?;
            print_verified(&service.decrypt(&local_key(&config)?, &token, implicit)?)?;
        }
        "verify" => {
            let token = Token::parse(&read_stdin()?)?;
            let key = secret_key(&config)?.public_key();
            print_verified(&service.verify(&key, &token, implicit)?)?;
        }
        _ => bail!("unknown command {}", command),
    }

    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(var("RUST_LOG").unwrap_or_else(|_| "info".to_string()))
        .with_writer(io::stderr)
        .init();

    let args: Vec<String> = args().skip(1).collect();
    let command = args
        .first()
        .ok_or_else(|| anyhow!("usage: natrium-token keygen|encrypt|decrypt|sign|verify"))?;

    run(command, args.get(1).map(String::as_str))
}
