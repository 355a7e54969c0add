use std::path::PathBuf;

use anyhow::{bail, Context as _, Result};
use log::{info, LevelFilter};
use tuart::{Config, Loopback, Pins};

fn parse_byte(s: &str) -> Result<u8> {
    let ret = if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        u8::from_str_radix(hex, 16)
    } else {
        s.parse()
    };
    ret.with_context(|| format!("Invalid byte: {s}"))
}

fn load_config(path: Option<PathBuf>) -> Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let text = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("Invalid config: {}", path.display()))
}

#[argopt::cmd]
fn main(
    /// Clock edges per serial bit
    #[opt(short, long)]
    divisor: Option<u32>,
    /// JSON configuration file
    #[opt(short, long)]
    config: Option<PathBuf>,
    /// Print the configuration schema and exit
    #[opt(long)]
    schema: bool,
    /// Enable debug messages
    #[opt(short, long)]
    verbose: bool,
    /// Bytes to send, decimal or 0x-prefixed hex
    bytes: Vec<String>,
) -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter(
            None,
            if verbose {
                LevelFilter::Debug
            } else {
                LevelFilter::Info
            },
        )
        .init();

    if schema {
        let schema = schemars::schema_for!(Config);
        println!("{}", serde_json::to_string_pretty(&schema)?);
        return Ok(());
    }

    let mut config = load_config(config)?;
    if let Some(divisor) = divisor {
        config.divisor = divisor;
    }

    let data = bytes
        .iter()
        .map(|s| parse_byte(s))
        .collect::<Result<Vec<_>>>()?;
    if data.is_empty() {
        bail!("Nothing to send");
    }

    let mut bench = Loopback::new(&config)?;
    info!(
        "Loopback: divisor = {}, latency = {} cycles",
        config.divisor,
        bench.latency()
    );

    for b in data {
        match bench.transfer(b) {
            Some(r) => println!("0x{b:02X} -> 0x{r:02X}"),
            None => println!("0x{b:02X} -> (no data)"),
        }
    }

    bench.wait_idle();
    println!(
        "{} cycles, {} received, {} framing errors, line {}",
        bench.uart().cycle(),
        bench.received().len(),
        bench.uart().framing_errors(),
        if bench.tx() { "idle" } else { "low" },
    );

    Ok(())
}
