//! Inspect one direction of a captured TLS connection.
//!
//! Usage: `cargo run --example sniff_capture [--server] [FILE]`
//!
//! Reads raw stream bytes (for example a tcpflow output file) from FILE or stdin.
//! Set `RUST_LOG=tlsniff_core=trace` to follow the parser.

use std::fs::File;
use std::io::{self, Read};
use tlsniff::{Config, ParseState, Sniffer};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let mut server = false;
    let mut path = None;
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--server" => server = true,
            _ => path = Some(arg),
        }
    }

    let config = if server {
        Config::builder()
            .with_stop_after_client_hello(false)
            .with_target_state(ParseState::HelloDoneReceived)
            .build()?
    } else {
        Config::default()
    };

    let reader: Box<dyn Read> = match path {
        Some(path) => Box::new(File::open(path)?),
        None => Box::new(io::stdin()),
    };

    let outcome = Sniffer::new(reader, config).run()?;

    println!("state:     {}", outcome.state);
    println!("resuming:  {}", outcome.resuming);
    println!("{}", outcome.summary);
    if let Some(chain) = &outcome.certificates {
        for (i, entry) in chain.iter().enumerate() {
            println!("cert[{}]:   {} bytes", i, entry.der().len());
        }
    }
    println!("trailing:  {} bytes", outcome.trailing.len());
    Ok(())
}
