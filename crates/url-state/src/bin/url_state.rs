//! url-state: read and write view state stored in a URL.
//!
//! ```text
//! url-state decode '/app?_a=sort:asc'
//! echo '{"page":2}' | url-state encode '/app?_a=sort:asc'
//! echo '{"a":[1,"x y"]}' | url-state to-rison
//! ```

use std::io::{self, Read, Write};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde_json::{Map, Value};
use url_state::rison::{self, RisonDecoder, DEFAULT_MAX_DEPTH};
use url_state::{CodecOptions, Location, LocationStateCodec, DEFAULT_STATE_KEY};

#[derive(Parser)]
#[command(name = "url-state", about = "Read and write view state stored in a URL")]
struct Cli {
    /// Query parameter that holds the state.
    #[arg(long, global = true, default_value = DEFAULT_STATE_KEY, env = "URL_STATE_KEY")]
    state_key: String,

    /// Deepest nesting accepted when decoding.
    #[arg(long, global = true, default_value_t = DEFAULT_MAX_DEPTH, env = "URL_STATE_MAX_DEPTH")]
    max_depth: usize,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the state stored in LOCATION as JSON.
    Decode { location: String },
    /// Merge a JSON object (--state or stdin) into LOCATION and print the result.
    Encode {
        location: String,
        #[arg(long)]
        state: Option<String>,
    },
    /// Convert JSON from stdin to Rison.
    ToRison {
        /// Write O-Rison (object without outer parentheses).
        #[arg(long)]
        object: bool,
    },
    /// Convert Rison from stdin to JSON.
    FromRison {
        /// Read O-Rison (object without outer parentheses).
        #[arg(long)]
        object: bool,
    },
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let output = run(&cli, io::stdin().lock())?;
    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{output}")?;
    Ok(())
}

fn init_tracing() {
    use tracing_subscriber::prelude::*;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

fn run(cli: &Cli, mut input: impl Read) -> Result<String> {
    let options = CodecOptions {
        state_key: cli.state_key.clone(),
        max_depth: cli.max_depth,
    };
    let codec = LocationStateCodec::new().with_options(options);

    match &cli.command {
        Command::Decode { location } => {
            let state = codec.decode(&Location::parse(location))?;
            Ok(serde_json::to_string_pretty(&Value::Object(state))?)
        }
        Command::Encode { location, state } => {
            let text = match state {
                Some(text) => text.clone(),
                None => read_all(&mut input)?,
            };
            let update = parse_object(&text)?;
            let next = codec.encode(&update, &Location::parse(location))?;
            Ok(next.to_string())
        }
        Command::ToRison { object } => {
            let value: Value =
                serde_json::from_str(read_all(&mut input)?.trim()).context("invalid JSON input")?;
            match (*object, value) {
                (true, Value::Object(map)) => Ok(rison::encode_object(&map)),
                (true, other) => bail!("--object expects a JSON object, got {other}"),
                (false, value) => Ok(rison::encode(&value)),
            }
        }
        Command::FromRison { object } => {
            let text = read_all(&mut input)?;
            let decoder = RisonDecoder::with_max_depth(cli.max_depth);
            let value = if *object {
                Value::Object(decoder.decode_object(text.trim_end_matches(['\n', '\r']))?)
            } else {
                decoder.decode(text.trim_end_matches(['\n', '\r']))?
            };
            Ok(serde_json::to_string_pretty(&value)?)
        }
    }
}

fn read_all(input: &mut impl Read) -> Result<String> {
    let mut text = String::new();
    input
        .read_to_string(&mut text)
        .context("failed to read stdin")?;
    Ok(text)
}

fn parse_object(text: &str) -> Result<Map<String, Value>> {
    match serde_json::from_str::<Value>(text.trim()).context("invalid JSON state")? {
        Value::Object(map) => Ok(map),
        other => bail!("state must be a JSON object, got {other}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("url-state").chain(args.iter().copied()))
            .expect("valid arguments")
    }

    #[test]
    fn decode_prints_json() {
        let out = run(&cli(&["decode", "/app?_a=sort:asc"]), io::empty()).unwrap();
        assert_eq!(
            serde_json::from_str::<Value>(&out).unwrap(),
            serde_json::json!({"sort": "asc"})
        );
    }

    #[test]
    fn encode_reads_state_from_stdin() {
        let out = run(&cli(&["encode", "/app?foo=bar#top"]), &b"{\"page\": 2}\n"[..]).unwrap();
        assert_eq!(out, "/app?foo=bar&_a=page%3A2#top");
    }

    #[test]
    fn encode_with_custom_key() {
        let out = run(
            &cli(&["encode", "/", "--state", "{\"a\":1}", "--state-key", "_g"]),
            io::empty(),
        )
        .unwrap();
        assert_eq!(out, "/?_g=a%3A1");
    }

    #[test]
    fn encode_rejects_non_objects() {
        assert!(run(&cli(&["encode", "/", "--state", "[1]"]), io::empty()).is_err());
    }

    #[test]
    fn rison_conversions() {
        let out = run(&cli(&["to-rison"]), &b"{\"a\":[1,\"x y\"]}"[..]).unwrap();
        assert_eq!(out, "(a:!(1,'x y'))");
        let out = run(&cli(&["to-rison", "--object"]), &b"{\"a\":1}"[..]).unwrap();
        assert_eq!(out, "a:1");
        let out = run(&cli(&["from-rison", "--object"]), &b"a:!t\n"[..]).unwrap();
        assert_eq!(
            serde_json::from_str::<Value>(&out).unwrap(),
            serde_json::json!({"a": true})
        );
        assert!(run(&cli(&["from-rison"]), &b"(a"[..]).is_err());
    }
}
