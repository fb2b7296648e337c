//! MongoDB write task plugin
//!
//! Invoked once per task by an orchestration host: reads a JSON parameter
//! record, performs exactly one insert/update/upsert, prints a single JSON
//! result envelope on stdout, and exits. Logs go to stderr so stdout stays
//! machine-readable.

use clap::Parser;
use scribe_common::{Result, ScribeError};
use scribe_mongodb::{check_compatibility, Connection, WriteExecutor, WriteOutcome};
use std::io::Read;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

mod envelope;
mod params;

use params::TaskParams;

#[derive(Parser, Debug)]
#[command(name = "scribe")]
#[command(about = "Performs one MongoDB write (insert, update, or upsert) for an automation host")]
struct Args {
    /// Parameter record file, or "-" for stdin
    #[arg(short, long, default_value = "-")]
    params: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "warn")]
    log_level: Level,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // stdout carries the result envelope, so logging goes to stderr
    let subscriber = FmtSubscriber::builder()
        .with_max_level(args.log_level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match run(&args).await {
        Ok(outcome) => {
            println!("{}", envelope::success(&outcome));
            Ok(())
        }
        Err(err) => {
            println!("{}", envelope::failure(&err));
            std::process::exit(1);
        }
    }
}

async fn run(args: &Args) -> Result<WriteOutcome> {
    let record = read_record(&args.params)?;
    let task = TaskParams::from_json_str(&record)?;
    let request = task.write_request()?;

    let mut connection_params = task.connection_params();
    connection_params.resolve_credentials()?;

    let connection = Connection::establish(&connection_params).await?;

    // Advisory guard, run right after connecting and before the write
    let server_version = connection.server_version().await?;
    check_compatibility(&server_version)?;

    WriteExecutor::execute(&connection, &request).await
}

fn read_record(source: &str) -> Result<String> {
    let read = || -> std::io::Result<String> {
        if source == "-" {
            let mut text = String::new();
            std::io::stdin().read_to_string(&mut text)?;
            Ok(text)
        } else {
            std::fs::read_to_string(source)
        }
    };
    read().map_err(|e| ScribeError::Validation(format!("unable to read parameter record: {}", e)))
}
