//! jsondb CLI Client
//!
//! Sends one request built from flags, or one request per line of a file.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::process::ExitCode;

use clap::Parser;
use jsondb::client::{build_command, Client};

/// jsondb CLI
#[derive(Parser, Debug)]
#[command(name = "jsondb-cli")]
#[command(about = "CLI for the jsondb document store")]
struct Args {
    /// Server address
    #[arg(short, long, default_value = "127.0.0.1:34567")]
    server: String,

    /// Request type (set, get, delete, exit)
    #[arg(short = 't', long = "type")]
    kind: Option<String>,

    /// Key path segment; repeat for nested keys (-k user -k name)
    #[arg(short, long)]
    key: Vec<String>,

    /// Value for set; JSON if it parses, otherwise a string
    #[arg(short, long)]
    value: Option<String>,

    /// File with one JSON request per line, each sent on its own connection
    #[arg(short = 'i', long = "in", conflicts_with_all = ["kind", "key", "value"])]
    input: Option<String>,
}

fn main() -> ExitCode {
    let args = Args::parse();
    let client = Client::new(&args.server);

    if let Some(path) = &args.input {
        return match send_batch(&client, path) {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("Error reading {}: {}", path, e);
                ExitCode::FAILURE
            }
        };
    }

    let Some(kind) = &args.kind else {
        eprintln!("Either -t/--type or -i/--in is required");
        return ExitCode::FAILURE;
    };

    let command = build_command(kind, args.key.clone(), args.value.as_deref());
    if send_one(&client, &command.to_json()) {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn send_batch(client: &Client, path: &str) -> std::io::Result<()> {
    let reader = BufReader::new(File::open(path)?);
    for line in reader.lines() {
        let line = line?;
        let message = line.trim();
        if !message.is_empty() {
            send_one(client, message);
        }
    }
    Ok(())
}

fn send_one(client: &Client, message: &str) -> bool {
    println!("Sent: {}", message);
    match client.send_text(message) {
        Ok(response) => {
            println!("Received: {}", response);
            true
        }
        Err(e) => {
            eprintln!("Error in communication with server: {}", e);
            false
        }
    }
}
