#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

use clap::{Parser, Subcommand};

mod batch;
mod common;
mod stream;

use crate::common::ConnectionArgs;

#[derive(Parser)]
#[command(version, about = "Evaluate RPN expressions on a remote calculator", long_about = None)]
#[command(propagate_version = true)]
#[command(name = "calculator-cli")]
struct Cli {
    #[command(flatten)]
    connection: ConnectionArgs,

    /// Log verbosity on stderr (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Read tokens from stdin, one per line, and stream them until EOF
    Stream,
    /// Send the whole expression in a single call
    Batch(batch::BatchArgs),
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    common::init_logging(cli.verbose);

    let outcome = match cli.command {
        Commands::Stream => stream::run(&cli.connection).await,
        Commands::Batch(args) => args.run(&cli.connection).await,
    };

    match outcome {
        Ok(result) => println!("Result: {result}"),
        Err(e) => {
            eprintln!("Error: {e:#}");
            // Exit without waiting on a stdin read that may still be blocked.
            std::process::exit(1);
        }
    }
}
