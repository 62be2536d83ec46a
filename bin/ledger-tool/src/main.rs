// Copyright 2022 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

//! Inspects Stardust ledger objects: converts between the binary and JSON representations and derives identifiers.

mod cli;
mod config;

use clap::Parser;
use tracing::error;
use tracing_subscriber::{fmt::format::FmtSpan, EnvFilter};

use self::cli::ClArgs;

fn main() {
    dotenv::dotenv().ok();
    set_up_logging();

    std::panic::set_hook(Box::new(|p| {
        error!("{}", p);
    }));

    let cl_args = ClArgs::parse();
    let result = cl_args
        .get_config()
        .map_err(Into::into)
        .and_then(|config| cl_args.process_subcommand(&config));
    match result {
        Ok(output) => println!("{output}"),
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    }
}

fn set_up_logging() {
    tracing_subscriber::fmt()
        .with_span_events(FmtSpan::CLOSE)
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();
}
