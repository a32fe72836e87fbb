use std::io::{self, Write};
use std::{env, process};

use anyhow::Result;
use data_ingestion::config::AlphaVantageConfig;
use data_ingestion::logger::init_logger;
use price_predictor::cli::run;

fn main() -> Result<()> {
    init_logger();

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let code = run(env::args().skip(1), AlphaVantageConfig::from_env(), &mut out);
    out.flush()?;

    process::exit(code);
}
