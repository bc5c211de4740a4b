mod args;
mod survey;

use clap::Parser;
use log::{debug, warn, LevelFilter};

use crate::args::Args;

fn main() {
    let args = Args::parse();

    if args.verbose {
        env_logger::Builder::new()
            .filter_level(LevelFilter::Debug)
            .init();
    } else {
        env_logger::init();
    }
    debug!("args: {:?}", args);

    let res = survey::run_dashboard(&args);
    if let Err(e) = res {
        warn!("Error occured {:?}", e);
        survey::print_error(&e);
        std::process::exit(1);
    }
}
