mod args;
mod election;

use clap::Parser;
use log::{debug, LevelFilter};
use snafu::ErrorCompat;

use crate::args::{Args, Command};
use crate::election::*;

fn run(args: Args) -> Result<(), ElectionError> {
    match args.command {
        Command::Import {
            store,
            input,
            input_type,
            excel_worksheet_name,
            config,
        } => {
            let count = run_import(&store, input, input_type, excel_worksheet_name, config)?;
            println!("Imported {} voters", count);
        }
        Command::Booths { store, count } => {
            let booths = run_generate_booths(&store, count)?;
            println!("Created {} booths", booths.len());
        }
        Command::Room {
            store,
            booth,
            room,
            location,
        } => {
            let b = run_assign_room(&store, &booth, &room, location.as_deref())?;
            println!("{} is in room {}", b.name, room);
        }
        Command::Allocate {
            store,
            config,
            yes,
            out,
            reference,
        } => {
            let stdin = std::io::stdin();
            let plan = run_allocate(&store, config, yes, out, reference, &mut stdin.lock())?;
            debug!("plan: {:?}", plan);
        }
        Command::Report {
            store,
            booth,
            format,
            out,
        } => {
            run_report(&store, &booth, format, out)?;
        }
    }
    Ok(())
}

fn main() {
    let args = Args::parse();

    if args.verbose {
        env_logger::Builder::new()
            .filter_level(LevelFilter::Info)
            .parse_default_env()
            .init();
    } else {
        env_logger::init();
    }
    debug!("args: {:?}", args);

    if let Err(e) = run(args) {
        eprintln!("An error occured: {}", e);
        if let Some(bt) = ErrorCompat::backtrace(&e) {
            debug!("trace: {}", bt);
        }
        std::process::exit(1);
    }
}
