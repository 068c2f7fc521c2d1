use clap::Parser;
use quantifications::cli::{self, Args};
use std::process;

fn main() {
    let args = Args::parse();

    match cli::execute(args) {
        Ok(_summary) => {
            // Summary has already been printed
            process::exit(0);
        }
        Err(error) => {
            eprintln!("Error: {:#}", error);
            process::exit(1);
        }
    }
}
