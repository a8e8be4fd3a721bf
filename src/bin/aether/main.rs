use std::process;

use structopt::StructOpt;

// argument parser and logging
pub mod cli;
pub mod status;

// command implementations
pub mod run;

use crate::{
    cli::{Aether, Command},
    status::{Status, StatusLogger},
};

fn main() {
    let args = Aether::from_args();
    StatusLogger::init(args.verbose);

    let result = match args.command {
        Command::Lex(file) => run::lex(&file.path),
        Command::Parse(file) => run::parse(&file.path),
        Command::Build(package) => run::build(&package.path),
    };

    if let Err(r) = result {
        Status::fatal().log(&r);
        process::exit(1);
    }
}
