//! One handler per subcommand
pub mod benchmark;
pub mod info;
pub mod profiles;
pub mod tokenize;

use std::error::Error;

use crate::Commands;

pub type CommandResult = Result<(), Box<dyn Error>>;

pub fn dispatch(command: &Commands) -> CommandResult {
    match command {
        Commands::Tokenize(args) => tokenize::run(args),
        Commands::Benchmark(args) => benchmark::run(args),
        Commands::Profiles { name } => profiles::run(name.as_deref()),
        Commands::Info { json } => info::run(*json),
    }
}
