use turing_lexer::profile::builtin;

use super::CommandResult;

/// One line per built-in profile
pub fn listing() -> Result<String, turing_lexer::ProfileError> {
    let rows: Vec<String> = builtin::all()?
        .iter()
        .map(|profile| {
            format!(
                "{:<11} {:<22} {}",
                profile.id(),
                profile.aliases().join(", "),
                profile.description()
            )
        })
        .collect();
    Ok(rows.join("\n"))
}

pub fn run(name: Option<&str>) -> CommandResult {
    match name {
        Some(name) => {
            let profile = builtin::by_name(name)?;
            print!("{}", profile.to_toml_string()?);
        }
        None => {
            println!("=== Built-in Profiles ===");
            println!("{}", listing()?);
            println!("\nDump one with `turing-lex profiles <name>`; load edited copies with --profile-file.");
        }
    }
    Ok(())
}
