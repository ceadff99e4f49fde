use turing_lexer::pipeline::get_pipeline_info;

use super::CommandResult;

pub fn run(json: bool) -> CommandResult {
    let info = get_pipeline_info();

    if json {
        println!("{}", serde_json::to_string_pretty(&info)?);
        return Ok(());
    }

    println!("turing-lex v{}", env!("CARGO_PKG_VERSION"));
    println!("{}", info.summary());
    println!();
    println!("{}", info.report());
    println!("Physical Cores: {}", num_cpus::get_physical());
    Ok(())
}
