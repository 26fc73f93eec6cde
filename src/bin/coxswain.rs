use coxswain::app::command_handlers;

fn output_header() -> &'static str {
    "Coxswain\nCoxswain submits workflows to a Cromwell-compatible execution engine and monitors them to completion."
}

fn print_header() {
    println!("{}\n", output_header());
}

fn run() -> Result<(), String> {
    print_header();
    let args: Vec<String> = std::env::args().skip(1).collect();
    let output = command_handlers::run_cli(args)?;
    println!("{output}");
    Ok(())
}

fn main() {
    if let Err(err) = run() {
        eprintln!("{err}");
        std::process::exit(1);
    }
}
