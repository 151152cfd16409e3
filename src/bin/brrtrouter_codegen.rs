use brrtrouter_codegen::cli::{run_cli, Cli};
use clap::Parser;

fn main() {
    let cli = Cli::parse();
    if let Err(err) = run_cli(cli) {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
