use std::process::ExitCode;

use aescat::app::{self, App};

fn main() -> ExitCode {
    app::init_tracing();
    let args: Vec<String> = std::env::args().skip(1).collect();
    match App::new().run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            report(&error);
            ExitCode::FAILURE
        }
    }
}

/// Prints the error and its causes, one per line, causes indented under the
/// `ERROR: ` prefix.
fn report(error: &anyhow::Error) {
    eprintln!("ERROR: {error}");
    for cause in error.chain().skip(1) {
        eprintln!("       {cause}");
    }
}
