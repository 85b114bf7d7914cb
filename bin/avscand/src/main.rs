use std::process::ExitCode;

/// The server takes no CLI arguments (§6).
fn main() -> ExitCode {
    let outcome = server::run();
    server::exit_code_from(&outcome)
}
