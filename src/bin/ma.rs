//! Short binary name (`ma`) that forwards to the `math_archivist` library.
//! Keeping the alias as a real binary avoids shell alias requirements.

use std::process::ExitCode;

fn main() -> ExitCode {
    match math_archivist::entry() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}
