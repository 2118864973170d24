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
