use std::process::ExitCode;

fn main() -> ExitCode {
    match docgen::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            docgen::core::tui::error(&err.to_string());
            ExitCode::from(err.exit_code())
        }
    }
}
