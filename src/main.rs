use std::process::ExitCode;

fn main() -> ExitCode {
    match ums_feedback_lib::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
