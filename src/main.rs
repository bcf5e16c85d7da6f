use std::process::ExitCode;

fn main() -> ExitCode {
    match covid_tracker::app::run_report() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::from(err.exit_code())
        }
    }
}
