use pagekit_cli::{command, init_tracing, run};
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    let matches = command().get_matches();
    init_tracing(matches.get_flag("verbose"), matches.get_flag("log-json"));

    match run(&matches).await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
