use std::process::ExitCode;

fn main() -> ExitCode {
    picaquote_cli::run()
}
