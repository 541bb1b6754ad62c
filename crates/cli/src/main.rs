use std::process::ExitCode;

fn main() -> ExitCode {
    dairy_cli::run()
}
