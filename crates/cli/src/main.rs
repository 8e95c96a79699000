use std::process::ExitCode;

fn main() -> ExitCode {
    bundlewise_cli::run()
}
