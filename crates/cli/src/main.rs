use std::process::ExitCode;

fn main() -> ExitCode {
    petsit_cli::run()
}
