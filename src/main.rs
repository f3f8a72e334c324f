use std::process::ExitCode;

fn main() -> ExitCode {
    match rcc_kit_sales_lib::run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
