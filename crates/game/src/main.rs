use std::process::ExitCode;

mod app;
mod epilogue;
mod level;
mod menu;

fn main() -> ExitCode {
    let wiring = app::bootstrap::build_app();
    app::loop_runner::run(wiring)
}
