//! Replay a scripted goal-line session (native).
//!
//! Usage: `goalline-replay [SCRIPT.json]`. Reads stdin without an argument
//! and prints the report as JSON.

#[cfg(feature = "native")]
fn run() -> goalline_app::AppResult<()> {
    use std::io::Read;

    let json = match std::env::args().nth(1) {
        Some(path) => std::fs::read_to_string(path)?,
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };
    let script = goalline_app::replay::ReplayScript::from_json(&json)?;
    log::info!("Replaying {} steps", script.steps.len());

    let report = goalline_app::replay::replay(&script)?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

#[cfg(feature = "native")]
fn main() {
    env_logger::init();

    if let Err(e) = run() {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

#[cfg(not(feature = "native"))]
fn main() {
    panic!("Native feature not enabled. Use `cargo run --features native`");
}
