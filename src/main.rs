mod auth;
mod backup;
mod cmd;
mod config;
mod drive;
mod error;
mod mirror;
mod store;

use anyhow::Result;
use std::env;
use std::process::exit;

fn main() {
    if let Err(e) = entry() {
        eprintln!("Error: {e:#}");
        exit(1);
    }
}

fn entry() -> Result<()> {
    let args: Vec<String> = env::args().skip(1).collect();

    let Some(command) = args.first() else {
        return cmd::help::run();
    };
    let rest = &args[1..];

    match command.as_str() {
        "list" => cmd::list::run(),
        "upload" => cmd::upload::run(rest),
        "backup" => cmd::backup::run(rest),
        "login" => cmd::login::run(rest),
        "help" | "-h" | "--help" => cmd::help::run(),
        "-V" | "--version" => {
            println!("drivekeep {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        other => {
            // An unknown command prints usage and exits zero.
            println!("Invalid command '{other}'. Use 'list', 'upload', 'backup' or 'login'.");
            println!();
            cmd::help::run()
        }
    }
}
