use anyhow::Result;

const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const CYAN: &str = "\x1b[36m";
const GREEN: &str = "\x1b[32m";
const RESET: &str = "\x1b[0m";

pub fn run() -> Result<()> {
    let version = env!("CARGO_PKG_VERSION");

    println!(
        "{BOLD}{CYAN}drivekeep{RESET} {DIM}v{version}{RESET}  {DIM}─{RESET}  Back up local folders to Google Drive"
    );
    println!();
    println!("{BOLD}Usage:{RESET}  {GREEN}drivekeep{RESET} {DIM}<command> [args...]{RESET}");
    println!();
    println!("{BOLD}Commands:{RESET}");

    let commands: &[(&str, &str)] = &[
        ("list", "List top-level Drive folders"),
        ("upload [path]", "Mirror a local folder to Drive"),
        ("backup [path]", "Mirror a local folder as Backup_<timestamp>"),
        ("login [code]", "Exchange an OAuth authorization code"),
        ("help", "Show this help message"),
    ];

    for (cmd, desc) in commands {
        let (name, args) = match cmd.find(' ') {
            Some(i) => (&cmd[..i], &cmd[i..]),
            None => (*cmd, ""),
        };
        println!(
            "  {GREEN}{name}{RESET}{DIM}{args}{RESET}  {:>width$}{DIM}{desc}{RESET}",
            "",
            width = 16usize.saturating_sub(cmd.len()),
        );
    }

    println!();
    println!(
        "{DIM}Without an explicit path, upload and backup use `local_folder` from config.toml.{RESET}"
    );
    Ok(())
}
