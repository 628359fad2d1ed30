use crate::auth::Auth;
use anyhow::Result;

pub fn run(args: &[String]) -> Result<()> {
    let auth = Auth::new()?;

    let Some(code) = args.first() else {
        println!("Visit this URL, authorize the app, then run `drivekeep login <code>`:");
        println!();
        println!("  {}", auth.authorize_url());
        return Ok(());
    };

    auth.authorize(code)?;
    println!("Logged in; session saved to {}", auth.session_path().display());
    Ok(())
}
