//! `tinker init [--force]`

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use tinker_core::config;

/// Write the default config.
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Overwrite an existing config with the defaults.
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    pub fn run(self) -> Result<()> {
        let home = dirs::home_dir().context("could not determine home directory")?;
        let (_, created) =
            config::init_at(&home, self.force).context("failed to initialise config")?;

        let path = config::path_at(&home);
        if created {
            println!("{} Wrote {}", "✓".green(), path.display());
            println!("  Set frame.photoset_id before running `tinker frame sync`.");
        } else {
            println!(
                "{} {} already exists (use --force to overwrite)",
                "·".bright_black(),
                path.display()
            );
        }
        Ok(())
    }
}
