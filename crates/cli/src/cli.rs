//! CLI definition.

use std::env::current_dir;

use anyhow::{Context, Result};
use clap::Parser;
use log::debug;

use sunghyun_webfont_core::build_web_dist;

/// Takes no flags: the build is fully described by the project layout.
#[derive(Parser)]
#[command(name = "build-web-dist", version)]
#[command(about = "Build dist/web (full fonts, dynamic subsets and CSS) from fonts/woff2")]
pub struct Cli {}

impl Cli {
    pub fn run(self) -> Result<()> {
        let root = current_dir().context("Failed to resolve working directory")?;
        debug!("Project root: {}", root.display());

        let summary = build_web_dist(&root)?;
        println!("\n{summary}");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_rejects_arguments() {
        assert!(Cli::try_parse_from(["build-web-dist"]).is_ok());
        assert!(Cli::try_parse_from(["build-web-dist", "--workers", "4"]).is_err());
        assert!(Cli::try_parse_from(["build-web-dist", "fonts"]).is_err());
    }
}
