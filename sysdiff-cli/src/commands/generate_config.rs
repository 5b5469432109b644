//! Generate config command implementation

use crate::config::CliConfig;
use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;

/// Arguments for the generate-config command
#[derive(Debug, Args)]
pub struct GenerateConfigArgs {
    /// Output file path (default: stdout)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

impl GenerateConfigArgs {
    /// Execute the generate-config command
    pub fn execute(&self) -> Result<()> {
        let template = Self::generate_template()?;

        match &self.output {
            Some(path) => {
                std::fs::write(path, &template)
                    .with_context(|| format!("Failed to write to {}", path.display()))?;
                println!("Configuration template written to {}", path.display());
                println!("Use it with: sysdiff compare -c {} ...", path.display());
            }
            None => print!("{template}"),
        }

        Ok(())
    }

    /// Default configuration as commented TOML
    pub fn generate_template() -> Result<String> {
        let body = CliConfig::default().to_toml()?;
        Ok(format!(
            "# sysdiff configuration\n\
             # Every value may be overridden by the matching command-line flag.\n\
             # metric: bleu | sentbleu | length | mean\n\
             # buckets.mode: label | multilabel | numlabel | score | length | lengthdiff\n\
             # buckets.word_mode: frequency | label | multilabel\n\
             # ngram.salience: recall | precision | matched | over | under\n\n\
             {body}"
        ))
    }
}
