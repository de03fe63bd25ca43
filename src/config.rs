use anyhow::Context;
use clap::{Parser, Subcommand};
use std::fs::File;
use std::path::Path;
use std::path::PathBuf;

//----- Command line parameters

pub const DEFAULT_CONFIG: &str = "blogmatter.yml";

/// Check blog posts against the content collection schema
#[derive(Parser, Debug)]
#[clap(name = "blogmatter")]
pub struct RootCommand {
    /// Path to the config file [default: blogmatter.yml, if it exists]
    #[clap(global = true, long)]
    pub config: Option<PathBuf>,

    /// Content directory, overrides the config file
    #[clap(global = true, long)]
    pub content_dir: Option<PathBuf>,

    #[clap(subcommand)]
    pub command: Commands,
}

impl RootCommand {
    // Avoids importing clap::Parser in main
    pub fn read() -> RootCommand {
        RootCommand::parse()
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate all posts of the blog collection
    Check {
        /// Fail if any post is invalid
        #[clap(long)]
        strict: bool,
    },

    /// List valid posts, newest first
    List {
        /// Output the validated frontmatter as JSON
        #[clap(long)]
        json: bool,
    },

    /// Validate a single markdown file
    Validate {
        /// The markdown file
        file: PathBuf,
    },
}

//----- Config file

#[derive(Deserialize, Debug, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default = "default_content_dir")]
    pub content_dir: PathBuf,
    pub concurrency: Option<usize>,
    #[serde(default)]
    pub fail_on_error: bool,
}

fn default_content_dir() -> PathBuf {
    "src/content".into()
}

impl Default for Config {
    fn default() -> Self {
        Config {
            content_dir: default_content_dir(),
            concurrency: None,
            fail_on_error: false,
        }
    }
}

impl Config {
    pub fn read(path: &Path) -> anyhow::Result<Config> {
        let file = File::open(path).with_context(|| format!("Failed to open {:?}", path))?;
        let config = serde_yaml::from_reader(file).with_context(|| format!("Failed to read {:?}", path))?;
        Ok(config)
    }

    /// Reads an explicit config file, or the default one if it exists.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Config> {
        match path {
            Some(path) => Config::read(path),
            None if Path::new(DEFAULT_CONFIG).exists() => Config::read(Path::new(DEFAULT_CONFIG)),
            None => Ok(Config::default()),
        }
    }
}
