use std::fs;

use anyhow::{bail, Context};
use blogmatter::config::Commands::*;
use blogmatter::config::*;
use blogmatter::*;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    // Logs go to stderr, command output to stdout
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = RootCommand::read();
    let config = Config::load(args.config.as_deref())?;

    // Validation is CPU bound, so rayon's default of one thread per core is a good fit
    let mut pool = rayon::ThreadPoolBuilder::new();
    if let Some(threads) = config.concurrency {
        pool = pool.num_threads(threads);
    }
    pool.build()?.install(|| main0(args, config))
}

fn main0(args: RootCommand, config: Config) -> anyhow::Result<()> {
    let content_dir = args.content_dir.unwrap_or_else(|| config.content_dir.clone());
    let blog = CollectionConfig::blog(&content_dir);

    match args.command {
        Check { strict } => {
            let collection = Collection::load(&blog)?;
            let failed = collection.failures().len();
            println!(
                "{}: {} valid, {} invalid",
                collection.name(),
                collection.entries().len(),
                failed
            );
            if failed > 0 && (strict || config.fail_on_error) {
                bail!("{} document(s) of collection '{}' failed validation", failed, collection.name());
            }
        }

        List { json } => {
            let collection = Collection::load(&blog)?;
            if json {
                println!("{}", serde_json::to_string_pretty(collection.entries())?);
            } else {
                for entry in collection.entries() {
                    println!("{}  {}  {}", entry.data.pub_date.date(), entry.slug, entry.data.title);
                }
            }
        }

        Validate { file } => {
            let text = fs::read_to_string(&file).with_context(|| format!("Cannot read {:?}", &file))?;
            let id = blog.entry_id(&file);
            let entry = Collection::validate_entry(&blog, &id, &text)?;
            print!("{}", serde_yaml::to_string(&entry.data)?);
        }
    }

    Ok(())
}
