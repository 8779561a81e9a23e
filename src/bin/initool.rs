//! INI file inspector and editor.
//!
//! This binary loads a file into a [`Document`], runs one command against
//! it, and writes the file back for the editing commands.

use clap::Parser;
use tracing_subscriber::EnvFilter;

use inikit::cli::{Cli, IniCommand};
use inikit::{Document, Error};

pub fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Cli::parse();
    if let Err(err) = run(args) {
        eprintln!("error: {}", err);
        std::process::exit(1);
    }
}

fn run(args: Cli) -> inikit::Result<()> {
    let mut doc = Document::new();
    doc.strict = args.strict;
    doc.strip_empty_lines = !args.keep_blank_lines;
    doc.load_file(&args.file)?;

    match args.command {
        IniCommand::Sections => {
            for section in doc.iter() {
                println!("{}", section.name());
            }
        }

        IniCommand::Get { section, key } => {
            let setting = doc
                .get(&section)
                .and_then(|s| s.get(&key))
                .ok_or_else(|| Error::Format {
                    line: None,
                    reason: format!("no setting {:?} in section {:?}", key, section),
                })?;
            println!("{}", setting.escaped_value());
        }

        IniCommand::Set {
            section,
            key,
            value,
        } => {
            doc.get_or_insert(&section)?
                .get_or_insert(&key)?
                .set(value.as_str());
            doc.save_to_file(&args.file)?;
            println!("Set {}.{}", section, key);
        }

        IniCommand::Remove { section, key } => {
            let removed = match &key {
                Some(key) => doc
                    .get_mut(&section)
                    .map_or(false, |s| s.try_remove(key).is_some()),
                None => doc.try_remove(&section).is_some(),
            };
            if !removed {
                return Err(Error::Format {
                    line: None,
                    reason: format!(
                        "nothing to remove for {:?} in {:?}",
                        key.as_deref().unwrap_or("<section>"),
                        section
                    ),
                });
            }
            doc.save_to_file(&args.file)?;
            println!("Removed");
        }

        IniCommand::Dump => print!("{}", doc),
    }

    Ok(())
}
