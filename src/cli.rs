//! Command-line interface definitions.
//!
//! This module defines the CLI structure for the `initool` binary using
//! clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// INI file inspector and editor.
#[derive(Parser, Debug)]
#[command(name = "initool")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the INI file.
    pub file: PathBuf,

    /// Fail on the first malformed line instead of skipping it.
    #[arg(long)]
    pub strict: bool,

    /// Keep blank lines when loading and writing.
    #[arg(long)]
    pub keep_blank_lines: bool,

    /// The command to execute.
    #[clap(subcommand)]
    pub command: IniCommand,
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum IniCommand {
    /// List section names in declaration order.
    Sections,

    /// Print the value of one setting.
    ///
    /// The value is printed in its output form, quoted and escaped as it
    /// would appear in the file.
    Get {
        /// The section to look in.
        section: String,
        /// The setting name.
        key: String,
    },

    /// Set a value and write the file back.
    ///
    /// The section and setting are created if missing.
    Set {
        /// The section to write to.
        section: String,
        /// The setting name.
        key: String,
        /// The value to store.
        value: String,
    },

    /// Remove a setting, or a whole section, and write the file back.
    Remove {
        /// The section to edit.
        section: String,
        /// The setting to remove; omit to remove the entire section.
        key: Option<String>,
    },

    /// Re-serialize the whole document to stdout.
    Dump,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_sections() {
        let cli = Cli::parse_from(["test", "app.ini", "sections"]);
        assert!(matches!(cli.command, IniCommand::Sections));
        assert!(!cli.strict);
    }

    #[test]
    fn test_parse_get() {
        let cli = Cli::parse_from(["test", "app.ini", "get", "Core", "Volume"]);
        match cli.command {
            IniCommand::Get { section, key } => {
                assert_eq!(section, "Core");
                assert_eq!(key, "Volume");
            }
            _ => panic!("Expected Get command"),
        }
    }

    #[test]
    fn test_parse_set_with_flags() {
        let cli = Cli::parse_from(["test", "--strict", "app.ini", "set", "Core", "Volume", "0.5"]);
        assert!(cli.strict);
        match cli.command {
            IniCommand::Set {
                section,
                key,
                value,
            } => {
                assert_eq!(section, "Core");
                assert_eq!(key, "Volume");
                assert_eq!(value, "0.5");
            }
            _ => panic!("Expected Set command"),
        }
    }

    #[test]
    fn test_parse_remove_whole_section() {
        let cli = Cli::parse_from(["test", "app.ini", "remove", "Core"]);
        match cli.command {
            IniCommand::Remove { section, key } => {
                assert_eq!(section, "Core");
                assert!(key.is_none());
            }
            _ => panic!("Expected Remove command"),
        }
    }

    #[test]
    fn test_parse_dump() {
        let cli = Cli::parse_from(["test", "app.ini", "dump"]);
        assert!(matches!(cli.command, IniCommand::Dump));
    }
}
