//! CLI command definitions using clap.
//!
//! Defines the main CLI structure and subcommands:
//! - next: the source to serve next
//! - progress: per-source progress report
//! - quota: list/export/set/remove quotas
//! - import: load legacy target definitions
//! - item / train: seed content items and training records

use clap::{Parser, Subcommand};
use rotor::domain::{Role, SourceId, TrainingType, UserId};
use std::path::PathBuf;

/// rotor - weekly-target source rotation for news training
#[derive(Parser, Debug)]
#[command(name = "rotor")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Optional config file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Database file (overrides storage.db_path)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Act as this user (overrides session.user_id)
    #[arg(short = 'u', long = "user", global = true)]
    pub as_user: Option<UserId>,

    /// Role of the acting user (overrides session.role)
    #[arg(long, global = true)]
    pub role: Option<Role>,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Check if verbose mode is enabled
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }
}

/// Main subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the source the user should be served next
    Next {
        /// Training type (cleaning, classifying)
        training_type: TrainingType,

        /// Resolve for another user (admin only)
        #[arg(long)]
        for_user: Option<UserId>,
    },

    /// Show progress on every quota, in rotation order
    Progress {
        /// Training type (cleaning, classifying)
        training_type: TrainingType,

        /// Report for another user (admin only)
        #[arg(long)]
        for_user: Option<UserId>,
    },

    /// Quota administration
    Quota {
        #[command(subcommand)]
        command: QuotaCommands,
    },

    /// Import legacy target definitions from a YAML or JSON file
    Import {
        /// File holding a list of {name, value} rows
        file: PathBuf,
    },

    /// Content item management
    Item {
        #[command(subcommand)]
        command: ItemCommands,
    },

    /// Record a training action by the acting user
    Train {
        /// Content item id
        item: i64,

        /// Cleaning verdict
        #[arg(long)]
        like: Option<i64>,

        /// Classifying category id
        #[arg(long)]
        category: Option<i64>,
    },
}

/// Quota subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum QuotaCommands {
    /// List quotas of a user
    List {
        /// User whose quotas to list (defaults to the acting user)
        #[arg(long)]
        for_user: Option<UserId>,

        /// Show only quotas of this training type
        #[arg(short = 't', long)]
        training_type: Option<TrainingType>,
    },

    /// Print quotas as legacy target definitions, in the format `import` reads
    Export {
        /// User whose quotas to export (defaults to the acting user)
        #[arg(long)]
        for_user: Option<UserId>,

        /// Export only quotas of this training type
        #[arg(short = 't', long)]
        training_type: Option<TrainingType>,
    },

    /// Create or change a quota (admin only)
    Set {
        user: UserId,
        training_type: TrainingType,
        source: SourceId,
        limit: u32,
    },

    /// Delete a quota (admin only)
    Remove {
        user: UserId,
        training_type: TrainingType,
        source: SourceId,
    },
}

/// Item subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum ItemCommands {
    /// Add a content item to a source
    Add {
        source: SourceId,

        /// Flag the item invalid; its training records never count
        #[arg(long)]
        invalid: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_requires_command() {
        assert!(Cli::try_parse_from(["rotor"]).is_err());
    }

    #[test]
    fn test_global_flags() {
        let cli = Cli::try_parse_from([
            "rotor", "-v", "-c", "/tmp/rotor.yml", "--db", "/tmp/r.db", "-u", "7", "--role", "admin", "--json",
            "next", "cleaning",
        ])
        .unwrap();
        assert!(cli.is_verbose());
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/rotor.yml")));
        assert_eq!(cli.db, Some(PathBuf::from("/tmp/r.db")));
        assert_eq!(cli.as_user.map(|u| u.get()), Some(7));
        assert_eq!(cli.role, Some(Role::Admin));
        assert!(cli.json);
    }

    #[test]
    fn test_next_command() {
        let cli = Cli::try_parse_from(["rotor", "next", "classifying"]).unwrap();
        match cli.command {
            Commands::Next {
                training_type,
                for_user,
            } => {
                assert_eq!(training_type, TrainingType::Classifying);
                assert!(for_user.is_none());
            }
            _ => panic!("Expected next command"),
        }
    }

    #[test]
    fn test_next_rejects_unknown_type() {
        assert!(Cli::try_parse_from(["rotor", "next", "sorting"]).is_err());
    }

    #[test]
    fn test_progress_for_user() {
        let cli = Cli::try_parse_from(["rotor", "progress", "cleaning", "--for-user", "9"]).unwrap();
        match cli.command {
            Commands::Progress { for_user, .. } => {
                assert_eq!(for_user.map(|u| u.get()), Some(9));
            }
            _ => panic!("Expected progress command"),
        }
    }

    #[test]
    fn test_quota_set() {
        let cli = Cli::try_parse_from(["rotor", "quota", "set", "7", "cleaning", "3", "5"]).unwrap();
        match cli.command {
            Commands::Quota {
                command:
                    QuotaCommands::Set {
                        user,
                        training_type,
                        source,
                        limit,
                    },
            } => {
                assert_eq!(user.get(), 7);
                assert_eq!(training_type, TrainingType::Cleaning);
                assert_eq!(source.get(), 3);
                assert_eq!(limit, 5);
            }
            _ => panic!("Expected quota set command"),
        }
    }

    #[test]
    fn test_quota_set_rejects_zero_source() {
        assert!(Cli::try_parse_from(["rotor", "quota", "set", "7", "cleaning", "0", "5"]).is_err());
    }

    #[test]
    fn test_quota_list_filters() {
        let cli = Cli::try_parse_from(["rotor", "quota", "list", "-t", "classifying"]).unwrap();
        match cli.command {
            Commands::Quota {
                command: QuotaCommands::List {
                    for_user,
                    training_type,
                },
            } => {
                assert!(for_user.is_none());
                assert_eq!(training_type, Some(TrainingType::Classifying));
            }
            _ => panic!("Expected quota list command"),
        }
    }

    #[test]
    fn test_quota_export() {
        let cli = Cli::try_parse_from(["rotor", "quota", "export", "--for-user", "7"]).unwrap();
        match cli.command {
            Commands::Quota {
                command: QuotaCommands::Export {
                    for_user,
                    training_type,
                },
            } => {
                assert_eq!(for_user.map(|u| u.get()), Some(7));
                assert!(training_type.is_none());
            }
            _ => panic!("Expected quota export command"),
        }
    }

    #[test]
    fn test_train_command() {
        let cli = Cli::try_parse_from(["rotor", "train", "12", "--like", "1"]).unwrap();
        match cli.command {
            Commands::Train { item, like, category } => {
                assert_eq!(item, 12);
                assert_eq!(like, Some(1));
                assert!(category.is_none());
            }
            _ => panic!("Expected train command"),
        }
    }

    #[test]
    fn test_item_add_invalid() {
        let cli = Cli::try_parse_from(["rotor", "item", "add", "4", "--invalid"]).unwrap();
        match cli.command {
            Commands::Item {
                command: ItemCommands::Add { source, invalid },
            } => {
                assert_eq!(source.get(), 4);
                assert!(invalid);
            }
            _ => panic!("Expected item add command"),
        }
    }

    #[test]
    fn test_help_works() {
        Cli::command().debug_assert();
    }
}
