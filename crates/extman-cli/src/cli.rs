//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use extman_core::{EnablementScope, SettingScope};

/// Extension Manager - Install and manage assistant extensions
#[derive(Parser, Debug)]
#[command(name = "extman")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Home directory holding `.extman/` state
    #[arg(long, global = true, env = "EXTMAN_HOME")]
    pub home: Option<PathBuf>,

    /// Workspace directory (defaults to the current directory)
    #[arg(long, global = true)]
    pub workspace: Option<PathBuf>,

    /// Approve consent and trust prompts without asking
    #[arg(long, global = true)]
    pub consent: bool,

    /// The command to run
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Install an extension from a local path or git URL
    ///
    /// Examples:
    ///   extman install ./my-extension
    ///   extman install https://github.com/acme/tools --ref v1.2.0
    ///   extman install https://github.com/acme/tools --auto-update
    Install {
        /// Local directory or git repository URL
        source: String,

        /// Git ref or release tag to install
        #[arg(long = "ref")]
        reference: Option<String>,

        /// Keep this extension current with `extman update --all`
        #[arg(long)]
        auto_update: bool,

        /// Consider pre-releases when picking a GitHub release
        #[arg(long)]
        pre_release: bool,
    },

    /// Install a local extension in place, without copying its files
    Link {
        /// Local extension directory
        path: PathBuf,
    },

    /// Uninstall an extension by name or install source
    Uninstall {
        /// Extension name or the source it was installed from
        name: String,
    },

    /// Update an extension from its recorded source
    Update {
        /// Extension to update
        #[arg(required_unless_present = "all", conflicts_with = "all")]
        name: Option<String>,

        /// Update every extension installed with --auto-update
        #[arg(long)]
        all: bool,
    },

    /// Enable an extension
    Enable {
        name: String,

        #[arg(long, value_enum, default_value_t = ScopeArg::User)]
        scope: ScopeArg,
    },

    /// Disable an extension
    Disable {
        name: String,

        #[arg(long, value_enum, default_value_t = ScopeArg::User)]
        scope: ScopeArg,
    },

    /// List installed extensions
    List {
        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Check an extension directory without installing it
    Validate {
        /// Extension directory containing gemini-extension.json
        path: PathBuf,
    },

    /// Manage extension settings
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },
}

/// Settings subcommands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum SettingsAction {
    /// Set a declared setting
    Set {
        /// Extension name
        name: String,

        /// Environment variable (or setting name) to set
        setting: String,

        value: String,

        #[arg(long, value_enum, default_value_t = ScopeArg::User)]
        scope: ScopeArg,
    },

    /// Show declared settings and where their values come from
    List {
        /// Extension name
        name: String,
    },
}

/// Persisted scopes selectable from the command line.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeArg {
    User,
    Workspace,
}

impl From<ScopeArg> for EnablementScope {
    fn from(scope: ScopeArg) -> Self {
        match scope {
            ScopeArg::User => EnablementScope::User,
            ScopeArg::Workspace => EnablementScope::Workspace,
        }
    }
}

impl From<ScopeArg> for SettingScope {
    fn from(scope: ScopeArg) -> Self {
        match scope {
            ScopeArg::User => SettingScope::User,
            ScopeArg::Workspace => SettingScope::Workspace,
        }
    }
}
