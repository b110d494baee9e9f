//! Argument parsing for the `valsync` binary (§6.3). Kept deliberately thin:
//! this module only decides what was asked for, `commands::*` decide what to
//! do about it.

use std::path::PathBuf;

use clap::builder::styling::{AnsiColor, Color, Styles};
use clap::{Command, Parser, Subcommand};

fn help_styles() -> Styles {
    Styles::styled()
        .header(
            anstyle::Style::new()
                .bold()
                .fg_color(Some(Color::Ansi(AnsiColor::Green))),
        )
        .usage(
            anstyle::Style::new()
                .bold()
                .fg_color(Some(Color::Ansi(AnsiColor::Green))),
        )
        .literal(
            anstyle::Style::new()
                .bold()
                .fg_color(Some(Color::Ansi(AnsiColor::Cyan))),
        )
        .placeholder(anstyle::Style::new().fg_color(Some(Color::Ansi(AnsiColor::Cyan))))
        .error(
            anstyle::Style::new()
                .bold()
                .fg_color(Some(Color::Ansi(AnsiColor::Red))),
        )
}

const HELP_TEMPLATE: &str = "\
{before-help}{name} - {about-with-newline}
Usage: {usage}

{all-args}{after-help}";

pub fn build_command() -> Command {
    apply_help_template_recursive(Cli::command())
}

fn apply_help_template_recursive(mut cmd: Command) -> Command {
    cmd = cmd.help_template(HELP_TEMPLATE);
    for sub in cmd.get_subcommands_mut() {
        let taken = std::mem::take(sub);
        *sub = apply_help_template_recursive(taken);
    }
    cmd
}

use clap::CommandFactory;

#[derive(Clone, Copy, Debug, clap::ValueEnum, Default, PartialEq, Eq)]
pub enum PrivacyArg {
    #[default]
    Private,
    Public,
    Unlisted,
}

impl From<PrivacyArg> for crate::types::Privacy {
    fn from(value: PrivacyArg) -> Self {
        match value {
            PrivacyArg::Private => crate::types::Privacy::Private,
            PrivacyArg::Public => crate::types::Privacy::Public,
            PrivacyArg::Unlisted => crate::types::Privacy::Unlisted,
        }
    }
}

#[derive(Clone, Copy, Debug, clap::ValueEnum, Default, PartialEq, Eq)]
pub enum IfExists {
    Fail,
    #[default]
    Continue,
}

#[derive(Parser)]
#[command(name = "valsync")]
#[command(about = "Mirror a local directory to a remote val", long_about = None)]
#[command(version)]
#[command(styles = help_styles())]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Show debug logging (or set RUST_LOG)
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Bounded concurrency for remote I/O during clone/pull/push.
    #[arg(long, global = true, value_name = "n")]
    pub concurrency: Option<usize>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Clone a val into a local working copy.
    Clone {
        val_uri: String,
        dir: Option<PathBuf>,
        branch: Option<String>,
        #[arg(long)]
        no_editor_files: bool,
    },

    /// Create a new val from a directory.
    Create {
        name: String,
        dir: Option<PathBuf>,
        #[arg(long, conflicts_with_all = ["public", "unlisted"])]
        private: bool,
        #[arg(long, conflicts_with_all = ["private", "unlisted"])]
        public: bool,
        #[arg(long, conflicts_with_all = ["private", "public"])]
        unlisted: bool,
        #[arg(long, value_enum, default_value = "continue")]
        if_exists: IfExists,
        #[arg(long)]
        upload_if_exists: bool,
        #[arg(long)]
        no_editor_files: bool,
        #[arg(long, value_name = "handle")]
        org_name: Option<String>,
    },

    /// Clone another val, then create a new val from the result.
    Remix {
        src_uri: String,
        new_name: Option<String>,
        dir: Option<PathBuf>,
        #[arg(long, conflicts_with_all = ["public", "unlisted"])]
        private: bool,
        #[arg(long, conflicts_with_all = ["private", "unlisted"])]
        public: bool,
        #[arg(long, conflicts_with_all = ["private", "public"])]
        unlisted: bool,
        #[arg(long)]
        no_editor_files: bool,
        #[arg(short = 'd', long = "description")]
        description: Option<String>,
    },

    /// Show the working copy's current branch and pending changes.
    Status,

    /// Fetch and apply remote changes.
    Pull {
        #[arg(long)]
        dry_run: bool,
    },

    /// Apply local changes to the remote.
    Push {
        #[arg(long)]
        dry_run: bool,
    },

    /// Switch the working copy to another branch, or fork a new one.
    Checkout {
        branch: String,
        /// Fork a new branch named `branch` from the current one.
        #[arg(short = 'b')]
        fork: bool,
        /// Bypass the dirty-working-copy gate.
        #[arg(short = 'f', long)]
        force: bool,
        #[arg(long)]
        dry_run: bool,
    },

    /// List or delete remote branches.
    Branch {
        /// Delete the named branch (cannot be the checked-out branch).
        #[arg(short = 'D', value_name = "name")]
        delete: Option<String>,
    },

    /// Open (or print) the current branch's URL.
    Browse {
        #[arg(long)]
        no_browser: bool,
    },

    /// Watch the working copy and push on change.
    Watch {
        #[arg(short = 'd', long = "debounce-ms", value_name = "ms")]
        debounce_ms: Option<u64>,
        #[arg(long)]
        no_companion: bool,
        #[arg(long, value_name = "ms")]
        watch_grace_ms: Option<u64>,
    },

    /// Store credentials.
    Login {
        #[arg(long, conflicts_with = "global")]
        local: bool,
        #[arg(long, conflicts_with = "local")]
        global: bool,
    },

    /// Remove stored credentials.
    Logout {
        #[arg(long, conflicts_with = "global")]
        local: bool,
        #[arg(long, conflicts_with = "local")]
        global: bool,
    },

    /// Inspect or edit configuration.
    Config {
        #[command(subcommand)]
        action: ConfigCommand,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Set a configuration key.
    Set {
        key: String,
        value: String,
        #[arg(long)]
        local: bool,
    },
    /// Print a configuration key's value.
    Get {
        key: String,
        #[arg(long)]
        local: bool,
    },
    /// Print the path of the configuration file in effect.
    Where {
        #[arg(long)]
        local: bool,
    },
    /// Open the ignore file in `$EDITOR`.
    Ignore {
        #[arg(long)]
        local: bool,
    },
    /// List recognized configuration keys.
    Options,
}
