//! `valsync` binary entry point: parse args, wire a `RemoteStore`, dispatch.

use valsync::cli::{self, Commands, ConfigCommand};
use valsync::commands;
use valsync::config::Config;
use valsync::styling::eprintln;
use valsync::transport::UnconfiguredRemote;

fn init_logging(verbose: bool) {
    let mut builder = env_logger::Builder::from_default_env();
    if verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.format_timestamp(None).init();
}

fn run() -> anyhow::Result<()> {
    let matches = cli::build_command().get_matches();
    let cli = <cli::Cli as clap::FromArgMatches>::from_arg_matches(&matches)?;

    init_logging(cli.verbose);

    let config = Config::load_user()?;
    let remote = UnconfiguredRemote;

    match cli.command {
        Commands::Clone { val_uri, dir, branch, no_editor_files } => {
            let _ = no_editor_files;
            commands::clone::run(val_uri, dir, branch, cli.concurrency, &config, &remote)
        }

        Commands::Create {
            name,
            dir,
            private,
            public,
            unlisted,
            if_exists,
            upload_if_exists,
            no_editor_files,
            org_name,
        } => {
            let _ = (if_exists, no_editor_files);
            let privacy = commands::create_remix::privacy_from_flags(private, public, unlisted);
            commands::create_remix::run_create(
                name,
                dir,
                privacy,
                org_name,
                upload_if_exists,
                cli.concurrency,
                &config,
                &remote,
            )
        }

        Commands::Remix { src_uri, new_name, dir, private, public, unlisted, no_editor_files, description } => {
            let _ = no_editor_files;
            let privacy = commands::create_remix::privacy_from_flags(private, public, unlisted);
            commands::create_remix::run_remix(src_uri, new_name, dir, privacy, description, cli.concurrency, &config, &remote)
        }

        Commands::Status => commands::status::run(&config, &remote),

        Commands::Pull { dry_run } => commands::pull::run(dry_run, cli.concurrency, &config, &remote),

        Commands::Push { dry_run } => commands::push::run(dry_run, cli.concurrency, &config, &remote),

        Commands::Checkout { branch, fork, force, dry_run } => {
            commands::checkout::run(branch, fork, force, dry_run, cli.concurrency, &config, &remote)
        }

        Commands::Branch { delete } => commands::branch::run(delete, &remote),

        Commands::Browse { no_browser } => commands::browse::run(no_browser, &remote),

        Commands::Watch { debounce_ms, no_companion, watch_grace_ms } => {
            commands::watch::run(debounce_ms, watch_grace_ms, no_companion, cli.concurrency, &config, &remote)
        }

        Commands::Login { local, global } => commands::login::run_login(local, global),
        Commands::Logout { local, global } => commands::login::run_logout(local, global),

        Commands::Config { action } => match action {
            ConfigCommand::Set { key, value, local } => commands::config::run_set(key, value, local),
            ConfigCommand::Get { key, local } => commands::config::run_get(key, local),
            ConfigCommand::Where { local } => commands::config::run_where(local),
            ConfigCommand::Ignore { local } => commands::config::run_ignore(local),
            ConfigCommand::Options => commands::config::run_options(),
        },
    }
}

fn main() {
    if let Err(e) = run() {
        eprintln!("{e}");
        std::process::exit(1);
    }
}
