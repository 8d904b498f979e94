mod config;
mod i18n;
mod view;

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use client_core::{ClientEvent, DownloadOutcome, PanelApi, PanelClient};
use shared::domain::{DownloadState, PackUuid, PermissionLevel, QuickCommandId, Xuid};
use shared::protocol::QuickCommand;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt;
use tracing_subscriber::EnvFilter;

use crate::config::Settings;
use crate::i18n::{Catalog, Lang};

#[derive(Parser, Debug)]
#[command(
    name = "panel",
    about = "Admin panel client for a Bedrock dedicated server",
    version
)]
struct Cli {
    /// Path to the panel config file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Backend base URL, overriding the config file.
    #[arg(long, global = true)]
    server_url: Option<String>,
    /// Display language (en or zh), overriding the config file.
    #[arg(long, global = true)]
    lang: Option<Lang>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show server status.
    Status,
    /// Start the server.
    Start,
    /// Stop the server.
    Stop,
    /// Restart the server.
    Restart,
    /// Log in and persist the issued token.
    Login {
        #[arg(long)]
        password: Option<String>,
    },
    /// Change the panel password.
    ChangePassword {
        #[arg(long)]
        current: String,
        #[arg(long)]
        new: String,
    },
    /// Persist the display language.
    Lang { language: Lang },
    /// Server configuration.
    #[command(subcommand)]
    Config(ConfigCommand),
    /// Allowlist management.
    #[command(subcommand)]
    Allowlist(AllowlistCommand),
    /// Player permission management.
    #[command(subcommand)]
    Perm(PermCommand),
    /// World management.
    #[command(subcommand)]
    World(WorldCommand),
    /// Resource pack management.
    #[command(subcommand)]
    Pack(PackCommand),
    /// Server version management.
    #[command(subcommand)]
    Version(VersionCommand),
    /// Server logs.
    #[command(subcommand)]
    Logs(LogsCommand),
    /// Server console commands.
    #[command(subcommand)]
    Cmd(CmdCommand),
    /// Quick commands.
    #[command(subcommand)]
    Quick(QuickCmd),
    /// System and Bedrock process performance snapshot.
    Monitor,
    /// Interactive console with a live log tail.
    Console,
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Print the server configuration.
    Show,
    /// Update server configuration fields.
    Set(SetConfigArgs),
}

#[derive(Args, Debug)]
struct SetConfigArgs {
    #[arg(long)]
    server_name: Option<String>,
    #[arg(long)]
    gamemode: Option<String>,
    #[arg(long)]
    difficulty: Option<String>,
    #[arg(long)]
    max_players: Option<u32>,
    #[arg(long)]
    server_port: Option<u16>,
    #[arg(long)]
    allow_cheats: Option<bool>,
    #[arg(long)]
    allow_list: Option<bool>,
}

#[derive(Subcommand, Debug)]
enum AllowlistCommand {
    List,
    Add {
        name: String,
        #[arg(long)]
        ignores_player_limit: bool,
    },
    Remove {
        name: String,
    },
}

#[derive(Subcommand, Debug)]
enum PermCommand {
    List,
    /// Set a player's permission level by name.
    Set {
        name: String,
        level: PermissionLevel,
    },
    /// Remove a permission entry by XUID.
    Remove {
        xuid: String,
    },
}

#[derive(Subcommand, Debug)]
enum WorldCommand {
    List,
    /// Upload a .zip or .mcworld archive.
    Upload {
        path: PathBuf,
    },
    Delete {
        name: String,
        /// Skip the confirmation prompt.
        #[arg(long)]
        yes: bool,
    },
    Activate {
        name: String,
    },
}

#[derive(Subcommand, Debug)]
enum PackCommand {
    List,
    /// Upload a .zip or .mcpack archive.
    Upload {
        path: PathBuf,
    },
    Activate {
        uuid: PackUuid,
    },
    Deactivate {
        uuid: PackUuid,
    },
    Delete {
        uuid: PackUuid,
    },
}

#[derive(Subcommand, Debug)]
enum VersionCommand {
    List,
    Download {
        version: String,
        /// Poll progress until the download settles, then list versions.
        #[arg(long)]
        watch: bool,
    },
    Progress {
        version: String,
    },
    Activate {
        version: String,
    },
    /// Refresh the version catalog from upstream.
    Refresh,
}

#[derive(Subcommand, Debug)]
enum LogsCommand {
    Show {
        #[arg(long, default_value_t = 100)]
        limit: usize,
    },
    Clear,
    /// Stream logs live until interrupted.
    Tail,
}

#[derive(Subcommand, Debug)]
enum CmdCommand {
    /// Whether the backend supports console interaction.
    Status,
    /// Send a command to the server console.
    Exec {
        #[arg(required = true, num_args = 1..)]
        command: Vec<String>,
    },
    History {
        #[arg(long, default_value_t = 50)]
        limit: usize,
    },
    ClearHistory,
}

#[derive(Subcommand, Debug)]
enum QuickCmd {
    List {
        #[arg(long)]
        category: Option<String>,
        /// Client-side substring filter.
        #[arg(long)]
        filter: Option<String>,
    },
    Categories,
    Exec {
        id: String,
    },
    Add {
        #[arg(long)]
        id: String,
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long)]
        command: String,
        #[arg(long)]
        category: String,
    },
    Remove {
        id: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config_path = config::config_path(cli.config.as_deref());
    let mut settings = config::load_settings(&config_path);
    if let Some(server_url) = cli.server_url {
        settings.server_url = server_url;
    }
    if let Some(lang) = cli.lang {
        settings.language = lang;
    }
    let catalog = Catalog::new(settings.language);

    match run(cli.command, settings, &config_path, catalog).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!(
                "{}",
                view::toast_err(&format!("{}: {err:#}", catalog.t("message.request-failed")))
            );
            ExitCode::FAILURE
        }
    }
}

async fn run(
    command: Command,
    mut settings: Settings,
    config_path: &Path,
    catalog: Catalog,
) -> Result<()> {
    let client = PanelClient::new(&settings.server_url, settings.token.clone())
        .context("invalid server url")?;
    let api: &dyn PanelApi = client.as_ref();

    let lines = match command {
        Command::Status => vec![view::render_status(&api.server_status().await?, &catalog)],
        Command::Start => vec![view::toast_ok(&api.start_server().await?)],
        Command::Stop => vec![view::toast_ok(&api.stop_server().await?)],
        Command::Restart => vec![view::toast_ok(&api.restart_server().await?)],
        Command::Login { password } => {
            let password = match password {
                Some(password) => password,
                None => prompt_line(&catalog.t("login.prompt")).await?,
            };
            let response = api.login(&password).await?;
            settings.token = client.token().await;
            config::save_settings(config_path, &settings)?;
            vec![view::toast_ok(&response.message)]
        }
        Command::ChangePassword { current, new } => {
            let response = api.change_password(&current, &new).await?;
            if response.success {
                vec![view::toast_ok(&response.message)]
            } else {
                vec![view::toast_err(&response.message)]
            }
        }
        Command::Lang { language } => {
            settings.language = language;
            config::save_settings(config_path, &settings)?;
            let catalog = Catalog::new(language);
            vec![view::toast_ok(&catalog.t("language.saved"))]
        }
        Command::Config(ConfigCommand::Show) => view::render_config(&api.config().await?),
        Command::Config(ConfigCommand::Set(args)) => {
            let mut config = api.config().await?;
            if let Some(v) = args.server_name {
                config.server_name = v;
            }
            if let Some(v) = args.gamemode {
                config.gamemode = v;
            }
            if let Some(v) = args.difficulty {
                config.difficulty = v;
            }
            if let Some(v) = args.max_players {
                config.max_players = v;
            }
            if let Some(v) = args.server_port {
                config.server_port = v;
            }
            if let Some(v) = args.allow_cheats {
                config.allow_cheats = v;
            }
            if let Some(v) = args.allow_list {
                config.allow_list = v;
            }
            vec![view::toast_ok(&api.update_config(&config).await?)]
        }
        Command::Allowlist(AllowlistCommand::List) => {
            view::render_allowlist(&api.allowlist().await?, &catalog)
        }
        Command::Allowlist(AllowlistCommand::Add {
            name,
            ignores_player_limit,
        }) => {
            if name.trim().is_empty() {
                vec![view::toast_err(&catalog.t("allowlist.error.empty-name"))]
            } else {
                vec![view::toast_ok(
                    &api.add_to_allowlist(&name, ignores_player_limit).await?,
                )]
            }
        }
        Command::Allowlist(AllowlistCommand::Remove { name }) => {
            vec![view::toast_ok(&api.remove_from_allowlist(&name).await?)]
        }
        Command::Perm(PermCommand::List) => {
            view::render_permissions(&api.permissions().await?, &catalog)
        }
        Command::Perm(PermCommand::Set { name, level }) => {
            if name.trim().is_empty() {
                vec![view::toast_err(&catalog.t("permission.error.empty-name"))]
            } else {
                vec![view::toast_ok(&api.set_permission(&name, level).await?)]
            }
        }
        Command::Perm(PermCommand::Remove { xuid }) => {
            vec![view::toast_ok(
                &api.remove_permission(&Xuid(xuid)).await?,
            )]
        }
        Command::World(WorldCommand::List) => view::render_worlds(&api.worlds().await?, &catalog),
        Command::World(WorldCommand::Upload { path }) => {
            vec![view::toast_ok(&api.upload_world(&path).await?)]
        }
        Command::World(WorldCommand::Delete { name, yes }) => {
            let prompt = catalog.t_with("world.delete-confirm", &[("worldName", &name)]);
            if yes || confirm(&prompt).await? {
                vec![view::toast_ok(&api.delete_world(&name).await?)]
            } else {
                vec![view::toast_err(&catalog.t("world.delete-aborted"))]
            }
        }
        Command::World(WorldCommand::Activate { name }) => {
            vec![view::toast_ok(&api.activate_world(&name).await?)]
        }
        Command::Pack(PackCommand::List) => {
            view::render_resource_packs(&api.resource_packs().await?, &catalog)
        }
        Command::Pack(PackCommand::Upload { path }) => {
            let response = api.upload_resource_pack(&path).await?;
            vec![
                view::toast_ok(&response.message),
                view::render_resource_packs(std::slice::from_ref(&response.resource_pack), &catalog)
                    .remove(0),
            ]
        }
        Command::Pack(PackCommand::Activate { uuid }) => {
            vec![view::toast_ok(&api.activate_resource_pack(&uuid).await?)]
        }
        Command::Pack(PackCommand::Deactivate { uuid }) => {
            vec![view::toast_ok(&api.deactivate_resource_pack(&uuid).await?)]
        }
        Command::Pack(PackCommand::Delete { uuid }) => {
            vec![view::toast_ok(&api.delete_resource_pack(&uuid).await?)]
        }
        Command::Version(VersionCommand::List) => {
            view::render_versions(&api.server_versions().await?, &catalog)
        }
        Command::Version(VersionCommand::Download { version, watch }) => {
            if watch {
                run_watched_download(&client, &version, catalog).await?;
                Vec::new()
            } else {
                vec![view::toast_ok(&api.download_version(&version).await?)]
            }
        }
        Command::Version(VersionCommand::Progress { version }) => {
            vec![view::render_progress(&api.download_progress(&version).await?)]
        }
        Command::Version(VersionCommand::Activate { version }) => {
            vec![view::toast_ok(&api.activate_version(&version).await?)]
        }
        Command::Version(VersionCommand::Refresh) => {
            view::render_versions(&api.refresh_version_catalog().await?, &catalog)
        }
        Command::Logs(LogsCommand::Show { limit }) => {
            view::render_logs(&api.logs(limit).await?, &catalog)
        }
        Command::Logs(LogsCommand::Clear) => vec![view::toast_ok(&api.clear_logs().await?)],
        Command::Logs(LogsCommand::Tail) => {
            run_tail(&client, catalog).await?;
            Vec::new()
        }
        Command::Cmd(CmdCommand::Status) => {
            let status = api.interaction_status().await?;
            vec![format!("enabled: {} ({})", status.enabled, status.platform)]
        }
        Command::Cmd(CmdCommand::Exec { command }) => {
            let command = command.join(" ");
            let response = api.send_command(&command).await?;
            vec![view::toast_ok(&response.message)]
        }
        Command::Cmd(CmdCommand::History { limit }) => {
            view::render_history(&api.command_history(limit).await?, &catalog)
        }
        Command::Cmd(CmdCommand::ClearHistory) => {
            vec![view::toast_ok(&api.clear_command_history().await?)]
        }
        Command::Quick(QuickCmd::List { category, filter }) => {
            let commands = api.quick_commands(category.as_deref()).await?;
            match filter {
                Some(filter) => {
                    let matched: Vec<QuickCommand> = view::filter_quick_commands(&commands, &filter)
                        .into_iter()
                        .cloned()
                        .collect();
                    view::render_quick_commands(&matched, &catalog)
                }
                None => view::render_quick_commands(&commands, &catalog),
            }
        }
        Command::Quick(QuickCmd::Categories) => {
            view::render_categories(&api.command_categories().await?, &catalog)
        }
        Command::Quick(QuickCmd::Exec { id }) => {
            let response = api.execute_quick_command(&QuickCommandId(id)).await?;
            vec![view::toast_ok(&format!(
                "{} ({})",
                response.message, response.command
            ))]
        }
        Command::Quick(QuickCmd::Add {
            id,
            name,
            description,
            command,
            category,
        }) => {
            let quick = QuickCommand {
                id: QuickCommandId(id),
                name,
                description,
                command,
                category,
            };
            vec![view::toast_ok(&api.add_quick_command(&quick).await?)]
        }
        Command::Quick(QuickCmd::Remove { id }) => {
            vec![view::toast_ok(
                &api.remove_quick_command(&QuickCommandId(id)).await?,
            )]
        }
        Command::Monitor => view::render_performance(&api.performance().await?, &catalog),
        Command::Console => {
            run_console(&client, catalog).await?;
            Vec::new()
        }
    };

    for line in lines {
        println!("{line}");
    }
    Ok(())
}

async fn prompt_line(prompt: &str) -> Result<String> {
    eprint!("{prompt}");
    let mut line = String::new();
    BufReader::new(tokio::io::stdin())
        .read_line(&mut line)
        .await
        .context("failed to read stdin")?;
    Ok(line.trim().to_string())
}

async fn confirm(prompt: &str) -> Result<bool> {
    let answer = prompt_line(prompt).await?.to_lowercase();
    Ok(answer == "y" || answer == "yes")
}

fn print_stream_event(event: &ClientEvent, catalog: &Catalog) {
    match event {
        ClientEvent::Log(entry) => println!("{}", view::log_line(entry)),
        ClientEvent::LogStreamConnected => {
            eprintln!("{}", view::toast_ok(&catalog.t("logs.stream.connected")));
        }
        ClientEvent::LogStreamDisconnected { reason } => {
            eprintln!(
                "{}",
                view::toast_err(
                    &catalog.t_with("logs.stream.disconnected", &[("reason", reason.as_str())])
                )
            );
        }
        _ => {}
    }
}

/// Streams log entries until interrupted.
async fn run_tail(client: &Arc<PanelClient>, catalog: Catalog) -> Result<()> {
    let mut events = BroadcastStream::new(client.subscribe_events());
    let _log_stream = client.spawn_log_stream().await?;
    while let Some(event) = events.next().await {
        match event {
            Ok(event) => print_stream_event(&event, &catalog),
            Err(BroadcastStreamRecvError::Lagged(_)) => continue,
        }
    }
    Ok(())
}

/// Interactive console: live log tail in the background, stdin lines go to
/// the server as console commands.
async fn run_console(client: &Arc<PanelClient>, catalog: Catalog) -> Result<()> {
    let _log_stream = client.spawn_log_stream().await?;
    let mut events = client.subscribe_events();
    let printer = tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => print_stream_event(&event, &catalog),
                Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    });

    eprintln!("{}", catalog.t("console.hint"));
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let command = line.trim();
        if command.is_empty() {
            continue;
        }
        if command == "exit" || command == "quit" {
            break;
        }
        match client.send_command(command).await {
            Ok(response) => println!("{}", view::toast_ok(&response.message)),
            Err(err) => println!(
                "{}",
                view::toast_err(&format!("{}: {err}", catalog.t("message.request-failed")))
            ),
        }
    }

    printer.abort();
    Ok(())
}

/// Triggers the download, prints progress samples until it settles, then
/// lists the refreshed versions.
async fn run_watched_download(
    client: &Arc<PanelClient>,
    version: &str,
    catalog: Catalog,
) -> Result<()> {
    let message = client.download_version(version).await?;
    println!("{}", view::toast_ok(&message));

    let mut events = client.subscribe_events();
    let printer = tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(ClientEvent::Download(progress)) => {
                    println!("{}", view::render_progress(&progress));
                }
                Ok(_) => {}
                Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    });

    let outcome = client.watch_download(version).await;
    printer.abort();
    match outcome {
        DownloadOutcome::Settled(progress) => {
            if progress.status == DownloadState::Error {
                println!("{}", view::toast_err(&progress.message));
            } else {
                println!("{}", view::toast_ok(&progress.message));
            }
        }
        DownloadOutcome::AssumedComplete { .. } => {
            println!("{}", view::toast_ok(&catalog.t("version.assumed-complete")));
        }
    }

    for line in view::render_versions(&client.server_versions().await?, &catalog) {
        println!("{line}");
    }
    Ok(())
}
