//! Command-line front end over [`crate::commands`].

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tokio::sync::mpsc;

use crate::commands::{self, SharedState};
use crate::core::error::{LauncherError, LauncherResult};
use crate::core::plugins::PluginRegistry;
use crate::core::sources::{RepoSourceKind, RepoSummary};
use crate::core::state::WindowMode;
use crate::core::tasks::InstallEvent;

/// RepoRocket - launch games and apps released on GitHub, GitLab and the Internet Archive
#[derive(Parser, Debug)]
#[command(name = "reporocket")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Working root holding applications/, saves/, themes/ and plugins/
    #[arg(long, env = "REPOROCKET_ROOT", default_value = ".", global = true)]
    pub root: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Search the selected (or given) platform
    Search(SearchArgs),

    /// List releases of a search result
    Releases(ReleasesArgs),

    /// Download and install a release asset
    Install(InstallArgs),

    /// List installed packages
    Library,

    /// List executable candidates inside a package
    Locate { name: String },

    /// Choose the executable started by `launch`
    SetExecutable { name: String, path: PathBuf },

    /// Start a package's executable
    Launch { name: String },

    /// Remove a package, its config entry and its artwork
    Delete { name: String },

    /// Set (with --location) or re-sync a package's cloud save folder
    CloudSave {
        name: String,
        #[arg(long)]
        location: Option<PathBuf>,
    },

    /// Theme management
    #[command(subcommand)]
    Theme(ThemeCommands),

    /// Show or change settings
    Settings(SettingsArgs),

    /// SteamGridDB cover art
    #[command(subcommand)]
    Artwork(ArtworkCommands),

    /// Write a sample entry to the error log
    TestError,
}

#[derive(Args, Debug)]
pub struct SearchArgs {
    pub query: String,

    /// github, gitlab or internet-archive; defaults to the saved setting
    #[arg(long)]
    pub source: Option<RepoSourceKind>,
}

#[derive(Args, Debug)]
pub struct ReleasesArgs {
    /// `owner/name` on GitHub, project id on GitLab, identifier on the Internet Archive
    pub id: String,

    #[arg(long)]
    pub source: Option<RepoSourceKind>,
}

#[derive(Args, Debug)]
pub struct InstallArgs {
    pub url: String,

    /// Library name; defaults to the file name without extension
    #[arg(long)]
    pub name: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum ThemeCommands {
    /// List available themes
    List,
    /// Apply a theme and remember it
    Apply { name: String },
    /// Import a .rrct theme bundle
    Import { bundle: PathBuf },
}

#[derive(Args, Debug)]
pub struct SettingsArgs {
    #[arg(long)]
    pub fullscreen: Option<bool>,

    #[arg(long)]
    pub source: Option<RepoSourceKind>,
}

#[derive(Subcommand, Debug)]
pub enum ArtworkCommands {
    /// Search games by name
    Search {
        term: String,
        #[arg(long, env = "STEAMGRIDDB_API_KEY", hide_env_values = true)]
        api_key: String,
    },
    /// Landscape grids of a game, 12 per page
    Grids {
        game_id: u64,
        #[arg(long, default_value_t = 0)]
        page: usize,
        #[arg(long, env = "STEAMGRIDDB_API_KEY", hide_env_values = true)]
        api_key: String,
    },
    /// Download an image as a package's artwork
    Apply {
        name: String,
        url: String,
        #[arg(long, env = "STEAMGRIDDB_API_KEY", hide_env_values = true)]
        api_key: String,
    },
}

fn print_json<T: Serialize>(value: &T) -> LauncherResult<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Turn a bare id into the summary the release listing needs.
fn summary_from_id(id: &str) -> RepoSummary {
    let (owner, name) = id.split_once('/').unwrap_or(("", id));
    RepoSummary {
        id: id.to_string(),
        name: name.to_string(),
        owner: owner.to_string(),
        description: None,
    }
}

/// The stock binary registers no plugin modules, so every plugin folder is
/// reported as skipped; embedders pass their own registry to
/// [`commands::startup`].
pub async fn execute(cli: Cli) -> LauncherResult<()> {
    let state = commands::startup(cli.root, PluginRegistry::new()).await?;

    match cli.command {
        Commands::Search(args) => {
            print_json(&commands::search(&state, args.source, &args.query).await?)
        }
        Commands::Releases(args) => {
            let repo = summary_from_id(&args.id);
            print_json(&commands::list_releases(&state, args.source, &repo).await?)
        }
        Commands::Install(args) => install(&state, args).await,
        Commands::Library => print_json(&commands::list_library(&state).await?),
        Commands::Locate { name } => {
            print_json(&commands::locate_executables(&state, &name).await?)
        }
        Commands::SetExecutable { name, path } => {
            commands::set_executable(&state, &name, path).await
        }
        Commands::Launch { name } => {
            let pid = commands::launch_app(&state, &name).await?;
            println!("{name} started (pid {pid})");
            Ok(())
        }
        Commands::Delete { name } => commands::delete_app(&state, &name).await,
        Commands::CloudSave { name, location } => match location {
            Some(location) => commands::set_cloud_save_location(&state, &name, location).await,
            None => commands::sync_cloud_save(&state, &name).await,
        },
        Commands::Theme(ThemeCommands::List) => {
            print_json(&commands::list_themes(&state).await?)
        }
        Commands::Theme(ThemeCommands::Apply { name }) => {
            let stylesheet = commands::change_theme(&state, &name).await?;
            print!("{}", stylesheet.to_css());
            Ok(())
        }
        Commands::Theme(ThemeCommands::Import { bundle }) => {
            let name = commands::import_theme(&state, bundle).await?;
            println!("Imported theme {name}");
            Ok(())
        }
        Commands::Settings(args) => {
            if let Some(fullscreen) = args.fullscreen {
                let mode = if fullscreen {
                    WindowMode::Fullscreen
                } else {
                    WindowMode::Windowed
                };
                commands::set_fullscreen(&state, mode).await?;
            }
            if let Some(source) = args.source {
                commands::set_repo_source(&state, source).await?;
            }
            print_json(&commands::settings(&state).await)
        }
        Commands::Artwork(ArtworkCommands::Search { term, api_key }) => {
            print_json(&commands::search_artwork(&state, &api_key, &term).await?)
        }
        Commands::Artwork(ArtworkCommands::Grids {
            game_id,
            page,
            api_key,
        }) => print_json(&commands::artwork_grids(&state, &api_key, game_id, page).await?),
        Commands::Artwork(ArtworkCommands::Apply { name, url, api_key }) => {
            let path = commands::apply_artwork(&state, &api_key, &name, &url).await?;
            println!("Artwork saved to {}", path.display());
            Ok(())
        }
        Commands::TestError => {
            commands::record_test_error(&state).await;
            Ok(())
        }
    }
}

async fn install(state: &SharedState, args: InstallArgs) -> LauncherResult<()> {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let progress = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            match event {
                InstallEvent::Downloading(p) if p.is_indeterminate() => {
                    eprint!("\rDownloading... {} bytes", p.bytes_written)
                }
                InstallEvent::Downloading(p) => eprint!(
                    "\rDownloading... {}%",
                    p.bytes_written.saturating_mul(100) / p.total_bytes
                ),
                InstallEvent::Extracting(p) => eprint!("\rExtracting {}/{}", p.index, p.total),
            }
        }
        eprintln!();
    });

    let outcome = commands::download_and_install(state, &args.url, args.name, tx).await;
    progress
        .await
        .map_err(|e| LauncherError::Other(format!("Progress reporter failed: {e}")))?;
    print_json(&outcome?)
}
