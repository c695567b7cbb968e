// ─── RepoRocket Core ───
// Launcher backend for software published on code-hosting platforms.
//
// Architecture:
//   core/
//     sources/    GitHub, GitLab, Internet Archive search + releases
//     downloader/ Streaming fetch with progress
//     package/    Install (extract + unwrap), locate executables, manage library
//     tasks       One in-flight download/install per package
//     theme/      theme.yaml -> stylesheet, font loading
//     plugins/    Plugin discovery + init
//     artwork     SteamGridDB cover art
//     saves       Cloud save mirroring
//     state/      Persisted config, settings, error log

pub mod artwork;
pub mod downloader;
pub mod error;
pub mod http;
pub mod package;
pub mod paths;
pub mod plugins;
pub mod saves;
pub mod sources;
pub mod state;
pub mod tasks;
pub mod theme;
