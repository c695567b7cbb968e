pub mod client;

pub use client::{ArchiveFetcher, FetchProgress, RemoteAsset, CHUNK_SIZE};
