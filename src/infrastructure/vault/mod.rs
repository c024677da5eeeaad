//! Vault storage on the local filesystem.

pub mod fs_vault;

pub use fs_vault::FsVault;
