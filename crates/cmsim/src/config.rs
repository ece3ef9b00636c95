//! CLI configuration: thin wrapper around `cmsim_config` shared types.
//!
//! Adds resolution that respects `GlobalOpts` flag overrides
//! (--base-url, --timeout, --page-size, --insecure).

use std::time::Duration;

use cmsim_core::{ClientConfig, TlsVerification};

use crate::cli::GlobalOpts;
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use cmsim_config::{
    Config, DEFAULT_BASE_URL, Profile, config_path, load_config, save_config,
};

/// Everything a command needs to talk to one simulator.
#[derive(Debug, Clone)]
pub struct Session {
    pub profile_name: String,
    pub client: ClientConfig,
    pub page_size: u32,
}

/// Load the config file, falling back to defaults when it is unreadable.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "ignoring unreadable config file");
        Config::default()
    })
}

/// Resolve the session from the on-disk config and global flags.
pub fn resolve_session(global: &GlobalOpts) -> Result<Session, CliError> {
    resolve_session_with(&load_config_or_default(), global)
}

/// Flags win over the profile, the profile wins over `[defaults]`.
///
/// A missing profile is only an error when it was asked for by name and no
/// `--base-url` was given; otherwise the local default simulator is used.
pub fn resolve_session_with(cfg: &Config, global: &GlobalOpts) -> Result<Session, CliError> {
    let profile_name = cfg.active_profile_name(global.profile.as_deref());
    let profile = cfg.profile(&profile_name);

    if profile.is_none() && global.profile.is_some() && global.base_url.is_none() {
        let mut names: Vec<_> = cfg.profiles.keys().cloned().collect();
        names.sort();
        return Err(CliError::ProfileNotFound {
            name: profile_name,
            available: if names.is_empty() {
                "(none)".into()
            } else {
                names.join(", ")
            },
        });
    }

    // 1. Base URL (flag > env > profile > built-in)
    let base_url = global
        .base_url
        .clone()
        .or_else(|| profile.map(|p| p.base_url.clone()))
        .unwrap_or_else(|| DEFAULT_BASE_URL.into());
    let effective = Profile {
        base_url,
        ..profile.cloned().unwrap_or_else(|| Profile::new(""))
    };

    let mut client = cmsim_config::profile_to_client_config(&effective, &cfg.defaults)?;

    // 2. TLS and timeout overrides
    if global.insecure {
        client.tls = TlsVerification::DangerAcceptInvalid;
    }
    if let Some(secs) = global.timeout {
        client.timeout = Duration::from_secs(secs);
    }

    // 3. Page size
    let page_size = match global.page_size {
        Some(size) => cmsim_config::validate_page_size(size)?,
        None => cmsim_config::profile_page_size(profile, &cfg.defaults)?,
    };

    Ok(Session {
        profile_name,
        client,
        page_size,
    })
}
