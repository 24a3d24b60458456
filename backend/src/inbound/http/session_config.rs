//! Session configuration validation.
//!
//! Turns the session toggles from [`crate::settings::AppSettings`] into a
//! cookie signing key and cookie attributes, refusing unsafe combinations in
//! release builds.

use actix_web::cookie::{Key, SameSite};
use std::path::{Path, PathBuf};
use tracing::warn;
use zeroize::Zeroize;

const SESSION_KEY_MIN_LEN: usize = 64;

/// Build mode for session configuration validation.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BuildMode {
    /// Debug builds tolerate a missing key file and use `SameSite=Lax`.
    Debug,
    /// Release builds require a long enough key and use `SameSite=Strict`.
    Release,
}

impl BuildMode {
    /// Determine the build mode from `cfg!(debug_assertions)`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use roadside::inbound::http::session_config::BuildMode;
    ///
    /// let mode = BuildMode::from_debug_assertions();
    /// if cfg!(debug_assertions) {
    ///     assert_eq!(mode, BuildMode::Debug);
    /// } else {
    ///     assert_eq!(mode, BuildMode::Release);
    /// }
    /// ```
    #[must_use]
    pub fn from_debug_assertions() -> Self {
        if cfg!(debug_assertions) {
            Self::Debug
        } else {
            Self::Release
        }
    }

    fn is_debug(self) -> bool {
        matches!(self, Self::Debug)
    }
}

/// Session toggles as loaded from configuration.
#[derive(Debug, Clone, Copy)]
pub struct SessionToggles<'a> {
    /// File holding the raw key material.
    pub key_file: &'a Path,
    /// Whether session cookies are marked `Secure`.
    pub cookie_secure: bool,
    /// Whether a missing key file may fall back to a random key.
    pub allow_ephemeral: bool,
}

/// Session settings ready for the session middleware.
pub struct SessionSettings {
    /// Signing key for cookie sessions.
    pub key: Key,
    /// Whether session cookies are marked `Secure`.
    pub cookie_secure: bool,
    /// `SameSite` policy for session cookies.
    pub same_site: SameSite,
}

/// Errors raised while validating session configuration.
#[derive(thiserror::Error, Debug)]
pub enum SessionConfigError {
    /// Reading the session key file failed.
    #[error("failed to read session key at {path}: {source}")]
    KeyRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The session key file exists but is too short for release builds.
    #[error("session key at {path} too short: need >= {min_len} bytes, got {length}")]
    KeyTooShort {
        path: PathBuf,
        length: usize,
        min_len: usize,
    },
    /// Release builds must not allow ephemeral session keys.
    #[error("ephemeral session keys are not allowed in release builds")]
    EphemeralNotAllowed,
}

/// Build session settings from configuration toggles and build mode.
///
/// # Examples
///
/// ```rust
/// use roadside::inbound::http::session_config::{
///     session_settings, BuildMode, SessionToggles,
/// };
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let key_path = std::env::temp_dir().join("roadside_session_key_example");
/// std::fs::write(&key_path, vec![b'a'; 64])?;
///
/// let settings = session_settings(
///     SessionToggles {
///         key_file: &key_path,
///         cookie_secure: true,
///         allow_ephemeral: false,
///     },
///     BuildMode::Release,
/// )?;
/// assert!(settings.cookie_secure);
///
/// std::fs::remove_file(&key_path)?;
/// # Ok(())
/// # }
/// ```
pub fn session_settings(
    toggles: SessionToggles<'_>,
    mode: BuildMode,
) -> Result<SessionSettings, SessionConfigError> {
    if toggles.allow_ephemeral && !mode.is_debug() {
        return Err(SessionConfigError::EphemeralNotAllowed);
    }
    if !toggles.cookie_secure {
        warn!("session cookies are not marked Secure");
    }
    let same_site = if mode.is_debug() {
        SameSite::Lax
    } else {
        SameSite::Strict
    };
    let key = session_key(toggles.key_file, mode, toggles.allow_ephemeral)?;

    Ok(SessionSettings {
        key,
        cookie_secure: toggles.cookie_secure,
        same_site,
    })
}

fn session_key(
    path: &Path,
    mode: BuildMode,
    allow_ephemeral: bool,
) -> Result<Key, SessionConfigError> {
    match std::fs::read(path) {
        Ok(mut bytes) => {
            let length = bytes.len();
            if mode == BuildMode::Release && length < SESSION_KEY_MIN_LEN {
                bytes.zeroize();
                return Err(SessionConfigError::KeyTooShort {
                    path: path.to_path_buf(),
                    length,
                    min_len: SESSION_KEY_MIN_LEN,
                });
            }
            let key = Key::derive_from(&bytes);
            bytes.zeroize();
            Ok(key)
        }
        Err(error) => {
            if mode.is_debug() || allow_ephemeral {
                warn!(
                    path = %path.display(),
                    error = %error,
                    "using temporary session key (dev only)"
                );
                Ok(Key::generate())
            } else {
                Err(SessionConfigError::KeyRead {
                    path: path.to_path_buf(),
                    source: error,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};
    use uuid::Uuid;

    struct KeyFile(PathBuf);

    impl KeyFile {
        fn with_len(len: usize) -> Self {
            let path = std::env::temp_dir().join(format!("roadside-session-{}", Uuid::new_v4()));
            std::fs::write(&path, vec![b'k'; len]).expect("write key file");
            Self(path)
        }
    }

    impl Drop for KeyFile {
        fn drop(&mut self) {
            let _ = std::fs::remove_file(&self.0);
        }
    }

    #[fixture]
    fn missing_key() -> PathBuf {
        std::env::temp_dir().join(format!("roadside-missing-{}", Uuid::new_v4()))
    }

    fn toggles(path: &Path, allow_ephemeral: bool) -> SessionToggles<'_> {
        SessionToggles {
            key_file: path,
            cookie_secure: true,
            allow_ephemeral,
        }
    }

    #[rstest]
    #[case::debug(BuildMode::Debug, SameSite::Lax)]
    #[case::release(BuildMode::Release, SameSite::Strict)]
    fn same_site_follows_build_mode(#[case] mode: BuildMode, #[case] expected: SameSite) {
        let key = KeyFile::with_len(SESSION_KEY_MIN_LEN);

        let settings = session_settings(toggles(&key.0, false), mode).expect("settings");

        assert_eq!(settings.same_site, expected);
        assert!(settings.cookie_secure);
    }

    #[rstest]
    fn release_rejects_short_keys() {
        let key = KeyFile::with_len(SESSION_KEY_MIN_LEN - 1);

        let result = session_settings(toggles(&key.0, false), BuildMode::Release);

        assert!(matches!(
            result,
            Err(SessionConfigError::KeyTooShort { length, .. }) if length == SESSION_KEY_MIN_LEN - 1
        ));
    }

    #[rstest]
    fn debug_accepts_short_keys() {
        let key = KeyFile::with_len(16);

        assert!(session_settings(toggles(&key.0, false), BuildMode::Debug).is_ok());
    }

    #[rstest]
    fn release_requires_a_readable_key(missing_key: PathBuf) {
        let result = session_settings(toggles(&missing_key, false), BuildMode::Release);

        assert!(matches!(result, Err(SessionConfigError::KeyRead { .. })));
    }

    #[rstest]
    fn debug_falls_back_to_a_temporary_key(missing_key: PathBuf) {
        assert!(session_settings(toggles(&missing_key, false), BuildMode::Debug).is_ok());
    }

    #[rstest]
    fn release_refuses_ephemeral_keys(missing_key: PathBuf) {
        let result = session_settings(toggles(&missing_key, true), BuildMode::Release);

        assert!(matches!(result, Err(SessionConfigError::EphemeralNotAllowed)));
    }

    #[rstest]
    fn same_key_file_derives_the_same_key() {
        let key = KeyFile::with_len(SESSION_KEY_MIN_LEN);

        let first = session_settings(toggles(&key.0, false), BuildMode::Release).expect("first");
        let second = session_settings(toggles(&key.0, false), BuildMode::Release).expect("second");

        assert_eq!(first.key.master(), second.key.master());
    }
}
