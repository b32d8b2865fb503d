//! Configuration loading, persistence, and validation.

use super::{BackendKind, SecretsConfig, EXTRA_PATH, EXTRA_PROJECT_ID, EXTRA_REGION};
use crate::error::ConfigError;
use crate::paths;
use std::fs;
use std::io::Write;
use std::path::Path;

impl SecretsConfig {
    /// Load configuration from the default path.
    pub fn load_default() -> Result<Self, ConfigError> {
        let path = paths::config_file()?;
        Self::load(&path)
    }

    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse configuration from a string.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        json5::from_str(content).map_err(|e| ConfigError::Json5(e.to_string()))
    }

    /// Save configuration to a file path.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::Parse(e.to_string()))?;

        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir)?;

        // Staged owner-only (0600 on Unix) since the file may carry a token,
        // then renamed into place
        let mut staged = tempfile::NamedTempFile::new_in(dir)?;
        staged.write_all(content.as_bytes())?;
        staged.as_file().sync_all()?;
        staged.persist(path).map_err(|e| ConfigError::Io(e.error))?;

        tracing::debug!(path = %path.display(), backend = %self.backend, "saved secrets config");
        Ok(())
    }

    /// Validate the configuration, collecting all errors before returning.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        match self.backend {
            BackendKind::Local => self.require_extra(EXTRA_PATH, &mut errors),
            BackendKind::AwsSsm => self.require_extra(EXTRA_REGION, &mut errors),
            BackendKind::GcpSsm => self.require_extra(EXTRA_PROJECT_ID, &mut errors),
            BackendKind::HashicorpVault => {
                if self.token.as_ref().map_or(true, |t| t.is_empty()) {
                    errors.push("hashicorp-vault backend requires a token".to_string());
                }
                match self.server_url.as_deref() {
                    None | Some("") => {
                        errors.push("hashicorp-vault backend requires server_url".to_string())
                    }
                    Some(url) if !url.starts_with("http://") && !url.starts_with("https://") => {
                        errors.push(format!("server_url '{url}' must be an http(s) URL"))
                    }
                    Some(_) => {}
                }
            }
        }

        if let Some(name) = &self.name {
            if name.trim().is_empty() {
                errors.push("name must not be blank when set".to_string());
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors.join("; ")))
        }
    }

    fn require_extra(&self, key: &str, errors: &mut Vec<String>) {
        match self.extra_str(key) {
            Ok(Some(value)) if !value.trim().is_empty() => {}
            Ok(_) => errors.push(format!("{} backend requires extra.{}", self.backend, key)),
            Err(e) => errors.push(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::secret::SecretString;
    use tempfile::TempDir;

    #[test]
    fn test_parse_json5_local() {
        let config = SecretsConfig::parse(
            r#"{
                // local node keys
                type: "local",
                extra: { path: "/data/node1" },
            }"#,
        )
        .unwrap();
        assert_eq!(config.backend, BackendKind::Local);
        assert_eq!(config.extra_str(EXTRA_PATH).unwrap(), Some("/data/node1"));
        config.validate().unwrap();
    }

    #[test]
    fn test_parse_rejects_unknown_type() {
        let result = SecretsConfig::parse(r#"{ type: "azure-kv" }"#);
        assert!(matches!(result, Err(ConfigError::Json5(_))));
    }

    #[test]
    fn test_validate_local_requires_path() {
        let config = SecretsConfig::new(BackendKind::Local);
        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("extra.path"), "got: {err}");
    }

    #[test]
    fn test_validate_vault_collects_all_errors() {
        let mut config = SecretsConfig::new(BackendKind::HashicorpVault);
        config.server_url = Some("vault.internal:8200".to_string());
        config.name = Some("  ".to_string());

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("requires a token"), "got: {err}");
        assert!(err.contains("http(s) URL"), "got: {err}");
        assert!(err.contains("name must not be blank"), "got: {err}");
    }

    #[test]
    fn test_validate_vault_ok() {
        let mut config = SecretsConfig::new(BackendKind::HashicorpVault);
        config.token = Some(SecretString::new("hvs.token"));
        config.server_url = Some("https://vault.internal:8200".to_string());
        config.name = Some("node1".to_string());
        config.validate().unwrap();
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("secrets.json5");

        let mut config = SecretsConfig::new(BackendKind::AwsSsm);
        config.name = Some("node1".to_string());
        config
            .extra
            .insert(EXTRA_REGION.to_string(), serde_json::json!("eu-west-1"));
        config.save(&path).unwrap();

        let loaded = SecretsConfig::load(&path).unwrap();
        assert_eq!(loaded.backend, BackendKind::AwsSsm);
        assert_eq!(loaded.name.as_deref(), Some("node1"));
        assert_eq!(loaded.extra_str(EXTRA_REGION).unwrap(), Some("eu-west-1"));
        assert_eq!(fs::read_dir(path.parent().unwrap()).unwrap().count(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn test_saved_config_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("vault.json5");

        let mut config = SecretsConfig::new(BackendKind::HashicorpVault);
        config.token = Some(SecretString::new("hvs.secret"));
        config.server_url = Some("https://vault.internal:8200".to_string());
        config.save(&path).unwrap();
        // Overwriting keeps the mode too.
        config.save(&path).unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o600);
        assert!(fs::read_to_string(&path).unwrap().contains("hvs.secret"));
        assert_eq!(
            SecretsConfig::load(&path).unwrap().token.unwrap().expose_secret(),
            "hvs.secret"
        );
    }

    #[test]
    fn test_load_missing_file() {
        let dir = TempDir::new().unwrap();
        let result = SecretsConfig::load(&dir.path().join("absent.json5"));
        assert!(matches!(result, Err(ConfigError::NotFound(_))));
    }
}
