use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{anyhow, Result};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub firestore: FirestoreConfig,
    #[serde(default)]
    pub admin: AdminConfig,
    #[serde(default)]
    pub contact: ContactConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub worker_threads: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: "127.0.0.1".into(), port: 8080, worker_threads: Some(4) }
    }
}

/// Which catalog backend to run against.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Resolve at startup from the deployment environment.
    #[default]
    Auto,
    File,
    Memory,
    Firestore,
}

impl FromStr for BackendKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" | "" => Ok(Self::Auto),
            "file" => Ok(Self::File),
            "memory" => Ok(Self::Memory),
            "firestore" | "firebase" => Ok(Self::Firestore),
            other => Err(anyhow!("unknown storage backend `{other}`")),
        }
    }
}

/// What `delete` does to a record. Applied uniformly by every backend.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum DeletePolicy {
    /// Remove the record from storage.
    #[default]
    Hard,
    /// Keep the record and flip `active` to false.
    Soft,
}

impl FromStr for DeletePolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hard" => Ok(Self::Hard),
            "soft" => Ok(Self::Soft),
            other => Err(anyhow!("unknown delete policy `{other}`")),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: BackendKind,
    #[serde(default = "default_data_file")]
    pub data_file: PathBuf,
    #[serde(default = "default_snapshot_env")]
    pub snapshot_env: String,
    #[serde(default)]
    pub delete_policy: DeletePolicy,
    #[serde(default = "default_true")]
    pub read_fallback: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::Auto,
            data_file: default_data_file(),
            snapshot_env: default_snapshot_env(),
            delete_policy: DeletePolicy::Hard,
            read_fallback: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct FirestoreConfig {
    #[serde(default)]
    pub project_id: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_database")]
    pub database: String,
    #[serde(default = "default_collection")]
    pub collection: String,
    #[serde(default = "default_firestore_url")]
    pub base_url: String,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl Default for FirestoreConfig {
    fn default() -> Self {
        Self {
            project_id: String::new(),
            api_key: String::new(),
            database: default_database(),
            collection: default_collection(),
            base_url: default_firestore_url(),
            timeout_secs: default_timeout(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AdminConfig {
    /// Plaintext secret or an argon2 PHC string. Empty disables admin login.
    #[serde(default)]
    pub password: String,
    #[serde(default = "default_session_secret")]
    pub session_secret: String,
    #[serde(default = "default_session_ttl")]
    pub session_ttl_secs: u64,
    #[serde(default)]
    pub secure_cookie: bool,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            password: String::new(),
            session_secret: default_session_secret(),
            session_ttl_secs: default_session_ttl(),
            secure_cookie: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ContactConfig {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_window")]
    pub window_secs: u64,
    #[serde(default = "default_company_email")]
    pub company_email: String,
    #[serde(default = "default_from_email")]
    pub from_email: String,
}

impl Default for ContactConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            window_secs: default_window(),
            company_email: default_company_email(),
            from_email: default_from_email(),
        }
    }
}

fn default_true() -> bool { true }
fn default_data_file() -> PathBuf { PathBuf::from("data/services.json") }
fn default_snapshot_env() -> String { "SERVICES_DATA".into() }
fn default_database() -> String { "(default)".into() }
fn default_collection() -> String { "services".into() }
fn default_firestore_url() -> String { "https://firestore.googleapis.com/v1".into() }
fn default_timeout() -> u64 { 10 }
fn default_session_secret() -> String { "dev-secret-change-me".into() }
fn default_session_ttl() -> u64 { 60 * 60 * 24 }
fn default_max_attempts() -> u32 { 5 }
fn default_window() -> u64 { 15 * 60 }
fn default_company_email() -> String { "info@expo2025construction.com".into() }
fn default_from_email() -> String { "noreply@expo2025construction.com".into() }

pub fn load_default() -> Result<AppConfig> {
    let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
    load_from_file(&path)
}

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    let cfg: AppConfig = toml::from_str(&content)?;
    Ok(cfg)
}

impl AppConfig {
    /// Load `config.toml` (or defaults when absent), overlay the process
    /// environment, then normalize and validate.
    pub fn load_and_validate() -> Result<Self> {
        let mut cfg = match load_default() {
            Ok(cfg) => cfg,
            Err(e) if is_not_found(&e) => AppConfig::default(),
            Err(e) => return Err(e),
        };
        cfg.apply_env(|key| std::env::var(key).ok())?;
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    /// Overlay values from an environment lookup. Empty values are ignored;
    /// a value that does not parse is an error.
    pub fn apply_env<F>(&mut self, get: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| get(key).filter(|v| !v.trim().is_empty());
        let parse = |key: &str| get(key).map(|v| (key.to_string(), v));

        if let Some(host) = get("SERVER_HOST") { self.server.host = host; }
        if let Some(port) = parse_env(parse("SERVER_PORT"))? { self.server.port = port; }
        if let Some(w) = parse_env(parse("TOKIO_WORKER_THREADS"))? { self.server.worker_threads = Some(w); }

        if let Some(kind) = parse_env(parse("STORAGE_BACKEND"))? { self.storage.backend = kind; }
        if let Some(path) = get("SERVICES_FILE") { self.storage.data_file = PathBuf::from(path); }
        if let Some(policy) = parse_env(parse("DELETE_POLICY"))? { self.storage.delete_policy = policy; }

        if let Some(project) = get("FIREBASE_PROJECT_ID") { self.firestore.project_id = project; }
        if let Some(key) = get("FIREBASE_API_KEY") { self.firestore.api_key = key; }

        if let Some(pw) = get("ADMIN_PASSWORD") { self.admin.password = pw; }
        if let Some(secret) = get("SESSION_SECRET") { self.admin.session_secret = secret; }
        if get("NODE_ENV").as_deref() == Some("production") || get("APP_ENV").as_deref() == Some("production") {
            self.admin.secure_cookie = true;
        }
        Ok(())
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        self.server.normalize()?;
        self.firestore.normalize();
        if self.storage.backend == BackendKind::Firestore {
            self.firestore.validate()?;
        }
        self.contact.validate()?;
        if self.admin.session_ttl_secs == 0 {
            return Err(anyhow!("admin.session_ttl_secs must be > 0"));
        }
        Ok(())
    }

    /// Concrete backend for this process. `on_serverless` reports whether the
    /// host platform discards local writes between invocations.
    pub fn resolve_backend(&self, on_serverless: bool) -> BackendKind {
        match self.storage.backend {
            BackendKind::Auto if !self.firestore.project_id.trim().is_empty() => BackendKind::Firestore,
            BackendKind::Auto if on_serverless => BackendKind::Memory,
            BackendKind::Auto => BackendKind::File,
            explicit => explicit,
        }
    }
}

fn parse_env<T>(entry: Option<(String, String)>) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    entry
        .map(|(key, raw)| raw.trim().parse::<T>().map_err(|e| anyhow!("{key}=`{raw}`: {e}")))
        .transpose()
}

fn is_not_found(e: &anyhow::Error) -> bool {
    e.downcast_ref::<std::io::Error>()
        .is_some_and(|io| io.kind() == std::io::ErrorKind::NotFound)
}

impl ServerConfig {
    fn normalize(&mut self) -> Result<()> {
        if self.host.trim().is_empty() {
            self.host = "127.0.0.1".to_string();
        }
        if self.port == 0 {
            return Err(anyhow!("server.port must be within 1..=65535"));
        }
        if let Some(w) = self.worker_threads {
            if w == 0 { self.worker_threads = Some(4); }
        } else {
            self.worker_threads = Some(4);
        }
        Ok(())
    }
}

impl FirestoreConfig {
    fn normalize(&mut self) {
        self.base_url = self.base_url.trim_end_matches('/').to_string();
        if self.database.trim().is_empty() {
            self.database = default_database();
        }
        if self.collection.trim().is_empty() {
            self.collection = default_collection();
        }
        if self.timeout_secs == 0 {
            self.timeout_secs = default_timeout();
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.project_id.trim().is_empty() {
            return Err(anyhow!("firestore.project_id is empty; set it in config.toml or FIREBASE_PROJECT_ID"));
        }
        let lower = self.base_url.to_lowercase();
        if !(lower.starts_with("http://") || lower.starts_with("https://")) {
            return Err(anyhow!("firestore.base_url must start with http:// or https://"));
        }
        Ok(())
    }
}

impl ContactConfig {
    fn validate(&self) -> Result<()> {
        if self.window_secs == 0 {
            return Err(anyhow!("contact.window_secs must be > 0"));
        }
        if self.max_attempts == 0 {
            return Err(anyhow!("contact.max_attempts must be >= 1"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn parses_toml_sections() -> Result<()> {
        let cfg: AppConfig = toml::from_str(
            r#"
            [server]
            host = "0.0.0.0"
            port = 9000

            [storage]
            backend = "memory"
            delete_policy = "soft"
            read_fallback = false

            [contact]
            max_attempts = 3
            "#,
        )?;
        assert_eq!(cfg.server.port, 9000);
        assert_eq!(cfg.storage.backend, BackendKind::Memory);
        assert_eq!(cfg.storage.delete_policy, DeletePolicy::Soft);
        assert!(!cfg.storage.read_fallback);
        assert_eq!(cfg.storage.data_file, PathBuf::from("data/services.json"));
        assert_eq!(cfg.contact.max_attempts, 3);
        assert_eq!(cfg.contact.window_secs, 900);
        Ok(())
    }

    #[test]
    fn env_overrides_file_values() -> Result<()> {
        let mut cfg = AppConfig::default();
        cfg.apply_env(env(&[
            ("STORAGE_BACKEND", "file"),
            ("SERVICES_FILE", "/tmp/s.json"),
            ("ADMIN_PASSWORD", "hunter2"),
            ("DELETE_POLICY", "Soft"),
            ("SESSION_SECRET", "  "),
        ]))?;
        assert_eq!(cfg.storage.backend, BackendKind::File);
        assert_eq!(cfg.storage.data_file, PathBuf::from("/tmp/s.json"));
        assert_eq!(cfg.storage.delete_policy, DeletePolicy::Soft);
        assert_eq!(cfg.admin.password, "hunter2");
        assert_eq!(cfg.server.port, 8080);
        assert_eq!(cfg.admin.session_secret, "dev-secret-change-me");
        Ok(())
    }

    #[test]
    fn unparseable_env_values_are_rejected() {
        for (key, value) in [
            ("STORAGE_BACKEND", "firestor"),
            ("DELETE_POLICY", "archive"),
            ("SERVER_PORT", "not-a-port"),
            ("TOKIO_WORKER_THREADS", "many"),
        ] {
            let mut cfg = AppConfig::default();
            let err = cfg.apply_env(env(&[(key, value)])).expect_err("must reject");
            assert!(err.to_string().contains(key), "{err}");
            assert_eq!(cfg.storage.backend, BackendKind::Auto);
        }
    }

    #[test]
    fn auto_backend_resolution() {
        let mut cfg = AppConfig::default();
        assert_eq!(cfg.resolve_backend(false), BackendKind::File);
        assert_eq!(cfg.resolve_backend(true), BackendKind::Memory);
        cfg.firestore.project_id = "expo-site".into();
        assert_eq!(cfg.resolve_backend(true), BackendKind::Firestore);
        cfg.storage.backend = BackendKind::File;
        assert_eq!(cfg.resolve_backend(true), BackendKind::File);
    }

    #[test]
    fn firestore_backend_requires_project() {
        let mut cfg = AppConfig::default();
        cfg.storage.backend = BackendKind::Firestore;
        assert!(cfg.normalize_and_validate().is_err());
        cfg.firestore.project_id = "p".into();
        assert!(cfg.normalize_and_validate().is_ok());
    }

    #[test]
    fn rejects_zero_window_and_port() {
        let mut cfg = AppConfig::default();
        cfg.contact.window_secs = 0;
        assert!(cfg.normalize_and_validate().is_err());

        let mut cfg = AppConfig::default();
        cfg.server.port = 0;
        assert!(cfg.normalize_and_validate().is_err());
    }

    #[test]
    fn backend_kind_from_str() {
        assert_eq!("Firebase".parse::<BackendKind>().ok(), Some(BackendKind::Firestore));
        assert!("postgres".parse::<BackendKind>().is_err());
    }
}
