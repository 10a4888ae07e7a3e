use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tarefas_client::Endpoints;

use crate::state::ensure_tarefas_home;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub api: ApiSection,
    pub client: ClientSection,
    pub log: LogSection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiSection {
    pub base_url: String,
    pub auth_login: String,
    pub usuarios: String,
    pub tarefas: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientSection {
    /// IANA zone used to decide what "today" is for deadlines.
    pub timezone: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogSection {
    /// `EnvFilter` directive; `RUST_LOG` takes precedence.
    pub filter: String,
}

impl Default for ApiSection {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            auth_login: "/auth/login".to_string(),
            usuarios: "/api/usuarios".to_string(),
            tarefas: "/api/tarefas".to_string(),
            timeout_secs: 30,
        }
    }
}

impl Default for ClientSection {
    fn default() -> Self {
        Self {
            timezone: "America/Sao_Paulo".to_string(),
        }
    }
}

impl Default for LogSection {
    fn default() -> Self {
        Self {
            filter: "warn".to_string(),
        }
    }
}

impl ApiSection {
    pub fn endpoints(&self) -> Endpoints {
        Endpoints::new(&self.base_url, &self.auth_login, &self.usuarios, &self.tarefas)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

pub fn config_path() -> Result<PathBuf> {
    Ok(ensure_tarefas_home()?.join("config.toml"))
}

pub fn load_config() -> Result<Config> {
    load_config_from(&config_path()?)
}

pub fn load_config_from(p: &Path) -> Result<Config> {
    if !p.exists() {
        return Ok(Config::default());
    }
    let s = fs::read_to_string(p).with_context(|| format!("read {}", p.display()))?;
    toml::from_str(&s).with_context(|| format!("parse {}", p.display()))
}

pub fn save_config_to(p: &Path, cfg: &Config) -> Result<()> {
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(p, s).with_context(|| format!("write {}", p.display()))?;
    Ok(())
}

pub fn init_config() -> Result<()> {
    let p = config_path()?;
    if p.exists() {
        println!("Config already exists: {}", p.display());
        return Ok(());
    }
    save_config_to(&p, &Config::default())?;
    println!("Wrote {}", p.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_config_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(cfg, Config::default());
        assert_eq!(cfg.api.timeout(), Duration::from_secs(30));
        assert_eq!(cfg.log.filter, "warn");
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("config.toml");
        fs::write(&p, "[api]\nbase_url = \"https://tarefas.example.com/\"\n").unwrap();

        let cfg = load_config_from(&p).unwrap();
        assert_eq!(cfg.api.base_url, "https://tarefas.example.com/");
        assert_eq!(cfg.api.tarefas, "/api/tarefas");
        assert_eq!(cfg.client.timezone, "America/Sao_Paulo");
        assert_eq!(
            cfg.api.endpoints().task(4),
            "https://tarefas.example.com/api/tarefas/4"
        );
    }

    #[test]
    fn saved_config_reloads() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("config.toml");
        let mut cfg = Config::default();
        cfg.client.timezone = "Europe/Lisbon".into();
        cfg.log.filter = "tarefas_client=debug".into();
        save_config_to(&p, &cfg).unwrap();
        assert_eq!(load_config_from(&p).unwrap(), cfg);
    }

    #[test]
    fn malformed_file_names_the_path() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("config.toml");
        fs::write(&p, "[api\n").unwrap();
        let err = load_config_from(&p).unwrap_err();
        assert!(format!("{err:#}").contains("config.toml"));
    }
}
