// src/config.rs
//
// Configuration (fichier TOML, toutes les clés optionnelles).
//
// Contrats :
// - fichier par défaut absent => valeurs par défaut (jamais une erreur)
// - chemin explicite illisible ou invalide => erreur (avec le chemin)
// - la clé API peut contenir des références ${VAR} (développées à la lecture)

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Nom du dossier applicatif (config + données).
pub const NOM_APPLI: &str = "calculatrice_sure";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub historique: ConfigHistorique,
    pub assistant: ConfigAssistant,
    pub journal: ConfigJournal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigHistorique {
    /// false => historique en mémoire seulement
    pub actif: bool,
    /// None => <data_dir>/calculatrice_sure/historique.json
    pub chemin: Option<PathBuf>,
    pub max_entrees: usize,
}

impl Default for ConfigHistorique {
    fn default() -> Self {
        Self {
            actif: true,
            chemin: None,
            max_entrees: 500,
        }
    }
}

/// Point d’accès compatible "chat completions".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigAssistant {
    pub actif: bool,
    pub base_url: String,
    pub modele: String,
    /// Variable d’environnement lue si `api_key` est absente.
    pub api_key_env: String,
    pub api_key: Option<String>,
    pub timeout_secs: u64,
    pub max_tentatives: u32,
    pub max_tokens: u32,
    pub temperature: f64,
}

impl Default for ConfigAssistant {
    fn default() -> Self {
        Self {
            actif: false,
            base_url: "https://api.openai.com/v1".to_string(),
            modele: "gpt-4o-mini".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            api_key: None,
            timeout_secs: 60,
            max_tentatives: 3,
            max_tokens: 512,
            temperature: 0.3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigJournal {
    /// Directive EnvFilter ("info", "debug", "calculatrice_sure=trace"...)
    pub niveau: String,
}

impl Default for ConfigJournal {
    fn default() -> Self {
        Self {
            niveau: "info".to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ErreurConfig {
    #[error("lecture impossible du fichier de configuration {chemin}: {source}")]
    Lecture {
        chemin: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("fichier de configuration invalide {chemin}: {source}")]
    Syntaxe {
        chemin: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("clé API absente (ni `api_key` ni variable {variable})")]
    CleManquante { variable: String },
}

impl Config {
    /// Chemin par défaut : <config_dir>/calculatrice_sure/config.toml
    pub fn chemin_defaut() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(NOM_APPLI).join("config.toml"))
    }

    /// Lit un fichier TOML (toutes les clés optionnelles).
    pub fn depuis_fichier(chemin: &Path) -> Result<Self, ErreurConfig> {
        let contenu = std::fs::read_to_string(chemin).map_err(|e| ErreurConfig::Lecture {
            chemin: chemin.to_owned(),
            source: e,
        })?;
        Self::depuis_texte(&contenu).map_err(|e| ErreurConfig::Syntaxe {
            chemin: chemin.to_owned(),
            source: e,
        })
    }

    pub fn depuis_texte(contenu: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contenu)
    }

    /// Chemin explicite => doit être lisible ; sinon fichier par défaut s’il existe.
    pub fn charger(explicite: Option<&Path>) -> Result<Self, ErreurConfig> {
        if let Some(chemin) = explicite {
            debug!(chemin = %chemin.display(), "configuration explicite");
            return Self::depuis_fichier(chemin);
        }
        match Self::chemin_defaut() {
            Some(chemin) if chemin.is_file() => {
                debug!(chemin = %chemin.display(), "configuration par défaut");
                Self::depuis_fichier(&chemin)
            }
            _ => {
                debug!("aucun fichier de configuration, valeurs par défaut");
                Ok(Self::default())
            }
        }
    }

    /// Fichier d’historique effectif.
    pub fn chemin_historique(&self) -> Option<PathBuf> {
        self.historique.chemin.clone().or_else(|| {
            dirs::data_dir().map(|d| d.join(NOM_APPLI).join("historique.json"))
        })
    }
}

impl ConfigAssistant {
    /// Clé API : `api_key` (développée) sinon la variable d’environnement.
    pub fn resoudre_cle(&self) -> Result<String, ErreurConfig> {
        if let Some(cle) = &self.api_key {
            let cle = developper_variables(cle);
            if !cle.trim().is_empty() {
                return Ok(cle);
            }
        }
        match std::env::var(&self.api_key_env) {
            Ok(cle) if !cle.trim().is_empty() => Ok(cle),
            _ => Err(ErreurConfig::CleManquante {
                variable: self.api_key_env.clone(),
            }),
        }
    }
}

/// Remplace les ${VAR} définies ; les autres restent telles quelles.
pub fn developper_variables(s: &str) -> String {
    let re = match regex::Regex::new(r"\$\{([^}]+)\}") {
        Ok(re) => re,
        Err(_) => return s.to_string(),
    };
    re.replace_all(s, |cap: &regex::Captures<'_>| {
        std::env::var(&cap[1]).unwrap_or_else(|_| cap[0].to_string())
    })
    .into_owned()
}
