// src/assistant.rs
//
// Assistant IA optionnel (point d’accès "chat completions" compatible OpenAI).
//
// Contrats :
// - l’assistant n’évalue rien : les calculs restent au noyau
// - appel bloquant, exécuté sur un thread de fond (l’UI ne bloque jamais)
// - tentatives bornées, attente exponentielle sur erreur réseau / 429 / 5xx
// - 401 / 404 : pas de nouvelle tentative

use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::{ConfigAssistant, ErreurConfig};

const INVITE_SYSTEME: &str = "You are a concise math tutor embedded in a calculator. \
Explain briefly and precisely. When you propose an expression, write it so the calculator \
can evaluate it: numbers, + - * / ** % ( ), and math functions such as sqrt, log, sin, \
round, min, max. Never claim to have run code.";

#[derive(Debug, Error)]
pub enum ErreurAssistant {
    #[error("clé API absente (variable {variable})")]
    CleManquante { variable: String },

    #[error("erreur réseau: {0}")]
    Reseau(#[from] reqwest::Error),

    #[error("en-tête invalide: {0}")]
    EnTete(#[from] reqwest::header::InvalidHeaderValue),

    #[error("réponse HTTP {statut}: {message}")]
    Api { statut: u16, message: String },

    #[error("réponse vide")]
    ReponseVide,

    #[error("réponse illisible: {0}")]
    ReponseInvalide(String),

    #[error("le thread de l’assistant s’est arrêté sans réponse")]
    Interrompu,
}

impl From<ErreurConfig> for ErreurAssistant {
    fn from(e: ErreurConfig) -> Self {
        match e {
            ErreurConfig::CleManquante { variable } => Self::CleManquante { variable },
            autre => Self::ReponseInvalide(autre.to_string()),
        }
    }
}

/* ------------------------ Format des échanges ------------------------ */

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: String,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<Message>,
    max_tokens: u32,
    temperature: f64,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

/// Dernier calcul montré à l’utilisateur, joint à la question.
#[derive(Debug, Clone, PartialEq)]
pub struct Contexte {
    pub expression: String,
    pub affichage: String,
}

/// Messages envoyés : invite système, contexte éventuel, question.
pub fn messages(question: &str, contexte: Option<&Contexte>) -> Vec<Message> {
    let mut user = String::new();
    if let Some(c) = contexte {
        user.push_str(&format!(
            "Last calculation: `{}` -> {}\n\n",
            c.expression, c.affichage
        ));
    }
    user.push_str(question.trim());
    vec![Message::system(INVITE_SYSTEME), Message::user(user)]
}

fn corps_requete(config: &ConfigAssistant, messages: Vec<Message>) -> ChatCompletionRequest<'_> {
    ChatCompletionRequest {
        model: &config.modele,
        messages,
        max_tokens: config.max_tokens,
        temperature: config.temperature,
    }
}

/// Texte de la première réponse non vide.
fn extraire_reponse(corps: &str) -> Result<String, ErreurAssistant> {
    let r: ChatCompletionResponse =
        serde_json::from_str(corps).map_err(|e| ErreurAssistant::ReponseInvalide(e.to_string()))?;
    r.choices
        .into_iter()
        .filter_map(|c| c.message.content)
        .map(|s| s.trim().to_string())
        .find(|s| !s.is_empty())
        .ok_or(ErreurAssistant::ReponseVide)
}

/// Message d’erreur de l’API si le corps le permet, sinon le corps brut.
fn message_erreur(corps: &str) -> String {
    match serde_json::from_str::<ApiErrorResponse>(corps) {
        Ok(e) => e.error.message,
        Err(_) => corps.trim().chars().take(300).collect(),
    }
}

fn reessayable(statut: u16) -> bool {
    statut == 429 || (500..600).contains(&statut)
}

/* ------------------------ Client ------------------------ */

pub struct Assistant {
    client: reqwest::blocking::Client,
    config: ConfigAssistant,
    url: String,
}

impl Assistant {
    pub fn nouveau(config: &ConfigAssistant) -> Result<Self, ErreurAssistant> {
        let cle = config.resoudre_cle()?;

        let mut entetes = HeaderMap::new();
        entetes.insert(AUTHORIZATION, HeaderValue::from_str(&format!("Bearer {cle}"))?);
        entetes.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(entetes)
            .build()?;

        Ok(Self {
            client,
            url: format!("{}/chat/completions", config.base_url.trim_end_matches('/')),
            config: config.clone(),
        })
    }

    /// Appel bloquant avec nouvelles tentatives.
    pub fn demander(
        &self,
        question: &str,
        contexte: Option<&Contexte>,
    ) -> Result<String, ErreurAssistant> {
        let corps = corps_requete(&self.config, messages(question, contexte));
        let tentatives = self.config.max_tentatives.max(1);
        let mut derniere = ErreurAssistant::ReponseVide;

        for tentative in 0..tentatives {
            if tentative > 0 {
                let attente = Duration::from_secs(2u64.pow(tentative - 1));
                debug!(tentative, attente_secs = attente.as_secs(), "nouvelle tentative");
                thread::sleep(attente);
            }

            let reponse = match self.client.post(&self.url).json(&corps).send() {
                Ok(r) => r,
                Err(e) => {
                    warn!(tentative, erreur = %e, "assistant: erreur réseau");
                    derniere = ErreurAssistant::Reseau(e);
                    continue;
                }
            };

            let statut = reponse.status().as_u16();
            let texte = reponse.text()?;

            if (200..300).contains(&statut) {
                return extraire_reponse(&texte);
            }

            derniere = ErreurAssistant::Api {
                statut,
                message: message_erreur(&texte),
            };
            warn!(tentative, statut, "assistant: réponse en erreur");
            if !reessayable(statut) {
                break;
            }
        }

        Err(derniere)
    }
}

/* ------------------------ Demande en arrière-plan ------------------------ */

/// Réponse attendue d’un thread de fond.
pub struct DemandeEnCours {
    recepteur: mpsc::Receiver<Result<String, ErreurAssistant>>,
}

impl DemandeEnCours {
    /// None tant que la réponse n’est pas arrivée.
    pub fn essayer_recevoir(&self) -> Option<Result<String, ErreurAssistant>> {
        match self.recepteur.try_recv() {
            Ok(r) => Some(r),
            Err(mpsc::TryRecvError::Empty) => None,
            Err(mpsc::TryRecvError::Disconnected) => Some(Err(ErreurAssistant::Interrompu)),
        }
    }
}

/// Lance la demande sur un thread et rend la main immédiatement.
pub fn lancer(
    config: &ConfigAssistant,
    question: &str,
    contexte: Option<Contexte>,
) -> DemandeEnCours {
    let (emetteur, recepteur) = mpsc::channel();
    let config = config.clone();
    let question = question.to_string();

    thread::spawn(move || {
        info!(modele = %config.modele, "assistant: demande envoyée");
        let r = Assistant::nouveau(&config)
            .and_then(|a| a.demander(&question, contexte.as_ref()));
        // Récepteur abandonné : personne n’attend plus la réponse.
        let _ = emetteur.send(r);
    });

    DemandeEnCours { recepteur }
}
