//! src/app/controleur.rs
//!
//! Contrôleur : seul appelant du noyau côté UI.
//!
//! Contrats :
//! - entrée vide (ou blanche) => rien ne se passe
//! - une évaluation ratée n’est jamais fatale : message + suggestion dans l’état
//! - chaque évaluation est journalisée puis ajoutée à l’historique ;
//!   un échec d’écriture devient une ligne de statut
//! - une seule demande à l’assistant à la fois, jamais bloquante

use tracing::{debug, info, warn};

use crate::assistant::{self, Contexte, DemandeEnCours};
use crate::config::{Config, ConfigAssistant};
use crate::historique::{Enregistrement, Historique};
use crate::noyau::{evaluer_detaille, Issue};

use super::etat::Etat;

pub struct AppCalc {
    pub etat: Etat,
    historique: Historique,
    assistant: ConfigAssistant,
    demande: Option<DemandeEnCours>,
}

impl AppCalc {
    pub fn nouveau(historique: Historique, assistant: ConfigAssistant) -> Self {
        Self {
            etat: Etat::default(),
            historique,
            assistant,
            demande: None,
        }
    }

    /// Historique persistant ou en mémoire selon la configuration.
    pub fn depuis_config(config: &Config) -> Self {
        let max = config.historique.max_entrees;
        let historique = match (config.historique.actif, config.chemin_historique()) {
            (true, Some(chemin)) => Historique::charger(chemin, max),
            (true, None) => {
                warn!("aucun dossier de données, historique en mémoire");
                Historique::en_memoire(max)
            }
            (false, _) => Historique::en_memoire(max),
        };
        debug!(chemin = ?historique.chemin(), n = historique.len(), "historique prêt");
        Self::nouveau(historique, config.assistant.clone())
    }

    pub fn historique(&self) -> &Historique {
        &self.historique
    }

    pub fn assistant_actif(&self) -> bool {
        self.assistant.actif
    }

    /* ------------------------ Évaluation ------------------------ */

    /// Évalue l’entrée courante.
    pub fn soumettre_entree(&mut self) -> Option<Issue> {
        let entree = self.etat.entree.clone();
        self.soumettre(&entree)
    }

    /// None si l’entrée est blanche (aucun effet).
    pub fn soumettre(&mut self, entree: &str) -> Option<Issue> {
        let expr = entree.trim();
        if expr.is_empty() {
            self.etat.focus_entree = true;
            return None;
        }

        let (issue, demarche) = evaluer_detaille(expr);
        self.etat.set_issue(expr, &issue, demarche);
        match issue.genre() {
            None => info!(expression = expr, resultat = %self.etat.resultat, "évaluation"),
            Some(genre) => info!(
                expression = expr,
                genre = genre.libelle(),
                message = %self.etat.erreur,
                "évaluation en échec"
            ),
        }

        if let Err(e) = self.historique.ajouter(Enregistrement::nouveau(expr, &issue)) {
            warn!(erreur = %e, "historique non enregistré");
            self.etat.set_statut(format!("Historique non enregistré : {e}"));
        }

        Some(issue)
    }

    /// Recopie une expression de l’historique dans l’entrée.
    pub fn reutiliser(&mut self, index: usize) {
        if let Some(e) = self.historique.entrees().get(index) {
            self.etat.entree = e.expression.clone();
            self.etat.focus_entree = true;
        }
    }

    pub fn effacer_historique(&mut self) {
        match self.historique.effacer() {
            Ok(()) => self.etat.set_statut("Historique effacé"),
            Err(e) => {
                warn!(erreur = %e, "effacement de l’historique");
                self.etat.set_statut(format!("Historique non effacé : {e}"));
            }
        }
    }

    /* ------------------------ Assistant ------------------------ */

    /// Lance une demande de fond. false si rien n’est lancé.
    pub fn demander_assistant(&mut self, question: &str) -> bool {
        let question = question.trim();
        if question.is_empty() || self.demande.is_some() {
            return false;
        }
        if !self.assistant.actif {
            self.etat
                .set_statut("Assistant désactivé (voir [assistant] dans la configuration)");
            return false;
        }

        let contexte = self.etat.affichage_dernier().map(|affichage| Contexte {
            expression: self.etat.derniere_expression.clone(),
            affichage,
        });
        debug!(avec_contexte = contexte.is_some(), "assistant: demande");

        self.demande = Some(assistant::lancer(&self.assistant, question, contexte));
        self.etat.assistant_occupe = true;
        self.etat.reponse_assistant.clear();
        self.etat.set_statut("Assistant : réflexion…");
        true
    }

    /// À appeler à chaque image : récupère la réponse si elle est arrivée.
    pub fn poll_assistant(&mut self) {
        let Some(demande) = &self.demande else {
            return;
        };
        let Some(r) = demande.essayer_recevoir() else {
            return;
        };

        self.demande = None;
        self.etat.assistant_occupe = false;
        match r {
            Ok(texte) => {
                self.etat.reponse_assistant = texte;
                self.etat.statut.clear();
            }
            Err(e) => {
                warn!(erreur = %e, "assistant en échec");
                self.etat.set_statut(format!("Assistant : {e}"));
            }
        }
    }
}
