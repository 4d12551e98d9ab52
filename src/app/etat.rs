//! src/app/etat.rs
//!
//! État UI (sans vue, sans noyau).
//!
//! Rôle : contenir ce qui est affiché (entrée, résultat ou erreur + suggestion, démarche,
//! statut, échange avec l’assistant) et offrir des opérations simples (C/CLR/AC).
//!
//! Contrats :
//! - Aucune évaluation ici (pas de noyau, pas de fichier, pas de réseau).
//! - Actions déterministes, sans effet de bord caché.

use crate::noyau::{Demarche, Issue};

#[derive(Clone, Debug)]
pub struct Etat {
    // --- entrée utilisateur ---
    pub entree: String,

    // --- sorties ---
    pub resultat: String,   // valeur affichée (dernier succès)
    pub erreur: String,     // message d’échec
    pub suggestion: String, // conseil associé au genre d’échec
    pub derniere_expression: String,

    // --- démarche (panneau d’explication) ---
    pub demarche: Demarche,

    // --- ligne de statut (historique, assistant) ---
    pub statut: String,

    // --- assistant ---
    pub question: String,
    pub reponse_assistant: String,
    pub assistant_occupe: bool,

    // --- UX ---
    // Permet à vue.rs de redonner le focus à l’entrée après un clic sur un bouton.
    pub focus_entree: bool,
}

impl Default for Etat {
    fn default() -> Self {
        Self {
            entree: String::new(),
            resultat: String::new(),
            erreur: String::new(),
            suggestion: String::new(),
            derniere_expression: String::new(),
            demarche: Demarche::default(),
            statut: String::new(),
            question: String::new(),
            reponse_assistant: String::new(),
            assistant_occupe: false,
            focus_entree: true, // au lancement, on veut pouvoir taper tout de suite
        }
    }
}

impl Etat {
    /* ------------------------ Actions “boutons” (état seulement) ------------------------ */

    /// AC : remise à zéro totale (entrée + résultats + statut).
    pub fn reset_total(&mut self) {
        self.entree.clear();
        self.clear_resultats();
        self.statut.clear();
    }

    /// C : effacer seulement l’entrée (sans toucher aux résultats).
    pub fn clear_entree(&mut self) {
        self.entree.clear();
        self.focus_entree = true;
    }

    /// CLR : effacer résultat + erreur + démarche (sans toucher à l’entrée).
    pub fn clear_resultats(&mut self) {
        self.resultat.clear();
        self.erreur.clear();
        self.suggestion.clear();
        self.derniere_expression.clear();
        self.demarche = Demarche::default();
        self.focus_entree = true;
    }

    /// Dépose l’issue d’une évaluation.
    ///
    /// Sur un échec, le dernier résultat reste à l’écran ; message et suggestion s’affichent dessous.
    pub fn set_issue(&mut self, expression: &str, issue: &Issue, demarche: Demarche) {
        self.derniere_expression = expression.to_string();
        self.demarche = demarche;
        match issue {
            Issue::Succes(v) => {
                self.resultat = v.to_string();
                self.erreur.clear();
                self.suggestion.clear();
            }
            Issue::Echec {
                message,
                suggestion,
                ..
            } => {
                self.erreur = message.clone();
                self.suggestion = suggestion.to_string();
            }
        }
        self.focus_entree = true;
    }

    /// Ce que l’utilisateur voit du dernier calcul (contexte pour l’assistant).
    pub fn affichage_dernier(&self) -> Option<String> {
        if self.derniere_expression.is_empty() {
            None
        } else if !self.erreur.is_empty() {
            Some(format!("{} ({})", self.erreur, self.suggestion))
        } else {
            Some(self.resultat.clone())
        }
    }

    pub fn set_statut(&mut self, msg: impl Into<String>) {
        self.statut = msg.into();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::noyau::evaluer;

    #[test]
    fn echec_garde_le_dernier_resultat() {
        let mut e = Etat::default();
        e.set_issue("2^3", &evaluer("2^3"), Demarche::default());
        assert_eq!(e.resultat, "8");
        assert!(e.erreur.is_empty());

        e.set_issue("1/0", &evaluer("1/0"), Demarche::default());
        assert_eq!(e.resultat, "8");
        assert_eq!(e.erreur, "division by zero");
        assert_eq!(
            e.suggestion,
            "Check for division by zero in your expression."
        );
        assert_eq!(
            e.affichage_dernier().as_deref(),
            Some("division by zero (Check for division by zero in your expression.)")
        );
    }

    #[test]
    fn boutons_c_clr_ac() {
        let mut e = Etat::default();
        e.entree = "1+".into();
        e.set_issue("2", &evaluer("2"), Demarche::default());
        e.set_statut("ok");

        e.clear_entree();
        assert!(e.entree.is_empty());
        assert_eq!(e.resultat, "2");

        e.clear_resultats();
        assert!(e.resultat.is_empty());
        assert!(e.affichage_dernier().is_none());
        assert_eq!(e.statut, "ok");

        e.reset_total();
        assert!(e.statut.is_empty());
    }
}
