// src/historique.rs
//
// Historique des évaluations (JSON sur disque, taille bornée).
//
// Contrats :
// - fichier absent => historique vide ; fichier corrompu => vide + avertissement (l’appli démarre)
// - écriture atomique : fichier temporaire voisin puis rename
// - au-delà de `max` entrées, les plus anciennes sont retirées
// - l’évaluateur n’écrit jamais ici : c’est l’appelant qui enregistre

use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::noyau::Issue;

/// Une évaluation enregistrée.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enregistrement {
    pub horodatage: DateTime<Utc>,
    pub expression: String,
    #[serde(flatten)]
    pub issue: IssueEnregistree,
}

/// Forme affichée de l’issue (JSON "à plat" dans l’enregistrement).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IssueEnregistree {
    Resultat {
        resultat: String,
    },
    Erreur {
        genre: String,
        erreur: String,
        suggestion: String,
    },
}

impl Enregistrement {
    pub fn nouveau(expression: &str, issue: &Issue) -> Self {
        Self::horodate(Utc::now(), expression, issue)
    }

    pub fn horodate(horodatage: DateTime<Utc>, expression: &str, issue: &Issue) -> Self {
        let issue = match issue {
            Issue::Succes(v) => IssueEnregistree::Resultat {
                resultat: v.to_string(),
            },
            Issue::Echec {
                genre,
                message,
                suggestion,
            } => IssueEnregistree::Erreur {
                genre: genre.libelle().to_string(),
                erreur: message.clone(),
                suggestion: suggestion.to_string(),
            },
        };
        Self {
            horodatage,
            expression: expression.to_string(),
            issue,
        }
    }

    /// Ligne courte pour la liste de l’historique.
    pub fn resume(&self) -> String {
        match &self.issue {
            IssueEnregistree::Resultat { resultat } => format!("{} = {resultat}", self.expression),
            IssueEnregistree::Erreur { erreur, .. } => format!("{} ⚠ {erreur}", self.expression),
        }
    }
}

#[derive(Debug, Error)]
pub enum ErreurHistorique {
    #[error("historique {chemin}: {source}")]
    Io {
        chemin: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("historique: sérialisation JSON impossible: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone)]
pub struct Historique {
    /// None => mémoire seulement
    chemin: Option<PathBuf>,
    max: usize,
    entrees: Vec<Enregistrement>,
}

impl Historique {
    /// Historique non persistant.
    pub fn en_memoire(max: usize) -> Self {
        Self {
            chemin: None,
            max,
            entrees: Vec::new(),
        }
    }

    /// Charge le fichier s’il existe ; ne échoue jamais (au pire : vide).
    pub fn charger(chemin: impl Into<PathBuf>, max: usize) -> Self {
        let chemin = chemin.into();
        let mut entrees = match lire(&chemin) {
            Ok(Some(v)) => v,
            Ok(None) => {
                debug!(chemin = %chemin.display(), "pas d’historique, départ à vide");
                Vec::new()
            }
            Err(e) => {
                warn!(erreur = %e, "historique illisible, ignoré");
                Vec::new()
            }
        };
        tronquer(&mut entrees, max);
        debug!(chemin = %chemin.display(), n = entrees.len(), "historique chargé");
        Self {
            chemin: Some(chemin),
            max,
            entrees,
        }
    }

    pub fn chemin(&self) -> Option<&Path> {
        self.chemin.as_deref()
    }

    /// Du plus ancien au plus récent.
    pub fn entrees(&self) -> &[Enregistrement] {
        &self.entrees
    }

    pub fn len(&self) -> usize {
        self.entrees.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entrees.is_empty()
    }

    /// Ajoute puis persiste. La mémoire est à jour même si l’écriture échoue.
    pub fn ajouter(&mut self, e: Enregistrement) -> Result<(), ErreurHistorique> {
        self.entrees.push(e);
        tronquer(&mut self.entrees, self.max);
        self.persister()
    }

    pub fn effacer(&mut self) -> Result<(), ErreurHistorique> {
        self.entrees.clear();
        self.persister()
    }

    fn persister(&self) -> Result<(), ErreurHistorique> {
        let Some(chemin) = &self.chemin else {
            return Ok(());
        };
        let io_err = |source| ErreurHistorique::Io {
            chemin: chemin.clone(),
            source,
        };

        if let Some(parent) = chemin.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }

        let json = serde_json::to_string_pretty(&self.entrees)?;
        let temporaire = chemin.with_extension("json.tmp");
        std::fs::write(&temporaire, json).map_err(io_err)?;
        std::fs::rename(&temporaire, chemin).map_err(io_err)?;
        Ok(())
    }
}

/// Ok(None) si le fichier n’existe pas.
fn lire(chemin: &Path) -> Result<Option<Vec<Enregistrement>>, ErreurHistorique> {
    let texte = match std::fs::read_to_string(chemin) {
        Ok(t) => t,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(ErreurHistorique::Io {
                chemin: chemin.to_owned(),
                source,
            })
        }
    };
    if texte.trim().is_empty() {
        return Ok(Some(Vec::new()));
    }
    Ok(Some(serde_json::from_str(&texte)?))
}

/// Garde les `max` plus récentes.
fn tronquer(entrees: &mut Vec<Enregistrement>, max: usize) {
    if entrees.len() > max {
        let surplus = entrees.len() - max;
        entrees.drain(..surplus);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::noyau::evaluer;

    fn enr(expr: &str) -> Enregistrement {
        Enregistrement::nouveau(expr, &evaluer(expr))
    }

    #[test]
    fn json_a_plat() {
        let ok = serde_json::to_value(enr("2^3")).unwrap();
        assert_eq!(ok["expression"], "2^3");
        assert_eq!(ok["resultat"], "8");
        assert!(ok.get("erreur").is_none());

        let ko = serde_json::to_value(enr("1/0")).unwrap();
        assert_eq!(ko["erreur"], "division by zero");
        assert_eq!(ko["genre"], "DivisionByZero");
        assert_eq!(
            ko["suggestion"],
            "Check for division by zero in your expression."
        );
        assert!(ko.get("resultat").is_none());
    }

    #[test]
    fn aller_retour_fichier() {
        let dir = tempfile::tempdir().unwrap();
        let chemin = dir.path().join("sous").join("historique.json");

        let mut h = Historique::charger(&chemin, 10);
        assert!(h.is_empty());
        h.ajouter(enr("sqrt(16)")).unwrap();
        h.ajouter(enr("(2+3")).unwrap();
        assert!(chemin.is_file());

        let relu = Historique::charger(&chemin, 10);
        assert_eq!(relu.entrees(), h.entrees());
        assert!(matches!(
            relu.entrees()[1].issue,
            IssueEnregistree::Erreur { .. }
        ));
    }

    #[test]
    fn troncature_garde_les_plus_recentes() {
        let dir = tempfile::tempdir().unwrap();
        let chemin = dir.path().join("h.json");
        let mut h = Historique::charger(&chemin, 3);
        for i in 0..5 {
            h.ajouter(enr(&format!("{i} + 1"))).unwrap();
        }
        let exprs: Vec<&str> = h.entrees().iter().map(|e| e.expression.as_str()).collect();
        assert_eq!(exprs, ["2 + 1", "3 + 1", "4 + 1"]);

        // Un max plus petit au chargement tronque aussi.
        assert_eq!(Historique::charger(&chemin, 2).len(), 2);
    }

    #[test]
    fn fichier_corrompu_ignore() {
        let dir = tempfile::tempdir().unwrap();
        let chemin = dir.path().join("h.json");
        std::fs::write(&chemin, "{ pas du json").unwrap();

        let mut h = Historique::charger(&chemin, 10);
        assert!(h.is_empty());
        // Le prochain ajout réécrit un fichier valide.
        h.ajouter(enr("1+1")).unwrap();
        assert_eq!(Historique::charger(&chemin, 10).len(), 1);
    }

    #[test]
    fn effacer_et_memoire() {
        let dir = tempfile::tempdir().unwrap();
        let chemin = dir.path().join("h.json");
        let mut h = Historique::charger(&chemin, 10);
        h.ajouter(enr("1")).unwrap();
        h.effacer().unwrap();
        assert!(Historique::charger(&chemin, 10).is_empty());

        let mut m = Historique::en_memoire(2);
        m.ajouter(enr("1")).unwrap();
        assert_eq!(m.len(), 1);
        assert!(m.chemin().is_none());
    }

    #[test]
    fn ecriture_impossible_signalee() {
        let dir = tempfile::tempdir().unwrap();
        // Le "parent" est un fichier : création de dossier impossible.
        let bloque = dir.path().join("fichier");
        std::fs::write(&bloque, "x").unwrap();
        let mut h = Historique::charger(bloque.join("h.json"), 10);
        let r = h.ajouter(enr("1"));
        assert!(matches!(r, Err(ErreurHistorique::Io { .. })));
        assert_eq!(h.len(), 1);
    }

    #[test]
    fn resume_lisible() {
        assert_eq!(enr("2^3").resume(), "2^3 = 8");
        assert_eq!(enr("1/0").resume(), "1/0 ⚠ division by zero");
    }
}
