//! Noyau d’évaluation sûre
//!
//! Organisation interne :
//! - jetons.rs     : tokenisation
//! - analyse.rs    : descente récursive -> Expr (compilation sans exécution)
//! - expr.rs       : AST + noms libres + profondeur
//! - autorises.rs  : liste autorisée (table statique triée)
//! - fonctions.rs  : implémentations des fonctions autorisées
//! - operations.rs : opérateurs (+ - * / // % **, comparaisons)
//! - valeur.rs     : valeurs et leur affichage
//! - erreur.rs     : erreurs typées, classées par variante
//! - issue.rs      : issue d’évaluation (valeur | genre + message + suggestion)
//! - eval.rs       : pipeline complet

pub mod analyse;
pub mod autorises;
pub mod erreur;
pub mod eval;
pub mod expr;
pub mod fonctions;
pub mod issue;
pub mod jetons;
pub mod operations;
pub mod valeur;

/// Garde-fous de ressources (dépassement => échec `Other`, jamais de blocage).
pub mod limites {
    /// Taille maximale d’un entier résultat, en bits.
    pub const MAX_BITS_ENTIER: u64 = 1_000_000;
    /// Argument maximal de factorial / comb / perm.
    pub const MAX_ARGUMENT_COMBINATOIRE: u64 = 10_000;
    /// Longueur maximale d’une séquence construite par + ou *.
    pub const MAX_REPETITION: usize = 100_000;
    /// Profondeur maximale de l’AST avant exécution.
    pub const MAX_PROFONDEUR_ARBRE: usize = 1_000;
    /// Longueur maximale de l’entrée, en caractères.
    pub const MAX_LONGUEUR_ENTREE: usize = 10_000;
}

#[cfg(test)]
mod tests_proprietes;

#[cfg(test)]
mod tests_securite;

#[cfg(test)]
mod tests_fuzz_safe;

// API publique minimale
pub use eval::{evaluer, evaluer_detaille, Demarche};
pub use issue::{GenreErreur, Issue};
pub use valeur::Valeur;
