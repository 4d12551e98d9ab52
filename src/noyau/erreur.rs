// src/noyau/erreur.rs
//
// Erreurs du noyau.
// - ErreurSyntaxe : tout ce qui échoue AVANT l’exécution (jetons + analyse)
// - ErreurEval    : toutes les erreurs, chacune portant son genre (classement structurel)
//
// Le texte (Display) est celui montré à l’utilisateur : il doit rester stable.

use thiserror::Error;

use super::issue::GenreErreur;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ErreurSyntaxe {
    #[error("unexpected EOF while parsing")]
    FinInattendue,

    #[error("invalid syntax (column {colonne})")]
    Invalide { colonne: usize },

    #[error("invalid character '{caractere}' (U+{:04X})", point_code(.caractere))]
    CaractereInvalide { caractere: char, colonne: usize },

    #[error("invalid decimal literal (column {colonne})")]
    LitteralInvalide { colonne: usize },

    #[error("unterminated string literal (column {colonne})")]
    ChaineNonTerminee { colonne: usize },

    #[error("too many nested parentheses")]
    TropImbrique,
}

#[derive(Clone, Debug, PartialEq, Error)]
pub enum ErreurEval {
    #[error(transparent)]
    Syntaxe(#[from] ErreurSyntaxe),

    #[error("Use of {0} not allowed")]
    NomInterdit(String),

    #[error("{0}")]
    DivisionParZero(&'static str),

    /// Mauvais type d’opérande / d’argument, mauvaise arité.
    #[error("{0}")]
    Type(String),

    /// Argument hors domaine ("math domain error", séquence vide...).
    #[error("{0}")]
    Domaine(String),

    /// Dépassement flottant ou conversion impossible.
    #[error("{0}")]
    Depassement(String),

    #[error("'{type_nom}' object has no attribute '{attribut}'")]
    Attribut {
        type_nom: &'static str,
        attribut: String,
    },

    /// Garde-fou ressources (entiers géants, arbre trop profond...).
    #[error("{0}")]
    Limite(String),
}

fn point_code(c: &char) -> u32 {
    u32::from(*c)
}

impl ErreurEval {
    /// Genre de l’erreur, déterminé par la variante (jamais par le texte).
    pub fn genre(&self) -> GenreErreur {
        match self {
            ErreurEval::Syntaxe(_) => GenreErreur::Syntaxe,
            ErreurEval::NomInterdit(_) => GenreErreur::NomInterdit,
            ErreurEval::DivisionParZero(_) => GenreErreur::DivisionParZero,
            ErreurEval::Type(_)
            | ErreurEval::Domaine(_)
            | ErreurEval::Depassement(_)
            | ErreurEval::Attribut { .. }
            | ErreurEval::Limite(_) => GenreErreur::Autre,
        }
    }

    pub fn domaine() -> Self {
        ErreurEval::Domaine("math domain error".into())
    }

    pub fn plage() -> Self {
        ErreurEval::Depassement("math range error".into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn textes_syntaxe() {
        assert_eq!(
            ErreurSyntaxe::FinInattendue.to_string(),
            "unexpected EOF while parsing"
        );
        assert_eq!(
            ErreurSyntaxe::Invalide { colonne: 3 }.to_string(),
            "invalid syntax (column 3)"
        );
        assert_eq!(
            ErreurSyntaxe::CaractereInvalide {
                caractere: '√',
                colonne: 1
            }
            .to_string(),
            "invalid character '√' (U+221A)"
        );
    }

    #[test]
    fn genre_par_variante() {
        let e: ErreurEval = ErreurSyntaxe::TropImbrique.into();
        assert_eq!(e.genre(), GenreErreur::Syntaxe);
        assert_eq!(
            ErreurEval::DivisionParZero("division by zero").genre(),
            GenreErreur::DivisionParZero
        );
        assert_eq!(
            ErreurEval::NomInterdit("os".into()).to_string(),
            "Use of os not allowed"
        );
        assert_eq!(ErreurEval::domaine().genre(), GenreErreur::Autre);
    }
}
