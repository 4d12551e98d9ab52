// src/noyau/issue.rs
//
// Issue d’une évaluation : soit une valeur, soit un échec (genre + message + suggestion).
// Les deux variantes sont exclusives par construction.

use std::fmt;

use super::erreur::ErreurEval;
use super::valeur::Valeur;

/// Genre (grossier) d’un échec : choisit la suggestion montrée à l’utilisateur.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GenreErreur {
    DivisionParZero,
    Syntaxe,
    NomInterdit,
    Autre,
}

impl GenreErreur {
    #[cfg(test)]
    pub const TOUS: [GenreErreur; 4] = [
        GenreErreur::DivisionParZero,
        GenreErreur::Syntaxe,
        GenreErreur::NomInterdit,
        GenreErreur::Autre,
    ];

    /// Texte fixe affiché après le message d’erreur.
    pub fn suggestion(self) -> &'static str {
        match self {
            GenreErreur::DivisionParZero => "Check for division by zero in your expression.",
            GenreErreur::Syntaxe => {
                "Check parentheses and syntax; try adding missing parentheses."
            }
            GenreErreur::NomInterdit => "You used a function or name that is not allowed.",
            GenreErreur::Autre => "Check the expression for typos or unsupported functions.",
        }
    }

    /// Libellé court (journal).
    pub fn libelle(self) -> &'static str {
        match self {
            GenreErreur::DivisionParZero => "DivisionByZero",
            GenreErreur::Syntaxe => "SyntaxError",
            GenreErreur::NomInterdit => "DisallowedName",
            GenreErreur::Autre => "Other",
        }
    }
}

impl fmt::Display for GenreErreur {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.libelle())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Issue {
    Succes(Valeur),
    Echec {
        genre: GenreErreur,
        message: String,
        suggestion: &'static str,
    },
}

impl Issue {
    pub fn depuis_erreur(e: &ErreurEval) -> Self {
        let genre = e.genre();
        Issue::Echec {
            genre,
            message: e.to_string(),
            suggestion: genre.suggestion(),
        }
    }

    pub fn est_succes(&self) -> bool {
        matches!(self, Issue::Succes(_))
    }

    pub fn genre(&self) -> Option<GenreErreur> {
        match self {
            Issue::Succes(_) => None,
            Issue::Echec { genre, .. } => Some(*genre),
        }
    }

    /// Texte montré à l’utilisateur : la valeur, ou le message suivi de la suggestion.
    pub fn texte_utilisateur(&self) -> String {
        match self {
            Issue::Succes(v) => v.to_string(),
            Issue::Echec {
                message,
                suggestion,
                ..
            } => format!("{message}\n{suggestion}"),
        }
    }
}

impl From<Result<Valeur, ErreurEval>> for Issue {
    fn from(r: Result<Valeur, ErreurEval>) -> Self {
        match r {
            Ok(v) => Issue::Succes(v),
            Err(e) => Issue::depuis_erreur(&e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suggestions_exactes() {
        assert_eq!(
            GenreErreur::DivisionParZero.suggestion(),
            "Check for division by zero in your expression."
        );
        assert_eq!(
            GenreErreur::Syntaxe.suggestion(),
            "Check parentheses and syntax; try adding missing parentheses."
        );
        assert_eq!(
            GenreErreur::NomInterdit.suggestion(),
            "You used a function or name that is not allowed."
        );
        assert_eq!(
            GenreErreur::Autre.suggestion(),
            "Check the expression for typos or unsupported functions."
        );
    }

    #[test]
    fn echec_texte_message_puis_suggestion() {
        let i = Issue::depuis_erreur(&ErreurEval::DivisionParZero("division by zero"));
        assert!(!i.est_succes());
        assert_eq!(
            i.texte_utilisateur(),
            "division by zero\nCheck for division by zero in your expression."
        );
    }
}
