// src/noyau/autorises.rs
//
// Liste autorisée : la SEULE porte d’entrée vers des noms pendant l’évaluation.
//
// Contrats :
// - table statique, triée par nom, figée à la compilation (aucune introspection à l’exécution)
// - uniquement des constantes et des fonctions numériques pures (pas d’E/S, pas de processus)
// - un nom absent de la table ne peut JAMAIS être résolu

use std::fmt;

use super::erreur::ErreurEval;
use super::fonctions as f;
use super::valeur::Valeur;

pub type Implementation = fn(&Arguments<'_>) -> Result<Valeur, ErreurEval>;

#[derive(Clone, Copy)]
pub enum Liaison {
    Constante(f64),
    Fonction(Implementation),
}

pub struct Entree {
    pub nom: &'static str,
    pub liaison: Liaison,
}

impl fmt::Debug for Entree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let genre = match self.liaison {
            Liaison::Constante(_) => "constante",
            Liaison::Fonction(_) => "fonction",
        };
        write!(f, "Entree({} : {genre})", self.nom)
    }
}

/// Arguments d’un appel : positionnels + nommés (déjà évalués).
pub struct Arguments<'a> {
    pub nom: &'static str,
    pub positionnels: &'a [Valeur],
    pub nommes: &'a [(String, Valeur)],
}

const fn c(nom: &'static str, x: f64) -> Entree {
    Entree {
        nom,
        liaison: Liaison::Constante(x),
    }
}

const fn fx(nom: &'static str, imp: Implementation) -> Entree {
    Entree {
        nom,
        liaison: Liaison::Fonction(imp),
    }
}

/// Table triée (ordre des octets) : recherche par dichotomie.
pub static AUTORISES: &[Entree] = &[
    fx("abs", f::abs),
    fx("acos", f::acos),
    fx("acosh", f::acosh),
    fx("asin", f::asin),
    fx("asinh", f::asinh),
    fx("atan", f::atan),
    fx("atan2", f::atan2),
    fx("atanh", f::atanh),
    fx("cbrt", f::cbrt),
    fx("ceil", f::ceil),
    fx("comb", f::comb),
    fx("copysign", f::copysign),
    fx("cos", f::cos),
    fx("cosh", f::cosh),
    fx("degrees", f::degrees),
    fx("dist", f::dist),
    c("e", std::f64::consts::E),
    fx("erf", f::erf),
    fx("erfc", f::erfc),
    fx("exp", f::exp),
    fx("exp2", f::exp2),
    fx("expm1", f::expm1),
    fx("fabs", f::fabs),
    fx("factorial", f::factorial),
    fx("floor", f::floor),
    fx("fma", f::fma),
    fx("fmod", f::fmod),
    fx("frexp", f::frexp),
    fx("fsum", f::fsum),
    fx("gamma", f::gamma),
    fx("gcd", f::gcd),
    fx("hypot", f::hypot),
    c("inf", f64::INFINITY),
    fx("isclose", f::isclose),
    fx("isfinite", f::isfinite),
    fx("isinf", f::isinf),
    fx("isnan", f::isnan),
    fx("isqrt", f::isqrt),
    fx("lcm", f::lcm),
    fx("ldexp", f::ldexp),
    fx("lgamma", f::lgamma),
    fx("log", f::log),
    fx("log10", f::log10),
    fx("log1p", f::log1p),
    fx("log2", f::log2),
    fx("max", f::max),
    fx("min", f::min),
    fx("modf", f::modf),
    c("nan", f64::NAN),
    fx("nextafter", f::nextafter),
    fx("perm", f::perm),
    c("pi", std::f64::consts::PI),
    fx("pow", f::pow),
    fx("prod", f::prod),
    fx("radians", f::radians),
    fx("remainder", f::remainder),
    fx("round", f::round),
    fx("sin", f::sin),
    fx("sinh", f::sinh),
    fx("sqrt", f::sqrt),
    fx("sumprod", f::sumprod),
    fx("tan", f::tan),
    fx("tanh", f::tanh),
    c("tau", std::f64::consts::TAU),
    fx("trunc", f::trunc),
    fx("ulp", f::ulp),
];

/// Cherche un nom dans la liste autorisée.
pub fn chercher(nom: &str) -> Option<&'static Entree> {
    AUTORISES
        .binary_search_by(|e| e.nom.cmp(nom))
        .ok()
        .map(|i| &AUTORISES[i])
}

pub fn est_autorise(nom: &str) -> bool {
    chercher(nom).is_some()
}

/// Tous les noms autorisés (ordre de la table).
#[cfg(test)]
pub fn noms() -> impl Iterator<Item = &'static str> {
    AUTORISES.iter().map(|e| e.nom)
}

impl Entree {
    /// Valeur du nom lorsqu’il est référencé sans appel.
    pub fn valeur(&'static self) -> Valeur {
        match self.liaison {
            Liaison::Constante(x) => Valeur::Reel(x),
            Liaison::Fonction(_) => Valeur::Fonction(self),
        }
    }

    /// Appel de la fonction liée.
    pub fn appeler(
        &'static self,
        positionnels: &[Valeur],
        nommes: &[(String, Valeur)],
    ) -> Result<Valeur, ErreurEval> {
        match self.liaison {
            Liaison::Fonction(imp) => imp(&Arguments {
                nom: self.nom,
                positionnels,
                nommes,
            }),
            Liaison::Constante(_) => Err(ErreurEval::Type("'float' object is not callable".into())),
        }
    }
}

/// Appelle une valeur (seules les fonctions autorisées sont appelables).
pub fn appeler_valeur(
    cible: &Valeur,
    positionnels: &[Valeur],
    nommes: &[(String, Valeur)],
) -> Result<Valeur, ErreurEval> {
    match cible {
        Valeur::Fonction(e) => e.appeler(positionnels, nommes),
        autre => Err(ErreurEval::Type(format!(
            "'{}' object is not callable",
            autre.type_nom()
        ))),
    }
}

/* ------------------------ Contrôle des arguments ------------------------ */

fn pluriel(n: usize) -> &'static str {
    if n == 1 {
        ""
    } else {
        "s"
    }
}

impl<'a> Arguments<'a> {
    /// Refuse tout argument nommé hors de `permis`.
    pub fn nommes_permis(&self, permis: &[&str]) -> Result<(), ErreurEval> {
        for (k, _) in self.nommes {
            if permis.is_empty() {
                return Err(ErreurEval::Type(format!(
                    "{}() takes no keyword arguments",
                    self.nom
                )));
            }
            if !permis.contains(&k.as_str()) {
                return Err(ErreurEval::Type(format!(
                    "'{k}' is an invalid keyword argument for {}()",
                    self.nom
                )));
            }
        }
        Ok(())
    }

    pub fn nomme(&self, cle: &str) -> Option<&'a Valeur> {
        self.nommes.iter().find(|(k, _)| k == cle).map(|(_, v)| v)
    }

    /// Exactement `n` positionnels, aucun nommé.
    pub fn exactement(&self, n: usize) -> Result<&'a [Valeur], ErreurEval> {
        self.nommes_permis(&[])?;
        self.positionnels_exactement(n)
    }

    /// Exactement `n` positionnels (les nommés sont vérifiés par l’appelant).
    pub fn positionnels_exactement(&self, n: usize) -> Result<&'a [Valeur], ErreurEval> {
        let m = self.positionnels.len();
        if m != n {
            return Err(ErreurEval::Type(format!(
                "{}() takes exactly {n} argument{} ({m} given)",
                self.nom,
                pluriel(n)
            )));
        }
        Ok(self.positionnels)
    }

    /// Entre `min` et `max` positionnels.
    pub fn entre(&self, min: usize, max: usize) -> Result<&'a [Valeur], ErreurEval> {
        let m = self.positionnels.len();
        if m < min || m > max {
            return Err(ErreurEval::Type(format!(
                "{}() takes from {min} to {max} arguments ({m} given)",
                self.nom
            )));
        }
        Ok(self.positionnels)
    }

    /// Au moins `min` positionnels.
    pub fn au_moins(&self, min: usize) -> Result<&'a [Valeur], ErreurEval> {
        let m = self.positionnels.len();
        if m < min {
            return Err(ErreurEval::Type(format!(
                "{}() expected at least {min} argument{}, got {m}",
                self.nom,
                pluriel(min)
            )));
        }
        Ok(self.positionnels)
    }
}
