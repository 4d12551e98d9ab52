// src/noyau/valeur.rs
//
// Valeurs manipulées par l’évaluation.
// - Entier : entier exact (BigInt), jamais arrondi
// - Reel   : flottant IEEE-754
// - Booleen: se comporte comme 0/1 en arithmétique
// - Texte / Tuple / Liste / Rien : présents pour fidélité du langage, rarement utiles
// - Fonction : un nom autorisé évalué sans être appelé ("sqrt")
//
// Display = forme "repr" (ce que voit l’utilisateur et ce qui part dans l’historique).

use std::fmt;

use num_bigint::BigInt;
use num_traits::{FromPrimitive, ToPrimitive, Zero};

use super::autorises::Entree;
use super::erreur::ErreurEval;

#[derive(Clone, Debug)]
pub enum Valeur {
    Entier(BigInt),
    Reel(f64),
    Booleen(bool),
    Texte(String),
    Rien,
    Tuple(Vec<Valeur>),
    Liste(Vec<Valeur>),
    Fonction(&'static Entree),
}

/// Nombre "numérique" vu par l’arithmétique (bool déjà converti en entier).
#[derive(Clone, Debug)]
pub enum Nombre {
    Entier(BigInt),
    Reel(f64),
}

impl PartialEq for Valeur {
    /// Égalité structurelle (tests, idempotence) : NaN == NaN ici, contrairement à `==` du langage.
    fn eq(&self, other: &Self) -> bool {
        use Valeur::*;
        match (self, other) {
            (Entier(a), Entier(b)) => a == b,
            (Reel(a), Reel(b)) => a.to_bits() == b.to_bits() || (a.is_nan() && b.is_nan()),
            (Booleen(a), Booleen(b)) => a == b,
            (Texte(a), Texte(b)) => a == b,
            (Rien, Rien) => true,
            (Tuple(a), Tuple(b)) | (Liste(a), Liste(b)) => a == b,
            (Fonction(a), Fonction(b)) => a.nom == b.nom,
            _ => false,
        }
    }
}

impl Valeur {
    /// Nom du type, pour les messages ("must be real number, not str").
    pub fn type_nom(&self) -> &'static str {
        match self {
            Valeur::Entier(_) => "int",
            Valeur::Reel(_) => "float",
            Valeur::Booleen(_) => "bool",
            Valeur::Texte(_) => "str",
            Valeur::Rien => "NoneType",
            Valeur::Tuple(_) => "tuple",
            Valeur::Liste(_) => "list",
            Valeur::Fonction(_) => "builtin_function_or_method",
        }
    }

    /// Vérité (not / and / or).
    pub fn est_vrai(&self) -> bool {
        match self {
            Valeur::Entier(n) => !n.is_zero(),
            Valeur::Reel(x) => *x != 0.0,
            Valeur::Booleen(b) => *b,
            Valeur::Texte(s) => !s.is_empty(),
            Valeur::Rien => false,
            Valeur::Tuple(v) | Valeur::Liste(v) => !v.is_empty(),
            Valeur::Fonction(_) => true,
        }
    }

    /// Vue numérique (None si ce n’est pas un nombre).
    pub fn nombre(&self) -> Option<Nombre> {
        match self {
            Valeur::Entier(n) => Some(Nombre::Entier(n.clone())),
            Valeur::Booleen(b) => Some(Nombre::Entier(BigInt::from(u8::from(*b)))),
            Valeur::Reel(x) => Some(Nombre::Reel(*x)),
            _ => None,
        }
    }

    /// Conversion en flottant (arguments des fonctions math).
    pub fn en_reel(&self) -> Result<f64, ErreurEval> {
        match self.nombre() {
            Some(Nombre::Reel(x)) => Ok(x),
            Some(Nombre::Entier(n)) => entier_en_reel(&n),
            None => Err(ErreurEval::Type(format!(
                "must be real number, not {}",
                self.type_nom()
            ))),
        }
    }

    /// Conversion en entier exact (factorial, gcd, ldexp...). Les flottants sont refusés.
    pub fn en_entier(&self) -> Result<BigInt, ErreurEval> {
        match self.nombre() {
            Some(Nombre::Entier(n)) => Ok(n),
            _ => Err(ErreurEval::Type(format!(
                "'{}' object cannot be interpreted as an integer",
                self.type_nom()
            ))),
        }
    }

    /// Éléments d’un itérable (tuple, liste, texte).
    pub fn elements(&self) -> Result<Vec<Valeur>, ErreurEval> {
        match self {
            Valeur::Tuple(v) | Valeur::Liste(v) => Ok(v.clone()),
            Valeur::Texte(s) => Ok(s.chars().map(|c| Valeur::Texte(c.to_string())).collect()),
            _ => Err(ErreurEval::Type(format!(
                "'{}' object is not iterable",
                self.type_nom()
            ))),
        }
    }

    /// Nombre de cellules stockées : chaque élément compte 1 plus son propre contenu,
    /// un texte compte ses caractères, un scalaire ne compte rien.
    pub fn poids(&self) -> usize {
        match self {
            Valeur::Texte(s) => s.chars().count(),
            Valeur::Tuple(v) | Valeur::Liste(v) => v
                .iter()
                .fold(0usize, |acc, e| acc.saturating_add(1).saturating_add(e.poids())),
            _ => 0,
        }
    }

    #[cfg(test)]
    pub fn approx(&self) -> Option<f64> {
        match self.nombre()? {
            Nombre::Reel(x) => Some(x),
            Nombre::Entier(n) => n.to_f64(),
        }
    }
}

impl Nombre {
    pub fn en_valeur(self) -> Valeur {
        match self {
            Nombre::Entier(n) => Valeur::Entier(n),
            Nombre::Reel(x) => Valeur::Reel(x),
        }
    }

    pub fn en_reel(&self) -> Result<f64, ErreurEval> {
        match self {
            Nombre::Reel(x) => Ok(*x),
            Nombre::Entier(n) => entier_en_reel(n),
        }
    }
}

/// int -> float ; trop grand => dépassement.
pub fn entier_en_reel(n: &BigInt) -> Result<f64, ErreurEval> {
    match n.to_f64() {
        Some(x) if x.is_finite() => Ok(x),
        _ => Err(ErreurEval::Depassement(
            "int too large to convert to float".into(),
        )),
    }
}

/// float -> int (troncature), refusé pour inf / nan.
pub fn reel_en_entier(x: f64) -> Result<BigInt, ErreurEval> {
    if x.is_nan() {
        return Err(ErreurEval::Domaine(
            "cannot convert float NaN to integer".into(),
        ));
    }
    if x.is_infinite() {
        return Err(ErreurEval::Depassement(
            "cannot convert float infinity to integer".into(),
        ));
    }
    // Un f64 fini est toujours représentable en BigInt.
    BigInt::from_f64(x.trunc()).ok_or_else(|| {
        ErreurEval::Depassement("cannot convert float infinity to integer".into())
    })
}

/// Repr d’un flottant : "8.0", "0.1", "1e+16", "1e-05", "inf", "nan".
pub fn format_reel(x: f64) -> String {
    if x.is_nan() {
        return "nan".into();
    }
    if x.is_infinite() {
        return if x > 0.0 { "inf".into() } else { "-inf".into() };
    }

    let a = x.abs();
    if a == 0.0 || (1e-4..1e16).contains(&a) {
        // Plus courte forme aller-retour, avec ".0" pour les valeurs entières.
        let s = format!("{x}");
        if s.contains('.') {
            s
        } else {
            format!("{s}.0")
        }
    } else {
        // "1e16" -> "1e+16", "1.5e-5" -> "1.5e-05"
        let s = format!("{x:e}");
        let (mantisse, exposant) = s.split_once('e').unwrap_or((s.as_str(), "0"));
        let (signe, chiffres) = match exposant.strip_prefix('-') {
            Some(c) => ('-', c),
            None => ('+', exposant),
        };
        format!("{mantisse}e{signe}{chiffres:0>2}")
    }
}

fn format_texte(s: &str, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    // Apostrophes par défaut, guillemets si le texte contient une apostrophe.
    let quote = if s.contains('\'') && !s.contains('"') {
        '"'
    } else {
        '\''
    };
    write!(f, "{quote}")?;
    for c in s.chars() {
        match c {
            '\\' => f.write_str("\\\\")?,
            '\n' => f.write_str("\\n")?,
            '\t' => f.write_str("\\t")?,
            c if c == quote => write!(f, "\\{c}")?,
            c => write!(f, "{c}")?,
        }
    }
    write!(f, "{quote}")
}

fn format_elements(v: &[Valeur], f: &mut fmt::Formatter<'_>) -> fmt::Result {
    for (i, x) in v.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{x}")?;
    }
    Ok(())
}

impl fmt::Display for Valeur {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Valeur::Entier(n) => write!(f, "{n}"),
            Valeur::Reel(x) => f.write_str(&format_reel(*x)),
            Valeur::Booleen(true) => f.write_str("True"),
            Valeur::Booleen(false) => f.write_str("False"),
            Valeur::Texte(s) => format_texte(s, f),
            Valeur::Rien => f.write_str("None"),
            Valeur::Tuple(v) => {
                f.write_str("(")?;
                format_elements(v, f)?;
                if v.len() == 1 {
                    f.write_str(",")?;
                }
                f.write_str(")")
            }
            Valeur::Liste(v) => {
                f.write_str("[")?;
                format_elements(v, f)?;
                f.write_str("]")
            }
            Valeur::Fonction(e) => write!(f, "<built-in function {}>", e.nom),
        }
    }
}

impl From<f64> for Valeur {
    fn from(x: f64) -> Self {
        Valeur::Reel(x)
    }
}

impl From<BigInt> for Valeur {
    fn from(n: BigInt) -> Self {
        Valeur::Entier(n)
    }
}

impl From<i64> for Valeur {
    fn from(n: i64) -> Self {
        Valeur::Entier(BigInt::from(n))
    }
}

impl From<bool> for Valeur {
    fn from(b: bool) -> Self {
        Valeur::Booleen(b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repr_reels() {
        assert_eq!(format_reel(8.0), "8.0");
        assert_eq!(format_reel(0.1), "0.1");
        assert_eq!(format_reel(-2.5), "-2.5");
        assert_eq!(format_reel(1e16), "1e+16");
        assert_eq!(format_reel(1.5e-5), "1.5e-05");
        assert_eq!(format_reel(1e-4), "0.0001");
        assert_eq!(format_reel(f64::INFINITY), "inf");
        assert_eq!(format_reel(f64::NAN), "nan");
        assert_eq!(format_reel(-0.0), "-0.0");
    }

    #[test]
    fn repr_composites() {
        let t = Valeur::Tuple(vec![Valeur::Reel(0.5), Valeur::from(1)]);
        assert_eq!(t.to_string(), "(0.5, 1)");
        assert_eq!(Valeur::Tuple(vec![Valeur::from(1)]).to_string(), "(1,)");
        assert_eq!(Valeur::Texte("it's".into()).to_string(), "\"it's\"");
        assert_eq!(Valeur::Booleen(true).to_string(), "True");
    }

    #[test]
    fn conversions() {
        assert_eq!(Valeur::Booleen(true).en_reel().unwrap(), 1.0);
        let gros = Valeur::Entier(BigInt::from(10).pow(400));
        assert!(matches!(gros.en_reel(), Err(ErreurEval::Depassement(_))));
        assert!(matches!(
            Valeur::Texte("a".into()).en_reel(),
            Err(ErreurEval::Type(_))
        ));
        assert_eq!(reel_en_entier(-2.7).unwrap(), BigInt::from(-2));
        assert!(reel_en_entier(f64::NAN).is_err());
    }

    #[test]
    fn poids_imbrique() {
        let zeros = Valeur::Liste(vec![Valeur::from(0); 3]);
        assert_eq!(zeros.poids(), 3);
        assert_eq!(Valeur::Liste(vec![zeros.clone(), zeros]).poids(), 8);
        assert_eq!(Valeur::Tuple(vec![Valeur::Liste(vec![])]).poids(), 1);
        assert_eq!(Valeur::Texte("abc".into()).poids(), 3);
        assert_eq!(Valeur::from(7).poids(), 0);
    }
}
