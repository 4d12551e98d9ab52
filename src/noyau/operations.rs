// src/noyau/operations.rs
//
// Opérateurs du langage d’expressions.
// - arithmétique : entiers exacts tant que possible, bascule en flottant sinon
// - / donne toujours un flottant (arrondi correct même pour de grands entiers)
// - // et % suivent la division "plancher" (signe du diviseur pour %)
// - comparaisons chaînables, égalité numérique inter-types (1 == 1.0 == True)
//
// Garde-fous : entiers bornés en bits, répétitions de séquences bornées.

use std::cmp::Ordering;

use num_bigint::BigInt;
use num_integer::Integer;
use num_rational::BigRational;
use num_traits::{FromPrimitive, Signed, ToPrimitive, Zero};

use super::erreur::ErreurEval;
use super::expr::{OpBinaire, OpComparaison, OpUnaire};
use super::limites::{MAX_BITS_ENTIER, MAX_REPETITION};
use super::valeur::{entier_en_reel, Nombre, Valeur};

type R = Result<Valeur, ErreurEval>;

fn non_supporte(op: &str, a: &Valeur, b: &Valeur) -> ErreurEval {
    ErreurEval::Type(format!(
        "unsupported operand type(s) for {op}: '{}' and '{}'",
        a.type_nom(),
        b.type_nom()
    ))
}

pub fn verifier_bits(n: &BigInt) -> Result<(), ErreurEval> {
    if n.bits() > MAX_BITS_ENTIER {
        return Err(ErreurEval::Limite("integer result too large".into()));
    }
    Ok(())
}

pub fn entier_borne(n: BigInt) -> R {
    verifier_bits(&n)?;
    Ok(Valeur::Entier(n))
}

fn trop_longue() -> ErreurEval {
    ErreurEval::Limite("sequence too long".into())
}

/// Construit une séquence élément par élément, poids total borné.
pub fn sequence_bornee(
    elements: impl IntoIterator<Item = Result<Valeur, ErreurEval>>,
) -> Result<Vec<Valeur>, ErreurEval> {
    let mut poids = 0usize;
    let mut v = Vec::new();
    for e in elements {
        let e = e?;
        poids = poids.saturating_add(1).saturating_add(e.poids());
        if poids > MAX_REPETITION {
            return Err(trop_longue());
        }
        v.push(e);
    }
    Ok(v)
}

/* ------------------------------ Unaires ------------------------------ */

pub fn unaire(op: OpUnaire, v: &Valeur) -> R {
    match (op, v.nombre()) {
        (OpUnaire::Plus, Some(n)) => Ok(n.en_valeur()),
        (OpUnaire::Moins, Some(Nombre::Entier(n))) => Ok(Valeur::Entier(-n)),
        (OpUnaire::Moins, Some(Nombre::Reel(x))) => Ok(Valeur::Reel(-x)),
        (op, None) => {
            let s = match op {
                OpUnaire::Plus => "+",
                OpUnaire::Moins => "-",
            };
            Err(ErreurEval::Type(format!(
                "bad operand type for unary {s}: '{}'",
                v.type_nom()
            )))
        }
    }
}

/* ------------------------------ Binaires ----------------------------- */

pub fn binaire(op: OpBinaire, a: &Valeur, b: &Valeur) -> R {
    match op {
        OpBinaire::Add => addition(a, b),
        OpBinaire::Mul => multiplication(a, b),
        _ => {
            let (x, y) = match (a.nombre(), b.nombre()) {
                (Some(x), Some(y)) => (x, y),
                _ => return Err(non_supporte(op.symbole(), a, b)),
            };
            numerique(op, x, y)
        }
    }
}

fn addition(a: &Valeur, b: &Valeur) -> R {
    match (a, b) {
        (Valeur::Texte(x), Valeur::Texte(y)) => {
            if a.poids().saturating_add(b.poids()) > MAX_REPETITION {
                return Err(trop_longue());
            }
            Ok(Valeur::Texte(format!("{x}{y}")))
        }
        (Valeur::Tuple(x), Valeur::Tuple(y)) => Ok(Valeur::Tuple(concat(x, y)?)),
        (Valeur::Liste(x), Valeur::Liste(y)) => Ok(Valeur::Liste(concat(x, y)?)),
        _ => match (a.nombre(), b.nombre()) {
            (Some(x), Some(y)) => numerique(OpBinaire::Add, x, y),
            _ => Err(non_supporte("+", a, b)),
        },
    }
}

fn concat(x: &[Valeur], y: &[Valeur]) -> Result<Vec<Valeur>, ErreurEval> {
    sequence_bornee(x.iter().chain(y).cloned().map(Ok))
}

fn est_sequence(v: &Valeur) -> bool {
    matches!(v, Valeur::Texte(_) | Valeur::Tuple(_) | Valeur::Liste(_))
}

fn est_entier(v: &Valeur) -> bool {
    matches!(v, Valeur::Entier(_) | Valeur::Booleen(_))
}

fn multiplication(a: &Valeur, b: &Valeur) -> R {
    if est_sequence(a) && est_entier(b) {
        return repetition(a, &b.en_entier()?);
    }
    if est_entier(a) && est_sequence(b) {
        return repetition(b, &a.en_entier()?);
    }
    match (a.nombre(), b.nombre()) {
        (Some(x), Some(y)) => numerique(OpBinaire::Mul, x, y),
        _ => Err(non_supporte("*", a, b)),
    }
}

/// "ab" * 3, (1, 2) * 2, [0] * 4 ; un facteur négatif donne une séquence vide.
/// La borne porte sur le poids total, éléments imbriqués compris.
fn repetition(seq: &Valeur, n: &BigInt) -> R {
    let fois = if n.is_negative() {
        0
    } else {
        n.to_usize().unwrap_or(usize::MAX)
    };
    let poids = seq.poids();
    if poids > 0 && fois > MAX_REPETITION / poids {
        return Err(trop_longue());
    }
    let repeter = |v: &[Valeur]| -> Vec<Valeur> {
        if v.is_empty() {
            return Vec::new();
        }
        let mut r = Vec::with_capacity(v.len() * fois);
        for _ in 0..fois {
            r.extend(v.iter().cloned());
        }
        r
    };
    Ok(match seq {
        Valeur::Texte(s) => Valeur::Texte(s.repeat(fois)),
        Valeur::Tuple(v) => Valeur::Tuple(repeter(v)),
        Valeur::Liste(v) => Valeur::Liste(repeter(v)),
        autre => autre.clone(),
    })
}

/// Arithmétique sur deux nombres (bool déjà converti).
pub fn numerique(op: OpBinaire, a: Nombre, b: Nombre) -> R {
    use Nombre::{Entier, Reel};

    match (a, b) {
        (Entier(x), Entier(y)) => entiers(op, x, y),
        (x @ Reel(_), y) | (x, y @ Reel(_)) => reels(op, x.en_reel()?, y.en_reel()?),
    }
}

fn entiers(op: OpBinaire, x: BigInt, y: BigInt) -> R {
    match op {
        OpBinaire::Add => entier_borne(x + y),
        OpBinaire::Sub => entier_borne(x - y),
        OpBinaire::Mul => {
            if x.bits() + y.bits() > MAX_BITS_ENTIER + 1 {
                return Err(ErreurEval::Limite("integer result too large".into()));
            }
            entier_borne(x * y)
        }
        OpBinaire::Div => division_entiere_exacte(&x, &y),
        OpBinaire::DivEntiere => {
            if y.is_zero() {
                return Err(ErreurEval::DivisionParZero(
                    "integer division or modulo by zero",
                ));
            }
            Ok(Valeur::Entier(x.div_floor(&y)))
        }
        OpBinaire::Modulo => {
            if y.is_zero() {
                return Err(ErreurEval::DivisionParZero(
                    "integer division or modulo by zero",
                ));
            }
            Ok(Valeur::Entier(x.mod_floor(&y)))
        }
        OpBinaire::Puissance => puissance_entiere(x, y),
    }
}

/// int / int : quotient exact arrondi une seule fois vers le flottant le plus proche.
fn division_entiere_exacte(x: &BigInt, y: &BigInt) -> R {
    if y.is_zero() {
        return Err(ErreurEval::DivisionParZero("division by zero"));
    }
    // Cas courant : les deux opérandes sont exacts en f64.
    if let (Some(a), Some(b)) = (petit_exact(x), petit_exact(y)) {
        return Ok(Valeur::Reel(a / b));
    }
    let q = BigRational::new(x.clone(), y.clone());
    match q.to_f64() {
        Some(v) if v.is_finite() => Ok(Valeur::Reel(v)),
        _ => Err(ErreurEval::Depassement(
            "integer division result too large for a float".into(),
        )),
    }
}

/// Entier représentable exactement en f64 (|n| <= 2^53).
fn petit_exact(n: &BigInt) -> Option<f64> {
    if n.bits() <= 53 {
        n.to_f64()
    } else {
        None
    }
}

fn puissance_entiere(base: BigInt, exposant: BigInt) -> R {
    if exposant.is_negative() {
        if base.is_zero() {
            return Err(ErreurEval::DivisionParZero(
                "0.0 cannot be raised to a negative power",
            ));
        }
        return reels(
            OpBinaire::Puissance,
            entier_en_reel(&base)?,
            entier_en_reel(&exposant)?,
        );
    }

    // Bases triviales : exposant quelconque.
    let un = BigInt::from(1);
    if base.is_zero() {
        return Ok(Valeur::Entier(if exposant.is_zero() { un } else { base }));
    }
    if base == un {
        return Ok(Valeur::Entier(un));
    }
    if base == -un.clone() {
        return Ok(Valeur::Entier(if exposant.is_even() { un } else { base }));
    }

    let trop_grand = || ErreurEval::Limite("exponent too large".into());
    let e = match exposant.to_u64() {
        Some(e) if base.bits().saturating_mul(e) <= MAX_BITS_ENTIER => e,
        _ => return Err(trop_grand()),
    };
    let e = u32::try_from(e).map_err(|_| trop_grand())?;
    Ok(Valeur::Entier(base.pow(e)))
}

fn reels(op: OpBinaire, x: f64, y: f64) -> R {
    let r = match op {
        OpBinaire::Add => x + y,
        OpBinaire::Sub => x - y,
        OpBinaire::Mul => x * y,
        OpBinaire::Div => {
            if y == 0.0 {
                return Err(ErreurEval::DivisionParZero("float division by zero"));
            }
            x / y
        }
        OpBinaire::DivEntiere => {
            if y == 0.0 {
                return Err(ErreurEval::DivisionParZero("float floor division by zero"));
            }
            divmod_reel(x, y).0
        }
        OpBinaire::Modulo => {
            if y == 0.0 {
                return Err(ErreurEval::DivisionParZero("float modulo by zero"));
            }
            divmod_reel(x, y).1
        }
        OpBinaire::Puissance => return puissance_reelle(x, y),
    };
    Ok(Valeur::Reel(r))
}

/// Quotient plancher et reste (signe du diviseur), en flottants.
pub fn divmod_reel(x: f64, y: f64) -> (f64, f64) {
    let mut reste = x % y;
    let mut div = (x - reste) / y;
    if reste != 0.0 {
        if (y < 0.0) != (reste < 0.0) {
            reste += y;
            div -= 1.0;
        }
    } else {
        reste = 0.0f64.copysign(y);
    }
    let plancher = if div != 0.0 {
        let mut p = div.floor();
        if div - p > 0.5 {
            p += 1.0;
        }
        p
    } else {
        0.0f64.copysign(x / y)
    };
    (plancher, reste)
}

pub fn puissance_reelle(x: f64, y: f64) -> R {
    if x == 0.0 && y < 0.0 {
        return Err(ErreurEval::DivisionParZero(
            "0.0 cannot be raised to a negative power",
        ));
    }
    if x < 0.0 && y.is_finite() && y.fract() != 0.0 {
        return Err(ErreurEval::Domaine(
            "negative number cannot be raised to a fractional power".into(),
        ));
    }
    let r = x.powf(y);
    if r.is_infinite() && x.is_finite() && y.is_finite() {
        return Err(ErreurEval::Depassement(
            "Numerical result out of range".into(),
        ));
    }
    Ok(Valeur::Reel(r))
}

/* ----------------------------- Comparaisons ---------------------------- */

/// Égalité du langage (1 == 1.0, NaN != NaN, types sans rapport -> faux).
pub fn egaux(a: &Valeur, b: &Valeur) -> bool {
    if let (Some(x), Some(y)) = (a.nombre(), b.nombre()) {
        return ordre_nombres(&x, &y) == Some(Ordering::Equal);
    }
    match (a, b) {
        (Valeur::Texte(x), Valeur::Texte(y)) => x == y,
        (Valeur::Rien, Valeur::Rien) => true,
        (Valeur::Tuple(x), Valeur::Tuple(y)) | (Valeur::Liste(x), Valeur::Liste(y)) => {
            x.len() == y.len() && x.iter().zip(y).all(|(u, v)| egaux(u, v))
        }
        (Valeur::Fonction(x), Valeur::Fonction(y)) => x.nom == y.nom,
        _ => false,
    }
}

/// Ordre exact entre deux nombres (None si NaN).
fn ordre_nombres(a: &Nombre, b: &Nombre) -> Option<Ordering> {
    match (a, b) {
        (Nombre::Entier(x), Nombre::Entier(y)) => Some(x.cmp(y)),
        (Nombre::Reel(x), Nombre::Reel(y)) => x.partial_cmp(y),
        (Nombre::Entier(n), Nombre::Reel(x)) => ordre_entier_reel(n, *x),
        (Nombre::Reel(x), Nombre::Entier(n)) => ordre_entier_reel(n, *x).map(Ordering::reverse),
    }
}

/// Compare un entier exact à un flottant sans perte (2**53 + 1 > 2.0**53).
fn ordre_entier_reel(n: &BigInt, x: f64) -> Option<Ordering> {
    if x.is_nan() {
        return None;
    }
    if x.is_infinite() {
        return Some(if x > 0.0 { Ordering::Less } else { Ordering::Greater });
    }
    let plancher = x.floor();
    let p = BigInt::from_f64(plancher)?;
    match n.cmp(&p) {
        Ordering::Equal if x > plancher => Some(Ordering::Less),
        o => Some(o),
    }
}

/// Ordre (<, <=, >, >=) : nombres, textes, séquences de même nature.
fn ordre(a: &Valeur, b: &Valeur, op: OpComparaison) -> Result<Option<Ordering>, ErreurEval> {
    if let (Some(x), Some(y)) = (a.nombre(), b.nombre()) {
        return Ok(ordre_nombres(&x, &y));
    }
    match (a, b) {
        (Valeur::Texte(x), Valeur::Texte(y)) => Ok(Some(x.cmp(y))),
        (Valeur::Tuple(x), Valeur::Tuple(y)) | (Valeur::Liste(x), Valeur::Liste(y)) => {
            for (u, v) in x.iter().zip(y) {
                if !egaux(u, v) {
                    return ordre(u, v, op);
                }
            }
            Ok(Some(x.len().cmp(&y.len())))
        }
        _ => Err(ErreurEval::Type(format!(
            "'{}' not supported between instances of '{}' and '{}'",
            op.symbole(),
            a.type_nom(),
            b.type_nom()
        ))),
    }
}

pub fn comparer(op: OpComparaison, a: &Valeur, b: &Valeur) -> Result<bool, ErreurEval> {
    use Ordering::*;

    Ok(match op {
        OpComparaison::Egal => egaux(a, b),
        OpComparaison::Different => !egaux(a, b),
        OpComparaison::Inf => ordre(a, b, op)? == Some(Less),
        OpComparaison::InfEgal => matches!(ordre(a, b, op)?, Some(Less | Equal)),
        OpComparaison::Sup => ordre(a, b, op)? == Some(Greater),
        OpComparaison::SupEgal => matches!(ordre(a, b, op)?, Some(Greater | Equal)),
    })
}
