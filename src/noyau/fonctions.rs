// src/noyau/fonctions.rs
//
// Implémentations des fonctions de la liste autorisée.
//
// Règles communes (fonctions réelles) :
// - NaN obtenu à partir d’arguments non-NaN  => "math domain error"
// - infini obtenu à partir d’arguments finis => "math range error"
// - les pôles (log(0), gamma(-2), atanh(1)...) sont refusés AVANT le calcul
//
// Fonctions entières (factorial, comb, perm, gcd, lcm, isqrt) : entiers exacts uniquement.

use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{One, Signed, ToPrimitive, Zero};

use super::autorises::{appeler_valeur, Arguments};
use super::erreur::ErreurEval;
use super::expr::{OpBinaire, OpComparaison};
use super::limites::{MAX_ARGUMENT_COMBINATOIRE, MAX_BITS_ENTIER};
use super::operations::{binaire, comparer, entier_borne, verifier_bits};
use super::valeur::{reel_en_entier, Nombre, Valeur};

type R = Result<Valeur, ErreurEval>;

/* ------------------------------ Outils ------------------------------ */

/// Vérifie le résultat d’un calcul réel selon les règles domaine / plage.
fn verifier(entrees: &[f64], r: f64) -> Result<f64, ErreurEval> {
    if r.is_nan() && !entrees.iter().any(|x| x.is_nan()) {
        return Err(ErreurEval::domaine());
    }
    if r.is_infinite() && entrees.iter().all(|x| x.is_finite()) {
        return Err(ErreurEval::plage());
    }
    Ok(r)
}

fn reel_unaire(a: &Arguments<'_>, f: fn(f64) -> f64) -> R {
    let x = a.exactement(1)?[0].en_reel()?;
    Ok(Valeur::Reel(verifier(&[x], f(x))?))
}

fn reel_binaire(a: &Arguments<'_>, f: fn(f64, f64) -> f64) -> R {
    let v = a.exactement(2)?;
    let (x, y) = (v[0].en_reel()?, v[1].en_reel()?);
    Ok(Valeur::Reel(verifier(&[x, y], f(x, y))?))
}

fn entier_positif(v: &Valeur, quoi: &str) -> Result<BigInt, ErreurEval> {
    let n = v.en_entier()?;
    if n.is_negative() {
        return Err(ErreurEval::Domaine(format!(
            "{quoi} must be a non-negative integer"
        )));
    }
    Ok(n)
}

fn borne_combinatoire(n: &BigInt) -> Result<u64, ErreurEval> {
    match n.to_u64() {
        Some(k) if k <= MAX_ARGUMENT_COMBINATOIRE => Ok(k),
        _ => Err(ErreurEval::Limite(format!(
            "argument too large (limit is {MAX_ARGUMENT_COMBINATOIRE})"
        ))),
    }
}

/// Refuse sans calculer un résultat d’au moins `k * bits_min` bits.
fn taille_estimee(k: u64, bits_min: u64) -> Result<(), ErreurEval> {
    if k.saturating_mul(bits_min) > MAX_BITS_ENTIER {
        return Err(ErreurEval::Limite("integer result too large".into()));
    }
    Ok(())
}

/// Un seul argument itérable, ou plusieurs arguments.
fn iterable_ou_arguments(a: &Arguments<'_>) -> Result<Vec<Valeur>, ErreurEval> {
    match a.positionnels {
        [seul] => seul.elements(),
        plusieurs => Ok(plusieurs.to_vec()),
    }
}

fn reels_de(v: &Valeur) -> Result<Vec<f64>, ErreurEval> {
    v.elements()?.iter().map(Valeur::en_reel).collect()
}

/// x est un entier négatif ou nul (pôles de gamma / lgamma).
fn pole_entier(x: f64) -> bool {
    x <= 0.0 && x.fract() == 0.0
}

/* ------------------------- Fonctions réelles ------------------------- */

pub fn sin(a: &Arguments<'_>) -> R {
    reel_unaire(a, f64::sin)
}

pub fn cos(a: &Arguments<'_>) -> R {
    reel_unaire(a, f64::cos)
}

pub fn tan(a: &Arguments<'_>) -> R {
    reel_unaire(a, f64::tan)
}

pub fn asin(a: &Arguments<'_>) -> R {
    reel_unaire(a, f64::asin)
}

pub fn acos(a: &Arguments<'_>) -> R {
    reel_unaire(a, f64::acos)
}

pub fn atan(a: &Arguments<'_>) -> R {
    reel_unaire(a, f64::atan)
}

pub fn sinh(a: &Arguments<'_>) -> R {
    reel_unaire(a, f64::sinh)
}

pub fn cosh(a: &Arguments<'_>) -> R {
    reel_unaire(a, f64::cosh)
}

pub fn tanh(a: &Arguments<'_>) -> R {
    reel_unaire(a, f64::tanh)
}

pub fn asinh(a: &Arguments<'_>) -> R {
    reel_unaire(a, f64::asinh)
}

pub fn acosh(a: &Arguments<'_>) -> R {
    reel_unaire(a, f64::acosh)
}

pub fn atanh(a: &Arguments<'_>) -> R {
    reel_unaire(a, |x| {
        if x.abs() == 1.0 {
            f64::NAN
        } else {
            x.atanh()
        }
    })
}

pub fn sqrt(a: &Arguments<'_>) -> R {
    reel_unaire(a, f64::sqrt)
}

pub fn cbrt(a: &Arguments<'_>) -> R {
    reel_unaire(a, libm::cbrt)
}

pub fn exp(a: &Arguments<'_>) -> R {
    reel_unaire(a, f64::exp)
}

pub fn exp2(a: &Arguments<'_>) -> R {
    reel_unaire(a, libm::exp2)
}

pub fn expm1(a: &Arguments<'_>) -> R {
    reel_unaire(a, libm::expm1)
}

pub fn fabs(a: &Arguments<'_>) -> R {
    reel_unaire(a, f64::abs)
}

pub fn degrees(a: &Arguments<'_>) -> R {
    reel_unaire(a, f64::to_degrees)
}

pub fn radians(a: &Arguments<'_>) -> R {
    reel_unaire(a, f64::to_radians)
}

pub fn erf(a: &Arguments<'_>) -> R {
    reel_unaire(a, libm::erf)
}

pub fn erfc(a: &Arguments<'_>) -> R {
    reel_unaire(a, libm::erfc)
}

pub fn gamma(a: &Arguments<'_>) -> R {
    reel_unaire(a, |x| if pole_entier(x) { f64::NAN } else { libm::tgamma(x) })
}

pub fn lgamma(a: &Arguments<'_>) -> R {
    reel_unaire(a, |x| if pole_entier(x) { f64::NAN } else { libm::lgamma(x) })
}

pub fn log1p(a: &Arguments<'_>) -> R {
    reel_unaire(a, |x| if x <= -1.0 { f64::NAN } else { libm::log1p(x) })
}

pub fn atan2(a: &Arguments<'_>) -> R {
    reel_binaire(a, f64::atan2)
}

pub fn copysign(a: &Arguments<'_>) -> R {
    reel_binaire(a, f64::copysign)
}

pub fn fmod(a: &Arguments<'_>) -> R {
    reel_binaire(a, |x, y| {
        if y == 0.0 || x.is_infinite() {
            f64::NAN
        } else {
            libm::fmod(x, y)
        }
    })
}

pub fn remainder(a: &Arguments<'_>) -> R {
    reel_binaire(a, |x, y| {
        if y == 0.0 || x.is_infinite() {
            f64::NAN
        } else {
            libm::remainder(x, y)
        }
    })
}

pub fn nextafter(a: &Arguments<'_>) -> R {
    let v = a.exactement(2)?;
    Ok(Valeur::Reel(libm::nextafter(v[0].en_reel()?, v[1].en_reel()?)))
}

/// pow(x, y) : toujours flottant, 0 ** négatif est une erreur de domaine.
pub fn pow(a: &Arguments<'_>) -> R {
    reel_binaire(a, |x, y| {
        if x == 0.0 && y < 0.0 {
            return f64::NAN;
        }
        if x < 0.0 && y.is_finite() && y.fract() != 0.0 {
            return f64::NAN;
        }
        x.powf(y)
    })
}

pub fn fma(a: &Arguments<'_>) -> R {
    let v = a.exactement(3)?;
    let (x, y, z) = (v[0].en_reel()?, v[1].en_reel()?, v[2].en_reel()?);
    Ok(Valeur::Reel(verifier(&[x, y, z], libm::fma(x, y, z))?))
}

pub fn hypot(a: &Arguments<'_>) -> R {
    a.nommes_permis(&[])?;
    let xs: Vec<f64> = a
        .positionnels
        .iter()
        .map(Valeur::en_reel)
        .collect::<Result<_, _>>()?;
    let r = xs.iter().fold(0.0, |acc: f64, x| acc.hypot(*x));
    Ok(Valeur::Reel(verifier(&xs, r)?))
}

pub fn dist(a: &Arguments<'_>) -> R {
    let v = a.exactement(2)?;
    let (p, q) = (reels_de(&v[0])?, reels_de(&v[1])?);
    if p.len() != q.len() {
        return Err(ErreurEval::Domaine(
            "both points must have the same number of dimensions".into(),
        ));
    }
    let r = p
        .iter()
        .zip(&q)
        .fold(0.0, |acc: f64, (x, y)| acc.hypot(x - y));
    let entrees: Vec<f64> = p.iter().chain(&q).copied().collect();
    Ok(Valeur::Reel(verifier(&entrees, r)?))
}

/// ln d’un entier quelconque (aussi au-delà de la plage des flottants).
fn ln_entier(n: &BigInt) -> f64 {
    match n.to_f64() {
        Some(x) if x.is_finite() => x.ln(),
        _ => {
            // n = m * 2^k avec m sur ~60 bits
            let k = n.bits().saturating_sub(60);
            let m: BigInt = n >> k;
            m.to_f64().unwrap_or(f64::NAN).ln() + (k as f64) * std::f64::consts::LN_2
        }
    }
}

/// Logarithme `f` d’un nombre strictement positif ; `ln_base` sert aux entiers géants.
fn logarithme(v: &Valeur, f: fn(f64) -> f64, ln_base: f64) -> Result<f64, ErreurEval> {
    let x = match v.nombre() {
        Some(Nombre::Entier(n)) => {
            if !n.is_positive() {
                return Err(ErreurEval::domaine());
            }
            match n.to_f64() {
                Some(x) if x.is_finite() => x,
                _ => return Ok(ln_entier(&n) / ln_base),
            }
        }
        Some(Nombre::Reel(x)) => {
            if x <= 0.0 {
                return Err(ErreurEval::domaine());
            }
            x
        }
        None => return v.en_reel(),
    };
    verifier(&[x], f(x))
}

/// log(x) ou log(x, base).
pub fn log(a: &Arguments<'_>) -> R {
    a.nommes_permis(&[])?;
    let v = a.entre(1, 2)?;
    let num = logarithme(&v[0], f64::ln, 1.0)?;
    match v.get(1) {
        None => Ok(Valeur::Reel(num)),
        Some(base) => {
            let den = logarithme(base, f64::ln, 1.0)?;
            if den == 0.0 {
                return Err(ErreurEval::DivisionParZero("float division by zero"));
            }
            Ok(Valeur::Reel(num / den))
        }
    }
}

pub fn log2(a: &Arguments<'_>) -> R {
    let v = a.exactement(1)?;
    Ok(Valeur::Reel(logarithme(&v[0], f64::log2, std::f64::consts::LN_2)?))
}

pub fn log10(a: &Arguments<'_>) -> R {
    let v = a.exactement(1)?;
    Ok(Valeur::Reel(logarithme(&v[0], f64::log10, std::f64::consts::LN_10)?))
}

pub fn ldexp(a: &Arguments<'_>) -> R {
    let v = a.exactement(2)?;
    let x = v[0].en_reel()?;
    let i = v[1].en_entier()?;
    // Au-delà de ±10000 le résultat est de toute façon 0 ou l’infini.
    let e = i.to_i32().unwrap_or(if i.is_negative() { -10_000 } else { 10_000 });
    let e = e.clamp(-10_000, 10_000);
    Ok(Valeur::Reel(verifier(&[x], libm::ldexp(x, e))?))
}

pub fn frexp(a: &Arguments<'_>) -> R {
    let x = a.exactement(1)?[0].en_reel()?;
    if !x.is_finite() || x == 0.0 {
        return Ok(Valeur::Tuple(vec![Valeur::Reel(x), Valeur::from(0)]));
    }
    let (m, e) = libm::frexp(x);
    Ok(Valeur::Tuple(vec![Valeur::Reel(m), Valeur::from(i64::from(e))]))
}

pub fn modf(a: &Arguments<'_>) -> R {
    let x = a.exactement(1)?[0].en_reel()?;
    let (fraction, entier) = if x.is_nan() {
        (x, x)
    } else if x.is_infinite() {
        (0.0f64.copysign(x), x)
    } else {
        let t = x.trunc();
        ((x - t).copysign(x), t)
    };
    Ok(Valeur::Tuple(vec![Valeur::Reel(fraction), Valeur::Reel(entier)]))
}

pub fn ulp(a: &Arguments<'_>) -> R {
    let x = a.exactement(1)?[0].en_reel()?.abs();
    let r = if x.is_nan() || x.is_infinite() {
        x
    } else if x == f64::MAX {
        x - libm::nextafter(x, 0.0)
    } else {
        libm::nextafter(x, f64::INFINITY) - x
    };
    Ok(Valeur::Reel(r))
}

/* ---------------------------- Prédicats ---------------------------- */

pub fn isfinite(a: &Arguments<'_>) -> R {
    Ok(Valeur::Booleen(a.exactement(1)?[0].en_reel()?.is_finite()))
}

pub fn isinf(a: &Arguments<'_>) -> R {
    Ok(Valeur::Booleen(a.exactement(1)?[0].en_reel()?.is_infinite()))
}

pub fn isnan(a: &Arguments<'_>) -> R {
    Ok(Valeur::Booleen(a.exactement(1)?[0].en_reel()?.is_nan()))
}

/// isclose(a, b, *, rel_tol=1e-09, abs_tol=0.0)
pub fn isclose(a: &Arguments<'_>) -> R {
    a.nommes_permis(&["rel_tol", "abs_tol"])?;
    let v = a.positionnels_exactement(2)?;
    let (x, y) = (v[0].en_reel()?, v[1].en_reel()?);
    let rel_tol = a.nomme("rel_tol").map(Valeur::en_reel).transpose()?.unwrap_or(1e-9);
    let abs_tol = a.nomme("abs_tol").map(Valeur::en_reel).transpose()?.unwrap_or(0.0);
    if rel_tol < 0.0 || abs_tol < 0.0 {
        return Err(ErreurEval::Domaine("tolerances must be non-negative".into()));
    }
    if x == y {
        return Ok(Valeur::Booleen(true));
    }
    if x.is_infinite() || y.is_infinite() {
        return Ok(Valeur::Booleen(false));
    }
    let diff = (y - x).abs();
    Ok(Valeur::Booleen(
        diff <= (rel_tol * y).abs() || diff <= (rel_tol * x).abs() || diff <= abs_tol,
    ))
}

/* -------------------------- Arrondis entiers -------------------------- */

fn vers_entier(a: &Arguments<'_>, f: fn(f64) -> f64) -> R {
    match a.exactement(1)?[0].nombre() {
        Some(Nombre::Entier(n)) => Ok(Valeur::Entier(n)),
        Some(Nombre::Reel(x)) => Ok(Valeur::Entier(reel_en_entier(f(x))?)),
        None => Err(ErreurEval::Type(format!(
            "must be real number, not {}",
            a.positionnels[0].type_nom()
        ))),
    }
}

pub fn ceil(a: &Arguments<'_>) -> R {
    vers_entier(a, f64::ceil)
}

pub fn floor(a: &Arguments<'_>) -> R {
    vers_entier(a, f64::floor)
}

pub fn trunc(a: &Arguments<'_>) -> R {
    vers_entier(a, f64::trunc)
}

/* -------------------------- Fonctions entières -------------------------- */

pub fn factorial(a: &Arguments<'_>) -> R {
    let n = a.exactement(1)?[0].en_entier()?;
    if n.is_negative() {
        return Err(ErreurEval::Domaine(
            "factorial() not defined for negative values".into(),
        ));
    }
    let n = borne_combinatoire(&n)?;
    let r = (2..=n).fold(BigInt::one(), |acc, k| acc * k);
    Ok(Valeur::Entier(r))
}

/// Produit n * (n-1) * ... * (n-k+1).
fn produit_descendant(n: &BigInt, k: u64) -> BigInt {
    (0..k).fold(BigInt::one(), |acc, i| acc * (n - i))
}

pub fn comb(a: &Arguments<'_>) -> R {
    let v = a.exactement(2)?;
    let n = entier_positif(&v[0], "n")?;
    let k = entier_positif(&v[1], "k")?;
    if k > n {
        return Ok(Valeur::from(0));
    }
    let k = std::cmp::min(k.clone(), &n - &k);
    let k = borne_combinatoire(&k)?;
    // C(n, k) >= (n/k)^k
    let bits_k = u64::from(u64::BITS - k.leading_zeros());
    taille_estimee(k, n.bits().saturating_sub(1).saturating_sub(bits_k))?;
    // r reste entier à chaque étape : r = C(n, i+1)
    let mut r = BigInt::one();
    for i in 0..k {
        r = r * (&n - i) / (i + 1);
    }
    entier_borne(r)
}

pub fn perm(a: &Arguments<'_>) -> R {
    a.nommes_permis(&[])?;
    let v = a.entre(1, 2)?;
    let n = entier_positif(&v[0], "n")?;
    let k = match v.get(1) {
        None | Some(Valeur::Rien) => n.clone(),
        Some(k) => entier_positif(k, "k")?,
    };
    if k > n {
        return Ok(Valeur::from(0));
    }
    let k = borne_combinatoire(&k)?;
    // P(n, k) >= (n - k + 1)^k
    let plus_petit = &n - k + 1u32;
    taille_estimee(k, plus_petit.bits().saturating_sub(1))?;
    entier_borne(produit_descendant(&n, k))
}

pub fn gcd(a: &Arguments<'_>) -> R {
    a.nommes_permis(&[])?;
    let mut r = BigInt::zero();
    for v in a.positionnels {
        r = r.gcd(&v.en_entier()?);
    }
    Ok(Valeur::Entier(r))
}

pub fn lcm(a: &Arguments<'_>) -> R {
    a.nommes_permis(&[])?;
    let mut r = BigInt::one();
    for v in a.positionnels {
        let n = v.en_entier()?;
        if n.is_zero() || r.is_zero() {
            r = BigInt::zero();
        } else {
            r = r.lcm(&n).abs();
            verifier_bits(&r)?;
        }
    }
    Ok(Valeur::Entier(r))
}

pub fn isqrt(a: &Arguments<'_>) -> R {
    let n = a.exactement(1)?[0].en_entier()?;
    if n.is_negative() {
        return Err(ErreurEval::Domaine(
            "isqrt() argument must be nonnegative".into(),
        ));
    }
    Ok(Valeur::Entier(n.sqrt()))
}

/* ----------------------------- Sommes ----------------------------- */

/// Somme flottante exacte (partiels de Shewchuk), un seul arrondi final.
pub fn fsum(a: &Arguments<'_>) -> R {
    let xs = reels_de(&a.exactement(1)?[0])?;

    let mut partiels: Vec<f64> = Vec::new();
    let mut special = 0.0f64;
    let mut inf_pos = false;
    let mut inf_neg = false;

    for mut x in xs {
        if !x.is_finite() {
            if x == f64::INFINITY {
                inf_pos = true;
            } else if x == f64::NEG_INFINITY {
                inf_neg = true;
            }
            special += x;
            continue;
        }
        let mut i = 0;
        for j in 0..partiels.len() {
            let mut y = partiels[j];
            if x.abs() < y.abs() {
                std::mem::swap(&mut x, &mut y);
            }
            let hi = x + y;
            let lo = y - (hi - x);
            if !hi.is_finite() {
                return Err(ErreurEval::Depassement("intermediate overflow in fsum".into()));
            }
            if lo != 0.0 {
                partiels[i] = lo;
                i += 1;
            }
            x = hi;
        }
        partiels.truncate(i);
        partiels.push(x);
    }

    if special != 0.0 || special.is_nan() {
        if inf_pos && inf_neg {
            return Err(ErreurEval::Domaine("-inf + inf in fsum".into()));
        }
        return Ok(Valeur::Reel(special));
    }

    // Recombinaison des partiels, du plus grand au plus petit, avec correction demi-ulp.
    let mut hi = 0.0f64;
    let mut n = partiels.len();
    if n > 0 {
        n -= 1;
        hi = partiels[n];
        let mut lo = 0.0f64;
        while n > 0 {
            let x = hi;
            n -= 1;
            let y = partiels[n];
            hi = x + y;
            let yr = hi - x;
            lo = y - yr;
            if lo != 0.0 {
                break;
            }
        }
        if n > 0 && ((lo < 0.0 && partiels[n - 1] < 0.0) || (lo > 0.0 && partiels[n - 1] > 0.0)) {
            let y = lo * 2.0;
            let x = hi + y;
            if y == x - hi {
                hi = x;
            }
        }
    }
    Ok(Valeur::Reel(hi))
}

/// prod(iterable, *, start=1) : entiers exacts conservés.
pub fn prod(a: &Arguments<'_>) -> R {
    a.nommes_permis(&["start"])?;
    let v = a.positionnels_exactement(1)?;
    let mut acc = a.nomme("start").cloned().unwrap_or_else(|| Valeur::from(1));
    for x in v[0].elements()? {
        acc = binaire(OpBinaire::Mul, &acc, &x)?;
    }
    Ok(acc)
}

pub fn sumprod(a: &Arguments<'_>) -> R {
    let v = a.exactement(2)?;
    let (p, q) = (v[0].elements()?, v[1].elements()?);
    if p.len() != q.len() {
        return Err(ErreurEval::Domaine("Inputs are not the same length".into()));
    }
    let mut acc = Valeur::from(0);
    for (x, y) in p.iter().zip(&q) {
        let produit = binaire(OpBinaire::Mul, x, y)?;
        acc = binaire(OpBinaire::Add, &acc, &produit)?;
    }
    Ok(acc)
}

/* --------------------------- Intégrées --------------------------- */

pub fn abs(a: &Arguments<'_>) -> R {
    let v = &a.exactement(1)?[0];
    match v.nombre() {
        Some(Nombre::Entier(n)) => Ok(Valeur::Entier(n.abs())),
        Some(Nombre::Reel(x)) => Ok(Valeur::Reel(x.abs())),
        None => Err(ErreurEval::Type(format!(
            "bad operand type for abs(): '{}'",
            v.type_nom()
        ))),
    }
}

/// round(x) -> entier (arrondi bancaire) ; round(x, n) -> même type que x.
pub fn round(a: &Arguments<'_>) -> R {
    a.nommes_permis(&["ndigits"])?;
    let v = a.entre(1, 2)?;
    let chiffres = match v.get(1).or_else(|| a.nomme("ndigits")) {
        None | Some(Valeur::Rien) => None,
        Some(n) => Some(n.en_entier()?),
    };
    let x = &v[0];

    match (x.nombre(), chiffres) {
        (None, _) => Err(ErreurEval::Type(format!(
            "type {} doesn't define __round__ method",
            x.type_nom()
        ))),
        (Some(Nombre::Entier(n)), None) => Ok(Valeur::Entier(n)),
        (Some(Nombre::Reel(f)), None) => Ok(Valeur::Entier(reel_en_entier(f.round_ties_even())?)),
        (Some(Nombre::Entier(n)), Some(d)) => Ok(Valeur::Entier(arrondir_entier(n, &d))),
        (Some(Nombre::Reel(f)), Some(d)) => Ok(Valeur::Reel(arrondir_reel(f, &d))),
    }
}

/// Arrondi d’un entier à 10^(-d) près (d < 0), demi-pair.
fn arrondir_entier(n: BigInt, d: &BigInt) -> BigInt {
    if !d.is_negative() {
        return n;
    }
    // 10^p > 2|n| : le résultat est 0 sans calculer 10^p.
    let puissance = match (-d).to_u32() {
        Some(p) if f64::from(p) * std::f64::consts::LOG2_10 < (n.bits() + 1) as f64 => p,
        _ => return BigInt::zero(),
    };
    let m = BigInt::from(10).pow(puissance);
    let (q, r) = n.div_mod_floor(&m);
    let double: BigInt = &r * 2;
    let q = match double.cmp(&m) {
        std::cmp::Ordering::Greater => q + 1,
        std::cmp::Ordering::Equal if q.is_odd() => q + 1,
        _ => q,
    };
    q * m
}

/// Arrondi décimal correct d’un flottant (demi-pair sur la valeur exacte).
fn arrondir_reel(x: f64, d: &BigInt) -> f64 {
    if !x.is_finite() || x == 0.0 {
        return x;
    }
    match d.to_i32() {
        Some(d) if d > 323 => x,
        Some(d) if d >= 0 => {
            // Le formatage décimal est exact puis arrondi demi-pair.
            let s = format!("{:.*}", d as usize, x);
            s.parse::<f64>().unwrap_or(x)
        }
        Some(d) if d >= -308 => {
            let p = 10f64.powi(-d);
            let r = (x / p).round_ties_even() * p;
            if r.is_finite() {
                r
            } else {
                x
            }
        }
        Some(_) => 0.0f64.copysign(x),
        None => {
            if d.is_negative() {
                0.0f64.copysign(x)
            } else {
                x
            }
        }
    }
}

/// min / max : un itérable ou au moins deux arguments ; `key=` et `default=` acceptés.
fn extremum(a: &Arguments<'_>, op: OpComparaison) -> R {
    a.nommes_permis(&["key", "default"])?;
    a.au_moins(1)?;
    if a.positionnels.len() > 1 && a.nomme("default").is_some() {
        return Err(ErreurEval::Type(format!(
            "Cannot specify a default for {}() with multiple positional arguments",
            a.nom
        )));
    }
    let elements = iterable_ou_arguments(a)?;
    let cle = a.nomme("key").filter(|k| !matches!(k, Valeur::Rien));

    let mut meilleur: Option<(Valeur, Valeur)> = None;
    for x in elements {
        let k = match cle {
            Some(f) => appeler_valeur(f, std::slice::from_ref(&x), &[])?,
            None => x.clone(),
        };
        meilleur = match meilleur {
            None => Some((x, k)),
            Some((mx, mk)) => {
                if comparer(op, &k, &mk)? {
                    Some((x, k))
                } else {
                    Some((mx, mk))
                }
            }
        };
    }

    match (meilleur, a.nomme("default")) {
        (Some((x, _)), _) => Ok(x),
        (None, Some(defaut)) => Ok(defaut.clone()),
        (None, None) => Err(ErreurEval::Domaine(format!(
            "{}() iterable argument is empty",
            a.nom
        ))),
    }
}

pub fn min(a: &Arguments<'_>) -> R {
    extremum(a, OpComparaison::Inf)
}

pub fn max(a: &Arguments<'_>) -> R {
    extremum(a, OpComparaison::Sup)
}
