//! Tests de sécurité : la liste autorisée est fermée, les évasions classiques échouent,
//! les garde-fous de ressources tiennent (réponse rapide, jamais de blocage).

use std::time::{Duration, Instant};

use super::autorises::{self, AUTORISES};
use super::{evaluer, GenreErreur, Issue};

/// Noms exposés, dans l’ordre de la table.
const ATTENDUS: &[&str] = &[
    "abs", "acos", "acosh", "asin", "asinh", "atan", "atan2", "atanh", "cbrt", "ceil", "comb",
    "copysign", "cos", "cosh", "degrees", "dist", "e", "erf", "erfc", "exp", "exp2", "expm1",
    "fabs", "factorial", "floor", "fma", "fmod", "frexp", "fsum", "gamma", "gcd", "hypot", "inf",
    "isclose", "isfinite", "isinf", "isnan", "isqrt", "lcm", "ldexp", "lgamma", "log", "log10",
    "log1p", "log2", "max", "min", "modf", "nan", "nextafter", "perm", "pi", "pow", "prod",
    "radians", "remainder", "round", "sin", "sinh", "sqrt", "sumprod", "tan", "tanh", "tau",
    "trunc", "ulp",
];

/// Noms qui donneraient accès aux E/S, aux processus ou à l’introspection.
const DANGEREUX: &[&str] = &[
    "__import__", "__builtins__", "__class__", "__globals__", "__subclasses__", "breakpoint",
    "compile", "delattr", "dir", "eval", "exec", "exit", "getattr", "globals", "help", "input",
    "locals", "memoryview", "object", "open", "os", "print", "quit", "setattr", "subprocess",
    "sys", "system", "type", "vars", "popen", "importlib", "builtins", "file", "reload",
];

fn genre(expr: &str) -> Option<GenreErreur> {
    evaluer(expr).genre()
}

/* ------------------------ Liste autorisée ------------------------ */

#[test]
fn secu_liste_exacte() {
    let noms: Vec<&str> = autorises::noms().collect();
    assert_eq!(noms, ATTENDUS);
}

#[test]
fn secu_aucun_nom_dangereux_ni_prive() {
    for nom in autorises::noms() {
        assert!(!nom.starts_with('_'), "nom privé exposé : {nom}");
        assert!(!DANGEREUX.contains(&nom), "nom dangereux exposé : {nom}");
    }
    for nom in DANGEREUX {
        assert!(!autorises::est_autorise(nom), "{nom} ne doit pas être résolu");
        assert_eq!(
            genre(&format!("{nom}()")).or(genre(nom)),
            Some(GenreErreur::NomInterdit),
            "{nom}"
        );
    }
}

#[test]
fn secu_chaque_nom_autorise_s_evalue() {
    // Référencer un nom autorisé ne doit jamais échouer (constante ou fonction).
    for e in AUTORISES {
        let issue = evaluer(e.nom);
        assert!(issue.est_succes(), "{} : {:?}", e.nom, issue);
    }
}

/* ------------------------ Évasions ------------------------ */

#[test]
fn secu_evasions_classiques() {
    for (expr, attendu) in [
        ("__import__('os').system('rm -rf /')", GenreErreur::NomInterdit),
        ("().__class__.__bases__", GenreErreur::NomInterdit),
        ("sqrt.__globals__", GenreErreur::NomInterdit),
        ("getattr(pi, 'real')", GenreErreur::NomInterdit),
        ("(lambda: 1)()", GenreErreur::Syntaxe),
        ("[x for x in (1, 2)]", GenreErreur::Syntaxe),
        ("import os", GenreErreur::Syntaxe),
        ("x = 1", GenreErreur::Syntaxe),
        ("1; os", GenreErreur::Syntaxe),
        ("pi.__class__", GenreErreur::NomInterdit),
        ("'%s' % 1", GenreErreur::Autre),
        // Pas de normalisation unicode des identifiants : la forme pleine chasse est refusée.
        ("ｓｑｒｔ(4)", GenreErreur::NomInterdit),
    ] {
        assert_eq!(genre(expr), Some(attendu), "expr={expr:?}");
    }
}

#[test]
fn secu_nom_interdit_avant_toute_execution() {
    // factorial(9999) n’est jamais calculé : le refus tombe avant l’exécution.
    let t0 = Instant::now();
    let issue = evaluer("factorial(9999) ** factorial(9999) + open");
    assert_eq!(issue.genre(), Some(GenreErreur::NomInterdit));
    assert!(t0.elapsed() < Duration::from_secs(1));
}

/* ------------------------ Garde-fous ressources ------------------------ */

#[test]
fn secu_ressources_bornees() {
    let t0 = Instant::now();
    let profond = format!("{}1{}", "(".repeat(1000), ")".repeat(1000));
    let long = "1+".repeat(6000) + "1";

    for (expr, attendu) in [
        ("9**9**9**9", GenreErreur::Autre),
        ("10 ** 10_000_000", GenreErreur::Autre),
        ("'a' * 10**9", GenreErreur::Autre),
        ("(1,) * 10**6", GenreErreur::Autre),
        ("factorial(10**6)", GenreErreur::Autre),
        ("comb(10**9, 10**6)", GenreErreur::Autre),
        ("perm(10**700, 1500)", GenreErreur::Autre),
        ("comb(10**700, 1500)", GenreErreur::Autre),
        ("lcm(2**400000 + 1, 2**400000 + 3, 2**400000 + 5)", GenreErreur::Autre),
        ("[[0] * 100000] * 100000", GenreErreur::Autre),
        ("[[[0] * 1000] * 100] * 1000", GenreErreur::Autre),
        ("((0,) * 50000,) * 3", GenreErreur::Autre),
        ("[[0] * 60000, [0] * 60000]", GenreErreur::Autre),
        ("[[0] * 60000] + [[0] * 60000]", GenreErreur::Autre),
        (profond.as_str(), GenreErreur::Syntaxe),
        (long.as_str(), GenreErreur::Autre),
    ] {
        assert_eq!(genre(expr), Some(attendu), "expr={:.40}…", expr);
    }
    assert!(
        t0.elapsed() < Duration::from_secs(5),
        "garde-fous trop lents : {:?}",
        t0.elapsed()
    );
}

/* ------------------------ Concurrence ------------------------ */

#[test]
fn secu_evaluateur_partageable_entre_threads() {
    fn partageable<T: Send + Sync>() {}
    partageable::<Issue>();

    let fils: Vec<_> = (0..4)
        .map(|i| {
            std::thread::spawn(move || {
                let expr = format!("{i} ** 2 + sqrt(16)");
                evaluer(&expr)
            })
        })
        .collect();
    for (i, f) in fils.into_iter().enumerate() {
        let issue = f.join().expect("thread d’évaluation");
        let attendu = (i * i) as f64 + 4.0;
        assert_eq!(issue, Issue::Succes(super::Valeur::Reel(attendu)));
    }
}
