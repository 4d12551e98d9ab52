//! Tests de propriétés (campagne) : le contrat observable de `evaluer`.
//!
//! - succès numériques (sémantique IEEE pour les flottants, entiers exacts)
//! - classement des échecs en quatre genres + suggestion exacte
//! - idempotence

use num_bigint::BigInt;

use super::{evaluer, GenreErreur, Issue, Valeur};

fn ok(expr: &str) -> Valeur {
    match evaluer(expr) {
        Issue::Succes(v) => v,
        Issue::Echec { message, .. } => panic!("expr={expr:?} a échoué : {message}"),
    }
}

fn repr(expr: &str) -> String {
    ok(expr).to_string()
}

fn err(expr: &str) -> (GenreErreur, String) {
    match evaluer(expr) {
        Issue::Echec { genre, message, .. } => (genre, message),
        Issue::Succes(v) => panic!("expr={expr:?} devait échouer, obtenu {v}"),
    }
}

fn genre(expr: &str) -> GenreErreur {
    err(expr).0
}

/* ------------------------ Succès ------------------------ */

#[test]
fn prop_arithmetique_de_base() {
    assert_eq!(repr("1 + 2"), "3");
    assert_eq!(repr("7 - 10"), "-3");
    assert_eq!(repr("6 * 7"), "42");
    assert_eq!(repr("1 / 4"), "0.25");
    assert_eq!(repr("6 / 3"), "2.0");
    assert_eq!(repr("7 // 2"), "3");
    assert_eq!(repr("-7 // 2"), "-4");
    assert_eq!(repr("7 % 3"), "1");
    assert_eq!(repr("-7 % 3"), "2");
    assert_eq!(repr("(1 + 2) * 3"), "9");
    assert_eq!(repr("0.1 + 0.2"), "0.30000000000000004");
}

#[test]
fn prop_chapeau_egal_double_etoile() {
    assert_eq!(ok("2^3"), Valeur::from(8));
    assert_eq!(evaluer("2^3"), evaluer("2**3"));
    assert_eq!(repr("2^0.5"), repr("2**0.5"));
    assert_eq!(repr("2^3^2"), "512");
}

#[test]
fn prop_fonctions_autorisees() {
    assert_eq!(ok("sqrt(16)"), Valeur::Reel(4.0));
    assert_eq!(repr("sqrt(16)"), "4.0");
    assert_eq!(repr("abs(-3)"), "3");
    assert_eq!(repr("round(2.5)"), "2");
    assert_eq!(repr("round(3.14159, 2)"), "3.14");
    assert_eq!(repr("min(3, 1, 2)"), "1");
    assert_eq!(repr("max([1, 5, 3])"), "5");
    assert_eq!(repr("factorial(20)"), "2432902008176640000");
    assert_eq!(repr("floor(-0.5)"), "-1");
    assert_eq!(repr("log(e)"), "1.0");
    assert_eq!(repr("cos(0)"), "1.0");
    assert_eq!(repr("degrees(pi)"), "180.0");
    assert_eq!(repr("frexp(8)"), "(0.5, 4)");
    assert_eq!(repr("gcd(12, 18)"), "6");
    assert_eq!(repr("isqrt(10)"), "3");
    assert_eq!(repr("tau / 2 == pi"), "True");
    assert_eq!(repr("hypot(3, 4)"), "5.0");
    assert_eq!(repr("fsum([0.1] * 10)"), "1.0");
    assert_eq!(repr("prod((1, 2, 3, 4))"), "24");
}

#[test]
fn prop_entiers_exacts() {
    let attendu = BigInt::from(2).pow(100u32);
    assert_eq!(ok("2**100"), Valeur::Entier(attendu));
    assert_eq!(repr("10**20 + 1"), "100000000000000000001");
    assert_eq!(repr("(10**30) / (10**30)"), "1.0");
    assert_eq!(repr("comb(52, 5)"), "2598960");
}

#[test]
fn prop_affichage_flottants() {
    assert_eq!(repr("1e16"), "1e+16");
    assert_eq!(repr("1 / 3"), "0.3333333333333333");
    assert_eq!(repr("2.0 ** 0.5"), "1.4142135623730951");
    assert_eq!(repr("1e-5"), "1e-05");
    assert_eq!(repr("inf"), "inf");
    assert_eq!(repr("-inf"), "-inf");
    assert_eq!(repr("nan"), "nan");
    assert_eq!(repr("1e308 * 10"), "inf");
}

/* ------------------------ Échecs classés ------------------------ */

#[test]
fn prop_division_par_zero() {
    let issue = evaluer("1/0");
    assert_eq!(
        issue,
        Issue::Echec {
            genre: GenreErreur::DivisionParZero,
            message: "division by zero".into(),
            suggestion: "Check for division by zero in your expression.",
        }
    );
    for expr in ["1.0/0", "5 // 0", "5 % 0", "2.5 // 0.0", "2.5 % 0.0", "0 ** -1", "0.0 ** -2"] {
        assert_eq!(genre(expr), GenreErreur::DivisionParZero, "expr={expr:?}");
    }
}

#[test]
fn prop_syntaxe() {
    let issue = evaluer("(2+3");
    assert_eq!(issue.genre(), Some(GenreErreur::Syntaxe));
    if let Issue::Echec { suggestion, .. } = issue {
        assert_eq!(
            suggestion,
            "Check parentheses and syntax; try adding missing parentheses."
        );
    }
    for expr in ["2+", "2 3", ")", "sqrt(", "1 +* 2", "[1, 2", "2 & 3", "x[0]", "", "   "] {
        assert_eq!(genre(expr), GenreErreur::Syntaxe, "expr={expr:?}");
    }
    assert_eq!(err("(2+3").1, "unexpected EOF while parsing");
}

#[test]
fn prop_noms_interdits() {
    for (expr, nom) in [
        ("os", "os"),
        ("__import__('os')", "__import__"),
        ("exec('1')", "exec"),
        ("eval('1')", "eval"),
        ("open('f')", "open"),
        ("x + 1", "x"),
        ("sqrt(y)", "y"),
        ("print(1)", "print"),
        ("sum([1, 2])", "sum"),
    ] {
        let issue = evaluer(expr);
        assert_eq!(
            issue,
            Issue::Echec {
                genre: GenreErreur::NomInterdit,
                message: format!("Use of {nom} not allowed"),
                suggestion: "You used a function or name that is not allowed.",
            },
            "expr={expr:?}"
        );
    }
}

#[test]
fn prop_autres() {
    for expr in [
        "sqrt(-1)",
        "log(0)",
        "factorial(-1)",
        "factorial(2.5)",
        "'a' + 1",
        "sqrt()",
        "sqrt(1, 2)",
        "exp(1000)",
        "10.0 ** 400",
        "(-8) ** 0.5",
        "pi.sqrt",
        "pi(2)",
        "max([])",
        "10 ** 10 ** 10",
    ] {
        assert_eq!(genre(expr), GenreErreur::Autre, "expr={expr:?}");
    }
    assert_eq!(err("sqrt(-1)").1, "math domain error");
    assert_eq!(err("exp(1000)").1, "math range error");
    assert_eq!(err("sqrt(1, 2)").1, "sqrt() takes exactly 1 argument (2 given)");
}

/* ------------------------ Invariants ------------------------ */

#[test]
fn prop_idempotence() {
    for expr in ["2^3", "1/0", "(2+3", "os.system('ls')", "sqrt(2)", "nan", "round(0.5)"] {
        assert_eq!(evaluer(expr), evaluer(expr), "expr={expr:?}");
    }
}

#[test]
fn prop_suggestion_toujours_celle_du_genre() {
    for expr in ["1/0", "(", "os", "sqrt(-1)"] {
        if let Issue::Echec {
            genre, suggestion, ..
        } = evaluer(expr)
        {
            assert_eq!(suggestion, genre.suggestion());
        }
    }
    // Quatre genres, quatre suggestions distinctes
    for a in GenreErreur::TOUS {
        for b in GenreErreur::TOUS {
            assert_eq!(a == b, a.suggestion() == b.suggestion());
        }
    }
}
