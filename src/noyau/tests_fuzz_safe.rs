//! Tests fuzz safe : robustesse + déterminisme + limites contrôlées.
//!
//! But : marteler le pipeline sans brûler la machine.
//! - RNG déterministe (seed fixe)
//! - profondeur bornée
//! - budget temps global
//! - invariant clé : jamais de panique, une issue cohérente (genre <-> suggestion)

use std::time::{Duration, Instant};

use super::autorises;
use super::{evaluer, GenreErreur, Issue};

/* ------------------------ RNG déterministe minimal ------------------------ */

#[derive(Clone)]
struct Rng {
    state: u64,
}
impl Rng {
    fn new(seed: u64) -> Self {
        Self { state: seed }
    }
    fn next_u32(&mut self) -> u32 {
        // LCG simple (déterministe)
        self.state = self.state.wrapping_mul(6364136223846793005).wrapping_add(1);
        (self.state >> 32) as u32
    }
    fn pick(&mut self, n: u32) -> u32 {
        if n == 0 {
            0
        } else {
            self.next_u32() % n
        }
    }
    fn coin(&mut self) -> bool {
        (self.next_u32() & 1) == 1
    }
    fn choisir<'a>(&mut self, choix: &[&'a str]) -> &'a str {
        choix[self.pick(choix.len() as u32) as usize]
    }
}

/* ------------------------ Budget anti-gel ------------------------ */

fn budget(start: Instant, max: Duration) {
    if start.elapsed() > max {
        panic!("budget temps dépassé: {:?}", max);
    }
}

/* ------------------------ Invariants ------------------------ */

/// Une issue bien formée : échec => message non vide + suggestion du genre.
fn check_issue(expr: &str, issue: &Issue) {
    if let Issue::Echec {
        genre,
        message,
        suggestion,
    } = issue
    {
        assert!(!message.is_empty(), "message vide pour expr={expr:?}");
        assert_eq!(
            *suggestion,
            genre.suggestion(),
            "suggestion incohérente pour expr={expr:?}"
        );
    }
}

/* ------------------------ Génération d’expressions (bornée) ------------------------ */

fn gen_nombre(rng: &mut Rng) -> String {
    match rng.pick(6) {
        0 => "0".to_string(),
        1 => format!("{}", rng.pick(100)),
        2 => format!("{}.{}", rng.pick(10), rng.pick(100)),
        3 => format!("{}e{}", rng.pick(9) + 1, rng.pick(40) as i32 - 20),
        4 => "True".to_string(),
        _ => {
            let signe = if rng.coin() { "-" } else { "+" };
            format!("{signe}{}", rng.pick(10))
        }
    }
}

fn gen_atom(rng: &mut Rng) -> String {
    match rng.pick(6) {
        0 | 1 | 2 => gen_nombre(rng),
        3 => rng.choisir(&["pi", "e", "tau", "inf"]).to_string(),
        4 => format!("({}, {})", gen_nombre(rng), gen_nombre(rng)),
        _ => format!("[{}]", gen_nombre(rng)),
    }
}

const UNAIRES: &[&str] = &[
    "sqrt", "sin", "cos", "tan", "log", "exp", "abs", "round", "floor", "ceil", "factorial",
    "gamma", "atanh", "isqrt", "fabs", "erf",
];

const BINAIRES: &[&str] = &["+", "-", "*", "/", "//", "%", "**", "^", "<", "==", "and", "or"];

fn gen_expr(rng: &mut Rng, depth: usize) -> String {
    if depth == 0 {
        return gen_atom(rng);
    }

    match rng.pick(6) {
        0 => gen_atom(rng),
        1 | 2 => format!(
            "({} {} {})",
            gen_expr(rng, depth - 1),
            rng.choisir(BINAIRES),
            gen_expr(rng, depth - 1)
        ),
        3 => format!("{}({})", rng.choisir(UNAIRES), gen_expr(rng, depth - 1)),
        4 => format!(
            "{}({}, {})",
            rng.choisir(&["max", "min", "pow", "atan2", "hypot", "gcd", "comb", "log"]),
            gen_expr(rng, depth - 1),
            gen_expr(rng, depth - 1)
        ),
        _ => format!("-{}", gen_expr(rng, depth - 1)),
    }
}

/// Texte "sale" : bouts de syntaxe, noms interdits, caractères exotiques.
fn gen_bruit(rng: &mut Rng) -> String {
    const MORCEAUX: &[&str] = &[
        "(", ")", "[", "]", ",", ".", "+", "*", "**", "/", "1", "2.5", "x", "os", "__import__",
        "'a'", "\"", "sqrt", "pi", "=", "lambda", ":", "é", "√", "  ", "^", "0x", "1_", "not",
    ];
    let n = 1 + rng.pick(12) as usize;
    (0..n).map(|_| rng.choisir(MORCEAUX)).collect()
}

/* ------------------------ Tests ------------------------ */

#[test]
fn fuzz_safe_determinisme_et_coherence() {
    let t0 = Instant::now();
    let max = Duration::from_secs(3);

    // Même seed => mêmes expressions => mêmes sorties (déterminisme)
    let mut rng = Rng::new(0xC0FFEE_u64);

    let mut seen_ok = 0usize;
    let mut seen_err = 0usize;

    for _ in 0..300 {
        budget(t0, max);

        let expr = gen_expr(&mut rng, 4);
        let issue = evaluer(&expr);
        check_issue(&expr, &issue);
        assert_eq!(issue, evaluer(&expr), "non idempotent: expr={expr:?}");

        match issue {
            Issue::Succes(_) => seen_ok += 1,
            Issue::Echec { genre, message, .. } => {
                // Le générateur n’utilise que des noms autorisés et une syntaxe valide.
                assert!(
                    !matches!(genre, GenreErreur::NomInterdit | GenreErreur::Syntaxe),
                    "erreur non attendue: expr={expr:?} err={message}"
                );
                seen_err += 1;
            }
        }
    }

    // On veut voir un mix des deux, sinon le fuzz ne “balaye” rien.
    assert!(seen_ok > 30, "trop peu de succès: {seen_ok}");
    assert!(seen_err > 0, "aucune erreur vue: fuzz trop “sage”");
}

#[test]
fn fuzz_safe_bruit_jamais_de_panique() {
    let t0 = Instant::now();
    let max = Duration::from_secs(2);

    let mut rng = Rng::new(0xBADC0DE_u64);
    let mut genres = Vec::new();

    for _ in 0..500 {
        budget(t0, max);

        let expr = gen_bruit(&mut rng);
        let issue = evaluer(&expr);
        check_issue(&expr, &issue);
        if let Some(g) = issue.genre() {
            if !genres.contains(&g) {
                genres.push(g);
            }
        }
    }

    assert!(genres.contains(&GenreErreur::Syntaxe));
    assert!(genres.contains(&GenreErreur::NomInterdit));
}

#[test]
fn fuzz_safe_noms_aleatoires() {
    let mut rng = Rng::new(0x5EED_u64);
    let lettres: Vec<char> = "abcdefghijklmnopqrstuvwxyz_".chars().collect();

    for _ in 0..400 {
        let n = 1 + rng.pick(8) as usize;
        let nom: String = (0..n)
            .map(|_| lettres[rng.pick(lettres.len() as u32) as usize])
            .collect();
        if super::analyse::MOTS_RESERVES.contains(&nom.as_str()) {
            continue;
        }

        let expr = format!("{nom}(1)");
        match evaluer(&expr) {
            Issue::Echec {
                genre: GenreErreur::NomInterdit,
                message,
                ..
            } => {
                assert!(!autorises::est_autorise(&nom), "{nom} refusé à tort");
                assert_eq!(message, format!("Use of {nom} not allowed"));
            }
            _ => assert!(autorises::est_autorise(&nom), "{nom} accepté à tort"),
        }
    }
}

#[test]
fn fuzz_safe_somme_balancee_anti_pile() {
    let t0 = Instant::now();
    let max = Duration::from_secs(1);

    // Somme balancée : profondeur ~log2(n), loin des garde-fous.
    let mut items: Vec<String> = (0..800).map(|_| "1/2".to_string()).collect();
    while items.len() > 1 {
        items = items
            .chunks(2)
            .map(|c| match c {
                [a, b] => format!("({a}+{b})"),
                [a] => a.clone(),
                _ => unreachable!(),
            })
            .collect();
    }
    let expr = items.pop().unwrap_or_else(|| "0".to_string());

    let issue = evaluer(&expr);
    budget(t0, max);
    assert_eq!(issue, Issue::Succes(super::Valeur::Reel(400.0)));
}
