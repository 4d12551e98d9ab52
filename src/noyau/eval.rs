//! Noyau : évaluation (pipeline complet)
//!
//! normalisation (^ -> **) -> compilation (jetons + AST, sans exécuter)
//!   -> profondeur bornée -> noms libres ⊂ liste autorisée -> exécution
//!
//! Aucune étape ne panique : tout échec devient une `Issue::Echec`.

use tracing::{debug, trace};

use super::analyse::compiler;
use super::autorises;
use super::erreur::ErreurEval;
use super::expr::Expr;
use super::issue::Issue;
use super::limites::{MAX_LONGUEUR_ENTREE, MAX_PROFONDEUR_ARBRE};
use super::operations::{binaire, comparer, sequence_bornee, unaire};
use super::valeur::Valeur;

/// Étapes intermédiaires, pour le panneau "Démarche" et le journal.
#[derive(Default, Clone, Debug, PartialEq)]
pub struct Demarche {
    pub normalisee: String,
    pub noms: Vec<String>,
    pub profondeur: usize,
}

/// API publique : évalue une expression, sans jamais paniquer ni propager d’erreur.
pub fn evaluer(texte: &str) -> Issue {
    evaluer_detaille(texte).0
}

/// Comme `evaluer`, avec la démarche (remplie aussi loin que le pipeline est allé).
pub fn evaluer_detaille(texte: &str) -> (Issue, Demarche) {
    let mut demarche = Demarche::default();
    let issue = Issue::from(pipeline(texte, &mut demarche));

    match &issue {
        Issue::Succes(v) => debug!(expression = texte, resultat = %v, "évaluation réussie"),
        Issue::Echec { genre, message, .. } => {
            debug!(expression = texte, %genre, message = message.as_str(), "évaluation refusée")
        }
    }
    (issue, demarche)
}

/// `^` est la puissance pour l’utilisateur (jamais le ou-exclusif).
pub fn normaliser(texte: &str) -> String {
    texte.replace('^', "**")
}

fn pipeline(texte: &str, demarche: &mut Demarche) -> Result<Valeur, ErreurEval> {
    if texte.chars().count() > MAX_LONGUEUR_ENTREE {
        return Err(ErreurEval::Limite(format!(
            "expression too long (limit is {MAX_LONGUEUR_ENTREE} characters)"
        )));
    }

    // 1) Normalisation
    demarche.normalisee = normaliser(texte);

    // 2) Compilation (aucune exécution)
    let expr = compiler(&demarche.normalisee)?;

    // 3) Profondeur : l’exécution est récursive, elle ne part que sur un arbre borné
    demarche.profondeur = expr.profondeur();
    if demarche.profondeur > MAX_PROFONDEUR_ARBRE {
        return Err(ErreurEval::Limite(
            "maximum recursion depth exceeded during compilation".into(),
        ));
    }

    // 4) Noms libres : le premier nom absent de la liste arrête tout
    let noms = expr.noms_libres();
    demarche.noms = noms.iter().map(|n| n.to_string()).collect();
    verifier_noms(&noms)?;
    trace!(noms = ?demarche.noms, "noms autorisés");

    // 5) Exécution
    executer(&expr)
}

/// Premier nom hors liste => NomInterdit.
pub fn verifier_noms(noms: &[&str]) -> Result<(), ErreurEval> {
    match noms.iter().find(|n| !autorises::est_autorise(n)) {
        Some(n) => Err(ErreurEval::NomInterdit((*n).to_string())),
        None => Ok(()),
    }
}

fn executer(e: &Expr) -> Result<Valeur, ErreurEval> {
    use Expr::*;

    match e {
        Const(v) => Ok(v.clone()),

        Nom(n) => autorises::chercher(n)
            .map(|entree| entree.valeur())
            .ok_or_else(|| ErreurEval::NomInterdit(n.clone())),

        Unaire(op, x) => unaire(*op, &executer(x)?),

        Binaire(op, a, b) => {
            let a = executer(a)?;
            let b = executer(b)?;
            binaire(*op, &a, &b)
        }

        Comparaison(premier, suite) => {
            let mut gauche = executer(premier)?;
            for (op, x) in suite {
                let droite = executer(x)?;
                if !comparer(*op, &gauche, &droite)? {
                    return Ok(Valeur::Booleen(false));
                }
                gauche = droite;
            }
            Ok(Valeur::Booleen(true))
        }

        Non(x) => Ok(Valeur::Booleen(!executer(x)?.est_vrai())),

        // et / ou rendent l’opérande décisif (court-circuit)
        Et(a, b) => {
            let a = executer(a)?;
            if a.est_vrai() {
                executer(b)
            } else {
                Ok(a)
            }
        }
        Ou(a, b) => {
            let a = executer(a)?;
            if a.est_vrai() {
                Ok(a)
            } else {
                executer(b)
            }
        }

        Appel {
            fonction,
            args,
            nommes,
        } => {
            let cible = executer(fonction)?;
            let positionnels = args.iter().map(executer).collect::<Result<Vec<_>, _>>()?;
            let nommes = nommes
                .iter()
                .map(|(k, x)| Ok((k.clone(), executer(x)?)))
                .collect::<Result<Vec<_>, ErreurEval>>()?;
            autorises::appeler_valeur(&cible, &positionnels, &nommes)
        }

        // Aucun attribut n’est exposé : l’objet est évalué, puis l’accès échoue.
        Attribut(x, attribut) => {
            let objet = executer(x)?;
            Err(ErreurEval::Attribut {
                type_nom: objet.type_nom(),
                attribut: attribut.clone(),
            })
        }

        Tuple(xs) => Ok(Valeur::Tuple(sequence_bornee(xs.iter().map(executer))?)),
        Liste(xs) => Ok(Valeur::Liste(sequence_bornee(xs.iter().map(executer))?)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::noyau::issue::GenreErreur;

    fn ok(s: &str) -> Valeur {
        match evaluer(s) {
            Issue::Succes(v) => v,
            Issue::Echec { message, .. } => panic!("evaluer({s:?}) a échoué : {message}"),
        }
    }

    fn err(s: &str) -> (GenreErreur, String) {
        match evaluer(s) {
            Issue::Echec { genre, message, .. } => (genre, message),
            Issue::Succes(v) => panic!("evaluer({s:?}) devait échouer, obtenu {v}"),
        }
    }

    #[test]
    fn pipeline_nominal() {
        assert_eq!(ok("2^3"), Valeur::from(8));
        assert_eq!(ok("2**3"), ok("2^3"));
        assert_eq!(ok("sqrt(16)"), Valeur::Reel(4.0));
        assert_eq!(ok("1 + 2 * 3"), Valeur::from(7));
        assert_eq!(ok("-2**2"), Valeur::from(-4));
        assert_eq!(ok("2**-1"), Valeur::Reel(0.5));
        assert_eq!(ok("pi").to_string(), "3.141592653589793");
    }

    #[test]
    fn logique_et_comparaisons() {
        assert_eq!(ok("1 < 2 < 3"), Valeur::Booleen(true));
        assert_eq!(ok("1 < 2 > 3"), Valeur::Booleen(false));
        assert_eq!(ok("0 or 5"), Valeur::from(5));
        assert_eq!(ok("0 and 1/0"), Valeur::from(0));
        assert_eq!(ok("not 0"), Valeur::Booleen(true));
    }

    #[test]
    fn appels_nommes() {
        assert_eq!(ok("round(2.675, ndigits=2)"), Valeur::Reel(2.67));
        assert_eq!(ok("isclose(0.1+0.2, 0.3)"), Valeur::Booleen(true));
        assert_eq!(ok("max([1, -5], key=abs)"), Valeur::from(-5));
        assert_eq!(ok("min([], default=7)"), Valeur::from(7));
        assert_eq!(ok("min((3, 1), default=7)"), Valeur::from(1));
        assert_eq!(err("min(1, 2, default=0)").0, GenreErreur::Autre);
        assert_eq!(err("max(1, 2, reverse=True)").0, GenreErreur::Autre);
        let (genre, message) = err("sqrt(4, base=2)");
        assert_eq!(genre, GenreErreur::Autre);
        assert_eq!(message, "sqrt() takes no keyword arguments");
    }

    #[test]
    fn noms_verifies_avant_execution() {
        // 1/0 n’est jamais exécuté : le nom interdit est détecté d’abord.
        assert_eq!(
            err("1/0 + os"),
            (GenreErreur::NomInterdit, "Use of os not allowed".into())
        );
        assert_eq!(
            err("__import__('os').system('ls')"),
            (GenreErreur::NomInterdit, "Use of __import__ not allowed".into())
        );
        // Attribut : son nom compte aussi
        assert_eq!(err("pi.real").0, GenreErreur::NomInterdit);
    }

    #[test]
    fn attribut_autorise_mais_inexistant() {
        assert_eq!(
            err("pi.sqrt"),
            (
                GenreErreur::Autre,
                "'float' object has no attribute 'sqrt'".into()
            )
        );
    }

    #[test]
    fn arbre_trop_profond() {
        let s = format!("{}1", "-".repeat(1500));
        let (genre, message) = err(&s);
        // soit l’analyse refuse l’imbrication, soit la profondeur est bornée
        assert!(matches!(genre, GenreErreur::Syntaxe | GenreErreur::Autre), "{message}");

        let somme = vec!["1"; 1500].join("+");
        assert_eq!(
            err(&somme),
            (
                GenreErreur::Autre,
                "maximum recursion depth exceeded during compilation".into()
            )
        );
    }

    #[test]
    fn demarche_remplie() {
        let (issue, d) = evaluer_detaille("sqrt(2)^2 + pi");
        assert!(issue.est_succes());
        assert_eq!(d.normalisee, "sqrt(2)**2 + pi");
        assert_eq!(d.noms, vec!["sqrt".to_string(), "pi".to_string()]);
        assert!(d.profondeur >= 3);
    }
}
