// src/noyau/expr.rs
//
// AST de l’expression compilée (jamais exécutée ici).
// - Const : littéral (nombre, chaîne, True/False/None)
// - Nom   : identifiant libre (devra être dans la liste autorisée)
// - Attribut(x, a) : "x.a" ; `a` compte aussi comme identifiant libre
//
// IMPORTANT (SAFE):
// - noms_libres() et profondeur() sont itératifs : pas de récursion sur un arbre
//   qui n’a pas encore été borné.

use super::valeur::Valeur;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OpUnaire {
    Plus,
    Moins,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OpBinaire {
    Add,
    Sub,
    Mul,
    Div,
    DivEntiere,
    Modulo,
    Puissance,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OpComparaison {
    Inf,
    InfEgal,
    Sup,
    SupEgal,
    Egal,
    Different,
}

impl OpBinaire {
    pub fn symbole(self) -> &'static str {
        match self {
            OpBinaire::Add => "+",
            OpBinaire::Sub => "-",
            OpBinaire::Mul => "*",
            OpBinaire::Div => "/",
            OpBinaire::DivEntiere => "//",
            OpBinaire::Modulo => "%",
            OpBinaire::Puissance => "** or pow()",
        }
    }
}

impl OpComparaison {
    pub fn symbole(self) -> &'static str {
        match self {
            OpComparaison::Inf => "<",
            OpComparaison::InfEgal => "<=",
            OpComparaison::Sup => ">",
            OpComparaison::SupEgal => ">=",
            OpComparaison::Egal => "==",
            OpComparaison::Different => "!=",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    Const(Valeur),
    Nom(String),

    Unaire(OpUnaire, Box<Expr>),
    Binaire(OpBinaire, Box<Expr>, Box<Expr>),

    /// a < b <= c ... (chaîne de comparaisons)
    Comparaison(Box<Expr>, Vec<(OpComparaison, Expr)>),
    Non(Box<Expr>),
    Et(Box<Expr>, Box<Expr>),
    Ou(Box<Expr>, Box<Expr>),

    Appel {
        fonction: Box<Expr>,
        args: Vec<Expr>,
        nommes: Vec<(String, Expr)>,
    },
    Attribut(Box<Expr>, String),

    Tuple(Vec<Expr>),
    Liste(Vec<Expr>),
}

enum Visite<'a> {
    Noeud(&'a Expr),
    Nom(&'a str),
}

impl Expr {
    /// Identifiants libres, dans l’ordre de première apparition (gauche -> droite), sans doublon.
    /// Les étiquettes d’arguments nommés ne sont pas des identifiants.
    pub fn noms_libres(&self) -> Vec<&str> {
        use Expr::*;

        let mut noms: Vec<&str> = Vec::new();
        let mut pile: Vec<Visite<'_>> = vec![Visite::Noeud(self)];

        while let Some(v) = pile.pop() {
            let e = match v {
                Visite::Nom(n) => {
                    if !noms.contains(&n) {
                        noms.push(n);
                    }
                    continue;
                }
                Visite::Noeud(e) => e,
            };

            // Les enfants sont empilés à l’envers pour être visités de gauche à droite.
            match e {
                Const(_) => {}
                Nom(n) => pile.push(Visite::Nom(n)),
                Unaire(_, x) | Non(x) => pile.push(Visite::Noeud(x)),
                Binaire(_, a, b) | Et(a, b) | Ou(a, b) => {
                    pile.push(Visite::Noeud(b));
                    pile.push(Visite::Noeud(a));
                }
                Comparaison(premier, suite) => {
                    for (_, x) in suite.iter().rev() {
                        pile.push(Visite::Noeud(x));
                    }
                    pile.push(Visite::Noeud(premier));
                }
                Appel {
                    fonction,
                    args,
                    nommes,
                } => {
                    for (_, x) in nommes.iter().rev() {
                        pile.push(Visite::Noeud(x));
                    }
                    for x in args.iter().rev() {
                        pile.push(Visite::Noeud(x));
                    }
                    pile.push(Visite::Noeud(fonction));
                }
                Attribut(x, attribut) => {
                    pile.push(Visite::Nom(attribut));
                    pile.push(Visite::Noeud(x));
                }
                Tuple(xs) | Liste(xs) => {
                    for x in xs.iter().rev() {
                        pile.push(Visite::Noeud(x));
                    }
                }
            }
        }

        noms
    }

    /// Profondeur de l’arbre (une feuille = 1).
    pub fn profondeur(&self) -> usize {
        use Expr::*;

        let mut max = 0;
        let mut pile: Vec<(&Expr, usize)> = vec![(self, 1)];

        while let Some((e, p)) = pile.pop() {
            max = max.max(p);
            match e {
                Const(_) | Nom(_) => {}
                Unaire(_, x) | Non(x) | Attribut(x, _) => pile.push((x.as_ref(), p + 1)),
                Binaire(_, a, b) | Et(a, b) | Ou(a, b) => {
                    pile.push((a.as_ref(), p + 1));
                    pile.push((b.as_ref(), p + 1));
                }
                Comparaison(premier, suite) => {
                    pile.push((premier.as_ref(), p + 1));
                    pile.extend(suite.iter().map(|(_, x)| (x, p + 1)));
                }
                Appel {
                    fonction,
                    args,
                    nommes,
                } => {
                    pile.push((fonction.as_ref(), p + 1));
                    pile.extend(args.iter().map(|x| (x, p + 1)));
                    pile.extend(nommes.iter().map(|(_, x)| (x, p + 1)));
                }
                Tuple(xs) | Liste(xs) => pile.extend(xs.iter().map(|x| (x, p + 1))),
            }
        }

        max
    }
}
