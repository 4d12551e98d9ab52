// src/noyau/analyse.rs
//
// Analyse descendante : jetons -> Expr (compilation SANS exécution).
//
// Précédences (de la plus faible à la plus forte) :
//   or < and < not < comparaisons < + - < * / // % < unaire + - < ** < appels / attributs
//
// Règles:
// - ** est associatif à droite et lie plus fort qu’un moins à sa gauche : -2**2 == -(2**2)
// - l’opérande droit de ** peut être unaire : 2**-1
// - "1, 2" au niveau racine donne un tuple
// - garde-fou : imbrication bornée (MAX_IMBRICATION) => jamais de débordement de pile

use super::erreur::ErreurSyntaxe;
use super::expr::{Expr, OpBinaire, OpComparaison, OpUnaire};
use super::jetons::{tokenize, Jeton, Tok};
use super::valeur::Valeur;

/// Profondeur maximale de récursion de l’analyse (parenthèses, unaires, appels...).
pub const MAX_IMBRICATION: usize = 200;

/// Mots réservés qui ne peuvent jamais être des noms.
pub const MOTS_RESERVES: &[&str] = &[
    "and", "as", "assert", "async", "await", "break", "class", "continue", "def", "del", "elif",
    "else", "except", "finally", "for", "from", "global", "if", "import", "in", "is", "lambda",
    "nonlocal", "not", "or", "pass", "raise", "return", "try", "while", "with", "yield",
];

/// Compile un texte en Expr.
pub fn compiler(texte: &str) -> Result<Expr, ErreurSyntaxe> {
    let jetons = tokenize(texte)?;
    let mut a = Analyseur {
        jetons,
        pos: 0,
        profondeur: 0,
    };

    let e = a.liste_racine()?;

    if let Some(j) = a.jetons.get(a.pos) {
        return Err(ErreurSyntaxe::Invalide { colonne: j.colonne });
    }
    Ok(e)
}

struct Analyseur {
    jetons: Vec<Jeton>,
    pos: usize,
    profondeur: usize,
}

impl Analyseur {
    /* ------------------------ Outils ------------------------ */

    fn courant(&self) -> Option<&Tok> {
        self.jetons.get(self.pos).map(|j| &j.tok)
    }

    fn suivant(&self) -> Option<&Tok> {
        self.jetons.get(self.pos + 1).map(|j| &j.tok)
    }

    fn est(&self, t: &Tok) -> bool {
        self.courant() == Some(t)
    }

    fn est_mot(&self, mot: &str) -> bool {
        matches!(self.courant(), Some(Tok::Ident(n)) if n == mot)
    }

    /// Erreur au jeton courant (ou fin de texte).
    fn erreur(&self) -> ErreurSyntaxe {
        match self.jetons.get(self.pos) {
            Some(j) => ErreurSyntaxe::Invalide { colonne: j.colonne },
            None => ErreurSyntaxe::FinInattendue,
        }
    }

    fn consommer(&mut self, t: &Tok) -> bool {
        if self.est(t) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn exiger(&mut self, t: &Tok) -> Result<(), ErreurSyntaxe> {
        if self.consommer(t) {
            Ok(())
        } else {
            Err(self.erreur())
        }
    }

    fn entrer(&mut self) -> Result<(), ErreurSyntaxe> {
        self.profondeur += 1;
        if self.profondeur > MAX_IMBRICATION {
            return Err(ErreurSyntaxe::TropImbrique);
        }
        Ok(())
    }

    fn sortir(&mut self) {
        self.profondeur -= 1;
    }

    /// Vrai si le jeton courant peut terminer une liste d’éléments.
    fn fin_de_liste(&self) -> bool {
        matches!(
            self.courant(),
            None | Some(Tok::RPar) | Some(Tok::RCrochet)
        )
    }

    /* ------------------------ Grammaire ------------------------ */

    fn liste_racine(&mut self) -> Result<Expr, ErreurSyntaxe> {
        let premier = self.expression()?;
        if !self.est(&Tok::Virgule) {
            return Ok(premier);
        }

        let mut elements = vec![premier];
        while self.consommer(&Tok::Virgule) {
            if self.courant().is_none() {
                break;
            }
            elements.push(self.expression()?);
        }
        Ok(Expr::Tuple(elements))
    }

    fn expression(&mut self) -> Result<Expr, ErreurSyntaxe> {
        self.ou()
    }

    fn ou(&mut self) -> Result<Expr, ErreurSyntaxe> {
        let mut e = self.et()?;
        while self.est_mot("or") {
            self.pos += 1;
            let d = self.et()?;
            e = Expr::Ou(Box::new(e), Box::new(d));
        }
        Ok(e)
    }

    fn et(&mut self) -> Result<Expr, ErreurSyntaxe> {
        let mut e = self.non()?;
        while self.est_mot("and") {
            self.pos += 1;
            let d = self.non()?;
            e = Expr::Et(Box::new(e), Box::new(d));
        }
        Ok(e)
    }

    fn non(&mut self) -> Result<Expr, ErreurSyntaxe> {
        if self.est_mot("not") {
            self.pos += 1;
            self.entrer()?;
            let x = self.non()?;
            self.sortir();
            return Ok(Expr::Non(Box::new(x)));
        }
        self.comparaison()
    }

    fn comparaison(&mut self) -> Result<Expr, ErreurSyntaxe> {
        let premier = self.somme()?;
        let mut suite = Vec::new();

        loop {
            let op = match self.courant() {
                Some(Tok::Inf) => OpComparaison::Inf,
                Some(Tok::InfEgal) => OpComparaison::InfEgal,
                Some(Tok::Sup) => OpComparaison::Sup,
                Some(Tok::SupEgal) => OpComparaison::SupEgal,
                Some(Tok::EgalEgal) => OpComparaison::Egal,
                Some(Tok::Different) => OpComparaison::Different,
                _ => break,
            };
            self.pos += 1;
            suite.push((op, self.somme()?));
        }

        if suite.is_empty() {
            Ok(premier)
        } else {
            Ok(Expr::Comparaison(Box::new(premier), suite))
        }
    }

    fn somme(&mut self) -> Result<Expr, ErreurSyntaxe> {
        let mut e = self.terme()?;
        loop {
            let op = match self.courant() {
                Some(Tok::Plus) => OpBinaire::Add,
                Some(Tok::Moins) => OpBinaire::Sub,
                _ => break,
            };
            self.pos += 1;
            let d = self.terme()?;
            e = Expr::Binaire(op, Box::new(e), Box::new(d));
        }
        Ok(e)
    }

    fn terme(&mut self) -> Result<Expr, ErreurSyntaxe> {
        let mut e = self.unaire()?;
        loop {
            let op = match self.courant() {
                Some(Tok::Etoile) => OpBinaire::Mul,
                Some(Tok::Barre) => OpBinaire::Div,
                Some(Tok::DoubleBarre) => OpBinaire::DivEntiere,
                Some(Tok::Pourcent) => OpBinaire::Modulo,
                _ => break,
            };
            self.pos += 1;
            let d = self.unaire()?;
            e = Expr::Binaire(op, Box::new(e), Box::new(d));
        }
        Ok(e)
    }

    fn unaire(&mut self) -> Result<Expr, ErreurSyntaxe> {
        let op = match self.courant() {
            Some(Tok::Plus) => Some(OpUnaire::Plus),
            Some(Tok::Moins) => Some(OpUnaire::Moins),
            _ => None,
        };

        match op {
            Some(op) => {
                self.pos += 1;
                self.entrer()?;
                let x = self.unaire()?;
                self.sortir();
                Ok(Expr::Unaire(op, Box::new(x)))
            }
            None => self.puissance(),
        }
    }

    fn puissance(&mut self) -> Result<Expr, ErreurSyntaxe> {
        let base = self.primaire()?;
        if !self.consommer(&Tok::DoubleEtoile) {
            return Ok(base);
        }
        self.entrer()?;
        let exposant = self.unaire()?;
        self.sortir();
        Ok(Expr::Binaire(
            OpBinaire::Puissance,
            Box::new(base),
            Box::new(exposant),
        ))
    }

    fn primaire(&mut self) -> Result<Expr, ErreurSyntaxe> {
        let mut e = self.atome()?;

        loop {
            if self.consommer(&Tok::Point) {
                match self.courant() {
                    Some(Tok::Ident(n)) if !MOTS_RESERVES.contains(&n.as_str()) => {
                        let n = n.clone();
                        self.pos += 1;
                        e = Expr::Attribut(Box::new(e), n);
                    }
                    _ => return Err(self.erreur()),
                }
            } else if self.consommer(&Tok::LPar) {
                self.entrer()?;
                let (args, nommes) = self.arguments()?;
                self.sortir();
                e = Expr::Appel {
                    fonction: Box::new(e),
                    args,
                    nommes,
                };
            } else {
                return Ok(e);
            }
        }
    }

    /// Arguments d’appel (la '(' est déjà consommée ; consomme la ')').
    fn arguments(&mut self) -> Result<(Vec<Expr>, Vec<(String, Expr)>), ErreurSyntaxe> {
        let mut args = Vec::new();
        let mut nommes: Vec<(String, Expr)> = Vec::new();

        while !self.est(&Tok::RPar) {
            let colonne = self.jetons.get(self.pos).map(|j| j.colonne);

            // nom=valeur
            let etiquette = match (self.courant(), self.suivant()) {
                (Some(Tok::Ident(n)), Some(Tok::Egal)) => Some(n.clone()),
                _ => None,
            };

            if let Some(nom) = etiquette {
                self.pos += 2;
                if nommes.iter().any(|(n, _)| *n == nom) {
                    return Err(ErreurSyntaxe::Invalide {
                        colonne: colonne.unwrap_or(1),
                    });
                }
                let v = self.expression()?;
                nommes.push((nom, v));
            } else {
                // un positionnel après un nommé est interdit
                if !nommes.is_empty() {
                    return Err(self.erreur());
                }
                args.push(self.expression()?);
            }

            if !self.consommer(&Tok::Virgule) {
                break;
            }
        }

        self.exiger(&Tok::RPar)?;
        Ok((args, nommes))
    }

    /// Éléments séparés par des virgules jusqu’à `fermant` (consommé).
    /// Retourne aussi si une virgule a été vue (distingue "(1)" de "(1,)").
    fn elements(&mut self, fermant: &Tok) -> Result<(Vec<Expr>, bool), ErreurSyntaxe> {
        let mut v = Vec::new();
        let mut virgule = false;

        while !self.fin_de_liste() {
            v.push(self.expression()?);
            if self.consommer(&Tok::Virgule) {
                virgule = true;
            } else {
                break;
            }
        }

        self.exiger(fermant)?;
        Ok((v, virgule))
    }

    fn atome(&mut self) -> Result<Expr, ErreurSyntaxe> {
        let tok = match self.courant() {
            Some(t) => t.clone(),
            None => return Err(ErreurSyntaxe::FinInattendue),
        };

        match tok {
            Tok::Entier(n) => {
                self.pos += 1;
                Ok(Expr::Const(Valeur::Entier(n)))
            }
            Tok::Reel(x) => {
                self.pos += 1;
                Ok(Expr::Const(Valeur::Reel(x)))
            }
            Tok::Texte(s) => {
                // 'a' 'b' => 'ab'
                let mut texte = s;
                self.pos += 1;
                while let Some(Tok::Texte(suite)) = self.courant() {
                    texte.push_str(suite);
                    self.pos += 1;
                }
                Ok(Expr::Const(Valeur::Texte(texte)))
            }
            Tok::Ident(nom) => {
                let e = match nom.as_str() {
                    "True" => Expr::Const(Valeur::Booleen(true)),
                    "False" => Expr::Const(Valeur::Booleen(false)),
                    "None" => Expr::Const(Valeur::Rien),
                    n if MOTS_RESERVES.contains(&n) => return Err(self.erreur()),
                    _ => Expr::Nom(nom.clone()),
                };
                self.pos += 1;
                Ok(e)
            }
            Tok::LPar => {
                self.pos += 1;
                self.entrer()?;
                let (mut v, virgule) = self.elements(&Tok::RPar)?;
                self.sortir();
                if v.len() == 1 && !virgule {
                    Ok(v.remove(0))
                } else {
                    Ok(Expr::Tuple(v))
                }
            }
            Tok::LCrochet => {
                self.pos += 1;
                self.entrer()?;
                let (v, _) = self.elements(&Tok::RCrochet)?;
                self.sortir();
                Ok(Expr::Liste(v))
            }
            _ => Err(self.erreur()),
        }
    }
}
