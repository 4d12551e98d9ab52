// src/noyau/jetons.rs
//
// Tokenisation de l’expression (après normalisation ^ -> **).
// Supporte:
// - entiers (12, 1_000, 0x1F, 0o17, 0b101) et flottants (1.5, .5, 1., 2e-3)
// - chaînes '...' et "..." (échappements simples)
// - identifiants (unicode) ; les mots-clés sont décidés par l’analyse
// - opérateurs + - * ** / // % < <= > >= == != = , . ( ) [ ]

use num_bigint::BigInt;
use num_traits::Num;

use super::erreur::ErreurSyntaxe;

#[derive(Clone, Debug, PartialEq)]
pub enum Tok {
    Entier(BigInt),
    Reel(f64),
    Texte(String),
    Ident(String),

    Plus,
    Moins,
    Etoile,
    DoubleEtoile,
    Barre,
    DoubleBarre,
    Pourcent,

    Inf,
    InfEgal,
    Sup,
    SupEgal,
    EgalEgal,
    Different,
    Egal,

    Virgule,
    Point,
    LPar,
    RPar,
    LCrochet,
    RCrochet,
}

/// Jeton + colonne (1 = premier caractère), pour les messages de syntaxe.
#[derive(Clone, Debug, PartialEq)]
pub struct Jeton {
    pub tok: Tok,
    pub colonne: usize,
}

/// Tokenize une chaîne en jetons.
pub fn tokenize(s: &str) -> Result<Vec<Jeton>, ErreurSyntaxe> {
    let chars: Vec<char> = s.chars().collect();
    let mut out = Vec::new();
    let mut i: usize = 0;

    while i < chars.len() {
        let c = chars[i];
        let colonne = i + 1;

        if c.is_whitespace() {
            i += 1;
            continue;
        }

        // Nombre (y compris ".5")
        if c.is_ascii_digit()
            || (c == '.' && i + 1 < chars.len() && chars[i + 1].is_ascii_digit())
        {
            let (tok, suite) = lire_nombre(&chars, i)?;
            out.push(Jeton { tok, colonne });
            i = suite;
            continue;
        }

        // Identifiant
        if c.is_alphabetic() || c == '_' {
            let start = i;
            while i < chars.len() && (chars[i].is_alphanumeric() || chars[i] == '_') {
                i += 1;
            }
            let mot: String = chars[start..i].iter().collect();
            out.push(Jeton {
                tok: Tok::Ident(mot),
                colonne,
            });
            continue;
        }

        // Chaîne
        if c == '\'' || c == '"' {
            let (texte, suite) = lire_chaine(&chars, i)?;
            out.push(Jeton {
                tok: Tok::Texte(texte),
                colonne,
            });
            i = suite;
            continue;
        }

        // Opérateurs (deux caractères d’abord)
        let suivant = chars.get(i + 1).copied();
        let (tok, largeur) = match (c, suivant) {
            ('*', Some('*')) => (Tok::DoubleEtoile, 2),
            ('/', Some('/')) => (Tok::DoubleBarre, 2),
            ('<', Some('=')) => (Tok::InfEgal, 2),
            ('>', Some('=')) => (Tok::SupEgal, 2),
            ('=', Some('=')) => (Tok::EgalEgal, 2),
            ('!', Some('=')) => (Tok::Different, 2),
            ('+', _) => (Tok::Plus, 1),
            ('-', _) => (Tok::Moins, 1),
            ('*', _) => (Tok::Etoile, 1),
            ('/', _) => (Tok::Barre, 1),
            ('%', _) => (Tok::Pourcent, 1),
            ('<', _) => (Tok::Inf, 1),
            ('>', _) => (Tok::Sup, 1),
            ('=', _) => (Tok::Egal, 1),
            (',', _) => (Tok::Virgule, 1),
            ('.', _) => (Tok::Point, 1),
            ('(', _) => (Tok::LPar, 1),
            (')', _) => (Tok::RPar, 1),
            ('[', _) => (Tok::LCrochet, 1),
            (']', _) => (Tok::RCrochet, 1),
            // Ponctuation reconnue mais hors grammaire : erreur de syntaxe, pas de caractère invalide
            ('&' | '|' | '~' | '@' | ':' | ';' | '{' | '}' | '!', _) => {
                return Err(ErreurSyntaxe::Invalide { colonne });
            }
            _ => {
                return Err(ErreurSyntaxe::CaractereInvalide {
                    caractere: c,
                    colonne,
                })
            }
        };
        out.push(Jeton { tok, colonne });
        i += largeur;
    }

    Ok(out)
}

/// Lit un littéral numérique à partir de `debut`. Retourne (jeton, index suivant).
fn lire_nombre(chars: &[char], debut: usize) -> Result<(Tok, usize), ErreurSyntaxe> {
    let colonne = debut + 1;
    let invalide = ErreurSyntaxe::LitteralInvalide { colonne };

    // Préfixes 0x / 0o / 0b
    if chars[debut] == '0' {
        let base = match chars.get(debut + 1) {
            Some('x' | 'X') => Some(16),
            Some('o' | 'O') => Some(8),
            Some('b' | 'B') => Some(2),
            _ => None,
        };
        if let Some(base) = base {
            let mut i = debut + 2;
            let mut chiffres = String::new();
            while i < chars.len() && (chars[i].is_ascii_alphanumeric() || chars[i] == '_') {
                if chars[i] != '_' {
                    chiffres.push(chars[i]);
                }
                i += 1;
            }
            if chiffres.is_empty() {
                return Err(invalide);
            }
            let n = BigInt::from_str_radix(&chiffres, base).map_err(|_| invalide)?;
            return Ok((Tok::Entier(n), i));
        }
    }

    let mut i = debut;
    let mut texte = String::new();
    let mut est_reel = false;

    lire_chiffres(chars, &mut i, &mut texte, &invalide)?;

    if i < chars.len() && chars[i] == '.' {
        est_reel = true;
        texte.push('.');
        i += 1;
        if i < chars.len() && chars[i].is_ascii_digit() {
            lire_chiffres(chars, &mut i, &mut texte, &invalide)?;
        }
    }

    if i < chars.len() && (chars[i] == 'e' || chars[i] == 'E') {
        let signe = matches!(chars.get(i + 1), Some('+' | '-'));
        let premier = if signe { i + 2 } else { i + 1 };
        if chars.get(premier).is_some_and(|c| c.is_ascii_digit()) {
            est_reel = true;
            texte.push('e');
            if signe {
                texte.push(chars[i + 1]);
            }
            i = premier;
            lire_chiffres(chars, &mut i, &mut texte, &invalide)?;
        }
    }

    // "2x", "1j", "3e" : littéral collé à un identifiant
    if i < chars.len() && (chars[i].is_alphanumeric() || chars[i] == '_') {
        return Err(invalide);
    }

    if est_reel {
        let v: f64 = texte.parse().map_err(|_| invalide)?;
        return Ok((Tok::Reel(v), i));
    }

    // Zéros de tête interdits en décimal ("007"), sauf "0", "00"...
    if texte.len() > 1 && texte.starts_with('0') && texte.chars().any(|c| c != '0') {
        return Err(invalide);
    }

    let n = BigInt::parse_bytes(texte.as_bytes(), 10).ok_or(invalide)?;
    Ok((Tok::Entier(n), i))
}

/// Chiffres décimaux avec '_' autorisé ENTRE deux chiffres.
fn lire_chiffres(
    chars: &[char],
    i: &mut usize,
    texte: &mut String,
    invalide: &ErreurSyntaxe,
) -> Result<(), ErreurSyntaxe> {
    let mut precedent_souligne = false;
    let mut vu = false;
    while *i < chars.len() {
        let c = chars[*i];
        if c.is_ascii_digit() {
            texte.push(c);
            vu = true;
            precedent_souligne = false;
        } else if c == '_' && vu && !precedent_souligne {
            precedent_souligne = true;
        } else {
            break;
        }
        *i += 1;
    }
    if precedent_souligne {
        return Err(invalide.clone());
    }
    Ok(())
}

fn lire_chaine(chars: &[char], debut: usize) -> Result<(String, usize), ErreurSyntaxe> {
    let quote = chars[debut];
    let mut i = debut + 1;
    let mut out = String::new();

    while i < chars.len() {
        let c = chars[i];
        if c == quote {
            return Ok((out, i + 1));
        }
        if c == '\\' && i + 1 < chars.len() {
            let e = chars[i + 1];
            match e {
                'n' => out.push('\n'),
                't' => out.push('\t'),
                '\\' | '\'' | '"' => out.push(e),
                _ => {
                    out.push('\\');
                    out.push(e);
                }
            }
            i += 2;
            continue;
        }
        out.push(c);
        i += 1;
    }

    Err(ErreurSyntaxe::ChaineNonTerminee { colonne: debut + 1 })
}
