// src/app/vue.rs
//
// Vue (UI egui)
// -------------
// - Clavier : Enter évalue (quand le champ est focus), Esc efface l’entrée (app.rs)
// - Gros boutons, focus redonné après clic (focus_entree)
// - Résultat, ou message + suggestion
// - Historique cliquable, assistant optionnel, démarche repliable
//
// Note : pas de Key::NumEnter (n’existe pas dans egui 0.33.x)

use eframe::egui;

use super::controleur::AppCalc;

/// Nombre d’entrées d’historique montrées (les plus récentes).
const HISTORIQUE_VISIBLE: usize = 50;

impl AppCalc {
    /// UI principale : à appeler depuis eframe::App::update(...)
    pub fn ui(&mut self, ui: &mut egui::Ui) {
        // Densité “calc”
        ui.spacing_mut().item_spacing = egui::vec2(6.0, 6.0);

        egui::ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| {
                ui.heading("Calculatrice sûre");
                ui.add_space(6.0);

                self.ui_entree(ui);

                ui.add_space(8.0);
                ui.separator();
                ui.add_space(8.0);

                self.ui_resultats(ui);

                ui.add_space(8.0);
                ui.separator();

                self.ui_historique(ui);
                self.ui_assistant(ui);
                self.ui_demarche(ui);

                if !self.etat.statut.is_empty() {
                    ui.add_space(6.0);
                    ui.small(&self.etat.statut);
                }
            });
    }

    fn ui_entree(&mut self, ui: &mut egui::Ui) {
        ui.label("Entrée :");

        // id stable + focus contrôlé
        let resp = ui.add(
            egui::TextEdit::singleline(&mut self.etat.entree)
                .desired_width(ui.available_width())
                .hint_text("Ex: 2^10, sqrt(16) + 1, round(pi, 3)")
                .id_source("entree_edit")
                .code_editor(),
        );

        if self.etat.focus_entree {
            resp.request_focus();
            self.etat.focus_entree = false;
        }

        // Enter ne déclenche que depuis le champ (une ligne : Enter lui retire le focus).
        let enter = ui.input(|i| i.key_pressed(egui::Key::Enter));
        if enter && (resp.has_focus() || resp.lost_focus()) {
            self.soumettre_entree();
            self.etat.focus_entree = true;
        }

        ui.add_space(6.0);

        ui.horizontal(|ui| {
            // C = entrée seulement ; CLR = résultats seulement ; AC = tout
            self.bouton_action(ui, "C", "Efface seulement l’entrée", Action::ClearEntree);
            self.bouton_action(
                ui,
                "CLR",
                "Efface résultat + erreur + démarche",
                Action::ClearResultats,
            );
            self.bouton_action(ui, "AC", "Remise à zéro totale", Action::ResetTotal);
        });

        ui.add_space(8.0);

        // Touches rapides + fonctions + "="
        ui.horizontal_wrapped(|ui| {
            self.bouton_insert(ui, "(", "(", InsertKind::OpenParen);
            self.bouton_insert(ui, ")", ")", InsertKind::CloseParen);
            self.bouton_insert(ui, ",", ",", InsertKind::Comma);

            self.bouton_insert(ui, "+", "+", InsertKind::Op);
            self.bouton_insert(ui, "-", "-", InsertKind::Op);
            self.bouton_insert(ui, "*", "*", InsertKind::Op);
            self.bouton_insert(ui, "/", "/", InsertKind::Op);
            self.bouton_insert(ui, "%", "%", InsertKind::Op);
            self.bouton_insert(ui, "^", "^", InsertKind::Op);

            ui.separator();

            self.bouton_insert(ui, "pi", "pi", InsertKind::Word);
            self.bouton_insert(ui, "e", "e", InsertKind::Word);
            for f in FONCTIONS {
                self.bouton_insert(ui, f, &format!("{f}("), InsertKind::Func);
            }

            ui.add_space(10.0);

            let eq = ui.add_sized([64.0, 32.0], egui::Button::new("="));
            if eq.clicked() {
                self.soumettre_entree();
                self.etat.focus_entree = true;
            }
        });

        ui.add_space(8.0);

        self.ui_pave_numerique(ui);
    }

    fn ui_pave_numerique(&mut self, ui: &mut egui::Ui) {
        egui::Grid::new("pave_numerique")
            .num_columns(4)
            .spacing([6.0, 6.0])
            .show(ui, |ui| {
                self.bouton_insert(ui, "7", "7", InsertKind::Digit);
                self.bouton_insert(ui, "8", "8", InsertKind::Digit);
                self.bouton_insert(ui, "9", "9", InsertKind::Digit);
                self.bouton_action(ui, "DEL", "Efface le dernier symbole", Action::Backspace);
                ui.end_row();

                self.bouton_insert(ui, "4", "4", InsertKind::Digit);
                self.bouton_insert(ui, "5", "5", InsertKind::Digit);
                self.bouton_insert(ui, "6", "6", InsertKind::Digit);
                self.bouton_insert(ui, "//", "//", InsertKind::Op);
                ui.end_row();

                self.bouton_insert(ui, "1", "1", InsertKind::Digit);
                self.bouton_insert(ui, "2", "2", InsertKind::Digit);
                self.bouton_insert(ui, "3", "3", InsertKind::Digit);
                self.bouton_insert(ui, ".", ".", InsertKind::Digit);
                ui.end_row();

                self.bouton_insert(ui, "0", "0", InsertKind::Digit);
                self.bouton_insert(ui, "E", "e", InsertKind::Digit); // 1e5
                ui.label("");
                ui.label("");
                ui.end_row();
            });
    }

    fn ui_resultats(&mut self, ui: &mut egui::Ui) {
        ui.label("Résultat :");
        Self::champ_monospace(ui, "resultat_out", &self.etat.resultat, 1);

        if !self.etat.erreur.is_empty() {
            ui.add_space(6.0);
            ui.colored_label(ui.visuals().error_fg_color, &self.etat.erreur);
            ui.label(&self.etat.suggestion);
        }
    }

    fn ui_historique(&mut self, ui: &mut egui::Ui) {
        let mut a_reutiliser = None;
        let mut effacer = false;

        egui::CollapsingHeader::new(format!("Historique ({})", self.historique().len()))
            .default_open(true)
            .show(ui, |ui| {
                let entrees = self.historique().entrees();
                if entrees.is_empty() {
                    ui.weak("vide");
                    return;
                }

                egui::ScrollArea::vertical()
                    .id_salt("historique_liste")
                    .max_height(160.0)
                    .show(ui, |ui| {
                        // Plus récent en haut
                        for (i, e) in entrees
                            .iter()
                            .enumerate()
                            .rev()
                            .take(HISTORIQUE_VISIBLE)
                        {
                            let resp = ui
                                .selectable_label(false, egui::RichText::new(e.resume()).monospace())
                                .on_hover_text(format!(
                                    "{} (clic : réutiliser)",
                                    e.horodatage.format("%Y-%m-%d %H:%M:%S UTC")
                                ));
                            if resp.clicked() {
                                a_reutiliser = Some(i);
                            }
                        }
                    });

                if ui.button("Effacer l’historique").clicked() {
                    effacer = true;
                }
            });

        if let Some(i) = a_reutiliser {
            self.reutiliser(i);
        }
        if effacer {
            self.effacer_historique();
        }
    }

    fn ui_assistant(&mut self, ui: &mut egui::Ui) {
        if !self.assistant_actif() {
            return;
        }

        egui::CollapsingHeader::new("Assistant")
            .default_open(false)
            .show(ui, |ui| {
                ui.add(
                    egui::TextEdit::multiline(&mut self.etat.question)
                        .desired_rows(2)
                        .desired_width(ui.available_width())
                        .hint_text("Question (le dernier calcul est joint)")
                        .id_source("question_edit"),
                );

                ui.horizontal(|ui| {
                    let occupe = self.etat.assistant_occupe;
                    let envoyer = ui.add_enabled(!occupe, egui::Button::new("Demander"));
                    if envoyer.clicked() {
                        let question = self.etat.question.clone();
                        self.demander_assistant(&question);
                    }
                    if occupe {
                        ui.spinner();
                    }
                });

                if !self.etat.reponse_assistant.is_empty() {
                    Self::champ_monospace(ui, "reponse_assistant", &self.etat.reponse_assistant, 3);
                }
            });
    }

    fn ui_demarche(&mut self, ui: &mut egui::Ui) {
        egui::CollapsingHeader::new("Démarche")
            .default_open(false)
            .show(ui, |ui| {
                let d = &self.etat.demarche;
                Self::champ_demarche(ui, "Normalisée", "demarche_normalisee", &d.normalisee);
                Self::champ_demarche(ui, "Noms", "demarche_noms", &d.noms.join(", "));
                Self::champ_demarche(
                    ui,
                    "Profondeur",
                    "demarche_profondeur",
                    &d.profondeur.to_string(),
                );
            });
    }

    fn champ_demarche(ui: &mut egui::Ui, titre: &str, id: &str, contenu: &str) {
        ui.add_space(4.0);
        ui.label(format!("{titre} :"));
        Self::champ_monospace(ui, id, contenu, 1);
    }

    fn champ_monospace(ui: &mut egui::Ui, id: &str, contenu: &str, rows: usize) {
        // Lecture seule, sans TextEdit interactif : cadre + label monospace.
        egui::Frame::group(ui.style())
            .fill(ui.visuals().extreme_bg_color)
            .show(ui, |ui| {
                ui.push_id(id, |ui| {
                    ui.set_min_width(ui.available_width());
                    ui.set_min_height(
                        rows as f32 * ui.text_style_height(&egui::TextStyle::Monospace),
                    );
                    ui.monospace(contenu);
                });
            });
    }

    fn bouton_action(&mut self, ui: &mut egui::Ui, label: &str, tip: &str, action: Action) {
        let resp = ui
            .add_sized([56.0, 30.0], egui::Button::new(label))
            .on_hover_text(tip);

        if resp.clicked() {
            match action {
                Action::ClearEntree => self.etat.clear_entree(),
                Action::ClearResultats => self.etat.clear_resultats(),
                Action::ResetTotal => self.etat.reset_total(),
                Action::Backspace => backspace(&mut self.etat.entree),
            }
            self.etat.focus_entree = true;
        }
    }

    fn bouton_insert(&mut self, ui: &mut egui::Ui, label: &str, to_insert: &str, kind: InsertKind) {
        let resp = ui.add_sized([46.0, 28.0], egui::Button::new(label));
        if resp.clicked() {
            inserer(&mut self.etat.entree, to_insert, kind);
            self.etat.focus_entree = true;
        }
    }
}

/// Fonctions proposées en boutons (toutes dans la liste autorisée).
const FONCTIONS: &[&str] = &[
    "sqrt", "sin", "cos", "tan", "log", "exp", "abs", "round", "min", "max", "factorial",
];

#[derive(Clone, Copy, Debug)]
enum Action {
    ClearEntree,
    ClearResultats,
    ResetTotal,
    Backspace,
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum InsertKind {
    Digit,
    Word,
    Func,
    Op,
    Comma,
    OpenParen,
    CloseParen,
}

fn retirer_espaces_finaux(s: &mut String) {
    while s.ends_with(' ') {
        s.pop();
    }
}

/// Insertion avec espacement lisible (opérateurs entourés, pas d’espace dans les nombres).
fn inserer(entree: &mut String, to_insert: &str, kind: InsertKind) {
    if to_insert.is_empty() {
        return;
    }

    match kind {
        InsertKind::CloseParen | InsertKind::Comma => {
            retirer_espaces_finaux(entree);
            entree.push_str(to_insert);
            if kind == InsertKind::Comma {
                entree.push(' ');
            }
        }
        InsertKind::OpenParen | InsertKind::Func => {
            let last = entree.chars().rev().find(|c| !c.is_whitespace());
            if let Some(c) = last {
                if c.is_ascii_digit() || c.is_ascii_alphabetic() || c == ')' {
                    entree.push(' ');
                }
            }
            entree.push_str(to_insert);
        }
        InsertKind::Op => {
            retirer_espaces_finaux(entree);
            if !entree.is_empty() {
                entree.push(' ');
            }
            entree.push_str(to_insert);
            entree.push(' ');
        }
        InsertKind::Digit => {
            // chiffres : pas d’espaces auto
            entree.push_str(to_insert);
        }
        InsertKind::Word => {
            // mots : espace si juste avant c’est un chiffre ou ')'
            if !entree.ends_with(char::is_whitespace) {
                if let Some(c) = entree.chars().next_back() {
                    if c.is_ascii_digit() || c == ')' {
                        entree.push(' ');
                    }
                }
            }
            entree.push_str(to_insert);
        }
    }
}

/// Backspace “intelligent” : retire d’un coup un appel de fonction ouvert ("sqrt(") ou un opérateur.
fn backspace(entree: &mut String) {
    retirer_espaces_finaux(entree);
    if entree.is_empty() {
        return;
    }

    let motif = FONCTIONS
        .iter()
        .map(|f| format!("{f}("))
        .chain(["**", "//", "pi"].map(String::from))
        .find(|m| entree.ends_with(m.as_str()));

    match motif {
        Some(m) => entree.truncate(entree.len() - m.len()),
        None => {
            entree.pop();
        }
    }
    retirer_espaces_finaux(entree);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tape(touches: &[(&str, InsertKind)]) -> String {
        let mut s = String::new();
        for (t, k) in touches {
            inserer(&mut s, t, *k);
        }
        s
    }

    #[test]
    fn insertion_espacee() {
        use InsertKind::*;
        assert_eq!(
            tape(&[("2", Digit), ("^", Op), ("1", Digit), ("0", Digit)]),
            "2 ^ 10"
        );
        assert_eq!(
            tape(&[("sqrt(", Func), ("1", Digit), ("6", Digit), (")", CloseParen)]),
            "sqrt(16)"
        );
        assert_eq!(
            tape(&[("max(", Func), ("1", Digit), (",", Comma), ("2", Digit), (")", CloseParen)]),
            "max(1, 2)"
        );
        assert_eq!(tape(&[("2", Digit), ("pi", Word)]), "2 pi");
    }

    #[test]
    fn backspace_par_motif() {
        let mut s = "1 + sqrt(".to_string();
        backspace(&mut s);
        assert_eq!(s, "1 +");
        backspace(&mut s);
        assert_eq!(s, "1");
        backspace(&mut s);
        assert_eq!(s, "");
        backspace(&mut s);
        assert_eq!(s, "");

        let mut s = "2 // ".to_string();
        backspace(&mut s);
        assert_eq!(s, "2");
    }

    #[test]
    fn boutons_uniquement_autorises() {
        for f in FONCTIONS {
            assert!(crate::noyau::autorises::est_autorise(f), "{f}");
        }
    }
}
