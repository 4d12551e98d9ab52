// src/app.rs
//
// Module App (racine)
// -------------------
// Rôle:
// - Déclarer les sous-modules (etat.rs, controleur.rs, vue.rs)
// - Ré-exporter AppCalc (pour main.rs: use crate::app::AppCalc;)
// - Fournir l’impl eframe::App
//
// Enter est géré dans vue.rs (quand le champ a le focus) ; ici seulement Esc
// et le relevé de la réponse de l’assistant.

pub mod controleur;
pub mod etat;
pub mod vue;

pub use controleur::AppCalc;

use std::time::Duration;

use eframe::egui;

impl eframe::App for AppCalc {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ESC = effacer seulement l’entrée (comme bouton "C").
        let esc = ctx.input(|i| i.key_pressed(egui::Key::Escape));
        if esc {
            self.etat.clear_entree();
        }

        self.poll_assistant();
        if self.etat.assistant_occupe {
            // Rien ne réveille l’UI quand la réponse arrive : on repasse régulièrement.
            ctx.request_repaint_after(Duration::from_millis(100));
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            self.ui(ui);
        });
    }
}
