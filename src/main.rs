// src/main.rs
//
// Calculatrice sûre : point d’entrée
// -----------------------------------
// - Sans argument        : fenêtre native (eframe::run_native)
// - --eval "<expr>"      : évaluation unique en ligne de commande
//   (valeur sur stdout ; sinon message + suggestion sur stderr, code 1)
// - Journal              : RUST_LOG, sinon --verbose (debug), sinon [journal] niveau

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use eframe::egui;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod app;
mod assistant;
mod config;
mod historique;
mod noyau;

use app::AppCalc;
use config::Config;

const TITRE_APP: &str = "Calculatrice sûre";

#[derive(Debug, Parser)]
#[command(name = "calculatrice_sure", version, about = "Calculatrice à évaluation sûre")]
struct Cli {
    /// Fichier de configuration TOML (défaut : <config_dir>/calculatrice_sure/config.toml)
    #[arg(short, long, value_name = "CHEMIN")]
    config: Option<PathBuf>,

    /// Journal détaillé (niveau debug)
    #[arg(short, long)]
    verbose: bool,

    /// Évalue une expression puis quitte (sans fenêtre)
    #[arg(short, long, value_name = "EXPRESSION")]
    eval: Option<String>,
}

fn initialiser_journal(verbose: bool, niveau: &str) {
    let defaut = if verbose { "debug" } else { niveau };
    let filtre = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(defaut))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filtre)
        .with_writer(std::io::stderr)
        .init();
}

/// Mode ligne de commande : pas d’historique, pas d’assistant. true si succès.
/// Une entrée blanche ne fait rien.
fn evaluer_une_fois(expr: &str) -> bool {
    let expr = expr.trim();
    if expr.is_empty() {
        return true;
    }
    let issue = noyau::evaluer(expr);
    if issue.est_succes() {
        println!("{}", issue.texte_utilisateur());
    } else {
        eprintln!("{}", issue.texte_utilisateur());
    }
    issue.est_succes()
}

fn lancer_fenetre(config: &Config) -> anyhow::Result<()> {
    let app = AppCalc::depuis_config(config);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(TITRE_APP)
            .with_inner_size([560.0, 780.0])
            .with_min_inner_size([420.0, 620.0]),
        ..Default::default()
    };

    eframe::run_native(TITRE_APP, options, Box::new(|_cc| Ok(Box::new(app))))
        .map_err(|e| anyhow::anyhow!("fenêtre: {e}"))
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let config = Config::charger(cli.config.as_deref()).context("chargement de la configuration")?;
    initialiser_journal(cli.verbose, &config.journal.niveau);

    if let Some(expr) = &cli.eval {
        return Ok(if evaluer_une_fois(expr) {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        });
    }

    info!(
        historique = config.historique.actif,
        assistant = config.assistant.actif,
        "démarrage"
    );
    lancer_fenetre(&config)?;
    Ok(ExitCode::SUCCESS)
}
