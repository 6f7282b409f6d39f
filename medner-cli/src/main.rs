//! Linha de comando: recebe o texto reconhecido pelo OCR e mostra médico, hospital e data

use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use medner_core::{DocumentFields, EmissionTableEngine, NerPipeline, PipelineConfig, Vocabulary};
use serde::Serialize;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "medner")]
#[command(about = "Extrai médico, hospital e data de texto reconhecido por OCR", long_about = None)]
#[command(version)]
struct Cli {
    /// Dicionário de palavras (JSON: {"palavra": id})
    #[arg(long)]
    words: PathBuf,

    /// Dicionário de labels (JSON: {"id": "B-TIPO"})
    #[arg(long)]
    labels: PathBuf,

    /// Tabela de emissão do modelo (JSON: {"id": [scores...]})
    #[arg(long)]
    weights: PathBuf,

    /// Arquivo de configuração do pipeline (JSON)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Sobrescreve o comprimento fixo da sequência
    #[arg(long)]
    max_length: Option<usize>,

    /// Mapeia palavras desconhecidas para o id 0 em vez de descartá-las
    #[arg(long)]
    keep_unknown: bool,

    /// Falha se um dicionário não puder ser carregado (padrão: segue com dicionário vazio)
    #[arg(long)]
    strict: bool,

    /// Saída em JSON
    #[arg(long)]
    json: bool,

    /// Log em nível debug
    #[arg(long, short)]
    verbose: bool,

    /// Texto reconhecido; lido da entrada padrão se omitido
    text: Option<String>,
}

#[derive(Serialize)]
struct JsonOutput<'a> {
    entities: &'a medner_core::EntityMap,
    fields: DocumentFields,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with_writer(std::io::stderr)
        .init();

    let pipeline = match build_pipeline(&cli) {
        Ok(pipeline) => Arc::new(pipeline),
        Err(message) => {
            error!("{message}");
            return ExitCode::FAILURE;
        }
    };

    let text = match cli.text.clone() {
        Some(text) => text,
        None => {
            let mut buffer = String::new();
            if let Err(e) = std::io::stdin().read_to_string(&mut buffer) {
                error!("falha ao ler a entrada padrão: {e}");
                return ExitCode::FAILURE;
            }
            buffer
        }
    };

    if text.trim().is_empty() {
        warn!("No text detected!");
    }

    info!("Analisando {} chars", text.len());
    let entities = Arc::clone(&pipeline).extract_detached(text).await;
    let fields = DocumentFields::from_entities(&entities);

    if cli.json {
        let output = JsonOutput {
            entities: &entities,
            fields,
        };
        match serde_json::to_string_pretty(&output) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                error!("falha ao serializar o resultado: {e}");
                return ExitCode::FAILURE;
            }
        }
    } else {
        println!("{fields}");
    }

    ExitCode::SUCCESS
}

fn build_pipeline(cli: &Cli) -> Result<NerPipeline, String> {
    let mut config = match &cli.config {
        Some(path) => PipelineConfig::from_json_file(path).map_err(|e| e.to_string())?,
        None => PipelineConfig::default(),
    };
    if let Some(max_length) = cli.max_length {
        config.max_length = max_length;
    }
    if cli.keep_unknown {
        config.drop_unknown = false;
    }

    let vocabulary = if cli.strict {
        Vocabulary::load(&cli.words, &cli.labels).map_err(|e| e.to_string())?
    } else {
        Vocabulary::load_or_empty(&cli.words, &cli.labels)
    };
    info!(
        words = vocabulary.word_count(),
        classes = vocabulary.num_classes(),
        "vocabulário carregado"
    );

    let engine = EmissionTableEngine::from_json_file(&cli.weights).map_err(|e| e.to_string())?;

    NerPipeline::new(vocabulary, engine, config).map_err(|e| e.to_string())
}
