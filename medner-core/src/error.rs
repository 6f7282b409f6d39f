//! # Erros do Pipeline
//!
//! Cada estágio tem seu próprio tipo de erro. Nenhum deles derruba o processo:
//! [`NerPipeline::extract`](crate::pipeline::NerPipeline::extract) converte qualquer
//! falha em um mapa de entidades vazio.

use std::path::PathBuf;

use thiserror::Error;

/// Falhas ao carregar os dicionários (palavras e labels).
#[derive(Debug, Error)]
pub enum VocabularyError {
    #[error("falha ao ler {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON inválido no dicionário: {0}")]
    Json(#[from] serde_json::Error),

    /// Id de palavra fora do intervalo suportado (negativo ou grande demais).
    #[error("id inválido para a palavra {word:?}: {value}")]
    InvalidId { word: String, value: i64 },
}

/// Falhas do motor de inferência (caixa-preta).
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EngineError {
    /// A saída não tem o formato `max_length × num_classes`.
    #[error("formato de saída inesperado: esperado {expected_rows}x{expected_cols}, obtido {rows}x{cols}")]
    ShapeMismatch {
        expected_rows: usize,
        expected_cols: usize,
        rows: usize,
        cols: usize,
    },

    /// O acesso exclusivo ao motor não pôde ser obtido (lock envenenado).
    #[error("motor indisponível: {0}")]
    Unavailable(String),

    #[error("falha na inferência: {0}")]
    Failed(String),

    /// Os pesos do motor não puderam ser carregados.
    #[error("falha ao carregar o modelo: {0}")]
    Load(String),
}

/// Falhas de uma única chamada de extração.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ExtractError {
    /// Nenhum token do texto existe no vocabulário.
    #[error("nenhum token reconhecido no texto")]
    NoRecognizableTokens,

    #[error(transparent)]
    Inference(#[from] EngineError),
}

/// Falhas ao carregar ou validar a configuração.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("falha ao ler {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON de configuração inválido: {0}")]
    Json(#[from] serde_json::Error),

    #[error("configuração inválida: {0}")]
    Invalid(String),
}
