//! # Codificador de Sequência
//!
//! Converte as palavras em ids do vocabulário e ajusta a sequência ao comprimento
//! fixo do modelo:
//!
//! - Palavras desconhecidas são **descartadas** (política padrão, `drop_unknown = true`)
//!   ou viram o id sentinela `0`.
//! - Sequências curtas recebem padding à direita com `0`.
//! - Sequências longas são truncadas à direita (os ids finais são descartados).
//!
//! ```text
//! ["dr", "smith", "xyz"] → [1, 2] → [1, 2, 0, 0, ..., 0]   (16 posições)
//! ```

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::PipelineConfig;
use crate::error::ExtractError;
use crate::vocabulary::{Vocabulary, PAD_ID};

/// Entrada do modelo com comprimento sempre igual a `max_length`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodedInput {
    ids: Vec<u32>,
    /// Quantos ids vieram de palavras (antes do padding, depois do truncamento).
    known: usize,
}

impl EncodedInput {
    pub fn ids(&self) -> &[u32] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Posições ocupadas por palavras (o resto é padding).
    pub fn known(&self) -> usize {
        self.known
    }

    /// Representação numérica aceita pelo motor: ids convertidos para `f32`, sem escala.
    pub fn to_model_input(&self) -> Vec<f32> {
        self.ids.iter().map(|&id| id as f32).collect()
    }
}

/// Codifica as palavras de um texto segundo o vocabulário e a configuração.
///
/// Retorna [`ExtractError::NoRecognizableTokens`] quando nenhuma palavra é conhecida.
pub fn encode(
    words: &[String],
    vocabulary: &Vocabulary,
    config: &PipelineConfig,
) -> Result<EncodedInput, ExtractError> {
    let mut recognized = 0usize;
    let mut ids: Vec<u32> = Vec::with_capacity(words.len().max(config.max_length));

    for word in words {
        match vocabulary.word_id(word) {
            Some(id) => {
                recognized += 1;
                ids.push(id);
            }
            None if !config.drop_unknown => ids.push(PAD_ID),
            None => {}
        }
    }

    if recognized == 0 {
        debug!(words = words.len(), "nenhuma palavra do texto está no vocabulário");
        return Err(ExtractError::NoRecognizableTokens);
    }

    ids.truncate(config.max_length);
    let known = ids.len();
    ids.resize(config.max_length, PAD_ID);

    debug!(recognized, known, max_length = config.max_length, "sequência codificada");
    Ok(EncodedInput { ids, known })
}
