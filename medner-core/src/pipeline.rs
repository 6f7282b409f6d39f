//! # Pipeline de Extração — Orquestrador com Eventos Observáveis
//!
//! O pipeline conecta todos os estágios:
//!
//! ```text
//! texto → tokenizer → palavras → encoder (+ vocabulário) → entrada fixa
//!       → motor de inferência → scores → decoder BIO (+ labels) → mapa de entidades
//! ```
//!
//! Cada passo pode emitir um [`PipelineEvent`] por um canal `mpsc`, permitindo
//! acompanhar a decisão do modelo palavra por palavra. [`NerPipeline::extract`]
//! usa o mesmo caminho, sem observador.
//!
//! Nenhuma falha é propagada por `extract`: texto sem palavras conhecidas ou erro
//! do modelo resultam em um mapa vazio, nunca em um resultado parcial.

use std::sync::mpsc;
use std::sync::Arc;
use std::time::Instant;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::config::PipelineConfig;
use crate::decoder::{assemble_spans, into_entity_map, tag_positions, EntityMap, EntitySpan};
use crate::encoder::encode;
use crate::engine::InferenceEngine;
use crate::error::{ConfigError, ExtractError};
use crate::tokenizer::tokenize;
use crate::vocabulary::Vocabulary;

/// Eventos emitidos durante uma extração.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum PipelineEvent {
    /// **Passo 1**: texto normalizado e dividido em palavras.
    TokenizationDone { words: Vec<String>, total: usize },
    /// **Passo 2**: palavras convertidas na entrada de comprimento fixo.
    EncodingDone { ids: Vec<u32>, known: usize },
    /// **Passo 3**: o modelo devolveu a matriz de scores.
    InferenceDone { rows: usize, num_classes: usize },
    /// **Passo 4**: tag atribuída a uma palavra.
    TagAssigned {
        token_index: usize,
        word: String,
        tag: String,
        class_id: usize,
        score: f32,
    },
    /// **Passo 5**: uma entidade foi fechada e gravada.
    EntityFlushed { span: EntitySpan },
    /// **Conclusão**: mapa final de entidades.
    Done {
        entities: EntityMap,
        total_words: usize,
        processing_ms: u64,
    },
    /// **Falha**: a extração terminou sem entidades.
    Failed { message: String },
}

/// O pipeline de extração de entidades.
///
/// Construído uma única vez com o vocabulário, o motor de inferência e a
/// configuração; depois disso é somente leitura e pode ser compartilhado entre
/// threads via `Arc`.
pub struct NerPipeline {
    vocabulary: Arc<Vocabulary>,
    engine: Arc<dyn InferenceEngine>,
    config: PipelineConfig,
}

impl NerPipeline {
    pub fn new(
        vocabulary: Vocabulary,
        engine: impl InferenceEngine + 'static,
        config: PipelineConfig,
    ) -> Result<Self, ConfigError> {
        Self::from_shared(Arc::new(vocabulary), Arc::new(engine), config)
    }

    /// Cria o pipeline a partir de recursos já compartilhados com outras instâncias.
    pub fn from_shared(
        vocabulary: Arc<Vocabulary>,
        engine: Arc<dyn InferenceEngine>,
        config: PipelineConfig,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            vocabulary,
            engine,
            config,
        })
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Extrai as entidades do texto. Qualquer falha resulta em um mapa vazio.
    pub fn extract(&self, text: &str) -> EntityMap {
        self.try_extract(text).unwrap_or_default()
    }

    /// Como [`extract`](Self::extract), mas informa o motivo de uma extração vazia.
    pub fn try_extract(&self, text: &str) -> Result<EntityMap, ExtractError> {
        self.run(text, None)
    }

    /// Executa a extração enviando eventos de progresso pelo canal `tx`.
    ///
    /// # Fluxo de Eventos
    /// 1. `TokenizationDone`
    /// 2. `EncodingDone`
    /// 3. `InferenceDone`
    /// 4. `TagAssigned` (uma por palavra visitada) e `EntityFlushed` (uma por entidade)
    /// 5. `Done`, ou `Failed` se a extração parou antes
    pub fn extract_streaming(&self, text: &str, tx: mpsc::Sender<PipelineEvent>) {
        let _ = self.run(text, Some(&tx));
    }

    /// Extrai vários textos em paralelo. A ordem do resultado segue a ordem da entrada.
    pub fn extract_batch<S>(&self, texts: &[S]) -> Vec<EntityMap>
    where
        S: AsRef<str> + Sync,
    {
        texts.par_iter().map(|text| self.extract(text.as_ref())).collect()
    }

    /// Executa a extração no pool de threads bloqueantes do tokio, sem bloquear
    /// o loop assíncrono de quem chama.
    pub async fn extract_detached(self: Arc<Self>, text: String) -> EntityMap {
        match tokio::task::spawn_blocking(move || self.extract(&text)).await {
            Ok(entities) => entities,
            Err(e) => {
                error!("tarefa de extração interrompida: {e}");
                EntityMap::new()
            }
        }
    }

    fn run(&self, text: &str, tx: Option<&mpsc::Sender<PipelineEvent>>) -> Result<EntityMap, ExtractError> {
        let start = Instant::now();

        // === Passo 1: Tokenização ===
        let words = tokenize(text);
        emit(tx, || PipelineEvent::TokenizationDone {
            words: words.clone(),
            total: words.len(),
        });

        // === Passo 2: Codificação ===
        let encoded = match encode(&words, &self.vocabulary, &self.config) {
            Ok(encoded) => encoded,
            Err(e) => return Err(fail(tx, e)),
        };
        emit(tx, || PipelineEvent::EncodingDone {
            ids: encoded.ids().to_vec(),
            known: encoded.known(),
        });

        // === Passo 3: Inferência ===
        let num_classes = self.vocabulary.num_classes();
        let scores = self
            .engine
            .infer(&encoded.to_model_input(), num_classes)
            .and_then(|scores| scores.check_shape(self.config.max_length, num_classes).map(|_| scores));
        let scores = match scores {
            Ok(scores) => scores,
            Err(e) => {
                error!("inferência do modelo NER falhou: {e}");
                return Err(fail(tx, e.into()));
            }
        };
        emit(tx, || PipelineEvent::InferenceDone {
            rows: scores.rows(),
            num_classes,
        });

        // === Passo 4: Tags por palavra ===
        let tagged = tag_positions(&scores, &words, &self.vocabulary, &self.config);
        if tx.is_some() {
            for token in &tagged {
                emit(tx, || PipelineEvent::TagAssigned {
                    token_index: token.index,
                    word: token.word.clone(),
                    tag: token.tag.label(),
                    class_id: token.class_id,
                    score: token.score,
                });
            }
        }

        // === Passo 5: Montagem das entidades ===
        let spans = assemble_spans(&tagged);
        if tx.is_some() {
            for span in &spans {
                emit(tx, || PipelineEvent::EntityFlushed { span: span.clone() });
            }
        }
        let entities = into_entity_map(spans);

        let processing_ms = start.elapsed().as_millis() as u64;
        debug!(words = words.len(), entities = entities.len(), processing_ms, "extração concluída");
        emit(tx, || PipelineEvent::Done {
            entities: entities.clone(),
            total_words: words.len(),
            processing_ms,
        });

        Ok(entities)
    }
}

fn emit(tx: Option<&mpsc::Sender<PipelineEvent>>, event: impl FnOnce() -> PipelineEvent) {
    if let Some(tx) = tx {
        let _ = tx.send(event());
    }
}

fn fail(tx: Option<&mpsc::Sender<PipelineEvent>>, err: ExtractError) -> ExtractError {
    emit(tx, || PipelineEvent::Failed {
        message: err.to_string(),
    });
    err
}
