//! # medner-core — Extração de Entidades em Documentos Médicos
//!
//! Este crate recebe o texto reconhecido por OCR em uma foto de documento e extrai
//! as entidades nomeadas **médico**, **hospital** e **data** com um modelo local de
//! rotulagem de sequência.
//!
//! ## Arquitetura do Sistema
//!
//! O dado flui por um pipeline linear:
//!
//! 1.  **Entrada**: Texto bruto do OCR (String).
//! 2.  **Tokenização** ([`tokenizer`]): minúsculas, sem pontos, separado por espaços, `,` e `;`.
//! 3.  **Codificação** ([`encoder`]): palavras → ids do [`vocabulary`], com padding/truncamento
//!     para o comprimento fixo do modelo.
//! 4.  **Inferência** ([`engine`]): o modelo (caixa-preta) devolve scores por posição e classe.
//! 5.  **Decodificação BIO** ([`decoder`]): argmax por posição → tags ([`tagger`]) → entidades.
//! 6.  **Saída**: [`EntityMap`] (ex: `"DOCTOR" → "dr smith"`).
//!
//! ## Exemplo de Uso
//!
//! ```rust
//! use medner_core::{EmissionTableEngine, NerPipeline, PipelineConfig, Vocabulary};
//!
//! // 1. Dicionários e modelo (aqui uma tabela de emissão no lugar do modelo real)
//! let vocabulary = Vocabulary::from_json(
//!     r#"{"dr": 1, "smith": 2, "on": 3}"#,
//!     r#"{"0": "O", "1": "B-DOCTOR", "2": "I-DOCTOR"}"#,
//! ).unwrap();
//! let engine = EmissionTableEngine::from_json(
//!     r#"{"1": [0, 1, 0], "2": [0, 0, 1], "3": [1, 0, 0]}"#,
//! ).unwrap();
//!
//! // 2. Pipeline construído uma única vez
//! let pipeline = NerPipeline::new(vocabulary, engine, PipelineConfig::default()).unwrap();
//!
//! // 3. Extração
//! let entities = pipeline.extract("Dr. Smith on call");
//! assert_eq!(entities["DOCTOR"], "dr smith");
//! ```
//!
//! ## Módulos Principais
//!
//! - [`pipeline`]: Orquestrador que conecta todos os estágios.
//! - [`decoder`]: Máquina de estados BIO.
//! - [`report`]: Campos médico/hospital/data para exibição.

pub mod config;
pub mod decoder;
pub mod encoder;
pub mod engine;
pub mod error;
pub mod pipeline;
pub mod report;
pub mod tagger;
pub mod tokenizer;
pub mod vocabulary;

pub use config::PipelineConfig;
pub use decoder::{EntityMap, EntitySpan};
pub use engine::{EmissionTableEngine, InferenceEngine, InferenceEngineMut, ScoreTensor, Serialized};
pub use error::{ConfigError, EngineError, ExtractError, VocabularyError};
pub use pipeline::{NerPipeline, PipelineEvent};
pub use report::DocumentFields;
pub use tagger::{Tag, TaggedToken};
pub use vocabulary::Vocabulary;
