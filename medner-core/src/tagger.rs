//! # Esquema de Tags BIO
//!
//! Define o esquema de anotação **BIO** (Beginning-Inside-Outside) usado pelo
//! modelo para rotular cada posição da sequência.
//!
//! ## Tipos de Entidade
//!
//! Os tipos não são fixos em código: vêm do dicionário de labels carregado em
//! tempo de execução. O modelo de referência usa:
//!
//! | Tipo     | Significado          | Exemplo                |
//! |----------|----------------------|------------------------|
//! | DOCTOR   | Nome do médico       | dr smith               |
//! | HOSPITAL | Nome do hospital     | city hospital          |
//! | DATE     | Data do documento    | 12/03/2024             |
//!
//! ## Esquema BIO
//!
//! - `B-TIPO`: Begin — primeiro token de uma entidade
//! - `I-TIPO`: Inside — tokens subsequentes da mesma entidade
//! - `O`: Outside — não é parte de nenhuma entidade

use serde::{Deserialize, Serialize};

const BEGIN_PREFIX: &str = "B-";
const INSIDE_PREFIX: &str = "I-";

/// Tag BIO de uma posição. O tipo da entidade é o sufixo da label (ex: `"DOCTOR"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tag {
    /// **Begin**: início de uma entidade. Ex: **city** (B-HOSPITAL) hospital.
    Begin(String),
    /// **Inside**: continuação de uma entidade. Ex: city **hospital** (I-HOSPITAL).
    Inside(String),
    /// **Outside**: fora de qualquer entidade.
    Outside,
}

impl Tag {
    /// Interpreta uma label do dicionário.
    ///
    /// Qualquer label fora do formato `B-X` / `I-X` (inclusive `"O"`) vira [`Tag::Outside`].
    pub fn from_label(label: &str) -> Self {
        if let Some(kind) = label.strip_prefix(BEGIN_PREFIX) {
            Tag::Begin(kind.to_string())
        } else if let Some(kind) = label.strip_prefix(INSIDE_PREFIX) {
            Tag::Inside(kind.to_string())
        } else {
            Tag::Outside
        }
    }

    /// Representação textual (ex: "B-DOCTOR", "I-DATE", "O")
    pub fn label(&self) -> String {
        match self {
            Tag::Begin(kind) => format!("{BEGIN_PREFIX}{kind}"),
            Tag::Inside(kind) => format!("{INSIDE_PREFIX}{kind}"),
            Tag::Outside => "O".to_string(),
        }
    }

    /// Tipo da entidade (se for B- ou I-)
    pub fn category(&self) -> Option<&str> {
        match self {
            Tag::Begin(kind) | Tag::Inside(kind) => Some(kind.as_str()),
            Tag::Outside => None,
        }
    }
}

impl std::fmt::Display for Tag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Uma posição decodificada: palavra original, classe vencedora e tag resultante.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaggedToken {
    pub index: usize,
    pub word: String,
    pub class_id: usize,
    pub tag: Tag,
    /// Score bruto da classe vencedora.
    pub score: f32,
}
