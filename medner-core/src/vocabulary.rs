//! # Vocabulário (Dicionários de Palavras e Labels)
//!
//! O modelo de sequência trabalha com números, não com texto. O vocabulário guarda
//! as duas tabelas que fazem essa ponte:
//!
//! - **Palavras**: `"hospital" → 42`. O id `0` é reservado como sentinela de padding.
//! - **Labels**: `3 → "B-DOCTOR"`. Cada índice de classe da saída do modelo vira uma tag BIO.
//!
//! Ambas vêm de recursos JSON externos, no formato dos arquivos `word_dict.json`
//! e `label_dict.json`:
//!
//! ```json
//! { "dr": 1, "smith": 2, "hospital": 3 }
//! { "0": "O", "1": "B-DOCTOR", "2": "I-DOCTOR" }
//! ```
//!
//! Depois de construído, o vocabulário nunca é alterado.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{error, warn};

use crate::error::VocabularyError;
use crate::tagger::Tag;

/// Id reservado para padding (e para palavras desconhecidas quando não são descartadas).
pub const PAD_ID: u32 = 0;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vocabulary {
    words: HashMap<String, u32>,
    labels: BTreeMap<i32, String>,
}

impl Vocabulary {
    pub fn new(words: HashMap<String, u32>, labels: BTreeMap<i32, String>) -> Self {
        Self { words, labels }
    }

    /// Vocabulário vazio: toda extração cai na condição "nenhum token reconhecido".
    pub fn empty() -> Self {
        Self::default()
    }

    /// Constrói o vocabulário a partir do conteúdo JSON dos dois dicionários.
    pub fn from_json(words_json: &str, labels_json: &str) -> Result<Self, VocabularyError> {
        Ok(Self {
            words: parse_words(words_json)?,
            labels: parse_labels(labels_json)?,
        })
    }

    /// Carrega os dois dicionários do disco. Qualquer falha é devolvida ao chamador.
    pub fn load(words_path: impl AsRef<Path>, labels_path: impl AsRef<Path>) -> Result<Self, VocabularyError> {
        let words = parse_words(&read_resource(words_path.as_ref())?)?;
        let labels = parse_labels(&read_resource(labels_path.as_ref())?)?;
        Ok(Self { words, labels })
    }

    /// Carrega os dicionários substituindo cada recurso com falha por um mapa vazio.
    ///
    /// Um dicionário de palavras vazio faz toda extração retornar zero entidades,
    /// então a falha é registrada como `error!`.
    pub fn load_or_empty(words_path: impl AsRef<Path>, labels_path: impl AsRef<Path>) -> Self {
        let words_path = words_path.as_ref();
        let labels_path = labels_path.as_ref();

        let words = read_resource(words_path)
            .and_then(|json| parse_words(&json))
            .unwrap_or_else(|e| {
                error!(path = %words_path.display(), "dicionário de palavras indisponível: {e}");
                HashMap::new()
            });
        let labels = read_resource(labels_path)
            .and_then(|json| parse_labels(&json))
            .unwrap_or_else(|e| {
                error!(path = %labels_path.display(), "dicionário de labels indisponível: {e}");
                BTreeMap::new()
            });

        Self { words, labels }
    }

    /// Id da palavra (já normalizada em minúsculas), se conhecida.
    pub fn word_id(&self, word: &str) -> Option<u32> {
        self.words.get(word).copied()
    }

    /// Label associada a um índice de classe.
    pub fn label(&self, class_id: usize) -> Option<&str> {
        let key = i32::try_from(class_id).ok()?;
        self.labels.get(&key).map(String::as_str)
    }

    /// Número de classes da saída do modelo: quantidade de entradas no mapa de labels.
    ///
    /// Entradas com id negativo contam, embora nenhum argmax as alcance.
    pub fn num_classes(&self) -> usize {
        self.labels.len()
    }

    pub fn word_count(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty() && self.labels.is_empty()
    }

    pub fn labels(&self) -> &BTreeMap<i32, String> {
        &self.labels
    }

    /// Tipos de entidade que o modelo pode produzir (sufixos de `B-`/`I-`).
    pub fn entity_types(&self) -> BTreeSet<String> {
        self.labels
            .values()
            .filter_map(|label| Tag::from_label(label).category().map(str::to_string))
            .collect()
    }
}

fn read_resource(path: &Path) -> Result<String, VocabularyError> {
    std::fs::read_to_string(path).map_err(|source| VocabularyError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// `{"palavra": id}` → mapa palavra → id. Ids negativos ou acima de `u32` são rejeitados.
pub(crate) fn parse_words(json: &str) -> Result<HashMap<String, u32>, VocabularyError> {
    let raw: HashMap<String, i64> = serde_json::from_str(json)?;
    raw.into_iter()
        .map(|(word, value)| {
            u32::try_from(value)
                .map(|id| (word.clone(), id))
                .map_err(|_| VocabularyError::InvalidId { word, value })
        })
        .collect()
}

/// `{"id": "label"}` → mapa id → label. Chaves que não são inteiros são ignoradas
/// individualmente; não há `trim`, então `" 1"` é ignorada.
///
/// Chaves distintas que resultam no mesmo id (`"1"`, `"01"`, `"+1"`) são resolvidas
/// na ordem do documento: a última vence.
pub(crate) fn parse_labels(json: &str) -> Result<BTreeMap<i32, String>, VocabularyError> {
    let raw: serde_json::Map<String, serde_json::Value> = serde_json::from_str(json)?;
    let mut labels = BTreeMap::new();
    for (key, value) in raw {
        let label: String = serde_json::from_value(value)?;
        match key.parse::<i32>() {
            Ok(id) => {
                labels.insert(id, label);
            }
            Err(_) => warn!(key = %key, label = %label, "entrada de label ignorada: chave não numérica"),
        }
    }
    Ok(labels)
}
