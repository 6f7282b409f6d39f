//! # Decodificador BIO
//!
//! Transforma a saída "posição a posição" do modelo em entidades nomeadas.
//!
//! 1. **Tagging**: para cada posição, a classe de maior score vira uma label
//!    (`B-X`, `I-X` ou `O`) via dicionário de labels.
//! 2. **Montagem**: uma máquina de estados percorre as tags acumulando palavras
//!    de uma mesma entidade e grava a entidade no mapa quando ela termina.
//!
//! A decodificação percorre as **palavras originais** do texto (antes do filtro
//! de vocabulário e do padding), limitada a `min(palavras, max_length)`.
//!
//! ## Comportamento da máquina de estados
//!
//! - `B-X` inicia uma entidade. Uma entidade anterior ainda aberta é descartada
//!   sem ser gravada.
//! - `I-X` do mesmo tipo X estende a entidade aberta.
//! - Qualquer outra tag fecha a entidade aberta e a grava no mapa.
//! - Uma entidade ainda aberta na última posição **não** é gravada.
//!
//! # Exemplo
//! `[B-HOSPITAL, I-HOSPITAL, O]` sobre `["city", "hospital", "on"]` → `{"HOSPITAL": "city hospital"}`

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config::PipelineConfig;
use crate::engine::ScoreTensor;
use crate::tagger::{Tag, TaggedToken};
use crate::vocabulary::Vocabulary;

/// Tipo de entidade → texto extraído. Ordenado para saída determinística.
pub type EntityMap = BTreeMap<String, String>;

/// Uma entidade gravada pela máquina de estados.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntitySpan {
    /// Tipo da entidade (ex: "DOCTOR")
    pub kind: String,
    /// Palavras da entidade unidas por um espaço
    pub text: String,
    /// Índice da primeira palavra
    pub start_token: usize,
    /// Índice da última palavra (inclusivo)
    pub end_token: usize,
}

/// Entidade em construção.
#[derive(Debug, Default)]
struct Accumulator {
    kind: String,
    text: String,
    start_token: usize,
    end_token: usize,
}

impl Accumulator {
    fn is_active(&self) -> bool {
        !self.text.is_empty()
    }

    fn take(&mut self) -> EntitySpan {
        let acc = std::mem::take(self);
        EntitySpan {
            kind: acc.kind,
            text: acc.text,
            start_token: acc.start_token,
            end_token: acc.end_token,
        }
    }
}

/// Atribui uma tag a cada posição visitada.
pub fn tag_positions(
    scores: &ScoreTensor,
    words: &[String],
    vocabulary: &Vocabulary,
    config: &PipelineConfig,
) -> Vec<TaggedToken> {
    let limit = words.len().min(config.max_length).min(scores.rows());
    words[..limit]
        .iter()
        .enumerate()
        .map(|(index, word)| {
            let (class_id, score) = scores.argmax(index);
            let label = vocabulary.label(class_id).unwrap_or(&config.outside_label);
            TaggedToken {
                index,
                word: word.clone(),
                class_id,
                tag: Tag::from_label(label),
                score,
            }
        })
        .collect()
}

/// Executa a máquina de estados BIO e retorna as entidades na ordem em que foram gravadas.
pub fn assemble_spans(tagged: &[TaggedToken]) -> Vec<EntitySpan> {
    let mut spans = Vec::new();
    let mut current = Accumulator::default();

    for token in tagged {
        match &token.tag {
            Tag::Begin(kind) => {
                current = Accumulator {
                    kind: kind.clone(),
                    text: token.word.clone(),
                    start_token: token.index,
                    end_token: token.index,
                };
            }
            Tag::Inside(kind) if *kind == current.kind => {
                current.text.push(' ');
                current.text.push_str(&token.word);
                current.end_token = token.index;
            }
            _ if current.is_active() => spans.push(current.take()),
            _ => {}
        }
    }

    spans
}

/// Reduz as entidades a um mapa tipo → texto; ocorrências posteriores sobrescrevem as anteriores.
pub fn into_entity_map(spans: impl IntoIterator<Item = EntitySpan>) -> EntityMap {
    spans.into_iter().map(|span| (span.kind, span.text)).collect()
}

/// Decodifica os scores do modelo em um mapa de entidades.
pub fn decode(
    scores: &ScoreTensor,
    words: &[String],
    vocabulary: &Vocabulary,
    config: &PipelineConfig,
) -> EntityMap {
    let tagged = tag_positions(scores, words, vocabulary, config);
    into_entity_map(assemble_spans(&tagged))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const LABELS: [&str; 7] = ["O", "B-DOCTOR", "I-DOCTOR", "B-HOSPITAL", "I-HOSPITAL", "B-DATE", "I-DATE"];

    fn vocab() -> Vocabulary {
        let labels = LABELS.iter().enumerate().map(|(i, l)| (i as i32, l.to_string())).collect();
        Vocabulary::new(HashMap::new(), labels)
    }

    fn words(list: &[&str]) -> Vec<String> {
        list.iter().map(|w| w.to_string()).collect()
    }

    /// Matriz one-hot com as labels dadas nas primeiras posições e "O" no resto.
    fn scores_for(labels: &[&str], max_length: usize) -> ScoreTensor {
        let rows = (0..max_length)
            .map(|i| {
                let label = labels.get(i).copied().unwrap_or("O");
                let class = LABELS.iter().position(|l| *l == label).unwrap();
                let mut row = vec![0.0; LABELS.len()];
                row[class] = 1.0;
                row
            })
            .collect();
        ScoreTensor::new(rows)
    }

    fn run(list: &[&str], labels: &[&str]) -> EntityMap {
        let config = PipelineConfig::default();
        decode(&scores_for(labels, config.max_length), &words(list), &vocab(), &config)
    }

    #[test]
    fn test_entity_flushed_by_outside() {
        let map = run(&["city", "hospital", "on"], &["B-HOSPITAL", "I-HOSPITAL", "O"]);
        assert_eq!(map.len(), 1);
        assert_eq!(map["HOSPITAL"], "city hospital");
    }

    #[test]
    fn test_new_begin_abandons_open_entity() {
        let map = run(&["smith", "mercy", "x"], &["B-DOCTOR", "B-HOSPITAL", "O"]);
        assert_eq!(map.len(), 1);
        assert_eq!(map["HOSPITAL"], "mercy");
        assert!(!map.contains_key("DOCTOR"));
    }

    #[test]
    fn test_trailing_entity_is_not_flushed() {
        let map = run(&["dr", "smith", "city", "hospital"], &["B-DOCTOR", "I-DOCTOR", "B-HOSPITAL", "I-HOSPITAL"]);
        assert!(map.is_empty());

        let map = run(&["visit", "dr", "smith"], &["O", "B-DOCTOR", "I-DOCTOR"]);
        assert!(map.is_empty());
    }

    #[test]
    fn test_inside_of_other_type_flushes() {
        let map = run(&["dr", "smith", "hospital", "x"], &["B-DOCTOR", "I-DOCTOR", "I-HOSPITAL", "O"]);
        assert_eq!(map["DOCTOR"], "dr smith");
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_orphan_inside_is_ignored() {
        let map = run(&["hospital", "x"], &["I-HOSPITAL", "O"]);
        assert!(map.is_empty());
    }

    #[test]
    fn test_last_occurrence_wins() {
        let map = run(
            &["dr", "a", "x", "dr", "b", "x"],
            &["B-DOCTOR", "I-DOCTOR", "O", "B-DOCTOR", "I-DOCTOR", "O"],
        );
        assert_eq!(map["DOCTOR"], "dr b");
    }

    #[test]
    fn test_scan_stops_at_max_length() {
        // 20 palavras: a entidade que fecharia na posição 16 nunca é vista
        let list: Vec<String> = (0..20).map(|i| format!("w{i}")).collect();
        let refs: Vec<&str> = list.iter().map(String::as_str).collect();
        let mut labels = vec!["O"; 14];
        labels.extend(["B-DATE", "I-DATE"]);
        let map = run(&refs, &labels);
        assert!(map.is_empty());
    }

    #[test]
    fn test_unknown_class_is_outside() {
        let labels: BTreeMap<i32, String> = [(1, "B-DOCTOR".to_string())].into_iter().collect();
        let vocabulary = Vocabulary::new(HashMap::new(), labels);
        // classe 0 não existe no dicionário → "O", que fecha a entidade
        let scores = ScoreTensor::new(vec![vec![0.0, 1.0], vec![1.0, 0.0], vec![1.0, 0.0]]);
        let config = PipelineConfig { max_length: 3, ..PipelineConfig::default() };
        let map = decode(&scores, &words(&["smith", "x", "y"]), &vocabulary, &config);
        assert_eq!(map["DOCTOR"], "smith");
    }

    #[test]
    fn test_tag_positions_track_words() {
        let config = PipelineConfig::default();
        let tagged = tag_positions(&scores_for(&["B-DATE"], 16), &words(&["12/03", "x"]), &vocab(), &config);
        assert_eq!(tagged.len(), 2);
        assert_eq!(tagged[0].tag, Tag::Begin("DATE".into()));
        assert_eq!(tagged[0].class_id, 5);
        assert_eq!(tagged[1].tag, Tag::Outside);
    }

    #[test]
    fn test_spans_record_token_range() {
        let config = PipelineConfig::default();
        let tagged = tag_positions(
            &scores_for(&["O", "B-HOSPITAL", "I-HOSPITAL", "I-HOSPITAL", "O"], 16),
            &words(&["at", "st", "mary", "general", "today"]),
            &vocab(),
            &config,
        );
        let spans = assemble_spans(&tagged);
        assert_eq!(
            spans,
            vec![EntitySpan {
                kind: "HOSPITAL".into(),
                text: "st mary general".into(),
                start_token: 1,
                end_token: 3,
            }]
        );
    }
}
