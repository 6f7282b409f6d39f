//! # Motor de Inferência
//!
//! O modelo de rotulagem de sequência é uma **caixa-preta**: recebe `max_length`
//! números e devolve, para cada posição, um vetor de scores com uma entrada por
//! classe. O formato do arquivo do modelo e o runtime que o executa não fazem
//! parte deste crate; qualquer implementação de [`InferenceEngine`] serve.
//!
//! ```text
//! entrada: [1 × max_length] f32
//! saída:   [max_length × num_classes] f32
//! ```
//!
//! Implementações incluídas:
//! - [`EmissionTableEngine`]: tabela determinística id → scores (útil para testes e demonstração).
//! - [`Serialized`]: adapta um motor que exige acesso exclusivo (`&mut self`).
//! - Closures `Fn(&[f32], usize) -> Result<ScoreTensor, EngineError>`.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Matriz de scores produzida pelo modelo: uma linha por posição da entrada.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreTensor {
    rows: Vec<Vec<f32>>,
}

impl ScoreTensor {
    pub fn new(rows: Vec<Vec<f32>>) -> Self {
        Self { rows }
    }

    /// Monta a matriz a partir de um buffer contíguo `rows × cols`.
    pub fn from_flat(values: &[f32], rows: usize, cols: usize) -> Result<Self, EngineError> {
        if values.len() != rows * cols {
            return Err(EngineError::ShapeMismatch {
                expected_rows: rows,
                expected_cols: cols,
                rows: if cols == 0 { 0 } else { values.len() / cols },
                cols,
            });
        }
        let rows = if cols == 0 {
            vec![Vec::new(); rows]
        } else {
            values.chunks(cols).map(<[f32]>::to_vec).collect()
        };
        Ok(Self { rows })
    }

    pub fn rows(&self) -> usize {
        self.rows.len()
    }

    pub fn row(&self, position: usize) -> Option<&[f32]> {
        self.rows.get(position).map(Vec::as_slice)
    }

    /// Classe vencedora de uma posição e seu score.
    ///
    /// Empates favorecem o menor índice. Uma linha vazia resulta na classe 0.
    /// `NaN` é maior que qualquer outro valor (inclusive infinito), então o
    /// primeiro `NaN` da linha vence.
    pub fn argmax(&self, position: usize) -> (usize, f32) {
        let Some(&first) = self.row(position).and_then(<[f32]>::first) else {
            return (0, 0.0);
        };
        let row = &self.rows[position];
        let mut best = (0usize, first);
        for (class_id, &score) in row.iter().enumerate().skip(1) {
            if compare_scores(score, best.1) == Ordering::Greater {
                best = (class_id, score);
            }
        }
        best
    }

    /// Verifica o formato `rows × cols` esperado pelo pipeline.
    pub fn check_shape(&self, rows: usize, cols: usize) -> Result<(), EngineError> {
        let bad_row = self.rows.iter().find(|row| row.len() != cols);
        if self.rows.len() != rows || bad_row.is_some() {
            return Err(EngineError::ShapeMismatch {
                expected_rows: rows,
                expected_cols: cols,
                rows: self.rows.len(),
                cols: bad_row.map_or(cols, Vec::len),
            });
        }
        Ok(())
    }
}

/// Ordem total dos scores: `NaN` acima de tudo, demais valores por `total_cmp` (`-0.0 < 0.0`).
fn compare_scores(a: f32, b: f32) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => a.total_cmp(&b),
    }
}

/// Um modelo de rotulagem de sequência que pode ser chamado concorrentemente.
pub trait InferenceEngine: Send + Sync {
    /// Executa o modelo sobre uma entrada de comprimento fixo.
    fn infer(&self, input: &[f32], num_classes: usize) -> Result<ScoreTensor, EngineError>;
}

impl<F> InferenceEngine for F
where
    F: Fn(&[f32], usize) -> Result<ScoreTensor, EngineError> + Send + Sync,
{
    fn infer(&self, input: &[f32], num_classes: usize) -> Result<ScoreTensor, EngineError> {
        self(input, num_classes)
    }
}

/// Um modelo que só aceita uma chamada por vez (ex: interpretadores com buffers internos).
pub trait InferenceEngineMut: Send {
    fn infer_mut(&mut self, input: &[f32], num_classes: usize) -> Result<ScoreTensor, EngineError>;
}

/// Acesso exclusivo a um [`InferenceEngineMut`]: as chamadas são serializadas por um `Mutex`.
pub struct Serialized<E> {
    inner: Mutex<E>,
}

impl<E: InferenceEngineMut> Serialized<E> {
    pub fn new(engine: E) -> Self {
        Self {
            inner: Mutex::new(engine),
        }
    }
}

impl<E: InferenceEngineMut> InferenceEngine for Serialized<E> {
    fn infer(&self, input: &[f32], num_classes: usize) -> Result<ScoreTensor, EngineError> {
        let mut engine = self
            .inner
            .lock()
            .map_err(|e| EngineError::Unavailable(e.to_string()))?;
        engine.infer_mut(input, num_classes)
    }
}

/// Modelo de emissão por id: cada id de palavra tem um vetor fixo de scores.
///
/// Ids sem entrada na tabela (inclusive o padding `0`) pontuam zero em todas as
/// classes, então o argmax cai na classe 0.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmissionTableEngine {
    emissions: HashMap<u32, Vec<f32>>,
}

impl EmissionTableEngine {
    pub fn new(emissions: HashMap<u32, Vec<f32>>) -> Self {
        Self { emissions }
    }

    /// `{"<id>": [score_classe_0, score_classe_1, ...], ...}`
    pub fn from_json(json: &str) -> Result<Self, EngineError> {
        let raw: HashMap<String, Vec<f32>> =
            serde_json::from_str(json).map_err(|e| EngineError::Load(e.to_string()))?;
        let emissions = raw
            .into_iter()
            .map(|(key, scores)| {
                key.trim()
                    .parse::<u32>()
                    .map(|id| (id, scores))
                    .map_err(|_| EngineError::Load(format!("id de palavra inválido: {key:?}")))
            })
            .collect::<Result<_, _>>()?;
        Ok(Self { emissions })
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, EngineError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| EngineError::Load(format!("{}: {e}", path.display())))?;
        Self::from_json(&json)
    }
}

impl InferenceEngine for EmissionTableEngine {
    fn infer(&self, input: &[f32], num_classes: usize) -> Result<ScoreTensor, EngineError> {
        let mut flat = Vec::with_capacity(input.len() * num_classes);
        for &value in input {
            match self.emissions.get(&(value as u32)) {
                Some(scores) if scores.len() == num_classes => flat.extend_from_slice(scores),
                Some(scores) => {
                    return Err(EngineError::ShapeMismatch {
                        expected_rows: input.len(),
                        expected_cols: num_classes,
                        rows: input.len(),
                        cols: scores.len(),
                    });
                }
                None => flat.resize(flat.len() + num_classes, 0.0),
            }
        }
        ScoreTensor::from_flat(&flat, input.len(), num_classes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_argmax_first_max_wins() {
        let tensor = ScoreTensor::new(vec![vec![0.1, 0.7, 0.7, 0.2], vec![0.5, 0.5], vec![]]);
        assert_eq!(tensor.argmax(0), (1, 0.7));
        assert_eq!(tensor.argmax(1), (0, 0.5));
        assert_eq!(tensor.argmax(2), (0, 0.0));
        assert_eq!(tensor.argmax(9), (0, 0.0));
    }

    #[test]
    fn test_argmax_negative_scores() {
        let tensor = ScoreTensor::new(vec![vec![-3.0, -1.0, -2.0]]);
        assert_eq!(tensor.argmax(0), (1, -1.0));
    }

    #[test]
    fn test_argmax_nan_wins() {
        let tensor = ScoreTensor::new(vec![
            vec![0.1, f32::NAN, f32::NAN, 5.0],
            vec![f32::INFINITY, f32::NAN],
            vec![-0.0, 0.0],
        ]);
        let (class_id, score) = tensor.argmax(0);
        assert_eq!(class_id, 1);
        assert!(score.is_nan());
        assert_eq!(tensor.argmax(1).0, 1);
        assert_eq!(tensor.argmax(2).0, 1);
    }

    #[test]
    fn test_from_flat() {
        let tensor = ScoreTensor::from_flat(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0], 2, 3).unwrap();
        assert_eq!(tensor.rows(), 2);
        assert_eq!(tensor.row(1), Some(&[4.0, 5.0, 6.0][..]));
        assert!(ScoreTensor::from_flat(&[1.0, 2.0, 3.0], 2, 3).is_err());
    }

    #[test]
    fn test_check_shape() {
        let tensor = ScoreTensor::new(vec![vec![0.0; 3]; 4]);
        assert!(tensor.check_shape(4, 3).is_ok());
        assert!(tensor.check_shape(16, 3).is_err());
        assert!(tensor.check_shape(4, 5).is_err());
    }

    #[test]
    fn test_emission_table() {
        let engine = EmissionTableEngine::from_json(r#"{"1": [0.0, 1.0], "2": [2.0, 0.0]}"#).unwrap();
        let tensor = engine.infer(&[1.0, 2.0, 0.0], 2).unwrap();
        assert_eq!(tensor.argmax(0).0, 1);
        assert_eq!(tensor.argmax(1).0, 0);
        assert_eq!(tensor.row(2), Some(&[0.0, 0.0][..]));
        assert!(tensor.check_shape(3, 2).is_ok());

        let empty = engine.infer(&[1.0, 2.0], 0);
        assert!(matches!(empty, Err(EngineError::ShapeMismatch { cols: 2, .. })));
    }

    #[test]
    fn test_emission_table_wrong_width() {
        let engine = EmissionTableEngine::from_json(r#"{"1": [0.0, 1.0, 3.0]}"#).unwrap();
        let err = engine.infer(&[1.0], 2).unwrap_err();
        assert!(matches!(err, EngineError::ShapeMismatch { cols: 3, .. }));
    }

    #[test]
    fn test_emission_table_bad_key() {
        assert!(matches!(
            EmissionTableEngine::from_json(r#"{"um": [1.0]}"#),
            Err(EngineError::Load(_))
        ));
    }

    struct Counter {
        calls: usize,
    }

    impl InferenceEngineMut for Counter {
        fn infer_mut(&mut self, input: &[f32], num_classes: usize) -> Result<ScoreTensor, EngineError> {
            self.calls += 1;
            Ok(ScoreTensor::new(vec![vec![self.calls as f32; num_classes]; input.len()]))
        }
    }

    #[test]
    fn test_serialized_engine() {
        let engine = Serialized::new(Counter { calls: 0 });
        engine.infer(&[0.0], 1).unwrap();
        let tensor = engine.infer(&[0.0], 1).unwrap();
        assert_eq!(tensor.row(0), Some(&[2.0][..]));
    }

    #[test]
    fn test_closure_engine() {
        let engine = |input: &[f32], n: usize| Ok::<_, EngineError>(ScoreTensor::new(vec![vec![1.0; n]; input.len()]));
        let tensor = engine.infer(&[0.0, 0.0], 3).unwrap();
        assert!(tensor.check_shape(2, 3).is_ok());
    }
}
