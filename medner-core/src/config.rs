//! # Configuração do Pipeline
//!
//! Parâmetros fixos de uma instância do pipeline. São lidos uma única vez
//! (de um arquivo JSON ou dos valores padrão) e nunca mudam depois.
//!
//! ```json
//! { "max_length": 16, "drop_unknown": true, "outside_label": "O" }
//! ```
//!
//! Campos ausentes assumem o valor padrão.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Comprimento fixo da sequência aceita pelo modelo de referência.
pub const DEFAULT_MAX_LENGTH: usize = 16;

/// Label usada quando um índice de classe não existe no mapa de labels.
pub const DEFAULT_OUTSIDE_LABEL: &str = "O";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Número de posições da entrada do modelo (padding/truncamento).
    pub max_length: usize,
    /// **Política OOV**: `true` descarta tokens desconhecidos; `false` os mapeia
    /// para o id sentinela 0.
    pub drop_unknown: bool,
    /// Label atribuída a classes sem entrada no dicionário.
    pub outside_label: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_length: DEFAULT_MAX_LENGTH,
            drop_unknown: true,
            outside_label: DEFAULT_OUTSIDE_LABEL.to_string(),
        }
    }
}

impl PipelineConfig {
    /// Lê e valida a configuração a partir de uma string JSON.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Lê e valida a configuração a partir de um arquivo JSON.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_length == 0 {
            return Err(ConfigError::Invalid("max_length deve ser maior que zero".into()));
        }
        if self.outside_label.starts_with("B-") || self.outside_label.starts_with("I-") {
            return Err(ConfigError::Invalid(format!(
                "outside_label não pode ser uma tag de entidade: {}",
                self.outside_label
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PipelineConfig::default();
        assert_eq!(config.max_length, 16);
        assert!(config.drop_unknown);
        assert_eq!(config.outside_label, "O");
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = PipelineConfig::from_json_str(r#"{"max_length": 8}"#).unwrap();
        assert_eq!(config.max_length, 8);
        assert!(config.drop_unknown);
        assert_eq!(config.outside_label, "O");
    }

    #[test]
    fn test_zero_length_rejected() {
        let err = PipelineConfig::from_json_str(r#"{"max_length": 0}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_entity_outside_label_rejected() {
        let err = PipelineConfig::from_json_str(r#"{"outside_label": "B-DOCTOR"}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = PipelineConfig::from_json_file("/nao/existe/config.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
