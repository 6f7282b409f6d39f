//! # Tokenizador de Texto Reconhecido (OCR)
//!
//! Divide o texto bruto vindo do OCR em palavras, na mesma normalização usada
//! para construir o dicionário de palavras do modelo:
//!
//! 1. Converte tudo para minúsculas.
//! 2. Remove todos os pontos (`.`), então "Dr." vira "dr".
//! 3. Separa em sequências de espaços em branco ou em `,` / `;`.
//! 4. Descarta segmentos vazios.
//!
//! ## Exemplo de Uso
//!
//! ```rust
//! use medner_core::tokenizer::tokenize;
//!
//! let words = tokenize("Dr. Smith, General Hospital.");
//! assert_eq!(words, vec!["dr", "smith", "general", "hospital"]);
//! ```

use std::sync::OnceLock;

use regex::Regex;

/// Separadores: sequências de espaços em branco, ou uma vírgula / ponto e vírgula.
const SEPARATOR_PATTERN: &str = r"\s+|[,;]";

fn separator() -> &'static Regex {
    static SEPARATOR: OnceLock<Regex> = OnceLock::new();
    SEPARATOR.get_or_init(|| Regex::new(SEPARATOR_PATTERN).expect("padrão de separador válido"))
}

/// Normaliza o texto e retorna a sequência de palavras. Nunca falha.
pub fn tokenize(text: &str) -> Vec<String> {
    let normalized = text.to_lowercase().replace('.', "");
    separator()
        .split(&normalized)
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_document_line() {
        let words = tokenize("Dr. Smith, General Hospital.");
        assert_eq!(words, vec!["dr", "smith", "general", "hospital"]);
    }

    #[test]
    fn test_tokenize_empty() {
        assert!(tokenize("").is_empty());
        assert!(tokenize("   \n\t ").is_empty());
    }

    #[test]
    fn test_tokenize_punctuation_only() {
        assert!(tokenize("., ;. ,,;").is_empty());
    }

    #[test]
    fn test_tokenize_semicolon_and_newlines() {
        let words = tokenize("CITY HOSPITAL;Date 12/03/2024\nDr.A.B. Jones");
        assert_eq!(words, vec!["city", "hospital", "date", "12/03/2024", "drab", "jones"]);
    }

    #[test]
    fn test_tokenize_keeps_other_punctuation() {
        // Apenas ponto, vírgula e ponto e vírgula são tratados; o resto fica no token
        let words = tokenize("St: Mary's (ER)");
        assert_eq!(words, vec!["st:", "mary's", "(er)"]);
    }
}
