//! # Campos do Documento
//!
//! Projeta o mapa de entidades nos três campos exibidos ao usuário:
//! médico (`DOCTOR`), hospital (`HOSPITAL`) e data (`DATE`).

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::decoder::EntityMap;

pub const DOCTOR: &str = "DOCTOR";
pub const HOSPITAL: &str = "HOSPITAL";
pub const DATE: &str = "DATE";

/// Texto exibido quando o campo não foi encontrado.
pub const NOT_FOUND: &str = "Not Found";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentFields {
    pub doctor: Option<String>,
    pub hospital: Option<String>,
    pub date: Option<String>,
}

impl DocumentFields {
    pub fn from_entities(entities: &EntityMap) -> Self {
        Self {
            doctor: entities.get(DOCTOR).cloned(),
            hospital: entities.get(HOSPITAL).cloned(),
            date: entities.get(DATE).cloned(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.doctor.is_none() && self.hospital.is_none() && self.date.is_none()
    }
}

impl fmt::Display for DocumentFields {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let show = |field: &Option<String>| field.clone().unwrap_or_else(|| NOT_FOUND.to_string());
        writeln!(f, "Doctor: {}", show(&self.doctor))?;
        writeln!(f, "Hospital: {}", show(&self.hospital))?;
        write!(f, "Date: {}", show(&self.date))
    }
}
