//! Durable identity record

use crate::types::Diagnostics;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Geometry classification of an element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum GeometryKind {
    Box,
    Cylinder,
    Sphere,
    Extrusion,
    Mesh,
    CatalogInstance,
    Unknown,
}

impl GeometryKind {
    /// Case-insensitive parse; unrecognized names map to `Unknown`
    pub fn parse(name: &str) -> Self {
        match name.trim().to_ascii_uppercase().as_str() {
            "BOX" => Self::Box,
            "CYLINDER" => Self::Cylinder,
            "SPHERE" => Self::Sphere,
            "EXTRUSION" => Self::Extrusion,
            "MESH" => Self::Mesh,
            "CATALOG" | "CATALOGINSTANCE" | "CATALOG_INSTANCE" => Self::CatalogInstance,
            _ => Self::Unknown,
        }
    }

    pub fn is_known(self) -> bool {
        self != Self::Unknown
    }
}

impl fmt::Display for GeometryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Exact-match key: full tag + geometry + owner model
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResolutionKey {
    pub tag: String,
    pub geometry: GeometryKind,
    pub owner: String,
}

impl ResolutionKey {
    pub fn new(tag: &str, geometry: GeometryKind, owner: &str) -> Self {
        Self {
            tag: tag.to_string(),
            geometry,
            owner: owner.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdentityRecord {
    pub id: String,
    pub tag: String,
    pub geometry_kind: GeometryKind,
    pub generated_name: String,
    pub catalog_reference: Option<String>,
    pub reference_number: Option<String>,
    pub source_file: Option<String>,
    pub source_version: Option<String>,
    pub owner_model_name: String,
    pub suffix_letter: Option<char>,
    pub suffix_increment: Option<u32>,
    pub description: Option<String>,
    pub is_valid: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub diagnostics: Diagnostics,
}

impl IdentityRecord {
    pub fn key(&self) -> ResolutionKey {
        ResolutionKey::new(&self.tag, self.geometry_kind, &self.owner_model_name)
    }
}
