//! Element input and the header-to-field mapping table
//!
//! Upstream extraction hands each element over as header/value pairs. The
//! mapping is a static table of (key, aliases, setter), so adding a column
//! is one table row and unknown headers are simply ignored.

use plantag_common::{Error, Result};
use serde::{Deserialize, Serialize};

/// Raw tag plus the contextual fields extracted alongside it
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ElementInput {
    pub raw_tag: String,
    pub description: Option<String>,
    pub geometry_kind: String,
    pub owner_model_name: String,
    pub catalog_reference: Option<String>,
    pub reference_number: Option<String>,
    pub source_file: Option<String>,
    pub source_version: Option<String>,
    pub known_id: Option<String>,
    pub coordinates: Option<[f64; 3]>,
}

/// One row of the header mapping table
pub struct FieldSetter {
    pub key: &'static str,
    pub aliases: &'static [&'static str],
    pub setter: fn(&mut ElementInput, &str) -> std::result::Result<(), String>,
}

impl FieldSetter {
    pub fn matches(&self, header: &str) -> bool {
        let header = header.trim();
        self.key.eq_ignore_ascii_case(header)
            || self.aliases.iter().any(|a| a.eq_ignore_ascii_case(header))
    }
}

fn optional(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

fn parse_coordinates(value: &str) -> std::result::Result<[f64; 3], String> {
    let parts: Vec<&str> = value
        .split(|c: char| c == ',' || c == ';' || c.is_whitespace())
        .filter(|p| !p.is_empty())
        .collect();
    if parts.len() != 3 {
        return Err(format!("coordinates: expected 3 values, got {}", parts.len()));
    }
    let mut out = [0.0; 3];
    for (slot, part) in out.iter_mut().zip(parts) {
        *slot = part
            .parse()
            .map_err(|_| format!("coordinates: invalid number '{}'", part))?;
    }
    Ok(out)
}

/// Header mapping table
pub static FIELD_SETTERS: &[FieldSetter] = &[
    FieldSetter {
        key: "tag",
        aliases: &["name", "tag_name", "raw_tag"],
        setter: |input, v| {
            input.raw_tag = v.to_string();
            Ok(())
        },
    },
    FieldSetter {
        key: "description",
        aliases: &["desc", "comment"],
        setter: |input, v| {
            input.description = optional(v);
            Ok(())
        },
    },
    FieldSetter {
        key: "geometry",
        aliases: &["geometry_kind", "geometry_type", "shape"],
        setter: |input, v| {
            input.geometry_kind = v.trim().to_string();
            Ok(())
        },
    },
    FieldSetter {
        key: "owner",
        aliases: &["owner_model", "owner_model_name", "model"],
        setter: |input, v| {
            input.owner_model_name = v.trim().to_string();
            Ok(())
        },
    },
    FieldSetter {
        key: "catalog",
        aliases: &["catalog_reference", "spec_ref"],
        setter: |input, v| {
            input.catalog_reference = optional(v);
            Ok(())
        },
    },
    FieldSetter {
        key: "reference_number",
        aliases: &["ref_no", "refno"],
        setter: |input, v| {
            input.reference_number = optional(v);
            Ok(())
        },
    },
    FieldSetter {
        key: "source_file",
        aliases: &["file", "source"],
        setter: |input, v| {
            input.source_file = optional(v);
            Ok(())
        },
    },
    FieldSetter {
        key: "source_version",
        aliases: &["version"],
        setter: |input, v| {
            input.source_version = optional(v);
            Ok(())
        },
    },
    FieldSetter {
        key: "id",
        aliases: &["identity_id", "known_id"],
        setter: |input, v| {
            input.known_id = optional(v);
            Ok(())
        },
    },
    FieldSetter {
        key: "position",
        aliases: &["coordinates", "xyz"],
        setter: |input, v| {
            input.coordinates = match optional(v) {
                Some(text) => Some(parse_coordinates(&text)?),
                None => None,
            };
            Ok(())
        },
    },
];

pub fn setter_for(header: &str) -> Option<&'static FieldSetter> {
    FIELD_SETTERS.iter().find(|s| s.matches(header))
}

impl ElementInput {
    pub fn new(raw_tag: impl Into<String>) -> Self {
        Self {
            raw_tag: raw_tag.into(),
            ..Default::default()
        }
    }

    /// Apply one header/value pair; returns false for an unmapped header
    pub fn set_field(&mut self, header: &str, value: &str) -> Result<bool> {
        let Some(field) = setter_for(header) else {
            return Ok(false);
        };
        (field.setter)(self, value).map_err(Error::InvalidInput)?;
        Ok(true)
    }

    /// Build an input from extracted header/value pairs
    pub fn from_fields<'a, I>(fields: I) -> Result<Self>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut input = Self::default();
        for (header, value) in fields {
            if !input.set_field(header, value)? {
                tracing::debug!(header = %header, "Unmapped element field ignored");
            }
        }
        Ok(input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_fields_with_aliases() {
        let input = ElementInput::from_fields([
            ("Tag_Name", "PCM01.MHS01"),
            ("DESC", "Tank 0345 north"),
            ("shape", "Cylinder"),
            ("model", "ModelA"),
            ("xyz", "1.5, 2, -3"),
            ("colour", "red"),
        ])
        .unwrap();

        assert_eq!(input.raw_tag, "PCM01.MHS01");
        assert_eq!(input.description.as_deref(), Some("Tank 0345 north"));
        assert_eq!(input.geometry_kind, "Cylinder");
        assert_eq!(input.owner_model_name, "ModelA");
        assert_eq!(input.coordinates, Some([1.5, 2.0, -3.0]));
    }

    #[test]
    fn test_blank_optional_fields_are_none() {
        let mut input = ElementInput::new("PCM01");
        assert!(input.set_field("catalog", "   ").unwrap());
        assert!(input.catalog_reference.is_none());
        assert!(!input.set_field("unknown", "x").unwrap());
    }

    #[test]
    fn test_invalid_coordinates_rejected() {
        let result = ElementInput::from_fields([("position", "1,2")]);
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_keys_are_unique() {
        for (i, a) in FIELD_SETTERS.iter().enumerate() {
            for b in FIELD_SETTERS.iter().skip(i + 1) {
                assert!(!b.matches(a.key), "{} shadowed by {}", a.key, b.key);
                for alias in a.aliases {
                    assert!(!b.matches(alias), "alias {} shadowed by {}", alias, b.key);
                }
            }
        }
    }
}
