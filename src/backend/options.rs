//! Declared tool option schemas.
//!
//! Each backend declares its options in three categories: boolean flags,
//! scalar members and string lists. Raw options from the manifest are checked
//! against the schema and then deserialized into the backend's typed options
//! struct, once, when the backend is created.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::backend::capabilities::BackendId;
use crate::backend::error::BackendError;

/// Option category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionCategory {
    Flag,
    Member,
    List,
}

/// Documentation of one declared option.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct OptionDoc {
    pub name: &'static str,
    /// Value type name (`Bool`, `String`)
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub desc: &'static str,
}

/// Options declared by a backend.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct OptionSchema {
    pub flags: &'static [OptionDoc],
    pub members: &'static [OptionDoc],
    pub lists: &'static [OptionDoc],
}

impl OptionSchema {
    /// Category of a declared option.
    pub fn category(&self, name: &str) -> Option<OptionCategory> {
        let declared = |docs: &[OptionDoc]| docs.iter().any(|d| d.name == name);
        if declared(self.flags) {
            Some(OptionCategory::Flag)
        } else if declared(self.members) {
            Some(OptionCategory::Member)
        } else if declared(self.lists) {
            Some(OptionCategory::List)
        } else {
            None
        }
    }

    /// All declared option names.
    pub fn names(&self) -> Vec<&'static str> {
        self.flags
            .iter()
            .chain(self.members)
            .chain(self.lists)
            .map(|d| d.name)
            .collect()
    }

    /// Check raw options against the schema.
    pub fn validate(&self, backend: BackendId, raw: &serde_json::Value) -> Result<(), BackendError> {
        let invalid = |message: String| BackendError::InvalidOptions { backend, message };

        let table = match raw {
            serde_json::Value::Null => return Ok(()),
            serde_json::Value::Object(table) => table,
            other => return Err(invalid(format!("expected a table, found `{}`", other))),
        };

        for (key, value) in table {
            let category = self.category(key).ok_or_else(|| {
                invalid(format!(
                    "unknown option `{}`, expected one of: {}",
                    key,
                    self.names().join(", ")
                ))
            })?;

            let valid = match category {
                OptionCategory::Flag => value.is_boolean(),
                OptionCategory::Member => value.is_string(),
                OptionCategory::List => value
                    .as_array()
                    .is_some_and(|items| items.iter().all(|v| v.is_string())),
            };

            if !valid {
                let expected = match category {
                    OptionCategory::Flag => "a boolean",
                    OptionCategory::Member => "a string",
                    OptionCategory::List => "a list of strings",
                };
                return Err(invalid(format!(
                    "option `{}` must be {}, found `{}`",
                    key, expected, value
                )));
            }
        }

        Ok(())
    }
}

/// Validate raw options and deserialize them into a typed options struct.
pub fn parse_options<T: DeserializeOwned + Default>(
    backend: BackendId,
    schema: &OptionSchema,
    raw: &serde_json::Value,
) -> Result<T, BackendError> {
    schema.validate(backend, raw)?;

    if raw.is_null() {
        return Ok(T::default());
    }

    serde_json::from_value(raw.clone()).map_err(|e| BackendError::InvalidOptions {
        backend,
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    const SCHEMA: OptionSchema = OptionSchema {
        flags: &[OptionDoc {
            name: "gui",
            kind: "Bool",
            desc: "Run in GUI",
        }],
        members: &[OptionDoc {
            name: "part",
            kind: "String",
            desc: "Device part",
        }],
        lists: &[OptionDoc {
            name: "args",
            kind: "String",
            desc: "Extra args",
        }],
    };

    #[derive(Debug, Default, Deserialize)]
    #[serde(default, deny_unknown_fields)]
    struct TestOptions {
        gui: bool,
        part: Option<String>,
        args: Vec<String>,
    }

    #[test]
    fn test_category() {
        assert_eq!(SCHEMA.category("gui"), Some(OptionCategory::Flag));
        assert_eq!(SCHEMA.category("part"), Some(OptionCategory::Member));
        assert_eq!(SCHEMA.category("args"), Some(OptionCategory::List));
        assert_eq!(SCHEMA.category("nope"), None);
    }

    #[test]
    fn test_parse_valid() {
        let opts: TestOptions = parse_options(
            BackendId::Vivado,
            &SCHEMA,
            &json!({"gui": true, "part": "xc7", "args": ["-a"]}),
        )
        .unwrap();
        assert!(opts.gui);
        assert_eq!(opts.part.as_deref(), Some("xc7"));
        assert_eq!(opts.args, vec!["-a"]);
    }

    #[test]
    fn test_parse_empty_and_null() {
        let opts: TestOptions = parse_options(BackendId::Vivado, &SCHEMA, &json!({})).unwrap();
        assert!(!opts.gui);
        let opts: TestOptions =
            parse_options(BackendId::Vivado, &SCHEMA, &serde_json::Value::Null).unwrap();
        assert!(opts.part.is_none());
    }

    #[test]
    fn test_unknown_key_rejected() {
        let err = parse_options::<TestOptions>(BackendId::Vivado, &SCHEMA, &json!({"bogus": 1}))
            .unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("unknown option `bogus`"));
        assert!(msg.contains("gui, part, args"));
    }

    #[test]
    fn test_wrong_type_rejected() {
        let err = parse_options::<TestOptions>(BackendId::Vivado, &SCHEMA, &json!({"gui": "yes"}))
            .unwrap_err();
        assert!(err.to_string().contains("must be a boolean"));

        let err = parse_options::<TestOptions>(BackendId::Vivado, &SCHEMA, &json!({"args": [1]}))
            .unwrap_err();
        assert!(err.to_string().contains("list of strings"));
    }
}
