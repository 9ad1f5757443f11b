// src/module/config.rs

//! Module configuration schemas and validation.
//!
//! A behaviour may declare a [`ConfigSchema`]; incoming configuration
//! deltas are validated against it before anything is committed. Validation
//! failures carry structured field-level issues and leave the module's
//! current configuration untouched.

use serde_json::Value;

use crate::value::ValueMap;

/// Expected shape of a configuration field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Bool,
    Integer,
    Float,
    String,
    Array,
    Object,
    /// Any JSON value.
    Any,
}

impl std::fmt::Display for FieldKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            FieldKind::Bool => "bool",
            FieldKind::Integer => "integer",
            FieldKind::Float => "float",
            FieldKind::String => "string",
            FieldKind::Array => "array",
            FieldKind::Object => "object",
            FieldKind::Any => "any",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone)]
pub struct FieldSpec {
    pub name: String,
    pub kind: FieldKind,
    pub required: bool,
}

/// Declared configuration schema of one module type.
///
/// Unknown keys are rejected; the schema is the complete description of the
/// accepted configuration surface.
#[derive(Debug, Clone, Default)]
pub struct ConfigSchema {
    fields: Vec<FieldSpec>,
}

impl ConfigSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, name: impl Into<String>, kind: FieldKind) -> Self {
        self.fields.push(FieldSpec {
            name: name.into(),
            kind,
            required: false,
        });
        self
    }

    pub fn required_field(mut self, name: impl Into<String>, kind: FieldKind) -> Self {
        self.fields.push(FieldSpec {
            name: name.into(),
            kind,
            required: true,
        });
        self
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    /// Validate a complete configuration map against this schema.
    ///
    /// Collects every issue instead of stopping at the first one, so the
    /// caller can surface all problems in a single report.
    pub fn validate(&self, module: &str, config: &ValueMap) -> Result<(), ConfigValidationError> {
        let mut issues = Vec::new();

        for field in &self.fields {
            match config.get(&field.name) {
                Some(value) => {
                    if !kind_matches(value, field.kind) {
                        issues.push(FieldIssue {
                            field: field.name.clone(),
                            message: format!(
                                "expected {}, got {}",
                                field.kind,
                                json_kind(value)
                            ),
                        });
                    }
                }
                None if field.required => {
                    issues.push(FieldIssue {
                        field: field.name.clone(),
                        message: "required field is missing".to_string(),
                    });
                }
                None => {}
            }
        }

        for key in config.keys() {
            if !self.fields.iter().any(|f| &f.name == key) {
                issues.push(FieldIssue {
                    field: key.clone(),
                    message: "unknown configuration key".to_string(),
                });
            }
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(ConfigValidationError {
                module: module.to_string(),
                issues,
            })
        }
    }
}

/// One rejected configuration field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldIssue {
    pub field: String,
    pub message: String,
}

/// Structured rejection of a configuration delta.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigValidationError {
    pub module: String,
    pub issues: Vec<FieldIssue>,
}

impl std::error::Error for ConfigValidationError {}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid configuration for module '{}': ", self.module)?;
        let mut first = true;
        for issue in &self.issues {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{}: {}", issue.field, issue.message)?;
            first = false;
        }
        Ok(())
    }
}

fn kind_matches(value: &Value, kind: FieldKind) -> bool {
    match kind {
        FieldKind::Bool => value.is_boolean(),
        FieldKind::Integer => value.is_i64() || value.is_u64(),
        FieldKind::Float => value.is_number(),
        FieldKind::String => value.is_string(),
        FieldKind::Array => value.is_array(),
        FieldKind::Object => value.is_object(),
        FieldKind::Any => true,
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
