//! Schema document parsing for JSON and YAML formats
//!
//! Copyright (c) 2025 Draftcheck Team
//! Licensed under the Apache-2.0 license

use crate::error::{CompileError, CompileResult, DecodeError};
use serde_json::Value;
use std::path::Path;

/// Supported document formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// YAML format (.yaml, .yml)
    Yaml,
    /// JSON format (.json)
    Json,
}

impl Format {
    /// Detect format from file extension
    pub fn from_path(path: &Path) -> CompileResult<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
            .ok_or_else(|| CompileError::unsupported_format(path.to_path_buf()))
    }

    /// Detect format from the last path segment of a URI or file name
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_lowercase().as_str() {
            "yaml" | "yml" => Some(Format::Yaml),
            "json" => Some(Format::Json),
            _ => None,
        }
    }
}

/// Parser turning document bytes into raw schema values
#[derive(Debug, Default, Clone, Copy)]
pub struct SchemaParser;

impl SchemaParser {
    pub fn new() -> Self {
        Self
    }

    /// Parse a schema file, detecting format from extension
    pub fn parse_file(&self, path: &Path) -> CompileResult<Value> {
        let format = Format::from_path(path)?;
        let content =
            std::fs::read(path).map_err(|e| CompileError::io_error(path.to_path_buf(), e))?;

        Ok(self.parse_bytes(&content, format)?)
    }

    /// Parse document bytes with explicit format
    pub fn parse_bytes(&self, content: &[u8], format: Format) -> Result<Value, DecodeError> {
        match format {
            Format::Json => Ok(serde_json::from_slice(content)?),
            Format::Yaml => Ok(serde_yaml::from_slice(content)?),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_format_detection() {
        assert_eq!(Format::from_path(Path::new("schema.yaml")).unwrap(), Format::Yaml);
        assert_eq!(Format::from_path(Path::new("schema.YML")).unwrap(), Format::Yaml);
        assert_eq!(Format::from_path(Path::new("schema.json")).unwrap(), Format::Json);

        assert!(matches!(
            Format::from_path(Path::new("schema.txt")),
            Err(CompileError::UnsupportedFormat { .. })
        ));
        assert!(Format::from_path(Path::new("schema")).is_err());
    }

    #[test]
    fn test_yaml_parsing() -> CompileResult<()> {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("product.yaml");

        let yaml_content = r#"
type: object
properties:
  price:
    type: number
    minimum: 0
required: [price]
"#;
        fs::write(&file_path, yaml_content).unwrap();

        let schema = SchemaParser::new().parse_file(&file_path)?;
        assert_eq!(schema["type"], "object");
        assert_eq!(schema["properties"]["price"]["minimum"], 0);
        assert_eq!(schema["required"][0], "price");

        Ok(())
    }

    #[test]
    fn test_json_parsing() -> CompileResult<()> {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("product.json");
        fs::write(&file_path, r#"{"type": "array", "items": {"type": "string"}}"#).unwrap();

        let schema = SchemaParser::new().parse_file(&file_path)?;
        assert_eq!(schema["items"]["type"], "string");

        Ok(())
    }

    #[test]
    fn test_malformed_content() {
        let parser = SchemaParser::new();
        assert!(matches!(
            parser.parse_bytes(b"{\"type\": ", Format::Json),
            Err(DecodeError::Json { .. })
        ));
        assert!(matches!(
            parser.parse_bytes(b"type: [unclosed", Format::Yaml),
            Err(DecodeError::Yaml { .. })
        ));
    }

    #[test]
    fn test_missing_file() {
        let dir = tempdir().unwrap();
        let result = SchemaParser::new().parse_file(&dir.path().join("absent.json"));
        assert!(matches!(result, Err(CompileError::Io { .. })));
    }
}
