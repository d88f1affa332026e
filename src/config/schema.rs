use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::output::NumberFormat;
use crate::tariff::TariffConfig;

/// Top-level config file.
///
/// Example YAML:
/// ```yaml
/// tariff:
///   name: "Domestic 2024"
///   brackets: [...]
///   overage: [214.95, 455.41, 527.41, 913.82, 401.83]
/// columns:
///   aliases:
///     "Nro de Envio": Guia
/// output:
///   suffix: "_procesado"
/// ```
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Tariff schedule; the shipped schedule is used when absent
    #[serde(default)]
    pub tariff: Option<TariffConfig>,

    #[serde(default)]
    pub columns: ColumnsConfig,

    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ColumnsConfig {
    /// Extra header spellings mapped onto canonical column names
    #[serde(default)]
    pub aliases: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    /// Appended to the input file stem to name the artifact
    pub suffix: String,
    pub sheet_processed: String,
    pub sheet_summary: String,
    pub number_format: NumberFormat,
}

/// Characters Excel does not allow in a worksheet name.
const INVALID_SHEET_CHARS: [char; 7] = ['[', ']', ':', '*', '?', '/', '\\'];
const MAX_SHEET_NAME_CHARS: usize = 31;

impl OutputConfig {
    /// Check the names that end up in the artifact, so a bad config fails at
    /// startup rather than after every manifest has been computed.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        check_sheet_name("output.sheet_processed", &self.sheet_processed, &mut errors);
        check_sheet_name("output.sheet_summary", &self.sheet_summary, &mut errors);
        if self.sheet_processed.to_lowercase() == self.sheet_summary.to_lowercase() {
            errors.push("output: sheet_processed and sheet_summary must differ".to_string());
        }

        if self.suffix.contains(['/', '\\']) {
            errors.push(format!(
                "output.suffix: '{}' must not contain a path separator",
                self.suffix
            ));
        }

        if let Err(e) = self.number_format.validate() {
            errors.extend(e);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

fn check_sheet_name(path: &str, name: &str, errors: &mut Vec<String>) {
    if name.is_empty() {
        errors.push(format!("{}: sheet name must not be empty", path));
        return;
    }
    let length = name.chars().count();
    if length > MAX_SHEET_NAME_CHARS {
        errors.push(format!(
            "{}: '{}' is {} characters long (at most {})",
            path, name, length, MAX_SHEET_NAME_CHARS
        ));
    }
    if name.contains(INVALID_SHEET_CHARS) {
        errors.push(format!(
            "{}: '{}' must not contain any of [ ] : * ? / \\",
            path, name
        ));
    }
    if name.starts_with('\'') || name.ends_with('\'') {
        errors.push(format!(
            "{}: '{}' must not start or end with an apostrophe",
            path, name
        ));
    }
    if name.eq_ignore_ascii_case("History") {
        errors.push(format!("{}: 'History' is reserved by Excel", path));
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            suffix: "_processed".to_string(),
            sheet_processed: "Processed Data".to_string(),
            sheet_summary: "Summary".to_string(),
            number_format: NumberFormat::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: Config = serde_saphyr::from_str("{}").unwrap();
        assert!(config.tariff.is_none());
        assert!(config.columns.aliases.is_empty());
        assert_eq!(config.output, OutputConfig::default());
    }

    #[test]
    fn test_partial_output_section() {
        let yaml = r#"
output:
  suffix: "_procesado"
"#;
        let config: Config = serde_saphyr::from_str(yaml).unwrap();
        assert_eq!(config.output.suffix, "_procesado");
        assert_eq!(config.output.sheet_summary, "Summary");
    }

    #[test]
    fn test_aliases_section() {
        let yaml = r#"
columns:
  aliases:
    "Nro de Envio": Guia
    Kilos: GramRea
"#;
        let config: Config = serde_saphyr::from_str(yaml).unwrap();
        assert_eq!(config.columns.aliases.len(), 2);
        assert_eq!(config.columns.aliases["Nro de Envio"], "Guia");
    }

    #[test]
    fn test_unknown_top_level_key_rejected() {
        assert!(serde_saphyr::from_str::<Config>("queries: []").is_err());
    }

    #[test]
    fn test_config_serde_roundtrip() {
        let config = Config {
            tariff: Some(crate::tariff::TariffSchedule::default().to_config()),
            ..Config::default()
        };
        let yaml = serde_saphyr::to_string(&config).unwrap();
        let parsed: Config = serde_saphyr::from_str(&yaml).unwrap();
        assert_eq!(config, parsed);
    }

    fn output_with(f: impl FnOnce(&mut OutputConfig)) -> OutputConfig {
        let mut output = OutputConfig::default();
        f(&mut output);
        output
    }

    #[test]
    fn test_default_output_is_valid() {
        assert!(OutputConfig::default().validate().is_ok());
    }

    #[test]
    fn test_sheet_name_too_long() {
        let name = "Envios procesados de marzo de 2024";
        let output = output_with(|o| o.sheet_processed = name.to_string());
        let errors = output.validate().unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("output.sheet_processed"));
        assert!(errors[0].contains("at most 31"));

        // 31 characters, some of them multi-byte, is still fine
        let output = output_with(|o| o.sheet_processed = "ñ".repeat(31));
        assert!(output.validate().is_ok());
    }

    #[test]
    fn test_sheet_name_invalid_characters() {
        for name in ["Datos: procesados", "[marzo]", "a*b", "que?", "2024/03", "a\\b"] {
            let output = output_with(|o| o.sheet_summary = name.to_string());
            let errors = output.validate().unwrap_err();
            assert!(errors[0].contains("output.sheet_summary"), "{}", name);
            assert!(errors[0].contains("must not contain"), "{}", name);
        }
    }

    #[test]
    fn test_sheet_name_reserved_and_empty() {
        let output = output_with(|o| o.sheet_summary = "history".to_string());
        assert!(output.validate().unwrap_err()[0].contains("reserved"));

        let output = output_with(|o| o.sheet_processed = String::new());
        assert!(output.validate().unwrap_err()[0].contains("must not be empty"));

        let output = output_with(|o| o.sheet_processed = "'Datos'".to_string());
        assert!(output.validate().unwrap_err()[0].contains("apostrophe"));
    }

    #[test]
    fn test_sheet_names_must_differ() {
        let output = output_with(|o| o.sheet_summary = "processed data".to_string());
        assert!(output.validate().unwrap_err()[0].contains("must differ"));
    }

    #[test]
    fn test_suffix_with_path_separator() {
        for suffix in ["/../x", "_out\\x"] {
            let output = output_with(|o| o.suffix = suffix.to_string());
            let errors = output.validate().unwrap_err();
            assert_eq!(errors.len(), 1);
            assert!(errors[0].contains("output.suffix"));
        }
    }

    #[test]
    fn test_all_output_errors_reported() {
        let output = OutputConfig {
            suffix: "a/b".to_string(),
            sheet_processed: "Datos: procesados [marzo 2024]".to_string(),
            sheet_summary: "History".to_string(),
            number_format: NumberFormat::default(),
        };
        assert_eq!(output.validate().unwrap_err().len(), 3);
    }
}
