use serde::{Deserialize, Serialize};

/// Tariff schedule as written in the config file.
///
/// Prices are plain numbers in the YAML and become exact decimals once the
/// schedule is validated and built.
///
/// Example YAML:
/// ```yaml
/// tariff:
///   name: "Domestic 2024"
///   brackets:
///     - { max_kg: 0.5, prices: [4531.27, 5858.26, 6073.39, 6412.57, 5169.05] }
///     - { max_kg: 1, prices: [4604.73, 5949.21, 6164.27, 6503.54, 5249.31] }
///     # ... eight brackets in total
///   overage: [214.95, 455.41, 527.41, 913.82, 401.83]
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct TariffConfig {
    /// Display name of the schedule (default: "default")
    #[serde(default)]
    pub name: Option<String>,

    /// Weight brackets in ascending order of ceiling
    pub brackets: Vec<BracketConfig>,

    /// Per-kilogram price above the top ceiling, one per zone
    pub overage: Vec<f64>,
}

/// One weight bracket: an upper-inclusive ceiling in kilograms and one price
/// per zone (zone 1 first).
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct BracketConfig {
    pub max_kg: f64,
    pub prices: Vec<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tariff_config_parse() {
        let yaml = r#"
name: "custom"
brackets:
  - max_kg: 0.5
    prices: [1, 2, 3, 4, 5]
  - { max_kg: 1, prices: [2, 3, 4, 5, 6] }
overage: [0.5, 0.5, 0.5, 0.5, 0.5]
"#;
        let config: TariffConfig = serde_saphyr::from_str(yaml).unwrap();
        assert_eq!(config.name.as_deref(), Some("custom"));
        assert_eq!(config.brackets.len(), 2);
        assert_eq!(config.brackets[1].max_kg, 1.0);
        assert_eq!(config.brackets[0].prices, vec![1.0, 2.0, 3.0, 4.0, 5.0]);
        assert_eq!(config.overage.len(), 5);
    }

    #[test]
    fn test_tariff_config_rejects_unknown_fields() {
        let yaml = r#"
brackets: []
overage: []
currency: ARS
"#;
        assert!(serde_saphyr::from_str::<TariffConfig>(yaml).is_err());
    }

    #[test]
    fn test_tariff_config_name_optional() {
        let yaml = "brackets: []\noverage: []\n";
        let config: TariffConfig = serde_saphyr::from_str(yaml).unwrap();
        assert!(config.name.is_none());
    }
}
