//! Analysis configuration
//!
//! Loaded from TOML, every field optional. An empty config is valid and is
//! the `Default`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use glob::Pattern;

use crate::analysis::CycleConfig;
use crate::core::{DomainKind, Error, Result};

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Glob patterns over qualified names; matching types are dropped from
    /// scope before any phase runs
    #[serde(default)]
    pub exclude_patterns: Vec<String>,
    /// Config-forced domain kinds, applied at explicit-marker priority
    #[serde(default)]
    pub explicit_kinds: BTreeMap<String, DomainKind>,
    /// Fan per-type criterion evaluation out over a thread pool
    #[serde(default)]
    pub parallel: bool,
    #[serde(default)]
    pub cycles: CycleConfig,
}

impl AnalysisConfig {
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: AnalysisConfig = toml::from_str(contents).map_err(|e| {
            Error::Configuration(format!("failed to parse analysis config: {e}"))
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| Error::ConfigFile {
            message: format!("failed to read {}", path.display()),
            path: Some(path.to_path_buf()),
            source: Some(e),
        })?;
        let config = Self::from_toml_str(&contents)?;
        log::debug!("loaded analysis config from {}", path.display());
        Ok(config)
    }

    /// Checks every exclude pattern compiles.
    pub fn validate(&self) -> Result<()> {
        for pattern in &self.exclude_patterns {
            Pattern::new(pattern).map_err(|e| {
                Error::Configuration(format!("invalid exclude pattern '{pattern}': {e}"))
            })?;
        }
        Ok(())
    }

    /// Exclusion globs compiled once, in declaration order.
    pub fn compiled_excludes(&self) -> Result<Vec<Pattern>> {
        self.exclude_patterns
            .iter()
            .map(|p| Pattern::new(p).map_err(Error::from))
            .collect()
    }

    /// Whether a qualified name falls outside analysis scope.
    ///
    /// Patterns that fail to compile are skipped here; `validate` reports
    /// them.
    pub fn excludes(&self, qualified_name: &str) -> bool {
        self.exclude_patterns
            .iter()
            .filter_map(|p| Pattern::new(p).ok())
            .any(|p| p.matches(qualified_name))
    }

    pub fn explicit_kind(&self, qualified_name: &str) -> Option<DomainKind> {
        self.explicit_kinds.get(qualified_name).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn default_config_is_valid_and_empty() {
        let config = AnalysisConfig::default();
        assert!(config.validate().is_ok());
        assert!(config.exclude_patterns.is_empty());
        assert!(config.explicit_kinds.is_empty());
        assert!(!config.parallel);
        assert!(config.cycles.include_self_loops);
        assert_eq!(config.cycles.max_cycles, None);
    }

    #[test]
    fn parses_a_full_config() {
        let toml = indoc! {r#"
            exclude_patterns = ["*.generated.*", "legacy.**"]
            parallel = true

            [explicit_kinds]
            "shop.LegacyOrder" = "AGGREGATE_ROOT"
            "shop.LegacyNote" = "VALUE_OBJECT"

            [cycles]
            include_self_loops = false
            max_cycles = 5
        "#};

        let config = AnalysisConfig::from_toml_str(toml).unwrap();
        assert_eq!(config.exclude_patterns.len(), 2);
        assert!(config.parallel);
        assert_eq!(
            config.explicit_kind("shop.LegacyOrder"),
            Some(DomainKind::AggregateRoot)
        );
        assert_eq!(
            config.explicit_kind("shop.LegacyNote"),
            Some(DomainKind::ValueObject)
        );
        assert_eq!(config.explicit_kind("shop.Other"), None);
        assert!(!config.cycles.include_self_loops);
        assert_eq!(config.cycles.max_cycles, Some(5));
    }

    #[test]
    fn missing_sections_fall_back_to_defaults() {
        let config = AnalysisConfig::from_toml_str("parallel = true").unwrap();
        assert!(config.parallel);
        assert!(config.exclude_patterns.is_empty());
        assert!(config.cycles.include_self_loops);
    }

    #[test]
    fn rejects_an_unknown_kind_name() {
        let toml = indoc! {r#"
            [explicit_kinds]
            "shop.Order" = "SINGLETON"
        "#};
        let err = AnalysisConfig::from_toml_str(toml).unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }

    #[test]
    fn rejects_an_invalid_exclude_pattern() {
        let toml = r#"exclude_patterns = ["[unclosed"]"#;
        let err = AnalysisConfig::from_toml_str(toml).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("invalid exclude pattern"), "{message}");
    }

    #[test]
    fn excludes_matches_globs_against_qualified_names() {
        let config = AnalysisConfig {
            exclude_patterns: vec!["shop.internal.*".to_string(), "*Dto".to_string()],
            ..AnalysisConfig::default()
        };
        assert!(config.excludes("shop.internal.Cache"));
        assert!(config.excludes("shop.OrderDto"));
        assert!(!config.excludes("shop.Order"));
    }

    #[test]
    fn loads_from_a_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "parallel = true").unwrap();

        let config = AnalysisConfig::load(file.path()).unwrap();
        assert!(config.parallel);
    }

    #[test]
    fn load_reports_a_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.toml");
        let err = AnalysisConfig::load(&missing).unwrap_err();
        assert!(matches!(err, Error::ConfigFile { .. }));
    }
}
