use crate::core::filters::{ExclusionRegistry, ForbiddenPhrases, PriceLimits};
use crate::core::model_id::ExcludedModels;
use crate::core::orchestrator::FilterRules;
use crate::domain::model::ModelKey;
use crate::utils::error::{Result, ScoutError};
use crate::utils::validation::{validate_non_empty_string, validate_positive_number, Validate};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// TOML 過濾規則設定。所有段落皆可省略，省略時使用內建預設值。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScoutConfig {
    pub scout: Option<ScoutMeta>,
    pub network: Option<NetworkConfig>,
    pub filter: Option<FilterConfig>,
    /// 型號名稱 → 價格上限（RON），覆寫內建表
    pub limits: Option<HashMap<String, f64>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoutMeta {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    pub retry_attempts: Option<u32>,
    pub delay_ms: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterConfig {
    pub forbidden_phrases: Option<Vec<String>>,
    pub excluded_models: Option<Vec<String>>,
    pub exclusion_file: Option<String>,
}

impl ScoutConfig {
    /// 從 TOML 檔案載入設定
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(ScoutError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析設定
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| ScoutError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    // 替換環境變數（例如 ${HOME}）
    fn substitute_env_vars(content: &str) -> String {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").unwrap();

        re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        })
        .to_string()
    }

    pub fn retry_attempts(&self) -> Option<u32> {
        self.network.as_ref().and_then(|n| n.retry_attempts)
    }

    pub fn delay_ms(&self) -> Option<u64> {
        self.network.as_ref().and_then(|n| n.delay_ms)
    }

    pub fn exclusion_file(&self) -> Option<&str> {
        self.filter
            .as_ref()
            .and_then(|f| f.exclusion_file.as_deref())
    }

    /// 由設定組出過濾規則，省略的部分使用內建預設
    pub fn filter_rules(&self, registry: ExclusionRegistry) -> FilterRules {
        let phrases = match self
            .filter
            .as_ref()
            .and_then(|f| f.forbidden_phrases.clone())
        {
            Some(phrases) => ForbiddenPhrases::new(phrases),
            None => ForbiddenPhrases::default(),
        };

        let excluded_models = match self.filter.as_ref().and_then(|f| f.excluded_models.clone()) {
            Some(terms) => {
                ExcludedModels::new(terms.into_iter().map(|t| t.to_lowercase()).collect())
            }
            None => ExcludedModels::default(),
        };

        let mut limits = PriceLimits::default();
        if let Some(overrides) = &self.limits {
            for (name, ceiling) in overrides {
                if let Some(model) = ModelKey::from_name(name) {
                    limits.set_ceiling(model, *ceiling);
                } else {
                    tracing::warn!("⚠️ Unknown model '{}' in [limits], ignoring", name);
                }
            }
        }

        FilterRules {
            phrases,
            excluded_models,
            limits,
            registry,
        }
    }

    pub fn validate_config(&self) -> Result<()> {
        if let Some(retries) = self.retry_attempts() {
            validate_positive_number("network.retry_attempts", retries as usize, 1)?;
        }

        if let Some(filter) = &self.filter {
            if let Some(phrases) = &filter.forbidden_phrases {
                for phrase in phrases {
                    validate_non_empty_string("filter.forbidden_phrases", phrase)?;
                }
            }
        }

        // 上限必須為正且有限，型號名稱必須已知
        if let Some(limits) = &self.limits {
            for (name, ceiling) in limits {
                if ModelKey::from_name(name).is_none() {
                    return Err(ScoutError::InvalidConfigValueError {
                        field: "limits".to_string(),
                        value: name.clone(),
                        reason: "Unknown model name".to_string(),
                    });
                }
                if !(ceiling.is_finite() && *ceiling > 0.0) {
                    return Err(ScoutError::InvalidConfigValueError {
                        field: "limits".to_string(),
                        value: format!("{} = {}", name, ceiling),
                        reason: "Price ceiling must be positive and finite".to_string(),
                    });
                }
            }
        }

        Ok(())
    }
}

impl Validate for ScoutConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let toml_content = r#"
[scout]
name = "xbox-defect-hunt"
description = "Weekend bargain scan"

[network]
retry_attempts = 2
delay_ms = 250

[filter]
forbidden_phrases = ["ca nou", "promovat"]
excluded_models = ["ps3", "lite"]
exclusion_file = "my_excluded.json"

[limits]
"xbox series x" = 650.0
"ps5" = 750.0
"#;

        let config = ScoutConfig::from_toml_str(toml_content).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.retry_attempts(), Some(2));
        assert_eq!(config.delay_ms(), Some(250));
        assert_eq!(config.exclusion_file(), Some("my_excluded.json"));

        let rules = config.filter_rules(ExclusionRegistry::default());
        assert_eq!(rules.limits.ceiling(ModelKey::XboxSeriesX), Some(650.0));
        assert_eq!(rules.limits.ceiling(ModelKey::Ps5), Some(750.0));
        // 沒被覆寫的型號維持預設
        assert_eq!(rules.limits.ceiling(ModelKey::XboxOne), Some(200.0));
        assert_eq!(rules.phrases.matches("este CA NOU"), Some("ca nou"));
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = ScoutConfig::from_toml_str("").unwrap();
        assert!(config.validate().is_ok());

        let rules = config.filter_rules(ExclusionRegistry::default());
        assert_eq!(rules.limits.ceiling(ModelKey::XboxSeriesX), Some(700.0));
        assert!(rules.phrases.matches("fara defecte").is_some());
        assert!(rules.excluded_models.matches("PS3 slim").is_some());
    }

    #[test]
    fn test_unknown_model_in_limits_is_rejected() {
        let config = ScoutConfig::from_toml_str(
            r#"
[limits]
"sega dreamcast" = 100.0
"#,
        )
        .unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_negative_ceiling_is_rejected() {
        let config = ScoutConfig::from_toml_str(
            r#"
[limits]
"ps5" = -10.0
"#,
        )
        .unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("SCOUT_EXCLUSION_FILE", "from_env.json");

        let config = ScoutConfig::from_toml_str(
            r#"
[filter]
exclusion_file = "${SCOUT_EXCLUSION_FILE}"
"#,
        )
        .unwrap();

        assert_eq!(config.exclusion_file(), Some("from_env.json"));
    }
}
