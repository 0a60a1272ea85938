use crate::adapters::llm::{
    GeneratorSettings, DEFAULT_ENDPOINT, DEFAULT_MAX_NEW_TOKENS, DEFAULT_MODEL,
    DEFAULT_TEMPERATURE, DEFAULT_TIMEOUT_SECONDS,
};
use crate::core::classifier::{DomainClassifier, DomainRoute};
use crate::core::desk::{DeskSettings, DEFAULT_CUTOFF};
use crate::core::greetings::{Greetings, DEFAULT_GREETINGS};
use crate::domain::model::Domain;
use crate::utils::error::{HelpDeskError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_DATASET: &str = "data/faq.csv";
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_API_PORT: u16 = 5000;
pub const DEFAULT_WEB_PORT: u16 = 5001;

/// Every section and field is optional; missing values fall back to defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    pub dataset: Option<DatasetConfig>,
    pub generator: Option<GeneratorConfig>,
    pub server: Option<ServerConfig>,
    pub routing: Option<RoutingConfig>,
    pub greetings: Option<BTreeMap<String, String>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DatasetConfig {
    pub paths: Option<Vec<String>>,
    pub cutoff: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeneratorConfig {
    pub enabled: Option<bool>,
    pub endpoint: Option<String>,
    pub model: Option<String>,
    pub temperature: Option<f64>,
    pub max_new_tokens: Option<u32>,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: Option<String>,
    pub api_port: Option<u16>,
    pub web_port: Option<u16>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RoutingConfig {
    pub admission: Option<DomainRoute>,
    pub scholarship: Option<DomainRoute>,
    pub student_affairs: Option<DomainRoute>,
    pub academics: Option<DomainRoute>,
    pub migration: Option<DomainRoute>,
}

impl RoutingConfig {
    fn get(&self, domain: Domain) -> Option<&DomainRoute> {
        match domain {
            Domain::Admission => self.admission.as_ref(),
            Domain::Scholarship => self.scholarship.as_ref(),
            Domain::StudentAffairs => self.student_affairs.as_ref(),
            Domain::Academics => self.academics.as_ref(),
            Domain::Migration => self.migration.as_ref(),
        }
    }
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(HelpDeskError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| HelpDeskError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the environment value; unset variables are left as written.
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| HelpDeskError::ConfigError {
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        let paths = self.dataset_paths();
        if paths.is_empty() {
            return Err(HelpDeskError::ConfigValidationError {
                field: "dataset.paths".to_string(),
                message: "at least one dataset file is required".to_string(),
            });
        }
        for path in &paths {
            validation::validate_path("dataset.paths", path)?;
        }
        validation::validate_file_extensions("dataset.paths", &paths, &["csv"])?;
        validation::validate_range("dataset.cutoff", self.cutoff(), 0.0, 1.0)?;

        if self.generator_enabled() {
            let settings = self.generator_settings();
            validation::validate_url("generator.endpoint", &settings.endpoint)?;
            validation::validate_non_empty_string("generator.model", &settings.model)?;
            validation::validate_range("generator.temperature", settings.temperature, 0.0, 2.0)?;
            validation::validate_positive_number(
                "generator.max_new_tokens",
                u64::from(settings.max_new_tokens),
                1,
            )?;
            validation::validate_positive_number(
                "generator.timeout_seconds",
                settings.timeout.as_secs(),
                1,
            )?;
        }

        validation::validate_non_empty_string("server.host", &self.host())?;

        for domain in Domain::ALL {
            let route = self.route_for(domain);
            validation::validate_non_empty_string(
                &format!("routing.{}.staff", routing_key(domain)),
                &route.staff,
            )?;
        }

        Ok(())
    }

    pub fn dataset_paths(&self) -> Vec<String> {
        self.dataset
            .as_ref()
            .and_then(|d| d.paths.clone())
            .unwrap_or_else(|| vec![DEFAULT_DATASET.to_string()])
    }

    pub fn cutoff(&self) -> f64 {
        self.dataset
            .as_ref()
            .and_then(|d| d.cutoff)
            .unwrap_or(DEFAULT_CUTOFF)
    }

    pub fn generator_enabled(&self) -> bool {
        self.generator
            .as_ref()
            .and_then(|g| g.enabled)
            .unwrap_or(true)
    }

    pub fn generator_settings(&self) -> GeneratorSettings {
        let g = self.generator.clone().unwrap_or_default();
        GeneratorSettings {
            endpoint: g.endpoint.unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
            model: g.model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            temperature: g.temperature.unwrap_or(DEFAULT_TEMPERATURE),
            max_new_tokens: g.max_new_tokens.unwrap_or(DEFAULT_MAX_NEW_TOKENS),
            timeout: Duration::from_secs(g.timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECONDS)),
        }
    }

    pub fn host(&self) -> String {
        self.server
            .as_ref()
            .and_then(|s| s.host.clone())
            .unwrap_or_else(|| DEFAULT_HOST.to_string())
    }

    pub fn api_port(&self) -> u16 {
        self.server
            .as_ref()
            .and_then(|s| s.api_port)
            .unwrap_or(DEFAULT_API_PORT)
    }

    pub fn web_port(&self) -> u16 {
        self.server
            .as_ref()
            .and_then(|s| s.web_port)
            .unwrap_or(DEFAULT_WEB_PORT)
    }

    pub fn route_for(&self, domain: Domain) -> DomainRoute {
        self.routing
            .as_ref()
            .and_then(|r| r.get(domain).cloned())
            .unwrap_or_else(|| DomainRoute::default_for(domain))
    }

    pub fn greetings(&self) -> Greetings {
        match &self.greetings {
            Some(table) => Greetings::new(table.clone()),
            None => Greetings::default(),
        }
    }

    pub fn desk_settings(&self) -> DeskSettings {
        DeskSettings {
            cutoff: self.cutoff(),
            greetings: self.greetings(),
            classifier: DomainClassifier::new(|domain| self.route_for(domain)),
        }
    }

    /// Same configuration with every default written out.
    pub fn resolved(&self) -> Self {
        let generator = self.generator_settings();

        Self {
            dataset: Some(DatasetConfig {
                paths: Some(self.dataset_paths()),
                cutoff: Some(self.cutoff()),
            }),
            generator: Some(GeneratorConfig {
                enabled: Some(self.generator_enabled()),
                endpoint: Some(generator.endpoint),
                model: Some(generator.model),
                temperature: Some(generator.temperature),
                max_new_tokens: Some(generator.max_new_tokens),
                timeout_seconds: Some(generator.timeout.as_secs()),
            }),
            server: Some(ServerConfig {
                host: Some(self.host()),
                api_port: Some(self.api_port()),
                web_port: Some(self.web_port()),
            }),
            routing: Some(RoutingConfig {
                admission: Some(self.route_for(Domain::Admission)),
                scholarship: Some(self.route_for(Domain::Scholarship)),
                student_affairs: Some(self.route_for(Domain::StudentAffairs)),
                academics: Some(self.route_for(Domain::Academics)),
                migration: Some(self.route_for(Domain::Migration)),
            }),
            greetings: Some(self.greetings.clone().unwrap_or_else(|| {
                DEFAULT_GREETINGS
                    .iter()
                    .map(|(phrase, reply)| (phrase.to_string(), reply.to_string()))
                    .collect()
            })),
        }
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| HelpDeskError::ConfigError {
            message: format!("TOML serialization error: {}", e),
        })
    }
}

fn routing_key(domain: Domain) -> &'static str {
    match domain {
        Domain::Admission => "admission",
        Domain::Scholarship => "scholarship",
        Domain::StudentAffairs => "student_affairs",
        Domain::Academics => "academics",
        Domain::Migration => "migration",
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
