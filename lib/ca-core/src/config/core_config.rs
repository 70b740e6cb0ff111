use std::path::{Path, PathBuf};

#[cfg(feature = "config_env")]
use figment::providers::Env;
#[cfg(feature = "config_json")]
use figment::providers::Json;
#[cfg(feature = "config_yaml")]
use figment::providers::Yaml;
use figment::Figment;
use figment::providers::{Data, Format};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_with::{DurationMilliSeconds, DurationSeconds, serde_as};
use time::Duration;

use super::{ConfigParsingError, ConfigValidationError};
use crate::proto::refresh_policy::RefreshPolicy;
use crate::proto::refresh_scheduler::DEFAULT_CONCURRENCY;

#[cfg(feature = "config_env")]
const ENV_PREFIX: &str = "CA_";

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoCustomConfig;

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AppCustomConfigSerdeDTO<Custom> {
    #[serde(default)]
    pub(super) app: Custom,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig<Custom> {
    pub core: CoreConfig,
    pub app: Custom,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoreConfig {
    pub ca: CaConfig,
    #[serde(default)]
    pub lifetime: LifetimeConfig,
    #[serde(default)]
    pub refresh: RefreshConfig,
    #[serde(default)]
    pub autosign: AutosignConfig,
    #[serde(default)]
    pub submission: SubmissionConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaConfig {
    /// PEM file of the CA certificate
    pub certificate: PathBuf,
    /// PEM file of the CA private key
    pub key: PathBuf,
    /// Subject attributes of the CA that every submitted CSR must start with
    #[serde(default = "default_subject_prefix")]
    pub subject_prefix: Vec<String>,
}

fn default_subject_prefix() -> Vec<String> {
    ["C", "ST", "L", "O"].map(ToOwned::to_owned).to_vec()
}

#[serde_as]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LifetimeConfig {
    #[serde_as(as = "DurationSeconds<i64>")]
    pub short: Duration,
    #[serde_as(as = "DurationSeconds<i64>")]
    pub long: Duration,
    pub backdate: bool,
}

impl Default for LifetimeConfig {
    fn default() -> Self {
        Self {
            short: Duration::days(2),
            long: Duration::days(7),
            backdate: false,
        }
    }
}

#[serde_as]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RefreshConfig {
    pub concurrency: usize,
    #[serde_as(as = "DurationSeconds<i64>")]
    pub interval: Duration,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            interval: Duration::minutes(15),
        }
    }
}

#[serde_as]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AutosignConfig {
    pub enabled: bool,
    #[serde_as(as = "DurationMilliSeconds<i64>")]
    pub interval: Duration,
}

impl Default for AutosignConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            interval: Duration::milliseconds(500),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SubmissionConfig {
    /// Largest accepted CSR PEM, in bytes
    pub max_length: usize,
}

impl Default for SubmissionConfig {
    fn default() -> Self {
        Self { max_length: 2048 }
    }
}

impl CoreConfig {
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        let LifetimeConfig { short, long, .. } = self.lifetime;
        if !short.is_positive() {
            return Err(ConfigValidationError::NonPositiveLifetime("short"));
        }
        if !long.is_positive() {
            return Err(ConfigValidationError::NonPositiveLifetime("long"));
        }
        if short > long {
            return Err(ConfigValidationError::ShortExceedsLong { short, long });
        }

        if self.refresh.concurrency < 1 {
            return Err(ConfigValidationError::InvalidConcurrency);
        }
        if !self.refresh.interval.is_positive() {
            return Err(ConfigValidationError::NonPositiveInterval("refresh"));
        }
        if !self.autosign.interval.is_positive() {
            return Err(ConfigValidationError::NonPositiveInterval("autosign"));
        }

        if let Some(attribute) = self
            .ca
            .subject_prefix
            .iter()
            .find(|attribute| !SUBJECT_ATTRIBUTES.contains(&attribute.as_str()))
        {
            return Err(ConfigValidationError::UnknownSubjectAttribute(
                attribute.to_owned(),
            ));
        }

        Ok(())
    }

    pub fn refresh_policy(&self) -> RefreshPolicy {
        RefreshPolicy {
            short: self.lifetime.short,
            long: self.lifetime.long,
            backdate: self.lifetime.backdate,
        }
    }
}

/// Attribute short names usable in `ca.subjectPrefix`
const SUBJECT_ATTRIBUTES: &[&str] = &["C", "ST", "L", "O", "OU", "CN"];

pub enum InputFormat {
    #[cfg(feature = "config_yaml")]
    Yaml(Data<Yaml>),
    #[cfg(feature = "config_json")]
    Json(Data<Json>),
}

impl InputFormat {
    #[cfg(feature = "config_yaml")]
    pub fn yaml_file(p: impl AsRef<Path>) -> InputFormat {
        InputFormat::Yaml(Yaml::file(p))
    }

    #[cfg(feature = "config_yaml")]
    pub fn yaml_str(s: impl AsRef<str>) -> InputFormat {
        InputFormat::Yaml(Yaml::string(s.as_ref()))
    }

    #[cfg(feature = "config_json")]
    pub fn json_file(p: impl AsRef<Path>) -> InputFormat {
        InputFormat::Json(Json::file(p))
    }

    #[cfg(feature = "config_json")]
    pub fn json_str(s: impl AsRef<str>) -> InputFormat {
        InputFormat::Json(Json::string(s.as_ref()))
    }
}

impl<Custom> AppConfig<Custom>
where
    Custom: Serialize + DeserializeOwned + Default,
{
    pub fn from_files(files: &[impl AsRef<Path>]) -> Result<Self, ConfigParsingError> {
        let mut inputs: Vec<InputFormat> = Vec::with_capacity(files.len());

        for path in files {
            #[cfg(feature = "config_yaml")]
            if path
                .as_ref()
                .extension()
                .is_some_and(|ext| ext == "yml" || ext == "yaml")
            {
                inputs.push(InputFormat::yaml_file(path));
                continue;
            }

            #[cfg(feature = "config_json")]
            if path.as_ref().extension() == Some("json".as_ref()) {
                inputs.push(InputFormat::json_file(path));
                continue;
            }

            return Err(ConfigParsingError::GeneralParsingError(format!(
                "Unsupported file or missing file extension: {:?}",
                path.as_ref().to_str()
            )));
        }

        Self::parse(inputs)
    }

    /// Later inputs override earlier ones, `CA_` environment variables override all files
    pub fn parse(
        inputs: impl IntoIterator<Item = InputFormat>,
    ) -> Result<Self, ConfigParsingError> {
        let mut figment = Figment::new();

        for data in inputs {
            figment = match data {
                #[cfg(feature = "config_yaml")]
                InputFormat::Yaml(content) => figment.merge(content),
                #[cfg(feature = "config_json")]
                InputFormat::Json(content) => figment.merge(content),
            };
        }

        #[cfg(feature = "config_env")]
        {
            figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__").lowercase(false));
        }

        let core = figment
            .extract::<CoreConfig>()
            .map_err(|e| ConfigParsingError::GeneralParsingError(e.to_string()))?;
        let custom = figment
            .extract::<AppCustomConfigSerdeDTO<Custom>>()
            .map_err(|e| ConfigParsingError::GeneralParsingError(e.to_string()))?;

        Ok(Self {
            core,
            app: custom.app,
        })
    }
}
