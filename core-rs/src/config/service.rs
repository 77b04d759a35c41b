/**
 * service.rs
 * Service configuration document (YAML or JSON)
 *
 * Format:
 * ```yaml
 * ontology_namespace: http://example.org/onto/
 * ontology_path: /config/ontology.ttl
 * sparql_endpoint: https://query.wikidata.org/sparql
 * study_domain_class: ThingsDomain
 * label_predicates:
 *   - http://www.w3.org/2000/01/rdf-schema#label
 *   - http://www.w3.org/2004/02/skos/core#prefLabel
 * ```
 *
 * Values without `://` are local names resolved against `ontology_namespace`.
 */

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::errors::{GrontopiError, Result};
use crate::ontology::vocab;

/// Environment variable overriding the config file location
pub const CONFIG_PATH_ENV: &str = "CONFIG_PATH";

/// Config file looked up when `CONFIG_PATH` is unset
pub const DEFAULT_CONFIG_PATH: &str = "/config/config.yaml";

/// Basic-auth credentials for the SPARQL endpoint
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServiceConfig {
    /// Namespace used to resolve local names below
    #[serde(alias = "ontonamespace")]
    pub ontology_namespace: String,
    /// Turtle document holding the schema graph
    pub ontology_path: PathBuf,
    pub sparql_endpoint: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sparql_credentials: Option<Credentials>,
    pub user_agent: String,

    pub study_domain_class: String,
    pub reality_class: String,
    /// Materialized "class is domain of relation" predicate
    pub domain_of: String,
    /// Materialized "class is range of relation" predicate
    pub range_of: String,
    /// Class whose instances are catalog (taxonomy) roots
    pub catalog_class: String,

    pub label_predicates: Vec<String>,
    pub type_predicates: Vec<String>,

    /// Wrap query bodies in `GRAPH ?g { }`
    pub different_graphs: bool,
    /// Normalized queries longer than this many bytes are POSTed
    pub post_threshold: usize,

    pub cache_ttl_secs: u64,
    pub cache_capacity: u64,
    pub default_language: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            ontology_namespace: "https://www.wikidata.org/wiki/".to_string(),
            ontology_path: PathBuf::from("/config/ontology.ttl"),
            sparql_endpoint: "https://query.wikidata.org/sparql".to_string(),
            sparql_credentials: None,
            user_agent: format!(
                "GrOntoPI/{} (https://github.com/cnb-angelus/grontopi; grontopi@gmail.com)",
                crate::VERSION
            ),
            study_domain_class: "ThingsDomain".to_string(),
            reality_class: "ThingsReality".to_string(),
            domain_of: "isDomainOf".to_string(),
            range_of: "isRangeOf".to_string(),
            catalog_class: "Catalogo".to_string(),
            label_predicates: vec![
                vocab::RDFS_LABEL.to_string(),
                vocab::SKOS_PREF_LABEL.to_string(),
            ],
            type_predicates: vec![vocab::RDF_TYPE.to_string()],
            different_graphs: false,
            post_threshold: 1000,
            cache_ttl_secs: 300,
            cache_capacity: 32 * 1024,
            default_language: "en".to_string(),
        }
    }
}

impl ServiceConfig {
    /// Load configuration from a YAML or JSON file (chosen by extension)
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(GrontopiError::Config(format!(
                "config file not found: {}",
                path.display()
            )));
        }

        let content = fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        let config: ServiceConfig = if is_json {
            serde_json::from_str(&content)?
        } else {
            serde_yaml::from_str(&content)?
        };

        config.validate()?;
        info!(path = %path.display(), "loaded service configuration");
        Ok(config)
    }

    /// Resolve configuration from the environment.
    ///
    /// `CONFIG_PATH` must point at an existing file when set. Without it the
    /// default location is tried and, when absent, built-in defaults apply.
    pub fn from_env() -> Result<Self> {
        match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) => Self::load(path),
            Err(_) => {
                let default_path = Path::new(DEFAULT_CONFIG_PATH);
                if default_path.exists() {
                    Self::load(default_path)
                } else {
                    warn!("no config file found, loading default configuration");
                    Ok(Self::default())
                }
            }
        }
    }

    /// Save configuration as YAML
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let yaml = serde_yaml::to_string(self)?;
        fs::write(path.as_ref(), yaml)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.ontology_namespace.is_empty() {
            return Err(GrontopiError::Config(
                "ontology_namespace cannot be empty".to_string(),
            ));
        }

        if self.sparql_endpoint.is_empty() {
            return Err(GrontopiError::Config(
                "sparql_endpoint cannot be empty".to_string(),
            ));
        }

        if self.label_predicates.is_empty() {
            return Err(GrontopiError::Config(
                "label_predicates needs at least one predicate".to_string(),
            ));
        }

        if self.type_predicates.is_empty() {
            return Err(GrontopiError::Config(
                "type_predicates needs at least one predicate".to_string(),
            ));
        }

        Ok(())
    }

    /// Resolve a configured value to a full IRI
    pub fn resolve(&self, value: &str) -> String {
        let value = value.trim().trim_start_matches('<').trim_end_matches('>');
        if value.contains("://") {
            value.to_string()
        } else {
            format!("{}{}", self.ontology_namespace, value)
        }
    }

    pub fn study_domain_iri(&self) -> String {
        self.resolve(&self.study_domain_class)
    }

    pub fn reality_iri(&self) -> String {
        self.resolve(&self.reality_class)
    }

    /// Schema roots: the study-domain class and the reality class
    pub fn base_class_iris(&self) -> Vec<String> {
        vec![self.study_domain_iri(), self.reality_iri()]
    }

    pub fn domain_of_iri(&self) -> String {
        self.resolve(&self.domain_of)
    }

    pub fn range_of_iri(&self) -> String {
        self.resolve(&self.range_of)
    }

    pub fn catalog_class_iri(&self) -> String {
        self.resolve(&self.catalog_class)
    }

    pub fn label_predicate_iris(&self) -> Vec<String> {
        self.label_predicates.iter().map(|p| self.resolve(p)).collect()
    }

    pub fn type_predicate_iris(&self) -> Vec<String> {
        self.type_predicates.iter().map(|p| self.resolve(p)).collect()
    }
}
