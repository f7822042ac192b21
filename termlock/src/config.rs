// This file is part of the product TermLock.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use crate::restrictions::settings::{
    DEFAULT_BYPASS_ROLE, DEFAULT_CONTENT_TYPE, DEFAULT_DENIAL_MESSAGE, DEFAULT_TAXONOMIES,
    ManagedTaxonomy, RestrictionSettings,
};
use crate::roles::{
    DEFAULT_ANONYMOUS_ROLE, MAX_ROLE_COUNT, RoleCatalog, RoleDefinition,
    default_role_definitions, normalize_role,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

const MAX_SLUG_CHARS: usize = 32;
const MAX_HEADER_CHARS: usize = 128;
const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

#[derive(Debug)]
pub enum ConfigError {
    LoadError(String),
    ValidationError(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::LoadError(msg) => write!(f, "Configuration load error: {}", msg),
            ConfigError::ValidationError(msg) => {
                write!(f, "Configuration validation error: {}", msg)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    pub server: ServerConfig,
    pub app: AppConfig,
    pub logging: LoggingConfig,
    #[serde(default)]
    pub identity: IdentityConfig,
    #[serde(default = "default_role_definitions")]
    pub roles: Vec<RoleDefinition>,
    #[serde(default)]
    pub restrictions: RestrictionsConfig,
}

#[derive(Debug, Clone)]
pub struct ValidatedConfig {
    pub server: ServerConfig,
    pub app: AppConfig,
    pub logging: LoggingConfig,
    pub identity: IdentityConfig,
    pub roles: Vec<RoleDefinition>,
    pub restrictions: RestrictionSettings,
}

impl ValidatedConfig {
    pub fn role_catalog(&self) -> RoleCatalog {
        RoleCatalog::new(self.roles.clone(), self.restrictions.anonymous_role())
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default = "default_workers")]
    pub workers: usize,
}

fn default_workers() -> usize {
    4
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    pub name: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct IdentityConfig {
    #[serde(default = "default_user_header")]
    pub user_header: String,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            user_header: default_user_header(),
        }
    }
}

fn default_user_header() -> String {
    "X-Termlock-User".to_string()
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct TaxonomyConfig {
    pub slug: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct RestrictionsConfig {
    #[serde(default = "default_taxonomies")]
    pub taxonomies: Vec<TaxonomyConfig>,
    #[serde(default = "default_content_types")]
    pub content_types: Vec<String>,
    #[serde(default = "default_bypass_roles")]
    pub bypass_roles: Vec<String>,
    #[serde(default = "default_anonymous_role")]
    pub anonymous_role: String,
    #[serde(default = "default_denial_message")]
    pub default_message: String,
}

impl Default for RestrictionsConfig {
    fn default() -> Self {
        Self {
            taxonomies: default_taxonomies(),
            content_types: default_content_types(),
            bypass_roles: default_bypass_roles(),
            anonymous_role: default_anonymous_role(),
            default_message: default_denial_message(),
        }
    }
}

fn default_taxonomies() -> Vec<TaxonomyConfig> {
    DEFAULT_TAXONOMIES
        .iter()
        .map(|(slug, label)| TaxonomyConfig {
            slug: slug.to_string(),
            label: Some(label.to_string()),
        })
        .collect()
}

fn default_content_types() -> Vec<String> {
    vec![DEFAULT_CONTENT_TYPE.to_string()]
}

fn default_bypass_roles() -> Vec<String> {
    vec![DEFAULT_BYPASS_ROLE.to_string()]
}

fn default_anonymous_role() -> String {
    DEFAULT_ANONYMOUS_ROLE.to_string()
}

fn default_denial_message() -> String {
    DEFAULT_DENIAL_MESSAGE.to_string()
}

impl Config {
    pub fn load(root: &Path) -> Result<Self, ConfigError> {
        let config_path = root.join("config.yaml");
        let config_content = fs::read_to_string(&config_path).map_err(|e| {
            ConfigError::LoadError(format!(
                "Failed to read config file '{}': {}",
                config_path.display(),
                e
            ))
        })?;
        serde_yaml::from_str(&config_content).map_err(|e| {
            ConfigError::LoadError(format!(
                "Failed to parse config file '{}': {}",
                config_path.display(),
                e
            ))
        })
    }

    /// Loads and validates configuration at startup. If validation fails, the application should not start.
    pub fn load_and_validate(root: &Path) -> Result<ValidatedConfig, ConfigError> {
        Self::load(root)?.validate()
    }

    pub fn validate(self) -> Result<ValidatedConfig, ConfigError> {
        Self::validate_server(&self.server)?;
        Self::validate_logging(&self.logging)?;
        Self::validate_identity(&self.identity)?;
        let roles = Self::validate_roles(&self.roles)?;
        let restrictions = Self::validate_restrictions(&self.restrictions, &roles)?;

        Ok(ValidatedConfig {
            server: self.server,
            app: self.app,
            logging: self.logging,
            identity: self.identity,
            roles,
            restrictions,
        })
    }

    fn validate_server(server: &ServerConfig) -> Result<(), ConfigError> {
        if server.host.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "server.host cannot be empty".to_string(),
            ));
        }
        if server.port == 0 {
            return Err(ConfigError::ValidationError(
                "server.port must be greater than 0".to_string(),
            ));
        }
        if server.workers == 0 {
            return Err(ConfigError::ValidationError(
                "server.workers must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
        let level = logging.level.to_lowercase();
        if !LOG_LEVELS.contains(&level.as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "logging.level must be one of {}, got: {}",
                LOG_LEVELS.join(", "),
                logging.level
            )));
        }
        Ok(())
    }

    fn validate_identity(identity: &IdentityConfig) -> Result<(), ConfigError> {
        let header = identity.user_header.trim();
        if header.is_empty() || header.len() > MAX_HEADER_CHARS {
            return Err(ConfigError::ValidationError(format!(
                "identity.user_header must be 1 to {} characters",
                MAX_HEADER_CHARS
            )));
        }
        if !header
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(ConfigError::ValidationError(format!(
                "identity.user_header '{}' is not a valid header name",
                header
            )));
        }
        Ok(())
    }

    fn validate_roles(roles: &[RoleDefinition]) -> Result<Vec<RoleDefinition>, ConfigError> {
        if roles.len() > MAX_ROLE_COUNT {
            return Err(ConfigError::ValidationError(format!(
                "roles must be at most {} entries",
                MAX_ROLE_COUNT
            )));
        }
        let mut seen = HashSet::new();
        let mut normalized = Vec::with_capacity(roles.len());
        for role in roles {
            let id = normalize_role(&role.id)
                .map_err(|err| ConfigError::ValidationError(format!("roles: {}", err)))?;
            if !seen.insert(id.clone()) {
                return Err(ConfigError::ValidationError(format!(
                    "roles: duplicate role '{}'",
                    id
                )));
            }
            let label = if role.label.trim().is_empty() {
                id.clone()
            } else {
                role.label.trim().to_string()
            };
            normalized.push(RoleDefinition { id, label });
        }
        Ok(normalized)
    }

    fn validate_restrictions(
        restrictions: &RestrictionsConfig,
        roles: &[RoleDefinition],
    ) -> Result<RestrictionSettings, ConfigError> {
        if restrictions.taxonomies.is_empty() {
            return Err(ConfigError::ValidationError(
                "restrictions.taxonomies must list at least one taxonomy".to_string(),
            ));
        }
        let mut taxonomies: Vec<ManagedTaxonomy> = Vec::new();
        for taxonomy in &restrictions.taxonomies {
            let slug = validate_slug("restrictions.taxonomies", &taxonomy.slug)?;
            if taxonomies.iter().any(|existing| existing.slug == slug) {
                return Err(ConfigError::ValidationError(format!(
                    "restrictions.taxonomies: duplicate taxonomy '{}'",
                    slug
                )));
            }
            taxonomies.push(ManagedTaxonomy::new(slug, taxonomy.label.clone()));
        }

        if restrictions.content_types.is_empty() {
            return Err(ConfigError::ValidationError(
                "restrictions.content_types must list at least one content type".to_string(),
            ));
        }
        let mut content_types: Vec<String> = Vec::new();
        for content_type in &restrictions.content_types {
            let slug = validate_slug("restrictions.content_types", content_type)?;
            if content_types.contains(&slug) {
                return Err(ConfigError::ValidationError(format!(
                    "restrictions.content_types: duplicate content type '{}'",
                    slug
                )));
            }
            content_types.push(slug);
        }

        let anonymous_role = normalize_role(&restrictions.anonymous_role).map_err(|err| {
            ConfigError::ValidationError(format!("restrictions.anonymous_role: {}", err))
        })?;
        if roles.iter().any(|role| role.id == anonymous_role) {
            return Err(ConfigError::ValidationError(format!(
                "restrictions.anonymous_role '{}' collides with a configured role",
                anonymous_role
            )));
        }

        let mut bypass_roles = Vec::with_capacity(restrictions.bypass_roles.len());
        for role in &restrictions.bypass_roles {
            let role = normalize_role(role).map_err(|err| {
                ConfigError::ValidationError(format!("restrictions.bypass_roles: {}", err))
            })?;
            if !roles.iter().any(|known| known.id == role) {
                return Err(ConfigError::ValidationError(format!(
                    "restrictions.bypass_roles: unknown role '{}'",
                    role
                )));
            }
            bypass_roles.push(role);
        }

        Ok(RestrictionSettings::new(
            taxonomies,
            content_types,
            bypass_roles,
            anonymous_role,
            restrictions.default_message.trim().to_string(),
        ))
    }
}

fn validate_slug(field: &str, value: &str) -> Result<String, ConfigError> {
    let slug = value.trim();
    if slug.is_empty() || slug.chars().count() > MAX_SLUG_CHARS {
        return Err(ConfigError::ValidationError(format!(
            "{}: '{}' must be 1 to {} characters",
            field, slug, MAX_SLUG_CHARS
        )));
    }
    if !slug
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-')
    {
        return Err(ConfigError::ValidationError(format!(
            "{}: '{}' contains invalid characters",
            field, slug
        )));
    }
    Ok(slug.to_string())
}
