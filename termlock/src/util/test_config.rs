// This file is part of the product TermLock.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.


#![allow(dead_code)]

use crate::config::{AppConfig, IdentityConfig, LoggingConfig, ServerConfig, ValidatedConfig};
use crate::restrictions::RestrictionSettings;
use crate::roles::{RoleDefinition, default_role_definitions};

#[derive(Debug, Clone)]
pub struct TestConfigBuilder {
    config: ValidatedConfig,
}

impl Default for TestConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TestConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: ValidatedConfig {
                server: ServerConfig {
                    host: "127.0.0.1".to_string(),
                    port: 5466,
                    workers: 1,
                },
                app: AppConfig {
                    name: "Test Downloads".to_string(),
                },
                logging: LoggingConfig {
                    level: "info".to_string(),
                },
                identity: IdentityConfig::default(),
                roles: default_role_definitions(),
                restrictions: RestrictionSettings::default(),
            },
        }
    }

    pub fn with_app_name(mut self, name: &str) -> Self {
        self.config.app.name = name.to_string();
        self
    }

    pub fn with_user_header(mut self, header: &str) -> Self {
        self.config.identity.user_header = header.to_string();
        self
    }

    pub fn with_roles(mut self, roles: Vec<RoleDefinition>) -> Self {
        self.config.roles = roles;
        self
    }

    pub fn with_restrictions(mut self, restrictions: RestrictionSettings) -> Self {
        self.config.restrictions = restrictions;
        self
    }

    pub fn build(self) -> ValidatedConfig {
        self.config
    }
}

pub fn test_config() -> ValidatedConfig {
    TestConfigBuilder::new().build()
}
