// This file is part of the product TermLock.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.


#![allow(dead_code)]

use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, test, web};
use std::collections::BTreeSet;
use std::sync::Arc;
use termlock::app_state::AppState;
use termlock::catalog::{Catalog, TermId};
use termlock::config::ValidatedConfig;
use termlock::iam::{
    FileUserDirectory, UserDirectory, UserId, ViewerMiddlewareFactory, ViewerResolver,
};
use termlock::restrictions::TermRestriction;
use termlock::runtime_paths::RuntimePaths;
use termlock::util::test_config;
use termlock::util::test_fixtures::TestFixtureRoot;
use termlock::{ADMIN_PATH, admin, public};

pub const USER_HEADER: &str = "X-Termlock-User";

pub const ADMIN_ID: UserId = 1;
pub const ANNA_ID: UserId = 2;
pub const BOB_ID: UserId = 3;
pub const JOANNA_ID: UserId = 4;

pub const PREMIUM_TERM: TermId = 10;
pub const FREE_TERM: TermId = 11;
pub const BETA_TAG: TermId = 20;
pub const NEWS_TAG: TermId = 30;

pub const PREMIUM_PACK: u64 = 100;
pub const FREE_SAMPLER: u64 = 101;
pub const BETA_BUNDLE: u64 = 102;
pub const RELEASE_NOTES: u64 = 103;
pub const NEWSLETTER_KIT: u64 = 104;

const CATALOG_YAML: &str = r#"
terms:
  - { id: 10, taxonomy: download_category, name: Premium, slug: premium }
  - { id: 11, taxonomy: download_category, name: Free, slug: free }
  - { id: 20, taxonomy: download_tag, name: Beta, slug: beta }
  - { id: 30, taxonomy: post_tag, name: News, slug: news }
items:
  - id: 100
    content_type: download
    title: Premium Pack
    slug: premium-pack
    excerpt: Everything in the premium tier.
    body: Premium download body.
    terms: [10]
  - id: 101
    content_type: download
    title: Free Sampler
    slug: free-sampler
    excerpt: A taste of the catalog.
    body: Free download body.
    terms: [11]
  - id: 102
    content_type: download
    title: Beta Bundle
    slug: beta-bundle
    excerpt: Premium beta builds.
    body: Beta download body.
    terms: [10, 20]
  - id: 103
    content_type: post
    title: Release Notes
    slug: release-notes
    excerpt: What changed in the premium pack.
    body: Notes body.
    terms: [10]
  - id: 104
    content_type: download
    title: Newsletter Kit
    slug: newsletter-kit
    excerpt: Templates for the newsletter.
    body: Kit body.
    terms: [30]
"#;

const USERS_YAML: &str = r#"
- { id: 1, login: ada, name: Ada Admin, email: ada@example.com, role: administrator }
- { id: 2, login: annalee, name: Anna Lee, email: anna@example.com, role: subscriber }
- { id: 3, login: bob, name: Bob Editor, email: bob@example.com, role: editor }
- { id: 4, login: joanna, name: Joanna Shop, email: joanna@example.com, role: shop_manager }
"#;

pub struct TestHarness {
    pub fixture: TestFixtureRoot,
    pub config: Arc<ValidatedConfig>,
    pub runtime_paths: RuntimePaths,
    pub app_state: Arc<AppState>,
    pub viewer_resolver: Arc<ViewerResolver>,
}

#[derive(Clone)]
pub struct AppBundle {
    pub config: Arc<ValidatedConfig>,
    pub app_state: Arc<AppState>,
    pub viewer_resolver: Arc<ViewerResolver>,
}

impl TestHarness {
    pub fn new() -> Self {
        Self::with_config(test_config())
    }

    pub fn with_config(config: ValidatedConfig) -> Self {
        let fixture = TestFixtureRoot::new_unique("termlock-suite").expect("fixture root");
        fixture.write_catalog(CATALOG_YAML).expect("seed catalog");
        fixture.write_users(USERS_YAML).expect("seed users");

        let config = Arc::new(config);
        let runtime_paths = fixture.runtime_paths().expect("runtime paths");
        let catalog = Catalog::load(&runtime_paths.catalog_file).expect("catalog");
        let users: Arc<dyn UserDirectory> = Arc::new(
            FileUserDirectory::load(runtime_paths.users_file.clone()).expect("users"),
        );
        let viewer_resolver = Arc::new(ViewerResolver::from_config(users.clone(), &config));
        let app_state = Arc::new(
            AppState::new(&config, runtime_paths.clone(), catalog, users).expect("app state"),
        );

        Self {
            fixture,
            config,
            runtime_paths,
            app_state,
            viewer_resolver,
        }
    }

    pub fn app_bundle(&self) -> AppBundle {
        AppBundle {
            config: self.config.clone(),
            app_state: self.app_state.clone(),
            viewer_resolver: self.viewer_resolver.clone(),
        }
    }

    pub fn restrict(&self, term_id: TermId, roles: &[&str], users: &[UserId]) -> TermRestriction {
        self.app_state
            .store
            .save(
                term_id,
                TermRestriction {
                    active: true,
                    allowed_roles: roles
                        .iter()
                        .map(|role| role.to_string())
                        .collect::<BTreeSet<_>>(),
                    whitelisted_users: users.to_vec(),
                    denial_message: String::new(),
                },
            )
            .expect("save restriction")
    }
}

pub fn build_test_app(
    bundle: AppBundle,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let bypass = bundle.app_state.bypass.clone();

    App::new()
        .app_data(web::Data::from(bundle.config))
        .app_data(web::Data::from(bundle.app_state))
        .app_data(web::Data::from(bundle.viewer_resolver))
        .wrap(ViewerMiddlewareFactory)
        .configure(move |cfg| admin::configure(cfg, ADMIN_PATH, bypass))
        .configure(public::configure)
        .default_service(web::route().to(public::handlers::not_found))
}

pub fn as_user(req: test::TestRequest, user_id: UserId) -> test::TestRequest {
    req.insert_header((USER_HEADER, user_id.to_string()))
}
