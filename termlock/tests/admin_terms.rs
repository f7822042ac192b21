// This file is part of the product TermLock.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.


mod common;

use actix_web::{http::StatusCode, test};
use common::{
    ADMIN_ID, ANNA_ID, BOB_ID, FREE_TERM, NEWS_TAG, PREMIUM_PACK, PREMIUM_TERM, as_user,
};
use serde_json::{Value, json};
use std::sync::Arc;
use termlock::restrictions::TermRestrictionStore;

fn term_uri(taxonomy: &str, term_id: impl std::fmt::Display) -> String {
    format!("/admin/terms/{}/{}", taxonomy, term_id)
}

#[actix_web::test]
async fn admin_routes_require_a_signed_in_bypass_viewer() {
    let harness = common::TestHarness::new();
    let app = test::init_service(common::build_test_app(harness.app_bundle())).await;

    let req = test::TestRequest::get().uri("/admin/roles").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let json: Value = test::read_body_json(resp).await;
    assert!(json.get("error").is_some());

    let req = as_user(test::TestRequest::get().uri("/admin/roles"), ANNA_ID).to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::FORBIDDEN
    );

    // An unknown user id resolves to an anonymous viewer.
    let req = as_user(test::TestRequest::get().uri("/admin/roles"), 999).to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::UNAUTHORIZED
    );
}

#[actix_web::test]
async fn lists_roles_and_managed_taxonomies() {
    let harness = common::TestHarness::new();
    let app = test::init_service(common::build_test_app(harness.app_bundle())).await;

    let req = as_user(test::TestRequest::get().uri("/admin/roles"), ADMIN_ID).to_request();
    let roles: Value = test::call_and_read_body_json(&app, req).await;
    let roles = roles.as_array().expect("roles array");
    assert_eq!(roles[0]["id"], "administrator");
    assert_eq!(roles[0]["label"], "Administrator");
    let last = roles.last().expect("anonymous entry");
    assert_eq!(last["id"], "anonymous");
    assert_eq!(last["label"], "Anonymous visitors");

    let req = as_user(test::TestRequest::get().uri("/admin/taxonomies"), ADMIN_ID).to_request();
    let taxonomies: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(
        taxonomies,
        json!([
            { "slug": "download_category", "label": "Download Categories" },
            { "slug": "download_tag", "label": "Download Tags" },
        ])
    );
}

#[actix_web::test]
async fn unconfigured_term_shows_an_inactive_panel() {
    let harness = common::TestHarness::new();
    let app = test::init_service(common::build_test_app(harness.app_bundle())).await;

    let req = as_user(
        test::TestRequest::get().uri(&term_uri("download_category", FREE_TERM)),
        ADMIN_ID,
    )
    .to_request();
    let panel: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(panel["term_name"], "Free");
    assert_eq!(panel["taxonomy_label"], "Download Categories");
    assert_eq!(panel["active"], false);
    assert_eq!(panel["allowed_roles"], json!([]));
    assert_eq!(panel["whitelist"], json!([]));
    assert_eq!(panel["message"], "");
}

#[actix_web::test]
async fn panel_lookup_validates_taxonomy_and_term() {
    let harness = common::TestHarness::new();
    let app = test::init_service(common::build_test_app(harness.app_bundle())).await;

    let cases = [
        (term_uri("post_tag", NEWS_TAG), StatusCode::NOT_FOUND),
        (term_uri("download_tag", PREMIUM_TERM), StatusCode::NOT_FOUND),
        (term_uri("download_category", 999), StatusCode::NOT_FOUND),
        (term_uri("download_category", "abc"), StatusCode::BAD_REQUEST),
    ];
    for (uri, expected) in cases {
        let req = as_user(test::TestRequest::get().uri(&uri), ADMIN_ID).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), expected, "{}", uri);
        let json: Value = test::read_body_json(resp).await;
        assert!(json.get("error").and_then(Value::as_str).is_some(), "{}", uri);
    }
}

#[actix_web::test]
async fn saving_a_panel_persists_and_enforces_the_restriction() {
    let harness = common::TestHarness::new();
    let app = test::init_service(common::build_test_app(harness.app_bundle())).await;

    let req = as_user(
        test::TestRequest::put()
            .uri(&term_uri("download_category", PREMIUM_TERM))
            .set_json(json!({
                "active": true,
                "allowed_roles": ["subscriber", "ghost_role"],
                "whitelisted_users": [BOB_ID, BOB_ID],
                "message": "  Members only.  ",
            })),
        ADMIN_ID,
    )
    .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let panel: Value = test::read_body_json(resp).await;
    assert_eq!(panel["active"], true);
    assert_eq!(panel["allowed_roles"], json!(["subscriber"]));
    assert_eq!(panel["message"], "Members only.");
    let whitelist = panel["whitelist"].as_array().expect("whitelist");
    assert_eq!(whitelist.len(), 1);
    assert_eq!(whitelist[0]["user_id"], BOB_ID);
    assert_eq!(whitelist[0]["name"], "Bob Editor");
    assert_eq!(whitelist[0]["role"], "Editor");

    let reopened = TermRestrictionStore::open(
        harness.fixture.restrictions_file(),
        Arc::new(harness.config.role_catalog()),
    )
    .expect("reopen store");
    let stored = reopened.get(PREMIUM_TERM);
    assert!(stored.active);
    assert!(stored.allows_role("subscriber"));
    assert_eq!(stored.whitelisted_users, vec![BOB_ID]);

    let uri = format!("/api/items/{}", PREMIUM_PACK);
    let req = test::TestRequest::get().uri(&uri).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    let json: Value = test::read_body_json(resp).await;
    assert_eq!(json["message"], "Members only.");

    for viewer in [ANNA_ID, BOB_ID] {
        let req = as_user(test::TestRequest::get().uri(&uri), viewer).to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
    }
}

#[actix_web::test]
async fn deactivating_a_panel_lifts_the_restriction() {
    let harness = common::TestHarness::new();
    harness.restrict(PREMIUM_TERM, &["subscriber"], &[]);
    let app = test::init_service(common::build_test_app(harness.app_bundle())).await;

    let req = as_user(
        test::TestRequest::put()
            .uri(&term_uri("download_category", PREMIUM_TERM))
            .set_json(json!({ "active": false, "allowed_roles": ["subscriber"] })),
        ADMIN_ID,
    )
    .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    let req = test::TestRequest::get()
        .uri(&format!("/api/items/{}", PREMIUM_PACK))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
}

#[actix_web::test]
async fn removes_selected_whitelisted_users() {
    let harness = common::TestHarness::new();
    harness.restrict(PREMIUM_TERM, &[], &[ANNA_ID, BOB_ID]);
    let app = test::init_service(common::build_test_app(harness.app_bundle())).await;

    let req = as_user(
        test::TestRequest::post()
            .uri(&format!(
                "{}/whitelist/remove",
                term_uri("download_category", PREMIUM_TERM)
            ))
            .set_json(json!({ "user_ids": [ANNA_ID, 999] })),
        ADMIN_ID,
    )
    .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let panel: Value = test::read_body_json(resp).await;
    let remaining: Vec<u64> = panel["whitelist"]
        .as_array()
        .expect("whitelist")
        .iter()
        .filter_map(|row| row["user_id"].as_u64())
        .collect();
    assert_eq!(remaining, vec![BOB_ID]);
    assert_eq!(
        harness.app_state.store.get(PREMIUM_TERM).whitelisted_users,
        vec![BOB_ID]
    );
}

#[actix_web::test]
async fn malformed_panel_body_is_a_json_client_error() {
    let harness = common::TestHarness::new();
    let app = test::init_service(common::build_test_app(harness.app_bundle())).await;

    let req = as_user(
        test::TestRequest::put()
            .uri(&term_uri("download_category", PREMIUM_TERM))
            .insert_header(("Content-Type", "application/json"))
            .set_payload("{\"active\": \"sometimes\""),
        ADMIN_ID,
    )
    .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let json: Value = test::read_body_json(resp).await;
    assert!(json.get("error").and_then(Value::as_str).is_some());
    assert!(!harness.app_state.store.get(PREMIUM_TERM).active);
}

#[actix_web::test]
async fn saving_a_panel_drops_users_missing_from_the_directory() {
    let harness = common::TestHarness::new();
    let app = test::init_service(common::build_test_app(harness.app_bundle())).await;

    let req = as_user(
        test::TestRequest::put()
            .uri(&term_uri("download_category", PREMIUM_TERM))
            .set_json(json!({
                "active": true,
                "allowed_roles": [],
                "whitelisted_users": [999, BOB_ID],
            })),
        ADMIN_ID,
    )
    .to_request();
    let panel: Value = test::call_and_read_body_json(&app, req).await;
    let whitelist: Vec<u64> = panel["whitelist"]
        .as_array()
        .expect("whitelist")
        .iter()
        .filter_map(|row| row["user_id"].as_u64())
        .collect();
    assert_eq!(whitelist, vec![BOB_ID]);
    assert_eq!(
        harness.app_state.store.get(PREMIUM_TERM).whitelisted_users,
        vec![BOB_ID]
    );
}

#[actix_web::test]
async fn clearing_a_panel_removes_the_restriction() {
    let harness = common::TestHarness::new();
    harness.restrict(PREMIUM_TERM, &["subscriber"], &[BOB_ID]);
    let app = test::init_service(common::build_test_app(harness.app_bundle())).await;

    let req = as_user(
        test::TestRequest::delete().uri(&term_uri("download_category", PREMIUM_TERM)),
        ADMIN_ID,
    )
    .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let panel: Value = test::read_body_json(resp).await;
    assert_eq!(panel["active"], false);
    assert_eq!(panel["whitelist"], json!([]));
    assert!(harness.app_state.store.records().is_empty());

    let req = test::TestRequest::get()
        .uri(&format!("/api/items/{}", PREMIUM_PACK))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    let req = as_user(
        test::TestRequest::delete().uri(&term_uri("post_tag", NEWS_TAG)),
        ADMIN_ID,
    )
    .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::NOT_FOUND
    );
}

#[actix_web::test]
async fn persistence_failure_is_an_internal_error_and_keeps_the_old_record() {
    let harness = common::TestHarness::new();
    let before = harness.restrict(PREMIUM_TERM, &["subscriber"], &[]);
    let app = test::init_service(common::build_test_app(harness.app_bundle())).await;

    let restrictions_file = harness.fixture.restrictions_file();
    std::fs::remove_file(&restrictions_file).expect("remove store file");
    std::fs::create_dir(&restrictions_file).expect("block store path");
    std::fs::write(restrictions_file.join("keep"), "x").expect("fill directory");

    let req = as_user(
        test::TestRequest::put()
            .uri(&term_uri("download_category", PREMIUM_TERM))
            .set_json(json!({ "active": false })),
        ADMIN_ID,
    )
    .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json: Value = test::read_body_json(resp).await;
    assert_eq!(json, json!({ "error": "An internal error occurred" }));

    assert_eq!(harness.app_state.store.get(PREMIUM_TERM), before);
    let req = test::TestRequest::get()
        .uri(&format!("/api/items/{}", PREMIUM_PACK))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::FORBIDDEN
    );
}
