//! Integration tests for member join and welcome prompt expiry.

mod common;

use chrono::{Duration, TimeZone, Utc};
use common::*;
use rosterd::platform::GatewayError;
use rosterd::services::{on_member_join, sweep};

#[tokio::test]
async fn test_join_grants_auto_role_and_tracks_prompt() {
    let h = Harness::new();
    let t = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();

    on_member_join(&h.session, &h.gateway, GUILD, MEMBER, t)
        .await
        .expect("join handled");

    let calls = h.gateway.calls();
    assert_eq!(calls[0], Call::AddRole(MEMBER, AUTO_ROLE));
    let welcome = h.gateway.sent_to(WELCOME_CHANNEL);
    assert_eq!(welcome.len(), 1);
    assert!(welcome[0].contains("<@42>"));

    let prompt = h.session.welcome.get(MEMBER).expect("prompt tracked");
    assert_eq!(prompt.created_at, t);
}

#[tokio::test]
async fn test_join_without_auto_role_permission_still_welcomes() {
    let h = Harness::new();
    h.gateway
        .fail("add_role", GatewayError::PermissionDenied("manage roles".into()));

    on_member_join(&h.session, &h.gateway, GUILD, MEMBER, Utc::now())
        .await
        .expect("join handled");

    assert_eq!(h.gateway.sent_to(WELCOME_CHANNEL).len(), 1);
    assert!(h.session.welcome.get(MEMBER).is_some());
}

#[tokio::test]
async fn test_prompt_survives_half_hour_and_expires_after_ninety_minutes() {
    let h = Harness::new();
    let t = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
    on_member_join(&h.session, &h.gateway, GUILD, MEMBER, t)
        .await
        .expect("join handled");
    let message = h.session.welcome.get(MEMBER).expect("tracked").message_id;

    let report = sweep(&h.session, &h.gateway, t + Duration::minutes(30)).await;
    assert_eq!(report.stale, 0);
    assert!(h.session.welcome.get(MEMBER).is_some());

    let report = sweep(&h.session, &h.gateway, t + Duration::minutes(90)).await;
    assert_eq!(report.stale, 1);
    assert_eq!(report.removed, 1);
    assert!(h.session.welcome.get(MEMBER).is_none());
    assert!(h.gateway.calls().contains(&Call::Delete(WELCOME_CHANNEL, message)));
}

#[tokio::test]
async fn test_failed_delete_is_retried_next_sweep() {
    let h = Harness::new();
    let t = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
    on_member_join(&h.session, &h.gateway, GUILD, MEMBER, t)
        .await
        .expect("join handled");
    h.gateway
        .fail("delete_message", GatewayError::Other("gateway timeout".into()));

    let report = sweep(&h.session, &h.gateway, t + Duration::hours(2)).await;
    assert_eq!(report.retained, 1);
    assert_eq!(report.removed, 0);
    assert!(h.session.welcome.get(MEMBER).is_some());
}

#[tokio::test]
async fn test_manually_deleted_prompt_is_dropped() {
    let h = Harness::new();
    let t = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
    on_member_join(&h.session, &h.gateway, GUILD, MEMBER, t)
        .await
        .expect("join handled");
    h.gateway
        .fail("delete_message", GatewayError::NotFound("unknown message".into()));

    let report = sweep(&h.session, &h.gateway, t + Duration::hours(2)).await;
    assert_eq!(report.removed, 1);
    assert!(h.session.welcome.is_empty());
}

#[tokio::test]
async fn test_rejoin_during_sweep_keeps_new_prompt() {
    let h = Harness::new();
    let t = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
    on_member_join(&h.session, &h.gateway, GUILD, MEMBER, t)
        .await
        .expect("join handled");
    let old = h.session.welcome.get(MEMBER).expect("tracked").message_id;

    let later = t + Duration::hours(2);
    on_member_join(&h.session, &h.gateway, GUILD, MEMBER, later)
        .await
        .expect("rejoin handled");
    // The stale pass selected the old prompt before the rejoin replaced it.
    let removed = h
        .session
        .welcome
        .remove_expired(&[(MEMBER, old)])
        .expect("persisted");
    assert_eq!(removed, 0);
    assert_ne!(
        h.session.welcome.get(MEMBER).map(|p| p.message_id),
        Some(old)
    );
}

#[tokio::test]
async fn test_prompts_survive_restart() {
    let h = Harness::new();
    let t = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
    on_member_join(&h.session, &h.gateway, GUILD, MEMBER, t)
        .await
        .expect("join handled");

    let reopened = rosterd::state::Session::new(
        test_config(h.dir.path()),
        rosterd::roster::EmailRoleIndex::new(),
    );
    assert_eq!(reopened.welcome.get(MEMBER), h.session.welcome.get(MEMBER));
}
