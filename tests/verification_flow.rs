//! Integration tests for verify, adminverify and cacheunverified.

mod common;

use chrono::Utc;
use common::*;
use rosterd::platform::{GatewayError, MessageId};
use rosterd::roster::EmailRoleIndex;
use rosterd::state::WelcomePrompt;

fn roster() -> EmailRoleIndex {
    let mut roster = EmailRoleIndex::new();
    roster.extend("Contributor", ["both@example.org", "dev@example.org"]);
    roster.extend("Mentor", ["asha@example.org", "both@example.org"]);
    roster.extend("Wizard", ["merlin@example.org"]);
    roster
}

fn track_prompt(h: &Harness, message: u64) {
    h.session
        .welcome
        .track(
            MEMBER,
            WelcomePrompt {
                message_id: MessageId(message),
                created_at: Utc::now(),
            },
        )
        .expect("Failed to track prompt");
}

#[tokio::test]
async fn test_mentor_verification_end_to_end() {
    let h = Harness::with_roster(roster());
    h.gateway.add_member(MEMBER, "Asha Rao", &[AUTO_ROLE]);
    track_prompt(&h, 77);

    let request = h.run(MEMBER, VERIFY_CHANNEL, "verify  Asha@Example.org ").await;

    assert_eq!(
        h.gateway.calls(),
        vec![
            Call::AddRole(MEMBER, MENTOR_ROLE),
            Call::RemoveRole(MEMBER, AUTO_ROLE),
            Call::SetNickname(MEMBER, "Asha Rao | Mentor".to_string()),
            Call::Delete(WELCOME_CHANNEL, MessageId(77)),
        ]
    );
    assert!(request.deferred);
    assert!(request.replies[0].content.contains("Congratulations"));
    assert!(request.replies[0].content.contains("`Mentor`"));
    assert!(request.replies[0].ephemeral);
    assert!(request.replies[1].content.contains("`Asha Rao | Mentor`"));

    let records = h.session.verifications.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].user_id, MEMBER);
    assert_eq!(records[0].roles, vec!["Mentor".to_string()]);

    let changes = h.session.username_changes.records();
    assert_eq!(changes.len(), 1);
    assert_eq!(changes[0].old_name, "Asha Rao");
    assert_eq!(changes[0].new_name, "Asha Rao | Mentor");

    assert!(h.session.welcome.get(MEMBER).is_none());
}

#[tokio::test]
async fn test_highest_priority_role_names_the_badge() {
    let h = Harness::with_roster(roster());
    h.gateway.add_member(MEMBER, "Dana | Contributor", &[AUTO_ROLE]);

    h.run(MEMBER, VERIFY_CHANNEL, "verify both@example.org").await;

    let calls = h.gateway.calls();
    assert!(calls.contains(&Call::AddRole(MEMBER, CONTRIBUTOR_ROLE)));
    assert!(calls.contains(&Call::AddRole(MEMBER, MENTOR_ROLE)));
    assert!(calls.contains(&Call::SetNickname(MEMBER, "Dana | Mentor".to_string())));

    let records = h.session.verifications.records();
    assert_eq!(
        records[0].roles,
        vec!["Contributor".to_string(), "Mentor".to_string()]
    );
}

#[tokio::test]
async fn test_unknown_email_is_recorded_as_failed_attempt() {
    let h = Harness::with_roster(roster());
    h.gateway.add_member(MEMBER, "Sam", &[AUTO_ROLE]);

    let request = h.run(MEMBER, VERIFY_CHANNEL, "verify nobody@example.org").await;

    assert!(h.gateway.calls().is_empty());
    assert!(request.last().contains("not in our records"));
    assert_eq!(
        h.session.failed_attempt(MEMBER).as_deref(),
        Some("nobody@example.org")
    );
    assert!(h.session.verifications.is_empty());
}

#[tokio::test]
async fn test_roles_without_ids_are_unmappable() {
    let h = Harness::with_roster(roster());
    h.gateway.add_member(MEMBER, "Merlin", &[]);

    let request = h.run(MEMBER, VERIFY_CHANNEL, "verify merlin@example.org").await;

    assert!(h.gateway.calls().is_empty());
    assert!(request.last().contains("couldn't verify"));
}

#[tokio::test]
async fn test_verify_only_in_verification_channel() {
    let h = Harness::with_roster(roster());
    h.gateway.add_member(MEMBER, "Asha", &[AUTO_ROLE]);

    let request = h.run(MEMBER, GENERAL, "verify asha@example.org").await;

    assert!(h.gateway.calls().is_empty());
    assert_eq!(
        request.last(),
        format!("This command can only be used in {}.", VERIFY_CHANNEL.mention())
    );
}

#[tokio::test]
async fn test_nickname_permission_denied_still_verifies() {
    let h = Harness::with_roster(roster());
    h.gateway.add_member(MEMBER, "Asha", &[AUTO_ROLE]);
    h.gateway
        .fail("set_nickname", GatewayError::PermissionDenied("nick".into()));

    let request = h.run(MEMBER, VERIFY_CHANNEL, "verify asha@example.org").await;

    assert_eq!(h.session.verifications.len(), 1);
    assert!(h.session.username_changes.is_empty());
    assert!(request.texts().iter().any(|t| t.contains("missing permissions")));
}

#[tokio::test]
async fn test_failed_rename_is_reported_to_member() {
    let h = Harness::with_roster(roster());
    h.gateway.add_member(MEMBER, "Asha", &[AUTO_ROLE]);
    h.gateway
        .fail("set_nickname", GatewayError::Other("500".into()));

    let request = h.run(MEMBER, VERIFY_CHANNEL, "verify asha@example.org").await;

    assert_eq!(h.session.verifications.len(), 1);
    assert!(h.session.username_changes.is_empty());
    assert!(request.replies[0].content.contains("Congratulations"));
    assert!(request.last().contains("couldn't update the nickname"));
}

#[tokio::test]
async fn test_prompt_store_failure_still_records_verification() {
    let h = Harness::with_roster(roster());
    h.gateway.add_member(MEMBER, "Asha", &[AUTO_ROLE]);
    track_prompt(&h, 77);
    // A directory in place of the mirror makes the next save fail.
    let mirror = h.dir.path().join("welcome_messages.json");
    std::fs::remove_file(&mirror).expect("mirror written");
    std::fs::create_dir(&mirror).expect("replace mirror");

    let request = h.run(MEMBER, VERIFY_CHANNEL, "verify asha@example.org").await;

    assert!(request.replies[0].content.contains("Congratulations"));
    let records = h.session.verifications.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].roles, vec!["Mentor".to_string()]);
}

#[tokio::test]
async fn test_failed_prompt_delete_keeps_entry_for_sweeper() {
    let h = Harness::with_roster(roster());
    h.gateway.add_member(MEMBER, "Asha", &[AUTO_ROLE]);
    track_prompt(&h, 77);
    h.gateway
        .fail("delete_message", GatewayError::Other("503".into()));

    h.run(MEMBER, VERIFY_CHANNEL, "verify asha@example.org").await;

    assert_eq!(h.session.verifications.len(), 1);
    assert_eq!(
        h.session.welcome.get(MEMBER).map(|p| p.message_id),
        Some(MessageId(77))
    );
}

#[tokio::test]
async fn test_already_deleted_prompt_is_forgotten() {
    let h = Harness::with_roster(roster());
    h.gateway.add_member(MEMBER, "Asha", &[AUTO_ROLE]);
    track_prompt(&h, 77);
    h.gateway
        .fail("delete_message", GatewayError::NotFound("message".into()));

    h.run(MEMBER, VERIFY_CHANNEL, "verify asha@example.org").await;

    assert!(h.session.welcome.get(MEMBER).is_none());
}

#[tokio::test]
async fn test_adminverify_requires_admin() {
    let h = Harness::with_roster(roster());
    h.gateway.add_member(MEMBER, "Asha", &[AUTO_ROLE]);

    let request = h
        .run(MODERATOR, GENERAL, "adminverify <@42> asha@example.org")
        .await;
    assert_eq!(request.last(), "You do not have permission to use this command.");
    assert!(h.gateway.calls().is_empty());

    let request = h
        .run(ADMIN, GENERAL, "adminverify <@42> asha@example.org")
        .await;
    assert!(request.replies[0].content.contains("successfully verified"));
    assert!(h.gateway.calls().contains(&Call::AddRole(MEMBER, MENTOR_ROLE)));
    assert_eq!(h.gateway.sent_to(LOG_CHANNEL).len(), 1);
}

#[tokio::test]
async fn test_cacheunverified_counts_members_with_at_most_one_role() {
    let h = Harness::new();
    h.gateway.add_member(MEMBER, "New", &[AUTO_ROLE]);
    h.gateway.add_member(MODERATOR, "Mod", &[MENTOR_ROLE, CONTRIBUTOR_ROLE]);
    h.gateway.add_member(ADMIN, "Quiet", &[]);

    let request = h.run(ADMIN, GENERAL, "cacheunverified").await;

    assert_eq!(request.last(), "Successfully cached 2 unverified member(s).");
    assert_eq!(h.session.unverified(GUILD), vec![ADMIN, MEMBER]);
}
