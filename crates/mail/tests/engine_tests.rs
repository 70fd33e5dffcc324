//! Integration tests for the mail engine
//!
//! These exercise the full flow — folder resolution, enumeration,
//! extraction, matching, and paging — against the in-memory mailbox.

use std::sync::Arc;

use chrono::{Duration, Utc};
use mail::{
    Bounds, EngineError, EngineSettings, InMemoryMailbox, MailEngine, Scope, SearchRequest,
    StoredItem, TruncationReason,
};

/// Engine settings tuned for tests: real semantics, negligible retry delay
fn test_settings() -> EngineSettings {
    EngineSettings {
        retry_base_delay_ms: 1,
        ..EngineSettings::default()
    }
}

/// An engine over a shared fake, keeping the fake reachable for call-count
/// assertions
fn engine_over(mailbox: &Arc<InMemoryMailbox>) -> MailEngine {
    MailEngine::new(Box::new(Arc::clone(mailbox)), test_settings())
}

fn item(id: &str, subject: &str, age_hours: i64) -> StoredItem {
    StoredItem::new(
        id,
        subject,
        "Alice Chen <alice@example.com>",
        Utc::now() - Duration::hours(age_hours),
    )
}

fn search_request(terms: &[&str], match_all: bool, scope: Scope) -> SearchRequest {
    SearchRequest {
        terms: terms.iter().map(|t| t.to_string()).collect(),
        match_all,
        scope,
        folder_path: "Inbox".to_string(),
        bounds: Bounds::Days(7),
    }
}

#[test]
fn test_and_logic_completeness() {
    let mailbox = Arc::new(InMemoryMailbox::new());
    let inbox = mailbox.add_folder("Inbox");
    mailbox.add_item(&inbox, item("a", "Q3 budget review", 1));
    mailbox.add_item(&inbox, item("b", "budget only", 2));
    mailbox.add_item(&inbox, item("c", "unrelated", 3));

    let engine = engine_over(&mailbox);
    let outcome = engine
        .search(&search_request(&["budget", "q3"], true, Scope::Subject))
        .unwrap();

    assert_eq!(outcome.page.total, 1);
    // Every returned record contains every term
    for record in &outcome.page.records {
        let subject = record.subject.to_lowercase();
        assert!(subject.contains("budget") && subject.contains("q3"));
    }
}

#[test]
fn test_or_logic_soundness() {
    let mailbox = Arc::new(InMemoryMailbox::new());
    let inbox = mailbox.add_folder("Inbox");
    mailbox.add_item(&inbox, item("a", "Q3 budget review", 1));
    mailbox.add_item(&inbox, item("b", "budget only", 2));
    mailbox.add_item(&inbox, item("c", "unrelated", 3));

    let engine = engine_over(&mailbox);
    let outcome = engine
        .search(&search_request(&["budget", "q3"], false, Scope::Subject))
        .unwrap();

    assert_eq!(outcome.page.total, 2);
    // Every returned record contains at least one term
    for record in &outcome.page.records {
        let subject = record.subject.to_lowercase();
        assert!(subject.contains("budget") || subject.contains("q3"));
    }
}

#[test]
fn test_body_proximity_scenario() {
    let mailbox = Arc::new(InMemoryMailbox::new());
    let inbox = mailbox.add_folder("Inbox");
    mailbox.add_item(
        &inbox,
        item("adjacent", "Announcement", 1)
            .with_body("Join us for red hat partner day in the main hall."),
    );
    let filler = "lorem ipsum ".repeat(25); // ~300 characters of separation
    mailbox.add_item(
        &inbox,
        item("scattered", "Newsletter", 2)
            .with_body(format!("Redhat shipped a release. {filler} Partner day is unrelated.")),
    );

    let engine = engine_over(&mailbox);
    let outcome = engine
        .search(&search_request(
            &["red", "hat", "partner", "day"],
            true,
            Scope::Body,
        ))
        .unwrap();

    let ids: Vec<&str> = outcome
        .page
        .records
        .iter()
        .map(|r| r.id.as_str())
        .collect();
    assert_eq!(ids, vec!["adjacent"]);
}

#[test]
fn test_or_logic_body_search_skips_proximity() {
    let mailbox = Arc::new(InMemoryMailbox::new());
    let inbox = mailbox.add_folder("Inbox");
    let filler = "lorem ipsum ".repeat(25);
    mailbox.add_item(
        &inbox,
        item("scattered", "Newsletter", 1)
            .with_body(format!("red things here. {filler} hat things there.")),
    );

    let engine = engine_over(&mailbox);
    let outcome = engine
        .search(&search_request(&["red", "hat"], false, Scope::Body))
        .unwrap();

    assert_eq!(outcome.page.total, 1);
}

#[test]
fn test_quoted_phrase_requires_contiguity() {
    let mailbox = Arc::new(InMemoryMailbox::new());
    let inbox = mailbox.add_folder("Inbox");
    mailbox.add_item(
        &inbox,
        item("exact", "Reminder", 1).with_body("The project deadline is Monday."),
    );
    mailbox.add_item(
        &inbox,
        item("reversed", "Reminder", 2).with_body("The deadline precedes the project kickoff."),
    );

    let engine = engine_over(&mailbox);
    let outcome = engine
        .search(&search_request(&["\"project deadline\""], true, Scope::Body))
        .unwrap();

    let ids: Vec<&str> = outcome
        .page
        .records
        .iter()
        .map(|r| r.id.as_str())
        .collect();
    assert_eq!(ids, vec!["exact"]);
}

#[test]
fn test_list_with_explicit_day_window() {
    let mailbox = Arc::new(InMemoryMailbox::new());
    let inbox = mailbox.add_folder("Inbox");
    mailbox.add_item(&inbox, item("today_late", "Later today", 1));
    mailbox.add_item(&inbox, item("today_early", "Earlier today", 5));
    mailbox.add_item(&inbox, item("last_week", "Old", 24 * 10));

    let engine = engine_over(&mailbox);
    let outcome = engine.list("Inbox", Bounds::Days(1)).unwrap();

    let ids: Vec<&str> = outcome
        .page
        .records
        .iter()
        .map(|r| r.id.as_str())
        .collect();
    // Only today's items, newest first; the window is honored literally
    assert_eq!(ids, vec!["today_late", "today_early"]);
    assert!(outcome.stats.complete());
    assert_eq!(outcome.stats.window_days, Some(1));
}

#[test]
fn test_default_list_window_is_seven_days() {
    let mailbox = Arc::new(InMemoryMailbox::new());
    let inbox = mailbox.add_folder("Inbox");
    mailbox.add_item(&inbox, item("recent", "Recent", 24));
    mailbox.add_item(&inbox, item("old", "Old", 24 * 10));

    let engine = engine_over(&mailbox);
    let outcome = engine.list("Inbox", Bounds::Default).unwrap();

    // A 7-day pass found something, so no widening happened
    assert_eq!(outcome.stats.window_days, Some(7));
    assert_eq!(outcome.page.total, 1);
    assert_eq!(outcome.page.records[0].id.as_str(), "recent");
}

#[test]
fn test_count_bound_marks_partial_result() {
    let mailbox = Arc::new(InMemoryMailbox::new());
    let inbox = mailbox.add_folder("Inbox");
    for i in 0..8 {
        mailbox.add_item(&inbox, item(&format!("m{i}"), "Subject", i));
    }

    let engine = engine_over(&mailbox);
    let outcome = engine.list("Inbox", Bounds::Count(3)).unwrap();

    assert_eq!(outcome.page.total, 3);
    assert_eq!(outcome.stats.truncation, Some(TruncationReason::MaxCount));
    assert!(!outcome.stats.complete());
}

#[test]
fn test_paging_partitions_results() {
    let mailbox = Arc::new(InMemoryMailbox::new());
    let inbox = mailbox.add_folder("Inbox");
    for i in 0..13 {
        mailbox.add_item(&inbox, item(&format!("m{i:02}"), "Subject", i));
    }

    let engine = engine_over(&mailbox);
    let outcome = engine.list("Inbox", Bounds::Days(7)).unwrap();
    assert_eq!(outcome.page.page_count, 3);

    let mut seen = Vec::new();
    for page in 1..=3 {
        let view = engine.page(page).unwrap();
        assert!(view.records.len() <= 5);
        seen.extend(view.records.iter().map(|r| r.id.clone()));
    }
    assert_eq!(seen.len(), 13);

    // Newest-first across the whole partition
    let expected: Vec<String> = (0..13).map(|i| format!("m{i:02}")).collect();
    let seen_ids: Vec<&str> = seen.iter().map(|id| id.as_str()).collect();
    assert_eq!(seen_ids, expected.iter().map(String::as_str).collect::<Vec<_>>());
}

#[test]
fn test_page_and_get_fail_out_of_range() {
    let mailbox = Arc::new(InMemoryMailbox::new());
    let inbox = mailbox.add_folder("Inbox");
    for i in 0..3 {
        mailbox.add_item(&inbox, item(&format!("m{i}"), "Subject", i));
    }

    let engine = engine_over(&mailbox);
    engine.list("Inbox", Bounds::Days(7)).unwrap();

    assert!(matches!(
        engine.page(0),
        Err(EngineError::PageOutOfRange { .. })
    ));
    assert!(matches!(
        engine.page(2),
        Err(EngineError::PageOutOfRange { .. })
    ));
    assert!(matches!(
        engine.get(0),
        Err(EngineError::PositionNotFound { .. })
    ));
    assert!(matches!(
        engine.get(4),
        Err(EngineError::PositionNotFound { .. })
    ));

    assert_eq!(engine.get(1).unwrap().id.as_str(), "m0");
}

#[test]
fn test_cache_rebuilt_on_every_operation() {
    let mailbox = Arc::new(InMemoryMailbox::new());
    let inbox = mailbox.add_folder("Inbox");
    let archive = mailbox.add_folder("Archive");
    mailbox.add_item(&inbox, item("inbox_item", "In inbox", 1));
    mailbox.add_item(&archive, item("archive_item", "In archive", 1));

    let engine = engine_over(&mailbox);

    engine.list("Inbox", Bounds::Days(7)).unwrap();
    assert_eq!(engine.get(1).unwrap().id.as_str(), "inbox_item");

    // Positions address the new cache after the next operation
    engine.list("Archive", Bounds::Days(7)).unwrap();
    assert_eq!(engine.get(1).unwrap().id.as_str(), "archive_item");
    assert!(matches!(
        engine.get(2),
        Err(EngineError::PositionNotFound { .. })
    ));
}

#[test]
fn test_folder_cache_avoids_re_traversal() {
    let mailbox = Arc::new(InMemoryMailbox::new());
    mailbox.add_folder("Inbox");

    let engine = engine_over(&mailbox);
    engine.list("Inbox", Bounds::Days(1)).unwrap();
    let calls = mailbox.child_folder_calls();

    engine.list("Inbox", Bounds::Days(1)).unwrap();
    assert_eq!(mailbox.child_folder_calls(), calls);

    engine.clear_folder_cache();
    engine.list("Inbox", Bounds::Days(1)).unwrap();
    assert!(mailbox.child_folder_calls() > calls);
}

#[test]
fn test_search_falls_back_when_filter_unsupported() {
    let mailbox = Arc::new(InMemoryMailbox::new());
    let inbox = mailbox.add_folder("Inbox");
    mailbox.add_item(&inbox, item("hit", "Budget review", 1));
    mailbox.add_item(&inbox, item("miss", "Lunch", 2));
    mailbox.set_filter_supported(false);

    let engine = engine_over(&mailbox);
    let outcome = engine
        .search(&search_request(&["budget"], true, Scope::Subject))
        .unwrap();

    assert_eq!(outcome.page.total, 1);
    assert_eq!(outcome.page.records[0].id.as_str(), "hit");
    assert!(mailbox.filtered_calls() > 0);
    assert!(mailbox.items_calls() > 0);
}

#[test]
fn test_sender_scope_never_uses_server_filter() {
    let mailbox = Arc::new(InMemoryMailbox::new());
    let inbox = mailbox.add_folder("Inbox");
    mailbox.add_item(&inbox, item("from_alice", "Hello", 1));
    mailbox.add_item(
        &inbox,
        StoredItem::new(
            "from_bob",
            "Hello",
            "Bob Park <bob@example.com>",
            Utc::now() - Duration::hours(2),
        ),
    );

    let engine = engine_over(&mailbox);
    let outcome = engine
        .search(&search_request(&["alice"], true, Scope::Sender))
        .unwrap();

    assert_eq!(outcome.page.total, 1);
    assert_eq!(outcome.page.records[0].id.as_str(), "from_alice");
    // Display-name scopes go straight to the in-memory predicate
    assert_eq!(mailbox.filtered_calls(), 0);
}

#[test]
fn test_full_profile_populates_search_records() {
    let mailbox = Arc::new(InMemoryMailbox::new());
    let inbox = mailbox.add_folder("Inbox");
    mailbox.add_item(
        &inbox,
        item("rich", "Budget review", 1)
            .with_body("Numbers attached.")
            .with_recipients(vec!["Team <team@example.com>".to_string()])
            .with_attachments(vec!["q3.xlsx".to_string()]),
    );

    let engine = engine_over(&mailbox);

    let outcome = engine
        .search(&search_request(&["budget"], true, Scope::Subject))
        .unwrap();
    let record = &outcome.page.records[0];
    assert_eq!(record.sender_name, "Alice Chen");
    assert_eq!(record.body.as_deref(), Some("Numbers attached."));
    assert_eq!(record.recipients.as_ref().unwrap()[0].address, "team@example.com");
    assert_eq!(record.attachments.as_ref().unwrap().count, 1);

    // List operations stay minimal
    let outcome = engine.list("Inbox", Bounds::Days(7)).unwrap();
    let record = &outcome.page.records[0];
    assert!(record.body.is_none());
    assert!(record.recipients.is_none());
}

#[test]
fn test_transient_failure_recovered_invisibly() {
    let mailbox = Arc::new(InMemoryMailbox::new());
    let inbox = mailbox.add_folder("Inbox");
    mailbox.add_item(&inbox, item("m", "Subject", 1));

    let engine = engine_over(&mailbox);
    mailbox.inject_transient_failures(1);

    let outcome = engine.list("Inbox", Bounds::Days(7)).unwrap();
    assert_eq!(outcome.page.total, 1);
    assert!(mailbox.reconnect_count() > 0);
}

#[test]
fn test_empty_terms_rejected() {
    let mailbox = Arc::new(InMemoryMailbox::new());
    mailbox.add_folder("Inbox");

    let engine = engine_over(&mailbox);
    let result = engine.search(&search_request(&["   "], true, Scope::Subject));
    assert!(matches!(result, Err(EngineError::InvalidQuery(_))));
}

#[test]
fn test_unknown_folder_rejected() {
    let mailbox = Arc::new(InMemoryMailbox::new());
    mailbox.add_folder("Inbox");

    let engine = engine_over(&mailbox);
    let result = engine.list("Inbox/Nope", Bounds::Default);
    assert!(matches!(result, Err(EngineError::FolderNotFound { .. })));
}

#[test]
fn test_outcome_serializes_for_presentation() {
    let mailbox = Arc::new(InMemoryMailbox::new());
    let inbox = mailbox.add_folder("Inbox");
    mailbox.add_item(&inbox, item("m", "Subject", 1));

    let engine = engine_over(&mailbox);
    let outcome = engine.list("Inbox", Bounds::Days(7)).unwrap();

    let value = serde_json::to_value(&outcome).unwrap();
    assert_eq!(value["page"]["total"], 1);
    assert!(value["stats"]["examined"].is_number());
    assert!(value["stats"]["truncation"].is_null());
}
