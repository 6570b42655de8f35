//! End-to-end workflow scenarios against the in-memory provider.

use editorial::backend::{BackendError, BackendOperation, InMemoryBackend};
use editorial::model::{
    Collection, Entry, EntryDraft, EntryKey, Field, FieldError, MediaFile, ValidationErrorKind,
};
use editorial::notify::{MessageKey, NotificationKind, NotificationLog};
use editorial::store::{InFlight, LoadState};
use editorial::{
    EditorialWorkflow, EntryLoadOutcome, LoadOutcome, Settlement, UnpublishPolicy, WorkflowConfig,
    WorkflowError, WorkflowEvent, WorkflowStatus,
};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

struct Harness {
    workflow: EditorialWorkflow,
    backend: Arc<InMemoryBackend>,
    notifications: Arc<NotificationLog>,
}

fn config() -> WorkflowConfig {
    WorkflowConfig::new(InMemoryBackend::NAME)
        .with_collection(
            Collection::new("posts")
                .with_field(Field::new("title", "string"))
                .with_field(Field::new("date", "date").with_format("%Y-%m-%d").optional())
                .with_field(Field::new("body", "markdown").optional()),
        )
        .with_collection(Collection::new("docs").with_field(Field::new("title", "string")))
}

fn harness_with(backend: InMemoryBackend, config: WorkflowConfig) -> Harness {
    let backend = Arc::new(backend);
    let notifications = Arc::new(NotificationLog::new());
    let workflow = EditorialWorkflow::builder()
        .config(config)
        .backend(backend.clone())
        .notifier(notifications.clone())
        .build()
        .unwrap();
    Harness {
        workflow,
        backend,
        notifications,
    }
}

fn harness(backend: InMemoryBackend) -> Harness {
    harness_with(backend, config())
}

fn hello_world(status: WorkflowStatus) -> Entry {
    Entry::new("posts", "hello-world")
        .with_field("title", json!("Hello World"))
        .with_status(status)
}

fn media(id: &str) -> MediaFile {
    MediaFile {
        id: id.to_string(),
        sha: format!("sha-{id}"),
        display_url: format!("https://cdn.example.com/{id}.png"),
        path: format!("static/media/{id}.png"),
        name: format!("{id}.png"),
        size: 1024,
        file: None,
    }
}

fn status_of(workflow: &EditorialWorkflow, slug: &str) -> Option<WorkflowStatus> {
    workflow
        .unpublished_entry("posts", slug)
        .and_then(|entry| entry.status)
}

async fn load(h: &Harness) {
    let collections = h.workflow.config().collections.clone();
    h.workflow.load_unpublished_entries(&collections).await;
}

#[tokio::test]
async fn status_change_is_optimistic_and_commits() {
    let h = harness(
        InMemoryBackend::new()
            .with_unpublished(hello_world(WorkflowStatus::Draft))
            .with_latency(Duration::from_millis(100)),
    );
    load(&h).await;

    let task = {
        let workflow = h.workflow.clone();
        tokio::spawn(async move {
            workflow
                .update_unpublished_entry_status(
                    "posts",
                    "hello-world",
                    WorkflowStatus::Draft,
                    WorkflowStatus::PendingReview,
                )
                .await
        })
    };

    tokio::time::sleep(Duration::from_millis(30)).await;
    let in_flight = h.workflow.read(|store| {
        store
            .unpublished()
            .get(&EntryKey::new("posts", "hello-world"))
            .and_then(|slot| slot.in_flight)
    });
    assert_eq!(status_of(&h.workflow, "hello-world"), Some(WorkflowStatus::PendingReview));
    assert_eq!(in_flight, Some(InFlight::UpdatingStatus));

    assert_eq!(task.await.unwrap(), Settlement::Committed);
    assert_eq!(status_of(&h.workflow, "hello-world"), Some(WorkflowStatus::PendingReview));

    let calls = h.backend.calls_of(BackendOperation::UpdateStatus);
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].key, Some(EntryKey::new("posts", "hello-world")));
    assert_eq!(calls[0].status, Some(WorkflowStatus::PendingReview));
    assert!(h.notifications.contains(MessageKey::EntryUpdated));
    assert_eq!(h.workflow.read(|store| store.pending_count()), 0);
}

#[tokio::test]
async fn rejected_status_change_reverts_to_draft() {
    let h = harness(InMemoryBackend::new().with_unpublished(hello_world(WorkflowStatus::Draft)));
    load(&h).await;
    h.backend
        .fail_next(BackendOperation::UpdateStatus, BackendError::failed("rejected"));

    let settlement = h
        .workflow
        .update_unpublished_entry_status(
            "posts",
            "hello-world",
            WorkflowStatus::Draft,
            WorkflowStatus::PendingReview,
        )
        .await;

    assert_eq!(
        settlement,
        Settlement::Reverted(WorkflowError::Backend(BackendError::failed("rejected")))
    );
    assert_eq!(status_of(&h.workflow, "hello-world"), Some(WorkflowStatus::Draft));
    assert!(h
        .workflow
        .read(|store| store.status_history(&EntryKey::new("posts", "hello-world")).is_none()));

    let danger = h.notifications.all().pop().unwrap();
    assert_eq!(danger.key, MessageKey::OnFailToUpdateStatus);
    assert_eq!(danger.kind, NotificationKind::Danger);
    assert_eq!(danger.details.as_deref(), Some("backend error: rejected"));
}

#[tokio::test]
async fn identity_status_change_is_skipped() {
    let h = harness(InMemoryBackend::new().with_unpublished(hello_world(WorkflowStatus::Draft)));
    load(&h).await;
    let mut events = h.workflow.subscribe();
    let before = h.workflow.snapshot();

    let settlement = h
        .workflow
        .update_unpublished_entry_status(
            "posts",
            "hello-world",
            WorkflowStatus::Draft,
            WorkflowStatus::Draft,
        )
        .await;

    assert_eq!(settlement, Settlement::Skipped);
    assert!(h.backend.calls_of(BackendOperation::UpdateStatus).is_empty());
    assert_eq!(h.workflow.snapshot(), before);
    assert!(events.try_recv().is_err());
}

#[tokio::test]
async fn missing_required_field_blocks_persist() {
    let h = harness(InMemoryBackend::new());
    let draft = EntryDraft::new(Entry::new("docs", "new-page"))
        .with_error(FieldError::presence("title"));

    let result = h
        .workflow
        .persist_unpublished_entry("docs", &draft, false)
        .await;

    match result {
        Err(WorkflowError::Validation {
            errors,
            missing_required,
        }) => {
            assert!(missing_required);
            assert_eq!(errors, vec![FieldError::presence("title")]);
        }
        other => panic!("expected a validation error, got {other:?}"),
    }
    assert!(h.backend.calls_of(BackendOperation::PersistEntry).is_empty());
    assert!(h
        .backend
        .calls_of(BackendOperation::PersistUnpublishedEntry)
        .is_empty());
    assert_eq!(h.notifications.keys(), vec![MessageKey::MissingRequiredField]);
    assert!(h.workflow.unpublished_entry("docs", "new-page").is_none());
    assert_eq!(h.workflow.read(|store| store.pending_count()), 0);
}

#[tokio::test]
async fn other_validation_errors_abort_silently() {
    let h = harness(InMemoryBackend::new());
    let draft = EntryDraft::new(Entry::new("docs", "").with_field("title", json!("New page")))
        .with_error(FieldError::new(
            "title",
            ValidationErrorKind::Pattern,
            "title must not end with a period",
        ));

    let err = h
        .workflow
        .persist_unpublished_entry("docs", &draft, false)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        WorkflowError::Validation {
            missing_required: false,
            ..
        }
    ));
    assert!(h.notifications.all().is_empty());
    assert!(h.backend.calls_of(BackendOperation::PersistEntry).is_empty());
}

#[tokio::test]
async fn new_entry_gets_a_slug_free_of_collisions() {
    let h = harness(
        InMemoryBackend::new().with_published(
            Entry::new("posts", "hello-world").with_field("title", json!("Hello World")),
        ),
    );
    h.workflow.load_entry("posts", "hello-world").await;

    let draft = EntryDraft::new(Entry::new("posts", "").with_field("title", json!("Hello World")));
    let slug = h
        .workflow
        .persist_unpublished_entry("posts", &draft, false)
        .await
        .unwrap();

    assert_eq!(slug, "hello-world-1");
    assert!(h.workflow.unpublished_entry("posts", "").is_none());
    let stored = h.workflow.unpublished_entry("posts", "hello-world-1").unwrap();
    assert_eq!(stored.status, Some(WorkflowStatus::Draft));
    assert!(h
        .backend
        .unpublished(&EntryKey::new("posts", "hello-world-1"))
        .is_some());
    assert!(h.notifications.contains(MessageKey::EntrySaved));
}

#[tokio::test]
async fn persist_sends_serialized_values() {
    let h = harness(InMemoryBackend::new());
    // 2024-03-01T12:30:00Z
    let draft = EntryDraft::new(
        Entry::new("posts", "")
            .with_field("title", json!("Launch"))
            .with_field("date", json!(1_709_296_200_000i64)),
    );

    let slug = h
        .workflow
        .persist_unpublished_entry("posts", &draft, false)
        .await
        .unwrap();

    let stored = h.backend.unpublished(&EntryKey::new("posts", &slug)).unwrap();
    assert_eq!(stored.data["date"], json!("2024-03-01"));
    let local = h.workflow.unpublished_entry("posts", &slug).unwrap();
    assert_eq!(local.data["date"], json!(1_709_296_200_000i64));
}

#[tokio::test]
async fn new_entry_takes_the_path_of_its_assigned_slug() {
    let h = harness(InMemoryBackend::new());
    let draft = EntryDraft::new(Entry::new("posts", "").with_field("title", json!("First Post")));

    let slug = h
        .workflow
        .persist_unpublished_entry("posts", &draft, false)
        .await
        .unwrap();

    assert_eq!(slug, "first-post");
    let local = h.workflow.unpublished_entry("posts", "first-post").unwrap();
    let stored = h.backend.unpublished(&EntryKey::new("posts", "first-post")).unwrap();
    assert_eq!(local.path, "content/posts/first-post.md");
    assert_eq!(local.path, stored.path);
}

#[tokio::test]
async fn loaded_entries_hold_in_memory_values() {
    // Midnight UTC of 2024-03-01.
    let midnight = json!(1_709_251_200_000i64);
    let h = harness(
        InMemoryBackend::new()
            .with_unpublished(
                hello_world(WorkflowStatus::Draft).with_field("date", json!("2024-03-01")),
            )
            .with_published(
                Entry::new("posts", "about")
                    .with_field("title", json!("About"))
                    .with_field("date", json!("2024-03-01")),
            ),
    );

    load(&h).await;
    let listed = h.workflow.unpublished_entry("posts", "hello-world").unwrap();
    assert_eq!(listed.data["date"], midnight);

    let single = h.workflow.load_unpublished_entry("posts", "hello-world").await;
    assert_eq!(single.entry().unwrap().data["date"], midnight);

    h.workflow.load_entry("posts", "about").await;
    let published = h.workflow.published_entry("posts", "about").unwrap();
    assert_eq!(published.data["date"], midnight);
}

#[tokio::test]
async fn unpublish_writes_values_back_in_stored_form() {
    let h = harness(InMemoryBackend::new().with_published(
        Entry::new("posts", "about")
            .with_field("title", json!("About"))
            .with_field("date", json!("2024-03-01")),
    ));
    h.workflow.load_entry("posts", "about").await;

    let settlement = h.workflow.unpublish_published_entry("posts", "about").await;

    assert_eq!(settlement, Settlement::Committed);
    let stored = h.backend.unpublished(&EntryKey::new("posts", "about")).unwrap();
    assert_eq!(stored.data["date"], json!("2024-03-01"));
}

#[tokio::test]
async fn persist_uploads_local_media() {
    let h = harness(InMemoryBackend::new());
    let mut upload = media("m2");
    upload.file = Some("blob:local/m2".to_string());
    let draft = EntryDraft::new(Entry::new("posts", "").with_field("title", json!("With media")))
        .with_media(media("m1"))
        .with_media(upload);

    h.workflow
        .persist_unpublished_entry("posts", &draft, false)
        .await
        .unwrap();

    let assets = h.backend.assets();
    assert_eq!(assets.len(), 1);
    assert_eq!(assets[0].file, "blob:local/m2");
    assert_eq!(assets[0].path, "static/media/m2.png");
}

#[tokio::test]
async fn failed_persist_reverts_and_propagates() {
    let h = harness(InMemoryBackend::new().with_unpublished(hello_world(WorkflowStatus::Draft)));
    load(&h).await;
    let before = h.workflow.snapshot();
    h.backend.fail_next(
        BackendOperation::PersistUnpublishedEntry,
        BackendError::failed("conflict"),
    );

    let draft =
        EntryDraft::new(hello_world(WorkflowStatus::Draft).with_field("title", json!("Edited")));
    let err = h
        .workflow
        .persist_unpublished_entry("posts", &draft, true)
        .await
        .unwrap_err();

    assert_eq!(err, WorkflowError::Backend(BackendError::failed("conflict")));
    assert_eq!(h.workflow.snapshot(), before);
    assert!(h.notifications.contains(MessageKey::OnFailToPersist));
}

#[tokio::test]
async fn persist_starts_loading_unpublished_entries() {
    let h = harness(
        InMemoryBackend::new().with_unpublished(hello_world(WorkflowStatus::PendingReview)),
    );
    assert_eq!(h.workflow.load_state(), LoadState::Unloaded);

    let draft = EntryDraft::new(Entry::new("posts", "").with_field("title", json!("Another")));
    h.workflow
        .persist_unpublished_entry("posts", &draft, false)
        .await
        .unwrap();

    for _ in 0..10 {
        if h.workflow.load_state() == LoadState::Loaded {
            break;
        }
        tokio::task::yield_now().await;
    }
    assert_eq!(h.workflow.load_state(), LoadState::Loaded);
    assert_eq!(
        status_of(&h.workflow, "hello-world"),
        Some(WorkflowStatus::PendingReview)
    );
    assert_eq!(
        h.backend.calls_of(BackendOperation::UnpublishedEntries).len(),
        1
    );
}

#[tokio::test]
async fn unknown_collection_is_rejected() {
    let h = harness(InMemoryBackend::new());
    let draft = EntryDraft::new(Entry::new("pages", "").with_field("title", json!("x")));

    let err = h
        .workflow
        .persist_unpublished_entry("pages", &draft, false)
        .await
        .unwrap_err();

    assert_eq!(err, WorkflowError::UnknownCollection("pages".to_string()));
}

#[tokio::test]
async fn publish_promotes_media_and_clears_draft_media() {
    let h = harness(InMemoryBackend::new().with_unpublished(
        hello_world(WorkflowStatus::PendingPublish).with_media(media("m1")),
    ));
    let key = EntryKey::new("posts", "hello-world");

    let loaded = h.workflow.load_unpublished_entry("posts", "hello-world").await;
    assert!(matches!(loaded, EntryLoadOutcome::Unpublished(_)));
    h.workflow.read(|store| {
        assert!(store.media().file("m1").unwrap().draft);
        assert_eq!(store.media().draft_entry_media(&key).len(), 1);
    });

    let settlement = h.workflow.publish_unpublished_entry("posts", "hello-world").await;

    assert_eq!(settlement, Settlement::Committed);
    h.workflow.read(|store| {
        assert!(!store.media().file("m1").unwrap().draft);
        assert!(store.media().draft_entry_media(&key).is_empty());
        assert!(store.unpublished().get(&key).is_none());
        assert!(store.published().contains(&key));
    });
    assert!(h.notifications.contains(MessageKey::EntryPublished));
}

#[tokio::test]
async fn failed_publish_leaves_media_untouched() {
    let h = harness(InMemoryBackend::new().with_unpublished(
        hello_world(WorkflowStatus::PendingPublish).with_media(media("m1")),
    ));
    let key = EntryKey::new("posts", "hello-world");
    h.workflow.load_unpublished_entry("posts", "hello-world").await;
    let before = h.workflow.snapshot();
    h.backend
        .fail_next(BackendOperation::Publish, BackendError::failed("merge blocked"));

    let settlement = h.workflow.publish_unpublished_entry("posts", "hello-world").await;

    assert!(matches!(settlement, Settlement::Reverted(WorkflowError::Backend(_))));
    assert_eq!(h.workflow.snapshot(), before);
    assert!(h.workflow.read(|store| store.media().file("m1").unwrap().draft));
    assert!(h.backend.calls_of(BackendOperation::Entry).is_empty());
    assert!(h.backend.unpublished(&key).is_some());
    assert!(h.notifications.contains(MessageKey::OnFailToPublishEntry));
}

#[tokio::test]
async fn unpublish_moves_entry_back_under_review() {
    let h = harness(InMemoryBackend::new().with_published(
        Entry::new("posts", "about").with_field("title", json!("About")),
    ));
    h.workflow.load_entry("posts", "about").await;

    let settlement = h.workflow.unpublish_published_entry("posts", "about").await;

    assert_eq!(settlement, Settlement::Committed);
    assert!(h.workflow.published_entry("posts", "about").is_none());
    assert_eq!(status_of(&h.workflow, "about"), Some(WorkflowStatus::PendingPublish));

    let key = EntryKey::new("posts", "about");
    assert!(h.backend.published(&key).is_none());
    assert_eq!(
        h.backend.unpublished(&key).and_then(|e| e.status),
        Some(WorkflowStatus::PendingPublish)
    );
    let persist = h.backend.calls_of(BackendOperation::PersistEntry);
    assert_eq!(persist[0].status, Some(WorkflowStatus::PendingPublish));
    assert!(h.notifications.contains(MessageKey::EntryUnpublished));
}

#[tokio::test]
async fn failed_recreate_reverts_but_provider_lost_the_entry() {
    let h = harness(InMemoryBackend::new().with_published(
        Entry::new("posts", "about").with_field("title", json!("About")),
    ));
    h.workflow.load_entry("posts", "about").await;
    let before = h.workflow.snapshot();
    h.backend
        .fail_next(BackendOperation::PersistEntry, BackendError::failed("quota exceeded"));

    let settlement = h.workflow.unpublish_published_entry("posts", "about").await;

    assert_eq!(
        settlement,
        Settlement::Reverted(WorkflowError::PartialUnpublish {
            source: BackendError::failed("quota exceeded"),
        })
    );
    // Process state is back to where it was.
    assert_eq!(h.workflow.snapshot(), before);
    assert!(h.workflow.published_entry("posts", "about").is_some());
    assert!(h.workflow.unpublished_entry("posts", "about").is_none());

    // The provider deleted the published entry and has no unpublished copy.
    let key = EntryKey::new("posts", "about");
    assert!(h.backend.published(&key).is_none());
    assert!(h.backend.unpublished(&key).is_none());
    assert!(h.notifications.contains(MessageKey::OnFailToUnpublishEntry));
}

#[tokio::test]
async fn retry_policy_recovers_from_a_transient_recreate_failure() {
    let h = harness_with(
        InMemoryBackend::new().with_published(
            Entry::new("posts", "about").with_field("title", json!("About")),
        ),
        config().with_unpublish_policy(UnpublishPolicy::Retry(1)),
    );
    h.workflow.load_entry("posts", "about").await;
    h.backend
        .fail_next(BackendOperation::PersistEntry, BackendError::failed("timeout"));

    let settlement = h.workflow.unpublish_published_entry("posts", "about").await;

    assert_eq!(settlement, Settlement::Committed);
    assert_eq!(h.backend.calls_of(BackendOperation::PersistEntry).len(), 2);
    assert_eq!(status_of(&h.workflow, "about"), Some(WorkflowStatus::PendingPublish));
}

#[tokio::test]
async fn failed_delete_of_published_entry_changes_nothing() {
    let h = harness(InMemoryBackend::new().with_published(Entry::new("posts", "about")));
    h.workflow.load_entry("posts", "about").await;
    let before = h.workflow.snapshot();
    h.backend
        .fail_next(BackendOperation::DeleteEntry, BackendError::failed("forbidden"));

    let settlement = h.workflow.unpublish_published_entry("posts", "about").await;

    assert!(matches!(settlement, Settlement::Reverted(WorkflowError::Backend(_))));
    assert_eq!(h.workflow.snapshot(), before);
    assert!(h.backend.published(&EntryKey::new("posts", "about")).is_some());
    assert!(h.backend.calls_of(BackendOperation::PersistEntry).is_empty());
}

#[tokio::test]
async fn unpublishing_an_unknown_entry_aborts() {
    let h = harness(InMemoryBackend::new());

    let settlement = h.workflow.unpublish_published_entry("posts", "missing").await;

    assert_eq!(
        settlement,
        Settlement::Aborted(WorkflowError::EntryNotFound(EntryKey::new("posts", "missing")))
    );
    assert!(h.backend.calls().is_empty());
    assert!(h.notifications.contains(MessageKey::OnFailToUnpublishEntry));
}

#[tokio::test]
async fn delete_removes_entry_only_on_success() {
    let h = harness(
        InMemoryBackend::new()
            .with_unpublished(hello_world(WorkflowStatus::Draft))
            .with_unpublished(Entry::new("posts", "news").with_field("title", json!("News"))),
    );
    load(&h).await;
    h.backend.fail_next(
        BackendOperation::DeleteUnpublishedEntry,
        BackendError::failed("locked"),
    );

    let failed = h.workflow.delete_unpublished_entry("posts", "news").await;
    assert!(matches!(failed, Settlement::Reverted(_)));
    assert!(h.workflow.unpublished_entry("posts", "news").is_some());

    let deleted = h.workflow.delete_unpublished_entry("posts", "news").await;
    assert_eq!(deleted, Settlement::Committed);
    assert!(h.workflow.unpublished_entry("posts", "news").is_none());
    assert!(h.workflow.unpublished_entry("posts", "hello-world").is_some());

    let kinds: Vec<NotificationKind> = h.notifications.all().iter().map(|n| n.kind).collect();
    assert_eq!(kinds, vec![NotificationKind::Danger, NotificationKind::Success]);
    assert!(h
        .notifications
        .keys()
        .iter()
        .all(|key| *key == MessageKey::OnDeleteUnpublishedChanges));
}

#[tokio::test]
async fn entry_that_left_the_workflow_is_loaded_as_published() {
    let h = harness(InMemoryBackend::new().with_published(Entry::new("posts", "about")));
    let mut events = h.workflow.subscribe();

    let outcome = h.workflow.load_unpublished_entry("posts", "about").await;

    assert!(matches!(outcome, EntryLoadOutcome::Published(ref entry) if entry.slug == "about"));
    assert!(h.workflow.published_entry("posts", "about").is_some());
    assert!(h.workflow.unpublished_entry("posts", "about").is_none());
    assert!(h.notifications.all().is_empty());

    let mut redirected = false;
    while let Ok(event) = events.try_recv() {
        if let WorkflowEvent::UnpublishedEntryRedirected { key } = event {
            assert_eq!(key, EntryKey::new("posts", "about"));
            redirected = true;
        }
    }
    assert!(redirected);
}

#[tokio::test]
async fn single_entry_load_runs_the_full_fetch_once() {
    let h = harness(
        InMemoryBackend::new()
            .with_unpublished(hello_world(WorkflowStatus::Draft))
            .with_unpublished(Entry::new("posts", "news")),
    );

    h.workflow.load_unpublished_entry("posts", "hello-world").await;
    h.workflow.load_unpublished_entry("posts", "news").await;

    assert_eq!(h.workflow.load_state(), LoadState::Loaded);
    assert_eq!(h.backend.calls_of(BackendOperation::UnpublishedEntries).len(), 1);
    assert_eq!(h.workflow.read(|store| store.unpublished().len()), 2);

    let collections = h.workflow.config().collections.clone();
    assert_eq!(
        h.workflow.load_unpublished_entries(&collections).await,
        LoadOutcome::Skipped
    );
}

#[tokio::test]
async fn failed_prefetch_does_not_block_single_entry_load() {
    let h = harness(InMemoryBackend::new().with_unpublished(hello_world(WorkflowStatus::Draft)));
    h.backend
        .fail_next(BackendOperation::UnpublishedEntries, BackendError::failed("offline"));

    let outcome = h.workflow.load_unpublished_entry("posts", "hello-world").await;

    assert!(matches!(outcome, EntryLoadOutcome::Unpublished(_)));
    assert_eq!(h.workflow.load_state(), LoadState::Failed);
    assert!(h.notifications.all().is_empty());
}

#[tokio::test]
async fn failed_full_load_can_be_retried() {
    let h = harness(InMemoryBackend::new().with_unpublished(hello_world(WorkflowStatus::Draft)));
    let collections = h.workflow.config().collections.clone();
    h.backend
        .fail_next(BackendOperation::UnpublishedEntries, BackendError::failed("offline"));

    let failed = h.workflow.load_unpublished_entries(&collections).await;
    assert!(matches!(failed, LoadOutcome::Failed(_)));
    assert_eq!(h.workflow.load_state(), LoadState::Failed);
    assert!(h.notifications.contains(MessageKey::OnFailToLoadEntries));

    let retried = h.workflow.load_unpublished_entries(&collections).await;
    assert_eq!(retried, LoadOutcome::Loaded { count: 1, pages: 1 });
    assert_eq!(h.workflow.load_state(), LoadState::Loaded);
}

#[tokio::test]
async fn entry_outside_the_workflow_without_redirect_fails() {
    let h = harness(InMemoryBackend::new());
    load(&h).await;
    h.backend.fail_next(
        BackendOperation::UnpublishedEntry,
        BackendError::NotUnderEditorialWorkflow { redirect: false },
    );

    let outcome = h.workflow.load_unpublished_entry("posts", "x").await;

    assert_eq!(
        outcome,
        EntryLoadOutcome::Failed(WorkflowError::NotUnderWorkflow {
            collection: "posts".to_string(),
            slug: "x".to_string(),
        })
    );
    assert!(h.backend.calls_of(BackendOperation::Entry).is_empty());
    assert_eq!(h.notifications.keys(), vec![MessageKey::OnFailToLoadEntries]);
}

#[tokio::test]
async fn failed_single_entry_load_changes_nothing() {
    let h = harness(InMemoryBackend::new().with_unpublished(hello_world(WorkflowStatus::Draft)));
    load(&h).await;
    let before = h.workflow.snapshot();
    h.backend
        .fail_next(BackendOperation::UnpublishedEntry, BackendError::failed("timeout"));

    let outcome = h.workflow.load_unpublished_entry("posts", "hello-world").await;

    assert!(matches!(outcome, EntryLoadOutcome::Failed(WorkflowError::Backend(_))));
    assert_eq!(h.workflow.snapshot(), before);
    assert!(h.notifications.contains(MessageKey::OnFailToLoadEntries));
}

#[tokio::test]
async fn simple_mode_never_loads_unpublished_entries() {
    let h = harness_with(
        InMemoryBackend::new(),
        config().with_publish_mode(editorial::PublishMode::Simple),
    );
    let collections = h.workflow.config().collections.clone();

    assert_eq!(
        h.workflow.load_unpublished_entries(&collections).await,
        LoadOutcome::Skipped
    );
    assert!(h.backend.calls().is_empty());
    assert_eq!(h.workflow.load_state(), LoadState::Unloaded);
}

#[tokio::test]
async fn transactions_on_one_entry_run_one_at_a_time() {
    let h = harness(
        InMemoryBackend::new()
            .with_unpublished(hello_world(WorkflowStatus::Draft))
            .with_latency(Duration::from_millis(100)),
    );
    load(&h).await;
    h.backend.clear_calls();

    let spawn = |from: WorkflowStatus, to: WorkflowStatus| {
        let workflow = h.workflow.clone();
        tokio::spawn(async move {
            workflow
                .update_unpublished_entry_status("posts", "hello-world", from, to)
                .await
        })
    };
    let first = spawn(WorkflowStatus::Draft, WorkflowStatus::PendingReview);
    let second = spawn(WorkflowStatus::PendingReview, WorkflowStatus::PendingPublish);

    tokio::time::sleep(Duration::from_millis(30)).await;
    assert_eq!(h.backend.calls_of(BackendOperation::UpdateStatus).len(), 1);

    assert_eq!(first.await.unwrap(), Settlement::Committed);
    assert_eq!(second.await.unwrap(), Settlement::Committed);
    assert_eq!(status_of(&h.workflow, "hello-world"), Some(WorkflowStatus::PendingPublish));

    let history = h
        .workflow
        .read(|store| store.status_history(&EntryKey::new("posts", "hello-world")).cloned())
        .unwrap();
    assert_eq!(
        history.get_path(),
        vec![
            &WorkflowStatus::Draft,
            &WorkflowStatus::PendingReview,
            &WorkflowStatus::PendingPublish
        ]
    );
}

#[tokio::test]
async fn without_entry_locks_calls_overlap() {
    let h = harness_with(
        InMemoryBackend::new()
            .with_unpublished(hello_world(WorkflowStatus::Draft))
            .with_latency(Duration::from_millis(100)),
        config().with_entry_serialization(false),
    );
    load(&h).await;

    let spawn = |from: WorkflowStatus, to: WorkflowStatus| {
        let workflow = h.workflow.clone();
        tokio::spawn(async move {
            workflow
                .update_unpublished_entry_status("posts", "hello-world", from, to)
                .await
        })
    };
    let first = spawn(WorkflowStatus::Draft, WorkflowStatus::PendingReview);
    let second = spawn(WorkflowStatus::PendingReview, WorkflowStatus::PendingPublish);

    tokio::time::sleep(Duration::from_millis(30)).await;
    assert_eq!(h.backend.calls_of(BackendOperation::UpdateStatus).len(), 2);

    first.await.unwrap();
    second.await.unwrap();
}

#[tokio::test]
async fn transactions_are_broadcast_in_order() {
    let h = harness(InMemoryBackend::new().with_unpublished(hello_world(WorkflowStatus::Draft)));
    load(&h).await;
    let mut events = h.workflow.subscribe();

    h.workflow
        .update_unpublished_entry_status(
            "posts",
            "hello-world",
            WorkflowStatus::Draft,
            WorkflowStatus::PendingReview,
        )
        .await;

    let begun = events.recv().await.unwrap();
    let committed = events.recv().await.unwrap();
    match (begun, committed) {
        (
            WorkflowEvent::TransactionBegun { id: begun_id, .. },
            WorkflowEvent::TransactionCommitted { id, key, .. },
        ) => {
            assert_eq!(begun_id, id);
            assert_eq!(key, EntryKey::new("posts", "hello-world"));
        }
        other => panic!("unexpected events: {other:?}"),
    }
}
