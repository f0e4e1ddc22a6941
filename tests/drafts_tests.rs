mod common;

use std::sync::atomic::Ordering;
use std::sync::Arc;

use common::{file, shared, translations, Call, FakeBackend};
use transbranch::api::{Backend, TranslationFile};
use transbranch::auth::AccessToken;
use transbranch::drafts::DraftManager;
use transbranch::error::{ApiError, DraftError};

fn token() -> AccessToken {
    AccessToken::bearer("gho_test")
}

fn drafts_for(backend: &Arc<FakeBackend>) -> DraftManager {
    let backend: Arc<dyn Backend> = backend.clone();
    DraftManager::new(backend)
}

fn three_files() -> Vec<TranslationFile> {
    vec![
        file("a.json", &[("anchor", "anker")]),
        file("b.json", &[("buoy", "boei"), ("bay", "baai")]),
        file("c.json", &[("current", "stroming")]),
    ]
}

#[tokio::test]
async fn test_load_seeds_drafts_from_translatable_files() {
    let backend = shared(FakeBackend::new().with_files(vec![
        file("nl.json", &[("anchor", "anker")]),
        TranslationFile {
            filename: "README.md".to_string(),
            translations: None,
        },
    ]));
    let mut drafts = drafts_for(&backend);

    let files = drafts
        .load_for_branch(&token(), "feature-x")
        .await
        .expect("Failed to load");

    assert_eq!(files.len(), 2);
    assert_eq!(drafts.branch(), Some("feature-x"));
    assert_eq!(drafts.drafts().len(), 1, "Only files with translations are drafted");
    assert_eq!(
        drafts.drafts().get("nl.json"),
        Some(&translations(&[("anchor", "anker")]))
    );
    assert!(!drafts.is_loading());
    assert_eq!(backend.calls(), vec![Call::BranchDiff("feature-x".to_string())]);
}

#[tokio::test]
async fn test_failed_load_keeps_previous_state() {
    let backend = shared(FakeBackend::new().with_files(three_files()));
    let mut drafts = drafts_for(&backend);
    drafts
        .load_for_branch(&token(), "feature-x")
        .await
        .expect("Failed to load");
    drafts.edit_entry("a.json", "anchor", "ankertje");

    backend.fail_diff.store(true, Ordering::SeqCst);
    let err = drafts.load_for_branch(&token(), "feature-x").await.unwrap_err();

    match err {
        DraftError::Load { branch, .. } => assert_eq!(branch, "feature-x"),
        other => panic!("Expected load error, got {:?}", other),
    }
    assert_eq!(drafts.files().len(), 3);
    assert_eq!(drafts.display_value("a.json", "anchor"), Some("ankertje"));
    assert!(!drafts.is_loading());
}

#[tokio::test]
async fn test_edit_and_display_value() {
    let backend = shared(FakeBackend::new().with_files(three_files()));
    let mut drafts = drafts_for(&backend);
    drafts
        .load_for_branch(&token(), "feature-x")
        .await
        .expect("Failed to load");

    drafts.edit_entry("b.json", "buoy", "ton");
    drafts.edit_entry("new.json", "reef", "rif");

    assert_eq!(drafts.display_value("b.json", "buoy"), Some("ton"));
    assert_eq!(drafts.display_value("b.json", "bay"), Some("baai"));
    assert_eq!(drafts.display_value("new.json", "reef"), Some("rif"));
    assert_eq!(drafts.display_value("c.json", "missing"), None);
}

#[tokio::test]
async fn test_cleared_draft_shows_loaded_value_but_saves_empty() {
    let backend = shared(FakeBackend::new().with_files(three_files()));
    let mut drafts = drafts_for(&backend);
    drafts
        .load_for_branch(&token(), "feature-x")
        .await
        .expect("Failed to load");

    drafts.edit_entry("a.json", "anchor", "");
    drafts.edit_entry("new.json", "reef", "");

    assert_eq!(drafts.display_value("a.json", "anchor"), Some("anker"));
    assert_eq!(drafts.display_value("new.json", "reef"), None);

    drafts
        .save_all(&token(), "feature-x")
        .await
        .expect("Failed to save");
    let updates = backend.update_calls();
    let (_, sent) = &updates[0];
    assert_eq!(sent.get("anchor").map(String::as_str), Some(""));
}

#[tokio::test]
async fn test_loading_indicator_is_set_while_fetching() {
    let backend = shared(FakeBackend::new().with_files(three_files()));
    let mut drafts = drafts_for(&backend);
    backend.watch(drafts.loading_indicator());

    drafts
        .load_for_branch(&token(), "feature-x")
        .await
        .expect("Failed to load");

    assert_eq!(backend.observed(), vec![true]);
    assert!(!drafts.is_loading());
}

#[tokio::test]
async fn test_saving_indicator_is_set_during_each_update() {
    let backend = shared(FakeBackend::new().with_files(three_files()));
    let mut drafts = drafts_for(&backend);
    drafts
        .load_for_branch(&token(), "feature-x")
        .await
        .expect("Failed to load");
    let saving = drafts.saving_indicator();
    backend.watch(saving.clone());

    drafts
        .save_all(&token(), "feature-x")
        .await
        .expect("Failed to save");

    assert_eq!(backend.observed(), vec![true, true, true]);
    assert!(!saving.is_active());
}

#[tokio::test]
async fn test_second_save_while_saving_is_refused() {
    let backend = shared(FakeBackend::new().with_files(three_files()));
    let mut drafts = drafts_for(&backend);
    drafts
        .load_for_branch(&token(), "feature-x")
        .await
        .expect("Failed to load");
    let token = token();

    let (first, second) = tokio::join!(
        drafts.save_all(&token, "feature-x"),
        drafts.save_all(&token, "feature-x")
    );

    let results = [first, second];
    let saved: Vec<usize> = results.iter().filter_map(|r| r.as_ref().ok().copied()).collect();
    assert_eq!(saved, vec![3], "Exactly one save should run");
    assert_eq!(
        results
            .iter()
            .filter(|r| matches!(r, Err(DraftError::SaveInProgress)))
            .count(),
        1
    );
    assert_eq!(backend.update_calls().len(), 3, "Refused save must send nothing");
    assert!(!drafts.is_saving());
}

#[tokio::test]
async fn test_save_sends_each_file_once_with_full_map() {
    let backend = shared(FakeBackend::new().with_files(three_files()));
    let mut drafts = drafts_for(&backend);
    drafts
        .load_for_branch(&token(), "feature-x")
        .await
        .expect("Failed to load");
    drafts.edit_entry("b.json", "buoy", "ton");
    drafts.edit_entry("d.json", "dock", "kade");

    let saved = drafts
        .save_all(&token(), "feature-x")
        .await
        .expect("Failed to save");

    assert_eq!(saved, 4);
    assert_eq!(
        backend.update_calls(),
        vec![
            ("a.json".to_string(), translations(&[("anchor", "anker")])),
            (
                "b.json".to_string(),
                translations(&[("buoy", "ton"), ("bay", "baai")])
            ),
            ("c.json".to_string(), translations(&[("current", "stroming")])),
            ("d.json".to_string(), translations(&[("dock", "kade")])),
        ]
    );
    for call in backend.calls() {
        if let Call::UpdateFile { branch, .. } = call {
            assert_eq!(branch, "feature-x");
        }
    }
    assert!(!drafts.is_saving());
}

#[tokio::test]
async fn test_save_stops_at_first_failure() {
    let backend = shared(FakeBackend::new().with_files(three_files()));
    backend.fail_update_for("b.json");
    let mut drafts = drafts_for(&backend);
    drafts
        .load_for_branch(&token(), "feature-x")
        .await
        .expect("Failed to load");

    let err = drafts.save_all(&token(), "feature-x").await.unwrap_err();

    assert!(matches!(
        err,
        DraftError::PartialSaveFailure(ApiError::Status { status: 500, .. })
    ));
    let sent: Vec<String> = backend.update_calls().into_iter().map(|(f, _)| f).collect();
    assert_eq!(sent, vec!["a.json", "b.json"], "c.json must not be sent");
    assert!(!drafts.is_saving());
    // Drafts survive so the user can retry.
    assert_eq!(drafts.drafts().len(), 3);
}

#[tokio::test]
async fn test_save_with_no_drafts_sends_nothing() {
    let backend = shared(FakeBackend::new());
    let mut drafts = drafts_for(&backend);

    let saved = drafts
        .save_all(&token(), "feature-x")
        .await
        .expect("Failed to save");

    assert_eq!(saved, 0);
    assert!(backend.update_calls().is_empty());
}

#[tokio::test]
async fn test_clear_forgets_branch_data() {
    let backend = shared(FakeBackend::new().with_files(three_files()));
    let mut drafts = drafts_for(&backend);
    drafts
        .load_for_branch(&token(), "feature-x")
        .await
        .expect("Failed to load");

    drafts.clear();

    assert_eq!(drafts.branch(), None);
    assert!(drafts.files().is_empty());
    assert!(drafts.drafts().is_empty());
}
