use chrono::Duration;
use vedanta_core::model::{
    AnswerOption, CardId, Category, Difficulty, FeedbackDraft, FeedbackKind, FeedbackStatus,
    Flashcard, Progress, QuestionId, QuizQuestion, UserName,
};
use vedanta_core::time::fixed_now;
use storage::repository::{
    ContentFilter, ContentRepository, FeedbackRepository, ProgressRecord, ProgressRepository,
    StorageError, SyncLogEntry, SyncLogRepository,
};
use storage::sqlite::SqliteRepository;

fn build_card(id: u64, category: Category, difficulty: Difficulty) -> Flashcard {
    Flashcard::new(
        CardId::new(id),
        format!("term-{id}"),
        format!("english-{id}"),
        format!("meaning of term {id}"),
        category,
        difficulty,
        None,
    )
    .unwrap()
}

fn build_question(id: u64, category: Category) -> QuizQuestion {
    QuizQuestion::new(
        QuestionId::new(id),
        format!("question {id}?"),
        [
            "first".into(),
            "second".into(),
            "third".into(),
            "fourth".into(),
        ],
        AnswerOption::C,
        "the third option is right",
        category,
        Difficulty::Beginner,
    )
    .unwrap()
}

#[tokio::test]
async fn sqlite_round_trips_content() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_content?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    let cards = vec![
        build_card(1, Category::core_concepts(), Difficulty::Beginner),
        build_card(2, Category::ethics(), Difficulty::Advanced),
    ];
    repo.replace_flashcards(&cards).await.unwrap();

    let all = repo.list_flashcards(&ContentFilter::any()).await.unwrap();
    assert_eq!(all.len(), 2);

    let filtered = repo
        .list_flashcards(&ContentFilter::any().with_category(Category::ethics()))
        .await
        .unwrap();
    assert_eq!(filtered.len(), 1);
    assert_eq!(filtered[0].id(), CardId::new(2));

    let fetched = repo.get_flashcard(CardId::new(1)).await.unwrap().unwrap();
    assert_eq!(fetched.sanskrit_term(), "term-1");
    assert!(repo.get_flashcard(CardId::new(99)).await.unwrap().is_none());

    let breakdown = repo.category_breakdown().await.unwrap();
    assert_eq!(breakdown[Category::CORE_CONCEPTS], 1);
    assert_eq!(breakdown[Category::ETHICS], 1);
}

#[tokio::test]
async fn sqlite_replace_is_all_or_nothing() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_replace?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    repo.replace_questions(&[
        build_question(1, Category::core_concepts()),
        build_question(2, Category::ethics()),
    ])
    .await
    .unwrap();

    repo.replace_questions(&[build_question(7, Category::practices())])
        .await
        .unwrap();

    let remaining = repo.list_questions(&ContentFilter::any()).await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id(), QuestionId::new(7));
    assert_eq!(remaining[0].correct(), AnswerOption::C);
}

#[tokio::test]
async fn sqlite_progress_upserts_per_user() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_progress?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    let user = UserName::new("Arjuna").unwrap();
    let mut progress = Progress::new(user.clone(), fixed_now());
    progress.record_session_start();
    progress.record_concept_learned(CardId::new(5));

    let record = ProgressRecord::from_progress(&progress, fixed_now()).unwrap();
    repo.save_progress(&record).await.unwrap();

    // Saving again replaces the blob instead of inserting a second row.
    progress.record_session_start();
    let updated = ProgressRecord::from_progress(&progress, fixed_now()).unwrap();
    repo.save_progress(&updated).await.unwrap();

    assert_eq!(repo.count_users().await.unwrap(), 1);
    let loaded = repo
        .load_progress(&user)
        .await
        .unwrap()
        .unwrap()
        .into_progress()
        .unwrap();
    assert_eq!(loaded.total_sessions(), 2);

    let unknown = UserName::new("Nobody").unwrap();
    assert!(repo.load_progress(&unknown).await.unwrap().is_none());
}

#[tokio::test]
async fn sqlite_malformed_progress_blob_surfaces_as_serialization_error() {
    let record = ProgressRecord {
        user_name: "Arjuna".into(),
        blob: r#"{"version": 1, "unexpected": true}"#.into(),
        last_updated: fixed_now(),
    };
    assert!(matches!(
        record.into_progress().unwrap_err(),
        StorageError::Serialization(_)
    ));
}

#[tokio::test]
async fn sqlite_sync_log_keeps_newest_first() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_synclog?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    for (i, status) in ["error", "success"].iter().enumerate() {
        repo.append_sync_log(&SyncLogEntry {
            sync_type: "flashcards".into(),
            status: (*status).to_owned(),
            message: Some(format!("attempt {i}")),
            synced_at: fixed_now() + Duration::seconds(i as i64),
        })
        .await
        .unwrap();
    }

    let logs = repo.recent_sync_logs(10).await.unwrap();
    assert_eq!(logs.len(), 2);
    assert_eq!(logs[0].status, "success");
    assert_eq!(logs[1].status, "error");

    let limited = repo.recent_sync_logs(1).await.unwrap();
    assert_eq!(limited.len(), 1);
}

#[tokio::test]
async fn sqlite_feedback_lifecycle() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_feedback?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    let submission = FeedbackDraft {
        kind: FeedbackKind::Donation,
        name: "Kavi".into(),
        email: "kavi@example.org".into(),
        message: "Happy to support this work.".into(),
        category: None,
        donation_willing: true,
    }
    .validate(fixed_now())
    .unwrap();

    let id = repo.insert_submission(&submission).await.unwrap();
    repo.update_submission_status(id, FeedbackStatus::Resolved)
        .await
        .unwrap();

    let listed = repo.list_submissions().await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].submission.kind, FeedbackKind::Donation);
    assert!(listed[0].submission.donation_willing);
    assert_eq!(listed[0].submission.status, FeedbackStatus::Resolved);

    assert!(matches!(
        repo.update_submission_status(404, FeedbackStatus::Reviewed)
            .await
            .unwrap_err(),
        StorageError::NotFound
    ));
}
