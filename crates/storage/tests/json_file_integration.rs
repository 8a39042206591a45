use quiz_core::model::{Answer, Difficulty, Question, QuestionDraft};
use storage::json_file::JsonFileStore;
use storage::repository::{QuestionStore, StorageError};

fn build_question(n: usize) -> Question {
    QuestionDraft {
        id: format!("q-{n}"),
        prompt: format!("Question {n}"),
        difficulty: Difficulty::Hard,
        answers: vec![
            Answer::new("right", true),
            Answer::new("wrong 1", false),
            Answer::new("wrong 2", false),
            Answer::new("wrong 3", false),
        ],
    }
    .validate()
    .unwrap()
}

#[tokio::test]
async fn json_file_round_trips_questions() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = JsonFileStore::new(dir.path().join("questions.json"));

    let questions = vec![build_question(1), build_question(2)];
    store.save(&questions).await.expect("save");

    let fetched = store.load().await.expect("load");
    assert_eq!(fetched, questions);
}

#[tokio::test]
async fn json_file_save_is_idempotent() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = JsonFileStore::new(dir.path().join("questions.json"));

    let questions = vec![build_question(1)];
    store.save(&questions).await.expect("first save");
    let first = std::fs::read(store.path()).expect("read file");

    store.save(&questions).await.expect("second save");
    let second = std::fs::read(store.path()).expect("read file again");

    assert_eq!(first, second);
    assert_eq!(store.load().await.expect("load"), questions);
}

#[tokio::test]
async fn json_file_writes_pretty_two_space_json() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = JsonFileStore::new(dir.path().join("questions.json"));
    store.save(&[build_question(1)]).await.expect("save");

    let text = std::fs::read_to_string(store.path()).expect("read file");
    assert!(text.starts_with("[\n  {"));
    assert!(text.contains("\"difficulty\": \"hard\""));
}

#[tokio::test]
async fn json_file_creates_missing_parent_directories() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = JsonFileStore::new(dir.path().join("nested/data/questions.json"));
    store.save(&[build_question(1)]).await.expect("save");
    assert_eq!(store.load().await.expect("load").len(), 1);
}

#[tokio::test]
async fn missing_file_reports_not_found() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = JsonFileStore::new(dir.path().join("missing.json"));
    let err = store.load().await.unwrap_err();
    assert!(matches!(err, StorageError::NotFound));
}

#[tokio::test]
async fn invalid_stored_question_is_rejected_on_load() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("questions.json");
    std::fs::write(
        &path,
        r#"[{"id":"q-1","prompt":"p","difficulty":"easy","answers":[
            {"text":"a","correct":true},{"text":"b","correct":true},
            {"text":"c","correct":false},{"text":"d","correct":false}]}]"#,
    )
    .expect("write fixture");

    let store = JsonFileStore::new(path);
    let err = store.load().await.unwrap_err();
    assert!(matches!(err, StorageError::InvalidQuestion(_)));
}
