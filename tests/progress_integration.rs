use ninja_quest::{FileStorage, KeyValueStore, PlayerState, ProgressStore};

const KEY: &str = "injective-ninja-quest";

#[test]
fn progress_survives_a_new_store() {
    let dir = tempfile::tempdir().expect("temp dir");

    {
        let mut store = ProgressStore::new(FileStorage::new(dir.path()), KEY);
        store.begin(Some("inj1qy09gsfx3gxqjahumq97elwxqf4qu5agdmqgnu"));
        store.record_chapter_result(1, 30);
        store.record_chapter_result(2, 20);
    }

    let store = ProgressStore::new(FileStorage::new(dir.path()), KEY);
    let player = store.read();
    assert!(player.quest_started);
    assert_eq!(player.display_name, "Ninja dmqgnu");
    assert_eq!(player.score, 50);
    assert_eq!(player.best_score(1), 30);
    assert!(player.has_completed(2));
    assert!(dir.path().join("injective-ninja-quest.json").exists());
}

#[test]
fn reload_sees_writes_from_another_store() {
    let dir = tempfile::tempdir().expect("temp dir");
    let mut reader = ProgressStore::new(FileStorage::new(dir.path()), KEY);
    let mut writer = ProgressStore::new(FileStorage::new(dir.path()), KEY);

    writer.begin(None);
    writer.record_chapter_result(1, 20);

    assert_eq!(reader.read(), &PlayerState::default());
    assert_eq!(reader.reload().score, 20);
}

#[test]
fn corrupt_record_falls_back_to_default() {
    let dir = tempfile::tempdir().expect("temp dir");
    let mut storage = FileStorage::new(dir.path());
    storage.set(KEY, "{ not json").expect("write succeeds");

    let mut store = ProgressStore::new(storage, KEY);
    assert_eq!(store.read(), &PlayerState::default());

    store.begin(None);
    let saved = store.storage().get(KEY).expect("read succeeds").expect("record saved");
    assert!(saved.contains("\"questStarted\":true"));
}

#[test]
fn legacy_ninja_name_records_still_load() {
    let dir = tempfile::tempdir().expect("temp dir");
    let mut storage = FileStorage::new(dir.path());
    let legacy = concat!(
        r#"{"walletAddress":null,"ninjaName":"Guest Ninja","score":30,"#,
        r#""completedChapters":[1],"chapterScores":{"1":30},"questStarted":true}"#,
    );
    storage.set(KEY, legacy).expect("write succeeds");

    let store = ProgressStore::new(storage, KEY);
    assert_eq!(store.read().display_name, "Guest Ninja");
    assert_eq!(store.read().score, 30);
    assert_eq!(store.read().best_score(1), 30);
}

#[test]
fn reset_removes_the_file() {
    let dir = tempfile::tempdir().expect("temp dir");
    let mut store = ProgressStore::new(FileStorage::new(dir.path()), KEY);
    store.begin(None);
    store.record_chapter_result(1, 30);

    store.reset();

    assert!(!dir.path().join("injective-ninja-quest.json").exists());
    let fresh = ProgressStore::new(FileStorage::new(dir.path()), KEY);
    assert_eq!(fresh.read(), &PlayerState::default());
}
