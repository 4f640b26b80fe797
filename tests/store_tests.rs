use chrono::NaiveDate;
use std::fs;
use task_calendar::{
    DragIntent, DropTarget, InMemoryTaskStore, NewTask, StoreError, Task, TaskPatch, TaskStore,
    load_tasks_from_csv, load_tasks_from_json, save_tasks_to_csv, save_tasks_to_json,
};
use tempfile::tempdir;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

fn titles_on<S: TaskStore>(store: &S, day: NaiveDate) -> Vec<String> {
    store
        .tasks_on(day)
        .unwrap()
        .into_iter()
        .map(|t| t.title)
        .collect()
}

fn seed<S: TaskStore>(store: &mut S) -> Vec<Task> {
    let monday = date(2025, 3, 10);
    ["Plan", "Write", "Review"]
        .into_iter()
        .map(|title| store.insert_task(NewTask::new(title, monday)).unwrap())
        .collect()
}

fn exercise_store<S: TaskStore>(store: &mut S) {
    let monday = date(2025, 3, 10);
    let tuesday = date(2025, 3, 11);
    let seeded = seed(store);
    let orders: Vec<u32> = seeded.iter().map(|t| t.order).collect();
    assert_eq!(orders, vec![0, 1, 2]);

    // Reorder within the day.
    let plan = store
        .drop_task(&DragIntent::for_task(&seeded[0], 0), &DropTarget::onto(monday, 2))
        .unwrap();
    assert_eq!(plan.deltas.len(), 3);
    assert_eq!(titles_on(store, monday), vec!["Write", "Review", "Plan"]);

    // Move to another day; the source day closes the gap.
    let write = store.find_task(&seeded[1].id).unwrap().unwrap();
    store
        .drop_task(&DragIntent::for_task(&write, 0), &DropTarget::end_of_day(tuesday))
        .unwrap();
    assert_eq!(titles_on(store, monday), vec!["Review", "Plan"]);
    assert_eq!(titles_on(store, tuesday), vec!["Write"]);
    let monday_orders: Vec<u32> = store.tasks_on(monday).unwrap().iter().map(|t| t.order).collect();
    assert_eq!(monday_orders, vec![0, 1]);

    // Stale intents leave the store untouched.
    let before = store.tasks().unwrap();
    let err = store
        .drop_task(&DragIntent::for_task(&write, 0), &DropTarget::end_of_day(monday))
        .unwrap_err();
    assert!(matches!(err, StoreError::Order(_)));
    assert_eq!(store.tasks().unwrap().len(), before.len());

    // Editing never touches ordering.
    let updated = store
        .update_task(
            &write.id,
            &TaskPatch {
                title: Some("  Write draft ".into()),
                description: Some("chapter two".into()),
                completed: None,
            },
        )
        .unwrap();
    assert_eq!(updated.title, "Write draft");
    assert_eq!(updated.description.as_deref(), Some("chapter two"));
    assert_eq!(updated.order, 0);
    let err = store
        .update_task(&write.id, &TaskPatch { title: Some("   ".into()), ..TaskPatch::default() })
        .unwrap_err();
    assert!(matches!(err, StoreError::Validation(_)));

    let toggled = store.toggle_completed(&write.id).unwrap();
    assert!(toggled.completed);
    assert!(!store.toggle_completed(&write.id).unwrap().completed);

    // Removing renumbers the remaining tasks.
    let review = store.tasks_on(monday).unwrap().remove(0);
    let removed = store.remove_task(&review.id).unwrap();
    assert_eq!(removed.title, "Review");
    let remaining = store.tasks_on(monday).unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].order, 0);

    assert!(matches!(store.remove_task("missing"), Err(StoreError::NotFound(_))));
    assert!(matches!(store.toggle_completed("missing"), Err(StoreError::NotFound(_))));
}

#[test]
fn in_memory_store_keeps_days_dense() {
    let mut store = InMemoryTaskStore::new();
    exercise_store(&mut store);
    assert_eq!(store.len(), 2);
}

#[cfg(feature = "sqlite")]
#[test]
fn sqlite_store_keeps_days_dense() {
    let mut store = task_calendar::SqliteTaskStore::in_memory().unwrap();
    exercise_store(&mut store);
    assert_eq!(store.tasks().unwrap().len(), 2);
}

#[cfg(feature = "sqlite")]
#[test]
fn sqlite_store_persists_between_connections() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("tasks.db");
    let id = {
        let mut store = task_calendar::SqliteTaskStore::new(&path).unwrap();
        seed(&mut store)[1].id.clone()
    };
    let store = task_calendar::SqliteTaskStore::new(&path).unwrap();
    let task = store.find_task(&id).unwrap().unwrap();
    assert_eq!(task.title, "Write");
    assert_eq!(task.order, 1);
    assert_eq!(store.tasks().unwrap().len(), 3);
}

#[cfg(feature = "sqlite")]
#[test]
fn sqlite_removal_deletes_and_renumbers_in_one_commit() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("tasks.db");
    {
        let mut store = task_calendar::SqliteTaskStore::new(&path).unwrap();
        let seeded = seed(&mut store);
        store.remove_task(&seeded[0].id).unwrap();
    }
    let store = task_calendar::SqliteTaskStore::new(&path).unwrap();
    let monday = store.tasks_on(date(2025, 3, 10)).unwrap();
    let listed: Vec<(&str, u32)> = monday.iter().map(|t| (t.title.as_str(), t.order)).collect();
    assert_eq!(listed, vec![("Write", 0), ("Review", 1)]);
}

#[test]
fn inserted_tasks_get_unique_ids() {
    let mut store = InMemoryTaskStore::new();
    let tasks = seed(&mut store);
    assert_ne!(tasks[0].id, tasks[1].id);
    let err = store
        .insert_task(NewTask::new(" ", date(2025, 3, 10)))
        .unwrap_err();
    assert!(matches!(err, StoreError::Validation(_)));
    assert_eq!(store.len(), 3);
}

#[test]
fn from_tasks_rejects_broken_sequences() {
    let d = date(2025, 3, 10);
    let tasks = vec![Task::new("a", "A", d, 0), Task::new("b", "B", d, 2)];
    assert!(matches!(
        InMemoryTaskStore::from_tasks(tasks),
        Err(StoreError::Validation(_))
    ));

    let dupes = vec![Task::new("a", "A", d, 0), Task::new("a", "B", d, 1)];
    assert!(InMemoryTaskStore::from_tasks(dupes).is_err());
}

#[test]
fn json_snapshot_round_trip() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("tasks.json");
    let mut store = InMemoryTaskStore::new();
    seed(&mut store);
    let first = store.as_slice()[0].id.clone();
    store
        .update_task(&first, &TaskPatch { description: Some("notes".into()), ..TaskPatch::default() })
        .unwrap();

    save_tasks_to_json(store.as_slice(), &path).unwrap();
    let raw = fs::read_to_string(&path).unwrap();
    assert!(raw.contains("\"tasks\""));

    let loaded = load_tasks_from_json(&path).unwrap();
    assert_eq!(loaded, store.as_slice());
}

#[test]
fn csv_round_trip_keeps_descriptions_and_flags() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("tasks.csv");
    let d = date(2025, 3, 10);
    let tasks = vec![
        Task::new("a", "Plan, then write", d, 0).with_description("quotes \"inside\""),
        {
            let mut task = Task::new("b", "Review", d, 1);
            task.completed = true;
            task
        },
    ];
    save_tasks_to_csv(&tasks, &path).unwrap();
    let loaded = load_tasks_from_csv(&path).unwrap();
    assert_eq!(loaded, tasks);
}

#[test]
fn loading_invalid_files_fails() {
    let dir = tempdir().unwrap();
    let csv_path = dir.path().join("bad.csv");
    fs::write(
        &csv_path,
        "id,title,description,date,completed,order\na,A,,2025-13-01,false,0\n",
    )
    .unwrap();
    assert!(matches!(
        load_tasks_from_csv(&csv_path),
        Err(StoreError::InvalidData(_))
    ));

    let json_path = dir.path().join("gap.json");
    fs::write(
        &json_path,
        r#"{"tasks":[{"id":"a","title":"A","date":"2025-03-10","order":1}]}"#,
    )
    .unwrap();
    assert!(matches!(
        load_tasks_from_json(&json_path),
        Err(StoreError::Validation(_))
    ));

    assert!(matches!(
        load_tasks_from_json(dir.path().join("missing.json")),
        Err(StoreError::Io(_))
    ));
}

#[test]
fn csv_descriptions_are_trimmed_like_json() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("hand_edited.csv");
    fs::write(
        &path,
        "id,title,description,date,completed,order\na,Plan,\" notes \",2025-03-10,false,0\nb,Write,\"   \",2025-03-10,true,1\n",
    )
    .unwrap();
    let loaded = load_tasks_from_csv(&path).unwrap();
    assert_eq!(loaded[0].description.as_deref(), Some("notes"));
    assert_eq!(loaded[1].description, None);
    assert!(loaded[1].completed);
}
