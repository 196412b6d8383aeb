// tests/store_tests.rs

use std::collections::{HashMap, HashSet};

use quiz_vault::{
    error::AppError,
    models::{
        attributes::{AppAttributes, AttributeKind},
        exam_config::{ExamConfig, SubjectConfig},
        exam_result::{ExamResult, SubjectResult},
        question::{AnswerLetter, Question, QuestionStatus, new_question_id},
        subject::Subject,
    },
    store::Store,
    transfer::{self, SubjectTags, export, json},
};
use sqlx::types::Json;

fn question(subject_id: &str, content: &str) -> Question {
    Question {
        id: new_question_id(),
        subject_id: subject_id.to_string(),
        content: content.to_string(),
        image: None,
        option_a: "a".to_string(),
        option_b: "b".to_string(),
        option_c: "c".to_string(),
        option_d: "d".to_string(),
        option_images: None,
        correct_answer: AnswerLetter::B,
        explanation: None,
        explanation_image: None,
        status: QuestionStatus::Unlearned,
    }
}

/// Root R with children C1, C2 and grandchild G under C1; one question in each.
async fn seeded_tree(store: &Store) -> (Subject, Subject, Subject, Subject) {
    let r = Subject::new("R");
    let c1 = Subject::new("C1").with_parent(&r.id);
    let c2 = Subject::new("C2").with_parent(&r.id);
    let g = Subject::new("G").with_parent(&c1.id);
    store
        .save_subjects(&[r.clone(), c1.clone(), c2.clone(), g.clone()])
        .await
        .unwrap();

    store
        .add_questions(&[
            question(&r.id, "r"),
            question(&c1.id, "c1"),
            question(&c2.id, "c2"),
            question(&g.id, "g"),
        ])
        .await
        .unwrap();
    (r, c1, c2, g)
}

#[tokio::test]
async fn recursive_pool_covers_whole_subtree_once() {
    let store = Store::in_memory();
    let (r, c1, _c2, _g) = seeded_tree(&store).await;

    let pool = store.get_questions_by_subject_recursive(&r.id).await.unwrap();
    let contents: HashSet<String> = pool.iter().map(|q| q.content.clone()).collect();
    assert_eq!(pool.len(), 4);
    assert_eq!(contents, HashSet::from(["r", "c1", "c2", "g"].map(String::from)));
    assert_eq!(pool[0].content, "r");

    let sub = store.get_questions_by_subject_recursive(&c1.id).await.unwrap();
    let mut sub: Vec<String> = sub.into_iter().map(|q| q.content).collect();
    sub.sort();
    assert_eq!(sub, ["c1", "g"]);
}

#[tokio::test]
async fn recursive_pool_of_leaf_equals_direct_lookup() {
    let store = Store::in_memory();
    let (_r, _c1, c2, _g) = seeded_tree(&store).await;

    let direct = store.get_questions_by_subject(&c2.id).await.unwrap();
    let recursive = store.get_questions_by_subject_recursive(&c2.id).await.unwrap();
    assert_eq!(direct, recursive);
}

#[tokio::test]
async fn cascading_delete_removes_subtree_only() {
    let store = Store::in_memory();
    let (r, c1, c2, g) = seeded_tree(&store).await;
    let other = Subject::new("Other");
    store.save_subjects(&[other.clone()]).await.unwrap();
    store.add_questions(&[question(&other.id, "other")]).await.unwrap();

    store.delete_subject(&c1.id).await.unwrap();

    let ids: HashSet<String> = store
        .get_subjects()
        .await
        .unwrap()
        .into_iter()
        .map(|s| s.id)
        .collect();
    assert_eq!(ids, HashSet::from([r.id.clone(), c2.id.clone(), other.id.clone()]));
    assert!(store.get_questions_by_subject(&g.id).await.unwrap().is_empty());
    assert!(store.get_questions_by_subject(&c1.id).await.unwrap().is_empty());
    assert_eq!(store.get_all_questions().await.unwrap().len(), 3);

    store.delete_subject(&r.id).await.unwrap();
    let remaining = store.get_subjects().await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id, other.id);
    assert_eq!(store.get_all_questions().await.unwrap().len(), 1);
}

#[tokio::test]
async fn cyclic_hierarchy_aborts_delete_before_any_change() {
    let store = Store::in_memory();
    let mut x = Subject::new("X");
    let y = Subject::new("Y").with_parent(&x.id);
    x.parent_id = Some(y.id.clone());
    store.save_subjects(&[x.clone(), y.clone()]).await.unwrap();
    store.add_questions(&[question(&y.id, "y")]).await.unwrap();

    let err = store.delete_subject(&x.id).await.unwrap_err();
    assert!(matches!(err, AppError::Integrity(_)));
    assert_eq!(store.get_subjects().await.unwrap().len(), 2);
    assert_eq!(store.get_all_questions().await.unwrap().len(), 1);

    // Reads stay usable.
    let pool = store.get_questions_by_subject_recursive(&x.id).await.unwrap();
    assert_eq!(pool.len(), 1);
}

#[tokio::test]
async fn saving_same_question_twice_is_idempotent() {
    let store = Store::in_memory();
    let s = Subject::new("S");
    store.save_subjects(&[s.clone()]).await.unwrap();

    let mut q = question(&s.id, "first");
    store.save_questions(&[q.clone()]).await.unwrap();
    store.save_questions(&[q.clone()]).await.unwrap();
    assert_eq!(store.get_all_questions().await.unwrap(), vec![q.clone()]);

    q.content = "second".to_string();
    store.save_questions(&[q.clone()]).await.unwrap();
    assert_eq!(store.get_question(&q.id).await.unwrap(), Some(q));
}

#[tokio::test]
async fn adding_questions_bumps_owner_counter() {
    let store = Store::in_memory();
    let s = Subject::new("Anatomy");
    store.save_subjects(&[s.clone()]).await.unwrap();

    let batch: Vec<Question> = (0..3).map(|i| question(&s.id, &format!("q{i}"))).collect();
    store.add_questions(&batch).await.unwrap();
    store.add_questions(&[question(&s.id, "q3")]).await.unwrap();

    let stored = store.get_subject(&s.id).await.unwrap().unwrap();
    assert_eq!(stored.total_questions, 4);
}

#[tokio::test]
async fn exam_configs_round_trip_and_delete() {
    let store = Store::in_memory();
    let config = ExamConfig {
        id: "exam-1".to_string(),
        name: "Midterm".to_string(),
        exam_type: "Final exam".to_string(),
        level: "Undergraduate".to_string(),
        subjects: Json(vec![
            SubjectConfig {
                subject_id: "a".to_string(),
                subject_name: "A".to_string(),
                count: 2,
                time: 5,
            },
            SubjectConfig {
                subject_id: "b".to_string(),
                subject_name: "B".to_string(),
                count: 3,
                time: 10,
            },
        ]),
    };
    store.save_exam_config(&config).await.unwrap();
    assert_eq!(store.get_exam_configs().await.unwrap(), vec![config.clone()]);

    store.delete_exam_config("exam-1").await.unwrap();
    store.delete_exam_config("exam-1").await.unwrap();
    assert!(store.get_exam_config("exam-1").await.unwrap().is_none());
}

fn result(id: &str, date: i64) -> ExamResult {
    ExamResult {
        id: id.to_string(),
        name: "Quiz".to_string(),
        date,
        is_multi_subject: false,
        total_passed: true,
        subject_results: Json(vec![SubjectResult::scored("s", "S", 1, 1)]),
        questions: Json(vec![question("s", "only")]),
        user_answers: Json(HashMap::from([("x".to_string(), AnswerLetter::B)])),
        original_config: None,
    }
}

#[tokio::test]
async fn results_are_immutable_and_listed_newest_first() {
    let store = Store::in_memory();
    store.save_result(&result("100", 100)).await.unwrap();
    store.save_result(&result("200", 200)).await.unwrap();

    let err = store.save_result(&result("100", 300)).await.unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    let history = store.get_history().await.unwrap();
    let ids: Vec<&str> = history.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, ["200", "100"]);
    assert_eq!(history[1].date, 100);
    assert_eq!(store.get_result("200").await.unwrap(), Some(result("200", 200)));
}

#[tokio::test]
async fn attributes_default_until_saved_and_after_wipe() {
    let store = Store::in_memory();
    assert_eq!(store.get_attributes().await, AppAttributes::default());

    let mut attrs = store.get_attributes().await;
    assert!(attrs.add(AttributeKind::Levels, "Residency").unwrap());
    store.save_attributes(&attrs).await.unwrap();
    assert_eq!(store.get_attributes().await, attrs);

    seeded_tree(&store).await;
    store.save_result(&result("1", 1)).await.unwrap();
    store.clear_all_data().await.unwrap();

    assert!(store.get_subjects().await.unwrap().is_empty());
    assert!(store.get_all_questions().await.unwrap().is_empty());
    assert!(store.get_history().await.unwrap().is_empty());
    assert!(store.get_exam_configs().await.unwrap().is_empty());
    assert_eq!(store.get_attributes().await, AppAttributes::default());
}

#[tokio::test]
async fn json_import_then_export_reproduces_pack() {
    let store = Store::in_memory();
    let pack = serde_json::json!({
        "Anatomy": {
            "1": { "Q": "Largest bone?", "1": "Femur", "2": "Tibia", "3": "Ulna", "4": "Radius", "A": "A", "explain": "Thigh" },
            "Bones": {
                "1": { "Q": "Hand bones?", "1": "27", "2": "12", "3": "8", "4": "5", "A": "A", "explain": "" }
            }
        }
    });
    let tags = SubjectTags { exam_type: None, level: None, category: None };

    let plan = json::plan(&pack, &store.get_subjects().await.unwrap(), &tags).unwrap();
    let summary = transfer::apply(&store, plan).await.unwrap();
    assert_eq!(summary.subjects_created, 2);
    assert_eq!(summary.questions_imported, 2);

    let subjects = store.get_subjects().await.unwrap();
    assert!(subjects.iter().all(|s| s.total_questions == 1));

    let exported = export::export_tree(&subjects, &store.get_all_questions().await.unwrap()).unwrap();
    assert_eq!(exported, pack);

    // Importing again reuses both subjects and only adds questions.
    let plan = json::plan(&pack, &subjects, &tags).unwrap();
    let summary = transfer::apply(&store, plan).await.unwrap();
    assert_eq!(summary.subjects_created, 0);
    assert_eq!(summary.subjects_reused, 2);
    assert_eq!(store.get_subjects().await.unwrap().len(), 2);
    assert_eq!(store.get_all_questions().await.unwrap().len(), 4);
}
