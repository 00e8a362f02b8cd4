use quiz_generator::ai::FixtureModel;
use quiz_generator::limiter::Unlimited;
use quiz_generator::models::Category;
use quiz_generator::routes::build_router;
use quiz_generator::state::AppState;
use quiz_generator::store::InMemoryQuizStore;
use serde_json::{json, Value};
use std::sync::Arc;

async fn spawn_server(model: FixtureModel) -> (String, reqwest::Client) {
    let state = AppState::new(
        Arc::new(model),
        Arc::new(Unlimited),
        Arc::new(InMemoryQuizStore::new()),
        vec!["http://localhost:5173".into()],
    );
    let app = build_router(state);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{}", addr), reqwest::Client::new())
}

async fn generate(base: &str, client: &reqwest::Client, body: Value) -> reqwest::Response {
    client
        .post(format!("{}/api/quiz/generate", base))
        .json(&body)
        .send()
        .await
        .unwrap()
}

#[tokio::test]
async fn photosynthesis_quiz_end_to_end() {
    let (base, client) = spawn_server(FixtureModel::new()).await;

    let resp = generate(
        &base,
        &client,
        json!({"topic": "Photosynthesis", "difficulty": "Easy", "mcqs": 2, "bool": 1, "oneLine": 0, "para": 0}),
    )
    .await;
    assert_eq!(resp.status(), 201);
    let body = resp.json::<Value>().await.unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Quiz generated successfully");

    let quiz = &body["data"];
    assert_eq!(quiz["totalQuestions"], 3);
    assert_eq!(quiz["difficulty"], "Easy");
    assert_eq!(quiz["questions"]["mcqs"].as_array().unwrap().len(), 2);
    assert_eq!(quiz["questions"]["trueFalse"].as_array().unwrap().len(), 1);
    assert_eq!(quiz["questions"]["oneLiner"].as_array().unwrap().len(), 0);
    assert_eq!(quiz["questions"]["paragraph"].as_array().unwrap().len(), 0);
    assert_eq!(quiz["questions"]["mcqs"][0]["options"].as_array().unwrap().len(), 4);

    let id = quiz["id"].as_i64().unwrap();
    let fetched = client
        .get(format!("{}/api/quiz/{}", base, id))
        .send()
        .await
        .unwrap();
    assert_eq!(fetched.status(), 200);
    assert_eq!(fetched.json::<Value>().await.unwrap()["data"], *quiz);
}

#[tokio::test]
async fn missing_fields_and_zero_counts_are_rejected() {
    let (base, client) = spawn_server(FixtureModel::new()).await;

    let zero = generate(&base, &client, json!({"topic": "Rust", "difficulty": "hard"})).await;
    assert_eq!(zero.status(), 400);
    let body = zero.json::<Value>().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "At least one question type must be selected");

    let no_topic = generate(&base, &client, json!({"difficulty": "hard", "mcqs": 1})).await;
    assert_eq!(no_topic.status(), 400);
    assert_eq!(
        no_topic.json::<Value>().await.unwrap()["message"],
        "Topic and difficulty are required"
    );
}

#[tokio::test]
async fn large_counts_and_custom_difficulty_are_accepted() {
    let (base, client) = spawn_server(FixtureModel::new()).await;

    let resp = generate(
        &base,
        &client,
        json!({"topic": "Rivers", "difficulty": "Beginner", "mcqs": 60}),
    )
    .await;
    assert_eq!(resp.status(), 201);
    let quiz = resp.json::<Value>().await.unwrap()["data"].clone();
    assert_eq!(quiz["totalQuestions"], 60);
    assert_eq!(quiz["difficulty"], "Beginner");
}

#[tokio::test]
async fn multiple_choice_reply_is_stored_verbatim() {
    let reply = r#"[{"question":"Q1","options":["a","b","c","d"],"answer":"3","type":"mcqs"},{"question":"Q2","options":["a","b","c","d"],"answer":2,"type":"mcqs"}]"#;
    let model = FixtureModel::new().with_reply(Category::MultipleChoice, reply);
    let (base, client) = spawn_server(model).await;

    let resp = generate(&base, &client, json!({"topic": "Letters", "difficulty": "easy", "mcqs": 2})).await;
    assert_eq!(resp.status(), 201);
    let quiz = resp.json::<Value>().await.unwrap()["data"].clone();
    let mcqs = quiz["questions"]["mcqs"].as_array().unwrap();
    assert_eq!(mcqs.len(), 2);
    assert_eq!(mcqs[0]["answer"], "3");
    assert_eq!(mcqs[1]["answer"], 2);
}

#[tokio::test]
async fn failed_category_still_counts_toward_total() {
    let model = FixtureModel::new().with_failure(Category::ShortAnswer, "model overloaded");
    let (base, client) = spawn_server(model).await;

    let resp = generate(
        &base,
        &client,
        json!({"topic": "Volcanoes", "difficulty": "medium", "oneLine": 3, "para": 1}),
    )
    .await;
    assert_eq!(resp.status(), 201);
    let quiz = resp.json::<Value>().await.unwrap()["data"].clone();
    assert_eq!(quiz["totalQuestions"], 4);
    assert_eq!(quiz["questions"]["oneLiner"].as_array().unwrap().len(), 0);
    assert_eq!(quiz["questions"]["paragraph"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn list_get_delete_lifecycle() {
    let (base, client) = spawn_server(FixtureModel::new()).await;

    let mut ids = Vec::new();
    for topic in ["First", "Second", "Third"] {
        let resp = generate(&base, &client, json!({"topic": topic, "difficulty": "easy", "para": 1})).await;
        ids.push(resp.json::<Value>().await.unwrap()["data"]["id"].as_i64().unwrap());
    }

    let list = client.get(format!("{}/api/quiz", base)).send().await.unwrap();
    assert_eq!(list.status(), 200);
    let listed: Vec<i64> = list.json::<Value>().await.unwrap()["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|q| q["id"].as_i64().unwrap())
        .collect();
    assert_eq!(listed, vec![ids[2], ids[1], ids[0]]);

    let deleted = client
        .delete(format!("{}/api/quiz/{}", base, ids[1]))
        .send()
        .await
        .unwrap();
    assert_eq!(deleted.status(), 200);
    assert_eq!(
        deleted.json::<Value>().await.unwrap()["message"],
        "Quiz deleted successfully"
    );

    let again = client
        .delete(format!("{}/api/quiz/{}", base, ids[1]))
        .send()
        .await
        .unwrap();
    assert_eq!(again.status(), 404);

    let gone = client
        .get(format!("{}/api/quiz/{}", base, ids[1]))
        .send()
        .await
        .unwrap();
    assert_eq!(gone.status(), 404);
}

#[tokio::test]
async fn score_submitted_answers() {
    let (base, client) = spawn_server(FixtureModel::new()).await;

    let resp = generate(
        &base,
        &client,
        json!({"topic": "Cells", "difficulty": "easy", "mcqs": 2, "bool": 2}),
    )
    .await;
    let quiz = resp.json::<Value>().await.unwrap()["data"].clone();
    let id = quiz["id"].as_i64().unwrap();
    let correct_mcq = quiz["questions"]["mcqs"][0]["answer"].as_u64().unwrap();
    let correct_tf = quiz["questions"]["trueFalse"][0]["answer"].as_str().unwrap().to_string();

    let scored = client
        .post(format!("{}/api/quiz/{}/score", base, id))
        .json(&json!({"mcqs": [correct_mcq, null], "trueFalse": [correct_tf]}))
        .send()
        .await
        .unwrap();
    assert_eq!(scored.status(), 200);
    let report = scored.json::<Value>().await.unwrap()["data"].clone();
    assert_eq!(report["score"], 2);
    assert_eq!(report["totalQuestions"], 4);
    assert_eq!(report["percentage"], 50);
    assert_eq!(report["grade"], "C+");

    let missing = client
        .post(format!("{}/api/quiz/9999/score", base))
        .json(&json!({}))
        .send()
        .await
        .unwrap();
    assert_eq!(missing.status(), 404);
}

#[tokio::test]
async fn health_check() {
    let (base, client) = spawn_server(FixtureModel::new()).await;
    let resp = client.get(format!("{}/api/health", base)).send().await.unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.json::<Value>().await.unwrap()["success"], true);
}
