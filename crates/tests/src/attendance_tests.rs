use crate::fixtures::test_app::TestApp;
use serde_json::Value;

fn request_body() -> serde_json::Value {
    serde_json::json!({
        "company": "Test Co",
        "from_date": "2026-03-02",
        "to_date": "2026-03-04",
        "reason": "On Duty",
        "explanation": "Customer site visit",
    })
}

#[tokio::test]
async fn create_lists_missing_mandatory_fields() {
    let app = TestApp::spawn().await;
    let employee = app.seed_employee("alice@test.com", "Alice").await;

    let resp = app
        .auth_post("/api/mobile/v1/attendance-request", &employee.access_token)
        .json(&serde_json::json!({ "reason": "On Duty" }))
        .send()
        .await
        .unwrap();

    // Envelope surface: transport is 200, outcome is in the body
    assert_eq!(resp.status().as_u16(), 200);
    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["code"], 500);
    let message = json["message"].as_str().unwrap();
    assert!(message.contains("company"));
    assert!(message.contains("from_date"));
    assert!(message.contains("to_date"));
    assert!(!message.contains("reason"));
}

#[tokio::test]
async fn create_then_list_reformats_dates() {
    let app = TestApp::spawn().await;
    let employee = app.seed_employee("bob@test.com", "Bob").await;

    let resp = app
        .auth_post("/api/mobile/v1/attendance-request", &employee.access_token)
        .json(&request_body())
        .send()
        .await
        .unwrap();
    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["code"], 200);
    assert!(json["data"]["name"].is_string());

    let resp = app
        .auth_get("/api/mobile/v1/attendance-request", &employee.access_token)
        .send()
        .await
        .unwrap();
    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["code"], 200);
    let requests = json["data"].as_array().unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0]["from_date"], "02-03-2026");
    assert_eq!(requests[0]["to_date"], "04-03-2026");
    assert_eq!(requests[0]["employee_name"], "Bob");
}

#[tokio::test]
async fn update_with_request_id_modifies_in_place() {
    let app = TestApp::spawn().await;
    let employee = app.seed_employee("carol@test.com", "Carol").await;

    let resp = app
        .auth_post("/api/mobile/v1/attendance-request", &employee.access_token)
        .json(&request_body())
        .send()
        .await
        .unwrap();
    let created: Value = resp.json().await.unwrap();
    let request_id = created["data"]["name"].as_str().unwrap().to_string();

    let mut body = request_body();
    body["request_id"] = serde_json::json!(request_id);
    body["reason"] = serde_json::json!("Work From Home");

    let resp = app
        .auth_post("/api/mobile/v1/attendance-request", &employee.access_token)
        .json(&body)
        .send()
        .await
        .unwrap();
    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["code"], 200);
    assert_eq!(json["data"]["reason"], "Work From Home");

    // Still only one request for this employee
    let resp = app
        .auth_get("/api/mobile/v1/attendance-request", &employee.access_token)
        .send()
        .await
        .unwrap();
    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn update_of_foreign_request_is_not_found() {
    let app = TestApp::spawn().await;
    let owner = app.seed_employee("dave@test.com", "Dave").await;
    let intruder = app.seed_employee("eve@test.com", "Eve").await;

    let resp = app
        .auth_post("/api/mobile/v1/attendance-request", &owner.access_token)
        .json(&request_body())
        .send()
        .await
        .unwrap();
    let created: Value = resp.json().await.unwrap();
    let request_id = created["data"]["name"].as_str().unwrap().to_string();

    let mut body = request_body();
    body["request_id"] = serde_json::json!(request_id);

    let resp = app
        .auth_post("/api/mobile/v1/attendance-request", &intruder.access_token)
        .json(&body)
        .send()
        .await
        .unwrap();
    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["code"], 404);
    assert_eq!(json["message"], "Attendance request not found");
}

#[tokio::test]
async fn get_is_scoped_to_own_requests() {
    let app = TestApp::spawn().await;
    let owner = app.seed_employee("frank@test.com", "Frank").await;
    let other = app.seed_employee("grace@test.com", "Grace").await;

    let resp = app
        .auth_post("/api/mobile/v1/attendance-request", &owner.access_token)
        .json(&request_body())
        .send()
        .await
        .unwrap();
    let created: Value = resp.json().await.unwrap();
    let request_id = created["data"]["name"].as_str().unwrap().to_string();

    let path = format!("/api/mobile/v1/attendance-request/{request_id}");
    let resp = app.auth_get(&path, &owner.access_token).send().await.unwrap();
    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["code"], 200);

    let resp = app.auth_get(&path, &other.access_token).send().await.unwrap();
    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["code"], 404);
}

#[tokio::test]
async fn delete_removes_request_by_id() {
    let app = TestApp::spawn().await;
    let employee = app.seed_employee("heidi@test.com", "Heidi").await;

    let resp = app
        .auth_post("/api/mobile/v1/attendance-request", &employee.access_token)
        .json(&request_body())
        .send()
        .await
        .unwrap();
    let created: Value = resp.json().await.unwrap();
    let request_id = created["data"]["name"].as_str().unwrap().to_string();

    let resp = app
        .auth_post(
            &format!("/api/mobile/v1/attendance-request/{request_id}/delete"),
            &employee.access_token,
        )
        .send()
        .await
        .unwrap();
    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["code"], 200);

    let resp = app
        .auth_get("/api/mobile/v1/attendance-request", &employee.access_token)
        .send()
        .await
        .unwrap();
    let json: Value = resp.json().await.unwrap();
    assert!(json["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn requests_require_an_employee_record() {
    let app = TestApp::spawn().await;
    let admin = app.seed_admin("noemployee@test.com", "HR Manager").await;

    let resp = app
        .auth_get("/api/mobile/v1/attendance-request", &admin.access_token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["code"], 404);
    assert_eq!(json["message"], "Employee not found");
}

#[tokio::test]
async fn shift_types_are_listed_by_name() {
    let app = TestApp::spawn().await;
    let employee = app.seed_employee("ivan@test.com", "Ivan").await;
    app.seed_shift_type("Morning").await;
    app.seed_shift_type("Night").await;

    let resp = app
        .auth_get("/api/mobile/v1/shift-type", &employee.access_token)
        .send()
        .await
        .unwrap();
    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["code"], 200);
    let names: Vec<&str> = json["data"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|v| v.as_str())
        .collect();
    assert!(names.contains(&"Morning"));
    assert!(names.contains(&"Night"));
}

#[tokio::test]
async fn mobile_surface_rejects_anonymous_callers() {
    let app = TestApp::spawn().await;

    let resp = app
        .client
        .get(app.url("/api/mobile/v1/attendance-request"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 401);
}
