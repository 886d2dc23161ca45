use crate::fixtures::test_app::TestApp;
use bson::oid::ObjectId;
use chrono::Duration;
use esshub_services::dao::NotificationRuleDao;
use serde_json::Value;

fn rule_body() -> serde_json::Value {
    serde_json::json!({
        "name": "Attendance Heads Up",
        "document_type": "Attendance Request",
        "event": "Days Before",
        "subject": "Upcoming attendance for {{doc.employee_name}}",
        "message": "Starts on {{doc.from_date}}",
        "date_field": "from_date",
        "days_in_advance": 3,
        "recipients": [
            { "condition": null, "kind": "role", "role": "HR Manager" }
        ],
    })
}

#[tokio::test]
async fn rule_creation_requires_admin_role() {
    let app = TestApp::spawn().await;
    let employee = app.seed_employee("worker@test.com", "Worker").await;

    let resp = app
        .auth_post("/api/notification-rule", &employee.access_token)
        .json(&rule_body())
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 403);
}

#[tokio::test]
async fn admin_creates_and_reads_rule() {
    let app = TestApp::spawn().await;
    let admin = app.seed_admin("hr@test.com", "HR Manager").await;

    let resp = app
        .auth_post("/api/notification-rule", &admin.access_token)
        .json(&rule_body())
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 201);
    let created: Value = resp.json().await.unwrap();
    let rule_id = created["id"].as_str().unwrap();
    assert_eq!(created["name"], "Attendance Heads Up");
    assert_eq!(created["event"], "Days Before");

    let resp = app
        .auth_get(&format!("/api/notification-rule/{rule_id}"), &admin.access_token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    let fetched: Value = resp.json().await.unwrap();
    assert_eq!(fetched["document_type"], "Attendance Request");
}

#[tokio::test]
async fn malformed_template_blocks_the_save() {
    let app = TestApp::spawn().await;
    let admin = app.seed_admin("hr2@test.com", "HR Manager").await;

    let mut body = rule_body();
    body["message"] = serde_json::json!("Starts on {{#if doc.from_date}}never closed");

    let resp = app
        .auth_post("/api/notification-rule", &admin.access_token)
        .json(&body)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 422);
    let json: Value = resp.json().await.unwrap();
    assert!(json["message"].as_str().unwrap().contains("template"));
}

#[tokio::test]
async fn time_based_rule_requires_a_date_field() {
    let app = TestApp::spawn().await;
    let admin = app.seed_admin("hr3@test.com", "HR Manager").await;

    let mut body = rule_body();
    body["date_field"] = serde_json::json!(null);

    let resp = app
        .auth_post("/api/notification-rule", &admin.access_token)
        .json(&body)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 422);
    let json: Value = resp.json().await.unwrap();
    assert!(json["message"].as_str().unwrap().contains("date field"));
}

#[tokio::test]
async fn value_change_rule_requires_a_value_field() {
    let app = TestApp::spawn().await;
    let admin = app.seed_admin("hr4@test.com", "HR Manager").await;

    let body = serde_json::json!({
        "document_type": "Attendance Request",
        "event": "Value Change",
        "subject": "Changed",
        "message": "Changed",
    });

    let resp = app
        .auth_post("/api/notification-rule", &admin.access_token)
        .json(&body)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 422);
}

#[tokio::test]
async fn invalid_condition_blocks_the_save() {
    let app = TestApp::spawn().await;
    let admin = app.seed_admin("hr5@test.com", "HR Manager").await;

    let mut body = rule_body();
    body["condition"] = serde_json::json!("doc.status === 'Open'");

    let resp = app
        .auth_post("/api/notification-rule", &admin.access_token)
        .json(&body)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 422);
    let json: Value = resp.json().await.unwrap();
    assert!(json["message"].as_str().unwrap().contains("invalid"));
}

#[tokio::test]
async fn empty_name_defaults_to_subject() {
    let app = TestApp::spawn().await;
    let admin = app.seed_admin("hr6@test.com", "HR Manager").await;

    let mut body = rule_body();
    body["name"] = serde_json::json!("");
    body["subject"] = serde_json::json!("Plain subject");

    let resp = app
        .auth_post("/api/notification-rule", &admin.access_token)
        .json(&body)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 201);
    let created: Value = resp.json().await.unwrap();
    assert_eq!(created["name"], "Plain subject");
}

#[tokio::test]
async fn update_replaces_fields_but_keeps_the_creation_timestamp() {
    let app = TestApp::spawn().await;
    let admin = app.seed_admin("hr9@test.com", "HR Manager").await;

    let resp = app
        .auth_post("/api/notification-rule", &admin.access_token)
        .json(&rule_body())
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 201);
    let created: Value = resp.json().await.unwrap();
    let rule_id = created["id"].as_str().unwrap().to_string();

    let rules = NotificationRuleDao::new(&app.db);
    let oid = ObjectId::parse_str(&rule_id).unwrap();
    let before = rules.base.find_by_id(oid).await.unwrap();

    let mut body = rule_body();
    body["subject"] = serde_json::json!("Rescheduled for {{doc.employee_name}}");
    let resp = app
        .auth_put(&format!("/api/notification-rule/{rule_id}"), &admin.access_token)
        .json(&body)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    let updated: Value = resp.json().await.unwrap();
    assert_eq!(updated["subject"], "Rescheduled for {{doc.employee_name}}");

    let after = rules.base.find_by_id(oid).await.unwrap();
    assert_eq!(after.subject, "Rescheduled for {{doc.employee_name}}");
    assert_eq!(after.created_at, before.created_at);
}

#[tokio::test]
async fn documents_for_today_matches_offset_records() {
    let app = TestApp::spawn().await;
    let admin = app.seed_admin("hr7@test.com", "HR Manager").await;
    let employee = app.seed_employee("judy@test.com", "Judy").await;

    // Days Before 3: a request starting three days from now matches today
    let matching_date = (chrono::Local::now().date_naive() + Duration::days(3))
        .format("%Y-%m-%d")
        .to_string();
    let other_date = (chrono::Local::now().date_naive() + Duration::days(10))
        .format("%Y-%m-%d")
        .to_string();

    for from_date in [&matching_date, &other_date] {
        let resp = app
            .auth_post("/api/mobile/v1/attendance-request", &employee.access_token)
            .json(&serde_json::json!({
                "company": "Test Co",
                "from_date": from_date,
                "to_date": from_date,
                "reason": "On Duty",
            }))
            .send()
            .await
            .unwrap();
        let json: Value = resp.json().await.unwrap();
        assert_eq!(json["code"], 200);
    }

    let resp = app
        .auth_post("/api/notification-rule", &admin.access_token)
        .json(&rule_body())
        .send()
        .await
        .unwrap();
    let created: Value = resp.json().await.unwrap();
    let rule_id = created["id"].as_str().unwrap();

    let resp = app
        .auth_get(
            &format!("/api/notification-rule/{rule_id}/documents-for-today"),
            &admin.access_token,
        )
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    let ids: Vec<Value> = resp.json().await.unwrap();
    assert_eq!(ids.len(), 1);
}

#[tokio::test]
async fn delete_removes_the_rule() {
    let app = TestApp::spawn().await;
    let admin = app.seed_admin("hr8@test.com", "System Manager").await;

    let resp = app
        .auth_post("/api/notification-rule", &admin.access_token)
        .json(&rule_body())
        .send()
        .await
        .unwrap();
    let created: Value = resp.json().await.unwrap();
    let rule_id = created["id"].as_str().unwrap().to_string();

    let resp = app
        .auth_delete(&format!("/api/notification-rule/{rule_id}"), &admin.access_token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);

    let resp = app
        .auth_get(&format!("/api/notification-rule/{rule_id}"), &admin.access_token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 404);
}
