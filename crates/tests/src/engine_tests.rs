use crate::fixtures::test_app::TestApp;
use bson::oid::ObjectId;
use esshub_services::dao::{NotificationLogDao, NotificationRuleDao};
use serde_json::Value;

/// Create or update an attendance request over the mobile surface and
/// return the response envelope.
async fn submit_request(
    app: &TestApp,
    token: &str,
    request_id: Option<&str>,
    reason: &str,
) -> Value {
    let mut body = serde_json::json!({
        "company": "Test Co",
        "from_date": "2026-09-10",
        "to_date": "2026-09-11",
        "reason": reason,
    });
    if let Some(id) = request_id {
        body["request_id"] = serde_json::json!(id);
    }
    app.auth_post("/api/mobile/v1/attendance-request", token)
        .json(&body)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap()
}

async fn create_rule(app: &TestApp, token: &str, body: &Value) -> String {
    let resp = app
        .auth_post("/api/notification-rule", token)
        .json(body)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 201);
    let created: Value = resp.json().await.unwrap();
    created["id"].as_str().unwrap().to_string()
}

fn value_change_rule(name: &str, value_field: &str) -> Value {
    serde_json::json!({
        "name": name,
        "document_type": "Attendance Request",
        "event": "Value Change",
        "subject": "Reason changed",
        "message": "Now: {{doc.reason}}",
        "value_field": value_field,
        "recipients": [
            { "condition": null, "kind": "role", "role": "HR Manager" }
        ],
    })
}

#[tokio::test]
async fn value_change_fires_only_when_the_watched_value_differs() {
    let app = TestApp::spawn().await;
    let admin = app.seed_admin("hr@test.com", "HR Manager").await;
    let employee = app.seed_employee("nina@test.com", "Nina").await;
    app.seed_device("hr@test.com", "device-hr").await;

    create_rule(
        &app,
        &admin.access_token,
        &value_change_rule("Reason Changed", "reason"),
    )
    .await;
    let logs = NotificationLogDao::new(&app.db);

    // Inserts are not value changes
    let created = submit_request(&app, &employee.access_token, None, "On Duty").await;
    assert_eq!(created["code"], 200);
    let request_id = created["data"]["name"].as_str().unwrap().to_string();
    assert_eq!(logs.count_for_rule("Reason Changed").await.unwrap(), 0);

    // Neither is an update that leaves the watched field as it was
    let unchanged =
        submit_request(&app, &employee.access_token, Some(&request_id), "On Duty").await;
    assert_eq!(unchanged["code"], 200);
    assert_eq!(logs.count_for_rule("Reason Changed").await.unwrap(), 0);

    let changed = submit_request(
        &app,
        &employee.access_token,
        Some(&request_id),
        "Work From Home",
    )
    .await;
    assert_eq!(changed["code"], 200);
    assert_eq!(logs.count_for_rule("Reason Changed").await.unwrap(), 1);
}

#[tokio::test]
async fn missing_watched_field_disables_the_rule() {
    let app = TestApp::spawn().await;
    let admin = app.seed_admin("hr@test.com", "HR Manager").await;
    let employee = app.seed_employee("omar@test.com", "Omar").await;
    app.seed_device("hr@test.com", "device-hr").await;

    let rule_id = create_rule(
        &app,
        &admin.access_token,
        &value_change_rule("Drifted", "approver_note"),
    )
    .await;

    let created = submit_request(&app, &employee.access_token, None, "On Duty").await;
    let request_id = created["data"]["name"].as_str().unwrap().to_string();
    let updated = submit_request(
        &app,
        &employee.access_token,
        Some(&request_id),
        "Work From Home",
    )
    .await;
    assert_eq!(updated["code"], 200);

    let rules = NotificationRuleDao::new(&app.db);
    let rule = rules
        .base
        .find_by_id(ObjectId::parse_str(&rule_id).unwrap())
        .await
        .unwrap();
    assert!(!rule.enabled);

    let logs = NotificationLogDao::new(&app.db);
    assert_eq!(logs.count_for_rule("Drifted").await.unwrap(), 0);

    // Once disabled the rule drops out of later evaluations
    submit_request(&app, &employee.access_token, Some(&request_id), "Sick Leave").await;
    assert_eq!(logs.count_for_rule("Drifted").await.unwrap(), 0);
}

#[tokio::test]
async fn dispatch_writes_one_log_entry_per_device_token() {
    let app = TestApp::spawn().await;
    let lead = app.seed_admin("lead@test.com", "HR Manager").await;
    app.seed_admin("backup@test.com", "HR Manager").await;
    let employee = app.seed_employee("pia@test.com", "Pia").await;
    app.seed_device("lead@test.com", "device-lead").await;
    app.seed_device("backup@test.com", "device-backup").await;

    // The lead is reachable twice: through the direct field and the role
    create_rule(
        &app,
        &lead.access_token,
        &serde_json::json!({
            "name": "Request Saved",
            "document_type": "Attendance Request",
            "event": "Save",
            "subject": "Saved by {{doc.employee_name}}",
            "message": "Reason: {{doc.reason}}",
            "recipients": [
                { "condition": null, "kind": "direct_field", "field": "reason" },
                { "condition": null, "kind": "role", "role": "HR Manager" }
            ],
        }),
    )
    .await;

    let created = submit_request(&app, &employee.access_token, None, "lead@test.com").await;
    assert_eq!(created["code"], 200);

    let logs = NotificationLogDao::new(&app.db);
    assert_eq!(logs.count_for_rule("Request Saved").await.unwrap(), 2);
    for token in ["device-lead", "device-backup"] {
        let count = logs
            .base
            .count(bson::doc! { "rule_name": "Request Saved", "token": token })
            .await
            .unwrap();
        assert_eq!(count, 1, "expected one entry for {token}");
    }
}
