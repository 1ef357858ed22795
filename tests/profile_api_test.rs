// ============================================================================
// Profile Facade Tests
// ============================================================================
//
// Tests for the role-agnostic profile endpoints:
// - GET /api/profile/me
// - PUT /api/profile/update
// - DELETE /api/profile/delete
// - GET /api/profile/check
//
// ============================================================================

use lifelink_server::models::Role;
use serde_json::{Value, json};
use serial_test::serial;

mod test_utils;
use test_utils::{TestApp, TestUser, create_user, spawn_app};

async fn save_donor_profile(app: &TestApp, user: &TestUser) {
    let response = reqwest::Client::new()
        .post(&format!("http://{}/api/donor/profile", app.address))
        .header("Authorization", format!("Bearer {}", user.token))
        .json(&json!({
            "bloodGroup": "A+",
            "city": "Mumbai",
            "contactNumber": "9876543210"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::CREATED);
}

async fn post_blood_request(app: &TestApp, user: &TestUser, patient: &str) {
    let response = reqwest::Client::new()
        .post(&format!("http://{}/api/recipient/request", app.address))
        .header("Authorization", format!("Bearer {}", user.token))
        .json(&json!({
            "patientName": patient,
            "bloodGroup": "O-",
            "city": "Pune",
            "hospitalName": "City Hospital",
            "contactNumber": "9876543210",
            "urgency": "high",
            "unitsRequired": 2
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::CREATED);
}

async fn fetch_profile(app: &TestApp, user: &TestUser) -> Value {
    reqwest::Client::new()
        .get(&format!("http://{}/api/profile/me", app.address))
        .header("Authorization", format!("Bearer {}", user.token))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap()
}

async fn update_profile(app: &TestApp, user: &TestUser, body: Value) -> reqwest::Response {
    reqwest::Client::new()
        .put(&format!("http://{}/api/profile/update", app.address))
        .header("Authorization", format!("Bearer {}", user.token))
        .json(&body)
        .send()
        .await
        .unwrap()
}

// ============================================================================
// Fetching
// ============================================================================

#[tokio::test]
#[serial]
async fn profile_me_returns_user_and_donor_data() {
    let app = spawn_app().await;
    let donor = create_user(&app, "Asha", Role::Donor).await;
    save_donor_profile(&app, &donor).await;

    let body = fetch_profile(&app, &donor).await;

    assert_eq!(body["user"]["name"], "Asha");
    assert_eq!(body["user"]["email"], donor.email);
    assert_eq!(body["user"]["role"], "donor");
    assert_eq!(body["profileData"]["kind"], "donor");
    assert_eq!(body["profileData"]["bloodGroup"], "A+");
    assert_eq!(body["profileData"]["city"], "Mumbai");
}

#[tokio::test]
#[serial]
async fn profile_me_has_no_profile_data_without_a_role_record() {
    let app = spawn_app().await;
    let donor = create_user(&app, "Asha", Role::Donor).await;

    let body = fetch_profile(&app, &donor).await;

    assert_eq!(body["user"]["name"], "Asha");
    assert!(body["profileData"].is_null());
}

#[tokio::test]
#[serial]
async fn profile_me_surfaces_the_latest_posting_for_a_recipient() {
    let app = spawn_app().await;
    let recipient = create_user(&app, "Meera", Role::Recipient).await;
    post_blood_request(&app, &recipient, "Patient A").await;
    post_blood_request(&app, &recipient, "Patient B").await;

    let body = fetch_profile(&app, &recipient).await;

    assert_eq!(body["user"]["role"], "recipient");
    assert_eq!(body["profileData"]["kind"], "recipient");
    assert_eq!(body["profileData"]["patientName"], "Patient B");
}

// ============================================================================
// Updating
// ============================================================================

#[tokio::test]
#[serial]
async fn update_profile_changes_identity_fields() {
    let app = spawn_app().await;
    let donor = create_user(&app, "Asha", Role::Donor).await;

    let response = update_profile(&app, &donor, json!({ "name": "Asha Sharma" })).await;
    assert_eq!(response.status(), reqwest::StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Profile updated successfully");
    assert_eq!(body["user"]["name"], "Asha Sharma");

    let profile = fetch_profile(&app, &donor).await;
    assert_eq!(profile["user"]["name"], "Asha Sharma");
}

#[tokio::test]
#[serial]
async fn update_profile_rehashes_the_password() {
    let app = spawn_app().await;
    let donor = create_user(&app, "Asha", Role::Donor).await;

    let response = update_profile(&app, &donor, json!({ "password": "next-password" })).await;
    assert_eq!(response.status(), reqwest::StatusCode::OK);

    let hash: String = sqlx::query_scalar("SELECT password_hash FROM users WHERE id = $1")
        .bind(donor.id)
        .fetch_one(&app.db_pool)
        .await
        .unwrap();
    assert!(bcrypt::verify("next-password", &hash).unwrap());
    assert!(!bcrypt::verify("password123", &hash).unwrap());
}

#[tokio::test]
#[serial]
async fn update_profile_rejects_a_taken_email() {
    let app = spawn_app().await;
    let donor = create_user(&app, "Asha", Role::Donor).await;
    let other = create_user(&app, "Meera", Role::Recipient).await;

    let response = update_profile(&app, &donor, json!({ "email": other.email })).await;

    assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Email is already in use");
}

#[tokio::test]
#[serial]
async fn update_profile_touches_the_donor_record() {
    let app = spawn_app().await;
    let donor = create_user(&app, "Asha", Role::Donor).await;
    save_donor_profile(&app, &donor).await;

    let response = update_profile(&app, &donor, json!({ "city": "Delhi" })).await;
    assert_eq!(response.status(), reqwest::StatusCode::OK);

    let me: Value = reqwest::Client::new()
        .get(&format!("http://{}/api/donor/me", app.address))
        .header("Authorization", format!("Bearer {}", donor.token))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(me["city"], "Delhi");
}

#[tokio::test]
#[serial]
async fn update_profile_ignores_fields_for_the_other_role() {
    let app = spawn_app().await;
    let donor = create_user(&app, "Asha", Role::Donor).await;
    save_donor_profile(&app, &donor).await;

    // Recipient-only fields are not validated for a donor, they are dropped
    let response = update_profile(
        &app,
        &donor,
        json!({ "patientName": "X", "urgency": "bogus" }),
    )
    .await;

    assert_eq!(response.status(), reqwest::StatusCode::OK);
}

#[tokio::test]
#[serial]
async fn invalid_role_fields_leave_identity_fields_untouched() {
    let app = spawn_app().await;
    let donor = create_user(&app, "Asha", Role::Donor).await;
    save_donor_profile(&app, &donor).await;

    let response = update_profile(
        &app,
        &donor,
        json!({ "name": "Changed", "bloodGroup": "C+" }),
    )
    .await;
    assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);

    // The rejected update wrote nothing
    let profile = fetch_profile(&app, &donor).await;
    assert_eq!(profile["user"]["name"], "Asha");
}

#[tokio::test]
#[serial]
async fn recipient_update_applies_to_the_latest_posting() {
    let app = spawn_app().await;
    let recipient = create_user(&app, "Meera", Role::Recipient).await;
    post_blood_request(&app, &recipient, "Patient A").await;
    post_blood_request(&app, &recipient, "Patient B").await;

    let response = update_profile(&app, &recipient, json!({ "patientName": "Renamed" })).await;
    assert_eq!(response.status(), reqwest::StatusCode::OK);

    let mine: Vec<Value> = reqwest::Client::new()
        .get(&format!("http://{}/api/recipient/mine", app.address))
        .header("Authorization", format!("Bearer {}", recipient.token))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    // Newest first: only the latest posting is renamed
    assert_eq!(mine[0]["patientName"], "Renamed");
    assert_eq!(mine[1]["patientName"], "Patient A");
}

// ============================================================================
// Deletion and existence checks
// ============================================================================

#[tokio::test]
#[serial]
async fn delete_account_removes_user_and_role_records() {
    let app = spawn_app().await;
    let donor = create_user(&app, "Asha", Role::Donor).await;
    save_donor_profile(&app, &donor).await;

    let response = reqwest::Client::new()
        .delete(&format!("http://{}/api/profile/delete", app.address))
        .header("Authorization", format!("Bearer {}", donor.token))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Account and related profile deleted successfully");

    let donor_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM donors")
        .fetch_one(&app.db_pool)
        .await
        .unwrap();
    assert_eq!(donor_count, 0);

    // The token still parses but the user is gone
    let response = reqwest::Client::new()
        .get(&format!("http://{}/api/profile/me", app.address))
        .header("Authorization", format!("Bearer {}", donor.token))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::NOT_FOUND);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "User not found");

    let body: Value = reqwest::Client::new()
        .get(&format!("http://{}/api/profile/check", app.address))
        .header("Authorization", format!("Bearer {}", donor.token))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["exists"], false);
}

#[tokio::test]
#[serial]
async fn check_profile_reports_the_role_record() {
    let app = spawn_app().await;
    let donor = create_user(&app, "Asha", Role::Donor).await;
    let client = reqwest::Client::new();

    let body: Value = client
        .get(&format!("http://{}/api/profile/check", app.address))
        .header("Authorization", format!("Bearer {}", donor.token))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["exists"], false);
    assert!(body.get("role").is_none());

    save_donor_profile(&app, &donor).await;

    let body: Value = client
        .get(&format!("http://{}/api/profile/check", app.address))
        .header("Authorization", format!("Bearer {}", donor.token))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["exists"], true);
    assert_eq!(body["role"], "donor");
}

#[tokio::test]
#[serial]
async fn check_profile_sees_recipient_postings() {
    let app = spawn_app().await;
    let recipient = create_user(&app, "Meera", Role::Recipient).await;
    post_blood_request(&app, &recipient, "Patient A").await;

    let body: Value = reqwest::Client::new()
        .get(&format!("http://{}/api/profile/check", app.address))
        .header("Authorization", format!("Bearer {}", recipient.token))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body["exists"], true);
    assert_eq!(body["role"], "recipient");
}
