use reqwest::Method;
use serde_json::json;
use serde_json::Value;
use waitlist_signup::configuration::SuccessStyle;
use wiremock::matchers::any;
use wiremock::matchers::body_json;
use wiremock::matchers::path;
use wiremock::Mock;
use wiremock::ResponseTemplate;

use crate::helpers::contacts_api;
use crate::helpers::email_api_ok;
use crate::helpers::spawn_app;
use crate::helpers::spawn_app_with;
use crate::helpers::valid_submission;
use crate::helpers::ADMIN_RECIPIENT;
use crate::helpers::AUDIENCE_ID;
use crate::helpers::ONBOARDING_FRAGMENT;
use crate::helpers::POWER_USER_FRAGMENT;

fn with_field(
    field: &str,
    value: Value,
) -> Value {
    let mut body = valid_submission();
    body[field] = value;
    body
}

fn without_field(field: &str) -> Value {
    let mut body = valid_submission();
    body.as_object_mut().unwrap().remove(field);
    body
}

#[tokio::test]
async fn only_post_is_allowed() {
    let app = spawn_app().await;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&app.email_server)
        .await;

    for method in [Method::GET, Method::PUT, Method::PATCH, Method::DELETE] {
        let resp = app.request(method.clone()).await;
        assert_eq!(resp.status().as_u16(), 405, "{method}");
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["error"], "Method not allowed");
    }
}

#[tokio::test]
async fn existing_user_gets_welcome_and_admin_is_notified() {
    let app = spawn_app().await;

    email_api_ok().expect(2).mount(&app.email_server).await;

    let resp = app.post_json(&valid_submission()).await;
    assert_eq!(resp.status().as_u16(), 200);

    let emails = app.sent_emails().await;
    assert_eq!(emails.len(), 2);

    let (welcome, admin) = (&emails[0], &emails[1]);
    assert_eq!(welcome.to, vec!["ada@example.com"]);
    assert_eq!(welcome.from, "NeoCortex AI <noreply@neocortexai.dev>");
    assert_eq!(welcome.subject, "🧠 Welcome to NeoCortex AI Early Access!");
    assert!(welcome.html.contains("Hi Ada Lovelace!"));
    assert!(welcome.html.contains(POWER_USER_FRAGMENT));
    assert!(!welcome.html.contains(ONBOARDING_FRAGMENT));
    assert!(welcome
        .html
        .contains("https://neocortexai.dev/unsubscribe?email=ada%40example.com"));

    assert_eq!(admin.to, vec![ADMIN_RECIPIENT]);
    assert_eq!(admin.from, "NeoCortex AI Waitlist <noreply@neocortexai.dev>");
    assert_eq!(admin.subject, "🎯 New Waitlist Signup: ada@example.com");
    assert!(admin.html.contains("Ada Lovelace"));
    assert!(admin.html.contains(">Yes</td>"));

    // the ids come from the email api
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["message"], "Form submitted successfully");
    assert!(body["welcomeEmailId"].as_str().is_some_and(|id| !id.is_empty()));
    assert!(body["adminEmailId"].as_str().is_some_and(|id| !id.is_empty()));
    assert_ne!(body["welcomeEmailId"], body["adminEmailId"]);
}

#[tokio::test]
async fn new_user_gets_onboarding_pitch() {
    let app = spawn_app().await;

    email_api_ok().expect(2).mount(&app.email_server).await;

    let resp = app
        .post_json(&with_field("uses_claude_code", json!("no")))
        .await;
    assert_eq!(resp.status().as_u16(), 200);

    let emails = app.sent_emails().await;
    assert!(emails[0].html.contains(ONBOARDING_FRAGMENT));
    assert!(!emails[0].html.contains(POWER_USER_FRAGMENT));
    assert!(emails[1].html.contains(">No</td>"));
}

#[tokio::test]
async fn form_encoded_and_json_submissions_are_equivalent() {
    let json_app = spawn_app().await;
    let form_app = spawn_app().await;
    email_api_ok().expect(2).mount(&json_app.email_server).await;
    email_api_ok().expect(2).mount(&form_app.email_server).await;

    let resp = json_app.post_json(&valid_submission()).await;
    assert_eq!(resp.status().as_u16(), 200);

    let resp = form_app
        .post_form(
            "name=Ada%20Lovelace&email=ada%40example.com&uses_claude_code=yes&consent_emails=true",
        )
        .await;
    assert_eq!(resp.status().as_u16(), 200);

    let from_json = json_app.sent_emails().await;
    let from_form = form_app.sent_emails().await;
    assert_eq!(from_json.len(), from_form.len());
    for (a, b) in from_json.iter().zip(&from_form) {
        assert_eq!(a.to, b.to);
        assert_eq!(a.from, b.from);
        assert_eq!(a.subject, b.subject);
    }
    assert!(from_form[0].html.contains(POWER_USER_FRAGMENT));
}

#[tokio::test]
async fn missing_fields_are_rejected_without_sending() {
    let app = spawn_app().await;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&app.email_server)
        .await;

    let mut cases = vec![];
    for field in ["name", "email", "uses_claude_code", "consent_emails"] {
        cases.push((without_field(field), format!("no {field}")));
        cases.push((with_field(field, json!("")), format!("empty {field}")));
        cases.push((with_field(field, Value::Null), format!("null {field}")));
        cases.push((with_field(field, json!(false)), format!("false {field}")));
        cases.push((with_field(field, json!(0)), format!("zero {field}")));
    }
    cases.push((json!({}), "empty object".to_string()));

    for (body, msg) in cases {
        let resp = app.post_json(&body).await;
        assert_eq!(resp.status().as_u16(), 400, "{msg}");
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["error"], "Missing required fields", "{msg}");
    }

    for (body, msg) in [
        ("name=Ada&uses_claude_code=yes&consent_emails=true", "no email"),
        ("name=&email=ada%40example.com&uses_claude_code=yes&consent_emails=true", "empty name"),
        ("name=Ada&email=ada%40example.com&consent_emails=true", "no usage"),
        ("name=Ada&email=ada%40example.com&uses_claude_code=no", "no consent (unchecked box)"),
    ] {
        let resp = app.post_form(body).await;
        assert_eq!(resp.status().as_u16(), 400, "{msg}");
    }
}

#[tokio::test]
async fn consent_must_be_exactly_true() {
    let app = spawn_app().await;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&app.email_server)
        .await;

    for consent in [json!("false"), json!("True"), json!("yes"), json!(true), json!(1)] {
        let body = json!({
            "name": "Bob",
            "email": "bob@example.com",
            "uses_claude_code": "yes",
            "consent_emails": consent,
        });
        let resp = app.post_json(&body).await;
        assert_eq!(resp.status().as_u16(), 400, "{consent}");
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["error"], "Email consent is required", "{consent}");
    }

    let resp = app
        .post_form("name=Bob&email=bob%40example.com&uses_claude_code=yes&consent_emails=on")
        .await;
    assert_eq!(resp.status().as_u16(), 400);
}

#[tokio::test]
async fn malformed_body_is_a_handled_error() {
    let app = spawn_app().await;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&app.email_server)
        .await;

    let resp = app
        .api_client
        .post(format!("{}/form-submit", app.addr))
        .header("Content-Type", "application/json")
        .body("{\"name\": ")
        .send()
        .await
        .expect("execute request");

    assert_eq!(resp.status().as_u16(), 500);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "Failed to process form submission");
    assert!(body["details"].as_str().unwrap().contains("json"));
}

#[tokio::test]
async fn failed_welcome_email_aborts_the_signup() {
    let app = spawn_app().await;

    Mock::given(path("/emails"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "statusCode": 500,
            "name": "application_error",
            "message": "daily sending quota exceeded",
        })))
        // the admin notification is never attempted
        .expect(1)
        .mount(&app.email_server)
        .await;

    let resp = app.post_json(&valid_submission()).await;
    assert_eq!(resp.status().as_u16(), 500);

    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "Failed to process form submission");
    assert!(body["details"]
        .as_str()
        .unwrap()
        .contains("daily sending quota exceeded"));
}

#[tokio::test]
async fn failed_admin_notification_fails_the_request() {
    let app = spawn_app().await;

    email_api_ok()
        .up_to_n_times(1)
        .expect(1)
        .mount(&app.email_server)
        .await;
    Mock::given(path("/emails"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&app.email_server)
        .await;

    let resp = app.post_json(&valid_submission()).await;
    assert_eq!(resp.status().as_u16(), 500);

    // no partial success is reported
    let body: Value = resp.json().await.unwrap();
    assert!(body.get("welcomeEmailId").is_none());
    assert!(body["details"].as_str().unwrap().contains("503"));
}

#[tokio::test]
async fn contact_is_registered_when_audience_is_configured() {
    let app = spawn_app_with(|cfg| cfg.waitlist.audience_id = Some(AUDIENCE_ID.to_string())).await;

    email_api_ok().expect(2).mount(&app.email_server).await;
    contacts_api()
        .and(body_json(json!({
            "email": "ada@example.com",
            "first_name": "Ada",
            "last_name": "Lovelace",
            "unsubscribed": false,
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "object": "contact",
            "id": "c-1",
        })))
        .expect(1)
        .mount(&app.email_server)
        .await;

    let resp = app.post_json(&valid_submission()).await;
    assert_eq!(resp.status().as_u16(), 200);
}

#[tokio::test]
async fn single_word_name_has_empty_last_name() {
    let app = spawn_app_with(|cfg| cfg.waitlist.audience_id = Some(AUDIENCE_ID.to_string())).await;

    email_api_ok().expect(2).mount(&app.email_server).await;
    contacts_api()
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": "c-1"})))
        .expect(1)
        .mount(&app.email_server)
        .await;

    let resp = app.post_json(&with_field("name", json!("Bob"))).await;
    assert_eq!(resp.status().as_u16(), 200);

    let contacts = app
        .received(&format!("/audiences/{AUDIENCE_ID}/contacts"))
        .await;
    assert_eq!(contacts[0]["first_name"], "Bob");
    assert_eq!(contacts[0]["last_name"], "");
}

#[tokio::test]
async fn failed_contact_registration_does_not_fail_the_signup() {
    let app = spawn_app_with(|cfg| cfg.waitlist.audience_id = Some(AUDIENCE_ID.to_string())).await;

    email_api_ok().expect(2).mount(&app.email_server).await;
    contacts_api()
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&app.email_server)
        .await;

    let resp = app.post_json(&valid_submission()).await;
    assert_eq!(resp.status().as_u16(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["message"], "Form submitted successfully");
}

#[tokio::test]
async fn no_contact_without_audience() {
    let app = spawn_app().await;

    email_api_ok().expect(2).mount(&app.email_server).await;
    contacts_api()
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&app.email_server)
        .await;

    let resp = app.post_json(&valid_submission()).await;
    assert_eq!(resp.status().as_u16(), 200);
}

#[tokio::test]
async fn contact_call_waits_for_rate_limit() {
    let app = spawn_app_with(|cfg| {
        cfg.waitlist.audience_id = Some(AUDIENCE_ID.to_string());
        cfg.waitlist.rate_limit_milliseconds = 300;
    })
    .await;

    email_api_ok().expect(2).mount(&app.email_server).await;
    contacts_api()
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": "c-1"})))
        .expect(1)
        .mount(&app.email_server)
        .await;

    let start = std::time::Instant::now();
    let resp = app.post_json(&valid_submission()).await;
    assert_eq!(resp.status().as_u16(), 200);
    assert!(start.elapsed() >= std::time::Duration::from_millis(300));
}

#[tokio::test]
async fn redirect_style_answers_with_302() {
    let app = spawn_app_with(|cfg| cfg.application.success_style = SuccessStyle::Redirect).await;

    email_api_ok().expect(2).mount(&app.email_server).await;

    let resp = app.post_json(&valid_submission()).await;
    assert_eq!(resp.status().as_u16(), 302);
    assert_eq!(resp.headers().get("Location").unwrap(), "/success");
    assert!(resp.bytes().await.unwrap().is_empty());
}

#[tokio::test]
async fn repeated_submissions_are_not_deduplicated() {
    let app = spawn_app().await;

    email_api_ok().expect(4).mount(&app.email_server).await;

    for _ in 0..2 {
        let resp = app.post_json(&valid_submission()).await;
        assert_eq!(resp.status().as_u16(), 200);
    }
}
