use chrono::NaiveDate;
use httpmock::prelude::*;
use messagebus_client::{
    BatchEmailSendRequest, BatchTemplateSendRequest, Client, Credentials, EmailMessage, Error,
    MailingListCreateRequest, MailingListEntryCreateRequest, TemplateMessage,
};
use pretty_assertions::assert_eq;
use serde_json::json;

const API_KEY: &str = "test-api-key";

fn client_for(server: &MockServer) -> Client {
    Client::builder()
        .api_key(API_KEY)
        .base_url(server.base_url())
        .build()
        .unwrap()
}

#[tokio::test]
async fn send_emails_round_trip() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/api/v3/emails/send")
                .header("x-messagebus-key", API_KEY)
                .header("content-type", "application/json; charset=utf-8")
                .body_contains(r#""toEmail":"bob@example.com""#);
            then.status(202).json_body(json!({
                "statusCode": 202,
                "statusMessage": "",
                "statusTime": "2012-01-10T11:12:13.000Z",
                "successCount": 1,
                "failureCount": 0,
                "results": [
                    {"toEmail": "bob@example.com", "messageId": "51efcf00f38711e0a93940405cc99fee", "messageStatus": 0}
                ]
            }));
        })
        .await;

    let request = BatchEmailSendRequest::new(vec![EmailMessage {
        to_email: "bob@example.com".into(),
        from_email: "alice@example.com".into(),
        subject: "Hello".into(),
        plaintext_body: Some("Hi Bob".into()),
        ..Default::default()
    }]);
    let response = client_for(&server).send_emails(&request).await.unwrap();

    mock.assert_async().await;
    assert_eq!(response.status.status_code, 202);
    assert_eq!(response.success_count, 1);
    assert_eq!(response.failure_count, 0);
    assert_eq!(response.results[0].to_email, "bob@example.com");
    assert_eq!(
        response.results[0].message_id,
        "51efcf00f38711e0a93940405cc99fee"
    );
}

#[tokio::test]
async fn send_templates_posts_template_key() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/api/v3/templates/send")
                .body_contains(r#""templateKey":"welcome""#)
                .body_contains(r#""mergeFields":{"%NAME%":"Bob"}"#);
            then.status(202)
                .json_body(json!({"statusCode": 202, "successCount": 1, "results": []}));
        })
        .await;

    let mut message = TemplateMessage {
        to_email: "bob@example.com".into(),
        from_email: "alice@example.com".into(),
        ..Default::default()
    };
    message.merge_fields.insert("%NAME%".into(), "Bob".into());

    let response = client_for(&server)
        .send_templates(&BatchTemplateSendRequest::new("welcome", vec![message]))
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(response.success_count, 1);
}

#[tokio::test]
async fn retrieve_stats_sends_filters() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/api/v3/stats")
                .query_param("startDate", "2012-01-01")
                .query_param("endDate", "2012-01-31")
                .query_param("tag", "promo");
            then.status(200).json_body(json!({
                "statusCode": 200,
                "statusMessage": "",
                "statusTime": "2012-02-01T00:00:00.000Z",
                "stats": {"msgsAttemptedCount": 10, "openCount": 4, "clickCount": 2},
                "smtp": {"acceptCount": 9, "bounceCount": 1},
                "filter": {"rcptBadMailboxCount": 1}
            }));
        })
        .await;

    let stats = client_for(&server)
        .retrieve_stats(
            NaiveDate::from_ymd_opt(2012, 1, 1),
            NaiveDate::from_ymd_opt(2012, 1, 31),
            Some("promo"),
        )
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(stats.stats.msgs_attempted_count, 10);
    assert_eq!(stats.stats.click_count, 2);
    assert_eq!(stats.smtp.bounce_count, 1);
    assert_eq!(stats.filter.rcpt_bad_mailbox_count, 1);
}

#[tokio::test]
async fn delivery_errors_and_unsubscribes_parse_lists() {
    let server = MockServer::start_async().await;
    let errors = server
        .mock_async(|when, then| {
            when.method(GET).path("/api/v3/delivery_errors");
            then.status(200).json_body(json!({
                "statusCode": 200,
                "deliveryErrors": [
                    {"date": "2012-01-05", "email": "x@example.com", "messageId": "m1", "errorCode": 5}
                ]
            }));
        })
        .await;
    let unsubscribes = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/api/v3/unsubscribes")
                .query_param("startDate", "2012-01-01");
            then.status(200).json_body(json!({
                "statusCode": 200,
                "unsubscribes": [{"date": "2012-01-06", "email": "y@example.com", "messageId": "m2"}]
            }));
        })
        .await;

    let client = client_for(&server);
    let delivery = client.retrieve_delivery_errors(None, None).await.unwrap();
    let unsubs = client
        .retrieve_unsubscribes(NaiveDate::from_ymd_opt(2012, 1, 1), None)
        .await
        .unwrap();

    errors.assert_async().await;
    unsubscribes.assert_async().await;
    assert_eq!(delivery.delivery_errors[0].error_code, 5);
    assert_eq!(unsubs.unsubscribes[0].email, "y@example.com");
}

#[tokio::test]
async fn mailing_list_lifecycle() {
    let server = MockServer::start_async().await;
    let create = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/api/v3/mailing_lists")
                .body_contains(r#""name":"Newsletter""#);
            then.status(201)
                .json_body(json!({"statusCode": 201, "key": "list1"}));
        })
        .await;
    let list = server
        .mock_async(|when, then| {
            when.method(GET).path("/api/v3/mailing_lists");
            then.status(200).json_body(json!({
                "statusCode": 200,
                "mailingLists": [
                    {"key": "list1", "name": "Newsletter", "mergeFieldKeys": ["%EMAIL%"]}
                ]
            }));
        })
        .await;
    let add = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/api/v3/mailing_list/list1/entries")
                .body_contains(r#""%EMAIL%":"a@b.com""#);
            then.status(201).json_body(json!({"statusCode": 201}));
        })
        .await;
    let remove = server
        .mock_async(|when, then| {
            when.method(DELETE)
                .path("/api/v3/mailing_list/list1/entry/a@b.com");
            then.status(200).json_body(json!({"statusCode": 200}));
        })
        .await;

    let client = client_for(&server);
    let created = client
        .create_mailing_list(&MailingListCreateRequest::new(
            "Newsletter",
            vec!["%EMAIL%".into()],
        ))
        .await
        .unwrap();
    assert_eq!(created.key, "list1");

    let lists = client.list_mailing_lists().await.unwrap();
    assert_eq!(lists.mailing_lists[0].merge_field_keys, vec!["%EMAIL%"]);

    let entry = client
        .create_mailing_list_entry(&created.key, &MailingListEntryCreateRequest::new("a@b.com"))
        .await
        .unwrap();
    assert_eq!(entry.status.status_code, 201);

    let deleted = client
        .delete_mailing_list_entry(&created.key, "a@b.com")
        .await
        .unwrap();
    assert_eq!(deleted.status.status_code, 200);

    create.assert_async().await;
    list.assert_async().await;
    add.assert_async().await;
    remove.assert_async().await;
}

#[tokio::test]
async fn json_error_body_becomes_http_error() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/v3/mailing_lists");
            then.status(401)
                .json_body(json!({"statusCode": 401, "statusMessage": "Invalid API key"}));
        })
        .await;

    let err = client_for(&server).list_mailing_lists().await.unwrap_err();
    match err {
        Error::Http { status, message } => {
            assert_eq!(status, 401);
            assert_eq!(message, "Invalid API key");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn text_error_body_is_passed_through() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/v3/stats");
            then.status(500).body("Internal failure");
        })
        .await;

    let err = client_for(&server)
        .retrieve_stats(None, None, None)
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(500));
    assert_eq!(err.message(), "Internal failure");
}

#[tokio::test]
async fn empty_error_body_uses_status_description() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(DELETE).path("/api/v3/mailing_list/l/entry/a@b.com");
            then.status(404);
        })
        .await;

    let err = client_for(&server)
        .delete_mailing_list_entry("l", "a@b.com")
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(404));
    assert_eq!(err.message(), "Not Found");
}

#[tokio::test]
async fn unreachable_server_is_transport_error() {
    let client = Client::builder()
        .api_key(API_KEY)
        .base_url("http://127.0.0.1:1")
        .build()
        .unwrap();

    let err = client.list_mailing_lists().await.unwrap_err();
    assert!(matches!(err, Error::Transport(_)));
    assert_eq!(err.status(), None);
    assert!(!err.message().is_empty());
}

#[tokio::test]
async fn credentials_are_sent_as_basic_auth() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/api/v3/mailing_lists")
                .header("authorization", "Basic dXNlcjpwYXNz");
            then.status(200).json_body(json!({"statusCode": 200}));
        })
        .await;

    let client = Client::builder()
        .api_key(API_KEY)
        .base_url(server.base_url())
        .credentials(Credentials::new("user", "pass"))
        .build()
        .unwrap();
    client.list_mailing_lists().await.unwrap();

    mock.assert_async().await;
}

#[tokio::test]
async fn requests_are_routed_through_configured_proxy() {
    let proxy = MockServer::start_async().await;
    let mock = proxy
        .mock_async(|when, then| {
            when.method(GET).path("/api/v3/mailing_lists");
            then.status(200).json_body(json!({"statusCode": 200}));
        })
        .await;

    let client = Client::builder()
        .api_key(API_KEY)
        .base_url("http://api.invalid")
        .proxy(proxy.base_url())
        .build()
        .unwrap();
    assert_eq!(client.transport().proxy(), Some(proxy.base_url().as_str()));

    let lists = client.list_mailing_lists().await.unwrap();

    mock.assert_async().await;
    assert_eq!(lists.status.status_code, 200);
}

#[test]
fn insecure_tls_is_scoped_to_one_client() {
    let insecure = Client::builder()
        .api_key(API_KEY)
        .danger_accept_invalid_certs(true)
        .build()
        .unwrap();
    let strict = Client::new(API_KEY).unwrap();

    assert!(insecure.transport().accepts_invalid_certs());
    assert!(!strict.transport().accepts_invalid_certs());
}
