use serde_json::json;
use staticship_cloud::callback::{CallbackStatus, CustomResourceEvent, CustomResourceResponse};

fn custom_resource_payload() -> serde_json::Value {
    json!({
        "RequestType": "Create",
        "ResponseURL": "https://cfn-response.example.com/signed",
        "StackId": "arn:aws:cloudformation:us-east-1:123:stack/ui/abc",
        "RequestId": "req-1",
        "LogicalResourceId": "BuildFunctionTrigger",
        "ResourceType": "Custom::Trigger"
    })
}

#[test]
fn parses_custom_resource_event() {
    let event = CustomResourceEvent::from_payload(&custom_resource_payload());

    assert_eq!(event.request_type.as_deref(), Some("Create"));
    assert_eq!(
        event.response_url.as_deref(),
        Some("https://cfn-response.example.com/signed")
    );
    assert_eq!(event.request_id.as_deref(), Some("req-1"));
    assert!(event.physical_resource_id.is_none());
}

#[test]
fn other_payloads_have_no_response_url() {
    for payload in [
        json!({}),
        json!(null),
        json!("ping"),
        json!({"AMPLIFY_BRANCH_NAME": "main"}),
    ] {
        let event = CustomResourceEvent::from_payload(&payload);
        assert!(event.response_url.is_none(), "{payload}");
    }
}

#[test]
fn success_response_echoes_event_identity() {
    let event = CustomResourceEvent::from_payload(&custom_resource_payload());
    let response = CustomResourceResponse::success(&event, json!({"files": 3}));

    let body = serde_json::to_value(&response).unwrap();
    assert_eq!(body["Status"], "SUCCESS");
    assert_eq!(body["Reason"], "Success");
    assert_eq!(body["StackId"], "arn:aws:cloudformation:us-east-1:123:stack/ui/abc");
    assert_eq!(body["RequestId"], "req-1");
    assert_eq!(body["LogicalResourceId"], "BuildFunctionTrigger");
    assert_eq!(body["PhysicalResourceId"], "BuildFunctionTrigger");
    assert_eq!(body["NoEcho"], false);
    assert_eq!(body["Data"]["files"], 3);
}

#[test]
fn failure_response_carries_reason() {
    let event = CustomResourceEvent::default();
    let response =
        CustomResourceResponse::failure(&event, "BUCKET_NAME is not set in environment variables");

    assert_eq!(response.status, CallbackStatus::Failed);
    let body = serde_json::to_value(&response).unwrap();
    assert_eq!(body["Status"], "FAILED");
    assert_eq!(body["Reason"], "BUCKET_NAME is not set in environment variables");
    assert_eq!(body["PhysicalResourceId"], "staticship-directory-sync");
    assert_eq!(body["Data"], json!({}));
}

#[test]
fn existing_physical_id_is_kept() {
    let mut payload = custom_resource_payload();
    payload["PhysicalResourceId"] = json!("ui-build-1");
    let event = CustomResourceEvent::from_payload(&payload);

    let response = CustomResourceResponse::success(&event, json!({}));
    assert_eq!(response.physical_resource_id, "ui-build-1");
}
