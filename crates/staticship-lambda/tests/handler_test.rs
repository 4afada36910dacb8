use std::collections::HashMap;
use std::path::{Path, PathBuf};

use mockall::mock;
use serde_json::json;
use staticship_build::{CommandError, CommandOutput, CommandRunner, CommandSpec, FetchBuild};
use staticship_cloud::{
    ArchiveDeployer, ArchiveUploader, CallbackError, CallbackSender, CallbackStatus,
    CreatedDeployment, CustomResourceResponse, DirectorySynchronizer, HostingError,
    HostingPlatform, ObjectStore, StoreError, UploadError,
};
use staticship_core::{BuildSettings, ScratchRoot};
use staticship_lambda::handlers::{DeployFunction, DeployResponse, SyncFunction, SyncResponse};
use tempfile::TempDir;

mock! {
    Runner {}

    impl CommandRunner for Runner {
        async fn run(&self, spec: &CommandSpec) -> Result<CommandOutput, CommandError>;
    }
}

mock! {
    Store {}

    impl ObjectStore for Store {
        async fn put_object(
            &self,
            bucket: &str,
            key: &str,
            body: Vec<u8>,
            content_type: &str,
        ) -> Result<(), StoreError>;
    }
}

mock! {
    Platform {}

    impl HostingPlatform for Platform {
        async fn create_deployment(
            &self,
            app_id: &str,
            branch_name: &str,
        ) -> Result<CreatedDeployment, HostingError>;

        async fn start_deployment(
            &self,
            app_id: &str,
            branch_name: &str,
            job_id: &str,
            source_url: &str,
        ) -> Result<Option<String>, HostingError>;
    }
}

mock! {
    Uploader {}

    impl ArchiveUploader for Uploader {
        async fn put_archive(&self, url: &str, body: Vec<u8>) -> Result<(), UploadError>;
    }
}

mock! {
    Callback {}

    impl CallbackSender for Callback {
        async fn send(
            &self,
            url: &str,
            response: &CustomResourceResponse,
        ) -> Result<(), CallbackError>;
    }
}

// ── Fixtures ──

const RESPONSE_URL: &str = "https://cfn-response.example.com/signed";

fn settings(scratch: &Path) -> BuildSettings {
    BuildSettings {
        scratch_root: scratch.to_path_buf(),
        ..BuildSettings::default()
    }
}

fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn deploy_env() -> HashMap<String, String> {
    env(&[
        ("REPO_NAME", "site"),
        ("NEXT_PUBLIC_API_URL", "https://api.example.com"),
        ("AMPLIFY_APP_ID", "d123"),
        ("AMPLIFY_BRANCH_NAME", "main"),
    ])
}

fn sync_env() -> HashMap<String, String> {
    env(&[
        ("BUCKET_NAME", "ui-bucket"),
        ("REPO_NAME", "site"),
        ("NEXT_PUBLIC_API_URL", "https://api.example.com"),
    ])
}

/// A file that survives only if the clean step never ran.
fn sentinel(scratch: &Path) -> PathBuf {
    let path = scratch.join("previous-run.txt");
    std::fs::write(&path, "leftover").unwrap();
    path
}

fn idle_runner() -> MockRunner {
    let mut runner = MockRunner::new();
    runner.expect_run().times(0);
    runner
}

/// Every command succeeds; the build step writes a two-file export.
fn building_runner(scratch: &Path) -> MockRunner {
    let out = scratch.join("site/out");
    let mut runner = MockRunner::new();
    runner.expect_run().returning(move |spec| {
        if spec.program == "npm" && spec.args.first().map(String::as_str) == Some("run") {
            std::fs::create_dir_all(out.join("_next")).unwrap();
            std::fs::write(out.join("index.html"), "<html></html>").unwrap();
            std::fs::write(out.join("_next/app.js"), "console.log(1)").unwrap();
        }
        Ok(CommandOutput {
            stdout: String::new(),
            stderr: String::new(),
        })
    });
    runner
}

fn failing_clone_runner() -> MockRunner {
    let mut runner = MockRunner::new();
    runner.expect_run().times(1).returning(|spec| {
        Err(CommandError::Failed {
            command: spec.display(),
            status: "exit status: 128".to_owned(),
            stderr: "fatal: repository not found".to_owned(),
        })
    });
    runner
}

fn created() -> Result<CreatedDeployment, HostingError> {
    Ok(CreatedDeployment {
        job_id: Some("7".to_owned()),
        zip_upload_url: Some("https://upload.example.com/zip".to_owned()),
    })
}

fn deploy_function(
    scratch: &Path,
    runner: MockRunner,
    platform: MockPlatform,
    uploader: MockUploader,
) -> DeployFunction<MockRunner, MockPlatform, MockUploader> {
    DeployFunction::new(
        FetchBuild::with_runner(runner, settings(scratch)),
        ArchiveDeployer::new(platform, uploader),
    )
}

fn sync_function(
    scratch: &Path,
    runner: MockRunner,
    store: MockStore,
    callback: MockCallback,
) -> SyncFunction<MockRunner, MockStore, MockCallback> {
    SyncFunction::new(
        FetchBuild::with_runner(runner, settings(scratch)),
        DirectorySynchronizer::new(store, ScratchRoot::new(scratch)),
        callback,
    )
}

// ── Archive deploy ──

#[tokio::test]
async fn deploy_missing_config_makes_no_external_calls() {
    let tmp = TempDir::new().unwrap();
    let leftover = sentinel(tmp.path());

    let mut platform = MockPlatform::new();
    platform.expect_create_deployment().times(0);
    platform.expect_start_deployment().times(0);
    let mut uploader = MockUploader::new();
    uploader.expect_put_archive().times(0);

    let function = deploy_function(tmp.path(), idle_runner(), platform, uploader);
    let mut partial = deploy_env();
    partial.remove("AMPLIFY_APP_ID");

    let response = function.handle(&partial, &json!({})).await;

    assert_eq!(response, DeployResponse::failure());
    assert!(leftover.exists(), "scratch space must not be purged");
}

#[tokio::test]
async fn deploy_builds_zips_and_starts_job() {
    let tmp = TempDir::new().unwrap();

    let mut platform = MockPlatform::new();
    platform
        .expect_create_deployment()
        .withf(|app, branch| app == "d123" && branch == "main")
        .times(1)
        .returning(|_, _| created());
    platform
        .expect_start_deployment()
        .withf(|app, branch, job, url| {
            app == "d123" && branch == "main" && job == "7" && url == "https://upload.example.com/zip"
        })
        .times(1)
        .returning(|_, _, _, _| Ok(Some("PENDING".to_owned())));

    let mut uploader = MockUploader::new();
    uploader
        .expect_put_archive()
        .withf(|url, body| url == "https://upload.example.com/zip" && body.starts_with(b"PK"))
        .times(1)
        .returning(|_, _| Ok(()));

    let function = deploy_function(tmp.path(), building_runner(tmp.path()), platform, uploader);
    let response = function.handle(&deploy_env(), &json!({})).await;

    assert_eq!(response.status_code, 200);
    assert_eq!(response.body, r#"{"status":"PENDING"}"#);
    assert!(tmp.path().join("deployment.zip").is_file());
}

#[tokio::test]
async fn deploy_event_branch_overrides_environment() {
    let tmp = TempDir::new().unwrap();

    let mut platform = MockPlatform::new();
    platform
        .expect_create_deployment()
        .withf(|_, branch| branch == "preview")
        .times(1)
        .returning(|_, _| created());
    platform
        .expect_start_deployment()
        .withf(|_, branch, _, _| branch == "preview")
        .returning(|_, _, _, _| Ok(None));

    let mut uploader = MockUploader::new();
    uploader.expect_put_archive().returning(|_, _| Ok(()));

    let function = deploy_function(tmp.path(), building_runner(tmp.path()), platform, uploader);
    let response = function
        .handle(&deploy_env(), &json!({ "AMPLIFY_BRANCH_NAME": "preview" }))
        .await;

    assert_eq!(response.status_code, 200);
    assert_eq!(response.body, r#"{"status":"unknown"}"#);
}

#[tokio::test]
async fn deploy_without_job_never_uploads() {
    let tmp = TempDir::new().unwrap();

    let mut platform = MockPlatform::new();
    platform
        .expect_create_deployment()
        .returning(|_, _| Ok(CreatedDeployment::default()));
    platform.expect_start_deployment().times(0);
    let mut uploader = MockUploader::new();
    uploader.expect_put_archive().times(0);

    let function = deploy_function(tmp.path(), building_runner(tmp.path()), platform, uploader);
    let response = function.handle(&deploy_env(), &json!({})).await;

    assert_eq!(response, DeployResponse::failure());
}

#[tokio::test]
async fn deploy_build_failure_skips_platform() {
    let tmp = TempDir::new().unwrap();

    let mut platform = MockPlatform::new();
    platform.expect_create_deployment().times(0);
    let mut uploader = MockUploader::new();
    uploader.expect_put_archive().times(0);

    let function = deploy_function(tmp.path(), failing_clone_runner(), platform, uploader);
    let response = function.handle(&deploy_env(), &json!({})).await;

    assert_eq!(response, DeployResponse::failure());
}

#[test]
fn deploy_response_uses_proxy_field_names() {
    let body = serde_json::to_value(DeployResponse::success("SUCCEED")).unwrap();
    assert_eq!(body, json!({"statusCode": 200, "body": "{\"status\":\"SUCCEED\"}"}));
}

// ── Directory sync ──

#[tokio::test]
async fn sync_missing_config_makes_no_external_calls() {
    let tmp = TempDir::new().unwrap();
    let leftover = sentinel(tmp.path());

    let mut store = MockStore::new();
    store.expect_put_object().times(0);
    let mut callback = MockCallback::new();
    callback.expect_send().times(0);

    let function = sync_function(tmp.path(), idle_runner(), store, callback);
    let response = function.handle(&env(&[]), &json!({})).await;

    assert_eq!(
        response,
        SyncResponse::failure("BUCKET_NAME is not set in environment variables")
    );
    assert!(leftover.exists(), "scratch space must not be purged");
}

#[tokio::test]
async fn sync_uploads_export_under_prefix() {
    let tmp = TempDir::new().unwrap();

    let mut store = MockStore::new();
    store
        .expect_put_object()
        .withf(|bucket, key, _, ct| bucket == "ui-bucket" && key == "ui/index.html" && ct == "text/html")
        .times(1)
        .returning(|_, _, _, _| Ok(()));
    store
        .expect_put_object()
        .withf(|bucket, key, _, ct| {
            bucket == "ui-bucket" && key == "ui/_next/app.js" && ct == "text/javascript"
        })
        .times(1)
        .returning(|_, _, _, _| Ok(()));
    let mut callback = MockCallback::new();
    callback.expect_send().times(0);

    let function = sync_function(tmp.path(), building_runner(tmp.path()), store, callback);
    let mut vars = sync_env();
    vars.insert("KEY_PREFIX".to_owned(), "ui".to_owned());

    let response = function.handle(&vars, &json!({})).await;

    assert_eq!(response, SyncResponse::success());
}

#[tokio::test]
async fn sync_partial_upload_failure_still_succeeds() {
    let tmp = TempDir::new().unwrap();

    let mut store = MockStore::new();
    store.expect_put_object().returning(|_, key, _, _| {
        if key.ends_with(".js") {
            Err(StoreError::Put {
                key: key.to_owned(),
                detail: "AccessDenied".to_owned(),
            })
        } else {
            Ok(())
        }
    });
    let mut callback = MockCallback::new();
    callback.expect_send().times(0);

    let function = sync_function(tmp.path(), building_runner(tmp.path()), store, callback);
    let response = function.handle(&sync_env(), &json!({})).await;

    assert_eq!(response, SyncResponse::success());
}

#[tokio::test]
async fn sync_reports_success_to_callback() {
    let tmp = TempDir::new().unwrap();

    let mut store = MockStore::new();
    store.expect_put_object().returning(|_, _, _, _| Ok(()));
    let mut callback = MockCallback::new();
    callback
        .expect_send()
        .withf(|url, response| {
            url == RESPONSE_URL
                && response.status == CallbackStatus::Success
                && response.request_id == "req-1"
                && response.data == json!({"Uploaded": 2, "Failed": 0})
        })
        .times(1)
        .returning(|_, _| Ok(()));

    let function = sync_function(tmp.path(), building_runner(tmp.path()), store, callback);
    let event = json!({
        "RequestType": "Create",
        "ResponseURL": RESPONSE_URL,
        "RequestId": "req-1",
        "LogicalResourceId": "BuildTrigger"
    });
    let response = function.handle(&sync_env(), &event).await;

    assert_eq!(response, SyncResponse::success());
}

#[tokio::test]
async fn sync_reports_failure_reason_to_callback() {
    let tmp = TempDir::new().unwrap();

    let mut store = MockStore::new();
    store.expect_put_object().times(0);
    let mut callback = MockCallback::new();
    callback
        .expect_send()
        .withf(|_, response| {
            response.status == CallbackStatus::Failed
                && response.reason == "REPO_NAME is not set in environment variables"
        })
        .times(1)
        .returning(|_, _| Ok(()));

    let function = sync_function(tmp.path(), idle_runner(), store, callback);
    let response = function
        .handle(
            &env(&[("BUCKET_NAME", "ui-bucket")]),
            &json!({ "ResponseURL": RESPONSE_URL }),
        )
        .await;

    assert_eq!(response.status_code, 500);
}

#[tokio::test]
async fn sync_callback_failure_keeps_response() {
    let tmp = TempDir::new().unwrap();

    let mut store = MockStore::new();
    store.expect_put_object().returning(|_, _, _, _| Ok(()));
    let mut callback = MockCallback::new();
    callback
        .expect_send()
        .times(1)
        .returning(|_, _| Err(CallbackError::Status { status: 403 }));

    let function = sync_function(tmp.path(), building_runner(tmp.path()), store, callback);
    let response = function
        .handle(&sync_env(), &json!({ "ResponseURL": RESPONSE_URL }))
        .await;

    assert_eq!(response, SyncResponse::success());
}

#[tokio::test]
async fn sync_build_failure_message_names_step() {
    let tmp = TempDir::new().unwrap();

    let mut store = MockStore::new();
    store.expect_put_object().times(0);
    let mut callback = MockCallback::new();
    callback.expect_send().times(0);

    let function = sync_function(tmp.path(), failing_clone_runner(), store, callback);
    let response = function.handle(&sync_env(), &json!({})).await;

    assert_eq!(response.status_code, 500);
    assert!(response.message.starts_with("clone step failed"), "{}", response.message);
}

#[test]
fn sync_response_uses_proxy_field_names() {
    let body = serde_json::to_value(SyncResponse::success()).unwrap();
    assert_eq!(body, json!({"statusCode": 200, "message": "Success"}));
}
