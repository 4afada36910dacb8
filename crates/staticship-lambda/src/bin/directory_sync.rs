use lambda_runtime::{Error, LambdaEvent, service_fn};
use serde_json::Value;
use staticship_core::{BuildSettings, ProcessEnv};
use staticship_lambda::handlers::SyncFunction;

#[tokio::main]
async fn main() -> Result<(), Error> {
    staticship_lambda::telemetry::init_lambda();

    let function = SyncFunction::from_aws(BuildSettings::default()).await;
    let function = &function;

    lambda_runtime::run(service_fn(move |event: LambdaEvent<Value>| async move {
        Ok::<_, Error>(function.handle(&ProcessEnv, &event.payload).await)
    }))
    .await
}
