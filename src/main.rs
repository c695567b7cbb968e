use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    reporocket_lib::run().await
}
