use kiqforge::prelude::*;
use std::sync::Arc;

#[tokio::main]
async fn main() -> KiqResult<()> {
    LoggingConfig::default().init()?;

    let connector = Arc::new(InMemoryConnector::new());
    let mut dispatcher = Dispatcher::with_error_handler(
        connector.clone(),
        Arc::new(TracingErrorHandler),
    );

    let mailers = dispatcher.queue("mailers")?;
    let welcome = dispatcher.job_with_retry(&mailers, "WelcomeMailer", Retry::Attempts(3))?;

    welcome.perform_async(("alice@example.com", 42u64)).await?;
    welcome
        .perform_in(10u64.secs(), ("bob@example.com", 43u64))
        .await?;

    // Negative delays are rejected
    if let Err(e) = welcome.perform_in(Delay::secs(-1), ()).await {
        println!("❌ {}", e);
    }

    while let Some(payload) = connector.pop("mailers").await {
        println!("📤 {}", payload);
    }
    for entry in connector.scheduled().await {
        println!("⏰ {} at {:.3}", entry.member, entry.score);
    }

    Ok(())
}
