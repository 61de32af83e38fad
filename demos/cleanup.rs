use kiqforge::prelude::*;
use std::sync::Arc;

remote_job! {
    /// Purges stale records, performed by the Ruby workers
    pub struct CleanUpJob => "App::Jobs::CleanUp" {
        fn clean_up(limit: u32);
    }
}

#[tokio::main]
async fn main() -> KiqResult<()> {
    let config = KiqConfig::development();
    config.logging.init()?;

    let redis_config = config.redis.clone().with_namespace("kiqforge-demo");
    println!(
        "🔗 Connecting to Redis at {}",
        redis_config.connection_string
    );

    let mut dispatcher =
        Dispatcher::with_redis(redis_config, Arc::new(TracingErrorHandler)).await?;
    dispatcher.health_check().await?;

    let low = dispatcher.queue("low")?;
    let cleanup = CleanUpJob::new(&mut dispatcher, &low)?;

    let jid = cleanup.clean_up(50).await?;
    println!("📥 Enqueued {} on queue {}", jid, low.name());

    let jid = cleanup.clean_up_in(30u64.minutes(), 50).await?;
    println!("⏰ Scheduled {} to run in 30 minutes", jid);

    Ok(())
}
