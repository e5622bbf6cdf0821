use tokio_util::sync::CancellationToken;

use super::CommandError;
use crate::{context::AppContext, models::CycleResult};

/// Runs a single monitoring cycle and returns its result.
///
/// Ctrl+C cancels the cycle; batches completed until then are kept.
pub async fn execute(context: AppContext) -> Result<CycleResult, CommandError> {
    let orchestrator = context.orchestrator();
    let token = CancellationToken::new();

    let ctrl_c_token = token.clone();
    let ctrl_c = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("SIGINT (Ctrl+C) received, cancelling the cycle.");
            ctrl_c_token.cancel();
        }
    });

    let result = orchestrator.run_cycle(&token).await;
    ctrl_c.abort();
    context.store.close().await;
    Ok(result?)
}

/// Runs one cycle and prints the result as pretty JSON on stdout.
pub async fn print(context: AppContext) -> Result<(), CommandError> {
    let result = execute(context).await?;
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::AppConfig, context::AppContextBuilder, test_helpers::SubscriberBuilder};

    #[tokio::test]
    async fn test_run_once_against_unreachable_feed_annotates_subscribers() {
        let mut config = AppConfig::default();
        config.database_url = "sqlite::memory:".to_string();
        config.feed.base_url = "http://127.0.0.1:9/states/all".parse().unwrap();
        config.feed.retry.max_attempts = 1;
        config.feed.request_timeout = std::time::Duration::from_secs(1);
        config.monitor.inter_batch_delay = std::time::Duration::ZERO;

        let context = AppContextBuilder::from_config(config).await.unwrap();
        context.store.add_subscriber(&SubscriberBuilder::new("sub-1").build()).await.unwrap();

        let result = execute(context).await.unwrap();
        assert_eq!(result.total_subscribers, 1);
        assert_eq!(result.feed_queries, 1);
        assert!(result.subscriber_results[0].error.is_some());
    }
}
