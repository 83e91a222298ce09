use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use super::dispatch::Dispatcher;
use super::telegram::{TelegramClient, Update};
use crate::core::CurrencyConverter;

const POLL_ERROR_PAUSE: Duration = Duration::from_secs(5);

/// Long-polls for updates until Ctrl-C. Each update is handled on its own task.
pub async fn run_polling<C>(
    client: Arc<TelegramClient>,
    dispatcher: Arc<Dispatcher<C>>,
    poll_timeout: Duration,
) -> Result<()>
where
    C: CurrencyConverter + 'static,
{
    info!("Polling for updates");
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    let mut offset = 0;
    let mut tasks = JoinSet::new();

    loop {
        while tasks.try_join_next().is_some() {}

        let polled = tokio::select! {
            _ = &mut shutdown => break,
            result = poll_once(&client, &dispatcher, offset, poll_timeout, &mut tasks) => result,
        };

        match polled {
            Ok(next) => offset = next,
            Err(e) => {
                warn!(error = %e, "Failed to poll updates, retrying");
                tokio::select! {
                    _ = &mut shutdown => break,
                    _ = tokio::time::sleep(POLL_ERROR_PAUSE) => {}
                }
            }
        }
    }

    info!("Shutting down");
    Ok(())
}

/// Fetches one batch of updates starting at `offset`, spawns a handler for
/// each onto `tasks` and returns the offset for the next poll.
pub async fn poll_once<C>(
    client: &Arc<TelegramClient>,
    dispatcher: &Arc<Dispatcher<C>>,
    offset: i64,
    poll_timeout: Duration,
    tasks: &mut JoinSet<()>,
) -> Result<i64>
where
    C: CurrencyConverter + 'static,
{
    let updates = client.get_updates(offset, poll_timeout).await?;
    let next = updates.last().map_or(offset, |last| last.update_id + 1);
    debug!(count = updates.len(), next, "Received updates");

    for update in updates {
        tasks.spawn(handle_update(
            Arc::clone(client),
            Arc::clone(dispatcher),
            update,
        ));
    }
    Ok(next)
}

async fn handle_update<C: CurrencyConverter>(
    client: Arc<TelegramClient>,
    dispatcher: Arc<Dispatcher<C>>,
    update: Update,
) {
    for action in dispatcher.handle_update(&update).await {
        if let Err(e) = client.execute(&action).await {
            error!(update_id = update.update_id, error = %e, "Failed to deliver reply");
        }
    }
}
