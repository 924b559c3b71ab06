use std::{future::Future, time::Duration};

use tokio::task::JoinHandle;

use crate::Context;

pub mod favorites;
pub mod help;
pub mod mood;
pub mod status;

pub(crate) fn get_bot_avatar(ctx: Context<'_>) -> String {
    ctx.cache().current_user().avatar_url().unwrap_or_default()
}

/// runs `task` once `delay` has passed, without holding up the caller.
pub(crate) fn spawn_after<F>(delay: Duration, task: F) -> JoinHandle<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        task.await;
    })
}

#[cfg(test)]
mod tests {
    use std::sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    };

    use super::*;

    #[tokio::test]
    async fn delayed_task_runs_in_the_background() {
        let ran = Arc::new(AtomicBool::new(false));
        let flag = ran.clone();

        let handle = spawn_after(Duration::from_millis(50), async move {
            flag.store(true, Ordering::SeqCst);
        });

        // the caller gets control back before the delay is up
        assert!(!ran.load(Ordering::SeqCst));

        handle.await.unwrap();
        assert!(ran.load(Ordering::SeqCst));
    }
}
