use ca_core::CaCore;
use ca_core::provider::task::TaskType;
use ca_core::service::task::TaskService;
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};

/// Starts the refresh loop and, when enabled, the autosign loop
pub fn spawn_periodic_tasks(core: &CaCore) -> Vec<JoinHandle<()>> {
    let mut handles = vec![spawn_periodic(
        core.task_service.clone(),
        TaskType::Refresh,
        core.config.refresh.interval,
    )];

    if core.config.autosign.enabled {
        handles.push(spawn_periodic(
            core.task_service.clone(),
            TaskType::Autosign,
            core.config.autosign.interval,
        ));
    }

    handles
}

fn spawn_periodic(
    task_service: TaskService,
    task: TaskType,
    period: time::Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let Ok(period) = std::time::Duration::try_from(period) else {
            tracing::error!(%task, %period, "Invalid task period, task disabled");
            return;
        };

        tracing::info!(%task, ?period, "Scheduling periodic task");

        let mut ticks = interval(period);
        ticks.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            ticks.tick().await;

            match task_service.run(&task.to_string()).await {
                Ok(result) => tracing::debug!(%task, %result, "Periodic task finished"),
                Err(error) => tracing::error!(%task, %error, "Periodic task failed"),
            }
        }
    })
}
