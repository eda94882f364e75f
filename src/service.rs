pub mod analytics;
pub mod player;
pub mod ui;

pub use self::{analytics::*, player::*, ui::*};

/// Spawned task handle that aborts the task on drop
///
/// A superseded or torn down run must not keep its timers alive, so every
/// task the services spawn is owned through one of these.
pub struct TaskHandle {
    task: Option<tokio::task::JoinHandle<()>>,
}

impl TaskHandle {
    pub fn spawn<F>(future: F) -> Self
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        Self {
            task: Some(tokio::spawn(future)),
        }
    }

    pub fn abort(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl Drop for TaskHandle {
    fn drop(&mut self) {
        self.abort();
    }
}
