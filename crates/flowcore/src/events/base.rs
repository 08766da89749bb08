use crate::WorkflowExecution;
use tokio::sync::broadcast;

/// Receives a snapshot of the run record after every state transition.
///
/// Each call gets its own owned copy; holding on to one never aliases the
/// record the executor keeps mutating.
pub trait ExecutionObserver: Send + Sync {
    fn on_update(&self, execution: WorkflowExecution);
}

impl<F> ExecutionObserver for F
where
    F: Fn(WorkflowExecution) + Send + Sync,
{
    fn on_update(&self, execution: WorkflowExecution) {
        self(execution)
    }
}

/// Global event bus
pub struct EventBus {
    sender: broadcast::Sender<WorkflowExecution>,
}

impl EventBus {
    /// `capacity` is the number of snapshots buffered per subscriber; zero is raised to one.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<WorkflowExecution> {
        self.sender.subscribe()
    }

    pub fn emit(&self, execution: WorkflowExecution) {
        // No subscribers is not an error.
        let _ = self.sender.send(execution);
    }
}

impl ExecutionObserver for EventBus {
    fn on_update(&self, execution: WorkflowExecution) {
        self.emit(execution);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ExecutionMode, ExecutionStatus, Workflow};
    use std::sync::{Arc, Mutex};

    #[tokio::test]
    async fn bus_delivers_snapshots_to_subscribers() {
        let bus = EventBus::new(8);
        let mut rx = bus.subscribe();

        let mut exec = WorkflowExecution::new(&Workflow::new("bus"), ExecutionMode::Manual);
        bus.on_update(exec.clone());
        exec.status = ExecutionStatus::Running;
        bus.on_update(exec.clone());

        assert_eq!(rx.recv().await.unwrap().status, ExecutionStatus::Pending);
        assert_eq!(rx.recv().await.unwrap().status, ExecutionStatus::Running);
    }

    #[tokio::test]
    async fn zero_capacity_still_delivers() {
        let bus = EventBus::new(0);
        let mut rx = bus.subscribe();

        bus.emit(WorkflowExecution::new(&Workflow::new("tiny"), ExecutionMode::Manual));
        assert_eq!(rx.recv().await.unwrap().status, ExecutionStatus::Pending);
    }

    #[test]
    fn closures_are_observers() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let observer = move |e: WorkflowExecution| sink.lock().unwrap().push(e.status);

        observer.on_update(WorkflowExecution::new(&Workflow::new("c"), ExecutionMode::Manual));
        assert_eq!(*seen.lock().unwrap(), vec![ExecutionStatus::Pending]);
    }
}
