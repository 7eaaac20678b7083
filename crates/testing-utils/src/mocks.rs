//! Mock implementations for the store and task module traits
//!
//! In-memory test doubles that let coordinator and executor tests run
//! without a database.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use periodic_core::{
    PeriodicError, PeriodicResult, PeriodicTask, TaskContext, TaskModule, TaskResult, TaskStore,
};

/// Mock implementation of TaskStore for testing
#[derive(Debug, Clone, Default)]
pub struct MockTaskStore {
    tasks: Arc<Mutex<BTreeMap<i64, PeriodicTask>>>,
    fail_writes: Arc<AtomicBool>,
    fail_reads: Arc<AtomicBool>,
    writes: Arc<AtomicUsize>,
}

impl MockTaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tasks(tasks: Vec<PeriodicTask>) -> Self {
        let store = Self::new();
        for task in tasks {
            store.insert(task);
        }
        store
    }

    pub fn insert(&self, task: PeriodicTask) {
        self.tasks.lock().unwrap().insert(task.id, task);
    }

    /// 之后的 record_last_run 调用返回持久化错误
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// 之后的 list_tasks / get_task_by_name 调用返回持久化错误
    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// 成功写入 last_run 的次数
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn last_run(&self, task_id: i64, node: &str) -> Option<DateTime<Utc>> {
        self.tasks
            .lock()
            .unwrap()
            .get(&task_id)
            .and_then(|task| task.last_run_on(node))
    }

    pub fn get_all_tasks(&self) -> Vec<PeriodicTask> {
        self.tasks.lock().unwrap().values().cloned().collect()
    }

    fn check_reads(&self) -> PeriodicResult<()> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(PeriodicError::persistence_error("mock store unavailable"));
        }
        Ok(())
    }
}

#[async_trait]
impl TaskStore for MockTaskStore {
    async fn list_tasks(&self) -> PeriodicResult<Vec<PeriodicTask>> {
        self.check_reads()?;
        Ok(self.get_all_tasks())
    }

    async fn get_task_by_name(&self, name: &str) -> PeriodicResult<PeriodicTask> {
        self.check_reads()?;
        self.tasks
            .lock()
            .unwrap()
            .values()
            .find(|task| task.name == name)
            .cloned()
            .ok_or_else(|| PeriodicError::TaskNotFound {
                name: name.to_string(),
            })
    }

    async fn record_last_run(
        &self,
        task_id: i64,
        node: &str,
        timestamp: DateTime<Utc>,
    ) -> PeriodicResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(PeriodicError::persistence_error("mock store rejected write"));
        }

        let mut tasks = self.tasks.lock().unwrap();
        let task = tasks.get_mut(&task_id).ok_or_else(|| {
            PeriodicError::persistence_error(format!("task id {task_id} does not exist"))
        })?;
        let entry = task.last_run.entry(node.to_string()).or_insert(timestamp);
        if *entry < timestamp {
            *entry = timestamp;
        }
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// MockTaskModule 的预设行为
#[derive(Debug, Clone)]
pub enum MockBehavior {
    Succeed,
    Fail(String),
    Error(String),
    Panic(String),
    Sleep(Duration),
}

/// Mock implementation of TaskModule for testing
#[derive(Debug, Clone)]
pub struct MockTaskModule {
    name: String,
    behavior: MockBehavior,
    calls: Arc<Mutex<Vec<TaskContext>>>,
}

impl MockTaskModule {
    pub fn new(name: &str, behavior: MockBehavior) -> Self {
        Self {
            name: name.to_string(),
            behavior,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn succeeding(name: &str) -> Self {
        Self::new(name, MockBehavior::Succeed)
    }

    pub fn failing(name: &str) -> Self {
        Self::new(name, MockBehavior::Fail(format!("{name} failed")))
    }

    pub fn erroring(name: &str) -> Self {
        Self::new(name, MockBehavior::Error(format!("{name} raised")))
    }

    pub fn panicking(name: &str) -> Self {
        Self::new(name, MockBehavior::Panic(format!("{name} panicked")))
    }

    pub fn sleeping(name: &str, duration: Duration) -> Self {
        Self::new(name, MockBehavior::Sleep(duration))
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn calls(&self) -> Vec<TaskContext> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl TaskModule for MockTaskModule {
    fn name(&self) -> &str {
        &self.name
    }

    async fn run(&self, context: &TaskContext) -> PeriodicResult<TaskResult> {
        self.calls.lock().unwrap().push(context.clone());
        match &self.behavior {
            MockBehavior::Succeed => Ok(TaskResult::success(format!("{} ok", self.name))),
            MockBehavior::Fail(message) => Ok(TaskResult::failure(message.clone())),
            MockBehavior::Error(message) => Err(PeriodicError::TaskExecution(message.clone())),
            MockBehavior::Panic(message) => panic!("{}", message),
            MockBehavior::Sleep(duration) => {
                tokio::time::sleep(*duration).await;
                Ok(TaskResult::success("woke up"))
            }
        }
    }
}
