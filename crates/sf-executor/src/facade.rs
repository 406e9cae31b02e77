//! Outer facade (C9): wires the tool registry, scheduler, graph executor,
//! and storage together behind the small set of operations a caller (the
//! CLI, or an embedding service) actually needs. Grounded on `oj-daemon`'s
//! pattern of a thin lifecycle-owning struct fronting the engine internals.

use chrono::Utc;
use parking_lot::RwLock;
use sf_adapters::ToolRegistry;
use sf_core::{
    CheckpointRecord, Clock, CoreError, CoreResult, RunContext, RunId, RunStatus, WorkflowConfig,
    WorkflowState, WorkflowSummary, WorkflowTemplate, WorkflowType,
};
use sf_engine::{GraphExecutor, TaskScheduler, TemplateRegistry, ToolService};
use sf_storage::Store;
use std::sync::Arc;

pub struct Executor<C: Clock + 'static> {
    templates: RwLock<TemplateRegistry>,
    graph_executor: GraphExecutor<C>,
    store: Arc<Store>,
}

impl<C: Clock + 'static> Executor<C> {
    pub fn new(registry: Arc<ToolRegistry>, store: Arc<Store>, config: WorkflowConfig, clock: C) -> Self {
        let scheduler = Arc::new(TaskScheduler::new(config.concurrency.max_parallel_tools, config.retry, clock));
        let tool_service = Arc::new(ToolService::new(registry, scheduler));
        Self {
            templates: RwLock::new(TemplateRegistry::new()),
            graph_executor: GraphExecutor::new(tool_service, config),
            store,
        }
    }

    pub fn register_custom_template(&self, id: impl Into<String>, template: WorkflowTemplate) {
        self.templates.write().register_custom(id, template);
    }

    /// Creates a new run from `context`, validates it against its template,
    /// and walks every node to completion or to a human-review pause.
    pub async fn execute(&self, context: RunContext) -> CoreResult<WorkflowState> {
        let template = self.template_for_type(context.workflow_type)?;
        template.validate_tool_ids(&context.tool_ids).map_err(CoreError::ValidationError)?;

        let run_id = RunId::new();
        let state = WorkflowState::new(run_id, context, Utc::now());
        self.store.save_run(&state)?;

        let final_state = self.graph_executor.run(&template, state, self.store.as_ref()).await;
        self.store.save_run(&final_state)?;
        tracing::info!(run_id = %final_state.run_id, status = ?final_state.status, "run completed");
        Ok(final_state)
    }

    /// In-memory-first status lookup; `sf-storage`'s materialized view is
    /// itself in-memory, so this is really "ask the store," but the method
    /// exists as the seam a future in-process run cache would slot into.
    pub fn get_status(&self, run_id: RunId) -> CoreResult<WorkflowState> {
        self.store.get_run(run_id).ok_or_else(|| CoreError::NotFound(run_id.to_string()))
    }

    /// Marks a run paused. Since this executor runs a workflow to
    /// completion within a single `execute()` call rather than as a
    /// cancellable background task, this only has an effect on a run that
    /// is already sitting at its human-review gate, or as a pre-emptive
    /// marker a caller sets before a future `execute()`.
    pub fn pause(&self, run_id: RunId) -> CoreResult<WorkflowState> {
        let mut state = self.get_status(run_id)?;
        if state.is_completed() {
            return Err(CoreError::ValidationError(format!("run {run_id} has already finished and cannot be paused")));
        }
        state.status = RunStatus::Paused;
        self.store.save_run(&state)?;
        Ok(state)
    }

    /// Resumes a paused run from the node after its last completed one.
    pub async fn resume(&self, run_id: RunId) -> CoreResult<WorkflowState> {
        let state = self.get_status(run_id)?;
        if !state.is_paused() {
            return Err(CoreError::ValidationError(format!("run {run_id} is not paused")));
        }
        let template = self.template_for_type(state.workflow_type)?;
        let final_state = self.graph_executor.resume(&template, state, self.store.as_ref()).await;
        self.store.save_run(&final_state)?;
        Ok(final_state)
    }

    pub fn cancel(&self, run_id: RunId) -> CoreResult<WorkflowState> {
        let mut state = self.get_status(run_id)?;
        if state.is_completed() {
            return Err(CoreError::ValidationError(format!("run {run_id} has already finished and cannot be cancelled")));
        }
        state.status = RunStatus::Cancelled;
        state.completed_at = Some(Utc::now());
        self.store.save_run(&state)?;
        Ok(state)
    }

    pub fn delete(&self, run_id: RunId) -> CoreResult<()> {
        Ok(self.store.delete_run(run_id)?)
    }

    pub fn list_checkpoints(&self, run_id: RunId) -> Vec<CheckpointRecord> {
        self.store.list_checkpoints(run_id)
    }

    pub fn list_workflows(&self) -> Vec<WorkflowSummary> {
        self.store.list_runs().iter().map(WorkflowState::summary).collect()
    }

    pub fn list_templates(&self) -> Vec<WorkflowTemplate> {
        self.templates.read().list().into_iter().cloned().collect()
    }

    pub fn close(&self) -> CoreResult<()> {
        Ok(self.store.close()?)
    }

    fn template_for_type(&self, workflow_type: WorkflowType) -> CoreResult<WorkflowTemplate> {
        self.templates
            .read()
            .get_by_type(workflow_type)
            .cloned()
            .ok_or_else(|| CoreError::NotFound(format!("no template registered for {workflow_type:?}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sf_adapters::test_support::StubAdapter;
    use sf_core::{FakeClock, ScanTarget, TargetType};
    use std::collections::HashMap;
    use tempfile::tempdir;

    fn context(tool_ids: Vec<&str>) -> RunContext {
        RunContext {
            workflow_type: WorkflowType::CodeCommit,
            target: ScanTarget::new(TargetType::SourceRepo, "/repo"),
            tool_ids: tool_ids.into_iter().map(String::from).collect(),
            tool_options: HashMap::new(),
            created_by: Some("ci-bot".into()),
            tags: vec!["pr-1234".into()],
        }
    }

    fn executor() -> (tempfile::TempDir, Executor<FakeClock>) {
        let dir = tempdir().unwrap();
        let registry = Arc::new(ToolRegistry::new());
        registry.register(Arc::new(StubAdapter::success("sast-default")));
        let store = Arc::new(Store::open(dir.path().join("runs.wal"), sf_core::CheckpointConfig::default()).unwrap());
        // Zero-delay retry: nothing here exercises retry behavior, and a
        // default backoff schedule would make a failing test pay real time.
        let no_delay_retry = sf_core::RetryConfig {
            max_retries: 0,
            retry_delay_secs: 0.0,
            backoff_multiplier: 1.0,
            max_retry_delay_secs: 0.0,
            jitter_fraction: 0.0,
        };
        let config = WorkflowConfig { retry: no_delay_retry, ..WorkflowConfig::default() };
        (dir, Executor::new(registry, store, config, FakeClock::new()))
    }

    #[tokio::test]
    async fn execute_rejects_a_run_missing_required_tools() {
        let (_dir, executor) = executor();
        let err = executor.execute(context(vec![])).await.unwrap_err();
        assert_eq!(err.kind(), "validation_error");
    }

    #[tokio::test]
    async fn execute_persists_the_run_and_get_status_finds_it() {
        let (_dir, executor) = executor();
        let state = executor.execute(context(vec!["sast-default"])).await.unwrap();
        let fetched = executor.get_status(state.run_id).unwrap();
        assert_eq!(fetched.status, RunStatus::Success);
    }

    #[tokio::test]
    async fn get_status_on_unknown_run_is_not_found() {
        let (_dir, executor) = executor();
        let err = executor.get_status(RunId::new()).unwrap_err();
        assert_eq!(err.kind(), "not_found");
    }

    #[tokio::test]
    async fn cancel_then_delete_removes_the_run() {
        let (_dir, executor) = executor();
        let state = executor.execute(context(vec!["sast-default"])).await.unwrap();
        // a finished run can't be cancelled, but it can always be deleted.
        assert!(executor.cancel(state.run_id).is_err());
        executor.delete(state.run_id).unwrap();
        assert!(executor.get_status(state.run_id).is_err());
    }

    #[test]
    fn list_templates_reflects_registered_built_ins_and_custom() {
        let (_dir, executor) = executor();
        let before = executor.list_templates().len();
        executor.register_custom_template(
            "my-custom",
            sf_engine::custom(vec!["sast-default".into()], vec![sf_core::NodeKind::Initialize, sf_core::NodeKind::Finalize]),
        );
        assert_eq!(executor.list_templates().len(), before + 1);
    }
}
