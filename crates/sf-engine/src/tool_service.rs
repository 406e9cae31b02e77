//! Tool service: dispatches scans across one or many registered adapters.
//! Grounded on `original_source/safeflow/services/tool_service.py`, with one
//! deliberate deviation: `scan_with_multiple_tools` dispatches through the
//! [`crate::scheduler::TaskScheduler`] instead of looping tools serially —
//! the original's sequential loop does not match the specification's
//! requirement that multi-tool scans run bounded-parallel.

use crate::scheduler::{ScheduledTask, TaskPriority, TaskScheduler};
use sf_core::{Clock, CoreError, Finding, ToolExecutionResult};
use sf_adapters::{AdapterRequest, ToolRegistry};
use std::collections::HashMap;
use std::sync::Arc;

pub struct ToolService<C: Clock> {
    registry: Arc<ToolRegistry>,
    scheduler: Arc<TaskScheduler<C>>,
}

impl<C: Clock + 'static> ToolService<C> {
    pub fn new(registry: Arc<ToolRegistry>, scheduler: Arc<TaskScheduler<C>>) -> Self {
        Self { registry, scheduler }
    }

    /// Scans with a single tool, retried through the scheduler under the
    /// same backoff policy as a multi-tool dispatch — a single-tool `Scan`
    /// node gets the same retry guarantee as a `ParallelScan` node.
    pub async fn scan_with_tool(&self, tool_id: &str, request: AdapterRequest) -> ToolExecutionResult {
        if self.registry.get_adapter(tool_id).is_none() {
            return ToolExecutionResult {
                tool_id: tool_id.to_string(),
                tool_name: tool_id.to_string(),
                success: false,
                findings: Vec::new(),
                error: Some(CoreError::NotRegistered(tool_id.to_string()).to_string()),
                started_at: chrono::Utc::now(),
                completed_at: Some(chrono::Utc::now()),
                duration_ms: Some(0),
                metadata: HashMap::new(),
            };
        }

        let results = self.scan_with_multiple_tools(std::slice::from_ref(&tool_id.to_string()), request).await;
        results.into_iter().next().unwrap_or_else(|| ToolExecutionResult {
            tool_id: tool_id.to_string(),
            tool_name: tool_id.to_string(),
            success: false,
            findings: Vec::new(),
            error: Some("scheduler returned no result".to_string()),
            started_at: chrono::Utc::now(),
            completed_at: Some(chrono::Utc::now()),
            duration_ms: Some(0),
            metadata: HashMap::new(),
        })
    }

    /// Scans with every tool id given, or every registered tool if
    /// `tool_ids` is empty. Each tool runs as its own scheduled task so the
    /// scheduler's concurrency bound governs how many run at once, and the
    /// scheduler's retry loop sees each adapter failure directly (the task
    /// returns `Err`, not a swallowed `success: false` result), so a flaky
    /// adapter actually gets retried rather than being recorded as a
    /// one-shot failure.
    pub async fn scan_with_multiple_tools(&self, tool_ids: &[String], request: AdapterRequest) -> Vec<ToolExecutionResult> {
        let tool_ids = if tool_ids.is_empty() { self.registry.get_tool_ids() } else { tool_ids.to_vec() };

        let tasks: Vec<ScheduledTask<(String, Vec<Finding>)>> = tool_ids
            .into_iter()
            .map(|tool_id| {
                let registry = self.registry.clone();
                let request = request.clone();
                ScheduledTask::new(tool_id.clone(), move || {
                    let registry = registry.clone();
                    let request = request.clone();
                    let tool_id = tool_id.clone();
                    Box::pin(async move {
                        let adapter = registry.get_adapter(&tool_id).ok_or_else(|| CoreError::NotRegistered(tool_id.clone()))?;
                        let tool_name = adapter.tool_name().to_string();
                        match adapter.run_inner(&request).await {
                            Ok(findings) => {
                                tracing::info!(tool_id = %tool_id, findings = findings.len(), "adapter run succeeded");
                                Ok((tool_name, findings))
                            }
                            Err(err) => {
                                tracing::warn!(tool_id = %tool_id, error = %err, "adapter run failed");
                                Err(err)
                            }
                        }
                    })
                })
                .priority(TaskPriority::Normal)
            })
            .collect();

        let results = self.scheduler.schedule_parallel(tasks, false).await;
        results
            .into_iter()
            .map(|r| {
                let mut metadata = HashMap::new();
                metadata.insert("retry_count".to_string(), serde_json::json!(r.retry_count));
                match r.output {
                    Some((tool_name, findings)) => ToolExecutionResult {
                        tool_id: r.task_name,
                        tool_name,
                        success: true,
                        findings,
                        error: None,
                        started_at: chrono::Utc::now(),
                        completed_at: Some(chrono::Utc::now()),
                        duration_ms: Some(r.duration_ms),
                        metadata,
                    },
                    None => ToolExecutionResult {
                        tool_id: r.task_name.clone(),
                        tool_name: r.task_name,
                        success: false,
                        findings: Vec::new(),
                        error: r.error,
                        started_at: chrono::Utc::now(),
                        completed_at: Some(chrono::Utc::now()),
                        duration_ms: Some(r.duration_ms),
                        metadata,
                    },
                }
            })
            .collect()
    }

    pub fn recommend_tools_for_target(&self, language: Option<&str>) -> Vec<String> {
        match language {
            Some(lang) => self.registry.discover_by_language(lang),
            None => self.registry.get_tool_ids(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct AggregatedResults {
    pub total_vulnerabilities: usize,
    pub severity_distribution: HashMap<String, usize>,
    pub tool_distribution: HashMap<String, usize>,
    pub successful_scans: usize,
    pub failed_scans: usize,
}

pub fn aggregate_results(results: &[ToolExecutionResult]) -> AggregatedResults {
    let mut aggregated = AggregatedResults::default();
    for result in results {
        if result.success {
            aggregated.successful_scans += 1;
        } else {
            aggregated.failed_scans += 1;
        }
        *aggregated.tool_distribution.entry(result.tool_id.clone()).or_default() += result.findings.len();
        aggregated.total_vulnerabilities += result.findings.len();
        for finding in &result.findings {
            *aggregated.severity_distribution.entry(finding.severity.to_string()).or_default() += 1;
        }
    }
    aggregated
}

pub fn severity_score(findings: &[Finding]) -> f64 {
    findings.iter().map(|f| f.score).sum::<f64>() / findings.len().max(1) as f64
}
