//! Operation executor
//!
//! Applies a [`Plan`] against a [`RegistryClient`], strictly in order, one
//! operation at a time. The first failure stops the run. Operations that
//! already succeeded are **not** rolled back; the next reconciliation pass
//! reads the partially applied state and plans from there.
//!
//! In dry-run mode no request is issued: every operation and its payload is
//! logged and reported as skipped.

use crate::error::{Error, Result};
use crate::reconciler::{Operation, Plan};
use crate::traits::RegistryClient;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// The operation that stopped a run and why
#[derive(Debug)]
pub struct OperationFailure {
    /// Operation that failed
    pub operation: Operation,
    /// Error returned by the client
    pub error: Error,
}

/// Outcome of executing a plan
#[derive(Debug, Default)]
pub struct ExecutionReport {
    /// Operations that reached the registrar successfully, in order
    pub applied: Vec<Operation>,
    /// Operations not sent because of dry-run mode
    pub skipped: Vec<Operation>,
    /// First failure, if any; later operations were not attempted
    pub failure: Option<OperationFailure>,
    /// Number of operations in the plan
    pub total: usize,
}

impl ExecutionReport {
    /// Whether every operation was applied (or skipped in dry-run)
    pub fn is_success(&self) -> bool {
        self.failure.is_none()
    }

    /// Convert into a `Result`, wrapping a failure in [`Error::Execution`]
    pub fn into_result(self) -> Result<Vec<Operation>> {
        match self.failure {
            None => Ok(self.applied),
            Some(OperationFailure { operation, error }) => Err(Error::Execution {
                applied: self.applied.len(),
                total: self.total,
                operation: operation.to_string(),
                source: Box::new(error),
            }),
        }
    }
}

/// Executes plans sequentially against the registrar
#[derive(Debug, Clone)]
pub struct OperationExecutor {
    client: Arc<dyn RegistryClient>,
    dry_run: bool,
}

impl OperationExecutor {
    /// Create an executor that sends requests
    pub fn new(client: Arc<dyn RegistryClient>) -> Self {
        Self {
            client,
            dry_run: false,
        }
    }

    /// Enable or disable dry-run mode
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Whether requests are suppressed
    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Execute every operation of `plan` in order, stopping at the first failure
    pub async fn execute(&self, plan: &Plan) -> ExecutionReport {
        let mut report = ExecutionReport {
            total: plan.len(),
            ..Default::default()
        };

        if plan.is_empty() {
            debug!("Nothing to execute, plan is empty");
            return report;
        }

        for operation in plan {
            if self.dry_run {
                let payload = operation
                    .payload()
                    .ok()
                    .flatten()
                    .map(|value| value.to_string())
                    .unwrap_or_default();
                info!("[DRY-RUN] Would {} {}", operation, payload);
                report.skipped.push(operation.clone());
                continue;
            }

            info!("Applying {}", operation);
            match self.apply(operation).await {
                Ok(()) => report.applied.push(operation.clone()),
                Err(e) => {
                    error!(
                        "Failed to {} after {}/{} operation(s) applied: {}",
                        operation,
                        report.applied.len(),
                        report.total,
                        e
                    );
                    if !report.applied.is_empty() {
                        warn!(
                            "Remote state is partially applied; the next reconciliation will converge it"
                        );
                    }
                    report.failure = Some(OperationFailure {
                        operation: operation.clone(),
                        error: e,
                    });
                    break;
                }
            }
        }

        report
    }

    async fn apply(&self, operation: &Operation) -> Result<()> {
        match operation {
            Operation::UpdateDomain { domain, update } => {
                self.client.update_domain(domain, update).await
            }
            Operation::CreateNameservers {
                domain,
                nameservers,
            } => self.client.create_nameservers(domain, nameservers).await,
            Operation::UpdateNameserver { domain, nameserver } => {
                self.client
                    .update_nameserver(domain, &nameserver.hostname, nameserver)
                    .await
            }
            Operation::DeleteNameserver { domain, hostname } => {
                self.client.delete_nameserver(domain, hostname).await
            }
            Operation::UpdateDnsZone { domain, zone } => {
                self.client.update_dns_zone(domain, zone).await
            }
        }
    }
}
