//! Bounded-concurrency multi-target fan-out (C7).
//!
//! No direct teacher analog - `lukeod-async-snmp` is a single-target
//! client library. [`Orchestrator`] is grounded in the same shapes the
//! rest of this crate already uses for concurrent work: [`Client`] is
//! cheap to clone so many targets can share one [`SharedUdpHandle`](crate::transport::SharedUdpHandle),
//! `tokio::spawn` + `tokio::sync::Semaphore` bound how many of those run at
//! once, and per-target outcomes are isolated the same way
//! [`crate::session::PduSession`] isolates a single request's timeout from
//! its retries - one slow or failing target never affects another's result.

use std::collections::HashMap;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use tokio::sync::Semaphore;

use crate::client::Client;
use crate::error::{Error, Result};
use crate::oid::Oid;
use crate::transport::Transport;
use crate::varbind::VarBind;

/// How a failed per-target slot in [`Orchestrator`] should be reported.
#[derive(Debug)]
#[non_exhaustive]
pub enum TargetError {
    /// The operation's timeout budget elapsed before it finished.
    Timeout,
    /// The worker task never completed normally (it panicked, or the
    /// bounded-concurrency semaphore was closed).
    TaskFailed(String),
    /// The operation ran to completion and returned an error.
    Op(Error),
}

impl std::fmt::Display for TargetError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TargetError::Timeout => write!(f, "timeout"),
            TargetError::TaskFailed(reason) => write!(f, "task failed: {reason}"),
            TargetError::Op(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for TargetError {}

/// Per-target outcome: the operation's result, or why it didn't produce one.
pub type TargetResult<O> = std::result::Result<O, TargetError>;

/// How [`Orchestrator`] shapes a batch of per-target outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ReturnFormat {
    /// Just the outcomes, in the same order as the input targets.
    List,
    /// Outcomes paired with the target address and work-item OID they came
    /// from, in input order.
    WithTargets,
    /// Outcomes keyed by `(target, oid)`. Distinct work items against the
    /// same target (e.g. two different OIDs via [`Orchestrator::execute_mixed`])
    /// get distinct keys rather than colliding.
    Map,
}

/// A batch of per-target outcomes, shaped per the [`ReturnFormat`] the
/// caller asked for.
#[derive(Debug)]
#[non_exhaustive]
pub enum MultiResult<O> {
    /// See [`ReturnFormat::List`].
    List(Vec<TargetResult<O>>),
    /// See [`ReturnFormat::WithTargets`]. `(target, oid, result)` triples.
    WithTargets(Vec<(SocketAddr, Oid, TargetResult<O>)>),
    /// See [`ReturnFormat::Map`], keyed by `(target, oid)`.
    Map(HashMap<(SocketAddr, Oid), TargetResult<O>>),
}

impl<O> MultiResult<O> {
    /// Number of targets this result covers, regardless of shape.
    pub fn len(&self) -> usize {
        match self {
            MultiResult::List(v) => v.len(),
            MultiResult::WithTargets(v) => v.len(),
            MultiResult::Map(m) => m.len(),
        }
    }

    /// True if this result covers no targets.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A single per-target operation for [`Orchestrator::execute_mixed`].
///
/// Unlike [`Orchestrator::get_multi`]/[`Orchestrator::get_bulk_multi`]/etc,
/// which run the *same* operation against every target, `execute_mixed`
/// lets each target run a different one while still sharing one
/// concurrency budget.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub enum Operation {
    /// `GET` one or more OIDs.
    Get(Vec<Oid>),
    /// `GETBULK` one or more OIDs.
    GetBulk {
        oids: Vec<Oid>,
        non_repeaters: i32,
        max_repetitions: i32,
    },
    /// `GETNEXT`-walk the subtree rooted at this OID.
    Walk(Oid),
    /// `GETBULK`-walk the conceptual table rooted at this OID.
    WalkTable { table_oid: Oid, max_repetitions: i32 },
}

/// Bounded-concurrency fan-out over many SNMP targets.
///
/// Every target runs under the same [`tokio::sync::Semaphore`]-bounded
/// worker pool (`max_concurrent`, default 10) and the same timeout budget
/// for its operation kind, so a handful of slow or unreachable devices
/// never starve or delay the rest of the batch. A target's failure is
/// captured as a [`TargetError`] in its own slot rather than aborting the
/// batch.
#[derive(Debug, Clone)]
pub struct Orchestrator {
    max_concurrent: usize,
    single_op_timeout: Duration,
    walk_op_timeout: Duration,
    table_op_timeout: Duration,
    walk_task_cap: Duration,
}

impl Default for Orchestrator {
    fn default() -> Self {
        Self {
            max_concurrent: 10,
            single_op_timeout: Duration::from_secs(10),
            walk_op_timeout: Duration::from_secs(30),
            table_op_timeout: Duration::from_secs(50),
            walk_task_cap: Duration::from_secs(20 * 60),
        }
    }
}

impl Orchestrator {
    /// An orchestrator with the default concurrency/timeout budget.
    pub fn new() -> Self {
        Self::default()
    }

    /// Maximum number of targets processed concurrently (default: 10).
    pub fn max_concurrent(mut self, n: usize) -> Self {
        self.max_concurrent = n.max(1);
        self
    }

    /// Timeout for a single GET/GETBULK call (default: 10s).
    pub fn single_op_timeout(mut self, timeout: Duration) -> Self {
        self.single_op_timeout = timeout;
        self
    }

    /// Per-PDU timeout while draining a GETNEXT walk (default: 30s).
    pub fn walk_op_timeout(mut self, timeout: Duration) -> Self {
        self.walk_op_timeout = timeout;
        self
    }

    /// Per-PDU timeout while draining a GETBULK table walk (default: 50s).
    pub fn table_op_timeout(mut self, timeout: Duration) -> Self {
        self.table_op_timeout = timeout;
        self
    }

    /// Overall cap on a single target's walk, across all its PDUs
    /// (default: 20 minutes).
    pub fn walk_task_cap(mut self, cap: Duration) -> Self {
        self.walk_task_cap = cap;
        self
    }

    /// `GET` the same OIDs from every client.
    pub async fn get_multi<T: Transport + 'static>(
        &self,
        clients: &[Client<T>],
        oids: &[Oid],
        return_format: ReturnFormat,
    ) -> MultiResult<Vec<VarBind>> {
        let timeout = self.single_op_timeout;
        let oids = oids.to_vec();
        let key_oid = first_oid(&oids);
        let targets = self.run(clients, key_oid, move |client| {
            let oids = oids.clone();
            async move { client.get_many(&oids).await }
        })
        .await;
        Self::shape(targets, return_format)
    }

    /// `GETBULK` the same OIDs from every client.
    pub async fn get_bulk_multi<T: Transport + 'static>(
        &self,
        clients: &[Client<T>],
        oids: &[Oid],
        non_repeaters: i32,
        max_repetitions: i32,
        return_format: ReturnFormat,
    ) -> MultiResult<Vec<VarBind>> {
        let oids = oids.to_vec();
        let key_oid = first_oid(&oids);
        let targets = self.run(clients, key_oid, move |client| {
            let oids = oids.clone();
            async move {
                client
                    .get_bulk(&oids, non_repeaters, max_repetitions)
                    .await
            }
        })
        .await;
        Self::shape(targets, return_format)
    }

    /// `GETNEXT`-walk the same subtree on every client, collecting each
    /// walk's full varbind list.
    pub async fn walk_multi<T: Transport + 'static>(
        &self,
        clients: &[Client<T>],
        root: &Oid,
        return_format: ReturnFormat,
    ) -> MultiResult<Vec<VarBind>> {
        let walk_op_timeout = self.walk_op_timeout;
        let walk_task_cap = self.walk_task_cap;
        let root = root.clone();
        let key_oid = root.clone();
        let targets = self.run(clients, key_oid, move |client| {
            let root = root.clone();
            async move {
                let stream = client.walk(root);
                collect_walk(stream, walk_op_timeout, walk_task_cap).await
            }
        })
        .await;
        Self::shape(targets, return_format)
    }

    /// `GETBULK`-walk the same conceptual table on every client,
    /// collecting each walk's full varbind list.
    pub async fn walk_table_multi<T: Transport + 'static>(
        &self,
        clients: &[Client<T>],
        table_oid: &Oid,
        max_repetitions: i32,
        return_format: ReturnFormat,
    ) -> MultiResult<Vec<VarBind>> {
        let table_op_timeout = self.table_op_timeout;
        let walk_task_cap = self.walk_task_cap;
        let table_oid = table_oid.clone();
        let key_oid = table_oid.clone();
        let targets = self.run(clients, key_oid, move |client| {
            let table_oid = table_oid.clone();
            async move {
                let stream = client.walk_table(table_oid, max_repetitions);
                collect_walk(stream, table_op_timeout, walk_task_cap).await
            }
        })
        .await;
        Self::shape(targets, return_format)
    }

    /// Run a different [`Operation`] per client, sharing one concurrency
    /// budget across all of them.
    pub async fn execute_mixed<T: Transport + 'static>(
        &self,
        targets: &[(Client<T>, Operation)],
        return_format: ReturnFormat,
    ) -> MultiResult<Vec<VarBind>> {
        let sem = Arc::new(Semaphore::new(self.max_concurrent));
        let keys: Vec<(SocketAddr, Oid)> = targets
            .iter()
            .map(|(c, op)| (c.target(), operation_key_oid(op)))
            .collect();
        let single_op_timeout = self.single_op_timeout;
        let walk_op_timeout = self.walk_op_timeout;
        let table_op_timeout = self.table_op_timeout;
        let walk_task_cap = self.walk_task_cap;

        let handles: Vec<_> = targets
            .iter()
            .map(|(client, op)| {
                let client = client.clone();
                let op = op.clone();
                spawn_slot(sem.clone(), async move {
                    match op {
                        Operation::Get(oids) => with_timeout(single_op_timeout, client.get_many(&oids)).await,
                        Operation::GetBulk {
                            oids,
                            non_repeaters,
                            max_repetitions,
                        } => {
                            with_timeout(
                                single_op_timeout,
                                client.get_bulk(&oids, non_repeaters, max_repetitions),
                            )
                            .await
                        }
                        Operation::Walk(root) => {
                            collect_walk(client.walk(root), walk_op_timeout, walk_task_cap).await
                        }
                        Operation::WalkTable {
                            table_oid,
                            max_repetitions,
                        } => {
                            collect_walk(
                                client.walk_table(table_oid, max_repetitions),
                                table_op_timeout,
                                walk_task_cap,
                            )
                            .await
                        }
                    }
                })
            })
            .collect();

        let results = futures::future::join_all(handles).await;
        let outcomes: Vec<(SocketAddr, Oid, TargetResult<Vec<VarBind>>)> = keys
            .into_iter()
            .zip(results.into_iter().map(unwrap_join))
            .map(|((addr, oid), r)| (addr, oid, r))
            .collect();
        Self::shape(outcomes, return_format)
    }

    /// Run `op` against every client under this orchestrator's concurrency
    /// and timeout budget, returning `(target, oid, outcome)` triples in
    /// input order. Every client in a single `run` call shares the same
    /// work-item identity `key_oid` (they all run the same operation, just
    /// against different targets); `op` itself is responsible for its own
    /// timeout/error mapping (via [`with_timeout`] or [`collect_walk`]).
    /// This just handles the worker pool and preserves target identity
    /// across `tokio::spawn`.
    async fn run<T, F, Fut, O>(
        &self,
        clients: &[Client<T>],
        key_oid: Oid,
        op: F,
    ) -> Vec<(SocketAddr, Oid, TargetResult<O>)>
    where
        T: Transport + 'static,
        F: Fn(Client<T>) -> Fut,
        Fut: Future<Output = TargetResult<O>> + Send + 'static,
        O: Send + 'static,
    {
        let sem = Arc::new(Semaphore::new(self.max_concurrent));
        let addrs: Vec<SocketAddr> = clients.iter().map(|c| c.target()).collect();
        let handles: Vec<_> = clients
            .iter()
            .cloned()
            .map(|client| spawn_slot(sem.clone(), op(client)))
            .collect();

        let results = futures::future::join_all(handles).await;
        addrs
            .into_iter()
            .zip(results.into_iter().map(unwrap_join))
            .map(|(addr, r)| (addr, key_oid.clone(), r))
            .collect()
    }

    fn shape<O>(
        outcomes: Vec<(SocketAddr, Oid, TargetResult<O>)>,
        format: ReturnFormat,
    ) -> MultiResult<O> {
        match format {
            ReturnFormat::List => {
                MultiResult::List(outcomes.into_iter().map(|(_, _, r)| r).collect())
            }
            ReturnFormat::WithTargets => MultiResult::WithTargets(outcomes),
            ReturnFormat::Map => MultiResult::Map(
                outcomes
                    .into_iter()
                    .map(|(addr, oid, r)| ((addr, oid), r))
                    .collect(),
            ),
        }
    }
}

/// Representative OID for a work item sharing one target across multiple
/// requested OIDs (`get_multi`/`get_bulk_multi`): the first one, or an empty
/// OID if none were given.
fn first_oid(oids: &[Oid]) -> Oid {
    oids.first().cloned().unwrap_or_else(|| Oid::from_slice(&[]))
}

/// The OID identifying an [`Operation`] as a work item, for `Map`/`WithTargets`
/// keying in [`Orchestrator::execute_mixed`].
fn operation_key_oid(op: &Operation) -> Oid {
    match op {
        Operation::Get(oids) => first_oid(oids),
        Operation::GetBulk { oids, .. } => first_oid(oids),
        Operation::Walk(root) => root.clone(),
        Operation::WalkTable { table_oid, .. } => table_oid.clone(),
    }
}

/// Run `fut` under `timeout`, translating elapsed time into
/// [`TargetError::Timeout`].
async fn with_timeout<O>(
    timeout: Duration,
    fut: impl Future<Output = Result<O>>,
) -> TargetResult<O> {
    match tokio::time::timeout(timeout, fut).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(TargetError::Op(e)),
        Err(_) => Err(TargetError::Timeout),
    }
}

/// Drain a walk stream, applying `per_pdu_timeout` to each individual
/// GETNEXT/GETBULK step and `task_cap` to the walk as a whole.
async fn collect_walk<S>(
    stream: S,
    per_pdu_timeout: Duration,
    task_cap: Duration,
) -> TargetResult<Vec<VarBind>>
where
    S: futures_core::Stream<Item = Result<VarBind>> + Send,
{
    let mut stream = Box::pin(stream);
    let drain = async {
        let mut out = Vec::new();
        loop {
            match tokio::time::timeout(per_pdu_timeout, stream.next()).await {
                Ok(Some(Ok(vb))) => out.push(vb),
                Ok(Some(Err(e))) => return Err(TargetError::Op(e)),
                Ok(None) => return Ok(out),
                Err(_) => return Err(TargetError::Timeout),
            }
        }
    };
    match tokio::time::timeout(task_cap, drain).await {
        Ok(result) => result,
        Err(_) => Err(TargetError::Timeout),
    }
}

/// Spawn `fut` to run once a semaphore permit is available, isolating a
/// panic or a closed semaphore as [`TargetError::TaskFailed`] rather than
/// propagating it to the caller.
fn spawn_slot<O, Fut>(
    sem: Arc<Semaphore>,
    fut: Fut,
) -> tokio::task::JoinHandle<TargetResult<O>>
where
    O: Send + 'static,
    Fut: Future<Output = TargetResult<O>> + Send + 'static,
{
    tokio::spawn(async move {
        let permit = sem
            .acquire_owned()
            .await
            .map_err(|e| TargetError::TaskFailed(e.to_string()))?;
        let result = fut.await;
        drop(permit);
        result
    })
}

fn unwrap_join<O>(
    joined: std::result::Result<TargetResult<O>, tokio::task::JoinError>,
) -> TargetResult<O> {
    match joined {
        Ok(inner) => inner,
        Err(join_err) => Err(TargetError::TaskFailed(join_err.to_string())),
    }
}
