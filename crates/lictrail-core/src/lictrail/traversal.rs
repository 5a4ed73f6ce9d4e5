// Copyright 2025 Dotanuki Labs
// SPDX-License-Identifier: MIT

use crate::domain::errors::ResolutionError;
use crate::domain::models::{PackageIdentifier, Resolution, RootSpecifier, TraversalRecord, VersionConstraint};
use crate::lictrail::fetcher::{DescriptorFetcher, DescriptorFetching};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Receives every resolution produced while walking the graph.
///
/// Returning `false` prevents the traversal from expanding the dependencies of a resolved node.
pub trait TraversalVisitor: Send + Sync + 'static {
    fn on_resolved(&self, resolution: &Resolution) -> impl Future<Output = bool> + Send;
}

#[derive(Clone, Debug, PartialEq)]
struct PendingEdge {
    identifier: PackageIdentifier,
    constraint: Option<VersionConstraint>,
    level: u32,
}

struct NodeOutcome {
    resolved: bool,
    children: Vec<PendingEdge>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TraversalSummary {
    pub resolved: usize,
    pub failed: usize,
}

impl TraversalSummary {
    fn account(&mut self, resolved: bool) {
        match resolved {
            true => self.resolved += 1,
            false => self.failed += 1,
        }
    }
}

pub struct TraversalEngine {
    fetcher: Arc<DescriptorFetcher>,
    permits: Arc<Semaphore>,
}

impl TraversalEngine {
    pub fn new(fetcher: DescriptorFetcher, max_concurrency: usize) -> Self {
        Self {
            fetcher: Arc::new(fetcher),
            permits: Arc::new(Semaphore::new(max_concurrency.max(1))),
        }
    }

    /// Walks the dependency graph starting at `root`, returning once every spawned resolution has settled.
    ///
    /// Only a failure to resolve the root itself is returned as an error; any other failure is
    /// handed to the visitor and traversal carries on with the remaining edges.
    pub async fn traverse<V>(
        &self,
        root: RootSpecifier,
        max_depth: u32,
        visitor: Arc<V>,
    ) -> Result<TraversalSummary, ResolutionError>
    where
        V: TraversalVisitor,
    {
        log::info!("[lictrail.traversal] starting at {} (max depth = {})", root.identifier, max_depth);

        let fetched = self.fetcher.fetch(&root.identifier, root.constraint.as_ref()).await?;

        let record = TraversalRecord {
            identifier: root.identifier,
            descriptor: fetched.descriptor,
            registry_record: fetched.registry_record,
            origin: fetched.origin,
            level: 0,
        };

        let mut summary = TraversalSummary::default();
        let initial = expand(&visitor, Resolution::Resolved(record), max_depth).await;
        summary.account(initial.resolved);

        let mut in_flight = JoinSet::new();
        self.schedule(&mut in_flight, initial.children, &visitor, max_depth);

        while let Some(joined) = in_flight.join_next().await {
            match joined {
                Ok(outcome) => {
                    summary.account(outcome.resolved);
                    self.schedule(&mut in_flight, outcome.children, &visitor, max_depth);
                },
                Err(incoming) => {
                    log::error!("[lictrail.traversal] resolution task aborted : {}", incoming);
                    summary.account(false);
                },
            }
        }

        log::info!(
            "[lictrail.traversal] finished with {} resolved and {} failed packages",
            summary.resolved,
            summary.failed
        );

        Ok(summary)
    }

    fn schedule<V>(
        &self,
        in_flight: &mut JoinSet<NodeOutcome>,
        edges: Vec<PendingEdge>,
        visitor: &Arc<V>,
        max_depth: u32,
    ) where
        V: TraversalVisitor,
    {
        for edge in edges {
            let fetcher = self.fetcher.clone();
            let permits = self.permits.clone();
            let visitor = visitor.clone();
            in_flight.spawn(async move { resolve_edge(fetcher, permits, visitor, edge, max_depth).await });
        }
    }
}

async fn resolve_edge<V>(
    fetcher: Arc<DescriptorFetcher>,
    permits: Arc<Semaphore>,
    visitor: Arc<V>,
    edge: PendingEdge,
    max_depth: u32,
) -> NodeOutcome
where
    V: TraversalVisitor,
{
    let Ok(_permit) = permits.acquire_owned().await else {
        log::error!("[lictrail.traversal] cannot resolve {} : no more permits", edge.identifier);
        return NodeOutcome {
            resolved: false,
            children: vec![],
        };
    };

    let resolution = match fetcher.fetch(&edge.identifier, edge.constraint.as_ref()).await {
        Ok(fetched) => {
            log::info!("[lictrail.traversal] {} resolved from {}", edge.identifier, fetched.origin);
            Resolution::Resolved(TraversalRecord {
                identifier: edge.identifier,
                descriptor: fetched.descriptor,
                registry_record: fetched.registry_record,
                origin: fetched.origin,
                level: edge.level,
            })
        },
        Err(error) => Resolution::Failed {
            identifier: edge.identifier,
            level: edge.level,
            error,
        },
    };

    expand(&visitor, resolution, max_depth).await
}

async fn expand<V>(visitor: &Arc<V>, resolution: Resolution, max_depth: u32) -> NodeOutcome
where
    V: TraversalVisitor,
{
    let proceed = visitor.on_resolved(&resolution).await;

    let Resolution::Resolved(record) = resolution else {
        return NodeOutcome {
            resolved: false,
            children: vec![],
        };
    };

    if !proceed || record.level >= max_depth {
        return NodeOutcome {
            resolved: true,
            children: vec![],
        };
    }

    let children = record
        .descriptor
        .dependency_edges()
        .map(|(identifier, constraint)| PendingEdge {
            identifier: identifier.clone(),
            constraint: Some(VersionConstraint::parse(constraint)),
            level: record.level + 1,
        })
        .collect::<Vec<_>>();

    log::info!(
        "[lictrail.traversal] expanding {} dependencies of {} at level {}",
        children.len(),
        record.identifier,
        record.level + 1
    );

    NodeOutcome {
        resolved: true,
        children,
    }
}
