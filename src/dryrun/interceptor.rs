//! Simulation gate in front of every mutation.

use std::future::Future;

use tracing::info;

use super::builder::build_report;
use super::lookup::PreviewLookup;
use super::mutation::Mutation;
use super::report::DryRunReport;
use crate::error::ServiceError;

/// Result of an intercepted mutation.
#[derive(Debug, Clone, PartialEq)]
pub enum Intercepted<T> {
    /// The mutation ran for real.
    Executed(T),
    /// Simulation was requested; nothing was written.
    Simulated(DryRunReport),
}

impl<T> Intercepted<T> {
    pub fn report(&self) -> Option<&DryRunReport> {
        match self {
            Self::Simulated(report) => Some(report),
            Self::Executed(_) => None,
        }
    }

    pub fn executed(self) -> Option<T> {
        match self {
            Self::Executed(value) => Some(value),
            Self::Simulated(_) => None,
        }
    }
}

/// Routes a mutation either to its real execution or to its preview.
pub struct DryRunInterceptor<'a> {
    lookup: &'a dyn PreviewLookup,
}

impl<'a> DryRunInterceptor<'a> {
    pub fn new(lookup: &'a dyn PreviewLookup) -> Self {
        Self { lookup }
    }

    /// With `simulate` set, `perform` is dropped without being called and the
    /// preview of `mutation` is returned. Otherwise `perform` runs; it is
    /// expected to send every remote write through the executor as a write.
    pub async fn run<T, F, Fut>(
        &self,
        mutation: &Mutation,
        simulate: bool,
        perform: F,
    ) -> Result<Intercepted<T>, ServiceError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, ServiceError>>,
    {
        if simulate {
            info!(kind = %mutation.kind(), "dry run: building preview instead of mutating");
            let report = build_report(mutation, self.lookup).await?;
            return Ok(Intercepted::Simulated(report));
        }
        perform().await.map(Intercepted::Executed)
    }
}
