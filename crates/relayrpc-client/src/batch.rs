//! Batch dispatch of one method over many argument lists.

use futures::stream::{self, BoxStream, StreamExt};
use relayrpc_common::protocol::error::{RelayError, Result};
use relayrpc_common::protocol::{RpcArgs, RpcRequest};

use crate::client::{CallOptions, CallOutcome, RpcClient};

/// One finished batch call, paired with the arguments it was made with.
pub type BatchItem = (Result<CallOutcome>, RpcArgs);

impl RpcClient {
    /// Runs `method` once per argument list, one call at a time.
    ///
    /// Items are yielded in input order. Nothing is sent until the stream is
    /// polled. Each request's id is the index of its arguments in `params`.
    pub fn exec_multi<I>(&self, method: impl Into<String>, params: I) -> BoxStream<'static, BatchItem>
    where
        I: IntoIterator<Item = RpcArgs>,
        I::IntoIter: Send + 'static,
    {
        let client = self.clone();
        let method = method.into();

        stream::iter(params.into_iter().enumerate())
            .then(move |(index, args)| {
                let client = client.clone();
                let request = RpcRequest::new(method.clone(), args.clone()).with_id(index as u64);
                async move {
                    let outcome = client
                        .execute(request, CallOptions::default())
                        .await
                        .map(|reply| reply.outcome);
                    (outcome, args)
                }
            })
            .boxed()
    }

    /// Runs `method` once per argument list on spawned tasks.
    ///
    /// At most `max_workers` calls are in flight (falling back to
    /// `config.max_workers`, then to one worker per call). Items are yielded
    /// as calls finish, so the order is unspecified. A call that panics yields
    /// [`RelayError::Worker`] with its arguments.
    ///
    /// Calls already started keep running if the stream is dropped.
    pub fn exec_multi_concurrent<I>(
        &self,
        method: impl Into<String>,
        params: I,
        max_workers: Option<usize>,
    ) -> BoxStream<'static, BatchItem>
    where
        I: IntoIterator<Item = RpcArgs>,
    {
        let calls: Vec<RpcArgs> = params.into_iter().collect();
        let workers = max_workers
            .or(self.config().max_workers)
            .unwrap_or(calls.len())
            .max(1);

        tracing::debug!("Dispatching {} calls on {} workers", calls.len(), workers);

        let client = self.clone();
        let method = method.into();

        stream::iter(calls.into_iter().enumerate())
            .map(move |(index, args)| {
                let client = client.clone();
                let request = RpcRequest::new(method.clone(), args.clone()).with_id(index as u64);
                let worker = tokio::spawn(async move {
                    client
                        .execute(request, CallOptions::default())
                        .await
                        .map(|reply| reply.outcome)
                });
                async move {
                    let outcome = match worker.await {
                        Ok(outcome) => outcome,
                        Err(e) => Err(RelayError::Worker(e.to_string())),
                    };
                    (outcome, args)
                }
            })
            .buffer_unordered(workers)
            .boxed()
    }
}
