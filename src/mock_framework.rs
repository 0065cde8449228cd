//! # Mock Framework
//!
//! Utilities for testing store callers in isolation.
//!
//! Use [`create_mock_client`] to get a store client and a receiver.
//! Then use helpers like [`expect_find_by_id`] or [`expect_update`] to assert
//! the request and script the store's reply, failures included.

use crate::actor_framework::{Entity, ResourceClient, ResourceRequest, Response};
use tokio::sync::mpsc;

/// Creates a mock store client and a receiver for asserting requests.
///
/// Nothing serves the receiver: the test plays the store, answering each
/// request through its `respond_to` sender. This makes races (a row vanishing
/// between two calls) and engine failures deterministic.
pub fn create_mock_client<T: Entity>(
    buffer_size: usize,
) -> (ResourceClient<T>, mpsc::Receiver<ResourceRequest<T>>) {
    let (sender, receiver) = mpsc::channel(buffer_size);
    (ResourceClient::new(sender), receiver)
}

/// Helper to verify that the next message is an Insert request
pub async fn expect_insert<T: Entity>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(T::CreatePayload, Response<T>)> {
    match receiver.recv().await {
        Some(ResourceRequest::Insert { payload, respond_to }) => Some((payload, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next message is a Count request
pub async fn expect_count<T: Entity>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(T::Filter, Response<usize>)> {
    match receiver.recv().await {
        Some(ResourceRequest::Count { filter, respond_to }) => Some((filter, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next message is a FindPage request
pub async fn expect_find_page<T: Entity>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(T::Filter, usize, usize, Response<Vec<T>>)> {
    match receiver.recv().await {
        Some(ResourceRequest::FindPage { filter, offset, limit, respond_to }) => {
            Some((filter, offset, limit, respond_to))
        }
        _ => None,
    }
}

/// Helper to verify that the next message is a FindById request
pub async fn expect_find_by_id<T: Entity>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(T::Id, Response<Option<T>>)> {
    match receiver.recv().await {
        Some(ResourceRequest::FindById { id, respond_to }) => Some((id, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next message is a FindByIds request
pub async fn expect_find_by_ids<T: Entity>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(Vec<T::Id>, Response<Vec<T>>)> {
    match receiver.recv().await {
        Some(ResourceRequest::FindByIds { ids, respond_to }) => Some((ids, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next message is an UpdateFields request
pub async fn expect_update<T: Entity>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(T::Id, T::Patch, Response<Option<T>>)> {
    match receiver.recv().await {
        Some(ResourceRequest::UpdateFields { id, patch, respond_to }) => {
            Some((id, patch, respond_to))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Product, ProductCreate};

    #[tokio::test]
    async fn test_mock_client() {
        let (client, mut receiver) = create_mock_client::<Product>(10);

        let create_task = tokio::spawn(async move {
            client.insert(ProductCreate::new("Test", 5.0)).await
        });

        let (payload, responder) = expect_insert(&mut receiver).await.expect("Expected Insert request");
        assert_eq!(payload.name, "Test");
        let product = Product::from_create(1, payload);
        responder.send(Ok(product.clone())).unwrap();

        let result = create_task.await.unwrap();
        assert_eq!(result, Ok(product));
    }

    #[tokio::test]
    async fn test_mock_batch_lookup() {
        let (client, mut receiver) = create_mock_client::<Product>(10);

        let task = tokio::spawn(async move { client.find_by_ids(vec![3, 1]).await });

        let (ids, responder) = expect_find_by_ids(&mut receiver).await.expect("Expected FindByIds");
        assert_eq!(ids, vec![3, 1]);
        responder.send(Ok(vec![])).unwrap();

        assert_eq!(task.await.unwrap(), Ok(vec![]));
    }
}
