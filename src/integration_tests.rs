#[cfg(test)]
mod tests {
    use serde_json::{json, Value};
    use tokio::io::BufReader;
    use tokio::net::TcpStream;
    use tokio::sync::oneshot;
    use tokio::time::{timeout, Duration};

    use crate::app_system::{CatalogConfig, CatalogSystem, ErrorEnvelope, Status};
    use crate::transport::frame::{read_frame, write_frame};
    use crate::transport::payload::NO_HANDLER_MESSAGE;
    use crate::transport::{CommandRouter, CommandServer};

    fn start_system() -> (CatalogSystem, CommandRouter) {
        let system = CatalogSystem::new(&CatalogConfig::default());
        let router = system.router();
        (system, router)
    }

    fn envelope(status: Status, message: &str) -> ErrorEnvelope {
        ErrorEnvelope::new(status, message)
    }

    #[tokio::test]
    async fn test_product_lifecycle_over_commands() {
        let (system, router) = start_system();

        let created = router
            .dispatch("create_product", json!({ "name": "A", "price": 10 }))
            .await
            .unwrap();
        assert_eq!(created["id"], json!(1));
        assert_eq!(created["name"], json!("A"));
        assert_eq!(created["price"], json!(10.0));
        assert_eq!(created["available"], json!(true));

        let page = router
            .dispatch("get_all_product", json!({ "page": 1, "limit": 5 }))
            .await
            .unwrap();
        assert_eq!(page["lastPage"], json!(1));
        assert_eq!(page["totalProducts"], json!(1));
        assert_eq!(page["products"][0]["id"], json!(1));

        let deleted = router.dispatch("delete_product", json!({ "id": 1 })).await.unwrap();
        assert_eq!(deleted, json!({ "productDeleted": true }));

        let err = router
            .dispatch("get_product_by_id", json!({ "id": "1" }))
            .await
            .unwrap_err();
        assert_eq!(err, envelope(Status::NotFound, "Product with id: 1, not found"));

        let page = router.dispatch("get_all_product", json!({})).await.unwrap();
        assert_eq!(page, json!({ "lastPage": 0, "totalProducts": 0, "products": [] }));

        system.shutdown().await;
    }

    #[tokio::test]
    async fn test_duplicate_name_is_bad_request() {
        let (system, router) = start_system();
        let payload = json!({ "name": "Same", "price": 1 });

        router.dispatch("create_product", payload.clone()).await.unwrap();
        let err = router.dispatch("create_product", payload).await.unwrap_err();
        assert_eq!(err, envelope(Status::BadRequest, "instance/attribute duplicate"));
        assert_eq!(
            serde_json::to_value(&err).unwrap(),
            json!({ "status": 400, "message": "instance/attribute duplicate" })
        );

        system.shutdown().await;
    }

    #[tokio::test]
    async fn test_update_ignores_payload_id() {
        let (system, router) = start_system();
        router
            .dispatch("create_product", json!({ "name": "Desk", "price": 100 }))
            .await
            .unwrap();

        let updated = router
            .dispatch("update_product", json!({ "id": 1, "price": 120.5 }))
            .await
            .unwrap();
        assert_eq!(updated["product"]["id"], json!(1));
        assert_eq!(updated["product"]["name"], json!("Desk"));
        assert_eq!(updated["product"]["price"], json!(120.5));

        let err = router
            .dispatch("update_product", json!({ "id": 9, "price": 1 }))
            .await
            .unwrap_err();
        assert_eq!(err.status, Status::NotFound);

        system.shutdown().await;
    }

    #[tokio::test]
    async fn test_validate_products() {
        let (system, router) = start_system();
        for name in ["a", "b", "c"] {
            router
                .dispatch("create_product", json!({ "name": name, "price": 2 }))
                .await
                .unwrap();
        }
        router.dispatch("delete_product", json!({ "id": 3 })).await.unwrap();

        let found = router.dispatch("validate_products", json!([3, "1"])).await.unwrap();
        let ids: Vec<Value> = found.as_array().unwrap().iter().map(|p| p["id"].clone()).collect();
        assert_eq!(ids, vec![json!(1), json!(3)]);

        let empty = router.dispatch("validate_products", json!([])).await.unwrap();
        assert_eq!(empty, json!([]));

        let err = router.dispatch("validate_products", json!([2, 2])).await.unwrap_err();
        assert_eq!(err, envelope(Status::BadRequest, "Some Products aren't found"));

        let err = router.dispatch("validate_products", json!([1, 40])).await.unwrap_err();
        assert_eq!(err, envelope(Status::BadRequest, "Some Products aren't found"));

        system.shutdown().await;
    }

    #[tokio::test]
    async fn test_rejected_payloads_and_unknown_commands() {
        let (system, router) = start_system();

        let err = router
            .dispatch("create_product", json!({ "name": "X", "price": 1, "stock": 3 }))
            .await
            .unwrap_err();
        assert_eq!(err.status, Status::BadRequest);

        let err = router.dispatch("get_all_product", json!({ "page": 0 })).await.unwrap_err();
        assert_eq!(err.status, Status::BadRequest);

        let err = router
            .dispatch("delete_product", json!({ "id": "abc" }))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            envelope(Status::BadRequest, "Validation failed (numeric string is expected)")
        );

        let err = router.dispatch("drop_table", json!({})).await.unwrap_err();
        assert_eq!(err, envelope(Status::NotFound, NO_HANDLER_MESSAGE));

        system.shutdown().await;
    }

    #[tokio::test]
    async fn test_stopped_catalog_is_masked() {
        let (system, router) = start_system();
        system.shutdown().await;

        let err = router.dispatch("get_all_product", json!({})).await.unwrap_err();
        assert_eq!(err, envelope(Status::InternalError, "Internal error, check logs"));
    }

    #[tokio::test]
    async fn test_commands_over_tcp() {
        let (system, router) = start_system();
        let server = CommandServer::bind("127.0.0.1:0".parse().unwrap(), router)
            .await
            .unwrap();
        let addr = server.local_addr().unwrap();
        let (stop, stopped) = oneshot::channel::<()>();
        let server_task = tokio::spawn(server.run(async move {
            let _ = stopped.await;
        }));

        let stream = TcpStream::connect(addr).await.unwrap();
        let (read_half, mut write_half) = stream.into_split();
        let mut reader = BufReader::new(read_half);

        let create = json!({
            "pattern": { "cmd": "create_product" },
            "data": { "name": "Wire", "price": 3 },
            "id": "req-1"
        });
        write_frame(&mut write_half, &create).await.unwrap();
        let reply = read_frame(&mut reader).await.unwrap().unwrap();
        assert_eq!(reply["id"], json!("req-1"));
        assert_eq!(reply["isDisposed"], json!(true));
        assert_eq!(reply["response"]["name"], json!("Wire"));

        let lookup = json!({
            "pattern": { "cmd": "get_product_by_id" },
            "data": { "id": 99 },
            "id": "req-2"
        });
        write_frame(&mut write_half, &lookup).await.unwrap();
        let reply = read_frame(&mut reader).await.unwrap().unwrap();
        assert_eq!(reply["id"], json!("req-2"));
        assert_eq!(
            reply["err"],
            json!({ "status": 404, "message": "Product with id: 99, not found" })
        );
        assert!(reply.get("response").is_none());

        drop(write_half);
        let _ = stop.send(());
        server_task.await.unwrap();
        system.shutdown().await;
    }

    #[tokio::test]
    async fn test_failed_event_keeps_connection_serving() {
        let (system, router) = start_system();
        let server = CommandServer::bind("127.0.0.1:0".parse().unwrap(), router)
            .await
            .unwrap();
        let addr = server.local_addr().unwrap();
        let (stop, stopped) = oneshot::channel::<()>();
        let server_task = tokio::spawn(server.run(async move {
            let _ = stopped.await;
        }));

        let stream = TcpStream::connect(addr).await.unwrap();
        let (read_half, mut write_half) = stream.into_split();
        let mut reader = BufReader::new(read_half);

        // No id: fails with NotFound, nothing is written back
        let event = json!({
            "pattern": { "cmd": "delete_product" },
            "data": { "id": 99 }
        });
        write_frame(&mut write_half, &event).await.unwrap();

        let list = json!({
            "pattern": { "cmd": "get_all_product" },
            "data": {},
            "id": "after-event"
        });
        write_frame(&mut write_half, &list).await.unwrap();
        let reply = read_frame(&mut reader).await.unwrap().unwrap();
        assert_eq!(reply["id"], json!("after-event"));
        assert_eq!(reply["response"]["totalProducts"], json!(0));

        drop(write_half);
        let _ = stop.send(());
        server_task.await.unwrap();
        system.shutdown().await;
    }

    #[tokio::test]
    async fn test_shutdown_drains_open_connections() {
        let (system, router) = start_system();
        let server = CommandServer::bind("127.0.0.1:0".parse().unwrap(), router)
            .await
            .unwrap();
        let addr = server.local_addr().unwrap();
        let (stop, stopped) = oneshot::channel::<()>();
        let server_task = tokio::spawn(server.run(async move {
            let _ = stopped.await;
        }));

        let stream = TcpStream::connect(addr).await.unwrap();
        let (read_half, mut write_half) = stream.into_split();
        let mut reader = BufReader::new(read_half);

        let create = json!({
            "pattern": { "cmd": "create_product" },
            "data": { "name": "Kept", "price": 1 },
            "id": "c1"
        });
        write_frame(&mut write_half, &create).await.unwrap();
        let reply = read_frame(&mut reader).await.unwrap().unwrap();
        assert_eq!(reply["response"]["name"], json!("Kept"));

        // The client keeps its side open; the server still finishes
        let _ = stop.send(());
        timeout(Duration::from_secs(5), server_task)
            .await
            .expect("server did not drain its connections")
            .unwrap();

        assert_eq!(read_frame(&mut reader).await.unwrap(), None);
        drop(write_half);
        system.shutdown().await;
    }
}
