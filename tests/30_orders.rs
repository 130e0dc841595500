mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

#[tokio::test]
async fn orders_filter_by_buyer_email() -> Result<()> {
    let Some(server) = common::server().await? else { return Ok(()) };
    let buyer = format!("{}@srh.test", common::unique("buyer"));

    let created = server
        .post_json("/api/v1/create-order", &json!({ "buyerEmail": buyer, "foodName": "Pizza" }))
        .await?;
    assert_eq!(created["acknowledged"], true);

    let (status, orders) = server.get_json(&format!("/api/v1/orders?email={}", buyer), None).await?;
    assert_eq!(status, StatusCode::OK);
    let orders = orders.as_array().unwrap();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0]["buyerEmail"], json!(buyer));
    assert_eq!(orders[0]["_id"], created["insertedId"]);

    let (_, all) = server.get_json("/api/v1/orders", None).await?;
    assert!(all.as_array().unwrap().len() >= 1);
    Ok(())
}

#[tokio::test]
async fn delete_removes_exactly_one_match() -> Result<()> {
    let Some(server) = common::server().await? else { return Ok(()) };
    let food = common::unique("Pizza");
    let buyer = format!("{}@srh.test", common::unique("buyer"));

    for _ in 0..2 {
        server
            .post_json("/api/v1/create-order", &json!({ "buyerEmail": buyer, "foodName": food }))
            .await?;
    }

    let res = server
        .client
        .delete(server.url(&format!("/api/v1/orders?foodName={}", food)))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let deleted: Value = res.json().await?;
    assert_eq!(deleted["deletedCount"], 1);

    let (_, remaining) = server.get_json(&format!("/api/v1/orders?email={}", buyer), None).await?;
    assert_eq!(remaining.as_array().unwrap().len(), 1);

    // no match is still a success
    let res = server
        .client
        .delete(server.url(&format!("/api/v1/orders?foodName={}", common::unique("none"))))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let deleted: Value = res.json().await?;
    assert_eq!(deleted["deletedCount"], 0);
    Ok(())
}

#[tokio::test]
async fn empty_email_lists_all_orders() -> Result<()> {
    let Some(server) = common::server().await? else { return Ok(()) };
    server
        .post_json("/api/v1/create-order", &json!({ "buyerEmail": common::unique("b"), "foodName": "Soup" }))
        .await?;

    let (status, orders) = server.get_json("/api/v1/orders?email=", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert!(!orders.as_array().unwrap().is_empty());
    Ok(())
}
