mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

async fn insert_food(server: &common::TestServer, food: Value) -> Result<String> {
    let body = server.post_json("/api/v1/all-foods-items", &food).await?;
    Ok(body["insertedId"].as_str().unwrap_or_default().to_string())
}

#[tokio::test]
async fn listing_pages_and_counts_whole_collection() -> Result<()> {
    let Some(server) = common::server().await? else { return Ok(()) };
    let tag = common::unique("pizza");

    for i in 0..3 {
        insert_food(&server, json!({ "name": format!("Margherita Pizza {} {}", tag, i), "totalSell": i })).await?;
    }

    let (status, page) = server.get_json("/api/v1/all-foods-items?page=1&limit=2", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert!(page["result"].as_array().unwrap().len() <= 2);
    let total = page["total"].as_i64().unwrap();
    assert!(total >= 3);

    // total ignores the name filter
    let (_, filtered) = server
        .get_json(&format!("/api/v1/all-foods-items?page=1&limit=10&foodName={}", tag), None)
        .await?;
    assert_eq!(filtered["result"].as_array().unwrap().len(), 3);
    assert!(filtered["total"].as_i64().unwrap() >= total);

    let (_, second) = server
        .get_json(&format!("/api/v1/all-foods-items?page=2&limit=2&foodName={}", tag), None)
        .await?;
    assert_eq!(second["result"].as_array().unwrap().len(), 1);
    Ok(())
}

#[tokio::test]
async fn name_search_is_case_insensitive_substring() -> Result<()> {
    let Some(server) = common::server().await? else { return Ok(()) };
    let tag = common::unique("marg");

    insert_food(&server, json!({ "name": format!("Margherita Pizza {}", tag) })).await?;

    let (_, page) = server
        .get_json("/api/v1/all-foods-items?foodName=piz&limit=0&page=1", None)
        .await?;
    let names: Vec<&str> = page["result"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|f| f["name"].as_str())
        .collect();
    assert!(names.iter().any(|n| n.contains(&tag)), "search missed {}: {:?}", tag, names);
    Ok(())
}

#[tokio::test]
async fn detail_put_and_patch_use_mapped_field_names() -> Result<()> {
    let Some(server) = common::server().await? else { return Ok(()) };
    let cookie = server.login("chef@srh.test").await?;

    let id = insert_food(&server, json!({ "name": "Old", "totalSell": 1, "quantity": 9 })).await?;
    let path = format!("/api/v1/all-foods-items/{}", id);

    let res = server
        .client
        .put(server.url(&path))
        .json(&json!({
            "foodName": "X",
            "foodImage": "Y",
            "foodCategory": "Pizza",
            "price": 12.5,
            "description": "Stone baked",
            "foodOrigin": "Italy",
            "quantity": 20
        }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let update: Value = res.json().await?;
    assert_eq!(update["matchedCount"], 1);
    assert_eq!(update["modifiedCount"], 1);

    let (status, food) = server.get_json(&path, Some(&cookie)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(food["_id"], json!(id));
    assert_eq!(food["name"], "X");
    assert_eq!(food["image"], "Y");
    assert_eq!(food["category"], "Pizza");
    assert_eq!(food["price"], 12.5);
    assert_eq!(food["origin"], "Italy");
    assert_eq!(food["quantity"], 20);
    assert!(food.get("foodName").is_none());

    let res = server
        .client
        .patch(server.url(&path))
        .json(&json!({ "totalSold": 4, "quantity": 16 }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let (_, food) = server.get_json(&path, Some(&cookie)).await?;
    assert_eq!(food["totalSell"], 4);
    assert_eq!(food["quantity"], 16);
    assert_eq!(food["name"], "X");
    Ok(())
}

#[tokio::test]
async fn unknown_id_returns_null() -> Result<()> {
    let Some(server) = common::server().await? else { return Ok(()) };
    let cookie = server.login("chef@srh.test").await?;

    let path = format!("/api/v1/all-foods-items/{}", uuid::Uuid::new_v4());
    let (status, body) = server.get_json(&path, Some(&cookie)).await?;
    assert_eq!(status, StatusCode::OK);
    assert!(body.is_null());
    Ok(())
}

#[tokio::test]
async fn top_sellers_are_at_most_six_in_descending_order() -> Result<()> {
    let Some(server) = common::server().await? else { return Ok(()) };

    for sold in [1_000_001, 1_000_002] {
        insert_food(&server, json!({ "name": common::unique("best"), "totalSell": sold })).await?;
    }

    let (status, body) = server.get_json("/api/v1/top-selling-foods", None).await?;
    assert_eq!(status, StatusCode::OK);
    let foods = body.as_array().unwrap();
    assert!(!foods.is_empty() && foods.len() <= 6);

    let sells: Vec<i64> = foods.iter().filter_map(|f| f["totalSell"].as_i64()).collect();
    assert!(sells.windows(2).all(|w| w[0] >= w[1]), "not descending: {:?}", sells);
    Ok(())
}

#[tokio::test]
async fn empty_search_box_keeps_unnamed_foods() -> Result<()> {
    let Some(server) = common::server().await? else { return Ok(()) };
    let id = insert_food(&server, json!({ "price": 3, "tag": common::unique("nameless") })).await?;

    let (status, page) = server.get_json("/api/v1/all-foods-items?page=1&limit=0&foodName=", None).await?;
    assert_eq!(status, StatusCode::OK);
    let ids: Vec<&str> = page["result"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|f| f["_id"].as_str())
        .collect();
    assert!(ids.contains(&id.as_str()), "food without a name was filtered out");
    Ok(())
}
