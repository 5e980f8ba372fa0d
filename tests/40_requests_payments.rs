mod common;

use anyhow::Result;
use axum::http::StatusCode;
use pawhaven_api::filter::FilterSpec;
use pawhaven_api::store::Collection;
use serde_json::json;

use common::{body_json, request, seed_donation_payment, send, test_app, token_for};

#[tokio::test]
async fn duplicate_adoption_request_is_409_and_not_inserted() -> Result<()> {
    let (app, ctx) = test_app();
    let token = token_for("adopter@example.com");
    let body = json!({
        "petId": "p1",
        "adoptedReqByEmail": "adopter@example.com",
        "petOwnerEmail": "owner@example.com",
        "reqStatus": "pending",
    });

    let res = send(&app, request("POST", "/adoption-requests", Some(&token), Some(body.clone()))).await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let first = body_json(res).await;
    assert_eq!(first["message"], "Request recorded successfully");
    assert!(first["insertedId"].is_string());

    let res = send(&app, request("POST", "/adoption-requests", Some(&token), Some(body))).await;
    assert_eq!(res.status(), StatusCode::CONFLICT);
    let second = body_json(res).await;
    assert_eq!(
        second["message"],
        "You've already submitted an adoption request for this pet."
    );

    let count = ctx
        .data
        .adoption_requests
        .count(FilterSpec::new().eq("petId", "p1"))
        .await?;
    assert_eq!(count, 1);
    Ok(())
}

#[tokio::test]
async fn same_pet_different_requester_is_allowed() -> Result<()> {
    let (app, _ctx) = test_app();
    let token = token_for("a@example.com");

    let res = send(
        &app,
        request(
            "POST",
            "/adoption-requests",
            Some(&token),
            Some(json!({"petId": "p1", "adoptedReqByEmail": "a@example.com"})),
        ),
    )
    .await;
    assert_eq!(res.status(), StatusCode::CREATED);

    let res = send(
        &app,
        request(
            "POST",
            "/adoption-requests",
            Some(&token),
            Some(json!({"petId": "p1", "adoptedReqByEmail": "b@example.com"})),
        ),
    )
    .await;
    assert_eq!(res.status(), StatusCode::CREATED);
    Ok(())
}

#[tokio::test]
async fn request_creation_requires_identifying_fields() -> Result<()> {
    let (app, _ctx) = test_app();
    let token = token_for("a@example.com");

    let res = send(
        &app,
        request(
            "POST",
            "/adoption-requests",
            Some(&token),
            Some(json!({"adoptedReqByEmail": "a@example.com"})),
        ),
    )
    .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = send(
        &app,
        request("POST", "/adoption-requests", Some(&token), Some(json!({"petId": "p1"}))),
    )
    .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn request_listing_filters_by_owner_and_status() -> Result<()> {
    let (app, _ctx) = test_app();
    let token = token_for("owner@example.com");

    for (pet, requester, status) in [
        ("p1", "a@example.com", "pending"),
        ("p2", "b@example.com", "approved"),
    ] {
        let res = send(
            &app,
            request(
                "POST",
                "/adoption-requests",
                Some(&token),
                Some(json!({
                    "petId": pet,
                    "adoptedReqByEmail": requester,
                    "petOwnerEmail": "owner@example.com",
                    "reqStatus": status,
                })),
            ),
        )
        .await;
        assert_eq!(res.status(), StatusCode::CREATED);
    }

    let res = send(
        &app,
        request(
            "GET",
            "/adoption-requests?email=owner@example.com&status=pending",
            Some(&token),
            None,
        ),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    let body = body_json(res).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["petId"], "p1");

    // Per-pet view keyed by petId
    let res = send(&app, request("GET", "/adoption-requests/p2", Some(&token), None)).await;
    let body = body_json(res).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["reqStatus"], "approved");
    Ok(())
}

#[tokio::test]
async fn request_status_update() -> Result<()> {
    let (app, ctx) = test_app();
    let token = token_for("owner@example.com");

    let res = send(
        &app,
        request(
            "POST",
            "/adoption-requests",
            Some(&token),
            Some(json!({"petId": "p1", "adoptedReqByEmail": "a@example.com", "reqStatus": "pending"})),
        ),
    )
    .await;
    let id = body_json(res).await["insertedId"].as_str().unwrap().to_string();

    let res = send(
        &app,
        request(
            "PATCH",
            &format!("/adoption-requests/{}", id),
            Some(&token),
            Some(json!({"status": "approved"})),
        ),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(body_json(res).await["matchedCount"], 1);

    let doc = ctx
        .data
        .adoption_requests
        .find_one(FilterSpec::new().eq("petId", "p1"))
        .await?
        .expect("request doc");
    assert_eq!(doc.field_str("reqStatus"), Some("approved"));
    Ok(())
}

#[tokio::test]
async fn payment_listing_filters_by_payer_and_campaign() -> Result<()> {
    let (app, ctx) = test_app();
    seed_donation_payment(&ctx, json!({"email": "a@x.y", "donId": "d1", "amount": 500})).await;
    seed_donation_payment(&ctx, json!({"email": "a@x.y", "donId": "d2", "amount": 700})).await;
    seed_donation_payment(&ctx, json!({"email": "b@x.y", "donId": "d1", "amount": 900})).await;

    let token = token_for("a@x.y");
    let res = send(&app, request("GET", "/donation-payments?email=a@x.y", Some(&token), None)).await;
    assert_eq!(body_json(res).await.as_array().unwrap().len(), 2);

    let res = send(
        &app,
        request("GET", "/donation-payments?email=a@x.y&donId=d1", Some(&token), None),
    )
    .await;
    let body = body_json(res).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["amount"], 500);
    Ok(())
}

#[tokio::test]
async fn payment_recording_returns_201() -> Result<()> {
    let (app, _ctx) = test_app();
    let token = token_for("a@x.y");

    let res = send(
        &app,
        request(
            "POST",
            "/donation-payments",
            Some(&token),
            Some(json!({"email": "a@x.y", "donId": "d1", "amount": 500})),
        ),
    )
    .await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let body = body_json(res).await;
    assert_eq!(body["message"], "Donation payment recorded successfully");
    assert!(body["insertedId"].is_string());
    Ok(())
}

#[tokio::test]
async fn payment_delete_requires_matching_payer_email() -> Result<()> {
    let (app, ctx) = test_app();
    let id = seed_donation_payment(&ctx, json!({"email": "payer@x.y", "donId": "d1", "amount": 500})).await;

    let token = token_for("other@x.y");
    let res = send(
        &app,
        request(
            "DELETE",
            &format!("/donation-payments/{}?email=other@x.y", id),
            Some(&token),
            None,
        ),
    )
    .await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body = body_json(res).await;
    assert_eq!(body["message"], "Donation not found or not authorized");

    // Document is still there
    assert_eq!(ctx.data.donation_payments.count(FilterSpec::new()).await?, 1);

    // Matching payer succeeds
    let token = token_for("payer@x.y");
    let res = send(
        &app,
        request(
            "DELETE",
            &format!("/donation-payments/{}?email=payer@x.y", id),
            Some(&token),
            None,
        ),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(ctx.data.donation_payments.count(FilterSpec::new()).await?, 0);
    Ok(())
}

#[tokio::test]
async fn payment_delete_without_email_is_400() -> Result<()> {
    let (app, ctx) = test_app();
    let id = seed_donation_payment(&ctx, json!({"email": "payer@x.y", "amount": 500})).await;

    let token = token_for("payer@x.y");
    let res = send(
        &app,
        request("DELETE", &format!("/donation-payments/{}", id), Some(&token), None),
    )
    .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn payment_intent_returns_client_secret() -> Result<()> {
    let (app, _ctx) = test_app();

    let res = send(
        &app,
        request("POST", "/create-payment-intent", None, Some(json!({"amount": 500}))),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    let body = body_json(res).await;
    assert_eq!(body["clientSecret"], "pi_test_500_secret");

    let res = send(&app, request("POST", "/create-payment-intent", None, Some(json!({})))).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    Ok(())
}
