// Full HTTP path: client -> axum router -> proxy caller -> mocked vendor.

#[cfg(test)]
mod test {
    use httpmock::prelude::*;
    use httpmock::Mock;
    use reqwest::StatusCode;
    use serde_json::{json, Value};

    use crate::helpers::time::now_i64;
    use crate::parser::parser::tests::sample_jwt;
    use crate::server::error::REDEEM_NOT_FOUND_HINT;
    use crate::server::server::{router, AppState};
    use crate::session::issuer::SessionIssuer;
    use crate::tests::common::{
        build_reqwest_client, spawn_axum, test_config, API_KEY, SESSION_SECRET, SESSION_TTL,
    };

    struct Harness {
        base: String,
        client: reqwest::Client,
        handle: tokio::task::JoinHandle<()>,
    }

    impl Harness {
        async fn start(vendor: &MockServer, redeem: Option<&MockServer>) -> Self {
            let redeem_url = redeem.map(|r| r.base_url());
            let config = test_config(&vendor.base_url(), redeem_url.as_deref());
            let state = AppState::from_config(&config).await.unwrap();
            let (handle, addr) = spawn_axum(router(state, &config.settings.metrics)).await;
            Self {
                base: format!("http://{}", addr),
                client: build_reqwest_client(),
                handle,
            }
        }

        fn url(&self, path: &str) -> String {
            format!("{}{}", self.base, path)
        }
    }

    impl Drop for Harness {
        fn drop(&mut self) {
            self.handle.abort();
        }
    }

    async fn mock_authorize<'a>(vendor: &'a MockServer) -> Mock<'a> {
        let token = sample_jwt(now_i64() + 3600);
        vendor
            .mock_async(|when, then| {
                when.method(GET).path("/auth/authorize").header("x-api-key", API_KEY);
                then.status(200).json_body(json!({ "data": token }));
            })
            .await
    }

    fn session_for(customer_id: &str) -> String {
        SessionIssuer::new(SESSION_SECRET, SESSION_TTL)
            .issue(customer_id)
            .unwrap()
            .token
    }

    async fn body(response: reqwest::Response) -> Value {
        response.json::<Value>().await.unwrap()
    }

    #[tokio::test]
    async fn health_is_public() {
        let vendor = MockServer::start_async().await;
        let app = Harness::start(&vendor, None).await;

        let response = app.client.get(app.url("/health")).send().await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body(response).await, json!({ "ok": true }));
    }

    #[tokio::test]
    async fn metrics_are_exposed() {
        let vendor = MockServer::start_async().await;
        let app = Harness::start(&vendor, None).await;

        let response = app.client.get(app.url("/metrics")).send().await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.text().await.unwrap().contains("loyaltyproxy_"));
    }

    #[tokio::test]
    async fn verified_code_yields_session_that_unlocks_protected_routes() {
        let vendor = MockServer::start_async().await;
        let authorize = mock_authorize(&vendor).await;
        let verify = vendor
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/auth/totp/verify")
                    .query_param("code", "000000")
                    .query_param("customer_id", "42");
                then.status(200).json_body(json!({ "verified": true }));
            })
            .await;
        let app = Harness::start(&vendor, None).await;

        let response = app
            .client
            .post(app.url("/auth/totp/verify"))
            .json(&json!({ "customer_id": "42", "code": "000000" }))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let verified = body(response).await;
        assert_eq!(verified["ok"], json!(true));
        assert_eq!(verified["expires_in"], json!(SESSION_TTL));
        assert_eq!(verified["masivo_verify"], json!({ "verified": true }));
        let token = verified["token"].as_str().unwrap().to_owned();
        assert!(!token.is_empty());

        let me = app
            .client
            .get(app.url("/api/me"))
            .bearer_auth(&token)
            .send()
            .await
            .unwrap();
        assert_eq!(me.status(), StatusCode::OK);
        let me = body(me).await;
        assert_eq!(me["ok"], json!(true));
        assert_eq!(me["user"]["customerId"], json!("42"));

        authorize.assert_hits_async(1).await;
        verify.assert_hits_async(1).await;
    }

    #[tokio::test]
    async fn numeric_customer_id_is_accepted_for_code_request() {
        let vendor = MockServer::start_async().await;
        mock_authorize(&vendor).await;
        let totp = vendor
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/auth/totp")
                    .json_body(json!({ "customer_id": "42", "channel": "sms" }));
                then.status(202).json_body(json!({ "sent": true }));
            })
            .await;
        let app = Harness::start(&vendor, None).await;

        let response = app
            .client
            .post(app.url("/auth/totp/request"))
            .json(&json!({ "customer_id": 42, "channel": "sms" }))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::ACCEPTED);
        assert_eq!(body(response).await, json!({ "sent": true }));
        totp.assert_async().await;
    }

    #[tokio::test]
    async fn code_request_without_customer_id_is_rejected_locally() {
        let vendor = MockServer::start_async().await;
        let authorize = mock_authorize(&vendor).await;
        let app = Harness::start(&vendor, None).await;

        let response = app
            .client
            .post(app.url("/auth/totp/request"))
            .json(&json!({ "channel": "sms" }))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body(response).await["ok"], json!(false));
        authorize.assert_hits_async(0).await;
    }

    #[tokio::test]
    async fn malformed_json_is_a_validation_error() {
        let vendor = MockServer::start_async().await;
        let app = Harness::start(&vendor, None).await;

        let response = app
            .client
            .post(app.url("/auth/totp/verify"))
            .header("content-type", "application/json")
            .body("{not json")
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn failed_verification_does_not_issue_session() {
        let vendor = MockServer::start_async().await;
        mock_authorize(&vendor).await;
        vendor
            .mock_async(|when, then| {
                when.method(GET).path("/auth/totp/verify");
                then.status(400).json_body(json!({ "message": "invalid code" }));
            })
            .await;
        let app = Harness::start(&vendor, None).await;

        let response = app
            .client
            .post(app.url("/auth/totp/verify"))
            .json(&json!({ "customer_id": "42", "code": "999999" }))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let error = body(response).await;
        assert_eq!(error["ok"], json!(false));
        assert_eq!(error["detail"], json!({ "message": "invalid code" }));
        assert!(error.get("token").is_none());
    }

    #[tokio::test]
    async fn protected_route_requires_bearer() {
        let vendor = MockServer::start_async().await;
        let app = Harness::start(&vendor, None).await;

        let response = app.client.get(app.url("/api/me")).send().await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = app
            .client
            .get(app.url("/api/me"))
            .bearer_auth("not-a-jwt")
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn expired_session_never_reaches_vendor() {
        let vendor = MockServer::start_async().await;
        let authorize = mock_authorize(&vendor).await;
        let customer = vendor
            .mock_async(|when, then| {
                when.method(GET).path("/customers/42");
                then.status(200).json_body(json!({ "id": "42" }));
            })
            .await;
        let app = Harness::start(&vendor, None).await;

        let expired = SessionIssuer::new(SESSION_SECRET, 60)
            .issue_at("42", now_i64() - 120)
            .unwrap()
            .token;
        let response = app
            .client
            .get(app.url("/api/me/customer"))
            .bearer_auth(expired)
            .send()
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        authorize.assert_hits_async(0).await;
        customer.assert_hits_async(0).await;
    }

    #[tokio::test]
    async fn customer_profile_is_relayed_and_token_reused() {
        let vendor = MockServer::start_async().await;
        let authorize = mock_authorize(&vendor).await;
        let customer = vendor
            .mock_async(|when, then| {
                when.method(GET).path("/customers/42").header_exists("authorization");
                then.status(200).json_body(json!({ "id": "42", "points": 1200 }));
            })
            .await;
        let app = Harness::start(&vendor, None).await;
        let session = session_for("42");

        for _ in 0..2 {
            let response = app
                .client
                .get(app.url("/api/me/customer"))
                .bearer_auth(&session)
                .send()
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
            assert_eq!(body(response).await, json!({ "id": "42", "points": 1200 }));
        }

        authorize.assert_hits_async(1).await;
        customer.assert_hits_async(2).await;
    }

    #[tokio::test]
    async fn vendor_error_status_is_relayed() {
        let vendor = MockServer::start_async().await;
        mock_authorize(&vendor).await;
        vendor
            .mock_async(|when, then| {
                when.method(POST).path("/behavior/events");
                then.status(422).json_body(json!({ "message": "unknown brand" }));
            })
            .await;
        let app = Harness::start(&vendor, None).await;

        let response = app
            .client
            .post(app.url("/api/behavior/events"))
            .bearer_auth(session_for("42"))
            .json(&json!({ "customer_id": "42", "event_type": "purchase", "brand_id": "b-1", "amount": 10 }))
            .send()
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let error = body(response).await;
        assert_eq!(error["ok"], json!(false));
        assert_eq!(error["detail"], json!({ "message": "unknown brand" }));
    }

    #[tokio::test]
    async fn behavior_event_is_reshaped_for_vendor() {
        let vendor = MockServer::start_async().await;
        mock_authorize(&vendor).await;
        let events = vendor
            .mock_async(|when, then| {
                when.method(POST).path("/behavior/events").json_body(json!({
                    "customer_id": "42",
                    "event_type": "purchase",
                    "brand_id": "b-1",
                    "order": { "total": 10 },
                    "amount": 25.5,
                    "store": "downtown",
                }));
                then.status(201).json_body(json!({ "accepted": true }));
            })
            .await;
        let app = Harness::start(&vendor, None).await;

        let response = app
            .client
            .post(app.url("/api/behavior/events"))
            .bearer_auth(session_for("42"))
            .json(&json!({
                "customer_id": 42,
                "event_type": "purchase",
                "brand_id": "b-1",
                "order": { "total": 10 },
                "amount": 25.5,
                "store": "downtown",
            }))
            .send()
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        events.assert_async().await;
    }

    #[tokio::test]
    async fn negative_redeem_amount_is_rejected_before_vendor() {
        let vendor = MockServer::start_async().await;
        let authorize = mock_authorize(&vendor).await;
        let redeem = vendor
            .mock_async(|when, then| {
                when.method(POST).path("/customers/42/redeem");
                then.status(200);
            })
            .await;
        let app = Harness::start(&vendor, None).await;

        let response = app
            .client
            .post(app.url("/api/rewards/redeem"))
            .bearer_auth(session_for("42"))
            .json(&json!({ "customer_id": "42", "reward_id": "r-1", "amount": -5 }))
            .send()
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body(response).await["ok"], json!(false));
        authorize.assert_hits_async(0).await;
        redeem.assert_hits_async(0).await;
    }

    #[tokio::test]
    async fn redeem_goes_to_redeem_base_url() {
        let vendor = MockServer::start_async().await;
        let redeem_host = MockServer::start_async().await;
        mock_authorize(&vendor).await;
        let redeem = redeem_host
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/customers/42/redeem")
                    .json_body(json!({ "customer_id": "42", "reward_id": "r-1", "amount": 100.0 }));
                then.status(200).json_body(json!({ "redeemed": true }));
            })
            .await;
        let preview = redeem_host
            .mock_async(|when, then| {
                when.method(PUT)
                    .path("/redeem/preview")
                    .json_body(json!({ "order": { "total": 300 } }));
                then.status(200).json_body(json!({ "points": 30 }));
            })
            .await;
        let app = Harness::start(&vendor, Some(&redeem_host)).await;
        let session = session_for("42");

        let response = app
            .client
            .put(app.url("/api/rewards/redeem/preview"))
            .bearer_auth(&session)
            .json(&json!({ "order": { "total": 300 } }))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body(response).await, json!({ "points": 30 }));

        let response = app
            .client
            .post(app.url("/api/rewards/redeem"))
            .bearer_auth(&session)
            .json(&json!({ "customer_id": "42", "reward_id": "r-1", "amount": 100 }))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body(response).await, json!({ "redeemed": true }));

        preview.assert_async().await;
        redeem.assert_async().await;
    }

    #[tokio::test]
    async fn redeem_not_found_carries_configuration_hint() {
        let vendor = MockServer::start_async().await;
        mock_authorize(&vendor).await;
        vendor
            .mock_async(|when, then| {
                when.method(POST).path("/customers/42/redeem");
                then.status(404).json_body(json!({ "message": "Not Found" }));
            })
            .await;
        let app = Harness::start(&vendor, None).await;

        let response = app
            .client
            .post(app.url("/api/rewards/redeem"))
            .bearer_auth(session_for("42"))
            .json(&json!({ "customer_id": "42", "reward_id": "r-1", "amount": 10 }))
            .send()
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let error = body(response).await;
        assert_eq!(error["ok"], json!(false));
        assert_eq!(error["detail"], json!({ "message": "Not Found" }));
        assert_eq!(error["hint"], json!(REDEEM_NOT_FOUND_HINT));
    }

    #[tokio::test]
    async fn rejected_api_key_is_reported_with_vendor_status() {
        let vendor = MockServer::start_async().await;
        vendor
            .mock_async(|when, then| {
                when.method(GET).path("/auth/authorize");
                then.status(403).json_body(json!({ "message": "invalid key" }));
            })
            .await;
        let app = Harness::start(&vendor, None).await;

        let response = app
            .client
            .get(app.url("/api/me/customer"))
            .bearer_auth(session_for("42"))
            .send()
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(body(response).await["ok"], json!(false));
    }
}
