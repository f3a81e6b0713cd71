#[cfg(test)]
mod integration_tests {
    use crate::schemas::ApiResponse;
    use crate::test_utils::test_utils::{
        bearer, create_test_business, register_and_login, setup_test_app, TestApp,
    };
    use axum::http::StatusCode;
    use axum_test::multipart::{MultipartForm, Part};
    use rust_decimal::Decimal;
    use serde_json::{json, Value};
    use std::str::FromStr;

    fn decimal(value: &Value) -> Decimal {
        match value {
            Value::String(s) => Decimal::from_str(s).unwrap(),
            other => Decimal::from_str(&other.to_string()).unwrap(),
        }
    }

    async fn owner_with_business(app: &TestApp) -> (String, i32) {
        let (_, token) = register_and_login(&app.server, "owner").await;
        let business_id = create_test_business(
            &app.server,
            &token,
            json!({
                "name": "Warung Sejahtera",
                "business_type": "UMKM",
                "industry": "Food",
                "description": "Home-made snacks",
                "products": [{"name": "Keripik Singkong", "unit": "pcs"}],
                "additional_info": [{"name": "employees", "value": "12"}]
            }),
        )
        .await;
        (token, business_id)
    }

    #[tokio::test]
    async fn test_health_check() {
        let app = setup_test_app().await;

        let response = app.server.get("/health").await;

        response.assert_status(StatusCode::OK);
        let body: Value = response.json();
        assert_eq!(body["database"], "connected");
    }

    #[tokio::test]
    async fn test_register_and_login() {
        let app = setup_test_app().await;

        let (user_id, token) = register_and_login(&app.server, "alice").await;
        assert!(user_id > 0);

        let (name, value) = bearer(&token);
        let response = app.server.get("/users/me").add_header(name, value).await;
        response.assert_status_ok();
        let body: ApiResponse<Value> = response.json();
        assert_eq!(body.data["username"], "alice");
        assert_eq!(body.data["email"], "alice@example.com");
        assert!(body.data.get("password_hash").is_none());
    }

    #[tokio::test]
    async fn test_register_rejects_duplicates_and_bad_input() {
        let app = setup_test_app().await;
        register_and_login(&app.server, "alice").await;

        let response = app
            .server
            .post("/register")
            .json(&json!({"username": "alice", "email": "other@example.com", "password": "password123"}))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["success"], false);
        assert_eq!(body["code"], "BAD_REQUEST");

        let response = app
            .server
            .post("/register")
            .json(&json!({"username": "bob", "email": "not-an-email", "password": "password123"}))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_login_with_wrong_password_is_unauthorized() {
        let app = setup_test_app().await;
        register_and_login(&app.server, "alice").await;

        let response = app
            .server
            .post("/login")
            .json(&json!({"username": "alice", "password": "wrong-password"}))
            .await;

        response.assert_status(StatusCode::UNAUTHORIZED);
        let body: Value = response.json();
        assert_eq!(body["code"], "UNAUTHORIZED");
    }

    #[tokio::test]
    async fn test_protected_route_requires_token() {
        let app = setup_test_app().await;

        app.server.get("/users/me").await.assert_status(StatusCode::UNAUTHORIZED);

        let (name, value) = bearer("garbage");
        app.server
            .get("/users/me")
            .add_header(name, value)
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_user_can_only_update_self() {
        let app = setup_test_app().await;
        let (alice_id, alice) = register_and_login(&app.server, "alice").await;
        let (_, bob) = register_and_login(&app.server, "bob").await;

        let (name, value) = bearer(&bob);
        app.server
            .put(&format!("/users/{}", alice_id))
            .add_header(name, value)
            .json(&json!({"username": "mallory"}))
            .await
            .assert_status(StatusCode::FORBIDDEN);

        let (name, value) = bearer(&alice);
        let response = app
            .server
            .put(&format!("/users/{}", alice_id))
            .add_header(name, value)
            .json(&json!({"username": "alice2"}))
            .await;
        response.assert_status_ok();
        let body: ApiResponse<Value> = response.json();
        assert_eq!(body.data["username"], "alice2");
    }

    #[tokio::test]
    async fn test_business_lifecycle() {
        let app = setup_test_app().await;
        let (token, business_id) = owner_with_business(&app).await;

        let response = app.server.get(&format!("/business/{}", business_id)).await;
        response.assert_status_ok();
        let body: ApiResponse<Value> = response.json();
        assert_eq!(body.data["name"], "Warung Sejahtera");
        assert_eq!(body.data["products"].as_array().unwrap().len(), 1);
        assert_eq!(body.data["additional_info"][0]["value"], "12");
        assert!(body.data["financial"].is_null());
        assert_eq!(decimal(&body.data["market_cap"]), Decimal::ZERO);

        let (name, value) = bearer(&token);
        let response = app
            .server
            .put(&format!("/business/{}", business_id))
            .add_header(name, value)
            .json(&json!({"industry": "Culinary"}))
            .await;
        response.assert_status_ok();
        let body: ApiResponse<Value> = response.json();
        assert_eq!(body.data["industry"], "Culinary");
        assert_eq!(body.data["name"], "Warung Sejahtera");

        let (name, value) = bearer(&token);
        let response = app.server.get("/business/user").add_header(name, value).await;
        let body: ApiResponse<Vec<Value>> = response.json();
        assert_eq!(body.data.len(), 1);

        let (name, value) = bearer(&token);
        app.server
            .delete(&format!("/business/{}", business_id))
            .add_header(name, value)
            .await
            .assert_status_ok();

        app.server
            .get(&format!("/business/{}", business_id))
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_business_mutation_requires_owner() {
        let app = setup_test_app().await;
        let (_, business_id) = owner_with_business(&app).await;
        let (_, intruder) = register_and_login(&app.server, "intruder").await;

        let (name, value) = bearer(&intruder);
        let response = app
            .server
            .put(&format!("/business/{}", business_id))
            .add_header(name, value)
            .json(&json!({"name": "Taken over"}))
            .await;
        response.assert_status(StatusCode::FORBIDDEN);

        let (name, value) = bearer(&intruder);
        app.server
            .post(&format!("/business/{}/products", business_id))
            .add_header(name, value)
            .json(&json!({"products": [{"name": "Fake"}]}))
            .await
            .assert_status(StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_products_add_update_delete() {
        let app = setup_test_app().await;
        let (token, business_id) = owner_with_business(&app).await;

        let (name, value) = bearer(&token);
        let response = app
            .server
            .post(&format!("/business/{}/products", business_id))
            .add_header(name, value)
            .json(&json!({"products": [{"name": "Rempeyek", "hpp": "1500"}]}))
            .await;
        response.assert_status(StatusCode::CREATED);
        let body: ApiResponse<Vec<Value>> = response.json();
        let product_id = body.data[0]["id"].as_i64().unwrap();

        let (name, value) = bearer(&token);
        let response = app
            .server
            .put(&format!("/business/{}/products/{}", business_id, product_id))
            .add_header(name, value)
            .json(&json!({"name": "Rempeyek Kacang"}))
            .await;
        response.assert_status_ok();

        let (name, value) = bearer(&token);
        app.server
            .delete(&format!("/business/{}/products/{}", business_id, product_id))
            .add_header(name, value)
            .await
            .assert_status_ok();

        let response = app.server.get(&format!("/business/{}/products", business_id)).await;
        let body: ApiResponse<Vec<Value>> = response.json();
        assert_eq!(body.data.len(), 1);
        assert_eq!(body.data[0]["name"], "Keripik Singkong");
    }

    #[tokio::test]
    async fn test_financials_are_append_only_with_valuation() {
        let app = setup_test_app().await;
        let (token, business_id) = owner_with_business(&app).await;

        let (name, value) = bearer(&token);
        app.server
            .get(&format!("/business/{}/financial", business_id))
            .add_header(name, value)
            .await
            .assert_status(StatusCode::NOT_FOUND);

        let (name, value) = bearer(&token);
        let response = app
            .server
            .post(&format!("/business/{}/financial", business_id))
            .add_header(name, value)
            .json(&json!({"revenue": "4000000000", "ebitda": "500000000", "assets": "2000000000"}))
            .await;
        response.assert_status(StatusCode::CREATED);
        let body: ApiResponse<Value> = response.json();
        assert_eq!(decimal(&body.data["ebitda_multiplier"]), Decimal::from(2));
        assert_eq!(decimal(&body.data["market_cap"]), Decimal::from(1_000_000_000i64));
        assert_eq!(decimal(&body.data["liabilities"]), Decimal::ZERO);

        let (name, value) = bearer(&token);
        let response = app
            .server
            .put(&format!("/business/{}/financial", business_id))
            .add_header(name, value)
            .json(&json!({"ebitda": "600000000"}))
            .await;
        response.assert_status_ok();
        let body: ApiResponse<Value> = response.json();
        assert_eq!(decimal(&body.data["revenue"]), Decimal::from(4_000_000_000i64));
        assert_eq!(decimal(&body.data["ebitda"]), Decimal::from(600_000_000i64));

        let (name, value) = bearer(&token);
        app.server
            .put(&format!("/business/{}/financial", business_id))
            .add_header(name, value)
            .json(&json!({}))
            .await
            .assert_status(StatusCode::BAD_REQUEST);

        let (name, value) = bearer(&token);
        let response = app
            .server
            .get(&format!("/business/{}/financial/history", business_id))
            .add_header(name, value)
            .await;
        let body: ApiResponse<Vec<Value>> = response.json();
        assert_eq!(body.data.len(), 2);
        assert_eq!(decimal(&body.data[0]["ebitda"]), Decimal::from(600_000_000i64));

        let response = app.server.get(&format!("/business/{}", business_id)).await;
        let body: ApiResponse<Value> = response.json();
        assert_eq!(decimal(&body.data["market_cap"]), Decimal::from(1_200_000_000i64));
    }

    #[tokio::test]
    async fn test_marketplace_pagination() {
        let app = setup_test_app().await;
        let (_, token) = register_and_login(&app.server, "owner").await;
        for i in 0..25 {
            create_test_business(
                &app.server,
                &token,
                json!({"name": format!("Business {:02}", i), "industry": "Retail"}),
            )
            .await;
        }

        let response = app.server.get("/investment/businesses?page=3&limit=10").await;
        response.assert_status_ok();
        let body: ApiResponse<Value> = response.json();
        assert_eq!(body.data["total"], 25);
        assert_eq!(body.data["totalPages"], 3);
        assert_eq!(body.data["page"], 3);
        assert_eq!(body.data["businesses"].as_array().unwrap().len(), 5);

        let response = app.server.get("/investment/businesses?page=abc&limit=500").await;
        let body: ApiResponse<Value> = response.json();
        assert_eq!(body.data["page"], 1);
        assert_eq!(body.data["limit"], 10);
        assert_eq!(body.data["businesses"].as_array().unwrap().len(), 10);
    }

    #[tokio::test]
    async fn test_marketplace_search_and_industry() {
        let app = setup_test_app().await;
        let (_, token) = register_and_login(&app.server, "owner").await;
        create_test_business(&app.server, &token, json!({"name": "Kopi Nusantara", "industry": "Food"})).await;
        create_test_business(&app.server, &token, json!({"name": "Batik Solo", "industry": "Fashion", "description": "Hand-drawn KOPI motifs"})).await;
        create_test_business(&app.server, &token, json!({"name": "Bengkel Jaya", "industry": "Automotive"})).await;

        let response = app.server.get("/investment/businesses?search=kopi").await;
        let body: ApiResponse<Value> = response.json();
        assert_eq!(body.data["total"], 2);

        let response = app.server.get("/investment/businesses?industry=Food").await;
        let body: ApiResponse<Value> = response.json();
        assert_eq!(body.data["total"], 1);
        assert_eq!(body.data["businesses"][0]["name"], "Kopi Nusantara");
    }

    #[tokio::test]
    async fn test_investment_flow() {
        let app = setup_test_app().await;
        let (owner, business_id) = owner_with_business(&app).await;
        let (investor_id, investor) = register_and_login(&app.server, "investor").await;
        let (_, stranger) = register_and_login(&app.server, "stranger").await;

        let (name, value) = bearer(&investor);
        let response = app
            .server
            .post("/investment")
            .add_header(name, value)
            .json(&json!({"business_id": business_id, "amount": "0"}))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);

        let (name, value) = bearer(&investor);
        let response = app
            .server
            .post("/investment")
            .add_header(name, value)
            .json(&json!({"business_id": business_id, "amount": "25000000"}))
            .await;
        response.assert_status(StatusCode::CREATED);
        let body: ApiResponse<Value> = response.json();
        let investment_id = body.data["id"].as_i64().unwrap();
        assert_eq!(body.data["status"], "pending");
        assert_eq!(body.data["investor_id"], investor_id);

        let (name, value) = bearer(&investor);
        app.server
            .put(&format!("/investment/{}", investment_id))
            .add_header(name, value)
            .json(&json!({"amount": "-5"}))
            .await
            .assert_status(StatusCode::BAD_REQUEST);

        let (name, value) = bearer(&investor);
        let response = app
            .server
            .put(&format!("/investment/{}", investment_id))
            .add_header(name, value)
            .json(&json!({"amount": "30000000"}))
            .await;
        response.assert_status_ok();
        let body: ApiResponse<Value> = response.json();
        assert_eq!(decimal(&body.data["amount"]), Decimal::from(30_000_000));

        // Business owner may read it, a stranger may not
        let (name, value) = bearer(&owner);
        app.server
            .get(&format!("/investment/{}", investment_id))
            .add_header(name, value)
            .await
            .assert_status_ok();
        let (name, value) = bearer(&stranger);
        app.server
            .get(&format!("/investment/{}", investment_id))
            .add_header(name, value)
            .await
            .assert_status(StatusCode::FORBIDDEN);

        let (name, value) = bearer(&investor);
        app.server
            .put(&format!("/investment/{}/status", investment_id))
            .add_header(name, value)
            .json(&json!({"status": "sideways"}))
            .await
            .assert_status(StatusCode::BAD_REQUEST);

        let (name, value) = bearer(&investor);
        let response = app
            .server
            .put(&format!("/investment/{}/status", investment_id))
            .add_header(name, value)
            .json(&json!({"status": "active"}))
            .await;
        response.assert_status_ok();
        let body: ApiResponse<Value> = response.json();
        assert!(!body.data["time_bought"].is_null());
        assert!(body.data["time_sold"].is_null());

        let (name, value) = bearer(&investor);
        let response = app
            .server
            .put(&format!("/investment/{}/status", investment_id))
            .add_header(name, value)
            .json(&json!({"status": "exited"}))
            .await;
        let body: ApiResponse<Value> = response.json();
        assert_eq!(body.data["status"], "exited");
        assert!(!body.data["time_sold"].is_null());

        let (name, value) = bearer(&investor);
        let response = app
            .server
            .get(&format!("/investment/user/business/{}", business_id))
            .add_header(name, value)
            .await;
        let body: ApiResponse<Vec<Value>> = response.json();
        assert_eq!(body.data.len(), 1);

        let (name, value) = bearer(&investor);
        app.server
            .delete(&format!("/investment/{}", investment_id))
            .add_header(name, value)
            .await
            .assert_status_ok();

        let (name, value) = bearer(&investor);
        let response = app.server.get("/investment").add_header(name, value).await;
        let body: ApiResponse<Vec<Value>> = response.json();
        assert!(body.data.is_empty());
    }

    #[tokio::test]
    async fn test_legal_upload_is_stored_and_served() {
        let app = setup_test_app().await;
        let (token, business_id) = owner_with_business(&app).await;

        let form = MultipartForm::new()
            .add_text("legal_type", "NIB")
            .add_text("issued_at", "2024-02-30")
            .add_text("valid_until", "2030-01-31")
            .add_part(
                "file",
                Part::bytes(b"%PDF-1.4 nib".to_vec())
                    .file_name("../nib.pdf")
                    .mime_type("application/pdf"),
            );
        let (name, value) = bearer(&token);
        let response = app
            .server
            .post(&format!("/business/{}/legal", business_id))
            .add_header(name, value)
            .multipart(form)
            .await;
        response.assert_status(StatusCode::CREATED);
        let body: ApiResponse<Value> = response.json();
        assert_eq!(body.data["legal_type"], "NIB");
        assert!(body.data["issued_at"].is_null());
        assert_eq!(body.data["valid_until"], "2030-01-31");

        let url = body.data["file_url"].as_str().unwrap().to_string();
        assert!(url.starts_with("/uploads/legal/business/"));
        assert!(url.ends_with("_nib.pdf"));

        let served = app.server.get(&url).await;
        served.assert_status_ok();
        assert_eq!(served.as_bytes().to_vec(), b"%PDF-1.4 nib".to_vec());

        // No file part
        let form = MultipartForm::new().add_text("legal_type", "NPWP");
        let (name, value) = bearer(&token);
        app.server
            .post(&format!("/business/{}/legal", business_id))
            .add_header(name, value)
            .multipart(form)
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_legal_analysis_is_cached_until_refresh() {
        let app = setup_test_app().await;
        let (token, business_id) = owner_with_business(&app).await;

        let form = MultipartForm::new()
            .add_text("legal_type", "NIB")
            .add_part("file", Part::bytes(b"nib".to_vec()).file_name("nib.pdf"));
        let (name, value) = bearer(&token);
        app.server
            .post(&format!("/business/{}/legal", business_id))
            .add_header(name, value)
            .multipart(form)
            .await
            .assert_status(StatusCode::CREATED);

        let (name, value) = bearer(&token);
        app.server
            .get(&format!("/business/{}/legal/comparison", business_id))
            .add_header(name, value)
            .await
            .assert_status(StatusCode::NOT_FOUND);

        let provider_answer = json!({
            "required": [
                {"type": "NIB", "has_legal": false, "steps": [{"step_number": 1, "description": "Apply online"}]},
                {"type": "NPWP", "has_legal": true, "steps": [
                    {"step_number": 1, "description": "Register at the tax office", "redirect_url": "https://pajak.go.id"}
                ]}
            ],
            "products": [
                {"product_name": "keripik", "required": [{"type": "PIRT", "steps": []}]},
                {"product_name": "Unknown Gadget", "required": [{"type": "SNI"}]}
            ]
        });
        app.genai.push(provider_answer.to_string());

        let (name, value) = bearer(&token);
        let response = app
            .server
            .post("/genai/legal-analysis")
            .add_header(name, value)
            .json(&json!({"business_id": business_id}))
            .await;
        response.assert_status_ok();
        let body: ApiResponse<Value> = response.json();
        let required = body.data["required"].as_array().unwrap();
        let nib = required.iter().find(|r| r["type"] == "NIB").unwrap();
        let npwp = required.iter().find(|r| r["type"] == "NPWP").unwrap();
        assert_eq!(nib["has_legal"], true);
        assert_eq!(npwp["has_legal"], false);
        assert_eq!(npwp["steps"][0]["redirect_url"], "https://pajak.go.id");

        let products = body.data["products"].as_array().unwrap();
        assert_eq!(products.len(), 1);
        assert_eq!(products[0]["product_name"], "Keripik Singkong");
        assert_eq!(app.genai.calls(), 1);

        // Second request is served from storage
        let (name, value) = bearer(&token);
        let response = app
            .server
            .post("/genai/legal-analysis")
            .add_header(name, value)
            .json(&json!({"business_id": business_id}))
            .await;
        response.assert_status_ok();
        assert_eq!(app.genai.calls(), 1);

        let (name, value) = bearer(&token);
        app.server
            .get(&format!("/business/{}/legal/comparison", business_id))
            .add_header(name, value)
            .await
            .assert_status_ok();

        let response = app.server.get(&format!("/business/{}", business_id)).await;
        let body: ApiResponse<Value> = response.json();
        assert!(!body.data["legal_analyzed_at"].is_null());

        // Refresh asks the provider again; an empty queue is a provider failure
        let (name, value) = bearer(&token);
        app.server
            .post("/genai/legal-analysis")
            .add_header(name, value)
            .json(&json!({"business_id": business_id, "is_refresh": true}))
            .await
            .assert_status(StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(app.genai.calls(), 2);
    }

    #[tokio::test]
    async fn test_legal_analysis_requires_owner() {
        let app = setup_test_app().await;
        let (_, business_id) = owner_with_business(&app).await;
        let (_, other) = register_and_login(&app.server, "other").await;

        let (name, value) = bearer(&other);
        app.server
            .post("/genai/legal-analysis")
            .add_header(name, value)
            .json(&json!({"business_id": business_id}))
            .await
            .assert_status(StatusCode::FORBIDDEN);
        assert_eq!(app.genai.calls(), 0);
    }

    #[tokio::test]
    async fn test_suggestions_are_cached() {
        let app = setup_test_app().await;
        let (token, business_id) = owner_with_business(&app).await;

        app.genai.push(
            json!({
                "business_name": "Warung Sejahtera",
                "suggestions": [
                    {"suggestion": "Sell through marketplaces", "category": "Marketing", "priority": "High"},
                    {"suggestion": "Register PIRT", "category": "Legal", "priority": "Medium"}
                ]
            })
            .to_string(),
        );

        let path = format!("/genai/business/{}/suggestions", business_id);
        let (name, value) = bearer(&token);
        let response = app.server.get(&path).add_header(name, value).await;
        response.assert_status_ok();
        let first: ApiResponse<Value> = response.json();
        assert_eq!(first.data["suggestions"].as_array().unwrap().len(), 2);

        let (name, value) = bearer(&token);
        let response = app.server.get(&path).add_header(name, value).await;
        let second: ApiResponse<Value> = response.json();
        assert_eq!(second.data["suggestions"], first.data["suggestions"]);
        assert_eq!(app.genai.calls(), 1);

        app.genai.push(
            json!({"business_name": "", "suggestions": [{"suggestion": "Hire", "category": "Operations", "priority": "Low"}]})
                .to_string(),
        );
        let (name, value) = bearer(&token);
        let response = app
            .server
            .get(&format!("{}?isRefresh=true", path))
            .add_header(name, value)
            .await;
        let refreshed: ApiResponse<Value> = response.json();
        assert_eq!(refreshed.data["business_name"], "Warung Sejahtera");
        assert_eq!(refreshed.data["suggestions"].as_array().unwrap().len(), 1);
        assert_eq!(app.genai.calls(), 2);
    }

    #[tokio::test]
    async fn test_projections_include_summary() {
        let app = setup_test_app().await;
        let (token, business_id) = owner_with_business(&app).await;

        app.genai.push(
            json!({
                "projections": [
                    {"year": 2028, "revenue": 121.0, "expenses": 90.0, "net_income": 31.0, "cash_flow": 25.0},
                    {"year": 2027, "revenue": 110.0, "expenses": 115.0, "net_income": -5.0, "cash_flow": -2.0}
                ]
            })
            .to_string(),
        );

        let path = format!("/genai/business/{}/projections", business_id);
        let (name, value) = bearer(&token);
        let response = app.server.get(&path).add_header(name, value).await;
        response.assert_status_ok();
        let body: ApiResponse<Value> = response.json();
        assert_eq!(body.data["projections"][0]["year"], 2027);
        assert_eq!(body.data["total_projected_revenue"].as_f64().unwrap(), 231.0);
        assert_eq!(body.data["business_name"], "Warung Sejahtera");

        let (name, value) = bearer(&token);
        app.server.get(&path).add_header(name, value).await.assert_status_ok();
        assert_eq!(app.genai.calls(), 1);
    }

    #[tokio::test]
    async fn test_chat_and_infer_products() {
        let app = setup_test_app().await;
        let (_, token) = register_and_login(&app.server, "asker").await;

        app.genai.push(r#"```json
[{"header": "Funding", "response": "Consider KUR loans."}]
```"#);
        let (name, value) = bearer(&token);
        let response = app
            .server
            .get("/genai/response?input=how%20to%20fund")
            .add_header(name, value)
            .await;
        response.assert_status_ok();
        let body: ApiResponse<Value> = response.json();
        assert_eq!(body.data["sections"][0]["header"], "Funding");

        app.genai.push(r#""Keripik, Rempeyek""#);
        let form = MultipartForm::new().add_part(
            "file",
            Part::bytes(b"catalog".to_vec())
                .file_name("catalog.pdf")
                .mime_type("application/pdf"),
        );
        let (name, value) = bearer(&token);
        let response = app
            .server
            .post("/genai/infer-products")
            .add_header(name, value)
            .multipart(form)
            .await;
        response.assert_status_ok();
        let body: ApiResponse<Value> = response.json();
        assert_eq!(body.data["products"], json!(["Keripik", "Rempeyek"]));

        let request = app.genai.requests().pop().unwrap();
        let attachment = request.attachment.unwrap();
        assert_eq!(attachment.mime_type, "application/pdf");
        assert_eq!(attachment.data, b"catalog".to_vec());
    }

    #[tokio::test]
    async fn test_investment_advice_references_marketplace() {
        let app = setup_test_app().await;
        let (_, business_id) = owner_with_business(&app).await;
        let (_, investor) = register_and_login(&app.server, "investor").await;

        app.genai.push("Warung Sejahtera looks promising.");
        let (name, value) = bearer(&investor);
        let response = app
            .server
            .post("/genai/investment-advice")
            .add_header(name, value)
            .json(&json!({"question": "Which snacks business should I fund?"}))
            .await;
        response.assert_status_ok();
        let body: ApiResponse<Value> = response.json();
        assert_eq!(body.data["answer"], "Warung Sejahtera looks promising.");
        assert_eq!(body.data["referenced_business_ids"], json!([business_id]));
        assert!(app.genai.last_prompt().unwrap().contains("Warung Sejahtera"));

        let (name, value) = bearer(&investor);
        app.server
            .post("/genai/investment-advice")
            .add_header(name, value)
            .json(&json!({"question": ""}))
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_metrics_are_not_mounted_on_plain_router() {
        let app = setup_test_app().await;
        app.server.get("/metrics").await.assert_status(StatusCode::NOT_FOUND);
    }
}
