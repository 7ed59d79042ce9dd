//! Integration tests for the reqwest transport against a mock gateway.
//!
//! ```bash
//! cargo test -p wxpay-lib --test http_gateway
//! ```

#![cfg(feature = "http-transport")]

mod common;

use std::sync::Arc;

use common::*;
use tokio::task::JoinSet;
use wiremock::{
    matchers::{header_exists, header_regex, method, path},
    Mock, MockServer, Request, Respond, ResponseTemplate,
};
use wxpay_lib::crypto::keys::decode_public_key;
use wxpay_lib::crypto::verify_signature;
use wxpay_lib::{
    canonical_request, fetch_and_decrypt, GatewayClient, GatewayConfig, GatewayRequest,
    HttpTransport, Method, WxPayError,
};

/// Answers like the gateway: checks the request signature with the merchant
/// public key, then replies with a signed body.
struct CheckingGateway {
    body: Vec<u8>,
    signer_serial: &'static str,
    signer_key: &'static str,
}

impl Respond for CheckingGateway {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let Some(authorization) = request
            .headers
            .get("Authorization")
            .and_then(|v| v.to_str().ok())
        else {
            return ResponseTemplate::new(401);
        };
        let (scheme, fields) = parse_authorization(authorization);

        let mut path_and_query = request.url.path().to_string();
        if let Some(query) = request.url.query() {
            path_and_query.push('?');
            path_and_query.push_str(query);
        }
        let method = match request.method.as_str() {
            "POST" => Method::Post,
            _ => Method::Get,
        };
        let message = canonical_request(
            method,
            &path_and_query,
            fields["timestamp"].parse().unwrap(),
            &fields["nonce_str"],
            &request.body,
        );
        let merchant = decode_public_key(MERCHANT_PUBLIC_PEM).unwrap();
        if scheme != "WECHATPAY2-SHA256-RSA2048"
            || fields["mchid"] != MERCHANT_ID
            || !verify_signature(&message, &fields["signature"], &merchant)
        {
            return ResponseTemplate::new(401).set_body_json(serde_json::json!({
                "code": "SIGN_ERROR",
                "message": "signature mismatch"
            }));
        }

        let signed = sign_response(&self.body, self.signer_serial, self.signer_key);
        ResponseTemplate::new(200)
            .set_body_raw(self.body.clone(), "application/json")
            .insert_header("Wechatpay-Timestamp", signed.timestamp.as_str())
            .insert_header("Wechatpay-Nonce", signed.nonce.as_str())
            .insert_header("Wechatpay-Signature", signed.signature.as_str())
            .insert_header("Wechatpay-Serial", signed.serial_no.as_str())
            .insert_header("Request-ID", "08F78BB5AF0610D302")
    }
}

async fn mount_certificates(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/v3/certificates"))
        .and(header_exists("Authorization"))
        .respond_with(CheckingGateway {
            body: listing_json(&[
                (PLATFORM_A_SERIAL, PLATFORM_A_CERT_PEM),
                (PLATFORM_B_SERIAL, PLATFORM_B_CERT_PEM),
            ]),
            signer_serial: PLATFORM_A_SERIAL,
            signer_key: PLATFORM_A_KEY_PEM,
        })
        .mount(server)
        .await;
}

fn transport(server: &MockServer) -> HttpTransport {
    HttpTransport::new(GatewayConfig::new(server.uri()).with_timeout(5)).unwrap()
}

#[tokio::test]
async fn test_fetch_and_decrypt_over_http() {
    let server = MockServer::start().await;
    mount_certificates(&server).await;

    let store = fetch_and_decrypt(&credential(), &api_v3_key(), &transport(&server))
        .await
        .unwrap();

    assert_eq!(store.len().unwrap(), 2);
    assert!(store.get(PLATFORM_A_SERIAL).unwrap().is_some());
    assert!(store.get(PLATFORM_B_SERIAL).unwrap().is_some());
}

#[tokio::test]
async fn test_authorization_header_format_on_the_wire() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v3/certificates"))
        .and(header_regex(
            "Authorization",
            r#"^WECHATPAY2-SHA256-RSA2048 mchid="1900000001",nonce_str="[A-Za-z0-9]{32}",timestamp="\d+",serial_no="6F2A0B1C3D4E5F60718293A4B5C6D7E8F9012345",signature="[A-Za-z0-9+/]+={0,2}"$"#,
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "data": [] })))
        .expect(1)
        .mount(&server)
        .await;

    let store = fetch_and_decrypt(&credential(), &api_v3_key(), &transport(&server))
        .await
        .unwrap();
    assert!(store.is_empty().unwrap());
}

#[tokio::test]
async fn test_client_verifies_signed_reply() {
    let server = MockServer::start().await;
    mount_certificates(&server).await;
    Mock::given(method("POST"))
        .and(path("/v3/refund/domestic/refunds"))
        .respond_with(CheckingGateway {
            body: br#"{"refund_id":"50000000382019052709732678859","status":"PROCESSING"}"#.to_vec(),
            signer_serial: PLATFORM_B_SERIAL,
            signer_key: PLATFORM_B_KEY_PEM,
        })
        .mount(&server)
        .await;

    let client = GatewayClient::new(credential(), api_v3_key(), transport(&server));
    assert_eq!(client.refresh_certificates().await.unwrap(), 2);

    let response = client
        .execute(
            GatewayRequest::json(
                Method::Post,
                "/v3/refund/domestic/refunds",
                &serde_json::json!({ "out_refund_no": "R1", "amount": { "refund": 1, "total": 1 } }),
            )
            .unwrap(),
        )
        .await
        .unwrap();
    assert!(response.verified);
    assert_eq!(response.request_id(), Some("08F78BB5AF0610D302"));
    let reply: serde_json::Value = response.json().unwrap();
    assert_eq!(reply["status"], "PROCESSING");
}

#[tokio::test]
async fn test_reply_signed_with_wrong_key_rejected() {
    let server = MockServer::start().await;
    mount_certificates(&server).await;
    // Claims to be certificate A but is signed with B's key.
    Mock::given(method("GET"))
        .and(path("/v3/pay/transactions/id/4200000001"))
        .respond_with(CheckingGateway {
            body: br#"{"trade_state":"SUCCESS"}"#.to_vec(),
            signer_serial: PLATFORM_A_SERIAL,
            signer_key: PLATFORM_B_KEY_PEM,
        })
        .mount(&server)
        .await;

    let client = GatewayClient::new(credential(), api_v3_key(), transport(&server));
    client.refresh_certificates().await.unwrap();

    let err = client
        .get_json::<serde_json::Value>("/v3/pay/transactions/id/4200000001")
        .await
        .unwrap_err();
    assert!(matches!(err, WxPayError::SignatureMismatch { .. }));
}

#[tokio::test]
async fn test_reply_without_signature_headers_rejected() {
    let server = MockServer::start().await;
    mount_certificates(&server).await;
    Mock::given(method("GET"))
        .and(path("/v3/refund/domestic/refunds/R1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "refund_id": "R1", "amount": 999999 })),
        )
        .mount(&server)
        .await;

    let client = GatewayClient::new(credential(), api_v3_key(), transport(&server));
    client.refresh_certificates().await.unwrap();

    let err = client
        .get_json::<serde_json::Value>("/v3/refund/domestic/refunds/R1")
        .await
        .unwrap_err();
    assert!(matches!(err, WxPayError::UnsignedResponse { status: 200 }));
}

#[tokio::test]
async fn test_gateway_error_reply() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v3/certificates"))
        .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
            "code": "SIGN_ERROR",
            "message": "signature mismatch"
        })))
        .mount(&server)
        .await;

    let err = fetch_and_decrypt(&credential(), &api_v3_key(), &transport(&server))
        .await
        .unwrap_err();
    match err {
        WxPayError::CertificateFetch { source, .. } => match *source {
            WxPayError::Gateway { status, code, .. } => {
                assert_eq!(status, 401);
                assert_eq!(code, "SIGN_ERROR");
            }
            other => panic!("unexpected source: {other:?}"),
        },
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_calls_share_store() {
    let server = MockServer::start().await;
    mount_certificates(&server).await;
    Mock::given(method("GET"))
        .and(path("/v3/refund/domestic/refunds/R1"))
        .respond_with(CheckingGateway {
            body: br#"{"refund_id":"R1"}"#.to_vec(),
            signer_serial: PLATFORM_A_SERIAL,
            signer_key: PLATFORM_A_KEY_PEM,
        })
        .mount(&server)
        .await;

    let client = Arc::new(GatewayClient::new(
        credential(),
        api_v3_key(),
        transport(&server),
    ));
    client.refresh_certificates().await.unwrap();

    let mut tasks = JoinSet::new();
    for _ in 0..8 {
        let client = Arc::clone(&client);
        tasks.spawn(async move {
            client
                .execute(GatewayRequest::get("/v3/refund/domestic/refunds/R1"))
                .await
        });
    }

    let mut verified = 0;
    while let Some(result) = tasks.join_next().await {
        if result.unwrap().unwrap().verified {
            verified += 1;
        }
    }
    assert_eq!(verified, 8);
}
