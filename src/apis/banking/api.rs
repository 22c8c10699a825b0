use crate::{
    apis::{
        banking::{
            ApiResponse, GetBalanceRequest, GetBalanceResponse, InHouseInquiryRequest,
            InHouseInquiryResponse, InHousePaymentRequest, InHousePaymentResponse,
            InterBankInquiryRequest, InterBankInquiryResponse, InterBankPaymentRequest,
            InterBankPaymentResponse, PaymentStatusRequest, PaymentStatusResponse,
            SignablePayload,
        },
        HostlinkClientInner,
    },
    common::JSON_CONTENT_TYPE,
    Error,
};
use reqwest::header::CONTENT_TYPE;
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

/// Banking operations facade. One method per H2H operation.
///
/// Each method injects the configured client id, signs the canonical request
/// fields, dispatches through the re-authenticating client, and unwraps the
/// operation's payload from the response envelope.
#[derive(Clone, Debug)]
pub struct BankingApi {
    inner: Arc<HostlinkClientInner>,
}

impl BankingApi {
    pub(crate) fn new(inner: Arc<HostlinkClientInner>) -> Self {
        Self { inner }
    }

    /// Inquires the balance of an account held at the bank.
    #[tracing::instrument(name = "Get Balance", skip(self, request), fields(account_no = %request.account_no))]
    pub async fn get_balance(
        &self,
        request: &GetBalanceRequest,
    ) -> Result<GetBalanceResponse, Error> {
        self.call(request).await
    }

    /// Inquires the details of an account held at the bank.
    #[tracing::instrument(name = "In-House Inquiry", skip(self, request), fields(account_no = %request.account_no))]
    pub async fn in_house_inquiry(
        &self,
        request: &InHouseInquiryRequest,
    ) -> Result<InHouseInquiryResponse, Error> {
        self.call(request).await
    }

    /// Inquires a beneficiary account held at another bank. The returned
    /// retrieval reference is required for the follow-up payment.
    #[tracing::instrument(
        name = "Inter-Bank Inquiry",
        skip(self, request),
        fields(destination_bank_code = %request.destination_bank_code)
    )]
    pub async fn inter_bank_inquiry(
        &self,
        request: &InterBankInquiryRequest,
    ) -> Result<InterBankInquiryResponse, Error> {
        self.call(request).await
    }

    /// Submits a transfer between two accounts held at the bank.
    #[tracing::instrument(
        name = "In-House Payment",
        skip(self, request),
        fields(
            customer_reference_number = %request.customer_reference_number,
            value_amount = request.value_amount,
        )
    )]
    pub async fn in_house_payment(
        &self,
        request: &InHousePaymentRequest,
    ) -> Result<InHousePaymentResponse, Error> {
        self.call(request).await
    }

    /// Submits a transfer to an account held at another bank.
    #[tracing::instrument(
        name = "Inter-Bank Payment",
        skip(self, request),
        fields(
            customer_reference_number = %request.customer_reference_number,
            amount = request.amount,
        )
    )]
    pub async fn inter_bank_payment(
        &self,
        request: &InterBankPaymentRequest,
    ) -> Result<InterBankPaymentResponse, Error> {
        self.call(request).await
    }

    /// Looks up the status of a previously submitted payment.
    #[tracing::instrument(
        name = "Payment Status",
        skip(self, request),
        fields(customer_reference_number = %request.customer_reference_number)
    )]
    pub async fn payment_status(
        &self,
        request: &PaymentStatusRequest,
    ) -> Result<PaymentStatusResponse, Error> {
        self.call(request).await
    }

    async fn call<P: SignablePayload>(&self, payload: &P) -> Result<P::Response, Error> {
        let operation = P::OPERATION;
        let request_id = Uuid::new_v4();
        let session_id = self
            .inner
            .authenticator
            .session()
            .map(|session| session.session_id());

        let client_id = self.inner.authenticator.client_id().to_string();
        let mut fields = vec![client_id.clone()];
        fields.extend(payload.signature_fields());
        let signature = self.inner.signer.sign(&fields)?;

        let envelope = SignedRequest {
            client_id: &client_id,
            signature: &signature,
            payload,
        };
        let body = serde_json::to_string(&envelope).map_err(|e| Error::Other(e.into()))?;

        let url = self
            .inner
            .server
            .join(self.inner.config.operation_path(operation))
            .map_err(|e| Error::Other(e.into()))?;

        tracing::info!(
            operation = %operation,
            %request_id,
            session_id = ?session_id,
            request = %body,
            "operation start"
        );

        let response = self
            .inner
            .client
            .post(url)
            .header(CONTENT_TYPE, JSON_CONTENT_TYPE)
            .body(body)
            .send()
            .await
            .map_err(Error::from)?;

        let status = response.status();
        let raw = response.text().await.map_err(Error::Transport)?;

        tracing::info!(
            operation = %operation,
            %request_id,
            session_id = ?session_id,
            status = status.as_u16(),
            response = %raw,
            "operation end"
        );

        let decoded: ApiResponse<P::Response> = match serde_json::from_str(&raw) {
            Ok(decoded) => decoded,
            Err(source) if status.is_success() => {
                return Err(Error::Decode {
                    operation: operation.name(),
                    status: status.as_u16(),
                    source,
                    body: raw,
                })
            }
            Err(_) => {
                return Err(Error::BadResponse {
                    operation: operation.name(),
                    status: status.as_u16(),
                    parameters: None,
                    body: raw,
                })
            }
        };

        match decoded {
            ApiResponse::Success(response) => Ok(response),
            ApiResponse::BadResponse(error) | ApiResponse::GeneralError(error) => {
                Err(Error::BadResponse {
                    operation: operation.name(),
                    status: status.as_u16(),
                    parameters: Some(error.parameters),
                    body: raw,
                })
            }
        }
    }
}

/// Outgoing request envelope: the business payload plus the `clientId` and
/// `signature` fields every operation carries.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SignedRequest<'a, P: Serialize> {
    client_id: &'a str,
    signature: &'a str,
    #[serde(flatten)]
    payload: &'a P,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        apis::auth::Credentials, authenticator::Authenticator, config::Config, signer::Signer,
    };
    use openssl::rsa::Rsa;
    use reqwest::Url;
    use serde_json::json;
    use std::{io::Write, path::PathBuf};
    use wiremock::{
        matchers::{body_partial_json, method, path},
        Mock, MockServer, ResponseTemplate,
    };

    fn write_temp_key() -> PathBuf {
        let rsa = Rsa::generate(2048).unwrap();
        let path = std::env::temp_dir().join(format!("hostlink-api-{}.pem", Uuid::new_v4()));
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(&rsa.private_key_to_pem().unwrap()).unwrap();
        path
    }

    fn mock_config(server: &str, key_path: &std::path::Path) -> Config {
        serde_json::from_value(json!({
            "username": "dummyusername",
            "password": "dummypassword",
            "client_id": "mock-client-id",
            "server": server,
            "auth_path": "/oauth",
            "balance_path": "/api/balance",
            "in_house_inquiry_path": "/api/inquiry/in-house",
            "inter_bank_inquiry_path": "/api/inquiry/inter-bank",
            "in_house_payment_path": "/api/payment/in-house",
            "inter_bank_payment_path": "/api/payment/inter-bank",
            "payment_status_path": "/api/payment/status",
            "private_key_path": key_path,
        }))
        .unwrap()
    }

    async fn mock_api(mock_server: &MockServer) -> BankingApi {
        let key_path = write_temp_key();
        let config = mock_config(&mock_server.uri(), &key_path);

        let server = Url::parse(&config.server).unwrap();
        let authenticator = Authenticator::new(
            reqwest::Client::new().into(),
            server.join(&config.auth_path).unwrap(),
            Credentials {
                username: config.username.clone(),
                password: config.password.clone(),
                client_id: config.client_id.clone(),
            },
        );

        let inner = HostlinkClientInner {
            client: reqwest::Client::new().into(),
            authenticator,
            signer: Signer::new(&config.private_key_path),
            server,
            config,
        };

        BankingApi::new(Arc::new(inner))
    }

    #[tokio::test]
    async fn injects_client_id_and_signature_and_unwraps_the_payload() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/balance"))
            .and(body_partial_json(json!({
                "clientId": "mock-client-id",
                "accountNo": "0115476117"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "getBalanceResponse": {
                    "clientId": "mock-client-id",
                    "parameters": {
                        "responseCode": "0001",
                        "responseMessage": "Request has been processed successfully",
                        "customerName": "Bpk HOSTLINK",
                        "accountCurrency": "IDR",
                        "accountBalance": 16732
                    }
                }
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let api = mock_api(&mock_server).await;
        let response = api
            .get_balance(&GetBalanceRequest {
                account_no: "0115476117".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(response.parameters.account_balance, 16732);
        assert_eq!(response.parameters.account_currency, "IDR");

        // The signature field must be present and non-empty
        let requests = mock_server.received_requests().await.unwrap();
        let sent: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
        assert!(!sent["signature"].as_str().unwrap().is_empty());
    }

    #[tokio::test]
    async fn a_bad_response_envelope_is_surfaced_with_its_parameters() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/balance"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "Response": {
                    "clientId": "mock-client-id",
                    "parameters": {
                        "responseCode": "0051",
                        "errorMessage": "Unknown account number"
                    }
                }
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let api = mock_api(&mock_server).await;
        let err = api
            .get_balance(&GetBalanceRequest {
                account_no: "0000000000".to_string(),
            })
            .await
            .unwrap_err();

        match err {
            Error::BadResponse {
                operation,
                status,
                parameters: Some(parameters),
                ..
            } => {
                assert_eq!(operation, "BALANCE");
                assert_eq!(status, 200);
                assert_eq!(parameters.response_code, "0051");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn a_general_error_envelope_is_surfaced_as_bad_response() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/payment/status"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "General Error Response": {
                    "parameters": { "responseMessage": "Internal error" }
                }
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let api = mock_api(&mock_server).await;
        let err = api
            .payment_status(&PaymentStatusRequest {
                customer_reference_number: "20170227000000000201".to_string(),
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            Error::BadResponse {
                operation: "PAYMENT_STATUS",
                ..
            }
        ));
    }

    #[tokio::test]
    async fn a_non_json_success_body_is_a_decode_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/balance"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
            .expect(1)
            .mount(&mock_server)
            .await;

        let api = mock_api(&mock_server).await;
        let err = api
            .get_balance(&GetBalanceRequest {
                account_no: "0115476117".to_string(),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Decode { status: 200, .. }));
    }

    #[tokio::test]
    async fn a_non_success_status_with_unusable_body_keeps_the_raw_body() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/payment/in-house"))
            .respond_with(ResponseTemplate::new(500).set_body_string("gateway exploded"))
            .expect(1)
            .mount(&mock_server)
            .await;

        let api = mock_api(&mock_server).await;
        let request = crate::apis::banking::InHousePaymentRequestBuilder::default()
            .customer_reference_number("20170227000000000201")
            .debit_account_no("0115476117")
            .credit_account_no("0115471119")
            .value_date("20170227")
            .value_currency("IDR")
            .value_amount(100_500i64)
            .build()
            .unwrap();
        let err = api.in_house_payment(&request).await.unwrap_err();

        match err {
            Error::BadResponse {
                status,
                parameters: None,
                body,
                ..
            } => {
                assert_eq!(status, 500);
                assert_eq!(body, "gateway exploded");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn an_unreadable_key_fails_before_any_request_is_sent() {
        let mock_server = MockServer::start().await;

        let config = mock_config(&mock_server.uri(), std::path::Path::new("/nonexistent.pem"));
        let server = Url::parse(&config.server).unwrap();
        let authenticator = Authenticator::new(
            reqwest::Client::new().into(),
            server.join(&config.auth_path).unwrap(),
            Credentials {
                username: config.username.clone(),
                password: config.password.clone(),
                client_id: config.client_id.clone(),
            },
        );
        let api = BankingApi::new(Arc::new(HostlinkClientInner {
            client: reqwest::Client::new().into(),
            authenticator,
            signer: Signer::new(&config.private_key_path),
            server,
            config,
        }));

        let err = api
            .get_balance(&GetBalanceRequest {
                account_no: "0115476117".to_string(),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Signing(_)));
        assert!(mock_server.received_requests().await.unwrap().is_empty());
    }
}
