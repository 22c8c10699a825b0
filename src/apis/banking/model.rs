use derive_builder::Builder;
use serde::{de::DeserializeOwned, Deserialize, Deserializer, Serialize};
use std::fmt;

/// Business operations exposed by [`BankingApi`](crate::apis::banking::BankingApi).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operation {
    Balance,
    InHouseInquiry,
    InterBankInquiry,
    InHousePayment,
    InterBankPayment,
    PaymentStatus,
}

impl Operation {
    /// Name used in log correlation events.
    pub fn name(self) -> &'static str {
        match self {
            Operation::Balance => "BALANCE",
            Operation::InHouseInquiry => "IN_HOUSE_INQUIRY",
            Operation::InterBankInquiry => "INTER_BANK_INQUIRY",
            Operation::InHousePayment => "IN_HOUSE_PAYMENT",
            Operation::InterBankPayment => "INTER_BANK_PAYMENT",
            Operation::PaymentStatus => "PAYMENT_STATUS",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A business payload that can be signed and dispatched.
pub(crate) trait SignablePayload: Serialize {
    type Response: DeserializeOwned;

    const OPERATION: Operation;

    /// Fields covered by the request signature, in wire order. The client id
    /// is prepended by the dispatcher; it is not part of this list.
    fn signature_fields(&self) -> Vec<String>;
}

// === Requests ===

/// Balance inquiry for an account held at the bank.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GetBalanceRequest {
    pub account_no: String,
}

impl SignablePayload for GetBalanceRequest {
    type Response = GetBalanceResponse;
    const OPERATION: Operation = Operation::Balance;

    fn signature_fields(&self) -> Vec<String> {
        vec![self.account_no.clone()]
    }
}

/// Account-detail inquiry for an account held at the bank.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InHouseInquiryRequest {
    pub account_no: String,
}

impl SignablePayload for InHouseInquiryRequest {
    type Response = InHouseInquiryResponse;
    const OPERATION: Operation = Operation::InHouseInquiry;

    fn signature_fields(&self) -> Vec<String> {
        vec![self.account_no.clone()]
    }
}

/// Beneficiary inquiry for an account held at another bank.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InterBankInquiryRequest {
    pub customer_reference_number: String,
    /// Debit account the eventual transfer would be drawn from.
    pub account_no: String,
    pub destination_bank_code: String,
    pub destination_account_no: String,
}

impl SignablePayload for InterBankInquiryRequest {
    type Response = InterBankInquiryResponse;
    const OPERATION: Operation = Operation::InterBankInquiry;

    fn signature_fields(&self) -> Vec<String> {
        vec![
            self.customer_reference_number.clone(),
            self.account_no.clone(),
            self.destination_bank_code.clone(),
            self.destination_account_no.clone(),
        ]
    }
}

/// Transfer between two accounts held at the bank.
#[derive(Clone, Debug, Serialize, Builder)]
#[builder(setter(into))]
#[serde(rename_all = "camelCase")]
pub struct InHousePaymentRequest {
    pub customer_reference_number: String,
    /// Clearing channel selector, as dictated by the bank ("0" for in-house).
    #[builder(default = "\"0\".to_string()")]
    pub payment_method: String,
    pub debit_account_no: String,
    pub credit_account_no: String,
    /// Settlement date in `YYYYMMDD` form.
    pub value_date: String,
    pub value_currency: String,
    pub value_amount: i64,
    #[builder(default)]
    pub remark: String,
}

impl SignablePayload for InHousePaymentRequest {
    type Response = InHousePaymentResponse;
    const OPERATION: Operation = Operation::InHousePayment;

    fn signature_fields(&self) -> Vec<String> {
        vec![
            self.customer_reference_number.clone(),
            self.payment_method.clone(),
            self.debit_account_no.clone(),
            self.credit_account_no.clone(),
            self.value_date.clone(),
            self.value_currency.clone(),
            self.value_amount.to_string(),
            self.remark.clone(),
        ]
    }
}

/// Transfer to an account held at another bank, quoting the retrieval
/// reference obtained from a prior [`InterBankInquiryRequest`].
#[derive(Clone, Debug, Serialize, Builder)]
#[builder(setter(into))]
#[serde(rename_all = "camelCase")]
pub struct InterBankPaymentRequest {
    pub customer_reference_number: String,
    pub amount: i64,
    pub destination_account_no: String,
    pub destination_account_name: String,
    pub destination_bank_code: String,
    pub destination_bank_name: String,
    /// Debit account the transfer is drawn from.
    pub account_no: String,
    pub retrieval_reff_no: String,
}

impl SignablePayload for InterBankPaymentRequest {
    type Response = InterBankPaymentResponse;
    const OPERATION: Operation = Operation::InterBankPayment;

    fn signature_fields(&self) -> Vec<String> {
        vec![
            self.customer_reference_number.clone(),
            self.amount.to_string(),
            self.destination_account_no.clone(),
            self.destination_account_name.clone(),
            self.destination_bank_code.clone(),
            self.destination_bank_name.clone(),
            self.account_no.clone(),
            self.retrieval_reff_no.clone(),
        ]
    }
}

/// Status lookup for a previously submitted payment.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentStatusRequest {
    pub customer_reference_number: String,
}

impl SignablePayload for PaymentStatusRequest {
    type Response = PaymentStatusResponse;
    const OPERATION: Operation = Operation::PaymentStatus;

    fn signature_fields(&self) -> Vec<String> {
        vec![self.customer_reference_number.clone()]
    }
}

// === Responses ===

/// Fields the gateway repeats at the top level of every response body.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
pub struct CommonResponse {
    #[serde(default, rename = "clientId")]
    pub client_id: String,
    #[serde(default, rename = "BankReference")]
    pub bank_reference: String,
    #[serde(default, rename = "CustomerReference")]
    pub customer_reference: String,
}

/// Status block present in every `parameters` object.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ResponseParameters {
    #[serde(default)]
    pub response_code: String,
    #[serde(default)]
    pub response_message: String,
    #[serde(default)]
    pub error_message: String,
    #[serde(default)]
    pub response_timestamp: String,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GetBalanceResponse {
    #[serde(flatten)]
    pub common: CommonResponse,
    #[serde(default)]
    pub parameters: BalanceParameters,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BalanceParameters {
    #[serde(flatten)]
    pub status: ResponseParameters,
    #[serde(default)]
    pub customer_name: String,
    #[serde(default)]
    pub account_currency: String,
    #[serde(default)]
    pub account_balance: i64,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InHouseInquiryResponse {
    #[serde(flatten)]
    pub common: CommonResponse,
    #[serde(default)]
    pub parameters: InHouseInquiryParameters,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InHouseInquiryParameters {
    #[serde(flatten)]
    pub status: ResponseParameters,
    #[serde(default)]
    pub customer_name: String,
    #[serde(default)]
    pub account_currency: String,
    #[serde(default)]
    pub account_number: String,
    #[serde(default)]
    pub account_status: String,
    #[serde(default)]
    pub account_type: String,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InterBankInquiryResponse {
    #[serde(flatten)]
    pub common: CommonResponse,
    #[serde(default)]
    pub parameters: InterBankInquiryParameters,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InterBankInquiryParameters {
    #[serde(flatten)]
    pub status: ResponseParameters,
    #[serde(default)]
    pub destination_account_no: String,
    #[serde(default)]
    pub destination_account_name: String,
    #[serde(default)]
    pub destination_bank_name: String,
    /// Must be quoted verbatim in the follow-up inter-bank payment.
    #[serde(default)]
    pub retrieval_reff_no: String,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InHousePaymentResponse {
    #[serde(flatten)]
    pub common: CommonResponse,
    #[serde(default)]
    pub parameters: InHousePaymentParameters,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InHousePaymentParameters {
    #[serde(flatten)]
    pub status: ResponseParameters,
    #[serde(default)]
    pub debit_account_no: String,
    #[serde(default)]
    pub credit_account_no: String,
    #[serde(default)]
    pub value_amount: i64,
    #[serde(default)]
    pub value_currency: String,
    #[serde(default)]
    pub value_date: String,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InterBankPaymentResponse {
    #[serde(flatten)]
    pub common: CommonResponse,
    #[serde(default)]
    pub parameters: InterBankPaymentParameters,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InterBankPaymentParameters {
    #[serde(flatten)]
    pub status: ResponseParameters,
    #[serde(default)]
    pub destination_account_no: String,
    #[serde(default)]
    pub destination_account_name: String,
    #[serde(default)]
    pub destination_bank_name: String,
    #[serde(default)]
    pub account_no: String,
    #[serde(default)]
    pub retrieval_reff_no: String,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PaymentStatusResponse {
    #[serde(flatten)]
    pub common: CommonResponse,
    #[serde(default)]
    pub parameters: PaymentStatusParameters,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PaymentStatusParameters {
    #[serde(flatten)]
    pub status: ResponseParameters,
    /// Echo of the payment this status refers to, when the gateway found one.
    #[serde(default)]
    pub previous_response: Option<PreviousPaymentDetail>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PreviousPaymentDetail {
    #[serde(default)]
    pub transaction_status: String,
    #[serde(default)]
    pub debit_account_no: String,
    #[serde(default)]
    pub credit_account_no: String,
    #[serde(default)]
    pub value_amount: i64,
    #[serde(default)]
    pub value_currency: String,
    #[serde(default)]
    pub value_date: String,
}

// === Envelope ===

/// Body of the `"Response"` and `"General Error Response"` envelope variants.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
pub struct ErrorResponse {
    #[serde(flatten)]
    pub common: CommonResponse,
    #[serde(default)]
    pub parameters: ResponseParameters,
}

/// Tagged envelope wrapping every business response.
///
/// A usable response populates exactly one variant. Servers have been seen
/// sending several keys at once; the first populated variant wins, in the
/// order success payload, `"Response"`, `"General Error Response"`. An
/// envelope with none of the known keys fails deserialization.
#[derive(Clone, Debug, PartialEq)]
pub enum ApiResponse<T> {
    Success(T),
    BadResponse(ErrorResponse),
    GeneralError(ErrorResponse),
}

#[derive(Deserialize)]
struct RawEnvelope<T> {
    #[serde(
        alias = "getBalanceResponse",
        alias = "getInHouseInquiryResponse",
        alias = "getInterBankInquiryResponse",
        alias = "doPaymentResponse",
        alias = "getInterBankPaymentResponse",
        alias = "getPaymentStatusResponse"
    )]
    success: Option<T>,
    #[serde(rename = "Response")]
    bad_response: Option<ErrorResponse>,
    #[serde(rename = "General Error Response")]
    general_error: Option<ErrorResponse>,
}

impl<'de, T> Deserialize<'de> for ApiResponse<T>
where
    T: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = RawEnvelope::<T>::deserialize(deserializer)?;

        if let Some(success) = raw.success {
            Ok(ApiResponse::Success(success))
        } else if let Some(bad_response) = raw.bad_response {
            Ok(ApiResponse::BadResponse(bad_response))
        } else if let Some(general_error) = raw.general_error {
            Ok(ApiResponse::GeneralError(general_error))
        } else {
            Err(serde::de::Error::custom(
                "envelope does not contain a recognized response variant",
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn balance_envelope() -> serde_json::Value {
        json!({
            "getBalanceResponse": {
                "clientId": "IDXXX",
                "parameters": {
                    "responseCode": "0001",
                    "responseMessage": "Request has been processed successfully",
                    "responseTimestamp": "2017-02-24T14:12:25.871Z",
                    "customerName": "Bpk HOSTLINK",
                    "accountCurrency": "IDR",
                    "accountBalance": 16732
                }
            }
        })
    }

    #[test]
    fn decodes_a_success_envelope() {
        let envelope: ApiResponse<GetBalanceResponse> =
            serde_json::from_value(balance_envelope()).unwrap();

        let response = match envelope {
            ApiResponse::Success(response) => response,
            other => panic!("unexpected variant: {:?}", other),
        };

        assert_eq!(response.common.client_id, "IDXXX");
        assert_eq!(response.parameters.status.response_code, "0001");
        assert_eq!(response.parameters.customer_name, "Bpk HOSTLINK");
        assert_eq!(response.parameters.account_currency, "IDR");
        assert_eq!(response.parameters.account_balance, 16732);
    }

    #[test]
    fn decodes_a_bad_response_envelope() {
        let envelope: ApiResponse<GetBalanceResponse> = serde_json::from_value(json!({
            "Response": {
                "clientId": "IDXXX",
                "parameters": {
                    "responseCode": "0051",
                    "errorMessage": "Unknown account number"
                }
            }
        }))
        .unwrap();

        let error = match envelope {
            ApiResponse::BadResponse(error) => error,
            other => panic!("unexpected variant: {:?}", other),
        };
        assert_eq!(error.parameters.response_code, "0051");
        assert_eq!(error.parameters.error_message, "Unknown account number");
    }

    #[test]
    fn decodes_a_general_error_envelope() {
        let envelope: ApiResponse<GetBalanceResponse> = serde_json::from_value(json!({
            "General Error Response": {
                "parameters": {
                    "responseMessage": "Internal error"
                }
            }
        }))
        .unwrap();

        assert!(matches!(envelope, ApiResponse::GeneralError(_)));
    }

    #[test]
    fn success_wins_over_error_variants() {
        let mut body = balance_envelope();
        body["Response"] = json!({
            "parameters": { "responseCode": "9999" }
        });

        let envelope: ApiResponse<GetBalanceResponse> = serde_json::from_value(body).unwrap();
        assert!(matches!(envelope, ApiResponse::Success(_)));
    }

    #[test]
    fn bad_response_wins_over_general_error() {
        let envelope: ApiResponse<GetBalanceResponse> = serde_json::from_value(json!({
            "Response": { "parameters": { "responseCode": "0051" } },
            "General Error Response": { "parameters": { "responseCode": "9999" } }
        }))
        .unwrap();

        assert!(matches!(envelope, ApiResponse::BadResponse(_)));
    }

    #[test]
    fn an_unrecognized_envelope_fails_to_decode() {
        let result: Result<ApiResponse<GetBalanceResponse>, _> =
            serde_json::from_value(json!({ "somethingElse": {} }));
        assert!(result.is_err());
    }

    #[test]
    fn requests_serialize_with_camel_case_wire_names() {
        let request = InterBankInquiryRequest {
            customer_reference_number: "20170227000000000201".to_string(),
            account_no: "0115476117".to_string(),
            destination_bank_code: "014".to_string(),
            destination_account_no: "01400000".to_string(),
        };

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            json!({
                "customerReferenceNumber": "20170227000000000201",
                "accountNo": "0115476117",
                "destinationBankCode": "014",
                "destinationAccountNo": "01400000"
            })
        );
    }

    #[test]
    fn payment_request_builder_fills_defaults() {
        let request = InHousePaymentRequestBuilder::default()
            .customer_reference_number("20170227000000000201")
            .debit_account_no("0115476117")
            .credit_account_no("0115471119")
            .value_date("20170227")
            .value_currency("IDR")
            .value_amount(100_500i64)
            .build()
            .unwrap();

        assert_eq!(request.payment_method, "0");
        assert_eq!(request.remark, "");
        assert_eq!(
            request.signature_fields(),
            vec![
                "20170227000000000201",
                "0",
                "0115476117",
                "0115471119",
                "20170227",
                "IDR",
                "100500",
                ""
            ]
        );
    }
}
