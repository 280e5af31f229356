mod common;

use common::*;
use crossborder::application::{QuotesApi, RemittanceApi};
use crossborder::domain::money::MoneyAmount;
use crossborder::domain::ports::{Headers, RequestParams, WireResponse};
use crossborder::error::{ApiError, ConfigurationError, ValidationError};
use rust_decimal_macros::dec;
use std::sync::Arc;

fn counting() -> Arc<CountingTransport> {
    Arc::new(CountingTransport::new(WireResponse::new(500, "unreachable")))
}

#[tokio::test]
async fn test_proposal_with_amount_never_reaches_transport() {
    let transport = counting();
    let api = RemittanceApi::new(transport.clone());
    let request = payment_with_quote("val-ref-1", "pen_1")
        .forward(MoneyAmount::new(dec!(10.00), "USD"), "KES");

    let result = api.make_payment(&Headers::xml(), &params(), &request).await;

    assert!(matches!(
        result,
        Err(ApiError::Validation(ValidationError::ProposalWithAmount(_)))
    ));
    assert_eq!(transport.calls(), 0);
}

#[tokio::test]
async fn test_no_proposal_and_no_amount_never_reaches_transport() {
    let transport = counting();
    let api = RemittanceApi::new(transport.clone());
    let mut request = one_shot_forward("val-ref-2");
    request.payment_amount = None;
    request.receiver_currency = None;

    let result = api.make_payment(&Headers::xml(), &params(), &request).await;

    assert!(matches!(
        result,
        Err(ApiError::Validation(ValidationError::MissingAmount))
    ));
    assert_eq!(transport.calls(), 0);
}

#[tokio::test]
async fn test_encrypted_path_validates_before_encrypting() {
    let transport = counting();
    let api = RemittanceApi::new(transport.clone()).with_cipher(cipher());
    let request = one_shot_forward("val-ref-3").reverse(MoneyAmount::new(dec!(10.00), "KES"), "USD");

    let result = api
        .make_payment_with_encryption(&Headers::xml(), &params(), &request)
        .await;

    assert!(matches!(
        result,
        Err(ApiError::Validation(ValidationError::AmbiguousDirection))
    ));
    assert_eq!(transport.calls(), 0);
}

#[tokio::test]
async fn test_missing_partner_id_is_a_configuration_error() {
    let transport = counting();
    let quotes = QuotesApi::new(transport.clone());
    let payments = RemittanceApi::new(transport.clone());

    let quote = quotes
        .get_quote(&Headers::xml(), &RequestParams::new(), &forward_quote("val-ref-4"))
        .await;
    let payment = payments
        .make_payment(&Headers::xml(), &RequestParams::new(), &one_shot_forward("val-ref-5"))
        .await;

    assert!(matches!(
        quote,
        Err(ApiError::Configuration(ConfigurationError::MissingPartnerId))
    ));
    assert!(matches!(
        payment,
        Err(ApiError::Configuration(ConfigurationError::MissingPartnerId))
    ));
    assert_eq!(transport.calls(), 0);
}

#[tokio::test]
async fn test_encryption_without_a_key_is_a_configuration_error() {
    let transport = counting();
    let api = RemittanceApi::new(transport.clone());

    let result = api
        .make_payment_with_encryption(&Headers::xml(), &params(), &one_shot_forward("val-ref-6"))
        .await;

    assert!(matches!(
        result,
        Err(ApiError::Configuration(ConfigurationError::EncryptionNotConfigured))
    ));
    assert_eq!(transport.calls(), 0);
}
