//! Backend access seam for the workflow.

use async_trait::async_trait;
use podcore_client::{
    CreatePayment, PaymentRecord, PodcoreClient, PodcoreError, UserAccount,
};

/// The subset of the podcore API the reconciliation workflow needs.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PodBackend: Send + Sync {
    async fn get_user(&self, user_id: i64) -> Result<UserAccount, PodcoreError>;

    async fn list_payments(&self, user_id: i64) -> Result<Vec<PaymentRecord>, PodcoreError>;

    async fn get_payment(&self, payment_id: i64) -> Result<PaymentRecord, PodcoreError>;

    async fn create_payment(&self, params: &CreatePayment)
        -> Result<PaymentRecord, PodcoreError>;
}

#[async_trait]
impl PodBackend for PodcoreClient {
    async fn get_user(&self, user_id: i64) -> Result<UserAccount, PodcoreError> {
        PodcoreClient::get_user(self, user_id).await
    }

    async fn list_payments(&self, user_id: i64) -> Result<Vec<PaymentRecord>, PodcoreError> {
        PodcoreClient::list_payments(self, user_id).await
    }

    async fn get_payment(&self, payment_id: i64) -> Result<PaymentRecord, PodcoreError> {
        PodcoreClient::get_payment(self, payment_id).await
    }

    async fn create_payment(
        &self,
        params: &CreatePayment,
    ) -> Result<PaymentRecord, PodcoreError> {
        PodcoreClient::create_payment(self, params).await
    }
}
