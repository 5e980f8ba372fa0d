use std::sync::Arc;

use crate::auth::TokenVerifier;
use crate::payment::PaymentGateway;
use crate::store::DataContext;

/// Process-wide application state: collection handles plus the external
/// collaborators (token verifier, payment gateway). Built once at startup
/// and passed into every handler and middleware through axum state.
#[derive(Clone)]
pub struct AppContext {
    pub data: DataContext,
    pub verifier: Arc<dyn TokenVerifier>,
    pub payments: Arc<dyn PaymentGateway>,
}
