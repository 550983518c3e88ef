pub mod gateway;
pub mod payment_status;
pub mod pricing;
pub mod roster;
pub mod validation;
