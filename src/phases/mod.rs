//! Implementation of the phases of the checkout operation.
//!
//! ## Overview
//!
//! 1. Discovery - Walk the remote tree and collect every `svn:externals` entry
//! 2. Checkout - Check out each distinct source once and link the other targets
//! 3. Cleanup - Remove what was created when a checkout step fails, or
//!    everything registered when the user asks for `clean`
//!
//! The orchestrator runs the phases in order and produces the final outcome.

pub mod checkout;
pub mod cleanup;
pub mod discovery;
pub mod orchestrator;

pub use checkout::{checkout_externals, CheckedOut, CheckoutOperationError, OneCheckoutError};
pub use cleanup::clean_up_externals;
pub use discovery::find_externals;
pub use orchestrator::{run_checkout, run_clean, Outcome};
