//! Application layer: the checkout facade and its listener registry.
//!
//! `Razorpay` forwards calls to the native handler through a `CheckoutChannel`
//! and turns every checkout result into exactly one `CheckoutEvent`, fanned out
//! to the listeners held in a `ListenerRegistry`.

pub mod checkout;
pub mod registry;
