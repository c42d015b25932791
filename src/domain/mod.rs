//! Domain types shared by the facade and the channel adapters: the method
//! names understood by the host, checkout options, response envelopes and the
//! `CheckoutChannel` port.

pub mod envelope;
pub mod method;
pub mod options;
pub mod ports;
