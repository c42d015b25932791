//! Adapters implementing the `CheckoutChannel` port.

pub mod host_process;
pub mod in_memory;
pub mod json_lines;
