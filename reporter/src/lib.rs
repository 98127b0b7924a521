//! Delivery side of game reporting: session setup, transport, and the
//! offline buffer that catches whatever could not be sent.

pub use buffer::*;
pub use error::*;
pub use reporter::*;
pub use session::*;
pub use transport::*;

mod buffer;
mod error;
mod reporter;
mod session;
mod transport;
