//! Line-framed command parsing, response framing, and sized file transfer.
//!
//! Requests and responses are newline-terminated UTF-8 lines of the form
//! `VERB [ARGS...]`. A request with a file payload is a single request
//! line ending with the byte count, followed by exactly that many raw
//! bytes. A response is a status token followed by a free-form message,
//! terminated by newline. File downloads begin with a `SIZE <n>` line
//! followed by exactly `n` bytes. See §4.2.

mod admin;
mod client;
mod error;
mod framing;
mod parse;
mod status;

pub use admin::AdminCommand;
pub use client::ClientCommand;
pub use error::{ProtocolError, WireError, WireResult};
pub use framing::{read_line, recv_exact, recv_exact_file, respond, send_sized_file};
pub use status::Status;
