//! Wire descriptor schema handed to the transport and execution layer

pub mod connection_request;

pub use connection_request::{
    AuthenticationInfo, ConnectionRequest, ConnectionRetryStrategy, IamCredentials, TlsMode,
    WireCompressionConfig, WireNodeAddress,
};
