//! Wire-level helpers for certificate probing: the TLS client configuration and
//! the X.509 subject parsing applied to whatever the peer presents.

pub mod tls;
pub mod x509;
