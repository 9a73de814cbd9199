use thiserror::Error;
use tracing::trace;
use x509_parser::parse_x509_certificate;

#[derive(Debug, Error)]
pub enum CertificateError {
    #[error("certificate could not be decoded: {0}")]
    Decode(String),
    #[error("subject common name is not a printable string")]
    CommonNameEncoding,
}

/// Extracts the first subject Common Name of a DER encoded certificate.
///
/// Returns `Ok(None)` when the subject carries no (or an empty) CN.
pub fn common_name(der: &[u8]) -> Result<Option<String>, CertificateError> {
    let (_rest, cert) =
        parse_x509_certificate(der).map_err(|e| CertificateError::Decode(e.to_string()))?;

    let Some(attr) = cert.subject().iter_common_name().next() else {
        trace!("certificate subject '{}' has no CN", cert.subject());
        return Ok(None);
    };

    let name: &str = attr
        .as_str()
        .map_err(|_| CertificateError::CommonNameEncoding)?
        .trim();

    if name.is_empty() {
        return Ok(None);
    }
    Ok(Some(name.to_string()))
}
