//! TLS configuration

use std::fs;
use std::path::Path;
use tracing::debug;

use crate::utils::{GlideConfigError, ValidationError};
use crate::wire::TlsMode;

/// TLS configuration
///
/// `root_certificates` distinguishes three cases:
/// - `None`: use the platform trust store
/// - `Some(empty)`: invalid, rejected at translation
/// - `Some(pem)`: trust exactly these roots
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TlsConfiguration {
    pub root_certificates: Option<Vec<u8>>,
    /// Skip certificate verification; only valid when TLS is enabled
    pub use_insecure_tls: bool,
}

impl TlsConfiguration {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_root_certificates(mut self, root_certs: Vec<u8>) -> Self {
        self.root_certificates = Some(root_certs);
        self
    }

    pub fn with_insecure_tls(mut self, insecure: bool) -> Self {
        self.use_insecure_tls = insecure;
        self
    }

    /// Final TLS mode given the base `use_tls` switch
    pub fn resolve_mode(&self, use_tls: bool) -> Result<TlsMode, ValidationError> {
        match (use_tls, self.use_insecure_tls) {
            (false, true) => Err(ValidationError::InsecureTlsWithoutTls),
            (false, false) => Ok(TlsMode::NoTls),
            (true, true) => Ok(TlsMode::InsecureTls),
            (true, false) => Ok(TlsMode::SecureTls),
        }
    }

    /// Root certificates as wire entries; empty when the platform store is used
    pub fn root_certs(&self) -> Result<Vec<Vec<u8>>, ValidationError> {
        match self.root_certificates {
            None => Ok(Vec::new()),
            Some(ref certs) if certs.is_empty() => Err(ValidationError::EmptyRootCertificates),
            Some(ref certs) => Ok(vec![certs.clone()]),
        }
    }
}

/// Read a PEM encoded certificate bundle from disk
pub fn load_root_certificates_from_file(path: &Path) -> Result<Vec<u8>, GlideConfigError> {
    let data = fs::read(path)?;
    if data.is_empty() {
        return Err(ValidationError::EmptyCertificateFile(path.to_path_buf()).into());
    }
    debug!("Loaded {} bytes of root certificates from {:?}", data.len(), path);
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_CERT: &[u8] = b"-----BEGIN CERTIFICATE-----\nMIIC...\n-----END CERTIFICATE-----";

    #[test]
    fn test_default_uses_platform_store() {
        let tls = TlsConfiguration::new();
        assert!(tls.root_certificates.is_none());
        assert!(!tls.use_insecure_tls);
        assert!(tls.root_certs().unwrap().is_empty());
    }

    #[test]
    fn test_root_certificates() {
        let tls = TlsConfiguration::new().with_root_certificates(TEST_CERT.to_vec());
        assert_eq!(tls.root_certs().unwrap(), vec![TEST_CERT.to_vec()]);
    }

    #[test]
    fn test_empty_root_certificates_rejected() {
        let tls = TlsConfiguration::new().with_root_certificates(Vec::new());
        assert_eq!(tls.root_certs(), Err(ValidationError::EmptyRootCertificates));
    }

    #[test]
    fn test_resolve_mode() {
        let secure = TlsConfiguration::new();
        assert_eq!(secure.resolve_mode(true), Ok(TlsMode::SecureTls));
        assert_eq!(secure.resolve_mode(false), Ok(TlsMode::NoTls));

        let insecure = TlsConfiguration::new().with_insecure_tls(true);
        assert_eq!(insecure.resolve_mode(true), Ok(TlsMode::InsecureTls));
        assert_eq!(
            insecure.resolve_mode(false),
            Err(ValidationError::InsecureTlsWithoutTls)
        );
    }

    #[test]
    fn test_load_certificates_from_file() {
        let dir = std::env::temp_dir().join(format!("glide-config-tls-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();

        let good = dir.join("ca.pem");
        fs::write(&good, TEST_CERT).unwrap();
        assert_eq!(load_root_certificates_from_file(&good).unwrap(), TEST_CERT);

        let empty = dir.join("empty.pem");
        fs::write(&empty, b"").unwrap();
        assert!(matches!(
            load_root_certificates_from_file(&empty),
            Err(GlideConfigError::Validation(ValidationError::EmptyCertificateFile(_)))
        ));

        assert!(matches!(
            load_root_certificates_from_file(&dir.join("missing.pem")),
            Err(GlideConfigError::Io(_))
        ));

        fs::remove_dir_all(&dir).ok();
    }
}
