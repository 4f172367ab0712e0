//! Test certificate authority.
//!
//! Issues the two-level certificate chain that real deployments get from
//! their servers: a trust root signs server certificates, a server signs
//! sender certificates.

use ed25519_dalek::{Signer, SigningKey};
use veil_core::{
    CertificateValidator, SealedSenderError, SenderCertificate, ServerCertificate, TrustConfig,
};
use veil_crypto::PublicKey;
use veil_proto::{SenderCertificateBody, ServerCertificateBody, SignedCertificate};

/// Account and device a sender certificate is issued for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SenderDetails {
    /// Phone number
    pub e164: Option<String>,
    /// Account uuid
    pub uuid: Option<String>,
    /// Device id
    pub device_id: u32,
}

impl SenderDetails {
    /// Sender with both a phone number and a uuid.
    pub fn new(e164: &str, uuid: &str, device_id: u32) -> Self {
        Self { e164: Some(e164.to_string()), uuid: Some(uuid.to_string()), device_id }
    }

    /// Sender known only by phone number.
    pub fn e164_only(e164: &str, device_id: u32) -> Self {
        Self { e164: Some(e164.to_string()), uuid: None, device_id }
    }

    /// Sender known only by uuid.
    pub fn uuid_only(uuid: &str, device_id: u32) -> Self {
        Self { e164: None, uuid: Some(uuid.to_string()), device_id }
    }

    /// Name sessions with this sender are stored under.
    pub fn session_name(&self) -> &str {
        self.uuid.as_deref().or(self.e164.as_deref()).unwrap_or_default()
    }
}

/// Trust root of a test deployment.
pub struct CertificateAuthority {
    root: SigningKey,
}

impl CertificateAuthority {
    /// Create an authority with a root key derived from `seed`.
    pub fn from_seed(seed: [u8; 32]) -> Self {
        Self { root: SigningKey::from_bytes(&seed) }
    }

    /// Trust configuration recipients should use.
    pub fn trust_config(&self) -> TrustConfig {
        TrustConfig::new(self.root.verifying_key())
    }

    /// Validator trusting this authority with nothing revoked.
    pub fn validator(&self) -> CertificateValidator {
        CertificateValidator::new(self.trust_config())
    }

    /// Issue a server certificate with id `id` and a key derived from `seed`.
    ///
    /// # Errors
    ///
    /// - `Malformed` if encoding fails
    pub fn issue_server(&self, id: u32, seed: [u8; 32]) -> Result<ServerIssuer, SealedSenderError> {
        let key = SigningKey::from_bytes(&seed);
        let body = ServerCertificateBody { id, key: key.verifying_key().to_bytes().to_vec() };
        let certificate = sign_certificate(&self.root, body.encode()?)?;

        Ok(ServerIssuer { id, key, certificate })
    }
}

/// A server able to issue sender certificates.
pub struct ServerIssuer {
    id: u32,
    key: SigningKey,
    certificate: Vec<u8>,
}

impl ServerIssuer {
    /// Server certificate id.
    pub fn id(&self) -> u32 {
        self.id
    }

    /// Serialized server certificate.
    pub fn certificate_bytes(&self) -> &[u8] {
        &self.certificate
    }

    /// Parsed server certificate.
    ///
    /// # Errors
    ///
    /// - `Malformed` or `InvalidKey` if the certificate does not parse
    pub fn certificate(&self) -> Result<ServerCertificate, SealedSenderError> {
        ServerCertificate::deserialize(&self.certificate)
    }

    /// Issue a certificate binding `sender` to `identity_key` until `expires`.
    ///
    /// # Errors
    ///
    /// - `Malformed` if the sender names no account or encoding fails
    pub fn issue(
        &self,
        sender: &SenderDetails,
        identity_key: &PublicKey,
        expires: u64,
    ) -> Result<SenderCertificate, SealedSenderError> {
        let body = SenderCertificateBody {
            sender_e164: sender.e164.clone(),
            sender_uuid: sender.uuid.clone(),
            sender_device: sender.device_id,
            expires,
            identity_key: identity_key.serialize().to_vec(),
            signer: self.certificate.clone(),
        };

        SenderCertificate::deserialize(&self.sign_body(&body)?)
    }

    /// Sign an arbitrary sender certificate body.
    ///
    /// Lets tests build certificates the regular path refuses to.
    ///
    /// # Errors
    ///
    /// - `Malformed` if encoding fails
    pub fn sign_body(&self, body: &SenderCertificateBody) -> Result<Vec<u8>, SealedSenderError> {
        sign_certificate(&self.key, body.encode()?)
    }
}

fn sign_certificate(key: &SigningKey, certificate: Vec<u8>) -> Result<Vec<u8>, SealedSenderError> {
    let signature = key.sign(&certificate).to_bytes().to_vec();
    Ok(SignedCertificate { certificate, signature }.encode()?)
}
