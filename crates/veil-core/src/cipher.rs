//! Sealed-sender cipher
//!
//! Wraps session-cipher output so the relaying server never sees who sent it.
//! The recipient recovers the sender's identity key and certificate, checks
//! the chain, and only then hands the inner ciphertext to the session cipher.
//!
//! # Encryption
//!
//! ```text
//! session.encrypt(destination, plaintext) ──► {type, body}
//! ephemeral keys  = HKDF(ECDH(ephemeral, their identity))
//! encrypted_static  = seal(ephemeral keys, our identity public key)
//! static keys     = HKDF(ECDH(our identity, their identity), chain ‖ encrypted_static)
//! encrypted_message = seal(static keys, {type, certificate, body})
//! ```
//!
//! # Decryption
//!
//! Reverses the above, then validates the sender certificate and checks that
//! the certified identity key is the key that encrypted the message. Nothing
//! reaches the session cipher before those checks pass.

use subtle::ConstantTimeEq;
use tracing::{debug, warn};
use veil_crypto::{
    KeyPair, PublicKey, calculate_ephemeral_keys, calculate_static_keys, ephemeral_salt,
    seal_decrypt, seal_encrypt, static_salt,
};
use veil_proto::{SealedSenderMessage, UnidentifiedSenderMessageContent};
use zeroize::Zeroizing;

use crate::{
    address::{LocalIdentity, ProtocolAddress, SenderIdentity},
    certificate::SenderCertificate,
    env::Environment,
    error::SealedSenderError,
    session::{CiphertextMessageType, IdentityKeyStore, SessionCipher},
    validator::CertificateValidator,
};

/// Name reported in [`SealedSenderError::NoIdentity`] when the local key pair
/// is missing.
const LOCAL_IDENTITY: &str = "local identity";

/// Successful result of [`SecretSessionCipher::decrypt`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecryptionOutcome {
    /// Message was sent by this device. The session cipher was not invoked.
    SelfSent,
    /// Message from another device.
    Message(DecryptedMessage),
}

/// Plaintext together with its authenticated sender.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecryptedMessage {
    /// Sender as named by the validated certificate
    pub sender: SenderIdentity,
    /// Session-cipher plaintext
    pub plaintext: Vec<u8>,
}

/// Inner content recovered from an outer message, with the sender key that
/// encrypted it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenedMessage {
    /// Serialized sender identity key exactly as decrypted
    pub sender_identity_key: Vec<u8>,
    /// Decoded inner content
    pub content: UnidentifiedSenderMessageContent,
}

/// Sealed-sender encryption over a session cipher.
///
/// Holds its collaborators and no other state. All methods take `&self`, so
/// one instance can serve concurrent calls as far as the collaborators allow.
pub struct SecretSessionCipher<S, K, E> {
    sessions: S,
    identities: K,
    env: E,
}

impl<S, K, E> SecretSessionCipher<S, K, E>
where
    S: SessionCipher,
    K: IdentityKeyStore,
    E: Environment,
{
    /// Create a cipher over the given collaborators.
    pub fn new(sessions: S, identities: K, env: E) -> Self {
        Self { sessions, identities, env }
    }

    /// Session cipher in use.
    pub fn sessions(&self) -> &S {
        &self.sessions
    }

    /// Identity store in use.
    pub fn identities(&self) -> &K {
        &self.identities
    }

    /// Seal `padded_plaintext` for `destination`.
    ///
    /// The plaintext is first encrypted by the session cipher.
    ///
    /// # Errors
    ///
    /// - `Session` if the session cipher or identity store fails
    /// - `NoIdentity` if the local key pair or the destination's identity key
    ///   is unknown
    /// - `InvalidKey` if the destination's identity key is unusable
    pub async fn encrypt(
        &self,
        destination: &ProtocolAddress,
        sender_certificate: &SenderCertificate,
        padded_plaintext: &[u8],
    ) -> Result<Vec<u8>, SealedSenderError> {
        let message = self.sessions.encrypt(destination, padded_plaintext).await?;

        let our_identity = self.local_identity().await?;
        let their_identity = self
            .identities
            .identity(destination.name())
            .await?
            .ok_or_else(|| SealedSenderError::NoIdentity { name: destination.name().to_string() })?;

        let seed = Zeroizing::new(self.env.random_seed());
        let ephemeral = KeyPair::from_random(*seed);

        let content = UnidentifiedSenderMessageContent::new(
            message.message_type.into(),
            sender_certificate.serialized().to_vec(),
            message.body,
        );

        let sealed = seal_message(&our_identity, &their_identity, &ephemeral, &content)?;

        debug!(
            %destination,
            message_type = ?message.message_type,
            size = sealed.len(),
            "sealed message"
        );

        Ok(sealed)
    }

    /// Open and authenticate `ciphertext`, then decrypt it on the sender's
    /// session.
    ///
    /// `validation_time` (ms since epoch) is the time the sender certificate
    /// is checked against. If `local` names this device and the message is
    /// from it, [`DecryptionOutcome::SelfSent`] is returned without touching
    /// the session cipher.
    ///
    /// # Errors
    ///
    /// - `Malformed`, `UnsupportedVersion`, `MacMismatch`, `InvalidKey` or
    ///   `UnknownMessageType` if the message cannot be opened
    /// - `Certificate` if the sender certificate does not validate
    /// - `IdentityKeyMismatch` if the certified key did not encrypt the message
    /// - `SessionDecrypt` if the session cipher fails, with the sender attached
    pub async fn decrypt(
        &self,
        validator: &CertificateValidator,
        ciphertext: &[u8],
        validation_time: u64,
        local: Option<&LocalIdentity>,
    ) -> Result<DecryptionOutcome, SealedSenderError> {
        let our_identity = self.local_identity().await?;
        let opened = open_message(&our_identity, ciphertext)?;

        let certificate = SenderCertificate::deserialize(&opened.content.sender_certificate)?;
        validator.validate(&certificate, validation_time)?;

        let certified_key = certificate.identity_key().serialize();
        if !bool::from(certified_key.as_slice().ct_eq(&opened.sender_identity_key)) {
            warn!("sender certificate identity key does not match message key");
            return Err(SealedSenderError::IdentityKeyMismatch);
        }

        let sender = certificate.sender().clone();
        if local.is_some_and(|me| me.is_sender(&sender)) {
            debug!("dropping message sent by this device");
            return Ok(DecryptionOutcome::SelfSent);
        }

        let address = sender.session_address();
        let message_type = CiphertextMessageType::from(opened.content.content_type);
        let result = match message_type {
            CiphertextMessageType::Whisper => {
                self.sessions.decrypt_whisper(&address, &opened.content.content).await
            },
            CiphertextMessageType::PreKey => {
                self.sessions.decrypt_prekey(&address, &opened.content.content).await
            },
        };

        match result {
            Ok(plaintext) => {
                debug!(%address, ?message_type, size = plaintext.len(), "opened message");
                Ok(DecryptionOutcome::Message(DecryptedMessage { sender, plaintext }))
            },
            Err(source) => Err(SealedSenderError::SessionDecrypt { sender, source }),
        }
    }

    /// [`Self::decrypt`] validating the certificate at the environment's
    /// current wall-clock time.
    ///
    /// # Errors
    ///
    /// Same as [`Self::decrypt`].
    pub async fn decrypt_now(
        &self,
        validator: &CertificateValidator,
        ciphertext: &[u8],
        local: Option<&LocalIdentity>,
    ) -> Result<DecryptionOutcome, SealedSenderError> {
        let now = self.env.wall_clock_millis();
        self.decrypt(validator, ciphertext, now, local).await
    }

    /// Protocol version of the session with `address`.
    ///
    /// # Errors
    ///
    /// - `Session` if the session cipher fails
    pub async fn session_version(
        &self,
        address: &ProtocolAddress,
    ) -> Result<u32, SealedSenderError> {
        Ok(self.sessions.session_version(address).await?)
    }

    /// Registration id of the device at `address`.
    ///
    /// # Errors
    ///
    /// - `Session` if the session cipher fails
    pub async fn remote_registration_id(
        &self,
        address: &ProtocolAddress,
    ) -> Result<u32, SealedSenderError> {
        Ok(self.sessions.remote_registration_id(address).await?)
    }

    /// Close the open session with `address`.
    ///
    /// # Errors
    ///
    /// - `Session` if the session cipher fails
    pub async fn close_open_session(
        &self,
        address: &ProtocolAddress,
    ) -> Result<(), SealedSenderError> {
        Ok(self.sessions.close_open_session(address).await?)
    }

    async fn local_identity(&self) -> Result<KeyPair, SealedSenderError> {
        self.identities
            .identity_key_pair()
            .await?
            .ok_or_else(|| SealedSenderError::NoIdentity { name: LOCAL_IDENTITY.to_string() })
    }
}

/// Build the outer message for `content`.
///
/// `ephemeral` must be fresh for every call.
///
/// # Errors
///
/// - `InvalidKey` if `recipient_identity` gives a non-contributory agreement
/// - `Malformed` if encoding fails
pub fn seal_message(
    sender_identity: &KeyPair,
    recipient_identity: &PublicKey,
    ephemeral: &KeyPair,
    content: &UnidentifiedSenderMessageContent,
) -> Result<Vec<u8>, SealedSenderError> {
    let ephemeral_public = ephemeral.public_key().serialize();

    let salt = ephemeral_salt(&recipient_identity.serialize(), &ephemeral_public);
    let ephemeral_keys =
        calculate_ephemeral_keys(recipient_identity, ephemeral.private_key(), &salt)?;
    let encrypted_static = seal_encrypt(
        ephemeral_keys.cipher_key(),
        ephemeral_keys.mac_key(),
        &sender_identity.public_key().serialize(),
    );

    let salt = static_salt(ephemeral_keys.chain_key(), &encrypted_static);
    let static_keys =
        calculate_static_keys(recipient_identity, sender_identity.private_key(), &salt)?;
    let inner = Zeroizing::new(content.encode()?);
    let encrypted_message = seal_encrypt(static_keys.cipher_key(), static_keys.mac_key(), &inner);

    Ok(SealedSenderMessage::new(ephemeral_public.to_vec(), encrypted_static, encrypted_message)
        .encode()?)
}

/// Remove both encryption layers of an outer message.
///
/// Authenticates the envelope only. The sender certificate inside is not
/// validated.
///
/// # Errors
///
/// - `Malformed` or `UnsupportedVersion` if the outer message is unreadable
/// - `InvalidKey` if the ephemeral or recovered sender key is unusable
/// - `MacMismatch` if either layer fails authentication
/// - `UnknownMessageType` if the inner content names an unknown type
pub fn open_message(
    recipient_identity: &KeyPair,
    ciphertext: &[u8],
) -> Result<OpenedMessage, SealedSenderError> {
    let message = SealedSenderMessage::decode(ciphertext)?;
    let ephemeral_public = PublicKey::deserialize(&message.ephemeral_public)?;

    let salt =
        ephemeral_salt(&recipient_identity.public_key().serialize(), &message.ephemeral_public);
    let ephemeral_keys =
        calculate_ephemeral_keys(&ephemeral_public, recipient_identity.private_key(), &salt)?;
    let sender_identity_key = seal_decrypt(
        ephemeral_keys.cipher_key(),
        ephemeral_keys.mac_key(),
        &message.encrypted_static,
    )?;
    let sender_key = PublicKey::deserialize(&sender_identity_key)?;

    let salt = static_salt(ephemeral_keys.chain_key(), &message.encrypted_static);
    let static_keys = calculate_static_keys(&sender_key, recipient_identity.private_key(), &salt)?;
    let inner = Zeroizing::new(seal_decrypt(
        static_keys.cipher_key(),
        static_keys.mac_key(),
        &message.encrypted_message,
    )?);

    Ok(OpenedMessage {
        sender_identity_key,
        content: UnidentifiedSenderMessageContent::decode(&inner)?,
    })
}
