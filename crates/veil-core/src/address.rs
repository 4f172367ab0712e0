//! Addresses and identities of message participants.

use std::fmt;

/// A remote session endpoint: account name plus device.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProtocolAddress {
    name: String,
    device_id: u32,
}

impl ProtocolAddress {
    /// Create an address.
    pub fn new(name: impl Into<String>, device_id: u32) -> Self {
        Self { name: name.into(), device_id }
    }

    /// Account name (uuid or phone number).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Device id.
    pub fn device_id(&self) -> u32 {
        self.device_id
    }
}

impl fmt::Display for ProtocolAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.name, self.device_id)
    }
}

/// Account names a sender certificate can carry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SenderName {
    /// Phone number only
    E164(String),
    /// Uuid only
    Uuid(String),
    /// Both names
    Both {
        /// Phone number
        e164: String,
        /// Uuid
        uuid: String,
    },
}

impl SenderName {
    /// Combine optional names. Returns `None` if both are absent.
    pub fn from_parts(e164: Option<String>, uuid: Option<String>) -> Option<Self> {
        match (e164, uuid) {
            (Some(e164), Some(uuid)) => Some(Self::Both { e164, uuid }),
            (Some(e164), None) => Some(Self::E164(e164)),
            (None, Some(uuid)) => Some(Self::Uuid(uuid)),
            (None, None) => None,
        }
    }

    /// Phone number, if present.
    pub fn e164(&self) -> Option<&str> {
        match self {
            Self::E164(e164) | Self::Both { e164, .. } => Some(e164),
            Self::Uuid(_) => None,
        }
    }

    /// Uuid, if present.
    pub fn uuid(&self) -> Option<&str> {
        match self {
            Self::Uuid(uuid) | Self::Both { uuid, .. } => Some(uuid),
            Self::E164(_) => None,
        }
    }

    /// Uuid if present, otherwise the phone number.
    pub fn preferred(&self) -> &str {
        match self {
            Self::Uuid(uuid) | Self::Both { uuid, .. } => uuid,
            Self::E164(e164) => e164,
        }
    }
}

/// Sender of a decrypted message, as named by its certificate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SenderIdentity {
    name: SenderName,
    device_id: u32,
}

impl SenderIdentity {
    /// Create a sender identity.
    ///
    /// Returns `None` if neither `e164` nor `uuid` is given.
    pub fn new(e164: Option<String>, uuid: Option<String>, device_id: u32) -> Option<Self> {
        SenderName::from_parts(e164, uuid).map(|name| Self::from_name(name, device_id))
    }

    /// Create a sender identity from an already combined name.
    pub fn from_name(name: SenderName, device_id: u32) -> Self {
        Self { name, device_id }
    }

    /// Certified account names.
    pub fn name(&self) -> &SenderName {
        &self.name
    }

    /// Sender phone number, if certified.
    pub fn e164(&self) -> Option<&str> {
        self.name.e164()
    }

    /// Sender uuid exactly as certified.
    pub fn uuid(&self) -> Option<&str> {
        self.name.uuid()
    }

    /// Sender device id.
    pub fn device_id(&self) -> u32 {
        self.device_id
    }

    /// Address of the session used to decrypt this sender's messages.
    ///
    /// The uuid is preferred, falling back to the phone number. The name is
    /// used as certified, without case normalization.
    pub fn session_address(&self) -> ProtocolAddress {
        ProtocolAddress::new(self.name.preferred(), self.device_id)
    }

    /// Phone-number address, if the certificate names one.
    pub fn e164_address(&self) -> Option<ProtocolAddress> {
        self.e164().map(|e164| ProtocolAddress::new(e164, self.device_id))
    }

    /// Uuid address with the uuid lowercased, if the certificate names one.
    pub fn uuid_address(&self) -> Option<ProtocolAddress> {
        self.uuid().map(|uuid| ProtocolAddress::new(uuid.to_lowercase(), self.device_id))
    }
}

impl fmt::Display for SenderIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.session_address(), f)
    }
}

/// The local account, used to recognise our own messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalIdentity {
    /// Our phone number
    pub e164: Option<String>,
    /// Our uuid
    pub uuid: Option<String>,
    /// Our device id
    pub device_id: u32,
}

impl LocalIdentity {
    /// Returns true if `sender` is this exact device.
    ///
    /// Matches when the phone numbers or the uuids are exactly equal, and
    /// the device ids are equal. Uuids are not case-normalized.
    pub fn is_sender(&self, sender: &SenderIdentity) -> bool {
        let same_e164 = matches!(
            (self.e164.as_deref(), sender.e164()),
            (Some(ours), Some(theirs)) if ours == theirs
        );
        let same_uuid = matches!(
            (self.uuid.as_deref(), sender.uuid()),
            (Some(ours), Some(theirs)) if ours == theirs
        );

        (same_e164 || same_uuid) && self.device_id == sender.device_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const UUID: &str = "9D0652A3-DCC3-4D11-975F-74D61598733F";

    fn sender(e164: Option<&str>, uuid: Option<&str>, device_id: u32) -> SenderIdentity {
        SenderIdentity::new(e164.map(str::to_string), uuid.map(str::to_string), device_id).unwrap()
    }

    #[test]
    fn address_display() {
        assert_eq!(ProtocolAddress::new("+14151231234", 3).to_string(), "+14151231234.3");
    }

    #[test]
    fn sender_requires_a_name() {
        assert!(SenderIdentity::new(None, None, 1).is_none());
    }

    #[test]
    fn sender_name_from_parts() {
        assert_eq!(
            SenderName::from_parts(Some("+14151231234".to_string()), None),
            Some(SenderName::E164("+14151231234".to_string()))
        );
        assert_eq!(
            SenderName::from_parts(None, Some(UUID.to_string())),
            Some(SenderName::Uuid(UUID.to_string()))
        );

        let e164 = Some("+14151231234".to_string());
        let both = SenderName::from_parts(e164, Some(UUID.to_string())).unwrap();
        assert_eq!(both.e164(), Some("+14151231234"));
        assert_eq!(both.uuid(), Some(UUID));
        assert_eq!(both.preferred(), UUID);
    }

    #[test]
    fn session_address_prefers_uuid() {
        let both = sender(Some("+14151231234"), Some(UUID), 2);
        assert_eq!(both.session_address(), ProtocolAddress::new(UUID, 2));

        let e164_only = sender(Some("+14151231234"), None, 2);
        assert_eq!(e164_only.session_address(), ProtocolAddress::new("+14151231234", 2));
    }

    #[test]
    fn uuid_address_is_lowercased() {
        let identity = sender(None, Some(UUID), 1);
        assert_eq!(identity.uuid_address(), Some(ProtocolAddress::new(UUID.to_lowercase(), 1)));
        assert_eq!(identity.e164_address(), None);
    }

    #[test]
    fn local_identity_matches_e164_or_uuid() {
        let me = LocalIdentity {
            e164: Some("+14151231234".to_string()),
            uuid: Some(UUID.to_string()),
            device_id: 1,
        };

        assert!(me.is_sender(&sender(Some("+14151231234"), None, 1)));
        assert!(me.is_sender(&sender(None, Some(UUID), 1)));
        assert!(!me.is_sender(&sender(Some("+14151231234"), Some(UUID), 2)));
        assert!(!me.is_sender(&sender(Some("+19995550000"), None, 1)));
    }

    #[test]
    fn local_uuid_compared_exactly() {
        let me = LocalIdentity { e164: None, uuid: Some(UUID.to_lowercase()), device_id: 1 };

        assert!(!me.is_sender(&sender(None, Some(UUID), 1)));
        assert!(me.is_sender(&sender(None, Some(&UUID.to_lowercase()), 1)));
    }

    #[test]
    fn local_identity_without_fields_never_matches() {
        let me = LocalIdentity { e164: None, uuid: None, device_id: 1 };
        assert!(!me.is_sender(&sender(Some("+14151231234"), Some(UUID), 1)));
    }
}
