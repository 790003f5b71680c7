//! TLS protocol constants and types.

use core::fmt;

/// SSL/TLS protocol version as seen on the wire.
///
/// Sniffed traffic may carry any minor version under major version 3, so unknown
/// minors are kept instead of rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ProtocolVersion {
    /// SSL 2.0 (only via the SSLv2-compatible ClientHello)
    Ssl20,

    /// SSL 3.0
    Ssl30,

    /// TLS 1.0 (RFC 2246)
    Tls10,

    /// TLS 1.1 (RFC 4346)
    Tls11,

    /// TLS 1.2 (RFC 5246)
    Tls12,

    /// TLS 1.3 (RFC 8446)
    Tls13,

    /// Major version 3 with a minor version this crate has no name for
    Tls3x(u8),
}

impl ProtocolVersion {
    /// Create from the major and minor version bytes.
    ///
    /// Returns `None` for anything that is neither SSL 2.0 nor major version 3;
    /// such bytes are not SSL/TLS.
    pub const fn from_wire(major: u8, minor: u8) -> Option<Self> {
        match (major, minor) {
            (0, 2) => Some(ProtocolVersion::Ssl20),
            (3, 0) => Some(ProtocolVersion::Ssl30),
            (3, 1) => Some(ProtocolVersion::Tls10),
            (3, 2) => Some(ProtocolVersion::Tls11),
            (3, 3) => Some(ProtocolVersion::Tls12),
            (3, 4) => Some(ProtocolVersion::Tls13),
            (3, minor) => Some(ProtocolVersion::Tls3x(minor)),
            _ => None,
        }
    }

    /// Create from wire format (u16 big-endian).
    pub const fn from_u16(value: u16) -> Option<Self> {
        Self::from_wire((value >> 8) as u8, value as u8)
    }

    /// Convert to wire format (u16 big-endian).
    pub const fn to_u16(self) -> u16 {
        match self {
            ProtocolVersion::Ssl20 => 0x0002,
            ProtocolVersion::Ssl30 => 0x0300,
            ProtocolVersion::Tls10 => 0x0301,
            ProtocolVersion::Tls11 => 0x0302,
            ProtocolVersion::Tls12 => 0x0303,
            ProtocolVersion::Tls13 => 0x0304,
            ProtocolVersion::Tls3x(minor) => 0x0300 | minor as u16,
        }
    }

    /// Get the protocol name.
    pub const fn name(self) -> &'static str {
        match self {
            ProtocolVersion::Ssl20 => "SSL 2.0",
            ProtocolVersion::Ssl30 => "SSL 3.0",
            ProtocolVersion::Tls10 => "TLS 1.0",
            ProtocolVersion::Tls11 => "TLS 1.1",
            ProtocolVersion::Tls12 => "TLS 1.2",
            ProtocolVersion::Tls13 => "TLS 1.3",
            ProtocolVersion::Tls3x(_) => "TLS (unknown minor)",
        }
    }

    /// Check if this is TLS 1.2 or older.
    pub const fn is_tls12_or_earlier(self) -> bool {
        !matches!(self, ProtocolVersion::Tls13 | ProtocolVersion::Tls3x(_))
    }
}

impl fmt::Display for ProtocolVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProtocolVersion::Tls3x(minor) => write!(f, "TLS 3.{}", minor),
            other => f.write_str(other.name()),
        }
    }
}

/// TLS record content type (RFC 5246 Section 6.2.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ContentType {
    /// Change cipher spec (20)
    ChangeCipherSpec = 20,

    /// Alert (21)
    Alert = 21,

    /// Handshake (22)
    Handshake = 22,

    /// Application data (23)
    ApplicationData = 23,

    /// Heartbeat (24) - RFC 6520
    Heartbeat = 24,
}

impl ContentType {
    /// Create from wire format (u8).
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            20 => Some(ContentType::ChangeCipherSpec),
            21 => Some(ContentType::Alert),
            22 => Some(ContentType::Handshake),
            23 => Some(ContentType::ApplicationData),
            24 => Some(ContentType::Heartbeat),
            _ => None,
        }
    }

    /// Convert to wire format (u8).
    pub const fn to_u8(self) -> u8 {
        self as u8
    }

    /// Get the content type name.
    pub const fn name(self) -> &'static str {
        match self {
            ContentType::ChangeCipherSpec => "change_cipher_spec",
            ContentType::Alert => "alert",
            ContentType::Handshake => "handshake",
            ContentType::ApplicationData => "application_data",
            ContentType::Heartbeat => "heartbeat",
        }
    }
}

/// Handshake message type.
///
/// Only the types the parser acts on are named; everything else is skipped by length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum HandshakeType {
    /// ClientHello (1)
    ClientHello = 1,

    /// ServerHello (2)
    ServerHello = 2,

    /// NewSessionTicket (4) - RFC 5077
    NewSessionTicket = 4,

    /// Certificate (11)
    Certificate = 11,

    /// ServerHelloDone (14)
    ServerHelloDone = 14,

    /// Finished (20)
    Finished = 20,
}

impl HandshakeType {
    /// Create from wire format (u8).
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            1 => Some(HandshakeType::ClientHello),
            2 => Some(HandshakeType::ServerHello),
            4 => Some(HandshakeType::NewSessionTicket),
            11 => Some(HandshakeType::Certificate),
            14 => Some(HandshakeType::ServerHelloDone),
            20 => Some(HandshakeType::Finished),
            _ => None,
        }
    }

    /// Convert to wire format (u8).
    pub const fn to_u8(self) -> u8 {
        self as u8
    }
}

/// TLS extension types the sniffer recognizes (IANA registry).
///
/// A type outside this set marks the summary with "unsupported extensions".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum ExtensionType {
    /// server_name (0)
    ServerName = 0,

    /// max_fragment_length (1)
    MaxFragmentLength = 1,

    /// client_certificate_url (2)
    ClientCertificateUrl = 2,

    /// trusted_ca_keys (3)
    TrustedCaKeys = 3,

    /// truncated_hmac (4)
    TruncatedHmac = 4,

    /// status_request (5) - OCSP stapling
    StatusRequest = 5,

    /// user_mapping (6)
    UserMapping = 6,

    /// client_authz (7)
    ClientAuthz = 7,

    /// server_authz (8)
    ServerAuthz = 8,

    /// cert_type (9)
    CertType = 9,

    /// supported_groups (10)
    SupportedGroups = 10,

    /// ec_point_formats (11)
    EcPointFormats = 11,

    /// srp (12)
    Srp = 12,

    /// signature_algorithms (13)
    SignatureAlgorithms = 13,

    /// use_srtp (14)
    UseSrtp = 14,

    /// heartbeat (15) - RFC 6520
    Heartbeat = 15,

    /// application_layer_protocol_negotiation (16) - ALPN
    ApplicationLayerProtocolNegotiation = 16,

    /// status_request_v2 (17)
    StatusRequestV2 = 17,

    /// signed_certificate_timestamp (18)
    SignedCertificateTimestamp = 18,

    /// client_certificate_type (19)
    ClientCertificateType = 19,

    /// server_certificate_type (20)
    ServerCertificateType = 20,

    /// padding (21)
    Padding = 21,

    /// encrypt_then_mac (22)
    EncryptThenMac = 22,

    /// extended_master_secret (23)
    ExtendedMasterSecret = 23,

    /// session_ticket (35) - RFC 5077
    SessionTicket = 35,

    /// pre_shared_key (41)
    PreSharedKey = 41,

    /// early_data (42)
    EarlyData = 42,

    /// supported_versions (43)
    SupportedVersions = 43,

    /// cookie (44)
    Cookie = 44,

    /// psk_key_exchange_modes (45)
    PskKeyExchangeModes = 45,

    /// key_share (51)
    KeyShare = 51,

    /// next_protocol_negotiation (13172) - expired draft, still sent by old clients
    NextProtocolNegotiation = 13172,

    /// renegotiation_info (0xFF01) - RFC 5746
    RenegotiationInfo = 0xFF01,
}

impl ExtensionType {
    /// Create from wire format (u16).
    pub const fn from_u16(value: u16) -> Option<Self> {
        match value {
            0 => Some(ExtensionType::ServerName),
            1 => Some(ExtensionType::MaxFragmentLength),
            2 => Some(ExtensionType::ClientCertificateUrl),
            3 => Some(ExtensionType::TrustedCaKeys),
            4 => Some(ExtensionType::TruncatedHmac),
            5 => Some(ExtensionType::StatusRequest),
            6 => Some(ExtensionType::UserMapping),
            7 => Some(ExtensionType::ClientAuthz),
            8 => Some(ExtensionType::ServerAuthz),
            9 => Some(ExtensionType::CertType),
            10 => Some(ExtensionType::SupportedGroups),
            11 => Some(ExtensionType::EcPointFormats),
            12 => Some(ExtensionType::Srp),
            13 => Some(ExtensionType::SignatureAlgorithms),
            14 => Some(ExtensionType::UseSrtp),
            15 => Some(ExtensionType::Heartbeat),
            16 => Some(ExtensionType::ApplicationLayerProtocolNegotiation),
            17 => Some(ExtensionType::StatusRequestV2),
            18 => Some(ExtensionType::SignedCertificateTimestamp),
            19 => Some(ExtensionType::ClientCertificateType),
            20 => Some(ExtensionType::ServerCertificateType),
            21 => Some(ExtensionType::Padding),
            22 => Some(ExtensionType::EncryptThenMac),
            23 => Some(ExtensionType::ExtendedMasterSecret),
            35 => Some(ExtensionType::SessionTicket),
            41 => Some(ExtensionType::PreSharedKey),
            42 => Some(ExtensionType::EarlyData),
            43 => Some(ExtensionType::SupportedVersions),
            44 => Some(ExtensionType::Cookie),
            45 => Some(ExtensionType::PskKeyExchangeModes),
            51 => Some(ExtensionType::KeyShare),
            13172 => Some(ExtensionType::NextProtocolNegotiation),
            0xFF01 => Some(ExtensionType::RenegotiationInfo),
            _ => None,
        }
    }

    /// Convert to wire format (u16).
    pub const fn to_u16(self) -> u16 {
        self as u16
    }
}
