pub mod grease;
pub mod parser;
pub mod types;

/// server_name (RFC 6066)
pub const EXT_SERVER_NAME: u16 = 0x0000;
/// application_layer_protocol_negotiation (RFC 7301)
pub const EXT_ALPN: u16 = 0x0010;
