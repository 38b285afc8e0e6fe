//! The builtin client-profile table.
//!
//! Each entry mirrors the ClientHello shape of a widely deployed client
//! vintage: its cipher suites in offer order, the extension types it
//! sends, and its ALPN list. Values are the published wire values; GREASE
//! placeholders are not stored (the matcher strips them from live hellos
//! before scoring).

use gaseous_core::fingerprint::FingerprintSpec;

fn spec(
    id: &str,
    cipher_suites: &[u16],
    extensions: &[u16],
    alpn: &[&str],
) -> FingerprintSpec {
    FingerprintSpec {
        id: id.to_string(),
        cipher_suites: cipher_suites.to_vec(),
        compression_methods: vec![0x00],
        extensions: extensions.to_vec(),
        alpn: alpn.iter().map(|s| s.to_string()).collect(),
    }
}

pub fn builtin() -> Vec<FingerprintSpec> {
    vec![
        spec(
            "chrome-120",
            &[
                0x1301, 0x1302, 0x1303, 0xC02B, 0xC02F, 0xC02C, 0xC030, 0xCCA9, 0xCCA8,
                0xC013, 0xC014, 0x009C, 0x009D, 0x002F, 0x0035,
            ],
            &[
                0x0000, 0x0017, 0xFF01, 0x000A, 0x000B, 0x0023, 0x0010, 0x0005, 0x000D,
                0x0012, 0x0033, 0x002D, 0x002B, 0x001B, 0x4469,
            ],
            &["h2", "http/1.1"],
        ),
        spec(
            "chrome-102",
            &[
                0x1301, 0x1302, 0x1303, 0xC02B, 0xC02F, 0xC02C, 0xC030, 0xCCA9, 0xCCA8,
                0xC013, 0xC014, 0x009C, 0x009D, 0x002F, 0x0035,
            ],
            &[
                0x0000, 0x0017, 0xFF01, 0x000A, 0x000B, 0x0023, 0x0010, 0x0005, 0x000D,
                0x0012, 0x0033, 0x002D, 0x002B, 0x001B, 0x0015,
            ],
            &["h2", "http/1.1"],
        ),
        spec(
            "firefox-120",
            &[
                0x1301, 0x1303, 0x1302, 0xC02B, 0xC02F, 0xCCA9, 0xCCA8, 0xC02C, 0xC030,
                0xC00A, 0xC009, 0xC013, 0xC014, 0x009C, 0x009D, 0x002F, 0x0035,
            ],
            &[
                0x0000, 0x0017, 0xFF01, 0x000A, 0x000B, 0x0010, 0x0005, 0x0022, 0x0023,
                0x0033, 0x002B, 0x000D, 0x002D, 0x001C,
            ],
            &["h2", "http/1.1"],
        ),
        spec(
            "firefox-105",
            &[
                0x1301, 0x1303, 0x1302, 0xC02B, 0xC02F, 0xCCA9, 0xCCA8, 0xC02C, 0xC030,
                0xC00A, 0xC009, 0xC013, 0xC014, 0x0033, 0x0039, 0x002F, 0x0035,
            ],
            &[
                0x0000, 0x0017, 0xFF01, 0x000A, 0x000B, 0x0010, 0x0005, 0x0022, 0x0023,
                0x0033, 0x002B, 0x000D, 0x002D,
            ],
            &["h2", "http/1.1"],
        ),
        spec(
            "safari-16",
            &[
                0x1301, 0x1302, 0x1303, 0xC02C, 0xC02B, 0xCCA9, 0xC030, 0xC02F, 0xCCA8,
                0xC024, 0xC023, 0xC00A, 0xC009, 0xC028, 0xC027, 0xC014, 0xC013, 0x009D,
                0x009C, 0x003D, 0x003C, 0x0035, 0x002F,
            ],
            &[
                0x0000, 0x0017, 0xFF01, 0x000A, 0x000B, 0x0010, 0x0005, 0x000D, 0x0012,
                0x0033, 0x002D, 0x002B, 0x001B,
            ],
            &["h2", "http/1.1"],
        ),
        spec(
            "edge-106",
            &[
                0x1301, 0x1302, 0x1303, 0xC02B, 0xC02F, 0xC02C, 0xC030, 0xCCA9, 0xCCA8,
                0xC013, 0xC014, 0x009C, 0x009D, 0x002F, 0x0035,
            ],
            &[
                0x0000, 0x0017, 0xFF01, 0x000A, 0x000B, 0x0023, 0x0010, 0x0005, 0x000D,
                0x0012, 0x0033, 0x002D, 0x002B, 0x4469,
            ],
            &["h2", "http/1.1"],
        ),
        spec(
            "ios-14",
            &[
                0x1301, 0x1302, 0x1303, 0xC02C, 0xC02B, 0xCCA9, 0xC030, 0xC02F, 0xCCA8,
                0xC024, 0xC023, 0xC00A, 0xC009, 0xC028, 0xC027, 0xC014, 0xC013, 0x009D,
                0x009C, 0x003D, 0x003C, 0x0035, 0x002F, 0xC008, 0xC012, 0x000A,
            ],
            &[
                0x0000, 0x0017, 0xFF01, 0x000A, 0x000B, 0x0010, 0x0005, 0x000D, 0x0012,
                0x0033, 0x002D, 0x002B,
            ],
            &["h2", "http/1.1"],
        ),
        spec(
            "okhttp-android-11",
            &[
                0x1301, 0x1302, 0x1303, 0xC02B, 0xC02C, 0xC02F, 0xC030, 0xCCA9, 0xCCA8,
                0xC013, 0xC014, 0x009C, 0x009D, 0x002F, 0x0035,
            ],
            &[0x0000, 0x0017, 0xFF01, 0x000A, 0x000B, 0x0010, 0x000D, 0x002B, 0x0033],
            &["h2", "http/1.1"],
        ),
    ]
}
