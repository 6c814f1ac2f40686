use sha2::{Digest, Sha256};

use super::error::{AppError, AtlasResult};

/// Converts a hex Tron address (`41` + 20 bytes) into its base58check form
/// (starts with 'T'). A bare 20-byte hex body is also accepted.
pub fn hex_to_tron_address(hex: &str) -> AtlasResult<String> {
    let hex = hex.trim_start_matches("0x");
    let body = match hex.len() {
        42 if hex.starts_with("41") => &hex[2..],
        40 => hex,
        _ => {
            return Err(AppError::AddressError(format!(
                "invalid Tron address length: {}",
                hex
            )))
        }
    };

    let mut decoded = vec![0x41];
    decoded.extend_from_slice(
        &hex::decode(body).map_err(|e| AppError::AddressError(e.to_string()))?,
    );

    let hash1 = Sha256::digest(&decoded);
    let hash2 = Sha256::digest(hash1);
    decoded.extend_from_slice(&hash2[..4]);

    Ok(bs58::encode(decoded).into_string())
}

/// Base58 form when the input is a valid hex address, otherwise the input
/// unchanged. TronGrid mixes both spellings depending on the endpoint.
pub fn display_address(raw: &str) -> String {
    hex_to_tron_address(raw).unwrap_or_else(|_| raw.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_to_base58() {
        let address = hex_to_tron_address("41a614f803b6fd780986a42c78ec9c7f77e6ded13c").unwrap();
        assert_eq!(address, "TR7NHqjeKQxGTCi8q8ZY4pL8otSzgjLj6t");
    }

    #[test]
    fn test_body_without_prefix_gets_mainnet_byte() {
        let with_prefix = hex_to_tron_address("41a614f803b6fd780986a42c78ec9c7f77e6ded13c").unwrap();
        let bare = hex_to_tron_address("a614f803b6fd780986a42c78ec9c7f77e6ded13c").unwrap();
        assert_eq!(with_prefix, bare);
    }

    #[test]
    fn test_invalid_input() {
        assert!(matches!(
            hex_to_tron_address("41abc"),
            Err(AppError::AddressError(_))
        ));
        assert!(hex_to_tron_address("41zz14f803b6fd780986a42c78ec9c7f77e6ded13c").is_err());
    }

    #[test]
    fn test_display_address_keeps_base58_input() {
        assert_eq!(
            display_address("TR7NHqjeKQxGTCi8q8ZY4pL8otSzgjLj6t"),
            "TR7NHqjeKQxGTCi8q8ZY4pL8otSzgjLj6t"
        );
    }
}
