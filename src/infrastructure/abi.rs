//! # ABI Helpers
//!
//! Calldata encoding and response decoding for the read-only contract
//! calls the engines issue: ERC-20 `balanceOf` and the quoter's
//! `quoteExactInputSingle`.
//!
//! Selectors are the first four bytes of the keccak-256 hash of the
//! canonical signature.

use crate::error::{CoreError, CoreResult};
use ethers::abi::{encode, Token as AbiToken};
use ethers::types::{Address, Bytes, U256};

/// Selector for `balanceOf(address)`.
pub const BALANCE_OF_SELECTOR: [u8; 4] = [0x70, 0xa0, 0x82, 0x31];

/// Selector for
/// `quoteExactInputSingle((address,address,uint256,uint24,uint160))`.
pub const QUOTE_EXACT_INPUT_SINGLE_SELECTOR: [u8; 4] = [0xc6, 0xa5, 0x02, 0x6a];

/// Encodes a `balanceOf(owner)` call.
#[must_use]
pub fn encode_balance_of(owner: Address) -> Bytes {
    let mut calldata = BALANCE_OF_SELECTOR.to_vec();
    calldata.extend(encode(&[AbiToken::Address(owner)]));
    Bytes::from(calldata)
}

/// Encodes a `quoteExactInputSingle` call.
///
/// The quoter takes a single static tuple (tokenIn, tokenOut,
/// amountIn, fee, sqrtPriceLimitX96); the price limit is left at zero
/// so the quote is unconstrained.
#[must_use]
pub fn encode_quote_exact_input_single(
    token_in: Address,
    token_out: Address,
    amount_in: U256,
    fee: u32,
) -> Bytes {
    let mut calldata = QUOTE_EXACT_INPUT_SINGLE_SELECTOR.to_vec();
    calldata.extend(encode(&[
        AbiToken::Address(token_in),
        AbiToken::Address(token_out),
        AbiToken::Uint(amount_in),
        AbiToken::Uint(U256::from(fee)),
        AbiToken::Uint(U256::zero()),
    ]));
    Bytes::from(calldata)
}

/// Decodes a single unsigned integer from the first response word.
///
/// # Errors
///
/// Returns `RemoteUnavailable` if the response is shorter than one
/// 32-byte word.
pub fn decode_uint(data: &[u8]) -> CoreResult<U256> {
    if data.len() < 32 {
        return Err(CoreError::remote_unavailable(format!(
            "response too short for a uint ({} bytes)",
            data.len()
        )));
    }

    Ok(U256::from_big_endian(&data[0..32]))
}

/// Decodes a quoter response into (amount out, gas estimate).
///
/// The full quoter response is four words: amountOut,
/// sqrtPriceX96After, initializedTicksCrossed, gasEstimate. Quoters
/// that return only the output amount are accepted; the gas estimate
/// is then absent.
///
/// # Errors
///
/// Returns `RemoteUnavailable` if the response holds no complete word.
pub fn decode_quote_response(data: &[u8]) -> CoreResult<(U256, Option<U256>)> {
    let amount_out = decode_uint(data)?;

    let gas_estimate = if data.len() >= 128 {
        Some(U256::from_big_endian(&data[96..128]))
    } else {
        None
    };

    Ok((amount_out, gas_estimate))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use ethers::utils::hex;

    const OWNER: &str = "0x90F79bf6EB2c4f870365E785982E1f101E93b906";

    #[test]
    fn balance_of_selector_value() {
        assert_eq!(hex::encode(BALANCE_OF_SELECTOR), "70a08231");
    }

    #[test]
    fn quote_selector_value() {
        assert_eq!(hex::encode(QUOTE_EXACT_INPUT_SINGLE_SELECTOR), "c6a5026a");
    }

    #[test]
    fn encode_balance_of_layout() {
        let owner: Address = OWNER.parse().unwrap();
        let calldata = encode_balance_of(owner);

        assert_eq!(calldata.len(), 4 + 32);
        assert_eq!(&calldata[0..4], &BALANCE_OF_SELECTOR);
        // Address is left-padded into the word.
        assert!(calldata[4..16].iter().all(|b| *b == 0));
        assert_eq!(&calldata[16..36], owner.as_bytes());
    }

    #[test]
    fn encode_quote_layout() {
        let token_in: Address = OWNER.parse().unwrap();
        let token_out = Address::zero();
        let calldata = encode_quote_exact_input_single(
            token_in,
            token_out,
            U256::from(1_000_000u64),
            3000,
        );

        // Selector plus five static words.
        assert_eq!(calldata.len(), 4 + 5 * 32);
        assert_eq!(&calldata[0..4], &QUOTE_EXACT_INPUT_SINGLE_SELECTOR);

        let amount = U256::from_big_endian(&calldata[68..100]);
        assert_eq!(amount, U256::from(1_000_000u64));

        let fee = U256::from_big_endian(&calldata[100..132]);
        assert_eq!(fee, U256::from(3000u64));

        let price_limit = U256::from_big_endian(&calldata[132..164]);
        assert_eq!(price_limit, U256::zero());
    }

    #[test]
    fn decode_uint_single_word() {
        let mut data = [0u8; 32];
        U256::from(42u64).to_big_endian(&mut data);
        assert_eq!(decode_uint(&data).unwrap(), U256::from(42u64));
    }

    #[test]
    fn decode_uint_rejects_short_response() {
        assert!(decode_uint(&[]).is_err());
        assert!(decode_uint(&[0u8; 31]).is_err());
    }

    #[test]
    fn decode_quote_response_full() {
        let mut data = [0u8; 128];
        U256::from(2500u64).to_big_endian(&mut data[0..32]);
        U256::from(140_000u64).to_big_endian(&mut data[96..128]);

        let (amount_out, gas) = decode_quote_response(&data).unwrap();
        assert_eq!(amount_out, U256::from(2500u64));
        assert_eq!(gas, Some(U256::from(140_000u64)));
    }

    #[test]
    fn decode_quote_response_amount_only() {
        let mut data = [0u8; 32];
        U256::from(2500u64).to_big_endian(&mut data);

        let (amount_out, gas) = decode_quote_response(&data).unwrap();
        assert_eq!(amount_out, U256::from(2500u64));
        assert_eq!(gas, None);
    }

    #[test]
    fn decode_quote_response_rejects_empty() {
        assert!(decode_quote_response(&[]).is_err());
    }
}
