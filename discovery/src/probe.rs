use alloy_primitives::Address;

use crate::abi;
use crate::reader::ContractReader;

/// Checks whether `address` is an ATP contract by attempting its two
/// cheapest characteristic reads concurrently.
///
/// True only if both succeed and the type discriminator is within the known
/// range. Any failure (function missing, address not a contract, call
/// reverted) means "not an ATP". That is the common case when probing
/// holder addresses, so it is never logged as an error and never propagated.
pub async fn is_atp_contract<R: ContractReader>(reader: &R, address: Address) -> bool {
    if address == Address::ZERO {
        return false;
    }
    let (kind, beneficiary) = futures::join!(
        abi::get_type(reader, address),
        abi::get_beneficiary(reader, address),
    );
    match (kind, beneficiary) {
        (Ok(kind), Ok(_)) if kind <= 2 => {
            tracing::debug!(
                target: "atp_probe",
                address = %format!("{address:#x}"),
                kind,
                "confirmed ATP contract"
            );
            true
        }
        _ => false,
    }
}
