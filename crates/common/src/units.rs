//! Native value units. All balances are carried in wei, the smallest
//! denomination; one whole unit is 10^18 wei.

pub const WEI_PER_UNIT: u128 = 1_000_000_000_000_000_000;

/// Converts whole units to wei.
pub fn to_wei(units: u64) -> u128 {
    units as u128 * WEI_PER_UNIT
}

/// Converts thousandths of a unit to wei.
pub fn milli_to_wei(milli_units: u64) -> u128 {
    milli_units as u128 * (WEI_PER_UNIT / 1_000)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_conversions() {
        assert_eq!(to_wei(2), 2_000_000_000_000_000_000);
        assert_eq!(milli_to_wei(110), 110_000_000_000_000_000);
        assert_eq!(milli_to_wei(1_000), to_wei(1));
    }
}
