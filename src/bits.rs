/// Minimum number of bits `b` such that `value < 2^b`.
///
/// `num_bits(0)` is `0`: a field whose largest value is zero needs no
/// storage at all.
pub fn num_bits(value: u64) -> u32 {
    u64::BITS - value.leading_zeros()
}
