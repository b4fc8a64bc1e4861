/// The IHL field counts 32-bit words.
pub const IHL_WORD_LEN: usize = 4;
