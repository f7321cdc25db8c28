/// FNV-1a over the prompt bytes; the built-in models derive everything from it.
pub(crate) fn prompt_seed(prompt: &str) -> u64 {
    const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0100_0000_01b3;
    prompt
        .bytes()
        .fold(OFFSET, |hash, b| (hash ^ u64::from(b)).wrapping_mul(PRIME))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_seed_is_stable() {
        assert_eq!(prompt_seed(""), 0xcbf2_9ce4_8422_2325);
        assert_eq!(prompt_seed("a"), 0xaf63_dc4c_8601_ec8c);
    }

    #[test]
    fn test_prompt_seed_differs_by_prompt() {
        assert_ne!(prompt_seed("jazz"), prompt_seed("metal"));
    }
}
