//! Cycle-number directory layout

/// Directory name for a cycle: `c` followed by the number zero-padded to 4
pub fn directory(cycle: &str) -> String {
    format!("c{:0>4}", cycle.trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycle_directory_padding() {
        assert_eq!(directory("7"), "c0007");
        assert_eq!(directory("123"), "c0123");
        assert_eq!(directory("0042"), "c0042");
        assert_eq!(directory("12345"), "c12345");
    }
}
