//! # Utility Functions Module
//!
//! This module provides utility functions that improve code readability
//! and reduce boilerplate across the application.

/// Converts a vector of string-like items to Vec<String>.
///
/// This utility function accepts any iterable of items that can be converted
/// to String, eliminating repetitive `.to_string()` calls throughout the codebase.
///
/// # Example
/// ```rust
/// use teenypng::utils::to_string_vec;
///
/// let args = to_string_vec(["--force", "--output", "out.png"]);
/// assert_eq!(args.len(), 3);
/// ```
pub fn to_string_vec<T, I>(items: I) -> Vec<String>
where
    T: ToString,
    I: IntoIterator<Item = T>,
{
    items.into_iter().map(|item| item.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_string_vec_string_literals() {
        let result = to_string_vec(["hello", "world"]);
        assert_eq!(result, vec!["hello".to_string(), "world".to_string()]);
    }

    #[test]
    fn test_to_string_vec_mixed_types() {
        let num = 42;
        let result = to_string_vec(["--iterations", &num.to_string(), "-y"]);
        assert_eq!(
            result,
            vec![
                "--iterations".to_string(),
                "42".to_string(),
                "-y".to_string()
            ]
        );
    }

    #[test]
    fn test_to_string_vec_empty() {
        let result: Vec<String> = to_string_vec(Vec::<&str>::new());
        assert_eq!(result, Vec::<String>::new());
    }
}
