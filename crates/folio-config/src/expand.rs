//! Environment variable expansion for configuration strings.

use std::cell::RefCell;

use crate::ConfigError;

/// Expand `${VAR}` and `${VAR:-default}` references in `value`.
///
/// An unset variable without a default is an error naming `field`. Bare
/// `$VAR` is left alone.
pub(crate) fn expand_env(value: &str, field: &str) -> Result<String, ConfigError> {
    if !value.contains("${") {
        return Ok(value.to_owned());
    }

    let unset = RefCell::new(Vec::new());
    let expanded = shellexpand::env_with_context(value, |var| {
        std::env::var(var).map_or_else(
            |_| {
                unset.borrow_mut().push(var.to_owned());
                Ok::<_, std::convert::Infallible>(None)
            },
            |val| Ok(Some(val)),
        )
    })
    .map_err(|e| ConfigError::EnvVar {
        field: field.to_owned(),
        message: e.to_string(),
    })?
    .into_owned();

    // Unset variables with a default were substituted; the rest are left verbatim
    if let Some(var) = unset
        .into_inner()
        .into_iter()
        .find(|var| expanded.contains(&format!("${{{var}}}")))
    {
        return Err(ConfigError::EnvVar {
            field: field.to_owned(),
            message: format!("${{{var}}} not set"),
        });
    }
    Ok(expanded)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_simple_var() {
        // SAFETY: variable names are unique to this test
        unsafe {
            std::env::set_var("FOLIO_TEST_SIMPLE", "/srv/docs");
        }
        let result = expand_env("${FOLIO_TEST_SIMPLE}", "books.source_dir").unwrap();
        assert_eq!(result, "/srv/docs");
    }

    #[test]
    fn test_expand_default_when_unset() {
        // SAFETY: variable names are unique to this test
        unsafe {
            std::env::remove_var("FOLIO_TEST_UNSET_DEFAULT");
        }
        let result = expand_env("${FOLIO_TEST_UNSET_DEFAULT:-docs}", "books.source_dir").unwrap();
        assert_eq!(result, "docs");
    }

    #[test]
    fn test_expand_value_wins_over_default() {
        // SAFETY: variable names are unique to this test
        unsafe {
            std::env::set_var("FOLIO_TEST_SET_DEFAULT", "manual");
        }
        let result = expand_env("${FOLIO_TEST_SET_DEFAULT:-docs}", "books.source_dir").unwrap();
        assert_eq!(result, "manual");
    }

    #[test]
    fn test_expand_missing_var_error() {
        // SAFETY: variable names are unique to this test
        unsafe {
            std::env::remove_var("FOLIO_TEST_MISSING");
        }
        let err = expand_env("${FOLIO_TEST_MISSING}/docs", "books.source_dir").unwrap_err();

        assert!(matches!(err, ConfigError::EnvVar { .. }));
        assert_eq!(
            err.to_string(),
            "Environment variable error in books.source_dir: ${FOLIO_TEST_MISSING} not set"
        );
    }

    #[test]
    fn test_expand_embedded_var() {
        // SAFETY: variable names are unique to this test
        unsafe {
            std::env::set_var("FOLIO_TEST_HOST", "example.com");
        }
        let result = expand_env("docs.${FOLIO_TEST_HOST}", "books.domain").unwrap();
        assert_eq!(result, "docs.example.com");
    }

    #[test]
    fn test_literals_unchanged() {
        assert_eq!(expand_env("docs", "f").unwrap(), "docs");
        assert_eq!(expand_env("$HOME/docs", "f").unwrap(), "$HOME/docs");
    }
}
