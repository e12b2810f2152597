use std::borrow::Cow;

const MAX_KEY_LEN: usize = 64;

#[showroom_derive::showroom_error]
pub enum ResourceGuardError {
    #[error("Resource validation error{}: {message}", format_context(.context))]
    Validation { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

/// Validation of record ids arriving from URLs and forms.
#[derive(Debug)]
pub struct ResourceGuard;

impl ResourceGuard {
    /// Checks an id against the table it is supposed to belong to and returns its bare key.
    ///
    /// Accepts `brand:K7xq2` or just `K7xq2`. A different table prefix is refused, which
    /// stops a `model:...` id from being used on a brand endpoint. The key must be 1 to 64
    /// ASCII letters, digits, `_` or `-`.
    ///
    /// # Errors
    /// Returns [`ResourceGuardError::Validation`] on a table mismatch or a malformed key.
    pub fn verify<I, T>(id: I, expected_table: T) -> Result<String, ResourceGuardError>
    where
        I: AsRef<str>,
        T: AsRef<str>,
    {
        let id = id.as_ref();
        let expected = expected_table.as_ref();

        let key = match id.split_once(':') {
            Some((table, key)) if table == expected => key,
            Some((table, _)) => {
                return Err(ResourceGuardError::Validation {
                    message: format!("Expected '{expected}', got '{table}'").into(),
                    context: Some("ID table mismatch".into()),
                });
            }
            None => id,
        };

        if key.is_empty()
            || key.len() > MAX_KEY_LEN
            || !key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(ResourceGuardError::Validation {
                message: format!("Malformed key '{key}'").into(),
                context: Some(expected.to_owned().into()),
            });
        }

        Ok(key.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_bare_and_prefixed_keys() {
        assert_eq!(ResourceGuard::verify("brand:K7xq2", "brand").unwrap(), "K7xq2");
        assert_eq!(ResourceGuard::verify("K7xq2", "brand").unwrap(), "K7xq2");
        assert_eq!(ResourceGuard::verify("legacy_id-01", "brand").unwrap(), "legacy_id-01");
    }

    #[test]
    fn refuses_foreign_tables() {
        assert!(ResourceGuard::verify("model:abc", "brand").is_err());
    }

    #[test]
    fn refuses_malformed_keys() {
        for bad in ["", "brand:", "../x", "a b", "x;DELETE brand", "brand:a:b"] {
            assert!(ResourceGuard::verify(bad, "brand").is_err(), "{bad:?} should be refused");
        }
        assert!(ResourceGuard::verify("a".repeat(MAX_KEY_LEN + 1), "brand").is_err());
    }
}
