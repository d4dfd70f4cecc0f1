//! Structured parameter values.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use serde::Serialize;

/// Token used instead of a password.
///
/// Tokens are acquired by the caller; this crate only carries them.
#[derive(Clone, PartialEq, Eq)]
pub enum AccessToken {
    /// OAuth 2.0 bearer token.
    OAuth(String),
    /// IAM database token and the private key that signs it.
    Iam { token: String, private_key: String },
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OAuth(_) => f.debug_tuple("OAuth").finish_non_exhaustive(),
            Self::Iam { .. } => f.debug_struct("Iam").finish_non_exhaustive(),
        }
    }
}

/// One application context entry sent at logon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppContext {
    pub namespace: String,
    pub name: String,
    pub value: String,
}

impl AppContext {
    #[must_use]
    pub fn new(
        namespace: impl Into<String>,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
            value: value.into(),
        }
    }
}

/// One column value of a sharding key.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ShardingValue {
    Text(String),
    Integer(i64),
    Float(f64),
}

impl From<&str> for ShardingValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for ShardingValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for ShardingValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for ShardingValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

/// Caller-provided TLS context, passed through untouched.
///
/// Equality is identity: two contexts are equal when they share the same
/// allocation.
#[derive(Clone)]
pub struct SslContext(Arc<dyn Any + Send + Sync>);

impl SslContext {
    pub fn new<T: Any + Send + Sync>(context: T) -> Self {
        Self(Arc::new(context))
    }

    /// Borrow the context as its concrete type.
    #[must_use]
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.downcast_ref()
    }
}

impl PartialEq for SslContext {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for SslContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SslContext").finish_non_exhaustive()
    }
}

/// Password-like text that never shows up in `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Secret {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Secret {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(..)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_access_token_debug_redacts() {
        let token = AccessToken::Iam {
            token: "tok123".into(),
            private_key: "key456".into(),
        };
        let debug_str = format!("{token:?}");
        assert!(!debug_str.contains("tok123"));
        assert!(!debug_str.contains("key456"));
        assert!(debug_str.contains("Iam"));
    }

    #[test]
    fn test_ssl_context_identity() {
        let context = SslContext::new(42_u32);
        let same = context.clone();
        let other = SslContext::new(42_u32);
        assert_eq!(context, same);
        assert_ne!(context, other);
        assert_eq!(context.downcast_ref::<u32>(), Some(&42));
        assert!(context.downcast_ref::<String>().is_none());
    }

    #[test]
    fn test_secret_debug() {
        let secret = Secret::new("tiger");
        assert_eq!(secret.expose(), "tiger");
        assert!(!format!("{secret:?}").contains("tiger"));
    }

    #[test]
    fn test_sharding_value_from() {
        assert_eq!(ShardingValue::from("a"), ShardingValue::Text("a".into()));
        assert_eq!(ShardingValue::from(7_i64), ShardingValue::Integer(7));
    }
}
