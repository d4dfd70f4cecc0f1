//! `user[proxy]/password@` prefixes.

use crate::error::ConnectParamsError;
use crate::Result;

/// Credentials split off the front of a connect string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct Credentials {
    pub user: Option<String>,
    pub proxy_user: Option<String>,
    pub password: Option<String>,
}

impl Credentials {
    fn from_segment(segment: &str) -> Result<Self> {
        let (user, password) = match segment.split_once('/') {
            Some((user, password)) => (user, Some(password)),
            None => (segment, None),
        };
        let (user, proxy_user) = split_proxy_user(user)?;
        Ok(Self {
            user,
            proxy_user,
            password: password.and_then(|p| non_empty(unquote(p))),
        })
    }

    #[cfg(test)]
    pub(crate) const fn is_empty(&self) -> bool {
        self.user.is_none() && self.proxy_user.is_none() && self.password.is_none()
    }
}

/// Split a leading credential segment from `input`.
///
/// The `@` separating credentials from connect data is the last one before the
/// first `(` or `?`. Returns the credentials, the remaining connect string and
/// its byte offset within `input`.
pub(crate) fn split_credentials(input: &str) -> Result<(Credentials, &str, usize)> {
    let limit = input.find(['(', '?']).unwrap_or(input.len());
    match input[..limit].rfind('@') {
        Some(at) => {
            let credentials = Credentials::from_segment(&input[..at])?;
            Ok((credentials, &input[at + 1..], at + 1))
        }
        None => Ok((Credentials::default(), input, 0)),
    }
}

/// Split `name[proxy]` into the user name and the proxy user.
pub(crate) fn split_proxy_user(user: &str) -> Result<(Option<String>, Option<String>)> {
    let user = user.trim();
    let Some(open) = user.find('[') else {
        return Ok((non_empty(unquote(user)), None));
    };
    let Some(inner) = user[open + 1..].strip_suffix(']') else {
        return Err(ConnectParamsError::parse(
            open,
            format!("unterminated proxy user in \"{user}\""),
        ));
    };
    Ok((non_empty(unquote(&user[..open])), non_empty(inner)))
}

/// Split `user/password@connect_string`.
///
/// Without an `@`, a value holding a `/` and no other connect syntax is read
/// as `user/password`; anything else is returned as the connect string.
#[must_use]
pub fn parse_dsn_with_credentials(
    dsn: &str,
) -> (Option<String>, Option<String>, Option<String>) {
    let limit = dsn.find(['(', '?']).unwrap_or(dsn.len());
    let (credentials, connect_string) = match dsn[..limit].rfind('@') {
        Some(at) => (&dsn[..at], non_empty(&dsn[at + 1..])),
        None if is_bare_credentials(dsn) => (dsn, None),
        None => return (None, None, non_empty(dsn)),
    };
    let (user, password) = match credentials.split_once('/') {
        Some((user, password)) => (non_empty(user), non_empty(unquote(password))),
        None => (non_empty(credentials), None),
    };
    (user, password, connect_string)
}

fn is_bare_credentials(dsn: &str) -> bool {
    dsn.contains('/') && !dsn.contains("//") && !dsn.contains(['(', ':', '?', ','])
}

/// Strip one pair of surrounding double quotes.
pub(super) fn unquote(value: &str) -> &str {
    let value = value.trim();
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_credentials() {
        let (credentials, rest, offset) = split_credentials("dbhost:1521/svc").unwrap();
        assert!(credentials.is_empty());
        assert_eq!(rest, "dbhost:1521/svc");
        assert_eq!(offset, 0);
    }

    #[test]
    fn test_user_password_prefix() {
        let (credentials, rest, offset) = split_credentials("scott/tiger@dbhost/svc").unwrap();
        assert_eq!(credentials.user.as_deref(), Some("scott"));
        assert_eq!(credentials.password.as_deref(), Some("tiger"));
        assert!(credentials.proxy_user.is_none());
        assert_eq!(rest, "dbhost/svc");
        assert_eq!(offset, 12);
    }

    #[test]
    fn test_password_with_at_sign() {
        let (credentials, rest, _) = split_credentials("scott/p@ss@dbhost/svc").unwrap();
        assert_eq!(credentials.password.as_deref(), Some("p@ss"));
        assert_eq!(rest, "dbhost/svc");
    }

    #[test]
    fn test_quoted_password() {
        let (credentials, _, _) = split_credentials("scott/\"a/b\"@dbhost").unwrap();
        assert_eq!(credentials.password.as_deref(), Some("a/b"));
    }

    #[test]
    fn test_at_inside_descriptor_is_ignored() {
        let input = "(DESCRIPTION=(ADDRESS=(HOST=h@x)(PORT=1)))";
        let (credentials, rest, _) = split_credentials(input).unwrap();
        assert!(credentials.is_empty());
        assert_eq!(rest, input);
    }

    #[test]
    fn test_proxy_user() {
        let (credentials, _, _) = split_credentials("app[batch]/secret@dbhost").unwrap();
        assert_eq!(credentials.user.as_deref(), Some("app"));
        assert_eq!(credentials.proxy_user.as_deref(), Some("batch"));
    }

    #[test]
    fn test_unterminated_proxy_user() {
        let err = split_proxy_user("app[batch").unwrap_err();
        assert!(err.is_parse());
        assert_eq!(err.position(), Some(3));
    }

    #[test]
    fn test_missing_segments_are_none() {
        let (credentials, rest, _) = split_credentials("/@dbhost").unwrap();
        assert!(credentials.is_empty());
        assert_eq!(rest, "dbhost");
    }

    #[test]
    fn test_parse_dsn_with_credentials() {
        assert_eq!(
            parse_dsn_with_credentials("scott/tiger@dbhost/svc"),
            (
                Some("scott".to_string()),
                Some("tiger".to_string()),
                Some("dbhost/svc".to_string())
            )
        );
        assert_eq!(
            parse_dsn_with_credentials("scott/tiger"),
            (Some("scott".to_string()), Some("tiger".to_string()), None)
        );
        assert_eq!(
            parse_dsn_with_credentials("dbhost:1521/svc"),
            (None, None, Some("dbhost:1521/svc".to_string()))
        );
        assert_eq!(
            parse_dsn_with_credentials("scott@"),
            (Some("scott".to_string()), None, None)
        );
    }

    #[test]
    fn test_parse_dsn_with_at_inside_descriptor() {
        let descriptor = "(DESCRIPTION=(ADDRESS=(HOST=h))(CONNECT_DATA=(SERVICE_NAME=a@b)))";
        let (user, password, connect_string) =
            parse_dsn_with_credentials(&format!("scott/tiger@{descriptor}"));
        assert_eq!(user.as_deref(), Some("scott"));
        assert_eq!(password.as_deref(), Some("tiger"));
        assert_eq!(connect_string.as_deref(), Some(descriptor));

        let (user, _, connect_string) = parse_dsn_with_credentials(descriptor);
        assert!(user.is_none());
        assert_eq!(connect_string.as_deref(), Some(descriptor));
    }
}
