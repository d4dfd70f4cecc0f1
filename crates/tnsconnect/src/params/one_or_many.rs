use serde::Serialize;

/// A value read back from one or more descriptions or addresses.
///
/// Accessors return [`Scalar`](Self::Scalar) when the topology has exactly
/// one element at the field's level and [`List`](Self::List) otherwise, in
/// description/address order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    Scalar(T),
    List(Vec<T>),
}

impl<T> OneOrMany<T> {
    /// Collapse a single-element vector into a scalar.
    #[must_use]
    pub fn from_vec(mut values: Vec<T>) -> Self {
        if values.len() == 1
            && let Some(value) = values.pop()
        {
            return Self::Scalar(value);
        }
        Self::List(values)
    }

    #[must_use]
    pub const fn is_scalar(&self) -> bool {
        matches!(self, Self::Scalar(_))
    }

    /// The value if there is exactly one.
    #[must_use]
    pub const fn as_scalar(&self) -> Option<&T> {
        match self {
            Self::Scalar(value) => Some(value),
            Self::List(_) => None,
        }
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        match self {
            Self::Scalar(_) => 1,
            Self::List(values) => values.len(),
        }
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn into_vec(self) -> Vec<T> {
        match self {
            Self::Scalar(value) => vec![value],
            Self::List(values) => values,
        }
    }
}
