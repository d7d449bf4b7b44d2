//! JSON pointers (RFC 6901) over `serde_json::Value` trees

use serde_json::Value;
use std::fmt;

/// A parsed pointer; tokens are stored unescaped
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct JsonPointer {
    tokens: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PointerError {
    /// The pointer text is malformed
    Invalid(String),
    /// The walk left the tree; carries the prefix that failed
    NotFound(String),
}

impl JsonPointer {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn from_tokens<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tokens: tokens.into_iter().map(Into::into).collect(),
        }
    }

    /// Parse pointer text such as `/components/schemas/Pet` or `` (the root)
    pub fn parse(text: &str) -> Result<Self, PointerError> {
        if text.is_empty() {
            return Ok(Self::root());
        }
        let Some(rest) = text.strip_prefix('/') else {
            return Err(PointerError::Invalid(format!(
                "pointer '{text}' must be empty or start with '/'"
            )));
        };

        let tokens = rest
            .split('/')
            .map(unescape)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { tokens })
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn is_root(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn child(&self, token: impl Into<String>) -> Self {
        let mut tokens = self.tokens.clone();
        tokens.push(token.into());
        Self { tokens }
    }

    pub fn starts_with(&self, other: &JsonPointer) -> bool {
        self.tokens.starts_with(&other.tokens)
    }

    /// Walk `root` and return the addressed node
    pub fn walk<'a>(&self, root: &'a Value) -> Result<&'a Value, PointerError> {
        let mut current = root;
        for (depth, token) in self.tokens.iter().enumerate() {
            current = match current {
                Value::Object(map) => map.get(token),
                Value::Array(items) => items.get(parse_index(token)?),
                _ => None,
            }
            .ok_or_else(|| PointerError::NotFound(self.prefix(depth + 1)))?;
        }
        Ok(current)
    }

    pub fn walk_mut<'a>(&self, root: &'a mut Value) -> Result<&'a mut Value, PointerError> {
        let mut current = root;
        for (depth, token) in self.tokens.iter().enumerate() {
            current = match current {
                Value::Object(map) => map.get_mut(token),
                Value::Array(items) => items.get_mut(parse_index(token)?),
                _ => None,
            }
            .ok_or_else(|| PointerError::NotFound(self.prefix(depth + 1)))?;
        }
        Ok(current)
    }

    fn prefix(&self, len: usize) -> String {
        Self::from_tokens(self.tokens[..len].iter().cloned()).to_string()
    }
}

impl fmt::Display for JsonPointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for token in &self.tokens {
            write!(f, "/{}", escape(token))?;
        }
        Ok(())
    }
}

pub fn escape(token: &str) -> String {
    token.replace('~', "~0").replace('/', "~1")
}

fn unescape(token: &str) -> Result<String, PointerError> {
    let mut out = String::with_capacity(token.len());
    let mut chars = token.chars();
    while let Some(c) = chars.next() {
        if c != '~' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('0') => out.push('~'),
            Some('1') => out.push('/'),
            other => {
                return Err(PointerError::Invalid(format!(
                    "invalid escape '~{}' in token '{token}'",
                    other.map(String::from).unwrap_or_default()
                )));
            }
        }
    }
    Ok(out)
}

fn parse_index(token: &str) -> Result<usize, PointerError> {
    let well_formed = !token.is_empty()
        && token.bytes().all(|b| b.is_ascii_digit())
        && (token == "0" || !token.starts_with('0'));
    if !well_formed {
        return Err(PointerError::Invalid(format!(
            "'{token}' is not a valid array index"
        )));
    }
    token
        .parse()
        .map_err(|_| PointerError::Invalid(format!("array index '{token}' is too large")))
}
