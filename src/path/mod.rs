//! User-rooted path names.
//!
//! A path name has the form `user@domain/elem/elem`. The user component
//! identifies whose tree the path lives in and keys the proxied directory
//! registry.

#[cfg(test)]
mod path_test;

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

use crate::constants::ACCESS_FILE;
use crate::PathError;

/// Identity of the owner of a directory tree, e.g. `alice@example.com`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserName(String);

impl UserName {
    pub fn parse(name: &str) -> Result<Self, PathError> {
        let Some((local, domain)) = name.split_once('@') else {
            return Err(PathError::MissingAt(name.to_string()));
        };
        if local.is_empty() || domain.is_empty() || domain.contains('@') {
            return Err(PathError::BadUserName(name.to_string()));
        }
        Ok(UserName(name.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Root of this user's tree, `user@domain/`.
    pub fn root(&self) -> String {
        format!("{}/", self.0)
    }
}

impl fmt::Display for UserName {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedPath {
    user: UserName,
    elems: Vec<String>,
}

impl ParsedPath {
    pub fn user(&self) -> &UserName {
        &self.user
    }

    pub fn nelem(&self) -> usize {
        self.elems.len()
    }

    pub fn is_root(&self) -> bool {
        self.elems.is_empty()
    }

    pub fn last_elem(&self) -> Option<&str> {
        self.elems.last().map(String::as_str)
    }

    /// Drops up to `n` trailing elements. The user root is never dropped.
    pub fn drop_elems(
        &self,
        n: usize,
    ) -> ParsedPath {
        let keep = self.elems.len().saturating_sub(n);
        ParsedPath {
            user: self.user.clone(),
            elems: self.elems[..keep].to_vec(),
        }
    }

    /// Canonical string form.
    pub fn path(&self) -> String {
        if self.elems.is_empty() {
            return self.user.root();
        }
        format!("{}/{}", self.user, self.elems.join("/"))
    }
}

/// Parses `name` into its user and path elements.
///
/// Repeated slashes are collapsed; `.` and `..` elements are rejected.
pub fn parse(name: &str) -> Result<ParsedPath, PathError> {
    if name.is_empty() {
        return Err(PathError::Empty);
    }
    let (user, rest) = match name.split_once('/') {
        Some((user, rest)) => (user, rest),
        None => (name, ""),
    };
    let user = UserName::parse(user)?;

    let mut elems = Vec::new();
    for elem in rest.split('/').filter(|e| !e.is_empty()) {
        if elem == "." || elem == ".." {
            return Err(PathError::BadElement(name.to_string()));
        }
        elems.push(elem.to_string());
    }
    Ok(ParsedPath { user, elems })
}

/// Removes `n` trailing elements from `name`.
///
/// Returns `name` unchanged when it cannot be parsed.
pub fn drop_path(
    name: &str,
    n: usize,
) -> String {
    match parse(name) {
        Ok(parsed) => parsed.drop_elems(n).path(),
        Err(_) => name.to_string(),
    }
}

/// Whether `name` is an access control file.
pub fn is_access_file(name: &str) -> bool {
    parse(name)
        .map(|p| p.last_elem() == Some(ACCESS_FILE))
        .unwrap_or(false)
}
