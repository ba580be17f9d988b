use std::fmt;

use serde::Deserialize;
use serde::Serialize;

use crate::WatchError;

/// How a directory server is reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Transport {
    Unassigned,
    InProcess,
    Remote,
}

impl fmt::Display for Transport {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let s = match self {
            Transport::Unassigned => "unassigned",
            Transport::InProcess => "inprocess",
            Transport::Remote => "remote",
        };
        f.write_str(s)
    }
}

/// Address of a directory server. Two endpoints that differ are different
/// watch targets.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Endpoint {
    pub transport: Transport,
    pub net_addr: String,
}

impl Endpoint {
    pub fn remote(net_addr: impl Into<String>) -> Self {
        Endpoint {
            transport: Transport::Remote,
            net_addr: net_addr.into(),
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "{},{}", self.transport, self.net_addr)
    }
}

/// Directory entry as delivered by the directory server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirEntry {
    pub name: String,
    pub is_dir: bool,
    /// Server-assigned sequence number of this version of the entry.
    pub sequence: i64,
}

impl DirEntry {
    pub fn new(name: impl Into<String>) -> Self {
        DirEntry {
            name: name.into(),
            is_dir: false,
            sequence: 0,
        }
    }
}

/// One change reported by a directory server watch.
///
/// An event carrying an `error` ends the session that received it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub entry: DirEntry,
    pub order: i64,
    pub delete: bool,
    pub error: Option<WatchError>,
}

impl Event {
    pub fn put(
        entry: DirEntry,
        order: i64,
    ) -> Self {
        Event {
            entry,
            order,
            delete: false,
            error: None,
        }
    }

    pub fn delete(
        entry: DirEntry,
        order: i64,
    ) -> Self {
        Event {
            entry,
            order,
            delete: true,
            error: None,
        }
    }

    pub fn error(error: WatchError) -> Self {
        Event {
            entry: DirEntry::new(""),
            order: 0,
            delete: false,
            error: Some(error),
        }
    }
}
