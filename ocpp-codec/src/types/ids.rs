//! Identifiers and routing values of the overlay network.

use std::fmt;

use uuid::Uuid;

use crate::error::ParseError;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(String);

        impl $name {
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = ParseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let s = s.trim();
                if s.is_empty() {
                    return Err(ParseError::constraint(concat!(
                        stringify!($name),
                        " must not be empty"
                    )));
                }
                Ok(Self(s.to_string()))
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }
    };
}

string_id! {
    /// Correlates a request with its response or error.
    RequestId
}

string_id! {
    /// Observability correlation id, independent of `RequestId`.
    EventTrackingId
}

string_id! {
    /// Charging station, local controller or CSMS on the overlay network.
    NetworkingNodeId
}

impl RequestId {
    /// Fresh random id (UUID v4).
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl EventTrackingId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

/// Where a message is going.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Destination {
    /// Single node; intermediate hops decide the route.
    Node(NetworkingNodeId),
    /// Full source route, first hop first.
    Route(Vec<NetworkingNodeId>),
}

impl Destination {
    /// Final recipient.
    pub fn target(&self) -> Option<&NetworkingNodeId> {
        match self {
            Destination::Node(node) => Some(node),
            Destination::Route(hops) => hops.last(),
        }
    }

    /// Next hop to forward to.
    pub fn next_hop(&self) -> Option<&NetworkingNodeId> {
        match self {
            Destination::Node(node) => Some(node),
            Destination::Route(hops) => hops.first(),
        }
    }
}

impl From<NetworkingNodeId> for Destination {
    fn from(node: NetworkingNodeId) -> Self {
        Destination::Node(node)
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Destination::Node(node) => write!(f, "{}", node),
            Destination::Route(hops) => {
                let hops: Vec<&str> = hops.iter().map(|h| h.as_str()).collect();
                write!(f, "{}", hops.join(" -> "))
            }
        }
    }
}

/// Hops a message actually traversed, oldest first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct NetworkPath(Vec<NetworkingNodeId>);

impl NetworkPath {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_hops(hops: impl IntoIterator<Item = NetworkingNodeId>) -> Self {
        Self(hops.into_iter().collect())
    }

    /// New path with `hop` appended.
    pub fn append(&self, hop: NetworkingNodeId) -> Self {
        let mut hops = self.0.clone();
        hops.push(hop);
        Self(hops)
    }

    pub fn hops(&self) -> &[NetworkingNodeId] {
        &self.0
    }

    /// Originating node.
    pub fn source(&self) -> Option<&NetworkingNodeId> {
        self.0.first()
    }

    /// Node the message arrived from.
    pub fn last(&self) -> Option<&NetworkingNodeId> {
        self.0.last()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
