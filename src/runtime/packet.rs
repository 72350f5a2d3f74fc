//! Packets: the values that travel over connections.
//!
//! The runtime never inspects a packet. The common scalar shapes get their
//! own variants so components can exchange them without downcasting; anything
//! else rides in `Packet::Opaque` behind an `Arc`.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// A value carried by a connection.
#[derive(Clone)]
pub enum Packet {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Bytes(Vec<u8>),
    List(Vec<Packet>),
    /// Any other `Send + Sync` value. Equality is pointer identity.
    Opaque(Arc<dyn Any + Send + Sync>),
}

impl Packet {
    /// Wrap an arbitrary value.
    pub fn opaque<T: Any + Send + Sync>(value: T) -> Self {
        Packet::Opaque(Arc::new(value))
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Packet::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Packet::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Packet::Float(v) => Some(*v),
            Packet::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Packet::String(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Packet::Bytes(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Packet]> {
        match self {
            Packet::List(v) => Some(v),
            _ => None,
        }
    }

    /// Borrow the inner value of an opaque packet as `T`.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        match self {
            Packet::Opaque(v) => v.downcast_ref::<T>(),
            _ => None,
        }
    }
}

impl fmt::Debug for Packet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Packet::Bool(v) => write!(f, "Bool({})", v),
            Packet::Int(v) => write!(f, "Int({})", v),
            Packet::Float(v) => write!(f, "Float({})", v),
            Packet::String(v) => write!(f, "String({:?})", v),
            Packet::Bytes(v) => write!(f, "Bytes(len={})", v.len()),
            Packet::List(v) => f.debug_tuple("List").field(v).finish(),
            Packet::Opaque(_) => write!(f, "Opaque(..)"),
        }
    }
}

impl PartialEq for Packet {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Packet::Bool(a), Packet::Bool(b)) => a == b,
            (Packet::Int(a), Packet::Int(b)) => a == b,
            (Packet::Float(a), Packet::Float(b)) => a == b,
            (Packet::String(a), Packet::String(b)) => a == b,
            (Packet::Bytes(a), Packet::Bytes(b)) => a == b,
            (Packet::List(a), Packet::List(b)) => a == b,
            (Packet::Opaque(a), Packet::Opaque(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl From<bool> for Packet {
    fn from(v: bool) -> Self {
        Packet::Bool(v)
    }
}

impl From<i64> for Packet {
    fn from(v: i64) -> Self {
        Packet::Int(v)
    }
}

impl From<i32> for Packet {
    fn from(v: i32) -> Self {
        Packet::Int(v as i64)
    }
}

impl From<f64> for Packet {
    fn from(v: f64) -> Self {
        Packet::Float(v)
    }
}

impl From<&str> for Packet {
    fn from(v: &str) -> Self {
        Packet::String(v.to_string())
    }
}

impl From<String> for Packet {
    fn from(v: String) -> Self {
        Packet::String(v)
    }
}

impl From<Vec<u8>> for Packet {
    fn from(v: Vec<u8>) -> Self {
        Packet::Bytes(v)
    }
}

impl From<Vec<Packet>> for Packet {
    fn from(v: Vec<Packet>) -> Self {
        Packet::List(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[allow(clippy::approx_constant)] // Intentionally using 3.14 as test value, not PI
    fn test_packet_accessors() {
        assert_eq!(Packet::Bool(true).as_bool(), Some(true));
        assert_eq!(Packet::Int(42).as_int(), Some(42));
        assert_eq!(Packet::Float(3.14).as_float(), Some(3.14));
        assert_eq!(Packet::Int(2).as_float(), Some(2.0));
        assert_eq!(Packet::from("go").as_str(), Some("go"));
        assert_eq!(Packet::from(vec![1u8, 2]).as_bytes(), Some(&[1u8, 2][..]));
        assert_eq!(Packet::Int(1).as_str(), None);
    }

    #[test]
    fn test_opaque_equality_is_identity() {
        let a = Packet::opaque(vec![1, 2, 3]);
        let b = a.clone();
        let c = Packet::opaque(vec![1, 2, 3]);
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.downcast_ref::<Vec<i32>>(), Some(&vec![1, 2, 3]));
        assert!(a.downcast_ref::<String>().is_none());
    }

    #[test]
    fn test_list_packet() {
        let list = Packet::from(vec![Packet::Int(1), Packet::from("x")]);
        assert_eq!(list.as_list().map(|l| l.len()), Some(2));
        assert_eq!(format!("{:?}", list), "List([Int(1), String(\"x\")])");
    }
}
