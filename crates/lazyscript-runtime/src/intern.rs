//! Canonical byte strings.
//!
//! Every identifier, constructor tag and string literal the runtime touches
//! goes through an [`Interner`], so two [`IStr`]s with equal content share one
//! allocation and compare by pointer.

use ahash::AHashMap;
use std::borrow::Cow;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

struct Interned {
    bytes: Box<[u8]>,
    hash: u32,
}

#[derive(Clone)]
pub struct IStr(Rc<Interned>);

/// Rolling 31-multiplier hash over raw bytes.
pub fn str_hash(bytes: &[u8]) -> u32 {
    bytes.iter().fold(0u32, |h, &b| h.wrapping_mul(31).wrapping_add(u32::from(b)))
}

impl IStr {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0.bytes
    }
    pub fn len(&self) -> usize {
        self.0.bytes.len()
    }
    pub fn is_empty(&self) -> bool {
        self.0.bytes.is_empty()
    }
    pub fn hash_value(&self) -> u32 {
        self.0.hash
    }
    pub fn as_str_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.0.bytes)
    }
    pub fn ptr_eq(&self, other: &IStr) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl PartialEq for IStr {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}
impl Eq for IStr {}

impl PartialEq<str> for IStr {
    fn eq(&self, other: &str) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}
impl PartialEq<&str> for IStr {
    fn eq(&self, other: &&str) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl Hash for IStr {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u32(self.0.hash);
    }
}

impl fmt::Debug for IStr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.as_str_lossy())
    }
}

impl fmt::Display for IStr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_str_lossy())
    }
}

#[derive(Default)]
pub struct Interner {
    table: AHashMap<Box<[u8]>, IStr>,
}

impl Interner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn intern<S: AsRef<[u8]>>(&mut self, s: S) -> IStr {
        let key = s.as_ref();
        if let Some(hit) = self.table.get(key) {
            return hit.clone();
        }
        let bytes: Box<[u8]> = key.into();
        let istr = IStr(Rc::new(Interned { hash: str_hash(&bytes), bytes: bytes.clone() }));
        self.table.insert(bytes, istr.clone());
        istr
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

impl fmt::Debug for Interner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Interner").field("len", &self.table.len()).finish()
    }
}
