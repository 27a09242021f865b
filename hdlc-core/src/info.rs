//! Information field payload contract

use bytes::Bytes;
use std::borrow::Cow;

/// Anything that can occupy the information field of an HDLC frame
///
/// Raw octet containers borrow their contents; structured payloads such as
/// negotiation parameter groups encode on demand.
pub trait Information {
    /// Octets placed into the information field
    fn as_bytes(&self) -> Cow<'_, [u8]>;

    /// Number of octets in the information field
    fn len(&self) -> usize {
        self.as_bytes().len()
    }

    /// `true` when the frame carries no information field (and therefore no HCS)
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Information for [u8] {
    fn as_bytes(&self) -> Cow<'_, [u8]> {
        Cow::Borrowed(self)
    }

    fn len(&self) -> usize {
        <[u8]>::len(self)
    }
}

impl<const N: usize> Information for [u8; N] {
    fn as_bytes(&self) -> Cow<'_, [u8]> {
        Cow::Borrowed(self.as_slice())
    }

    fn len(&self) -> usize {
        N
    }
}

impl Information for Vec<u8> {
    fn as_bytes(&self) -> Cow<'_, [u8]> {
        Cow::Borrowed(self.as_slice())
    }

    fn len(&self) -> usize {
        Vec::len(self)
    }
}

impl Information for Bytes {
    fn as_bytes(&self) -> Cow<'_, [u8]> {
        Cow::Borrowed(self.as_ref())
    }

    fn len(&self) -> usize {
        Bytes::len(self)
    }
}

impl<T: Information + ?Sized> Information for &T {
    fn as_bytes(&self) -> Cow<'_, [u8]> {
        (**self).as_bytes()
    }

    fn len(&self) -> usize {
        (**self).len()
    }
}
