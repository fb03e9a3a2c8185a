/*
 * This Source Code Form is subject to the terms of the
 * Mozilla Public License, v. 2.0. If a copy of the MPL
 * was not distributed with this file, You can obtain one at http://mozilla.org/MPL/2.0/.
 */

use std::borrow::Cow;

use super::{
    decode::decode_bytes,
    error::ReadResult as Result,
    private::Sealed,
    Read,
};
use crate::{
    queue::Queue,
    scanner::{entry::TokenEntry, Scanner},
    token::StreamEncoding,
};

/// An in memory byte source.
///
/// Construction from a str is free; construction from
/// bytes sniffs the byte order mark and transcodes UTF-16
/// input into an internal buffer, after which scanning
/// borrows from this reader rather than the original
/// slice.
#[derive(Debug, Clone)]
pub struct SliceRead<'de>
{
    data:     Cow<'de, str>,
    encoding: StreamEncoding,
}

impl<'de> SliceRead<'de>
{
    /// Construct a reader over UTF-8 text
    pub fn new(data: &'de str) -> Self
    {
        Self {
            data:     Cow::Borrowed(data),
            encoding: StreamEncoding::UTF8,
        }
    }

    /// Construct a reader over raw bytes, detecting the
    /// encoding from any byte order mark present
    pub fn from_bytes(data: &'de [u8]) -> crate::error::Result<Self>
    {
        let (data, encoding) = decode_bytes(data)?;

        Ok(Self { data, encoding })
    }

    /// The encoding detected for this stream
    pub fn encoding(&self) -> StreamEncoding
    {
        self.encoding
    }

    pub(crate) fn data(&self) -> &str
    {
        &self.data
    }
}

impl<'a> Read for SliceRead<'a>
{
    fn drive<'de>(
        &'de self,
        scanner: &mut Scanner,
        queue: &mut Queue<TokenEntry<'de>>,
    ) -> Result<()>
    {
        super::drive_scanner(self.data(), scanner, queue)
    }
}

impl Sealed for SliceRead<'_> {}

#[cfg(test)]
mod tests
{
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::token::{Marker, StreamEncoding};

    #[test]
    fn scans_borrowed_text()
    {
        let src = SliceRead::new("key: value\n");
        let mut scanner = Scanner::new();
        let mut queue = Queue::new();

        while !scanner.is_done()
        {
            src.drive(&mut scanner, &mut queue).unwrap();
        }

        let markers: Vec<_> = std::iter::from_fn(|| queue.pop())
            .map(|entry| entry.marker())
            .collect();

        assert_eq!(
            markers,
            vec![
                Marker::StreamStart,
                Marker::BlockMappingStart,
                Marker::Key,
                Marker::Scalar,
                Marker::Value,
                Marker::Scalar,
                Marker::BlockEnd,
                Marker::StreamEnd,
            ]
        );
    }

    #[test]
    fn from_bytes_detects_utf16()
    {
        let mut bytes = vec![0xFF, 0xFE];
        for unit in "a: 1\n".encode_utf16()
        {
            bytes.extend_from_slice(&unit.to_le_bytes());
        }

        let src = SliceRead::from_bytes(&bytes).unwrap();

        assert_eq!(src.encoding(), StreamEncoding::UTF16LE);
        assert_eq!(src.data(), "a: 1\n");
    }
}
