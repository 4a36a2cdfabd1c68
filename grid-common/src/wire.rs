// Copyright 2026 grid Project Authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Wire primitives.
//!
//! - Unsigned integers are written as little-endian base-128 groups, 7 bits per byte, with the high bit set on every
//!   byte but the last. A `u32` takes 1 to 5 bytes.
//! - Text is written as a 2-byte big-endian byte length followed by the UTF-8 bytes.

use bytes::{Buf, BufMut};

use crate::error::{Error, ErrorKind, Result};

/// Max encoded size of a `u32` varint.
pub const MAX_VARINT_U32_LEN: usize = 5;

/// Max byte length of a text entry.
pub const MAX_TEXT_LEN: usize = u16::MAX as usize;

/// Write `v` as an unsigned varint.
pub fn put_varint_u32(buf: &mut impl BufMut, mut v: u32) {
    while v & !0x7f != 0 {
        buf.put_u8((v & 0x7f) as u8 | 0x80);
        v >>= 7;
    }
    buf.put_u8(v as u8);
}

/// Read an unsigned varint written by [`put_varint_u32`].
pub fn get_varint_u32(buf: &mut impl Buf) -> Result<u32> {
    let mut v: u32 = 0;
    for i in 0..MAX_VARINT_U32_LEN {
        if !buf.has_remaining() {
            return Err(Error::truncated("varint", i + 1, i));
        }
        let b = buf.get_u8();
        let shift = 7 * i as u32;
        // The fifth byte may only carry the 4 remaining bits.
        if i == MAX_VARINT_U32_LEN - 1 && b & 0xf0 != 0 {
            return Err(Error::new(ErrorKind::Decode, "varint overflows u32").with_context("last byte", b));
        }
        v |= ((b & 0x7f) as u32) << shift;
        if b & 0x80 == 0 {
            return Ok(v);
        }
    }
    unreachable!("the fifth varint byte either terminates or fails the overflow check")
}

/// Encoded size of `v` as an unsigned varint.
pub fn varint_u32_len(v: u32) -> usize {
    match v {
        0..=0x7f => 1,
        0x80..=0x3fff => 2,
        0x4000..=0x1f_ffff => 3,
        0x20_0000..=0xfff_ffff => 4,
        _ => 5,
    }
}

/// Write `text` with its length prefix.
pub fn put_text(buf: &mut impl BufMut, text: &str) -> Result<()> {
    if text.len() > MAX_TEXT_LEN {
        return Err(Error::new(ErrorKind::Encode, "text is too long for its length prefix")
            .with_context("len", text.len())
            .with_context("max", MAX_TEXT_LEN));
    }
    buf.put_u16(text.len() as u16);
    buf.put_slice(text.as_bytes());
    Ok(())
}

/// Read a text entry written by [`put_text`].
pub fn get_text(buf: &mut impl Buf) -> Result<String> {
    if buf.remaining() < 2 {
        return Err(Error::truncated("text length", 2, buf.remaining()));
    }
    let len = buf.get_u16() as usize;
    if buf.remaining() < len {
        return Err(Error::truncated("text bytes", len, buf.remaining()));
    }
    let mut bytes = vec![0; len];
    buf.copy_to_slice(&mut bytes);
    String::from_utf8(bytes).map_err(|e| Error::new(ErrorKind::Decode, "text is not valid UTF-8").with_source(e))
}

/// Encoded size of `text` with its length prefix.
pub fn text_len(text: &str) -> usize {
    2 + text.len()
}

#[cfg(test)]
mod tests {
    use itertools::Itertools;

    use super::*;

    #[test]
    fn test_varint_layout() {
        let cases: [(u32, &[u8]); 6] = [
            (0, &[0x00]),
            (1, &[0x01]),
            (127, &[0x7f]),
            (128, &[0x80, 0x01]),
            (300, &[0xac, 0x02]),
            (u32::MAX, &[0xff, 0xff, 0xff, 0xff, 0x0f]),
        ];
        for (v, expected) in cases {
            let mut buf: Vec<u8> = vec![];
            put_varint_u32(&mut buf, v);
            assert_eq!(buf, expected, "encoding {v}");
            assert_eq!(varint_u32_len(v), expected.len());
            assert_eq!(get_varint_u32(&mut &buf[..]).unwrap(), v);
        }
    }

    #[test]
    fn test_varint_malformed() {
        let err = get_varint_u32(&mut &[0x80u8, 0x80][..]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Decode);

        let err = get_varint_u32(&mut &[0xffu8, 0xff, 0xff, 0xff, 0x1f][..]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Decode);

        let err = get_varint_u32(&mut &[0u8; 0][..]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Decode);
    }

    #[test]
    fn test_text() {
        let mut buf: Vec<u8> = vec![];
        put_text(&mut buf, "segments_1").unwrap();
        put_text(&mut buf, "").unwrap();
        put_text(&mut buf, "índice").unwrap();
        assert_eq!(&buf[..2], &[0x00u8, 0x0a]);
        assert_eq!(buf.len(), ["segments_1", "", "índice"].iter().map(|s| text_len(s)).sum::<usize>());

        let mut slice = &buf[..];
        let decoded = (0..3).map(|_| get_text(&mut slice).unwrap()).collect_vec();
        assert_eq!(decoded, vec!["segments_1", "", "índice"]);
        assert!(slice.is_empty());
    }

    #[test]
    fn test_text_malformed() {
        let mut buf: Vec<u8> = vec![];
        put_text(&mut buf, "a.txt").unwrap();
        let err = get_text(&mut &buf[..4]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Decode);

        let err = get_text(&mut &[0x00u8, 0x02, 0xc3, 0x28][..]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Decode);

        let long = "x".repeat(MAX_TEXT_LEN + 1);
        let err = put_text(&mut Vec::<u8>::new(), &long).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Encode);
    }
}
