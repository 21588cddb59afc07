//! Frame envelope: `"OTMP" | kind (1) | u32 BE body length | body`.

use bm_relay::{Bytes, BytesMut};

use crate::{
    constants::{FRAME_HEADER_BYTES, FRAME_MAGIC},
    OTError,
};

/// Protocol message carried by a frame, in protocol order.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[repr(u8)]
pub enum MessageKind {
    Commitment = 1,
    Choice = 2,
    Payloads = 3,
}

impl TryFrom<u8> for MessageKind {
    type Error = OTError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(MessageKind::Commitment),
            2 => Ok(MessageKind::Choice),
            3 => Ok(MessageKind::Payloads),
            _ => Err(OTError::InvalidEncoding),
        }
    }
}

/// Wrap a message body into a frame.
pub fn encode_frame(kind: MessageKind, body: &[u8]) -> Result<Bytes, OTError> {
    let len = u32::try_from(body.len())
        .map_err(|_| OTError::MessageTooLarge(body.len()))?;

    let mut buf = BytesMut::with_capacity(FRAME_HEADER_BYTES + body.len());
    buf.extend_from_slice(&FRAME_MAGIC);
    buf.extend_from_slice(&[kind as u8]);
    buf.extend_from_slice(&len.to_be_bytes());
    buf.extend_from_slice(body);

    Ok(buf.freeze())
}

/// Validate the frame header and split off the body.
pub fn decode_frame(
    mut frame: BytesMut,
    max_len: usize,
) -> Result<(MessageKind, BytesMut), OTError> {
    if frame.len() < FRAME_HEADER_BYTES || frame[..4] != FRAME_MAGIC {
        return Err(OTError::InvalidEncoding);
    }

    let kind = MessageKind::try_from(frame[4])?;

    let mut len = [0u8; 4];
    len.copy_from_slice(&frame[5..FRAME_HEADER_BYTES]);
    let len = u32::from_be_bytes(len) as usize;

    if len > max_len || frame.len() != FRAME_HEADER_BYTES + len {
        return Err(OTError::InvalidEncoding);
    }

    let body = frame.split_off(FRAME_HEADER_BYTES);

    Ok((kind, body))
}

#[cfg(test)]
mod test {
    use super::*;

    fn frame(kind: MessageKind, body: &[u8]) -> BytesMut {
        BytesMut::from(&encode_frame(kind, body).unwrap()[..])
    }

    #[test]
    fn header_layout() {
        let f = frame(MessageKind::Choice, &[0xaa; 66]);

        assert_eq!(&f[..4], b"OTMP");
        assert_eq!(f[4], 2);
        assert_eq!(&f[5..9], &66u32.to_be_bytes());

        let (kind, body) = decode_frame(f, 1024).unwrap();
        assert_eq!(kind, MessageKind::Choice);
        assert_eq!(&body[..], &[0xaa; 66][..]);
    }

    #[test]
    fn rejects_bad_magic_kind_and_length() {
        let mut f = frame(MessageKind::Commitment, &[1; 33]);
        f[0] = b'X';
        assert!(decode_frame(f, 1024).is_err());

        let mut f = frame(MessageKind::Commitment, &[1; 33]);
        f[4] = 9;
        assert!(decode_frame(f, 1024).is_err());

        let mut f = frame(MessageKind::Commitment, &[1; 33]);
        f.truncate(20);
        assert!(decode_frame(f, 1024).is_err());

        let f = frame(MessageKind::Payloads, &[1; 200]);
        assert!(matches!(
            decode_frame(f, 100),
            Err(OTError::InvalidEncoding)
        ));

        assert!(decode_frame(BytesMut::from(&b"OTM"[..]), 1024).is_err());
    }
}
