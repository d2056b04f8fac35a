//! The codec service: a message container driving the streaming decoder,
//! and the encode facade producing canonical DER.

use std::sync::Arc;

use crate::ber::{BerEncoder, DecoderOptions, Identifier, TlvHeader, TlvScanner};
use crate::controls::{Control, ControlRegistry, ControlValue};
use crate::error::{DecodeError, EncodeError};
use crate::grammar::{transitions, Kind, MessageBuilder, PrimitiveAction, State, StructAction};
use crate::messages::LdapMessage;
use crate::tag::Tag;

/// The result of feeding one chunk to a container.
#[derive(Debug, PartialEq)]
pub enum DecodeOutcome {
    /// The chunk was consumed entirely without completing a PDU; feed more.
    NeedMoreInput,
    /// A PDU completed after `consumed` bytes of the chunk. The rest of the
    /// chunk belongs to the next PDU; the container is ready for it.
    Message {
        message: LdapMessage,
        consumed: usize,
    },
}

/// An open constructed value on the TLV stack.
struct Frame {
    /// Content bytes this structure still owns.
    remaining: u32,
    /// Grammar state entered once the structure ends.
    resume: State,
    exit: Option<StructAction>,
}

/// What the container does with the bytes currently arriving.
enum Pending {
    /// Assembling a tag + length header in the scanner.
    Header,
    /// Buffering a primitive payload for `action`.
    Primitive {
        action: PrimitiveAction,
        buf: Vec<u8>,
        remaining: u32,
    },
    /// Capturing a whole TLV (header already buffered) for `action`.
    Subtree {
        action: PrimitiveAction,
        buf: Vec<u8>,
        remaining: u32,
    },
}

/// The decoding state of one message stream.
///
/// One container is owned by one stream; feed it chunks as they arrive.
/// Any decode error poisons the container: further calls return
/// [`DecodeError::Poisoned`] until [`MessageContainer::reset`].
pub struct MessageContainer {
    options: DecoderOptions,
    scanner: TlvScanner,
    frames: Vec<Frame>,
    state: State,
    builder: MessageBuilder,
    pending: Pending,
    poisoned: bool,
}

impl MessageContainer {
    pub fn new(registry: Arc<ControlRegistry>, options: DecoderOptions) -> Self {
        Self {
            options,
            scanner: TlvScanner::new(&options),
            frames: Vec::new(),
            state: State::Start,
            builder: MessageBuilder::new(registry),
            pending: Pending::Header,
            poisoned: false,
        }
    }

    pub fn is_poisoned(&self) -> bool {
        self.poisoned
    }

    /// Discards all partial state, keeping the configured limits and
    /// registry. The next chunk starts a fresh PDU.
    pub fn reset(&mut self) {
        self.scanner.reset();
        self.frames.clear();
        self.state = State::Start;
        self.builder.reset();
        self.pending = Pending::Header;
        self.poisoned = false;
    }

    /// Consumes a prefix of `input`, resuming exactly where the previous
    /// chunk stopped, even mid-tag or mid-length.
    pub fn decode(&mut self, input: &[u8]) -> Result<DecodeOutcome, DecodeError> {
        if self.poisoned {
            return Err(DecodeError::Poisoned);
        }
        match self.decode_inner(input) {
            Ok(outcome) => Ok(outcome),
            Err(error) => {
                log::debug!("poisoning decoder container: {error}");
                self.poisoned = true;
                Err(error)
            }
        }
    }

    fn decode_inner(&mut self, input: &[u8]) -> Result<DecodeOutcome, DecodeError> {
        let mut pos = 0;
        loop {
            match core::mem::replace(&mut self.pending, Pending::Header) {
                Pending::Header => match self.scanner.scan(input, &mut pos)? {
                    None => return Ok(DecodeOutcome::NeedMoreInput),
                    Some(header) => self.dispatch(header)?,
                },
                Pending::Primitive {
                    action,
                    mut buf,
                    mut remaining,
                } => {
                    let take = (remaining as usize).min(input.len() - pos);
                    buf.extend_from_slice(&input[pos..pos + take]);
                    pos += take;
                    remaining -= take as u32;
                    if remaining != 0 {
                        self.pending = Pending::Primitive {
                            action,
                            buf,
                            remaining,
                        };
                        return Ok(DecodeOutcome::NeedMoreInput);
                    }
                    action(&mut self.builder, &buf)?;
                    self.after_value()?;
                }
                Pending::Subtree {
                    action,
                    mut buf,
                    mut remaining,
                } => {
                    let take = (remaining as usize).min(input.len() - pos);
                    buf.extend_from_slice(&input[pos..pos + take]);
                    pos += take;
                    remaining -= take as u32;
                    if remaining != 0 {
                        self.pending = Pending::Subtree {
                            action,
                            buf,
                            remaining,
                        };
                        return Ok(DecodeOutcome::NeedMoreInput);
                    }
                    action(&mut self.builder, &buf)?;
                    self.after_value()?;
                }
            }

            if self.frames.is_empty() && self.state == State::Done {
                let message = self.builder.take_message()?;
                self.state = State::Start;
                self.pending = Pending::Header;
                self.scanner.reset();
                return Ok(DecodeOutcome::Message {
                    message,
                    consumed: pos,
                });
            }
        }
    }

    /// Routes one completed header through the grammar.
    fn dispatch(&mut self, header: TlvHeader) -> Result<(), DecodeError> {
        let total = header.header_len as u64 + u64::from(header.length);

        // a child must fit its parent entirely
        if let Some(frame) = self.frames.last() {
            let remaining = u64::from(frame.remaining);
            if (header.tag_len as u64) > remaining {
                return Err(DecodeError::TruncatedTag);
            }
            if (header.header_len as u64) > remaining {
                return Err(DecodeError::TruncatedLength);
            }
            if total > remaining {
                return Err(DecodeError::ChildOverrunsParent);
            }
        }

        let octet = header.initial_octet();
        let rows = transitions(self.state);
        let Some(transition) = rows.iter().find(|t| t.tag == octet) else {
            if self.state == State::ProtocolOp && header.id.tag.class.is_application() {
                return Err(DecodeError::UnknownOperationTag { tag: octet });
            }
            if rows.is_empty() {
                let remaining = self.frames.last().map(|f| f.remaining).unwrap_or(0);
                return Err(DecodeError::TrailingBytesInStructure { remaining });
            }
            return Err(DecodeError::grammar(self.state.name(), octet));
        };

        if let Some(frame) = self.frames.last_mut() {
            frame.remaining -= total as u32;
        }

        match &transition.kind {
            Kind::Primitive(action) => {
                if header.id.is_constructed() {
                    return Err(DecodeError::grammar(self.state.name(), octet));
                }
                self.state = transition.next;
                if header.length == 0 {
                    action(&mut self.builder, &[])?;
                    self.after_value()?;
                } else {
                    self.pending = Pending::Primitive {
                        action: *action,
                        buf: Vec::with_capacity(header.length as usize),
                        remaining: header.length,
                    };
                }
            }
            Kind::Subtree(action) => {
                self.state = transition.next;
                if header.length == 0 {
                    action(&mut self.builder, &header.raw)?;
                    self.after_value()?;
                } else {
                    let mut buf =
                        Vec::with_capacity(header.header_len + header.length as usize);
                    buf.extend_from_slice(&header.raw);
                    self.pending = Pending::Subtree {
                        action: *action,
                        buf,
                        remaining: header.length,
                    };
                }
            }
            Kind::Constructed {
                resume,
                enter,
                exit,
            } => {
                if header.id.is_primitive() {
                    return Err(DecodeError::grammar(self.state.name(), octet));
                }
                if self.frames.len() >= self.options.max_depth() {
                    return Err(DecodeError::LimitExceeded {
                        what: "nesting depth",
                        value: self.frames.len() as u64 + 1,
                        limit: self.options.max_depth() as u64,
                    });
                }
                if let Some(enter) = enter {
                    enter(&mut self.builder)?;
                }
                self.frames.push(Frame {
                    remaining: header.length,
                    resume: *resume,
                    exit: *exit,
                });
                self.state = transition.next;
                self.after_value()?;
            }
        }

        Ok(())
    }

    /// Pops every frame whose length is exhausted, running exit hooks and
    /// resuming the enclosing grammar states.
    fn after_value(&mut self) -> Result<(), DecodeError> {
        while let Some(frame) = self.frames.last() {
            if frame.remaining != 0 {
                break;
            }
            if !self.state.end_allowed() {
                return Err(DecodeError::UnexpectedEndOfInput);
            }
            let frame = self.frames.pop().expect("frame checked above");
            if let Some(exit) = frame.exit {
                exit(&mut self.builder)?;
            }
            self.state = frame.resume;
        }
        Ok(())
    }
}

/// The codec facade: holds the control registry and the decoder limits,
/// hands out containers, and encodes messages.
///
/// There is no process-global instance; create one and share it.
pub struct LdapCodec {
    registry: Arc<ControlRegistry>,
    options: DecoderOptions,
}

impl LdapCodec {
    /// A codec with the built-in control factories and default limits.
    pub fn new() -> Self {
        Self::with_registry(ControlRegistry::with_builtins())
    }

    pub fn with_registry(registry: ControlRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
            options: DecoderOptions::new(),
        }
    }

    #[must_use]
    pub fn with_options(mut self, options: DecoderOptions) -> Self {
        self.options = options;
        self
    }

    pub fn registry(&self) -> &ControlRegistry {
        &self.registry
    }

    pub fn options(&self) -> DecoderOptions {
        self.options
    }

    /// Drops every control factory. Controls decode raw from here on.
    pub fn teardown(&mut self) {
        self.registry = Arc::new(ControlRegistry::empty());
    }

    /// A fresh container for one message stream.
    pub fn new_container(&self) -> MessageContainer {
        MessageContainer::new(self.registry.clone(), self.options)
    }

    /// Feeds a chunk to `container`.
    pub fn decode(
        &self,
        input: &[u8],
        container: &mut MessageContainer,
    ) -> Result<DecodeOutcome, DecodeError> {
        container.decode(input)
    }

    /// Decodes a buffer holding exactly one complete PDU.
    pub fn decode_message(&self, input: &[u8]) -> Result<LdapMessage, DecodeError> {
        let mut container = self.new_container();
        match container.decode(input)? {
            DecodeOutcome::Message { message, consumed } => {
                if consumed != input.len() {
                    return Err(DecodeError::TrailingBytesInStructure {
                        remaining: (input.len() - consumed) as u32,
                    });
                }
                Ok(message)
            }
            DecodeOutcome::NeedMoreInput => Err(DecodeError::UnexpectedEndOfInput),
        }
    }

    /// Encodes a message to canonical DER.
    pub fn encode(&self, message: &LdapMessage) -> Result<Vec<u8>, EncodeError> {
        let mut enc = BerEncoder::new();
        let mark = enc.pos();

        if !message.controls.is_empty() {
            let controls_mark = enc.pos();
            for control in message.controls.iter().rev() {
                self.encode_control(&mut enc, control, message.op.is_request())?;
            }
            enc.finish(Identifier::constructed(Tag::context(0)), controls_mark);
        }

        message.op.encode(&mut enc)?;
        enc.integer(
            Identifier::primitive(Tag::INTEGER),
            i64::from(message.message_id),
        );
        enc.finish(Identifier::constructed(Tag::SEQUENCE), mark);
        Ok(enc.into_bytes())
    }

    fn encode_control(
        &self,
        enc: &mut BerEncoder,
        control: &Control,
        is_request: bool,
    ) -> Result<(), EncodeError> {
        let mark = enc.pos();
        match &control.value {
            ControlValue::Absent => {}
            ControlValue::Raw(bytes) => {
                enc.octet_string(Identifier::primitive(Tag::OCTET_STRING), bytes);
            }
            _ => {
                let factory = self.registry.factory(&control.oid, is_request).ok_or(
                    EncodeError::UnsupportedVariant {
                        what: "typed control without a registered factory",
                    },
                )?;
                if factory.has_value(control) {
                    let value_mark = enc.pos();
                    factory.encode_value(enc, control)?;
                    enc.finish(Identifier::primitive(Tag::OCTET_STRING), value_mark);
                }
            }
        }
        if control.criticality {
            enc.boolean(Identifier::primitive(Tag::BOOL), true);
        }
        enc.octet_string(Identifier::primitive(Tag::OCTET_STRING), control.oid.as_bytes());
        enc.finish(Identifier::constructed(Tag::SEQUENCE), mark);
        Ok(())
    }
}

impl Default for LdapCodec {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messages::{ProtocolOp, ResultCode};
    use hex_literal::hex;
    use pretty_assertions::assert_eq;

    const BIND_RESPONSE_SUCCESS: [u8; 14] = hex!("30 0c 02 01 01 61 07 0a 01 00 04 00 04 00");

    #[test]
    fn empty_bind_response() {
        let codec = LdapCodec::new();
        let message = codec.decode_message(&BIND_RESPONSE_SUCCESS).unwrap();
        assert_eq!(message.message_id, 1);
        let ProtocolOp::BindResponse(response) = &message.op else {
            panic!("wrong op: {:?}", message.op);
        };
        assert_eq!(response.result.result_code, ResultCode::SUCCESS);
        assert_eq!(response.result.matched_dn, "");
        assert_eq!(response.result.diagnostic_message, "");
        assert_eq!(response.server_sasl_creds, None);

        assert_eq!(codec.encode(&message).unwrap(), BIND_RESPONSE_SUCCESS);
    }

    #[test]
    fn container_resumes_across_chunks() {
        let codec = LdapCodec::new();
        let mut container = codec.new_container();
        let (head, tail) = BIND_RESPONSE_SUCCESS.split_at(5);
        assert_eq!(
            codec.decode(head, &mut container).unwrap(),
            DecodeOutcome::NeedMoreInput
        );
        let DecodeOutcome::Message { message, consumed } =
            codec.decode(tail, &mut container).unwrap()
        else {
            panic!("expected a complete message");
        };
        assert_eq!(consumed, tail.len());
        assert_eq!(message.message_id, 1);
    }

    #[test]
    fn two_pdus_in_one_chunk() {
        let codec = LdapCodec::new();
        let mut container = codec.new_container();
        let mut input = BIND_RESPONSE_SUCCESS.to_vec();
        input.extend_from_slice(&BIND_RESPONSE_SUCCESS);

        let DecodeOutcome::Message { consumed, .. } =
            codec.decode(&input, &mut container).unwrap()
        else {
            panic!("expected a complete message");
        };
        assert_eq!(consumed, BIND_RESPONSE_SUCCESS.len());

        let DecodeOutcome::Message { consumed, .. } =
            codec.decode(&input[consumed..], &mut container).unwrap()
        else {
            panic!("expected a second message");
        };
        assert_eq!(consumed, BIND_RESPONSE_SUCCESS.len());
    }

    #[test]
    fn error_poisons_the_container() {
        let codec = LdapCodec::new();
        let mut container = codec.new_container();
        // empty BindResponse: required result fields missing
        let error = codec
            .decode(&hex!("30 05 02 01 01 61 00"), &mut container)
            .unwrap_err();
        assert_eq!(error, DecodeError::UnexpectedEndOfInput);
        assert!(container.is_poisoned());
        assert_eq!(
            codec.decode(&BIND_RESPONSE_SUCCESS, &mut container),
            Err(DecodeError::Poisoned)
        );

        container.reset();
        assert!(codec.decode(&BIND_RESPONSE_SUCCESS, &mut container).is_ok());
    }
}
