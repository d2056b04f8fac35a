//! The decoder's grammar: for every LDAP operation a static transition
//! table keyed by `(state, tag)`, whose actions populate a message builder
//! as TLVs complete. The scanner in [`crate::ber::de`] feeds these tables
//! through the message container.

mod add;
mod bind;
mod compare;
mod extended;
mod modify;
mod result;
mod search;

use std::sync::Arc;

use bytes::Bytes;

use crate::ber::decode_integer_u32;
use crate::controls::{Control, ControlRegistry, Controls, ControlValue};
use crate::error::DecodeError;
use crate::messages::{LdapMessage, MessageId, ModifyChange, ModifyOperation, PartialAttribute, ProtocolOp};
use crate::octets::utf8_string;
use crate::oid;

/// One grammar cursor position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum State {
    // message envelope
    Start,
    MessageId,
    ProtocolOp,
    AfterOp,
    ControlSeq,
    ControlType,
    ControlCrit,
    ControlValue,
    AfterControls,
    Done,
    /// Generic "structure must end here" state.
    End,

    // bind
    BindVersion,
    BindName,
    BindAuth,
    SaslMechanism,
    SaslCredentials,

    // shared LDAPResult suffix
    ResultCode,
    ResultMatchedDn,
    ResultDiagnostic,
    ResultExtras,
    ReferralUri,

    // search request
    SearchBase,
    SearchScope,
    SearchDeref,
    SearchSize,
    SearchTime,
    SearchTypesOnly,
    SearchFilter,
    SearchAttrList,
    SearchAttr,

    // search result entry / add request attribute lists
    EntryDn,
    EntryAttrList,
    AddDn,
    AddAttrList,
    AttrItem,
    AttrType,
    AttrValSet,
    AttrVal,

    // modify
    ModifyObject,
    ModifyChangeList,
    ModifyChange,
    ModifyOperation,
    ModifyAttrSeq,

    // modify dn
    ModDnEntry,
    ModDnNewRdn,
    ModDnDeleteOld,
    ModDnAfter,

    // compare
    CompareEntry,
    CompareAvaSeq,
    CompareAvaDesc,
    CompareAvaValue,

    // search result reference
    RefUriFirst,
    RefUri,

    // extended / intermediate
    ExtReqName,
    ExtReqAfter,
    IntermediateStart,
    IntermediateAfterName,
}

impl State {
    /// The state's name in diagnostics.
    pub(crate) fn name(self) -> &'static str {
        use State::*;
        match self {
            Start | MessageId | ProtocolOp | AfterOp | Done => "envelope",
            ControlSeq | ControlType | ControlCrit | ControlValue | AfterControls => "controls",
            End => "end of structure",
            BindVersion | BindName | BindAuth => "bindRequest",
            SaslMechanism | SaslCredentials => "saslCredentials",
            ResultCode | ResultMatchedDn | ResultDiagnostic | ResultExtras | ReferralUri => {
                "ldapResult"
            }
            SearchBase | SearchScope | SearchDeref | SearchSize | SearchTime | SearchTypesOnly
            | SearchFilter | SearchAttrList | SearchAttr => "searchRequest",
            EntryDn | EntryAttrList => "searchResultEntry",
            AddDn | AddAttrList => "addRequest",
            AttrItem | AttrType | AttrValSet | AttrVal => "attributeList",
            ModifyObject | ModifyChangeList | ModifyChange | ModifyOperation | ModifyAttrSeq => {
                "modifyRequest"
            }
            ModDnEntry | ModDnNewRdn | ModDnDeleteOld | ModDnAfter => "modDNRequest",
            CompareEntry | CompareAvaSeq | CompareAvaDesc | CompareAvaValue => "compareRequest",
            RefUriFirst | RefUri => "searchResultReference",
            ExtReqName | ExtReqAfter => "extendedRequest",
            IntermediateStart | IntermediateAfterName => "intermediateResponse",
        }
    }

    /// True when a structure may end while the cursor rests on this state:
    /// every required field has been consumed.
    pub(crate) fn end_allowed(self) -> bool {
        use State::*;
        matches!(
            self,
            AfterOp
                | ControlSeq
                | ControlCrit
                | ControlValue
                | AfterControls
                | End
                | SaslCredentials
                | ResultExtras
                | ReferralUri
                | SearchAttr
                | AttrItem
                | AttrVal
                | ModifyChange
                | ModDnAfter
                | ExtReqAfter
                | IntermediateStart
                | IntermediateAfterName
                | RefUri
        )
    }
}

pub(crate) type PrimitiveAction = fn(&mut MessageBuilder, &[u8]) -> Result<(), DecodeError>;
pub(crate) type StructAction = fn(&mut MessageBuilder) -> Result<(), DecodeError>;

/// What the decoder does with a TLV accepted by a transition.
pub(crate) enum Kind {
    /// Buffer the full primitive payload, then run the action on it.
    Primitive(PrimitiveAction),
    /// Push a frame; `resume` is entered when the frame's length is
    /// exhausted, after the optional `exit` hook ran.
    Constructed {
        resume: State,
        enter: Option<StructAction>,
        exit: Option<StructAction>,
    },
    /// Capture the entire TLV, header included, and hand it to a
    /// slice-level parser. Works for primitive and constructed tags alike.
    Subtree(PrimitiveAction),
}

/// One row of a transition table.
pub(crate) struct Transition {
    /// The identifier octet this row accepts.
    pub tag: u8,
    pub kind: Kind,
    /// The state entered after the TLV is dispatched (for constructed
    /// kinds: the state *inside* the new frame).
    pub next: State,
}

impl Transition {
    pub(crate) const fn primitive(tag: u8, action: PrimitiveAction, next: State) -> Self {
        Self {
            tag,
            kind: Kind::Primitive(action),
            next,
        }
    }

    pub(crate) const fn constructed(tag: u8, next: State, resume: State) -> Self {
        Self {
            tag,
            kind: Kind::Constructed {
                resume,
                enter: None,
                exit: None,
            },
            next,
        }
    }

    pub(crate) const fn structure(
        tag: u8,
        next: State,
        resume: State,
        enter: Option<StructAction>,
        exit: Option<StructAction>,
    ) -> Self {
        Self {
            tag,
            kind: Kind::Constructed {
                resume,
                enter,
                exit,
            },
            next,
        }
    }

    pub(crate) const fn subtree(tag: u8, action: PrimitiveAction, next: State) -> Self {
        Self {
            tag,
            kind: Kind::Subtree(action),
            next,
        }
    }
}

/// Looks up the transition rows of `state`.
pub(crate) fn transitions(state: State) -> &'static [Transition] {
    match state {
        State::Start => ENVELOPE_START,
        State::MessageId => ENVELOPE_MESSAGE_ID,
        State::ProtocolOp => PROTOCOL_OP,
        State::AfterOp => AFTER_OP,
        State::ControlSeq => CONTROL_SEQ,
        State::ControlType => CONTROL_TYPE,
        State::ControlCrit => CONTROL_CRIT,
        State::ControlValue => CONTROL_VALUE,
        State::AfterControls | State::Done | State::End => &[],

        State::BindVersion => bind::VERSION,
        State::BindName => bind::NAME,
        State::BindAuth => bind::AUTH,
        State::SaslMechanism => bind::SASL_MECHANISM,
        State::SaslCredentials => bind::SASL_CREDENTIALS,

        State::ResultCode => result::CODE,
        State::ResultMatchedDn => result::MATCHED_DN,
        State::ResultDiagnostic => result::DIAGNOSTIC,
        State::ResultExtras => result::EXTRAS,
        State::ReferralUri => result::REFERRAL_URI,

        State::SearchBase => search::BASE,
        State::SearchScope => search::SCOPE,
        State::SearchDeref => search::DEREF,
        State::SearchSize => search::SIZE,
        State::SearchTime => search::TIME,
        State::SearchTypesOnly => search::TYPES_ONLY,
        State::SearchFilter => search::FILTER,
        State::SearchAttrList => search::ATTR_LIST,
        State::SearchAttr => search::ATTR,

        State::EntryDn => search::ENTRY_DN,
        State::EntryAttrList => search::ENTRY_ATTR_LIST,
        State::AddDn => add::DN,
        State::AddAttrList => add::ATTR_LIST,
        State::AttrItem => ATTR_ITEM,
        State::AttrType => ATTR_TYPE,
        State::AttrValSet => ATTR_VAL_SET,
        State::AttrVal => ATTR_VAL,

        State::ModifyObject => modify::OBJECT,
        State::ModifyChangeList => modify::CHANGE_LIST,
        State::ModifyChange => modify::CHANGE,
        State::ModifyOperation => modify::OPERATION,
        State::ModifyAttrSeq => modify::ATTR_SEQ,

        State::ModDnEntry => modify::MOD_DN_ENTRY,
        State::ModDnNewRdn => modify::MOD_DN_NEW_RDN,
        State::ModDnDeleteOld => modify::MOD_DN_DELETE_OLD,
        State::ModDnAfter => modify::MOD_DN_AFTER,

        State::CompareEntry => compare::ENTRY,
        State::CompareAvaSeq => compare::AVA_SEQ,
        State::CompareAvaDesc => compare::AVA_DESC,
        State::CompareAvaValue => compare::AVA_VALUE,

        State::RefUriFirst => search::REF_URI_FIRST,
        State::RefUri => search::REF_URI,

        State::ExtReqName => extended::REQ_NAME,
        State::ExtReqAfter => extended::REQ_AFTER,
        State::IntermediateStart => extended::INTERMEDIATE_START,
        State::IntermediateAfterName => extended::INTERMEDIATE_AFTER_NAME,
    }
}

// ---- envelope tables ----

const ENVELOPE_START: &[Transition] =
    &[Transition::constructed(0x30, State::MessageId, State::Done)];

const ENVELOPE_MESSAGE_ID: &[Transition] =
    &[Transition::primitive(0x02, message_id, State::ProtocolOp)];

const PROTOCOL_OP: &[Transition] = &[
    Transition::structure(0x60, State::BindVersion, State::AfterOp, Some(bind::new_request), None),
    Transition::structure(0x61, State::ResultCode, State::AfterOp, Some(bind::new_response), None),
    Transition::primitive(0x42, extended::unbind, State::AfterOp),
    Transition::structure(0x63, State::SearchBase, State::AfterOp, Some(search::new_request), None),
    Transition::structure(
        0x64,
        State::EntryDn,
        State::AfterOp,
        Some(search::new_entry),
        Some(search::finish_entry),
    ),
    Transition::structure(0x65, State::ResultCode, State::AfterOp, Some(search::new_done), None),
    Transition::structure(
        0x66,
        State::ModifyObject,
        State::AfterOp,
        Some(modify::new_request),
        Some(modify::finish_request),
    ),
    Transition::structure(0x67, State::ResultCode, State::AfterOp, Some(modify::new_response), None),
    Transition::structure(
        0x68,
        State::AddDn,
        State::AfterOp,
        Some(add::new_request),
        Some(add::finish_request),
    ),
    Transition::structure(0x69, State::ResultCode, State::AfterOp, Some(add::new_response), None),
    Transition::primitive(0x4a, add::del_request, State::AfterOp),
    Transition::structure(0x6b, State::ResultCode, State::AfterOp, Some(add::new_del_response), None),
    Transition::structure(
        0x6c,
        State::ModDnEntry,
        State::AfterOp,
        Some(modify::new_mod_dn_request),
        None,
    ),
    Transition::structure(
        0x6d,
        State::ResultCode,
        State::AfterOp,
        Some(modify::new_mod_dn_response),
        None,
    ),
    Transition::structure(
        0x6e,
        State::CompareEntry,
        State::AfterOp,
        Some(compare::new_request),
        None,
    ),
    Transition::structure(0x6f, State::ResultCode, State::AfterOp, Some(compare::new_response), None),
    Transition::primitive(0x50, extended::abandon, State::AfterOp),
    Transition::structure(
        0x73,
        State::RefUriFirst,
        State::AfterOp,
        Some(search::new_reference),
        None,
    ),
    Transition::structure(
        0x77,
        State::ExtReqName,
        State::AfterOp,
        Some(extended::new_request),
        None,
    ),
    Transition::structure(
        0x78,
        State::ResultCode,
        State::AfterOp,
        Some(extended::new_response),
        None,
    ),
    Transition::structure(
        0x79,
        State::IntermediateStart,
        State::AfterOp,
        Some(extended::new_intermediate),
        None,
    ),
];

const AFTER_OP: &[Transition] =
    &[Transition::constructed(0xa0, State::ControlSeq, State::AfterControls)];

const CONTROL_SEQ: &[Transition] = &[Transition::structure(
    0x30,
    State::ControlType,
    State::ControlSeq,
    None,
    Some(finish_control),
)];

const CONTROL_TYPE: &[Transition] =
    &[Transition::primitive(0x04, control_type, State::ControlCrit)];

const CONTROL_CRIT: &[Transition] = &[
    Transition::primitive(0x01, control_criticality, State::ControlValue),
    Transition::primitive(0x04, control_value, State::End),
];

const CONTROL_VALUE: &[Transition] =
    &[Transition::primitive(0x04, control_value, State::End)];

// ---- shared attribute-list tables (search entries, add requests) ----

const ATTR_ITEM: &[Transition] = &[Transition::structure(
    0x30,
    State::AttrType,
    State::AttrItem,
    None,
    Some(finish_attr_item),
)];

const ATTR_TYPE: &[Transition] = &[Transition::primitive(0x04, attr_type, State::AttrValSet)];

const ATTR_VAL_SET: &[Transition] =
    &[Transition::constructed(0x31, State::AttrVal, State::End)];

const ATTR_VAL: &[Transition] = &[Transition::primitive(0x04, attr_value, State::AttrVal)];

/// The in-progress message plus the decoder's temporaries.
pub(crate) struct MessageBuilder {
    registry: Arc<ControlRegistry>,
    pub(crate) message_id: Option<MessageId>,
    pub(crate) op: Option<ProtocolOp>,
    pub(crate) controls: Controls,
    // temporaries for the structure currently being decoded
    control: Option<Control>,
    pub(crate) attrs: Vec<PartialAttribute>,
    pub(crate) attr: Option<PartialAttribute>,
    pub(crate) change_op: Option<ModifyOperation>,
    pub(crate) changes: Vec<ModifyChange>,
}

impl MessageBuilder {
    pub(crate) fn new(registry: Arc<ControlRegistry>) -> Self {
        Self {
            registry,
            message_id: None,
            op: None,
            controls: Controls::new(),
            control: None,
            attrs: Vec::new(),
            attr: None,
            change_op: None,
            changes: Vec::new(),
        }
    }

    /// Extracts the finished message and readies the builder for the next
    /// PDU.
    pub(crate) fn take_message(&mut self) -> Result<LdapMessage, DecodeError> {
        let message_id = self.message_id.take().ok_or(DecodeError::UnexpectedEndOfInput)?;
        let op = self.op.take().ok_or(DecodeError::UnexpectedEndOfInput)?;
        let controls = core::mem::take(&mut self.controls);
        self.reset();
        Ok(LdapMessage {
            message_id,
            op,
            controls,
        })
    }

    pub(crate) fn reset(&mut self) {
        self.message_id = None;
        self.op = None;
        self.controls = Controls::new();
        self.control = None;
        self.attrs.clear();
        self.attr = None;
        self.change_op = None;
        self.changes.clear();
    }

    pub(crate) fn op_mut(&mut self) -> Result<&mut ProtocolOp, DecodeError> {
        self.op.as_mut().ok_or(DecodeError::UnexpectedEndOfInput)
    }
}

// ---- envelope and shared actions ----

fn message_id(builder: &mut MessageBuilder, contents: &[u8]) -> Result<(), DecodeError> {
    builder.message_id = Some(decode_integer_u32(contents)?);
    Ok(())
}

fn control_type(builder: &mut MessageBuilder, contents: &[u8]) -> Result<(), DecodeError> {
    let oid_text = utf8_string(contents).map_err(|_| DecodeError::InvalidOid)?;
    if !oid::is_dotted(&oid_text) {
        return Err(DecodeError::InvalidOid);
    }
    builder.control = Some(Control::new(oid_text, ControlValue::Absent));
    Ok(())
}

fn control_criticality(builder: &mut MessageBuilder, contents: &[u8]) -> Result<(), DecodeError> {
    let control = builder.control.as_mut().ok_or(DecodeError::UnexpectedEndOfInput)?;
    control.criticality = crate::ber::decode_boolean(contents)?;
    Ok(())
}

fn control_value(builder: &mut MessageBuilder, contents: &[u8]) -> Result<(), DecodeError> {
    let control = builder.control.as_mut().ok_or(DecodeError::UnexpectedEndOfInput)?;
    control.value = ControlValue::Raw(Bytes::copy_from_slice(contents));
    Ok(())
}

fn finish_control(builder: &mut MessageBuilder) -> Result<(), DecodeError> {
    let mut control = builder.control.take().ok_or(DecodeError::UnexpectedEndOfInput)?;
    let is_request = builder.op.as_ref().is_some_and(ProtocolOp::is_request);

    if let Some(factory) = builder.registry.factory(&control.oid, is_request).cloned() {
        if let ControlValue::Raw(value) = core::mem::replace(&mut control.value, ControlValue::Absent)
        {
            factory.decode_value(&mut control, &value)?;
        }
    } else if !matches!(control.value, ControlValue::Absent) {
        log::debug!("no factory for control {}, keeping raw value", control.oid);
    }

    builder.controls.insert(control);
    Ok(())
}

fn attr_type(builder: &mut MessageBuilder, contents: &[u8]) -> Result<(), DecodeError> {
    builder.attr = Some(PartialAttribute::new(utf8_string(contents)?));
    Ok(())
}

fn attr_value(builder: &mut MessageBuilder, contents: &[u8]) -> Result<(), DecodeError> {
    let attr = builder.attr.as_mut().ok_or(DecodeError::UnexpectedEndOfInput)?;
    attr.values.push(Bytes::copy_from_slice(contents));
    Ok(())
}

fn finish_attr_item(builder: &mut MessageBuilder) -> Result<(), DecodeError> {
    let attr = builder.attr.take().ok_or(DecodeError::UnexpectedEndOfInput)?;
    builder.attrs.push(attr);
    Ok(())
}
