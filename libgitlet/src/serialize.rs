use crate::error::GitletResult;
use std::io::prelude::*;

/// Mirrors the reference implementation's split between a serialisation
/// boundary (`Serialize`) and a deserialisation boundary parameterised by the
/// number of bytes available (`DeserializeSized`) — object payloads are framed
/// by an explicit size in the on-disk envelope (§4.1, §9 "polymorphic persistence").
pub trait Serialize {
    fn serialize(&self, writer: &mut dyn Write) -> GitletResult<()>;
}

pub trait DeserializeSized {
    fn deserialize_sized(reader: &mut impl BufRead, size: u64) -> GitletResult<Self>
    where
        Self: Sized;
}

pub trait Deserialize {
    fn deserialize(reader: &mut impl BufRead) -> GitletResult<Self>
    where
        Self: Sized;
}
