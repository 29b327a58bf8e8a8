//! Scalar text form
//!
//! Renders top-level scalars directly, including the ones JSON has no form
//! for (non-finite floats, 128-bit integers). Compound values report
//! [`NotScalar`] and are left to `serde_json`.

use std::fmt::Display;

use serde::ser::{self, Impossible, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
#[error("value is not a scalar")]
pub(crate) struct NotScalar;

impl ser::Error for NotScalar {
    fn custom<T: Display>(_msg: T) -> Self {
        NotScalar
    }
}

/// Text of a scalar value, or `None` for sequences, maps and structs.
pub(crate) fn scalar_text<T: Serialize + ?Sized>(value: &T) -> Option<String> {
    value.serialize(ScalarText).ok()
}

fn float_text(v: f64) -> String {
    if v.is_nan() {
        "nan".to_string()
    } else if v == f64::INFINITY {
        "inf".to_string()
    } else if v == f64::NEG_INFINITY {
        "-inf".to_string()
    } else {
        // Finite, so the JSON number always exists
        serde_json::Number::from_f64(v)
            .map(|n| n.to_string())
            .unwrap_or_else(|| v.to_string())
    }
}

struct ScalarText;

type Rejected = Impossible<String, NotScalar>;

impl ser::Serializer for ScalarText {
    type Ok = String;
    type Error = NotScalar;
    type SerializeSeq = Rejected;
    type SerializeTuple = Rejected;
    type SerializeTupleStruct = Rejected;
    type SerializeTupleVariant = Rejected;
    type SerializeMap = Rejected;
    type SerializeStruct = Rejected;
    type SerializeStructVariant = Rejected;

    fn serialize_bool(self, v: bool) -> Result<String, NotScalar> {
        Ok(v.to_string())
    }

    fn serialize_i8(self, v: i8) -> Result<String, NotScalar> {
        Ok(v.to_string())
    }

    fn serialize_i16(self, v: i16) -> Result<String, NotScalar> {
        Ok(v.to_string())
    }

    fn serialize_i32(self, v: i32) -> Result<String, NotScalar> {
        Ok(v.to_string())
    }

    fn serialize_i64(self, v: i64) -> Result<String, NotScalar> {
        Ok(v.to_string())
    }

    fn serialize_i128(self, v: i128) -> Result<String, NotScalar> {
        Ok(v.to_string())
    }

    fn serialize_u8(self, v: u8) -> Result<String, NotScalar> {
        Ok(v.to_string())
    }

    fn serialize_u16(self, v: u16) -> Result<String, NotScalar> {
        Ok(v.to_string())
    }

    fn serialize_u32(self, v: u32) -> Result<String, NotScalar> {
        Ok(v.to_string())
    }

    fn serialize_u64(self, v: u64) -> Result<String, NotScalar> {
        Ok(v.to_string())
    }

    fn serialize_u128(self, v: u128) -> Result<String, NotScalar> {
        Ok(v.to_string())
    }

    fn serialize_f32(self, v: f32) -> Result<String, NotScalar> {
        Ok(float_text(f64::from(v)))
    }

    fn serialize_f64(self, v: f64) -> Result<String, NotScalar> {
        Ok(float_text(v))
    }

    fn serialize_char(self, v: char) -> Result<String, NotScalar> {
        Ok(v.to_string())
    }

    fn serialize_str(self, v: &str) -> Result<String, NotScalar> {
        Ok(v.to_string())
    }

    fn serialize_bytes(self, _v: &[u8]) -> Result<String, NotScalar> {
        Err(NotScalar)
    }

    fn serialize_none(self) -> Result<String, NotScalar> {
        Ok(String::new())
    }

    fn serialize_some<T: Serialize + ?Sized>(self, value: &T) -> Result<String, NotScalar> {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<String, NotScalar> {
        Ok(String::new())
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<String, NotScalar> {
        Ok(String::new())
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _index: u32,
        variant: &'static str,
    ) -> Result<String, NotScalar> {
        Ok(variant.to_string())
    }

    fn serialize_newtype_struct<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        value: &T,
    ) -> Result<String, NotScalar> {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        _index: u32,
        _variant: &'static str,
        _value: &T,
    ) -> Result<String, NotScalar> {
        Err(NotScalar)
    }

    fn serialize_seq(self, _len: Option<usize>) -> Result<Rejected, NotScalar> {
        Err(NotScalar)
    }

    fn serialize_tuple(self, _len: usize) -> Result<Rejected, NotScalar> {
        Err(NotScalar)
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<Rejected, NotScalar> {
        Err(NotScalar)
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Rejected, NotScalar> {
        Err(NotScalar)
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<Rejected, NotScalar> {
        Err(NotScalar)
    }

    fn serialize_struct(self, _name: &'static str, _len: usize) -> Result<Rejected, NotScalar> {
        Err(NotScalar)
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Rejected, NotScalar> {
        Err(NotScalar)
    }
}
