//! Structural decoder for JVM class files.
//!
//! Reads the constant pool, field table and method table of a class file
//! straight from its bytes. Nothing is linked or initialized: the decoder only
//! needs enough structure to answer "which fields carry which constant
//! values" and "which methods exist with which descriptors".
//!
//! Every read is bounds-checked, so truncated or hostile input yields a
//! [`DecodeError`] instead of a panic.

use std::fmt;

use thiserror::Error;

/// Magic number at the start of every class file.
pub const CLASS_MAGIC: u32 = 0xCAFE_BABE;

/// `ACC_STATIC` access flag.
pub const ACC_STATIC: u16 = 0x0008;

/// Error while decoding a class file.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("unexpected end of class data at offset {offset}")]
    UnexpectedEof { offset: usize },

    #[error("bad magic 0x{found:08X}, not a class file")]
    BadMagic { found: u32 },

    #[error("unknown constant pool tag {tag} at index {index}")]
    UnknownTag { tag: u8, index: u16 },

    #[error("constant pool index {index} is invalid")]
    BadIndex { index: u16 },

    #[error("constant pool entry {index} is not a {expected}")]
    WrongConstant { index: u16, expected: &'static str },

    #[error("malformed modified UTF-8 in constant {index}")]
    BadUtf8 { index: u16 },
}

/// A literal constant value, as stored in a `ConstantValue` attribute or
/// loaded by an `ldc`-style instruction.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Literal {
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    String(String),
}

impl Literal {
    /// String payload, if this is a string literal.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Literal::String(s) => Some(s),
            _ => None,
        }
    }
}

// Floats compare by bit pattern so that a declared `0.0` never matches `-0.0`
// and NaN constants can still be located.
impl PartialEq for Literal {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Literal::Int(a), Literal::Int(b)) => a == b,
            (Literal::Long(a), Literal::Long(b)) => a == b,
            (Literal::Float(a), Literal::Float(b)) => a.to_bits() == b.to_bits(),
            (Literal::Double(a), Literal::Double(b)) => a.to_bits() == b.to_bits(),
            (Literal::String(a), Literal::String(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Int(v) => write!(f, "{}", v),
            Literal::Long(v) => write!(f, "{}L", v),
            Literal::Float(v) => write!(f, "{}F", v),
            Literal::Double(v) => write!(f, "{}D", v),
            Literal::String(v) => write!(f, "{:?}", v),
        }
    }
}

/// One field of a decoded class.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct FieldRecord {
    pub name: String,
    /// Field descriptor, e.g. `Ljava/lang/String;`
    pub descriptor: String,
    pub access: u16,
    /// Value of the `ConstantValue` attribute, if any.
    pub literal: Option<Literal>,
}

/// One method of a decoded class.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct MethodRecord {
    pub name: String,
    /// Method descriptor, e.g. `(FLfoo/Camera;)V`
    pub descriptor: String,
    pub access: u16,
}

impl MethodRecord {
    pub fn is_static(&self) -> bool {
        self.access & ACC_STATIC != 0
    }
}

/// The decoded record table of a class file.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct RecordTable {
    /// Internal name, e.g. `net/optifine/Config`
    pub class_name: String,
    pub super_name: Option<String>,
    pub major_version: u16,
    pub fields: Vec<FieldRecord>,
    pub methods: Vec<MethodRecord>,
}

impl RecordTable {
    /// Find a field by name. The table is unordered, so lookups are by name.
    pub fn field(&self, name: &str) -> Option<&FieldRecord> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// String constant of the named field, if present.
    pub fn string_constant(&self, name: &str) -> Option<&str> {
        self.field(name)
            .and_then(|f| f.literal.as_ref())
            .and_then(Literal::as_str)
    }

    /// Find a method by exact name and descriptor.
    pub fn method(&self, name: &str, descriptor: &str) -> Option<&MethodRecord> {
        self.methods
            .iter()
            .find(|m| m.name == name && m.descriptor == descriptor)
    }
}

#[derive(Debug, Clone)]
enum Constant {
    /// Slot 0 and the upper half of long/double entries.
    Unusable,
    Utf8(String),
    Int(i32),
    Float(f32),
    Long(i64),
    Double(f64),
    Class(u16),
    String(u16),
    Other,
}

struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Reader { data, pos: 0 }
    }

    fn bytes(&mut self, len: usize) -> Result<&'a [u8], DecodeError> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|end| *end <= self.data.len())
            .ok_or(DecodeError::UnexpectedEof { offset: self.pos })?;
        let slice = &self.data[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn u8(&mut self) -> Result<u8, DecodeError> {
        Ok(self.bytes(1)?[0])
    }

    fn u16(&mut self) -> Result<u16, DecodeError> {
        let b = self.bytes(2)?;
        Ok(u16::from_be_bytes([b[0], b[1]]))
    }

    fn u32(&mut self) -> Result<u32, DecodeError> {
        let b = self.bytes(4)?;
        Ok(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
    }

    fn u64(&mut self) -> Result<u64, DecodeError> {
        let hi = self.u32()? as u64;
        let lo = self.u32()? as u64;
        Ok((hi << 32) | lo)
    }
}

struct ConstantPool {
    entries: Vec<Constant>,
}

impl ConstantPool {
    fn read(reader: &mut Reader<'_>) -> Result<Self, DecodeError> {
        let count = reader.u16()?;
        let mut entries = Vec::with_capacity(count as usize);
        entries.push(Constant::Unusable);

        let mut index: u16 = 1;
        while index < count {
            let tag = reader.u8()?;
            let constant = match tag {
                1 => {
                    let len = reader.u16()? as usize;
                    let raw = reader.bytes(len)?;
                    Constant::Utf8(
                        decode_modified_utf8(raw).ok_or(DecodeError::BadUtf8 { index })?,
                    )
                }
                3 => Constant::Int(reader.u32()? as i32),
                4 => Constant::Float(f32::from_bits(reader.u32()?)),
                5 => Constant::Long(reader.u64()? as i64),
                6 => Constant::Double(f64::from_bits(reader.u64()?)),
                7 => Constant::Class(reader.u16()?),
                8 => Constant::String(reader.u16()?),
                // Field/Method/InterfaceMethod refs, NameAndType, Dynamic, InvokeDynamic
                9 | 10 | 11 | 12 | 17 | 18 => {
                    reader.bytes(4)?;
                    Constant::Other
                }
                15 => {
                    reader.bytes(3)?;
                    Constant::Other
                }
                // MethodType, Module, Package
                16 | 19 | 20 => {
                    reader.bytes(2)?;
                    Constant::Other
                }
                _ => return Err(DecodeError::UnknownTag { tag, index }),
            };

            let wide = matches!(constant, Constant::Long(_) | Constant::Double(_));
            entries.push(constant);
            index += 1;
            if wide {
                entries.push(Constant::Unusable);
                index = index.saturating_add(1);
            }
        }

        Ok(ConstantPool { entries })
    }

    fn get(&self, index: u16) -> Result<&Constant, DecodeError> {
        match self.entries.get(index as usize) {
            Some(Constant::Unusable) | None => Err(DecodeError::BadIndex { index }),
            Some(c) => Ok(c),
        }
    }

    fn utf8(&self, index: u16) -> Result<&str, DecodeError> {
        match self.get(index)? {
            Constant::Utf8(s) => Ok(s),
            _ => Err(DecodeError::WrongConstant {
                index,
                expected: "Utf8",
            }),
        }
    }

    fn class_name(&self, index: u16) -> Result<&str, DecodeError> {
        match self.get(index)? {
            Constant::Class(name) => self.utf8(*name),
            _ => Err(DecodeError::WrongConstant {
                index,
                expected: "Class",
            }),
        }
    }

    fn literal(&self, index: u16) -> Result<Literal, DecodeError> {
        Ok(match self.get(index)? {
            Constant::Int(v) => Literal::Int(*v),
            Constant::Float(v) => Literal::Float(*v),
            Constant::Long(v) => Literal::Long(*v),
            Constant::Double(v) => Literal::Double(*v),
            Constant::String(s) => Literal::String(self.utf8(*s)?.to_string()),
            _ => {
                return Err(DecodeError::WrongConstant {
                    index,
                    expected: "loadable constant",
                })
            }
        })
    }
}

/// Decode Java's modified UTF-8 (as used in class files) into a `String`.
///
/// Every 1, 2 or 3 byte sequence maps to exactly one UTF-16 code unit;
/// supplementary characters arrive as encoded surrogate pairs.
fn decode_modified_utf8(raw: &[u8]) -> Option<String> {
    let mut units = Vec::with_capacity(raw.len());
    let mut i = 0;
    while i < raw.len() {
        let b = raw[i];
        if b & 0x80 == 0 {
            if b == 0 {
                return None;
            }
            units.push(b as u16);
            i += 1;
        } else if b & 0xE0 == 0xC0 {
            let b2 = *raw.get(i + 1)?;
            if b2 & 0xC0 != 0x80 {
                return None;
            }
            units.push((((b & 0x1F) as u16) << 6) | (b2 & 0x3F) as u16);
            i += 2;
        } else if b & 0xF0 == 0xE0 {
            let b2 = *raw.get(i + 1)?;
            let b3 = *raw.get(i + 2)?;
            if b2 & 0xC0 != 0x80 || b3 & 0xC0 != 0x80 {
                return None;
            }
            units.push(
                (((b & 0x0F) as u16) << 12) | (((b2 & 0x3F) as u16) << 6) | (b3 & 0x3F) as u16,
            );
            i += 3;
        } else {
            return None;
        }
    }
    String::from_utf16(&units).ok()
}

fn skip_attributes(reader: &mut Reader<'_>) -> Result<(), DecodeError> {
    let count = reader.u16()?;
    for _ in 0..count {
        reader.u16()?;
        let len = reader.u32()? as usize;
        reader.bytes(len)?;
    }
    Ok(())
}

/// Decode the record table of a class file.
pub fn decode(data: &[u8]) -> Result<RecordTable, DecodeError> {
    let mut reader = Reader::new(data);

    let magic = reader.u32()?;
    if magic != CLASS_MAGIC {
        return Err(DecodeError::BadMagic { found: magic });
    }
    let _minor = reader.u16()?;
    let major_version = reader.u16()?;

    let pool = ConstantPool::read(&mut reader)?;

    let _access = reader.u16()?;
    let class_name = pool.class_name(reader.u16()?)?.to_string();
    let super_index = reader.u16()?;
    let super_name = if super_index == 0 {
        None
    } else {
        Some(pool.class_name(super_index)?.to_string())
    };

    let interfaces = reader.u16()?;
    reader.bytes(interfaces as usize * 2)?;

    let field_count = reader.u16()?;
    let mut fields = Vec::with_capacity(field_count as usize);
    for _ in 0..field_count {
        let access = reader.u16()?;
        let name = pool.utf8(reader.u16()?)?.to_string();
        let descriptor = pool.utf8(reader.u16()?)?.to_string();

        let mut literal = None;
        let attr_count = reader.u16()?;
        for _ in 0..attr_count {
            let attr_name = pool.utf8(reader.u16()?)?;
            let len = reader.u32()? as usize;
            let body = reader.bytes(len)?;
            if attr_name == "ConstantValue" && len == 2 {
                let index = u16::from_be_bytes([body[0], body[1]]);
                literal = Some(pool.literal(index)?);
            }
        }

        fields.push(FieldRecord {
            name,
            descriptor,
            access,
            literal,
        });
    }

    let method_count = reader.u16()?;
    let mut methods = Vec::with_capacity(method_count as usize);
    for _ in 0..method_count {
        let access = reader.u16()?;
        let name = pool.utf8(reader.u16()?)?.to_string();
        let descriptor = pool.utf8(reader.u16()?)?.to_string();
        skip_attributes(&mut reader)?;
        methods.push(MethodRecord {
            name,
            descriptor,
            access,
        });
    }

    // Class-level attributes are not needed, but they must be present.
    skip_attributes(&mut reader)?;

    Ok(RecordTable {
        class_name,
        super_name,
        major_version,
        fields,
        methods,
    })
}
