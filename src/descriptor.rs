//! Field and method descriptors.
//!
//! Descriptors repeat heavily across classes, so method descriptors are parsed once per
//! distinct string and shared through [`intern_method_descriptor`].

use std::{
    fmt::{self, Display, Write},
    str::FromStr,
    sync::{Arc, LazyLock},
};

use dashmap::DashMap;
use log::trace;
use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::take_till1,
    character::complete::{anychar, char},
    combinator::{eof, map, map_opt, value},
    error::{Error as NomError, ErrorKind},
    multi::{many0, many1_count},
    sequence::{delimited, terminated},
};

use crate::error::{Error, Result};

const MAX_ARRAY_DIMENSIONS: usize = 255;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldDescriptor(pub(crate) FieldType);

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MethodDescriptor {
    pub(crate) parameters: Vec<FieldType>,
    pub(crate) return_type: ReturnType,
}

/// `None` is `void`.
pub type ReturnType = Option<FieldType>;

#[derive(Debug, PartialEq, Eq, Clone, Hash)]
pub enum FieldType {
    Byte,
    Char,
    Double,
    Float,
    Int,
    Long,
    Object(Arc<str>),
    Short,
    Boolean,
    Array(Box<FieldType>),
}

impl FieldType {
    fn from_base_code(code: char) -> Option<Self> {
        let field_type = match code {
            'B' => FieldType::Byte,
            'C' => FieldType::Char,
            'D' => FieldType::Double,
            'F' => FieldType::Float,
            'I' => FieldType::Int,
            'J' => FieldType::Long,
            'S' => FieldType::Short,
            'Z' => FieldType::Boolean,
            _ => return None,
        };
        Some(field_type)
    }

    /// Category 2 types take two local variable slots.
    pub fn is_wide(&self) -> bool {
        matches!(self, FieldType::Long | FieldType::Double)
    }

    pub fn slot_size(&self) -> usize {
        if self.is_wide() { 2 } else { 1 }
    }

    pub fn is_primitive(&self) -> bool {
        !matches!(self, FieldType::Object(_) | FieldType::Array(_))
    }

    pub fn descriptor(&self) -> String {
        self.to_string()
    }
}

impl Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::Byte => f.write_char('B'),
            FieldType::Char => f.write_char('C'),
            FieldType::Double => f.write_char('D'),
            FieldType::Float => f.write_char('F'),
            FieldType::Int => f.write_char('I'),
            FieldType::Long => f.write_char('J'),
            FieldType::Short => f.write_char('S'),
            FieldType::Boolean => f.write_char('Z'),
            FieldType::Object(class_name) => write!(f, "L{class_name};"),
            FieldType::Array(element) => write!(f, "[{element}"),
        }
    }
}

impl FieldDescriptor {
    pub fn parse(descriptor: &str) -> Result<Self> {
        parse_field_descriptor(descriptor)
            .map(|(_, field_descriptor)| field_descriptor)
            .map_err(|_| Error::MalformedDescriptor {
                descriptor: descriptor.to_string(),
            })
    }

    pub fn field_type(&self) -> &FieldType {
        &self.0
    }
}

impl MethodDescriptor {
    pub fn parse(descriptor: &str) -> Result<Self> {
        parse_method_descriptor(descriptor)
            .map(|(_, method_descriptor)| method_descriptor)
            .map_err(|_| Error::MalformedDescriptor {
                descriptor: descriptor.to_string(),
            })
    }

    pub fn parameters(&self) -> &[FieldType] {
        &self.parameters
    }

    pub fn return_type(&self) -> Option<&FieldType> {
        self.return_type.as_ref()
    }

    pub fn is_void(&self) -> bool {
        self.return_type.is_none()
    }

    /// Number of local variable slots taken by the declared parameters, not counting `this`.
    pub fn arg_count(&self) -> usize {
        self.parameters.iter().map(FieldType::slot_size).sum()
    }
}

impl FromStr for MethodDescriptor {
    type Err = Error;

    fn from_str(descriptor: &str) -> Result<Self> {
        Self::parse(descriptor)
    }
}

impl Display for MethodDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_char('(')?;
        for parameter in &self.parameters {
            write!(f, "{parameter}")?;
        }
        f.write_char(')')?;
        match &self.return_type {
            Some(return_type) => write!(f, "{return_type}"),
            None => f.write_char('V'),
        }
    }
}

static METHOD_DESCRIPTORS: LazyLock<DashMap<Arc<str>, Arc<MethodDescriptor>>> =
    LazyLock::new(DashMap::new);

/// Parses `descriptor`, reusing the result of any earlier parse of the same string.
pub fn intern_method_descriptor(descriptor: &str) -> Result<Arc<MethodDescriptor>> {
    if let Some(parsed) = METHOD_DESCRIPTORS.get(descriptor) {
        return Ok(Arc::clone(parsed.value()));
    }
    let parsed = Arc::new(MethodDescriptor::parse(descriptor)?);
    trace!("interned method descriptor {descriptor}");
    let entry = METHOD_DESCRIPTORS
        .entry(Arc::from(descriptor))
        .or_insert(parsed);
    Ok(Arc::clone(entry.value()))
}

pub fn parse_field_descriptor(input: &str) -> IResult<&str, FieldDescriptor> {
    let (input, field_type) = terminated(parse_field_type, eof).parse(input)?;
    Ok((input, FieldDescriptor(field_type)))
}

pub fn parse_method_descriptor(input: &str) -> IResult<&str, MethodDescriptor> {
    let (input, parameters) =
        delimited(char('('), many0(parse_field_type), char(')')).parse(input)?;

    let (input, return_type) = terminated(parse_return_type_descriptor, eof).parse(input)?;

    Ok((
        input,
        MethodDescriptor {
            parameters,
            return_type,
        },
    ))
}

pub fn parse_return_type_descriptor(input: &str) -> IResult<&str, ReturnType> {
    alt((map(parse_field_type, Some), value(None, char('V')))).parse(input)
}

fn parse_field_type(input: &str) -> IResult<&str, FieldType> {
    alt((parse_base_type, parse_object_type, parse_array_type)).parse(input)
}

fn parse_base_type(input: &str) -> IResult<&str, FieldType> {
    map_opt(anychar, FieldType::from_base_code).parse(input)
}

fn parse_object_type(input: &str) -> IResult<&str, FieldType> {
    let (input, class_name) =
        delimited(char('L'), take_till1(|c: char| c == ';'), char(';')).parse(input)?;

    Ok((input, FieldType::Object(Arc::from(class_name))))
}

fn parse_array_type(input: &str) -> IResult<&str, FieldType> {
    let (rest, dimensions) = many1_count(char('[')).parse(input)?;
    if dimensions > MAX_ARRAY_DIMENSIONS {
        return Err(nom::Err::Failure(NomError::new(input, ErrorKind::TooLarge)));
    }

    let (rest, element) = alt((parse_base_type, parse_object_type)).parse(rest)?;

    let field_type = (0..dimensions).fold(element, |inner, _| FieldType::Array(Box::new(inner)));
    Ok((rest, field_type))
}
