use std::sync::Arc;

use log::trace;
use nom::{
    IResult, Parser,
    bytes::complete::take,
    combinator::all_consuming,
    multi::{count, length_count},
    number::complete::{be_u16, be_u32},
};

use crate::{
    class,
    error::{Error, Result},
    runtime::ConstantPool,
};

#[derive(Debug)]
pub(crate) enum AttributeInfo {
    Code(CodeAttribute),
    LineNumberTable(Vec<LineNumberTableItem>),
    Exceptions(Vec<u16>),
    Signature(Arc<str>),
    ConstantValue(u16),
    RuntimeVisibleAnnotations(Arc<[u8]>),
    RuntimeVisibleParameterAnnotations(Arc<[u8]>),
    AnnotationDefault(Arc<[u8]>),
    Unknown,
}

#[derive(Debug)]
pub(crate) struct CodeAttribute {
    pub(crate) max_stack: u16,
    pub(crate) max_locals: u16,
    pub(crate) code: Arc<[u8]>,
    pub(crate) exception_table: Vec<ExceptionTableItem>,
    pub(crate) attributes: Vec<AttributeInfo>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineNumberTableItem {
    pub start_pc: u16,
    pub line_number: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ExceptionTableItem {
    pub(crate) start_pc: u16,
    pub(crate) end_pc: u16,
    pub(crate) handler_pc: u16,
    pub(crate) catch_type: u16,
}

struct RawCode<'a> {
    max_stack: u16,
    max_locals: u16,
    code: &'a [u8],
    exception_table: Vec<ExceptionTableItem>,
    attributes: Vec<class::AttributeInfo>,
}

pub(crate) fn parse_attributes(
    attributes: &[class::AttributeInfo],
    constant_pool: &ConstantPool,
) -> Result<Vec<AttributeInfo>> {
    attributes
        .iter()
        .map(|attribute| parse_attribute(attribute, constant_pool))
        .collect()
}

pub(crate) fn parse_attribute(
    attribute: &class::AttributeInfo,
    constant_pool: &ConstantPool,
) -> Result<AttributeInfo> {
    let name = constant_pool.utf8(attribute.attribute_name_index)?;
    let info = attribute.info.as_slice();
    let malformed = |err: nom::Err<nom::error::Error<&[u8]>>| Error::MalformedAttribute {
        attribute: Arc::clone(&name),
        message: format!("{:?}", err.map(|e| e.code)),
    };

    let attribute = match &*name {
        "Code" => {
            let (_, raw) = all_consuming(parse_code).parse(info).map_err(malformed)?;
            AttributeInfo::Code(CodeAttribute {
                max_stack: raw.max_stack,
                max_locals: raw.max_locals,
                code: Arc::from(raw.code),
                exception_table: raw.exception_table,
                attributes: parse_attributes(&raw.attributes, constant_pool)?,
            })
        }
        "LineNumberTable" => {
            let (_, items) = all_consuming(length_count(be_u16_value, parse_line_number_item))
                .parse(info)
                .map_err(malformed)?;
            AttributeInfo::LineNumberTable(items)
        }
        "Exceptions" => {
            let (_, indices) = all_consuming(length_count(be_u16_value, be_u16_value))
                .parse(info)
                .map_err(malformed)?;
            AttributeInfo::Exceptions(indices)
        }
        "Signature" => {
            let (_, index) = all_consuming(be_u16_value).parse(info).map_err(malformed)?;
            AttributeInfo::Signature(constant_pool.utf8(index)?)
        }
        "ConstantValue" => {
            let (_, index) = all_consuming(be_u16_value).parse(info).map_err(malformed)?;
            AttributeInfo::ConstantValue(index)
        }
        "RuntimeVisibleAnnotations" => AttributeInfo::RuntimeVisibleAnnotations(Arc::from(info)),
        "RuntimeVisibleParameterAnnotations" => {
            AttributeInfo::RuntimeVisibleParameterAnnotations(Arc::from(info))
        }
        "AnnotationDefault" => AttributeInfo::AnnotationDefault(Arc::from(info)),
        _ => {
            trace!("skipping {name} attribute");
            AttributeInfo::Unknown
        }
    };
    Ok(attribute)
}

fn be_u16_value(input: &[u8]) -> IResult<&[u8], u16> {
    be_u16(input)
}

fn parse_code(input: &[u8]) -> IResult<&[u8], RawCode<'_>> {
    let (input, max_stack) = be_u16(input)?;
    let (input, max_locals) = be_u16(input)?;

    let (input, code_length) = be_u32(input)?;
    let (input, code) = take(code_length).parse(input)?;

    let (input, exception_table) =
        length_count(be_u16_value, parse_exception_table_item).parse(input)?;

    let (input, attributes_count) = be_u16(input)?;
    let (input, attributes) = count(parse_attribute_raw, attributes_count as usize).parse(input)?;

    Ok((
        input,
        RawCode {
            max_stack,
            max_locals,
            code,
            exception_table,
            attributes,
        },
    ))
}

fn parse_exception_table_item(input: &[u8]) -> IResult<&[u8], ExceptionTableItem> {
    let (input, start_pc) = be_u16(input)?;
    let (input, end_pc) = be_u16(input)?;
    let (input, handler_pc) = be_u16(input)?;
    let (input, catch_type) = be_u16(input)?;

    Ok((
        input,
        ExceptionTableItem {
            start_pc,
            end_pc,
            handler_pc,
            catch_type,
        },
    ))
}

fn parse_line_number_item(input: &[u8]) -> IResult<&[u8], LineNumberTableItem> {
    let (input, start_pc) = be_u16(input)?;
    let (input, line_number) = be_u16(input)?;
    Ok((
        input,
        LineNumberTableItem {
            start_pc,
            line_number,
        },
    ))
}

fn parse_attribute_raw(input: &[u8]) -> IResult<&[u8], class::AttributeInfo> {
    let (input, attribute_name_index) = be_u16(input)?;
    let (input, attribute_length) = be_u32(input)?;
    let (input, info) = take(attribute_length).parse(input)?;
    Ok((
        input,
        class::AttributeInfo {
            attribute_name_index,
            info: info.to_vec(),
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool() -> ConstantPool {
        ConstantPool::new(&[
            class::ConstantPoolInfo::utf8("Code"),
            class::ConstantPoolInfo::utf8("LineNumberTable"),
            class::ConstantPoolInfo::utf8("Exceptions"),
            class::ConstantPoolInfo::utf8("StackMapTable"),
        ])
        .unwrap()
    }

    #[test]
    fn test_code_attribute() {
        let mut info = vec![0, 2, 0, 3, 0, 0, 0, 2, 0x03, 0xac];
        info.extend_from_slice(&[0, 1, 0, 0, 0, 1, 0, 1, 0, 0]);
        info.extend_from_slice(&[0, 2]);
        info.extend_from_slice(&[0, 2, 0, 0, 0, 6, 0, 1, 0, 0, 0, 7]);
        info.extend_from_slice(&[0, 4, 0, 0, 0, 1, 0xff]);

        let attribute = parse_attribute(
            &class::AttributeInfo {
                attribute_name_index: 1,
                info,
            },
            &pool(),
        )
        .unwrap();

        let AttributeInfo::Code(code) = attribute else {
            panic!("expected code attribute");
        };
        assert_eq!(code.max_stack, 2);
        assert_eq!(code.max_locals, 3);
        assert_eq!(&*code.code, &[0x03, 0xac]);
        assert_eq!(
            code.exception_table,
            vec![ExceptionTableItem {
                start_pc: 0,
                end_pc: 1,
                handler_pc: 1,
                catch_type: 0
            }]
        );
        assert!(matches!(
            code.attributes.as_slice(),
            [AttributeInfo::LineNumberTable(items), AttributeInfo::Unknown]
                if items == &[LineNumberTableItem { start_pc: 0, line_number: 7 }]
        ));
    }

    #[test]
    fn test_truncated_code() {
        let err = parse_attribute(
            &class::AttributeInfo {
                attribute_name_index: 1,
                info: vec![0, 2, 0, 3, 0, 0, 0, 9, 0x03],
            },
            &pool(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            Error::MalformedAttribute { attribute, .. } if &*attribute == "Code"
        ));
    }

    #[test]
    fn test_trailing_bytes() {
        let err = parse_attribute(
            &class::AttributeInfo {
                attribute_name_index: 3,
                info: vec![0, 1, 0, 5, 0],
            },
            &pool(),
        )
        .unwrap_err();
        assert!(matches!(err, Error::MalformedAttribute { .. }));
    }
}
