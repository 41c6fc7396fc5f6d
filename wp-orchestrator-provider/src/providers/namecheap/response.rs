//! Namecheap XML 响应解析
//!
//! 只读取 `ApiResponse` 的 `Status` 属性和第一个 `Error` 元素。

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use crate::traits::RawApiError;

/// 响应结果
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum ApiOutcome {
    Ok,
    Error(RawApiErrorParts),
}

#[derive(Debug, PartialEq, Eq)]
pub(crate) struct RawApiErrorParts {
    pub number: Option<String>,
    pub message: String,
}

impl From<RawApiErrorParts> for RawApiError {
    fn from(parts: RawApiErrorParts) -> Self {
        match parts.number {
            Some(number) => RawApiError::with_code(number, parts.message),
            None => RawApiError::new(parts.message),
        }
    }
}

/// 按本地名读取属性（忽略命名空间前缀，单双引号均可）
fn attribute(tag: &BytesStart<'_>, name: &[u8]) -> Option<String> {
    tag.attributes()
        .flatten()
        .find(|attr| attr.key.local_name().as_ref() == name)
        .and_then(|attr| attr.unescape_value().ok())
        .map(|value| value.into_owned())
}

/// 解析 `<ApiResponse Status="...">`，失败时取第一个 `<Error>`
pub(crate) fn parse_api_response(xml: &str) -> Option<ApiOutcome> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut status: Option<String> = None;
    let mut error: Option<RawApiErrorParts> = None;
    let mut in_error = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(tag)) => match tag.local_name().as_ref() {
                b"ApiResponse" if status.is_none() => {
                    status = Some(attribute(&tag, b"Status")?);
                }
                b"Error" if status.is_some() && error.is_none() => {
                    error = Some(RawApiErrorParts {
                        number: attribute(&tag, b"Number"),
                        message: String::new(),
                    });
                    in_error = true;
                }
                _ => {}
            },
            Ok(Event::Empty(tag)) => match tag.local_name().as_ref() {
                b"ApiResponse" if status.is_none() => {
                    status = Some(attribute(&tag, b"Status")?);
                }
                b"Error" if status.is_some() && error.is_none() => {
                    error = Some(RawApiErrorParts {
                        number: attribute(&tag, b"Number"),
                        message: String::new(),
                    });
                }
                _ => {}
            },
            Ok(Event::Text(text)) if in_error => {
                if let (Some(parts), Ok(value)) = (error.as_mut(), text.unescape()) {
                    parts.message.push_str(&value);
                }
            }
            Ok(Event::CData(data)) if in_error => {
                if let Some(parts) = error.as_mut() {
                    parts.message.push_str(&String::from_utf8_lossy(&data));
                }
            }
            Ok(Event::End(tag)) if in_error && tag.local_name().as_ref() == b"Error" => {
                in_error = false;
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            // 截断或非 XML 响应：已读到根元素就按已有内容判断
            Err(_) => break,
        }
    }

    let status = status?;
    if status.eq_ignore_ascii_case("OK") {
        return Some(ApiOutcome::Ok);
    }

    let error = error
        .map(|mut parts| {
            parts.message = parts.message.trim().to_string();
            parts
        })
        .filter(|parts| !parts.message.is_empty() || parts.number.is_some());

    Some(ApiOutcome::Error(error.unwrap_or(RawApiErrorParts {
        number: None,
        message: format!("API returned status {status}"),
    })))
}
