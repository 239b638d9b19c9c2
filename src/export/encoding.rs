//! Copyright © 2025-2026 Wenze Wei. All Rights Reserved.
//!
//! This file is part of Zi.
//! The Zi project belongs to the Dunimd Team.
//!
//! Licensed under the Apache License, Version 2.0 (the "License");
//! You may not use this file except in compliance with the License.
//! You may obtain a copy of the License at
//!
//!     http://www.apache.org/licenses/LICENSE-2.0
//!
//! Unless required by applicable law or agreed to in writing, software
//! distributed under the License is distributed on an "AS IS" BASIS,
//! WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//! See the License for the specific language governing permissions and
//! limitations under the License.

//! # Output Encoding
//!
//! Optional transcoding of column names and string cells for text output.
//! Excel expects UTF-16LE; any other WHATWG charset label is accepted as a
//! custom encoding. Non-string cells are never touched.

use std::fmt;

use encoding_rs::Encoding;
use serde::{Deserialize, Serialize};

use crate::errors::{Result, ZiError};

/// Charset used by Excel-compatible delimited exports.
pub const ZI_EXCEL_CHARSET: &str = "UTF-16LE";

/// Requested output encoding.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZiEncoding {
    /// UTF-8, no conversion.
    #[default]
    Default,
    /// Excel-compatible UTF-16LE.
    Excel,
    /// Any charset label, e.g. `windows-1250`.
    Custom(String),
}

impl ZiEncoding {
    /// True when the caller asked for anything but plain UTF-8.
    pub fn is_custom(&self) -> bool {
        !matches!(self, ZiEncoding::Default)
    }

    /// Charset label, or `None` for the default.
    pub fn charset(&self) -> Option<&str> {
        match self {
            ZiEncoding::Default => None,
            ZiEncoding::Excel => Some(ZI_EXCEL_CHARSET),
            ZiEncoding::Custom(label) => Some(label),
        }
    }
}

#[derive(Clone, Copy)]
enum ZiTarget {
    Utf8,
    Utf16Le,
    Utf16Be,
    Legacy(&'static Encoding),
}

/// Converts UTF-8 text into the configured charset.
#[derive(Clone)]
pub struct ZiEncodingConverter {
    label: String,
    target: ZiTarget,
}

impl ZiEncodingConverter {
    /// Converter for a requested encoding; `None` means no conversion.
    pub fn for_encoding(encoding: &ZiEncoding) -> Result<Option<Self>> {
        match encoding.charset() {
            None => Ok(None),
            Some(label) => Self::from_label(label).map(Some),
        }
    }

    /// Looks up a WHATWG charset label such as `UTF-16LE` or `windows-1250`.
    /// Decode-only labels such as `replacement` are rejected.
    pub fn from_label(label: &str) -> Result<Self> {
        let encoding = Encoding::for_label(label.trim().as_bytes())
            .ok_or_else(|| ZiError::encoding(format!("unknown charset '{label}'")))?;

        let target = if encoding == encoding_rs::UTF_16LE {
            ZiTarget::Utf16Le
        } else if encoding == encoding_rs::UTF_16BE {
            ZiTarget::Utf16Be
        } else if encoding == encoding_rs::UTF_8 {
            ZiTarget::Utf8
        } else if encoding.output_encoding() != encoding {
            return Err(ZiError::encoding(format!(
                "charset '{label}' cannot be used for output"
            )));
        } else {
            ZiTarget::Legacy(encoding)
        };

        Ok(Self {
            label: label.to_string(),
            target,
        })
    }

    /// The label as the caller gave it; used in the `charset=` parameter.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Transcodes one string.
    ///
    /// Characters the target charset cannot represent are replaced with
    /// numeric character references and logged.
    pub fn convert(&self, text: &str) -> Vec<u8> {
        match self.target {
            ZiTarget::Utf8 => text.as_bytes().to_vec(),
            ZiTarget::Utf16Le => text.encode_utf16().flat_map(u16::to_le_bytes).collect(),
            ZiTarget::Utf16Be => text.encode_utf16().flat_map(u16::to_be_bytes).collect(),
            ZiTarget::Legacy(encoding) => {
                let (bytes, _, had_unmappable) = encoding.encode(text);
                if had_unmappable {
                    log::warn!(
                        "text contains characters not representable in {}",
                        self.label
                    );
                }
                bytes.into_owned()
            }
        }
    }
}

impl fmt::Debug for ZiEncodingConverter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ZiEncodingConverter")
            .field("label", &self.label)
            .finish()
    }
}
