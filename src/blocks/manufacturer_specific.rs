//! Manufacturer specific block: an MFID, a length byte and opaque data.
//!
//! Recognized so that block headers in the 63..=127 range resolve, but the
//! payload assembler refuses to carry it.

use bytes::{BufMut, BytesMut};
use serde::{Deserialize, Serialize};

use crate::bits::write_bytes;
use crate::constants::MANUFACTURER_SPECIFIC_PREFIX_LENGTH;
use crate::error::{Field, P25PayloadError, ParseContext, RangeError};
use crate::render;
use crate::traits::{P25Block, require_len};

/// Vendor data of at most 255 bytes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ManufacturerSpecific {
    manufacturer_id: u8,
    data: Vec<u8>,
}

impl ManufacturerSpecific {
    /// Creates a block carrying `data`.
    ///
    /// # Errors
    /// - [`RangeError`] - `data` is longer than 255 bytes
    pub fn new(manufacturer_id: u8, data: Vec<u8>) -> Result<Self, RangeError> {
        let mut block = Self {
            manufacturer_id,
            data: Vec::new(),
        };
        block.set_data(data)?;
        Ok(block)
    }

    pub fn manufacturer_id(&self) -> u8 {
        self.manufacturer_id
    }

    pub fn set_manufacturer_id(&mut self, manufacturer_id: u8) {
        self.manufacturer_id = manufacturer_id;
    }

    /// Value of the length byte.
    pub fn length(&self) -> u8 {
        self.data.len() as u8
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn set_data(&mut self, data: Vec<u8>) -> Result<(), RangeError> {
        if data.len() > u8::MAX as usize {
            return Err(RangeError {
                field: Field::ManufacturerDataLength,
                value: data.len() as u64,
                max: u8::MAX as u64,
            });
        }
        self.data = data;
        Ok(())
    }
}

impl P25Block for ManufacturerSpecific {
    const NAME: &'static str = "manufacturer-specific";

    fn from_bytes(data: &[u8]) -> Result<Self, P25PayloadError> {
        require_len(
            data,
            MANUFACTURER_SPECIFIC_PREFIX_LENGTH,
            ParseContext::ManufacturerSpecific,
        )?;
        let length = data[1] as usize;
        require_len(
            data,
            MANUFACTURER_SPECIFIC_PREFIX_LENGTH + length,
            ParseContext::ManufacturerSpecific,
        )?;
        Ok(Self {
            manufacturer_id: data[0],
            data: data[2..2 + length].to_vec(),
        })
    }

    fn encoded_len(&self) -> usize {
        MANUFACTURER_SPECIFIC_PREFIX_LENGTH + self.data.len()
    }

    fn encode_into(&self, out: &mut BytesMut) {
        out.put_u8(self.manufacturer_id);
        out.put_u8(self.length());
        out.put_slice(&self.data);
    }

    fn to_issi_string(&self) -> String {
        format!(
            "\tMFID: {}\n\tLength: {}\n\tData: {}",
            render::hex(self.manufacturer_id as u64, 2),
            self.length(),
            write_bytes(&self.data)
        )
    }

    fn to_xml(&self) -> String {
        format!(
            "<manufacturer-specific\n length=\"{}\"\n MFID=\"{}\"\n><![CDATA[\n{}\n]]>\n</manufacturer-specific>",
            self.length(),
            self.manufacturer_id,
            write_bytes(&self.data)
        )
    }
}
