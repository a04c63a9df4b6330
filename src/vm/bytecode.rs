//=====================================================
// File: vm/bytecode.rs
//=====================================================
// Author: ZobieLabs
// License: Duality Public License (DPL v1.0)
// Goal: Compiled program container and file format
// Objective: Hold the flat instruction buffer with its symbol names, render
//            listings and read/write versioned `.sxc` files
//=====================================================

use std::fmt;
use std::io::{Read, Write};

use serde::Serialize;
use thiserror::Error;

use super::instruction::{Instruction, Operand};

#[derive(Debug, Error)]
pub enum BytecodeError {
    #[error("invalid bytecode magic")]
    InvalidMagic,
    #[error("unsupported bytecode version {0}")]
    UnsupportedVersion(u16),
    #[error("malformed bytecode: {0}")]
    Codec(String),
    #[error("io error: {0}")]
    Io(String),
}

impl From<std::io::Error> for BytecodeError {
    fn from(err: std::io::Error) -> Self {
        BytecodeError::Io(err.to_string())
    }
}

impl From<bincode::Error> for BytecodeError {
    fn from(err: bincode::Error) -> Self {
        BytecodeError::Codec(err.to_string())
    }
}

/// An immutable straight-line program: instructions in execution order plus
/// the names behind every `Reference` slot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Program {
    instructions: Vec<Instruction>,
    symbols: Vec<String>,
}

impl Program {
    pub const MAGIC: &'static [u8; 4] = b"SXBC";
    pub const VERSION: u16 = 1;

    pub fn new(instructions: Vec<Instruction>, symbols: Vec<String>) -> Self {
        Self {
            instructions,
            symbols,
        }
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    pub fn symbol(&self, slot: u32) -> Option<&str> {
        self.symbols.get(slot as usize).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// Human-readable listing, one instruction per line.
    pub fn listing(&self) -> String {
        self.to_string()
    }

    pub fn encode<W: Write>(&self, mut writer: W) -> Result<(), BytecodeError> {
        writer.write_all(Self::MAGIC)?;
        writer.write_all(&Self::VERSION.to_le_bytes())?;

        writer.write_all(&(self.symbols.len() as u32).to_le_bytes())?;
        for symbol in &self.symbols {
            let bytes = symbol.as_bytes();
            writer.write_all(&(bytes.len() as u32).to_le_bytes())?;
            writer.write_all(bytes)?;
        }

        writer.write_all(&(self.instructions.len() as u32).to_le_bytes())?;
        for instruction in &self.instructions {
            let encoded = bincode::serialize(instruction)?;
            writer.write_all(&(encoded.len() as u32).to_le_bytes())?;
            writer.write_all(&encoded)?;
        }
        Ok(())
    }

    pub fn serialize(&self) -> Result<Vec<u8>, BytecodeError> {
        let mut buf = Vec::new();
        self.encode(&mut buf)?;
        Ok(buf)
    }

    pub fn decode<R: Read>(mut reader: R) -> Result<Self, BytecodeError> {
        let mut magic = [0u8; 4];
        reader.read_exact(&mut magic)?;
        if &magic != Self::MAGIC {
            return Err(BytecodeError::InvalidMagic);
        }

        let mut version_bytes = [0u8; 2];
        reader.read_exact(&mut version_bytes)?;
        let version = u16::from_le_bytes(version_bytes);
        if version != Self::VERSION {
            return Err(BytecodeError::UnsupportedVersion(version));
        }

        let symbols = read_vec(&mut reader, |r| {
            let bytes = read_chunk(r)?;
            String::from_utf8(bytes).map_err(|err| BytecodeError::Codec(err.to_string()))
        })?;
        let instructions = read_vec(&mut reader, |r| {
            let bytes = read_chunk(r)?;
            Ok(bincode::deserialize(&bytes)?)
        })?;

        Ok(Program {
            instructions,
            symbols,
        })
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, instruction) in self.instructions.iter().enumerate() {
            let mnemonic = instruction.opcode.mnemonic();
            match instruction.operand {
                Operand::None => writeln!(f, "{index:04}  {mnemonic}")?,
                Operand::Immediate(value) => writeln!(f, "{index:04}  {mnemonic:<6} {value}")?,
                Operand::Reference { namespace, slot } => writeln!(
                    f,
                    "{index:04}  {mnemonic:<6} {} ({namespace}:{slot})",
                    self.symbol(slot).unwrap_or("?")
                )?,
            }
        }
        Ok(())
    }
}

fn read_u32<R: Read>(reader: &mut R) -> Result<u32, BytecodeError> {
    let mut buf = [0u8; 4];
    reader.read_exact(&mut buf)?;
    Ok(u32::from_le_bytes(buf))
}

fn read_chunk<R: Read>(reader: &mut R) -> Result<Vec<u8>, BytecodeError> {
    let len = read_u32(reader)? as usize;
    let mut buf = Vec::new();
    reader.by_ref().take(len as u64).read_to_end(&mut buf)?;
    if buf.len() != len {
        return Err(BytecodeError::Codec("truncated chunk".into()));
    }
    Ok(buf)
}

fn read_vec<R: Read, T, F>(reader: &mut R, mut f: F) -> Result<Vec<T>, BytecodeError>
where
    F: FnMut(&mut R) -> Result<T, BytecodeError>,
{
    let len = read_u32(reader)? as usize;
    let mut values = Vec::new();
    for _ in 0..len {
        values.push(f(reader)?);
    }
    Ok(values)
}

//=====================================================
// End of file
//=====================================================
