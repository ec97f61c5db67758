//! Virtual cassette tape codec and on-disk tape library.
//!
//! A tape is a sequence of program records in the Sol-20's on-tape
//! format: a leader of 30 nulls and one 0x01 sync byte, a 16-byte header
//! (name, type, size, load and execution addresses) closed by a rolling
//! checksum, then the data in blocks of up to 256 bytes, each followed by
//! the running checksum.
//!
//! Tapes are described by human-editable script files (`TAPE1.svt` /
//! `TAPE2.svt`): `;` comments, `H` header lines, `D` hex data lines, and
//! `F` includes pulling in `.ent` program listings or raw `.hex` tape
//! fragments. The library assembles scripts into tape images at load
//! time and recovers programs the guest writes back through the tape-out
//! port.

use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Null bytes in a record leader, ahead of the 0x01 sync byte.
pub const LEADER_NULLS: usize = 30;
/// Data bytes per checksummed block.
pub const BLOCK_SIZE: usize = 256;
/// Bytes reserved for the program name in a header.
pub const NAME_BYTES: usize = 6;
/// Program type byte used for machine-code programs.
pub const TYPE_PROGRAM: u8 = b'C';

// ---------------------------------------------------------------------------
// Rolling checksum
// ---------------------------------------------------------------------------

/// Fold one byte into the running tape checksum.
///
/// Mirrors the monitor's checksum routine instruction for instruction
/// (SUB C / MOV C,A / XRA C / CMA / SUB C / MOV C,A). It is not a
/// polynomial CRC and must not be replaced with one.
pub fn advance_checksum(byte: u8, check: u8) -> u8 {
    let d = byte.wrapping_sub(check); // SUB C
    let c = d;                        // MOV C,A
    let d = d ^ c;                    // XRA C
    let d = d ^ 0xFF;                 // CMA
    d.wrapping_sub(c)                 // SUB C / MOV C,A
}

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// Errors from tape assembly, read-back, and the on-disk library.
#[derive(Debug)]
pub enum TapeError {
    /// Underlying I/O error.
    Io(std::io::Error),

    /// An `F` include named a file that could not be read.
    Include {
        file: String,
        source: std::io::Error,
    },

    /// Expected a 0x01 sync byte after the leader nulls.
    BadLeader { at: usize },

    /// A header's trailing checksum did not match its contents.
    HeaderChecksum { at: usize },

    /// A data block's checksum did not match its contents.
    BlockChecksum { at: usize },

    /// The image ended inside a record.
    Truncated { at: usize },
}

impl fmt::Display for TapeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::Include { file, source } => {
                write!(f, "cannot include tape file {file}: {source}")
            }
            Self::BadLeader { at } => write!(f, "no sync byte after leader at offset {at}"),
            Self::HeaderChecksum { at } => write!(f, "header checksum mismatch at offset {at}"),
            Self::BlockChecksum { at } => write!(f, "block checksum mismatch at offset {at}"),
            Self::Truncated { at } => write!(f, "tape image truncated at offset {at}"),
        }
    }
}

impl std::error::Error for TapeError {}

impl From<std::io::Error> for TapeError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

// ---------------------------------------------------------------------------
// Record emission
// ---------------------------------------------------------------------------

/// Incremental tape image builder.
pub struct TapeWriter {
    out: Vec<u8>,
}

impl TapeWriter {
    pub fn new() -> Self {
        Self { out: Vec::new() }
    }

    fn put(&mut self, byte: u8, check: u8) -> u8 {
        self.out.push(byte);
        advance_checksum(byte, check)
    }

    /// Emit a record leader and 16-byte header.
    ///
    /// The name is ASCII, zero-padded (or truncated) to six bytes. Size,
    /// load, and execution addresses are little-endian. The checksum runs
    /// from zero over the 15 header bytes and closes the header.
    pub fn header(&mut self, name: &str, program_type: u8, data_size: u16, load_addr: u16, exec_addr: u16) {
        for _ in 0..LEADER_NULLS {
            self.out.push(0x00);
        }
        self.out.push(0x01);

        let mut check = 0u8;
        let name_bytes = name.as_bytes();
        for i in 0..NAME_BYTES {
            check = self.put(name_bytes.get(i).copied().unwrap_or(0), check);
        }
        check = self.put(program_type, check);
        for byte in data_size.to_le_bytes() {
            check = self.put(byte, check);
        }
        for byte in load_addr.to_le_bytes() {
            check = self.put(byte, check);
        }
        for byte in exec_addr.to_le_bytes() {
            check = self.put(byte, check);
        }
        for _ in 0..3 {
            check = self.put(0x00, check);
        }
        self.out.push(check);
    }

    /// Emit a data section. After every 256 bytes the running checksum is
    /// appended and reset; a final checksum closes the last (short,
    /// possibly empty) block.
    pub fn data(&mut self, data: &[u8]) {
        let mut check = 0u8;
        let mut count = 0usize;
        for &byte in data {
            check = self.put(byte, check);
            count += 1;
            if count == BLOCK_SIZE {
                self.out.push(check);
                check = 0;
                count = 0;
            }
        }
        self.out.push(check);
    }

    /// Append pre-formatted tape bytes verbatim (`.hex` includes and
    /// recordings the guest already framed itself).
    pub fn raw(&mut self, bytes: &[u8]) {
        self.out.extend_from_slice(bytes);
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.out
    }
}

impl Default for TapeWriter {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Record read-back
// ---------------------------------------------------------------------------

/// One program recovered from a tape image.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgramRecord {
    pub name: String,
    pub program_type: u8,
    pub load_addr: u16,
    pub exec_addr: u16,
    pub data: Vec<u8>,
}

/// Parse a tape image back into program records, verifying every
/// checksum on the way.
pub fn read_tape(image: &[u8]) -> Result<Vec<ProgramRecord>, TapeError> {
    let mut records = Vec::new();
    let mut pos = 0usize;

    loop {
        // Leader: any run of nulls, then the sync byte.
        while pos < image.len() && image[pos] == 0x00 {
            pos += 1;
        }
        if pos >= image.len() {
            break;
        }
        if image[pos] != 0x01 {
            return Err(TapeError::BadLeader { at: pos });
        }
        pos += 1;

        // 16 header bytes plus the trailing checksum.
        if pos + 17 > image.len() {
            return Err(TapeError::Truncated { at: pos });
        }
        let header = &image[pos..pos + 17];
        let mut check = 0u8;
        for &byte in &header[..16] {
            check = advance_checksum(byte, check);
        }
        if header[16] != check {
            return Err(TapeError::HeaderChecksum { at: pos });
        }

        let name_end = header[..NAME_BYTES]
            .iter()
            .position(|&b| b == 0)
            .unwrap_or(NAME_BYTES);
        let name = String::from_utf8_lossy(&header[..name_end]).into_owned();
        let program_type = header[6];
        let data_size = u16::from_le_bytes([header[7], header[8]]);
        let load_addr = u16::from_le_bytes([header[9], header[10]]);
        let exec_addr = u16::from_le_bytes([header[11], header[12]]);
        pos += 17;

        let mut data = Vec::with_capacity(data_size as usize);
        if data_size > 0 {
            let mut check = 0u8;
            let mut count = 0usize;
            for _ in 0..data_size {
                let byte = *image.get(pos).ok_or(TapeError::Truncated { at: pos })?;
                pos += 1;
                check = advance_checksum(byte, check);
                data.push(byte);
                count += 1;
                if count == BLOCK_SIZE {
                    let stored = *image.get(pos).ok_or(TapeError::Truncated { at: pos })?;
                    if stored != check {
                        return Err(TapeError::BlockChecksum { at: pos });
                    }
                    pos += 1;
                    check = 0;
                    count = 0;
                }
            }
            let stored = *image.get(pos).ok_or(TapeError::Truncated { at: pos })?;
            if stored != check {
                return Err(TapeError::BlockChecksum { at: pos });
            }
            pos += 1;
        }

        records.push(ProgramRecord {
            name,
            program_type,
            load_addr,
            exec_addr,
            data,
        });
    }

    Ok(records)
}

// ---------------------------------------------------------------------------
// Script assembly
// ---------------------------------------------------------------------------

/// Assemble a tape script into raw tape bytes. `dir` anchors `F`
/// includes.
///
/// Lines are trimmed and upper-cased. Empty lines and `;` comments are
/// skipped, as are the legacy deck directives `S R L B C`. `D` lines
/// accumulate hex pairs; the block is flushed when a non-`D` line (or the
/// end of the script) follows. Malformed lines are skipped with a note
/// on stderr; a missing include file aborts the assembly.
pub fn assemble_script(script: &str, dir: &Path) -> Result<Vec<u8>, TapeError> {
    let mut writer = TapeWriter::new();
    let mut pending: Vec<u8> = Vec::new();

    for (idx, raw_line) in script.lines().enumerate() {
        let line = raw_line.trim().to_ascii_uppercase();
        if line.is_empty() || line.starts_with(';') {
            continue;
        }
        let tag = line.as_bytes()[0];

        if !pending.is_empty() && tag != b'D' {
            writer.data(&pending);
            pending.clear();
        }

        match tag {
            // Legacy deck directives, kept in old scripts.
            b'S' | b'R' | b'L' | b'B' | b'C' => {}
            b'F' => include_file(&mut writer, &line, dir)?,
            b'H' => {
                if let Some((name, program_type, size, load, exec)) = parse_header_line(&line) {
                    writer.header(&name, program_type, size, load, exec);
                } else {
                    eprintln!("tape script line {}: bad header, skipped", idx + 1);
                }
            }
            b'D' => {
                if !parse_data_line(&line, &mut pending) {
                    eprintln!("tape script line {}: bad data, skipped", idx + 1);
                }
            }
            _ => eprintln!("tape script line {}: unrecognized, skipped", idx + 1),
        }
    }

    if !pending.is_empty() {
        writer.data(&pending);
    }

    Ok(writer.into_bytes())
}

/// `H name type size load exec` — numeric fields are hex.
fn parse_header_line(line: &str) -> Option<(String, u8, u16, u16, u16)> {
    let mut tokens = line.split_whitespace();
    tokens.next(); // the H tag
    let name = tokens.next()?.to_string();
    let program_type = u8::from_str_radix(tokens.next()?, 16).ok()?;
    let size = u16::from_str_radix(tokens.next()?, 16).ok()?;
    let load = u16::from_str_radix(tokens.next()?, 16).ok()?;
    let exec = u16::from_str_radix(tokens.next()?, 16).ok()?;
    Some((name, program_type, size, load, exec))
}

/// `D <hexpairs>` — pairs with no separators, e.g. `D 3E41C9`.
fn parse_data_line(line: &str, pending: &mut Vec<u8>) -> bool {
    let mut tokens = line.split_whitespace();
    tokens.next(); // the D tag
    let Some(pairs) = tokens.next() else {
        return false;
    };
    if pairs.len() % 2 != 0 {
        return false;
    }
    let mut bytes = Vec::with_capacity(pairs.len() / 2);
    for chunk in pairs.as_bytes().chunks(2) {
        let pair = std::str::from_utf8(chunk).ok();
        match pair.and_then(|p| u8::from_str_radix(p, 16).ok()) {
            Some(byte) => bytes.push(byte),
            None => return false,
        }
    }
    pending.extend_from_slice(&bytes);
    true
}

/// `F <filename>` — include a `.ent` program listing or a raw `.hex`
/// tape fragment from the tape directory.
fn include_file(writer: &mut TapeWriter, line: &str, dir: &Path) -> Result<(), TapeError> {
    let mut tokens = line.split_whitespace();
    tokens.next(); // the F tag
    let Some(name) = tokens.next() else {
        eprintln!("tape script: F line without a filename, skipped");
        return Ok(());
    };
    // The script line was upper-cased during parsing. Saved recordings
    // land on disk upper-cased, hand-written listings are usually
    // lower-cased; try both.
    let file_name = name.to_ascii_lowercase();
    let path = {
        let as_written = dir.join(name);
        if as_written.exists() { as_written } else { dir.join(&file_name) }
    };

    if file_name.ends_with(".ent") {
        let text = fs::read_to_string(&path).map_err(|source| TapeError::Include {
            file: file_name.clone(),
            source,
        })?;
        let stem = file_name.trim_end_matches(".ent");
        include_ent(writer, stem, &text);
    } else if file_name.ends_with(".hex") {
        let bytes = fs::read(&path).map_err(|source| TapeError::Include {
            file: file_name.clone(),
            source,
        })?;
        writer.raw(&bytes);
    } else {
        eprintln!("tape script: unknown include type {file_name}, skipped");
    }
    Ok(())
}

/// Assemble a `.ent` program listing into a header + data record.
///
/// An `E <hex>` line sets the execution address (which also serves as
/// the load address). Other lines are `addr: b0 b1 …` with contiguous
/// addresses; gaps are filled with zeros. Bytes may carry `/` markers,
/// which are stripped. The program name is the upper-cased file stem,
/// at most five characters; the type is `'C'`.
fn include_ent(writer: &mut TapeWriter, stem: &str, text: &str) {
    let mut exec_addr = 0u16;
    let mut data: Vec<u8> = Vec::new();
    let mut old_address = 0usize;

    for raw_line in text.lines() {
        let line = raw_line.trim();
        if line.is_empty() {
            continue;
        }
        // An E directive sets the execution address. A data line whose
        // address happens to start with E (e.g. `E100: …`) carries a
        // colon and falls through to the address parse below.
        if let Some(rest) = line.strip_prefix('E') {
            if let Ok(addr) = u16::from_str_radix(rest.trim(), 16) {
                exec_addr = addr;
                continue;
            }
        }
        let Some((addr_text, byte_text)) = line.split_once(':') else {
            eprintln!("ent listing: line without address, skipped: {line}");
            continue;
        };
        let Ok(address) = usize::from_str_radix(addr_text.trim(), 16) else {
            eprintln!("ent listing: bad address, skipped: {line}");
            continue;
        };
        let mut address = address;
        if old_address != 0 && address > old_address {
            data.resize(data.len() + (address - old_address), 0x00);
        }
        for token in byte_text.split_whitespace() {
            let cleaned = token.replace('/', "");
            match u8::from_str_radix(&cleaned, 16) {
                Ok(byte) => {
                    data.push(byte);
                    address += 1;
                }
                Err(_) => eprintln!("ent listing: bad byte {token}, skipped"),
            }
        }
        old_address = address;
    }

    let mut name = stem.to_ascii_uppercase();
    name.truncate(5);
    writer.header(&name, TYPE_PROGRAM, data.len() as u16, exec_addr, exec_addr);
    writer.data(&data);
}

// ---------------------------------------------------------------------------
// Saved-program recovery
// ---------------------------------------------------------------------------

/// Extract the program name embedded in a tape image the guest wrote:
/// skip leader bytes (values below 2), then read up to the next NUL.
pub fn embedded_program_name(tape: &[u8]) -> Option<String> {
    let start = tape.iter().position(|&b| b >= 2)?;
    let name: Vec<u8> = tape[start..]
        .iter()
        .copied()
        .take_while(|&b| b != 0)
        .collect();
    Some(String::from_utf8_lossy(&name).into_owned())
}

// ---------------------------------------------------------------------------
// On-disk tape library
// ---------------------------------------------------------------------------

/// Script names for the two decks inside the tape directory.
pub const SCRIPT_NAMES: [&str; 2] = ["TAPE1.svt", "TAPE2.svt"];

/// The tape directory: two deck scripts plus their `.ent` / `.hex`
/// companions.
pub struct TapeLibrary {
    dir: PathBuf,
}

impl TapeLibrary {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Assemble one deck's reel. A missing script is an empty reel; a
    /// script that fails to assemble is reported and also yields an
    /// empty reel.
    pub fn load_reel(&self, deck: usize) -> Vec<u8> {
        let path = self.dir.join(SCRIPT_NAMES[deck]);
        let script = match fs::read_to_string(&path) {
            Ok(script) => script,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                eprintln!("no virtual cassette in deck {}", deck + 1);
                return Vec::new();
            }
            Err(e) => {
                eprintln!("cannot read {}: {e}", path.display());
                return Vec::new();
            }
        };
        match assemble_script(&script, &self.dir) {
            Ok(bytes) => bytes,
            Err(e) => {
                eprintln!("cannot assemble {}: {e}", path.display());
                Vec::new()
            }
        }
    }

    /// Persist a recording the guest streamed out: write it as
    /// `<NAME>.HEX` beside the scripts, add an `F <NAME>.HEX` line to the
    /// deck's script if one is not already there, and return the
    /// reassembled reel. A recording with no recognizable program header
    /// is discarded (`Ok(None)`).
    pub fn save_recording(&self, deck: usize, recording: &[u8]) -> Result<Option<Vec<u8>>, TapeError> {
        let Some(name) = embedded_program_name(recording) else {
            eprintln!("tape recording has no program header; discarded");
            return Ok(None);
        };
        let file_name = format!("{name}.HEX");
        fs::write(self.dir.join(&file_name), recording)?;

        let script_path = self.dir.join(SCRIPT_NAMES[deck]);
        let script = match fs::read_to_string(&script_path) {
            Ok(script) => script,
            Err(e) if e.kind() == ErrorKind::NotFound => String::new(),
            Err(e) => return Err(TapeError::Io(e)),
        };
        let already_listed = script
            .lines()
            .any(|line| line.to_ascii_uppercase().contains(&file_name));
        if !already_listed {
            let mut updated = script;
            if !updated.is_empty() && !updated.ends_with('\n') {
                updated.push('\n');
            }
            updated.push_str(&format!("F {file_name}\n"));
            fs::write(&script_path, updated)?;
        }

        Ok(Some(self.load_reel(deck)))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
