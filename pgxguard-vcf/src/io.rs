use std::ffi::OsStr;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use flate2::read::MultiGzDecoder;

use crate::error::{ParseError, ParseResult};

///
/// Read at most `limit` bytes. Fails with `SizeExceeded` as soon as one
/// byte past the limit is seen, without buffering the rest of the input.
///
pub fn read_bounded<R: Read>(reader: R, limit: usize) -> ParseResult<Vec<u8>> {
    let mut buf = Vec::new();
    reader.take((limit as u64).saturating_add(1)).read_to_end(&mut buf)?;
    if buf.len() > limit {
        return Err(ParseError::SizeExceeded { limit });
    }
    Ok(buf)
}

///
/// Get a reader for either a gzip'd or plain file.
///
/// Plain files larger than `limit` are rejected from their metadata before
/// anything is read. For gzip'd files the ceiling applies to the
/// decompressed stream (see [`read_bounded`]).
///
pub fn get_dynamic_reader(path: &Path, limit: usize) -> ParseResult<Box<dyn Read>> {
    let is_gzipped = path.extension() == Some(OsStr::new("gz"));
    let file = File::open(path)?;
    if !is_gzipped && file.metadata()?.len() > limit as u64 {
        return Err(ParseError::SizeExceeded { limit });
    }
    let reader: Box<dyn Read> = match is_gzipped {
        true => Box::new(BufReader::new(MultiGzDecoder::new(file))),
        false => Box::new(BufReader::new(file)),
    };
    Ok(reader)
}
