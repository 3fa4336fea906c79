//! Row counts read straight from FITS headers.
//!
//! Only the headers are parsed: the primary HDU is skipped using its
//! `BITPIX`/`NAXISn`/`PCOUNT`/`GCOUNT` cards and `NAXIS2` is taken from the
//! first extension, which is where catalogs keep their table.

use std::fs::File;
use std::io::{self, BufReader, Read, Seek, SeekFrom};
use std::path::Path;

use crate::domain::AppError;
use crate::ports::RowCountSource;

const BLOCK: u64 = 2880;
const CARD: usize = 80;

#[derive(Debug, Clone, Copy, Default)]
pub struct FitsRowCounter;

impl FitsRowCounter {
    pub fn new() -> Self {
        Self
    }
}

impl RowCountSource for FitsRowCounter {
    fn row_count(&self, catalog: &Path) -> Result<u64, AppError> {
        let file = File::open(catalog).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => {
                AppError::InputNotFound(format!("catalog {}", catalog.display()))
            }
            _ => AppError::from(e),
        })?;
        let what = format!("FITS header of {}", catalog.display());
        let mut reader = BufReader::new(file);

        let primary = read_header(&mut reader).map_err(|e| AppError::parse_error(&what, e))?;
        let skip = primary.data_bytes().map_err(|e| AppError::parse_error(&what, e))?;
        let skip = i64::try_from(skip)
            .map_err(|_| AppError::parse_error(&what, "data size overflows"))?;
        reader.seek(SeekFrom::Current(skip))?;

        let table = read_header(&mut reader).map_err(|e| AppError::parse_error(&what, e))?;
        table.int("NAXIS2").map_err(|e| AppError::parse_error(&what, e))
    }
}

struct Header {
    cards: Vec<(String, String)>,
}

impl Header {
    fn value(&self, key: &str) -> Option<&str> {
        self.cards.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    fn int(&self, key: &str) -> Result<u64, String> {
        let raw = self.value(key).ok_or_else(|| format!("no {} card", key))?;
        raw.parse().map_err(|_| format!("{} is not a count: '{}'", key, raw))
    }

    fn int_or(&self, key: &str, default: u64) -> Result<u64, String> {
        match self.value(key) {
            Some(_) => self.int(key),
            None => Ok(default),
        }
    }

    /// Data size of this HDU rounded up to whole blocks.
    fn data_bytes(&self) -> Result<u64, String> {
        let bitpix: i64 = self
            .value("BITPIX")
            .ok_or("no BITPIX card")?
            .parse()
            .map_err(|_| "BITPIX is not an integer".to_string())?;
        let naxis = self.int("NAXIS")?;
        if naxis == 0 {
            return Ok(0);
        }

        let overflow = || "data size overflows".to_string();
        let mut elements = 1u64;
        for axis in 1..=naxis {
            elements =
                elements.checked_mul(self.int(&format!("NAXIS{}", axis))?).ok_or_else(overflow)?;
        }
        let pcount = self.int_or("PCOUNT", 0)?;
        let gcount = self.int_or("GCOUNT", 1)?;

        let bits = pcount
            .checked_add(elements)
            .and_then(|n| n.checked_mul(gcount))
            .and_then(|n| n.checked_mul(bitpix.unsigned_abs()))
            .ok_or_else(overflow)?;
        (bits / 8).div_ceil(BLOCK).checked_mul(BLOCK).ok_or_else(overflow)
    }
}

fn read_header<R: Read>(reader: &mut R) -> Result<Header, String> {
    let mut cards = Vec::new();
    let mut block = [0u8; BLOCK as usize];
    loop {
        reader.read_exact(&mut block).map_err(|e| format!("truncated header: {}", e))?;
        for card in block.chunks(CARD) {
            let card = String::from_utf8_lossy(card);
            let key = card.get(..8).unwrap_or(&card[..]).trim_end();
            if key == "END" {
                return Ok(Header { cards });
            }
            if card.get(8..10) == Some("= ") {
                cards.push((key.to_string(), card_value(&card[10..])));
            }
        }
    }
}

/// Value part of a card with any inline comment removed.
fn card_value(raw: &str) -> String {
    let raw = raw.trim_start();
    if let Some(quoted) = raw.strip_prefix('\'') {
        return quoted.split('\'').next().unwrap_or_default().trim_end().to_string();
    }
    raw.split('/').next().unwrap_or_default().trim().to_string()
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;

    fn card(key: &str, value: &str) -> String {
        format!("{:<8}= {:>20}", key, value)
    }

    fn header(cards: &[String]) -> Vec<u8> {
        let mut text = String::new();
        for c in cards {
            text.push_str(&format!("{:<80}", c));
        }
        text.push_str(&format!("{:<80}", "END"));
        let mut bytes = text.into_bytes();
        bytes.resize(bytes.len().div_ceil(BLOCK as usize) * BLOCK as usize, b' ');
        bytes
    }

    fn catalog(primary_pixels: Option<(u64, u64)>, rows: u64) -> NamedTempFile {
        let mut primary = vec![card("SIMPLE", "T"), card("BITPIX", "16")];
        match primary_pixels {
            Some((nx, ny)) => {
                primary.push(card("NAXIS", "2"));
                primary.push(card("NAXIS1", &nx.to_string()));
                primary.push(card("NAXIS2", &ny.to_string()));
            }
            None => primary.push(card("NAXIS", "0")),
        }
        primary.push(card("EXTEND", "T"));

        let mut bytes = header(&primary);
        if let Some((nx, ny)) = primary_pixels {
            let data = (nx * ny * 2).div_ceil(BLOCK) * BLOCK;
            bytes.extend(std::iter::repeat_n(0u8, data as usize));
        }
        bytes.extend(header(&[
            card("XTENSION", "'BINTABLE'"),
            card("BITPIX", "8"),
            card("NAXIS", "2"),
            card("NAXIS1", "16"),
            format!("{} / number of rows", card("NAXIS2", &rows.to_string())),
            card("PCOUNT", "0"),
            card("GCOUNT", "1"),
        ]));

        let mut file = NamedTempFile::new().unwrap();
        file.write_all(&bytes).unwrap();
        file
    }

    #[test]
    fn reads_rows_of_first_extension() {
        let file = catalog(None, 4123);
        assert_eq!(FitsRowCounter::new().row_count(file.path()).unwrap(), 4123);
    }

    #[test]
    fn skips_primary_image_data() {
        let file = catalog(Some((100, 37)), 7);
        assert_eq!(FitsRowCounter::new().row_count(file.path()).unwrap(), 7);
    }

    #[test]
    fn missing_catalog_is_not_found() {
        let err = FitsRowCounter::new().row_count(Path::new("/nonexistent/cat.fits")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn garbage_is_a_parse_error() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"not a fits file").unwrap();
        let err = FitsRowCounter::new().row_count(file.path()).unwrap_err();
        assert!(matches!(err, AppError::ParseError { .. }));
    }

    #[test]
    fn oversized_primary_is_a_parse_error() {
        let big = u64::MAX.to_string();
        let bytes = header(&[
            card("SIMPLE", "T"),
            card("BITPIX", "-64"),
            card("NAXIS", "3"),
            card("NAXIS1", &big),
            card("NAXIS2", &big),
            card("NAXIS3", "2"),
        ]);
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(&bytes).unwrap();

        let err = FitsRowCounter::new().row_count(file.path()).unwrap_err();
        assert!(matches!(err, AppError::ParseError { .. }));
        assert!(err.to_string().contains("overflows"));
    }

    #[test]
    fn string_values_lose_quotes() {
        assert_eq!(card_value(" 'BINTABLE'           / kind"), "BINTABLE");
        assert_eq!(card_value("                  42 / rows"), "42");
    }
}
