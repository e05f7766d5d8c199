use crate::domain::member::{MemberRole, NewMember};
use crate::domain::money::Money;
use crate::error::{ArisanError, Result};
use serde::Deserialize;
use std::io::Read;

/// One row of a member list: `name, phone, role, contribution`.
///
/// Only `name` is required. Blank cells fall back to the defaults of
/// [`NewMember`].
#[derive(Debug, Deserialize)]
struct MemberRecord {
    name: String,
    #[serde(default)]
    phone: Option<String>,
    #[serde(default)]
    role: Option<MemberRole>,
    #[serde(default)]
    contribution: Option<Money>,
}

impl From<MemberRecord> for NewMember {
    fn from(record: MemberRecord) -> Self {
        Self {
            name: record.name,
            phone: record.phone.unwrap_or_default(),
            role: record.role.unwrap_or_default(),
            contribution: record.contribution,
            user_id: None,
        }
    }
}

/// Reads the initial member list of a group from a CSV source.
///
/// Rows come out in file order, which becomes the initial turn order.
/// Whitespace is trimmed and short rows are accepted.
pub struct MemberReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> MemberReader<R> {
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Lazily deserializes members, one `Result` per row.
    pub fn members(self) -> impl Iterator<Item = Result<NewMember>> {
        self.reader.into_deserialize().map(|result| {
            result
                .map(|record: MemberRecord| NewMember::from(record))
                .map_err(ArisanError::from)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_reader_valid_stream() {
        let data = "name, phone, role, contribution\n\
                    Siti, 0812, ketua, \n\
                    Budi, , , 120000\n\
                    Ani";
        let members: Vec<Result<NewMember>> =
            MemberReader::new(data.as_bytes()).members().collect();

        assert_eq!(members.len(), 3);
        let siti = members[0].as_ref().unwrap();
        assert_eq!(siti.role, MemberRole::Chair);
        assert_eq!(siti.phone, "0812");
        assert!(siti.contribution.is_none());

        let budi = members[1].as_ref().unwrap();
        assert_eq!(budi.role, MemberRole::Member);
        assert_eq!(budi.contribution, Some(Money::new(dec!(120000))));

        assert_eq!(members[2].as_ref().unwrap().name, "Ani");
    }

    #[test]
    fn test_reader_malformed_line() {
        let data = "name, phone, role, contribution\nSiti, 0812, boss, 1";
        let members: Vec<Result<NewMember>> =
            MemberReader::new(data.as_bytes()).members().collect();
        assert!(matches!(members[0], Err(ArisanError::CsvError(_))));
    }
}
