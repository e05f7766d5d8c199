use crate::domain::schedule::TurnContribution;
use crate::error::Result;
use serde::Serialize;
use std::io::Write;

#[derive(Serialize)]
struct ScheduleRow {
    turn: u32,
    contribution: String,
    reduction: String,
}

/// Writes a contribution schedule as `turn,contribution,reduction` rows.
pub struct ScheduleWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> ScheduleWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    pub fn write_schedule(&mut self, rows: &[TurnContribution]) -> Result<()> {
        for row in rows {
            self.writer.serialize(ScheduleRow {
                turn: row.turn,
                contribution: row.contribution.to_string(),
                reduction: row.reduction.to_string(),
            })?;
        }
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::money::Money;
    use crate::domain::schedule::{DecliningSchedule, SubPeriod};
    use rust_decimal_macros::dec;

    #[test]
    fn test_writes_declining_schedule() {
        let schedule = DecliningSchedule::new(
            Money::new(dec!(300000)),
            SubPeriod::One,
            vec![Money::new(dec!(50000))],
            Money::ZERO,
        )
        .unwrap();
        let rows = schedule.contributions(3).unwrap();

        let mut out = Vec::new();
        ScheduleWriter::new(&mut out).write_schedule(&rows).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert_eq!(
            text,
            "turn,contribution,reduction\n1,150000,0\n2,100000,50000\n3,50000,100000\n"
        );
    }
}
