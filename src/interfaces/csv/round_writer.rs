use crate::domain::round::Round;
use crate::error::Result;
use serde::Serialize;
use std::io::Write;

#[derive(Serialize)]
struct LedgerRow<'a> {
    round: u32,
    winner: &'a str,
    due_date: String,
    collected: String,
}

/// Writes the round ledger of a group as `round,winner,due_date,collected`.
pub struct RoundWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> RoundWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    /// Rounds are written in the order given.
    pub fn write_rounds<'a>(&mut self, rounds: impl IntoIterator<Item = &'a Round>) -> Result<()> {
        for round in rounds {
            self.writer.serialize(LedgerRow {
                round: round.round_number,
                winner: &round.winner_name,
                due_date: round.due_date.format("%Y-%m-%d").to_string(),
                collected: round.total_collected.to_string(),
            })?;
        }
        self.writer.flush()?;
        Ok(())
    }
}
